//! Amortization schedule generation for single loans

mod state;
mod mode;
mod engine;
mod records;

pub use state::{AmortizationState, PeriodFlows};
pub use mode::{Column, ScheduleMode};
pub use engine::{generate_schedule, ScheduleEngine, CLAMP_TOLERANCE};
pub use records::{PaymentRecord, Schedule, ScheduleSummary, ScheduleTotals};
