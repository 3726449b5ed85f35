//! Loan Engine - Excel-compatible loan formulas and amortization schedules
//!
//! This library provides:
//! - Rate normalization (simple or compound, by payment frequency)
//! - PMT, IPMT, PPMT, PV, FV, CUMIPMT and CUMPRINC
//! - Amortization schedules in nine column modes, optionally windowed
//! - Broadcast matrix arithmetic with a missing-value policy
//! - CSV table adapters and a parallel batch runner

pub mod error;
pub mod config;
pub mod loan;
pub mod formulas;
pub mod schedule;
pub mod matrix;
pub mod table;
pub mod batch;

// Re-export commonly used types
pub use error::{LoanError, Result};
pub use config::{EngineConfig, FailurePolicy};
pub use loan::{Frequency, LoanTerms, PaymentTiming, RateMethod};
pub use formulas::PeriodicRate;
pub use schedule::{generate_schedule, Schedule, ScheduleEngine, ScheduleMode};
pub use matrix::{Matrix, MissingValues, Operand, Operation};
pub use table::{LoanColumns, LoanFunction, Table};
pub use batch::BatchRunner;
