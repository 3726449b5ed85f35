//! Schedule output structures

use super::mode::{Column, ScheduleMode};
use serde::{Deserialize, Serialize};

/// One period of an amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// 1-based period number
    pub period: u32,

    // Amounts booked this period (outflows negative)
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,

    /// Outstanding balance at the close of this period; for an annuity due
    /// this includes the interest accrued after the opening payment
    pub ending_balance: f64,

    // Running totals from period 1
    pub cumulative_payment: f64,
    pub cumulative_interest: f64,
    pub cumulative_principal: f64,

    // Totals still to come after this period
    pub remaining_payment: f64,
    pub remaining_interest: f64,
    pub remaining_principal: f64,
}

impl PaymentRecord {
    pub fn value(&self, column: Column) -> f64 {
        match column {
            Column::Payment => self.payment,
            Column::Interest => self.interest,
            Column::Principal => self.principal,
            Column::EndingBalance => self.ending_balance,
            Column::CumulativePayment => self.cumulative_payment,
            Column::CumulativeInterest => self.cumulative_interest,
            Column::CumulativePrincipal => self.cumulative_principal,
            Column::RemainingPayment => self.remaining_payment,
            Column::RemainingInterest => self.remaining_interest,
            Column::RemainingPrincipal => self.remaining_principal,
        }
    }
}

/// Whole-term totals of one loan
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScheduleTotals {
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
}

/// Complete schedule for one loan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub mode: ScheduleMode,

    pub periods_total: u32,

    /// Periodic rate every period was computed with
    pub periodic_rate: f64,

    /// Constant payment shared by every record
    pub payment: f64,

    /// Totals over the full term, independent of the emitted window
    pub totals: ScheduleTotals,

    /// Records for the requested window, in period order
    pub records: Vec<PaymentRecord>,
}

impl Schedule {
    pub fn columns(&self) -> &'static [Column] {
        self.mode.columns()
    }

    /// Values of this schedule's columns for every record
    pub fn projected_rows(&self) -> Vec<(u32, Vec<f64>)> {
        let columns = self.columns();
        self.records
            .iter()
            .map(|r| (r.period, columns.iter().map(|&c| r.value(c)).collect()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get summary statistics over the emitted window
    pub fn summary(&self) -> ScheduleSummary {
        let window_interest: f64 = self.records.iter().map(|r| r.interest).sum();
        let window_principal: f64 = self.records.iter().map(|r| r.principal).sum();
        let window_payment: f64 = self.records.iter().map(|r| r.payment).sum();

        ScheduleSummary {
            periods: self.records.len() as u32,
            first_period: self.records.first().map(|r| r.period).unwrap_or(0),
            last_period: self.records.last().map(|r| r.period).unwrap_or(0),
            payment: self.payment,
            window_payment,
            window_interest,
            window_principal,
            final_balance: self.records.last().map(|r| r.ending_balance).unwrap_or(0.0),
            totals: self.totals,
        }
    }
}

/// Summary statistics for a schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub periods: u32,
    pub first_period: u32,
    pub last_period: u32,
    pub payment: f64,
    pub window_payment: f64,
    pub window_interest: f64,
    pub window_principal: f64,
    pub final_balance: f64,
    pub totals: ScheduleTotals,
}
