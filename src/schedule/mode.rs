//! Schedule kinds and the output columns each one emits

use crate::error::{LoanError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A field of [`super::PaymentRecord`] that can be written out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Payment,
    Interest,
    Principal,
    EndingBalance,
    CumulativePayment,
    CumulativeInterest,
    CumulativePrincipal,
    RemainingPayment,
    RemainingInterest,
    RemainingPrincipal,
}

impl Column {
    /// Header used in tabular output
    pub fn name(&self) -> &'static str {
        match self {
            Column::Payment => "PMT",
            Column::Interest => "IPMT",
            Column::Principal => "PPMT",
            Column::EndingBalance => "Remaining_Balance",
            Column::CumulativePayment => "Cumulative_Payments",
            Column::CumulativeInterest => "Cumulative_Interest_Paid",
            Column::CumulativePrincipal => "Cumulative_Principal_Paid",
            Column::RemainingPayment => "Outstanding_Payments",
            Column::RemainingInterest => "Outstanding_Interest",
            Column::RemainingPrincipal => "Outstanding_Principal",
        }
    }
}

/// Which projection of the shared forward pass a schedule emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScheduleMode {
    /// Every component, running totals and remaining totals
    #[default]
    Full,
    /// Running interest from period 1 (CUMIPMT)
    CumulativeInterest,
    /// Running payments from period 1 (CUMPMT)
    CumulativePayment,
    /// Running principal from period 1 (CUMPRINC)
    CumulativePrincipal,
    /// Per-period interest only (IPMT)
    Interest,
    /// Per-period principal only (PPMT)
    Principal,
    /// Payments still to be made after each period
    OpenPayment,
    /// Interest still to be paid after each period
    OpenInterest,
    /// Principal still to be repaid after each period
    OpenPrincipal,
}

impl ScheduleMode {
    pub const ALL: [ScheduleMode; 9] = [
        ScheduleMode::Full,
        ScheduleMode::CumulativeInterest,
        ScheduleMode::CumulativePayment,
        ScheduleMode::CumulativePrincipal,
        ScheduleMode::Interest,
        ScheduleMode::Principal,
        ScheduleMode::OpenPayment,
        ScheduleMode::OpenInterest,
        ScheduleMode::OpenPrincipal,
    ];

    pub fn columns(&self) -> &'static [Column] {
        match self {
            ScheduleMode::Full => &[
                Column::Payment,
                Column::Interest,
                Column::Principal,
                Column::EndingBalance,
                Column::CumulativePayment,
                Column::CumulativeInterest,
                Column::CumulativePrincipal,
                Column::RemainingPayment,
                Column::RemainingInterest,
                Column::RemainingPrincipal,
            ],
            ScheduleMode::CumulativeInterest => &[Column::CumulativeInterest],
            ScheduleMode::CumulativePayment => &[Column::CumulativePayment],
            ScheduleMode::CumulativePrincipal => &[Column::CumulativePrincipal],
            ScheduleMode::Interest => &[Column::Interest],
            ScheduleMode::Principal => &[Column::Principal],
            ScheduleMode::OpenPayment => &[Column::RemainingPayment],
            ScheduleMode::OpenInterest => &[Column::RemainingInterest],
            ScheduleMode::OpenPrincipal => &[Column::RemainingPrincipal],
        }
    }
}

impl FromStr for ScheduleMode {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "full" => Ok(ScheduleMode::Full),
            "cumipmt" | "cumulativeinterest" => Ok(ScheduleMode::CumulativeInterest),
            "cumpmt" | "cumulativepayment" => Ok(ScheduleMode::CumulativePayment),
            "cumprinc" | "cumulativeprincipal" => Ok(ScheduleMode::CumulativePrincipal),
            "ipmt" | "interest" => Ok(ScheduleMode::Interest),
            "ppmt" | "principal" => Ok(ScheduleMode::Principal),
            "openpmt" | "openpayment" => Ok(ScheduleMode::OpenPayment),
            "openipmt" | "openinterest" => Ok(ScheduleMode::OpenInterest),
            "openppmt" | "openprincipal" => Ok(ScheduleMode::OpenPrincipal),
            _ => Err(LoanError::Config(format!("Unknown schedule mode: {}", s))),
        }
    }
}

impl fmt::Display for ScheduleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
