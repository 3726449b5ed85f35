//! Loan terms and the enums that configure them

use crate::error::{LoanError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// When each payment falls within its period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentTiming {
    /// Ordinary annuity (Excel `type = 0`)
    #[default]
    EndOfPeriod,
    /// Annuity due (Excel `type = 1`)
    BeginningOfPeriod,
}

impl PaymentTiming {
    /// Excel's `type` argument: 1 for beginning of period, otherwise 0
    pub fn flag(&self) -> f64 {
        match self {
            PaymentTiming::EndOfPeriod => 0.0,
            PaymentTiming::BeginningOfPeriod => 1.0,
        }
    }

    pub fn is_beginning(&self) -> bool {
        matches!(self, PaymentTiming::BeginningOfPeriod)
    }
}

impl FromStr for PaymentTiming {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "end" | "endofperiod" | "0" => Ok(PaymentTiming::EndOfPeriod),
            "begin" | "beginning" | "beginningofperiod" | "1" => Ok(PaymentTiming::BeginningOfPeriod),
            other => Err(LoanError::Config(format!("Unknown payment timing: {}", other))),
        }
    }
}

/// Payments per year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Frequency {
    #[default]
    Monthly,
    Quarterly,
    Annual,
}

impl Frequency {
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
            Frequency::Annual => 1,
        }
    }

    /// Only 12, 4 and 1 payments per year are supported
    pub fn from_periods_per_year(periods: u32) -> Result<Self> {
        match periods {
            12 => Ok(Frequency::Monthly),
            4 => Ok(Frequency::Quarterly),
            1 => Ok(Frequency::Annual),
            other => Err(LoanError::invalid_terms(format!(
                "frequency must be one of 12, 4 or 1 payments per year, got {}",
                other
            ))),
        }
    }
}

impl FromStr for Frequency {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "monthly" => Ok(Frequency::Monthly),
            "quarterly" => Ok(Frequency::Quarterly),
            "annual" | "annually" | "yearly" => Ok(Frequency::Annual),
            other => match other.parse::<u32>() {
                Ok(n) => Frequency::from_periods_per_year(n),
                Err(_) => Err(LoanError::Config(format!("Unknown frequency: {}", other))),
            },
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Monthly => "Monthly",
            Frequency::Quarterly => "Quarterly",
            Frequency::Annual => "Annual",
        };
        f.write_str(name)
    }
}

/// How an annual rate is turned into a per-period rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RateMethod {
    /// Annual rate divided by the frequency
    Simple,
    /// Effective periodic rate, `(1 + annual)^(1/frequency) - 1`
    #[default]
    Compound,
}

impl FromStr for RateMethod {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "simple" => Ok(RateMethod::Simple),
            "compound" => Ok(RateMethod::Compound),
            other => Err(LoanError::Config(format!("Unknown rate method: {}", other))),
        }
    }
}

/// Immutable description of one loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Annual nominal rate as a decimal (0.05 for 5%); may be zero or negative
    pub annual_rate: f64,

    /// Number of payment periods, at least 1
    pub periods_total: u32,

    /// Amount borrowed (positive for a loan received)
    pub present_value: f64,

    /// Balance left after the final payment (usually 0)
    #[serde(default)]
    pub future_value: f64,

    #[serde(default)]
    pub timing: PaymentTiming,

    #[serde(default)]
    pub frequency: Frequency,

    #[serde(default)]
    pub rate_method: RateMethod,
}

impl LoanTerms {
    /// Build terms with the default (monthly, compound, end-of-period)
    /// conventions and zero future value
    pub fn new(annual_rate: f64, periods_total: i64, present_value: f64) -> Result<Self> {
        let periods_total = validate_periods_total(periods_total)?;
        Ok(Self {
            annual_rate,
            periods_total,
            present_value,
            future_value: 0.0,
            timing: PaymentTiming::default(),
            frequency: Frequency::default(),
            rate_method: RateMethod::default(),
        })
    }

    pub fn with_future_value(mut self, future_value: f64) -> Self {
        self.future_value = future_value;
        self
    }

    pub fn with_timing(mut self, timing: PaymentTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_rate_method(mut self, rate_method: RateMethod) -> Self {
        self.rate_method = rate_method;
        self
    }

    /// Re-check invariants on terms built by hand or deserialized
    pub fn validate(&self) -> Result<()> {
        if self.periods_total == 0 {
            return Err(LoanError::invalid_terms("periods_total must be at least 1"));
        }
        Ok(())
    }
}

fn validate_periods_total(periods_total: i64) -> Result<u32> {
    if periods_total < 1 {
        return Err(LoanError::invalid_terms(format!(
            "periods_total must be at least 1, got {}",
            periods_total
        )));
    }
    u32::try_from(periods_total)
        .map_err(|_| LoanError::invalid_terms(format!("periods_total {} is too large", periods_total)))
}

/// Coerce an integral-valued real from the table boundary to an integer.
/// Fractions are truncated toward zero; NaN and infinities are rejected.
pub fn integral_value(field: &str, value: f64) -> Result<i64> {
    if !value.is_finite() {
        return Err(LoanError::non_numeric(field, value));
    }
    Ok(value.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_term() {
        assert!(matches!(
            LoanTerms::new(0.05, 0, 1000.0),
            Err(LoanError::InvalidLoanTerms { .. })
        ));
        assert!(matches!(
            LoanTerms::new(0.05, -12, 1000.0),
            Err(LoanError::InvalidLoanTerms { .. })
        ));
    }

    #[test]
    fn test_defaults_match_configuration_defaults() {
        let terms = LoanTerms::new(0.05, 360, 100_000.0).unwrap();
        assert_eq!(terms.frequency, Frequency::Monthly);
        assert_eq!(terms.rate_method, RateMethod::Compound);
        assert_eq!(terms.timing, PaymentTiming::EndOfPeriod);
        assert_eq!(terms.future_value, 0.0);
    }

    #[test]
    fn test_frequency_parsing() {
        assert_eq!("Quarterly".parse::<Frequency>().unwrap(), Frequency::Quarterly);
        assert_eq!("12".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert!(matches!(
            Frequency::from_periods_per_year(52),
            Err(LoanError::InvalidLoanTerms { .. })
        ));
    }

    #[test]
    fn test_integral_value_truncates() {
        assert_eq!(integral_value("nper", 360.0).unwrap(), 360);
        assert_eq!(integral_value("nper", 12.9).unwrap(), 12);
        assert!(matches!(
            integral_value("nper", f64::NAN),
            Err(LoanError::NonNumericInput { .. })
        ));
    }
}
