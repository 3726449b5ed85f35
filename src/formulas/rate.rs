//! Annual to periodic rate conversion

use crate::error::{LoanError, Result};
use crate::loan::{Frequency, LoanTerms, RateMethod};

/// Interest rate for one payment period.
///
/// Computed once per loan and reused for every period so all rows of a
/// schedule see the identical value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicRate(f64);

impl PeriodicRate {
    /// Convert an annual rate:
    /// - Simple: `annual / frequency`
    /// - Compound: `(1 + annual)^(1/frequency) - 1`
    pub fn from_annual(annual_rate: f64, frequency: Frequency, method: RateMethod) -> Result<Self> {
        if !annual_rate.is_finite() {
            return Err(LoanError::non_numeric("annual_rate", annual_rate));
        }

        let periods = frequency.periods_per_year() as f64;
        let rate = match method {
            RateMethod::Simple => annual_rate / periods,
            RateMethod::Compound => {
                if annual_rate <= -1.0 {
                    return Err(LoanError::invalid_terms(format!(
                        "compound annual rate must exceed -100%, got {}",
                        annual_rate
                    )));
                }
                (annual_rate.ln_1p() / periods).exp_m1()
            }
        };

        Self::new(rate)
    }

    pub fn for_terms(terms: &LoanTerms) -> Result<Self> {
        Self::from_annual(terms.annual_rate, terms.frequency, terms.rate_method)
    }

    /// Wrap an already-periodic rate (the Excel-style functions take one directly)
    pub fn new(rate: f64) -> Result<Self> {
        if !rate.is_finite() {
            return Err(LoanError::non_numeric("rate", rate));
        }
        if rate <= -1.0 {
            return Err(LoanError::invalid_terms(format!(
                "periodic rate must exceed -100%, got {}",
                rate
            )));
        }
        Ok(Self(rate))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// `(1 + rate)^periods`
    pub fn growth(&self, periods: u32) -> f64 {
        (periods as f64 * self.0.ln_1p()).exp()
    }

    /// `(1 + rate)^periods - 1`, accurate for rates near zero
    pub fn growth_minus_one(&self, periods: u32) -> f64 {
        (periods as f64 * self.0.ln_1p()).exp_m1()
    }
}
