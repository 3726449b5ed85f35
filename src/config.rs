//! Run-wide configuration shared by every loan in a batch

use crate::error::{LoanError, Result};
use crate::loan::{Frequency, LoanTerms, PaymentTiming, RateMethod};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Conventions applied uniformly to a run.
///
/// Passed by value into every computation; nothing is process-global, so a
/// single config can be shared across rayon workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Payment frequency (default: monthly)
    #[serde(default)]
    pub frequency: Frequency,

    /// Interest calculation method (default: compound)
    #[serde(default)]
    pub rate_method: RateMethod,

    /// Payment timing (default: end of period)
    #[serde(default)]
    pub timing: PaymentTiming,

    /// What the boundary does with a row that fails
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Stamp this run's conventions onto one loan's raw inputs
    pub fn loan_terms(
        &self,
        annual_rate: f64,
        periods_total: i64,
        present_value: f64,
        future_value: f64,
    ) -> Result<LoanTerms> {
        Ok(LoanTerms::new(annual_rate, periods_total, present_value)?
            .with_future_value(future_value)
            .with_timing(self.timing)
            .with_frequency(self.frequency)
            .with_rate_method(self.rate_method))
    }
}

/// Batch-level recovery when a single loan or row fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// First failing row fails the whole run
    #[default]
    Abort,
    /// Failing rows are logged and left out of the output
    SkipRow,
}

impl FromStr for FailurePolicy {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "skip" | "skiprow" => Ok(FailurePolicy::SkipRow),
            other => Err(LoanError::Config(format!("Unknown failure policy: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_json_overrides() {
        let config = EngineConfig::from_json_str(
            r#"{"frequency": "Quarterly", "rate_method": "Simple", "timing": "BeginningOfPeriod", "failure_policy": "SkipRow"}"#,
        )
        .unwrap();
        assert_eq!(config.frequency, Frequency::Quarterly);
        assert_eq!(config.rate_method, RateMethod::Simple);
        assert_eq!(config.timing, PaymentTiming::BeginningOfPeriod);
        assert_eq!(config.failure_policy, FailurePolicy::SkipRow);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"frequency": "Weekly"}"#),
            Err(LoanError::Config(_))
        ));
    }

    #[test]
    fn test_loan_terms_inherit_conventions() {
        let config = EngineConfig {
            frequency: Frequency::Annual,
            rate_method: RateMethod::Simple,
            timing: PaymentTiming::BeginningOfPeriod,
            failure_policy: FailurePolicy::Abort,
        };
        let terms = config.loan_terms(0.06, 10, 5000.0, 100.0).unwrap();
        assert_eq!(terms.frequency, Frequency::Annual);
        assert_eq!(terms.rate_method, RateMethod::Simple);
        assert!(terms.timing.is_beginning());
        assert_eq!(terms.future_value, 100.0);
    }
}
