//! Batch runner for many independent loans
//!
//! Holds the run-wide configuration once and maps loans across rayon
//! workers. Each loan's rate, payment and running balance stay local to its
//! own computation, so no coordination is needed between workers.

use crate::config::{EngineConfig, FailurePolicy};
use crate::error::Result;
use crate::loan::LoanTerms;
use crate::schedule::{Schedule, ScheduleEngine, ScheduleMode};
use log::{info, warn};
use rayon::prelude::*;

/// Pre-configured runner for batch computations
///
/// # Example
/// ```ignore
/// let runner = BatchRunner::new(EngineConfig::default());
/// let loans = vec![runner.terms(0.05, 360, 100_000.0, 0.0)?];
/// let schedules = runner.run_schedules(&loans, ScheduleMode::Full, None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BatchRunner {
    config: EngineConfig,
}

impl BatchRunner {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build one loan's terms under this run's conventions
    pub fn terms(&self, annual_rate: f64, periods_total: i64, present_value: f64, future_value: f64) -> Result<LoanTerms> {
        self.config
            .loan_terms(annual_rate, periods_total, present_value, future_value)
    }

    /// Map every input in parallel, keeping input order
    pub fn map_rows<I, T, F>(&self, inputs: &[I], f: F) -> Vec<Result<T>>
    where
        I: Sync,
        T: Send,
        F: Fn(&I) -> Result<T> + Sync + Send,
    {
        inputs.par_iter().map(f).collect()
    }

    /// Run schedules for many loans; `window` restricts the emitted periods
    pub fn run_schedules(
        &self,
        loans: &[LoanTerms],
        mode: ScheduleMode,
        window: Option<(i64, i64)>,
    ) -> Vec<Result<Schedule>> {
        info!("Running {} schedules for {} loans", mode, loans.len());
        self.map_rows(loans, |terms| {
            let engine = ScheduleEngine::new(terms.clone())?;
            match window {
                Some((from, to)) => engine.schedule_window(mode, from, to),
                None => engine.schedule(mode),
            }
        })
    }

    /// Apply the configured failure policy to per-row results.
    ///
    /// Returns the surviving `(row index, value)` pairs, or the first error
    /// when the policy is [`FailurePolicy::Abort`].
    pub fn resolve<T>(&self, results: Vec<Result<T>>) -> Result<Vec<(usize, T)>> {
        let total = results.len();
        let mut kept = Vec::with_capacity(total);

        for (row, result) in results.into_iter().enumerate() {
            match result {
                Ok(value) => kept.push((row, value)),
                Err(e) => match self.config.failure_policy {
                    FailurePolicy::Abort => return Err(e),
                    FailurePolicy::SkipRow => warn!("Skipping row {}: {}", row + 1, e),
                },
            }
        }

        if kept.len() < total {
            info!("{} of {} rows skipped", total - kept.len(), total);
        }
        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoanError;
    use crate::loan::RateMethod;

    fn loans(runner: &BatchRunner) -> Vec<LoanTerms> {
        [(0.05, 360, 100_000.0), (0.03, 120, 20_000.0), (0.0, 12, 1200.0)]
            .iter()
            .map(|&(rate, nper, pv)| runner.terms(rate, nper, pv, 0.0).unwrap())
            .collect()
    }

    #[test]
    fn test_batch_preserves_order_and_independence() {
        let runner = BatchRunner::new(EngineConfig {
            rate_method: RateMethod::Simple,
            ..Default::default()
        });
        let loans = loans(&runner);
        let results = runner.run_schedules(&loans, ScheduleMode::Full, None);

        assert_eq!(results.len(), 3);
        let lengths: Vec<usize> = results.iter().map(|r| r.as_ref().unwrap().len()).collect();
        assert_eq!(lengths, vec![360, 120, 12]);

        // Same loan alone gives the same schedule as inside the batch
        let alone = ScheduleEngine::new(loans[1].clone()).unwrap().schedule(ScheduleMode::Full).unwrap();
        assert_eq!(alone.records, results[1].as_ref().unwrap().records);
    }

    #[test]
    fn test_window_applies_to_every_loan() {
        let runner = BatchRunner::default();
        let loans = loans(&runner);
        let results = runner.run_schedules(&loans, ScheduleMode::Interest, Some((1, 12)));
        assert!(results.iter().all(|r| r.as_ref().unwrap().len() == 12));

        let results = runner.run_schedules(&loans, ScheduleMode::Interest, Some((1, 24)));
        assert!(matches!(results[2], Err(LoanError::InvalidPeriodRange { .. })));
    }

    #[test]
    fn test_resolve_abort_returns_first_error() {
        let runner = BatchRunner::default();
        let results: Vec<Result<u32>> = vec![
            Ok(1),
            Err(LoanError::invalid_terms("bad")),
            Err(LoanError::non_numeric("rate", "x")),
        ];
        assert!(matches!(runner.resolve(results), Err(LoanError::InvalidLoanTerms { .. })));
    }

    #[test]
    fn test_resolve_skip_drops_failures() {
        let runner = BatchRunner::new(EngineConfig {
            failure_policy: FailurePolicy::SkipRow,
            ..Default::default()
        });
        let results: Vec<Result<u32>> = vec![Ok(1), Err(LoanError::invalid_terms("bad")), Ok(3)];
        assert_eq!(runner.resolve(results).unwrap(), vec![(0, 1), (2, 3)]);
    }
}
