//! Forward amortization pass shared by every schedule mode

use super::mode::ScheduleMode;
use super::records::{PaymentRecord, Schedule, ScheduleTotals};
use super::state::{AmortizationState, PeriodFlows};
use crate::error::{LoanError, Result};
use crate::formulas::{self, PeriodicRate};
use crate::loan::LoanTerms;
use log::debug;

/// Largest final-period residual absorbed by the balance clamp, per unit of
/// loan size and compound growth. Anything larger is reported as
/// [`LoanError::BalanceDrift`].
pub const CLAMP_TOLERANCE: f64 = 1e-9;

/// Generates schedules for one loan.
///
/// The periodic rate and the payment are computed once at construction and
/// reused for every period, so all records carry bit-identical payments.
#[derive(Debug, Clone)]
pub struct ScheduleEngine {
    terms: LoanTerms,
    rate: PeriodicRate,
    payment: f64,
}

impl ScheduleEngine {
    pub fn new(terms: LoanTerms) -> Result<Self> {
        terms.validate()?;
        if !terms.present_value.is_finite() {
            return Err(LoanError::non_numeric("present_value", terms.present_value));
        }
        if !terms.future_value.is_finite() {
            return Err(LoanError::non_numeric("future_value", terms.future_value));
        }

        let rate = PeriodicRate::for_terms(&terms)?;
        let payment = formulas::payment(
            rate,
            terms.periods_total,
            terms.present_value,
            terms.future_value,
            terms.timing,
        );

        Ok(Self { terms, rate, payment })
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    pub fn rate(&self) -> PeriodicRate {
        self.rate
    }

    pub fn payment(&self) -> f64 {
        self.payment
    }

    /// Schedule over the full term `[1, periods_total]`
    pub fn schedule(&self, mode: ScheduleMode) -> Result<Schedule> {
        self.schedule_window(mode, 1, self.terms.periods_total as i64)
    }

    /// Schedule emitting only periods `from..=to`. Running totals still
    /// accumulate from period 1.
    ///
    /// The term is walked twice: once for the whole-term totals the
    /// outstanding columns need, then again up to `to` keeping only the
    /// emitted records.
    pub fn schedule_window(&self, mode: ScheduleMode, from: i64, to: i64) -> Result<Schedule> {
        let (from, to) = formulas::check_range(from, to, self.terms.periods_total)?;

        let totals = self.walk(self.terms.periods_total, |_, _, _| {})?;

        let emitted = (to - from + 1) as usize;
        let mut records: Vec<PaymentRecord> = Vec::new();
        records.try_reserve_exact(emitted).map_err(|_| {
            LoanError::invalid_terms(format!("{} schedule periods do not fit in memory", emitted))
        })?;

        self.walk(to, |flows, state, closing_balance| {
            if flows.period < from {
                return;
            }
            records.push(PaymentRecord {
                period: flows.period,
                payment: flows.payment,
                interest: flows.interest,
                principal: flows.principal,
                ending_balance: closing_balance,
                cumulative_payment: state.cumulative_payment,
                cumulative_interest: state.cumulative_interest,
                cumulative_principal: state.cumulative_principal,
                remaining_payment: totals.payment - state.cumulative_payment,
                remaining_interest: totals.interest - state.cumulative_interest,
                remaining_principal: totals.principal - state.cumulative_principal,
            });
        })?;

        debug!(
            "{} schedule: rate={:.10} payment={:.6} periods {}..={} of {}",
            mode,
            self.rate.value(),
            self.payment,
            from,
            to,
            self.terms.periods_total
        );

        Ok(Schedule {
            mode,
            periods_total: self.terms.periods_total,
            periodic_rate: self.rate.value(),
            payment: self.payment,
            totals,
            records,
        })
    }

    /// Balance the final period must close on: exactly `-fv`
    pub fn terminal_balance(&self) -> f64 {
        // 0.0 - fv keeps a zero target at +0.0
        0.0 - self.terms.future_value
    }

    /// Residual the final-period clamp may absorb
    pub fn clamp_tolerance(&self) -> f64 {
        let size = self
            .terms
            .present_value
            .abs()
            .max(self.terms.future_value.abs())
            .max(1.0);
        let growth = self.rate.growth(self.terms.periods_total).max(1.0);
        CLAMP_TOLERANCE * size * growth
    }

    /// Single forward pass over periods `1..=last`, handing each period's
    /// flows, running state and closing balance to `visit`. Returns the
    /// running totals after `last`.
    fn walk<F>(&self, last: u32, mut visit: F) -> Result<ScheduleTotals>
    where
        F: FnMut(&PeriodFlows, &AmortizationState, f64),
    {
        let timing = self.terms.timing;
        let mut state = AmortizationState::from_terms(&self.terms);

        for _ in 1..=last {
            let flows = state.advance(self.rate, self.payment, timing);
            let mut closing_balance = state.closing_balance(self.rate, timing);

            if flows.period == self.terms.periods_total {
                closing_balance = self.clamp_final_balance(state.period, closing_balance)?;
            }

            visit(&flows, &state, closing_balance);
        }

        Ok(ScheduleTotals {
            payment: state.cumulative_payment,
            interest: state.cumulative_interest,
            principal: state.cumulative_principal,
        })
    }

    fn clamp_final_balance(&self, period: u32, closing_balance: f64) -> Result<f64> {
        let target = self.terminal_balance();
        let residual = closing_balance - target;
        let tolerance = self.clamp_tolerance();
        if !(residual.abs() <= tolerance) {
            return Err(LoanError::BalanceDrift {
                period,
                residual,
                tolerance,
            });
        }
        Ok(target)
    }
}

/// Build the engine for `terms` and emit the full-term schedule
pub fn generate_schedule(terms: &LoanTerms, mode: ScheduleMode) -> Result<Schedule> {
    ScheduleEngine::new(terms.clone())?.schedule(mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::{Frequency, PaymentTiming, RateMethod};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn mortgage() -> LoanTerms {
        LoanTerms::new(0.05, 360, 100_000.0)
            .unwrap()
            .with_rate_method(RateMethod::Simple)
    }

    #[test]
    fn test_full_schedule_length_and_numbering() {
        let schedule = generate_schedule(&mortgage(), ScheduleMode::Full).unwrap();
        assert_eq!(schedule.len(), 360);
        for (i, record) in schedule.records.iter().enumerate() {
            assert_eq!(record.period, i as u32 + 1);
        }
    }

    #[test]
    fn test_payment_identical_on_every_row() {
        let schedule = generate_schedule(&mortgage(), ScheduleMode::Full).unwrap();
        assert_abs_diff_eq!(schedule.payment, -536.82, epsilon = 0.005);
        assert!(schedule.records.iter().all(|r| r.payment == schedule.payment));
    }

    #[test]
    fn test_final_balance_is_exactly_minus_future_value() {
        let schedule = generate_schedule(&mortgage(), ScheduleMode::Full).unwrap();
        assert_eq!(schedule.records.last().unwrap().ending_balance, 0.0);

        let balloon = mortgage().with_future_value(-20_000.0);
        let schedule = generate_schedule(&balloon, ScheduleMode::Full).unwrap();
        assert_eq!(schedule.records.last().unwrap().ending_balance, 20_000.0);

        let due = mortgage().with_timing(PaymentTiming::BeginningOfPeriod);
        let schedule = generate_schedule(&due, ScheduleMode::Full).unwrap();
        assert_eq!(schedule.records.last().unwrap().ending_balance, 0.0);
    }

    #[test]
    fn test_annuity_due_with_future_value_closes_on_minus_fv() {
        let terms = LoanTerms::new(0.12, 12, 10_000.0)
            .unwrap()
            .with_rate_method(RateMethod::Simple)
            .with_timing(PaymentTiming::BeginningOfPeriod)
            .with_future_value(-1_010.0);
        let engine = ScheduleEngine::new(terms).unwrap();
        assert_eq!(engine.terminal_balance(), 1_010.0);

        let schedule = engine.schedule(ScheduleMode::Full).unwrap();
        let records = &schedule.records;
        assert_eq!(records.last().unwrap().ending_balance, 1_010.0);

        // Each period closes one accrual after its opening payment
        for pair in records.windows(2) {
            let expected = pair[0].ending_balance + pair[1].payment;
            assert_relative_eq!(
                pair[1].ending_balance,
                expected * 1.01,
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_tiny_rates_amortize_to_zero() {
        for annual in [1e-12, 1e-10, 1e-9, 1e-7] {
            for nper in [12, 360, 1200] {
                for timing in [PaymentTiming::EndOfPeriod, PaymentTiming::BeginningOfPeriod] {
                    let terms = LoanTerms::new(annual, nper, 100_000.0)
                        .unwrap()
                        .with_rate_method(RateMethod::Simple)
                        .with_timing(timing);
                    let schedule = generate_schedule(&terms, ScheduleMode::Full).unwrap();

                    let (n, r) = (nper as f64, annual / 12.0);
                    let mut expected = -100_000.0 / n * (1.0 + r * (n + 1.0) / 2.0);
                    if timing.is_beginning() {
                        expected /= 1.0 + r;
                    }
                    assert_relative_eq!(schedule.payment, expected, max_relative = 1e-9);
                    assert_eq!(schedule.records.last().unwrap().ending_balance, 0.0);
                    assert_relative_eq!(schedule.totals.principal, -100_000.0, max_relative = 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_window_on_long_term_keeps_only_emitted_rows() {
        let terms = LoanTerms::new(1e-6, 1_000_000, 250_000.0)
            .unwrap()
            .with_rate_method(RateMethod::Simple);
        let engine = ScheduleEngine::new(terms).unwrap();
        let window = engine.schedule_window(ScheduleMode::OpenPrincipal, 500_000, 500_002).unwrap();

        assert_eq!(window.len(), 3);
        assert_eq!(window.records[0].period, 500_000);
        assert_relative_eq!(window.totals.principal, -250_000.0, max_relative = 1e-9);
        let last = window.records.last().unwrap();
        assert_relative_eq!(
            last.remaining_principal,
            window.totals.principal - last.cumulative_principal,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_interest_matches_closed_form_each_period() {
        for timing in [PaymentTiming::EndOfPeriod, PaymentTiming::BeginningOfPeriod] {
            let terms = mortgage().with_timing(timing);
            let schedule = generate_schedule(&terms, ScheduleMode::Full).unwrap();
            let rate = schedule.periodic_rate;
            for record in &schedule.records {
                let expected = formulas::ipmt(rate, record.period as i64, 360, 100_000.0, 0.0, timing).unwrap();
                assert_relative_eq!(record.interest, expected, max_relative = 1e-9, epsilon = 1e-9);
                assert_relative_eq!(
                    record.principal,
                    record.payment - record.interest,
                    max_relative = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_cumulative_interest_matches_cumipmt() {
        for timing in [PaymentTiming::EndOfPeriod, PaymentTiming::BeginningOfPeriod] {
            let terms = mortgage().with_timing(timing);
            let schedule = generate_schedule(&terms, ScheduleMode::CumulativeInterest).unwrap();
            let rate = schedule.periodic_rate;

            let column_sum: f64 = schedule.records.iter().map(|r| r.interest).sum();
            let expected = formulas::cumipmt(rate, 360, 100_000.0, 1, 360, timing).unwrap();
            assert_relative_eq!(column_sum, expected, max_relative = 1e-9);
            assert_relative_eq!(
                schedule.records.last().unwrap().cumulative_interest,
                expected,
                max_relative = 1e-9
            );

            let principal = formulas::cumprinc(rate, 360, 100_000.0, 1, 360, timing).unwrap();
            assert_relative_eq!(schedule.totals.principal, principal, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_zero_rate_is_linear() {
        let terms = LoanTerms::new(0.0, 12, 1200.0).unwrap();
        let schedule = generate_schedule(&terms, ScheduleMode::Full).unwrap();
        assert_eq!(schedule.payment, -100.0);
        for record in &schedule.records {
            assert_eq!(record.interest, 0.0);
            assert_eq!(record.principal, -100.0);
            assert_eq!(record.ending_balance, 1200.0 - 100.0 * record.period as f64);
        }
        assert_eq!(schedule.totals.interest, 0.0);
    }

    #[test]
    fn test_open_balances_count_down_to_zero() {
        let schedule = generate_schedule(&mortgage(), ScheduleMode::Full).unwrap();
        let last = schedule.records.last().unwrap();
        assert_eq!(last.remaining_payment, 0.0);
        assert_eq!(last.remaining_interest, 0.0);
        assert_eq!(last.remaining_principal, 0.0);

        let rate = schedule.periodic_rate;
        let timing = PaymentTiming::EndOfPeriod;
        let p = 120;
        let record = &schedule.records[p - 1];
        let rest = formulas::cumipmt(rate, 360, 100_000.0, p as i64 + 1, 360, timing).unwrap();
        assert_relative_eq!(record.remaining_interest, rest, max_relative = 1e-9);
        assert_relative_eq!(
            record.remaining_payment,
            schedule.payment * (360 - p) as f64,
            max_relative = 1e-9
        );
        // Remaining principal is the outstanding balance, as an outflow
        assert_relative_eq!(record.remaining_principal, -record.ending_balance, max_relative = 1e-9);
    }

    #[test]
    fn test_window_keeps_running_totals_from_period_one() {
        let terms = LoanTerms::new(0.09, 360, 125_000.0)
            .unwrap()
            .with_rate_method(RateMethod::Simple);
        let engine = ScheduleEngine::new(terms).unwrap();
        let window = engine.schedule_window(ScheduleMode::CumulativeInterest, 13, 24).unwrap();

        assert_eq!(window.len(), 12);
        assert_eq!(window.records[0].period, 13);
        assert_eq!(window.records[11].period, 24);

        let full = engine.schedule(ScheduleMode::CumulativeInterest).unwrap();
        let second_year = window.records[11].cumulative_interest - full.records[11].cumulative_interest;
        assert_abs_diff_eq!(second_year, -11_135.23, epsilon = 0.005);
        assert_abs_diff_eq!(window.summary().window_interest, -11_135.23, epsilon = 0.005);
    }

    #[test]
    fn test_large_residual_is_drift_not_clamped() {
        let mut engine = ScheduleEngine::new(mortgage()).unwrap();
        assert!(engine.clamp_tolerance() >= CLAMP_TOLERANCE * 100_000.0);

        engine.payment -= 0.01;
        match engine.schedule(ScheduleMode::Full) {
            Err(LoanError::BalanceDrift { period, residual, tolerance }) => {
                assert_eq!(period, 360);
                assert!(residual.abs() > tolerance);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_window_validation() {
        let engine = ScheduleEngine::new(mortgage()).unwrap();
        for (from, to) in [(0, 10), (10, 9), (1, 361), (-5, 5)] {
            assert!(matches!(
                engine.schedule_window(ScheduleMode::Full, from, to),
                Err(LoanError::InvalidPeriodRange { .. })
            ));
        }
    }

    #[test]
    fn test_invalid_terms() {
        let mut terms = mortgage();
        terms.periods_total = 0;
        assert!(matches!(
            ScheduleEngine::new(terms),
            Err(LoanError::InvalidLoanTerms { .. })
        ));

        let mut terms = mortgage();
        terms.present_value = f64::NAN;
        assert!(matches!(
            ScheduleEngine::new(terms),
            Err(LoanError::NonNumericInput { .. })
        ));
    }

    #[test]
    fn test_quarterly_compound_loan() {
        let terms = LoanTerms::new(0.08, 20, 50_000.0)
            .unwrap()
            .with_frequency(Frequency::Quarterly)
            .with_rate_method(RateMethod::Compound);
        let schedule = generate_schedule(&terms, ScheduleMode::Full).unwrap();
        assert_relative_eq!((1.0 + schedule.periodic_rate).powi(4), 1.08, max_relative = 1e-12);
        assert_eq!(schedule.records.last().unwrap().ending_balance, 0.0);
        assert_relative_eq!(schedule.totals.principal, -50_000.0, max_relative = 1e-9);
    }

    #[test]
    fn test_projection_uses_mode_columns() {
        let schedule = generate_schedule(&mortgage(), ScheduleMode::OpenInterest).unwrap();
        let rows = schedule.projected_rows();
        assert_eq!(rows.len(), 360);
        assert_eq!(rows[0].0, 1);
        assert_eq!(rows[0].1, vec![schedule.records[0].remaining_interest]);
    }
}
