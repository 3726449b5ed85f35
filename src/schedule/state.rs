//! Running state threaded through the forward amortization pass

use crate::formulas::PeriodicRate;
use crate::loan::{LoanTerms, PaymentTiming};

/// Amounts booked in one period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodFlows {
    pub period: u32,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
}

/// State of a loan between periods
#[derive(Debug, Clone)]
pub struct AmortizationState {
    /// Last period processed (0 before the first payment)
    pub period: u32,

    /// Outstanding balance right after the last payment, in present-value sign
    pub balance: f64,

    pub cumulative_payment: f64,
    pub cumulative_interest: f64,
    pub cumulative_principal: f64,
}

impl AmortizationState {
    pub fn from_terms(terms: &LoanTerms) -> Self {
        Self {
            period: 0,
            balance: terms.present_value,
            cumulative_payment: 0.0,
            cumulative_interest: 0.0,
            cumulative_principal: 0.0,
        }
    }

    /// Book the next period's payment.
    ///
    /// Interest is accrued on the balance left by the previous payment; an
    /// annuity-due loan accrues nothing before its first payment.
    pub fn advance(&mut self, rate: PeriodicRate, payment: f64, timing: PaymentTiming) -> PeriodFlows {
        self.period += 1;

        let interest = if timing.is_beginning() && self.period == 1 {
            0.0
        } else {
            -self.balance * rate.value()
        };
        let principal = payment - interest;

        // Payments are negative, so a negative principal shrinks a positive balance
        self.balance += principal;
        self.cumulative_payment += payment;
        self.cumulative_interest += interest;
        self.cumulative_principal += principal;

        PeriodFlows {
            period: self.period,
            payment,
            interest,
            principal,
        }
    }

    /// Balance at the close of the last period processed.
    ///
    /// Payments made at period end leave `balance` as the closing balance. An
    /// annuity-due payment opens the period, so the balance still accrues one
    /// period of interest before the period closes.
    pub fn closing_balance(&self, rate: PeriodicRate, timing: PaymentTiming) -> f64 {
        if timing.is_beginning() {
            self.balance * (1.0 + rate.value())
        } else {
            self.balance
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_end_of_period() {
        let terms = LoanTerms::new(0.12, 12, 1000.0).unwrap();
        let rate = PeriodicRate::new(0.01).unwrap();
        let mut state = AmortizationState::from_terms(&terms);

        let flows = state.advance(rate, -100.0, PaymentTiming::EndOfPeriod);
        assert_eq!(flows.period, 1);
        assert_eq!(flows.interest, -10.0);
        assert_eq!(flows.principal, -90.0);
        assert_eq!(state.balance, 910.0);
        assert_eq!(state.cumulative_payment, -100.0);
    }

    #[test]
    fn test_advance_annuity_due_first_period() {
        let terms = LoanTerms::new(0.12, 12, 1000.0).unwrap();
        let rate = PeriodicRate::new(0.01).unwrap();
        let mut state = AmortizationState::from_terms(&terms);

        let first = state.advance(rate, -100.0, PaymentTiming::BeginningOfPeriod);
        assert_eq!(first.interest, 0.0);
        assert_eq!(first.principal, -100.0);

        let second = state.advance(rate, -100.0, PaymentTiming::BeginningOfPeriod);
        assert_eq!(second.interest, -9.0);
        assert_eq!(state.cumulative_interest, -9.0);
        assert_eq!(state.balance, 809.0);
        assert_eq!(state.closing_balance(rate, PaymentTiming::BeginningOfPeriod), 817.09);
        assert_eq!(state.closing_balance(rate, PaymentTiming::EndOfPeriod), 809.0);
    }
}
