//! Loan terms and payment conventions

mod data;

pub use data::{integral_value, Frequency, LoanTerms, PaymentTiming, RateMethod};
