//! Rate normalization and the stateless loan formulas

mod rate;
mod excel;

pub use rate::PeriodicRate;
pub use excel::{cumipmt, cumprinc, fv, ipmt, pmt, ppmt, pv};
pub(crate) use excel::{check_range, payment};
