//! Excel-compatible time-value-of-money functions
//!
//! Cash-flow sign convention matches Excel: money paid out is negative, so a
//! positive present value (a loan received) yields negative payments.
//! Every function takes a rate that is already per period.

use super::rate::PeriodicRate;
use crate::error::{LoanError, Result};
use crate::loan::PaymentTiming;

/// Periodic payment: PMT(rate, nper, pv, fv, type)
pub fn pmt(rate: f64, nper: u32, pv: f64, fv: f64, timing: PaymentTiming) -> Result<f64> {
    let rate = PeriodicRate::new(rate)?;
    check_nper(nper)?;
    check_finite("pv", pv)?;
    check_finite("fv", fv)?;
    Ok(payment(rate, nper, pv, fv, timing))
}

/// Interest portion of the payment in period `per`: IPMT(rate, per, nper, pv, fv, type)
pub fn ipmt(rate: f64, per: i64, nper: u32, pv: f64, fv: f64, timing: PaymentTiming) -> Result<f64> {
    let rate = PeriodicRate::new(rate)?;
    check_nper(nper)?;
    check_finite("pv", pv)?;
    check_finite("fv", fv)?;
    let per = check_period(per, nper)?;
    let total = payment(rate, nper, pv, fv, timing);
    Ok(interest_portion(rate, per, total, pv, timing))
}

/// Principal portion of the payment in period `per`: PPMT = PMT - IPMT
pub fn ppmt(rate: f64, per: i64, nper: u32, pv: f64, fv: f64, timing: PaymentTiming) -> Result<f64> {
    let rate = PeriodicRate::new(rate)?;
    check_nper(nper)?;
    check_finite("pv", pv)?;
    check_finite("fv", fv)?;
    let per = check_period(per, nper)?;
    let total = payment(rate, nper, pv, fv, timing);
    Ok(total - interest_portion(rate, per, total, pv, timing))
}

/// Present value of an annuity: PV(rate, nper, pmt, fv, type)
pub fn pv(rate: f64, nper: u32, pmt: f64, fv: f64, timing: PaymentTiming) -> Result<f64> {
    let rate = PeriodicRate::new(rate)?;
    check_nper(nper)?;
    check_finite("pmt", pmt)?;
    check_finite("fv", fv)?;

    let r = rate.value();
    let n = nper as f64;
    if rate.is_zero() {
        return Ok(-(pmt * n + fv));
    }
    let annuity = (1.0 + r * timing.flag()) * rate.growth_minus_one(nper) / r;
    Ok(-(fv + pmt * annuity) / rate.growth(nper))
}

/// Future value: FV(rate, nper, pmt, pv, type). `nper` may be 0.
pub fn fv(rate: f64, nper: u32, pmt: f64, pv: f64, timing: PaymentTiming) -> Result<f64> {
    let rate = PeriodicRate::new(rate)?;
    check_finite("pmt", pmt)?;
    check_finite("pv", pv)?;
    Ok(future_value(rate, nper, pmt, pv, timing))
}

/// Interest paid between two periods inclusive: CUMIPMT(rate, nper, pv, start, end, type)
pub fn cumipmt(rate: f64, nper: u32, pv: f64, start: i64, end: i64, timing: PaymentTiming) -> Result<f64> {
    let rate = PeriodicRate::new(rate)?;
    check_nper(nper)?;
    check_finite("pv", pv)?;
    let (start, end) = check_range(start, end, nper)?;
    let total = payment(rate, nper, pv, 0.0, timing);
    Ok((start..=end)
        .map(|per| interest_portion(rate, per, total, pv, timing))
        .sum())
}

/// Principal paid between two periods inclusive: CUMPRINC(rate, nper, pv, start, end, type)
pub fn cumprinc(rate: f64, nper: u32, pv: f64, start: i64, end: i64, timing: PaymentTiming) -> Result<f64> {
    let rate = PeriodicRate::new(rate)?;
    check_nper(nper)?;
    check_finite("pv", pv)?;
    let (start, end) = check_range(start, end, nper)?;
    let total = payment(rate, nper, pv, 0.0, timing);
    Ok((start..=end)
        .map(|per| total - interest_portion(rate, per, total, pv, timing))
        .sum())
}

/// PMT on validated inputs
pub(crate) fn payment(rate: PeriodicRate, nper: u32, pv: f64, fv: f64, timing: PaymentTiming) -> f64 {
    let r = rate.value();
    if rate.is_zero() {
        return -(pv + fv) / nper as f64;
    }
    -(pv * rate.growth(nper) + fv) * r / rate.growth_minus_one(nper) / (1.0 + r * timing.flag())
}

/// FV on validated inputs
pub(crate) fn future_value(rate: PeriodicRate, nper: u32, pmt: f64, pv: f64, timing: PaymentTiming) -> f64 {
    let r = rate.value();
    if rate.is_zero() {
        return -(pv + pmt * nper as f64);
    }
    let annuity = (1.0 + r * timing.flag()) * rate.growth_minus_one(nper) / r;
    -(pv * rate.growth(nper) + pmt * annuity)
}

/// IPMT via the closed-form balance before period `per`
fn interest_portion(rate: PeriodicRate, per: u32, total: f64, pv: f64, timing: PaymentTiming) -> f64 {
    // Nothing has accrued when the first payment is made up front
    if timing.is_beginning() && per == 1 {
        return 0.0;
    }
    let balance_before = future_value(rate, per - 1, total, pv, timing);
    let interest = balance_before * rate.value();
    if timing.is_beginning() {
        interest / (1.0 + rate.value())
    } else {
        interest
    }
}

fn check_nper(nper: u32) -> Result<()> {
    if nper == 0 {
        return Err(LoanError::invalid_terms("nper must be at least 1"));
    }
    Ok(())
}

fn check_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(LoanError::non_numeric(field, value))
    }
}

pub(crate) fn check_period(per: i64, nper: u32) -> Result<u32> {
    if per < 1 || per > nper as i64 {
        return Err(LoanError::InvalidPeriod { period: per, periods_total: nper });
    }
    Ok(per as u32)
}

pub(crate) fn check_range(start: i64, end: i64, nper: u32) -> Result<(u32, u32)> {
    if start < 1 || end < start || end > nper as i64 {
        return Err(LoanError::InvalidPeriodRange { start, end, periods_total: nper });
    }
    Ok((start as u32, end as u32))
}
