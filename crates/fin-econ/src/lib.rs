#![deny(warnings)]

//! Capital-budgeting metric calculators for Finopoly.
//!
//! This module provides validated helpers for:
//! - Present value and net present value of a level annuity
//! - A simplified linear IRR approximation
//! - Payback period and profitability index
//!
//! Monetary inputs are `Decimal`; results are `f64` since they only feed
//! display and scoring, never cash balances.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

/// Discount rate applied to all project cash flows.
pub const DISCOUNT_RATE: f64 = 0.10;

/// Errors produced by metric calculators.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetricError {
    /// Payback period is undefined for a project with no cash flow.
    #[error("annual cash flow is zero")]
    ZeroCashFlow,
    /// IRR and profitability index are undefined for a free project.
    #[error("project cost is zero")]
    ZeroCost,
    /// Numeric conversion to floating point failed.
    #[error("non-finite numeric conversion")]
    NonFinite,
}

/// Present value of `years` annual payments of `cash_flow`, discounted at
/// `rate`, first payment one year out.
///
/// PV = Σ_{t=1..years} cf / (1+rate)^t. Zero years yields zero.
pub fn present_value(cash_flow: Decimal, years: u32, rate: f64) -> Result<f64, MetricError> {
    let cf = cash_flow.to_f64().ok_or(MetricError::NonFinite)?;
    let mut pv = 0.0;
    for t in 1..=years {
        pv += cf / (1.0 + rate).powi(t as i32);
    }
    if !pv.is_finite() {
        return Err(MetricError::NonFinite);
    }
    Ok(pv)
}

/// Net present value: `-cost` plus the present value of the inflows.
pub fn npv(cost: Decimal, cash_flow: Decimal, life: u32, rate: f64) -> Result<f64, MetricError> {
    let c = cost.to_f64().ok_or(MetricError::NonFinite)?;
    Ok(present_value(cash_flow, life, rate)? - c)
}

/// Linear IRR approximation: `(cf * life - cost) / (cost * life)`.
///
/// This is the game's stated simplification, not a true root-finding IRR,
/// and is kept as documented behavior.
pub fn irr_approx(cost: Decimal, cash_flow: Decimal, life: u32) -> Result<f64, MetricError> {
    if cost == Decimal::ZERO || life == 0 {
        return Err(MetricError::ZeroCost);
    }
    let c = cost.to_f64().ok_or(MetricError::NonFinite)?;
    let cf = cash_flow.to_f64().ok_or(MetricError::NonFinite)?;
    let life = life as f64;
    Ok((cf * life - c) / (c * life))
}

/// Payback period in years: `cost / cash_flow`.
pub fn payback_period(cost: Decimal, cash_flow: Decimal) -> Result<f64, MetricError> {
    if cash_flow == Decimal::ZERO {
        return Err(MetricError::ZeroCashFlow);
    }
    let c = cost.to_f64().ok_or(MetricError::NonFinite)?;
    let cf = cash_flow.to_f64().ok_or(MetricError::NonFinite)?;
    Ok(c / cf)
}

/// Profitability index: PV(inflows) / cost. Values above 1.0 indicate a
/// positive-NPV project.
pub fn profitability_index(
    cost: Decimal,
    cash_flow: Decimal,
    life: u32,
    rate: f64,
) -> Result<f64, MetricError> {
    if cost == Decimal::ZERO {
        return Err(MetricError::ZeroCost);
    }
    let c = cost.to_f64().ok_or(MetricError::NonFinite)?;
    Ok(present_value(cash_flow, life, rate)? / c)
}
