//! Five-year financial projection, including carbon credit revenue.
//!
//! Monetary amounts are in the local currency; carbon market values are
//! converted with the configured factor.

use serde::{Deserialize, Serialize};

use crate::carbon::CarbonAssessment;
use crate::numeric::round_half_up;

pub const INITIAL_COST: u64 = 10_000_000;
pub const GREEN_GRANTS: u64 = 2_500_000;
pub const ANNUAL_BENEFITS: u64 = 2_000_000;
/// Horizon of the return-on-investment figure.
pub const PROJECTION_YEARS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialProjection {
    pub initial_cost: u64,
    pub green_grants: u64,
    pub net_cost: u64,
    pub annual_benefits: u64,
    pub carbon_revenue: u64,
    pub total_annual: u64,
    /// Percent, one decimal.
    pub roi: f64,
    /// Years, one decimal.
    pub payback_period: f64,
}

pub fn project_financials(
    carbon: &CarbonAssessment,
    currency_conversion_factor: f64,
) -> FinancialProjection {
    let net_cost = INITIAL_COST - GREEN_GRANTS;
    let mid_value = (carbon.min_value + carbon.max_value) as f64 / 2.0;
    let carbon_revenue = round_half_up(mid_value * currency_conversion_factor).max(0.0) as u64;
    let total_annual = ANNUAL_BENEFITS + carbon_revenue;

    let net = net_cost as f64;
    let total = total_annual as f64;
    let roi = round_half_up((total * PROJECTION_YEARS as f64 - net) / net * 100.0 * 10.0) / 10.0;
    let payback_period = round_half_up(net / total * 10.0) / 10.0;

    FinancialProjection {
        initial_cost: INITIAL_COST,
        green_grants: GREEN_GRANTS,
        net_cost,
        annual_benefits: ANNUAL_BENEFITS,
        carbon_revenue,
        total_annual,
        roi,
        payback_period,
    }
}
