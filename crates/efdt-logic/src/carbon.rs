//! Carbon credit verification over the top-ranked sites.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::numeric::round_half_up;
use crate::site::{top_sites, Site};

/// Share of modelled reduction that is actually delivered.
pub const EFFICIENCY: f64 = 0.95;
/// Share expected to persist over the crediting period.
pub const PERMANENCE: f64 = 0.90;
/// Share that would not have happened without the project.
pub const ADDITIONALITY: f64 = 0.85;

/// Credit price band, per tonne, in the external market currency.
pub const MIN_PRICE_PER_CREDIT: u64 = 15;
pub const MAX_PRICE_PER_CREDIT: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonAssessment {
    /// Σ carbon reduction potential of the top sites, tonnes.
    pub total_co2: u64,
    pub verified_credits: u64,
    /// Market value range in the external currency.
    pub min_value: u64,
    pub max_value: u64,
    pub efficiency: f64,
    pub permanence: f64,
    pub additionality: f64,
}

/// Credits left after the efficiency, permanence and additionality discounts.
pub fn verified_credits(total_co2: u64) -> u64 {
    round_half_up(total_co2 as f64 * EFFICIENCY * PERMANENCE * ADDITIONALITY) as u64
}

pub fn assess_carbon(sites: &[Site]) -> Result<CarbonAssessment, AnalysisError> {
    let top = top_sites(sites)?;
    let total_co2: u64 = top
        .iter()
        .map(|s| s.carbon_reduction_potential as u64)
        .sum();
    let credits = verified_credits(total_co2);

    Ok(CarbonAssessment {
        total_co2,
        verified_credits: credits,
        min_value: credits * MIN_PRICE_PER_CREDIT,
        max_value: credits * MAX_PRICE_PER_CREDIT,
        efficiency: EFFICIENCY,
        permanence: PERMANENCE,
        additionality: ADDITIONALITY,
    })
}
