//! Equity and social impact summary of the top-ranked sites.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::numeric::mean;
use crate::site::{top_sites, IncomeLevel, Site, TOP_N};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GentrificationStatus {
    Low,
    Medium,
    High,
}

impl GentrificationStatus {
    /// Low below 0.2, Medium below 0.3, otherwise High.
    pub fn from_risk(avg_risk: f64) -> Self {
        if avg_risk < 0.2 {
            Self::Low
        } else if avg_risk < 0.3 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactSummary {
    pub low_income_sites: usize,
    /// Percent of top sites in low-income areas.
    pub low_income_share: f64,
    pub avg_gentrification_risk: f64,
    pub gentrification_status: GentrificationStatus,
    /// Top sites farther from a park than the threshold.
    pub green_gaps: usize,
    pub residents_served: u64,
    pub total_jobs: u64,
    pub avg_suitability_score: f64,
}

pub fn summarize_impact(
    sites: &[Site],
    green_threshold_minutes: u32,
) -> Result<ImpactSummary, AnalysisError> {
    let top = top_sites(sites)?;
    let low_income_sites = top
        .iter()
        .filter(|s| s.income_level == IncomeLevel::Low)
        .count();
    let avg_gentrification_risk = mean(top.iter().map(|s| s.gentrification_risk));

    Ok(ImpactSummary {
        low_income_sites,
        low_income_share: low_income_sites as f64 / TOP_N as f64 * 100.0,
        avg_gentrification_risk,
        gentrification_status: GentrificationStatus::from_risk(avg_gentrification_risk),
        green_gaps: top
            .iter()
            .filter(|s| s.walk_time_to_park_minutes > green_threshold_minutes)
            .count(),
        residents_served: top.iter().map(|s| s.population as u64).sum(),
        total_jobs: top.iter().map(|s| s.job_creation_potential as u64).sum(),
        avg_suitability_score: mean(top.iter().map(|s| s.suitability_score)),
    })
}
