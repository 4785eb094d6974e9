//! Per-site community engagement scoring.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::numeric::round1;
use crate::site::{top_sites, Site};

/// Walk time at which accessibility bottoms out.
const MAX_WALK_MINUTES: f64 = 30.0;

/// Component scores in `[0, 100]`, one decimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementScore {
    pub site_id: String,
    pub accessibility: f64,
    pub health_benefit: f64,
    pub transparency: f64,
    pub local_jobs: f64,
    /// Mean of the four unrounded components.
    pub overall: f64,
}

pub fn score_engagement(site: &Site) -> EngagementScore {
    let accessibility =
        (100.0 - site.walk_time_to_park_minutes as f64 / MAX_WALK_MINUTES * 100.0).max(0.0);
    let health_benefit = (100.0 - site.air_quality_index as f64 / 1.5).max(0.0);
    let transparency = ((1.0 - site.gentrification_risk) * 100.0).clamp(0.0, 100.0);
    let local_jobs = (site.job_creation_potential as f64 / 2.0).min(100.0);
    let overall = (accessibility + health_benefit + transparency + local_jobs) / 4.0;

    EngagementScore {
        site_id: site.site_id.clone(),
        accessibility: round1(accessibility),
        health_benefit: round1(health_benefit),
        transparency: round1(transparency),
        local_jobs: round1(local_jobs),
        overall: round1(overall),
    }
}

/// Engagement for each of the top-ranked sites, in rank order.
pub fn score_top_sites(sites: &[Site]) -> Result<Vec<EngagementScore>, AnalysisError> {
    Ok(top_sites(sites)?.iter().map(score_engagement).collect())
}
