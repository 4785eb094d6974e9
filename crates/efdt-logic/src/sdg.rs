//! Alignment of the top-ranked sites with six UN Sustainable Development Goals.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::numeric::{mean, round1};
use crate::site::{top_sites, Site};

/// Average carbon potential (t/yr) that maps to a full clean-energy score.
const CLEAN_ENERGY_DIVISOR: f64 = 30.0;
/// Average carbon potential (t/yr) that maps to a full climate-action score.
const CLIMATE_ACTION_DIVISOR: f64 = 25.0;
const DECENT_WORK_DIVISOR: f64 = 2.0;

/// Scores in `[0, 100]`, one decimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdgAlignment {
    /// SDG 3: Good Health.
    pub good_health: f64,
    /// SDG 7: Clean Energy.
    pub clean_energy: f64,
    /// SDG 8: Decent Work.
    pub decent_work: f64,
    /// SDG 11: Sustainable Cities.
    pub sustainable_cities: f64,
    /// SDG 13: Climate Action.
    pub climate_action: f64,
    /// SDG 15: Life on Land.
    pub life_on_land: f64,
}

impl SdgAlignment {
    /// Labelled scores in goal order.
    pub fn entries(&self) -> [(&'static str, f64); 6] {
        [
            ("SDG 3: Good Health", self.good_health),
            ("SDG 7: Clean Energy", self.clean_energy),
            ("SDG 8: Decent Work", self.decent_work),
            ("SDG 11: Sustainable Cities", self.sustainable_cities),
            ("SDG 13: Climate Action", self.climate_action),
            ("SDG 15: Life on Land", self.life_on_land),
        ]
    }
}

fn score(raw: f64) -> f64 {
    round1(raw.clamp(0.0, 100.0))
}

pub fn assess_sdg(sites: &[Site]) -> Result<SdgAlignment, AnalysisError> {
    let top = top_sites(sites)?;
    let avg_carbon = mean(top.iter().map(|s| s.carbon_reduction_potential as f64));
    let avg_jobs = mean(top.iter().map(|s| s.job_creation_potential as f64));

    Ok(SdgAlignment {
        good_health: score(mean(
            top.iter()
                .map(|s| (100.0 - s.air_quality_index as f64 / 1.5).max(0.0)),
        )),
        clean_energy: score(avg_carbon / CLEAN_ENERGY_DIVISOR),
        decent_work: score(avg_jobs / DECENT_WORK_DIVISOR),
        sustainable_cities: score(mean(
            top.iter()
                .map(|s| (100.0 - s.walk_time_to_park_minutes as f64 * 3.0).max(0.0)),
        )),
        climate_action: score(avg_carbon / CLIMATE_ACTION_DIVISOR),
        life_on_land: score(mean(top.iter().map(|s| s.biodiversity_score * 10.0))),
    })
}
