//! Climate resilience stress test of the top-ranked sites.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, ConfigKind};
use crate::numeric::{mean, round1};
use crate::site::{top_sites, Site};

/// Warming scenarios the sites are tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClimateScenario {
    Baseline,
    Ipcc1_5,
    Ipcc2,
    Ipcc3,
    Ipcc4Plus,
}

/// Static parameters of a [`ClimateScenario`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenarioInfo {
    pub name: &'static str,
    /// °C above present.
    pub temperature_delta: f64,
    /// Metres above present.
    pub sea_level_delta: f64,
    pub flood_multiplier: f64,
}

impl ClimateScenario {
    pub const ALL: [Self; 5] = [
        Self::Baseline,
        Self::Ipcc1_5,
        Self::Ipcc2,
        Self::Ipcc3,
        Self::Ipcc4Plus,
    ];

    pub fn info(self) -> ScenarioInfo {
        let (name, temperature_delta, sea_level_delta, flood_multiplier) = match self {
            Self::Baseline => ("Baseline", 0.0, 0.0, 1.0),
            Self::Ipcc1_5 => ("IPCC 1.5°C", 1.5, 0.3, 1.2),
            Self::Ipcc2 => ("IPCC 2°C", 2.0, 0.5, 1.5),
            Self::Ipcc3 => ("IPCC 3°C", 3.0, 1.0, 2.0),
            Self::Ipcc4Plus => ("4°C+", 4.0, 1.5, 2.5),
        };
        ScenarioInfo {
            name,
            temperature_delta,
            sea_level_delta,
            flood_multiplier,
        }
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn from_name(name: &str) -> Result<Self, AnalysisError> {
        Self::ALL
            .into_iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| AnalysisError::UnknownConfigValue {
                kind: ConfigKind::ClimateScenario,
                value: name.to_string(),
            })
    }
}

impl std::fmt::Display for ClimateScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Proceed,
    AdaptDesign,
    Reconsider,
}

impl Recommendation {
    /// PROCEED at 90 and above, ADAPT_DESIGN at 70 and above, otherwise
    /// RECONSIDER.
    pub fn from_viability(avg_viability: f64) -> Self {
        if avg_viability >= 90.0 {
            Self::Proceed
        } else if avg_viability >= 70.0 {
            Self::AdaptDesign
        } else {
            Self::Reconsider
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Proceed => "PROCEED",
            Self::AdaptDesign => "ADAPT_DESIGN",
            Self::Reconsider => "RECONSIDER",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateAssessment {
    pub scenario: ClimateScenario,
    /// Per top site, in rank order, unrounded.
    pub viability_scores: Vec<f64>,
    /// Mean viability rounded to one decimal.
    pub avg_viability: f64,
    pub recommendation: Recommendation,
    pub temperature_rise: f64,
    pub sea_level_rise: f64,
}

/// Viability of one site under a scenario, floored at zero.
pub fn site_viability(site: &Site, scenario: &ScenarioInfo) -> f64 {
    let adjusted_flood = site.flood_risk * scenario.flood_multiplier;
    let heat_impact = scenario.temperature_delta * 5.0;
    (100.0 - adjusted_flood * 100.0 - heat_impact).max(0.0)
}

pub fn assess_climate(
    sites: &[Site],
    scenario: ClimateScenario,
) -> Result<ClimateAssessment, AnalysisError> {
    let info = scenario.info();
    let viability_scores: Vec<f64> = top_sites(sites)?
        .iter()
        .map(|s| site_viability(s, &info))
        .collect();
    let avg = mean(viability_scores.iter().copied());

    Ok(ClimateAssessment {
        scenario,
        viability_scores,
        avg_viability: round1(avg),
        // Decided on the unrounded mean
        recommendation: Recommendation::from_viability(avg),
        temperature_rise: info.temperature_delta,
        sea_level_rise: info.sea_level_delta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::fixtures::top5;

    #[test]
    fn test_recommendation_thresholds() {
        assert_eq!(Recommendation::from_viability(90.0), Recommendation::Proceed);
        assert_eq!(Recommendation::from_viability(70.0), Recommendation::AdaptDesign);
        assert_eq!(Recommendation::from_viability(50.0), Recommendation::Reconsider);
        assert_eq!(Recommendation::from_viability(89.99), Recommendation::AdaptDesign);
        assert_eq!(Recommendation::from_viability(69.99), Recommendation::Reconsider);
    }

    #[test]
    fn test_baseline_viability_is_inverse_flood() {
        let sites = top5(|_, s| s.flood_risk = 0.1);
        let climate = assess_climate(&sites, ClimateScenario::Baseline).unwrap();
        assert!((climate.avg_viability - 90.0).abs() < 1e-9);
        assert_eq!(climate.recommendation, Recommendation::Proceed);
        assert_eq!(climate.viability_scores.len(), 5);
        assert_eq!(climate.temperature_rise, 0.0);
    }

    #[test]
    fn test_scenario_tiers_from_fixture() {
        // flood 0.2 under IPCC 2°C: 100 - 30 - 10 = 60 → RECONSIDER
        let sites = top5(|_, s| s.flood_risk = 0.2);
        let climate = assess_climate(&sites, ClimateScenario::Ipcc2).unwrap();
        assert!((climate.avg_viability - 60.0).abs() < 1e-9);
        assert_eq!(climate.recommendation, Recommendation::Reconsider);

        // flood 0.2 under 1.5°C: 100 - 24 - 7.5 = 68.5 → RECONSIDER
        let climate = assess_climate(&sites, ClimateScenario::Ipcc1_5).unwrap();
        assert!((climate.avg_viability - 68.5).abs() < 1e-9);

        // flood 0.2 at baseline: 80 → ADAPT_DESIGN
        let climate = assess_climate(&sites, ClimateScenario::Baseline).unwrap();
        assert_eq!(climate.recommendation, Recommendation::AdaptDesign);
    }

    #[test]
    fn test_viability_floored_at_zero() {
        let mut site = crate::site::fixtures::site("X");
        site.flood_risk = 0.34;
        let info = ScenarioInfo {
            name: "extreme",
            temperature_delta: 20.0,
            sea_level_delta: 0.0,
            flood_multiplier: 3.0,
        };
        assert_eq!(site_viability(&site, &info), 0.0);
    }

    #[test]
    fn test_harsher_scenarios_never_improve_viability() {
        let sites = top5(|i, s| s.flood_risk = 0.05 + 0.06 * i as f64);
        let scores: Vec<f64> = ClimateScenario::ALL
            .iter()
            .map(|sc| assess_climate(&sites, *sc).unwrap().avg_viability)
            .collect();
        for pair in scores.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn test_scenario_lookup() {
        assert_eq!(ClimateScenario::from_name("Baseline").unwrap(), ClimateScenario::Baseline);
        assert_eq!(ClimateScenario::from_name("4°C+").unwrap(), ClimateScenario::Ipcc4Plus);
        assert!(matches!(
            ClimateScenario::from_name("IPCC 5°C"),
            Err(AnalysisError::UnknownConfigValue {
                kind: ConfigKind::ClimateScenario,
                ..
            })
        ));
    }

    #[test]
    fn test_recommendation_serializes_screaming_snake() {
        let json = serde_json::to_string(&Recommendation::AdaptDesign).unwrap();
        assert_eq!(json, "\"ADAPT_DESIGN\"");
    }
}
