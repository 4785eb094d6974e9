//! Candidate site generation and suitability scoring.
//!
//! Sites are synthetic: every attribute is drawn from a [`SeededSequence`]
//! seeded from the city name, so the same `(city, threshold, seed)` always
//! yields the same list, scores included.
//!
//! ```
//! use efdt_logic::cities::city_by_name;
//! use efdt_logic::digest::seed_for;
//! use efdt_logic::site::{generate_sites, SITES_PER_RUN};
//!
//! let city = city_by_name("Pune").unwrap();
//! let sites = generate_sites(city, 15, seed_for(city.name));
//! assert_eq!(sites.len(), SITES_PER_RUN);
//! assert!(sites[0].suitability_score >= sites[1].suitability_score);
//! ```

use serde::{Deserialize, Serialize};

use crate::cities::City;
use crate::error::AnalysisError;
use crate::sequence::SeededSequence;

/// Number of sites produced by every generation run.
pub const SITES_PER_RUN: usize = 15;

/// Number of highest-ranked sites the metric calculators aggregate over.
pub const TOP_N: usize = 5;

/// Household income band of the area around a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomeLevel {
    Low,
    Medium,
    High,
}

impl IncomeLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Equity weighting added to the impact score.
    pub fn equity_bonus(self) -> f64 {
        match self {
            Self::Low => 6.0,
            Self::Medium => 2.0,
            Self::High => 0.0,
        }
    }
}

/// A generated candidate development site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub site_id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub population: u32,
    pub income_level: IncomeLevel,
    pub housing_demand: u32,
    pub walk_time_to_park_minutes: u32,
    pub brownfield_available: bool,
    /// In `[0.05, 0.35)`.
    pub flood_risk: f64,
    pub air_quality_index: u32,
    pub tree_coverage_pct: f64,
    pub biodiversity_score: f64,
    /// Tonnes of CO2 per year.
    pub carbon_reduction_potential: u32,
    pub job_creation_potential: u32,
    /// In `[0.1, 0.4)`.
    pub supply_chain_risk: f64,
    /// In `[0.05, 0.35)`.
    pub gentrification_risk: f64,
    pub suitability_score: f64,
}

// ============================================================================
// SCORING
// ============================================================================

/// Positive contributions: green-space gap, housing need, equity, air
/// quality, supply resilience and jobs.
pub fn impact_score(site: &Site, green_threshold_minutes: u32) -> f64 {
    let green_gap = if site.walk_time_to_park_minutes > green_threshold_minutes {
        5.0
    } else {
        0.0
    };
    let poor_air = if site.air_quality_index > 100 { 0.3 } else { 0.0 };

    green_gap
        + site.housing_demand as f64 * 0.5
        + site.walk_time_to_park_minutes as f64 * 0.1
        + site.income_level.equity_bonus()
        + poor_air
        + (1.0 - site.supply_chain_risk) * 2.0
        + site.job_creation_potential as f64 * 0.01
}

/// Penalties: flooding, lack of brownfield land, displacement and supply
/// exposure.
pub fn risk_score(site: &Site) -> f64 {
    let greenfield_penalty = if site.brownfield_available { 0.0 } else { 5.0 };

    site.flood_risk * 100.0
        + greenfield_penalty
        + site.gentrification_risk * 50.0
        + site.supply_chain_risk * 30.0
}

pub fn suitability_score(site: &Site, green_threshold_minutes: u32) -> f64 {
    impact_score(site, green_threshold_minutes) - risk_score(site)
}

// ============================================================================
// GENERATION
// ============================================================================

/// Site identifier: the city's first three letters, uppercased, plus a
/// zero-padded 1-based index (`MUM-001`).
pub fn site_id(city_name: &str, index: usize) -> String {
    let prefix: String = city_name.chars().take(3).collect::<String>().to_uppercase();
    format!("{}-{:03}", prefix, index + 1)
}

fn draw_income_level(seq: &mut SeededSequence) -> IncomeLevel {
    // The second draw is only consumed when the first misses the Low band.
    if (seq.next_draw() * 10.0).floor() < 4.0 {
        IncomeLevel::Low
    } else if (seq.next_draw() * 10.0).floor() < 8.0 {
        IncomeLevel::Medium
    } else {
        IncomeLevel::High
    }
}

fn draw_int(seq: &mut SeededSequence, base: f64, span: f64) -> u32 {
    (base + seq.next_draw() * span).floor() as u32
}

fn draw_site(city: &City, index: usize, seq: &mut SeededSequence) -> Site {
    let lat_offset = (seq.next_draw() - 0.5) * 0.1;
    let lon_offset = (seq.next_draw() - 0.5) * 0.16;
    let income_level = draw_income_level(seq);

    // Field order is the draw order.
    Site {
        site_id: site_id(city.name, index),
        name: format!("{} Site {}", city.name, index + 1),
        latitude: city.latitude + lat_offset,
        longitude: city.longitude + lon_offset,
        population: draw_int(seq, 5000.0, 45000.0),
        income_level,
        housing_demand: draw_int(seq, 100.0, 900.0),
        walk_time_to_park_minutes: draw_int(seq, 5.0, 30.0),
        brownfield_available: seq.next_draw() > 0.4,
        flood_risk: 0.05 + seq.next_draw() * 0.3,
        air_quality_index: draw_int(seq, 30.0, 120.0),
        tree_coverage_pct: 10.0 + seq.next_draw() * 35.0,
        biodiversity_score: 3.0 + seq.next_draw() * 6.0,
        carbon_reduction_potential: draw_int(seq, 1000.0, 4000.0),
        job_creation_potential: draw_int(seq, 50.0, 450.0),
        supply_chain_risk: 0.1 + seq.next_draw() * 0.3,
        gentrification_risk: 0.05 + seq.next_draw() * 0.3,
        suitability_score: 0.0,
    }
}

/// Generate [`SITES_PER_RUN`] sites around `city`, ranked by suitability.
pub fn generate_sites(city: &City, green_threshold_minutes: u32, seed: u32) -> Vec<Site> {
    let mut seq = SeededSequence::new(seed);
    let sites = (0..SITES_PER_RUN)
        .map(|i| {
            let mut site = draw_site(city, i, &mut seq);
            site.suitability_score = suitability_score(&site, green_threshold_minutes);
            log::debug!(
                "{} income={} walk={}min flood={:.3} score={:.2}",
                site.site_id,
                site.income_level.label(),
                site.walk_time_to_park_minutes,
                site.flood_risk,
                site.suitability_score
            );
            site
        })
        .collect();
    rank_sites(sites)
}

/// Sort by suitability, highest first. Stable: equal scores keep their
/// generation order.
pub fn rank_sites(mut sites: Vec<Site>) -> Vec<Site> {
    sites.sort_by(|a, b| b.suitability_score.total_cmp(&a.suitability_score));
    sites
}

/// The first [`TOP_N`] sites of a ranked list.
pub fn top_sites(sites: &[Site]) -> Result<&[Site], AnalysisError> {
    if sites.len() < TOP_N {
        return Err(AnalysisError::InsufficientSites {
            required: TOP_N,
            found: sites.len(),
        });
    }
    Ok(&sites[..TOP_N])
}


#[cfg(test)]
mod tests {
    use super::fixtures::site;
    use super::*;
    use crate::cities::{city_by_name, CITIES};
    use crate::digest::seed_for;

    fn mumbai_sites(threshold: u32) -> Vec<Site> {
        let city = city_by_name("Mumbai").unwrap();
        generate_sites(city, threshold, seed_for(city.name))
    }

    #[test]
    fn test_generates_fifteen_sites() {
        assert_eq!(mumbai_sites(15).len(), SITES_PER_RUN);
    }

    #[test]
    fn test_site_ids_unique_and_formatted() {
        let sites = mumbai_sites(15);
        let mut ids: Vec<_> = sites.iter().map(|s| s.site_id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), SITES_PER_RUN);
        assert!(ids.contains(&"MUM-001".to_string()));
        assert!(ids.contains(&"MUM-015".to_string()));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(mumbai_sites(20), mumbai_sites(20));
    }

    #[test]
    fn test_sorted_descending() {
        for city in CITIES {
            let sites = generate_sites(city, 10, seed_for(city.name));
            for pair in sites.windows(2) {
                assert!(pair[0].suitability_score >= pair[1].suitability_score);
            }
        }
    }

    #[test]
    fn test_first_generated_site_attributes() {
        // Mumbai's stream starts 0.29098.., 0.62370.., 0.25554..
        let sites = mumbai_sites(15);
        let first = sites.iter().find(|s| s.site_id == "MUM-001").unwrap();
        assert!((first.latitude - (19.076 + (0.2909807956104252 - 0.5) * 0.1)).abs() < 1e-12);
        assert!((first.longitude - (72.8777 + (0.6237011316872428 - 0.5) * 0.16)).abs() < 1e-12);
        // floor(0.2555 * 10) = 2 < 4 → Low, one draw consumed
        assert_eq!(first.income_level, IncomeLevel::Low);
        // floor(5000 + 0.05380.. * 45000)
        assert_eq!(first.population, 7421);
        assert_eq!(first.name, "Mumbai Site 1");
    }

    #[test]
    fn test_attribute_ranges() {
        for city in CITIES {
            for s in generate_sites(city, 15, seed_for(city.name)) {
                assert!((0.05..0.35).contains(&s.flood_risk));
                assert!((0.1..0.4).contains(&s.supply_chain_risk));
                assert!((0.05..0.35).contains(&s.gentrification_risk));
                assert!((5000..50_000).contains(&s.population));
                assert!((100..1000).contains(&s.housing_demand));
                assert!((5..35).contains(&s.walk_time_to_park_minutes));
                assert!((30..150).contains(&s.air_quality_index));
                assert!((1000..5000).contains(&s.carbon_reduction_potential));
                assert!((50..500).contains(&s.job_creation_potential));
                assert!((s.latitude - city.latitude).abs() <= 0.05 + 1e-9);
                assert!((s.longitude - city.longitude).abs() <= 0.08 + 1e-9);
            }
        }
    }

    #[test]
    fn test_threshold_changes_scores_not_attributes() {
        let low = mumbai_sites(0);
        let high = mumbai_sites(60);
        let find = |sites: &[Site], id: &str| sites.iter().find(|s| s.site_id == id).cloned();
        for s in &low {
            let other = find(&high, &s.site_id).unwrap();
            assert_eq!(s.flood_risk, other.flood_risk);
            // Every walk time is > 0 and < 60, so only the low threshold adds the gap bonus
            assert!((s.suitability_score - other.suitability_score - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_score_formula() {
        let mut s = site("X-001");
        s.walk_time_to_park_minutes = 20;
        s.housing_demand = 400;
        s.income_level = IncomeLevel::Low;
        s.air_quality_index = 120;
        s.supply_chain_risk = 0.25;
        s.job_creation_potential = 300;
        s.flood_risk = 0.2;
        s.brownfield_available = false;
        s.gentrification_risk = 0.1;

        let impact = 5.0 + 200.0 + 2.0 + 6.0 + 0.3 + 1.5 + 3.0;
        let risk = 20.0 + 5.0 + 5.0 + 7.5;
        assert!((impact_score(&s, 15) - impact).abs() < 1e-9);
        assert!((risk_score(&s) - risk).abs() < 1e-9);
        assert!((suitability_score(&s, 15) - (impact - risk)).abs() < 1e-9);
        // At threshold == walk time there is no gap bonus
        assert!((impact_score(&s, 20) - (impact - 5.0)).abs() < 1e-9);
    }

    #[test]
    fn test_rank_is_stable_on_ties() {
        let mut a = site("A");
        let mut b = site("B");
        let mut c = site("C");
        let mut d = site("D");
        a.suitability_score = 10.0;
        b.suitability_score = 50.0;
        c.suitability_score = 10.0;
        d.suitability_score = 50.0;
        let ranked = rank_sites(vec![a, b, c, d]);
        let ids: Vec<_> = ranked.iter().map(|s| s.site_id.as_str()).collect();
        assert_eq!(ids, ["B", "D", "A", "C"]);
    }

    #[test]
    fn test_rank_random_scores() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(42);
        let sites: Vec<Site> = (0..200)
            .map(|i| {
                let mut s = site(&format!("R-{i:03}"));
                // Coarse scores so ties are common
                s.suitability_score = rng.gen_range(-20..20) as f64 * 2.5;
                s
            })
            .collect();
        let ranked = rank_sites(sites.clone());
        assert_eq!(ranked.len(), sites.len());
        for pair in ranked.windows(2) {
            assert!(pair[0].suitability_score >= pair[1].suitability_score);
            if pair[0].suitability_score == pair[1].suitability_score {
                assert!(pair[0].site_id < pair[1].site_id);
            }
        }
    }

    #[test]
    fn test_site_id_format() {
        assert_eq!(site_id("Visakhapatnam", 0), "VIS-001");
        assert_eq!(site_id("Pune", 14), "PUN-015");
    }

    #[test]
    fn test_top_sites_requires_five() {
        let sites = mumbai_sites(15);
        assert_eq!(top_sites(&sites).unwrap().len(), TOP_N);
        assert!(matches!(
            top_sites(&sites[..4]),
            Err(AnalysisError::InsufficientSites { required: 5, found: 4 })
        ));
    }
}
