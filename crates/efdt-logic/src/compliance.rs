//! Regulatory compliance checks against named green-building frameworks.
//!
//! Each framework defines four pass/fail criteria over averages of the
//! top-ranked sites. The pass rate maps to a letter grade.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, ConfigKind};
use crate::site::{top_sites, Site, TOP_N};

/// Supported compliance frameworks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceFramework {
    IndianGreenBuilding,
    LeedIndia,
    IndiaNetZero2070,
}

impl ComplianceFramework {
    pub const ALL: [Self; 3] = [
        Self::IndianGreenBuilding,
        Self::LeedIndia,
        Self::IndiaNetZero2070,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::IndianGreenBuilding => "Indian Green Building",
            Self::LeedIndia => "LEED India",
            Self::IndiaNetZero2070 => "India Net Zero 2070",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, AnalysisError> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| AnalysisError::UnknownConfigValue {
                kind: ConfigKind::ComplianceFramework,
                value: name.to_string(),
            })
    }

    /// Evaluate this framework's four criteria, in declaration order.
    pub fn evaluate(self, avg: &SiteAverages) -> Vec<CriterionOutcome> {
        let checks: [(&'static str, bool); 4] = match self {
            Self::IndianGreenBuilding => [
                ("Carbon Reduction >20%", avg.carbon > 1000.0),
                ("Biodiversity Protection", avg.biodiversity > 5.0),
                ("Brownfield Priority", avg.brownfield_count >= 3),
                ("Flood Risk <0.3", avg.flood_risk < 0.3),
            ],
            Self::LeedIndia => [
                ("Energy Savings >30%", avg.carbon > 1500.0),
                ("Green Space >20%", avg.tree_coverage > 20.0),
                ("Air Quality Good", avg.air_quality_index < 100.0),
                ("Public Transport <15min", avg.walk_time < 15.0),
            ],
            Self::IndiaNetZero2070 => [
                ("Emissions Reduction >25%", avg.carbon > 1200.0),
                ("Green Jobs Created", avg.total_jobs > 500),
                ("Supply Chain Resilient", avg.supply_chain_risk < 0.25),
                ("Public Health Improved", avg.air_quality_index < 110.0),
            ],
        };
        checks
            .into_iter()
            .map(|(name, passed)| CriterionOutcome {
                name: name.to_string(),
                passed,
            })
            .collect()
    }
}

impl std::fmt::Display for ComplianceFramework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Averages (and a few totals) over the top-ranked sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteAverages {
    pub carbon: f64,
    pub biodiversity: f64,
    pub brownfield_count: usize,
    pub flood_risk: f64,
    pub tree_coverage: f64,
    pub air_quality_index: f64,
    pub walk_time: f64,
    pub total_jobs: u64,
    pub supply_chain_risk: f64,
}

impl SiteAverages {
    pub fn of_top_sites(sites: &[Site]) -> Result<Self, AnalysisError> {
        let top = top_sites(sites)?;
        let n = TOP_N as f64;
        let avg = |f: fn(&Site) -> f64| top.iter().map(f).sum::<f64>() / n;

        Ok(Self {
            carbon: avg(|s| s.carbon_reduction_potential as f64),
            biodiversity: avg(|s| s.biodiversity_score),
            brownfield_count: top.iter().filter(|s| s.brownfield_available).count(),
            flood_risk: avg(|s| s.flood_risk),
            tree_coverage: avg(|s| s.tree_coverage_pct),
            air_quality_index: avg(|s| s.air_quality_index as f64),
            walk_time: avg(|s| s.walk_time_to_park_minutes as f64),
            total_jobs: top.iter().map(|s| s.job_creation_potential as u64).sum(),
            supply_chain_risk: avg(|s| s.supply_chain_risk),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionOutcome {
    pub name: String,
    pub passed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceGrade {
    A,
    B,
    C,
}

impl ComplianceGrade {
    /// A at 85% and above, B at 70% and above, otherwise C.
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 85.0 {
            Self::A
        } else if rate >= 70.0 {
            Self::B
        } else {
            Self::C
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceResult {
    pub framework: ComplianceFramework,
    pub criteria: Vec<CriterionOutcome>,
    /// Percentage of criteria passed.
    pub rate: f64,
    pub grade: ComplianceGrade,
}

impl ComplianceResult {
    pub fn passed_count(&self) -> usize {
        self.criteria.iter().filter(|c| c.passed).count()
    }
}

pub fn check_compliance(
    sites: &[Site],
    framework: ComplianceFramework,
) -> Result<ComplianceResult, AnalysisError> {
    let averages = SiteAverages::of_top_sites(sites)?;
    let criteria = framework.evaluate(&averages);
    let passed = criteria.iter().filter(|c| c.passed).count();
    let rate = passed as f64 / criteria.len() as f64 * 100.0;

    Ok(ComplianceResult {
        framework,
        criteria,
        rate,
        grade: ComplianceGrade::from_rate(rate),
    })
}
