//! Analysis session: runs the pipeline and owns the audit log.
//!
//! A session is the unit of state. It holds the audit log, which grows
//! across every run made through it, and the injected insight provider.
//! Callers serialize runs per session; nothing here locks.
//!
//! ```
//! use efdt_logic::config::AnalysisConfig;
//! use efdt_logic::session::AnalysisSession;
//!
//! let mut session = AnalysisSession::new();
//! let report = session.run_analysis(&AnalysisConfig::default()).unwrap();
//! assert_eq!(report.sites.len(), 15);
//! assert_eq!(session.audit_log().len(), 5);
//! assert!(session.verify_audit().is_ok());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::audit::{AuditLog, TamperDetected};
use crate::carbon::{assess_carbon, CarbonAssessment};
use crate::cities::City;
use crate::climate::{assess_climate, ClimateAssessment};
use crate::compliance::{check_compliance, ComplianceResult};
use crate::config::{resolve_config, AnalysisConfig, ResolvedConfig};
use crate::digest::seed_for;
use crate::engagement::{score_top_sites, EngagementScore};
use crate::error::AnalysisError;
use crate::export::group_thousands;
use crate::financial::{project_financials, FinancialProjection};
use crate::impact::{summarize_impact, ImpactSummary};
use crate::insight::{audit_excerpt, InsightProvider, InsightSummary, NoInsight};
use crate::numeric::round_half_up;
use crate::sdg::{assess_sdg, SdgAlignment};
use crate::site::{generate_sites, top_sites, Site, TOP_N};

// Milestone actions, in the order a run appends them.
pub const ANALYSIS_STARTED: &str = "Analysis Started";
pub const TOP_SITES_IDENTIFIED: &str = "Top Sites Identified";
pub const CARBON_VERIFIED: &str = "Carbon Credits Verified";
pub const COMPLIANCE_CHECKED: &str = "Compliance Check";
pub const CLIMATE_TESTED: &str = "Climate Resilience Tested";
pub const INSIGHTS_GENERATED: &str = "AI Insights Generated";

/// Cooperative cancellation flag shared between a run and its caller.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), AnalysisError> {
        if self.is_cancelled() {
            log::warn!("analysis cancelled; recorded milestones are kept");
            Err(AnalysisError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Everything one run produced. Read-only for consumers.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub city: City,
    pub green_threshold_minutes: u32,
    pub project_type: String,
    /// All generated sites, best first.
    pub sites: Vec<Site>,
    pub carbon: CarbonAssessment,
    pub compliance: ComplianceResult,
    pub climate: ClimateAssessment,
    pub financial: FinancialProjection,
    pub sdg: SdgAlignment,
    /// Per top site, in rank order.
    pub engagement: Vec<EngagementScore>,
    pub impact: ImpactSummary,
    pub insight: Option<String>,
}

impl AnalysisReport {
    /// The [`TOP_N`] sites every aggregate was computed from.
    ///
    /// A report only exists once [`top_sites`] succeeded on its site list,
    /// so `sites` holds at least `TOP_N` entries.
    pub fn top_sites(&self) -> &[Site] {
        &self.sites[..TOP_N]
    }
}

pub struct AnalysisSession {
    audit: AuditLog,
    insight: Box<dyn InsightProvider>,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisSession {
    /// Session without an insight provider.
    pub fn new() -> Self {
        Self::with_insight_provider(Box::new(NoInsight))
    }

    pub fn with_insight_provider(insight: Box<dyn InsightProvider>) -> Self {
        Self {
            audit: AuditLog::new(),
            insight,
        }
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    pub fn verify_audit(&self) -> Result<(), TamperDetected> {
        self.audit.verify()
    }

    pub fn run_analysis(
        &mut self,
        config: &AnalysisConfig,
    ) -> Result<AnalysisReport, AnalysisError> {
        self.run_analysis_with_cancel(config, &CancellationToken::new())
    }

    /// Run the pipeline, checking `cancel` before each milestone.
    ///
    /// Invalid configuration fails before anything is generated or
    /// recorded. A cancelled run returns [`AnalysisError::Cancelled`] and
    /// leaves the milestones it already appended in the log.
    pub fn run_analysis_with_cancel(
        &mut self,
        config: &AnalysisConfig,
        cancel: &CancellationToken,
    ) -> Result<AnalysisReport, AnalysisError> {
        let resolved = resolve_config(config)?;
        cancel.check()?;

        let city = resolved.city;
        let sites = generate_sites(city, resolved.green_threshold_minutes, seed_for(city.name));
        let impact = summarize_impact(&sites, resolved.green_threshold_minutes)?;
        log::info!(
            "generated {} sites for {} (threshold {} min)",
            sites.len(),
            city.name,
            resolved.green_threshold_minutes
        );

        self.record_started(&resolved);

        cancel.check()?;
        let top_ids: Vec<String> = top_sites(&sites)?
            .iter()
            .map(|s| s.site_id.clone())
            .collect();
        self.audit.append(
            TOP_SITES_IDENTIFIED,
            json!({
                "sites": top_ids,
                "avg_score": format!("{:.2}", impact.avg_suitability_score),
            }),
        );

        cancel.check()?;
        let carbon = assess_carbon(&sites)?;
        let factor = resolved.currency_conversion_factor;
        self.audit.append(
            CARBON_VERIFIED,
            json!({
                "credits": carbon.verified_credits,
                "value_range": format!(
                    "₹{}-₹{}",
                    group_thousands(round_half_up(carbon.min_value as f64 * factor) as u64),
                    group_thousands(round_half_up(carbon.max_value as f64 * factor) as u64),
                ),
            }),
        );

        cancel.check()?;
        let compliance = check_compliance(&sites, resolved.framework)?;
        self.audit.append(
            COMPLIANCE_CHECKED,
            json!({
                "framework": resolved.framework.name(),
                "grade": compliance.grade.label(),
                "rate": format!("{}%", round_half_up(compliance.rate)),
            }),
        );

        cancel.check()?;
        let climate = assess_climate(&sites, resolved.scenario)?;
        self.audit.append(
            CLIMATE_TESTED,
            json!({
                "scenario": resolved.scenario.name(),
                "viability": format!("{}%", climate.avg_viability),
                "recommendation": climate.recommendation.label(),
            }),
        );

        let financial = project_financials(&carbon, factor);
        let sdg = assess_sdg(&sites)?;
        let engagement = score_top_sites(&sites)?;

        cancel.check()?;
        let summary = InsightSummary {
            city: city.name.to_string(),
            top_site_ids: top_ids,
            avg_suitability_score: impact.avg_suitability_score,
            verified_credits: carbon.verified_credits,
            compliance_grade: compliance.grade.label().to_string(),
            compliance_rate: compliance.rate,
            climate_viability: climate.avg_viability,
            roi: financial.roi,
            total_jobs: impact.total_jobs,
        };
        let insight = self.fetch_insight(&summary);
        cancel.check()?;

        Ok(AnalysisReport {
            city: *city,
            green_threshold_minutes: resolved.green_threshold_minutes,
            project_type: resolved.project_type,
            sites,
            carbon,
            compliance,
            climate,
            financial,
            sdg,
            engagement,
            impact,
            insight,
        })
    }

    fn record_started(&mut self, resolved: &ResolvedConfig) {
        self.audit.append(
            ANALYSIS_STARTED,
            json!({
                "city": resolved.city.name,
                "threshold": resolved.green_threshold_minutes,
                "project_type": resolved.project_type,
                "framework": resolved.framework.name(),
                "scenario": resolved.scenario.name(),
            }),
        );
    }

    /// Best effort; records an audit entry only when text comes back.
    fn fetch_insight(&mut self, summary: &InsightSummary) -> Option<String> {
        let provider = self.insight.name().to_string();
        match self.insight.fetch_insight(summary) {
            Some(text) => {
                self.audit.append(
                    INSIGHTS_GENERATED,
                    json!({
                        "provider": provider,
                        "insights": audit_excerpt(&text),
                    }),
                );
                Some(text)
            }
            None => {
                log::warn!("no insight from provider {:?}; continuing without", provider);
                None
            }
        }
    }
}
