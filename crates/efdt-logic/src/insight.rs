//! Optional narrative insight about a finished analysis.
//!
//! Insight text comes from an injected [`InsightProvider`]. The pipeline
//! never depends on it: a provider that fails returns `None` and the run
//! carries on without an insight entry.

use serde::{Deserialize, Serialize};

/// UTF-16 code units of insight text kept in the audit payload.
pub const AUDIT_EXCERPT_CHARS: usize = 200;

/// Figures handed to an insight provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightSummary {
    pub city: String,
    pub top_site_ids: Vec<String>,
    pub avg_suitability_score: f64,
    pub verified_credits: u64,
    pub compliance_grade: String,
    pub compliance_rate: f64,
    pub climate_viability: f64,
    pub roi: f64,
    pub total_jobs: u64,
}

impl InsightSummary {
    /// Request text for a language-model backed provider.
    pub fn prompt(&self) -> String {
        format!(
            "Analyze this sustainable urban development project for {city}:\n\n\
             Top 5 Sites: {sites}\n\
             Average Suitability Score: {score:.2}\n\
             Carbon Credits: {credits} tons\n\
             Compliance Grade: {grade} ({rate:.0}%)\n\
             Climate Viability: {viability}%\n\
             ROI: {roi}%\n\
             Jobs Created: {jobs}\n\n\
             Provide 3 key insights and 2 recommendations in a concise format (max 150 words).",
            city = self.city,
            sites = self.top_site_ids.join(", "),
            score = self.avg_suitability_score,
            credits = self.verified_credits,
            grade = self.compliance_grade,
            rate = self.compliance_rate,
            viability = self.climate_viability,
            roi = self.roi,
            jobs = self.total_jobs,
        )
    }
}

/// A source of insight text.
///
/// Implementations swallow their own failures (logging them) and return
/// `None`.
pub trait InsightProvider {
    /// Short provider name recorded in the audit log.
    fn name(&self) -> &str;

    fn fetch_insight(&self, summary: &InsightSummary) -> Option<String>;
}

/// Provider that never has anything to say.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInsight;

impl InsightProvider for NoInsight {
    fn name(&self) -> &str {
        "none"
    }

    fn fetch_insight(&self, _summary: &InsightSummary) -> Option<String> {
        None
    }
}

/// Leading [`AUDIT_EXCERPT_CHARS`] UTF-16 code units followed by `...`.
///
/// A character that would straddle the limit is left out whole.
pub fn audit_excerpt(insight: &str) -> String {
    let mut units = 0;
    let head: String = insight
        .chars()
        .take_while(|c| {
            units += c.len_utf16();
            units <= AUDIT_EXCERPT_CHARS
        })
        .collect();
    format!("{head}...")
}
