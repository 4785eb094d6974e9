//! Export artifacts and currency display formatting.
//!
//! Exports are built in memory; writing them out is the caller's job.

use thiserror::Error;

use crate::audit::AuditLog;
use crate::error::{AnalysisError, ConfigKind};
use crate::numeric::round_half_up;
use crate::session::AnalysisReport;
use crate::site::Site;

pub const CSV_HEADER: &str = "Site ID,Name,Income Level,Suitability Score,CO2 Reduction,Jobs Created,Flood Risk,Gentrification Risk";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Site table.
    Csv,
    /// Audit log dump.
    Json,
    /// Report document. Not available yet.
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [Self::Csv, Self::Json, Self::Pdf];

    pub fn name(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Pdf => "pdf",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Result<Self, AnalysisError> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| AnalysisError::UnknownConfigValue {
                kind: ConfigKind::ExportFormat,
                value: name.to_string(),
            })
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{0} export is not yet available")]
    NotYetAvailable(ExportFormat),

    #[error("failed to serialize export: {0}")]
    Json(#[from] serde_json::Error),
}

/// A finished export, ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub contents: String,
}

pub fn export(
    format: ExportFormat,
    report: &AnalysisReport,
    log: &AuditLog,
) -> Result<ExportArtifact, ExportError> {
    let city = report.city.name;
    match format {
        ExportFormat::Csv => Ok(ExportArtifact {
            file_name: format!("{city}_analysis.csv"),
            mime_type: "text/csv",
            contents: sites_csv(&report.sites),
        }),
        ExportFormat::Json => Ok(ExportArtifact {
            file_name: format!("{city}_blockchain.json"),
            mime_type: "application/json",
            contents: serde_json::to_string_pretty(log)?,
        }),
        ExportFormat::Pdf => Err(ExportError::NotYetAvailable(format)),
    }
}

/// One row per site, in rank order, after [`CSV_HEADER`].
pub fn sites_csv(sites: &[Site]) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');
    for site in sites {
        let row = [
            csv_field(&site.site_id),
            csv_field(&site.name),
            site.income_level.label().to_string(),
            format!("{:.2}", site.suitability_score),
            site.carbon_reduction_potential.to_string(),
            site.job_creation_potential.to_string(),
            format!("{:.2}", site.flood_risk),
            format!("{:.2}", site.gentrification_risk),
        ];
        csv.push_str(&row.join(","));
        csv.push('\n');
    }
    csv
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// ── Number formatting ──

/// Western grouping: `1234567` → `1,234,567`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Indian grouping: last three digits, then pairs. `1234567` → `12,34,567`.
pub fn group_indian(n: u64) -> String {
    let digits = n.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut out = String::new();
    for (i, c) in head.chars().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.push(',');
    out.push_str(tail);
    out
}

/// Rupee amount in crore (≥ 1,00,00,000), lakh (≥ 1,00,000) or plain
/// Indian-grouped rupees.
pub fn format_inr(amount: f64) -> String {
    if amount >= 10_000_000.0 {
        format!("₹{:.2} Cr", amount / 10_000_000.0)
    } else if amount >= 100_000.0 {
        format!("₹{:.2} L", amount / 100_000.0)
    } else {
        let rounded = round_half_up(amount);
        let sign = if rounded < 0.0 { "-" } else { "" };
        format!("₹{}{}", sign, group_indian(rounded.abs() as u64))
    }
}
