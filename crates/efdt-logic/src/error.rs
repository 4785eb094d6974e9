//! Errors raised while running an analysis.
//!
//! Audit-chain integrity failures are reported separately by
//! [`crate::audit::TamperDetected`] and never appear here.

use thiserror::Error;

use crate::config::ConfigError;

/// Which lookup table an unknown configuration value was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    ComplianceFramework,
    ClimateScenario,
    ExportFormat,
}

impl std::fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::ComplianceFramework => "compliance framework",
            Self::ClimateScenario => "climate scenario",
            Self::ExportFormat => "export format",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("unknown city: {0:?}")]
    UnknownCity(String),

    #[error("unknown configuration value for {kind}: {value:?}")]
    UnknownConfigValue { kind: ConfigKind, value: String },

    #[error("invalid configuration: {0:?}")]
    InvalidConfig(Vec<ConfigError>),

    #[error("insufficient sites: need {required}, found {found}")]
    InsufficientSites { required: usize, found: usize },

    #[error("analysis cancelled")]
    Cancelled,
}
