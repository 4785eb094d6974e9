//! Analysis configuration and field validation.
//!
//! The caller (a CLI, a form, a JSON file) fills in an [`AnalysisConfig`]
//! by name. [`validate_config`] checks field domains and reports every
//! problem at once; resolving the names against the reference tables
//! happens when the analysis starts.
//!
//! ```
//! use efdt_logic::config::{validate_config, AnalysisConfig};
//!
//! let mut config = AnalysisConfig::default();
//! config.city = "Delhi".to_string();
//! config.green_threshold_minutes = 20;
//! assert!(validate_config(&config).is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::cities::{city_by_name, City};
use crate::climate::ClimateScenario;
use crate::compliance::ComplianceFramework;
use crate::error::AnalysisError;

/// Upper bound of the green-space walking threshold, minutes.
pub const MAX_GREEN_THRESHOLD: u32 = 60;

/// Local currency units per unit of the carbon market currency.
pub const DEFAULT_CURRENCY_CONVERSION: f64 = 83.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub city: String,
    /// Sites farther than this from a park count as green-space gaps.
    pub green_threshold_minutes: u32,
    /// Free-form tag carried through to the result; not used in scoring.
    pub project_type: String,
    pub framework: String,
    pub scenario: String,
    pub currency_conversion_factor: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            city: "Mumbai".to_string(),
            green_threshold_minutes: 15,
            project_type: "Mixed-Use Development".to_string(),
            framework: ComplianceFramework::LeedIndia.name().to_string(),
            scenario: ClimateScenario::Baseline.name().to_string(),
            currency_conversion_factor: DEFAULT_CURRENCY_CONVERSION,
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// No city selected.
    EmptyCity,
    /// Green-space threshold outside 0–60 minutes.
    ThresholdOutOfRange(u32),
    /// Project type left blank.
    EmptyProjectType,
    /// Conversion factor not a positive finite number.
    InvalidCurrencyFactor(f64),
}

/// Validate field domains, returning all errors found.
pub fn validate_config(config: &AnalysisConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.city.trim().is_empty() {
        errors.push(ConfigError::EmptyCity);
    }
    if config.green_threshold_minutes > MAX_GREEN_THRESHOLD {
        errors.push(ConfigError::ThresholdOutOfRange(
            config.green_threshold_minutes,
        ));
    }
    if config.project_type.trim().is_empty() {
        errors.push(ConfigError::EmptyProjectType);
    }
    let factor = config.currency_conversion_factor;
    if !factor.is_finite() || factor <= 0.0 {
        errors.push(ConfigError::InvalidCurrencyFactor(factor));
    }

    errors
}

/// A validated configuration with every name resolved to its table entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub city: &'static City,
    pub green_threshold_minutes: u32,
    pub project_type: String,
    pub framework: ComplianceFramework,
    pub scenario: ClimateScenario,
    pub currency_conversion_factor: f64,
}

/// Validate, then resolve city, framework and scenario names.
pub fn resolve_config(config: &AnalysisConfig) -> Result<ResolvedConfig, AnalysisError> {
    let errors = validate_config(config);
    if !errors.is_empty() {
        return Err(AnalysisError::InvalidConfig(errors));
    }

    Ok(ResolvedConfig {
        city: city_by_name(&config.city)?,
        green_threshold_minutes: config.green_threshold_minutes,
        project_type: config.project_type.clone(),
        framework: ComplianceFramework::from_name(&config.framework)?,
        scenario: ClimateScenario::from_name(&config.scenario)?,
        currency_conversion_factor: config.currency_conversion_factor,
    })
}
