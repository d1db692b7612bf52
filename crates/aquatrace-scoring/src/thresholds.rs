//! Regulatory threshold documents
//!
//! One [`ComplianceThresholds`] document per regulation. Documents are data
//! only; the scoring rules that read them live in [`crate::rules`].

use aquatrace_core::{ComplianceThresholds, WaterParameters};
use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

use crate::rules::{Parameter, RuleKind, RULES};

/// Regulation seeded at bootstrap
pub const EU_DIRECTIVE_98_83_EC: &str = "EU_DIRECTIVE_98_83_EC";

#[derive(Debug, Error)]
pub enum ThresholdError {
    #[error("THRESHOLDS/parse: {0}")]
    Parse(String),

    #[error("THRESHOLDS/{regulation}: {parameter} bounds out of order ({detail})")]
    Ordering {
        regulation: String,
        parameter: &'static str,
        detail: String,
    },

    #[error("THRESHOLDS/regulation name is empty")]
    MissingRegulation,
}

/// EU drinking water directive 98/83/EC, as issued by the European Commission.
pub fn eu_directive_98_83_ec(last_update: DateTime<Utc>) -> ComplianceThresholds {
    ComplianceThresholds {
        regulation: EU_DIRECTIVE_98_83_EC.to_string(),
        max_limits: WaterParameters {
            ph: 9.5,
            turbidity: 4.0,
            chlorine: 5.0,
            bacterial_count: 0,
            heavy_metals: 50.0,
            organic_pollutants: 10.0,
            temperature: 25.0,
            conductivity: 2500.0,
            dissolved_oxygen: 15.0,
            alkalinity: 500.0,
            nitrates: 50.0,
            phosphates: 5.0,
        },
        min_limits: WaterParameters {
            ph: 6.5,
            turbidity: 0.0,
            chlorine: 0.2,
            bacterial_count: 0,
            heavy_metals: 0.0,
            organic_pollutants: 0.0,
            temperature: 4.0,
            conductivity: 50.0,
            dissolved_oxygen: 5.0,
            alkalinity: 30.0,
            nitrates: 0.0,
            phosphates: 0.0,
        },
        critical_limits: WaterParameters {
            ph: 11.0,
            turbidity: 10.0,
            chlorine: 10.0,
            bacterial_count: 1000,
            heavy_metals: 200.0,
            organic_pollutants: 50.0,
            temperature: 50.0,
            conductivity: 5000.0,
            // critical low
            dissolved_oxygen: 2.0,
            alkalinity: 1000.0,
            nitrates: 100.0,
            phosphates: 20.0,
        },
        last_update,
        authority: "EUROPEAN_COMMISSION".to_string(),
    }
}

/// EU defaults stamped at the Unix epoch, for tests and offline scoring.
pub fn eu_default() -> ComplianceThresholds {
    eu_directive_98_83_ec(Utc.timestamp_opt(0, 0).single().unwrap_or_default())
}

/// Load a document from YAML and validate it
pub fn from_yaml(yaml: &str) -> Result<ComplianceThresholds, ThresholdError> {
    let thresholds: ComplianceThresholds =
        serde_yaml::from_str(yaml).map_err(|e| ThresholdError::Parse(e.to_string()))?;
    validate(&thresholds)?;
    Ok(thresholds)
}

/// Load a document from JSON and validate it
pub fn from_json(json: &str) -> Result<ComplianceThresholds, ThresholdError> {
    let thresholds: ComplianceThresholds =
        serde_json::from_str(json).map_err(|e| ThresholdError::Parse(e.to_string()))?;
    validate(&thresholds)?;
    Ok(thresholds)
}

/// Check the per-parameter ordering of the three limit sets.
///
/// Where higher is worse: `min <= max <= critical`. Dissolved oxygen is
/// worse when lower: `critical <= min <= max`.
pub fn validate(thresholds: &ComplianceThresholds) -> Result<(), ThresholdError> {
    if thresholds.regulation.trim().is_empty() {
        return Err(ThresholdError::MissingRegulation);
    }

    for rule in RULES.iter() {
        let min = rule.parameter.read(&thresholds.min_limits);
        let max = rule.parameter.read(&thresholds.max_limits);
        let critical = rule.parameter.read(&thresholds.critical_limits);

        let ordered = match rule.kind {
            RuleKind::LowerOnly => critical <= min && min <= max,
            RuleKind::Bounded | RuleKind::UpperOnly | RuleKind::ZeroTolerance => {
                min <= max && max <= critical
            }
        };
        if !ordered {
            return Err(ordering_error(thresholds, rule.parameter, min, max, critical));
        }
    }
    Ok(())
}

fn ordering_error(
    thresholds: &ComplianceThresholds,
    parameter: Parameter,
    min: f64,
    max: f64,
    critical: f64,
) -> ThresholdError {
    ThresholdError::Ordering {
        regulation: thresholds.regulation.clone(),
        parameter: parameter.field_name(),
        detail: format!("min {}, max {}, critical {}", min, max, critical),
    }
}
