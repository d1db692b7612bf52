//! Aquatrace Scoring: threshold documents and the compliance scoring engine
//!
//! # Example
//!
//! ```
//! use aquatrace_core::{QualityLevel, WaterParameters};
//! use aquatrace_scoring::ScoringEngine;
//!
//! let engine = ScoringEngine::eu_default();
//! let sample = WaterParameters {
//!     ph: 7.2,
//!     turbidity: 0.8,
//!     chlorine: 0.3,
//!     bacterial_count: 0,
//!     heavy_metals: 5.0,
//!     organic_pollutants: 0.2,
//!     temperature: 18.5,
//!     conductivity: 850.0,
//!     dissolved_oxygen: 8.5,
//!     alkalinity: 120.0,
//!     nitrates: 2.5,
//!     phosphates: 0.1,
//! };
//!
//! let outcome = engine.evaluate(&sample);
//! assert_eq!(outcome.compliance_score, 10_000);
//! assert_eq!(outcome.quality_level, QualityLevel::Exceptional);
//! ```

pub mod engine;
pub mod rules;
pub mod thresholds;

pub use engine::{classify, compliance_status, score, ScoreOutcome, ScoringEngine, SCORE_SCALE};
pub use rules::{Assessment, Band, Parameter, ParameterRule, RuleKind, RULES};
pub use thresholds::{ThresholdError, EU_DIRECTIVE_98_83_EC};

use aquatrace_core::{ComplianceThresholds, WaterParameters};

/// Score a JSON measurement payload against a threshold document
pub fn evaluate_json(
    payload: &str,
    thresholds: &ComplianceThresholds,
) -> Result<ScoreOutcome, aquatrace_core::LedgerError> {
    let params = WaterParameters::parse(payload)?;
    Ok(score(&params, thresholds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_json_rejects_partial_payload() {
        let err = evaluate_json(r#"{"ph": 7.0, "turbidity": 1.0}"#, &thresholds::eu_default())
            .unwrap_err();
        assert_eq!(err.kind(), aquatrace_core::ErrorKind::Deserialization);
    }
}
