//! Scoring engine
//!
//! Maps a measurement set and a threshold document to a compliance score,
//! a quality level, a compliance status and the ordered violation list.
//! Pure and deterministic: integer points only, no I/O.

use aquatrace_core::{ComplianceStatus, ComplianceThresholds, QualityLevel, WaterParameters};
use serde::{Deserialize, Serialize};

use crate::rules::{Assessment, MAX_TOTAL_POINTS, RULES};
use crate::thresholds;

/// Full scale of the compliance score (100.00%)
pub const SCORE_SCALE: u32 = 10_000;

/// Below this score violations become an emergency / critical non-compliance
pub const CRITICAL_SCORE: u32 = 3_000;

/// Below this score violations are plain non-compliance
pub const NON_COMPLIANT_SCORE: u32 = 6_000;

/// Result of scoring one measurement set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreOutcome {
    pub quality_level: QualityLevel,
    /// 0..=10000
    pub compliance_score: u32,
    pub compliance_status: ComplianceStatus,
    pub violations: Vec<String>,
    /// Sum of per-parameter points, out of 1200
    pub total_points: u32,
    pub assessments: Vec<Assessment>,
    pub regulation: String,
}

impl ScoreOutcome {
    pub fn is_compliant(&self) -> bool {
        self.compliance_status.is_compliant()
    }

    /// One-line human summary
    pub fn summary(&self) -> String {
        if self.violations.is_empty() {
            format!(
                "{} ({:.2}%), {}",
                self.quality_level,
                f64::from(self.compliance_score) / 100.0,
                self.compliance_status
            )
        } else {
            format!(
                "{} ({:.2}%), {}: {}",
                self.quality_level,
                f64::from(self.compliance_score) / 100.0,
                self.compliance_status,
                self.violations.join(", ")
            )
        }
    }
}

/// Scores measurements against one regulation
pub struct ScoringEngine {
    thresholds: ComplianceThresholds,
}

impl ScoringEngine {
    pub fn new(thresholds: ComplianceThresholds) -> Self {
        Self { thresholds }
    }

    /// Engine over the EU directive defaults
    pub fn eu_default() -> Self {
        Self::new(thresholds::eu_default())
    }

    pub fn thresholds(&self) -> &ComplianceThresholds {
        &self.thresholds
    }

    pub fn evaluate(&self, params: &WaterParameters) -> ScoreOutcome {
        score(params, &self.thresholds)
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::eu_default()
    }
}

/// Score a measurement set against a threshold document.
pub fn score(params: &WaterParameters, thresholds: &ComplianceThresholds) -> ScoreOutcome {
    let assessments: Vec<Assessment> = RULES
        .iter()
        .map(|rule| rule.assess(params, thresholds))
        .collect();

    let total_points: u32 = assessments.iter().map(|a| a.points).sum();
    let violations: Vec<String> = assessments
        .iter()
        .filter_map(|a| a.violation.clone())
        .collect();

    let compliance_score = total_points * SCORE_SCALE / MAX_TOTAL_POINTS;
    let quality_level = classify(compliance_score, !violations.is_empty(), params.bacterial_count);
    let compliance_status = compliance_status(compliance_score, !violations.is_empty());

    ScoreOutcome {
        quality_level,
        compliance_score,
        compliance_status,
        violations,
        total_points,
        assessments,
        regulation: thresholds.regulation.clone(),
    }
}

/// Quality level, emergency first, then by score cut-offs.
pub fn classify(compliance_score: u32, has_violations: bool, bacterial_count: u32) -> QualityLevel {
    if has_violations && (bacterial_count > 0 || compliance_score < CRITICAL_SCORE) {
        return QualityLevel::Emergency;
    }
    match compliance_score {
        9_500..=u32::MAX => QualityLevel::Exceptional,
        9_000..=9_499 => QualityLevel::Excellent,
        8_000..=8_999 => QualityLevel::Good,
        7_000..=7_999 => QualityLevel::Acceptable,
        6_000..=6_999 => QualityLevel::Warning,
        _ => QualityLevel::Critical,
    }
}

pub fn compliance_status(compliance_score: u32, has_violations: bool) -> ComplianceStatus {
    if !has_violations {
        ComplianceStatus::Compliant
    } else if compliance_score < CRITICAL_SCORE {
        ComplianceStatus::NonCompliantCritical
    } else if compliance_score < NON_COMPLIANT_SCORE {
        ComplianceStatus::NonCompliant
    } else {
        ComplianceStatus::PartiallyCompliant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_parameters() -> WaterParameters {
        WaterParameters {
            ph: 7.2,
            turbidity: 0.8,
            chlorine: 0.3,
            bacterial_count: 0,
            heavy_metals: 5.0,
            organic_pollutants: 0.2,
            temperature: 18.5,
            conductivity: 850.0,
            dissolved_oxygen: 8.5,
            alkalinity: 120.0,
            nitrates: 2.5,
            phosphates: 0.1,
        }
    }

    #[test]
    fn test_nominal_sample_scores_full_marks() {
        let outcome = ScoringEngine::eu_default().evaluate(&reference_parameters());
        assert_eq!(outcome.total_points, 1200);
        assert_eq!(outcome.compliance_score, 10_000);
        assert_eq!(outcome.quality_level, QualityLevel::Exceptional);
        assert_eq!(outcome.compliance_status, ComplianceStatus::Compliant);
        assert!(outcome.violations.is_empty());
        assert_eq!(outcome.regulation, "EU_DIRECTIVE_98_83_EC");
    }

    #[test]
    fn test_tolerated_misses_stay_compliant() {
        let mut params = reference_parameters();
        // 75 + 75 + 50 points, none of them raise a violation
        params.temperature = 30.0;
        params.alkalinity = 600.0;
        params.dissolved_oxygen = 3.0;
        let outcome = ScoringEngine::eu_default().evaluate(&params);
        assert_eq!(outcome.total_points, 1100);
        assert_eq!(outcome.compliance_score, 9166);
        assert_eq!(outcome.quality_level, QualityLevel::Excellent);
        assert_eq!(outcome.compliance_status, ComplianceStatus::Compliant);
    }

    #[test]
    fn test_bacterial_contamination_is_emergency() {
        let mut params = reference_parameters();
        params.bacterial_count = 5;
        let outcome = ScoringEngine::eu_default().evaluate(&params);
        assert_eq!(outcome.compliance_score, 9166);
        assert_eq!(outcome.quality_level, QualityLevel::Emergency);
        assert_eq!(outcome.violations, vec!["bacteriological contamination"]);
        assert_eq!(outcome.compliance_status, ComplianceStatus::PartiallyCompliant);
    }

    #[test]
    fn test_violations_keep_rule_order() {
        let mut params = reference_parameters();
        params.phosphates = 25.0;
        params.ph = 10.0;
        params.turbidity = 6.0;
        let outcome = ScoringEngine::eu_default().evaluate(&params);
        assert_eq!(
            outcome.violations,
            vec!["pH out of range", "turbidity elevated", "phosphates critical"]
        );
        // 1200 - 50 - 50 - 100
        assert_eq!(outcome.total_points, 1000);
        assert_eq!(outcome.compliance_score, 8333);
        assert_eq!(outcome.quality_level, QualityLevel::Good);
        assert_eq!(outcome.compliance_status, ComplianceStatus::PartiallyCompliant);
    }

    #[test]
    fn test_heavily_polluted_sample() {
        let params = WaterParameters {
            ph: 12.0,
            turbidity: 20.0,
            chlorine: 12.0,
            bacterial_count: 0,
            heavy_metals: 300.0,
            organic_pollutants: 60.0,
            temperature: 55.0,
            conductivity: 6000.0,
            dissolved_oxygen: 1.0,
            alkalinity: 700.0,
            nitrates: 150.0,
            phosphates: 30.0,
        };
        let outcome = ScoringEngine::eu_default().evaluate(&params);
        // only bacteria (100) and alkalinity (75) score
        assert_eq!(outcome.total_points, 175);
        assert_eq!(outcome.compliance_score, 1458);
        assert_eq!(outcome.quality_level, QualityLevel::Emergency);
        assert_eq!(outcome.compliance_status, ComplianceStatus::NonCompliantCritical);
        assert_eq!(outcome.violations.len(), 10);
    }

    #[test]
    fn test_classify_cutoffs() {
        assert_eq!(classify(9_500, false, 0), QualityLevel::Exceptional);
        assert_eq!(classify(9_499, false, 0), QualityLevel::Excellent);
        assert_eq!(classify(8_000, false, 0), QualityLevel::Good);
        assert_eq!(classify(7_999, true, 0), QualityLevel::Acceptable);
        assert_eq!(classify(6_000, true, 0), QualityLevel::Warning);
        assert_eq!(classify(5_999, true, 0), QualityLevel::Critical);
        assert_eq!(classify(2_999, true, 0), QualityLevel::Emergency);
        assert_eq!(classify(2_999, false, 0), QualityLevel::Critical);
        assert_eq!(classify(9_900, true, 1), QualityLevel::Emergency);
    }

    #[test]
    fn test_status_buckets() {
        assert_eq!(compliance_status(1_000, false), ComplianceStatus::Compliant);
        assert_eq!(compliance_status(2_999, true), ComplianceStatus::NonCompliantCritical);
        assert_eq!(compliance_status(3_000, true), ComplianceStatus::NonCompliant);
        assert_eq!(compliance_status(5_999, true), ComplianceStatus::NonCompliant);
        assert_eq!(compliance_status(6_000, true), ComplianceStatus::PartiallyCompliant);
    }

    #[test]
    fn test_summary_lists_violations() {
        let mut params = reference_parameters();
        params.bacterial_count = 2;
        let summary = ScoringEngine::eu_default().evaluate(&params).summary();
        assert!(summary.starts_with("EMERGENCY (91.66%)"));
        assert!(summary.ends_with("bacteriological contamination"));
    }
}
