//! Per-parameter scoring rules
//!
//! Each of the twelve measured parameters is worth [`POINTS_PER_PARAMETER`]
//! points. A rule descriptor says how the reading is compared against the
//! threshold document and what a miss costs. The engine walks [`RULES`] in
//! order, so violation labels always come out in the same sequence.

use aquatrace_core::{ComplianceThresholds, WaterParameters};
use serde::{Deserialize, Serialize};

pub const POINTS_PER_PARAMETER: u32 = 100;

/// Twelve parameters at 100 points each
pub const MAX_TOTAL_POINTS: u32 = POINTS_PER_PARAMETER * 12;

/// Below this pH the reading is critical regardless of the document.
pub const PH_ABSOLUTE_FLOOR: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Parameter {
    Ph,
    Turbidity,
    Chlorine,
    BacterialCount,
    HeavyMetals,
    OrganicPollutants,
    Temperature,
    Conductivity,
    DissolvedOxygen,
    Alkalinity,
    Nitrates,
    Phosphates,
}

impl Parameter {
    /// Reading for this parameter in a measurement-shaped value
    pub fn read(&self, params: &WaterParameters) -> f64 {
        match self {
            Parameter::Ph => params.ph,
            Parameter::Turbidity => params.turbidity,
            Parameter::Chlorine => params.chlorine,
            Parameter::BacterialCount => f64::from(params.bacterial_count),
            Parameter::HeavyMetals => params.heavy_metals,
            Parameter::OrganicPollutants => params.organic_pollutants,
            Parameter::Temperature => params.temperature,
            Parameter::Conductivity => params.conductivity,
            Parameter::DissolvedOxygen => params.dissolved_oxygen,
            Parameter::Alkalinity => params.alkalinity,
            Parameter::Nitrates => params.nitrates,
            Parameter::Phosphates => params.phosphates,
        }
    }

    /// JSON field name
    pub fn field_name(&self) -> &'static str {
        match self {
            Parameter::Ph => "ph",
            Parameter::Turbidity => "turbidity",
            Parameter::Chlorine => "chlorine",
            Parameter::BacterialCount => "bacterialCount",
            Parameter::HeavyMetals => "heavyMetals",
            Parameter::OrganicPollutants => "organicPollutants",
            Parameter::Temperature => "temperature",
            Parameter::Conductivity => "conductivity",
            Parameter::DissolvedOxygen => "dissolvedOxygen",
            Parameter::Alkalinity => "alkalinity",
            Parameter::Nitrates => "nitrates",
            Parameter::Phosphates => "phosphates",
        }
    }
}

/// How a reading is compared against its limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    /// Nominal inside `[min, max]`
    Bounded,
    /// Nominal at or below `max`
    UpperOnly,
    /// Nominal at or above `min`; critical at or below the critical limit
    LowerOnly,
    /// Nominal at or below `max`, anything above scores zero
    ZeroTolerance,
}

/// Where a reading landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Band {
    Nominal,
    Partial,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterRule {
    pub parameter: Parameter,
    pub kind: RuleKind,
    /// Points awarded between the nominal range and the critical limit
    pub partial_points: u32,
    /// `None` when the parameter has no critical band
    pub critical_label: Option<&'static str>,
    /// `None` when a partial miss is tolerated without a violation
    pub partial_label: Option<&'static str>,
    /// Extra absolute lower bound that is treated as critical
    pub critical_floor: Option<f64>,
}

/// Outcome of a single rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub parameter: Parameter,
    pub value: f64,
    pub band: Band,
    pub points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation: Option<String>,
}

const fn rule(
    parameter: Parameter,
    kind: RuleKind,
    partial_points: u32,
    critical_label: Option<&'static str>,
    partial_label: Option<&'static str>,
) -> ParameterRule {
    ParameterRule {
        parameter,
        kind,
        partial_points,
        critical_label,
        partial_label,
        critical_floor: None,
    }
}

/// Rule table in evaluation order.
pub static RULES: [ParameterRule; 12] = [
    ParameterRule {
        critical_floor: Some(PH_ABSOLUTE_FLOOR),
        ..rule(
            Parameter::Ph,
            RuleKind::Bounded,
            50,
            Some("pH critical"),
            Some("pH out of range"),
        )
    },
    rule(
        Parameter::Turbidity,
        RuleKind::UpperOnly,
        50,
        Some("turbidity critical"),
        Some("turbidity elevated"),
    ),
    rule(
        Parameter::Chlorine,
        RuleKind::Bounded,
        50,
        Some("chlorine critical"),
        Some("chlorine out of range"),
    ),
    rule(
        Parameter::BacterialCount,
        RuleKind::ZeroTolerance,
        0,
        Some("bacteriological contamination"),
        None,
    ),
    rule(
        Parameter::HeavyMetals,
        RuleKind::UpperOnly,
        50,
        Some("heavy metals critical"),
        Some("heavy metals elevated"),
    ),
    rule(
        Parameter::OrganicPollutants,
        RuleKind::UpperOnly,
        50,
        Some("organic pollutants critical"),
        Some("organic pollutants elevated"),
    ),
    rule(
        Parameter::Temperature,
        RuleKind::Bounded,
        75,
        Some("temperature critical"),
        None,
    ),
    rule(
        Parameter::Conductivity,
        RuleKind::Bounded,
        75,
        Some("conductivity critical"),
        None,
    ),
    rule(
        Parameter::DissolvedOxygen,
        RuleKind::LowerOnly,
        50,
        Some("dissolved oxygen critical"),
        None,
    ),
    rule(Parameter::Alkalinity, RuleKind::Bounded, 75, None, None),
    rule(
        Parameter::Nitrates,
        RuleKind::UpperOnly,
        75,
        Some("nitrates critical"),
        None,
    ),
    rule(
        Parameter::Phosphates,
        RuleKind::UpperOnly,
        75,
        Some("phosphates critical"),
        None,
    ),
];

impl ParameterRule {
    /// Score one reading against a threshold document.
    pub fn assess(
        &self,
        params: &WaterParameters,
        thresholds: &ComplianceThresholds,
    ) -> Assessment {
        let value = self.parameter.read(params);
        let min = self.parameter.read(&thresholds.min_limits);
        let max = self.parameter.read(&thresholds.max_limits);
        let critical = self.parameter.read(&thresholds.critical_limits);

        let nominal = match self.kind {
            RuleKind::Bounded => value >= min && value <= max,
            RuleKind::UpperOnly | RuleKind::ZeroTolerance => value <= max,
            RuleKind::LowerOnly => value >= min,
        };
        if nominal {
            return self.outcome(value, Band::Nominal, POINTS_PER_PARAMETER, None);
        }

        let is_critical = match self.kind {
            RuleKind::ZeroTolerance => true,
            _ if self.critical_label.is_none() => false,
            RuleKind::LowerOnly => value <= critical,
            RuleKind::Bounded | RuleKind::UpperOnly => {
                value > critical || self.critical_floor.is_some_and(|floor| value < floor)
            }
        };
        if is_critical {
            return self.outcome(value, Band::Critical, 0, self.critical_label);
        }

        self.outcome(value, Band::Partial, self.partial_points, self.partial_label)
    }

    fn outcome(&self, value: f64, band: Band, points: u32, label: Option<&str>) -> Assessment {
        Assessment {
            parameter: self.parameter,
            value,
            band,
            points,
            violation: label.map(str::to_string),
        }
    }
}

/// Rule for a parameter, `None` if the table has no entry for it
pub fn rule_for(parameter: Parameter) -> Option<&'static ParameterRule> {
    RULES.iter().find(|r| r.parameter == parameter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thresholds::eu_default;

    fn nominal() -> WaterParameters {
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

    fn assess(parameter: Parameter, params: &WaterParameters) -> Assessment {
        rule_for(parameter).unwrap().assess(params, &eu_default())
    }

    #[test]
    fn test_rule_lookup_returns_the_matching_entry() {
        for rule in RULES.iter() {
            let found = rule_for(rule.parameter).unwrap();
            assert_eq!(found.parameter, rule.parameter);
            assert!(std::ptr::eq(found, rule));
        }
        assert_eq!(rule_for(Parameter::Phosphates).unwrap().parameter, Parameter::Phosphates);
    }

    #[test]
    fn test_table_covers_every_parameter_once() {
        let seen: std::collections::HashSet<Parameter> =
            RULES.iter().map(|r| r.parameter).collect();
        assert_eq!(seen.len(), RULES.len());
        assert_eq!(MAX_TOTAL_POINTS, 1200);
    }

    #[test]
    fn test_ph_bands() {
        let mut p = nominal();
        p.ph = 10.0;
        let a = assess(Parameter::Ph, &p);
        assert_eq!((a.band, a.points), (Band::Partial, 50));
        assert_eq!(a.violation.as_deref(), Some("pH out of range"));

        p.ph = 11.5;
        assert_eq!(assess(Parameter::Ph, &p).band, Band::Critical);

        p.ph = 3.9;
        let a = assess(Parameter::Ph, &p);
        assert_eq!((a.band, a.points), (Band::Critical, 0));
        assert_eq!(a.violation.as_deref(), Some("pH critical"));

        p.ph = 5.0;
        assert_eq!(assess(Parameter::Ph, &p).band, Band::Partial);
    }

    #[test]
    fn test_chlorine_below_minimum_is_partial() {
        let mut p = nominal();
        p.chlorine = 0.1;
        let a = assess(Parameter::Chlorine, &p);
        assert_eq!((a.band, a.points), (Band::Partial, 50));
        assert_eq!(a.violation.as_deref(), Some("chlorine out of range"));
    }

    #[test]
    fn test_bacterial_zero_tolerance() {
        let mut p = nominal();
        p.bacterial_count = 1;
        let a = assess(Parameter::BacterialCount, &p);
        assert_eq!((a.band, a.points), (Band::Critical, 0));
        assert_eq!(a.violation.as_deref(), Some("bacteriological contamination"));
    }

    #[test]
    fn test_temperature_partial_without_violation() {
        let mut p = nominal();
        p.temperature = 30.0;
        let a = assess(Parameter::Temperature, &p);
        assert_eq!((a.band, a.points, a.violation), (Band::Partial, 75, None));

        p.temperature = 2.0;
        assert_eq!(assess(Parameter::Temperature, &p).points, 75);

        p.temperature = 51.0;
        let a = assess(Parameter::Temperature, &p);
        assert_eq!(a.violation.as_deref(), Some("temperature critical"));
    }

    #[test]
    fn test_dissolved_oxygen_critical_is_inclusive() {
        let mut p = nominal();
        p.dissolved_oxygen = 2.0;
        assert_eq!(assess(Parameter::DissolvedOxygen, &p).band, Band::Critical);

        p.dissolved_oxygen = 3.0;
        let a = assess(Parameter::DissolvedOxygen, &p);
        assert_eq!((a.band, a.points, a.violation), (Band::Partial, 50, None));

        p.dissolved_oxygen = 20.0;
        assert_eq!(assess(Parameter::DissolvedOxygen, &p).band, Band::Nominal);
    }

    #[test]
    fn test_alkalinity_never_critical() {
        let mut p = nominal();
        p.alkalinity = 5000.0;
        let a = assess(Parameter::Alkalinity, &p);
        assert_eq!((a.band, a.points, a.violation), (Band::Partial, 75, None));
    }

    #[test]
    fn test_upper_only_boundaries() {
        let mut p = nominal();
        p.turbidity = 4.0;
        assert_eq!(assess(Parameter::Turbidity, &p).band, Band::Nominal);
        p.turbidity = 10.0;
        assert_eq!(assess(Parameter::Turbidity, &p).band, Band::Partial);
        p.turbidity = 10.01;
        assert_eq!(assess(Parameter::Turbidity, &p).band, Band::Critical);

        p.nitrates = 60.0;
        let a = assess(Parameter::Nitrates, &p);
        assert_eq!((a.points, a.violation), (75, None));
    }
}
