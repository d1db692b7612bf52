//! Data Model: measurements, thresholds, records, alerts and stations
//!
//! Field names are serialized in camelCase. The persisted layout is part of
//! the contract: record listings and chain verification read these documents
//! back from the key-value store.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LedgerError;

/// Physicochemical readings attached to exactly one quality record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WaterParameters {
    /// Hydrogen potential
    pub ph: f64,
    /// NTU
    pub turbidity: f64,
    /// Residual chlorine (mg/L)
    pub chlorine: f64,
    /// E. coli per 100 mL
    pub bacterial_count: u32,
    /// µg/L
    pub heavy_metals: f64,
    /// µg/L
    pub organic_pollutants: f64,
    /// °C
    pub temperature: f64,
    /// µS/cm
    pub conductivity: f64,
    /// mg/L
    pub dissolved_oxygen: f64,
    /// mg/L CaCO3
    pub alkalinity: f64,
    /// mg/L
    pub nitrates: f64,
    /// mg/L
    pub phosphates: f64,
}

impl WaterParameters {
    /// Parse a caller payload into the 12-field shape.
    ///
    /// All fields are required and unknown fields are rejected. Values must be
    /// finite; everything except temperature must also be non-negative.
    pub fn parse(payload: &str) -> Result<Self, LedgerError> {
        let parameters: WaterParameters = serde_json::from_str(payload)
            .map_err(|e| LedgerError::InvalidParameters(e.to_string()))?;
        parameters.check()?;
        Ok(parameters)
    }

    /// Range check used by [`WaterParameters::parse`].
    pub fn check(&self) -> Result<(), LedgerError> {
        let readings = [
            ("ph", self.ph),
            ("turbidity", self.turbidity),
            ("chlorine", self.chlorine),
            ("heavyMetals", self.heavy_metals),
            ("organicPollutants", self.organic_pollutants),
            ("conductivity", self.conductivity),
            ("dissolvedOxygen", self.dissolved_oxygen),
            ("alkalinity", self.alkalinity),
            ("nitrates", self.nitrates),
            ("phosphates", self.phosphates),
        ];
        for (name, value) in readings {
            if !value.is_finite() || value < 0.0 {
                return Err(LedgerError::InvalidParameters(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }
        if !self.temperature.is_finite() {
            return Err(LedgerError::InvalidParameters(format!(
                "temperature must be finite, got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}

/// One regulation's bounds, each shaped like a measurement set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceThresholds {
    pub regulation: String,
    pub max_limits: WaterParameters,
    pub min_limits: WaterParameters,
    pub critical_limits: WaterParameters,
    pub last_update: DateTime<Utc>,
    pub authority: String,
}

/// Categorical classification of a record, worst first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityLevel {
    Emergency,
    Critical,
    Warning,
    Acceptable,
    Good,
    Excellent,
    Exceptional,
}

impl QualityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityLevel::Emergency => "EMERGENCY",
            QualityLevel::Critical => "CRITICAL",
            QualityLevel::Warning => "WARNING",
            QualityLevel::Acceptable => "ACCEPTABLE",
            QualityLevel::Good => "GOOD",
            QualityLevel::Excellent => "EXCELLENT",
            QualityLevel::Exceptional => "EXCEPTIONAL",
        }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    Compliant,
    PartiallyCompliant,
    NonCompliant,
    NonCompliantCritical,
}

impl ComplianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "COMPLIANT",
            ComplianceStatus::PartiallyCompliant => "PARTIALLY_COMPLIANT",
            ComplianceStatus::NonCompliant => "NON_COMPLIANT",
            ComplianceStatus::NonCompliantCritical => "NON_COMPLIANT_CRITICAL",
        }
    }

    pub fn is_compliant(&self) -> bool {
        matches!(self, ComplianceStatus::Compliant)
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integrity metadata embedded in every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditTrail {
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub organization: String,
    pub transaction_id: String,
    /// Chain hash of the station's previous record, empty for the first one
    pub previous_hash: String,
    pub data_hash: String,
    #[serde(default)]
    pub witnesses: Vec<String>,
}

/// Immutable certified water quality record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityRecord {
    pub id: String,
    pub station_id: String,
    pub timestamp: DateTime<Utc>,
    pub parameters: WaterParameters,
    pub quality_level: QualityLevel,
    /// 0..=10000, two implied decimals
    pub compliance_score: u32,
    pub certifier_id: String,
    pub certifier_org: String,
    pub signature: String,
    /// Off-chain content pointer
    pub ipfs_hash: String,
    pub compliance_status: ComplianceStatus,
    #[serde(default)]
    pub violations: Vec<String>,
    pub audit_trail: AuditTrail,
    pub blockchain_hash: String,
    pub regulatory_reference: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Medium => "MEDIUM",
            AlertSeverity::High => "HIGH",
            AlertSeverity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
}

/// Alert raised as a side effect of a non-compliant record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAlert {
    pub id: String,
    pub station_id: String,
    /// Record that triggered the alert
    #[serde(default)]
    pub record_id: String,
    pub alert_type: String,
    pub severity: AlertSeverity,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
    pub status: AlertStatus,
    #[serde(default)]
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub region: String,
}

/// Static registry entry for a treatment station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationInfo {
    pub station_id: String,
    pub name: String,
    pub location: Location,
    /// Population equivalent
    pub capacity: u32,
    pub operator_id: String,
    pub status: String,
    pub last_update: DateTime<Utc>,
    #[serde(default)]
    pub certifications: Vec<String>,
}
