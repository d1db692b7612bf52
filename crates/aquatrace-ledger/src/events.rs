//! Ledger events
//!
//! Payloads are JSON. Delivery is up to the host; nothing in the contract
//! waits on or depends on an event being observed.
use aquatrace_core::{
    AlertSeverity, LedgerError, QualityAlert, QualityLevel, QualityRecord, TransactionContext,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const RECORD_CREATED_EVENT: &str = "QualityRecordCreated";
pub const ALERT_EVENT: &str = "QualityAlert";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCreated {
    pub record_id: String,
    pub station_id: String,
    pub quality_level: QualityLevel,
    pub compliance_score: u32,
    pub timestamp: DateTime<Utc>,
    pub certifier: String,
}

impl From<&QualityRecord> for RecordCreated {
    fn from(record: &QualityRecord) -> Self {
        Self {
            record_id: record.id.clone(),
            station_id: record.station_id.clone(),
            quality_level: record.quality_level,
            compliance_score: record.compliance_score,
            timestamp: record.timestamp,
            certifier: record.certifier_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRaised {
    pub alert_id: String,
    pub station_id: String,
    pub severity: AlertSeverity,
    pub timestamp: DateTime<Utc>,
}

impl From<&QualityAlert> for AlertRaised {
    fn from(alert: &QualityAlert) -> Self {
        Self {
            alert_id: alert.id.clone(),
            station_id: alert.station_id.clone(),
            severity: alert.severity,
            timestamp: alert.timestamp,
        }
    }
}

pub fn emit<C, T>(ctx: &mut C, name: &str, payload: &T) -> Result<(), LedgerError>
where
    C: TransactionContext + ?Sized,
    T: Serialize,
{
    let bytes = serde_json::to_vec(payload)?;
    ctx.emit_event(name, bytes);
    Ok(())
}
