//! Alert emitter
//!
//! Alerts are a best-effort side channel of record creation. A failure to
//! persist one is logged and dropped; the record it belongs to still lands.
use aquatrace_core::{
    AlertSeverity, AlertStatus, LedgerError, QualityAlert, QualityLevel, QualityRecord, StateStore,
    TransactionContext,
};
use aquatrace_core::store::prefix_end;
use tracing::{debug, warn};

use crate::config::ContractConfig;
use crate::events::{self, AlertRaised, ALERT_EVENT};
use crate::keys;
use crate::records::write_json;

/// Severity for a non-compliant record's quality level
pub fn alert_severity(level: QualityLevel) -> AlertSeverity {
    match level {
        QualityLevel::Emergency => AlertSeverity::Critical,
        QualityLevel::Critical => AlertSeverity::High,
        _ => AlertSeverity::Medium,
    }
}

pub fn alert_id(station_id: &str, record_id: &str) -> String {
    format!("ALERT_{}_{}", station_id, record_id)
}

/// Alert document for a freshly scored record
pub fn build_alert(record: &QualityRecord, config: &ContractConfig) -> QualityAlert {
    QualityAlert {
        id: alert_id(&record.station_id, &record.id),
        station_id: record.station_id.clone(),
        record_id: record.id.clone(),
        alert_type: config.alert_type.clone(),
        severity: alert_severity(record.quality_level),
        description: format!(
            "Quality level: {}, Violations: {}",
            record.quality_level,
            record.violations.join(", ")
        ),
        timestamp: record.timestamp,
        resolved_at: None,
        resolved_by: None,
        status: AlertStatus::Active,
        actions: config.alert_actions.clone(),
    }
}

fn persist_alert<C>(ctx: &mut C, alert: &QualityAlert) -> Result<(), LedgerError>
where
    C: TransactionContext + ?Sized,
{
    write_json(ctx, &keys::alert_key(&alert.station_id, &alert.record_id), alert)?;
    events::emit(ctx, ALERT_EVENT, &AlertRaised::from(alert))
}

/// Raise an alert for a non-compliant record.
///
/// Returns the alert when it was written, `None` when the record is
/// compliant or the write failed.
pub fn maybe_emit_alert<C>(
    ctx: &mut C,
    record: &QualityRecord,
    config: &ContractConfig,
) -> Option<QualityAlert>
where
    C: TransactionContext + ?Sized,
{
    if record.compliance_status.is_compliant() {
        return None;
    }

    let alert = build_alert(record, config);
    match persist_alert(ctx, &alert) {
        Ok(()) => Some(alert),
        Err(e) => {
            warn!(
                alert_id = %alert.id,
                station_id = %alert.station_id,
                error = %e,
                "failed to persist quality alert"
            );
            None
        }
    }
}

/// Alerts raised for a station, in key order. Undecodable entries are skipped.
pub fn station_alerts<S>(store: &S, station_id: &str) -> Result<Vec<QualityAlert>, LedgerError>
where
    S: StateStore + ?Sized,
{
    let prefix = keys::station_alert_prefix(station_id);
    let end = prefix_end(&prefix);
    let mut alerts = Vec::new();
    for (key, bytes) in store.range_scan(&prefix, &end)? {
        match serde_json::from_slice::<QualityAlert>(&bytes) {
            Ok(alert) => alerts.push(alert),
            Err(e) => debug!(key = %key, error = %e, "skipping undecodable alert"),
        }
    }
    Ok(alerts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{caller, sample_record, FailingContext};
    use aquatrace_core::{ComplianceStatus, MemoryLedger};

    fn non_compliant(level: QualityLevel) -> QualityRecord {
        let mut record = sample_record("QR_7", "S1");
        record.quality_level = level;
        record.compliance_status = ComplianceStatus::NonCompliant;
        record.violations = vec!["pH out of range".to_string(), "turbidity elevated".to_string()];
        record
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(alert_severity(QualityLevel::Emergency), AlertSeverity::Critical);
        assert_eq!(alert_severity(QualityLevel::Critical), AlertSeverity::High);
        assert_eq!(alert_severity(QualityLevel::Warning), AlertSeverity::Medium);
        assert_eq!(alert_severity(QualityLevel::Good), AlertSeverity::Medium);
    }

    #[test]
    fn test_alert_document() {
        let alert = build_alert(&non_compliant(QualityLevel::Warning), &ContractConfig::default());
        assert_eq!(alert.id, "ALERT_S1_QR_7");
        assert_eq!(alert.record_id, "QR_7");
        assert_eq!(alert.alert_type, "QUALITY_VIOLATION");
        assert_eq!(alert.status, AlertStatus::Active);
        assert_eq!(
            alert.description,
            "Quality level: WARNING, Violations: pH out of range, turbidity elevated"
        );
        assert_eq!(alert.actions, vec!["INSPECTION_REQUIRED", "NOTIFY_AUTHORITIES"]);
    }

    #[test]
    fn test_compliant_record_raises_nothing() {
        let ledger = MemoryLedger::new();
        let mut tx = ledger.begin(caller());
        let record = sample_record("QR_1", "S1");
        assert!(maybe_emit_alert(&mut tx, &record, &ContractConfig::default()).is_none());
        assert!(tx.pending_events().is_empty());
    }

    #[test]
    fn test_alert_written_and_announced() {
        let ledger = MemoryLedger::new();
        let mut tx = ledger.begin(caller());
        let record = non_compliant(QualityLevel::Emergency);
        let alert = maybe_emit_alert(&mut tx, &record, &ContractConfig::default()).unwrap();
        assert_eq!(alert.severity, AlertSeverity::Critical);

        assert_eq!(station_alerts(&tx, "S1").unwrap(), vec![alert]);
        assert!(station_alerts(&tx, "S2").unwrap().is_empty());
        assert_eq!(tx.pending_events()[0].name, ALERT_EVENT);
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let mut ctx = FailingContext::failing_on("alert:");
        let record = non_compliant(QualityLevel::Critical);
        assert!(maybe_emit_alert(&mut ctx, &record, &ContractConfig::default()).is_none());
        assert!(ctx.events.is_empty());
    }
}
