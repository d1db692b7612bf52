//! Aquatrace Ledger: certified water quality records over a key-value host
//!
//! # Architecture
//!
//! ```text
//! payload → parse → score (thresholds) → seal (previous hash) → record
//!                                                                 ↓
//!                                station index ← append ← put record
//!                                                                 ↓
//!                                          event + alert (when non-compliant)
//! ```
//!
//! # Example
//!
//! ```
//! use aquatrace_core::{CallerIdentity, MemoryLedger};
//! use aquatrace_ledger::{NewRecord, QualityContract};
//!
//! let ledger = MemoryLedger::new();
//! let contract = QualityContract::default();
//! let caller = CallerIdentity::new("lab-user", "LabMSP");
//!
//! ledger.execute(caller.clone(), |tx| contract.initialize(tx)).unwrap();
//!
//! let payload = r#"{"ph": 7.0, "turbidity": 1.0, "chlorine": 0.5, "bacterialCount": 0,
//!     "heavyMetals": 5.0, "organicPollutants": 0.1, "temperature": 15.0,
//!     "conductivity": 500.0, "dissolvedOxygen": 8.0, "alkalinity": 100.0,
//!     "nitrates": 10.0, "phosphates": 1.0}"#;
//! let input = NewRecord::new("QR_0001", "TRAFFEYERE_MAIN", payload)
//!     .certified_by("CERT_LAB_001", "LABORATORY_REGIONAL_SAVOIE");
//!
//! let committed = ledger
//!     .execute(caller, |tx| contract.create_quality_record(tx, input))
//!     .unwrap();
//! assert_eq!(committed.value.compliance_score, 10_000);
//! assert!(!committed.value.audit_trail.previous_hash.is_empty());
//! ```

pub mod alerts;
pub mod bootstrap;
pub mod config;
pub mod contract;
pub mod events;
pub mod keys;
pub mod query;
pub mod records;

pub use alerts::{alert_severity, maybe_emit_alert};
pub use bootstrap::{REFERENCE_RECORD_ID, REFERENCE_STATION_ID};
pub use config::ContractConfig;
pub use contract::{NewRecord, QualityContract};
pub use events::{AlertRaised, RecordCreated, ALERT_EVENT, RECORD_CREATED_EVENT};

#[cfg(test)]
pub(crate) mod test_support {
    use aquatrace_core::{
        AuditTrail, CallerIdentity, ComplianceStatus, QualityLevel, QualityRecord, StateStore,
        StoreError, TransactionContext, WaterParameters,
    };
    use chrono::{DateTime, Utc};
    use std::collections::BTreeMap;

    pub fn caller() -> CallerIdentity {
        CallerIdentity::new("lab-user", "LabMSP")
    }

    pub fn sample_record(id: &str, station: &str) -> QualityRecord {
        QualityRecord {
            id: id.to_string(),
            station_id: station.to_string(),
            timestamp: DateTime::<Utc>::default(),
            parameters: WaterParameters::default(),
            quality_level: QualityLevel::Exceptional,
            compliance_score: 10_000,
            certifier_id: "CERT".to_string(),
            certifier_org: "LAB".to_string(),
            signature: String::new(),
            ipfs_hash: String::new(),
            compliance_status: ComplianceStatus::Compliant,
            violations: Vec::new(),
            audit_trail: AuditTrail::default(),
            blockchain_hash: format!("hash-{}", id),
            regulatory_reference: "EU_DIRECTIVE_98_83_EC".to_string(),
        }
    }

    /// Plain map context whose writes fail under one key prefix
    #[derive(Default)]
    pub struct FailingContext {
        pub entries: BTreeMap<String, Vec<u8>>,
        pub events: Vec<(String, Vec<u8>)>,
        failing_prefix: String,
    }

    impl FailingContext {
        pub fn failing_on(prefix: &str) -> Self {
            Self {
                failing_prefix: prefix.to_string(),
                ..Self::default()
            }
        }
    }

    impl StateStore for FailingContext {
        fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            Ok(self.entries.get(key).cloned())
        }

        fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
            if key.starts_with(&self.failing_prefix) {
                return Err(StoreError::Backend(format!("write refused: {}", key)));
            }
            self.entries.insert(key.to_string(), value);
            Ok(())
        }

        fn range_scan(&self, start: &str, end: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
            Ok(self
                .entries
                .iter()
                .filter(|(k, _)| k.as_str() >= start && (end.is_empty() || k.as_str() < end))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect())
        }
    }

    impl TransactionContext for FailingContext {
        fn caller_id(&self) -> &str {
            "lab-user"
        }

        fn caller_org(&self) -> &str {
            "LabMSP"
        }

        fn transaction_id(&self) -> &str {
            "tx-failing"
        }

        fn timestamp(&self) -> DateTime<Utc> {
            DateTime::<Utc>::default()
        }

        fn emit_event(&mut self, name: &str, payload: Vec<u8>) {
            self.events.push((name.to_string(), payload));
        }
    }
}
