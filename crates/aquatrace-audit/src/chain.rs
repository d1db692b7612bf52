//! Per-station audit chain
//!
//! Record *k* of a station stores the chain hash of record *k-1* as its
//! `previousHash`; the first record stores an empty string. Stations are
//! chained independently of each other.
use aquatrace_core::{AuditTrail, QualityRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hashing;

/// Who wrote a record and in which transaction
#[derive(Debug, Clone)]
pub struct Provenance<'a> {
    pub caller_id: &'a str,
    pub caller_org: &'a str,
    pub transaction_id: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Build the audit trail for a record about to be written.
///
/// The caller organization is the sole witness.
pub fn build_audit(
    record: &QualityRecord,
    previous_hash: &str,
    provenance: &Provenance<'_>,
) -> AuditTrail {
    build_audit_with_witnesses(
        record,
        previous_hash,
        provenance,
        vec![provenance.caller_org.to_string()],
    )
}

pub fn build_audit_with_witnesses(
    record: &QualityRecord,
    previous_hash: &str,
    provenance: &Provenance<'_>,
    witnesses: Vec<String>,
) -> AuditTrail {
    AuditTrail {
        created_by: provenance.caller_id.to_string(),
        created_at: provenance.created_at,
        organization: provenance.caller_org.to_string(),
        transaction_id: provenance.transaction_id.to_string(),
        previous_hash: previous_hash.to_string(),
        data_hash: hashing::data_hash(&record.id, &record.station_id, &record.parameters),
        witnesses,
    }
}

/// Chain hash of a record whose audit trail is already filled in
pub fn chain_hash(record: &QualityRecord, transaction_id: &str) -> String {
    hashing::chain_hash(
        &record.id,
        &record.station_id,
        transaction_id,
        &record.audit_trail.data_hash,
    )
}

/// Fill in audit trail, chain hash and signature.
pub fn seal(
    mut record: QualityRecord,
    previous_hash: &str,
    provenance: &Provenance<'_>,
    witnesses: Vec<String>,
) -> QualityRecord {
    record.signature = hashing::certifier_signature(&record.certifier_id, &record.parameters);
    record.audit_trail = build_audit_with_witnesses(&record, previous_hash, provenance, witnesses);
    record.blockchain_hash = chain_hash(&record, provenance.transaction_id);
    record
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "fault", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChainFault {
    /// Stored data hash does not match the record contents
    DataHashMismatch {
        record_id: String,
        stored: String,
        computed: String,
    },
    /// Stored chain hash does not match its inputs
    ChainHashMismatch {
        record_id: String,
        stored: String,
        computed: String,
    },
    /// `previousHash` does not point at the preceding record
    BrokenLink {
        record_id: String,
        expected: String,
        found: String,
    },
    /// Record belongs to another station
    ForeignRecord { record_id: String, station_id: String },
}

impl std::fmt::Display for ChainFault {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ChainFault::DataHashMismatch { record_id, .. } => {
                write!(f, "{}: data hash mismatch", record_id)
            }
            ChainFault::ChainHashMismatch { record_id, .. } => {
                write!(f, "{}: chain hash mismatch", record_id)
            }
            ChainFault::BrokenLink { record_id, expected, found } => write!(
                f,
                "{}: previous hash {:?} does not match {:?}",
                record_id, found, expected
            ),
            ChainFault::ForeignRecord { record_id, station_id } => {
                write!(f, "{}: belongs to station {}", record_id, station_id)
            }
        }
    }
}

/// Outcome of walking a station's chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReport {
    pub station_id: String,
    pub records_checked: usize,
    /// Chain hash of the last record walked
    pub head: Option<String>,
    pub faults: Vec<ChainFault>,
}

impl ChainReport {
    pub fn is_intact(&self) -> bool {
        self.faults.is_empty()
    }
}

/// Recompute every hash and check linkage, in station index order.
pub fn verify_chain(station_id: &str, records: &[QualityRecord]) -> ChainReport {
    let mut faults = Vec::new();
    let mut expected_previous = String::new();

    for record in records {
        if record.station_id != station_id {
            faults.push(ChainFault::ForeignRecord {
                record_id: record.id.clone(),
                station_id: record.station_id.clone(),
            });
        }

        let computed = hashing::data_hash(&record.id, &record.station_id, &record.parameters);
        if computed != record.audit_trail.data_hash {
            faults.push(ChainFault::DataHashMismatch {
                record_id: record.id.clone(),
                stored: record.audit_trail.data_hash.clone(),
                computed,
            });
        }

        let computed = chain_hash(record, &record.audit_trail.transaction_id);
        if computed != record.blockchain_hash {
            faults.push(ChainFault::ChainHashMismatch {
                record_id: record.id.clone(),
                stored: record.blockchain_hash.clone(),
                computed,
            });
        }

        if record.audit_trail.previous_hash != expected_previous {
            faults.push(ChainFault::BrokenLink {
                record_id: record.id.clone(),
                expected: expected_previous.clone(),
                found: record.audit_trail.previous_hash.clone(),
            });
        }

        expected_previous = record.blockchain_hash.clone();
    }

    ChainReport {
        station_id: station_id.to_string(),
        records_checked: records.len(),
        head: records.last().map(|r| r.blockchain_hash.clone()),
        faults,
    }
}
