//! Transaction Context: who is calling, when, and where events go
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::StateStore;

/// Everything the host hands to a single invocation.
pub trait TransactionContext: StateStore {
    /// Opaque caller identity string
    fn caller_id(&self) -> &str;

    /// Caller organization (MSP) identifier
    fn caller_org(&self) -> &str;

    fn transaction_id(&self) -> &str;

    /// Host-assigned transaction time
    fn timestamp(&self) -> DateTime<Utc>;

    /// Fire-and-forget notification
    fn emit_event(&mut self, name: &str, payload: Vec<u8>);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub id: String,
    pub organization: String,
}

impl CallerIdentity {
    pub fn new(id: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            organization: organization.into(),
        }
    }
}

/// Event emitted during a transaction, delivered after commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub name: String,
    pub transaction_id: String,
    pub payload: Vec<u8>,
}

impl LedgerEvent {
    pub fn payload_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}
