//! Aquatrace Core: data model, errors and the host state interface
//!
//! Every other aquatrace crate builds on the types here. The ledger logic
//! never talks to a concrete database; it goes through [`StateStore`] and
//! [`TransactionContext`], which the embedding host provides. [`MemoryLedger`]
//! is the in-process host used by tests and the HTTP binary.

pub mod context;
pub mod data_model;
pub mod error;
pub mod memory;
pub mod store;

pub use context::{CallerIdentity, LedgerEvent, TransactionContext};
pub use data_model::{
    AlertSeverity, AlertStatus, AuditTrail, ComplianceStatus, ComplianceThresholds, Location,
    QualityAlert, QualityLevel, QualityRecord, StationInfo, WaterParameters,
};
pub use error::{ErrorKind, LedgerError, StoreError};
pub use memory::{Committed, MemoryLedger, MemoryTransaction};
pub use store::StateStore;

/// Version of the aquatrace record format
pub const AQUATRACE_VERSION: &str = "1.0.0";
