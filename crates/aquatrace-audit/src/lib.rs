//! Aquatrace Audit: tamper-evident chaining of quality records
//!
//! Each record carries a content fingerprint (`dataHash`) and a chain hash
//! (`blockchainHash`). A station's records form a hash chain through
//! `previousHash`, which auditors can walk with [`verify_chain`] without
//! touching any other station.
pub mod chain;
pub mod hashing;

pub use chain::{
    build_audit, build_audit_with_witnesses, chain_hash, seal, verify_chain, ChainFault,
    ChainReport, Provenance,
};
pub use hashing::{certifier_signature, data_hash, sha256_hex};
