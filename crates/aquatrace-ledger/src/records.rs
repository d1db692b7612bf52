//! Record store and station index
//!
//! Records are written once and never updated. The station index is an
//! append-only JSON array of record IDs, extended in the same unit of work
//! that writes the record it points at.
use aquatrace_core::{LedgerError, QualityRecord, StateStore};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::keys;

pub(crate) fn read_json<S, T>(store: &S, key: &str) -> Result<Option<T>, LedgerError>
where
    S: StateStore + ?Sized,
    T: DeserializeOwned,
{
    match store.get_state(key)? {
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| LedgerError::Deserialization(format!("{}: {}", key, e))),
        None => Ok(None),
    }
}

pub(crate) fn write_json<S, T>(store: &mut S, key: &str, value: &T) -> Result<(), LedgerError>
where
    S: StateStore + ?Sized,
    T: Serialize,
{
    let bytes = serde_json::to_vec(value)?;
    store.put_state(key, bytes)?;
    Ok(())
}

/// Write a new record. Duplicate IDs are a caller error, not a no-op.
pub fn put_record<S>(store: &mut S, record: &QualityRecord) -> Result<(), LedgerError>
where
    S: StateStore + ?Sized,
{
    if record_exists(&*store, &record.id)? {
        return Err(LedgerError::AlreadyExists(format!(
            "record {} already exists",
            record.id
        )));
    }
    write_json(store, &keys::record_key(&record.id), record)
}

pub fn get_record<S>(store: &S, record_id: &str) -> Result<QualityRecord, LedgerError>
where
    S: StateStore + ?Sized,
{
    read_json(store, &keys::record_key(record_id))?
        .ok_or_else(|| LedgerError::NotFound(format!("record {} does not exist", record_id)))
}

pub fn record_exists<S>(store: &S, record_id: &str) -> Result<bool, LedgerError>
where
    S: StateStore + ?Sized,
{
    Ok(store.contains_key(&keys::record_key(record_id))?)
}

/// Record IDs for a station in creation order; empty when none exist.
pub fn station_index<S>(store: &S, station_id: &str) -> Result<Vec<String>, LedgerError>
where
    S: StateStore + ?Sized,
{
    Ok(read_json(store, &keys::station_index_key(station_id))?.unwrap_or_default())
}

pub fn append_to_station_index<S: StateStore + ?Sized>(
    store: &mut S,
    station_id: &str,
    record_id: &str,
) -> Result<usize, LedgerError> {
    let mut ids = station_index(&*store, station_id)?;
    ids.push(record_id.to_string());
    write_json(store, &keys::station_index_key(station_id), &ids)?;
    Ok(ids.len())
}

/// Chain hash of the station's latest record, empty when it has none.
pub fn last_chain_hash<S>(store: &S, station_id: &str) -> Result<String, LedgerError>
where
    S: StateStore + ?Sized,
{
    match station_index(store, station_id)?.last() {
        Some(last_id) => Ok(get_record(store, last_id)?.blockchain_hash),
        None => Ok(String::new()),
    }
}
