//! Query layer
//!
//! Batch reads degrade per entry: a record that cannot be resolved or
//! decoded is left out of the listing instead of failing it.
use aquatrace_core::store::prefix_end;
use aquatrace_core::{LedgerError, QualityRecord, StateStore};
use tracing::debug;

use crate::keys::RECORD_PREFIX;
use crate::records::{get_record, station_index};

/// Records of a station in creation order.
pub fn station_records<S>(store: &S, station_id: &str) -> Result<Vec<QualityRecord>, LedgerError>
where
    S: StateStore + ?Sized,
{
    let ids = station_index(store, station_id)?;
    let mut records = Vec::with_capacity(ids.len());
    for id in ids {
        match get_record(store, &id) {
            Ok(record) => records.push(record),
            Err(e) => debug!(
                record_id = %id,
                station_id,
                error = %e,
                "skipping unresolvable record"
            ),
        }
    }
    Ok(records)
}

/// Every quality record in key order. Metadata entries never show up here.
pub fn scan_all_records<S>(store: &S) -> Result<Vec<QualityRecord>, LedgerError>
where
    S: StateStore + ?Sized,
{
    let entries = store.range_scan(RECORD_PREFIX, &prefix_end(RECORD_PREFIX))?;
    let mut records = Vec::with_capacity(entries.len());
    for (key, bytes) in entries {
        if !key.starts_with(RECORD_PREFIX) {
            continue;
        }
        match serde_json::from_slice::<QualityRecord>(&bytes) {
            Ok(record) => records.push(record),
            Err(e) => debug!(key = %key, error = %e, "skipping undecodable record"),
        }
    }
    Ok(records)
}
