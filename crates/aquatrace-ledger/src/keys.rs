//! Key space layout
//!
//! Records and metadata share one flat key space. Every entry kind has its
//! own prefix so a prefix scan over [`RECORD_PREFIX`] only ever sees quality
//! records.
use aquatrace_core::LedgerError;

pub const RECORD_PREFIX: &str = "record:";
pub const STATION_PREFIX: &str = "station:";
pub const STATION_INDEX_PREFIX: &str = "station-index:";
pub const THRESHOLDS_PREFIX: &str = "thresholds:";
pub const THRESHOLDS_ARCHIVE_PREFIX: &str = "thresholds-archive:";
pub const ALERT_PREFIX: &str = "alert:";

/// Separator reserved for composite keys
pub const SEPARATOR: char = ':';

pub fn record_key(record_id: &str) -> String {
    format!("{}{}", RECORD_PREFIX, record_id)
}

pub fn station_key(station_id: &str) -> String {
    format!("{}{}", STATION_PREFIX, station_id)
}

pub fn station_index_key(station_id: &str) -> String {
    format!("{}{}", STATION_INDEX_PREFIX, station_id)
}

pub fn thresholds_key(regulation: &str) -> String {
    format!("{}{}", THRESHOLDS_PREFIX, regulation)
}

pub fn thresholds_archive_key(regulation: &str, version: &str) -> String {
    format!("{}{}{}{}", THRESHOLDS_ARCHIVE_PREFIX, regulation, SEPARATOR, version)
}

/// Prefix of all alerts raised for a station
pub fn station_alert_prefix(station_id: &str) -> String {
    format!("{}{}{}", ALERT_PREFIX, station_id, SEPARATOR)
}

pub fn alert_key(station_id: &str, record_id: &str) -> String {
    format!("{}{}", station_alert_prefix(station_id), record_id)
}

/// Reject empty identifiers and identifiers that would break key parsing.
pub fn validate_identifier(field: &str, value: &str) -> Result<(), LedgerError> {
    if value.trim().is_empty() {
        return Err(LedgerError::Validation(format!("{} is required", field)));
    }
    if value.contains(SEPARATOR) {
        return Err(LedgerError::Validation(format!(
            "{} must not contain '{}': {}",
            field, SEPARATOR, value
        )));
    }
    Ok(())
}
