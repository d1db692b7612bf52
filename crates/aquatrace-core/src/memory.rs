//! In-memory host with optimistic multi-version concurrency
//!
//! Each committed key carries the ledger height at which it was last written.
//! A transaction remembers the height it started at, the keys it read and the
//! ranges it scanned. At commit time any of those that moved past the start
//! height aborts the transaction with [`StoreError::Conflict`], so two
//! creations racing on the same station index never both land.
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::context::{CallerIdentity, LedgerEvent, TransactionContext};
use crate::error::StoreError;
use crate::store::StateStore;

#[derive(Debug, Clone)]
struct Versioned {
    value: Vec<u8>,
    version: u64,
}

#[derive(Debug, Default)]
struct LedgerState {
    entries: BTreeMap<String, Versioned>,
    height: u64,
}

fn range_bounds<'a>(start: &'a str, end: &'a str) -> Option<(Bound<&'a str>, Bound<&'a str>)> {
    if !end.is_empty() && start >= end {
        return None;
    }
    let upper = if end.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Excluded(end)
    };
    Some((Bound::Included(start), upper))
}

/// Shared in-process ledger. Cloning shares the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    state: Arc<Mutex<LedgerState>>,
}

/// Output of a committed unit of work.
#[derive(Debug, Clone)]
pub struct Committed<T> {
    pub value: T,
    pub transaction_id: String,
    pub events: Vec<LedgerEvent>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Open a unit of work stamped with the current wall clock time.
    pub fn begin(&self, caller: CallerIdentity) -> MemoryTransaction {
        self.begin_at(caller, Utc::now())
    }

    /// Open a unit of work with an explicit transaction time.
    pub fn begin_at(&self, caller: CallerIdentity, timestamp: DateTime<Utc>) -> MemoryTransaction {
        let start_height = self.lock().height;
        MemoryTransaction {
            state: Arc::clone(&self.state),
            start_height,
            caller,
            transaction_id: uuid::Uuid::new_v4().simple().to_string(),
            timestamp,
            writes: BTreeMap::new(),
            reads: RefCell::new(BTreeSet::new()),
            ranges: RefCell::new(Vec::new()),
            events: Vec::new(),
        }
    }

    /// Run `op` in a fresh transaction and commit it if it succeeds.
    ///
    /// An `Err` from `op` discards every write; a commit conflict is
    /// reported through `E`'s `From<StoreError>`.
    pub fn execute<T, E, F>(&self, caller: CallerIdentity, op: F) -> Result<Committed<T>, E>
    where
        F: FnOnce(&mut MemoryTransaction) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut tx = self.begin(caller);
        let value = op(&mut tx)?;
        let transaction_id = tx.transaction_id.clone();
        let events = tx.commit()?;
        Ok(Committed {
            value,
            transaction_id,
            events,
        })
    }

    /// Number of committed transactions
    pub fn height(&self) -> u64 {
        self.lock().height
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Committed value for `key`, outside of any transaction.
    pub fn committed_value(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().entries.get(key).map(|entry| entry.value.clone())
    }

    /// Committed keys in order.
    pub fn keys(&self) -> Vec<String> {
        self.lock().entries.keys().cloned().collect()
    }
}

/// One unit of work against a [`MemoryLedger`]. Dropping it discards it.
#[derive(Debug)]
pub struct MemoryTransaction {
    state: Arc<Mutex<LedgerState>>,
    start_height: u64,
    caller: CallerIdentity,
    transaction_id: String,
    timestamp: DateTime<Utc>,
    writes: BTreeMap<String, Vec<u8>>,
    reads: RefCell<BTreeSet<String>>,
    ranges: RefCell<Vec<(String, String)>>,
    events: Vec<LedgerEvent>,
}

impl MemoryTransaction {
    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn pending_events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Validate the read set and apply all writes atomically.
    pub fn commit(self) -> Result<Vec<LedgerEvent>, StoreError> {
        let mut state = self.lock();

        for key in self.reads.borrow().iter() {
            if let Some(entry) = state.entries.get(key) {
                if entry.version > self.start_height {
                    return Err(StoreError::Conflict(format!(
                        "key {} changed since height {}",
                        key, self.start_height
                    )));
                }
            }
        }

        for (start, end) in self.ranges.borrow().iter() {
            if let Some(bounds) = range_bounds(start, end) {
                let moved = state
                    .entries
                    .range::<str, _>(bounds)
                    .find(|(_, entry)| entry.version > self.start_height);
                if let Some((key, _)) = moved {
                    return Err(StoreError::Conflict(format!(
                        "range [{}, {}) changed at key {}",
                        start, end, key
                    )));
                }
            }
        }

        if self.writes.is_empty() {
            return Ok(self.events.clone());
        }

        state.height += 1;
        let version = state.height;
        for (key, value) in &self.writes {
            state.entries.insert(
                key.clone(),
                Versioned {
                    value: value.clone(),
                    version,
                },
            );
        }
        Ok(self.events.clone())
    }
}

impl StateStore for MemoryTransaction {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.reads.borrow_mut().insert(key.to_string());
        if let Some(value) = self.writes.get(key) {
            return Ok(Some(value.clone()));
        }
        Ok(self.lock().entries.get(key).map(|entry| entry.value.clone()))
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::Backend("empty key".to_string()));
        }
        self.writes.insert(key.to_string(), value);
        Ok(())
    }

    fn range_scan(&self, start: &str, end: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        self.ranges
            .borrow_mut()
            .push((start.to_string(), end.to_string()));
        let Some(bounds) = range_bounds(start, end) else {
            return Ok(Vec::new());
        };

        let mut merged: BTreeMap<String, Vec<u8>> = self
            .lock()
            .entries
            .range::<str, _>(bounds)
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect();
        for (key, value) in self.writes.range::<str, _>(bounds) {
            merged.insert(key.clone(), value.clone());
        }
        Ok(merged.into_iter().collect())
    }
}

impl TransactionContext for MemoryTransaction {
    fn caller_id(&self) -> &str {
        &self.caller.id
    }

    fn caller_org(&self) -> &str {
        &self.caller.organization
    }

    fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn emit_event(&mut self, name: &str, payload: Vec<u8>) {
        self.events.push(LedgerEvent {
            name: name.to_string(),
            transaction_id: self.transaction_id.clone(),
            payload,
        });
    }
}
