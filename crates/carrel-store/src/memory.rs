//! In-process store backend.
//!
//! A `Mutex` around a `BTreeMap` plus a store-wide serial counter. The
//! mutex scope of [`MemoryStore::atomic`] is what makes the commit
//! all-or-nothing: every precondition is evaluated and every op applied
//! under one lock acquisition.

use crate::key::RecordKey;
use crate::{
    AtomicOp, CommitOutcome, Precondition, RecordStore, StoreError, VersionToken, VersionedRecord,
};
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
struct StoredRecord {
    value: serde_json::Value,
    version: VersionToken,
}

#[derive(Debug)]
struct Inner {
    records: BTreeMap<RecordKey, StoredRecord>,
    next_serial: u64,
}

#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                records: BTreeMap::new(),
                next_serial: 1,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned mutex means a panic mid-commit in another thread;
        // the map itself is still structurally sound (ops apply one
        // record at a time), so continue with the data we have.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, key: &RecordKey) -> Result<Option<VersionedRecord>, StoreError> {
        let inner = self.lock();
        Ok(inner.records.get(key).map(|r| VersionedRecord {
            value: r.value.clone(),
            version: r.version,
        }))
    }

    fn scan(&self, prefix: &RecordKey) -> Result<Vec<(RecordKey, serde_json::Value)>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .records
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, r)| (k.clone(), r.value.clone()))
            .collect())
    }

    fn atomic(
        &self,
        checks: &[Precondition],
        ops: &[AtomicOp],
    ) -> Result<CommitOutcome, StoreError> {
        let mut inner = self.lock();

        for check in checks {
            let holds = match check {
                Precondition::Absent(key) => !inner.records.contains_key(key),
                Precondition::VersionIs(key, token) => {
                    inner.records.get(key).map(|r| r.version) == Some(*token)
                }
            };
            if !holds {
                return Ok(CommitOutcome::Conflict);
            }
        }

        for op in ops {
            match op {
                AtomicOp::Put(key, value) => {
                    let version = VersionToken::new(inner.next_serial);
                    inner.next_serial += 1;
                    inner.records.insert(
                        key.clone(),
                        StoredRecord {
                            value: value.clone(),
                            version,
                        },
                    );
                }
                AtomicOp::Delete(key) => {
                    inner.records.remove(key);
                }
            }
        }

        Ok(CommitOutcome::Committed)
    }
}
