//! Versioned record store for Carrel.
//!
//! The engine talks to one collaborator: a key-value store whose reads
//! return `(value, version token)` pairs and whose writes go through an
//! all-or-nothing conditional commit. Two backends are provided: an
//! in-process [`MemoryStore`] and a durable [`FileStore`] with the same
//! semantics. The conditional commit is the single serialization point
//! for concurrent callers — there is no application-level locking above
//! this crate.

pub mod file;
pub mod key;
pub mod memory;

pub use file::{FileStore, STORE_FORMAT_VERSION};
pub use key::RecordKey;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("integrity check failed for record '{key}': expected {expected}, got {actual}")]
    IntegrityFailure {
        key: String,
        expected: String,
        actual: String,
    },
    #[error("store lock acquisition failed: {0}")]
    LockFailed(String),
    #[error("store format version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Opaque token identifying the revision of a record at read time.
///
/// Returned by every read, required by every conditional write against
/// that record. Tokens are drawn from a store-wide monotone counter, so a
/// delete/re-create cycle never reissues a token an old reader still
/// holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(u64);

impl VersionToken {
    pub(crate) fn new(serial: u64) -> Self {
        Self(serial)
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A record value together with the token of the revision that was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedRecord {
    pub value: serde_json::Value,
    pub version: VersionToken,
}

/// Condition evaluated atomically with the writes of a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// No record may exist under the key.
    Absent(RecordKey),
    /// The record must exist at exactly this revision.
    VersionIs(RecordKey, VersionToken),
}

/// Write applied by a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomicOp {
    Put(RecordKey, serde_json::Value),
    Delete(RecordKey),
}

/// Outcome of a conditional commit. `Conflict` means at least one
/// precondition failed and none of the writes took effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    Conflict,
}

impl CommitOutcome {
    pub fn is_committed(self) -> bool {
        matches!(self, CommitOutcome::Committed)
    }
}

/// The store contract the engine is written against.
///
/// Implementations must make `atomic` all-or-nothing: either every
/// precondition holds and every op applies, or nothing changes. Reads are
/// not required to be linearizable with respect to in-flight commits.
pub trait RecordStore: Send + Sync {
    fn get(&self, key: &RecordKey) -> Result<Option<VersionedRecord>, StoreError>;

    /// All records whose key starts with `prefix`, in key order.
    fn scan(&self, prefix: &RecordKey) -> Result<Vec<(RecordKey, serde_json::Value)>, StoreError>;

    fn atomic(
        &self,
        checks: &[Precondition],
        ops: &[AtomicOp],
    ) -> Result<CommitOutcome, StoreError>;
}

/// Fsync a directory so a preceding `rename()` is durable.
///
/// On Linux with ext4 `data=ordered` (the default), renames are usually
/// durable without an explicit dir fsync, but POSIX does not guarantee
/// this.
pub(crate) fn fsync_dir(dir: &Path) -> Result<(), std::io::Error> {
    let f = std::fs::File::open(dir)?;
    f.sync_all()
}
