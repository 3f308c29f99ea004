//! Durable store backend: one JSON envelope file per record.
//!
//! Records live under per-namespace directories; the file name is the
//! blake3 hash of the key path, so arbitrary key segments (time labels
//! contain spaces and colons) never reach the filesystem. Writes are
//! tempfile-then-rename with a parent directory fsync, and every envelope
//! embeds a checksum of its value that is verified on read.
//!
//! Conditional commits serialize on an `fs2` exclusive lock file, which
//! extends the optimistic-concurrency guarantee across processes sharing
//! one store directory. Each commit journals the prior state of every
//! touched record before applying its writes; an I/O failure mid-apply
//! rolls the records back, and a journal left behind by a crash is rolled
//! back on the next open or commit.

use crate::key::{RecordKey, RESERVATIONS_NS, ROOMS_NS};
use crate::{
    fsync_dir, AtomicOp, CommitOutcome, Precondition, RecordStore, StoreError, VersionToken,
    VersionedRecord,
};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::warn;

/// Current on-disk format version. Incremented on incompatible changes.
pub const STORE_FORMAT_VERSION: u32 = 1;

const VERSION_FILE: &str = "version";
const SERIAL_FILE: &str = "serial";
const LOCK_FILE: &str = ".lock";
const JOURNAL_FILE: &str = "journal";

#[derive(Debug, Serialize, Deserialize)]
struct StoreVersion {
    format_version: u32,
}

/// On-disk record envelope. The checksum covers the canonical JSON of
/// `value` only; `serial` is the revision the version token reports.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    key: RecordKey,
    serial: u64,
    checksum: String,
    value: serde_json::Value,
}

impl Envelope {
    fn new(key: RecordKey, serial: u64, value: serde_json::Value) -> Result<Self, StoreError> {
        let checksum = value_checksum(&value)?;
        Ok(Self {
            key,
            serial,
            checksum,
            value,
        })
    }

    fn verify(&self) -> Result<(), StoreError> {
        let actual = value_checksum(&self.value)?;
        if actual != self.checksum {
            return Err(StoreError::IntegrityFailure {
                key: self.key.to_string(),
                expected: self.checksum.clone(),
                actual,
            });
        }
        Ok(())
    }
}

/// Pre-commit snapshot of one record file. `prior` is the raw envelope
/// text before the commit, or `None` if the record did not exist.
#[derive(Debug, Serialize, Deserialize)]
struct JournalEntry {
    key: RecordKey,
    prior: Option<String>,
}

/// Undo journal persisted before a commit's writes are applied. Present
/// on disk only while a commit is in flight or after a crash.
#[derive(Debug, Serialize, Deserialize)]
struct Journal {
    entries: Vec<JournalEntry>,
}

fn value_checksum(value: &serde_json::Value) -> Result<String, StoreError> {
    let canonical = serde_json::to_string(value)?;
    Ok(blake3::hash(canonical.as_bytes()).to_hex().to_string())
}

/// Exclusive advisory lock held for the duration of one conditional
/// commit. Released on drop.
struct CommitLock {
    lock_file: File,
}

impl CommitLock {
    fn acquire(path: &Path) -> Result<Self, StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
        file.lock_exclusive()
            .map_err(|e| StoreError::LockFailed(e.to_string()))?;
        Ok(Self { lock_file: file })
    }
}

impl Drop for CommitLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.lock_file);
    }
}

#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (or create) a store rooted at `root`.
    ///
    /// Creates the namespace directories and the format marker on first
    /// use; refuses to open a store written by an incompatible format.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root: PathBuf = root.into();
        fs::create_dir_all(root.join(ROOMS_NS))?;
        fs::create_dir_all(root.join(RESERVATIONS_NS))?;

        let store = Self { root };
        store.check_format_version()?;
        {
            let _lock = CommitLock::acquire(&store.root.join(LOCK_FILE))?;
            store.recover()?;
        }
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn check_format_version(&self) -> Result<(), StoreError> {
        let path = self.root.join(VERSION_FILE);
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let version: StoreVersion = serde_json::from_str(&content)?;
            if version.format_version != STORE_FORMAT_VERSION {
                return Err(StoreError::VersionMismatch {
                    expected: STORE_FORMAT_VERSION,
                    found: version.format_version,
                });
            }
        } else {
            let version = StoreVersion {
                format_version: STORE_FORMAT_VERSION,
            };
            self.write_atomically(&path, &serde_json::to_string_pretty(&version)?)?;
        }
        Ok(())
    }

    fn record_path(&self, key: &RecordKey) -> Result<PathBuf, StoreError> {
        let namespace = key.namespace().unwrap_or("_");
        let hash = blake3::hash(&serde_json::to_vec(key)?).to_hex().to_string();
        Ok(self.root.join(namespace).join(format!("{hash}.json")))
    }

    fn write_atomically(&self, dest: &Path, content: &str) -> Result<(), StoreError> {
        let dir = dest.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(dest).map_err(|e| StoreError::Io(e.error))?;
        fsync_dir(dir)?;
        Ok(())
    }

    fn read_envelope(&self, key: &RecordKey) -> Result<Option<Envelope>, StoreError> {
        let path = self.record_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let envelope: Envelope = serde_json::from_str(&content)?;
        envelope.verify()?;
        Ok(Some(envelope))
    }

    fn read_serial(&self) -> Result<u64, StoreError> {
        let path = self.root.join(SERIAL_FILE);
        if !path.exists() {
            return Ok(1);
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_serial(&self, next: u64) -> Result<(), StoreError> {
        self.write_atomically(&self.root.join(SERIAL_FILE), &serde_json::to_string(&next)?)
    }

    /// Roll back a journal left behind by an interrupted commit, if any.
    /// Must be called with the commit lock held.
    fn recover(&self) -> Result<(), StoreError> {
        let path = self.root.join(JOURNAL_FILE);
        if !path.exists() {
            return Ok(());
        }
        warn!("found an interrupted commit, rolling it back");
        let journal: Journal = serde_json::from_str(&fs::read_to_string(&path)?)?;
        self.rollback(&journal)?;
        fs::remove_file(&path)?;
        fsync_dir(&self.root)?;
        Ok(())
    }

    fn rollback(&self, journal: &Journal) -> Result<(), StoreError> {
        for entry in &journal.entries {
            let path = self.record_path(&entry.key)?;
            match &entry.prior {
                Some(content) => self.write_atomically(&path, content)?,
                None => {
                    if path.exists() {
                        fs::remove_file(&path)?;
                        if let Some(dir) = path.parent() {
                            fsync_dir(dir)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn apply_ops(&self, ops: &[AtomicOp], first_serial: u64) -> Result<(), StoreError> {
        let mut serial = first_serial;
        for op in ops {
            match op {
                AtomicOp::Put(key, value) => {
                    let envelope = Envelope::new(key.clone(), serial, value.clone())?;
                    serial += 1;
                    let path = self.record_path(key)?;
                    self.write_atomically(&path, &serde_json::to_string_pretty(&envelope)?)?;
                }
                AtomicOp::Delete(key) => {
                    let path = self.record_path(key)?;
                    if path.exists() {
                        fs::remove_file(&path)?;
                        if let Some(dir) = path.parent() {
                            fsync_dir(dir)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl RecordStore for FileStore {
    fn get(&self, key: &RecordKey) -> Result<Option<VersionedRecord>, StoreError> {
        Ok(self.read_envelope(key)?.map(|envelope| VersionedRecord {
            value: envelope.value,
            version: VersionToken::new(envelope.serial),
        }))
    }

    fn scan(&self, prefix: &RecordKey) -> Result<Vec<(RecordKey, serde_json::Value)>, StoreError> {
        let Some(namespace) = prefix.namespace() else {
            return Ok(Vec::new());
        };
        let dir = self.root.join(namespace);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut results = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let content = fs::read_to_string(entry.path())?;
            let envelope: Envelope = match serde_json::from_str(&content) {
                Ok(e) => e,
                Err(e) => {
                    warn!("skipping unreadable record '{}': {e}", entry.path().display());
                    continue;
                }
            };
            if let Err(e) = envelope.verify() {
                warn!("skipping corrupt record '{}': {e}", envelope.key);
                continue;
            }
            if envelope.key.starts_with(prefix) {
                results.push((envelope.key, envelope.value));
            }
        }
        results.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(results)
    }

    fn atomic(
        &self,
        checks: &[Precondition],
        ops: &[AtomicOp],
    ) -> Result<CommitOutcome, StoreError> {
        let _lock = CommitLock::acquire(&self.root.join(LOCK_FILE))?;
        self.recover()?;

        for check in checks {
            let holds = match check {
                Precondition::Absent(key) => self.read_envelope(key)?.is_none(),
                Precondition::VersionIs(key, token) => self
                    .read_envelope(key)?
                    .is_some_and(|e| VersionToken::new(e.serial) == *token),
            };
            if !holds {
                return Ok(CommitOutcome::Conflict);
            }
        }

        // Reserve the serial range before writing any record, so a crash
        // mid-commit can never lead to a serial being issued twice.
        let first_serial = self.read_serial()?;
        let puts = ops
            .iter()
            .filter(|op| matches!(op, AtomicOp::Put(..)))
            .count() as u64;
        if puts > 0 {
            self.write_serial(first_serial + puts)?;
        }

        // Journal the prior state of every touched record before any
        // write, so an interrupted apply can always be rolled back to the
        // pre-commit state.
        let mut entries = Vec::new();
        for op in ops {
            let key = match op {
                AtomicOp::Put(key, _) | AtomicOp::Delete(key) => key,
            };
            let path = self.record_path(key)?;
            let prior = if path.exists() {
                Some(fs::read_to_string(&path)?)
            } else {
                None
            };
            entries.push(JournalEntry {
                key: key.clone(),
                prior,
            });
        }
        let journal = Journal { entries };
        let journal_path = self.root.join(JOURNAL_FILE);
        self.write_atomically(&journal_path, &serde_json::to_string(&journal)?)?;

        if let Err(e) = self.apply_ops(ops, first_serial) {
            self.rollback(&journal)?;
            fs::remove_file(&journal_path)?;
            fsync_dir(&self.root)?;
            return Err(e);
        }

        fs::remove_file(&journal_path)?;
        fsync_dir(&self.root)?;
        Ok(CommitOutcome::Committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        (dir, store)
    }

    fn put(store: &FileStore, key: &RecordKey, value: serde_json::Value) {
        let outcome = store
            .atomic(&[], &[AtomicOp::Put(key.clone(), value)])
            .unwrap();
        assert!(outcome.is_committed());
    }

    #[test]
    fn open_creates_layout_and_marker() {
        let (dir, _store) = test_store();
        assert!(dir.path().join("rooms").is_dir());
        assert!(dir.path().join("reservations").is_dir());
        assert!(dir.path().join("version").is_file());
    }

    #[test]
    fn reopen_accepts_current_format() {
        let dir = tempfile::tempdir().unwrap();
        drop(FileStore::open(dir.path()).unwrap());
        assert!(FileStore::open(dir.path()).is_ok());
    }

    #[test]
    fn reopen_rejects_future_format() {
        let dir = tempfile::tempdir().unwrap();
        drop(FileStore::open(dir.path()).unwrap());
        fs::write(dir.path().join("version"), r#"{"format_version": 99}"#).unwrap();
        assert!(matches!(
            FileStore::open(dir.path()),
            Err(StoreError::VersionMismatch { found: 99, .. })
        ));
    }

    #[test]
    fn roundtrip_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let key = RecordKey::room("r1");
        {
            let store = FileStore::open(dir.path()).unwrap();
            put(&store, &key, json!({"capacity": 6}));
        }
        let store = FileStore::open(dir.path()).unwrap();
        let rec = store.get(&key).unwrap().unwrap();
        assert_eq!(rec.value, json!({"capacity": 6}));
    }

    #[test]
    fn version_tokens_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let key = RecordKey::room("r1");
        let token = {
            let store = FileStore::open(dir.path()).unwrap();
            put(&store, &key, json!(1));
            store.get(&key).unwrap().unwrap().version
        };
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get(&key).unwrap().unwrap().version, token);

        // A write after reopen must move past the persisted serial.
        put(&store, &key, json!(2));
        assert_ne!(store.get(&key).unwrap().unwrap().version, token);
    }

    #[test]
    fn tampered_value_fails_integrity_check() {
        let (dir, store) = test_store();
        let key = RecordKey::room("r1");
        put(&store, &key, json!({"capacity": 6}));

        // Flip the stored value without updating the checksum.
        let path = store.record_path(&key).unwrap();
        let tampered = fs::read_to_string(&path)
            .unwrap()
            .replace("\"capacity\": 6", "\"capacity\": 60");
        fs::write(&path, tampered).unwrap();

        assert!(matches!(
            store.get(&key),
            Err(StoreError::IntegrityFailure { .. })
        ));
        drop(dir);
    }

    #[test]
    fn scan_skips_corrupt_entries() {
        let (dir, store) = test_store();
        put(&store, &RecordKey::room("r1"), json!("ok"));
        fs::write(dir.path().join("rooms").join("junk.json"), "NOT JSON").unwrap();

        let rooms = store.scan(&RecordKey::rooms_prefix()).unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].0, RecordKey::room("r1"));
    }

    #[test]
    fn scan_is_namespace_scoped() {
        let (_dir, store) = test_store();
        put(&store, &RecordKey::room("r1"), json!("room"));
        put(
            &store,
            &RecordKey::reservation("r1", "2024-10-14", "2:30 PM"),
            json!("res"),
        );
        assert_eq!(store.scan(&RecordKey::rooms_prefix()).unwrap().len(), 1);
        assert_eq!(
            store.scan(&RecordKey::reservations_prefix()).unwrap().len(),
            1
        );
    }

    #[test]
    fn absent_precondition_and_stale_token_conflict() {
        let (_dir, store) = test_store();
        let key = RecordKey::room("r1");
        put(&store, &key, json!(1));
        let stale = store.get(&key).unwrap().unwrap().version;
        put(&store, &key, json!(2));

        let outcome = store
            .atomic(
                &[Precondition::Absent(key.clone())],
                &[AtomicOp::Put(key.clone(), json!(3))],
            )
            .unwrap();
        assert_eq!(outcome, CommitOutcome::Conflict);

        let outcome = store
            .atomic(
                &[Precondition::VersionIs(key.clone(), stale)],
                &[AtomicOp::Put(key.clone(), json!(3))],
            )
            .unwrap();
        assert_eq!(outcome, CommitOutcome::Conflict);
        assert_eq!(store.get(&key).unwrap().unwrap().value, json!(2));
    }

    #[test]
    fn delete_removes_record() {
        let (_dir, store) = test_store();
        let key = RecordKey::reservation("r1", "2024-10-14", "2:30 PM");
        put(&store, &key, json!("res"));
        store
            .atomic(&[], &[AtomicOp::Delete(key.clone())])
            .unwrap();
        assert_eq!(store.get(&key).unwrap(), None);
    }

    #[test]
    fn delete_of_absent_key_is_a_no_op() {
        let (_dir, store) = test_store();
        let key = RecordKey::room("ghost");
        let outcome = store
            .atomic(&[], &[AtomicOp::Delete(key.clone())])
            .unwrap();
        assert!(outcome.is_committed());
    }

    #[test]
    fn successful_commit_leaves_no_journal() {
        let (dir, store) = test_store();
        put(&store, &RecordKey::room("r1"), json!(1));
        assert!(!dir.path().join("journal").exists());
    }

    #[test]
    fn interrupted_commit_is_rolled_back_on_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let room = RecordKey::room("r1");
        let reservation = RecordKey::reservation("r1", "2024-10-14", "2:30 PM");

        let (room_path, reservation_path, prior) = {
            let store = FileStore::open(dir.path()).unwrap();
            put(&store, &room, json!({"capacity": 6}));
            let room_path = store.record_path(&room).unwrap();
            let reservation_path = store.record_path(&reservation).unwrap();
            let prior = fs::read_to_string(&room_path).unwrap();
            (room_path, reservation_path, prior)
        };

        // Stage what a crash mid-commit leaves behind: the journal with
        // the pre-commit state, the room already rewritten, and the
        // reservation record written.
        let journal = Journal {
            entries: vec![
                JournalEntry {
                    key: room.clone(),
                    prior: Some(prior),
                },
                JournalEntry {
                    key: reservation.clone(),
                    prior: None,
                },
            ],
        };
        fs::write(
            dir.path().join("journal"),
            serde_json::to_string(&journal).unwrap(),
        )
        .unwrap();
        fs::write(&room_path, "half-written").unwrap();
        fs::write(&reservation_path, "half-written").unwrap();

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            store.get(&room).unwrap().unwrap().value,
            json!({"capacity": 6})
        );
        assert_eq!(store.get(&reservation).unwrap(), None);
        assert!(!dir.path().join("journal").exists());
    }

    #[test]
    fn time_labels_with_spaces_and_colons_are_safe_keys() {
        let (_dir, store) = test_store();
        let key = RecordKey::reservation("r1", "2024-10-14", "2:30 PM");
        put(&store, &key, json!("res"));
        let rec = store.get(&key).unwrap().unwrap();
        assert_eq!(rec.value, json!("res"));
    }
}
