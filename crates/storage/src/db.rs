//! sled database wrapper with transaction helpers.

use ottometer_core::ValidationError;
use sled::transaction::{
    ConflictableTransactionError, TransactionError, Transactional, TransactionalTree,
};
use sled::{Db, IVec, Tree};
use std::path::Path;
use thiserror::Error;

/// Internal tree holding one sequence counter per namespace.
const SEQUENCES_TREE: &[u8] = b"__sequences__";

/// Storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Record not found: {0}")]
    NotFound(u64),

    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[source] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Invalid key length: expected 8 bytes, got {0}")]
    InvalidKey(usize),

    #[error("Corrupt sequence counter for namespace {0:?}")]
    CorruptSequence(String),

    #[error("Deadline exceeded before commit")]
    Timeout,
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Result type inside a write transaction.
///
/// Errors from the engine (conflicts, I/O) and aborts raised with [`abort`]
/// travel through the same channel; [`Storage::write`] unwraps them back into
/// a [`StorageError`].
pub type TxResult<T> = std::result::Result<T, ConflictableTransactionError<StorageError>>;

/// Abort the running write transaction with the given error.
///
/// Nothing written earlier in the same transaction becomes visible.
pub fn abort<T>(err: StorageError) -> TxResult<T> {
    Err(ConflictableTransactionError::Abort(err))
}

/// Encode an identifier as a fixed-width storage key.
///
/// Big-endian, so sled's lexicographic key order equals identifier order.
pub fn encode_key(id: u64) -> [u8; 8] {
    id.to_be_bytes()
}

/// Decode a storage key produced by [`encode_key`].
pub fn decode_key(key: &[u8]) -> Result<u64> {
    let bytes: [u8; 8] = key
        .try_into()
        .map_err(|_| StorageError::InvalidKey(key.len()))?;
    Ok(u64::from_be_bytes(bytes))
}

/// Wrapper around a sled database.
///
/// One `Storage` is opened per process and shared by reference. Namespaces
/// map to sled trees and are created by the first write into them.
pub struct Storage {
    db: Db,
    sequences: Tree,
}

impl Storage {
    /// Open a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> Result<Self> {
        let sequences = db.open_tree(SEQUENCES_TREE)?;
        Ok(Self { db, sequences })
    }

    /// Check if a namespace has been created.
    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.db
            .tree_names()
            .iter()
            .any(|name| &**name == namespace.as_bytes())
    }

    /// Run a read-write transaction against a namespace.
    ///
    /// The namespace is created if absent. Write transactions are
    /// serializable: sled re-runs `f` when it conflicts with a concurrent
    /// writer, so `f` must not have side effects outside the transaction.
    /// The database is flushed after a successful commit. A failed flush is
    /// logged but does not turn the committed result into an error: once the
    /// transaction commits, `write` reports the committed value.
    pub fn write<F, T>(&self, namespace: &str, f: F) -> Result<T>
    where
        F: Fn(&WriteTx<'_>) -> TxResult<T>,
    {
        let tree = self.db.open_tree(namespace)?;

        let result = (&self.sequences, &tree).transaction(|(sequences, records)| {
            f(&WriteTx {
                namespace,
                sequences,
                records,
            })
        });

        let value = result.map_err(|err| match err {
            TransactionError::Abort(err) => err,
            TransactionError::Storage(err) => StorageError::Database(err),
        })?;

        Ok(committed(value, self.db.flush()))
    }

    /// Run a read-only pass over a namespace.
    ///
    /// Readers never take a lock and never block writers. A namespace that
    /// does not exist yet reads as empty and is not created.
    ///
    /// This is not a snapshot. Each `get` returns a whole committed record,
    /// but [`ReadTx::for_each`] walks the live tree, so writes that commit
    /// during the scan may or may not be visited.
    pub fn read<F, T>(&self, namespace: &str, f: F) -> Result<T>
    where
        F: FnOnce(&ReadTx) -> Result<T>,
    {
        let tree = if self.has_namespace(namespace) {
            Some(self.db.open_tree(namespace)?)
        } else {
            None
        };

        f(&ReadTx { tree })
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

/// Finish a committed write, logging a flush failure instead of reporting it.
fn committed<T>(value: T, flushed: sled::Result<usize>) -> T {
    if let Err(err) = flushed {
        tracing::warn!(error = %err, "flush after commit failed");
    }
    value
}

/// Handle passed to the closure of [`Storage::write`].
pub struct WriteTx<'t> {
    namespace: &'t str,
    sequences: &'t TransactionalTree,
    records: &'t TransactionalTree,
}

impl WriteTx<'_> {
    /// Allocate the next value of this namespace's sequence counter.
    ///
    /// The first value is 1. The counter is committed together with the rest
    /// of the transaction, so a value is never handed out twice.
    pub fn next_sequence(&self) -> TxResult<u64> {
        let Some(next) = self.current_sequence()?.checked_add(1) else {
            return abort(StorageError::CorruptSequence(self.namespace.into()));
        };

        self.sequences
            .insert(self.namespace.as_bytes(), encode_key(next).to_vec())?;
        Ok(next)
    }

    /// Move the sequence counter up to at least `value`.
    ///
    /// Called when a record is written at a caller-chosen identifier, so that
    /// [`next_sequence`](Self::next_sequence) never hands that identifier out.
    pub fn raise_sequence(&self, value: u64) -> TxResult<()> {
        if value > self.current_sequence()? {
            self.sequences
                .insert(self.namespace.as_bytes(), encode_key(value).to_vec())?;
        }
        Ok(())
    }

    fn current_sequence(&self) -> TxResult<u64> {
        match self.sequences.get(self.namespace.as_bytes())? {
            Some(bytes) => match decode_key(&bytes) {
                Ok(value) => Ok(value),
                Err(_) => abort(StorageError::CorruptSequence(self.namespace.into())),
            },
            None => Ok(0),
        }
    }

    /// Store a value under a key.
    pub fn put(&self, key: &[u8], value: Vec<u8>) -> TxResult<()> {
        self.records.insert(key, value)?;
        Ok(())
    }

    /// Read a value written before or during this transaction.
    pub fn get(&self, key: &[u8]) -> TxResult<Option<IVec>> {
        Ok(self.records.get(key)?)
    }
}

/// Handle passed to the closure of [`Storage::read`].
pub struct ReadTx {
    tree: Option<Tree>,
}

impl ReadTx {
    /// Check if the namespace exists.
    pub fn exists(&self) -> bool {
        self.tree.is_some()
    }

    /// Retrieve a raw value.
    pub fn get(&self, key: &[u8]) -> Result<Option<IVec>> {
        match &self.tree {
            Some(tree) => Ok(tree.get(key)?),
            None => Ok(None),
        }
    }

    /// Visit every key-value pair in key order.
    ///
    /// Stops at the first error returned by `f`.
    pub fn for_each<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&[u8], &[u8]) -> Result<()>,
    {
        let Some(tree) = &self.tree else {
            return Ok(());
        };

        for entry in tree.iter() {
            let (key, value) = entry?;
            f(&key, &value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_temporary() {
        let storage = Storage::open_temporary().unwrap();
        assert!(!storage.has_namespace("growunits"));
    }

    #[test]
    fn test_key_codec() {
        assert_eq!(encode_key(1), [0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(encode_key(0x0102), [0, 0, 0, 0, 0, 0, 1, 2]);
        assert_eq!(decode_key(&encode_key(u64::MAX)).unwrap(), u64::MAX);

        // Ordering of keys follows ordering of identifiers
        assert!(encode_key(255) < encode_key(256));

        assert!(matches!(
            decode_key(&[1, 2, 3]),
            Err(StorageError::InvalidKey(3))
        ));
    }

    #[test]
    fn test_write_then_read() {
        let storage = Storage::open_temporary().unwrap();

        storage
            .write("things", |tx| tx.put(b"a", b"1".to_vec()))
            .unwrap();
        assert!(storage.has_namespace("things"));

        let value = storage.read("things", |tx| tx.get(b"a")).unwrap();
        assert_eq!(value.as_deref(), Some(&b"1"[..]));

        let missing = storage.read("things", |tx| tx.get(b"b")).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_read_missing_namespace() {
        let storage = Storage::open_temporary().unwrap();

        let mut visited = 0;
        storage
            .read("nothing", |tx| {
                assert!(!tx.exists());
                assert!(tx.get(b"a")?.is_none());
                tx.for_each(|_, _| {
                    visited += 1;
                    Ok(())
                })
            })
            .unwrap();

        assert_eq!(visited, 0);
        // Reading must not create the namespace
        assert!(!storage.has_namespace("nothing"));
    }

    #[test]
    fn test_sequence_per_namespace() {
        let storage = Storage::open_temporary().unwrap();

        let a1 = storage.write("a", |tx| tx.next_sequence()).unwrap();
        let a2 = storage.write("a", |tx| tx.next_sequence()).unwrap();
        let b1 = storage.write("b", |tx| tx.next_sequence()).unwrap();

        assert_eq!((a1, a2, b1), (1, 2, 1));
    }

    #[test]
    fn test_abort_discards_writes() {
        let storage = Storage::open_temporary().unwrap();

        let result: Result<()> = storage.write("things", |tx| {
            tx.next_sequence()?;
            tx.put(b"a", b"1".to_vec())?;
            abort(StorageError::NotFound(1))
        });
        assert!(matches!(result, Err(StorageError::NotFound(1))));

        // Neither the record nor the counter moved
        let value = storage.read("things", |tx| tx.get(b"a")).unwrap();
        assert!(value.is_none());
        let next = storage.write("things", |tx| tx.next_sequence()).unwrap();
        assert_eq!(next, 1);
    }

    #[test]
    fn test_write_sees_own_writes() {
        let storage = Storage::open_temporary().unwrap();

        let seen = storage
            .write("things", |tx| {
                tx.put(b"k", b"v".to_vec())?;
                tx.get(b"k")
            })
            .unwrap();
        assert_eq!(seen.as_deref(), Some(&b"v"[..]));
    }

    #[test]
    fn test_for_each_in_key_order() {
        let storage = Storage::open_temporary().unwrap();

        storage
            .write("things", |tx| {
                for id in [300u64, 2, 40] {
                    tx.put(&encode_key(id), id.to_string().into_bytes())?;
                }
                Ok(())
            })
            .unwrap();

        let mut ids = Vec::new();
        storage
            .read("things", |tx| {
                tx.for_each(|key, _| {
                    ids.push(decode_key(key)?);
                    Ok(())
                })
            })
            .unwrap();

        assert_eq!(ids, vec![2, 40, 300]);
    }

    #[test]
    fn test_raise_sequence() {
        let storage = Storage::open_temporary().unwrap();

        storage.write("a", |tx| tx.raise_sequence(10)).unwrap();
        assert_eq!(storage.write("a", |tx| tx.next_sequence()).unwrap(), 11);

        // Never lowers the counter
        storage.write("a", |tx| tx.raise_sequence(3)).unwrap();
        assert_eq!(storage.write("a", |tx| tx.next_sequence()).unwrap(), 12);
    }

    #[test]
    fn test_sequence_exhausted_aborts() {
        let storage = Storage::open_temporary().unwrap();
        storage.write("a", |tx| tx.raise_sequence(u64::MAX)).unwrap();

        let result = storage.write("a", |tx| tx.next_sequence());
        assert!(matches!(result, Err(StorageError::CorruptSequence(ref ns)) if ns == "a"));
    }

    #[test]
    fn test_committed_ignores_flush_failure() {
        let flushed = Err(sled::Error::Unsupported("disk gone".into()));
        assert_eq!(committed(7u64, flushed), 7);
        assert_eq!(committed("ok", Ok(0)), "ok");
    }

    #[test]
    fn test_scan_sees_writes_committed_during_scan() {
        let storage = Storage::open_temporary().unwrap();
        storage
            .write("things", |tx| {
                tx.put(&encode_key(1), b"1".to_vec())?;
                tx.put(&encode_key(2), b"2".to_vec())
            })
            .unwrap();

        let mut ids = Vec::new();
        storage
            .read("things", |tx| {
                tx.for_each(|key, _| {
                    let id = decode_key(key)?;
                    if id == 1 {
                        storage.write("things", |w| w.put(&encode_key(3), b"3".to_vec()))?;
                    }
                    ids.push(id);
                    Ok(())
                })
            })
            .unwrap();

        // Records committed ahead of the cursor show up in the same pass
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_sequence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let storage = Storage::open(dir.path()).unwrap();
            storage.write("a", |tx| tx.next_sequence()).unwrap();
            storage.write("a", |tx| tx.next_sequence()).unwrap();
        }

        let storage = Storage::open(dir.path()).unwrap();
        assert!(storage.has_namespace("a"));
        let next = storage.write("a", |tx| tx.next_sequence()).unwrap();
        assert_eq!(next, 3);
    }
}
