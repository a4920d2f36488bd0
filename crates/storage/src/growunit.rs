//! Grow unit persistence.

use crate::db::{abort, encode_key, Result, Storage, StorageError, TxResult};
use ottometer_core::GrowUnit;
use std::time::Instant;

/// Namespace holding all grow units.
pub const GROW_UNIT_NAMESPACE: &str = "growunits";

/// Creates, reads and updates grow units.
///
/// Records are stored as JSON under their big-endian identifier. Every
/// operation runs in exactly one storage transaction.
pub struct GrowUnitStore<'a> {
    storage: &'a Storage,
    deadline: Option<Instant>,
}

impl<'a> GrowUnitStore<'a> {
    /// Create a new GrowUnitStore wrapping the given storage.
    pub fn new(storage: &'a Storage) -> Self {
        Self {
            storage,
            deadline: None,
        }
    }

    /// Abort writes that would commit after `deadline`.
    ///
    /// The check runs inside the transaction, right before commit, so a
    /// write that fails with [`StorageError::Timeout`] left nothing behind.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    fn check_deadline(&self) -> TxResult<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => abort(StorageError::Timeout),
            _ => Ok(()),
        }
    }

    /// Validate and insert a new grow unit.
    ///
    /// The identifier on `unit` is ignored; a fresh one is allocated from the
    /// namespace's sequence counter and returned. Identifiers already holding
    /// a record are skipped. Invalid records are rejected before any
    /// transaction is opened.
    pub fn create(&self, unit: &GrowUnit) -> Result<u64> {
        unit.verify()?;

        let id = self.storage.write(GROW_UNIT_NAMESPACE, |tx| {
            let mut id = tx.next_sequence()?;
            while tx.get(&encode_key(id))?.is_some() {
                id = tx.next_sequence()?;
            }
            let value = match serde_json::to_vec(&unit.with_id(id)) {
                Ok(value) => value,
                Err(err) => return abort(StorageError::Serialization(err)),
            };
            tx.put(&encode_key(id), value)?;
            self.check_deadline()?;
            Ok(id)
        })?;

        tracing::debug!(id, "created grow unit");
        Ok(id)
    }

    /// List every stored grow unit in identifier order.
    ///
    /// An empty or never-written namespace yields an empty list. A single
    /// undecodable record fails the whole call.
    pub fn list(&self) -> Result<Vec<GrowUnit>> {
        self.storage.read(GROW_UNIT_NAMESPACE, |tx| {
            let mut units = Vec::new();
            tx.for_each(|_, value| {
                units.push(decode(value)?);
                Ok(())
            })?;
            Ok(units)
        })
    }

    /// Get a grow unit by identifier.
    pub fn get(&self, id: u64) -> Result<GrowUnit> {
        let key = encode_key(id);
        let value = self.storage.read(GROW_UNIT_NAMESPACE, |tx| tx.get(&key))?;

        match value {
            Some(bytes) => decode(&bytes),
            None => Err(StorageError::NotFound(id)),
        }
    }

    /// Validate and store a grow unit at the given identifier.
    ///
    /// This is an upsert: the identifier does not have to exist, and the
    /// identifier carried by `unit` is replaced with `id`. The sequence
    /// counter is raised to `id` so a later create never reuses it.
    pub fn update(&self, unit: &GrowUnit, id: u64) -> Result<u64> {
        unit.verify()?;

        let value = serde_json::to_vec(&unit.with_id(id)).map_err(StorageError::Serialization)?;
        let key = encode_key(id);

        self.storage.write(GROW_UNIT_NAMESPACE, |tx| {
            tx.put(&key, value.clone())?;
            tx.raise_sequence(id)?;
            self.check_deadline()
        })?;

        tracing::debug!(id, "updated grow unit");
        Ok(id)
    }
}

fn decode(bytes: &[u8]) -> Result<GrowUnit> {
    serde_json::from_slice(bytes).map_err(StorageError::Deserialization)
}
