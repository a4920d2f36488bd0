//! Persistent storage layer for ottometer.
//!
//! This crate provides the storage backend for grow units:
//! - Namespaced, transactional access to an embedded sled database
//! - Per-namespace sequence counters for identifier allocation
//! - Fixed-width identifier keys
//! - The grow unit repository (create, list, get, update)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Application Layer                     │
//! │                (HTTP handlers, CLI commands)             │
//! └────────────────────────┬────────────────────────────────┘
//!                          │
//! ┌────────────────────────▼────────────────────────────────┐
//! │                   Storage Layer                          │
//! │  ┌──────────────────┐        ┌────────────────────────┐  │
//! │  │ GrowUnitStore    │        │ Storage (DB)           │  │
//! │  │  - validation    │───────▶│  - sled wrapper        │  │
//! │  │  - id allocation │        │  - read/write txs      │  │
//! │  │  - JSON records  │        │  - sequence counters   │  │
//! │  └──────────────────┘        └────────────────────────┘  │
//! └────────────────────────┬────────────────────────────────┘
//!                          │
//! ┌────────────────────────▼────────────────────────────────┐
//! │                    sled Database                         │
//! │              (Embedded Key-Value Store)                  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use ottometer_core::{GrowMedium, GrowUnit};
//! use ottometer_storage::{GrowUnitStore, Storage};
//!
//! // Open database
//! let storage = Storage::open("./ottometer.db").unwrap();
//!
//! // Work with grow units
//! let store = GrowUnitStore::new(&storage);
//! let tent = GrowUnit {
//!     width: 100,
//!     height: 200,
//!     depth: 50,
//!     grow_medium: GrowMedium::Dirt,
//!     ..Default::default()
//! };
//! let id = store.create(&tent).unwrap();
//! assert_eq!(store.get(id).unwrap().volume(), 1_000_000);
//! ```

pub mod db;
pub mod growunit;

// Re-export commonly used types
pub use db::{
    abort, decode_key, encode_key, ReadTx, Result, Storage, StorageError, TxResult, WriteTx,
};
pub use growunit::{GrowUnitStore, GROW_UNIT_NAMESPACE};
