//! ottometer-server — HTTP front end for the grow unit store.
//!
//! Request handling lives in [`api`]; the storage rules (validation,
//! identifier allocation, transactions) live in `ottometer-storage`.

/// REST API layer: Axum router, handlers, errors and response models.
pub mod api;
/// Default settings for the server binary.
pub mod config;
