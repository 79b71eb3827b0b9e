//! In-memory storage backend for quality gate registration.
//!
//! This crate provides an in-memory implementation of the `GateStore` trait
//! from `qualitygate-storage`. Each session works on a copy of the tables and
//! publishes it atomically on commit, which gives the same all-or-nothing
//! behaviour as the PostgreSQL backend without a database.
//!
//! # Example
//!
//! ```ignore
//! use qualitygate_db_memory::InMemoryGateStore;
//! use qualitygate_storage::{GateStore, NewQualityGate};
//!
//! let store = InMemoryGateStore::new();
//! let mut session = store.begin().await?;
//! session.insert_gate(&NewQualityGate::built_in("Sonar way")).await?;
//! session.commit().await?;
//! ```

mod session;
mod storage;

// Re-export the storage traits for convenience
pub use qualitygate_storage::{GateStore, Session, StorageError};

pub use session::InMemorySession;
pub use storage::InMemoryGateStore;
