//! SQL query modules for the PostgreSQL storage backend.
//!
//! Every function runs on the connection of an open transaction, so the
//! session decides what gets committed.

pub mod conditions;
pub mod gates;
pub mod metrics;
pub mod properties;
