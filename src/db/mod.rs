//! Database module for SQLite operations.
//!
//! This module provides:
//! - The single scoped `Session` and its pragma configuration
//! - The fixed table catalogue and DDL
//! - Schema provisioning (create, reset, seed, dump, guarded mutations)
//! - Read-only report queries

pub mod provision;
pub mod repo;
pub mod schema;
pub mod session;

pub use provision::{MutationSummary, SchemaProvisioner, SeedSummary};
pub use repo::{DumpValue, Repository};
pub use schema::Table;
pub use session::Session;
