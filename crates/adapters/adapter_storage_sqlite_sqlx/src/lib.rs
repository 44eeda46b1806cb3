//! # pumphouse-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `SettingsStore` port on a singleton JSON document row
//! - Implement the `AuditSink`/`AuditQuery` ports on an append-only table
//! - Manage the `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//!
//! ## Dependency rule
//! Depends on `pumphouse-engine` (for port traits) and `pumphouse-domain`
//! (for domain types). The `engine` and `domain` crates must never
//! reference this adapter.

mod audit_log;
mod error;
mod pool;
mod settings_store;

pub use audit_log::SqliteAuditLog;
pub use error::StorageError;
pub use pool::{Config, Database};
pub use settings_store::SqliteSettingsStore;
