//! # elif-soft-delete: Soft Deletes for elif.rs Tables
//!
//! Marks rows as deleted with a nullable timestamp column instead of removing
//! them, and keeps those rows out of ordinary reads.
//!
//! A `Table` is attached to a `SoftDeletePolicy`, which provides `delete`,
//! `delete_all`, `hard_delete`, `hard_delete_all` and `restore`, and decorates
//! the table's find phase so every plain select gets `<field> IS NULL`
//! appended exactly once. Queries built with `with_deleted()` see all rows.

pub mod backends;
pub mod cascade;
pub mod config;
pub mod entity;
pub mod error;
pub mod event_error;
pub mod events;
pub mod observers;
pub mod options;
pub mod query;
pub mod rewriter;
pub mod rules;
pub mod schema;
pub mod soft_delete;
pub mod table;

// Re-export core traits and types
pub use backends::{DatabaseValue, MemoryExecutor, PostgresExecutor, QueryExecutor, Row};
pub use cascade::{Association, AssociationCascade, AssociationKind, BulkDelete, CascadeDeleter, NoCascade};
pub use config::{ConfigError, SoftDeleteConfig, DEFAULT_SOFT_DELETE_FIELD};
pub use entity::{Entity, Record};
pub use error::{ModelError, ModelResult};
pub use event_error::EventError;
pub use events::{EventOutcome, FindListener, ModelObserver};
pub use observers::ObserverRegistry;
pub use options::DeleteOptions;
pub use query::*;
pub use rewriter::{FindPhase, ListenerFindPhase, SoftDeleteFindPhase};
pub use rules::{Rules, RulesChecker};
pub use schema::{ColumnType, TableSchema};
pub use soft_delete::{SoftDeleteColumn, SoftDeletePolicy};
pub use table::{Table, TableBuilder};
