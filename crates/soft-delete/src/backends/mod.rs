//! Database Backends
//!
//! `QueryExecutor` implementations: an in-memory store and PostgreSQL.

pub mod core;
pub mod memory;
pub mod postgres;

pub use self::core::{
    format_timestamp, parse_timestamp, DatabaseValue, QueryExecutor, Row, TIMESTAMP_FORMAT,
};
pub use memory::MemoryExecutor;
pub use postgres::PostgresExecutor;
