//! PostgreSQL executor backed by a sqlx pool

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions};
use sqlx::query::Query as SqlxQuery;
use sqlx::{Postgres, Row as _};
use tracing::{debug, error};

use super::core::{DatabaseValue, QueryExecutor, Row};
use crate::error::{ModelError, ModelResult};
use crate::query::Query;

pub struct PostgresExecutor {
    pool: PgPool,
}

impl PostgresExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a new pool to `database_url`
    pub async fn connect(database_url: &str, max_connections: u32) -> ModelResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| {
                error!("Failed to create database pool: {}", e);
                ModelError::Database(format!("Failed to connect: {}", e))
            })?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Timestamp columns are `TIMESTAMP` holding UTC wall-clock time. Binding
/// the naive value keeps the session `TimeZone` out of writes and comparisons.
fn timestamp_param(timestamp: &DateTime<Utc>) -> NaiveDateTime {
    timestamp.naive_utc()
}

/// Bind a value with the Postgres type matching its variant
fn bind_value<'q>(
    query: SqlxQuery<'q, Postgres, PgArguments>,
    value: &DatabaseValue,
) -> SqlxQuery<'q, Postgres, PgArguments> {
    match value {
        DatabaseValue::Null => query.bind(None::<String>),
        DatabaseValue::Bool(b) => query.bind(*b),
        DatabaseValue::Int64(i) => query.bind(*i),
        DatabaseValue::Float64(f) => query.bind(*f),
        DatabaseValue::String(s) => query.bind(s.clone()),
        DatabaseValue::Uuid(u) => query.bind(*u),
        DatabaseValue::DateTime(dt) => query.bind(timestamp_param(dt)),
        DatabaseValue::Json(j) => query.bind(sqlx::types::Json(j.clone())),
    }
}

#[async_trait]
impl QueryExecutor for PostgresExecutor {
    async fn execute(&self, query: &Query) -> ModelResult<u64> {
        let (sql, params) = query.to_sql_with_params();
        debug!("Executing: {}", sql);

        let mut statement = sqlx::query(&sql);
        for param in &params {
            statement = bind_value(statement, param);
        }

        let result = statement.execute(&self.pool).await.map_err(|e| {
            ModelError::Database(format!("Failed to execute on {}: {}", query.table(), e))
        })?;
        Ok(result.rows_affected())
    }

    async fn fetch_all(&self, query: &Query) -> ModelResult<Vec<Row>> {
        let (sql, params) = query.to_sql_with_params();
        let wrapped = format!("SELECT row_to_json(q) AS row FROM ({}) q", sql);
        debug!("Fetching: {}", wrapped);

        let mut statement = sqlx::query(&wrapped);
        for param in &params {
            statement = bind_value(statement, param);
        }

        let rows = statement.fetch_all(&self.pool).await.map_err(|e| {
            ModelError::Database(format!("Failed to fetch {}: {}", query.table(), e))
        })?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let sqlx::types::Json(value): sqlx::types::Json<JsonValue> = row.try_get("row")?;
            match value {
                JsonValue::Object(fields) => results.push(fields),
                other => {
                    return Err(ModelError::Serialization(format!(
                        "expected a row object, got {}",
                        other
                    )))
                }
            }
        }

        Ok(results)
    }
}
