//! Soft-delete policy
//!
//! `SoftDeletePolicy` wraps a `Table` and replaces physical deletes with a
//! timestamp written to the configured column. Attaching the policy also
//! decorates the table's find phase so that plain selects only see rows
//! whose column is still null.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use once_cell::sync::OnceCell;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::backends::DatabaseValue;
use crate::cascade::{BulkDelete, CascadeDeleter, NoCascade};
use crate::config::SoftDeleteConfig;
use crate::entity::Entity;
use crate::error::{ModelError, ModelResult};
use crate::events::EventOutcome;
use crate::options::DeleteOptions;
use crate::query::{Conditions, Query};
use crate::rewriter::SoftDeleteFindPhase;
use crate::rules::RulesChecker;
use crate::schema::TableSchema;
use crate::table::Table;

/// The configured soft-delete column of one table.
///
/// The schema check runs on first use. A successful lookup is kept; a
/// failed one is repeated on the next call.
pub struct SoftDeleteColumn {
    schema: Arc<TableSchema>,
    config: SoftDeleteConfig,
    resolved: OnceCell<String>,
}

impl SoftDeleteColumn {
    pub fn new(schema: Arc<TableSchema>, config: SoftDeleteConfig) -> Self {
        Self {
            schema,
            config,
            resolved: OnceCell::new(),
        }
    }

    /// Column name, or `MissingColumn` if the schema lacks it
    pub fn name(&self) -> ModelResult<&str> {
        self.resolved
            .get_or_try_init(|| {
                if self.schema.has_column(&self.config.field) {
                    Ok(self.config.field.clone())
                } else {
                    Err(ModelError::missing_column(
                        &self.config.field,
                        self.schema.table_name(),
                    ))
                }
            })
            .map(String::as_str)
    }

    /// Column name qualified with the table alias
    pub fn aliased(&self) -> ModelResult<String> {
        Ok(self.schema.alias_field(self.name()?))
    }
}

/// Soft-delete behaviour attached to a table
pub struct SoftDeletePolicy<E: Entity> {
    table: Arc<Table<E>>,
    column: Arc<SoftDeleteColumn>,
    cascade: Arc<dyn CascadeDeleter<E>>,
    rules: Option<Arc<dyn RulesChecker<E>>>,
}

impl<E: Entity> SoftDeletePolicy<E> {
    /// Take over `table` and hide soft-deleted rows from its selects
    pub fn attach(mut table: Table<E>, config: SoftDeleteConfig) -> Self {
        let column = Arc::new(SoftDeleteColumn::new(table.schema_handle(), config));

        let filter_column = column.clone();
        table.decorate_find_phase(move |inner| {
            Arc::new(SoftDeleteFindPhase::new(inner, filter_column))
        });

        Self {
            table: Arc::new(table),
            column,
            cascade: Arc::new(NoCascade),
            rules: None,
        }
    }

    pub fn with_cascade(mut self, cascade: Arc<dyn CascadeDeleter<E>>) -> Self {
        self.cascade = cascade;
        self
    }

    pub fn with_rules(mut self, rules: Arc<dyn RulesChecker<E>>) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn table(&self) -> &Table<E> {
        &self.table
    }

    /// Name of the soft-delete column
    pub fn soft_delete_field(&self) -> ModelResult<String> {
        self.column.name().map(str::to_string)
    }

    /// True when the entity carries a soft-delete timestamp
    pub fn is_soft_deleted(&self, entity: &E) -> ModelResult<bool> {
        let field = self.column.name()?;
        Ok(entity.get(field).map(|v| !v.is_null()).unwrap_or(false))
    }

    /// Soft delete a single entity.
    ///
    /// Returns `false` for unsaved entities, failed rules and rows that no
    /// longer exist. An observer veto returns the vetoing result.
    pub async fn delete(&self, entity: &E, options: DeleteOptions) -> ModelResult<bool> {
        if entity.is_new() {
            return Ok(false);
        }

        let conditions = self.table.primary_key_conditions(entity).ok_or_else(|| {
            ModelError::InvalidArgument("Deleting requires all primary key values.".to_string())
        })?;

        if options.check_rules {
            if let Some(rules) = &self.rules {
                if !rules.check_delete(entity, &options) {
                    debug!("Delete rules rejected a row of {}", self.table.table_name());
                    return Ok(false);
                }
            }
        }

        if let EventOutcome::Veto(result) = self
            .table
            .observers()
            .trigger_before_delete(entity, &options)
            .await?
        {
            debug!("Delete on {} vetoed with {}", self.table.table_name(), result);
            return Ok(result);
        }

        let field = self.column.name()?;

        self.cascade
            .cascade_delete(entity, &options.for_cascade())
            .await?;

        let query = self
            .table
            .write_query()
            .update()
            .set(field, now())
            .where_all(conditions);
        if self.table.execute(query).await? == 0 {
            return Ok(false);
        }

        self.table
            .observers()
            .trigger_after_delete(entity, &options)
            .await?;
        Ok(true)
    }

    /// Mark every row matching `conditions` as deleted. No cascades, no events.
    pub async fn delete_all(&self, conditions: impl Into<Conditions>) -> ModelResult<u64> {
        let field = self.column.name()?;
        let query = self
            .table
            .write_query()
            .update()
            .set(field, now())
            .where_all(conditions);

        let affected = self.table.execute(query).await?;
        debug!("Soft deleted {} row(s) of {}", affected, self.table.table_name());
        Ok(affected)
    }

    /// Soft delete with the usual cascades and events, then remove the row
    pub async fn hard_delete(&self, entity: &E) -> ModelResult<bool> {
        if !self.delete(entity, DeleteOptions::default()).await? {
            return Ok(false);
        }

        let conditions = self.table.primary_key_conditions(entity).ok_or_else(|| {
            ModelError::InvalidArgument("Deleting requires all primary key values.".to_string())
        })?;
        let removed = self
            .table
            .execute(self.table.write_query().delete().where_all(conditions))
            .await?;
        Ok(removed > 0)
    }

    /// Remove rows soft deleted at or before `until`. Active rows are kept.
    pub async fn hard_delete_all(&self, until: DateTime<Utc>) -> ModelResult<u64> {
        let field = self.column.name()?;
        let query = self.table.write_query().delete().where_all(
            Conditions::new()
                .not_null(field)
                .lte(field, DatabaseValue::DateTime(until)),
        );

        let removed = self.table.execute(query).await?;
        info!(
            "Purged {} soft deleted row(s) from {} up to {}",
            removed,
            self.table.table_name(),
            until
        );
        Ok(removed)
    }

    /// Clear the soft-delete column and save the entity
    pub async fn restore(&self, mut entity: E) -> ModelResult<Option<E>> {
        let field = self.column.name()?;
        entity.set(field, JsonValue::Null)?;
        self.table.save(entity).await
    }

    /// A select on the table; soft-deleted rows are filtered when it runs
    pub fn query(&self) -> Query {
        self.table.query()
    }

    pub async fn all(&self, query: Query) -> ModelResult<Vec<E>> {
        self.table.all(query).await
    }

    pub async fn find(&self, conditions: impl Into<Conditions>) -> ModelResult<Vec<E>> {
        self.table.find(conditions).await
    }

    /// Like `find`, including soft-deleted rows
    pub async fn find_with_deleted(
        &self,
        conditions: impl Into<Conditions>,
    ) -> ModelResult<Vec<E>> {
        self.table
            .all(self.query().where_all(conditions).with_deleted())
            .await
    }

    pub async fn get<T: Into<DatabaseValue>>(&self, id: T) -> ModelResult<Option<E>> {
        self.table.get(id).await
    }

    pub async fn get_with_deleted<T: Into<DatabaseValue>>(&self, id: T) -> ModelResult<Option<E>> {
        let query = self.table.key_query(id.into())?;
        self.table.first(query.with_deleted()).await
    }
}

/// Cascades into a soft-delete table mark the rows instead of removing them
#[async_trait]
impl<E: Entity> BulkDelete for SoftDeletePolicy<E> {
    fn table_name(&self) -> &str {
        self.table.table_name()
    }

    async fn delete_all(&self, conditions: Conditions) -> ModelResult<u64> {
        SoftDeletePolicy::delete_all(self, conditions).await
    }
}

fn now() -> DatabaseValue {
    DatabaseValue::DateTime(Utc::now().trunc_subsecs(0))
}
