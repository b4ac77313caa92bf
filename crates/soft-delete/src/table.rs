//! Table - one collection of rows of a given entity type
//!
//! Owns the schema, the executor, lifecycle observers and the before-find
//! phase. All selects run through the find phase before reaching the
//! executor; writes go straight through.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::backends::{DatabaseValue, QueryExecutor};
use crate::cascade::BulkDelete;
use crate::entity::Entity;
use crate::error::{ModelError, ModelResult};
use crate::events::{FindListener, ModelObserver};
use crate::observers::ObserverRegistry;
use crate::query::{Conditions, Query};
use crate::rewriter::{FindPhase, ListenerFindPhase};
use crate::schema::TableSchema;

/// Builder collecting observers and listeners before the table is sealed
pub struct TableBuilder<E: Entity> {
    schema: TableSchema,
    executor: Arc<dyn QueryExecutor>,
    observers: ObserverRegistry<E>,
    listeners: Vec<Arc<dyn FindListener>>,
}

impl<E: Entity> TableBuilder<E> {
    pub fn observer(mut self, observer: Arc<dyn ModelObserver<E>>) -> Self {
        self.observers.register(observer);
        self
    }

    pub fn find_listener(mut self, listener: Arc<dyn FindListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn build(self) -> Table<E> {
        Table {
            schema: Arc::new(self.schema),
            executor: self.executor,
            observers: self.observers,
            find_phase: Arc::new(ListenerFindPhase::new(self.listeners)),
            _entity: PhantomData,
        }
    }
}

pub struct Table<E: Entity> {
    schema: Arc<TableSchema>,
    executor: Arc<dyn QueryExecutor>,
    observers: ObserverRegistry<E>,
    find_phase: Arc<dyn FindPhase>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Table<E> {
    pub fn builder(schema: TableSchema, executor: Arc<dyn QueryExecutor>) -> TableBuilder<E> {
        TableBuilder {
            schema,
            executor,
            observers: ObserverRegistry::new(),
            listeners: Vec::new(),
        }
    }

    /// A table without observers or listeners
    pub fn new(schema: TableSchema, executor: Arc<dyn QueryExecutor>) -> Self {
        Self::builder(schema, executor).build()
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub(crate) fn schema_handle(&self) -> Arc<TableSchema> {
        self.schema.clone()
    }

    pub fn table_name(&self) -> &str {
        self.schema.table_name()
    }

    pub fn alias(&self) -> &str {
        self.schema.alias()
    }

    pub fn primary_key(&self) -> &[String] {
        self.schema.primary_key_columns()
    }

    pub fn observers(&self) -> &ObserverRegistry<E> {
        &self.observers
    }

    /// Wrap the current find phase
    pub fn decorate_find_phase<F>(&mut self, decorate: F)
    where
        F: FnOnce(Arc<dyn FindPhase>) -> Arc<dyn FindPhase>,
    {
        self.find_phase = decorate(self.find_phase.clone());
    }

    /// A fresh select query on this table
    pub fn query(&self) -> Query {
        Query::aliased(self.schema.table_name(), self.schema.alias())
    }

    /// A query on the bare table name, for writes
    pub(crate) fn write_query(&self) -> Query {
        Query::new(self.schema.table_name())
    }

    /// Run the before-find phase on `query`. No-op for anything but an
    /// unrewritten select.
    pub async fn trigger_before_find(&self, query: &mut Query) -> ModelResult<()> {
        self.find_phase.trigger_before_find(query).await
    }

    /// Execute a query and return the affected rows count
    pub async fn execute(&self, mut query: Query) -> ModelResult<u64> {
        self.trigger_before_find(&mut query).await?;
        let affected = self.executor.execute(&query).await?;
        debug!(
            "{:?} on {} affected {} row(s)",
            query.query_type(),
            self.table_name(),
            affected
        );
        Ok(affected)
    }

    /// Execute a select and hydrate entities
    pub async fn all(&self, mut query: Query) -> ModelResult<Vec<E>> {
        self.trigger_before_find(&mut query).await?;
        let rows = self.executor.fetch_all(&query).await?;
        rows.into_iter().map(E::from_fields).collect()
    }

    /// Execute a select and return the first entity
    pub async fn first(&self, query: Query) -> ModelResult<Option<E>> {
        let mut results = self.all(query.limit(1)).await?;
        Ok(results.pop())
    }

    /// Entities matching `conditions`
    pub async fn find(&self, conditions: impl Into<Conditions>) -> ModelResult<Vec<E>> {
        self.all(self.query().where_all(conditions)).await
    }

    /// Look an entity up by a single-column primary key
    pub async fn get<T: Into<DatabaseValue>>(&self, id: T) -> ModelResult<Option<E>> {
        let query = self.key_query(id.into())?;
        self.first(query).await
    }

    pub(crate) fn key_query(&self, id: DatabaseValue) -> ModelResult<Query> {
        match self.primary_key() {
            [column] => Ok(self.query().where_eq(&self.schema.alias_field(column), id)),
            columns => Err(ModelError::InvalidArgument(format!(
                "{} has a composite primary key ({}); look it up with conditions",
                self.table_name(),
                columns.join(", ")
            ))),
        }
    }

    /// Conditions matching the entity's primary key, or `None` if any key value is missing
    pub fn primary_key_conditions(&self, entity: &E) -> Option<Conditions> {
        let primary_key = self.primary_key();
        if primary_key.is_empty() || !entity.has(primary_key) {
            return None;
        }

        let mut conditions = Conditions::new();
        for (column, value) in entity.extract(primary_key) {
            conditions = conditions.eq(&column, self.schema.typed_value(&column, &value));
        }
        Some(conditions)
    }

    /// Insert a new entity or update a persisted one.
    ///
    /// Only columns declared in the schema are written. Returns `None` when
    /// an update matched no row.
    pub async fn save(&self, mut entity: E) -> ModelResult<Option<E>> {
        self.observers.trigger_saving(&mut entity).await?;

        let fields = entity.to_fields();
        let affected = if entity.is_new() {
            let values: Vec<(String, DatabaseValue)> = fields
                .iter()
                .filter(|(column, _)| self.schema.has_column(column))
                .map(|(column, value)| (column.clone(), self.schema.typed_value(column, value)))
                .collect();
            self.execute(self.write_query().insert().set_values(values)).await?
        } else {
            let conditions = self.primary_key_conditions(&entity).ok_or_else(|| {
                ModelError::InvalidArgument("Saving requires all primary key values.".to_string())
            })?;
            let primary_key = self.primary_key();
            let values: Vec<(String, DatabaseValue)> = fields
                .iter()
                .filter(|(column, _)| {
                    self.schema.has_column(column) && !primary_key.contains(*column)
                })
                .map(|(column, value)| (column.clone(), self.schema.typed_value(column, value)))
                .collect();
            if values.is_empty() {
                return Ok(Some(entity));
            }
            self.execute(self.write_query().update().set_values(values).where_all(conditions))
                .await?
        };

        if affected == 0 {
            debug!("Save on {} matched no row", self.table_name());
            return Ok(None);
        }

        entity.mark_persisted();
        self.observers.trigger_saved(&entity).await?;
        Ok(Some(entity))
    }
}

/// Bulk delete on a plain table removes the rows
#[async_trait]
impl<E: Entity> BulkDelete for Table<E> {
    fn table_name(&self) -> &str {
        self.schema.table_name()
    }

    async fn delete_all(&self, conditions: Conditions) -> ModelResult<u64> {
        self.execute(self.write_query().delete().where_all(conditions)).await
    }
}
