//! Before-find phase and the soft-delete read filter
//!
//! Every select a `Table` executes first goes through its `FindPhase`. The
//! base phase fires the table's find listeners; `SoftDeleteFindPhase`
//! decorates it and appends `<alias>.<field> IS NULL` unless the query
//! carries the `withDeleted` marker. Both phases act only while the query is
//! still `Unrewritten`, so re-running the phase on the same query instance
//! never stacks filters.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use crate::error::ModelResult;
use crate::events::FindListener;
use crate::query::{Query, WhereCondition, WITH_DELETED};
use crate::soft_delete::SoftDeleteColumn;

/// The step run on a query right before its first execution
#[async_trait]
pub trait FindPhase: Send + Sync {
    async fn trigger_before_find(&self, query: &mut Query) -> ModelResult<()>;
}

/// Base phase: runs find listeners once per select query
#[derive(Default)]
pub struct ListenerFindPhase {
    listeners: Vec<Arc<dyn FindListener>>,
}

impl ListenerFindPhase {
    pub fn new(listeners: Vec<Arc<dyn FindListener>>) -> Self {
        Self { listeners }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[async_trait]
impl FindPhase for ListenerFindPhase {
    async fn trigger_before_find(&self, query: &mut Query) -> ModelResult<()> {
        if !query.is_select() || query.is_rewritten() {
            return Ok(());
        }
        query.mark_rewritten();

        for listener in &self.listeners {
            listener.before_find(query).await?;
        }
        Ok(())
    }
}

/// Decorator that hides soft-deleted rows from plain selects
pub struct SoftDeleteFindPhase {
    inner: Arc<dyn FindPhase>,
    column: Arc<SoftDeleteColumn>,
}

impl SoftDeleteFindPhase {
    pub fn new(inner: Arc<dyn FindPhase>, column: Arc<SoftDeleteColumn>) -> Self {
        Self { inner, column }
    }
}

#[async_trait]
impl FindPhase for SoftDeleteFindPhase {
    async fn trigger_before_find(&self, query: &mut Query) -> ModelResult<()> {
        if !query.is_select() || query.is_rewritten() {
            return Ok(());
        }

        // Resolve before delegating: a missing column must fail while the
        // query is still unrewritten.
        let aliased_field = self.column.aliased()?;

        // The filter goes in even when a listener fails: the inner phase may
        // already have marked the query rewritten.
        let listeners = self.inner.trigger_before_find(query).await;

        if !query.has_option(WITH_DELETED) {
            trace!("Restricting {} to {} IS NULL", query.table(), aliased_field);
            query.and_where(WhereCondition::is_null(&aliased_field));
        }
        query.mark_rewritten();
        listeners
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SoftDeleteConfig;
    use crate::error::ModelError;
    use crate::event_error::EventError;
    use crate::query::{QueryOperator, RewriteState};
    use crate::schema::TableSchema;
    use std::sync::Mutex;

    struct RecordingListener {
        seen: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl FindListener for RecordingListener {
        async fn before_find(&self, query: &mut Query) -> Result<(), EventError> {
            self.seen.lock().unwrap().push(query.conditions().len());
            query.and_where(WhereCondition::eq("orders.tenant_id", 1));
            Ok(())
        }
    }

    fn orders_schema() -> Arc<TableSchema> {
        Arc::new(
            TableSchema::new("orders")
                .alias_as("Orders")
                .id("id")
                .integer("tenant_id")
                .timestamp("deleted"),
        )
    }

    fn phase(listener: Arc<RecordingListener>, schema: Arc<TableSchema>) -> SoftDeleteFindPhase {
        let listeners: Vec<Arc<dyn FindListener>> = vec![listener];
        let base: Arc<dyn FindPhase> = Arc::new(ListenerFindPhase::new(listeners));
        let column = Arc::new(SoftDeleteColumn::new(schema, SoftDeleteConfig::default()));
        SoftDeleteFindPhase::new(base, column)
    }

    fn listener() -> Arc<RecordingListener> {
        Arc::new(RecordingListener {
            seen: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_filter_appended_after_listeners() {
        let listener = listener();
        let phase = phase(listener.clone(), orders_schema());
        let mut query = Query::aliased("orders", "Orders");

        phase.trigger_before_find(&mut query).await.unwrap();

        assert_eq!(*listener.seen.lock().unwrap(), vec![0]);
        assert_eq!(query.conditions().len(), 2);
        assert_eq!(query.conditions()[0].column, "orders.tenant_id");
        assert_eq!(query.conditions()[1], WhereCondition::is_null("Orders.deleted"));
        assert_eq!(query.rewrite_state(), RewriteState::Rewritten);
    }

    #[tokio::test]
    async fn test_rewrite_happens_once() {
        let listener = listener();
        let phase = phase(listener.clone(), orders_schema());
        let mut query = Query::aliased("orders", "Orders");

        phase.trigger_before_find(&mut query).await.unwrap();
        phase.trigger_before_find(&mut query).await.unwrap();
        let mut reused = query.clone();
        phase.trigger_before_find(&mut reused).await.unwrap();

        let null_filters = reused
            .conditions()
            .iter()
            .filter(|c| c.operator == QueryOperator::IsNull)
            .count();
        assert_eq!(null_filters, 1);
        assert_eq!(listener.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_with_deleted_skips_filter_but_runs_listeners() {
        let listener = listener();
        let phase = phase(listener.clone(), orders_schema());
        let mut query = Query::aliased("orders", "Orders").with_deleted();

        phase.trigger_before_find(&mut query).await.unwrap();

        assert_eq!(query.conditions().len(), 1);
        assert_eq!(listener.seen.lock().unwrap().len(), 1);
        assert!(query.is_rewritten());
    }

    #[tokio::test]
    async fn test_non_select_queries_pass_through() {
        let listener = listener();
        let phase = phase(listener.clone(), orders_schema());

        for mut query in [
            Query::new("orders").update().set("tenant_id", 2),
            Query::new("orders").delete(),
            Query::new("orders").insert().set("id", 1),
        ] {
            phase.trigger_before_find(&mut query).await.unwrap();
            assert!(query.conditions().is_empty());
            assert_eq!(query.rewrite_state(), RewriteState::Unrewritten);
        }
        assert!(listener.seen.lock().unwrap().is_empty());
    }

    struct FailingListener;

    #[async_trait]
    impl FindListener for FailingListener {
        async fn before_find(&self, _query: &mut Query) -> Result<(), EventError> {
            Err(EventError::observer("tenant lookup failed"))
        }
    }

    #[tokio::test]
    async fn test_failed_listener_still_gets_filter() {
        let listeners: Vec<Arc<dyn FindListener>> = vec![Arc::new(FailingListener)];
        let base: Arc<dyn FindPhase> = Arc::new(ListenerFindPhase::new(listeners));
        let column = Arc::new(SoftDeleteColumn::new(orders_schema(), SoftDeleteConfig::default()));
        let phase = SoftDeleteFindPhase::new(base, column);
        let mut query = Query::aliased("orders", "Orders");

        let result = phase.trigger_before_find(&mut query).await;
        assert!(matches!(result, Err(ModelError::Event(_))));
        assert!(query.is_rewritten());
        assert_eq!(query.conditions(), &[WhereCondition::is_null("Orders.deleted")]);

        phase.trigger_before_find(&mut query).await.unwrap();
        assert_eq!(query.conditions().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_column_leaves_query_unrewritten() {
        let listener = listener();
        let schema = Arc::new(TableSchema::new("orders").id("id"));
        let phase = phase(listener.clone(), schema);
        let mut query = Query::new("orders");

        let result = phase.trigger_before_find(&mut query).await;

        assert!(matches!(result, Err(ModelError::MissingColumn { .. })));
        assert!(!query.is_rewritten());
        assert!(listener.seen.lock().unwrap().is_empty());
    }
}
