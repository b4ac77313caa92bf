use async_trait::async_trait;

use crate::event_error::EventError;
use crate::options::DeleteOptions;
use crate::query::Query;

/// Result of a `before_delete` notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Continue with the delete
    Proceed,
    /// Stop the delete and report this result instead
    Veto(bool),
}

/// Lifecycle observer attached to a table
#[async_trait]
pub trait ModelObserver<T>: Send + Sync {
    async fn before_delete(
        &self,
        _model: &T,
        _options: &DeleteOptions,
    ) -> Result<EventOutcome, EventError> {
        Ok(EventOutcome::Proceed)
    }

    async fn after_delete(&self, _model: &T, _options: &DeleteOptions) -> Result<(), EventError> {
        Ok(())
    }

    async fn saving(&self, _model: &mut T) -> Result<(), EventError> {
        Ok(())
    }

    async fn saved(&self, _model: &T) -> Result<(), EventError> {
        Ok(())
    }
}

/// Hook run once per select query, before it first executes
#[async_trait]
pub trait FindListener: Send + Sync {
    async fn before_find(&self, query: &mut Query) -> Result<(), EventError>;
}
