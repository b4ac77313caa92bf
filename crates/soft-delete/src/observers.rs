use std::sync::Arc;

use crate::event_error::EventError;
use crate::events::{EventOutcome, ModelObserver};
use crate::options::DeleteOptions;

pub struct ObserverRegistry<T> {
    observers: Vec<Arc<dyn ModelObserver<T>>>,
}

impl<T> ObserverRegistry<T> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub fn register(&mut self, observer: Arc<dyn ModelObserver<T>>) {
        self.observers.push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Notify observers in registration order; the first veto stops the chain
    pub async fn trigger_before_delete(
        &self,
        model: &T,
        options: &DeleteOptions,
    ) -> Result<EventOutcome, EventError> {
        for observer in &self.observers {
            if let EventOutcome::Veto(result) = observer.before_delete(model, options).await? {
                return Ok(EventOutcome::Veto(result));
            }
        }
        Ok(EventOutcome::Proceed)
    }

    pub async fn trigger_after_delete(
        &self,
        model: &T,
        options: &DeleteOptions,
    ) -> Result<(), EventError> {
        for observer in &self.observers {
            observer.after_delete(model, options).await?;
        }
        Ok(())
    }

    pub async fn trigger_saving(&self, model: &mut T) -> Result<(), EventError> {
        for observer in &self.observers {
            observer.saving(model).await?;
        }
        Ok(())
    }

    pub async fn trigger_saved(&self, model: &T) -> Result<(), EventError> {
        for observer in &self.observers {
            observer.saved(model).await?;
        }
        Ok(())
    }
}

impl<T> Default for ObserverRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
