//! Delete rules - validation consulted before a delete when `check_rules` is set

use tracing::debug;

use crate::options::DeleteOptions;

/// Decides whether an entity may be deleted
pub trait RulesChecker<T>: Send + Sync {
    fn check_delete(&self, entity: &T, options: &DeleteOptions) -> bool;
}

type Rule<T> = Box<dyn Fn(&T, &DeleteOptions) -> Result<(), String> + Send + Sync>;

/// Named closure rules; every rule must pass
pub struct Rules<T> {
    rules: Vec<(String, Rule<T>)>,
}

impl<T> Rules<T> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a rule; `Err` carries the reason the entity cannot be deleted
    pub fn add<F>(mut self, name: &str, rule: F) -> Self
    where
        F: Fn(&T, &DeleteOptions) -> Result<(), String> + Send + Sync + 'static,
    {
        self.rules.push((name.to_string(), Box::new(rule)));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<T> Default for Rules<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RulesChecker<T> for Rules<T> {
    fn check_delete(&self, entity: &T, options: &DeleteOptions) -> bool {
        let mut passed = true;
        for (name, rule) in &self.rules {
            if let Err(reason) = rule(entity, options) {
                debug!("Delete rule '{}' failed: {}", name, reason);
                passed = false;
            }
        }
        passed
    }
}
