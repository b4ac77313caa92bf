//! Owned condition sets for bulk operations
//!
//! `delete_all` and friends take their filter as a value instead of a
//! builder closure, so callers can assemble it up front.

use super::types::WhereCondition;
use crate::backends::DatabaseValue;

/// Conjunction of WHERE conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    conditions: Vec<WhereCondition>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq<T: Into<DatabaseValue>>(mut self, column: &str, value: T) -> Self {
        self.conditions.push(WhereCondition::eq(column, value));
        self
    }

    pub fn ne<T: Into<DatabaseValue>>(mut self, column: &str, value: T) -> Self {
        self.conditions.push(WhereCondition::ne(column, value));
        self
    }

    pub fn gt<T: Into<DatabaseValue>>(mut self, column: &str, value: T) -> Self {
        self.conditions.push(WhereCondition::gt(column, value));
        self
    }

    pub fn gte<T: Into<DatabaseValue>>(mut self, column: &str, value: T) -> Self {
        self.conditions.push(WhereCondition::gte(column, value));
        self
    }

    pub fn lt<T: Into<DatabaseValue>>(mut self, column: &str, value: T) -> Self {
        self.conditions.push(WhereCondition::lt(column, value));
        self
    }

    pub fn lte<T: Into<DatabaseValue>>(mut self, column: &str, value: T) -> Self {
        self.conditions.push(WhereCondition::lte(column, value));
        self
    }

    pub fn is_in<T: Into<DatabaseValue>>(mut self, column: &str, values: Vec<T>) -> Self {
        self.conditions.push(WhereCondition::is_in(column, values));
        self
    }

    pub fn is_null(mut self, column: &str) -> Self {
        self.conditions.push(WhereCondition::is_null(column));
        self
    }

    pub fn not_null(mut self, column: &str) -> Self {
        self.conditions.push(WhereCondition::not_null(column));
        self
    }

    pub fn push(&mut self, condition: WhereCondition) {
        self.conditions.push(condition);
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WhereCondition> {
        self.conditions.iter()
    }
}

impl From<Vec<WhereCondition>> for Conditions {
    fn from(conditions: Vec<WhereCondition>) -> Self {
        Self { conditions }
    }
}

impl From<WhereCondition> for Conditions {
    fn from(condition: WhereCondition) -> Self {
        Self {
            conditions: vec![condition],
        }
    }
}

impl IntoIterator for Conditions {
    type Item = WhereCondition;
    type IntoIter = std::vec::IntoIter<WhereCondition>;

    fn into_iter(self) -> Self::IntoIter {
        self.conditions.into_iter()
    }
}
