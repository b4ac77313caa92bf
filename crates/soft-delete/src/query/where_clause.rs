//! Query Builder WHERE clause operations

use super::builder::Query;
use super::conditions::Conditions;
use super::types::*;
use crate::backends::DatabaseValue;

impl Query {
    /// Add WHERE condition with equality
    pub fn where_eq<T: Into<DatabaseValue>>(mut self, column: &str, value: T) -> Self {
        self.where_conditions.push(WhereCondition::eq(column, value));
        self
    }

    /// Add WHERE condition with not equal
    pub fn where_ne<T: Into<DatabaseValue>>(mut self, column: &str, value: T) -> Self {
        self.where_conditions.push(WhereCondition::ne(column, value));
        self
    }

    /// Add WHERE condition with greater than
    pub fn where_gt<T: Into<DatabaseValue>>(mut self, column: &str, value: T) -> Self {
        self.where_conditions.push(WhereCondition::gt(column, value));
        self
    }

    /// Add WHERE condition with less than or equal
    pub fn where_lte<T: Into<DatabaseValue>>(mut self, column: &str, value: T) -> Self {
        self.where_conditions.push(WhereCondition::lte(column, value));
        self
    }

    /// Add WHERE condition with IN
    pub fn where_in<T: Into<DatabaseValue>>(mut self, column: &str, values: Vec<T>) -> Self {
        self.where_conditions.push(WhereCondition::is_in(column, values));
        self
    }

    /// Add WHERE condition with IS NULL
    pub fn where_null(mut self, column: &str) -> Self {
        self.where_conditions.push(WhereCondition::is_null(column));
        self
    }

    /// Add WHERE condition with IS NOT NULL
    pub fn where_not_null(mut self, column: &str) -> Self {
        self.where_conditions.push(WhereCondition::not_null(column));
        self
    }

    /// Add every condition of a prepared set
    pub fn where_all(mut self, conditions: impl Into<Conditions>) -> Self {
        self.where_conditions.extend(conditions.into());
        self
    }

    /// Append a condition to a query that is already being executed
    pub fn and_where(&mut self, condition: WhereCondition) {
        self.where_conditions.push(condition);
    }
}
