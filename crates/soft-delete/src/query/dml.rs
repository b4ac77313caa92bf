//! Query Builder DML operations (INSERT, UPDATE, DELETE)

use super::builder::Query;
use super::types::*;
use crate::backends::DatabaseValue;

impl Query {
    /// Turn this query into an INSERT
    pub fn insert(mut self) -> Self {
        self.query_type = QueryType::Insert;
        self
    }

    /// Turn this query into an UPDATE
    pub fn update(mut self) -> Self {
        self.query_type = QueryType::Update;
        self
    }

    /// Turn this query into a DELETE
    pub fn delete(mut self) -> Self {
        self.query_type = QueryType::Delete;
        self
    }

    /// Set a column value (for INSERT/UPDATE)
    pub fn set<T: Into<DatabaseValue>>(mut self, column: &str, value: T) -> Self {
        self.set_clauses.push(SetClause {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    /// Set a column to NULL (for INSERT/UPDATE)
    pub fn set_null(self, column: &str) -> Self {
        self.set(column, DatabaseValue::Null)
    }

    /// Set multiple values at once
    pub fn set_values(mut self, values: Vec<(String, DatabaseValue)>) -> Self {
        for (column, value) in values {
            self.set_clauses.push(SetClause { column, value });
        }
        self
    }
}
