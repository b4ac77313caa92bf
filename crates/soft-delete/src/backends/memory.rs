//! In-memory executor
//!
//! Evaluates `Query` values directly against rows held in a `DashMap`, one
//! entry per table. Used for tests and for running policies without a
//! database. Follows SQL null semantics: comparisons against null never
//! match, only `IS NULL` / `IS NOT NULL` do.

use std::cmp::Ordering;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value as JsonValue;
use tracing::trace;

use super::core::{QueryExecutor, Row};
use crate::error::ModelResult;
use crate::query::{OrderDirection, Query, QueryOperator, QueryType, WhereCondition};

#[derive(Debug, Default)]
pub struct MemoryExecutor {
    tables: DashMap<String, Vec<Row>>,
}

impl MemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a row directly, bypassing any table logic
    pub fn insert(&self, table: &str, row: Row) {
        self.tables.entry(table.to_string()).or_default().push(row);
    }

    /// Snapshot of every stored row of `table`, soft-deleted or not
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .get(table)
            .map(|rows| rows.value().clone())
            .unwrap_or_default()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.tables.get(table).map(|rows| rows.len()).unwrap_or(0)
    }

    fn select(&self, query: &Query) -> Vec<Row> {
        let mut rows: Vec<Row> = match self.tables.get(query.table()) {
            Some(rows) => rows
                .iter()
                .filter(|row| matches(query, row))
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        for (column, direction) in query.order_by.iter().rev() {
            let column = unqualified(query, column);
            rows.sort_by(|a, b| {
                let left = a.get(column).unwrap_or(&JsonValue::Null);
                let right = b.get(column).unwrap_or(&JsonValue::Null);
                let ordering = compare(left, right).unwrap_or(Ordering::Equal);
                match direction {
                    OrderDirection::Asc => ordering,
                    OrderDirection::Desc => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit_count() {
            rows.truncate(limit.max(0) as usize);
        }

        if !query.select_fields.is_empty() {
            rows = rows
                .into_iter()
                .map(|row| {
                    query
                        .select_fields
                        .iter()
                        .map(|f| unqualified(query, f))
                        .map(|f| (f.to_string(), row.get(f).cloned().unwrap_or(JsonValue::Null)))
                        .collect()
                })
                .collect();
        }

        rows
    }
}

#[async_trait]
impl QueryExecutor for MemoryExecutor {
    async fn execute(&self, query: &Query) -> ModelResult<u64> {
        trace!("memory execute: {}", query.to_sql());

        let affected = match query.query_type() {
            QueryType::Select => self.select(query).len() as u64,
            QueryType::Insert => {
                let row: Row = query
                    .set_clauses()
                    .iter()
                    .map(|clause| (clause.column.clone(), clause.value.to_json()))
                    .collect();
                self.insert(query.table(), row);
                1
            }
            QueryType::Update => match self.tables.get_mut(query.table()) {
                Some(mut rows) => {
                    let mut affected = 0;
                    for row in rows.iter_mut().filter(|row| matches(query, row)) {
                        for clause in query.set_clauses() {
                            let column = unqualified(query, &clause.column);
                            row.insert(column.to_string(), clause.value.to_json());
                        }
                        affected += 1;
                    }
                    affected
                }
                None => 0,
            },
            QueryType::Delete => match self.tables.get_mut(query.table()) {
                Some(mut rows) => {
                    let before = rows.len();
                    rows.retain(|row| !matches(query, row));
                    (before - rows.len()) as u64
                }
                None => 0,
            },
        };

        Ok(affected)
    }

    async fn fetch_all(&self, query: &Query) -> ModelResult<Vec<Row>> {
        trace!("memory fetch: {}", query.to_sql());
        Ok(self.select(query))
    }
}

/// Strip the table or alias qualifier from a column reference
fn unqualified<'a>(query: &Query, column: &'a str) -> &'a str {
    match column.split_once('.') {
        Some((qualifier, name)) if qualifier == query.alias() || qualifier == query.table() => {
            name
        }
        _ => column,
    }
}

fn matches(query: &Query, row: &Row) -> bool {
    query
        .conditions()
        .iter()
        .all(|condition| condition_matches(query, condition, row))
}

fn condition_matches(query: &Query, condition: &WhereCondition, row: &Row) -> bool {
    let value = row
        .get(unqualified(query, &condition.column))
        .unwrap_or(&JsonValue::Null);

    match condition.operator {
        QueryOperator::IsNull => value.is_null(),
        QueryOperator::IsNotNull => !value.is_null(),
        QueryOperator::In | QueryOperator::NotIn => {
            if value.is_null() {
                return false;
            }
            let found = condition
                .values
                .iter()
                .any(|candidate| equals(value, &candidate.to_json()));
            found == (condition.operator == QueryOperator::In)
        }
        ref operator => {
            let expected = match &condition.value {
                Some(expected) => expected.to_json(),
                None => return false,
            };
            if value.is_null() || expected.is_null() {
                return false;
            }
            match operator {
                QueryOperator::Equal => equals(value, &expected),
                QueryOperator::NotEqual => !equals(value, &expected),
                QueryOperator::GreaterThan => compare(value, &expected) == Some(Ordering::Greater),
                QueryOperator::GreaterThanOrEqual => matches!(
                    compare(value, &expected),
                    Some(Ordering::Greater | Ordering::Equal)
                ),
                QueryOperator::LessThan => compare(value, &expected) == Some(Ordering::Less),
                QueryOperator::LessThanOrEqual => matches!(
                    compare(value, &expected),
                    Some(Ordering::Less | Ordering::Equal)
                ),
                _ => false,
            }
        }
    }
}

fn compare(left: &JsonValue, right: &JsonValue) -> Option<Ordering> {
    match (left, right) {
        (JsonValue::Number(a), JsonValue::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (JsonValue::String(a), JsonValue::String(b)) => Some(a.cmp(b)),
        (JsonValue::Bool(a), JsonValue::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn equals(left: &JsonValue, right: &JsonValue) -> bool {
    compare(left, right) == Some(Ordering::Equal) || left == right
}
