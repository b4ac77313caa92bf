//! Query Builder Types - Core types and enums for query building

use std::fmt;

use crate::backends::DatabaseValue;

/// Query operator types
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOperator::Equal => write!(f, "="),
            QueryOperator::NotEqual => write!(f, "!="),
            QueryOperator::GreaterThan => write!(f, ">"),
            QueryOperator::GreaterThanOrEqual => write!(f, ">="),
            QueryOperator::LessThan => write!(f, "<"),
            QueryOperator::LessThanOrEqual => write!(f, "<="),
            QueryOperator::In => write!(f, "IN"),
            QueryOperator::NotIn => write!(f, "NOT IN"),
            QueryOperator::IsNull => write!(f, "IS NULL"),
            QueryOperator::IsNotNull => write!(f, "IS NOT NULL"),
        }
    }
}

/// Where clause condition
#[derive(Debug, Clone, PartialEq)]
pub struct WhereCondition {
    pub column: String,
    pub operator: QueryOperator,
    pub value: Option<DatabaseValue>,
    pub values: Vec<DatabaseValue>, // For IN, NOT IN
}

impl WhereCondition {
    fn binary(column: &str, operator: QueryOperator, value: DatabaseValue) -> Self {
        Self {
            column: column.to_string(),
            operator,
            value: Some(value),
            values: Vec::new(),
        }
    }

    fn unary(column: &str, operator: QueryOperator) -> Self {
        Self {
            column: column.to_string(),
            operator,
            value: None,
            values: Vec::new(),
        }
    }

    /// `column = value`; a null value becomes `column IS NULL`
    pub fn eq<T: Into<DatabaseValue>>(column: &str, value: T) -> Self {
        let value = value.into();
        if value.is_null() {
            return Self::unary(column, QueryOperator::IsNull);
        }
        Self::binary(column, QueryOperator::Equal, value)
    }

    pub fn ne<T: Into<DatabaseValue>>(column: &str, value: T) -> Self {
        Self::binary(column, QueryOperator::NotEqual, value.into())
    }

    pub fn gt<T: Into<DatabaseValue>>(column: &str, value: T) -> Self {
        Self::binary(column, QueryOperator::GreaterThan, value.into())
    }

    pub fn gte<T: Into<DatabaseValue>>(column: &str, value: T) -> Self {
        Self::binary(column, QueryOperator::GreaterThanOrEqual, value.into())
    }

    pub fn lt<T: Into<DatabaseValue>>(column: &str, value: T) -> Self {
        Self::binary(column, QueryOperator::LessThan, value.into())
    }

    pub fn lte<T: Into<DatabaseValue>>(column: &str, value: T) -> Self {
        Self::binary(column, QueryOperator::LessThanOrEqual, value.into())
    }

    pub fn is_in<T: Into<DatabaseValue>>(column: &str, values: Vec<T>) -> Self {
        Self {
            column: column.to_string(),
            operator: QueryOperator::In,
            value: None,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn not_in<T: Into<DatabaseValue>>(column: &str, values: Vec<T>) -> Self {
        Self {
            column: column.to_string(),
            operator: QueryOperator::NotIn,
            value: None,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_null(column: &str) -> Self {
        Self::unary(column, QueryOperator::IsNull)
    }

    pub fn not_null(column: &str) -> Self {
        Self::unary(column, QueryOperator::IsNotNull)
    }
}

/// Order by direction
#[derive(Debug, Clone, PartialEq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "ASC"),
            OrderDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// Query types supported by the builder
#[derive(Debug, Clone, PartialEq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
}

/// Set clause for UPDATE and INSERT operations
#[derive(Debug, Clone, PartialEq)]
pub struct SetClause {
    pub column: String,
    pub value: DatabaseValue, // Null renders as a NULL literal
}

/// Whether the before-find phase has already run for a query.
///
/// `Rewritten` is terminal: once a query has been through the phase, its
/// filter is never touched again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RewriteState {
    #[default]
    Unrewritten,
    Rewritten,
}
