//! Query Builder Module - fluent single-table queries with SQL generation

pub mod builder;
pub mod conditions;
pub mod dml;
pub mod sql_generation;
pub mod types;
pub mod where_clause;

pub use builder::{Query, WITH_DELETED};
pub use conditions::Conditions;
pub use types::{
    OrderDirection, QueryOperator, QueryType, RewriteState, SetClause, WhereCondition,
};
