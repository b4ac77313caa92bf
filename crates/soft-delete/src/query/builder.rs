//! Query Builder - Core builder implementation

use std::collections::BTreeSet;

use super::types::*;

/// Option marker that lets a select query see soft-deleted rows
pub const WITH_DELETED: &str = "withDeleted";

/// Query against a single table.
///
/// Built fluently, executed through a `Table`. Besides the SQL parts it
/// carries a set of option markers and its own rewrite state, so the
/// before-find phase can tell whether it already ran for this instance.
#[derive(Debug, Clone)]
pub struct Query {
    pub(crate) query_type: QueryType,
    pub(crate) table: String,
    pub(crate) alias: String,
    pub(crate) select_fields: Vec<String>,
    pub(crate) set_clauses: Vec<SetClause>,
    pub(crate) where_conditions: Vec<WhereCondition>,
    pub(crate) order_by: Vec<(String, OrderDirection)>,
    pub(crate) limit_count: Option<i64>,
    pub(crate) options: BTreeSet<String>,
    pub(crate) rewrite_state: RewriteState,
}

impl Query {
    /// Create a new select query on `table`, aliased as itself
    pub fn new(table: &str) -> Self {
        Self::aliased(table, table)
    }

    /// Create a new select query on `table` under `alias`
    pub fn aliased(table: &str, alias: &str) -> Self {
        Self {
            query_type: QueryType::Select,
            table: table.to_string(),
            alias: alias.to_string(),
            select_fields: Vec::new(),
            set_clauses: Vec::new(),
            where_conditions: Vec::new(),
            order_by: Vec::new(),
            limit_count: None,
            options: BTreeSet::new(),
            rewrite_state: RewriteState::Unrewritten,
        }
    }

    pub fn query_type(&self) -> &QueryType {
        &self.query_type
    }

    pub fn is_select(&self) -> bool {
        self.query_type == QueryType::Select
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn conditions(&self) -> &[WhereCondition] {
        &self.where_conditions
    }

    pub fn set_clauses(&self) -> &[SetClause] {
        &self.set_clauses
    }

    pub fn limit_count(&self) -> Option<i64> {
        self.limit_count
    }

    /// Select specific fields
    pub fn select(mut self, fields: &[&str]) -> Self {
        self.query_type = QueryType::Select;
        self.select_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Add ORDER BY clause
    pub fn order_by(mut self, column: &str, direction: OrderDirection) -> Self {
        self.order_by.push((column.to_string(), direction));
        self
    }

    /// Add LIMIT clause
    pub fn limit(mut self, count: i64) -> Self {
        self.limit_count = Some(count);
        self
    }

    /// Attach an option marker
    pub fn with_option(mut self, option: &str) -> Self {
        self.options.insert(option.to_string());
        self
    }

    /// Include soft-deleted rows in a select
    pub fn with_deleted(self) -> Self {
        self.with_option(WITH_DELETED)
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.contains(option)
    }

    pub fn options(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(String::as_str)
    }

    pub fn rewrite_state(&self) -> RewriteState {
        self.rewrite_state
    }

    pub fn is_rewritten(&self) -> bool {
        self.rewrite_state == RewriteState::Rewritten
    }

    /// Transition to `Rewritten`. Idempotent.
    pub fn mark_rewritten(&mut self) {
        self.rewrite_state = RewriteState::Rewritten;
    }
}
