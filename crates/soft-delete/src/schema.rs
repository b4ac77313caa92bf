//! Table schema - column metadata the soft-delete layer introspects
//!
//! Describes one table: name, alias used in select queries, primary key
//! columns and typed column definitions. Column types drive how entity
//! field values are bound as query parameters.

use serde_json::Value as JsonValue;

use crate::backends::{parse_timestamp, DatabaseValue};

/// Column types understood by the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    BigInteger,
    Float,
    Text,
    Boolean,
    Uuid,
    Timestamp,
    Json,
}

impl ColumnType {
    /// PostgreSQL type name
    pub fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::BigInteger => "BIGINT",
            ColumnType::Float => "DOUBLE PRECISION",
            ColumnType::Text => "TEXT",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Uuid => "UUID",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Json => "JSONB",
        }
    }
}

/// A single column definition
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
}

/// Schema of one table
#[derive(Debug, Clone)]
pub struct TableSchema {
    table_name: String,
    alias: String,
    primary_key: Vec<String>,
    columns: Vec<ColumnDefinition>,
}

impl TableSchema {
    /// Create a schema for `table_name` with an `id` primary key and no columns yet
    pub fn new(table_name: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
            alias: table_name.to_string(),
            primary_key: vec!["id".to_string()],
            columns: Vec::new(),
        }
    }

    /// Use a different alias in select queries
    pub fn alias_as(mut self, alias: &str) -> Self {
        self.alias = alias.to_string();
        self
    }

    /// Replace the primary key column list
    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add a column
    pub fn column(mut self, name: &str, column_type: ColumnType, nullable: bool) -> Self {
        self.columns.retain(|c| c.name != name);
        self.columns.push(ColumnDefinition {
            name: name.to_string(),
            column_type,
            nullable,
        });
        self
    }

    /// Add a non-null BIGINT column
    pub fn id(self, name: &str) -> Self {
        self.column(name, ColumnType::BigInteger, false)
    }

    /// Add a nullable BIGINT column
    pub fn integer(self, name: &str) -> Self {
        self.column(name, ColumnType::BigInteger, true)
    }

    /// Add a nullable TEXT column
    pub fn string(self, name: &str) -> Self {
        self.column(name, ColumnType::Text, true)
    }

    /// Add a nullable BOOLEAN column
    pub fn boolean(self, name: &str) -> Self {
        self.column(name, ColumnType::Boolean, true)
    }

    /// Add a nullable TIMESTAMP column
    pub fn timestamp(self, name: &str) -> Self {
        self.column(name, ColumnType::Timestamp, true)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn primary_key_columns(&self) -> &[String] {
        &self.primary_key
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// Look a column up by name
    pub fn get_column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Qualify a column with the table alias
    pub fn alias_field(&self, field: &str) -> String {
        if field.contains('.') {
            return field.to_string();
        }
        format!("{}.{}", self.alias, field)
    }

    /// Convert an entity field value into a bindable value using the column type
    pub fn typed_value(&self, column: &str, value: &JsonValue) -> DatabaseValue {
        let column_type = self.get_column(column).map(|c| c.column_type);
        match (column_type, value) {
            (_, JsonValue::Null) => DatabaseValue::Null,
            (Some(ColumnType::Timestamp), JsonValue::String(raw)) => parse_timestamp(raw)
                .map(DatabaseValue::DateTime)
                .unwrap_or_else(|| DatabaseValue::String(raw.clone())),
            (Some(ColumnType::Uuid), JsonValue::String(raw)) => uuid::Uuid::parse_str(raw)
                .map(DatabaseValue::Uuid)
                .unwrap_or_else(|_| DatabaseValue::String(raw.clone())),
            (Some(ColumnType::Json), other) => DatabaseValue::Json(other.clone()),
            (_, other) => DatabaseValue::from_json(other.clone()),
        }
    }

    /// CREATE TABLE statement for this schema
    pub fn to_create_sql(&self) -> String {
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let null = if c.nullable { "" } else { " NOT NULL" };
                format!("{} {}{}", c.name, c.column_type.as_sql(), null)
            })
            .collect();
        if !self.primary_key.is_empty() {
            parts.push(format!("PRIMARY KEY ({})", self.primary_key.join(", ")));
        }

        format!(
            "CREATE TABLE {} (\n    {}\n);",
            self.table_name,
            parts.join(",\n    ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn orders() -> TableSchema {
        TableSchema::new("orders")
            .id("id")
            .string("status")
            .timestamp("deleted")
    }

    #[test]
    fn test_column_lookup() {
        let schema = orders();
        assert!(schema.has_column("deleted"));
        assert!(!schema.has_column("deleted_at"));
        assert_eq!(
            schema.get_column("status").map(|c| c.column_type),
            Some(ColumnType::Text)
        );
        assert_eq!(schema.primary_key_columns(), &["id".to_string()]);
    }

    #[test]
    fn test_alias_field() {
        assert_eq!(orders().alias_field("deleted"), "orders.deleted");
        assert_eq!(orders().alias_as("Orders").alias_field("deleted"), "Orders.deleted");
        assert_eq!(orders().alias_field("o.deleted"), "o.deleted");
    }

    #[test]
    fn test_typed_value_parses_timestamps() {
        let schema = orders();
        assert!(matches!(
            schema.typed_value("deleted", &json!("2024-05-01 10:00:00")),
            DatabaseValue::DateTime(_)
        ));
        assert_eq!(schema.typed_value("deleted", &json!(null)), DatabaseValue::Null);
        assert_eq!(
            schema.typed_value("status", &json!("open")),
            DatabaseValue::String("open".to_string())
        );
    }

    #[test]
    fn test_create_sql() {
        let sql = TableSchema::new("order_tags")
            .primary_key(&["order_id", "tag_id"])
            .id("order_id")
            .id("tag_id")
            .to_create_sql();
        assert!(sql.contains("CREATE TABLE order_tags"));
        assert!(sql.contains("order_id BIGINT NOT NULL"));
        assert!(sql.contains("PRIMARY KEY (order_id, tag_id)"));
    }
}
