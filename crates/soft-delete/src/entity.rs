//! Entities - records a table reads and writes
//!
//! `Entity` is the contract the policy needs from a row object: field access
//! by name, persistence state, and conversion to and from a field map.
//! `Record` is the dynamic implementation.

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::backends::Row;
use crate::error::{ModelError, ModelResult};

/// A single row object
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    /// True until the entity has been saved or loaded from storage
    fn is_new(&self) -> bool;

    /// Flag the entity as persisted
    fn mark_persisted(&mut self);

    /// Field-value pairs for database operations
    fn to_fields(&self) -> Row;

    /// Build a persisted entity from a fetched row
    fn from_fields(fields: Row) -> ModelResult<Self>;

    /// Overwrite a single field
    fn set(&mut self, field: &str, value: JsonValue) -> ModelResult<()>;

    /// Read a single field
    fn get(&self, field: &str) -> Option<JsonValue> {
        self.to_fields().remove(field)
    }

    /// All of `fields` are present and non-null
    fn has(&self, fields: &[String]) -> bool {
        let values = self.to_fields();
        fields
            .iter()
            .all(|f| values.get(f).map(|v| !v.is_null()).unwrap_or(false))
    }

    /// Values of `fields`, in order, null where missing
    fn extract(&self, fields: &[String]) -> Vec<(String, JsonValue)> {
        let values = self.to_fields();
        fields
            .iter()
            .map(|f| (f.clone(), values.get(f).cloned().unwrap_or(JsonValue::Null)))
            .collect()
    }
}

/// Dynamic row object backed by a field map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: Row,
    #[serde(skip)]
    persisted: bool,
}

impl Record {
    /// A new, unsaved record
    pub fn new() -> Self {
        Self::default()
    }

    /// A record that already exists in storage
    pub fn persisted(fields: Row) -> Self {
        Self {
            fields,
            persisted: true,
        }
    }

    /// Builder-style field assignment
    pub fn with<T: Into<JsonValue>>(mut self, field: &str, value: T) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    pub fn fields(&self) -> &Row {
        &self.fields
    }

    /// Deserialize the record into a typed struct
    pub fn into_typed<T: DeserializeOwned>(self) -> ModelResult<T> {
        Ok(serde_json::from_value(JsonValue::Object(self.fields))?)
    }

    /// Capture a typed struct as a record
    pub fn from_typed<T: Serialize>(value: &T, persisted: bool) -> ModelResult<Self> {
        match serde_json::to_value(value)? {
            JsonValue::Object(fields) => Ok(Self { fields, persisted }),
            other => Err(ModelError::Serialization(format!(
                "expected an object, got {}",
                other
            ))),
        }
    }
}

impl Entity for Record {
    fn is_new(&self) -> bool {
        !self.persisted
    }

    fn mark_persisted(&mut self) {
        self.persisted = true;
    }

    fn to_fields(&self) -> Row {
        self.fields.clone()
    }

    fn from_fields(fields: Row) -> ModelResult<Self> {
        Ok(Self::persisted(fields))
    }

    fn set(&mut self, field: &str, value: JsonValue) -> ModelResult<()> {
        self.fields.insert(field.to_string(), value);
        Ok(())
    }

    fn get(&self, field: &str) -> Option<JsonValue> {
        self.fields.get(field).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Order {
        id: i64,
        status: String,
        deleted: Option<String>,
    }

    #[test]
    fn test_record_lifecycle_flags() {
        let mut record = Record::new().with("id", 1);
        assert!(record.is_new());
        record.mark_persisted();
        assert!(!record.is_new());
        assert!(!Record::persisted(Row::new()).is_new());
    }

    #[test]
    fn test_has_requires_non_null_values() {
        let keys = vec!["order_id".to_string(), "tag_id".to_string()];
        let full = Record::new().with("order_id", 1).with("tag_id", 2);
        let partial = Record::new().with("order_id", 1).with("tag_id", JsonValue::Null);
        let missing = Record::new().with("order_id", 1);

        assert!(full.has(&keys));
        assert!(!partial.has(&keys));
        assert!(!missing.has(&keys));
    }

    #[test]
    fn test_extract_keeps_order() {
        let record = Record::new().with("b", 2).with("a", 1);
        let extracted = record.extract(&["a".to_string(), "b".to_string(), "c".to_string()]);
        assert_eq!(
            extracted,
            vec![
                ("a".to_string(), json!(1)),
                ("b".to_string(), json!(2)),
                ("c".to_string(), JsonValue::Null)
            ]
        );
    }

    #[test]
    fn test_typed_conversion() {
        let order = Order {
            id: 3,
            status: "open".to_string(),
            deleted: None,
        };
        let record = Record::from_typed(&order, true).unwrap();
        assert!(!record.is_new());
        assert_eq!(record.get("status"), Some(json!("open")));
        assert_eq!(record.into_typed::<Order>().unwrap(), order);
    }
}
