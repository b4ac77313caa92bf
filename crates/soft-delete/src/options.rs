use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Per-call options for a delete.
///
/// `extra` is carried untouched to observers and cascades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteOptions {
    /// Run the table's delete rules before deleting
    pub check_rules: bool,
    /// False when the delete was triggered by a parent's cascade
    pub primary: bool,
    pub extra: Map<String, JsonValue>,
}

impl Default for DeleteOptions {
    fn default() -> Self {
        Self {
            check_rules: true,
            primary: true,
            extra: Map::new(),
        }
    }
}

impl DeleteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_rules(mut self) -> Self {
        self.check_rules = false;
        self
    }

    pub fn with_extra<T: Into<JsonValue>>(mut self, key: &str, value: T) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// Options handed to dependents: everything passes through, `primary` is forced off
    pub fn for_cascade(&self) -> Self {
        Self {
            primary: false,
            ..self.clone()
        }
    }
}
