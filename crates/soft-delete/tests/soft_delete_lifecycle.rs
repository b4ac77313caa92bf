use std::sync::Arc;

use chrono::{TimeZone, Utc};
use elif_soft_delete::backends::parse_timestamp;
use elif_soft_delete::{
    Association, AssociationCascade, Conditions, DeleteOptions, Entity, MemoryExecutor,
    ModelError, ModelResult, Record, Row, SoftDeleteConfig, SoftDeletePolicy, Table, TableSchema,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn row(value: JsonValue) -> Row {
    value.as_object().cloned().unwrap()
}

fn orders_schema() -> TableSchema {
    TableSchema::new("orders")
        .alias_as("Orders")
        .id("id")
        .string("status")
        .timestamp("deleted")
}

fn orders(executor: &Arc<MemoryExecutor>) -> SoftDeletePolicy<Record> {
    SoftDeletePolicy::attach(
        Table::new(orders_schema(), executor.clone()),
        SoftDeleteConfig::default(),
    )
}

#[tokio::test]
async fn test_delete_find_and_restore() {
    init_tracing();
    let executor = Arc::new(MemoryExecutor::new());
    let policy = orders(&executor);

    let order = policy
        .table()
        .save(Record::new().with("id", 1).with("status", "open"))
        .await
        .unwrap()
        .unwrap();

    assert!(policy.delete(&order, DeleteOptions::default()).await.unwrap());

    let by_id = Conditions::new().eq("id", 1);
    assert!(policy.find(by_id.clone()).await.unwrap().is_empty());

    let deleted = policy.find_with_deleted(by_id.clone()).await.unwrap();
    assert_eq!(deleted.len(), 1);
    assert!(policy.is_soft_deleted(&deleted[0]).unwrap());
    let stamp = deleted[0]
        .get("deleted")
        .and_then(|v| v.as_str().and_then(parse_timestamp))
        .expect("deleted holds a timestamp");
    assert!(stamp <= Utc::now());

    let restored = policy
        .restore(deleted[0].clone())
        .await
        .unwrap()
        .expect("restore saves the row");
    assert_eq!(restored.get("deleted"), Some(JsonValue::Null));

    let visible = policy.find(by_id).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].get("deleted"), Some(JsonValue::Null));
    assert_eq!(visible[0].get("status"), Some(json!("open")));
}

#[tokio::test]
async fn test_delete_all_marks_matching_rows_only() {
    let executor = Arc::new(MemoryExecutor::new());
    for id in 1..=5 {
        executor.insert("orders", row(json!({ "id": id, "status": "cancelled" })));
    }
    executor.insert("orders", row(json!({ "id": 6, "status": "open" })));
    let policy = orders(&executor);

    let affected = policy
        .delete_all(Conditions::new().eq("status", "cancelled"))
        .await
        .unwrap();
    assert_eq!(affected, 5);

    let visible = policy.find(Conditions::new()).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].get("id"), Some(json!(6)));
    assert!(!policy.is_soft_deleted(&visible[0]).unwrap());

    let everything = policy.all(policy.query().with_deleted()).await.unwrap();
    assert_eq!(everything.len(), 6);
}

#[tokio::test]
async fn test_hard_delete_twice() {
    let executor = Arc::new(MemoryExecutor::new());
    executor.insert("orders", row(json!({ "id": 1, "status": "open" })));
    let policy = orders(&executor);

    let order = policy.get(1).await.unwrap().unwrap();
    assert!(policy.hard_delete(&order).await.unwrap());
    assert!(!policy.hard_delete(&order).await.unwrap());

    assert!(policy.get_with_deleted(1).await.unwrap().is_none());
    assert_eq!(executor.row_count("orders"), 0);
}

#[tokio::test]
async fn test_hard_delete_all_purges_up_to_threshold() {
    let executor = Arc::new(MemoryExecutor::new());
    executor.insert(
        "orders",
        row(json!({ "id": 1, "status": "x", "deleted": "2024-01-10 08:00:00" })),
    );
    executor.insert(
        "orders",
        row(json!({ "id": 2, "status": "x", "deleted": "2024-02-01 00:00:00" })),
    );
    executor.insert(
        "orders",
        row(json!({ "id": 3, "status": "x", "deleted": "2024-03-05 12:30:00" })),
    );
    executor.insert("orders", row(json!({ "id": 4, "status": "x", "deleted": null })));
    executor.insert("orders", row(json!({ "id": 5, "status": "x" })));
    let policy = orders(&executor);

    let until = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
    assert_eq!(policy.hard_delete_all(until).await.unwrap(), 2);

    let mut remaining: Vec<i64> = executor
        .rows("orders")
        .iter()
        .filter_map(|r| r["id"].as_i64())
        .collect();
    remaining.sort_unstable();
    assert_eq!(remaining, vec![3, 4, 5]);

    assert_eq!(policy.hard_delete_all(until).await.unwrap(), 0);
}

#[tokio::test]
async fn test_missing_column_is_reported() {
    let executor = Arc::new(MemoryExecutor::new());
    let policy = SoftDeletePolicy::<Record>::attach(
        Table::new(TableSchema::new("orders").id("id"), executor),
        SoftDeleteConfig::default(),
    );

    match policy.soft_delete_field() {
        Err(ModelError::MissingColumn { column, table }) => {
            assert_eq!(column, "deleted");
            assert_eq!(table, "orders");
        }
        other => panic!("expected MissingColumn, got {:?}", other),
    }
}

#[tokio::test]
async fn test_partial_composite_key_is_rejected() {
    let executor = Arc::new(MemoryExecutor::new());
    let schema = TableSchema::new("order_tags")
        .primary_key(&["order_id", "tag_id"])
        .id("order_id")
        .id("tag_id")
        .timestamp("deleted");
    let policy = SoftDeletePolicy::<Record>::attach(
        Table::new(schema, executor),
        SoftDeleteConfig::default(),
    );

    let partial = Record::persisted(row(json!({ "order_id": 1 })));
    assert!(matches!(
        policy.delete(&partial, DeleteOptions::default()).await,
        Err(ModelError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_cascade_follows_each_target_policy() {
    init_tracing();
    let executor = Arc::new(MemoryExecutor::new());
    executor.insert("orders", row(json!({ "id": 1, "status": "open" })));
    for (id, order_id) in [(10, 1), (11, 1), (12, 2)] {
        executor.insert("order_items", row(json!({ "id": id, "order_id": order_id })));
    }
    executor.insert("order_notes", row(json!({ "id": 20, "order_id": 1 })));
    executor.insert("order_notes", row(json!({ "id": 21, "order_id": 2 })));

    let items = Arc::new(SoftDeletePolicy::<Record>::attach(
        Table::new(
            TableSchema::new("order_items")
                .id("id")
                .integer("order_id")
                .timestamp("deleted"),
            executor.clone(),
        ),
        SoftDeleteConfig::default(),
    ));
    let notes = Arc::new(Table::<Record>::new(
        TableSchema::new("order_notes").id("id").integer("order_id"),
        executor.clone(),
    ));

    let cascade = AssociationCascade::new()
        .add(Association::has_many("Items", items.clone(), "order_id"))
        .add(Association::has_many("Notes", notes.clone(), "order_id"));
    let policy = orders(&executor).with_cascade(Arc::new(cascade));

    let order = policy.get(1).await.unwrap().unwrap();
    assert!(policy.delete(&order, DeleteOptions::default()).await.unwrap());

    let live_items = items.find(Conditions::new()).await.unwrap();
    assert_eq!(live_items.len(), 1);
    assert_eq!(live_items[0].get("order_id"), Some(json!(2)));
    assert_eq!(executor.row_count("order_items"), 3);

    let live_notes = notes.find(Conditions::new()).await.unwrap();
    assert_eq!(live_notes.len(), 1);
    assert_eq!(executor.row_count("order_notes"), 1);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Invoice {
    id: i64,
    total: i64,
    #[serde(default)]
    archived_at: Option<String>,
    #[serde(skip)]
    persisted: bool,
}

impl Entity for Invoice {
    fn is_new(&self) -> bool {
        !self.persisted
    }

    fn mark_persisted(&mut self) {
        self.persisted = true;
    }

    fn to_fields(&self) -> Row {
        Record::from_typed(self, self.persisted)
            .map(|record| record.fields().clone())
            .unwrap_or_default()
    }

    fn from_fields(fields: Row) -> ModelResult<Self> {
        let mut invoice: Invoice = Record::persisted(fields).into_typed()?;
        invoice.persisted = true;
        Ok(invoice)
    }

    fn set(&mut self, field: &str, value: JsonValue) -> ModelResult<()> {
        let mut fields = self.to_fields();
        fields.insert(field.to_string(), value);
        let persisted = self.persisted;
        *self = Record::persisted(fields).into_typed()?;
        self.persisted = persisted;
        Ok(())
    }
}

#[tokio::test]
async fn test_typed_entity_with_custom_field() {
    let executor = Arc::new(MemoryExecutor::new());
    let schema = TableSchema::new("invoices")
        .id("id")
        .integer("total")
        .timestamp("archived_at");
    let policy = SoftDeletePolicy::<Invoice>::attach(
        Table::new(schema, executor.clone()),
        SoftDeleteConfig::with_field("archived_at"),
    );

    let invoice = Invoice {
        id: 7,
        total: 1200,
        archived_at: None,
        persisted: false,
    };
    assert!(!policy.delete(&invoice, DeleteOptions::default()).await.unwrap());

    let invoice = policy.table().save(invoice).await.unwrap().unwrap();
    assert!(policy.delete(&invoice, DeleteOptions::default()).await.unwrap());
    assert!(policy.get(7).await.unwrap().is_none());

    let archived = policy.get_with_deleted(7).await.unwrap().unwrap();
    assert!(archived.archived_at.is_some());

    let restored = policy.restore(archived).await.unwrap().unwrap();
    assert_eq!(restored.archived_at, None);
    assert_eq!(policy.get(7).await.unwrap().map(|i| i.total), Some(1200));
}
