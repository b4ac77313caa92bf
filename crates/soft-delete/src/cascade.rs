//! Cascade - removal of dependent rows when a parent is deleted
//!
//! A `CascadeDeleter` is handed the parent entity and the cascade options
//! (`primary = false`). `AssociationCascade` walks a list of associations
//! and bulk-deletes the matching rows through each association's target.
//! The target decides what "delete" means: a plain `Table` removes rows,
//! a `SoftDeletePolicy` marks them.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::backends::DatabaseValue;
use crate::entity::Entity;
use crate::error::ModelResult;
use crate::options::DeleteOptions;
use crate::query::Conditions;

/// Something that can delete every row matching a condition set.
///
/// Cascade targets run as bulk operations: they get the conditions only,
/// never the parent's `DeleteOptions`, and fire no per-row events.
#[async_trait]
pub trait BulkDelete: Send + Sync {
    fn table_name(&self) -> &str;

    async fn delete_all(&self, conditions: Conditions) -> ModelResult<u64>;
}

/// Deletes the dependents of an entity
#[async_trait]
pub trait CascadeDeleter<T>: Send + Sync {
    async fn cascade_delete(&self, entity: &T, options: &DeleteOptions) -> ModelResult<()>;
}

/// Cascade that has nothing to delete
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCascade;

#[async_trait]
impl<T: Sync> CascadeDeleter<T> for NoCascade {
    async fn cascade_delete(&self, _entity: &T, _options: &DeleteOptions) -> ModelResult<()> {
        Ok(())
    }
}

/// Association types that take part in cascades
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationKind {
    HasOne,
    HasMany,
    /// Join-table rows are always cleared, regardless of `dependent`
    BelongsToMany,
}

/// One association of the parent table
pub struct Association {
    name: String,
    kind: AssociationKind,
    foreign_key: String,
    binding_key: String,
    dependent: bool,
    target: Arc<dyn BulkDelete>,
}

impl Association {
    fn new(
        name: &str,
        kind: AssociationKind,
        target: Arc<dyn BulkDelete>,
        foreign_key: &str,
        dependent: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind,
            foreign_key: foreign_key.to_string(),
            binding_key: "id".to_string(),
            dependent,
            target,
        }
    }

    /// Dependent has-many association
    pub fn has_many(name: &str, target: Arc<dyn BulkDelete>, foreign_key: &str) -> Self {
        Self::new(name, AssociationKind::HasMany, target, foreign_key, true)
    }

    /// Dependent has-one association
    pub fn has_one(name: &str, target: Arc<dyn BulkDelete>, foreign_key: &str) -> Self {
        Self::new(name, AssociationKind::HasOne, target, foreign_key, true)
    }

    /// Many-to-many association; `join_table` holds the link rows
    pub fn belongs_to_many(name: &str, join_table: Arc<dyn BulkDelete>, foreign_key: &str) -> Self {
        Self::new(name, AssociationKind::BelongsToMany, join_table, foreign_key, true)
    }

    /// Parent column the foreign key points at (defaults to `id`)
    pub fn binding_key(mut self, column: &str) -> Self {
        self.binding_key = column.to_string();
        self
    }

    /// Whether deleting the parent deletes these rows
    pub fn dependent(mut self, dependent: bool) -> Self {
        self.dependent = dependent;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AssociationKind {
        self.kind
    }

    fn cascades(&self) -> bool {
        self.kind == AssociationKind::BelongsToMany || self.dependent
    }
}

/// Cascade over a fixed list of associations
#[derive(Default)]
pub struct AssociationCascade {
    associations: Vec<Association>,
}

impl AssociationCascade {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, association: Association) -> Self {
        self.associations.push(association);
        self
    }

    pub fn associations(&self) -> &[Association] {
        &self.associations
    }
}

#[async_trait]
impl<T: Entity> CascadeDeleter<T> for AssociationCascade {
    async fn cascade_delete(&self, entity: &T, options: &DeleteOptions) -> ModelResult<()> {
        for association in self.associations.iter().filter(|a| a.cascades()) {
            let key = match entity.get(&association.binding_key) {
                Some(value) if !value.is_null() => DatabaseValue::from_json(value),
                _ => {
                    debug!(
                        "Skipping cascade '{}': parent has no {}",
                        association.name, association.binding_key
                    );
                    continue;
                }
            };

            let removed = association
                .target
                .delete_all(Conditions::new().eq(&association.foreign_key, key))
                .await?;

            debug!(
                "Cascade '{}' ({:?}) removed {} row(s) from {} (primary: {})",
                association.name,
                association.kind,
                removed,
                association.target.table_name(),
                options.primary
            );
        }
        Ok(())
    }
}
