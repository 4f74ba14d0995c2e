//! Item lifecycle service.
//!
//! # Responsibility
//! - Provide schema-aware create/update/get/list/delete for wall items.
//! - Enforce field validation centrally so forms and importers cannot
//!   diverge from the schema rules.
//!
//! # Invariants
//! - Drafts and stored items must belong to the wall whose schema
//!   validates them; cross-wall writes are rejected.
//! - Created items carry a value for every schema field (defaults filled).
//! - Updates validate only the patched keys against the item's schema.
//! - Bulk creation validates every draft before the first write, so a
//!   validation failure never leaves a partial batch behind.

use crate::model::field::{validate_value, FieldViolation, ItemId, ObjectTypeId};
use crate::model::item::{ItemDraft, ItemPatch, WallItem};
use crate::model::object_type::ObjectType;
use crate::model::wall::{Wall, WallId};
use crate::repo::item_repo::{BulkError, ItemListQuery, ItemRepository};
use crate::repo::{RepoError, RepoResult};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for item use-cases.
#[derive(Debug)]
pub enum ItemServiceError {
    /// Draft or item references an object type the wall does not own.
    UnknownObjectType(ObjectTypeId),
    /// Draft or stored item belongs to a different wall than the one whose
    /// schema would validate it.
    WallMismatch {
        expected: WallId,
        actual: WallId,
    },
    ItemNotFound(ItemId),
    /// Per-field rule violations, addressable by form controls.
    Validation(Vec<FieldViolation>),
    /// Violations for one draft inside a bulk batch; nothing was written.
    BulkValidation {
        index: usize,
        violations: Vec<FieldViolation>,
    },
    /// A bulk write failed mid-sequence at the reported index.
    Bulk(BulkError),
    Repo(RepoError),
    /// Write/read-back mismatch inside one operation.
    InconsistentState(&'static str),
}

impl Display for ItemServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownObjectType(id) => write!(f, "unknown object type: {id}"),
            Self::WallMismatch { expected, actual } => write!(
                f,
                "item belongs to wall {actual}, not to wall {expected}"
            ),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::Validation(violations) => {
                write!(f, "validation failed with {} violation(s)", violations.len())
            }
            Self::BulkValidation { index, violations } => write!(
                f,
                "draft at index {index} failed validation with {} violation(s)",
                violations.len()
            ),
            Self::Bulk(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent item state: {details}"),
        }
    }
}

impl Error for ItemServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Bulk(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ItemServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ItemNotFound(id) => Self::ItemNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<BulkError> for ItemServiceError {
    fn from(value: BulkError) -> Self {
        Self::Bulk(value)
    }
}

/// Schema-aware item service over a repository implementation.
pub struct ItemService<R: ItemRepository> {
    repo: R,
}

impl<R: ItemRepository> ItemService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one item: fills schema defaults, validates every field,
    /// persists, and returns the stored record with store timestamps.
    pub fn create_item(
        &self,
        wall: &Wall,
        mut draft: ItemDraft,
    ) -> Result<WallItem, ItemServiceError> {
        ensure_same_wall(wall.id, draft.wall_id)?;
        let object_type = wall
            .object_type(draft.object_type_id)
            .ok_or(ItemServiceError::UnknownObjectType(draft.object_type_id))?;

        draft.fill_defaults(object_type);
        let violations = validate_draft(object_type, &draft);
        if !violations.is_empty() {
            return Err(ItemServiceError::Validation(violations));
        }

        let id = self.repo.create_item(&draft)?;
        self.repo
            .get_item(id)?
            .ok_or(ItemServiceError::InconsistentState(
                "created item not found in read-back",
            ))
    }

    /// Applies a partial patch: patched field keys are validated against
    /// the item's schema, untouched keys stay as stored.
    pub fn update_item(
        &self,
        wall: &Wall,
        id: ItemId,
        patch: ItemPatch,
    ) -> Result<WallItem, ItemServiceError> {
        let stored = self
            .repo
            .get_item(id)?
            .ok_or(ItemServiceError::ItemNotFound(id))?;
        ensure_same_wall(wall.id, stored.wall_id)?;
        let object_type = wall
            .object_type(stored.object_type_id)
            .ok_or(ItemServiceError::UnknownObjectType(stored.object_type_id))?;

        let mut violations = Vec::new();
        for (field_id, value) in &patch.field_data {
            if let Some(field) = object_type.field(field_id) {
                violations.extend(validate_value(field, value));
            }
            // Keys outside the schema pass through untouched; they belong
            // to fields that were removed or renamed and stay as data.
        }
        if !violations.is_empty() {
            return Err(ItemServiceError::Validation(violations));
        }

        self.repo.update_item(id, &patch)?;
        self.repo
            .get_item(id)?
            .ok_or(ItemServiceError::InconsistentState(
                "updated item not found in read-back",
            ))
    }

    /// Gets one item by id.
    pub fn get_item(&self, id: ItemId) -> RepoResult<Option<WallItem>> {
        self.repo.get_item(id)
    }

    /// Lists wall items newest first, optionally filtered by object type.
    pub fn list_items(&self, query: &ItemListQuery) -> RepoResult<Vec<WallItem>> {
        self.repo.list_items(query)
    }

    /// Hard-deletes one item.
    pub fn delete_item(&self, id: ItemId) -> Result<(), ItemServiceError> {
        self.repo.delete_item(id)?;
        Ok(())
    }

    /// Creates a batch of drafts sequentially.
    ///
    /// All drafts are validated up front; the first invalid draft aborts
    /// the batch before any write. Store failures mid-batch surface as
    /// `Bulk` with the failing index; earlier creates remain persisted.
    pub fn bulk_create(
        &self,
        wall: &Wall,
        drafts: Vec<ItemDraft>,
    ) -> Result<Vec<ItemId>, ItemServiceError> {
        let mut prepared = Vec::with_capacity(drafts.len());
        for (index, mut draft) in drafts.into_iter().enumerate() {
            ensure_same_wall(wall.id, draft.wall_id)?;
            let object_type = wall
                .object_type(draft.object_type_id)
                .ok_or(ItemServiceError::UnknownObjectType(draft.object_type_id))?;
            draft.fill_defaults(object_type);
            let violations = validate_draft(object_type, &draft);
            if !violations.is_empty() {
                return Err(ItemServiceError::BulkValidation { index, violations });
            }
            prepared.push(draft);
        }

        Ok(self.repo.bulk_create(&prepared)?)
    }

    /// Applies a batch of patches sequentially.
    ///
    /// Every patch is validated against its stored item's schema before the
    /// first write, mirroring `bulk_create`. Store failures mid-batch
    /// surface as `Bulk` with the failing index; earlier patches remain
    /// persisted.
    pub fn bulk_update(
        &self,
        wall: &Wall,
        updates: &[(ItemId, ItemPatch)],
    ) -> Result<(), ItemServiceError> {
        for (index, (id, patch)) in updates.iter().enumerate() {
            let stored = self
                .repo
                .get_item(*id)?
                .ok_or(ItemServiceError::ItemNotFound(*id))?;
            ensure_same_wall(wall.id, stored.wall_id)?;
            let object_type = wall
                .object_type(stored.object_type_id)
                .ok_or(ItemServiceError::UnknownObjectType(stored.object_type_id))?;

            let mut violations = Vec::new();
            for (field_id, value) in &patch.field_data {
                if let Some(field) = object_type.field(field_id) {
                    violations.extend(validate_value(field, value));
                }
            }
            if !violations.is_empty() {
                return Err(ItemServiceError::BulkValidation { index, violations });
            }
        }

        self.repo.bulk_update(updates)?;
        Ok(())
    }

    /// Deletes a batch of items sequentially, failing fast.
    pub fn bulk_delete(&self, ids: &[ItemId]) -> Result<(), ItemServiceError> {
        self.repo.bulk_delete(ids)?;
        Ok(())
    }
}

fn ensure_same_wall(expected: WallId, actual: WallId) -> Result<(), ItemServiceError> {
    if expected != actual {
        return Err(ItemServiceError::WallMismatch { expected, actual });
    }
    Ok(())
}

fn validate_draft(object_type: &ObjectType, draft: &ItemDraft) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    for field in &object_type.fields {
        if let Some(value) = draft.field_data.get(&field.id) {
            violations.extend(validate_value(field, value));
        }
    }
    violations
}
