//! Wall item model: one typed record conforming to an object type schema.
//!
//! # Responsibility
//! - Define the stored record shape and its draft/patch companions.
//! - Keep field data keyed by stable field ids.
//!
//! # Invariants
//! - `object_type_id` must reference an object type belonging to `wall_id`;
//!   the reference is weak (id only), deleting the schema does not cascade.
//! - `field_data` keys should be a subset of the object type's field ids;
//!   missing keys read as the field's default value.
//! - `created_at`/`updated_at` are store-assigned epoch milliseconds.

use crate::model::field::{FieldValue, ItemId, ObjectTypeId};
use crate::model::object_type::ObjectType;
use crate::model::wall::WallId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// One attached image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallItemImage {
    /// Storage path or URL; upload handling lives outside the core.
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// A single stored record instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallItem {
    pub id: ItemId,
    pub wall_id: WallId,
    pub object_type_id: ObjectTypeId,
    /// Field-id keyed values. BTreeMap keeps document encoding stable.
    #[serde(default)]
    pub field_data: BTreeMap<String, FieldValue>,
    #[serde(default)]
    pub images: Vec<WallItemImage>,
    #[serde(default)]
    pub primary_image_index: usize,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Epoch milliseconds, assigned by the store on create.
    pub created_at: i64,
    /// Epoch milliseconds, refreshed by the store on every write.
    pub updated_at: i64,
}

impl WallItem {
    /// Returns the stored value for `field_id`, or `Null` when absent.
    ///
    /// Callers wanting per-type defaults need the field schema at hand;
    /// see `FieldDefinition::default_value`.
    pub fn value(&self, field_id: &str) -> &FieldValue {
        self.field_data.get(field_id).unwrap_or(&FieldValue::Null)
    }
}

/// Caller-provided content for a new item; identity and timestamps are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub wall_id: WallId,
    pub object_type_id: ObjectTypeId,
    /// Stable id override for import/sync paths that already own identity.
    pub id: Option<ItemId>,
    pub field_data: BTreeMap<String, FieldValue>,
    pub images: Vec<WallItemImage>,
    pub primary_image_index: usize,
    pub tags: Vec<String>,
}

impl ItemDraft {
    /// Creates an empty draft for the given wall and object type.
    pub fn new(wall_id: WallId, object_type_id: ObjectTypeId) -> Self {
        Self {
            wall_id,
            object_type_id,
            id: None,
            field_data: BTreeMap::new(),
            images: Vec::new(),
            primary_image_index: 0,
            tags: Vec::new(),
        }
    }

    /// Fluent helper used heavily by tests and importers.
    pub fn with_value(mut self, field_id: impl Into<String>, value: FieldValue) -> Self {
        self.field_data.insert(field_id.into(), value);
        self
    }

    /// Fills every schema field missing from `field_data` with its
    /// per-type default, so forms and exports see a complete record.
    pub fn fill_defaults(&mut self, object_type: &ObjectType) {
        for field in &object_type.fields {
            self.field_data
                .entry(field.id.clone())
                .or_insert_with(|| field.default_value());
        }
    }

    pub(crate) fn resolved_id(&self) -> ItemId {
        self.id.unwrap_or_else(Uuid::new_v4)
    }
}

/// Partial update applied to a stored item.
///
/// `field_data` entries merge over existing keys; `None` top-level members
/// leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub field_data: BTreeMap<String, FieldValue>,
    pub images: Option<Vec<WallItemImage>>,
    pub primary_image_index: Option<usize>,
    pub tags: Option<Vec<String>>,
}

impl ItemPatch {
    /// Fluent helper mirroring `ItemDraft::with_value`.
    pub fn with_value(mut self, field_id: impl Into<String>, value: FieldValue) -> Self {
        self.field_data.insert(field_id.into(), value);
        self
    }
}
