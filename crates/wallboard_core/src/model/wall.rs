//! Wall container model: schemas, legacy field list, and access roles.
//!
//! # Responsibility
//! - Own the object-type schemas of one tenant wall.
//! - Carry the legacy flat field list during schema migration.
//! - Expose role membership helpers for the external capability check.
//!
//! # Invariants
//! - A wall has exactly one owner.
//! - A user id appears in at most one of managers/editors/viewers; the
//!   `assign_role` helper preserves this, storage does not enforce it.
//! - A wall is Legacy (`fields` only) or Migrated (`object_types` present),
//!   never meaningfully both: once migrated, `fields` is audit history.

use crate::model::field::{FieldDefinition, ObjectTypeId};
use crate::model::object_type::ObjectType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a wall.
pub type WallId = Uuid;

/// Access level a user holds on a wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallRole {
    Owner,
    Manager,
    Editor,
    Viewer,
}

/// Role membership lists for one wall.
///
/// Authorization decisions happen outside the core; these helpers only
/// answer membership questions for that external boolean check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub owner: String,
    #[serde(default)]
    pub managers: Vec<String>,
    #[serde(default)]
    pub editors: Vec<String>,
    #[serde(default)]
    pub viewers: Vec<String>,
}

impl Permissions {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            managers: Vec::new(),
            editors: Vec::new(),
            viewers: Vec::new(),
        }
    }

    /// Returns the highest role held by `user_id`, owner first.
    pub fn role_of(&self, user_id: &str) -> Option<WallRole> {
        if self.owner == user_id {
            Some(WallRole::Owner)
        } else if self.managers.iter().any(|id| id == user_id) {
            Some(WallRole::Manager)
        } else if self.editors.iter().any(|id| id == user_id) {
            Some(WallRole::Editor)
        } else if self.viewers.iter().any(|id| id == user_id) {
            Some(WallRole::Viewer)
        } else {
            None
        }
    }

    /// Returns whether `user_id` may mutate wall content.
    pub fn can_edit(&self, user_id: &str) -> bool {
        matches!(
            self.role_of(user_id),
            Some(WallRole::Owner | WallRole::Manager | WallRole::Editor)
        )
    }

    /// Places `user_id` in exactly one role list.
    ///
    /// Removes the user from every other list first, so a user id never
    /// appears under two roles. Assigning `Owner` replaces the owner; the
    /// previous owner keeps no implicit role.
    pub fn assign_role(&mut self, user_id: &str, role: WallRole) {
        self.managers.retain(|id| id != user_id);
        self.editors.retain(|id| id != user_id);
        self.viewers.retain(|id| id != user_id);

        match role {
            WallRole::Owner => self.owner = user_id.to_string(),
            WallRole::Manager => self.managers.push(user_id.to_string()),
            WallRole::Editor => self.editors.push(user_id.to_string()),
            WallRole::Viewer => self.viewers.push(user_id.to_string()),
        }
    }
}

/// Top-level tenant container for typed records and their schemas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: WallId,
    pub name: String,
    /// Embedded, exclusively owned schemas. Items reference them by id only.
    #[serde(default)]
    pub object_types: Vec<ObjectType>,
    /// Pre-schema flat field list, retained after migration for audit.
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    pub permissions: Permissions,
}

impl Wall {
    /// Creates an empty wall owned by `owner`.
    pub fn new(name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            object_types: Vec::new(),
            fields: Vec::new(),
            permissions: Permissions::new(owner),
        }
    }

    /// Looks up an embedded object type by id.
    pub fn object_type(&self, object_type_id: ObjectTypeId) -> Option<&ObjectType> {
        self.object_types
            .iter()
            .find(|object_type| object_type.id == object_type_id)
    }

    /// Returns whether the wall still runs on the legacy flat field list.
    pub fn is_legacy(&self) -> bool {
        !self.fields.is_empty() && self.object_types.is_empty()
    }

    /// Returns whether the wall has schema-backed object types.
    pub fn is_migrated(&self) -> bool {
        !self.object_types.is_empty()
    }
}
