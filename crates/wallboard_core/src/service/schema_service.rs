//! Wall schema administration service.
//!
//! # Responsibility
//! - Create walls and evolve their object-type schemas.
//! - Guard schema removal against orphaning stored items.
//!
//! # Invariants
//! - Added object types pass `ObjectType::validate` and reference only
//!   object types that exist on the wall (or themselves).
//! - An object type with stored items cannot be removed; items would
//!   become unreachable orphans otherwise.
//! - A wall with stored items cannot be deleted; the same orphan guard at
//!   wall scope.

use crate::model::field::{FieldType, ObjectTypeId};
use crate::model::object_type::{ObjectType, ObjectTypeError};
use crate::model::wall::{Wall, WallId};
use crate::repo::item_repo::ItemRepository;
use crate::repo::wall_repo::WallRepository;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from wall schema administration.
#[derive(Debug)]
pub enum SchemaServiceError {
    WallNotFound(WallId),
    UnknownObjectType(ObjectTypeId),
    /// The new object type is internally inconsistent.
    InvalidObjectType(ObjectTypeError),
    /// A relationship field targets an object type the wall does not own.
    UnknownRelationshipTarget {
        field_id: String,
        target: ObjectTypeId,
    },
    /// Removal refused: items of this type still exist.
    ObjectTypeInUse {
        object_type_id: ObjectTypeId,
        item_count: u64,
    },
    /// Wall deletion refused: the wall still holds items.
    WallInUse {
        wall_id: WallId,
        item_count: u64,
    },
    Repo(RepoError),
}

impl Display for SchemaServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WallNotFound(id) => write!(f, "wall not found: {id}"),
            Self::UnknownObjectType(id) => write!(f, "unknown object type: {id}"),
            Self::InvalidObjectType(err) => write!(f, "invalid object type: {err}"),
            Self::UnknownRelationshipTarget { field_id, target } => write!(
                f,
                "field `{field_id}` targets object type {target} which is not on this wall"
            ),
            Self::ObjectTypeInUse {
                object_type_id,
                item_count,
            } => write!(
                f,
                "object type {object_type_id} still has {item_count} item(s); delete them first"
            ),
            Self::WallInUse {
                wall_id,
                item_count,
            } => write!(
                f,
                "wall {wall_id} still has {item_count} item(s); delete them first"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SchemaServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidObjectType(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for SchemaServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::WallNotFound(id) => Self::WallNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<ObjectTypeError> for SchemaServiceError {
    fn from(value: ObjectTypeError) -> Self {
        Self::InvalidObjectType(value)
    }
}

/// Schema administration over wall and item repositories.
pub struct SchemaService<W: WallRepository, I: ItemRepository> {
    walls: W,
    items: I,
}

impl<W: WallRepository, I: ItemRepository> SchemaService<W, I> {
    pub fn new(walls: W, items: I) -> Self {
        Self { walls, items }
    }

    /// Creates and persists an empty wall owned by `owner`.
    pub fn create_wall(
        &self,
        name: impl Into<String>,
        owner: impl Into<String>,
    ) -> Result<Wall, SchemaServiceError> {
        let wall = Wall::new(name, owner);
        self.walls.create_wall(&wall)?;
        Ok(wall)
    }

    /// Validates and attaches a new object type to a wall.
    ///
    /// Relationship fields may target any object type already on the wall
    /// or the new type itself (self-referencing schemas are legal).
    pub fn add_object_type(
        &self,
        wall_id: WallId,
        object_type: ObjectType,
    ) -> Result<Wall, SchemaServiceError> {
        object_type.validate()?;

        let mut wall = self
            .walls
            .get_wall(wall_id)?
            .ok_or(SchemaServiceError::WallNotFound(wall_id))?;

        for field in &object_type.fields {
            if field.field_type != FieldType::Relationship {
                continue;
            }
            if let Some(config) = &field.relationship_config {
                let target = config.target_object_type_id;
                let known = target == object_type.id || wall.object_type(target).is_some();
                if !known {
                    return Err(SchemaServiceError::UnknownRelationshipTarget {
                        field_id: field.id.clone(),
                        target,
                    });
                }
            }
        }

        wall.object_types.push(object_type);
        self.walls.update_wall(&wall)?;
        Ok(wall)
    }

    /// Removes an object type from a wall, refusing while items exist.
    pub fn remove_object_type(
        &self,
        wall_id: WallId,
        object_type_id: ObjectTypeId,
    ) -> Result<Wall, SchemaServiceError> {
        let mut wall = self
            .walls
            .get_wall(wall_id)?
            .ok_or(SchemaServiceError::WallNotFound(wall_id))?;

        if wall.object_type(object_type_id).is_none() {
            return Err(SchemaServiceError::UnknownObjectType(object_type_id));
        }

        let item_count = self.items.count_items_of_type(wall_id, object_type_id)?;
        if item_count > 0 {
            return Err(SchemaServiceError::ObjectTypeInUse {
                object_type_id,
                item_count,
            });
        }

        wall.object_types
            .retain(|object_type| object_type.id != object_type_id);
        self.walls.update_wall(&wall)?;
        Ok(wall)
    }

    /// Deletes a wall, refusing while it still holds items.
    ///
    /// The guard keeps the storage-level foreign key from ever firing in
    /// normal operation and reports the item count instead of a raw
    /// constraint error.
    pub fn delete_wall(&self, wall_id: WallId) -> Result<(), SchemaServiceError> {
        if self.walls.get_wall(wall_id)?.is_none() {
            return Err(SchemaServiceError::WallNotFound(wall_id));
        }

        let item_count = self.items.count_items(wall_id)?;
        if item_count > 0 {
            return Err(SchemaServiceError::WallInUse {
                wall_id,
                item_count,
            });
        }

        self.walls.delete_wall(wall_id)?;
        Ok(())
    }
}
