//! Relationship resolver: forward and reverse link resolution.
//!
//! # Responsibility
//! - Resolve a relationship field's ids to labeled item projections.
//! - Find items across the wall that point back at a given item.
//!
//! # Invariants
//! - Dangling referenced ids are skipped, never errors.
//! - Reverse lookup scans every relationship field targeting the item's
//!   object type; cost is O(items x relationship-fields) per call, which
//!   holds at the expected wall scale of hundreds of items.

use crate::model::field::{FieldType, FieldValue, ItemId, ObjectTypeId};
use crate::model::item::WallItem;
use crate::model::wall::Wall;
use crate::repo::item_repo::{ItemListQuery, ItemRepository};
use crate::repo::RepoError;
use crate::service::display::{display_name, display_subtitle, UNTITLED_LABEL};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Labeled projection of a referenced item, ready for link pickers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    pub id: ItemId,
    pub name: String,
    pub subtitle: Option<String>,
}

/// Items of one object type pointing back through one relationship field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedGroup {
    pub object_type_id: ObjectTypeId,
    pub object_type_name: String,
    pub field_id: String,
    pub field_name: String,
    pub items: Vec<ItemRef>,
}

/// Errors from relationship resolution.
#[derive(Debug)]
pub enum RelationshipError {
    /// The named field does not exist on the item's object type.
    UnknownField(String),
    /// The named field exists but is not a relationship field.
    NotARelationshipField(String),
    /// The item's object type is not part of the wall.
    UnknownObjectType(ObjectTypeId),
    Repo(RepoError),
}

impl Display for RelationshipError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownField(id) => write!(f, "unknown field id `{id}`"),
            Self::NotARelationshipField(id) => {
                write!(f, "field `{id}` is not a relationship field")
            }
            Self::UnknownObjectType(id) => write!(f, "unknown object type: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RelationshipError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for RelationshipError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Resolver over one item repository.
pub struct RelationshipResolver<'repo, R: ItemRepository> {
    repo: &'repo R,
}

impl<'repo, R: ItemRepository> RelationshipResolver<'repo, R> {
    pub fn new(repo: &'repo R) -> Self {
        Self { repo }
    }

    /// Resolves the items referenced by `field_id` on `item`.
    ///
    /// Projections use the referenced item's own object type for labels, so
    /// a picker shows the same names as the target type's list view. Ids
    /// pointing at deleted items are silently dropped.
    pub fn resolve_forward(
        &self,
        wall: &Wall,
        item: &WallItem,
        field_id: &str,
    ) -> Result<Vec<ItemRef>, RelationshipError> {
        let object_type = wall
            .object_type(item.object_type_id)
            .ok_or(RelationshipError::UnknownObjectType(item.object_type_id))?;
        let field = object_type
            .field(field_id)
            .ok_or_else(|| RelationshipError::UnknownField(field_id.to_string()))?;
        if field.field_type != FieldType::Relationship {
            return Err(RelationshipError::NotARelationshipField(field_id.to_string()));
        }

        let ids = match item.value(field_id) {
            FieldValue::Relationship(ids) => ids.clone(),
            FieldValue::Null => Vec::new(),
            _ => Vec::new(),
        };

        let mut refs = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(target) = self.repo.get_item(id)? {
                refs.push(self.project(wall, &target));
            }
        }
        Ok(refs)
    }

    /// Finds every item in the wall that references `item` through a
    /// relationship field targeting its object type.
    ///
    /// Results are grouped per `(object type, field)` in schema declaration
    /// order; groups with no matches are omitted.
    pub fn reverse_lookup(
        &self,
        wall: &Wall,
        item: &WallItem,
    ) -> Result<Vec<RelatedGroup>, RelationshipError> {
        let mut groups = Vec::new();

        for source_type in &wall.object_types {
            for field in &source_type.fields {
                let Some(config) = &field.relationship_config else {
                    continue;
                };
                if field.field_type != FieldType::Relationship
                    || config.target_object_type_id != item.object_type_id
                {
                    continue;
                }

                let candidates = self.repo.list_items(&ItemListQuery {
                    wall_id: wall.id,
                    object_type_id: Some(source_type.id),
                    limit: None,
                    offset: 0,
                })?;

                let items: Vec<ItemRef> = candidates
                    .iter()
                    .filter(|candidate| references(candidate.value(&field.id), item.id))
                    .map(|candidate| self.project(wall, candidate))
                    .collect();

                if !items.is_empty() {
                    groups.push(RelatedGroup {
                        object_type_id: source_type.id,
                        object_type_name: source_type.name.clone(),
                        field_id: field.id.clone(),
                        field_name: field.name.clone(),
                        items,
                    });
                }
            }
        }

        Ok(groups)
    }

    fn project(&self, wall: &Wall, item: &WallItem) -> ItemRef {
        match wall.object_type(item.object_type_id) {
            Some(object_type) => ItemRef {
                id: item.id,
                name: display_name(object_type, item),
                subtitle: display_subtitle(object_type, item),
            },
            // Orphaned item: schema was deleted out from under it.
            None => ItemRef {
                id: item.id,
                name: UNTITLED_LABEL.to_string(),
                subtitle: None,
            },
        }
    }
}

fn references(value: &FieldValue, target: ItemId) -> bool {
    match value {
        FieldValue::Relationship(ids) => ids.contains(&target),
        _ => false,
    }
}
