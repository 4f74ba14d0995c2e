//! Object type schema: an ordered field list plus display settings.
//!
//! # Responsibility
//! - Define one named record schema within a wall.
//! - Keep display-settings references consistent with the field list.
//!
//! # Invariants
//! - Field ids are unique within one object type.
//! - `display_settings.primary_field`/`secondary_field`, when set, name an
//!   existing field id.

use crate::model::field::{FieldDefinition, ObjectTypeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Which fields drive the item label and subtitle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Field id whose value becomes the item label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_field: Option<String>,
    /// Field id whose value becomes the item subtitle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_field: Option<String>,
}

/// A named schema describing one kind of record within a wall.
///
/// Field order is meaningful: it is form/tab order and the scan order used
/// by display-name fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectType {
    pub id: ObjectTypeId,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: String,
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub display_settings: DisplaySettings,
}

/// Schema consistency failure inside one object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectTypeError {
    DuplicateFieldId(String),
    /// A display setting names a field id that does not exist.
    UnknownDisplayField(String),
}

impl Display for ObjectTypeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateFieldId(id) => write!(f, "duplicate field id `{id}`"),
            Self::UnknownDisplayField(id) => {
                write!(f, "display settings reference unknown field id `{id}`")
            }
        }
    }
}

impl Error for ObjectTypeError {}

impl ObjectType {
    /// Creates an object type with a generated id and empty presentation
    /// metadata.
    pub fn new(name: impl Into<String>, fields: Vec<FieldDefinition>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            icon: String::new(),
            color: String::new(),
            description: String::new(),
            fields,
            display_settings: DisplaySettings::default(),
        }
    }

    /// Looks up one field schema by its stable id.
    pub fn field(&self, field_id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.id == field_id)
    }

    /// Checks field-id uniqueness and display-settings references.
    pub fn validate(&self) -> Result<(), ObjectTypeError> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.id.as_str()) {
                return Err(ObjectTypeError::DuplicateFieldId(field.id.clone()));
            }
        }

        for reference in [
            self.display_settings.primary_field.as_deref(),
            self.display_settings.secondary_field.as_deref(),
        ]
        .into_iter()
        .flatten()
        {
            if !seen.contains(reference) {
                return Err(ObjectTypeError::UnknownDisplayField(reference.to_string()));
            }
        }

        Ok(())
    }
}
