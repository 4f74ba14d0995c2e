//! Field schema and typed field values.
//!
//! # Responsibility
//! - Define the per-field schema (type, constraints, type-specific config).
//! - Define the tagged value union stored in item field data.
//! - Derive default values and validation rule sets from a field schema.
//!
//! # Invariants
//! - `FieldDefinition::id` is immutable once any stored item references it;
//!   changing it orphans that item data and no auto-repair exists.
//! - `default_value()` always returns a value whose variant matches the
//!   field's declared type (or `Null` where the type has no empty shape).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for an object type embedded in a wall.
pub type ObjectTypeId = Uuid;

/// Stable identifier for a stored wall item.
pub type ItemId = Uuid;

/// Closed set of field types a schema can declare.
///
/// Every value-shape decision in the crate (defaults, validation, display,
/// export) switches exhaustively on this discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    LongText,
    RichText,
    Email,
    Url,
    Number,
    NumberRange,
    Date,
    DateRange,
    Boolean,
    Color,
    Multiselect,
    File,
    Location,
    Relationship,
}

/// Length/pattern constraints applied on top of `required`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Config for `FieldType::Multiselect`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiselectConfig {
    /// Allowed option labels, in display order.
    pub options: Vec<String>,
}

/// Config for `FieldType::File`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    /// Whether more than one attachment is accepted.
    pub multiple: bool,
}

/// Config for `FieldType::Relationship`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipConfig {
    /// Object type the referenced items must belong to.
    pub target_object_type_id: ObjectTypeId,
    /// Whether the field may hold more than one referenced item.
    pub allow_multiple: bool,
}

/// One typed, validated slot within an object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Stable key into item `field_data`. Unique within its object type.
    pub id: String,
    /// Human label shown in forms and exports.
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub validation: ValidationRules,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiselect_config: Option<MultiselectConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_config: Option<FileConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_config: Option<RelationshipConfig>,
}

impl FieldDefinition {
    /// Creates a minimal field with no constraints or type config.
    pub fn new(id: impl Into<String>, name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            field_type,
            required: false,
            validation: ValidationRules::default(),
            multiselect_config: None,
            file_config: None,
            relationship_config: None,
        }
    }

    /// Returns the value used when an item has no entry for this field.
    ///
    /// # Contract
    /// - Text-like types -> empty text.
    /// - `Boolean` -> `false`, `Multiselect` -> empty list, `Color` -> black.
    /// - Everything else -> `Null` (no meaningful empty shape).
    pub fn default_value(&self) -> FieldValue {
        match self.field_type {
            FieldType::Text
            | FieldType::LongText
            | FieldType::RichText
            | FieldType::Email
            | FieldType::Url => FieldValue::Text(String::new()),
            FieldType::Boolean => FieldValue::Boolean(false),
            FieldType::Multiselect => FieldValue::Multiselect(Vec::new()),
            FieldType::Color => FieldValue::Color("#000000".to_string()),
            FieldType::Number
            | FieldType::NumberRange
            | FieldType::Date
            | FieldType::DateRange
            | FieldType::File
            | FieldType::Location
            | FieldType::Relationship => FieldValue::Null,
        }
    }

    /// Returns the composable rule set any consumer must enforce for this
    /// field, so form layer and batch importers apply identical rules.
    pub fn validators(&self) -> Vec<ValidationRule> {
        let mut rules = Vec::new();
        if self.required {
            rules.push(ValidationRule::Required);
        }
        if let Some(min) = self.validation.min_length {
            rules.push(ValidationRule::MinLength(min));
        }
        if let Some(max) = self.validation.max_length {
            rules.push(ValidationRule::MaxLength(max));
        }
        if let Some(pattern) = &self.validation.pattern {
            rules.push(ValidationRule::Pattern(pattern.clone()));
        }
        if let Some(config) = &self.relationship_config {
            if !config.allow_multiple {
                rules.push(ValidationRule::SingleRelationship);
            }
        }
        rules
    }
}

/// One validation rule derived from a field schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationRule {
    /// Value must be present and non-empty.
    Required,
    /// Text value must contain at least this many characters.
    MinLength(usize),
    /// Text value must contain at most this many characters.
    MaxLength(usize),
    /// Text value must match this regular expression.
    Pattern(String),
    /// Relationship value must reference at most one item.
    SingleRelationship,
}

impl ValidationRule {
    /// Stable machine-readable rule name for structured violation reports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MinLength(_) => "min_length",
            Self::MaxLength(_) => "max_length",
            Self::Pattern(_) => "pattern",
            Self::SingleRelationship => "single_relationship",
        }
    }
}

/// One per-field validation failure, addressable by UI form controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field_id: String,
    /// Machine-readable rule code, see `ValidationRule::code`.
    pub rule: &'static str,
    pub message: String,
}

impl Display for FieldViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "field `{}` failed rule `{}`: {}", self.field_id, self.rule, self.message)
    }
}

/// Runtime value stored under a field id in item field data.
///
/// The variant must match the owning field's declared `FieldType`;
/// `validate_value` reports a `type` violation when it does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Explicit absence. Unset optional leaves are omitted on the wire, so
    /// documents never carry an `undefined`-like state.
    Null,
    Text(String),
    Number(f64),
    NumberRange {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    /// Epoch milliseconds.
    Date(i64),
    DateRange {
        #[serde(skip_serializing_if = "Option::is_none")]
        start: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        end: Option<i64>,
    },
    Boolean(bool),
    /// `#rrggbb` hex string.
    Color(String),
    Multiselect(Vec<String>),
    /// Storage paths of uploaded attachments.
    File(Vec<String>),
    Location {
        lat: f64,
        lng: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        address: Option<String>,
    },
    /// Referenced item ids. Single-valued relationship fields hold one
    /// element; `allow_multiple` is enforced by validation, not by shape.
    Relationship(Vec<ItemId>),
}

impl FieldValue {
    /// Returns whether this value counts as empty for `Required` checks and
    /// display-name fallback.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Multiselect(values) => values.is_empty(),
            Self::File(paths) => paths.is_empty(),
            Self::Relationship(ids) => ids.is_empty(),
            Self::NumberRange { min, max } => min.is_none() && max.is_none(),
            Self::DateRange { start, end } => start.is_none() && end.is_none(),
            Self::Number(_) | Self::Date(_) | Self::Boolean(_) | Self::Color(_) => false,
            Self::Location { .. } => false,
        }
    }

    /// Returns whether the variant matches the declared field type.
    pub fn matches_type(&self, field_type: FieldType) -> bool {
        if matches!(self, Self::Null) {
            return true;
        }
        match field_type {
            FieldType::Text
            | FieldType::LongText
            | FieldType::RichText
            | FieldType::Email
            | FieldType::Url => matches!(self, Self::Text(_)),
            FieldType::Number => matches!(self, Self::Number(_)),
            FieldType::NumberRange => matches!(self, Self::NumberRange { .. }),
            FieldType::Date => matches!(self, Self::Date(_)),
            FieldType::DateRange => matches!(self, Self::DateRange { .. }),
            FieldType::Boolean => matches!(self, Self::Boolean(_)),
            FieldType::Color => matches!(self, Self::Color(_)),
            FieldType::Multiselect => matches!(self, Self::Multiselect(_)),
            FieldType::File => matches!(self, Self::File(_)),
            FieldType::Location => matches!(self, Self::Location { .. }),
            FieldType::Relationship => matches!(self, Self::Relationship(_)),
        }
    }
}

/// Validates one value against one field schema.
///
/// Returns every violated rule so a form can render all per-field errors at
/// once. Length and pattern rules only apply to text-shaped values; a value
/// of the wrong variant reports a single `type` violation instead.
pub fn validate_value(field: &FieldDefinition, value: &FieldValue) -> Vec<FieldViolation> {
    if !value.matches_type(field.field_type) {
        return vec![FieldViolation {
            field_id: field.id.clone(),
            rule: "type",
            message: format!(
                "value shape does not match declared field type `{:?}`",
                field.field_type
            ),
        }];
    }

    let mut violations = Vec::new();
    for rule in field.validators() {
        let failed = match &rule {
            ValidationRule::Required => value.is_empty(),
            ValidationRule::MinLength(min) => match value {
                FieldValue::Text(text) => !text.is_empty() && text.chars().count() < *min,
                _ => false,
            },
            ValidationRule::MaxLength(max) => match value {
                FieldValue::Text(text) => text.chars().count() > *max,
                _ => false,
            },
            ValidationRule::Pattern(pattern) => match value {
                FieldValue::Text(text) if !text.is_empty() => match Regex::new(pattern) {
                    Ok(re) => !re.is_match(text),
                    // An uncompilable pattern is a schema bug; report it
                    // against the field rather than passing bad data through.
                    Err(_) => true,
                },
                _ => false,
            },
            ValidationRule::SingleRelationship => match value {
                FieldValue::Relationship(ids) => ids.len() > 1,
                _ => false,
            },
        };

        if failed {
            violations.push(FieldViolation {
                field_id: field.id.clone(),
                rule: rule.code(),
                message: violation_message(&rule, &field.name),
            });
        }
    }

    violations
}

fn violation_message(rule: &ValidationRule, field_name: &str) -> String {
    match rule {
        ValidationRule::Required => format!("{field_name} is required"),
        ValidationRule::MinLength(min) => {
            format!("{field_name} must be at least {min} characters")
        }
        ValidationRule::MaxLength(max) => {
            format!("{field_name} must be at most {max} characters")
        }
        ValidationRule::Pattern(pattern) => {
            format!("{field_name} must match pattern `{pattern}`")
        }
        ValidationRule::SingleRelationship => {
            format!("{field_name} accepts only one linked item")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_field() -> FieldDefinition {
        FieldDefinition::new("title", "Title", FieldType::Text)
    }

    #[test]
    fn default_value_variant_matches_declared_type() {
        let cases = [
            (FieldType::Text, FieldValue::Text(String::new())),
            (FieldType::RichText, FieldValue::Text(String::new())),
            (FieldType::Boolean, FieldValue::Boolean(false)),
            (FieldType::Multiselect, FieldValue::Multiselect(Vec::new())),
            (FieldType::Color, FieldValue::Color("#000000".to_string())),
            (FieldType::Number, FieldValue::Null),
            (FieldType::Relationship, FieldValue::Null),
            (FieldType::Location, FieldValue::Null),
        ];
        for (field_type, expected) in cases {
            let field = FieldDefinition::new("f", "F", field_type);
            assert_eq!(field.default_value(), expected);
            assert!(field.default_value().matches_type(field_type));
        }
    }

    #[test]
    fn required_rule_rejects_empty_and_null_values() {
        let mut field = text_field();
        field.required = true;

        let empty = validate_value(&field, &FieldValue::Text("  ".to_string()));
        assert_eq!(empty.len(), 1);
        assert_eq!(empty[0].rule, "required");

        let null = validate_value(&field, &FieldValue::Null);
        assert_eq!(null[0].rule, "required");

        assert!(validate_value(&field, &FieldValue::Text("ok".to_string())).is_empty());
    }

    #[test]
    fn length_rules_apply_to_text_values_only() {
        let mut field = text_field();
        field.validation.min_length = Some(3);
        field.validation.max_length = Some(5);

        let short = validate_value(&field, &FieldValue::Text("ab".to_string()));
        assert_eq!(short[0].rule, "min_length");

        let long = validate_value(&field, &FieldValue::Text("abcdef".to_string()));
        assert_eq!(long[0].rule, "max_length");

        // Empty text is a `required` concern, not a length violation.
        assert!(validate_value(&field, &FieldValue::Text(String::new())).is_empty());
    }

    #[test]
    fn pattern_rule_uses_compiled_regex() {
        let mut field = FieldDefinition::new("mail", "Mail", FieldType::Email);
        field.validation.pattern = Some("^[^@]+@[^@]+$".to_string());

        let bad = validate_value(&field, &FieldValue::Text("nope".to_string()));
        assert_eq!(bad[0].rule, "pattern");
        assert!(validate_value(&field, &FieldValue::Text("a@b.example".to_string())).is_empty());
    }

    #[test]
    fn wrong_variant_reports_single_type_violation() {
        let mut field = text_field();
        field.required = true;
        field.validation.min_length = Some(3);

        let violations = validate_value(&field, &FieldValue::Boolean(true));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, "type");
    }

    #[test]
    fn single_relationship_rule_limits_cardinality() {
        let mut field = FieldDefinition::new("author", "Author", FieldType::Relationship);
        field.relationship_config = Some(RelationshipConfig {
            target_object_type_id: Uuid::new_v4(),
            allow_multiple: false,
        });

        let one = FieldValue::Relationship(vec![Uuid::new_v4()]);
        assert!(validate_value(&field, &one).is_empty());

        let two = FieldValue::Relationship(vec![Uuid::new_v4(), Uuid::new_v4()]);
        assert_eq!(validate_value(&field, &two)[0].rule, "single_relationship");
    }

    #[test]
    fn optional_leaves_are_omitted_from_documents() {
        let value = FieldValue::Location {
            lat: 52.52,
            lng: 13.405,
            address: None,
        };
        let json = serde_json::to_string(&value).unwrap();
        assert!(!json.contains("address"));

        let range = FieldValue::DateRange {
            start: Some(100),
            end: None,
        };
        let json = serde_json::to_string(&range).unwrap();
        assert!(json.contains("start"));
        assert!(!json.contains("end"));
    }
}
