//! Display resolver: deterministic label/subtitle derivation for items.
//!
//! # Responsibility
//! - Derive the one human label every list/detail/relationship view uses.
//! - Keep stringification of typed values in a single place.
//!
//! # Invariants
//! - Same item + object type always yields the same label and subtitle.
//! - Subtitle derivation never falls back to a field scan; an unset or
//!   empty secondary field means no subtitle.

use crate::model::field::FieldValue;
use crate::model::item::WallItem;
use crate::model::object_type::ObjectType;

/// Single consistent fallback label for items with no displayable value.
pub const UNTITLED_LABEL: &str = "Untitled Item";

/// Derives the item label.
///
/// 1. The primary display field's value, when set and non-empty.
/// 2. Else the first declared field holding non-empty text.
/// 3. Else `"Untitled Item"`.
pub fn display_name(object_type: &ObjectType, item: &WallItem) -> String {
    if let Some(field_id) = object_type.display_settings.primary_field.as_deref() {
        if let Some(label) = stringify(item.value(field_id)) {
            return label;
        }
    }

    for field in &object_type.fields {
        if let FieldValue::Text(text) = item.value(&field.id) {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }

    UNTITLED_LABEL.to_string()
}

/// Derives the item subtitle from the secondary display field, if any.
pub fn display_subtitle(object_type: &ObjectType, item: &WallItem) -> Option<String> {
    let field_id = object_type.display_settings.secondary_field.as_deref()?;
    stringify(item.value(field_id))
}

/// Stringifies one value for display. Empty values yield `None`.
///
/// Locations prefer their address over coordinates; list values are
/// comma-joined; numbers drop a trailing `.0`.
pub fn stringify(value: &FieldValue) -> Option<String> {
    let text = match value {
        FieldValue::Null => return None,
        FieldValue::Text(text) => text.trim().to_string(),
        FieldValue::Number(number) => format_number(*number),
        FieldValue::NumberRange { min, max } => format_range(
            min.map(format_number).as_deref(),
            max.map(format_number).as_deref(),
        ),
        FieldValue::Date(epoch_ms) => epoch_ms.to_string(),
        FieldValue::DateRange { start, end } => format_range(
            start.map(|ms| ms.to_string()).as_deref(),
            end.map(|ms| ms.to_string()).as_deref(),
        ),
        FieldValue::Boolean(flag) => flag.to_string(),
        FieldValue::Color(color) => color.clone(),
        FieldValue::Multiselect(values) => values.join(", "),
        FieldValue::File(paths) => paths.join(", "),
        FieldValue::Location { lat, lng, address } => match address {
            Some(address) if !address.trim().is_empty() => address.trim().to_string(),
            _ => format!("{lat}, {lng}"),
        },
        FieldValue::Relationship(ids) => ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}

fn format_range(start: Option<&str>, end: Option<&str>) -> String {
    match (start, end) {
        (Some(start), Some(end)) => format!("{start} to {end}"),
        (Some(start), None) => format!("from {start}"),
        (None, Some(end)) => format!("until {end}"),
        (None, None) => String::new(),
    }
}
