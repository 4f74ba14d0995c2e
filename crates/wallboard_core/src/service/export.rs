//! Item export: JSON and CSV payload generation.
//!
//! # Responsibility
//! - Flatten wall items into `application/json` or `text/csv` bytes.
//! - Keep CSV quoting rules in one place.
//!
//! # Invariants
//! - CSV columns are deterministic: fixed identity columns, then field ids
//!   in schema declaration order, then off-schema keys sorted.
//! - Any cell containing a comma, quote, or newline is quoted with inner
//!   quotes doubled.

use crate::model::field::FieldValue;
use crate::model::item::WallItem;
use crate::model::wall::Wall;
use crate::service::display::stringify;
use log::info;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Supported export payload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// MIME type of the produced payload.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
        }
    }
}

/// Errors from payload generation.
#[derive(Debug)]
pub enum ExportError {
    Serialization(serde_json::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialization(err) => write!(f, "export serialization failed: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialization(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Renders `items` of one wall into an export payload.
pub fn export_items(
    wall: &Wall,
    items: &[WallItem],
    format: ExportFormat,
) -> Result<Vec<u8>, ExportError> {
    let payload = match format {
        ExportFormat::Json => serde_json::to_vec_pretty(items)?,
        ExportFormat::Csv => export_csv(wall, items).into_bytes(),
    };

    info!(
        "event=items_export module=export status=ok wall={} format={} item_count={} bytes={}",
        wall.id,
        format.content_type(),
        items.len(),
        payload.len()
    );
    Ok(payload)
}

fn export_csv(wall: &Wall, items: &[WallItem]) -> String {
    let field_columns = field_columns(wall, items);

    let mut lines = Vec::with_capacity(items.len() + 1);
    let header: Vec<String> = ["id", "object_type", "created_at", "updated_at", "tags"]
        .into_iter()
        .map(str::to_string)
        .chain(field_columns.iter().cloned())
        .collect();
    lines.push(render_row(&header));

    for item in items {
        let object_type_name = wall
            .object_type(item.object_type_id)
            .map(|object_type| object_type.name.clone())
            .unwrap_or_default();

        let mut row = vec![
            item.id.to_string(),
            object_type_name,
            item.created_at.to_string(),
            item.updated_at.to_string(),
            item.tags.join(", "),
        ];
        for column in &field_columns {
            row.push(csv_cell(item.value(column)));
        }
        lines.push(render_row(&row));
    }

    let mut csv = lines.join("\r\n");
    csv.push_str("\r\n");
    csv
}

/// Field columns: wall schemas in declaration order (first occurrence of a
/// field id wins), legacy fields for unmigrated walls, then any item keys
/// outside every schema, sorted for determinism.
fn field_columns(wall: &Wall, items: &[WallItem]) -> Vec<String> {
    let mut columns = Vec::new();
    let mut seen = BTreeSet::new();

    let schema_fields = wall
        .object_types
        .iter()
        .flat_map(|object_type| object_type.fields.iter())
        .chain(wall.fields.iter());
    for field in schema_fields {
        if seen.insert(field.id.clone()) {
            columns.push(field.id.clone());
        }
    }

    let mut extra: BTreeSet<String> = BTreeSet::new();
    for item in items {
        for key in item.field_data.keys() {
            if !seen.contains(key) {
                extra.insert(key.clone());
            }
        }
    }
    columns.extend(extra);

    columns
}

fn csv_cell(value: &FieldValue) -> String {
    stringify(value).unwrap_or_default()
}

fn render_row(cells: &[String]) -> String {
    cells
        .iter()
        .map(|cell| escape_cell(cell))
        .collect::<Vec<_>>()
        .join(",")
}

fn escape_cell(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') || cell.contains('\r') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{escape_cell, ExportFormat};

    #[test]
    fn quotes_are_doubled_and_cell_wrapped() {
        assert_eq!(escape_cell("plain"), "plain");
        assert_eq!(escape_cell("a,b"), "\"a,b\"");
        assert_eq!(escape_cell("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_cell("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn content_types_match_formats() {
        assert_eq!(ExportFormat::Json.content_type(), "application/json");
        assert_eq!(ExportFormat::Csv.content_type(), "text/csv");
    }
}
