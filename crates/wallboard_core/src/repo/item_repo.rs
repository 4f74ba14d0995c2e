//! Item store contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD and bulk operations over typed wall item documents.
//! - Keep list ordering and partial-merge semantics inside this boundary.
//!
//! # Invariants
//! - Listing order is `created_at DESC, uuid ASC`.
//! - `update` merges patched field keys and leaves untouched keys unchanged.
//! - Bulk operations run strictly one at a time, fail fast, and report the
//!   zero-based index of the failing operation.
//! - Schema validation is not performed here; the item service owns it.

use crate::model::field::{FieldValue, ItemId, ObjectTypeId};
use crate::model::item::{ItemDraft, ItemPatch, WallItem, WallItemImage};
use crate::model::wall::WallId;
use crate::repo::wall_repo::parse_row_uuid;
use crate::repo::{ensure_ready, RepoError, RepoResult};
use log::error;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const ITEM_SELECT_SQL: &str = "SELECT
    uuid,
    wall_uuid,
    object_type_uuid,
    document,
    created_at,
    updated_at
FROM wall_items";

/// Failure of one operation inside a sequential bulk run.
///
/// Operations before `index` completed; operations after it were never
/// attempted.
#[derive(Debug)]
pub struct BulkError {
    pub index: usize,
    pub source: RepoError,
}

impl Display for BulkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "bulk operation failed at index {}: {}", self.index, self.source)
    }
}

impl Error for BulkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Query options for wall-scoped item listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemListQuery {
    pub wall_id: WallId,
    /// Optional object-type filter.
    pub object_type_id: Option<ObjectTypeId>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl ItemListQuery {
    /// Unfiltered, unpaginated query over one wall.
    pub fn for_wall(wall_id: WallId) -> Self {
        Self {
            wall_id,
            object_type_id: None,
            limit: None,
            offset: 0,
        }
    }
}

/// Repository interface for wall item documents.
///
/// Bulk operations are provided methods so every implementation carries the
/// same sequential fail-fast contract.
pub trait ItemRepository {
    /// Persists a new item; the store assigns timestamps. Returns the id.
    fn create_item(&self, draft: &ItemDraft) -> RepoResult<ItemId>;
    /// Gets one item by id. Missing rows are `Ok(None)`.
    fn get_item(&self, id: ItemId) -> RepoResult<Option<WallItem>>;
    /// Lists items newest first, optionally filtered by object type.
    fn list_items(&self, query: &ItemListQuery) -> RepoResult<Vec<WallItem>>;
    /// Merges a partial patch into one item and refreshes `updated_at`.
    fn update_item(&self, id: ItemId, patch: &ItemPatch) -> RepoResult<()>;
    /// Hard-deletes one item.
    fn delete_item(&self, id: ItemId) -> RepoResult<()>;
    /// Counts all items within a wall.
    fn count_items(&self, wall_id: WallId) -> RepoResult<u64>;
    /// Counts items of one object type within a wall.
    fn count_items_of_type(
        &self,
        wall_id: WallId,
        object_type_id: ObjectTypeId,
    ) -> RepoResult<u64>;

    /// Creates items one at a time in input order, failing fast.
    fn bulk_create(&self, drafts: &[ItemDraft]) -> Result<Vec<ItemId>, BulkError> {
        let mut created = Vec::with_capacity(drafts.len());
        for (index, draft) in drafts.iter().enumerate() {
            match self.create_item(draft) {
                Ok(id) => created.push(id),
                Err(source) => {
                    error!(
                        "event=bulk_write module=repo status=error op=create index={index} error={source}"
                    );
                    return Err(BulkError { index, source });
                }
            }
        }
        Ok(created)
    }

    /// Applies patches one at a time in input order, failing fast.
    fn bulk_update(&self, updates: &[(ItemId, ItemPatch)]) -> Result<(), BulkError> {
        for (index, (id, patch)) in updates.iter().enumerate() {
            if let Err(source) = self.update_item(*id, patch) {
                error!(
                    "event=bulk_write module=repo status=error op=update index={index} error={source}"
                );
                return Err(BulkError { index, source });
            }
        }
        Ok(())
    }

    /// Deletes items one at a time in input order, failing fast.
    fn bulk_delete(&self, ids: &[ItemId]) -> Result<(), BulkError> {
        for (index, id) in ids.iter().enumerate() {
            if let Err(source) = self.delete_item(*id) {
                error!(
                    "event=bulk_write module=repo status=error op=delete index={index} error={source}"
                );
                return Err(BulkError { index, source });
            }
        }
        Ok(())
    }
}

/// Document payload stored in the `document` column. Identity and
/// timestamps live in row columns, never in the document.
#[derive(Debug, Serialize, Deserialize)]
struct ItemDocument {
    #[serde(default)]
    field_data: BTreeMap<String, FieldValue>,
    #[serde(default)]
    images: Vec<WallItemImage>,
    #[serde(default)]
    primary_image_index: usize,
    #[serde(default)]
    tags: Vec<String>,
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Wraps a migrated connection; rejects unmigrated ones.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_ready(conn, &["walls", "wall_items"])?;
        Ok(Self { conn })
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn create_item(&self, draft: &ItemDraft) -> RepoResult<ItemId> {
        let id = draft.resolved_id();
        let document = serde_json::to_string(&ItemDocument {
            field_data: draft.field_data.clone(),
            images: draft.images.clone(),
            primary_image_index: draft.primary_image_index,
            tags: draft.tags.clone(),
        })?;

        self.conn.execute(
            "INSERT INTO wall_items (uuid, wall_uuid, object_type_uuid, document)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                draft.wall_id.to_string(),
                draft.object_type_id.to_string(),
                document,
            ],
        )?;

        Ok(id)
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<WallItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;

        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_row(row)?));
        }
        Ok(None)
    }

    fn list_items(&self, query: &ItemListQuery) -> RepoResult<Vec<WallItem>> {
        let mut sql = format!("{ITEM_SELECT_SQL} WHERE wall_uuid = ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(query.wall_id.to_string())];

        if let Some(object_type_id) = query.object_type_id {
            sql.push_str(" AND object_type_uuid = ?");
            bind_values.push(Value::Text(object_type_id.to_string()));
        }

        sql.push_str(" ORDER BY created_at DESC, uuid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }

        Ok(items)
    }

    fn update_item(&self, id: ItemId, patch: &ItemPatch) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        let stored: Option<String> = tx
            .query_row(
                "SELECT document FROM wall_items WHERE uuid = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        let mut document: ItemDocument = match stored {
            Some(text) => serde_json::from_str(&text)?,
            None => return Err(RepoError::ItemNotFound(id)),
        };

        for (field_id, value) in &patch.field_data {
            document.field_data.insert(field_id.clone(), value.clone());
        }
        if let Some(images) = &patch.images {
            document.images = images.clone();
        }
        if let Some(primary_image_index) = patch.primary_image_index {
            document.primary_image_index = primary_image_index;
        }
        if let Some(tags) = &patch.tags {
            document.tags = tags.clone();
        }

        // Read-merge-write in one transaction; concurrent patches are
        // last-write-wins at document granularity.
        let changed = tx.execute(
            "UPDATE wall_items
             SET document = ?1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![serde_json::to_string(&document)?, id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::ItemNotFound(id));
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM wall_items WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::ItemNotFound(id));
        }
        Ok(())
    }

    fn count_items(&self, wall_id: WallId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM wall_items WHERE wall_uuid = ?1;",
            [wall_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_items_of_type(
        &self,
        wall_id: WallId,
        object_type_id: ObjectTypeId,
    ) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM wall_items
             WHERE wall_uuid = ?1 AND object_type_uuid = ?2;",
            params![wall_id.to_string(), object_type_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<WallItem> {
    let uuid_text: String = row.get("uuid")?;
    let wall_uuid_text: String = row.get("wall_uuid")?;
    let object_type_text: String = row.get("object_type_uuid")?;
    let document_text: String = row.get("document")?;

    let document: ItemDocument = serde_json::from_str(&document_text)?;

    Ok(WallItem {
        id: parse_row_uuid(&uuid_text, "wall_items.uuid")?,
        wall_id: parse_row_uuid(&wall_uuid_text, "wall_items.wall_uuid")?,
        object_type_id: parse_row_uuid(&object_type_text, "wall_items.object_type_uuid")?,
        field_data: document.field_data,
        images: document.images,
        primary_image_index: document.primary_image_index,
        tags: document.tags,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
