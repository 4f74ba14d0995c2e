//! Wall repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist wall documents (schemas, legacy fields, permissions).
//! - Keep wall writes single-row so schema mutations stay atomic.
//!
//! # Invariants
//! - `update` replaces the whole document in one statement; callers see
//!   either the previous or the new schema, never a partial mix.
//! - Row timestamps are store-assigned; the document carries none.

use crate::model::wall::{Wall, WallId};
use crate::repo::{ensure_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

/// Repository interface for wall documents.
pub trait WallRepository {
    /// Persists a new wall and returns its stable id.
    fn create_wall(&self, wall: &Wall) -> RepoResult<WallId>;
    /// Gets one wall by id.
    fn get_wall(&self, id: WallId) -> RepoResult<Option<Wall>>;
    /// Lists all walls, newest first.
    fn list_walls(&self) -> RepoResult<Vec<Wall>>;
    /// Replaces the stored document for `wall.id`.
    fn update_wall(&self, wall: &Wall) -> RepoResult<()>;
    /// Hard-deletes one wall document.
    fn delete_wall(&self, id: WallId) -> RepoResult<()>;
}

/// SQLite-backed wall repository.
pub struct SqliteWallRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWallRepository<'conn> {
    /// Wraps a migrated connection; rejects unmigrated ones.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_ready(conn, &["walls"])?;
        Ok(Self { conn })
    }
}

impl WallRepository for SqliteWallRepository<'_> {
    fn create_wall(&self, wall: &Wall) -> RepoResult<WallId> {
        let document = serde_json::to_string(wall)?;
        self.conn.execute(
            "INSERT INTO walls (uuid, document) VALUES (?1, ?2);",
            params![wall.id.to_string(), document],
        )?;
        Ok(wall.id)
    }

    fn get_wall(&self, id: WallId) -> RepoResult<Option<Wall>> {
        let document: Option<String> = self
            .conn
            .query_row(
                "SELECT document FROM walls WHERE uuid = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        document.map(|text| parse_wall_document(id, &text)).transpose()
    }

    fn list_walls(&self) -> RepoResult<Vec<Wall>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, document FROM walls ORDER BY created_at DESC, uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut walls = Vec::new();

        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get(0)?;
            let id = parse_row_uuid(&uuid_text, "walls.uuid")?;
            let document: String = row.get(1)?;
            walls.push(parse_wall_document(id, &document)?);
        }

        Ok(walls)
    }

    fn update_wall(&self, wall: &Wall) -> RepoResult<()> {
        let document = serde_json::to_string(wall)?;
        let changed = self.conn.execute(
            "UPDATE walls
             SET document = ?1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![document, wall.id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::WallNotFound(wall.id));
        }
        Ok(())
    }

    fn delete_wall(&self, id: WallId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM walls WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::WallNotFound(id));
        }
        Ok(())
    }
}

fn parse_wall_document(id: WallId, document: &str) -> RepoResult<Wall> {
    let wall: Wall = serde_json::from_str(document)?;
    if wall.id != id {
        return Err(RepoError::InvalidData(format!(
            "wall document id {} does not match row key {id}",
            wall.id
        )));
    }
    Ok(wall)
}

pub(crate) fn parse_row_uuid(text: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{text}` in {column}")))
}
