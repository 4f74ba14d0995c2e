//! Legacy-to-schema wall migration engine.
//!
//! # Responsibility
//! - Convert a wall's legacy flat field list into one generated object type.
//! - Run batch migrations with per-wall failure isolation.
//!
//! # Invariants
//! - Migration is idempotent: non-legacy walls pass through unchanged.
//! - Generated object type fields are copied verbatim, same ids, so stored
//!   item field data stays valid without rewriting any item.
//! - `wall.fields` is retained after migration for rollback and audit.
//! - State transition is one single-row document write; a failed write
//!   leaves the wall fully legacy.

use crate::model::object_type::ObjectType;
use crate::model::wall::{Wall, WallId};
use crate::repo::wall_repo::WallRepository;
use crate::repo::RepoError;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from single-wall migration.
#[derive(Debug)]
pub enum MigrationError {
    WallNotFound(WallId),
    Repo(RepoError),
}

impl Display for MigrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WallNotFound(id) => write!(f, "wall not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MigrationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::WallNotFound(_) => None,
        }
    }
}

impl From<RepoError> for MigrationError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::WallNotFound(id) => Self::WallNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Per-wall result row of a batch migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub wall_id: WallId,
    pub success: bool,
    /// Rendered error when `success` is false.
    pub error: Option<String>,
}

/// Migration engine over a wall repository.
pub struct MigrationEngine<W: WallRepository> {
    repo: W,
}

impl<W: WallRepository> MigrationEngine<W> {
    pub fn new(repo: W) -> Self {
        Self { repo }
    }

    /// Migrates one wall from legacy fields to a generated object type.
    ///
    /// Non-legacy walls (already migrated, or nothing to migrate) are a
    /// no-op returning the stored wall unchanged. The legacy field list is
    /// kept on the wall after migration.
    pub fn migrate(&self, wall_id: WallId) -> Result<Wall, MigrationError> {
        let mut wall = self
            .repo
            .get_wall(wall_id)?
            .ok_or(MigrationError::WallNotFound(wall_id))?;

        if !wall.is_legacy() {
            info!("event=wall_migrate module=migration status=noop wall={wall_id}");
            return Ok(wall);
        }

        // Same field ids as the legacy list: stored item field_data keys
        // must remain valid without touching a single item document.
        let generated = ObjectType::new(wall.name.clone(), wall.fields.clone());
        let object_type_id = generated.id;
        wall.object_types.push(generated);

        // One document write: the wall is observably legacy or migrated,
        // never in between.
        match self.repo.update_wall(&wall) {
            Ok(()) => {
                info!(
                    "event=wall_migrate module=migration status=ok wall={wall_id} object_type={object_type_id} field_count={}",
                    wall.fields.len()
                );
                Ok(wall)
            }
            Err(err) => {
                error!(
                    "event=wall_migrate module=migration status=error wall={wall_id} error={err}"
                );
                Err(err.into())
            }
        }
    }

    /// Migrates every listed wall, isolating failures per wall.
    ///
    /// One wall's failure is recorded in its outcome row and never aborts
    /// the remaining migrations.
    pub fn migrate_all(&self, wall_ids: &[WallId]) -> Vec<MigrationOutcome> {
        wall_ids
            .iter()
            .map(|&wall_id| match self.migrate(wall_id) {
                Ok(_) => MigrationOutcome {
                    wall_id,
                    success: true,
                    error: None,
                },
                Err(err) => MigrationOutcome {
                    wall_id,
                    success: false,
                    error: Some(err.to_string()),
                },
            })
            .collect()
    }
}
