//! Core domain logic for the wallboard content system.
//! This crate is the single source of truth for schema/data invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::field::{
    FieldDefinition, FieldType, FieldValue, FieldViolation, FileConfig, ItemId, MultiselectConfig,
    ObjectTypeId, RelationshipConfig, ValidationRule, ValidationRules,
};
pub use model::item::{ItemDraft, ItemPatch, WallItem, WallItemImage};
pub use model::object_type::{DisplaySettings, ObjectType, ObjectTypeError};
pub use model::wall::{Permissions, Wall, WallId, WallRole};
pub use repo::item_repo::{BulkError, ItemListQuery, ItemRepository, SqliteItemRepository};
pub use repo::wall_repo::{SqliteWallRepository, WallRepository};
pub use repo::{RepoError, RepoResult};
pub use service::display::{display_name, display_subtitle, UNTITLED_LABEL};
pub use service::export::{export_items, ExportError, ExportFormat};
pub use service::item_service::{ItemService, ItemServiceError};
pub use service::migration::{MigrationEngine, MigrationError, MigrationOutcome};
pub use service::relationship::{ItemRef, RelatedGroup, RelationshipError, RelationshipResolver};
pub use service::schema_service::{SchemaService, SchemaServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
