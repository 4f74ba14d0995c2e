use uuid::Uuid;
use wallboard_core::db::open_db_in_memory;
use wallboard_core::repo::item_repo::ItemRepository;
use wallboard_core::repo::wall_repo::WallRepository;
use wallboard_core::{
    display_name, FieldDefinition, FieldType, FieldValue, ItemDraft, MigrationEngine,
    MigrationError, SqliteItemRepository, SqliteWallRepository, Wall,
};

fn legacy_wall() -> Wall {
    let mut wall = Wall::new("Yearbook", "alice");
    wall.fields = vec![
        FieldDefinition::new("name", "Name", FieldType::Text),
        FieldDefinition::new("year", "Year", FieldType::Number),
    ];
    wall
}

#[test]
fn migrate_generates_one_object_type_with_same_field_ids() {
    let conn = open_db_in_memory().unwrap();
    let walls = SqliteWallRepository::try_new(&conn).unwrap();
    let wall = legacy_wall();
    walls.create_wall(&wall).unwrap();

    let engine = MigrationEngine::new(SqliteWallRepository::try_new(&conn).unwrap());
    let migrated = engine.migrate(wall.id).unwrap();

    assert_eq!(migrated.object_types.len(), 1);
    let generated = &migrated.object_types[0];
    assert_eq!(generated.name, "Yearbook");
    assert_eq!(generated.fields, wall.fields);
    // Legacy list is retained for rollback/audit.
    assert_eq!(migrated.fields, wall.fields);

    // The persisted document matches what the engine returned.
    let stored = walls.get_wall(wall.id).unwrap().unwrap();
    assert_eq!(stored, migrated);
}

#[test]
fn migrate_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let walls = SqliteWallRepository::try_new(&conn).unwrap();
    let wall = legacy_wall();
    walls.create_wall(&wall).unwrap();

    let engine = MigrationEngine::new(SqliteWallRepository::try_new(&conn).unwrap());
    let first = engine.migrate(wall.id).unwrap();
    let second = engine.migrate(wall.id).unwrap();

    assert_eq!(first, second);
    assert_eq!(second.object_types.len(), 1);
    assert_eq!(second.fields, wall.fields);
}

#[test]
fn migrate_missing_wall_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let engine = MigrationEngine::new(SqliteWallRepository::try_new(&conn).unwrap());

    let missing = Uuid::new_v4();
    let err = engine.migrate(missing).unwrap_err();
    assert!(matches!(err, MigrationError::WallNotFound(id) if id == missing));
}

#[test]
fn migrate_all_isolates_per_wall_failures() {
    let conn = open_db_in_memory().unwrap();
    let walls = SqliteWallRepository::try_new(&conn).unwrap();
    let wall_a = legacy_wall();
    let wall_b = legacy_wall();
    walls.create_wall(&wall_a).unwrap();
    walls.create_wall(&wall_b).unwrap();
    let missing = Uuid::new_v4();

    let engine = MigrationEngine::new(SqliteWallRepository::try_new(&conn).unwrap());
    let outcomes = engine.migrate_all(&[wall_a.id, missing, wall_b.id]);

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].success);
    assert!(!outcomes[1].success);
    assert!(outcomes[1].error.as_deref().unwrap().contains("not found"));
    // The failing wall did not block the one after it.
    assert!(outcomes[2].success);
    assert!(walls.get_wall(wall_b.id).unwrap().unwrap().is_migrated());
}

#[test]
fn existing_item_stays_valid_and_displayable_after_migration() {
    let conn = open_db_in_memory().unwrap();
    let walls = SqliteWallRepository::try_new(&conn).unwrap();
    let wall = legacy_wall();
    walls.create_wall(&wall).unwrap();

    // Item written before migration, keyed by the legacy field ids.
    let items = SqliteItemRepository::try_new(&conn).unwrap();
    let pre_migration_type = Uuid::new_v4();
    let draft = ItemDraft::new(wall.id, pre_migration_type)
        .with_value("name", FieldValue::Text("Jo".to_string()))
        .with_value("year", FieldValue::Number(1990.0));
    let item_id = items.create_item(&draft).unwrap();

    let engine = MigrationEngine::new(SqliteWallRepository::try_new(&conn).unwrap());
    let migrated = engine.migrate(wall.id).unwrap();

    let item = items.get_item(item_id).unwrap().unwrap();
    assert_eq!(
        item.field_data.get("name"),
        Some(&FieldValue::Text("Jo".to_string()))
    );

    // No primary display field on the generated type: the fallback scan
    // over same-id fields resolves the label.
    let generated = &migrated.object_types[0];
    assert_eq!(display_name(generated, &item), "Jo");
}
