use uuid::Uuid;
use wallboard_core::db::open_db_in_memory;
use wallboard_core::model::field::RelationshipConfig;
use wallboard_core::repo::item_repo::ItemRepository;
use wallboard_core::{
    FieldDefinition, FieldType, ObjectType, SchemaService, SchemaServiceError,
    SqliteItemRepository, SqliteWallRepository, WallRole,
};

fn service(
    conn: &rusqlite::Connection,
) -> SchemaService<SqliteWallRepository<'_>, SqliteItemRepository<'_>> {
    SchemaService::new(
        SqliteWallRepository::try_new(conn).unwrap(),
        SqliteItemRepository::try_new(conn).unwrap(),
    )
}

#[test]
fn create_wall_persists_owner_permissions() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let wall = service.create_wall("Library", "alice").unwrap();
    assert_eq!(wall.permissions.role_of("alice"), Some(WallRole::Owner));
    assert!(wall.object_types.is_empty());
}

#[test]
fn add_object_type_validates_schema_consistency() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let wall = service.create_wall("Library", "alice").unwrap();

    let mut broken = ObjectType::new(
        "Book",
        vec![FieldDefinition::new("title", "Title", FieldType::Text)],
    );
    broken.display_settings.primary_field = Some("missing".to_string());

    let err = service.add_object_type(wall.id, broken).unwrap_err();
    assert!(matches!(err, SchemaServiceError::InvalidObjectType(_)));
}

#[test]
fn add_object_type_accepts_self_referencing_relationships() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let wall = service.create_wall("People", "alice").unwrap();

    let mut person = ObjectType::new(
        "Person",
        vec![FieldDefinition::new("name", "Name", FieldType::Text)],
    );
    let mut mentor = FieldDefinition::new("mentor", "Mentor", FieldType::Relationship);
    mentor.relationship_config = Some(RelationshipConfig {
        target_object_type_id: person.id,
        allow_multiple: false,
    });
    person.fields.push(mentor);

    let updated = service.add_object_type(wall.id, person).unwrap();
    assert_eq!(updated.object_types.len(), 1);
}

#[test]
fn add_object_type_rejects_unknown_relationship_target() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let wall = service.create_wall("Library", "alice").unwrap();

    let mut book = ObjectType::new("Book", Vec::new());
    let mut author = FieldDefinition::new("author", "Author", FieldType::Relationship);
    author.relationship_config = Some(RelationshipConfig {
        target_object_type_id: Uuid::new_v4(),
        allow_multiple: false,
    });
    book.fields.push(author);

    let err = service.add_object_type(wall.id, book).unwrap_err();
    assert!(matches!(
        err,
        SchemaServiceError::UnknownRelationshipTarget { .. }
    ));
}

#[test]
fn remove_object_type_refuses_while_items_exist() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let wall = service.create_wall("Library", "alice").unwrap();
    let book = ObjectType::new(
        "Book",
        vec![FieldDefinition::new("title", "Title", FieldType::Text)],
    );
    let book_id = book.id;
    service.add_object_type(wall.id, book).unwrap();

    let items = SqliteItemRepository::try_new(&conn).unwrap();
    items
        .create_item(&wallboard_core::ItemDraft::new(wall.id, book_id))
        .unwrap();

    let err = service.remove_object_type(wall.id, book_id).unwrap_err();
    match err {
        SchemaServiceError::ObjectTypeInUse {
            object_type_id,
            item_count,
        } => {
            assert_eq!(object_type_id, book_id);
            assert_eq!(item_count, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn delete_wall_refuses_while_items_exist() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let wall = service.create_wall("Library", "alice").unwrap();
    let book = ObjectType::new(
        "Book",
        vec![FieldDefinition::new("title", "Title", FieldType::Text)],
    );
    let book_id = book.id;
    service.add_object_type(wall.id, book).unwrap();

    let items = SqliteItemRepository::try_new(&conn).unwrap();
    let item_id = items
        .create_item(&wallboard_core::ItemDraft::new(wall.id, book_id))
        .unwrap();

    let err = service.delete_wall(wall.id).unwrap_err();
    match err {
        SchemaServiceError::WallInUse {
            wall_id,
            item_count,
        } => {
            assert_eq!(wall_id, wall.id);
            assert_eq!(item_count, 1);
        }
        other => panic!("unexpected error: {other}"),
    }

    items.delete_item(item_id).unwrap();
    service.delete_wall(wall.id).unwrap();

    let err = service.delete_wall(wall.id).unwrap_err();
    assert!(matches!(err, SchemaServiceError::WallNotFound(id) if id == wall.id));
}

#[test]
fn remove_object_type_succeeds_once_items_are_gone() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let wall = service.create_wall("Library", "alice").unwrap();
    let book = ObjectType::new("Book", Vec::new());
    let book_id = book.id;
    service.add_object_type(wall.id, book).unwrap();

    let items = SqliteItemRepository::try_new(&conn).unwrap();
    let item_id = items
        .create_item(&wallboard_core::ItemDraft::new(wall.id, book_id))
        .unwrap();
    items.delete_item(item_id).unwrap();

    let updated = service.remove_object_type(wall.id, book_id).unwrap();
    assert!(updated.object_types.is_empty());
}
