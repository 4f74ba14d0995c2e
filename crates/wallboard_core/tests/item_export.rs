use wallboard_core::db::open_db_in_memory;
use wallboard_core::repo::item_repo::ItemRepository;
use wallboard_core::repo::wall_repo::WallRepository;
use wallboard_core::{
    export_items, ExportFormat, FieldDefinition, FieldType, FieldValue, ItemDraft, ItemListQuery,
    ObjectType, SqliteItemRepository, SqliteWallRepository, Wall, WallItem,
};

fn quote_wall(conn: &rusqlite::Connection) -> (Wall, ObjectType) {
    let object_type = ObjectType::new(
        "Quote",
        vec![
            FieldDefinition::new("text", "Text", FieldType::Text),
            FieldDefinition::new("rating", "Rating", FieldType::Number),
        ],
    );
    let mut wall = Wall::new("Quotes", "alice");
    wall.object_types.push(object_type.clone());
    SqliteWallRepository::try_new(conn)
        .unwrap()
        .create_wall(&wall)
        .unwrap();
    (wall, object_type)
}

#[test]
fn csv_header_uses_schema_field_order() {
    let conn = open_db_in_memory().unwrap();
    let (wall, _) = quote_wall(&conn);

    let payload = export_items(&wall, &[], ExportFormat::Csv).unwrap();
    let csv = String::from_utf8(payload).unwrap();
    assert_eq!(
        csv.lines().next().unwrap(),
        "id,object_type,created_at,updated_at,tags,text,rating"
    );
}

#[test]
fn csv_escapes_commas_and_doubles_quotes() {
    let conn = open_db_in_memory().unwrap();
    let (wall, object_type) = quote_wall(&conn);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    repo.create_item(
        &ItemDraft::new(wall.id, object_type.id)
            .with_value(
                "text",
                FieldValue::Text("So it goes, \"again\"".to_string()),
            )
            .with_value("rating", FieldValue::Number(5.0)),
    )
    .unwrap();

    let items = repo.list_items(&ItemListQuery::for_wall(wall.id)).unwrap();
    let payload = export_items(&wall, &items, ExportFormat::Csv).unwrap();
    let csv = String::from_utf8(payload).unwrap();

    let row = csv.lines().nth(1).unwrap();
    assert!(row.contains("\"So it goes, \"\"again\"\"\""));
    assert!(row.ends_with(",5"));
}

#[test]
fn csv_appends_off_schema_keys_sorted() {
    let conn = open_db_in_memory().unwrap();
    let (wall, object_type) = quote_wall(&conn);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    repo.create_item(
        &ItemDraft::new(wall.id, object_type.id)
            .with_value("zz_extra", FieldValue::Text("stray".to_string()))
            .with_value("aa_extra", FieldValue::Text("stray too".to_string())),
    )
    .unwrap();

    let items = repo.list_items(&ItemListQuery::for_wall(wall.id)).unwrap();
    let payload = export_items(&wall, &items, ExportFormat::Csv).unwrap();
    let csv = String::from_utf8(payload).unwrap();

    assert_eq!(
        csv.lines().next().unwrap(),
        "id,object_type,created_at,updated_at,tags,text,rating,aa_extra,zz_extra"
    );
}

#[test]
fn json_export_round_trips_items() {
    let conn = open_db_in_memory().unwrap();
    let (wall, object_type) = quote_wall(&conn);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    repo.create_item(
        &ItemDraft::new(wall.id, object_type.id)
            .with_value("text", FieldValue::Text("Hello".to_string())),
    )
    .unwrap();

    let items = repo.list_items(&ItemListQuery::for_wall(wall.id)).unwrap();
    let payload = export_items(&wall, &items, ExportFormat::Json).unwrap();
    let parsed: Vec<WallItem> = serde_json::from_slice(&payload).unwrap();

    assert_eq!(parsed, items);
}
