use pinboard_core::db::open_db_in_memory;
use pinboard_core::{
    PinService, PinValidationError, ServiceError, SortOrder, SqlitePinRepository,
};
use rusqlite::{params, Connection};
use std::collections::HashSet;

fn service(conn: &mut Connection) -> PinService<SqlitePinRepository<'_>> {
    PinService::new(SqlitePinRepository::new(conn))
}

fn set_created_at(conn: &Connection, id: i64, created_at: &str) {
    conn.execute(
        "UPDATE pins SET created_at = ?2 WHERE id = ?1;",
        params![id, created_at],
    )
    .unwrap();
}

#[test]
fn create_returns_store_assigned_fields() {
    let mut conn = open_db_in_memory().unwrap();

    let pin = service(&mut conn)
        .create_pin(Some("  Greeting "), Some(""), Some("hello"))
        .unwrap();

    assert_eq!(pin.id, 1);
    assert_eq!(pin.title.as_deref(), Some("Greeting"));
    assert_eq!(pin.description, None);
    assert_eq!(pin.content, "hello");
    assert_eq!(pin.likes_count, 0);
    assert!(pin.created_at.ends_with('Z'), "{}", pin.created_at);
}

#[test]
fn create_assigns_fresh_identifiers() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let ids: HashSet<i64> = (0..5)
        .map(|idx| {
            let content = format!("pin {idx}");
            service
                .create_pin(None, None, Some(content.as_str()))
                .unwrap()
                .id
        })
        .collect();
    assert_eq!(ids.len(), 5);
}

#[test]
fn create_rejects_blank_content_without_writing() {
    let mut conn = open_db_in_memory().unwrap();

    for content in [None, Some(""), Some("   "), Some("\n\t")] {
        let err = service(&mut conn)
            .create_pin(Some("title"), None, content)
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(PinValidationError::MissingContent)
        ));
    }

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM pins;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn get_missing_pin_is_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let err = service(&mut conn).get_pin(999_999).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(999_999)));
}

#[test]
fn get_embeds_comments_oldest_first() {
    let mut conn = open_db_in_memory().unwrap();
    let pin = service(&mut conn).create_pin(None, None, Some("thread")).unwrap();
    let late = service(&mut conn)
        .add_comment(Some(pin.id), Some("bo"), Some("second"))
        .unwrap();
    let early = service(&mut conn)
        .add_comment(Some(pin.id), None, Some("first"))
        .unwrap();
    conn.execute(
        "UPDATE comments SET created_at = '2024-01-01T00:00:00.000Z' WHERE id = ?1;",
        [early.id],
    )
    .unwrap();
    conn.execute(
        "UPDATE comments SET created_at = '2024-01-02T00:00:00.000Z' WHERE id = ?1;",
        [late.id],
    )
    .unwrap();

    let detail = service(&mut conn).get_pin(pin.id).unwrap();
    assert_eq!(detail.pin.id, pin.id);
    let contents: Vec<&str> = detail
        .comments
        .iter()
        .map(|comment| comment.content.as_str())
        .collect();
    assert_eq!(contents, vec!["first", "second"]);
}

#[test]
fn list_orders_by_creation_time() {
    let mut conn = open_db_in_memory().unwrap();
    let a = service(&mut conn).create_pin(None, None, Some("a")).unwrap();
    let b = service(&mut conn).create_pin(None, None, Some("b")).unwrap();
    let c = service(&mut conn).create_pin(None, None, Some("c")).unwrap();
    set_created_at(&conn, a.id, "2024-03-01T00:00:00.000Z");
    set_created_at(&conn, b.id, "2024-01-01T00:00:00.000Z");
    set_created_at(&conn, c.id, "2024-02-01T00:00:00.000Z");

    let newest: Vec<i64> = service(&mut conn)
        .list_pins(None, SortOrder::Newest)
        .unwrap()
        .iter()
        .map(|pin| pin.id)
        .collect();
    assert_eq!(newest, vec![a.id, c.id, b.id]);

    let oldest: Vec<i64> = service(&mut conn)
        .list_pins(None, SortOrder::Oldest)
        .unwrap()
        .iter()
        .map(|pin| pin.id)
        .collect();
    assert_eq!(oldest, vec![b.id, c.id, a.id]);
}

#[test]
fn list_breaks_timestamp_ties_by_id() {
    let mut conn = open_db_in_memory().unwrap();
    let first = service(&mut conn).create_pin(None, None, Some("x")).unwrap();
    let second = service(&mut conn).create_pin(None, None, Some("y")).unwrap();
    set_created_at(&conn, first.id, "2024-01-01T00:00:00.000Z");
    set_created_at(&conn, second.id, "2024-01-01T00:00:00.000Z");

    let newest = service(&mut conn).list_pins(None, SortOrder::Newest).unwrap();
    assert_eq!(newest[0].id, second.id);
    let oldest = service(&mut conn).list_pins(None, SortOrder::Oldest).unwrap();
    assert_eq!(oldest[0].id, first.id);
}

#[test]
fn list_search_matches_any_text_field_case_insensitively() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let by_title = service.create_pin(Some("FOOd log"), None, Some("x")).unwrap();
    let by_description = service
        .create_pin(None, Some("all about Foo"), Some("y"))
        .unwrap();
    let by_content = service.create_pin(None, None, Some("snafoo")).unwrap();
    service.create_pin(Some("bar"), Some("baz"), Some("qux")).unwrap();

    let hits: HashSet<i64> = service
        .list_pins(Some("foo".to_string()), SortOrder::Newest)
        .unwrap()
        .iter()
        .map(|pin| pin.id)
        .collect();
    assert_eq!(
        hits,
        HashSet::from([by_title.id, by_description.id, by_content.id])
    );
}

#[test]
fn list_search_folds_non_ascii_and_matches_literally() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let cyrillic = service.create_pin(Some("Привет"), None, Some("x")).unwrap();
    let percent = service.create_pin(None, None, Some("100% done")).unwrap();
    service.create_pin(None, None, Some("100 items")).unwrap();

    let hits = service
        .list_pins(Some("привет".to_string()), SortOrder::Newest)
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, cyrillic.id);

    let hits = service
        .list_pins(Some("0%".to_string()), SortOrder::Newest)
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, percent.id);
}

#[test]
fn list_with_blank_search_returns_everything() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    service.create_pin(None, None, Some("one")).unwrap();
    service.create_pin(None, None, Some("two")).unwrap();

    let all = service
        .list_pins(Some("   ".to_string()), SortOrder::Newest)
        .unwrap();
    assert_eq!(all.len(), 2);
}
