mod helpers;

use rusqlite::Connection;

fn object_names(conn: &Connection, kind: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = ?1 AND name NOT LIKE 'sqlite_%' ORDER BY name")
        .unwrap();
    stmt.query_map([kind], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn full_schema_creates_all_tables_and_indexes() {
    let conn = helpers::test_db();

    assert_eq!(
        object_names(&conn, "table"),
        vec!["faq_dynamic", "faq_static", "projection_log", "schema_meta"]
    );
    let indexes = object_names(&conn, "index");
    assert!(indexes.contains(&"idx_faq_dynamic_approved".to_string()));
    assert!(indexes.contains(&"idx_faq_dynamic_key".to_string()));
}

#[test]
fn static_questions_are_unique() {
    let conn = helpers::test_db();
    let insert = "INSERT INTO faq_static (question, answer, embedding, created_at, updated_at) \
                  VALUES ('q', 'a', x'00', 'now', 'now')";
    conn.execute(insert, []).unwrap();
    assert!(conn.execute(insert, []).is_err());
}

#[test]
fn approved_flag_is_boolean() {
    let conn = helpers::test_db();
    let result = conn.execute(
        "INSERT INTO faq_dynamic (id, question, answer, approved, created_at) \
         VALUES ('x', 'q', 'a', 2, 'now')",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn dynamic_columns_include_migrated_fields() {
    let conn = helpers::test_db();
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('faq_dynamic')").unwrap();
    let columns: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    for expected in [
        "id", "question", "answer", "approved", "asked_by", "created_at", "question_key", "approved_at",
        "revoked_at",
    ] {
        assert!(columns.iter().any(|c| c == expected), "missing column {expected}");
    }
}
