mod helpers;

use finsage::db;
use finsage::db::migrations::{
    get_embedding_model, get_schema_version, run_migrations, CURRENT_SCHEMA_VERSION,
};
use finsage::knowledge::dynamic_store::{find_pending_by_key, question_key};

#[test]
fn fresh_db_migrates_to_current_version() {
    let conn = helpers::test_db();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn migration_adds_embedding_model_key() {
    let conn = helpers::test_db();
    let model = get_embedding_model(&conn).unwrap();
    assert_eq!(model, Some("all-MiniLM-L6-v2".to_string()));
}

#[test]
fn migrations_are_idempotent() {
    let mut conn = helpers::test_db();
    run_migrations(&mut conn).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn v1_rows_get_question_keys() {
    let mut conn = rusqlite::Connection::open_in_memory().unwrap();
    db::schema::init_schema(&conn).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), 1);
    assert!(get_embedding_model(&conn).unwrap().is_none());

    // a pending answer written before keys existed
    conn.execute(
        "INSERT INTO faq_dynamic (id, question, answer, approved, created_at) \
         VALUES ('legacy-1', 'Should I  buy Gold?', 'Maybe.', 0, '2024-01-01T00:00:00Z')",
        [],
    )
    .unwrap();

    run_migrations(&mut conn).unwrap();

    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    let found = find_pending_by_key(&conn, &question_key("should i buy gold?"))
        .unwrap()
        .unwrap();
    assert_eq!(found.id, "legacy-1");
    assert!(found.approved_at.is_none());
}
