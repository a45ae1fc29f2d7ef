use diary_core::db::open_db_in_memory;
use diary_core::store::snapshot::SnapshotError;
use diary_core::{
    load_snapshot, save_snapshot, DateKey, Post, PostRepository, PostStore, SqlitePostRepository,
};

#[test]
fn snapshot_file_survives_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diary_posts_default.json");

    let mut store = PostStore::new();
    let mut post = Post::new("1700000000000", "first #day");
    post.author = Some("admin@example.com".to_string());
    post.likes = 2;
    store.insert(DateKey::parse("2024-02-10").unwrap(), post);

    save_snapshot(&path, &store).unwrap();
    assert_eq!(load_snapshot(&path).unwrap(), store);
}

#[test]
fn missing_snapshot_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_snapshot(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, SnapshotError::Io(_)));
}

#[test]
fn snapshot_with_repeated_id_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dupes.json");
    std::fs::write(
        &path,
        r#"{"2024-01-01": [{"id": "1", "content": "a"}, {"id": "1", "content": "b"}]}"#,
    )
    .unwrap();

    let err = load_snapshot(&path).unwrap_err();
    assert!(matches!(err, SnapshotError::DuplicatePost { ref post_id, .. } if post_id == "1"));
}

#[test]
fn snapshot_can_seed_sqlite_store() {
    let json = r#"{
        "2024-02-10": [{"id": "1", "content": "one"}, {"id": "2", "content": "two"}],
        "2024-02-11": [{"id": "1", "content": "next day"}]
    }"#;
    let store = diary_core::store_from_json(json).unwrap();

    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqlitePostRepository::try_new(&mut conn).unwrap();
    assert_eq!(repo.import_store(&store).unwrap(), 3);
    assert_eq!(repo.load_store().unwrap(), store);
}
