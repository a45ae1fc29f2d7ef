//! JSON snapshot format for local-only (demo) mode.
//!
//! # Responsibility
//! - Encode/decode the whole store as `{ "YYYY-MM-DD": [post, ...] }`.
//! - Load and save snapshot files.
//!
//! # Invariants
//! - Keys that are not valid date keys reject the whole snapshot.
//! - A post id repeated within one day rejects the whole snapshot.
//! - Missing `content`, `images`, `likes` decode as empty values.

use crate::model::date_key::DateKey;
use crate::store::PostStore;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Snapshot encode/decode or file I/O failure.
#[derive(Debug)]
pub enum SnapshotError {
    Json(serde_json::Error),
    Io(std::io::Error),
    /// Two posts of one day share an id.
    DuplicatePost { date: DateKey, post_id: String },
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid snapshot json: {err}"),
            Self::Io(err) => write!(f, "snapshot file error: {err}"),
            Self::DuplicatePost { date, post_id } => {
                write!(f, "snapshot repeats post {date}/{post_id}")
            }
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::DuplicatePost { .. } => None,
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<std::io::Error> for SnapshotError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Serializes the store to pretty JSON.
pub fn store_to_json(store: &PostStore) -> SnapshotResult<String> {
    Ok(serde_json::to_string_pretty(store)?)
}

/// Parses a store from snapshot JSON.
pub fn store_from_json(json: &str) -> SnapshotResult<PostStore> {
    let store: PostStore = serde_json::from_str(json)?;
    if let Some((date, post_id)) = store.first_duplicate() {
        return Err(SnapshotError::DuplicatePost {
            date: date.clone(),
            post_id: post_id.to_string(),
        });
    }
    Ok(store)
}

/// Reads a snapshot file.
///
/// # Side effects
/// - Emits `snapshot_import` logging events.
pub fn load_snapshot(path: impl AsRef<Path>) -> SnapshotResult<PostStore> {
    let path = path.as_ref();
    let result = std::fs::read_to_string(path)
        .map_err(SnapshotError::from)
        .and_then(|json| store_from_json(&json));
    match &result {
        Ok(store) => info!(
            "event=snapshot_import module=store status=ok posts={} path={}",
            store.len(),
            path.display()
        ),
        Err(err) => error!(
            "event=snapshot_import module=store status=error path={} error={}",
            path.display(),
            err
        ),
    }
    result
}

/// Writes a snapshot file, replacing any previous content.
///
/// # Side effects
/// - Emits `snapshot_export` logging events.
pub fn save_snapshot(path: impl AsRef<Path>, store: &PostStore) -> SnapshotResult<()> {
    let path = path.as_ref();
    let json = store_to_json(store)?;
    std::fs::write(path, json).inspect_err(|err| {
        error!(
            "event=snapshot_export module=store status=error path={} error={}",
            path.display(),
            err
        );
    })?;
    info!(
        "event=snapshot_export module=store status=ok posts={} path={}",
        store.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{store_from_json, store_to_json, SnapshotError};
    use crate::model::date_key::DateKey;

    #[test]
    fn decodes_loose_records() {
        let json = r##"{
            "2024-01-01": [
                {"id": "1", "content": "no tags", "createdAt": "09:00:00"},
                {"id": "2", "content": "#x #y", "images": [
                    {"id": "img_1", "name": "a.png", "data": "data:image/png;base64,AAAA"}
                ], "author": "admin@example.com", "likes": 3}
            ]
        }"##;
        let store = store_from_json(json).unwrap();
        let day = DateKey::parse("2024-01-01").unwrap();
        let posts = store.bucket(&day);
        assert_eq!(posts.len(), 2);
        assert!(posts[0].images.is_empty());
        assert_eq!(posts[1].likes, 3);
        assert_eq!(posts[1].images[0].payload.mime_type(), Some("image/png"));
    }

    #[test]
    fn rejects_invalid_date_keys() {
        let err = store_from_json(r#"{"someday": []}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::Json(_)));
    }

    #[test]
    fn rejects_repeated_post_id_within_a_day() {
        let json = r#"{
            "2024-01-01": [{"id": "1", "content": "a"}],
            "2024-01-02": [{"id": "1", "content": "b"}, {"id": "1", "content": "c"}]
        }"#;
        match store_from_json(json).unwrap_err() {
            SnapshotError::DuplicatePost { date, post_id } => {
                assert_eq!(date.as_str(), "2024-01-02");
                assert_eq!(post_id, "1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn encode_then_decode_keeps_store() {
        let store = store_from_json(r#"{"2024-01-02":[{"id":"a","content":"hi"}]}"#).unwrap();
        let json = store_to_json(&store).unwrap();
        assert!(json.contains("\"createdAt\""));
        assert_eq!(store_from_json(&json).unwrap(), store);
    }
}
