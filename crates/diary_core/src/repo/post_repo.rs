//! Post repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist date-keyed posts and their ordered images.
//! - Rebuild the in-memory `PostStore` read model from storage.
//!
//! # Invariants
//! - Bucket order is insertion order (`posts.seq`).
//! - Image order is attachment order (`post_images.position`).
//! - An image id belongs to at most one post; re-attaching it elsewhere fails.
//! - Multi-row writes run inside one immediate transaction.

use crate::db::DbError;
use crate::model::date_key::DateKey;
use crate::model::post::{Image, ImagePayload, Post};
use crate::store::PostStore;
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const POST_SELECT_SQL: &str = "SELECT
    seq,
    date_key,
    id,
    content,
    created_at,
    author,
    likes
FROM posts";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for post persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound { date: DateKey, post_id: String },
    DuplicatePost { date: DateKey, post_id: String },
    /// Image id is already attached to another post.
    ImageAlreadyAttached(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { date, post_id } => write!(f, "post not found: {date}/{post_id}"),
            Self::DuplicatePost { date, post_id } => {
                write!(f, "post already exists: {date}/{post_id}")
            }
            Self::ImageAlreadyAttached(image_id) => {
                write!(f, "image `{image_id}` already belongs to another post")
            }
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted post data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for date-keyed posts.
pub trait PostRepository {
    /// Appends a post to the end of its date bucket.
    fn insert_post(&mut self, date: &DateKey, post: &Post) -> RepoResult<()>;
    /// Replaces content, images, author and likes of an existing post.
    fn update_post(&mut self, date: &DateKey, post: &Post) -> RepoResult<()>;
    /// Deletes a post and its images.
    fn delete_post(&mut self, date: &DateKey, post_id: &str) -> RepoResult<()>;
    fn get_post(&self, date: &DateKey, post_id: &str) -> RepoResult<Option<Post>>;
    /// Lists one bucket in insertion order.
    fn list_posts_for_date(&self, date: &DateKey) -> RepoResult<Vec<Post>>;
    /// Loads every bucket into an in-memory store.
    fn load_store(&self) -> RepoResult<PostStore>;
    /// Appends every post of `store` in one transaction; nothing is written
    /// when any post is rejected. Returns the number of posts written.
    fn import_store(&mut self, store: &PostStore) -> RepoResult<usize>;
}

/// SQLite-backed post repository.
pub struct SqlitePostRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema is
    ///   not the one this crate migrates to.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_post_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn insert_post(&mut self, date: &DateKey, post: &Post) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        insert_post_in_tx(&tx, date, post)?;
        tx.commit()?;
        Ok(())
    }

    fn import_store(&mut self, store: &PostStore) -> RepoResult<usize> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let result = store
            .iter()
            .try_for_each(|(date, post)| insert_post_in_tx(&tx, date, post));
        match result {
            Ok(()) => {
                tx.commit()?;
                info!(
                    "event=snapshot_import module=repo status=ok posts={}",
                    store.len()
                );
                Ok(store.len())
            }
            Err(err) => {
                error!(
                    "event=snapshot_import module=repo status=error posts={} error={}",
                    store.len(),
                    err
                );
                Err(err)
            }
        }
    }

    fn update_post(&mut self, date: &DateKey, post: &Post) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let Some(seq) = post_seq_in_tx(&tx, date, &post.id)? else {
            return Err(RepoError::NotFound {
                date: date.clone(),
                post_id: post.id.clone(),
            });
        };

        tx.execute(
            "UPDATE posts
             SET
                content = ?2,
                author = ?3,
                likes = ?4
             WHERE seq = ?1;",
            params![
                seq,
                post.content.as_str(),
                post.author.as_deref(),
                i64::from(post.likes),
            ],
        )?;
        tx.execute("DELETE FROM post_images WHERE post_seq = ?1;", [seq])?;
        write_images(&tx, seq, &post.images)?;

        tx.commit()?;
        Ok(())
    }

    fn delete_post(&mut self, date: &DateKey, post_id: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM posts WHERE date_key = ?1 AND id = ?2;",
            params![date.as_str(), post_id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                date: date.clone(),
                post_id: post_id.to_string(),
            });
        }

        Ok(())
    }

    fn get_post(&self, date: &DateKey, post_id: &str) -> RepoResult<Option<Post>> {
        let mut stmt = self.conn.prepare(&format!(
            "{POST_SELECT_SQL}
             WHERE date_key = ?1 AND id = ?2;"
        ))?;
        let mut rows = stmt.query(params![date.as_str(), post_id])?;
        if let Some(row) = rows.next()? {
            let (_, post) = parse_post_row(self.conn, row)?;
            return Ok(Some(post));
        }
        Ok(None)
    }

    fn list_posts_for_date(&self, date: &DateKey) -> RepoResult<Vec<Post>> {
        let mut stmt = self.conn.prepare(&format!(
            "{POST_SELECT_SQL}
             WHERE date_key = ?1
             ORDER BY seq ASC;"
        ))?;
        let mut rows = stmt.query([date.as_str()])?;
        let mut posts = Vec::new();
        while let Some(row) = rows.next()? {
            let (_, post) = parse_post_row(self.conn, row)?;
            posts.push(post);
        }
        Ok(posts)
    }

    fn load_store(&self) -> RepoResult<PostStore> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POST_SELECT_SQL} ORDER BY date_key ASC, seq ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut store = PostStore::new();
        while let Some(row) = rows.next()? {
            let (date, post) = parse_post_row(self.conn, row)?;
            let post_id = post.id.clone();
            if !store.insert(date.clone(), post) {
                return Err(RepoError::InvalidData(format!(
                    "post {date}/{post_id} stored twice"
                )));
            }
        }
        Ok(store)
    }
}

fn insert_post_in_tx(tx: &Transaction<'_>, date: &DateKey, post: &Post) -> RepoResult<()> {
    if post_seq_in_tx(tx, date, &post.id)?.is_some() {
        return Err(RepoError::DuplicatePost {
            date: date.clone(),
            post_id: post.id.clone(),
        });
    }

    tx.execute(
        "INSERT INTO posts (date_key, id, content, created_at, author, likes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            date.as_str(),
            post.id.as_str(),
            post.content.as_str(),
            post.created_at.as_str(),
            post.author.as_deref(),
            i64::from(post.likes),
        ],
    )?;
    let seq = tx.last_insert_rowid();
    write_images(tx, seq, &post.images)
}

fn write_images(tx: &Transaction<'_>, seq: i64, images: &[Image]) -> RepoResult<()> {
    for (position, image) in images.iter().enumerate() {
        let owner: Option<i64> = tx
            .query_row(
                "SELECT post_seq FROM post_images WHERE image_id = ?1;",
                [image.id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        if owner.is_some_and(|owner_seq| owner_seq != seq) {
            return Err(RepoError::ImageAlreadyAttached(image.id.clone()));
        }

        let (data_url, remote_url) = match &image.payload {
            ImagePayload::Inline { data } => (Some(data.as_str()), None),
            ImagePayload::Remote { url } => (None, Some(url.as_str())),
        };
        tx.execute(
            "INSERT INTO post_images (image_id, post_seq, position, name, data_url, remote_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                image.id.as_str(),
                seq,
                position as i64,
                image.name.as_str(),
                data_url,
                remote_url,
            ],
        )?;
    }
    Ok(())
}

fn post_seq_in_tx(tx: &Transaction<'_>, date: &DateKey, post_id: &str) -> RepoResult<Option<i64>> {
    let seq = tx
        .query_row(
            "SELECT seq FROM posts WHERE date_key = ?1 AND id = ?2;",
            params![date.as_str(), post_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(seq)
}

fn parse_post_row(conn: &Connection, row: &Row<'_>) -> RepoResult<(DateKey, Post)> {
    let seq: i64 = row.get("seq")?;
    let date_text: String = row.get("date_key")?;
    let date = DateKey::parse(&date_text).map_err(|err| RepoError::InvalidData(err.to_string()))?;

    let likes_raw: i64 = row.get("likes")?;
    let likes = u32::try_from(likes_raw).map_err(|_| {
        RepoError::InvalidData(format!("invalid likes value `{likes_raw}` in posts.likes"))
    })?;

    let post = Post {
        id: row.get("id")?,
        content: row.get("content")?,
        images: load_images_for_post(conn, seq)?,
        created_at: row.get("created_at")?,
        author: row.get("author")?,
        likes,
    };
    Ok((date, post))
}

fn load_images_for_post(conn: &Connection, seq: i64) -> RepoResult<Vec<Image>> {
    let mut stmt = conn.prepare(
        "SELECT image_id, name, data_url, remote_url
         FROM post_images
         WHERE post_seq = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([seq])?;
    let mut images = Vec::new();
    while let Some(row) = rows.next()? {
        let id: String = row.get("image_id")?;
        let data_url: Option<String> = row.get("data_url")?;
        let remote_url: Option<String> = row.get("remote_url")?;
        let payload = match (data_url, remote_url) {
            (Some(data), None) => ImagePayload::Inline { data },
            (None, Some(url)) => ImagePayload::Remote { url },
            _ => {
                return Err(RepoError::InvalidData(format!(
                    "image `{id}` must have exactly one of data_url/remote_url"
                )));
            }
        };
        images.push(Image {
            id,
            name: row.get("name")?,
            payload,
        });
    }
    Ok(images)
}

fn ensure_post_connection_ready(conn: &Connection) -> RepoResult<()> {
    const REQUIRED: &[(&str, &[&str])] = &[
        (
            "posts",
            &["seq", "date_key", "id", "content", "created_at", "author", "likes"],
        ),
        (
            "post_images",
            &["image_id", "post_seq", "position", "name", "data_url", "remote_url"],
        ),
    ];

    for &(table, columns) in REQUIRED {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
