//! In-memory date-keyed post store.
//!
//! # Responsibility
//! - Hold posts grouped by `DateKey`, preserving insertion order per bucket.
//! - Serve as the read model consumed by the filter/search engine.
//!
//! # Invariants
//! - Buckets iterate in ascending date-key order.
//! - Empty buckets are removed, so `dates_with_posts` only lists real days.
//! - A post id appears at most once per bucket.

use crate::model::date_key::DateKey;
use crate::model::post::Post;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod snapshot;

/// Mapping from date key to the ordered posts written on that day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostStore {
    buckets: BTreeMap<DateKey, Vec<Post>>,
}

impl PostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Posts stored under `date`; empty when the day has none.
    pub fn bucket(&self, date: &DateKey) -> &[Post] {
        self.buckets.get(date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Appends `post` to the end of its date bucket.
    ///
    /// Returns `false` and leaves the store untouched when the bucket already
    /// holds a post with the same id.
    pub fn insert(&mut self, date: DateKey, post: Post) -> bool {
        let bucket = self.buckets.entry(date).or_default();
        if bucket.iter().any(|existing| existing.id == post.id) {
            return false;
        }
        bucket.push(post);
        true
    }

    pub fn find(&self, date: &DateKey, post_id: &str) -> Option<&Post> {
        self.bucket(date).iter().find(|post| post.id == post_id)
    }

    pub fn find_mut(&mut self, date: &DateKey, post_id: &str) -> Option<&mut Post> {
        self.buckets
            .get_mut(date)?
            .iter_mut()
            .find(|post| post.id == post_id)
    }

    pub fn contains(&self, date: &DateKey, post_id: &str) -> bool {
        self.find(date, post_id).is_some()
    }

    /// Removes one post and returns it. Drops the bucket when it empties.
    pub fn remove(&mut self, date: &DateKey, post_id: &str) -> Option<Post> {
        let bucket = self.buckets.get_mut(date)?;
        let position = bucket.iter().position(|post| post.id == post_id)?;
        let removed = bucket.remove(position);
        if bucket.is_empty() {
            self.buckets.remove(date);
        }
        Some(removed)
    }

    /// Days that hold at least one post, ascending. Drives calendar dots.
    pub fn dates_with_posts(&self) -> impl Iterator<Item = &DateKey> {
        self.buckets
            .iter()
            .filter(|(_, posts)| !posts.is_empty())
            .map(|(date, _)| date)
    }

    /// Buckets in ascending date order.
    pub fn buckets(&self) -> impl Iterator<Item = (&DateKey, &[Post])> {
        self.buckets
            .iter()
            .map(|(date, posts)| (date, posts.as_slice()))
    }

    /// Every post with its date, ascending by date then bucket order.
    pub fn iter(&self) -> impl Iterator<Item = (&DateKey, &Post)> {
        self.buckets
            .iter()
            .flat_map(|(date, posts)| posts.iter().map(move |post| (date, post)))
    }

    /// First `(date, id)` that occurs twice within one bucket.
    ///
    /// `insert` cannot produce one; decoded snapshots are checked with this.
    pub fn first_duplicate(&self) -> Option<(&DateKey, &str)> {
        self.buckets.iter().find_map(|(date, posts)| {
            posts.iter().enumerate().find_map(|(index, post)| {
                posts[..index]
                    .iter()
                    .any(|earlier| earlier.id == post.id)
                    .then_some((date, post.id.as_str()))
            })
        })
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::PostStore;
    use crate::model::date_key::DateKey;
    use crate::model::post::Post;

    fn key(value: &str) -> DateKey {
        DateKey::parse(value).unwrap()
    }

    #[test]
    fn insertion_order_is_kept_per_bucket() {
        let mut store = PostStore::new();
        store.insert(key("2024-03-02"), Post::new("b", "second day"));
        store.insert(key("2024-03-01"), Post::new("a2", "first"));
        store.insert(key("2024-03-01"), Post::new("a1", "then this"));

        let ids: Vec<_> = store.iter().map(|(_, post)| post.id.as_str()).collect();
        assert_eq!(ids, vec!["a2", "a1", "b"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn remove_drops_empty_buckets() {
        let mut store = PostStore::new();
        let day = key("2024-03-01");
        store.insert(day.clone(), Post::new("a", "x"));
        assert!(store.remove(&day, "missing").is_none());
        assert_eq!(store.remove(&day, "a").map(|post| post.id), Some("a".to_string()));
        assert_eq!(store.dates_with_posts().count(), 0);
        assert!(store.bucket(&day).is_empty());
    }

    #[test]
    fn insert_refuses_same_id_in_one_bucket() {
        let mut store = PostStore::new();
        assert!(store.insert(key("2024-03-01"), Post::new("a", "first")));
        assert!(!store.insert(key("2024-03-01"), Post::new("a", "second")));
        assert!(store.insert(key("2024-03-02"), Post::new("a", "other day")));

        assert_eq!(store.len(), 2);
        assert_eq!(store.find(&key("2024-03-01"), "a").unwrap().content, "first");
        assert!(store.first_duplicate().is_none());
    }

    #[test]
    fn find_mut_edits_in_place() {
        let mut store = PostStore::new();
        let day = key("2024-03-01");
        store.insert(day.clone(), Post::new("a", "old"));
        if let Some(post) = store.find_mut(&day, "a") {
            post.content = "new".to_string();
        }
        assert_eq!(store.find(&day, "a").unwrap().content, "new");
    }
}
