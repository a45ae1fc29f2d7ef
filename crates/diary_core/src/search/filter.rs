//! Date / tag / keyword post filter.
//!
//! # Responsibility
//! - Turn the active date, selected tags and keyword into the visible list.
//!
//! # Invariants
//! - A non-blank keyword overrides the date; tags still narrow the result.
//! - Selected tags use AND semantics and override the date.
//! - With neither, the selected day's bucket is returned as-is.
//! - Pure projection of its inputs; the store is never touched.

use crate::model::date_key::DateKey;
use crate::model::post::Post;
use crate::store::PostStore;
use crate::text::hashtag::post_tags;
use std::collections::BTreeSet;

/// One visible post. `date` is set when results span several days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilteredPost<'a> {
    pub post: &'a Post,
    pub date: Option<&'a DateKey>,
}

/// Filter criteria as held by the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub selected_date: Option<DateKey>,
    pub selected_tags: BTreeSet<String>,
    pub keyword: String,
}

impl PostFilter {
    /// Plain single-day view.
    pub fn for_date(date: DateKey) -> Self {
        Self {
            selected_date: Some(date),
            ..Self::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }

    /// Whether the result spans all dates instead of the selected one.
    pub fn is_cross_date(&self) -> bool {
        !self.keyword.trim().is_empty() || !self.selected_tags.is_empty()
    }

    pub fn apply<'a>(&self, store: &'a PostStore) -> Vec<FilteredPost<'a>> {
        filter_posts(
            store,
            self.selected_date.as_ref(),
            &self.selected_tags,
            &self.keyword,
        )
    }
}

/// Computes the visible post list.
///
/// Cross-date results are ordered by date key, then bucket order.
pub fn filter_posts<'a>(
    store: &'a PostStore,
    selected_date: Option<&DateKey>,
    selected_tags: &BTreeSet<String>,
    keyword: &str,
) -> Vec<FilteredPost<'a>> {
    let keyword = keyword.trim();

    if !keyword.is_empty() {
        let needle = keyword.to_lowercase();
        return store
            .iter()
            .filter(|(_, post)| post.content.to_lowercase().contains(&needle))
            .filter(|(_, post)| has_all_tags(post, selected_tags))
            .map(|(date, post)| FilteredPost {
                post,
                date: Some(date),
            })
            .collect();
    }

    if !selected_tags.is_empty() {
        return store
            .iter()
            .filter(|(_, post)| has_all_tags(post, selected_tags))
            .map(|(date, post)| FilteredPost {
                post,
                date: Some(date),
            })
            .collect();
    }

    match selected_date {
        Some(date) => store
            .bucket(date)
            .iter()
            .map(|post| FilteredPost { post, date: None })
            .collect(),
        None => Vec::new(),
    }
}

fn has_all_tags(post: &Post, selected_tags: &BTreeSet<String>) -> bool {
    if selected_tags.is_empty() {
        return true;
    }
    post_tags(post).is_superset(selected_tags)
}

#[cfg(test)]
mod tests {
    use super::{filter_posts, FilteredPost, PostFilter};
    use crate::model::date_key::DateKey;
    use crate::model::post::Post;
    use crate::store::PostStore;
    use std::collections::BTreeSet;

    fn key(value: &str) -> DateKey {
        DateKey::parse(value).unwrap()
    }

    fn tags(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn sample_store() -> PostStore {
        let mut store = PostStore::new();
        store.insert(key("2024-01-01"), Post::new("a", "no tags"));
        store.insert(key("2024-01-01"), Post::new("b", "#x #y"));
        store
    }

    #[test]
    fn date_view_returns_bucket_without_annotation() {
        let store = sample_store();
        let day = key("2024-01-01");
        let visible = filter_posts(&store, Some(&day), &BTreeSet::new(), "");
        let ids: Vec<_> = visible.iter().map(|item| item.post.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(visible.iter().all(|item| item.date.is_none()));
    }

    #[test]
    fn tag_view_ignores_date_and_annotates() {
        let store = sample_store();
        let visible = filter_posts(&store, None, &tags(&["#x"]), "");
        let day = key("2024-01-01");
        assert_eq!(
            visible,
            vec![FilteredPost {
                post: &store.bucket(&day)[1],
                date: Some(&day),
            }]
        );
    }

    #[test]
    fn keyword_is_case_insensitive() {
        let store = sample_store();
        let visible = filter_posts(&store, None, &BTreeSet::new(), "NO");
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].post.id, "a");
        assert_eq!(visible[0].date.map(DateKey::as_str), Some("2024-01-01"));
    }

    #[test]
    fn tags_use_and_semantics() {
        let mut store = sample_store();
        store.insert(key("2024-01-05"), Post::new("c", "#x only"));
        assert_eq!(filter_posts(&store, None, &tags(&["#x"]), "").len(), 2);
        let both = filter_posts(&store, None, &tags(&["#y", "#x"]), "");
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].post.id, "b");
        assert!(filter_posts(&store, None, &tags(&["#x", "#zzz"]), "").is_empty());
    }

    #[test]
    fn keyword_and_tags_combine() {
        let mut store = sample_store();
        store.insert(key("2024-02-01"), Post::new("c", "#x later"));
        let day = key("2024-01-01");
        let visible = filter_posts(&store, Some(&day), &tags(&["#x"]), "LATER");
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].post.id, "c");
    }

    #[test]
    fn blank_keyword_falls_back_to_date() {
        let store = sample_store();
        let empty_day = key("2024-06-01");
        assert!(filter_posts(&store, Some(&empty_day), &BTreeSet::new(), "   ").is_empty());
        assert!(filter_posts(&store, None, &BTreeSet::new(), "").is_empty());
    }

    #[test]
    fn filter_value_is_idempotent() {
        let store = sample_store();
        let before = store.clone();
        let filter = PostFilter::for_date(key("2024-01-01")).with_keyword("tags");
        assert!(filter.is_cross_date());
        assert_eq!(filter.apply(&store), filter.apply(&store));
        assert_eq!(store, before);
    }
}
