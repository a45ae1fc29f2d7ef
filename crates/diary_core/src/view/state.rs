//! Per-session view state: expanded posts, liked posts, selected tags.
//!
//! # Responsibility
//! - Hold UI toggles as explicit values passed into queries and services.
//!
//! # Invariants
//! - Toggling twice restores the previous state.
//! - Tag selection keeps the order tags were picked in.

use crate::model::date_key::DateKey;
use crate::model::post::Post;
use std::collections::{BTreeSet, HashSet};

/// Posts with images or more than this many chars start collapsed.
pub const DEFAULT_SHOW_MORE_THRESHOLD: usize = 200;

/// Address of one post: date bucket plus per-bucket id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PostKey {
    pub date: DateKey,
    pub id: String,
}

impl PostKey {
    pub fn new(date: DateKey, id: impl Into<String>) -> Self {
        Self {
            date,
            id: id.into(),
        }
    }
}

/// Expanded and liked post sets for one viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostViewState {
    expanded: HashSet<PostKey>,
    liked: HashSet<PostKey>,
}

impl PostViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips expansion and returns the new state.
    pub fn toggle_expanded(&mut self, key: PostKey) -> bool {
        toggle(&mut self.expanded, key)
    }

    pub fn is_expanded(&self, key: &PostKey) -> bool {
        self.expanded.contains(key)
    }

    /// Flips the liked flag and returns the new state.
    pub fn toggle_liked(&mut self, key: PostKey) -> bool {
        toggle(&mut self.liked, key)
    }

    pub fn is_liked(&self, key: &PostKey) -> bool {
        self.liked.contains(key)
    }

    /// Forgets a deleted post.
    pub fn forget(&mut self, key: &PostKey) {
        self.expanded.remove(key);
        self.liked.remove(key);
    }
}

fn toggle(set: &mut HashSet<PostKey>, key: PostKey) -> bool {
    if set.remove(&key) {
        false
    } else {
        set.insert(key);
        true
    }
}

/// Ordered set of tags picked in the tag bar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSelection {
    tags: Vec<String>,
}

impl TagSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or removes `tag`; returns whether it is now selected.
    pub fn toggle(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if let Some(position) = self.tags.iter().position(|selected| *selected == tag) {
            self.tags.remove(position);
            false
        } else {
            self.tags.push(tag);
            true
        }
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    pub fn is_selected(&self, tag: &str) -> bool {
        self.tags.iter().any(|selected| selected == tag)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tags in selection order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Order-independent set for filtering.
    pub fn as_set(&self) -> BTreeSet<String> {
        self.tags.iter().cloned().collect()
    }
}

/// Whether a post needs a "show more" toggle.
pub fn should_show_more(post: &Post, threshold: usize) -> bool {
    post.has_images() || post.content.chars().count() > threshold
}

#[cfg(test)]
mod tests {
    use super::{should_show_more, PostKey, PostViewState, TagSelection};
    use crate::model::date_key::DateKey;
    use crate::model::post::{Image, Post};

    fn key(id: &str) -> PostKey {
        PostKey::new(DateKey::parse("2024-01-01").unwrap(), id)
    }

    #[test]
    fn toggles_are_involutive() {
        let mut state = PostViewState::new();
        assert!(state.toggle_expanded(key("a")));
        assert!(state.is_expanded(&key("a")));
        assert!(!state.toggle_expanded(key("a")));
        assert!(!state.is_expanded(&key("a")));

        assert!(state.toggle_liked(key("a")));
        state.forget(&key("a"));
        assert!(!state.is_liked(&key("a")));
    }

    #[test]
    fn tag_selection_keeps_pick_order() {
        let mut selection = TagSelection::new();
        selection.toggle("#b");
        selection.toggle("#a");
        assert_eq!(selection.tags(), ["#b".to_string(), "#a".to_string()]);
        assert!(!selection.toggle("#b"));
        assert_eq!(selection.as_set().len(), 1);
        selection.clear();
        assert!(selection.is_empty());
    }

    #[test]
    fn show_more_for_long_text_or_images() {
        let short = Post::new("1", "short");
        assert!(!should_show_more(&short, 200));
        assert!(should_show_more(&Post::new("2", "x".repeat(201)), 200));
        assert!(!should_show_more(&Post::new("3", "가".repeat(200)), 200));

        let mut with_image = short.clone();
        with_image
            .images
            .push(Image::remote("a.png", "https://x.test/a.png").unwrap());
        assert!(should_show_more(&with_image, 200));
    }
}
