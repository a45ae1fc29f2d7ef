//! Hashtag extraction and tag index.
//!
//! # Responsibility
//! - Pull `#tag` tokens out of arbitrary text.
//! - Build the sorted, deduplicated tag index for a whole store.
//!
//! # Invariants
//! - A hashtag is `#` followed by one or more ASCII word or Hangul syllable
//!   characters, and stops at the first other character.
//! - Extraction keeps duplicates; the index never does.

use crate::model::post::Post;
use crate::store::PostStore;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Pattern shared with the inline tokenizer.
pub const HASHTAG_PATTERN: &str = r"#[0-9A-Za-z_가-힣]+";

static HASHTAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(HASHTAG_PATTERN).expect("valid hashtag regex"));

/// Sorted set of distinct hashtags across a store.
pub type TagIndex = BTreeSet<String>;

/// Returns every hashtag in `text`, left to right, duplicates included.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    HASHTAG_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Distinct hashtags of one post.
pub fn post_tags(post: &Post) -> BTreeSet<String> {
    extract_hashtags(&post.content).into_iter().collect()
}

/// Builds the global tag index, sorted lexicographically.
pub fn build_tag_index(store: &PostStore) -> TagIndex {
    store
        .iter()
        .flat_map(|(_, post)| extract_hashtags(&post.content))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{build_tag_index, extract_hashtags};
    use crate::model::date_key::DateKey;
    use crate::model::post::Post;
    use crate::store::PostStore;

    #[test]
    fn extracts_in_order_with_exact_boundaries() {
        assert_eq!(
            extract_hashtags("hello #foo bar #bar_baz"),
            vec!["#foo".to_string(), "#bar_baz".to_string()]
        );
        assert_eq!(
            extract_hashtags("#a,#b.#c-d #"),
            vec!["#a".to_string(), "#b".to_string(), "#c".to_string()]
        );
    }

    #[test]
    fn keeps_duplicates_and_hangul() {
        assert_eq!(
            extract_hashtags("#일기 #x #일기"),
            vec!["#일기".to_string(), "#x".to_string(), "#일기".to_string()]
        );
    }

    #[test]
    fn index_is_sorted_and_distinct() {
        let mut store = PostStore::new();
        let day = DateKey::parse("2024-01-01").unwrap();
        store.insert(day.clone(), Post::new("1", "#zeta #alpha"));
        store.insert(
            DateKey::parse("2024-01-02").unwrap(),
            Post::new("2", "#alpha #mid"),
        );
        let index: Vec<_> = build_tag_index(&store).into_iter().collect();
        assert_eq!(index, vec!["#alpha", "#mid", "#zeta"]);
    }
}
