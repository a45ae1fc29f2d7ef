//! Core domain logic for the diary board.
//! This crate is the single source of truth for post, tag and filter rules.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod store;
pub mod text;
pub mod view;

pub use config::DiaryConfig;
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::calendar::MonthCursor;
pub use model::date_key::{DateKey, DateKeyError};
pub use model::post::{Image, ImageError, ImagePayload, Post};
pub use repo::post_repo::{PostRepository, RepoError, RepoResult, SqlitePostRepository};
pub use search::filter::{filter_posts, FilteredPost, PostFilter};
pub use service::post_service::{PostService, PostServiceError};
pub use store::snapshot::{load_snapshot, save_snapshot, store_from_json, store_to_json};
pub use store::PostStore;
pub use text::hashtag::{build_tag_index, extract_hashtags, post_tags, TagIndex};
pub use text::inline::{tokenize_inline, tokenize_inline_spans, InlineToken, Segment};
pub use text::lines::{classify_lines, ClassifiedLine, LineKind};
pub use text::render::{preview_text, render_content, RenderedLine};
pub use view::state::{should_show_more, PostKey, PostViewState, TagSelection};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
