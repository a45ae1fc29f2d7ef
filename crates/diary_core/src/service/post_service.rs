//! Post use-case service.
//!
//! # Responsibility
//! - Provide create/update/delete/like APIs over a post repository.
//! - Assign time-derived post ids and creation display times.
//! - Serve the tag index and filtered views from a fresh store snapshot.
//!
//! # Invariants
//! - A post must have non-blank content or at least one image.
//! - Post ids are unique within their date bucket.
//! - Like counts never go below zero.

use crate::model::date_key::DateKey;
use crate::model::post::{random_suffix, Image, Post};
use crate::repo::post_repo::{PostRepository, RepoError, RepoResult};
use crate::search::filter::PostFilter;
use crate::store::PostStore;
use crate::text::hashtag::{build_tag_index, TagIndex};
use crate::view::state::{PostKey, PostViewState};
use chrono::{DateTime, Local};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CREATED_AT_FORMAT: &str = "%H:%M:%S";

/// Service error for post use-cases.
#[derive(Debug)]
pub enum PostServiceError {
    /// Content is blank and there are no images.
    EmptyPost,
    PostNotFound { date: DateKey, post_id: String },
    Repo(RepoError),
}

impl Display for PostServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPost => write!(f, "post needs text or at least one image"),
            Self::PostNotFound { date, post_id } => write!(f, "post not found: {date}/{post_id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PostServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PostServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { date, post_id } => Self::PostNotFound { date, post_id },
            other => Self::Repo(other),
        }
    }
}

pub type PostServiceResult<T> = Result<T, PostServiceError>;

/// Post service facade over repository implementations.
pub struct PostService<R: PostRepository> {
    repo: R,
}

impl<R: PostRepository> PostService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a post at the end of `date`'s bucket, stamped with now.
    pub fn create_post(
        &mut self,
        date: &DateKey,
        content: &str,
        images: Vec<Image>,
        author: Option<String>,
    ) -> PostServiceResult<Post> {
        self.create_post_at(date, content, images, author, Local::now())
    }

    /// Same as [`Self::create_post`] with an explicit clock reading.
    ///
    /// The id is `now` in epoch millis; when that id is taken in the bucket a
    /// random `_xxxx` suffix is appended until it is unique.
    pub fn create_post_at(
        &mut self,
        date: &DateKey,
        content: &str,
        images: Vec<Image>,
        author: Option<String>,
        now: DateTime<Local>,
    ) -> PostServiceResult<Post> {
        let content = normalize_content(content, &images)?;
        let bucket = self.repo.list_posts_for_date(date)?;
        let base_id = now.timestamp_millis().to_string();
        let mut id = base_id.clone();
        while bucket.iter().any(|post| post.id == id) {
            id = format!("{base_id}_{}", random_suffix());
        }

        let post = Post {
            id,
            content,
            images,
            created_at: now.format(CREATED_AT_FORMAT).to_string(),
            author,
            likes: 0,
        };
        self.repo
            .insert_post(date, &post)
            .inspect_err(|err| log_write_error("post_create", date, &post.id, err))?;
        info!(
            "event=post_create module=service status=ok date={} post_id={} images={}",
            date,
            post.id,
            post.images.len()
        );
        Ok(post)
    }

    /// Replaces content and images of an existing post.
    pub fn update_post(
        &mut self,
        date: &DateKey,
        post_id: &str,
        content: &str,
        images: Vec<Image>,
    ) -> PostServiceResult<Post> {
        let content = normalize_content(content, &images)?;
        let mut post = self.require_post(date, post_id)?;
        post.content = content;
        post.images = images;
        self.repo
            .update_post(date, &post)
            .inspect_err(|err| log_write_error("post_update", date, post_id, err))?;
        info!(
            "event=post_update module=service status=ok date={} post_id={} images={}",
            date,
            post_id,
            post.images.len()
        );
        Ok(post)
    }

    /// Deletes a post and drops it from the view state.
    pub fn delete_post(
        &mut self,
        date: &DateKey,
        post_id: &str,
        view: &mut PostViewState,
    ) -> PostServiceResult<()> {
        self.repo
            .delete_post(date, post_id)
            .inspect_err(|err| log_write_error("post_delete", date, post_id, err))?;
        view.forget(&PostKey::new(date.clone(), post_id));
        info!(
            "event=post_delete module=service status=ok date={} post_id={}",
            date, post_id
        );
        Ok(())
    }

    /// Likes or unlikes a post for the viewer owning `view`.
    ///
    /// Returns the updated post; `likes` moves by one in either direction.
    pub fn toggle_like(
        &mut self,
        date: &DateKey,
        post_id: &str,
        view: &mut PostViewState,
    ) -> PostServiceResult<Post> {
        let mut post = self.require_post(date, post_id)?;
        let key = PostKey::new(date.clone(), post_id);
        let liked = view.toggle_liked(key.clone());
        post.likes = if liked {
            post.likes.saturating_add(1)
        } else {
            post.likes.saturating_sub(1)
        };

        if let Err(err) = self.repo.update_post(date, &post) {
            // Keep view state consistent with storage.
            view.toggle_liked(key);
            log_write_error("post_like", date, post_id, &err);
            return Err(err.into());
        }
        info!(
            "event=post_like module=service status=ok date={} post_id={} liked={} likes={}",
            date, post_id, liked, post.likes
        );
        Ok(post)
    }

    pub fn get_post(&self, date: &DateKey, post_id: &str) -> RepoResult<Option<Post>> {
        self.repo.get_post(date, post_id)
    }

    pub fn list_posts_for_date(&self, date: &DateKey) -> RepoResult<Vec<Post>> {
        self.repo.list_posts_for_date(date)
    }

    /// Loads the full store read model.
    pub fn load_store(&self) -> RepoResult<PostStore> {
        self.repo.load_store()
    }

    /// Sorted distinct hashtags across every post.
    pub fn tag_index(&self) -> RepoResult<TagIndex> {
        Ok(build_tag_index(&self.repo.load_store()?))
    }

    /// Posts visible under `filter`, paired with their date when the filter
    /// spans several days.
    pub fn visible_posts(&self, filter: &PostFilter) -> RepoResult<Vec<(Post, Option<DateKey>)>> {
        let store = self.repo.load_store()?;
        Ok(filter
            .apply(&store)
            .into_iter()
            .map(|item| (item.post.clone(), item.date.cloned()))
            .collect())
    }

    fn require_post(&self, date: &DateKey, post_id: &str) -> PostServiceResult<Post> {
        self.repo
            .get_post(date, post_id)?
            .ok_or_else(|| PostServiceError::PostNotFound {
                date: date.clone(),
                post_id: post_id.to_string(),
            })
    }
}

fn normalize_content(content: &str, images: &[Image]) -> PostServiceResult<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() && images.is_empty() {
        return Err(PostServiceError::EmptyPost);
    }
    Ok(trimmed.to_string())
}

fn log_write_error(event: &str, date: &DateKey, post_id: &str, err: &RepoError) {
    error!(
        "event={} module=service status=error date={} post_id={} error={}",
        event, date, post_id, err
    );
}
