//! Post and image records.
//!
//! # Responsibility
//! - Define the stored shape of a diary post and its attached images.
//! - Validate image payloads at construction time.
//!
//! # Invariants
//! - `Post::id` never changes after creation.
//! - `likes` never goes below zero (unsigned).
//! - An image payload is either an inline data URL or a remote URL, never both.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static DATA_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:(image/[A-Za-z0-9.+-]+);base64,([A-Za-z0-9+/]+={0,2})$")
        .expect("valid data url regex")
});

/// Error for image payloads that cannot be attached to a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// Inline payload is not a base64 `data:image/...` URL.
    InvalidDataUrl,
    /// Remote payload is not an `http(s)://` URL.
    InvalidRemoteUrl(String),
}

impl Display for ImageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDataUrl => write!(f, "image data must be a base64 data:image/* url"),
            Self::InvalidRemoteUrl(url) => write!(f, "image url must be http(s), got `{url}`"),
        }
    }
}

impl Error for ImageError {}

/// Authoritative image payload.
///
/// Serialized flat next to the image id, as `data` or `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImagePayload {
    /// Base64 data URL with MIME prefix, used in local-only mode.
    Inline { data: String },
    /// Remote download URL.
    Remote { url: String },
}

impl ImagePayload {
    /// MIME type for inline payloads.
    pub fn mime_type(&self) -> Option<&str> {
        match self {
            Self::Inline { data } => DATA_URL_RE
                .captures(data)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str()),
            Self::Remote { .. } => None,
        }
    }

    /// Value usable as an `src` attribute.
    pub fn source(&self) -> &str {
        match self {
            Self::Inline { data } => data,
            Self::Remote { url } => url,
        }
    }
}

/// Image attached to one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub payload: ImagePayload,
}

impl Image {
    /// Creates an inline image from a `data:image/<type>;base64,<body>` URL.
    pub fn inline(name: impl Into<String>, data_url: impl Into<String>) -> Result<Self, ImageError> {
        let data = data_url.into();
        if !DATA_URL_RE.is_match(&data) {
            return Err(ImageError::InvalidDataUrl);
        }
        Ok(Self {
            id: new_image_id(),
            name: name.into(),
            payload: ImagePayload::Inline { data },
        })
    }

    /// Creates an image backed by a remote URL.
    pub fn remote(name: impl Into<String>, url: impl Into<String>) -> Result<Self, ImageError> {
        let url = url.into();
        let trimmed = url.trim();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://"))
            || trimmed.contains(char::is_whitespace)
        {
            return Err(ImageError::InvalidRemoteUrl(url));
        }
        Ok(Self {
            id: new_image_id(),
            name: name.into(),
            payload: ImagePayload::Remote {
                url: trimmed.to_string(),
            },
        })
    }
}

/// One diary entry inside a date bucket.
///
/// Absent `content`, `images` and `likes` decode as empty values so loosely
/// shaped records from the local store still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Time-derived id, unique within its date bucket.
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub images: Vec<Image>,
    /// Display string captured at creation, e.g. `21:04:13`.
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub likes: u32,
}

impl Post {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            images: Vec::new(),
            created_at: String::new(),
            author: None,
            likes: 0,
        }
    }

    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }
}

/// Generates `img_<epoch millis>_<4 hex>` image ids.
pub fn new_image_id() -> String {
    format!("img_{}_{}", Utc::now().timestamp_millis(), random_suffix())
}

/// Short random disambiguator drawn from a v4 UUID.
pub(crate) fn random_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..4].to_string()
}

#[cfg(test)]
mod tests {
    use super::{Image, ImageError, ImagePayload, Post};

    #[test]
    fn inline_image_requires_image_data_url() {
        let image = Image::inline("dot.png", "data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert!(image.id.starts_with("img_"));
        assert_eq!(image.payload.mime_type(), Some("image/png"));

        let err = Image::inline("doc.txt", "data:text/plain;base64,aGVsbG8=").unwrap_err();
        assert_eq!(err, ImageError::InvalidDataUrl);
    }

    #[test]
    fn remote_image_requires_http_url() {
        let image = Image::remote("cat.jpg", " https://cdn.example.com/cat.jpg ").unwrap();
        assert_eq!(image.payload.source(), "https://cdn.example.com/cat.jpg");
        assert!(matches!(
            Image::remote("cat.jpg", "ftp://example.com/cat.jpg"),
            Err(ImageError::InvalidRemoteUrl(_))
        ));
    }

    #[test]
    fn post_decodes_with_missing_optional_fields() {
        let post: Post = serde_json::from_str(r#"{"id":"1700000000000"}"#).unwrap();
        assert_eq!(post.content, "");
        assert!(post.images.is_empty());
        assert_eq!(post.likes, 0);
        assert_eq!(post.author, None);
    }

    #[test]
    fn image_payload_serializes_flat() {
        let json = r#"{"id":"img_1","name":"a.png","url":"https://x.test/a.png"}"#;
        let image: Image = serde_json::from_str(json).unwrap();
        assert_eq!(
            image.payload,
            ImagePayload::Remote {
                url: "https://x.test/a.png".to_string()
            }
        );
    }
}
