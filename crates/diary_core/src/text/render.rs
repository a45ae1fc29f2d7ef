//! Post body rendering into typed lines.
//!
//! # Responsibility
//! - Compose the line classifier and inline tokenizer into one pass.
//! - Derive short plain-text previews for collapsed posts.

use crate::text::inline::{tokenize_inline, Segment};
use crate::text::lines::{classify_lines, LineKind};
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// One rendered line of a post body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub index: usize,
    pub kind: LineKind,
    /// Empty for blank lines; a single `Segment::Heading` for headings.
    pub segments: Vec<Segment>,
}

/// Renders full post content.
///
/// Heading text is kept verbatim; list items and paragraphs are tokenized.
pub fn render_content(content: &str) -> Vec<RenderedLine> {
    classify_lines(content)
        .into_iter()
        .map(|line| {
            let segments = match line.kind {
                LineKind::Heading(level) => vec![Segment::Heading {
                    level,
                    text: line.text.to_string(),
                }],
                LineKind::Blank => Vec::new(),
                LineKind::ListItem | LineKind::Paragraph => tokenize_inline(line.text),
            };
            RenderedLine {
                index: line.index,
                kind: line.kind,
                segments,
            }
        })
        .collect()
}

/// Visible text of `content` with markup removed, whitespace collapsed and
/// capped at `max_chars` characters.
///
/// Returns `None` when nothing visible remains.
pub fn preview_text(content: &str, max_chars: usize) -> Option<String> {
    let visible = render_content(content)
        .iter()
        .flat_map(|line| line.segments.iter().map(Segment::text))
        .collect::<Vec<_>>()
        .join(" ");
    let normalized = WHITESPACE_RE.replace_all(&visible, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(max_chars).collect())
    }
}
