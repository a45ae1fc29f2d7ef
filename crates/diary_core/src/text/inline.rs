//! Inline markup tokenizer.
//!
//! # Responsibility
//! - Split one line into plain and markup segments in source order.
//! - Keep markup precedence in a single ordered rule table.
//!
//! # Invariants
//! - Token spans partition the line: no gaps, no overlaps, no empty tokens.
//! - `INLINE_RULES` order is the match priority at a given start offset.
//!   Double-delimiter bold always precedes single-delimiter italic.
//! - Malformed markup never errors; it stays plain text.

use crate::text::hashtag::HASHTAG_PATTERN;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// Typed renderable unit of text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    PlainText(String),
    Bold(String),
    Italic(String),
    /// Hashtag including its leading `#`.
    Hashtag(String),
    /// Navigable reference; for bare URLs `label == href`.
    Link { label: String, href: String },
    /// Whole heading line, produced by the renderer rather than the tokenizer.
    Heading { level: u8, text: String },
}

impl Segment {
    /// Text a reader sees for this segment.
    pub fn text(&self) -> &str {
        match self {
            Self::PlainText(text)
            | Self::Bold(text)
            | Self::Italic(text)
            | Self::Hashtag(text) => text,
            Self::Link { label, .. } => label,
            Self::Heading { text, .. } => text,
        }
    }

    pub fn is_plain(&self) -> bool {
        matches!(self, Self::PlainText(_))
    }
}

/// Segment plus the byte range of the line it was produced from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineToken {
    pub segment: Segment,
    pub span: Range<usize>,
}

impl InlineToken {
    /// Original markup for this token, delimiters included.
    ///
    /// `None` when `line` is not the line the token came from and the span
    /// falls outside it or off a char boundary.
    pub fn source<'a>(&self, line: &'a str) -> Option<&'a str> {
        line.get(self.span.clone())
    }
}

struct InlineRule {
    group: &'static str,
    pattern: &'static str,
    build: fn(&str) -> Option<Segment>,
}

const INLINE_RULES: &[InlineRule] = &[
    InlineRule {
        group: "hashtag",
        pattern: HASHTAG_PATTERN,
        build: build_hashtag,
    },
    InlineRule {
        group: "bold_star",
        pattern: r"\*\*[^*]+\*\*",
        build: build_bold,
    },
    InlineRule {
        group: "bold_underscore",
        pattern: r"__[^_]+__",
        build: build_bold,
    },
    InlineRule {
        group: "link",
        pattern: r"\[[^\]]+\]\([^)\s]+\)",
        build: build_link,
    },
    InlineRule {
        group: "bare_url",
        pattern: r"https?://\S+",
        build: build_bare_url,
    },
    // Single-delimiter bodies exclude the delimiter, so a span starting
    // with `**` or `__` can never be taken as italic.
    InlineRule {
        group: "italic_star",
        pattern: r"\*[^*]+\*",
        build: build_italic,
    },
    InlineRule {
        group: "italic_underscore",
        pattern: r"_[^_]+_",
        build: build_italic,
    },
];

static INLINE_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation = INLINE_RULES
        .iter()
        .map(|rule| format!("(?P<{}>{})", rule.group, rule.pattern))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&alternation).expect("valid inline markup regex")
});

/// Tokenizes one line into segments, dropping empty plain parts.
pub fn tokenize_inline(line: &str) -> Vec<Segment> {
    tokenize_inline_spans(line)
        .into_iter()
        .map(|token| token.segment)
        .collect()
}

/// Tokenizes one line and keeps each segment's source span.
pub fn tokenize_inline_spans(line: &str) -> Vec<InlineToken> {
    let mut tokens = Vec::new();
    let mut cursor = 0;

    for caps in INLINE_RE.captures_iter(line) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_plain(&mut tokens, line, cursor..whole.start());

        let segment = INLINE_RULES
            .iter()
            .find_map(|rule| {
                caps.name(rule.group)
                    .and_then(|matched| (rule.build)(matched.as_str()))
            })
            .unwrap_or_else(|| Segment::PlainText(whole.as_str().to_string()));
        tokens.push(InlineToken {
            segment,
            span: whole.range(),
        });
        cursor = whole.end();
    }

    push_plain(&mut tokens, line, cursor..line.len());
    tokens
}

fn push_plain(tokens: &mut Vec<InlineToken>, line: &str, span: Range<usize>) {
    if span.is_empty() {
        return;
    }
    tokens.push(InlineToken {
        segment: Segment::PlainText(line[span.clone()].to_string()),
        span,
    });
}

fn build_hashtag(matched: &str) -> Option<Segment> {
    Some(Segment::Hashtag(matched.to_string()))
}

fn build_bold(matched: &str) -> Option<Segment> {
    strip_delimiters(matched, 2).map(|body| Segment::Bold(body.to_string()))
}

fn build_italic(matched: &str) -> Option<Segment> {
    strip_delimiters(matched, 1).map(|body| Segment::Italic(body.to_string()))
}

fn build_link(matched: &str) -> Option<Segment> {
    let inner = matched.strip_prefix('[')?.strip_suffix(')')?;
    let (label, href) = inner.split_once("](")?;
    Some(Segment::Link {
        label: label.to_string(),
        href: href.to_string(),
    })
}

fn build_bare_url(matched: &str) -> Option<Segment> {
    Some(Segment::Link {
        label: matched.to_string(),
        href: matched.to_string(),
    })
}

// Delimiters are ASCII, so byte slicing stays on char boundaries.
fn strip_delimiters(matched: &str, width: usize) -> Option<&str> {
    if matched.len() < width * 2 {
        return None;
    }
    matched.get(width..matched.len() - width)
}

#[cfg(test)]
mod tests {
    use super::{tokenize_inline, tokenize_inline_spans, InlineToken, Segment};

    fn plain(text: &str) -> Segment {
        Segment::PlainText(text.to_string())
    }

    #[test]
    fn double_star_is_bold_not_two_italics() {
        assert_eq!(
            tokenize_inline("**bold**"),
            vec![Segment::Bold("bold".to_string())]
        );
        assert_eq!(
            tokenize_inline("*italic*"),
            vec![Segment::Italic("italic".to_string())]
        );
        assert_eq!(
            tokenize_inline("**a** *b*"),
            vec![
                Segment::Bold("a".to_string()),
                plain(" "),
                Segment::Italic("b".to_string()),
            ]
        );
    }

    #[test]
    fn underscore_variants_follow_same_priority() {
        assert_eq!(
            tokenize_inline("__strong__ and _soft_"),
            vec![
                Segment::Bold("strong".to_string()),
                plain(" and "),
                Segment::Italic("soft".to_string()),
            ]
        );
    }

    #[test]
    fn hashtags_include_hangul() {
        assert_eq!(
            tokenize_inline("오늘 #일기 끝"),
            vec![
                plain("오늘 "),
                Segment::Hashtag("#일기".to_string()),
                plain(" 끝"),
            ]
        );
    }

    #[test]
    fn link_markup_and_bare_urls() {
        assert_eq!(
            tokenize_inline("see [docs](https://docs.rs) or https://crates.io now"),
            vec![
                plain("see "),
                Segment::Link {
                    label: "docs".to_string(),
                    href: "https://docs.rs".to_string(),
                },
                plain(" or "),
                Segment::Link {
                    label: "https://crates.io".to_string(),
                    href: "https://crates.io".to_string(),
                },
                plain(" now"),
            ]
        );
    }

    #[test]
    fn url_fragment_is_not_a_hashtag() {
        assert_eq!(
            tokenize_inline("https://example.com/#top"),
            vec![Segment::Link {
                label: "https://example.com/#top".to_string(),
                href: "https://example.com/#top".to_string(),
            }]
        );
    }

    #[test]
    fn unterminated_markup_stays_plain() {
        assert_eq!(tokenize_inline("**open and # stray"), vec![plain("**open and # stray")]);
        assert!(tokenize_inline("").is_empty());
    }

    #[test]
    fn spans_partition_the_line() {
        let line = "a **b** _c_ #d [e](f) http://g.h *i* ***j***";
        let tokens = tokenize_inline_spans(line);
        let mut cursor = 0;
        for token in &tokens {
            assert_eq!(token.span.start, cursor);
            assert!(!token.span.is_empty());
            cursor = token.span.end;
        }
        assert_eq!(cursor, line.len());
        let rebuilt: Option<String> = tokens.iter().map(|token| token.source(line)).collect();
        assert_eq!(rebuilt.as_deref(), Some(line));
    }

    #[test]
    fn source_on_a_foreign_line_is_none() {
        let tokens = tokenize_inline_spans("한글 **굵게**");
        let bold = &tokens[1];
        assert_eq!(bold.source("한글 **굵게**"), Some("**굵게**"));
        assert_eq!(bold.source("short"), None);
        // Byte 1 sits inside the first Hangul syllable.
        let shifted = InlineToken {
            segment: bold.segment.clone(),
            span: 1..4,
        };
        assert_eq!(shifted.source("한글"), None);
    }

    #[test]
    fn visible_text_is_lossless_without_delimiters() {
        let line = "plain words #tag and https://example.com/x?y=1 end";
        let visible: String = tokenize_inline(line)
            .iter()
            .map(|segment| segment.text())
            .collect();
        assert_eq!(visible, line);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let line = "**x** #y _z_";
        assert_eq!(tokenize_inline(line), tokenize_inline(line));
    }
}
