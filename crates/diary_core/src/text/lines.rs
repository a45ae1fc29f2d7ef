//! Line classifier for post bodies.
//!
//! # Responsibility
//! - Split content into lines and assign each a block kind.
//!
//! # Invariants
//! - Every input line yields exactly one `ClassifiedLine`, in order.
//! - Rules in `LINE_RULES` are tried top to bottom; longer heading markers
//!   come before shorter ones sharing the same leading `#`.

/// Block-level kind of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// `# `, `## ` or `### ` heading; level is 1..=3.
    Heading(u8),
    /// `- ` or `* ` bullet.
    ListItem,
    /// Empty or whitespace-only line.
    Blank,
    Paragraph,
}

/// One classified line borrowed from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedLine<'a> {
    /// Zero-based line number.
    pub index: usize,
    pub kind: LineKind,
    /// Line body with any block marker stripped.
    pub text: &'a str,
    /// Full original line without the line break.
    pub raw: &'a str,
}

struct LineRule {
    prefix: &'static str,
    kind: LineKind,
}

const LINE_RULES: &[LineRule] = &[
    LineRule {
        prefix: "### ",
        kind: LineKind::Heading(3),
    },
    LineRule {
        prefix: "## ",
        kind: LineKind::Heading(2),
    },
    LineRule {
        prefix: "# ",
        kind: LineKind::Heading(1),
    },
    LineRule {
        prefix: "- ",
        kind: LineKind::ListItem,
    },
    LineRule {
        prefix: "* ",
        kind: LineKind::ListItem,
    },
];

/// Splits `text` on line breaks and classifies every line.
///
/// Empty lines are preserved; `"a\n\nb"` yields three lines. A trailing `\r`
/// is treated as part of the line break.
pub fn classify_lines(text: &str) -> Vec<ClassifiedLine<'_>> {
    text.split('\n')
        .enumerate()
        .map(|(index, line)| classify_line(index, line.strip_suffix('\r').unwrap_or(line)))
        .collect()
}

fn classify_line(index: usize, raw: &str) -> ClassifiedLine<'_> {
    for rule in LINE_RULES {
        if let Some(rest) = raw.strip_prefix(rule.prefix) {
            return ClassifiedLine {
                index,
                kind: rule.kind,
                text: rest,
                raw,
            };
        }
    }

    let kind = if raw.trim().is_empty() {
        LineKind::Blank
    } else {
        LineKind::Paragraph
    };
    ClassifiedLine {
        index,
        kind,
        text: raw,
        raw,
    }
}
