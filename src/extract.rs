//! Fenced code extraction.
//!
//! Code fences are lifted out of the source before any line classification
//! runs, so nothing inside a fence is ever read as Markdown. Each fence is
//! replaced by a placeholder line that the block parser resolves back to the
//! extracted code.

use std::borrow::Cow;

const FENCE: &str = "```";

/// Opening marker of a placeholder. Private-use code point, stripped from
/// user text before extraction.
pub const PLACEHOLDER_OPEN: char = '\u{E000}';
/// Closing marker of a placeholder.
pub const PLACEHOLDER_CLOSE: char = '\u{E001}';

/// One fenced code block lifted out of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedCode {
    /// The fenced source, fences and language tag included.
    pub raw: String,
    pub language: Option<String>,
    /// The text between the fence lines.
    pub content: String,
}

/// Source text with every fence replaced by a placeholder line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub text: String,
    pub blocks: Vec<FencedCode>,
}

impl Extracted {
    /// Resolve a line to the code block it stands for, if it is a placeholder.
    pub fn lookup(&self, line: &str) -> Option<&FencedCode> {
        placeholder_index(line).and_then(|index| self.blocks.get(index))
    }
}

pub fn placeholder(index: usize) -> String {
    format!("{PLACEHOLDER_OPEN}{index}{PLACEHOLDER_CLOSE}")
}

/// Parse a placeholder line back into its index.
pub fn placeholder_index(line: &str) -> Option<usize> {
    line.trim()
        .strip_prefix(PLACEHOLDER_OPEN)?
        .strip_suffix(PLACEHOLDER_CLOSE)?
        .parse()
        .ok()
}

/// Lift every fenced code block out of `input`.
///
/// A fence may open anywhere. Text before it on the same line stays on a
/// line of its own. The block ends at the first following fence; fences never
/// nest. A fence that is never closed swallows the rest of the document.
pub fn extract(input: &str) -> Extracted {
    let source = strip_markers(input);
    let mut rest: &str = &source;
    let mut out = Extracted {
        text: String::with_capacity(rest.len()),
        blocks: Vec::new(),
    };

    while let Some(fence_start) = rest.find(FENCE) {
        let line_start = rest[..fence_start].rfind('\n').map_or(0, |i| i + 1);
        if rest[line_start..fence_start].trim().is_empty() {
            out.text.push_str(&rest[..line_start]);
        } else {
            out.text.push_str(&rest[..fence_start]);
            out.text.push('\n');
        }

        let after = &rest[fence_start + FENCE.len()..];
        let (inner, raw, remainder, closed) = match after.find(FENCE) {
            Some(close) => {
                let end = fence_start + FENCE.len() + close + FENCE.len();
                (&after[..close], &rest[fence_start..end], &rest[end..], true)
            }
            None => (after, &rest[fence_start..], "", false),
        };

        let (language, content) = split_inner(inner, closed);
        out.text.push_str(&placeholder(out.blocks.len()));
        out.text.push('\n');
        out.blocks.push(FencedCode {
            raw: raw.to_string(),
            language,
            content: content.to_string(),
        });

        rest = remainder
            .strip_prefix("\r\n")
            .or_else(|| remainder.strip_prefix('\n'))
            .unwrap_or(remainder);
    }

    out.text.push_str(rest);
    out
}

fn strip_markers(input: &str) -> Cow<'_, str> {
    if input.contains([PLACEHOLDER_OPEN, PLACEHOLDER_CLOSE]) {
        Cow::Owned(
            input
                .chars()
                .filter(|&c| c != PLACEHOLDER_OPEN && c != PLACEHOLDER_CLOSE)
                .collect(),
        )
    } else {
        Cow::Borrowed(input)
    }
}

/// Split the text between two fences into the language tag and content.
fn split_inner(inner: &str, closed: bool) -> (Option<String>, &str) {
    let Some(newline) = inner.find('\n') else {
        // Opened and closed on a single line: no room for a language tag.
        // An unclosed fence on the last line is all info string.
        return if closed {
            (None, inner)
        } else {
            (language_tag(inner), "")
        };
    };
    (language_tag(&inner[..newline]), trim_closing_line(&inner[newline + 1..]))
}

fn language_tag(info: &str) -> Option<String> {
    info.split_whitespace().next().map(str::to_string)
}

/// Drop the line break before the closing fence, along with any indentation
/// that preceded the fence on its line.
fn trim_closing_line(body: &str) -> &str {
    match body.rfind('\n') {
        Some(last) if body[last + 1..].trim().is_empty() => {
            let body = &body[..last];
            body.strip_suffix('\r').unwrap_or(body)
        }
        _ => body,
    }
}
