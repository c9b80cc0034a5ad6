/// Inline text spans with formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Bold(String),
    Italic(String),
    BoldItalic(String),
    Code(String),
    /// The label may carry emphasis and code spans; the href is literal.
    Link { href: String, label: Vec<Span> },
}

impl Span {
    /// The visible text of the span, markers removed.
    pub fn plain_text(&self) -> String {
        match self {
            Span::Text(text)
            | Span::Bold(text)
            | Span::Italic(text)
            | Span::BoldItalic(text)
            | Span::Code(text) => text.clone(),
            Span::Link { label, .. } => label.iter().map(Span::plain_text).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Ordered,
    Unordered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub content: Vec<Span>,
}

/// A list run: consecutive items sharing kind and indent level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub kind: ListKind,
    pub indent_level: usize,
    pub items: Vec<ListItem>,
}

impl List {
    pub fn ordered(&self) -> bool {
        self.kind == ListKind::Ordered
    }
}

/// Block-level elements parsed from Markdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: u8,
        anchor: String,
        content: Vec<Span>,
    },
    Paragraph {
        content: Vec<Span>,
    },
    CodeBlock {
        language: Option<String>,
        content: String,
    },
    List(List),
    Blockquote {
        content: Vec<Span>,
    },
    Rule,
}

/// A parsed document. Built once per conversion and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Derive the in-page anchor for a heading.
///
/// Lowercases, drops everything but ASCII word characters and whitespace,
/// then joins whitespace runs with a single hyphen. Identical headings get
/// identical anchors.
pub fn anchor_id(heading: &str) -> String {
    let mut out = String::with_capacity(heading.len());
    let mut in_space = false;
    for ch in heading.chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() {
            if !in_space {
                out.push('-');
                in_space = true;
            }
        } else if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_strips_punctuation() {
        assert_eq!(anchor_id("Hello, World!"), "hello-world");
    }

    #[test]
    fn anchor_collapses_whitespace_runs() {
        assert_eq!(anchor_id("a  \t b"), "a-b");
    }

    #[test]
    fn anchor_joins_across_removed_characters() {
        // The removed "&" leaves two spaces, which collapse to one hyphen.
        assert_eq!(anchor_id("Q & A"), "q-a");
    }

    #[test]
    fn anchor_keeps_underscores_and_digits() {
        assert_eq!(anchor_id("Step_2 Setup"), "step_2-setup");
    }

    #[test]
    fn link_plain_text_uses_label() {
        let link = Span::Link {
            href: "https://example.com".to_string(),
            label: vec![Span::Text("see ".to_string()), Span::Bold("this".to_string())],
        };
        assert_eq!(link.plain_text(), "see this");
    }
}
