//! Word-processing document model.
//!
//! Blocks become paragraphs made of formatted runs, the shape a DOCX writer
//! consumes. Nothing here knows about XML; see `docx` for the packaging.

use crate::block::{Block, Document, ListKind, Span};
use crate::config::DocxOptions;

/// Deepest list level a word-processing numbering definition supports.
pub const MAX_LIST_LEVEL: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphStyle {
    Normal,
    Heading1,
    Heading2,
    Heading3,
}

impl ParagraphStyle {
    /// Map a Markdown heading level to a style. Only three heading styles
    /// exist, so levels 4 to 6 use `Heading3`.
    pub fn for_heading(level: u8) -> Self {
        match level {
            1 => ParagraphStyle::Heading1,
            2 => ParagraphStyle::Heading2,
            _ => ParagraphStyle::Heading3,
        }
    }

    pub fn style_id(self) -> Option<&'static str> {
        match self {
            ParagraphStyle::Normal => None,
            ParagraphStyle::Heading1 => Some("Heading1"),
            ParagraphStyle::Heading2 => Some("Heading2"),
            ParagraphStyle::Heading3 => Some("Heading3"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingKind {
    Bullet,
    Decimal,
}

/// List membership of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Numbering {
    pub kind: NumberingKind,
    pub level: u8,
    /// Numbered runs each get their own instance so counting restarts.
    /// Bullets always use instance 0.
    pub instance: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub font: Option<String>,
    /// Hex RGB without the leading `#`.
    pub color: Option<String>,
    /// Target of the hyperlink this run belongs to.
    pub link: Option<String>,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub style: ParagraphStyle,
    pub numbering: Option<Numbering>,
    /// Left indent in twips.
    pub indent_left: Option<u32>,
    pub runs: Vec<Run>,
}

impl Paragraph {
    fn new(style: ParagraphStyle, runs: Vec<Run>) -> Self {
        Self {
            style,
            numbering: None,
            indent_left: None,
            runs,
        }
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Convert a document to export paragraphs.
pub fn render(doc: &Document, options: &DocxOptions) -> Vec<Paragraph> {
    let mut paragraphs = Vec::new();
    let mut ordered_runs = 0;

    for block in &doc.blocks {
        match block {
            Block::Heading { level, content, .. } => {
                paragraphs.push(Paragraph::new(
                    ParagraphStyle::for_heading(*level),
                    spans_to_runs(content, options),
                ));
            }
            Block::Paragraph { content } => {
                paragraphs.push(Paragraph::new(
                    ParagraphStyle::Normal,
                    spans_to_runs(content, options),
                ));
            }
            Block::List(list) => {
                let (kind, instance) = match list.kind {
                    ListKind::Unordered => (NumberingKind::Bullet, 0),
                    ListKind::Ordered => {
                        ordered_runs += 1;
                        (NumberingKind::Decimal, ordered_runs - 1)
                    }
                };
                let numbering = Numbering {
                    kind,
                    level: list.indent_level.min(MAX_LIST_LEVEL as usize) as u8,
                    instance,
                };
                for item in &list.items {
                    let mut paragraph =
                        Paragraph::new(ParagraphStyle::Normal, spans_to_runs(&item.content, options));
                    paragraph.numbering = Some(numbering);
                    paragraphs.push(paragraph);
                }
            }
            Block::Blockquote { content } => {
                let mut runs = spans_to_runs(content, options);
                for run in &mut runs {
                    run.italic = true;
                }
                let mut paragraph = Paragraph::new(ParagraphStyle::Normal, runs);
                paragraph.indent_left = Some(options.quote_indent);
                paragraphs.push(paragraph);
            }
            Block::CodeBlock { content, .. } => {
                let run = Run {
                    text: content.clone(),
                    font: Some(options.code_font.clone()),
                    ..Run::default()
                };
                paragraphs.push(Paragraph::new(ParagraphStyle::Normal, vec![run]));
            }
            Block::Rule => {
                // No native rule exists; draw one with a row of light dashes.
                let run = Run {
                    text: options.rule_char.to_string().repeat(options.rule_width),
                    color: Some(options.rule_color.clone()),
                    ..Run::default()
                };
                paragraphs.push(Paragraph::new(ParagraphStyle::Normal, vec![run]));
            }
        }
    }

    paragraphs
}

fn spans_to_runs(spans: &[Span], options: &DocxOptions) -> Vec<Run> {
    let mut runs = Vec::new();
    push_runs(spans, None, options, &mut runs);
    runs
}

fn push_runs(spans: &[Span], link: Option<&str>, options: &DocxOptions, runs: &mut Vec<Run>) {
    for span in spans {
        let mut run = match span {
            Span::Text(text) => Run::plain(text.as_str()),
            Span::Bold(text) => Run {
                bold: true,
                ..Run::plain(text.as_str())
            },
            Span::Italic(text) => Run {
                italic: true,
                ..Run::plain(text.as_str())
            },
            Span::BoldItalic(text) => Run {
                bold: true,
                italic: true,
                ..Run::plain(text.as_str())
            },
            Span::Code(text) => Run {
                font: Some(options.code_font.clone()),
                ..Run::plain(text.as_str())
            },
            Span::Link { href, label } => {
                push_runs(label, Some(href), options, runs);
                continue;
            }
        };
        if let Some(href) = link {
            run.link = Some(href.to_string());
            run.color = Some(options.link_color.clone());
        }
        runs.push(run);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use pretty_assertions::assert_eq;

    fn paragraphs(markdown: &str) -> Vec<Paragraph> {
        render(&parse(markdown).unwrap(), &DocxOptions::default())
    }

    #[test]
    fn empty_document() {
        assert!(paragraphs("").is_empty());
    }

    #[test]
    fn heading_styles() {
        let styles: Vec<ParagraphStyle> = paragraphs("# a\n## b\n### c\n#### d\n##### e\n###### f")
            .iter()
            .map(|p| p.style)
            .collect();
        assert_eq!(
            styles,
            vec![
                ParagraphStyle::Heading1,
                ParagraphStyle::Heading2,
                ParagraphStyle::Heading3,
                ParagraphStyle::Heading3,
                ParagraphStyle::Heading3,
                ParagraphStyle::Heading3,
            ]
        );
    }

    #[test]
    fn level_five_clamps_to_heading_three() {
        assert_eq!(paragraphs("##### deep")[0].style, ParagraphStyle::Heading3);
        assert_eq!(paragraphs("##### deep")[0].text(), "deep");
    }

    #[test]
    fn bold_spans_become_bold_runs() {
        assert_eq!(
            paragraphs("plain **strong** end")[0].runs,
            vec![
                Run::plain("plain "),
                Run {
                    bold: true,
                    ..Run::plain("strong")
                },
                Run::plain(" end"),
            ]
        );
    }

    #[test]
    fn list_items_carry_numbering() {
        let paras = paragraphs("- a\n  - b\n1. c");
        assert_eq!(
            paras.iter().map(|p| p.numbering).collect::<Vec<_>>(),
            vec![
                Some(Numbering {
                    kind: NumberingKind::Bullet,
                    level: 0,
                    instance: 0,
                }),
                Some(Numbering {
                    kind: NumberingKind::Bullet,
                    level: 1,
                    instance: 0,
                }),
                Some(Numbering {
                    kind: NumberingKind::Decimal,
                    level: 0,
                    instance: 0,
                }),
            ]
        );
    }

    #[test]
    fn ordered_runs_restart_numbering() {
        let paras = paragraphs("1. a\n2. b\n\n1. c");
        let instances: Vec<usize> = paras.iter().filter_map(|p| p.numbering).map(|n| n.instance).collect();
        assert_eq!(instances, vec![0, 0, 1]);
    }

    #[test]
    fn deep_indent_is_capped() {
        let indent = " ".repeat(40);
        let paras = paragraphs(&format!("{indent}- deep"));
        assert_eq!(paras[0].numbering.map(|n| n.level), Some(MAX_LIST_LEVEL));
    }

    #[test]
    fn blockquote_is_indented_and_italic() {
        let para = &paragraphs("> a **b**")[0];
        assert_eq!(para.indent_left, Some(720));
        assert!(para.runs.iter().all(|r| r.italic));
        assert!(para.runs[1].bold);
    }

    #[test]
    fn code_block_keeps_content() {
        let para = &paragraphs("```\n**not bold**\n  indented\n```")[0];
        assert_eq!(
            para.runs,
            vec![Run {
                font: Some("Courier New".to_string()),
                ..Run::plain("**not bold**\n  indented")
            }]
        );
    }

    #[test]
    fn rule_is_a_row_of_dashes() {
        let para = &paragraphs("---")[0];
        assert_eq!(para.text(), "―".repeat(30));
        assert_eq!(para.runs[0].color.as_deref(), Some("CCCCCC"));
    }

    #[test]
    fn link_runs_keep_target() {
        let para = &paragraphs("[*docs*](https://d.io)")[0];
        assert_eq!(
            para.runs,
            vec![Run {
                italic: true,
                color: Some("1A4F8B".to_string()),
                link: Some("https://d.io".to_string()),
                ..Run::plain("docs")
            }]
        );
    }
}
