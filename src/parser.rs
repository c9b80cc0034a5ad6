use tracing::debug;

use crate::block::{Block, Document, List, ListItem, ListKind, anchor_id};
use crate::extract::{self, Extracted, FencedCode};
use crate::inline::format_inline;

/// Parse markdown text into a document
pub fn parse(markdown: &str) -> Document {
    let extracted = extract::extract(markdown);
    debug!(fences = extracted.blocks.len(), "extracted fenced code");
    let blocks = parse_blocks(&extracted);
    debug!(blocks = blocks.len(), "parsed document");
    Document { blocks }
}

/// Classify each line of placeholder text into blocks.
pub fn parse_blocks(extracted: &Extracted) -> Vec<Block> {
    let mut state = ParseState::default();
    for line in extracted.text.lines() {
        process_line(classify(line, extracted), &mut state);
    }
    state.flush_list();
    state.blocks
}

#[derive(Default)]
struct ParseState {
    blocks: Vec<Block>,
    // The list run being built, if the previous line was a list item
    list: Option<List>,
}

impl ParseState {
    fn flush_list(&mut self) {
        if let Some(list) = self.list.take() {
            self.blocks.push(Block::List(list));
        }
    }

    fn push(&mut self, block: Block) {
        self.flush_list();
        self.blocks.push(block);
    }
}

/// One source line, classified.
#[derive(Debug, PartialEq)]
enum Line<'a> {
    Code(&'a FencedCode),
    Heading { level: u8, text: &'a str },
    Item { kind: ListKind, indent: usize, text: &'a str },
    Quote(&'a str),
    Rule,
    Blank,
    Paragraph(&'a str),
}

fn classify<'a>(line: &'a str, extracted: &'a Extracted) -> Line<'a> {
    let line = line.strip_suffix('\r').unwrap_or(line);

    if let Some(code) = extracted.lookup(line) {
        return Line::Code(code);
    }
    if let Some((level, text)) = heading(line) {
        return Line::Heading { level, text };
    }
    if let Some((kind, indent, text)) = list_item(line) {
        return Line::Item { kind, indent, text };
    }
    if let Some(rest) = line.strip_prefix('>') {
        return Line::Quote(rest.trim());
    }
    if line.len() >= 3 && line.bytes().all(|b| b == b'-') {
        return Line::Rule;
    }
    if line.trim().is_empty() {
        return Line::Blank;
    }
    Line::Paragraph(line.trim())
}

fn process_line(line: Line<'_>, state: &mut ParseState) {
    match line {
        Line::Code(code) => state.push(Block::CodeBlock {
            language: code.language.clone(),
            content: code.content.clone(),
        }),
        Line::Heading { level, text } => state.push(Block::Heading {
            level,
            anchor: anchor_id(text),
            content: format_inline(text),
        }),
        Line::Item { kind, indent, text } => {
            let item = ListItem {
                content: format_inline(text),
            };
            match state.list.as_mut() {
                Some(list) if list.kind == kind && list.indent_level == indent => {
                    list.items.push(item);
                }
                _ => {
                    state.flush_list();
                    state.list = Some(List {
                        kind,
                        indent_level: indent,
                        items: vec![item],
                    });
                }
            }
        }
        Line::Quote(text) => state.push(Block::Blockquote {
            content: format_inline(text),
        }),
        Line::Rule => state.push(Block::Rule),
        Line::Blank => state.flush_list(),
        Line::Paragraph(text) => state.push(Block::Paragraph {
            content: format_inline(text),
        }),
    }
}

/// `#{1,6}` followed by whitespace.
fn heading(line: &str) -> Option<(u8, &str)> {
    let level = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let rest = &line[level..];
    let ws = rest.chars().next().filter(|c| c.is_whitespace())?;
    Some((level as u8, rest[ws.len_utf8()..].trim()))
}

/// `-`, `*` or `+` (unordered) or `digits.` (ordered) after optional
/// indentation, followed by whitespace. Indent level is half the number of
/// leading whitespace characters.
fn list_item(line: &str) -> Option<(ListKind, usize, &str)> {
    let body = line.trim_start();
    let indent = line[..line.len() - body.len()].chars().count() / 2;

    let (kind, rest) = if let Some(rest) = body.strip_prefix(['-', '*', '+']) {
        (ListKind::Unordered, rest)
    } else {
        let digits = body.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        (ListKind::Ordered, body[digits..].strip_prefix('.')?)
    };

    let ws = rest.chars().next().filter(|c| c.is_whitespace())?;
    Some((kind, indent, rest[ws.len_utf8()..].trim()))
}
