//! Inline formatting.
//!
//! Text is scanned by a fixed sequence of passes: bold+italic, bold, italic,
//! inline code, links. Each pass sees the output of the previous one as a
//! sequence of literal characters and resolved atoms. Emphasis never matches
//! across an atom, so a span resolved by an earlier pass is never split or
//! re-read by a later one. Code and link passes may enclose atoms; they read
//! the atom's source text, which keeps code content and hrefs literal.

use crate::block::Span;

#[derive(Debug, Clone)]
enum Token {
    Char(char),
    Atom { span: Span, source: String },
}

impl Token {
    fn is_char(&self, expected: char) -> bool {
        matches!(self, Token::Char(c) if *c == expected)
    }
}

const BOLD_ITALIC: &[&[char]] = &[&['*', '*', '*']];
const BOLD: &[&[char]] = &[&['*', '*'], &['_', '_']];
const ITALIC: &[&[char]] = &[&['*'], &['_']];

/// Split a line of text into formatted spans.
pub fn format_inline(text: &str) -> Vec<Span> {
    let tokens: Vec<Token> = text.chars().map(Token::Char).collect();
    let tokens = emphasis_pass(tokens, BOLD_ITALIC, Span::BoldItalic);
    let tokens = emphasis_pass(tokens, BOLD, Span::Bold);
    let tokens = emphasis_pass(tokens, ITALIC, Span::Italic);
    let tokens = code_pass(tokens);
    let tokens = link_pass(tokens);
    into_spans(tokens)
}

fn emphasis_pass(tokens: Vec<Token>, delims: &[&[char]], make: fn(String) -> Span) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        match delims.iter().find_map(|delim| match_emphasis(&tokens, i, delim)) {
            Some((end, content)) => {
                let source = source_text(&tokens[i..end]);
                out.push(Token::Atom {
                    span: make(content),
                    source,
                });
                i = end;
            }
            None => {
                out.push(tokens[i].clone());
                i += 1;
            }
        }
    }
    out
}

/// Match `delim content delim` at `start`, taking the nearest closer.
/// Content is non-empty, does not open with the marker character, and holds
/// no atoms.
fn match_emphasis(tokens: &[Token], start: usize, delim: &[char]) -> Option<(usize, String)> {
    if !starts_with(&tokens[start..], delim) {
        return None;
    }
    let open_end = start + delim.len();
    if tokens.get(open_end).is_some_and(|t| t.is_char(delim[0])) {
        return None;
    }

    let mut content = String::new();
    for j in open_end..tokens.len() {
        if j > open_end && starts_with(&tokens[j..], delim) {
            return Some((j + delim.len(), content));
        }
        match &tokens[j] {
            Token::Char(c) => content.push(*c),
            Token::Atom { .. } => return None,
        }
    }
    None
}

fn code_pass(tokens: Vec<Token>) -> Vec<Token> {
    let ticks = next_stops(&tokens, '`');
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].is_char('`') {
            if let Some((end, content)) = scan_until(&tokens, &ticks, i + 1, '`') {
                out.push(Token::Atom {
                    source: format!("`{content}`"),
                    span: Span::Code(content),
                });
                i = end + 1;
                continue;
            }
        }
        out.push(tokens[i].clone());
        i += 1;
    }
    out
}

fn link_pass(tokens: Vec<Token>) -> Vec<Token> {
    let stops = LinkStops {
        label: next_stops(&tokens, ']'),
        href: next_stops(&tokens, ')'),
    };
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].is_char('[') {
            if let Some((end, atom)) = match_link(&tokens, &stops, i) {
                out.push(atom);
                i = end;
                continue;
            }
        }
        out.push(tokens[i].clone());
        i += 1;
    }
    out
}

struct LinkStops {
    label: Vec<Option<usize>>,
    href: Vec<Option<usize>>,
}

/// Match `[label](href)` at `start`. Returns the index past the closing
/// parenthesis and the link atom.
fn match_link(tokens: &[Token], stops: &LinkStops, start: usize) -> Option<(usize, Token)> {
    let label_end = stops.label[start + 1]?;
    if label_end == start + 1 || !tokens[label_end].is_char(']') {
        return None;
    }
    if !tokens.get(label_end + 1)?.is_char('(') {
        return None;
    }
    let (href_end, href) = scan_until(tokens, &stops.href, label_end + 2, ')')?;

    let label = into_spans(tokens[start + 1..label_end].to_vec());
    let source = source_text(&tokens[start..=href_end]);
    Some((
        href_end + 1,
        Token::Atom {
            span: Span::Link { href, label },
            source,
        },
    ))
}

/// For every position, the index of the first token at or after it that
/// stops a scan for `close`: the literal character, or an atom whose source
/// contains it. One entry past the end keeps lookups at `len` in bounds.
fn next_stops(tokens: &[Token], close: char) -> Vec<Option<usize>> {
    let mut stops = vec![None; tokens.len() + 1];
    for (j, token) in tokens.iter().enumerate().rev() {
        let stop = match token {
            Token::Char(c) => *c == close,
            Token::Atom { source, .. } => source.contains(close),
        };
        stops[j] = if stop { Some(j) } else { stops[j + 1] };
    }
    stops
}

/// Collect source text from `from` up to the next literal `close`.
/// Fails on empty content, on a missing closer, or when an atom's source
/// contains the closer.
fn scan_until(
    tokens: &[Token],
    stops: &[Option<usize>],
    from: usize,
    close: char,
) -> Option<(usize, String)> {
    let end = (*stops.get(from)?)?;
    if end == from || !tokens[end].is_char(close) {
        return None;
    }
    Some((end, source_text(&tokens[from..end])))
}

fn starts_with(tokens: &[Token], delim: &[char]) -> bool {
    tokens.len() >= delim.len() && tokens.iter().zip(delim).all(|(t, d)| t.is_char(*d))
}

fn source_text(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            Token::Char(c) => out.push(*c),
            Token::Atom { source, .. } => out.push_str(source),
        }
    }
    out
}

fn into_spans(tokens: Vec<Token>) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut text = String::new();
    for token in tokens {
        match token {
            Token::Char(c) => text.push(c),
            Token::Atom { span, .. } => {
                if !text.is_empty() {
                    spans.push(Span::Text(std::mem::take(&mut text)));
                }
                spans.push(span);
            }
        }
    }
    if !text.is_empty() {
        spans.push(Span::Text(text));
    }
    spans
}
