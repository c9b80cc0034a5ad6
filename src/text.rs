use crate::block::{Block, Document, Span};

/// The visible text of a document, one block per line.
///
/// This is what a reader would select and copy out of the preview: markers
/// are gone, code blocks are verbatim, rules produce nothing.
pub fn render(doc: &Document) -> String {
    let mut out = String::new();
    for block in &doc.blocks {
        match block {
            Block::Heading { content, .. }
            | Block::Paragraph { content }
            | Block::Blockquote { content } => push_line(&spans_text(content), &mut out),
            Block::List(list) => {
                for item in &list.items {
                    push_line(&spans_text(&item.content), &mut out);
                }
            }
            Block::CodeBlock { content, .. } => push_line(content, &mut out),
            Block::Rule => {}
        }
    }
    out
}

fn spans_text(spans: &[Span]) -> String {
    spans.iter().map(Span::plain_text).collect()
}

fn push_line(line: &str, out: &mut String) {
    out.push_str(line);
    out.push('\n');
}
