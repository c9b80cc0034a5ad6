use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::block::{Block, Document, List, Span};
use crate::config::HtmlOptions;

/// Convert a document to an HTML fragment, one block per line.
pub fn render(doc: &Document, options: &HtmlOptions) -> String {
    let mut out = Html {
        buf: String::new(),
        escape: options.escape,
    };
    for block in &doc.blocks {
        out.block(block);
        out.buf.push('\n');
    }
    out.buf
}

struct Html {
    buf: String,
    escape: bool,
}

impl Html {
    fn text(&mut self, text: &str) {
        if self.escape {
            self.buf.push_str(&encode_text(text));
        } else {
            self.buf.push_str(text);
        }
    }

    fn attr(&mut self, value: &str) {
        if self.escape {
            self.buf.push_str(&encode_double_quoted_attribute(value));
        } else {
            self.buf.push_str(value);
        }
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Heading {
                level,
                anchor,
                content,
            } => {
                self.buf.push_str(&format!("<h{level} id=\""));
                self.attr(anchor);
                self.buf.push_str("\"><span>");
                self.spans(content);
                self.buf.push_str("</span> <a class=\"heading-anchor\" href=\"#");
                self.attr(anchor);
                self.buf
                    .push_str(&format!("\" aria-hidden=\"true\">#</a></h{level}>"));
            }
            Block::Paragraph { content } => {
                self.buf.push_str("<p>");
                self.spans(content);
                self.buf.push_str("</p>");
            }
            Block::CodeBlock { language, content } => {
                self.buf.push_str(
                    "<pre class=\"code-block\"><button type=\"button\" class=\"copy-code\">Copy</button><code",
                );
                if let Some(lang) = language {
                    self.buf.push_str(" class=\"language-");
                    self.attr(lang);
                    self.buf.push('"');
                }
                self.buf.push('>');
                self.text(content);
                self.buf.push_str("</code></pre>");
            }
            Block::List(list) => self.list(list),
            Block::Blockquote { content } => {
                self.buf.push_str("<blockquote>");
                self.spans(content);
                self.buf.push_str("</blockquote>");
            }
            Block::Rule => self.buf.push_str("<hr>"),
        }
    }

    // Indentation is a class on a flat list, not a nested list.
    fn list(&mut self, list: &List) {
        let tag = if list.ordered() { "ol" } else { "ul" };
        self.buf.push('<');
        self.buf.push_str(tag);
        if list.indent_level > 0 {
            self.buf
                .push_str(&format!(" class=\"indent-{}\"", list.indent_level));
        }
        self.buf.push('>');
        for item in &list.items {
            self.buf.push_str("\n<li>");
            self.spans(&item.content);
            self.buf.push_str("</li>");
        }
        self.buf.push_str(&format!("\n</{tag}>"));
    }

    fn spans(&mut self, spans: &[Span]) {
        for span in spans {
            self.span(span);
        }
    }

    fn span(&mut self, span: &Span) {
        match span {
            Span::Text(text) => self.text(text),
            Span::Bold(text) => self.wrapped("<strong>", text, "</strong>"),
            Span::Italic(text) => self.wrapped("<em>", text, "</em>"),
            Span::BoldItalic(text) => self.wrapped("<strong><em>", text, "</em></strong>"),
            Span::Code(text) => self.wrapped("<code>", text, "</code>"),
            Span::Link { href, label } if self.escape && !is_safe_href(href) => {
                self.spans(label);
            }
            Span::Link { href, label } => {
                self.buf.push_str("<a href=\"");
                self.attr(href);
                self.buf
                    .push_str("\" target=\"_blank\" rel=\"noopener noreferrer\">");
                self.spans(label);
                self.buf.push_str("</a>");
            }
        }
    }

    fn wrapped(&mut self, open: &str, text: &str, close: &str) {
        self.buf.push_str(open);
        self.text(text);
        self.buf.push_str(close);
    }
}

/// Relative links and the http, https and mailto schemes are linked. Tab and
/// line breaks are removed first, the way browsers read an href.
fn is_safe_href(href: &str) -> bool {
    let href: String = href
        .trim_start_matches(|c: char| c <= ' ')
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .collect();
    match href.find([':', '/', '?', '#']) {
        Some(i) if href[i..].starts_with(':') => {
            matches!(
                href[..i].to_ascii_lowercase().as_str(),
                "http" | "https" | "mailto"
            )
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use crate::config::HtmlOptions;
    use crate::{markdown_to_html, parse};
    use pretty_assertions::assert_eq;

    #[test]
    fn heading() {
        assert_eq!(
            markdown_to_html("# Hello, World!").unwrap(),
            "<h1 id=\"hello-world\"><span>Hello, World!</span> <a class=\"heading-anchor\" href=\"#hello-world\" aria-hidden=\"true\">#</a></h1>\n"
        );
    }

    #[test]
    fn paragraph_with_emphasis() {
        assert_eq!(
            markdown_to_html("**Bold** and *italic* and ***both***").unwrap(),
            "<p><strong>Bold</strong> and <em>italic</em> and <strong><em>both</em></strong></p>\n"
        );
    }

    #[test]
    fn inline_code() {
        assert_eq!(
            markdown_to_html("`code`").unwrap(),
            "<p><code>code</code></p>\n"
        );
    }

    #[test]
    fn link_opens_safely() {
        assert_eq!(
            markdown_to_html("[this one](https://example.com)").unwrap(),
            "<p><a href=\"https://example.com\" target=\"_blank\" rel=\"noopener noreferrer\">this one</a></p>\n"
        );
    }

    #[test]
    fn unordered_list() {
        assert_eq!(
            markdown_to_html("- one\n- two").unwrap(),
            "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n"
        );
    }

    #[test]
    fn ordered_list_with_indent() {
        assert_eq!(
            markdown_to_html("  1. one\n  2. two").unwrap(),
            "<ol class=\"indent-1\">\n<li>one</li>\n<li>two</li>\n</ol>\n"
        );
    }

    #[test]
    fn code_block() {
        assert_eq!(
            markdown_to_html("```rust\nlet x = **1**;\n```").unwrap(),
            "<pre class=\"code-block\"><button type=\"button\" class=\"copy-code\">Copy</button><code class=\"language-rust\">let x = **1**;</code></pre>\n"
        );
    }

    #[test]
    fn blockquote_and_rule() {
        assert_eq!(
            markdown_to_html("> quoted\n---").unwrap(),
            "<blockquote>quoted</blockquote>\n<hr>\n"
        );
    }

    #[test]
    fn escapes_markup_by_default() {
        assert_eq!(
            markdown_to_html("a <b> & c").unwrap(),
            "<p>a &lt;b&gt; &amp; c</p>\n"
        );
        assert_eq!(
            markdown_to_html("```\n<div>\n```").unwrap(),
            "<pre class=\"code-block\"><button type=\"button\" class=\"copy-code\">Copy</button><code>&lt;div&gt;</code></pre>\n"
        );
    }

    #[test]
    fn escapes_quotes_in_href() {
        assert_eq!(
            markdown_to_html("[x](a\"b)").unwrap(),
            "<p><a href=\"a&quot;b\" target=\"_blank\" rel=\"noopener noreferrer\">x</a></p>\n"
        );
    }

    #[test]
    fn script_schemes_are_not_linked() {
        assert_eq!(
            markdown_to_html("[click](javascript:alert(1)) [img](DATA:text/html,x)").unwrap(),
            "<p>click) img</p>\n"
        );
        assert_eq!(
            markdown_to_html("[x](java\tscript:alert)").unwrap(),
            "<p>x</p>\n"
        );
    }

    #[test]
    fn relative_and_mail_links_are_kept() {
        for href in ["/docs", "#top", "page.html?a=b:c", "mailto:me@example.com", "HTTPS://x.io"] {
            let html = markdown_to_html(&format!("[x]({href})")).unwrap();
            assert!(html.contains("<a href="), "{href} was not linked");
        }
    }

    #[test]
    fn passthrough_when_escaping_disabled() {
        let doc = parse("a <b>bold</b> & c").unwrap();
        let html = super::render(&doc, &HtmlOptions { escape: false });
        assert_eq!(html, "<p>a <b>bold</b> & c</p>\n");
    }

    #[test]
    fn empty_document() {
        assert_eq!(markdown_to_html("").unwrap(), "");
    }

    #[test]
    fn rendering_is_repeatable() {
        let doc = parse("# T\n- a\n- b\n\n```\ncode\n```\n[l](h)").unwrap();
        let options = HtmlOptions::default();
        assert_eq!(super::render(&doc, &options), super::render(&doc, &options));
    }
}
