mod block;
mod config;
pub mod docmodel;
pub mod docx;
mod error;
pub mod extract;
pub mod html;
mod inline;
mod parser;
pub mod text;
mod typst;

pub use block::{Block, Document, List, ListItem, ListKind, Span, anchor_id};
pub use config::{Config, DocxOptions, HtmlOptions, LimitsConfig, PdfOptions};
pub use docmodel::Paragraph;
pub use error::{ConvertError, ExportError};
pub use inline::format_inline;
pub use typst::text_to_typst;

/// Document shown when the user has not typed anything yet.
pub const SAMPLE_MARKDOWN: &str = "# Welcome to Markdown Formatter

## Features
* **Bold** and *italic* text formatting
* Lists (ordered and unordered)
* Code blocks with syntax highlighting
* > Blockquotes for emphasis
* Links like [this one](https://example.com)

### Code Example
```javascript
const greeting = \"Hello World!\";
console.log(greeting);
```

1. First ordered item
2. Second ordered item
3. Third ordered item

---
Feel free to try it out!";

/// Parse markdown text into a document using default config.
pub fn parse(markdown: &str) -> Result<Document, ConvertError> {
    parse_with_config(markdown, &Config::compiled_default())
}

/// Parse markdown text into a document, enforcing the configured size limit.
pub fn parse_with_config(markdown: &str, config: &Config) -> Result<Document, ConvertError> {
    let limit = config.limits.max_input_bytes;
    if markdown.len() > limit {
        return Err(ConvertError::InputTooLarge {
            len: markdown.len(),
            limit,
        });
    }
    Ok(parser::parse(markdown))
}

/// Convert markdown to an HTML preview fragment using default config.
pub fn markdown_to_html(markdown: &str) -> Result<String, ConvertError> {
    markdown_to_html_with_config(markdown, &Config::compiled_default())
}

/// Convert markdown to an HTML preview fragment with custom config.
pub fn markdown_to_html_with_config(markdown: &str, config: &Config) -> Result<String, ConvertError> {
    let doc = parse_with_config(markdown, config)?;
    Ok(html::render(&doc, &config.html))
}

/// Convert markdown to export paragraphs using default config.
pub fn markdown_to_paragraphs(markdown: &str) -> Result<Vec<Paragraph>, ConvertError> {
    markdown_to_paragraphs_with_config(markdown, &Config::compiled_default())
}

/// Convert markdown to export paragraphs with custom config.
pub fn markdown_to_paragraphs_with_config(
    markdown: &str,
    config: &Config,
) -> Result<Vec<Paragraph>, ConvertError> {
    let doc = parse_with_config(markdown, config)?;
    Ok(docmodel::render(&doc, &config.docx))
}

/// Convert markdown to DOCX bytes using default config.
pub fn markdown_to_docx(markdown: &str) -> Result<Vec<u8>, ExportError> {
    markdown_to_docx_with_config(markdown, &Config::compiled_default())
}

/// Convert markdown to DOCX bytes with custom config.
pub fn markdown_to_docx_with_config(markdown: &str, config: &Config) -> Result<Vec<u8>, ExportError> {
    let paragraphs = markdown_to_paragraphs_with_config(markdown, config)?;
    docx::write_docx(&paragraphs, &config.docx)
}

/// Convert markdown to the plain text a reader sees in the preview.
pub fn markdown_to_text(markdown: &str) -> Result<String, ConvertError> {
    markdown_to_text_with_config(markdown, &Config::compiled_default())
}

/// Convert markdown to plain preview text with custom config.
pub fn markdown_to_text_with_config(markdown: &str, config: &Config) -> Result<String, ConvertError> {
    let doc = parse_with_config(markdown, config)?;
    Ok(text::render(&doc))
}

/// Convert markdown to PDF bytes using default config.
///
/// The PDF shows the raw source as plain text; it is not Markdown aware.
pub fn markdown_to_pdf(markdown: &str) -> Result<Vec<u8>, ExportError> {
    markdown_to_pdf_with_config(markdown, &Config::compiled_default())
}

/// Convert markdown to PDF bytes with custom config.
pub fn markdown_to_pdf_with_config(markdown: &str, config: &Config) -> Result<Vec<u8>, ExportError> {
    let limit = config.limits.max_input_bytes;
    if markdown.len() > limit {
        return Err(ConvertError::InputTooLarge {
            len: markdown.len(),
            limit,
        }
        .into());
    }
    typst::text_to_pdf(markdown, &config.pdf)
}
