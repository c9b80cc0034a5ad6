//! Plain-text PDF export.
//!
//! The raw input is laid out as unformatted text: every source line becomes
//! one line on the page, Markdown markers included.

use tracing::debug;
use typst_as_lib::TypstEngine;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_library::layout::PagedDocument;
use typst_pdf::PdfOptions as TypstPdfOptions;

use crate::config::PdfOptions;
use crate::error::ExportError;

/// Convert raw text to Typst markup that prints it verbatim.
pub fn text_to_typst(text: &str, options: &PdfOptions) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "#set page(paper: \"{}\", margin: {})\n",
        options.paper, options.margin
    ));
    out.push_str(&format!("#set text(size: {})\n", options.font_size));
    out.push_str(&format!("#set par(leading: {})\n\n", options.leading));

    // Each line is a string literal, so no character is read as markup.
    for line in text.lines() {
        out.push_str("#\"");
        push_escaped(line, &mut out);
        out.push_str("\" \\\n");
    }

    out
}

fn push_escaped(line: &str, out: &mut String) {
    for ch in line.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\t' => out.push_str("\\t"),
            '\r' => {}
            _ => out.push(ch),
        }
    }
}

/// Render raw text to PDF bytes.
pub fn text_to_pdf(text: &str, options: &PdfOptions) -> Result<Vec<u8>, ExportError> {
    let typst_content = text_to_typst(text, options);

    let font_options = TypstKitFontOptions::new()
        .include_embedded_fonts(true)
        .include_system_fonts(false);

    let engine = TypstEngine::builder()
        .main_file(typst_content)
        .search_fonts_with(font_options)
        .build();

    let doc: PagedDocument = engine
        .compile()
        .output
        .map_err(|e| ExportError::Compile(format!("{:?}", e)))?;
    debug!(pages = doc.pages.len(), "compiled PDF layout");

    typst_pdf::pdf(&doc, &TypstPdfOptions::default()).map_err(|e| ExportError::Pdf(format!("{:?}", e)))
}
