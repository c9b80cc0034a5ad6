//! DOCX packaging.
//!
//! Serializes export paragraphs, plus the style and numbering definitions
//! they refer to, into an Office Open XML package.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::io::{Cursor, Write};

use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::DocxOptions;
use crate::docmodel::{MAX_LIST_LEVEL, NumberingKind, Paragraph, Run};
use crate::error::ExportError;

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";
const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

const BULLET_NUM_ID: usize = 1;
const FIRST_DECIMAL_NUM_ID: usize = 2;
// rId1 and rId2 are styles and numbering; hyperlinks follow.
const FIRST_LINK_REL: usize = 3;

/// Serialize paragraphs into DOCX bytes.
pub fn write_docx(paragraphs: &[Paragraph], options: &DocxOptions) -> Result<Vec<u8>, ExportError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in package_parts(paragraphs, options) {
        zip.start_file(name, file_options())?;
        zip.write_all(content.as_bytes())?;
    }
    let bytes = zip.finish()?.into_inner();
    debug!(paragraphs = paragraphs.len(), bytes = bytes.len(), "packaged DOCX");
    Ok(bytes)
}

/// The package parts, as (path, XML) pairs in archive order.
pub fn package_parts(paragraphs: &[Paragraph], options: &DocxOptions) -> Vec<(&'static str, String)> {
    let mut body = DocumentXml::default();
    for paragraph in paragraphs {
        body.paragraph(paragraph);
    }
    let decimal_instances = paragraphs
        .iter()
        .filter_map(|p| p.numbering)
        .filter(|n| n.kind == NumberingKind::Decimal)
        .map(|n| n.instance + 1)
        .max()
        .unwrap_or(0);

    vec![
        ("[Content_Types].xml", content_types()),
        ("_rels/.rels", package_rels()),
        ("word/document.xml", body.finish()),
        ("word/styles.xml", styles(options)),
        ("word/numbering.xml", numbering(decimal_instances)),
        ("word/_rels/document.xml.rels", document_rels(&body.links)),
    ]
}

fn file_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

#[derive(Default)]
struct DocumentXml {
    buf: String,
    links: Vec<String>,
}

impl DocumentXml {
    fn paragraph(&mut self, paragraph: &Paragraph) {
        self.buf.push_str("<w:p>");

        let mut props = String::new();
        if let Some(style) = paragraph.style.style_id() {
            let _ = write!(props, "<w:pStyle w:val=\"{style}\"/>");
        }
        if let Some(numbering) = paragraph.numbering {
            let num_id = match numbering.kind {
                NumberingKind::Bullet => BULLET_NUM_ID,
                NumberingKind::Decimal => FIRST_DECIMAL_NUM_ID + numbering.instance,
            };
            let _ = write!(
                props,
                "<w:numPr><w:ilvl w:val=\"{}\"/><w:numId w:val=\"{num_id}\"/></w:numPr>",
                numbering.level
            );
        }
        if let Some(left) = paragraph.indent_left {
            let _ = write!(props, "<w:ind w:left=\"{left}\"/>");
        }
        if !props.is_empty() {
            let _ = write!(self.buf, "<w:pPr>{props}</w:pPr>");
        }

        // Adjacent runs with the same target share one hyperlink element.
        let mut open_link: Option<&str> = None;
        for run in &paragraph.runs {
            if run.link.as_deref() != open_link {
                if open_link.is_some() {
                    self.buf.push_str("</w:hyperlink>");
                }
                if let Some(target) = run.link.as_deref() {
                    self.links.push(target.to_string());
                    let _ = write!(
                        self.buf,
                        "<w:hyperlink r:id=\"rId{}\">",
                        FIRST_LINK_REL + self.links.len() - 1
                    );
                }
                open_link = run.link.as_deref();
            }
            self.run(run);
        }
        if open_link.is_some() {
            self.buf.push_str("</w:hyperlink>");
        }

        self.buf.push_str("</w:p>");
    }

    fn run(&mut self, run: &Run) {
        self.buf.push_str("<w:r>");

        let mut props = String::new();
        if let Some(font) = &run.font {
            let font = attribute(font);
            let _ = write!(
                props,
                "<w:rFonts w:ascii=\"{font}\" w:hAnsi=\"{font}\" w:cs=\"{font}\"/>"
            );
        }
        if run.bold {
            props.push_str("<w:b/>");
        }
        if run.italic {
            props.push_str("<w:i/>");
        }
        if let Some(color) = &run.color {
            let _ = write!(props, "<w:color w:val=\"{}\"/>", attribute(color));
        }
        if run.link.is_some() {
            props.push_str("<w:u w:val=\"single\"/>");
        }
        if !props.is_empty() {
            let _ = write!(self.buf, "<w:rPr>{props}</w:rPr>");
        }

        for (i, line) in run.text.split('\n').enumerate() {
            if i > 0 {
                self.buf.push_str("<w:br/>");
            }
            if !line.is_empty() {
                let line = line.strip_suffix('\r').unwrap_or(line);
                let text = xml_chars(line);
                let _ = write!(self.buf, "<w:t xml:space=\"preserve\">{}</w:t>", encode_text(&text));
            }
        }

        self.buf.push_str("</w:r>");
    }

    fn finish(&self) -> String {
        format!(
            "{XML_HEADER}<w:document xmlns:w=\"{W_NS}\" xmlns:r=\"{R_NS}\"><w:body>{}\
             <w:sectPr><w:pgSz w:w=\"11906\" w:h=\"16838\"/>\
             <w:pgMar w:top=\"1440\" w:right=\"1440\" w:bottom=\"1440\" w:left=\"1440\" w:header=\"708\" w:footer=\"708\" w:gutter=\"0\"/>\
             </w:sectPr></w:body></w:document>",
            self.buf
        )
    }
}

/// Drop characters XML 1.0 does not allow, such as form feed and the other
/// C0 controls apart from tab and line breaks.
fn xml_chars(text: &str) -> Cow<'_, str> {
    let allowed = |c: char| {
        matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
    };
    if text.chars().all(allowed) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&c| allowed(c)).collect())
    }
}

fn attribute(value: &str) -> String {
    encode_double_quoted_attribute(&xml_chars(value)).into_owned()
}

fn content_types() -> String {
    format!(
        "{XML_HEADER}<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Override PartName=\"/word/document.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>\
         <Override PartName=\"/word/styles.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml\"/>\
         <Override PartName=\"/word/numbering.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml\"/>\
         </Types>"
    )
}

fn package_rels() -> String {
    format!(
        "{XML_HEADER}<Relationships xmlns=\"{REL_NS}\">\
         <Relationship Id=\"rId1\" Type=\"{R_NS}/officeDocument\" Target=\"word/document.xml\"/>\
         </Relationships>"
    )
}

fn document_rels(links: &[String]) -> String {
    let mut out = format!(
        "{XML_HEADER}<Relationships xmlns=\"{REL_NS}\">\
         <Relationship Id=\"rId1\" Type=\"{R_NS}/styles\" Target=\"styles.xml\"/>\
         <Relationship Id=\"rId2\" Type=\"{R_NS}/numbering\" Target=\"numbering.xml\"/>"
    );
    for (i, target) in links.iter().enumerate() {
        let _ = write!(
            out,
            "<Relationship Id=\"rId{}\" Type=\"{R_NS}/hyperlink\" Target=\"{}\" TargetMode=\"External\"/>",
            FIRST_LINK_REL + i,
            attribute(target)
        );
    }
    out.push_str("</Relationships>");
    out
}

fn styles(options: &DocxOptions) -> String {
    let font = attribute(&options.font);
    let mut out = format!(
        "{XML_HEADER}<w:styles xmlns:w=\"{W_NS}\"><w:docDefaults><w:rPrDefault><w:rPr>\
         <w:rFonts w:ascii=\"{font}\" w:hAnsi=\"{font}\" w:eastAsia=\"{font}\" w:cs=\"{font}\"/>\
         <w:sz w:val=\"{size}\"/><w:szCs w:val=\"{size}\"/></w:rPr></w:rPrDefault>\
         <w:pPrDefault><w:pPr><w:spacing w:after=\"120\"/></w:pPr></w:pPrDefault></w:docDefaults>\
         <w:style w:type=\"paragraph\" w:default=\"1\" w:styleId=\"Normal\"><w:name w:val=\"Normal\"/><w:qFormat/></w:style>",
        size = options.font_size
    );
    for (level, (before, after)) in [(240, 120), (200, 100), (160, 80)].into_iter().enumerate() {
        let level = level as u8 + 1;
        let size = options.heading_size(level);
        let _ = write!(
            out,
            "<w:style w:type=\"paragraph\" w:styleId=\"Heading{level}\"><w:name w:val=\"heading {level}\"/>\
             <w:basedOn w:val=\"Normal\"/><w:next w:val=\"Normal\"/><w:qFormat/>\
             <w:pPr><w:keepNext/><w:spacing w:before=\"{before}\" w:after=\"{after}\"/><w:outlineLvl w:val=\"{}\"/></w:pPr>\
             <w:rPr><w:b/><w:color w:val=\"000000\"/><w:sz w:val=\"{size}\"/><w:szCs w:val=\"{size}\"/></w:rPr></w:style>",
            level - 1
        );
    }
    out.push_str("</w:styles>");
    out
}

fn numbering(decimal_instances: usize) -> String {
    let mut out = format!("{XML_HEADER}<w:numbering xmlns:w=\"{W_NS}\">");
    abstract_num(&mut out, 0, NumberingKind::Bullet);
    abstract_num(&mut out, 1, NumberingKind::Decimal);

    let _ = write!(
        out,
        "<w:num w:numId=\"{BULLET_NUM_ID}\"><w:abstractNumId w:val=\"0\"/></w:num>"
    );
    for instance in 0..decimal_instances {
        let _ = write!(
            out,
            "<w:num w:numId=\"{}\"><w:abstractNumId w:val=\"1\"/>",
            FIRST_DECIMAL_NUM_ID + instance
        );
        for level in 0..=MAX_LIST_LEVEL {
            let _ = write!(
                out,
                "<w:lvlOverride w:ilvl=\"{level}\"><w:startOverride w:val=\"1\"/></w:lvlOverride>"
            );
        }
        out.push_str("</w:num>");
    }

    out.push_str("</w:numbering>");
    out
}

fn abstract_num(out: &mut String, id: usize, kind: NumberingKind) {
    let _ = write!(
        out,
        "<w:abstractNum w:abstractNumId=\"{id}\"><w:multiLevelType w:val=\"hybridMultilevel\"/>"
    );
    for level in 0..=MAX_LIST_LEVEL {
        let (format, text) = match kind {
            NumberingKind::Bullet => ("bullet", ["•", "◦", "▪"][level as usize % 3].to_string()),
            NumberingKind::Decimal => ("decimal", format!("%{}.", level + 1)),
        };
        let _ = write!(
            out,
            "<w:lvl w:ilvl=\"{level}\"><w:start w:val=\"1\"/><w:numFmt w:val=\"{format}\"/>\
             <w:lvlText w:val=\"{text}\"/><w:lvlJc w:val=\"left\"/>\
             <w:pPr><w:ind w:left=\"{}\" w:hanging=\"360\"/></w:pPr></w:lvl>",
            720 * (level as u32 + 1)
        );
    }
    out.push_str("</w:abstractNum>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docmodel::{Numbering, ParagraphStyle};
    use std::io::Read;

    fn part(parts: &[(&'static str, String)], name: &str) -> String {
        parts
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, xml)| xml.clone())
            .unwrap_or_else(|| panic!("missing part {name}"))
    }

    fn paragraph(runs: Vec<Run>) -> Paragraph {
        Paragraph {
            style: ParagraphStyle::Normal,
            numbering: None,
            indent_left: None,
            runs,
        }
    }

    #[test]
    fn empty_document_is_a_valid_package() {
        let bytes = write_docx(&[], &DocxOptions::default()).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 6);
        let mut document = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut document)
            .unwrap();
        assert!(document.contains("<w:body><w:sectPr>"));
    }

    #[test]
    fn heading_and_formatting() {
        let para = Paragraph {
            style: ParagraphStyle::Heading2,
            ..paragraph(vec![Run {
                bold: true,
                italic: true,
                ..Run::plain("a < b")
            }])
        };
        let xml = part(&package_parts(&[para], &DocxOptions::default()), "word/document.xml");
        assert!(xml.contains(
            "<w:p><w:pPr><w:pStyle w:val=\"Heading2\"/></w:pPr><w:r><w:rPr><w:b/><w:i/></w:rPr><w:t xml:space=\"preserve\">a &lt; b</w:t></w:r></w:p>"
        ));
    }

    #[test]
    fn line_breaks_in_runs() {
        let para = paragraph(vec![Run::plain("one\n\nthree")]);
        let xml = part(&package_parts(&[para], &DocxOptions::default()), "word/document.xml");
        assert!(xml.contains(
            "<w:r><w:t xml:space=\"preserve\">one</w:t><w:br/><w:br/><w:t xml:space=\"preserve\">three</w:t></w:r>"
        ));
    }

    #[test]
    fn numbering_ids() {
        let bullet = Paragraph {
            numbering: Some(Numbering {
                kind: NumberingKind::Bullet,
                level: 1,
                instance: 0,
            }),
            ..paragraph(vec![Run::plain("a")])
        };
        let second_numbered = Paragraph {
            numbering: Some(Numbering {
                kind: NumberingKind::Decimal,
                level: 0,
                instance: 1,
            }),
            ..paragraph(vec![Run::plain("b")])
        };
        let parts = package_parts(&[bullet, second_numbered], &DocxOptions::default());

        let document = part(&parts, "word/document.xml");
        assert!(document.contains("<w:numPr><w:ilvl w:val=\"1\"/><w:numId w:val=\"1\"/></w:numPr>"));
        assert!(document.contains("<w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"3\"/></w:numPr>"));

        let numbering = part(&parts, "word/numbering.xml");
        assert!(numbering.contains("<w:num w:numId=\"2\">"));
        assert!(numbering.contains("<w:num w:numId=\"3\">"));
        assert!(!numbering.contains("<w:num w:numId=\"4\">"));
    }

    #[test]
    fn hyperlinks_get_relationships() {
        let link = |text: &str, target: &str| Run {
            link: Some(target.to_string()),
            ..Run::plain(text)
        };
        let para = paragraph(vec![
            link("a", "https://x.io/?a=1&b=2"),
            link("b", "https://x.io/?a=1&b=2"),
            Run::plain(" and "),
            link("c", "https://y.io"),
        ]);
        let parts = package_parts(&[para], &DocxOptions::default());

        let document = part(&parts, "word/document.xml");
        assert_eq!(document.matches("<w:hyperlink r:id=\"rId3\">").count(), 1);
        assert_eq!(document.matches("<w:hyperlink r:id=\"rId4\">").count(), 1);
        assert_eq!(document.matches("</w:hyperlink>").count(), 2);

        let rels = part(&parts, "word/_rels/document.xml.rels");
        assert!(rels.contains("Id=\"rId3\""));
        assert!(rels.contains("Target=\"https://x.io/?a=1&amp;b=2\" TargetMode=\"External\""));
        assert!(rels.contains("Target=\"https://y.io\""));
    }

    #[test]
    fn control_characters_are_dropped() {
        let para = paragraph(vec![
            Run::plain("page one\x0Cpage two \x01 bell\x0B"),
            Run {
                link: Some("https://x.io/\x07".to_string()),
                ..Run::plain("tab\tkept")
            },
        ]);
        let parts = package_parts(&[para], &DocxOptions::default());
        for (name, xml) in &parts {
            roxmltree::Document::parse(xml).unwrap_or_else(|e| panic!("{name}: {e}"));
        }

        let document = part(&parts, "word/document.xml");
        assert!(document.contains(">page onepage two  bell</w:t>"));
        assert!(document.contains(">tab\tkept</w:t>"));
        let rels = part(&parts, "word/_rels/document.xml.rels");
        assert!(rels.contains("Target=\"https://x.io/\""));
    }

    #[test]
    fn styles_use_configured_fonts() {
        let options = DocxOptions {
            font: "Georgia".to_string(),
            ..DocxOptions::default()
        };
        let xml = part(&package_parts(&[], &options), "word/styles.xml");
        assert!(xml.contains("w:ascii=\"Georgia\""));
        assert!(xml.contains("w:styleId=\"Heading3\""));
        assert!(xml.contains("<w:sz w:val=\"32\"/>"));
    }
}
