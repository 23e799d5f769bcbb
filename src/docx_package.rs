//! OOXML packaging for [`DocxDocument`].
//!
//! A `.docx` file is a zip of XML parts. Every entry is written with a fixed
//! timestamp so the same resume always packages to the same bytes.

use std::fmt::Write as _;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::docx::{Block, DocxDocument, Justification, Paragraph, ParagraphStyle, Run, Table};
use crate::error::Result;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const CONTENT_TYPES: &str = r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/></Relationships>"#;

/// Numbering instance used by the bulleted list style.
const BULLET_NUM_ID: u32 = 1;
const BULLET_INDENT: u32 = 360;
const BULLET_HANGING: u32 = 220;

/// Escape text for use in XML content and attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

impl DocxDocument {
    /// Package the document as `.docx` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let parts = [
            ("[Content_Types].xml", with_decl(CONTENT_TYPES)),
            ("_rels/.rels", with_decl(PACKAGE_RELS)),
            ("word/_rels/document.xml.rels", with_decl(DOCUMENT_RELS)),
            ("word/document.xml", self.document_xml()),
            ("word/styles.xml", self.styles_xml()),
            ("word/numbering.xml", numbering_xml()),
        ];

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, xml) in parts {
            zip.start_file(name, options)?;
            zip.write_all(xml.as_bytes())?;
        }
        let bytes = zip.finish()?.into_inner();
        log::debug!("packaged docx: {} bytes", bytes.len());
        Ok(bytes)
    }

    /// `word/document.xml`.
    pub fn document_xml(&self) -> String {
        let mut xml = String::from(XML_DECL);
        let _ = write!(xml, r#"<w:document xmlns:w="{W_NS}"><w:body>"#);
        for block in &self.body {
            match block {
                Block::Paragraph(p) => self.write_paragraph(&mut xml, p),
                Block::Table(t) => self.write_table(&mut xml, t),
            }
        }
        let page = self.page;
        let _ = write!(
            xml,
            r#"<w:sectPr><w:pgSz w:w="{}" w:h="{}"/><w:pgMar w:top="{m}" w:right="{m}" w:bottom="{m}" w:left="{m}" w:header="0" w:footer="0" w:gutter="0"/></w:sectPr>"#,
            page.width,
            page.height,
            m = page.margin,
        );
        xml.push_str("</w:body></w:document>");
        xml
    }

    fn write_paragraph(&self, xml: &mut String, p: &Paragraph) {
        let _ = write!(xml, r#"<w:p><w:pPr><w:pStyle w:val="{}"/></w:pPr>"#, p.style);
        for run in &p.runs {
            match run {
                Run::Tab => xml.push_str("<w:r><w:tab/></w:r>"),
                Run::Text { text, bold, italic } => {
                    if text.is_empty() {
                        continue;
                    }
                    xml.push_str("<w:r>");
                    if *bold || *italic {
                        xml.push_str("<w:rPr>");
                        if *bold {
                            xml.push_str("<w:b/>");
                        }
                        if *italic {
                            xml.push_str("<w:i/>");
                        }
                        xml.push_str("</w:rPr>");
                    }
                    let _ = write!(
                        xml,
                        r#"<w:t xml:space="preserve">{}</w:t></w:r>"#,
                        escape_xml(text)
                    );
                }
            }
        }
        xml.push_str("</w:p>");
    }

    fn write_table(&self, xml: &mut String, table: &Table) {
        let cols = table.columns.len().max(1) as u32;
        let total = self.page.text_width();
        let col_w = total / cols;

        let _ = write!(
            xml,
            r#"<w:tbl><w:tblPr><w:tblW w:w="{total}" w:type="dxa"/><w:tblBorders>"#
        );
        for edge in ["top", "left", "bottom", "right", "insideH", "insideV"] {
            let _ = write!(xml, r#"<w:{edge} w:val="nil"/>"#);
        }
        xml.push_str(r#"</w:tblBorders><w:tblLayout w:type="fixed"/></w:tblPr><w:tblGrid>"#);
        for _ in 0..cols {
            let _ = write!(xml, r#"<w:gridCol w:w="{col_w}"/>"#);
        }
        xml.push_str("</w:tblGrid><w:tr>");
        for column in &table.columns {
            let _ = write!(
                xml,
                r#"<w:tc><w:tcPr><w:tcW w:w="{col_w}" w:type="dxa"/></w:tcPr>"#
            );
            if column.is_empty() {
                // A cell must hold at least one paragraph.
                xml.push_str("<w:p/>");
            }
            for item in column {
                let p = Paragraph::new(crate::docx::style_id::SKILL_ITEM, vec![Run::text(item)]);
                self.write_paragraph(xml, &p);
            }
            xml.push_str("</w:tc>");
        }
        xml.push_str("</w:tr></w:tbl>");
    }

    /// `word/styles.xml`.
    pub fn styles_xml(&self) -> String {
        let font = escape_xml(&self.font);
        let mut xml = String::from(XML_DECL);
        let _ = write!(
            xml,
            r#"<w:styles xmlns:w="{W_NS}"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:cs="{font}"/><w:sz w:val="20"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="0" w:line="240" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults>"#
        );
        xml.push_str(
            r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>"#,
        );
        for style in &self.styles {
            self.write_style(&mut xml, style);
        }
        xml.push_str("</w:styles>");
        xml
    }

    fn write_style(&self, xml: &mut String, s: &ParagraphStyle) {
        let _ = write!(
            xml,
            r#"<w:style w:type="paragraph" w:customStyle="1" w:styleId="{}"><w:name w:val="{}"/><w:basedOn w:val="Normal"/><w:qFormat/><w:pPr>"#,
            s.id, s.name
        );
        // Child order follows the CT_PPr sequence.
        if s.keep_next {
            xml.push_str("<w:keepNext/>");
        }
        if s.bulleted {
            let _ = write!(
                xml,
                r#"<w:numPr><w:ilvl w:val="0"/><w:numId w:val="{BULLET_NUM_ID}"/></w:numPr>"#
            );
        }
        if s.bottom_border {
            xml.push_str(
                r#"<w:pBdr><w:bottom w:val="single" w:sz="6" w:space="1" w:color="000000"/></w:pBdr>"#,
            );
        }
        if s.right_tab {
            let _ = write!(
                xml,
                r#"<w:tabs><w:tab w:val="right" w:pos="{}"/></w:tabs>"#,
                self.page.text_width()
            );
        }
        let _ = write!(
            xml,
            r#"<w:spacing w:before="{}" w:after="{}"/>"#,
            s.space_before, s.space_after
        );
        if s.bulleted {
            let _ = write!(
                xml,
                r#"<w:ind w:left="{BULLET_INDENT}" w:hanging="{BULLET_HANGING}"/>"#
            );
        }
        if s.justification == Justification::Center {
            xml.push_str(r#"<w:jc w:val="center"/>"#);
        }
        xml.push_str("</w:pPr><w:rPr>");
        if s.bold {
            xml.push_str("<w:b/>");
        }
        if s.italic {
            xml.push_str("<w:i/>");
        }
        if s.caps {
            xml.push_str("<w:caps/>");
        }
        let _ = write!(xml, r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#, s.size);
        xml.push_str("</w:rPr></w:style>");
    }
}

fn with_decl(body: &str) -> String {
    format!("{XML_DECL}{body}")
}

/// `word/numbering.xml`: one single-level bullet list.
fn numbering_xml() -> String {
    format!(
        r#"{XML_DECL}<w:numbering xmlns:w="{W_NS}"><w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="&#8226;"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="{BULLET_INDENT}" w:hanging="{BULLET_HANGING}"/></w:pPr></w:lvl></w:abstractNum><w:num w:numId="{BULLET_NUM_ID}"><w:abstractNumId w:val="0"/></w:num></w:numbering>"#
    )
}
