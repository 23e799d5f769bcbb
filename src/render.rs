//! PDF renderer – takes a [`LayoutConfig`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API).

use std::collections::HashMap;

use printpdf::*;

use crate::error::{ExportError, Result};
use crate::fonts::{FontKey, FontManager};
use crate::layout_config::{LayoutConfig, PageItem, RuleLine, TextRun};

/// How a run of text is drawn: a built-in face or an embedded TrueType one.
#[derive(Clone)]
enum FaceRef {
    Builtin(BuiltinFont),
    Embedded(FontId),
}

/// Render a LayoutConfig into PDF bytes.
///
/// Runs whose face was loaded from a TrueType file are drawn with that face
/// embedded; everything else uses the built-in Helvetica family.
pub fn render_pdf(config: &LayoutConfig, fonts: &FontManager) -> Result<Vec<u8>> {
    let page_w = Mm(config.page_width_pt * 0.352778); // pt → mm
    let page_h = Mm(config.page_height_pt * 0.352778);

    let mut doc = PdfDocument::new(&config.title);

    // ── Register embedded faces once ──────────────────────────────────────
    let mut embedded: HashMap<FontKey, FontId> = HashMap::new();
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    for run in config.text_runs() {
        let key = run_key(run);
        if embedded.contains_key(&key) {
            continue;
        }
        if let Some(bytes) = fonts.font_bytes(&key) {
            let parsed = ParsedFont::from_bytes(bytes, 0, &mut warnings).ok_or_else(|| {
                ExportError::Pdf(format!("cannot embed font '{}'", key.family))
            })?;
            embedded.insert(key, doc.add_font(&parsed));
        }
    }

    // ── Render pages ──────────────────────────────────────────────────────
    let mut pages = Vec::new();
    let mut replaced = 0usize;

    for page_layout in &config.pages {
        let mut ops = Vec::new();
        for item in &page_layout.items {
            match item {
                PageItem::Text(run) => {
                    let key = run_key(run);
                    let face = match embedded.get(&key) {
                        Some(id) => FaceRef::Embedded(id.clone()),
                        None => {
                            replaced += unencodable_chars(&run.text);
                            FaceRef::Builtin(builtin_for(run.bold, run.italic))
                        }
                    };
                    render_text(&mut ops, run, &face, config.page_height_pt);
                }
                PageItem::Rule(rule) => render_rule(&mut ops, rule, config.page_height_pt),
            }
        }
        pages.push(PdfPage::new(page_w, page_h, ops));
    }

    // Ensure at least one page.
    if pages.is_empty() {
        pages.push(PdfPage::new(page_w, page_h, Vec::new()));
    }

    doc.with_pages(pages);
    let bytes = doc.save(&PdfSaveOptions::default(), &mut Vec::new());

    if replaced > 0 {
        log::warn!(
            "{replaced} character(s) outside Windows-1252 drawn as '?' with the built-in font; \
             load a TrueType font to keep them"
        );
    }
    if !warnings.is_empty() {
        log::warn!("{} font warning(s) while embedding", warnings.len());
    }
    Ok(bytes)
}

fn run_key(run: &TextRun) -> FontKey {
    FontKey {
        family: run.font_family.clone(),
        bold: run.bold,
        italic: run.italic,
    }
}

fn builtin_for(bold: bool, italic: bool) -> BuiltinFont {
    match (bold, italic) {
        (true, true) => BuiltinFont::HelveticaBoldOblique,
        (true, false) => BuiltinFont::HelveticaBold,
        (false, true) => BuiltinFont::HelveticaOblique,
        (false, false) => BuiltinFont::Helvetica,
    }
}

/// Windows-1252 byte for `c`, or `None` when the built-in fonts cannot
/// encode it.
fn winansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        '\u{20AC}' => 0x80, // euro
        '\u{2026}' => 0x85, // ellipsis
        '\u{2018}' => 0x91, // left single quote
        '\u{2019}' => 0x92, // right single quote
        '\u{201C}' => 0x93, // left double quote
        '\u{201D}' => 0x94, // right double quote
        '\u{2022}' => 0x95, // bullet
        '\u{2013}' => 0x96, // en-dash
        '\u{2014}' => 0x97, // em-dash
        '\u{2122}' => 0x99, // trademark
        '\u{00A0}' => 0x20, // non-breaking space -> space
        c if (c as u32) < 256 => c as u8,
        _ => return None,
    };
    Some(byte)
}

/// Number of characters in `s` that [`to_winlatin`] replaces with `?`.
fn unencodable_chars(s: &str) -> usize {
    s.chars().filter(|&c| winansi_byte(c).is_none()).count()
}

/// Convert a UTF-8 string to raw Windows-1252 bytes then wrap in a String so
/// printpdf writes the bytes unchanged into the PDF stream (builtin fonts use
/// WinAnsiEncoding, so each glyph is one byte 0x00–0xFF).
fn to_winlatin(s: &str) -> String {
    let bytes: Vec<u8> = s.chars().map(|c| winansi_byte(c).unwrap_or(b'?')).collect();
    // SAFETY: intentionally non-UTF-8 for 0x80-0x9F range; printpdf passes
    // these bytes straight to the PDF stream, decoded by WinAnsiEncoding.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}

fn rgb(c: [f32; 3]) -> Color {
    Color::Rgb(Rgb {
        r: c[0],
        g: c[1],
        b: c[2],
        icc_profile: None,
    })
}

fn render_text(ops: &mut Vec<Op>, run: &TextRun, face: &FaceRef, page_height: f32) {
    if run.text.is_empty() {
        return;
    }
    // PDF origin is bottom-left; layout origin is top-left. Baseline sits
    // roughly one ascender below the top of the line.
    let baseline = page_height - run.y - run.font_size * 0.75;

    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point {
            x: Pt(run.x),
            y: Pt(baseline),
        },
    });
    ops.push(Op::SetFillColor { col: rgb(run.color) });
    match face {
        FaceRef::Builtin(font) => {
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(run.font_size),
                font: *font,
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(to_winlatin(&run.text))],
                font: *font,
            });
        }
        FaceRef::Embedded(id) => {
            ops.push(Op::SetFontSize {
                size: Pt(run.font_size),
                font: id.clone(),
            });
            ops.push(Op::WriteText {
                items: vec![TextItem::Text(run.text.clone())],
                font: id.clone(),
            });
        }
    }
    ops.push(Op::EndTextSection);
}

fn render_rule(ops: &mut Vec<Op>, rule: &RuleLine, page_height: f32) {
    let y = page_height - rule.y;
    ops.push(Op::SetOutlineColor { col: rgb(rule.color) });
    ops.push(Op::SetOutlineThickness {
        pt: Pt(rule.thickness),
    });
    ops.push(Op::DrawLine {
        line: Line {
            points: vec![
                LinePoint {
                    p: Point {
                        x: Pt(rule.x1),
                        y: Pt(y),
                    },
                    bezier: false,
                },
                LinePoint {
                    p: Point {
                        x: Pt(rule.x2),
                        y: Pt(y),
                    },
                    bezier: false,
                },
            ],
            is_closed: false,
        },
    });
}
