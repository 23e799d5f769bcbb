//! Font loading and text measurement.
//!
//! The PDF uses the built-in Helvetica faces unless TrueType files are
//! supplied. Built-in faces are measured with the standard Helvetica advance
//! widths; loaded faces are measured glyph by glyph with `ttf-parser`. The
//! wrap routine here is the single measurement primitive behind pagination.

use std::collections::HashMap;

use crate::error::{ExportError, Result};

/// Family name of the built-in face.
pub const BUILTIN_FAMILY: &str = "Helvetica";

/// A loaded font face with metrics.
#[derive(Clone)]
pub struct FontData {
    /// Raw font bytes; empty for the built-in face.
    pub bytes: Vec<u8>,
    pub units_per_em: f32,
    pub ascender: f32,
    pub descender: f32,
}

/// Family plus style bits identifying one face.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    pub bold: bool,
    pub italic: bool,
}

/// Everything needed to measure or draw a run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
}

impl FontSpec {
    pub fn new(family: &str, size: f32) -> Self {
        Self {
            family: family.to_string(),
            size,
            bold: false,
            italic: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn key(&self) -> FontKey {
        FontKey {
            family: self.family.clone(),
            bold: self.bold,
            italic: self.italic,
        }
    }
}

/// Manages loaded fonts.
pub struct FontManager {
    fonts: HashMap<FontKey, FontData>,
}

impl FontManager {
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
        }
    }

    /// Load a TTF/OTF font from bytes.
    pub fn load_font(&mut self, family: &str, bold: bool, italic: bool, bytes: Vec<u8>) -> Result<()> {
        let face = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|e| ExportError::Font(format!("{family}: {e}")))?;

        let data = FontData {
            units_per_em: face.units_per_em() as f32,
            ascender: face.ascender() as f32,
            descender: face.descender() as f32,
            bytes,
        };

        log::debug!("loaded font {family} (bold={bold}, italic={italic})");
        self.fonts.insert(
            FontKey {
                family: family.to_string(),
                bold,
                italic,
            },
            data,
        );
        Ok(())
    }

    /// Register the four built-in Helvetica faces with AFM-style metrics.
    pub fn ensure_builtin(&mut self) {
        for (bold, italic) in [(false, false), (true, false), (false, true), (true, true)] {
            self.fonts
                .entry(FontKey {
                    family: BUILTIN_FAMILY.to_string(),
                    bold,
                    italic,
                })
                .or_insert(FontData {
                    bytes: Vec::new(),
                    units_per_em: 1000.0,
                    ascender: 718.0,
                    descender: -207.0,
                });
        }
    }

    /// Resolve a key, falling back to the built-in face with the same style.
    fn resolve(&self, key: &FontKey) -> Option<&FontData> {
        self.fonts.get(key).or_else(|| {
            self.fonts.get(&FontKey {
                family: BUILTIN_FAMILY.to_string(),
                bold: key.bold,
                italic: key.italic,
            })
        })
    }

    /// Width of `text` in points.
    pub fn measure_text_width(&self, text: &str, spec: &FontSpec) -> f32 {
        let data = match self.resolve(&spec.key()) {
            Some(d) if !d.bytes.is_empty() => d,
            _ => return builtin_width(text, spec.size, spec.bold),
        };

        match ttf_parser::Face::parse(&data.bytes, 0) {
            Ok(face) => {
                let scale = spec.size / data.units_per_em;
                text.chars()
                    .map(|ch| match face.glyph_index(ch) {
                        Some(gid) => face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale,
                        None => spec.size * 0.5,
                    })
                    .sum()
            }
            Err(_) => builtin_width(text, spec.size, spec.bold),
        }
    }

    /// Ascender in points.
    pub fn ascender_pt(&self, spec: &FontSpec) -> f32 {
        match self.resolve(&spec.key()) {
            Some(d) => d.ascender * spec.size / d.units_per_em,
            None => spec.size * 0.718,
        }
    }

    /// Font bytes for embedding; `None` for built-in faces.
    pub fn font_bytes(&self, key: &FontKey) -> Option<&[u8]> {
        self.fonts.get(key).and_then(|d| {
            if d.bytes.is_empty() {
                None
            } else {
                Some(d.bytes.as_slice())
            }
        })
    }

    /// True when `key` will be drawn with an embedded TrueType face.
    pub fn is_embedded(&self, key: &FontKey) -> bool {
        self.font_bytes(key).is_some()
    }
}

impl Default for FontManager {
    fn default() -> Self {
        let mut mgr = Self::new();
        mgr.ensure_builtin();
        mgr
    }
}

// ---------------------------------------------------------------------------
// Built-in Helvetica metrics (1/1000 em), printable ASCII 0x20..=0x7E
// ---------------------------------------------------------------------------

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

fn builtin_advance(ch: char, bold: bool) -> u16 {
    let code = ch as u32;
    if (0x20..=0x7E).contains(&code) {
        let idx = (code - 0x20) as usize;
        return if bold { HELVETICA_BOLD[idx] } else { HELVETICA[idx] };
    }
    match ch {
        '\u{2022}' => 350,
        '\u{00B7}' => 278,
        '\u{2013}' => 556,
        '\u{2014}' | '\u{2026}' => 1000,
        '\u{2018}' | '\u{2019}' => {
            if bold {
                278
            } else {
                222
            }
        }
        '\u{201C}' | '\u{201D}' => {
            if bold {
                500
            } else {
                333
            }
        }
        '\u{00A0}' => 278,
        _ => 556,
    }
}

fn builtin_width(text: &str, size: f32, bold: bool) -> f32 {
    let units: u32 = text.chars().map(|c| builtin_advance(c, bold) as u32).sum();
    units as f32 * size / 1000.0
}

/// Word-wrap text to fit within `max_width` points. Returns a vec of lines.
///
/// Words wider than the line are broken between characters.
pub fn wrap_text(text: &str, spec: &FontSpec, max_width: f32, fonts: &FontManager) -> Vec<String> {
    wrap_text_hanging(text, spec, max_width, max_width, fonts)
}

/// Like [`wrap_text`], but the first line has its own width (used when a
/// bold lead-in such as a skill heading precedes the text on that line).
/// When not even the first word fits there, the first line is left empty.
pub fn wrap_text_hanging(
    text: &str,
    spec: &FontSpec,
    first_width: f32,
    max_width: f32,
    fonts: &FontManager,
) -> Vec<String> {
    if max_width <= 0.0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        for word in &words {
            let limit = if lines.is_empty() { first_width } else { max_width };
            let candidate = if current_line.is_empty() {
                word.to_string()
            } else {
                format!("{current_line} {word}")
            };
            if fonts.measure_text_width(&candidate, spec) <= limit {
                current_line = candidate;
                continue;
            }

            if !current_line.is_empty() {
                lines.push(std::mem::take(&mut current_line));
            } else if lines.is_empty() && first_width < max_width {
                lines.push(String::new());
            }

            let mut rest: &str = word;
            while !rest.is_empty() {
                if fonts.measure_text_width(rest, spec) <= max_width {
                    current_line = rest.to_string();
                    break;
                }
                let cut = fitting_prefix_len(rest, spec, max_width, fonts);
                lines.push(rest[..cut].to_string());
                rest = &rest[cut..];
            }
        }
        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Byte length of the longest prefix of `word` that fits in `width`, never
/// less than one character.
fn fitting_prefix_len(word: &str, spec: &FontSpec, width: f32, fonts: &FontManager) -> usize {
    let mut end = 0;
    for (i, ch) in word.char_indices() {
        let next = i + ch.len_utf8();
        if end > 0 && fonts.measure_text_width(&word[..next], spec) > width {
            break;
        }
        end = next;
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_widths_follow_helvetica() {
        let mgr = FontManager::default();
        let spec = FontSpec::new(BUILTIN_FAMILY, 10.0);
        // H=722 e=556 l=222 l=222 o=556 -> 2278 units
        let w = mgr.measure_text_width("Hello", &spec);
        assert!((w - 22.78).abs() < 0.01, "got {w}");
    }

    #[test]
    fn bold_is_wider() {
        let mgr = FontManager::default();
        let regular = FontSpec::new(BUILTIN_FAMILY, 10.0);
        let bold = regular.clone().bold();
        assert!(
            mgr.measure_text_width("illustrate", &bold)
                > mgr.measure_text_width("illustrate", &regular)
        );
    }

    #[test]
    fn unknown_family_falls_back_to_builtin() {
        let mgr = FontManager::default();
        let w1 = mgr.measure_text_width("abc", &FontSpec::new("Nope", 12.0));
        let w2 = mgr.measure_text_width("abc", &FontSpec::new(BUILTIN_FAMILY, 12.0));
        assert_eq!(w1, w2);
    }

    #[test]
    fn word_wrap_basic() {
        let mgr = FontManager::default();
        let spec = FontSpec::new(BUILTIN_FAMILY, 16.0);
        let lines = wrap_text("Hello world foo bar", &spec, 60.0, &mgr);
        assert!(lines.len() >= 2, "Expected wrapping, got {:?}", lines);
        assert_eq!(lines.join(" "), "Hello world foo bar");
    }

    #[test]
    fn wrapped_lines_fit() {
        let mgr = FontManager::default();
        let spec = FontSpec::new(BUILTIN_FAMILY, 10.0);
        let text = "the quick brown fox jumps over the lazy dog ".repeat(10);
        for line in wrap_text(&text, &spec, 200.0, &mgr) {
            assert!(mgr.measure_text_width(&line, &spec) <= 200.0, "{line}");
        }
    }

    #[test]
    fn hanging_first_line_is_narrower() {
        let mgr = FontManager::default();
        let spec = FontSpec::new(BUILTIN_FAMILY, 10.0);
        let text = "alpha beta gamma delta epsilon zeta eta theta";
        let lines = wrap_text_hanging(text, &spec, 60.0, 500.0, &mgr);
        assert!(mgr.measure_text_width(&lines[0], &spec) <= 60.0);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn overlong_word_is_broken_to_fit() {
        let mgr = FontManager::default();
        let spec = FontSpec::new(BUILTIN_FAMILY, 10.0);
        let url = format!("https://github.com/acme/{}", "deep-nested-path/".repeat(8));
        let text = format!("See {url} for details");
        let lines = wrap_text(&text, &spec, 200.0, &mgr);
        for line in &lines {
            assert!(mgr.measure_text_width(line, &spec) <= 200.0, "{line}");
        }
        assert_eq!(lines.concat().replace(' ', ""), text.replace(' ', ""));
    }

    #[test]
    fn hanging_line_left_empty_when_first_word_cannot_fit() {
        let mgr = FontManager::default();
        let spec = FontSpec::new(BUILTIN_FAMILY, 10.0);
        let lines = wrap_text_hanging("Kubernetes Terraform", &spec, 5.0, 500.0, &mgr);
        assert_eq!(lines, vec!["".to_string(), "Kubernetes Terraform".to_string()]);
    }

    #[test]
    fn invalid_font_bytes_are_rejected() {
        let mut mgr = FontManager::default();
        let err = mgr.load_font("Broken", false, false, vec![0, 1, 2, 3]);
        assert!(matches!(err, Err(ExportError::Font(_))));
    }
}
