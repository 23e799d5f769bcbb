//! Pipeline – ties the model, the layout engine and the writers together
//! into one call per export format, plus the output sinks that stand in for
//! a browser download.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::docx::build_docx;
use crate::error::{ExportError, Result};
use crate::fonts::{FontManager, BUILTIN_FAMILY};
use crate::format::export_filename;
use crate::layout::{layout_resume, LINE_HEIGHT_PT, PAGE_MARGIN_PT};
use crate::layout_config::LayoutConfig;
use crate::model::Resume;
use crate::plain_text::resume_to_plain_text;
use crate::preview::preview_html;
use crate::render::render_pdf;

/// Page orientation for the generated PDF.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageOrientation {
    /// Portrait mode: height > width (default).
    #[default]
    Portrait,
    /// Landscape mode: width > height.
    Landscape,
}

/// Optional TrueType files replacing the built-in Helvetica faces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FontFiles {
    pub regular: Option<PathBuf>,
    pub bold: Option<PathBuf>,
    pub italic: Option<PathBuf>,
    pub bold_italic: Option<PathBuf>,
}

/// Configuration for every export format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Page width in points (default: A4 = 595.28).
    pub page_width: f32,
    /// Page height in points (default: A4 = 841.89).
    pub page_height: f32,
    /// Page margin in points (default: 40).
    pub page_margin: f32,
    /// Page orientation; swaps effective width/height when `Landscape`.
    pub orientation: PageOrientation,
    /// Body line advance in points (default: 12).
    pub line_height: f32,
    pub body_font_size: f32,
    pub name_font_size: f32,
    pub title_font_size: f32,
    pub contact_font_size: f32,
    pub section_font_size: f32,
    /// Distance from the left margin to bullet text.
    pub bullet_indent: f32,
    /// Font family used for measurement and drawing.
    pub font_family: String,
    pub font_files: FontFiles,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_width: 595.28,
            page_height: 841.89,
            page_margin: PAGE_MARGIN_PT,
            orientation: PageOrientation::Portrait,
            line_height: LINE_HEIGHT_PT,
            body_font_size: 10.0,
            name_font_size: 18.0,
            title_font_size: 11.0,
            contact_font_size: 9.0,
            section_font_size: 11.0,
            bullet_indent: 14.0,
            font_family: BUILTIN_FAMILY.to_string(),
            font_files: FontFiles::default(),
        }
    }
}

impl ExportConfig {
    /// Effective page width after applying orientation.
    pub fn effective_width(&self) -> f32 {
        match self.orientation {
            PageOrientation::Portrait => self.page_width,
            PageOrientation::Landscape => self.page_height,
        }
    }

    /// Effective page height after applying orientation.
    pub fn effective_height(&self) -> f32 {
        match self.orientation {
            PageOrientation::Portrait => self.page_height,
            PageOrientation::Landscape => self.page_width,
        }
    }

    /// Width between the left and right margins.
    pub fn content_width(&self) -> f32 {
        self.effective_width() - 2.0 * self.page_margin
    }

    /// Create an A4 landscape config.
    pub fn a4_landscape() -> Self {
        Self {
            orientation: PageOrientation::Landscape,
            ..Self::default()
        }
    }

    /// Load a config from a JSON file; absent keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| ExportError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject geometry that leaves no room for content.
    pub fn validate(&self) -> Result<()> {
        if self.page_width <= 0.0 || self.page_height <= 0.0 {
            return Err(ExportError::Config("page size must be positive".into()));
        }
        if self.page_margin < 0.0 || self.content_width() <= self.bullet_indent {
            return Err(ExportError::Config(format!(
                "margin {} leaves no room for content",
                self.page_margin
            )));
        }
        if self.line_height <= 0.0 || self.body_font_size <= 0.0 {
            return Err(ExportError::Config("font size and line height must be positive".into()));
        }
        Ok(())
    }

    /// Build the font manager: built-in faces plus any configured files.
    pub fn font_manager(&self) -> Result<FontManager> {
        let mut fonts = FontManager::default();
        let files = [
            (&self.font_files.regular, false, false),
            (&self.font_files.bold, true, false),
            (&self.font_files.italic, false, true),
            (&self.font_files.bold_italic, true, true),
        ];
        for (path, bold, italic) in files {
            if let Some(path) = path {
                let bytes = fs::read(path)?;
                fonts.load_font(&self.font_family, bold, italic, bytes)?;
            }
        }
        Ok(fonts)
    }
}

// ---------------------------------------------------------------------------
// Formats and artifacts
// ---------------------------------------------------------------------------

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Pdf,
    Docx,
    Text,
    Html,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Pdf,
        ExportFormat::Docx,
        ExportFormat::Text,
        ExportFormat::Html,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Text => "txt",
            ExportFormat::Html => "html",
        }
    }
}

/// A generated file: its name and content.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub format: ExportFormat,
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Destination for generated artifacts.
pub trait OutputSink {
    fn write(&mut self, artifact: &Artifact) -> Result<()>;
}

/// Writes artifacts into a directory, creating it if needed.
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Paths written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl OutputSink for DirectorySink {
    fn write(&mut self, artifact: &Artifact) -> Result<()> {
        if !self.dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.dir)?;
        }
        let path = self.dir.join(on_disk_name(&artifact.filename));
        fs::write(&path, &artifact.bytes)?;
        log::info!("wrote {} ({} bytes)", path.display(), artifact.bytes.len());
        self.written.push(path);
        Ok(())
    }
}

/// The artifact name with path separators and NUL replaced by `_`, so every
/// file lands directly inside the sink directory.
fn on_disk_name(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect()
}

/// Collects artifacts in memory.
#[derive(Default)]
pub struct MemorySink {
    pub artifacts: Vec<Artifact>,
}

impl OutputSink for MemorySink {
    fn write(&mut self, artifact: &Artifact) -> Result<()> {
        self.artifacts.push(artifact.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Lay out the resume without rendering – useful for testing pagination.
pub fn compute_layout_config(
    resume: &Resume,
    company: &str,
    config: &ExportConfig,
) -> Result<LayoutConfig> {
    config.validate()?;
    let fonts = config.font_manager()?;
    let mut layout = layout_resume(resume, config, &fonts);
    layout.title = pdf_title(resume, company);
    Ok(layout)
}

/// Resume → PDF bytes. Returns the layout alongside the bytes.
pub fn generate_pdf(
    resume: &Resume,
    company: &str,
    config: &ExportConfig,
) -> Result<(Vec<u8>, LayoutConfig)> {
    config.validate()?;
    let fonts = config.font_manager()?;
    let mut layout = layout_resume(resume, config, &fonts);
    layout.title = pdf_title(resume, company);
    let bytes = render_pdf(&layout, &fonts)?;
    log::debug!("pdf: {} pages, {} bytes", layout.pages.len(), bytes.len());
    Ok((bytes, layout))
}

/// Resume → DOCX package bytes.
pub fn generate_docx(resume: &Resume, config: &ExportConfig) -> Result<Vec<u8>> {
    config.validate()?;
    let doc = build_docx(resume, config);
    doc.to_bytes()
}

pub fn generate_plain_text(resume: &Resume) -> String {
    resume_to_plain_text(resume)
}

pub fn generate_preview_html(resume: &Resume) -> String {
    preview_html(resume)
}

/// Generate one artifact, named after the applicant, role and company.
pub fn build_artifact(
    resume: &Resume,
    company: &str,
    format: ExportFormat,
    config: &ExportConfig,
) -> Result<Artifact> {
    let bytes = match format {
        ExportFormat::Pdf => generate_pdf(resume, company, config)?.0,
        ExportFormat::Docx => generate_docx(resume, config)?,
        ExportFormat::Text => generate_plain_text(resume).into_bytes(),
        ExportFormat::Html => generate_preview_html(resume).into_bytes(),
    };
    Ok(Artifact {
        format,
        filename: export_filename(&resume.header, company, format.extension()),
        bytes,
    })
}

/// Generate an artifact and hand it to `sink`.
pub fn export(
    resume: &Resume,
    company: &str,
    format: ExportFormat,
    config: &ExportConfig,
    sink: &mut dyn OutputSink,
) -> Result<Artifact> {
    let artifact = build_artifact(resume, company, format, config)?;
    sink.write(&artifact)?;
    log::info!("exported {}", artifact.filename);
    Ok(artifact)
}

fn pdf_title(resume: &Resume, company: &str) -> String {
    let name = resume.header.full_name();
    let role = resume.header.job_title.trim();
    match (name.is_empty(), role.is_empty()) {
        (true, true) => format!("Resume - {company}"),
        (false, true) => format!("{name} - {company}"),
        (true, false) => format!("{role} - {company}"),
        (false, false) => format!("{name} - {role} - {company}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples;

    #[test]
    fn pipeline_basic() {
        let resume = samples::legacy_resume();
        let (bytes, layout) = generate_pdf(&resume, "Acme", &ExportConfig::default()).unwrap();
        assert!(!bytes.is_empty());
        assert!(!layout.pages.is_empty());
        assert_eq!(&bytes[0..5], b"%PDF-");
        assert_eq!(layout.title, "Jane Doe - Engineer - Acme");
    }

    #[test]
    fn landscape_swaps_dimensions() {
        let cfg = ExportConfig::a4_landscape();
        assert!(cfg.effective_width() > cfg.effective_height());
        let layout = compute_layout_config(&samples::legacy_resume(), "Acme", &cfg).unwrap();
        assert!((layout.page_width_pt - 841.89).abs() < 0.01);
    }

    #[test]
    fn invalid_margin_is_rejected() {
        let cfg = ExportConfig {
            page_margin: 400.0,
            ..ExportConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ExportError::Config(_))));
    }

    #[test]
    fn memory_sink_collects_named_artifacts() {
        let resume = samples::legacy_resume();
        let mut sink = MemorySink::default();
        export(&resume, "Acme", ExportFormat::Docx, &ExportConfig::default(), &mut sink).unwrap();
        export(&resume, "Acme", ExportFormat::Text, &ExportConfig::default(), &mut sink).unwrap();
        let names: Vec<&str> = sink.artifacts.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(
            names,
            vec!["Jane Doe - Engineer - Acme.docx", "Jane Doe - Engineer - Acme.txt"]
        );
    }

    #[test]
    fn missing_font_file_is_an_io_error() {
        let cfg = ExportConfig {
            font_files: FontFiles {
                regular: Some(PathBuf::from("/definitely/not/here.ttf")),
                ..FontFiles::default()
            },
            ..ExportConfig::default()
        };
        assert!(matches!(cfg.font_manager(), Err(ExportError::Io(_))));
    }

    #[test]
    fn directory_sink_keeps_separators_out_of_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        let resume = samples::legacy_resume();
        for company in ["AT&T / Mobility", "x/../../escaped", "Back\\slash"] {
            export(&resume, company, ExportFormat::Text, &ExportConfig::default(), &mut sink)
                .unwrap();
        }
        for path in sink.written() {
            assert_eq!(path.parent(), Some(dir.path()), "{}", path.display());
            assert!(path.exists());
        }
        assert!(dir
            .path()
            .join("Jane Doe - Engineer - AT&T _ Mobility.txt")
            .exists());
    }

    #[test]
    fn memory_sink_keeps_exact_filename() {
        let mut sink = MemorySink::default();
        export(
            &samples::legacy_resume(),
            "AT&T / Mobility",
            ExportFormat::Text,
            &ExportConfig::default(),
            &mut sink,
        )
        .unwrap();
        assert_eq!(sink.artifacts[0].filename, "Jane Doe - Engineer - AT&T / Mobility.txt");
    }
}
