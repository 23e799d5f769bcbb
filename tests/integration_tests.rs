//! Integration tests for the resume export pipeline.
//!
//! These tests validate:
//! - File naming across formats
//! - PDF output exists, paginates and never drops content
//! - DOCX and text output is deterministic
//! - Legacy and thematic resumes agree between preview and PDF
//! - Output sinks write where they are told

use std::io::{Cursor, Read};

use sha2::{Digest, Sha256};

use resume_forge::layout::PAGE_MARGIN_PT;
use resume_forge::layout_config::LayoutConfig;
use resume_forge::model::{DateInfo, Job, Resume};
use resume_forge::pipeline::{
    build_artifact, compute_layout_config, export, generate_docx, generate_pdf,
    generate_plain_text, generate_preview_html, DirectorySink, ExportConfig, ExportFormat,
    MemorySink,
};
use resume_forge::render::render_pdf;
use resume_forge::{fonts::FontManager, samples};

// =====================================================================
// Helper
// =====================================================================

fn default_config() -> ExportConfig {
    ExportConfig::default()
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
    assert_eq!(&bytes[0..5], b"%PDF-", "Missing PDF header");
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn minimal_resume() -> Resume {
    Resume::from_json(
        r#"{"header": {"first_name": "Jane", "last_name": "Doe", "job_title": "Engineer"}}"#,
    )
    .unwrap()
}

fn all_text(layout: &LayoutConfig) -> Vec<String> {
    layout.text_runs().map(|r| r.text.clone()).collect()
}

// =====================================================================
// File naming
// =====================================================================

#[test]
fn filenames_follow_applicant_role_company() {
    let resume = minimal_resume();
    let mut sink = MemorySink::default();
    for format in [ExportFormat::Pdf, ExportFormat::Docx] {
        export(&resume, "Acme", format, &default_config(), &mut sink).unwrap();
    }
    let names: Vec<&str> = sink.artifacts.iter().map(|a| a.filename.as_str()).collect();
    assert_eq!(
        names,
        vec!["Jane Doe - Engineer - Acme.pdf", "Jane Doe - Engineer - Acme.docx"]
    );
}

#[test]
fn empty_resume_still_exports() {
    let resume = Resume::from_json("{}").unwrap();
    for format in ExportFormat::ALL {
        let artifact = build_artifact(&resume, "Acme", format, &default_config()).unwrap();
        assert!(!artifact.bytes.is_empty(), "{format:?}");
    }
}

// =====================================================================
// PDF
// =====================================================================

#[test]
fn legacy_resume_fits_one_page() {
    let (bytes, layout) = generate_pdf(&samples::legacy_resume(), "Acme", &default_config()).unwrap();
    assert_valid_pdf(&bytes);
    assert_eq!(layout.pages.len(), 1);
}

#[test]
fn current_job_renders_present_in_pdf() {
    let mut resume = minimal_resume();
    resume.work_experience.push(Job {
        company_name: "Acme".into(),
        start_date: Some(DateInfo { month: 1, year: 2020 }),
        end_date: Some(DateInfo { month: 12, year: 2019 }),
        is_current: true,
        ..Job::default()
    });
    let layout = compute_layout_config(&resume, "Acme", &default_config()).unwrap();
    let texts = all_text(&layout);
    assert!(texts.iter().any(|t| t == "Jan 2020 \u{2013} Present"), "{texts:?}");
    assert!(!texts.iter().any(|t| t.contains("Dec 2019")));
}

#[test]
fn long_accomplishment_list_paginates_without_loss() {
    let resume = samples::long_resume(120);
    let (bytes, layout) = generate_pdf(&resume, "Acme", &default_config()).unwrap();
    assert_valid_pdf(&bytes);
    assert!(layout.pages.len() > 1, "expected several pages");

    let joined = all_text(&layout).join(" ");
    for i in 1..=120 {
        assert!(
            joined.contains(&format!("Accomplishment {i}:")),
            "accomplishment {i} missing"
        );
    }

    let bottom = layout.page_height_pt - PAGE_MARGIN_PT;
    for page in &layout.pages[1..] {
        let top = page
            .texts()
            .map(|r| r.y)
            .fold(f32::INFINITY, f32::min);
        assert!((top - PAGE_MARGIN_PT).abs() < 0.01, "page starts at {top}");
    }
    for page in &layout.pages {
        for run in page.texts() {
            assert!(run.y + run.font_size <= bottom + 0.01, "run below margin: {}", run.text);
        }
    }
}

#[test]
fn thematic_pdf_omits_summary() {
    let layout = compute_layout_config(&samples::thematic_resume(), "Acme", &default_config()).unwrap();
    let texts = all_text(&layout);
    assert!(!texts.iter().any(|t| t == "SUMMARY"));
    assert!(texts.iter().any(|t| t == "Team Building"));
}

#[test]
fn layout_config_json_roundtrip() {
    let config = compute_layout_config(&samples::legacy_resume(), "Acme", &default_config()).unwrap();
    let json = config.to_json();
    let parsed = LayoutConfig::from_json(&json).unwrap();
    assert_eq!(config.pages.len(), parsed.pages.len());
    assert_eq!(config.title, parsed.title);
    assert!((config.page_width_pt - parsed.page_width_pt).abs() < 0.01);
}

#[test]
fn render_from_layout_config_json() {
    let config = compute_layout_config(&samples::thematic_resume(), "Acme", &default_config()).unwrap();
    let parsed = LayoutConfig::from_json(&config.to_json()).unwrap();
    let bytes = render_pdf(&parsed, &FontManager::default()).unwrap();
    assert_valid_pdf(&bytes);
}

#[test]
fn pdf_output_is_stable_in_size() {
    let resume = samples::legacy_resume();
    let (bytes1, _) = generate_pdf(&resume, "Acme", &default_config()).unwrap();
    let (bytes2, _) = generate_pdf(&resume, "Acme", &default_config()).unwrap();

    // printpdf embeds a document id and timestamps, so compare sizes only.
    let diff = (bytes1.len() as i64 - bytes2.len() as i64).unsigned_abs();
    assert!(
        diff < 200,
        "PDF outputs differ significantly: {} vs {} bytes",
        bytes1.len(),
        bytes2.len()
    );
}

// =====================================================================
// DOCX
// =====================================================================

#[test]
fn docx_is_byte_for_byte_deterministic() {
    let resume = samples::legacy_resume();
    let a = generate_docx(&resume, &default_config()).unwrap();
    let b = generate_docx(&resume, &default_config()).unwrap();
    assert_eq!(sha256_hex(&a), sha256_hex(&b));
}

#[test]
fn docx_document_flattens_thematic_buckets() {
    let bytes = generate_docx(&samples::thematic_resume(), &default_config()).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    assert!(xml.contains("Grew the team from 4 to 12 engineers"));
    assert!(xml.contains("Present"));
    assert!(!xml.contains(">Team Building<"));
}

// =====================================================================
// Plain text
// =====================================================================

#[test]
fn plain_text_sections_are_ordered() {
    let text = generate_plain_text(&samples::legacy_resume());
    let pos = |needle: &str| text.find(needle).unwrap_or_else(|| panic!("missing {needle}"));
    assert!(pos("SUMMARY") < pos("WORK EXPERIENCE"));
    assert!(pos("WORK EXPERIENCE") < pos("EDUCATION"));
    assert!(pos("EDUCATION") < pos("SKILLS"));
    assert!(text.contains("Languages: Rust, Go, TypeScript"));
}

#[test]
fn plain_text_is_deterministic() {
    let resume = samples::thematic_resume();
    let a = sha256_hex(generate_plain_text(&resume).as_bytes());
    let b = sha256_hex(generate_plain_text(&resume).as_bytes());
    assert_eq!(a, b);
}

// =====================================================================
// Preview
// =====================================================================

#[test]
fn preview_and_pdf_agree_on_sections() {
    for resume in [samples::legacy_resume(), samples::thematic_resume()] {
        let html = generate_preview_html(&resume);
        let layout = compute_layout_config(&resume, "Acme", &default_config()).unwrap();
        let texts = all_text(&layout);
        for title in ["Summary", "Experience", "Education", "Certifications", "Skills"] {
            let in_pdf = texts.iter().any(|t| t == &title.to_uppercase());
            let in_preview = html.contains(&format!(r#"<h2 class="section-title">{title}</h2>"#));
            assert_eq!(in_pdf, in_preview, "{title}");
        }
    }
}

// =====================================================================
// Sinks
// =====================================================================

#[test]
fn directory_sink_writes_every_format() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("exports");
    let mut sink = DirectorySink::new(&out);
    for format in ExportFormat::ALL {
        export(&minimal_resume(), "Acme", format, &default_config(), &mut sink).unwrap();
    }
    assert_eq!(sink.written().len(), 4);
    for ext in ["pdf", "docx", "txt", "html"] {
        let path = out.join(format!("Jane Doe - Engineer - Acme.{ext}"));
        assert!(path.exists(), "{} missing", path.display());
    }
}
