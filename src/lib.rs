//! # resume-forge – structured resume → PDF, DOCX, text and HTML preview
//!
//! This crate turns a [`model::Resume`] into every export format a job
//! application needs. Each generator is a pure function of the resume, the
//! target company and an [`pipeline::ExportConfig`]:
//!
//! 1. **Model** – the resume schema, legacy or thematic jobs ([`model`])
//! 2. **Format** – dates, contact line, filenames, `**bold**` parsing ([`format`])
//! 3. **Plan** – which sections appear and where certifications go ([`sections`])
//! 4. **Layout** – cursor-driven PDF pagination ([`layout`]) into a
//!    serialisable page description ([`layout_config`])
//! 5. **Render** – emit PDF bytes via printpdf ([`render`])
//! 6. **DOCX** – styled document tree ([`docx`]) packaged as OOXML ([`docx_package`])
//! 7. **Text / preview** – clipboard text ([`plain_text`]) and the on-screen
//!    HTML preview ([`preview`])
//!
//! [`pipeline`] ties these together and hands finished artifacts to an
//! [`pipeline::OutputSink`]. A C-compatible FFI surface is exposed via the
//! [`ffi`] module.

pub mod docx;
pub mod docx_package;
pub mod error;
pub mod ffi;
pub mod fonts;
pub mod format;
pub mod layout;
pub mod layout_config;
pub mod model;
pub mod pipeline;
pub mod plain_text;
pub mod preview;
pub mod render;
pub mod samples;
pub mod sections;

// Re-exports for convenience
pub use error::{ExportError, Result};
pub use model::Resume;
pub use pipeline::{
    export, generate_docx, generate_pdf, generate_plain_text, generate_preview_html,
    DirectorySink, ExportConfig, ExportFormat, MemorySink, OutputSink, PageOrientation,
};
