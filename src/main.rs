//! resume-forge – command-line resume exporter.
//!
//! Usage:
//!   resume-forge <resume.json> --company <name> [--format pdf|docx|txt|html|all]
//!                [--out-dir DIR] [--config FILE] [--landscape] [--layout-json FILE]
//!
//! Files are named `"{first} {last} - {job title} - {company}.{ext}"` and
//! written into `--out-dir` (default: the current directory). `--sample`
//! replaces the input file with a built-in resume.

use std::{fs, path::PathBuf, process};

use clap::{Parser, ValueEnum};

use resume_forge::pipeline::{compute_layout_config, export, DirectorySink, ExportConfig, ExportFormat};
use resume_forge::{samples, PageOrientation, Resume, Result};

/// Export a structured resume as PDF, DOCX, plain text or HTML preview
#[derive(Parser, Debug)]
#[command(name = "resume-forge")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Resume JSON file
    #[arg(required_unless_present = "sample")]
    input: Option<PathBuf>,

    /// Company the resume is tailored for; used in file names
    #[arg(short, long)]
    company: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = FormatArg::Pdf)]
    format: FormatArg,

    /// Directory to write into
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// JSON export configuration (page size, margins, fonts)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use landscape page orientation
    #[arg(short, long)]
    landscape: bool,

    /// Also write the computed PDF page layout as JSON
    #[arg(long)]
    layout_json: Option<PathBuf>,

    /// Use a built-in sample resume instead of an input file
    #[arg(long, value_enum, conflicts_with = "input")]
    sample: Option<SampleArg>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Pdf,
    Docx,
    Txt,
    Html,
    All,
}

impl FormatArg {
    fn formats(self) -> Vec<ExportFormat> {
        match self {
            FormatArg::Pdf => vec![ExportFormat::Pdf],
            FormatArg::Docx => vec![ExportFormat::Docx],
            FormatArg::Txt => vec![ExportFormat::Text],
            FormatArg::Html => vec![ExportFormat::Html],
            FormatArg::All => ExportFormat::ALL.to_vec(),
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SampleArg {
    Legacy,
    Thematic,
    Long,
}

fn load_resume(cli: &Cli) -> Result<Resume> {
    match (cli.sample, &cli.input) {
        (Some(SampleArg::Legacy), _) => Ok(samples::legacy_resume()),
        (Some(SampleArg::Thematic), _) => Ok(samples::thematic_resume()),
        (Some(SampleArg::Long), _) => Ok(samples::long_resume(120)),
        (None, Some(path)) => Resume::from_json(&fs::read_to_string(path)?),
        // clap enforces one of the two
        (None, None) => Ok(Resume::default()),
    }
}

fn run(cli: &Cli) -> Result<()> {
    let resume = load_resume(cli)?;

    let mut config = match &cli.config {
        Some(path) => ExportConfig::from_json_file(path)?,
        None => ExportConfig::default(),
    };
    if cli.landscape {
        config.orientation = PageOrientation::Landscape;
    }

    if let Some(path) = &cli.layout_json {
        let layout = compute_layout_config(&resume, &cli.company, &config)?;
        fs::write(path, layout.to_json())?;
        let pages = layout.pages.len();
        eprintln!(
            "Wrote layout '{}' ({} page{})",
            path.display(),
            pages,
            if pages == 1 { "" } else { "s" }
        );
    }

    let mut sink = DirectorySink::new(&cli.out_dir);
    for format in cli.format.formats() {
        let artifact = export(&resume, &cli.company, format, &config, &mut sink)?;
        eprintln!(
            "Wrote '{}' ({} bytes)",
            cli.out_dir.join(&artifact.filename).display(),
            artifact.bytes.len()
        );
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
