//! DOCX document tree.
//!
//! [`build_docx`] projects a resume onto a small WordprocessingML model:
//! named paragraph styles, paragraphs made of runs, and one borderless table
//! for skills. Packaging into a `.docx` zip lives in [`crate::docx_package`],
//! so the tree can be inspected without touching bytes.

use crate::fonts::BUILTIN_FAMILY;
use crate::format::{contact_line, format_date, job_date_range, strip_emphasis, DateFormat};
use crate::model::Resume;
use crate::pipeline::ExportConfig;
use crate::sections::{plan, SectionKind};

/// Twentieths of a point per point.
const TWIPS_PER_PT: f32 = 20.0;

/// Number of columns in the skills table.
pub const SKILL_COLUMNS: usize = 3;

pub mod style_id {
    pub const APPLICANT_NAME: &str = "ApplicantName";
    pub const JOB_TITLE: &str = "JobTitle";
    pub const CONTACT_INFO: &str = "ContactInfo";
    pub const SECTION: &str = "Section";
    pub const JOB_HEADING: &str = "JobHeading";
    pub const JOB_SUBTITLE: &str = "JobSubtitle";
    pub const ROLE_CONTEXT: &str = "RoleContext";
    pub const LIST_BULLET: &str = "ListBullet";
    pub const BODY_TEXT: &str = "BodyText";
    pub const SKILL_ITEM: &str = "SkillItem";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justification {
    #[default]
    Left,
    Center,
}

/// A named paragraph style.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParagraphStyle {
    pub id: &'static str,
    pub name: &'static str,
    /// Font size in half-points.
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
    pub caps: bool,
    pub justification: Justification,
    pub bottom_border: bool,
    pub keep_next: bool,
    /// Spacing before/after in twips.
    pub space_before: u32,
    pub space_after: u32,
    /// Bullet list numbering attached to the style.
    pub bulleted: bool,
    /// Right-aligned tab stop at the text width.
    pub right_tab: bool,
}

/// A run of uniformly formatted text, or a tab.
#[derive(Debug, Clone, PartialEq)]
pub enum Run {
    Text { text: String, bold: bool, italic: bool },
    Tab,
}

impl Run {
    pub fn text(text: impl Into<String>) -> Self {
        Run::Text {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Run::Text {
            text: text.into(),
            bold: true,
            italic: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub style: &'static str,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new(style: &'static str, runs: Vec<Run>) -> Self {
        Self { style, runs }
    }

    /// Concatenated text of the paragraph, tabs rendered as `\t`.
    pub fn plain_text(&self) -> String {
        self.runs
            .iter()
            .map(|r| match r {
                Run::Text { text, .. } => text.as_str(),
                Run::Tab => "\t",
            })
            .collect()
    }
}

/// Borderless table laid out column by column.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

/// Page geometry in twips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSetup {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
}

impl PageSetup {
    /// Width between the margins; also the position of the right tab stop.
    pub fn text_width(&self) -> u32 {
        self.width.saturating_sub(2 * self.margin)
    }
}

/// A complete document ready for packaging.
#[derive(Debug, Clone, PartialEq)]
pub struct DocxDocument {
    pub font: String,
    pub page: PageSetup,
    pub styles: Vec<ParagraphStyle>,
    pub body: Vec<Block>,
}

impl DocxDocument {
    pub fn style(&self, id: &str) -> Option<&ParagraphStyle> {
        self.styles.iter().find(|s| s.id == id)
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }

    pub fn paragraphs_with_style<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Paragraph> {
        self.paragraphs().filter(move |p| p.style == id)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.body.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }
}

/// Split items across `n` columns by index. Column sizes differ by at most
/// one and the leading columns take the remainder.
pub fn split_columns<T: Clone>(items: &[T], n: usize) -> Vec<Vec<T>> {
    if n == 0 {
        return Vec::new();
    }
    let base = items.len() / n;
    let extra = items.len() % n;
    let mut out = Vec::with_capacity(n);
    let mut start = 0;
    for i in 0..n {
        let len = base + usize::from(i < extra);
        out.push(items[start..start + len].to_vec());
        start += len;
    }
    out
}

fn half_points(pt: f32) -> u32 {
    (pt * 2.0).round() as u32
}

fn named_styles(config: &ExportConfig) -> Vec<ParagraphStyle> {
    use style_id::*;
    let body = half_points(config.body_font_size);
    vec![
        ParagraphStyle {
            id: APPLICANT_NAME,
            name: "Applicant Name",
            size: half_points(config.name_font_size),
            bold: true,
            justification: Justification::Center,
            ..ParagraphStyle::default()
        },
        ParagraphStyle {
            id: JOB_TITLE,
            name: "Job Title",
            size: half_points(config.title_font_size),
            justification: Justification::Center,
            space_after: 40,
            ..ParagraphStyle::default()
        },
        ParagraphStyle {
            id: CONTACT_INFO,
            name: "Contact Info",
            size: half_points(config.contact_font_size),
            justification: Justification::Center,
            space_after: 120,
            ..ParagraphStyle::default()
        },
        ParagraphStyle {
            id: SECTION,
            name: "Section",
            size: half_points(config.section_font_size),
            bold: true,
            caps: true,
            bottom_border: true,
            keep_next: true,
            space_before: 200,
            space_after: 80,
            ..ParagraphStyle::default()
        },
        ParagraphStyle {
            id: JOB_HEADING,
            name: "Job Heading",
            size: body,
            keep_next: true,
            space_before: 80,
            right_tab: true,
            ..ParagraphStyle::default()
        },
        ParagraphStyle {
            id: JOB_SUBTITLE,
            name: "Job Subtitle",
            size: body,
            italic: true,
            keep_next: true,
            space_after: 40,
            right_tab: true,
            ..ParagraphStyle::default()
        },
        ParagraphStyle {
            id: ROLE_CONTEXT,
            name: "Role Context",
            size: body,
            italic: true,
            space_after: 40,
            ..ParagraphStyle::default()
        },
        ParagraphStyle {
            id: LIST_BULLET,
            name: "List Bullet",
            size: body,
            space_after: 20,
            bulleted: true,
            ..ParagraphStyle::default()
        },
        ParagraphStyle {
            id: BODY_TEXT,
            name: "Body Text",
            size: body,
            space_after: 40,
            right_tab: true,
            ..ParagraphStyle::default()
        },
        ParagraphStyle {
            id: SKILL_ITEM,
            name: "Skill Item",
            size: body,
            ..ParagraphStyle::default()
        },
    ]
}

/// Build the document tree for `resume`.
pub fn build_docx(resume: &Resume, config: &ExportConfig) -> DocxDocument {
    use style_id::*;

    let page = PageSetup {
        width: (config.effective_width() * TWIPS_PER_PT).round() as u32,
        height: (config.effective_height() * TWIPS_PER_PT).round() as u32,
        margin: (config.page_margin * TWIPS_PER_PT).round() as u32,
    };
    let font = if config.font_family == BUILTIN_FAMILY {
        "Arial".to_string()
    } else {
        config.font_family.clone()
    };

    let mut body: Vec<Block> = Vec::new();
    let mut para = |style: &'static str, runs: Vec<Run>| {
        body.push(Block::Paragraph(Paragraph::new(style, runs)));
    };

    let h = &resume.header;
    para(APPLICANT_NAME, vec![Run::text(h.full_name())]);
    if !h.job_title.trim().is_empty() {
        para(JOB_TITLE, vec![Run::text(h.job_title.trim())]);
    }
    let contact = contact_line(h);
    if !contact.is_empty() {
        para(CONTACT_INFO, vec![Run::text(contact)]);
    }

    if plan(resume).contains(SectionKind::Summary) {
        para(SECTION, vec![Run::text(SectionKind::Summary.title())]);
        let paragraph = strip_emphasis(resume.summary.paragraph.trim());
        if !paragraph.is_empty() {
            para(BODY_TEXT, vec![Run::text(paragraph)]);
        }
        for b in &resume.summary.bullets {
            let b = strip_emphasis(b.trim());
            if !b.is_empty() {
                para(LIST_BULLET, vec![Run::text(b)]);
            }
        }
    }

    para(SECTION, vec![Run::text(SectionKind::Experience.title())]);
    for job in &resume.work_experience {
        para(
            JOB_HEADING,
            vec![
                Run::bold(job.company_name.trim()),
                Run::Tab,
                Run::text(job_date_range(job, DateFormat::Short)),
            ],
        );
        para(
            JOB_SUBTITLE,
            vec![
                Run::text(job.job_title.trim()),
                Run::Tab,
                Run::text(job.location.trim()),
            ],
        );
        if let Some(ctx) = &job.role_context {
            para(ROLE_CONTEXT, vec![Run::text(strip_emphasis(ctx.trim()))]);
        }
        for bullet in job.flattened_bullets() {
            para(LIST_BULLET, vec![Run::text(strip_emphasis(bullet.trim()))]);
        }
    }

    if !resume.education.is_empty() {
        para(SECTION, vec![Run::text(SectionKind::Education.title())]);
        for edu in &resume.education {
            para(
                JOB_HEADING,
                vec![
                    Run::bold(edu.institution.trim()),
                    Run::Tab,
                    Run::text(format_date(edu.graduation_date.as_ref(), DateFormat::Short)),
                ],
            );
            para(
                JOB_SUBTITLE,
                vec![Run::text(edu.degree_line()), Run::Tab, Run::text(edu.location.trim())],
            );
            for d in &edu.details {
                let d = strip_emphasis(d.trim());
                if !d.is_empty() {
                    para(LIST_BULLET, vec![Run::text(d)]);
                }
            }
        }
    }

    let certs: Vec<_> = resume
        .certifications
        .iter()
        .filter(|c| !c.label().is_empty())
        .collect();
    if !certs.is_empty() {
        para(SECTION, vec![Run::text(SectionKind::Certifications.title())]);
        for cert in certs {
            para(
                BODY_TEXT,
                vec![
                    Run::text(cert.label()),
                    Run::Tab,
                    Run::text(format_date(cert.date.as_ref(), DateFormat::Short)),
                ],
            );
        }
    }

    let skills: Vec<String> = resume
        .flattened_skills()
        .into_iter()
        .map(String::from)
        .collect();
    if !skills.is_empty() {
        para(SECTION, vec![Run::text(SectionKind::Skills.title())]);
        body.push(Block::Table(Table {
            columns: split_columns(&skills, SKILL_COLUMNS),
        }));
    }

    DocxDocument {
        font,
        page,
        styles: named_styles(config),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Achievements, Job, SkillGroup};
    use crate::samples;

    fn sizes(n: usize) -> Vec<usize> {
        let items: Vec<usize> = (0..n).collect();
        split_columns(&items, 3).iter().map(Vec::len).collect()
    }

    #[test]
    fn column_split_sizes() {
        assert_eq!(sizes(12), vec![4, 4, 4]);
        assert_eq!(sizes(10), vec![4, 3, 3]);
        assert_eq!(sizes(11), vec![4, 4, 3]);
        assert_eq!(sizes(2), vec![1, 1, 0]);
        assert_eq!(sizes(0), vec![0, 0, 0]);
    }

    #[test]
    fn column_split_keeps_index_order() {
        let items: Vec<usize> = (0..10).collect();
        let cols = split_columns(&items, 3);
        assert_eq!(cols[0], vec![0, 1, 2, 3]);
        assert_eq!(cols[1], vec![4, 5, 6]);
        assert_eq!(cols[2], vec![7, 8, 9]);
    }

    #[test]
    fn skills_table_flattens_groups() {
        let mut resume = samples::legacy_resume();
        resume.skills = vec![SkillGroup {
            heading: "All".into(),
            items: (1..=12).map(|i| format!("S{i}")).collect(),
        }];
        let doc = build_docx(&resume, &ExportConfig::default());
        let table = doc.tables().next().unwrap();
        assert_eq!(table.columns.iter().map(Vec::len).collect::<Vec<_>>(), vec![4, 4, 4]);
    }

    #[test]
    fn named_styles_exist() {
        let doc = build_docx(&samples::legacy_resume(), &ExportConfig::default());
        for id in ["ApplicantName", "JobTitle", "ContactInfo", "Section"] {
            assert!(doc.style(id).is_some(), "missing {id}");
        }
        let name = doc.style("ApplicantName").unwrap();
        assert!(name.bold);
        assert_eq!(name.justification, Justification::Center);
        assert!(doc.style("Section").unwrap().bottom_border);
    }

    #[test]
    fn contact_uses_middle_dot() {
        let doc = build_docx(&samples::legacy_resume(), &ExportConfig::default());
        let contact = doc.paragraphs_with_style("ContactInfo").next().unwrap();
        assert!(contact.plain_text().starts_with("Austin, TX \u{00B7} jane.doe@example.com"));
    }

    #[test]
    fn current_job_shows_present_after_tab() {
        let doc = build_docx(&samples::legacy_resume(), &ExportConfig::default());
        let heading = doc.paragraphs_with_style("JobHeading").next().unwrap();
        assert_eq!(heading.plain_text(), "Globex\tMar 2021 - Present");
        assert!(matches!(&heading.runs[0], Run::Text { bold: true, .. }));
    }

    #[test]
    fn thematic_buckets_are_flattened_without_headers() {
        let doc = build_docx(&samples::thematic_resume(), &ExportConfig::default());
        let bullets: Vec<String> = doc
            .paragraphs_with_style("ListBullet")
            .map(Paragraph::plain_text)
            .collect();
        assert_eq!(bullets[0], "Grew the team from 4 to 12 engineers");
        assert!(doc.paragraphs().all(|p| p.plain_text() != "Team Building"));
    }

    #[test]
    fn thematic_resume_has_no_summary() {
        let doc = build_docx(&samples::thematic_resume(), &ExportConfig::default());
        assert!(doc
            .paragraphs_with_style("Section")
            .all(|p| p.plain_text() != "Summary"));
    }

    #[test]
    fn right_tab_sits_at_text_width() {
        let doc = build_docx(&samples::legacy_resume(), &ExportConfig::default());
        // (595.28 - 2 * 40) pt in twips
        assert_eq!(doc.page.text_width(), 11906 - 1600);
    }

    #[test]
    fn job_without_accomplishments_has_no_bullets() {
        let mut resume = samples::legacy_resume();
        resume.work_experience = vec![Job {
            company_name: "Solo".into(),
            achievements: Achievements::Legacy(vec![]),
            ..Job::default()
        }];
        resume.summary = Default::default();
        let doc = build_docx(&resume, &ExportConfig::default());
        assert_eq!(doc.paragraphs_with_style("ListBullet").count(), 0);
    }
}
