//! On-screen preview renderer.
//!
//! [`render_preview`] builds a small element tree that mirrors the PDF
//! layout: the same section plan, the same date ranges and the same bucket
//! grouping. Unlike the exporters, the preview honours `**bold**` markers and
//! renders them as `<strong>`.

use std::fmt::Write as _;

use crate::format::{contact_line, format_date, format_date_range, parse_inline, DateFormat, Inline};
use crate::layout::DATE_SEP;
use crate::model::{Achievements, Certification, Education, Job, Resume};
use crate::sections::{plan, SectionKind, SectionPlan};

// ---------------------------------------------------------------------------
// Tree types
// ---------------------------------------------------------------------------

/// Element tags used by the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Article,
    Header,
    Section,
    Div,
    H1,
    H2,
    H3,
    P,
    Ul,
    Li,
    Span,
}

impl Tag {
    pub fn name(self) -> &'static str {
        match self {
            Tag::Article => "article",
            Tag::Header => "header",
            Tag::Section => "section",
            Tag::Div => "div",
            Tag::H1 => "h1",
            Tag::H2 => "h2",
            Tag::H3 => "h3",
            Tag::P => "p",
            Tag::Ul => "ul",
            Tag::Li => "li",
            Tag::Span => "span",
        }
    }
}

/// A node in the preview tree.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewNode {
    Element {
        tag: Tag,
        class: Option<&'static str>,
        children: Vec<PreviewNode>,
    },
    Text(String),
    Strong(String),
}

impl PreviewNode {
    fn el(tag: Tag, class: &'static str, children: Vec<PreviewNode>) -> Self {
        PreviewNode::Element {
            tag,
            class: Some(class),
            children,
        }
    }

    fn bare(tag: Tag, children: Vec<PreviewNode>) -> Self {
        PreviewNode::Element {
            tag,
            class: None,
            children,
        }
    }

    fn text(tag: Tag, class: &'static str, text: impl Into<String>) -> Self {
        Self::el(tag, class, vec![PreviewNode::Text(text.into())])
    }

    /// Find every element carrying `class`, depth first.
    pub fn find_class(&self, class: &str) -> Vec<&PreviewNode> {
        let mut out = Vec::new();
        self.collect_class(class, &mut out);
        out
    }

    fn collect_class<'a>(&'a self, wanted: &str, out: &mut Vec<&'a PreviewNode>) {
        if let PreviewNode::Element { class, children, .. } = self {
            if *class == Some(wanted) {
                out.push(self);
            }
            for c in children {
                c.collect_class(wanted, out);
            }
        }
    }

    /// Concatenated text content.
    pub fn text_content(&self) -> String {
        match self {
            PreviewNode::Text(s) | PreviewNode::Strong(s) => s.clone(),
            PreviewNode::Element { children, .. } => {
                children.iter().map(PreviewNode::text_content).collect()
            }
        }
    }

    /// Serialise as an HTML fragment.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            PreviewNode::Text(s) => out.push_str(&escape_html(s)),
            PreviewNode::Strong(s) => {
                let _ = write!(out, "<strong>{}</strong>", escape_html(s));
            }
            PreviewNode::Element { tag, class, children } => {
                match class {
                    Some(c) => {
                        let _ = write!(out, r#"<{} class="{c}">"#, tag.name());
                    }
                    None => {
                        let _ = write!(out, "<{}>", tag.name());
                    }
                }
                for child in children {
                    child.write_html(out);
                }
                let _ = write!(out, "</{}>", tag.name());
            }
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Text with `**bold**` spans turned into strong nodes.
fn rich(text: &str) -> Vec<PreviewNode> {
    parse_inline(text.trim())
        .into_iter()
        .map(|i| match i {
            Inline::Text(s) => PreviewNode::Text(s),
            Inline::Strong(s) => PreviewNode::Strong(s),
        })
        .collect()
}

fn bullet_list<'a>(items: impl IntoIterator<Item = &'a str>) -> PreviewNode {
    let items = items
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| PreviewNode::bare(Tag::Li, rich(s)))
        .collect();
    PreviewNode::el(Tag::Ul, "bullets", items)
}

/// Left/right pair on one row, like the PDF's split lines.
fn split_row(class: &'static str, left: &str, right: &str) -> PreviewNode {
    PreviewNode::el(
        Tag::Div,
        class,
        vec![
            PreviewNode::text(Tag::Span, "left", left.trim()),
            PreviewNode::text(Tag::Span, "right", right.trim()),
        ],
    )
}

fn section(kind: SectionKind, body: Vec<PreviewNode>) -> PreviewNode {
    let mut children = vec![PreviewNode::text(Tag::H2, "section-title", kind.title())];
    children.extend(body);
    let class = match kind {
        SectionKind::Summary => "summary",
        SectionKind::Experience => "experience",
        SectionKind::Education => "education",
        SectionKind::Certifications => "certifications",
        SectionKind::Skills => "skills",
    };
    PreviewNode::el(Tag::Section, class, children)
}

fn header(resume: &Resume) -> PreviewNode {
    let h = &resume.header;
    let mut children = vec![PreviewNode::text(Tag::H1, "name", h.full_name())];
    if !h.job_title.trim().is_empty() {
        children.push(PreviewNode::text(Tag::P, "title", h.job_title.trim()));
    }
    let contact = contact_line(h);
    if !contact.is_empty() {
        children.push(PreviewNode::text(Tag::P, "contact", contact));
    }
    PreviewNode::el(Tag::Header, "resume-header", children)
}

fn job(job: &Job) -> PreviewNode {
    let dates = format_date_range(
        job.start_date.as_ref(),
        job.end_date.as_ref(),
        job.is_current,
        DateFormat::Short,
        DATE_SEP,
    );
    let mut children = vec![
        split_row("job-heading", &job.company_name, &dates),
        split_row("job-subheading", &job.job_title, &job.location),
    ];
    if let Some(ctx) = &job.role_context {
        children.push(PreviewNode::el(Tag::P, "role-context", rich(ctx)));
    }
    match &job.achievements {
        Achievements::Legacy(items) => {
            children.push(bullet_list(items.iter().map(|a| a.description.as_str())));
        }
        Achievements::Thematic(buckets) => {
            for bucket in buckets {
                let mut group = Vec::new();
                if !bucket.bucket_name.trim().is_empty() {
                    group.push(PreviewNode::text(Tag::H3, "bucket-name", bucket.bucket_name.trim()));
                }
                group.push(bullet_list(bucket.bullets.iter().map(String::as_str)));
                children.push(PreviewNode::el(Tag::Div, "bucket", group));
            }
        }
    }
    PreviewNode::el(Tag::Div, "job", children)
}

fn education(edu: &Education) -> PreviewNode {
    let date = format_date(edu.graduation_date.as_ref(), DateFormat::Short);
    let mut children = vec![
        split_row("education-heading", &edu.institution, &date),
        split_row("education-subheading", &edu.degree_line(), &edu.location),
    ];
    if edu.details.iter().any(|d| !d.trim().is_empty()) {
        children.push(bullet_list(edu.details.iter().map(String::as_str)));
    }
    PreviewNode::el(Tag::Div, "education-entry", children)
}

fn certification(cert: &Certification) -> PreviewNode {
    let date = format_date(cert.date.as_ref(), DateFormat::Short);
    split_row("certification", &cert.label(), &date)
}

fn certifications(resume: &Resume) -> Vec<PreviewNode> {
    resume
        .certifications
        .iter()
        .filter(|c| !c.label().is_empty())
        .map(certification)
        .collect()
}

fn render_section(kind: SectionKind, resume: &Resume, plan: &SectionPlan) -> PreviewNode {
    match kind {
        SectionKind::Summary => {
            let mut body = Vec::new();
            if !resume.summary.paragraph.trim().is_empty() {
                body.push(PreviewNode::el(Tag::P, "summary-text", rich(&resume.summary.paragraph)));
            }
            if resume.summary.bullets.iter().any(|b| !b.trim().is_empty()) {
                body.push(bullet_list(resume.summary.bullets.iter().map(String::as_str)));
            }
            section(kind, body)
        }
        SectionKind::Experience => section(kind, resume.work_experience.iter().map(job).collect()),
        SectionKind::Education => {
            let mut body: Vec<PreviewNode> = resume.education.iter().map(education).collect();
            if plan.certifications_in_education {
                let mut certs = vec![PreviewNode::text(
                    Tag::H3,
                    "subsection-title",
                    SectionKind::Certifications.title(),
                )];
                certs.extend(certifications(resume));
                body.push(PreviewNode::el(Tag::Div, "education-certifications", certs));
            }
            section(kind, body)
        }
        SectionKind::Certifications => section(kind, certifications(resume)),
        SectionKind::Skills => {
            let groups = resume
                .skills
                .iter()
                .filter_map(|g| {
                    let items: Vec<&str> = g
                        .items
                        .iter()
                        .map(|s| s.trim())
                        .filter(|s| !s.is_empty())
                        .collect();
                    if items.is_empty() {
                        return None;
                    }
                    let mut children = Vec::new();
                    if !g.heading.trim().is_empty() {
                        children.push(PreviewNode::Strong(format!("{}: ", g.heading.trim())));
                    }
                    children.push(PreviewNode::Text(items.join(", ")));
                    Some(PreviewNode::el(Tag::P, "skill-group", children))
                })
                .collect();
            section(kind, groups)
        }
    }
}

/// Build the preview tree for `resume`.
pub fn render_preview(resume: &Resume) -> PreviewNode {
    let plan = plan(resume);
    let mut children = vec![header(resume)];
    children.extend(
        plan.sections
            .iter()
            .map(|&kind| render_section(kind, resume, &plan)),
    );
    PreviewNode::el(Tag::Article, "resume", children)
}

const PREVIEW_CSS: &str = "\
body { margin: 0; background: #f3f3f3; }
.resume { box-sizing: border-box; width: 595pt; min-height: 842pt; margin: 16px auto; padding: 40pt; background: #fff; font-family: Helvetica, Arial, sans-serif; font-size: 10pt; line-height: 12pt; color: #000; }
.resume-header { text-align: center; margin-bottom: 8pt; }
.name { font-size: 18pt; line-height: 22pt; margin: 0; }
.title { font-size: 11pt; margin: 2pt 0; }
.contact { font-size: 9pt; color: #404040; margin: 0; }
.section-title { font-size: 11pt; text-transform: uppercase; border-bottom: 0.75pt solid #595959; margin: 8pt 0 4pt; }
.job, .education-entry { margin-bottom: 6pt; }
.job-heading, .job-subheading, .education-heading, .education-subheading, .certification { display: flex; justify-content: space-between; }
.job-heading .left, .education-heading .left { font-weight: bold; }
.job-subheading .left { font-weight: bold; font-style: italic; }
.job-subheading .right, .education-subheading { font-style: italic; }
.role-context { font-style: italic; color: #404040; margin: 0; }
.bucket-name, .subsection-title { font-size: 10pt; margin: 2pt 0 0; }
.bullets { margin: 2pt 0; padding-left: 14pt; }
.summary-text, .skill-group { margin: 0 0 2pt; }
";

/// A standalone HTML document wrapping the preview tree.
pub fn preview_html(resume: &Resume) -> String {
    let title = escape_html(&resume.header.full_name());
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n{PREVIEW_CSS}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        render_preview(resume).to_html()
    )
}
