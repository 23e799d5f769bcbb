//! PDF layout engine.
//!
//! PDF has no text flow of its own, so the engine walks the resume top to
//! bottom with an explicit vertical cursor. Every block is measured with the
//! same wrap routine used for drawing; when `cursor_y + block_height` would
//! cross `page_height - margin` a new page is opened and the cursor resets to
//! the top margin. Lines are checked individually as well, so a block taller
//! than a page flows across pages instead of being cut.

use crate::fonts::{wrap_text, wrap_text_hanging, FontManager, FontSpec};
use crate::format::{
    contact_line, format_date, format_date_range, strip_emphasis, DateFormat,
};
use crate::layout_config::{LayoutConfig, PageItem, PageLayout, RuleLine, TextRun};
use crate::model::{Achievements, Certification, Education, Job, Resume};
use crate::pipeline::ExportConfig;
use crate::sections::{plan, SectionKind, SectionPlan};

/// Default page margins in points.
pub const PAGE_MARGIN_PT: f32 = 40.0;

/// Default body line advance in points.
pub const LINE_HEIGHT_PT: f32 = 12.0;

const TEXT_COLOR: [f32; 3] = [0.0, 0.0, 0.0];
const MUTED_COLOR: [f32; 3] = [0.25, 0.25, 0.25];
const RULE_COLOR: [f32; 3] = [0.35, 0.35, 0.35];

const BLOCK_GAP: f32 = 2.0;
const JOB_GAP: f32 = 6.0;
const SECTION_GAP: f32 = 8.0;

/// Separator between the two ends of a date range in the PDF and preview.
pub const DATE_SEP: &str = " \u{2013} ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
}

/// Cursor-driven page builder.
pub struct PdfLayoutEngine<'a> {
    config: &'a ExportConfig,
    fonts: &'a FontManager,
    page_width: f32,
    page_height: f32,
    margin: f32,
    cursor_y: f32,
    pages: Vec<PageLayout>,
    current: PageLayout,
}

impl<'a> PdfLayoutEngine<'a> {
    pub fn new(config: &'a ExportConfig, fonts: &'a FontManager) -> Self {
        Self {
            config,
            fonts,
            page_width: config.effective_width(),
            page_height: config.effective_height(),
            margin: config.page_margin,
            cursor_y: config.page_margin,
            pages: Vec::new(),
            current: PageLayout::default(),
        }
    }

    pub fn cursor_y(&self) -> f32 {
        self.cursor_y
    }

    /// Number of pages opened so far, including the current one.
    pub fn page_count(&self) -> usize {
        self.pages.len() + 1
    }

    fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    fn bottom_limit(&self) -> f32 {
        self.page_height - self.margin
    }

    /// Start a new page when a block of `height` would cross the bottom
    /// margin. A page that holds nothing yet is never abandoned. Returns
    /// whether a break happened.
    pub fn ensure_space(&mut self, height: f32) -> bool {
        if self.cursor_y + height > self.bottom_limit() && !self.current.items.is_empty() {
            self.new_page();
            return true;
        }
        false
    }

    fn new_page(&mut self) {
        let index = self.pages.len() + 1;
        log::debug!(
            "page break at cursor_y={:.1}, opening page {}",
            self.cursor_y,
            index + 1
        );
        let finished = std::mem::replace(
            &mut self.current,
            PageLayout {
                page_index: index,
                items: Vec::new(),
            },
        );
        self.pages.push(finished);
        self.cursor_y = self.margin;
    }

    fn advance(&mut self, dy: f32) {
        self.cursor_y += dy;
    }

    fn spec(&self, size: f32) -> FontSpec {
        FontSpec::new(&self.config.font_family, size)
    }

    fn body(&self) -> FontSpec {
        self.spec(self.config.body_font_size)
    }

    /// Line advance for a font: the configured line height, or more for
    /// fonts too large to fit in it.
    fn line_height_for(&self, spec: &FontSpec) -> f32 {
        self.config.line_height.max(spec.size * 1.2)
    }

    fn width(&self, text: &str, spec: &FontSpec) -> f32 {
        self.fonts.measure_text_width(text, spec)
    }

    fn push_text(&mut self, x: f32, text: &str, spec: &FontSpec, color: [f32; 3]) {
        if text.is_empty() {
            return;
        }
        self.current.items.push(PageItem::Text(TextRun {
            x,
            y: self.cursor_y,
            text: text.to_string(),
            font_family: spec.family.clone(),
            font_size: spec.size,
            bold: spec.bold,
            italic: spec.italic,
            color,
        }));
    }

    fn push_rule(&mut self, y: f32, thickness: f32) {
        self.current.items.push(PageItem::Rule(RuleLine {
            x1: self.margin,
            x2: self.page_width - self.margin,
            y,
            thickness,
            color: RULE_COLOR,
        }));
    }

    /// Draw wrapped text at `indent` from the left margin (or centred),
    /// advancing the cursor one line at a time.
    fn wrapped(&mut self, text: &str, spec: &FontSpec, indent: f32, align: Align, color: [f32; 3]) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let lh = self.line_height_for(spec);
        let lines = wrap_text(text, spec, self.content_width() - indent, self.fonts);
        self.ensure_space(lines.len() as f32 * lh);
        for line in lines {
            self.ensure_space(lh);
            let x = match align {
                Align::Left => self.margin + indent,
                Align::Center => {
                    self.margin + ((self.content_width() - self.width(&line, spec)) / 2.0).max(0.0)
                }
            };
            self.push_text(x, &line, spec, color);
            self.advance(lh);
        }
    }

    /// Left text and right-aligned text sharing one baseline.
    fn split_line(&mut self, left: &str, left_spec: &FontSpec, right: &str, right_spec: &FontSpec) {
        let left = left.trim();
        let right = right.trim();
        if left.is_empty() && right.is_empty() {
            return;
        }
        let lh = self.line_height_for(left_spec).max(self.line_height_for(right_spec));
        self.ensure_space(lh);

        let right_w = self.width(right, right_spec);
        let right_x = self.page_width - self.margin - right_w;
        let gap = if right.is_empty() { 0.0 } else { 8.0 };
        let left_room = (right_x - self.margin - gap).max(self.content_width() * 0.4);

        let mut lines = wrap_text(left, left_spec, left_room, self.fonts).into_iter();
        let first = lines.next().unwrap_or_default();
        let margin = self.margin;
        self.push_text(margin, &first, left_spec, TEXT_COLOR);
        self.push_text(right_x, right, right_spec, TEXT_COLOR);
        self.advance(lh);
        for line in lines {
            self.ensure_space(lh);
            self.push_text(margin, &line, left_spec, TEXT_COLOR);
            self.advance(lh);
        }
    }

    /// One bulleted, word-wrapped accomplishment.
    fn bullet(&mut self, text: &str) {
        let text = strip_emphasis(text.trim());
        if text.is_empty() {
            return;
        }
        let spec = self.body();
        let lh = self.line_height_for(&spec);
        let indent = self.config.bullet_indent;
        let lines = wrap_text(&text, &spec, self.content_width() - indent, self.fonts);

        self.ensure_space(lines.len() as f32 * lh);
        let marker_x = self.margin + indent * 0.3;
        self.push_text(marker_x, "\u{2022}", &spec, TEXT_COLOR);
        for line in lines {
            self.ensure_space(lh);
            let x = self.margin + indent;
            self.push_text(x, &line, &spec, TEXT_COLOR);
            self.advance(lh);
        }
        self.advance(BLOCK_GAP);
    }

    /// Bold uppercase title followed by a horizontal rule.
    fn section_header(&mut self, title: &str) {
        let spec = self.spec(self.config.section_font_size).bold();
        let lh = self.line_height_for(&spec);
        // Keep the header with at least two lines of what follows.
        if self.cursor_y > self.margin {
            self.advance(SECTION_GAP);
        }
        self.ensure_space(lh + 4.0 + 2.0 * self.config.line_height);
        let x = self.margin;
        self.push_text(x, &title.to_uppercase(), &spec, TEXT_COLOR);
        self.advance(lh);
        let rule_y = self.cursor_y + 1.0;
        self.push_rule(rule_y, 0.75);
        self.advance(4.0);
    }

    /// Bold lead-in followed by wrapped body text on the same line.
    fn labelled(&mut self, label: &str, body: &str) {
        let body = strip_emphasis(body.trim());
        let label_spec = self.body().bold();
        let spec = self.body();
        let lh = self.line_height_for(&spec);
        let lead = format!("{label}: ");
        let lead_w = self.width(&lead, &label_spec);
        let width = self.content_width();
        let lines = wrap_text_hanging(&body, &spec, width - lead_w, width, self.fonts);

        self.ensure_space(lines.len() as f32 * lh);
        let x = self.margin;
        self.push_text(x, &lead, &label_spec, TEXT_COLOR);
        for (i, line) in lines.into_iter().enumerate() {
            self.ensure_space(lh);
            let line_x = if i == 0 { x + lead_w } else { x };
            self.push_text(line_x, &line, &spec, TEXT_COLOR);
            self.advance(lh);
        }
        self.advance(BLOCK_GAP);
    }

    // -----------------------------------------------------------------------
    // Resume sections
    // -----------------------------------------------------------------------

    fn header(&mut self, resume: &Resume) {
        let h = &resume.header;
        let name = self.spec(self.config.name_font_size).bold();
        self.wrapped(&h.full_name(), &name, 0.0, Align::Center, TEXT_COLOR);
        let title = self.spec(self.config.title_font_size);
        self.wrapped(&h.job_title, &title, 0.0, Align::Center, TEXT_COLOR);
        let contact = self.spec(self.config.contact_font_size);
        self.wrapped(&contact_line(h), &contact, 0.0, Align::Center, MUTED_COLOR);
    }

    fn summary(&mut self, resume: &Resume) {
        self.section_header(SectionKind::Summary.title());
        let body = self.body();
        let paragraph = strip_emphasis(&resume.summary.paragraph);
        self.wrapped(&paragraph, &body, 0.0, Align::Left, TEXT_COLOR);
        if !paragraph.trim().is_empty() {
            self.advance(BLOCK_GAP);
        }
        for b in &resume.summary.bullets {
            self.bullet(b);
        }
    }

    fn job(&mut self, job: &Job) {
        let body = self.body();
        let lh = self.line_height_for(&body);
        // Company and title lines plus the first bullet stay together.
        self.ensure_space(3.0 * lh);

        let dates = format_date_range(
            job.start_date.as_ref(),
            job.end_date.as_ref(),
            job.is_current,
            DateFormat::Short,
            DATE_SEP,
        );
        self.split_line(&job.company_name, &body.clone().bold(), &dates, &body);
        self.split_line(
            &job.job_title,
            &body.clone().bold().italic(),
            &job.location,
            &body.clone().italic(),
        );
        if let Some(ctx) = &job.role_context {
            let ctx = strip_emphasis(ctx);
            self.wrapped(&ctx, &body.clone().italic(), 0.0, Align::Left, MUTED_COLOR);
        }
        self.advance(BLOCK_GAP);

        match &job.achievements {
            Achievements::Legacy(items) => {
                for a in items {
                    self.bullet(&a.description);
                }
            }
            Achievements::Thematic(buckets) => {
                for bucket in buckets {
                    let name = bucket.bucket_name.trim();
                    if !name.is_empty() {
                        self.ensure_space(2.0 * lh);
                        let spec = body.clone().bold();
                        self.wrapped(name, &spec, 0.0, Align::Left, TEXT_COLOR);
                    }
                    for b in &bucket.bullets {
                        self.bullet(b);
                    }
                }
            }
        }
        self.advance(JOB_GAP - BLOCK_GAP);
    }

    fn education(&mut self, edu: &Education) {
        let body = self.body();
        let date = format_date(edu.graduation_date.as_ref(), DateFormat::Short);
        self.split_line(&edu.institution, &body.clone().bold(), &date, &body);
        self.split_line(&edu.degree_line(), &body.clone().italic(), &edu.location, &body.clone().italic());
        for d in &edu.details {
            self.bullet(d);
        }
        self.advance(BLOCK_GAP);
    }

    fn certification(&mut self, cert: &Certification) {
        let body = self.body();
        let date = format_date(cert.date.as_ref(), DateFormat::Short);
        self.split_line(&cert.label(), &body, &date, &body);
    }

    fn section(&mut self, kind: SectionKind, resume: &Resume, plan: &SectionPlan) {
        match kind {
            SectionKind::Summary => self.summary(resume),
            SectionKind::Experience => {
                self.section_header(kind.title());
                for job in &resume.work_experience {
                    self.job(job);
                }
            }
            SectionKind::Education => {
                self.section_header(kind.title());
                for edu in &resume.education {
                    self.education(edu);
                }
                if plan.certifications_in_education {
                    let spec = self.body().bold();
                    self.ensure_space(2.0 * self.config.line_height);
                    self.wrapped(
                        SectionKind::Certifications.title(),
                        &spec,
                        0.0,
                        Align::Left,
                        TEXT_COLOR,
                    );
                    for cert in &resume.certifications {
                        self.certification(cert);
                    }
                }
            }
            SectionKind::Certifications => {
                self.section_header(kind.title());
                for cert in &resume.certifications {
                    self.certification(cert);
                }
            }
            SectionKind::Skills => {
                self.section_header(kind.title());
                for group in &resume.skills {
                    let items: Vec<&str> = group
                        .items
                        .iter()
                        .map(|s| s.trim())
                        .filter(|s| !s.is_empty())
                        .collect();
                    if items.is_empty() {
                        continue;
                    }
                    let body = items.join(", ");
                    if group.heading.trim().is_empty() {
                        let spec = self.body();
                        self.wrapped(&body, &spec, 0.0, Align::Left, TEXT_COLOR);
                    } else {
                        self.labelled(group.heading.trim(), &body);
                    }
                }
            }
        }
    }

    /// Close the last page and freeze the layout.
    pub fn finish(mut self) -> LayoutConfig {
        if !self.current.items.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        LayoutConfig {
            title: String::new(),
            page_width_pt: self.page_width,
            page_height_pt: self.page_height,
            pages: self.pages,
        }
    }
}

/// Lay out a whole resume into pages.
pub fn layout_resume(resume: &Resume, config: &ExportConfig, fonts: &FontManager) -> LayoutConfig {
    let plan = plan(resume);
    let mut engine = PdfLayoutEngine::new(config, fonts);
    engine.header(resume);
    for kind in &plan.sections {
        engine.section(*kind, resume, &plan);
    }
    let layout = engine.finish();
    log::debug!("laid out {} page(s)", layout.pages.len());
    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples;

    fn layout(resume: &Resume) -> LayoutConfig {
        let config = ExportConfig::default();
        layout_resume(resume, &config, &FontManager::default())
    }

    #[test]
    fn short_resume_fits_one_page() {
        let l = layout(&samples::legacy_resume());
        assert_eq!(l.pages.len(), 1);
    }

    #[test]
    fn everything_stays_inside_margins() {
        let l = layout(&samples::long_resume(90));
        assert!(l.pages.len() > 1);
        for page in &l.pages {
            for t in page.texts() {
                assert!(t.y >= PAGE_MARGIN_PT - 0.01, "{t:?}");
                assert!(t.y + LINE_HEIGHT_PT <= l.page_height_pt - PAGE_MARGIN_PT + 0.01, "{t:?}");
                assert!(t.x >= PAGE_MARGIN_PT - 0.01);
            }
        }
    }

    #[test]
    fn new_page_resumes_at_top_margin() {
        let l = layout(&samples::long_resume(90));
        for page in &l.pages[1..] {
            let first = page.texts().next().expect("page has text");
            assert!((first.y - PAGE_MARGIN_PT).abs() < 0.01, "first y = {}", first.y);
        }
    }

    #[test]
    fn no_accomplishment_is_dropped() {
        let n = 90;
        let l = layout(&samples::long_resume(n));
        let starts = l
            .text_runs()
            .filter(|t| t.text.starts_with("Accomplishment "))
            .count();
        assert_eq!(starts, n);
        let bullets = l.text_runs().filter(|t| t.text == "\u{2022}").count();
        assert_eq!(bullets, n);
    }

    #[test]
    fn bullet_block_is_not_split_when_it_fits() {
        let config = ExportConfig::default();
        let fonts = FontManager::default();
        let mut engine = PdfLayoutEngine::new(&config, &fonts);
        engine.cursor_y = engine.bottom_limit() - LINE_HEIGHT_PT;
        engine.push_text(40.0, "filler", &FontSpec::new("Helvetica", 10.0), TEXT_COLOR);
        let long = "word ".repeat(60);
        engine.bullet(&long);
        let l = engine.finish();
        assert_eq!(l.pages.len(), 2);
        assert_eq!(l.pages[0].texts().count(), 1);
    }

    #[test]
    fn ensure_space_keeps_empty_page() {
        let config = ExportConfig::default();
        let fonts = FontManager::default();
        let mut engine = PdfLayoutEngine::new(&config, &fonts);
        assert!(!engine.ensure_space(10_000.0));
        assert_eq!(engine.page_count(), 1);
    }

    #[test]
    fn company_and_dates_share_a_line() {
        let l = layout(&samples::legacy_resume());
        let runs: Vec<&TextRun> = l.text_runs().collect();
        let company = runs.iter().find(|t| t.text == "Globex").unwrap();
        let dates = runs
            .iter()
            .find(|t| t.text == "Mar 2021 \u{2013} Present")
            .expect("current job renders Present");
        assert_eq!(company.y, dates.y);
        assert!(company.bold);
        let fonts = FontManager::default();
        let spec = FontSpec::new("Helvetica", 10.0);
        let right_edge = dates.x + fonts.measure_text_width(&dates.text, &spec);
        assert!((right_edge - (l.page_width_pt - PAGE_MARGIN_PT)).abs() < 0.01);
    }

    #[test]
    fn title_line_is_bold_italic() {
        let l = layout(&samples::legacy_resume());
        let title = l.text_runs().find(|t| t.text == "Staff Engineer").unwrap();
        assert!(title.bold && title.italic);
    }

    #[test]
    fn section_headers_are_uppercase_with_rule() {
        let l = layout(&samples::legacy_resume());
        let page = &l.pages[0];
        for title in ["SUMMARY", "EXPERIENCE", "EDUCATION", "CERTIFICATIONS", "SKILLS"] {
            assert!(page.texts().any(|t| t.text == title && t.bold), "missing {title}");
        }
        assert_eq!(page.rules().count(), 5);
    }

    #[test]
    fn exported_text_has_no_bold_markers() {
        let l = layout(&samples::legacy_resume());
        assert!(l.text_runs().all(|t| !t.text.contains("**")));
    }

    #[test]
    fn thematic_resume_follows_preview_plan() {
        let l = layout(&samples::thematic_resume());
        let texts: Vec<&str> = l.text_runs().map(|t| t.text.as_str()).collect();
        assert!(!texts.contains(&"SUMMARY"));
        assert!(!texts.contains(&"SKILLS"));
        assert!(texts.contains(&"Team Building"));
        assert!(texts.contains(&"Certifications"));
    }

    #[test]
    fn skill_heading_is_bold_lead_in() {
        let l = layout(&samples::legacy_resume());
        let lead = l.text_runs().find(|t| t.text == "Languages: ").unwrap();
        assert!(lead.bold);
        let body = l.text_runs().find(|t| t.text == "Rust, Go, TypeScript").unwrap();
        assert_eq!(lead.y, body.y);
        assert!(body.x > lead.x);
    }

    #[test]
    fn long_urls_stay_inside_right_margin() {
        let url = format!("https://github.com/acme/{}", "platform-tooling/".repeat(6));
        let mut resume = samples::legacy_resume();
        resume.header.links.push(url.clone());
        resume.work_experience[0].achievements = Achievements::Legacy(vec![
            crate::model::Accomplishment {
                description: format!("Published the migration guide at {url} for every team"),
            },
        ]);

        let fonts = FontManager::default();
        let l = layout_resume(&resume, &ExportConfig::default(), &fonts);
        let right_edge = l.page_width_pt - PAGE_MARGIN_PT;
        for run in l.text_runs() {
            let spec = FontSpec {
                family: run.font_family.clone(),
                size: run.font_size,
                bold: run.bold,
                italic: run.italic,
            };
            let end = run.x + fonts.measure_text_width(&run.text, &spec);
            assert!(end <= right_edge + 0.01, "{} ends at {end}", run.text);
        }
        let joined: String = l.text_runs().map(|t| t.text.as_str()).collect();
        assert!(joined.contains("platform-tooling"));
    }
}
