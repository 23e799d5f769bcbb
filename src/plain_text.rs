//! Plain-text rendering of a resume, used for copy-to-clipboard export.

use std::fmt::Write as _;

use crate::format::{contact_line, format_date, job_date_range, strip_emphasis, DateFormat};
use crate::model::{Achievements, Resume};

/// Width of the dash underline beneath each section header.
pub const UNDERLINE_WIDTH: usize = 40;

const BULLET: &str = "\u{2022} ";

/// Flatten a resume into a newline-delimited text block.
///
/// Sections appear in a fixed order: SUMMARY (when present), WORK
/// EXPERIENCE, EDUCATION, CERTIFICATIONS (when present), SKILLS.
pub fn resume_to_plain_text(resume: &Resume) -> String {
    let mut out = String::new();
    let header = &resume.header;

    push_line(&mut out, &header.full_name());
    push_line(&mut out, header.job_title.trim());
    push_line(&mut out, &contact_line(header));

    if resume.summary.is_present() {
        section(&mut out, "SUMMARY");
        push_line(&mut out, &strip_emphasis(resume.summary.paragraph.trim()));
        for b in &resume.summary.bullets {
            push_bullet(&mut out, b);
        }
    }

    section(&mut out, "WORK EXPERIENCE");
    for (i, job) in resume.work_experience.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        push_line(
            &mut out,
            &joined(job.company_name.trim(), &job_date_range(job, DateFormat::Short)),
        );
        push_line(&mut out, &joined(job.job_title.trim(), job.location.trim()));
        if let Some(ctx) = &job.role_context {
            push_line(&mut out, &strip_emphasis(ctx.trim()));
        }
        match &job.achievements {
            Achievements::Legacy(items) => {
                for a in items {
                    push_bullet(&mut out, &a.description);
                }
            }
            Achievements::Thematic(buckets) => {
                for bucket in buckets {
                    push_line(&mut out, bucket.bucket_name.trim());
                    for b in &bucket.bullets {
                        push_bullet(&mut out, b);
                    }
                }
            }
        }
    }

    section(&mut out, "EDUCATION");
    for edu in &resume.education {
        push_line(
            &mut out,
            &joined(
                edu.institution.trim(),
                &format_date(edu.graduation_date.as_ref(), DateFormat::Short),
            ),
        );
        push_line(&mut out, &joined(&edu.degree_line(), edu.location.trim()));
        for d in &edu.details {
            push_bullet(&mut out, d);
        }
    }

    if resume.certifications.iter().any(|c| !c.label().is_empty()) {
        section(&mut out, "CERTIFICATIONS");
        for cert in &resume.certifications {
            push_line(
                &mut out,
                &joined(&cert.label(), &format_date(cert.date.as_ref(), DateFormat::Short)),
            );
        }
    }

    section(&mut out, "SKILLS");
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
        let heading = group.heading.trim();
        if heading.is_empty() {
            push_line(&mut out, &items.join(", "));
        } else {
            push_line(&mut out, &format!("{heading}: {}", items.join(", ")));
        }
    }

    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    out.push('\n');
    out
}

fn section(out: &mut String, title: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "-".repeat(UNDERLINE_WIDTH));
}

fn push_line(out: &mut String, line: &str) {
    if !line.is_empty() {
        let _ = writeln!(out, "{line}");
    }
}

fn push_bullet(out: &mut String, text: &str) {
    let text = strip_emphasis(text.trim());
    if !text.is_empty() {
        let _ = writeln!(out, "{BULLET}{text}");
    }
}

fn joined(left: &str, right: &str) -> String {
    match (left.is_empty(), right.is_empty()) {
        (false, false) => format!("{left} | {right}"),
        (false, true) => left.to_string(),
        (true, _) => right.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples;

    #[test]
    fn sections_appear_in_order() {
        let resume = samples::legacy_resume();
        let text = resume_to_plain_text(&resume);
        let pos = |needle: &str| text.find(needle).unwrap_or_else(|| panic!("missing {needle}"));
        assert!(pos("SUMMARY") < pos("WORK EXPERIENCE"));
        assert!(pos("WORK EXPERIENCE") < pos("EDUCATION"));
        assert!(pos("EDUCATION") < pos("SKILLS"));
    }

    #[test]
    fn headers_are_underlined() {
        let text = resume_to_plain_text(&samples::legacy_resume());
        let dashes = "-".repeat(UNDERLINE_WIDTH);
        assert!(text.contains(&format!("WORK EXPERIENCE\n{dashes}\n")));
    }

    #[test]
    fn bullets_are_prefixed_and_stripped() {
        let text = resume_to_plain_text(&samples::legacy_resume());
        assert!(text.contains("\u{2022} "));
        assert!(!text.contains("**"));
    }

    #[test]
    fn skills_use_heading_colon_format() {
        let text = resume_to_plain_text(&samples::legacy_resume());
        assert!(text.contains("Languages: Rust, Go, TypeScript"));
    }

    #[test]
    fn current_job_shows_present() {
        let text = resume_to_plain_text(&samples::legacy_resume());
        assert!(text.contains("- Present"));
    }

    #[test]
    fn deterministic_output() {
        let resume = samples::thematic_resume();
        assert_eq!(resume_to_plain_text(&resume), resume_to_plain_text(&resume));
    }

    #[test]
    fn empty_resume_still_has_fixed_sections() {
        let text = resume_to_plain_text(&Resume::default());
        assert!(!text.contains("SUMMARY"));
        assert!(text.contains("WORK EXPERIENCE"));
        assert!(text.contains("SKILLS"));
        assert!(text.ends_with('\n'));
    }
}
