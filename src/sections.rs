//! Section plan shared by the on-screen preview and the PDF layout engine.
//!
//! Both outputs must agree on which sections exist and where certifications
//! go, so the decision is made once here from the resume's schema mode.

use crate::model::Resume;

/// Schema mode of a whole resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeMode {
    /// Every job carries a flat accomplishment list.
    Legacy,
    /// At least one job groups bullets into thematic buckets.
    Thematic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Summary,
    Experience,
    Education,
    Certifications,
    Skills,
}

impl SectionKind {
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Summary => "Summary",
            SectionKind::Experience => "Experience",
            SectionKind::Education => "Education",
            SectionKind::Certifications => "Certifications",
            SectionKind::Skills => "Skills",
        }
    }
}

/// Ordered sections to render plus where certifications live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionPlan {
    pub mode: ResumeMode,
    pub sections: Vec<SectionKind>,
    /// Certifications are listed at the bottom of Education instead of
    /// getting a section of their own.
    pub certifications_in_education: bool,
}

impl SectionPlan {
    pub fn contains(&self, kind: SectionKind) -> bool {
        self.sections.contains(&kind)
    }
}

/// Decide the section layout for `resume`.
///
/// Thematic resumes drop the summary and the standalone skills section and
/// fold certifications into education. Legacy resumes keep every section
/// that has content.
pub fn plan(resume: &Resume) -> SectionPlan {
    let has_certs = resume.certifications.iter().any(|c| !c.label().is_empty());
    let has_skills = !resume.flattened_skills().is_empty();
    let has_education = !resume.education.is_empty();

    if resume.is_thematic() {
        let mut sections = vec![SectionKind::Experience];
        if has_education || has_certs {
            sections.push(SectionKind::Education);
        }
        return SectionPlan {
            mode: ResumeMode::Thematic,
            sections,
            certifications_in_education: has_certs,
        };
    }

    let mut sections = Vec::new();
    if resume.summary.is_present() {
        sections.push(SectionKind::Summary);
    }
    sections.push(SectionKind::Experience);
    if has_education {
        sections.push(SectionKind::Education);
    }
    if has_certs {
        sections.push(SectionKind::Certifications);
    }
    if has_skills {
        sections.push(SectionKind::Skills);
    }
    SectionPlan {
        mode: ResumeMode::Legacy,
        sections,
        certifications_in_education: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples;

    #[test]
    fn legacy_plan_keeps_all_sections() {
        let p = plan(&samples::legacy_resume());
        assert_eq!(p.mode, ResumeMode::Legacy);
        assert_eq!(
            p.sections,
            vec![
                SectionKind::Summary,
                SectionKind::Experience,
                SectionKind::Education,
                SectionKind::Certifications,
                SectionKind::Skills,
            ]
        );
        assert!(!p.certifications_in_education);
    }

    #[test]
    fn thematic_plan_suppresses_summary_and_skills() {
        let resume = samples::thematic_resume();
        assert!(resume.summary.is_present());
        let p = plan(&resume);
        assert_eq!(p.mode, ResumeMode::Thematic);
        assert!(!p.contains(SectionKind::Summary));
        assert!(!p.contains(SectionKind::Skills));
        assert!(!p.contains(SectionKind::Certifications));
        assert!(p.certifications_in_education);
    }

    #[test]
    fn thematic_certs_alone_still_open_education() {
        let mut resume = samples::thematic_resume();
        resume.education.clear();
        assert!(plan(&resume).contains(SectionKind::Education));
    }
}
