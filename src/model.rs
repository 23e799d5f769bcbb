//! Resume data model.
//!
//! The model mirrors the JSON document handed over by the upstream tailoring
//! step. Every field defaults when absent so that a partially filled resume
//! still exports; the pipeline only ever reads it.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::format::{format_date, DateFormat, PRESENT};

/// Reads a JSON `null` as the field's default. `#[serde(default)]` alone
/// only covers keys that are absent.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Root resume document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resume {
    #[serde(deserialize_with = "null_as_default")]
    pub header: Header,
    #[serde(deserialize_with = "null_as_default")]
    pub summary: Summary,
    #[serde(deserialize_with = "null_as_default")]
    pub work_experience: Vec<Job>,
    #[serde(deserialize_with = "null_as_default")]
    pub education: Vec<Education>,
    #[serde(deserialize_with = "null_as_default")]
    pub certifications: Vec<Certification>,
    #[serde(deserialize_with = "null_as_default")]
    pub skills: Vec<SkillGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Header {
    #[serde(deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub job_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub linkedin_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub portfolio_url: String,
    /// Additional profile links (GitHub, personal site, ...).
    #[serde(deserialize_with = "null_as_default")]
    pub links: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    #[serde(deserialize_with = "null_as_default")]
    pub paragraph: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bullets: Vec<String>,
}

/// A calendar month. `month` is 1-indexed; zero means unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub month: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub year: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Accomplishment {
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
}

/// A labelled group of bullets under one job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThematicBucket {
    #[serde(deserialize_with = "null_as_default")]
    pub bucket_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bullets: Vec<String>,
}

/// The two accomplishment shapes a job can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum Achievements {
    /// Flat ordered list of accomplishments.
    Legacy(Vec<Accomplishment>),
    /// Bullets grouped under named themes.
    Thematic(Vec<ThematicBucket>),
}

impl Default for Achievements {
    fn default() -> Self {
        Achievements::Legacy(Vec::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "JobRecord", into = "JobRecord")]
pub struct Job {
    pub company_name: String,
    pub job_title: String,
    pub location: String,
    pub start_date: Option<DateInfo>,
    pub end_date: Option<DateInfo>,
    /// When set, `end_date` is ignored and rendered as "Present".
    pub is_current: bool,
    /// Optional italic preamble shown under the title line.
    pub role_context: Option<String>,
    pub achievements: Achievements,
}

/// Wire shape of a job: both accomplishment shapes side by side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct JobRecord {
    #[serde(deserialize_with = "null_as_default")]
    company_name: String,
    #[serde(deserialize_with = "null_as_default")]
    job_title: String,
    #[serde(deserialize_with = "null_as_default")]
    location: String,
    start_date: Option<DateInfo>,
    end_date: Option<DateInfo>,
    #[serde(deserialize_with = "null_as_default")]
    is_current: bool,
    role_context: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    accomplishments: Vec<Accomplishment>,
    #[serde(deserialize_with = "null_as_default")]
    thematic_buckets: Vec<ThematicBucket>,
}

impl From<JobRecord> for Job {
    fn from(r: JobRecord) -> Self {
        let achievements = if r.thematic_buckets.is_empty() {
            Achievements::Legacy(r.accomplishments)
        } else {
            Achievements::Thematic(r.thematic_buckets)
        };
        let role_context = r.role_context.filter(|s| !s.trim().is_empty());
        Job {
            company_name: r.company_name,
            job_title: r.job_title,
            location: r.location,
            start_date: r.start_date,
            end_date: r.end_date,
            is_current: r.is_current,
            role_context,
            achievements,
        }
    }
}

impl From<Job> for JobRecord {
    fn from(j: Job) -> Self {
        let (accomplishments, thematic_buckets) = match j.achievements {
            Achievements::Legacy(items) => (items, Vec::new()),
            Achievements::Thematic(buckets) => (Vec::new(), buckets),
        };
        JobRecord {
            company_name: j.company_name,
            job_title: j.job_title,
            location: j.location,
            start_date: j.start_date,
            end_date: j.end_date,
            is_current: j.is_current,
            role_context: j.role_context,
            accomplishments,
            thematic_buckets,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    #[serde(deserialize_with = "null_as_default")]
    pub institution: String,
    #[serde(deserialize_with = "null_as_default")]
    pub degree: String,
    #[serde(deserialize_with = "null_as_default")]
    pub field_of_study: String,
    #[serde(deserialize_with = "null_as_default")]
    pub location: String,
    pub graduation_date: Option<DateInfo>,
    #[serde(deserialize_with = "null_as_default")]
    pub details: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certification {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub issuer: String,
    pub date: Option<DateInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillGroup {
    #[serde(deserialize_with = "null_as_default")]
    pub heading: String,
    #[serde(deserialize_with = "null_as_default")]
    pub items: Vec<String>,
}

impl Resume {
    /// Parse a resume from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// True when at least one job groups its bullets into thematic buckets.
    pub fn is_thematic(&self) -> bool {
        self.work_experience.iter().any(Job::is_thematic)
    }

    /// All skill items across every group, in document order.
    pub fn flattened_skills(&self) -> Vec<&str> {
        self.skills
            .iter()
            .flat_map(|g| g.items.iter())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl Header {
    pub fn full_name(&self) -> String {
        let first = self.first_name.trim();
        let last = self.last_name.trim();
        match (first.is_empty(), last.is_empty()) {
            (false, false) => format!("{first} {last}"),
            (false, true) => first.to_string(),
            (true, false) => last.to_string(),
            (true, true) => String::new(),
        }
    }
}

impl Summary {
    pub fn is_present(&self) -> bool {
        !self.paragraph.trim().is_empty() || self.bullets.iter().any(|b| !b.trim().is_empty())
    }
}

impl Job {
    /// "Present" for a current role whatever `end_date` holds, otherwise the
    /// formatted end date.
    pub fn end_label(&self, fmt: DateFormat) -> String {
        if self.is_current {
            PRESENT.to_string()
        } else {
            format_date(self.end_date.as_ref(), fmt)
        }
    }

    pub fn is_thematic(&self) -> bool {
        matches!(self.achievements, Achievements::Thematic(_))
    }

    /// Every bullet of the job in order, regardless of shape.
    pub fn flattened_bullets(&self) -> Vec<&str> {
        let bullets: Vec<&str> = match &self.achievements {
            Achievements::Legacy(items) => items.iter().map(|a| a.description.as_str()).collect(),
            Achievements::Thematic(buckets) => buckets
                .iter()
                .flat_map(|b| b.bullets.iter().map(String::as_str))
                .collect(),
        };
        bullets.into_iter().filter(|b| !b.trim().is_empty()).collect()
    }
}

impl Education {
    /// "Degree in Field", degrading to whichever half is present.
    pub fn degree_line(&self) -> String {
        let degree = self.degree.trim();
        let field = self.field_of_study.trim();
        match (degree.is_empty(), field.is_empty()) {
            (false, false) => format!("{degree} in {field}"),
            (false, true) => degree.to_string(),
            (true, false) => field.to_string(),
            (true, true) => String::new(),
        }
    }
}

impl Certification {
    pub fn label(&self) -> String {
        let name = self.name.trim();
        let issuer = self.issuer.trim();
        if issuer.is_empty() {
            name.to_string()
        } else if name.is_empty() {
            issuer.to_string()
        } else {
            format!("{name} - {issuer}")
        }
    }
}
