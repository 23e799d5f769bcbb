//! Sample resumes for testing and demonstration.
//!
//! Each sample exercises a different shape of the model: the flat legacy
//! schema, the thematic-bucket schema, and a resume long enough to paginate.

use crate::model::{Accomplishment, Achievements, DateInfo, Header, Job, Resume, SkillGroup};

/// Legacy resume: summary, flat accomplishments, standalone certifications.
pub const LEGACY_JSON: &str = r##"{
  "header": {
    "first_name": "Jane",
    "last_name": "Doe",
    "job_title": "Engineer",
    "city": "Austin",
    "state": "TX",
    "email": "jane.doe@example.com",
    "phone": "(512) 555-0100",
    "linkedin_url": "linkedin.com/in/janedoe",
    "links": ["github.com/janedoe"]
  },
  "summary": {
    "paragraph": "Backend engineer with a decade of experience building **reliable** distributed systems.",
    "bullets": ["Led teams of up to 8 engineers", "Comfortable across the stack"]
  },
  "work_experience": [
    {
      "company_name": "Globex",
      "job_title": "Staff Engineer",
      "location": "Remote",
      "start_date": {"month": 3, "year": 2021},
      "end_date": {"month": 6, "year": 2022},
      "is_current": true,
      "role_context": "Platform group supporting 40 product teams.",
      "accomplishments": [
        {"description": "Cut p99 latency by **45%** by redesigning the request router"},
        {"description": "Introduced a schema registry adopted by every service team"},
        {"description": "Mentored five engineers through promotion"}
      ]
    },
    {
      "company_name": "Initech",
      "job_title": "Senior Engineer",
      "location": "Dallas, TX",
      "start_date": {"month": 1, "year": 2017},
      "end_date": {"month": 2, "year": 2021},
      "is_current": false,
      "accomplishments": [
        {"description": "Migrated billing from a monolith to event-driven services"},
        {"description": "Owned on-call rotation for payment processing"}
      ]
    }
  ],
  "education": [
    {
      "institution": "University of Texas",
      "degree": "B.S.",
      "field_of_study": "Computer Science",
      "location": "Austin, TX",
      "graduation_date": {"month": 5, "year": 2014}
    }
  ],
  "certifications": [
    {"name": "Certified Kubernetes Administrator", "issuer": "CNCF", "date": {"month": 9, "year": 2020}}
  ],
  "skills": [
    {"heading": "Languages", "items": ["Rust", "Go", "TypeScript"]},
    {"heading": "Infrastructure", "items": ["Kubernetes", "Terraform", "PostgreSQL", "Kafka"]}
  ]
}"##;

/// Thematic (V3) resume: the first job groups bullets into buckets.
pub const THEMATIC_JSON: &str = r##"{
  "header": {
    "first_name": "Jane",
    "last_name": "Doe",
    "job_title": "Engineering Manager",
    "city": "Seattle",
    "state": "WA",
    "email": "jane.doe@example.com"
  },
  "summary": {
    "paragraph": "This paragraph must never reach the preview of a thematic resume.",
    "bullets": []
  },
  "work_experience": [
    {
      "company_name": "Globex",
      "job_title": "Engineering Manager",
      "location": "Seattle, WA",
      "start_date": {"month": 8, "year": 2020},
      "is_current": true,
      "thematic_buckets": [
        {"bucket_name": "Team Building", "bullets": ["Grew the team from 4 to **12** engineers", "Built a hiring loop with 90% offer acceptance"]},
        {"bucket_name": "Delivery", "bullets": ["Shipped the mobile checkout in one quarter"]}
      ]
    },
    {
      "company_name": "Initech",
      "job_title": "Senior Engineer",
      "location": "Portland, OR",
      "start_date": {"month": 2, "year": 2016},
      "end_date": {"month": 7, "year": 2020},
      "accomplishments": [
        {"description": "Rebuilt the search indexer"}
      ]
    }
  ],
  "education": [
    {
      "institution": "Oregon State University",
      "degree": "M.S.",
      "field_of_study": "Computer Science",
      "graduation_date": {"month": 6, "year": 2015}
    }
  ],
  "certifications": [
    {"name": "AWS Solutions Architect", "issuer": "Amazon"},
    {"name": "PMP", "issuer": "PMI", "date": {"month": 4, "year": 2019}}
  ],
  "skills": [
    {"heading": "Leadership", "items": ["Hiring", "Coaching", "Roadmapping"]}
  ]
}"##;

pub fn legacy_resume() -> Resume {
    parse_sample(LEGACY_JSON)
}

pub fn thematic_resume() -> Resume {
    parse_sample(THEMATIC_JSON)
}

/// A resume whose single job carries enough bullets to span several pages.
pub fn long_resume(bullets: usize) -> Resume {
    let accomplishments = (1..=bullets)
        .map(|i| Accomplishment {
            description: format!(
                "Accomplishment {i}: delivered a cross-team initiative that reduced operational \
                 toil, improved deployment frequency and documented the runbooks for on-call staff"
            ),
        })
        .collect();

    Resume {
        header: Header {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            job_title: "Engineer".into(),
            ..Header::default()
        },
        work_experience: vec![Job {
            company_name: "Globex".into(),
            job_title: "Principal Engineer".into(),
            location: "Remote".into(),
            start_date: Some(DateInfo { month: 1, year: 2010 }),
            is_current: true,
            achievements: Achievements::Legacy(accomplishments),
            ..Job::default()
        }],
        skills: vec![SkillGroup {
            heading: "Languages".into(),
            items: vec!["Rust".into(), "C++".into()],
        }],
        ..Resume::default()
    }
}

fn parse_sample(json: &str) -> Resume {
    match Resume::from_json(json) {
        Ok(r) => r,
        Err(e) => {
            log::warn!("sample resume failed to parse: {e}");
            Resume::default()
        }
    }
}
