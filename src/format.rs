//! Text formatters shared by every export format: dates, contact lines,
//! inline emphasis markers and export file names.

use crate::model::{DateInfo, Header, Job};

const MONTHS_LONG: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Separator used between contact items.
pub const CONTACT_SEPARATOR: &str = " \u{00B7} ";

/// End label of a current role.
pub const PRESENT: &str = "Present";

/// Display granularity for a [`DateInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFormat {
    /// "Jan 2020"
    #[default]
    Short,
    /// "January 2020"
    Long,
    /// "2020"
    Year,
}

/// Format a month/year pair. Absent dates, a zero month or a zero year all
/// render as the empty string.
pub fn format_date(date: Option<&DateInfo>, fmt: DateFormat) -> String {
    let Some(d) = date else {
        return String::new();
    };
    if d.year == 0 || d.month == 0 || d.month > 12 {
        return String::new();
    }
    let idx = (d.month - 1) as usize;
    match fmt {
        DateFormat::Short => format!("{} {}", MONTHS_SHORT[idx], d.year),
        DateFormat::Long => format!("{} {}", MONTHS_LONG[idx], d.year),
        DateFormat::Year => d.year.to_string(),
    }
}

/// Format a start/end pair joined by `sep`. A current role always ends in
/// "Present" whatever `end` holds.
pub fn format_date_range(
    start: Option<&DateInfo>,
    end: Option<&DateInfo>,
    is_current: bool,
    fmt: DateFormat,
    sep: &str,
) -> String {
    let to = if is_current {
        PRESENT.to_string()
    } else {
        format_date(end, fmt)
    };
    join_range(format_date(start, fmt), to, sep)
}

/// Date range of a job using " - " as the separator.
pub fn job_date_range(job: &Job, fmt: DateFormat) -> String {
    join_range(format_date(job.start_date.as_ref(), fmt), job.end_label(fmt), " - ")
}

fn join_range(from: String, to: String, sep: &str) -> String {
    match (from.is_empty(), to.is_empty()) {
        (false, false) => format!("{from}{sep}{to}"),
        (false, true) => from,
        (true, false) => to,
        (true, true) => String::new(),
    }
}

/// City/state followed by email, phone and links, joined by " · ".
pub fn contact_line(header: &Header) -> String {
    contact_parts(header).join(CONTACT_SEPARATOR)
}

/// The non-blank contact items of a header, in display order.
pub fn contact_parts(header: &Header) -> Vec<String> {
    let city = header.city.trim();
    let state = header.state.trim();
    let location = match (city.is_empty(), state.is_empty()) {
        (false, false) => format!("{city}, {state}"),
        (false, true) => city.to_string(),
        (true, false) => state.to_string(),
        (true, true) => String::new(),
    };

    let mut parts = vec![location];
    parts.push(header.email.trim().to_string());
    parts.push(header.phone.trim().to_string());
    parts.push(header.linkedin_url.trim().to_string());
    parts.push(header.portfolio_url.trim().to_string());
    parts.extend(header.links.iter().map(|l| l.trim().to_string()));
    parts.retain(|p| !p.is_empty());
    parts
}

/// `"{first_name} {last_name} - {job_title} - {company}.{ext}"`.
pub fn export_filename(header: &Header, company: &str, ext: &str) -> String {
    format!(
        "{} {} - {} - {}.{}",
        header.first_name, header.last_name, header.job_title, company, ext
    )
}

// ---------------------------------------------------------------------------
// Inline emphasis
// ---------------------------------------------------------------------------

/// A run of inline text after `**bold**` parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(String),
}

/// Split `text` on matched `**...**` pairs. An opening marker without a
/// closing partner is kept as literal text.
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::new();
    let mut rest = text;
    let mut plain = String::new();

    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        match after_open.find("**") {
            Some(close) if close > 0 => {
                plain.push_str(&rest[..open]);
                if !plain.is_empty() {
                    out.push(Inline::Text(std::mem::take(&mut plain)));
                }
                out.push(Inline::Strong(after_open[..close].to_string()));
                rest = &after_open[close + 2..];
            }
            Some(_) => {
                // "****" carries no content; keep it verbatim.
                plain.push_str(&rest[..open + 4]);
                rest = &rest[open + 4..];
            }
            None => break,
        }
    }
    plain.push_str(rest);
    if !plain.is_empty() {
        out.push(Inline::Text(plain));
    }
    out
}

/// Remove matched `**` pairs, keeping their content. Stray asterisks stay.
pub fn strip_emphasis(text: &str) -> String {
    parse_inline(text)
        .into_iter()
        .map(|i| match i {
            Inline::Text(s) | Inline::Strong(s) => s,
        })
        .collect()
}
