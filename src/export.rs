use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::models::JobPosting;

const CSV_HEADER: &str =
    "\"Title\",\"Company\",\"Location\",\"Match Score\",\"Source\",\"Tags\",\"Summary\",\"URL\"";

/// Renders the current view as CSV. Every field is quoted with internal
/// quotes doubled, tags are joined with "; ", and a missing URL renders
/// as an empty field. Pure string building; saving is `write_csv`.
pub fn csv_string(view: &[&JobPosting]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for posting in view {
        let fields = [
            posting.title.as_str(),
            posting.company.as_str(),
            posting.location.as_str(),
            &posting.effective_score().to_string(),
            posting.source.label(),
            &posting.tags.join("; "),
            posting.summary.as_str(),
            posting.url.as_deref().unwrap_or(""),
        ];
        let row: Vec<String> = fields.iter().map(|field| quoted(field)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Default export name for a given day, e.g. `job-scan-2026-08-22.csv`.
pub fn dated_filename(date: NaiveDate) -> String {
    format!("job-scan-{}.csv", date.format("%Y-%m-%d"))
}

pub fn write_csv(view: &[&JobPosting], path: &Path) -> Result<()> {
    fs::write(path, csv_string(view))
        .with_context(|| format!("Failed to write CSV export to {}", path.display()))
}

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
