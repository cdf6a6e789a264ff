use serde_json::{Map, Value};
use tracing::debug;

use crate::models::{JobPosting, Source};

/// Pulls a posting list out of raw model output: the first `[` through the
/// last `]` is treated as the candidate JSON array, and anything that fails
/// to parse yields an empty list rather than an error. Field values are
/// read leniently; a missing or wrong-typed field gets its default instead
/// of sinking the whole record.
pub fn extract_postings(raw: &str, batch_source: Source) -> Vec<JobPosting> {
    let (Some(start), Some(end)) = (raw.find('['), raw.rfind(']')) else {
        return Vec::new();
    };
    if end < start {
        return Vec::new();
    }

    let candidate = &raw[start..=end];
    let parsed: Value = match serde_json::from_str(candidate) {
        Ok(value) => value,
        Err(err) => {
            debug!(%err, "bracketed substring was not valid JSON");
            return Vec::new();
        }
    };
    let Some(items) = parsed.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| posting_from_value(item, batch_source))
        .collect()
}

fn posting_from_value(value: &Value, batch_source: Source) -> Option<JobPosting> {
    let obj = value.as_object()?;
    Some(JobPosting {
        title: str_field(obj, "title"),
        company: str_field(obj, "company"),
        location: str_field(obj, "location"),
        url: obj.get("url").and_then(Value::as_str).map(str::to_string),
        summary: str_field(obj, "summary"),
        tags: obj
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        match_score: obj.get("matchScore").and_then(Value::as_f64),
        // Back-fill with the batch's label when the model omitted the
        // source or wrote something unrecognizable.
        source: obj
            .get("source")
            .and_then(Value::as_str)
            .and_then(Source::from_loose)
            .unwrap_or(batch_source),
    })
}

fn str_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = r#"Here are the results you asked for:
[
  {
    "title": "BI Engineer",
    "company": "Acme, Inc.",
    "location": "Remote",
    "url": "https://acme.example/jobs/42",
    "summary": "Dashboards and pipelines",
    "tags": ["SQL", "AWS"],
    "matchScore": 0.85,
    "source": "Job Board"
  },
  {
    "title": "Analytics Engineer",
    "company": "Borealis",
    "location": "Denver, CO",
    "summary": "dbt modeling",
    "tags": [],
    "matchScore": 0.72
  }
]
Let me know if you want more."#;

    #[test]
    fn test_well_formed_array_passes_through() {
        let postings = extract_postings(WELL_FORMED, Source::CompanyPage);
        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].title, "BI Engineer");
        assert_eq!(postings[0].company, "Acme, Inc.");
        assert_eq!(postings[0].url.as_deref(), Some("https://acme.example/jobs/42"));
        assert_eq!(postings[0].tags, vec!["SQL", "AWS"]);
        assert_eq!(postings[0].match_score, Some(0.85));
        // Stated source wins over the batch label.
        assert_eq!(postings[0].source, Source::JobBoard);
        // Omitted source is back-filled from the batch.
        assert_eq!(postings[1].source, Source::CompanyPage);
        assert_eq!(postings[1].url, None);
    }

    #[test]
    fn test_no_bracket_pair_yields_empty() {
        assert!(extract_postings("no structured data here", Source::JobBoard).is_empty());
        assert!(extract_postings("", Source::JobBoard).is_empty());
        assert!(extract_postings("only open [ bracket", Source::JobBoard).is_empty());
        assert!(extract_postings("only close ] bracket", Source::JobBoard).is_empty());
    }

    #[test]
    fn test_reversed_brackets_yield_empty() {
        assert!(extract_postings("] backwards [", Source::JobBoard).is_empty());
    }

    #[test]
    fn test_malformed_json_inside_brackets_yields_empty() {
        assert!(extract_postings("[{not json at all}]", Source::JobBoard).is_empty());
        assert!(extract_postings("[{\"title\": }]", Source::JobBoard).is_empty());
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let postings = extract_postings(r#"[{"title": "BI Engineer"}]"#, Source::JobBoard);
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].company, "");
        assert_eq!(postings[0].location, "");
        assert_eq!(postings[0].match_score, None);
        assert_eq!(postings[0].effective_score(), 0.7);
        assert!(postings[0].tags.is_empty());
    }

    #[test]
    fn test_wrong_typed_fields_are_tolerated() {
        let raw = r#"[{
            "title": 42,
            "company": "Acme",
            "tags": "SQL, AWS",
            "matchScore": "high",
            "source": "LinkedIn"
        }]"#;
        let postings = extract_postings(raw, Source::CompanyPage);
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].title, "");
        assert_eq!(postings[0].company, "Acme");
        assert!(postings[0].tags.is_empty());
        assert_eq!(postings[0].match_score, None);
        assert_eq!(postings[0].source, Source::CompanyPage);
    }

    #[test]
    fn test_non_object_elements_are_skipped() {
        let raw = r#"[{"title": "Real"}, 17, "noise", null]"#;
        let postings = extract_postings(raw, Source::JobBoard);
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].title, "Real");
    }

    #[test]
    fn test_integer_scores_parse_as_floats() {
        let postings = extract_postings(r#"[{"title": "t", "matchScore": 1}]"#, Source::JobBoard);
        assert_eq!(postings[0].match_score, Some(1.0));
    }

    #[test]
    fn test_stray_trailing_bracket_defeats_the_slice() {
        // First [ to last ] spans the noise, so the parse fails and the
        // batch yields nothing. That is the documented best-effort policy.
        let raw = r#"[{"title": "t"}] and an aside ]"#;
        assert!(extract_postings(raw, Source::JobBoard).is_empty());
    }
}
