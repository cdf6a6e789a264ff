use serde::Serialize;

/// Score assumed when the model returned a posting without one.
pub const DEFAULT_MATCH_SCORE: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Source {
    #[serde(rename = "Job Board")]
    JobBoard,
    #[serde(rename = "Company Page")]
    CompanyPage,
}

impl Source {
    pub fn label(&self) -> &'static str {
        match self {
            Source::JobBoard => "Job Board",
            Source::CompanyPage => "Company Page",
        }
    }

    /// Lenient parse of whatever the model wrote in the `source` field.
    /// "Job Board", "job_board", "JobBoard" all normalize to the same tag.
    pub fn from_loose(s: &str) -> Option<Source> {
        let normalized: String = s
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "jobboard" => Some(Source::JobBoard),
            "companypage" => Some(Source::CompanyPage),
            _ => None,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: Option<String>,
    pub summary: String,
    pub tags: Vec<String>,
    pub match_score: Option<f64>,
    pub source: Source,
}

impl JobPosting {
    pub fn effective_score(&self) -> f64 {
        self.match_score.unwrap_or(DEFAULT_MATCH_SCORE)
    }

    pub fn is_remote(&self) -> bool {
        self.location.to_lowercase().contains("remote")
    }
}
