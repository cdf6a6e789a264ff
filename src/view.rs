use std::cmp::Ordering;

use anyhow::{bail, Result};

use crate::models::{JobPosting, Source};

/// Which slice of the collection is shown. `Remote`/`Local` partition on
/// the location text; the source filters match the posting's origin tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    All,
    Remote,
    Local,
    JobBoard,
    CompanyPage,
}

impl Filter {
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "remote" => Ok(Filter::Remote),
            "local" => Ok(Filter::Local),
            "job-board" => Ok(Filter::JobBoard),
            "company-page" => Ok(Filter::CompanyPage),
            other => bail!(
                "unknown filter '{other}' (expected all, remote, local, job-board, or company-page)"
            ),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Remote => "remote",
            Filter::Local => "local",
            Filter::JobBoard => "job-board",
            Filter::CompanyPage => "company-page",
        }
    }

    /// Next filter in the cycle used by the browse screen.
    pub fn next(self) -> Self {
        match self {
            Filter::All => Filter::Remote,
            Filter::Remote => Filter::Local,
            Filter::Local => Filter::JobBoard,
            Filter::JobBoard => Filter::CompanyPage,
            Filter::CompanyPage => Filter::All,
        }
    }

    fn keeps(self, posting: &JobPosting) -> bool {
        match self {
            Filter::All => true,
            Filter::Remote => posting.is_remote(),
            Filter::Local => !posting.is_remote(),
            Filter::JobBoard => posting.source == Source::JobBoard,
            Filter::CompanyPage => posting.source == Source::CompanyPage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Effective match score, best first.
    Match,
    /// Company name, case-insensitive, A to Z.
    Company,
}

impl SortKey {
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "match" => Ok(SortKey::Match),
            "company" => Ok(SortKey::Company),
            other => bail!("unknown sort key '{other}' (expected match or company)"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Match => "match",
            SortKey::Company => "company",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            SortKey::Match => SortKey::Company,
            SortKey::Company => SortKey::Match,
        }
    }
}

/// Applies filter then sort and returns the resulting view. The input
/// order is preserved for ties (the sorts are stable) and the collection
/// itself is never touched; the view is recomputed on every call.
pub fn apply_view<'a>(
    postings: &'a [JobPosting],
    filter: Filter,
    sort: SortKey,
) -> Vec<&'a JobPosting> {
    let mut view: Vec<&JobPosting> = postings.iter().filter(|p| filter.keeps(p)).collect();
    match sort {
        SortKey::Match => view.sort_by(|a, b| {
            b.effective_score()
                .partial_cmp(&a.effective_score())
                .unwrap_or(Ordering::Equal)
        }),
        SortKey::Company => {
            view.sort_by(|a, b| a.company.to_lowercase().cmp(&b.company.to_lowercase()))
        }
    }
    view
}

/// Headline numbers for the whole collection. Always computed over the
/// unfiltered postings, whatever view is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub remote: usize,
    pub local: usize,
    pub average_match_percent: u32,
}

pub fn stats(postings: &[JobPosting]) -> Stats {
    let total = postings.len();
    let remote = postings.iter().filter(|p| p.is_remote()).count();
    let average_match_percent = if total == 0 {
        0
    } else {
        // Scores scale to exact whole percents, so a true 72.5% mean stays
        // 72.5 here; averaging raw scores lands on 72.4999... and rounds down.
        let sum: f64 = postings.iter().map(|p| p.effective_score() * 100.0).sum();
        (sum / total as f64).round() as u32
    };
    Stats {
        total,
        remote,
        local: total - remote,
        average_match_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(
        title: &str,
        company: &str,
        location: &str,
        score: Option<f64>,
        source: Source,
    ) -> JobPosting {
        JobPosting {
            title: title.to_string(),
            company: company.to_string(),
            location: location.to_string(),
            url: None,
            summary: String::new(),
            tags: Vec::new(),
            match_score: score,
            source,
        }
    }

    fn sample() -> Vec<JobPosting> {
        vec![
            posting("Analyst", "zeta", "Denver, CO", Some(0.5), Source::JobBoard),
            posting("BI Engineer", "Acme", "Remote", Some(0.9), Source::JobBoard),
            posting("Data Engineer", "Borealis", "Remote (US)", None, Source::CompanyPage),
            posting("Analytics Lead", "apex", "Boulder, CO (hybrid)", Some(0.8), Source::CompanyPage),
        ]
    }

    #[test]
    fn test_filter_all_keeps_everything_in_place() {
        let postings = sample();
        let view = apply_view(&postings, Filter::All, SortKey::Match);
        assert_eq!(view.len(), postings.len());
    }

    #[test]
    fn test_remote_and_local_partition_the_collection() {
        let postings = sample();
        let remote = apply_view(&postings, Filter::Remote, SortKey::Match);
        let local = apply_view(&postings, Filter::Local, SortKey::Match);
        assert_eq!(remote.len() + local.len(), postings.len());
        for p in &remote {
            assert!(p.is_remote());
        }
        for p in &local {
            assert!(!p.is_remote());
        }
    }

    #[test]
    fn test_source_filters_match_the_tag_exactly() {
        let postings = sample();
        let boards = apply_view(&postings, Filter::JobBoard, SortKey::Match);
        let pages = apply_view(&postings, Filter::CompanyPage, SortKey::Match);
        assert_eq!(boards.len(), 2);
        assert_eq!(pages.len(), 2);
        assert!(boards.iter().all(|p| p.source == Source::JobBoard));
        assert!(pages.iter().all(|p| p.source == Source::CompanyPage));
    }

    #[test]
    fn test_sort_match_is_non_increasing_with_default_applied() {
        let postings = sample();
        let view = apply_view(&postings, Filter::All, SortKey::Match);
        let scores: Vec<f64> = view.iter().map(|p| p.effective_score()).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        // The record without a score sorts as 0.7, between 0.8 and 0.5.
        assert_eq!(view[2].title, "Data Engineer");
    }

    #[test]
    fn test_sort_match_keeps_collection_order_on_ties() {
        let postings = vec![
            posting("First", "A", "Remote", Some(0.7), Source::JobBoard),
            posting("Second", "B", "Remote", None, Source::JobBoard),
            posting("Third", "C", "Remote", Some(0.7), Source::JobBoard),
        ];
        let view = apply_view(&postings, Filter::All, SortKey::Match);
        let titles: Vec<&str> = view.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_sort_company_ignores_case() {
        let postings = sample();
        let view = apply_view(&postings, Filter::All, SortKey::Company);
        let companies: Vec<&str> = view.iter().map(|p| p.company.as_str()).collect();
        assert_eq!(companies, vec!["Acme", "apex", "Borealis", "zeta"]);
    }

    #[test]
    fn test_view_does_not_reorder_the_collection() {
        let postings = sample();
        let _ = apply_view(&postings, Filter::Remote, SortKey::Company);
        assert_eq!(postings[0].title, "Analyst");
        assert_eq!(postings[3].title, "Analytics Lead");
    }

    #[test]
    fn test_stats_cover_the_unfiltered_collection() {
        let postings = sample();
        let stats = stats(&postings);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.remote, 2);
        assert_eq!(stats.local, 2);
        // (0.5 + 0.9 + 0.7 + 0.8) / 4 = 0.725 -> 73%.
        assert_eq!(stats.average_match_percent, 73);
    }

    #[test]
    fn test_stats_round_half_point_averages_up() {
        let postings = vec![
            posting("BI Engineer", "Acme", "Remote", Some(0.85), Source::JobBoard),
            posting("Data Analyst", "Borealis", "Remote", None, Source::CompanyPage),
        ];
        // (85 + 70) / 2 = 77.5 -> 78.
        assert_eq!(stats(&postings).average_match_percent, 78);
    }

    #[test]
    fn test_stats_on_empty_collection_are_zero() {
        let stats = stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.remote, 0);
        assert_eq!(stats.local, 0);
        assert_eq!(stats.average_match_percent, 0);
    }

    #[test]
    fn test_parse_round_trips_labels() {
        for filter in [
            Filter::All,
            Filter::Remote,
            Filter::Local,
            Filter::JobBoard,
            Filter::CompanyPage,
        ] {
            assert_eq!(Filter::parse(filter.label()).unwrap(), filter);
        }
        for sort in [SortKey::Match, SortKey::Company] {
            assert_eq!(SortKey::parse(sort.label()).unwrap(), sort);
        }
        assert!(Filter::parse("hybrid").is_err());
        assert!(SortKey::parse("salary").is_err());
    }

    #[test]
    fn test_filter_cycle_visits_every_filter_and_wraps() {
        let mut filter = Filter::All;
        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(filter);
            filter = filter.next();
        }
        assert_eq!(filter, Filter::All);
        assert_eq!(seen.len(), 5);
        assert_eq!(SortKey::Match.toggle(), SortKey::Company);
        assert_eq!(SortKey::Company.toggle(), SortKey::Match);
    }
}
