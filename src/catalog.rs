use crate::models::Source;

/// Queries per job-board batch. Six default queries make two batches.
pub const QUERY_BATCH_SIZE: usize = 3;

pub const DEFAULT_QUERIES: &[&str] = &[
    "remote business intelligence engineer jobs",
    "remote analytics engineer jobs",
    "senior BI developer jobs remote or hybrid",
    "data analyst SQL Python jobs remote",
    "Power BI developer jobs United States",
    "data visualization engineer jobs Denver",
];

#[derive(Debug, Clone, Copy)]
pub struct Company {
    pub name: &'static str,
    pub url: &'static str,
    pub tags: &'static [&'static str],
}

pub const DEFAULT_COMPANIES: &[Company] = &[
    Company {
        name: "Databricks",
        url: "https://www.databricks.com/company/careers",
        tags: &["data platform", "analytics"],
    },
    Company {
        name: "Snowflake",
        url: "https://careers.snowflake.com",
        tags: &["data warehouse", "cloud"],
    },
    Company {
        name: "dbt Labs",
        url: "https://www.getdbt.com/careers",
        tags: &["analytics engineering", "open source"],
    },
    Company {
        name: "Fivetran",
        url: "https://www.fivetran.com/careers",
        tags: &["data pipelines", "ELT"],
    },
    Company {
        name: "Grafana Labs",
        url: "https://grafana.com/about/careers/",
        tags: &["observability", "dashboards"],
    },
    Company {
        name: "Sigma Computing",
        url: "https://www.sigmacomputing.com/careers",
        tags: &["business intelligence", "cloud analytics"],
    },
    Company {
        name: "Atlassian",
        url: "https://www.atlassian.com/company/careers",
        tags: &["collaboration", "SaaS"],
    },
    Company {
        name: "HashiCorp",
        url: "https://www.hashicorp.com/careers",
        tags: &["infrastructure", "cloud"],
    },
];

/// The profile embedded verbatim in every prompt. Override with --profile.
pub const DEFAULT_PROFILE: &str = "\
Name: Jordan Velarde
Target roles: Business Intelligence Engineer, Analytics Engineer, Senior Data Analyst
Skills: SQL (advanced), Python, dbt, Power BI, Tableau, AWS (Redshift, Glue, S3), dimensional modeling, ELT pipeline design
Experience: 6 years building reporting platforms and self-serve analytics for SaaS and logistics companies; led a 40-dashboard migration to Power BI; dbt models serving 200+ weekly users
Certifications: AWS Certified Data Analytics - Specialty, Microsoft PL-300 (Power BI Data Analyst)
Preferences: remote-first (US time zones), open to hybrid within the Denver metro area; mid-size product companies preferred; no staffing agencies
";

#[derive(Debug, Clone)]
pub enum BatchPayload {
    Queries(Vec<String>),
    Companies(Vec<Company>),
}

/// One group of queries or companies submitted as a single prompt.
#[derive(Debug, Clone)]
pub struct Batch {
    pub label: String,
    pub payload: BatchPayload,
}

impl Batch {
    pub fn source(&self) -> Source {
        match self.payload {
            BatchPayload::Queries(_) => Source::JobBoard,
            BatchPayload::Companies(_) => Source::CompanyPage,
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.payload {
            BatchPayload::Queries(queries) => queries.is_empty(),
            BatchPayload::Companies(companies) => companies.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SourceToggles {
    pub job_boards: bool,
    pub company_pages: bool,
}

impl Default for SourceToggles {
    fn default() -> Self {
        Self {
            job_boards: true,
            company_pages: true,
        }
    }
}

/// Builds the ordered batch plan for one scan: job-board query batches
/// first, then the company batches split in two. Disabled sources
/// contribute nothing.
pub fn batch_plan(toggles: SourceToggles) -> Vec<Batch> {
    let mut plan = Vec::new();

    if toggles.job_boards {
        let chunks: Vec<&[&str]> = DEFAULT_QUERIES.chunks(QUERY_BATCH_SIZE).collect();
        let total = chunks.len();
        for (i, chunk) in chunks.into_iter().enumerate() {
            plan.push(Batch {
                label: format!("job boards (batch {}/{})", i + 1, total),
                payload: BatchPayload::Queries(
                    chunk.iter().map(|q| q.to_string()).collect(),
                ),
            });
        }
    }

    if toggles.company_pages {
        // First half (rounded up), then the rest.
        let split = DEFAULT_COMPANIES.len().div_ceil(2);
        let (first, rest) = DEFAULT_COMPANIES.split_at(split);
        for (i, group) in [first, rest].into_iter().enumerate() {
            if group.is_empty() {
                continue;
            }
            plan.push(Batch {
                label: format!("company careers pages (batch {}/2)", i + 1),
                payload: BatchPayload::Companies(group.to_vec()),
            });
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan_order_and_sources() {
        let plan = batch_plan(SourceToggles::default());
        assert_eq!(plan.len(), 4);
        assert_eq!(plan[0].source(), Source::JobBoard);
        assert_eq!(plan[1].source(), Source::JobBoard);
        assert_eq!(plan[2].source(), Source::CompanyPage);
        assert_eq!(plan[3].source(), Source::CompanyPage);
        assert!(plan.iter().all(|b| !b.is_empty()));
    }

    #[test]
    fn test_query_batches_respect_chunk_size() {
        let plan = batch_plan(SourceToggles {
            job_boards: true,
            company_pages: false,
        });
        for batch in &plan {
            match &batch.payload {
                BatchPayload::Queries(queries) => {
                    assert!(queries.len() <= QUERY_BATCH_SIZE)
                }
                BatchPayload::Companies(_) => panic!("company batch in job-board plan"),
            }
        }
        let total: usize = plan
            .iter()
            .map(|b| match &b.payload {
                BatchPayload::Queries(q) => q.len(),
                BatchPayload::Companies(_) => 0,
            })
            .sum();
        assert_eq!(total, DEFAULT_QUERIES.len());
    }

    #[test]
    fn test_disabled_sources_contribute_no_batches() {
        let plan = batch_plan(SourceToggles {
            job_boards: false,
            company_pages: true,
        });
        assert_eq!(plan.len(), 2);
        assert!(plan.iter().all(|b| b.source() == Source::CompanyPage));

        let plan = batch_plan(SourceToggles {
            job_boards: false,
            company_pages: false,
        });
        assert!(plan.is_empty());
    }

    #[test]
    fn test_company_split_covers_all_targets() {
        let plan = batch_plan(SourceToggles {
            job_boards: false,
            company_pages: true,
        });
        let total: usize = plan
            .iter()
            .map(|b| match &b.payload {
                BatchPayload::Companies(c) => c.len(),
                BatchPayload::Queries(_) => 0,
            })
            .sum();
        assert_eq!(total, DEFAULT_COMPANIES.len());
    }

    #[test]
    fn test_labels_number_the_batches() {
        let plan = batch_plan(SourceToggles::default());
        assert!(plan[0].label.contains("batch 1/2"));
        assert!(plan[1].label.contains("batch 2/2"));
        assert!(plan[2].label.contains("batch 1/2"));
    }
}
