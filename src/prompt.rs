use anyhow::{Result, bail};

use crate::catalog::{Batch, BatchPayload};

/// Most postings the model may return for one query batch.
pub const QUERY_BATCH_CAP: usize = 4;

const OUTPUT_CONTRACT: &str = "\
Return ONLY a JSON array, with no prose before or after it and no code fences. \
Each element must be an object with these fields: \
\"title\", \"company\", \"location\", \"url\", \"summary\", \"tags\" (array of short strings), \
\"matchScore\" (0.0 to 1.0 against the profile), and \"source\".";

const PRIORITY_RULE: &str = "\
Prioritize fully remote positions first, then positions local to the candidate's area. \
Skip postings that are clearly closed or more than 30 days old.";

/// Renders one batch plus the candidate profile into the request string.
/// Pure string construction; the only rejected input is an empty batch.
pub fn build_prompt(batch: &Batch, profile: &str) -> Result<String> {
    if batch.is_empty() {
        bail!("batch '{}' has no queries or companies", batch.label);
    }

    match &batch.payload {
        BatchPayload::Queries(queries) => {
            let numbered: String = queries
                .iter()
                .enumerate()
                .map(|(i, q)| format!("{}. \"{}\"\n", i + 1, q))
                .collect();
            Ok(format!(
                "Use live web search to find job postings currently open on major job boards. \
                 Run each of these searches:\n{numbered}\n\
                 Candidate profile:\n{profile}\n\
                 {PRIORITY_RULE} Return at most {QUERY_BATCH_CAP} postings for this batch. \
                 Set \"source\" to \"Job Board\" on every posting.\n\n\
                 {OUTPUT_CONTRACT}"
            ))
        }
        BatchPayload::Companies(companies) => {
            let listed: String = companies
                .iter()
                .map(|c| format!("- {} ({}) - {}\n", c.name, c.url, c.tags.join(", ")))
                .collect();
            Ok(format!(
                "Use live web search to check the careers pages of these companies for \
                 open roles matching the candidate:\n{listed}\n\
                 Candidate profile:\n{profile}\n\
                 {PRIORITY_RULE} Only include roles that fit the profile's target roles and skills. \
                 Set \"source\" to \"Company Page\" on every posting.\n\n\
                 {OUTPUT_CONTRACT}"
            ))
        }
    }
}
