use anyhow::Result;
use tracing::{debug, warn};

use crate::ai::SearchProvider;
use crate::catalog::Batch;
use crate::extract::extract_postings;
use crate::models::JobPosting;
use crate::prompt::build_prompt;

/// Lifecycle of a scan session. A session is `Scanning` only while
/// `Scout::start` is actually driving batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    Idle,
    Scanning,
    Completed,
}

/// Everything a scan accumulates: status, a human-readable progress log,
/// and the postings gathered so far. Observers get a borrow of this after
/// every change, so partial results are visible mid-scan.
#[derive(Debug)]
pub struct ScanSession {
    pub status: ScanStatus,
    pub log: Vec<String>,
    pub postings: Vec<JobPosting>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self {
            status: ScanStatus::Idle,
            log: Vec::new(),
            postings: Vec::new(),
        }
    }
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives a scan: builds one prompt per batch, submits them strictly in
/// order, and folds whatever comes back into the session.
pub struct Scout {
    provider: Box<dyn SearchProvider>,
    profile: String,
    plan: Vec<Batch>,
    session: ScanSession,
}

impl Scout {
    pub fn new(
        provider: Box<dyn SearchProvider>,
        profile: impl Into<String>,
        plan: Vec<Batch>,
    ) -> Self {
        Self {
            provider,
            profile: profile.into(),
            plan,
            session: ScanSession::new(),
        }
    }

    pub fn status(&self) -> ScanStatus {
        self.session.status
    }

    pub fn current_postings(&self) -> &[JobPosting] {
        &self.session.postings
    }

    pub fn current_log(&self) -> &[String] {
        &self.session.log
    }

    /// Runs the full batch plan. Batch-level failures (transport errors,
    /// output that yields no postings) are logged and skipped; anything
    /// else ends the scan early with the results gathered so far. Either
    /// way the session lands in `Completed` and this never errors.
    ///
    /// `observe` is called after every session change. A `start` while a
    /// scan is already running (a cancelled caller can leave the session
    /// in `Scanning`) is ignored.
    pub async fn start<F>(&mut self, mut observe: F)
    where
        F: FnMut(&ScanSession),
    {
        if self.session.status == ScanStatus::Scanning {
            warn!("scan already in progress, start ignored");
            return;
        }

        self.session = ScanSession::new();
        self.session.status = ScanStatus::Scanning;
        self.push_log(
            format!("Scan started: {} batches queued", self.plan.len()),
            &mut observe,
        );

        if let Err(err) = self.run_batches(&mut observe).await {
            self.push_log(format!("Fatal error: {err:#}"), &mut observe);
        }

        self.session.status = ScanStatus::Completed;
        self.push_log(
            format!(
                "Scan complete: {} total positions found",
                self.session.postings.len()
            ),
            &mut observe,
        );
    }

    async fn run_batches<F>(&mut self, observe: &mut F) -> Result<()>
    where
        F: FnMut(&ScanSession),
    {
        let plan = self.plan.clone();
        for batch in &plan {
            self.push_log(format!("Searching {}...", batch.label), observe);
            let prompt = build_prompt(batch, &self.profile)?;
            let outcome = self.provider.search(&prompt).await;
            match outcome {
                Ok(raw) => {
                    let postings = extract_postings(&raw, batch.source());
                    if postings.is_empty() {
                        self.push_log(
                            format!("No structured results returned for {}", batch.label),
                            observe,
                        );
                    } else {
                        let found = postings.len();
                        self.session.postings.extend(postings);
                        self.push_log(
                            format!("{found} positions found via {}", batch.label),
                            observe,
                        );
                    }
                }
                Err(err) => {
                    warn!(batch = %batch.label, error = %err, "batch search failed");
                    self.push_log(
                        format!("Search failed for {}: {err}", batch.label),
                        observe,
                    );
                }
            }
        }
        Ok(())
    }

    fn push_log<F>(&mut self, line: String, observe: &mut F)
    where
        F: FnMut(&ScanSession),
    {
        debug!("{line}");
        self.session.log.push(line);
        observe(&self.session);
    }
}
