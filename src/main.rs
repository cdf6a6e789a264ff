mod ai;
mod catalog;
mod export;
mod extract;
mod models;
mod prompt;
mod scan;
mod tui;
mod view;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use ai::AnthropicSearch;
use catalog::{batch_plan, SourceToggles, DEFAULT_COMPANIES, DEFAULT_PROFILE, DEFAULT_QUERIES};
use models::JobPosting;
use scan::Scout;
use view::{apply_view, stats, Filter, SortKey};

#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "AI-assisted job scanning - search, review, and export openings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scan and print the results
    Scan {
        /// Skip the job-board query batches
        #[arg(long)]
        no_job_boards: bool,

        /// Skip the company careers-page batches
        #[arg(long)]
        no_companies: bool,

        /// Candidate profile file (default: built-in profile)
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Filter the results (all, remote, local, job-board, company-page)
        #[arg(short, long, default_value = "all")]
        filter: String,

        /// Sort the results (match, company)
        #[arg(short, long, default_value = "match")]
        sort: String,

        /// Write the results to a dated CSV file in the current directory
        #[arg(long)]
        export: bool,

        /// Write the results to this CSV path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a scan, then browse the results interactively
    Browse {
        /// Skip the job-board query batches
        #[arg(long)]
        no_job_boards: bool,

        /// Skip the company careers-page batches
        #[arg(long)]
        no_companies: bool,

        /// Candidate profile file (default: built-in profile)
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Initial filter (all, remote, local, job-board, company-page)
        #[arg(short, long, default_value = "all")]
        filter: String,

        /// Initial sort (match, company)
        #[arg(short, long, default_value = "match")]
        sort: String,
    },

    /// Print the query catalog and company targets
    Sources {
        /// Show the plan with job boards disabled
        #[arg(long)]
        no_job_boards: bool,

        /// Show the plan with company pages disabled
        #[arg(long)]
        no_companies: bool,
    },

    /// Print the active candidate profile
    Profile {
        /// Candidate profile file (default: built-in profile)
        #[arg(short, long)]
        profile: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scout=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            no_job_boards,
            no_companies,
            profile,
            filter,
            sort,
            export,
            output,
        } => {
            let filter = Filter::parse(&filter)?;
            let sort = SortKey::parse(&sort)?;
            let profile = load_profile(profile.as_deref())?;
            let toggles = SourceToggles {
                job_boards: !no_job_boards,
                company_pages: !no_companies,
            };

            let scout = run_scan(toggles, &profile).await?;
            print_results(scout.current_postings(), filter, sort);

            if export || output.is_some() {
                let view = apply_view(scout.current_postings(), filter, sort);
                let path = output.unwrap_or_else(|| {
                    PathBuf::from(export::dated_filename(Local::now().date_naive()))
                });
                export::write_csv(&view, &path)?;
                println!("Exported {} rows to {}", view.len(), path.display());
            }
        }

        Commands::Browse {
            no_job_boards,
            no_companies,
            profile,
            filter,
            sort,
        } => {
            let filter = Filter::parse(&filter)?;
            let sort = SortKey::parse(&sort)?;
            let profile = load_profile(profile.as_deref())?;
            let toggles = SourceToggles {
                job_boards: !no_job_boards,
                company_pages: !no_companies,
            };

            let scout = run_scan(toggles, &profile).await?;
            tui::run_browse(scout.current_postings(), filter, sort)?;
        }

        Commands::Sources {
            no_job_boards,
            no_companies,
        } => {
            let toggles = SourceToggles {
                job_boards: !no_job_boards,
                company_pages: !no_companies,
            };

            println!(
                "Job board queries{}:",
                if toggles.job_boards { "" } else { " (disabled)" }
            );
            for query in DEFAULT_QUERIES {
                println!("  - {query}");
            }

            println!();
            println!(
                "Company targets{}:",
                if toggles.company_pages { "" } else { " (disabled)" }
            );
            println!("{:<18} {:<36} {}", "NAME", "URL", "TAGS");
            println!("{}", "-".repeat(76));
            for company in DEFAULT_COMPANIES {
                println!(
                    "{:<18} {:<36} {}",
                    company.name,
                    company.url,
                    company.tags.join(", ")
                );
            }

            let plan = batch_plan(toggles);
            println!();
            println!("Scan plan: {} batch(es)", plan.len());
            for batch in &plan {
                println!("  {}", batch.label);
            }
        }

        Commands::Profile { profile } => {
            let text = load_profile(profile.as_deref())?;
            println!("{text}");
        }
    }

    Ok(())
}

async fn run_scan(toggles: SourceToggles, profile: &str) -> Result<Scout> {
    let provider = AnthropicSearch::from_env()?;
    let plan = batch_plan(toggles);
    let mut scout = Scout::new(Box::new(provider), profile, plan);

    // Print each session log line as soon as it is appended.
    let mut printed = 0;
    scout
        .start(|session| {
            for line in &session.log[printed..] {
                println!("{line}");
            }
            printed = session.log.len();
        })
        .await;

    Ok(scout)
}

fn print_results(postings: &[JobPosting], filter: Filter, sort: SortKey) {
    let view = apply_view(postings, filter, sort);
    if view.is_empty() {
        println!("\nNo positions to show for filter '{}'.", filter.label());
    } else {
        println!();
        println!(
            "{:<6} {:<32} {:<20} {:<24} {:<12}",
            "MATCH", "TITLE", "COMPANY", "LOCATION", "SOURCE"
        );
        println!("{}", "-".repeat(98));
        for posting in &view {
            println!(
                "{:<6} {:<32} {:<20} {:<24} {:<12}",
                format!("{}%", (posting.effective_score() * 100.0).round() as u32),
                truncate(&posting.title, 30),
                truncate(&posting.company, 18),
                truncate(&posting.location, 22),
                posting.source.label()
            );
        }
    }

    let stats = stats(postings);
    println!(
        "\n{} found | {} remote | {} local | avg match {}%",
        stats.total, stats.remote, stats.local, stats.average_match_percent
    );
}

fn load_profile(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile file: {}", path.display())),
        None => Ok(DEFAULT_PROFILE.to_string()),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let short: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{short}...")
    }
}
