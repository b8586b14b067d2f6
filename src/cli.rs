// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Every crawl option can also come from an environment variable, which is
// handy when the tool runs inside a container or a CI job.
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{DEFAULT_MAX_PAGES, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "email-harvester",
    version = "0.1.0",
    about = "Crawl a website and collect every email address on it",
    long_about = "email-harvester starts from one page, follows links that stay on the same \
                  domain, and collects email addresses from page text and mailto: links."
)]
pub struct Cli {
    /// Show more diagnostics on stderr (-v = info, -vv = debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a website and collect email addresses
    ///
    /// Example: email-harvester crawl https://example.com --max-pages 5
    Crawl {
        /// Seed URL to start from (e.g., https://example.com)
        url: String,

        /// Maximum number of pages to fetch (capped at 20)
        #[arg(
            long,
            env = "EMAIL_HARVESTER_MAX_PAGES",
            default_value_t = DEFAULT_MAX_PAGES,
            value_parser = parse_page_budget
        )]
        max_pages: usize,

        /// Per-request timeout in seconds
        #[arg(long, env = "EMAIL_HARVESTER_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,

        /// User-Agent header sent with every request
        #[arg(long, env = "EMAIL_HARVESTER_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
        user_agent: String,

        /// Output results in JSON format instead of a report
        #[arg(long)]
        json: bool,
    },

    /// Extract email addresses from a local HTML file (no network)
    ///
    /// Example: email-harvester extract saved-page.html
    Extract {
        /// Path to the HTML file
        file: PathBuf,

        /// Output results in JSON format instead of a list
        #[arg(long)]
        json: bool,
    },
}

// A page budget of 0 would never fetch anything, so refuse it up front
fn parse_page_budget(value: &str) -> Result<usize, String> {
    let pages: usize = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;

    if pages == 0 {
        return Err("must be at least 1".to_string());
    }

    Ok(pages)
}
