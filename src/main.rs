// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging
// 3. Dispatch to the appropriate subcommand handler
// 4. Print the emails we found
// 5. Exit with proper code (0 = success, 1 = crawl reported an error,
//    2 = internal error)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - crawl settings and defaults
mod crawl; // src/crawl/ - website crawling logic
mod error; // src/error.rs - fetch and crawl error types
mod extract; // src/extract/ - email extraction logic
mod logging; // src/logging.rs - tracing setup

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;

use cli::{Cli, Commands};
use config::CrawlConfig;
use crawl::CrawlResult;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = crawl finished
//   Ok(1) = crawl finished with an error (e.g. seed unreachable)
//   Err   = something went wrong outside the crawl
async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Crawl {
            url,
            max_pages,
            timeout,
            user_agent,
            json,
        } => {
            let config = CrawlConfig::new(max_pages, timeout, user_agent);
            handle_crawl(&url, &config, json).await
        }
        Commands::Extract { file, json } => handle_extract(&file, json),
    }
}

// Handles the 'crawl' subcommand
async fn handle_crawl(url: &str, config: &CrawlConfig, json: bool) -> Result<i32> {
    if !json {
        println!("🔍 Crawling website: {}", url);
        println!("📊 Page budget: {}", config.max_pages);
    }

    let result = crawl::run_crawl(url, config).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result);
    }

    Ok(if result.is_ok() { 0 } else { 1 })
}

// Handles the 'extract' subcommand
fn handle_extract(file: &Path, json: bool) -> Result<i32> {
    let html = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let page = extract::ParsedPage::parse(&html);
    let mut emails: Vec<String> = extract::extract_from_page(&page).into_iter().collect();
    emails.sort();

    if json {
        println!("{}", serde_json::to_string_pretty(&emails)?);
    } else {
        print_emails(&emails);
    }

    Ok(0)
}

// Prints a crawl result as a human-readable report
fn print_report(result: &CrawlResult) {
    if let Some(error) = &result.error {
        println!("❌ {}", error);
        return;
    }

    println!("📄 Crawled {} page(s)", result.pages_crawled);
    println!();
    print_emails(&result.emails);
}

fn print_emails(emails: &[String]) {
    if emails.is_empty() {
        println!("📭 No email addresses found");
        return;
    }

    println!("📧 Found {} email address(es):", emails.len());
    for email in emails {
        println!("   {}", email);
    }
}
