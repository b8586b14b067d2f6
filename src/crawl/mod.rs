// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Breadth-first crawling starting from a seed URL
// - Same-domain restriction (never wanders onto other sites)
// - Hard page budget
// - Emails collected from every page along the way
//
// Submodules:
// - domain: Which URLs count as "the same site"
// - fetch: Getting HTML over HTTP
// - queue: The crawl loop itself
// =============================================================================

mod domain;
mod fetch;
mod queue;

use serde::Serialize;
use url::Url;

use crate::error::CrawlError;

// Re-export the main crawling function
pub use queue::run_crawl;

// A validated request to crawl one site
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    /// The seed exactly as the caller wrote it (reported back as base_url)
    seed_url: String,
    /// The seed after URL parsing, the first entry of the queue
    start: Url,
    page_budget: usize,
}

impl CrawlRequest {
    // Checks the seed and the budget before any network traffic happens
    pub fn new(seed_url: &str, page_budget: usize) -> Result<Self, CrawlError> {
        if page_budget == 0 {
            return Err(CrawlError::InvalidBudget);
        }

        let mut start = Url::parse(seed_url).map_err(|e| CrawlError::InvalidSeed {
            url: seed_url.to_string(),
            reason: e.to_string(),
        })?;

        if start.scheme() != "http" && start.scheme() != "https" {
            return Err(CrawlError::InvalidSeed {
                url: seed_url.to_string(),
                reason: format!("unsupported scheme '{}'", start.scheme()),
            });
        }

        start.set_fragment(None);

        Ok(Self {
            seed_url: seed_url.to_string(),
            start,
            page_budget,
        })
    }

    pub fn seed_url(&self) -> &str {
        &self.seed_url
    }

    pub fn start(&self) -> &Url {
        &self.start
    }

    pub fn page_budget(&self) -> usize {
        self.page_budget
    }
}

// The outcome of one crawl
//
// Serializes to the JSON shape callers expect:
//   {"emails": [...], "pages_crawled": 2, "base_url": "https://x.test/"}
// plus "error" only when something went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlResult {
    /// Unique addresses, sorted
    pub emails: Vec<String>,
    /// Number of fetch attempts made (never more than the budget)
    pub pages_crawled: usize,
    /// The seed URL as supplied
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CrawlResult {
    // A result for a crawl that couldn't get anywhere
    pub fn failed(base_url: &str, error: &CrawlError) -> Self {
        Self {
            emails: Vec::new(),
            pages_crawled: 0,
            base_url: base_url.to_string(),
            error: Some(error.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
