// src/config.rs
// =============================================================================
// Settings for one crawl.
//
// The values normally come from the command line (see cli.rs), but the
// crawler itself only sees this struct, so tests can build one directly.
// =============================================================================

use std::time::Duration;

/// Page budget used when the caller doesn't ask for one
pub const DEFAULT_MAX_PAGES: usize = 10;

/// Hard ceiling on the page budget, no matter what the caller asks for
pub const MAX_PAGES_CAP: usize = 20;

/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

// Plenty of sites refuse requests that don't look like they come from a browser
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub max_pages: usize,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CrawlConfig {
    // Builds a config, clamping the page budget to MAX_PAGES_CAP
    pub fn new(max_pages: usize, timeout_secs: u64, user_agent: String) -> Self {
        let clamped = max_pages.min(MAX_PAGES_CAP);
        if clamped != max_pages {
            tracing::warn!(
                requested = max_pages,
                cap = MAX_PAGES_CAP,
                "page budget exceeds the cap, clamping"
            );
        }

        Self {
            max_pages: clamped,
            timeout: Duration::from_secs(timeout_secs),
            user_agent,
        }
    }
}
