// src/error.rs
// =============================================================================
// Error types for fetching pages and running a crawl.
//
// Two layers:
// - FetchError: why a single page could not be fetched
// - CrawlError: why a whole crawl could not produce results
//
// Per-page failures (FetchError) never leave the crawl loop. Only the seed
// failing at the transport level, a bad request, or a panic become a
// CrawlError, and even those are turned into the `error` field of the
// result instead of being returned as Err to the caller.
// =============================================================================

use thiserror::Error;

// Why fetching a single page failed
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection refused, DNS failure, timeout, TLS problem, or the
    /// connection dying while the body was still being read
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered, but not with a 2xx status
    #[error("HTTP {0}")]
    Status(u16),
}

impl FetchError {
    /// True when no complete response came back (no usable status + body)
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        // A timeout is a transport failure too, it just gets a clearer message
        if error.is_timeout() {
            FetchError::Transport("request timed out".to_string())
        } else {
            FetchError::Transport(error.to_string())
        }
    }
}

// Why a crawl ended with an error instead of results
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("page budget must be at least 1")]
    InvalidBudget,

    #[error("failed to access the main page: {0}")]
    SeedUnreachable(#[source] FetchError),

    #[error("unexpected failure during crawl: {0}")]
    Unexpected(String),
}
