// src/crawl/fetch.rs
// =============================================================================
// Fetching pages over HTTP.
//
// The crawler doesn't talk to reqwest directly. It goes through the
// PageFetcher trait, which has exactly one job: "give me the HTML at this
// URL, or tell me why you couldn't". HttpFetcher is the real implementation;
// tests plug in a fake site that lives in memory.
// =============================================================================

use async_trait::async_trait;
use reqwest::{header, Client};

use crate::config::CrawlConfig;
use crate::error::FetchError;

// Something that can turn a URL into HTML
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

// Fetches pages with a real HTTP client
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Creates the HTTP client with the configured timeout and User-Agent
    //
    // We build the client once and reuse it for every page of the crawl
    // (connection pooling).
    pub fn new(config: &CrawlConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*;q=0.8")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // The timeout covers the body too: a server that stalls halfway
        // through is as unreachable as one that never answered
        let html = response.text().await?;
        Ok(html)
    }
}
