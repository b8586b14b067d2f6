// src/crawl/queue.rs
// =============================================================================
// This module implements the crawl itself, breadth-first.
//
// How it works:
// 1. Start with the seed URL in a queue
// 2. Take the URL at the front of the queue; skip it if already visited
// 3. Fetch the page HTML (this uses up one page of the budget, even if the
//    fetch fails)
// 4. Collect every email on the page
// 5. Add same-domain links from the page to the back of the queue
// 6. Repeat until the queue is empty or the budget is spent
//
// Breadth-first means pages closest to the seed come first. Contact details
// usually live one click away from the home page, so with a small budget
// those are the pages worth spending it on.
//
// Failure rules:
// - The seed can't be reached at all: the crawl stops with an error
// - Any other page fails: it is skipped and the crawl goes on
// - Something panics: caught here and reported as an error
// =============================================================================

use futures::FutureExt;
use std::any::Any;
use std::collections::{HashSet, VecDeque};
use std::panic::AssertUnwindSafe;
use url::Url;

use super::domain::link_stays_on_site;
use super::fetch::{HttpFetcher, PageFetcher};
use super::{CrawlRequest, CrawlResult};
use crate::config::CrawlConfig;
use crate::error::CrawlError;
use crate::extract::{extract_from_page, ParsedPage};

// Crawls a website over HTTP
//
// Parameters:
//   seed_url: Where to start (also defines which domain we stay on)
//   config: Page budget, timeout and User-Agent
//
// Never returns an Err: problems end up in the result's `error` field.
pub async fn run_crawl(seed_url: &str, config: &CrawlConfig) -> CrawlResult {
    let fetcher = match HttpFetcher::new(config) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            let error = CrawlError::Unexpected(format!("could not build HTTP client: {e}"));
            return CrawlResult::failed(seed_url, &error);
        }
    };

    crawl_with(&fetcher, seed_url, config.max_pages).await
}

// Crawls a website using any PageFetcher
pub async fn crawl_with<F>(fetcher: &F, seed_url: &str, page_budget: usize) -> CrawlResult
where
    F: PageFetcher + ?Sized,
{
    let request = match CrawlRequest::new(seed_url, page_budget) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(seed = seed_url, error = %e, "rejected crawl request");
            return CrawlResult::failed(seed_url, &e);
        }
    };

    // Nothing past this point is allowed to unwind into the caller
    let session = CrawlSession::new(&request);
    match AssertUnwindSafe(session.run(fetcher)).catch_unwind().await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            tracing::warn!(seed = seed_url, error = %e, "crawl failed");
            CrawlResult::failed(seed_url, &e)
        }
        Err(panic) => {
            let error = CrawlError::Unexpected(panic_message(&*panic));
            tracing::error!(seed = seed_url, error = %error, "crawl panicked");
            CrawlResult::failed(seed_url, &error)
        }
    }
}

// Everything one crawl needs to remember
//
// Built fresh for every crawl and thrown away at the end, so two crawls
// running side by side never see each other's state.
struct CrawlSession {
    // The seed as written; its netloc is what links are compared against
    base_url: String,
    page_budget: usize,
    // URLs already taken off the queue
    visited: HashSet<String>,
    // URLs waiting to be fetched; may hold duplicates, filtered when popped
    frontier: VecDeque<String>,
    emails: HashSet<String>,
    pages_fetched: usize,
}

impl CrawlSession {
    fn new(request: &CrawlRequest) -> Self {
        Self {
            base_url: request.seed_url().to_string(),
            frontier: VecDeque::from([request.start().to_string()]),
            page_budget: request.page_budget(),
            visited: HashSet::new(),
            emails: HashSet::new(),
            pages_fetched: 0,
        }
    }

    async fn run<F>(mut self, fetcher: &F) -> Result<CrawlResult, CrawlError>
    where
        F: PageFetcher + ?Sized,
    {
        while self.pages_fetched < self.page_budget {
            let Some(url) = self.frontier.pop_front() else {
                break;
            };

            // Duplicates in the queue cost nothing
            if !self.visited.insert(url.clone()) {
                tracing::debug!(%url, "already visited, skipping");
                continue;
            }

            // The seed is always the first URL off the queue
            let is_seed = self.pages_fetched == 0;
            self.pages_fetched += 1;

            tracing::info!(
                page = self.pages_fetched,
                budget = self.page_budget,
                %url,
                "crawling"
            );

            match fetcher.fetch(&url).await {
                Ok(html) => self.process_page(&url, &html),
                Err(e) if is_seed && e.is_transport() => {
                    return Err(CrawlError::SeedUnreachable(e));
                }
                Err(e) => {
                    tracing::warn!(%url, error = %e, "failed to fetch page, skipping");
                }
            }
        }

        tracing::info!(
            pages = self.pages_fetched,
            emails = self.emails.len(),
            queued = self.frontier.len(),
            "crawl finished"
        );

        Ok(self.finish())
    }

    // Pulls emails and links out of a fetched page
    fn process_page(&mut self, url: &str, html: &str) {
        let page = ParsedPage::parse(html);

        let found = extract_from_page(&page);
        tracing::debug!(%url, count = found.len(), "emails found on page");
        self.emails.extend(found);

        // Relative links are resolved against this page, not the seed
        let base = match Url::parse(url) {
            Ok(base) => base,
            Err(e) => {
                tracing::debug!(%url, error = %e, "can't resolve links against page URL");
                return;
            }
        };

        let mut queued = 0;
        for href in page.anchors() {
            let Some(link) = resolve_link(&base, href) else {
                continue;
            };

            if !link_stays_on_site(href, &link, url, &self.base_url)
                || self.visited.contains(&link)
            {
                continue;
            }

            self.frontier.push_back(link);
            queued += 1;
        }

        tracing::debug!(%url, queued, "links queued");
    }

    fn finish(self) -> CrawlResult {
        let mut emails: Vec<String> = self.emails.into_iter().collect();
        emails.sort();

        CrawlResult {
            emails,
            pages_crawled: self.pages_fetched,
            base_url: self.base_url,
            error: None,
        }
    }
}

// Resolves an href (possibly relative) to an absolute http(s) URL
//
// Returns None for in-page anchors, non-web schemes (mailto:, tel:,
// javascript:...) and anything that doesn't parse. The fragment is dropped
// because "page#a" and "page#b" are the same document.
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    if href.starts_with('#') {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    url.set_fragment(None);
    Some(url.into())
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why does a failed page still count against the budget?
//    - The budget limits how much work a crawl can do, and a request that
//      times out is still work
//    - A site full of broken links would otherwise keep the crawl going
//
// 2. Why can the queue hold duplicates?
//    - Two pages may link to the same URL before either is visited
//    - Checking at pop time is simpler than keeping a second "queued" set
//    - The visited check makes sure each URL is fetched at most once
//
// 3. What is AssertUnwindSafe + catch_unwind?
//    - catch_unwind turns a panic inside the future into an Err value
//    - AssertUnwindSafe tells the compiler we won't look at half-updated
//      state afterwards (the session is dropped either way)
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_USER_AGENT;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    enum Response {
        Html(&'static str),
        Status(u16),
        Down,
        Panic,
    }

    // A website that lives in memory and remembers every request
    #[derive(Default)]
    struct FakeSite {
        pages: HashMap<String, Response>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeSite {
        fn page(mut self, url: &str, response: Response) -> Self {
            self.pages.insert(url.to_string(), response);
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for FakeSite {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            match self.pages.get(url) {
                Some(Response::Html(html)) => Ok(html.to_string()),
                Some(Response::Status(code)) => Err(FetchError::Status(*code)),
                Some(Response::Down) => Err(FetchError::Transport("connection refused".into())),
                Some(Response::Panic) => panic!("parser exploded"),
                None => Err(FetchError::Status(404)),
            }
        }
    }

    fn emails(result: &CrawlResult) -> Vec<&str> {
        result.emails.iter().map(String::as_str).collect()
    }

    #[tokio::test]
    async fn test_collects_from_text_mailto_and_linked_page() {
        let site = FakeSite::default()
            .page(
                "https://x.test/",
                Response::Html(
                    r#"<p>contact: a@x.test</p>
                       <a href="mailto:b@x.test">mail</a>
                       <a href="https://x.test/about">about</a>"#,
                ),
            )
            .page("https://x.test/about", Response::Html("<p>c@x.test</p>"));

        let result = crawl_with(&site, "https://x.test/", 2).await;

        assert_eq!(emails(&result), ["a@x.test", "b@x.test", "c@x.test"]);
        assert_eq!(result.pages_crawled, 2);
        assert_eq!(result.base_url, "https://x.test/");
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_never_leaves_the_domain() {
        let site = FakeSite::default().page(
            "https://x.test/",
            Response::Html(
                r#"<a href="https://other.test/page">elsewhere</a>
                   <a href="/local">local</a>"#,
            ),
        );

        let result = crawl_with(&site, "https://x.test/", 10).await;

        let requests = site.requests();
        assert_eq!(requests, ["https://x.test/", "https://x.test/local"]);
        assert!(!requests.iter().any(|url| url.contains("other.test")));
        assert_eq!(result.pages_crawled, 2);
    }

    #[tokio::test]
    async fn test_budget_of_one_only_reads_the_seed() {
        let site = FakeSite::default()
            .page(
                "https://x.test/",
                Response::Html(
                    r#"<p>seed@x.test</p>
                       <a href="/1">1</a> <a href="/2">2</a> <a href="/3">3</a>
                       <a href="/4">4</a> <a href="/5">5</a>"#,
                ),
            )
            .page("https://x.test/1", Response::Html("<p>one@x.test</p>"));

        let result = crawl_with(&site, "https://x.test/", 1).await;

        assert_eq!(result.pages_crawled, 1);
        assert_eq!(emails(&result), ["seed@x.test"]);
        assert_eq!(site.requests(), ["https://x.test/"]);
    }

    #[tokio::test]
    async fn test_cycles_fetch_each_url_once() {
        let site = FakeSite::default()
            .page(
                "https://x.test/",
                Response::Html(
                    r##"<a href="/a">a</a> <a href="/a">a again</a>
                        <a href="#top">top</a> <a href="/">home</a>"##,
                ),
            )
            .page(
                "https://x.test/a",
                Response::Html(
                    r#"<a href="/">home</a> <a href="/a#section">self</a>
                       <a href="https://x.test/">home again</a>"#,
                ),
            );

        let result = crawl_with(&site, "https://x.test/", 10).await;

        let requests = site.requests();
        let unique: HashSet<_> = requests.iter().collect();
        assert_eq!(unique.len(), requests.len());
        assert_eq!(requests, ["https://x.test/", "https://x.test/a"]);
        assert_eq!(result.pages_crawled, 2);
    }

    #[tokio::test]
    async fn test_pages_crawled_never_exceeds_budget() {
        let site = FakeSite::default()
            .page(
                "https://x.test/",
                Response::Html(r#"<a href="/a">a</a> <a href="/b">b</a> <a href="/c">c</a>"#),
            )
            .page("https://x.test/a", Response::Html(r#"<a href="/d">d</a>"#))
            .page("https://x.test/b", Response::Html(r#"<a href="/e">e</a>"#));

        for budget in 1..=6 {
            let result = crawl_with(&site, "https://x.test/", budget).await;
            assert!(result.pages_crawled <= budget);
        }
    }

    #[tokio::test]
    async fn test_breadth_first_order() {
        let site = FakeSite::default()
            .page(
                "https://x.test/",
                Response::Html(r#"<a href="/a">a</a> <a href="/b">b</a>"#),
            )
            .page("https://x.test/a", Response::Html(r#"<a href="/a/deep">deep</a>"#))
            .page("https://x.test/b", Response::Html("<p>b</p>"));

        crawl_with(&site, "https://x.test/", 10).await;

        assert_eq!(
            site.requests(),
            [
                "https://x.test/",
                "https://x.test/a",
                "https://x.test/b",
                "https://x.test/a/deep"
            ]
        );
    }

    #[tokio::test]
    async fn test_relative_links_resolve_against_current_page() {
        let site = FakeSite::default()
            .page("https://x.test/", Response::Html(r#"<a href="/docs/">docs</a>"#))
            .page(
                "https://x.test/docs/",
                Response::Html(r#"<a href="intro">intro</a>"#),
            )
            .page("https://x.test/docs/intro", Response::Html("<p>docs@x.test</p>"));

        let result = crawl_with(&site, "https://x.test/", 5).await;

        assert!(site.requests().contains(&"https://x.test/docs/intro".to_string()));
        assert_eq!(emails(&result), ["docs@x.test"]);
    }

    #[tokio::test]
    async fn test_unreachable_seed_is_fatal() {
        let site = FakeSite::default().page("https://x.test/", Response::Down);

        let result = crawl_with(&site, "https://x.test/", 5).await;

        assert_eq!(result.pages_crawled, 0);
        assert!(result.emails.is_empty());
        assert!(!result.error.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_seed_error_status_is_not_fatal() {
        let site = FakeSite::default().page("https://x.test/", Response::Status(500));

        let result = crawl_with(&site, "https://x.test/", 5).await;

        assert!(result.is_ok());
        assert_eq!(result.pages_crawled, 1);
        assert!(result.emails.is_empty());
    }

    #[tokio::test]
    async fn test_failed_pages_are_skipped_but_counted() {
        let site = FakeSite::default()
            .page(
                "https://x.test/",
                Response::Html(r#"<a href="/down">down</a> <a href="/ok">ok</a>"#),
            )
            .page("https://x.test/down", Response::Down)
            .page("https://x.test/ok", Response::Html("<p>ok@x.test</p>"));

        let result = crawl_with(&site, "https://x.test/", 10).await;

        assert!(result.is_ok());
        assert_eq!(result.pages_crawled, 3);
        assert_eq!(emails(&result), ["ok@x.test"]);
    }

    #[tokio::test]
    async fn test_panic_becomes_error_field() {
        let site = FakeSite::default()
            .page("https://x.test/", Response::Html(r#"<a href="/boom">boom</a>"#))
            .page("https://x.test/boom", Response::Panic);

        let result = crawl_with(&site, "https://x.test/", 5).await;

        assert_eq!(result.pages_crawled, 0);
        assert!(result
            .error
            .as_deref()
            .is_some_and(|e| e.contains("parser exploded")));
    }

    #[tokio::test]
    async fn test_base_url_is_reported_verbatim() {
        let site = FakeSite::default().page("https://x.test/", Response::Html("<p>hi@x.test</p>"));

        let result = crawl_with(&site, "https://x.test", 1).await;

        assert_eq!(result.base_url, "https://x.test");
        assert_eq!(site.requests(), ["https://x.test/"]);
        assert_eq!(emails(&result), ["hi@x.test"]);
    }

    #[tokio::test]
    async fn test_uppercase_seed_host_is_compared_literally() {
        let site = FakeSite::default().page(
            "https://x.test/",
            Response::Html(r#"<a href="https://x.test/a">absolute</a> <a href="/b">relative</a>"#),
        );

        let result = crawl_with(&site, "https://X.test/", 10).await;

        // The absolute link names "x.test", not the seed's "X.test"
        assert_eq!(site.requests(), ["https://x.test/", "https://x.test/b"]);
        assert_eq!(result.pages_crawled, 2);
    }

    #[tokio::test]
    async fn test_explicit_default_port_is_compared_literally() {
        let site = FakeSite::default().page(
            "https://x.test/",
            Response::Html(
                r#"<a href="https://x.test/a">no port</a>
                   <a href="https://x.test:443/c">with port</a>"#,
            ),
        );

        let result = crawl_with(&site, "https://x.test:443/", 10).await;

        assert_eq!(site.requests(), ["https://x.test/", "https://x.test/c"]);
        assert_eq!(result.pages_crawled, 2);
    }

    #[tokio::test]
    async fn test_seed_stalling_mid_body_is_fatal() {
        let addr = super::super::fetch::tests::stalling_server().await;
        let config = CrawlConfig {
            max_pages: 3,
            timeout: Duration::from_secs(1),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        };

        let result = run_crawl(&format!("http://{addr}/"), &config).await;

        assert_eq!(result.pages_crawled, 0);
        assert!(result.emails.is_empty());
        assert!(result.error.is_some_and(|e| !e.is_empty()));
    }

    #[tokio::test]
    async fn test_invalid_requests_never_fetch() {
        let site = FakeSite::default();

        let bad_seed = crawl_with(&site, "not a url", 5).await;
        let no_budget = crawl_with(&site, "https://x.test/", 0).await;

        assert!(bad_seed.error.is_some());
        assert!(no_budget.error.is_some());
        assert!(site.requests().is_empty());
    }

    #[test]
    fn test_resolve_relative_link() {
        let base = Url::parse("https://example.com/page").unwrap();
        assert_eq!(
            resolve_link(&base, "/docs"),
            Some("https://example.com/docs".to_string())
        );
    }

    #[test]
    fn test_resolve_drops_fragment() {
        let base = Url::parse("https://example.com/page").unwrap();
        assert_eq!(
            resolve_link(&base, "/docs#install"),
            Some("https://example.com/docs".to_string())
        );
        assert_eq!(resolve_link(&base, "#section"), None);
    }

    #[test]
    fn test_resolve_skips_non_web_schemes() {
        let base = Url::parse("https://example.com/page").unwrap();
        assert_eq!(resolve_link(&base, "mailto:test@example.com"), None);
        assert_eq!(resolve_link(&base, "tel:+123456"), None);
        assert_eq!(resolve_link(&base, "javascript:void(0)"), None);
    }

    // Full crawl against a real local HTTP server
    #[tokio::test]
    async fn test_run_crawl_over_http() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(
                r#"<p>contact: a@x.test</p>
                   <a href="mailto:b@x.test?subject=hi">mail</a>
                   <a href="/about">about</a>
                   <a href="https://other.test/page">other</a>"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/about")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<p>c@x.test</p>")
            .create_async()
            .await;

        let config = CrawlConfig {
            max_pages: 5,
            timeout: Duration::from_secs(5),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        };
        let seed = format!("{}/", server.url());

        let result = run_crawl(&seed, &config).await;

        assert!(result.is_ok());
        assert_eq!(emails(&result), ["a@x.test", "b@x.test", "c@x.test"]);
        assert_eq!(result.pages_crawled, 2);
        assert_eq!(result.base_url, seed);
    }

    #[tokio::test]
    async fn test_run_crawl_unreachable_seed() {
        let config = CrawlConfig {
            max_pages: 3,
            timeout: Duration::from_secs(2),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        };

        let result = run_crawl("http://127.0.0.1:1/", &config).await;

        assert_eq!(result.pages_crawled, 0);
        assert!(result.emails.is_empty());
        assert!(result.error.is_some());
    }
}
