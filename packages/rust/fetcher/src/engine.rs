//! Sequential page fetcher.
//!
//! Pages are fetched one at a time. A batch pauses for the configured
//! politeness delay between requests, and a failed page is logged and
//! skipped without stopping the batch. There is no timeout and no retry.

use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};
use url::Url;

use docsprompt_shared::{DocsPromptError, FetchConfig, PageRecord, Result};

use crate::extract::extract_page;

// ---------------------------------------------------------------------------
// FetchReport
// ---------------------------------------------------------------------------

/// Outcome of a batch fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    /// Successfully extracted pages, in request order.
    pub pages: Vec<PageRecord>,
    /// Failed pages as (URL, error message).
    pub failures: Vec<(String, String)>,
    /// Wall time of the whole batch, delays included.
    pub duration: Duration,
}

/// Progress callback for batch fetches.
pub trait FetchProgress: Send + Sync {
    /// Called before a request is sent.
    fn page_started(&self, url: &str, current: usize, total: usize);
    /// Called after a page was fetched and extracted.
    fn page_fetched(&self, page: &PageRecord, current: usize, total: usize);
    /// Called after a page failed.
    fn page_failed(&self, url: &str, error: &DocsPromptError, current: usize, total: usize);
    /// Called once the batch is over.
    fn done(&self, report: &FetchReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl FetchProgress for SilentProgress {
    fn page_started(&self, _url: &str, _current: usize, _total: usize) {}
    fn page_fetched(&self, _page: &PageRecord, _current: usize, _total: usize) {}
    fn page_failed(&self, _url: &str, _error: &DocsPromptError, _current: usize, _total: usize) {}
    fn done(&self, _report: &FetchReport) {}
}

// ---------------------------------------------------------------------------
// PageFetcher
// ---------------------------------------------------------------------------

/// HTTP page fetcher producing [`PageRecord`]s.
pub struct PageFetcher {
    config: FetchConfig,
    client: Client,
}

impl PageFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| DocsPromptError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Fetch one page and extract its features.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<PageRecord> {
        let parsed = parse_page_url(url)?;
        debug!("fetching page");

        let response = self
            .client
            .get(parsed.as_str())
            .send()
            .await
            .map_err(|e| DocsPromptError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocsPromptError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DocsPromptError::Network(format!("{url}: body read failed: {e}")))?;

        let mut page = extract_page(url, &body);
        page.fetched_at = Some(Utc::now());

        debug!(
            title = %page.title,
            headings = page.headings.len(),
            content_len = page.main_text.len(),
            "page extracted"
        );

        Ok(page)
    }

    /// Fetch every URL in order, pausing between requests.
    #[instrument(skip_all, fields(pages = urls.len()))]
    pub async fn fetch_all(&self, urls: &[String], progress: &dyn FetchProgress) -> FetchReport {
        let start_time = Instant::now();
        let total = urls.len();
        let delay = Duration::from_millis(self.config.politeness_delay_ms);
        let mut report = FetchReport::default();

        info!(
            total,
            politeness_delay_ms = self.config.politeness_delay_ms,
            "starting fetch batch"
        );

        for (i, url) in urls.iter().enumerate() {
            let current = i + 1;
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            progress.page_started(url, current, total);
            match self.fetch(url).await {
                Ok(page) => {
                    info!(url = %url, title = %page.title, "fetched page");
                    progress.page_fetched(&page, current, total);
                    report.pages.push(page);
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "failed to fetch page, skipping");
                    progress.page_failed(url, &e, current, total);
                    report.failures.push((url.clone(), e.to_string()));
                }
            }
        }

        report.duration = start_time.elapsed();

        info!(
            pages_fetched = report.pages.len(),
            failures = report.failures.len(),
            duration_ms = report.duration.as_millis(),
            "fetch batch completed"
        );

        progress.done(&report);
        report
    }
}

/// Parse a page URL, accepting only http and https.
fn parse_page_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url)
        .map_err(|e| DocsPromptError::validation(format!("invalid URL '{url}': {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(DocsPromptError::validation(format!(
            "unsupported URL scheme '{other}' in '{url}'"
        ))),
    }
}

#[cfg(test)]
mod fetcher_tests {
    use std::sync::Mutex;

    use super::*;

    const PAGE: &str = r#"<html><head><title>Intro | Docs</title></head><body>
        <main>
            <h1>Intro</h1>
            <p>Docusaurus is a static site generator.</p>
        </main>
    </body></html>"#;

    fn fast_config() -> FetchConfig {
        FetchConfig {
            politeness_delay_ms: 0,
            user_agent: "docsprompt-test".into(),
        }
    }

    /// Records progress events in call order.
    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl FetchProgress for RecordingProgress {
        fn page_started(&self, url: &str, current: usize, total: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start {current}/{total} {url}"));
        }
        fn page_fetched(&self, page: &PageRecord, _current: usize, _total: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("ok {}", page.title));
        }
        fn page_failed(&self, url: &str, _error: &DocsPromptError, _c: usize, _t: usize) {
            self.events.lock().unwrap().push(format!("fail {url}"));
        }
        fn done(&self, report: &FetchReport) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {}", report.pages.len()));
        }
    }

    #[test]
    fn test_parse_page_url_rejects_other_schemes() {
        assert!(parse_page_url("https://docs.example.com/intro").is_ok());
        assert!(parse_page_url("http://localhost:3000/").is_ok());

        let err = parse_page_url("file:///etc/passwd").unwrap_err();
        assert!(err.to_string().contains("unsupported URL scheme"));

        let err = parse_page_url("not a url").unwrap_err();
        assert!(err.to_string().contains("invalid URL"));
    }

    #[tokio::test]
    async fn test_fetch_extracts_page() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/intro"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let fetcher = PageFetcher::new(fast_config()).unwrap();
        let url = format!("{}/intro", server.uri());
        let page = fetcher.fetch(&url).await.unwrap();

        assert_eq!(page.identifier, url);
        assert_eq!(page.title, "Intro | Docs");
        assert_eq!(page.headings.len(), 1);
        assert!(page.main_text.contains("static site generator"));
        assert!(page.fetched_at.is_some());
    }

    #[tokio::test]
    async fn test_fetch_sends_user_agent() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::header("user-agent", "docsprompt-test"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let fetcher = PageFetcher::new(fast_config()).unwrap();
        assert!(fetcher.fetch(&server.uri()).await.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_network_error() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::path("/missing"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = PageFetcher::new(fast_config()).unwrap();
        let err = fetcher
            .fetch(&format!("{}/missing", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, DocsPromptError::Network(_)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_fetch_all_skips_failures() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::path("/"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;
        wiremock::Mock::given(wiremock::matchers::path("/broken"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;
        wiremock::Mock::given(wiremock::matchers::path("/intro"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let urls = vec![
            format!("{}/", server.uri()),
            format!("{}/broken", server.uri()),
            format!("{}/intro", server.uri()),
        ];

        let fetcher = PageFetcher::new(fast_config()).unwrap();
        let progress = RecordingProgress::default();
        let report = fetcher.fetch_all(&urls, &progress).await;

        assert_eq!(report.pages.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, urls[1]);
        assert_eq!(report.pages[1].identifier, urls[2]);

        let events = progress.events.lock().unwrap();
        assert_eq!(events.len(), 7);
        assert_eq!(events[0], format!("start 1/3 {}", urls[0]));
        assert_eq!(events[3], format!("fail {}", urls[1]));
        assert_eq!(events[6], "done 2");
    }

    #[tokio::test]
    async fn test_fetch_all_waits_between_requests() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let config = FetchConfig {
            politeness_delay_ms: 50,
            ..fast_config()
        };
        let urls = vec![
            format!("{}/a", server.uri()),
            format!("{}/b", server.uri()),
            format!("{}/c", server.uri()),
        ];

        let fetcher = PageFetcher::new(config).unwrap();
        let report = fetcher.fetch_all(&urls, &SilentProgress).await;

        assert_eq!(report.pages.len(), 3);
        // Two pauses for three requests.
        assert!(report.duration >= Duration::from_millis(100));
    }
}
