//! Best-effort website health classification.
//!
//! A heuristic, not a crawler: one GET per site, no retries, no redirects
//! beyond what `reqwest` follows by default. False positives are accepted.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use hunter_core::LookupTables;
use regex::Regex;

use crate::error::ScraperError;
use crate::http::build_client;
use crate::types::WebsiteStatus;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));
// `name` must start an attribute and the value must be exactly `viewport`.
static VIEWPORT_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<meta\s(?:[^>]*?\s)?name\s*=\s*(?:"viewport"|'viewport'|viewport(?:[\s/>]|$))"#,
    )
    .expect("valid regex")
});

/// Bytes of a page body kept for classification. The title and viewport
/// tag live in `<head>`, so the rest is dropped unread.
pub const MAX_PAGE_BYTES: usize = 512 * 1024;

/// Status code and body of a fetched page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

/// Fetches arbitrary URLs for the probe. Transport failures are `Err`;
/// HTTP error statuses are `Ok` so the probe can classify them.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, ScraperError>;
}

pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, ScraperError> {
        let mut response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;
        let status = response.status().as_u16();

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let room = MAX_PAGE_BYTES - bytes.len();
            if chunk.len() >= room {
                bytes.extend_from_slice(&chunk[..room]);
                tracing::debug!(url, limit = MAX_PAGE_BYTES, "page body truncated");
                break;
            }
            bytes.extend_from_slice(&chunk);
        }
        let body = String::from_utf8_lossy(&bytes).into_owned();
        Ok(FetchedPage { status, body })
    }
}

pub struct WebsiteProbe {
    fetcher: Arc<dyn PageFetcher>,
    lookups: Arc<LookupTables>,
}

impl WebsiteProbe {
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>, lookups: Arc<LookupTables>) -> Self {
        Self { fetcher, lookups }
    }

    /// Classify `website`. Never fails; every error maps to a status.
    pub async fn classify(&self, website: Option<&str>) -> WebsiteStatus {
        let Some(website) = website.map(str::trim).filter(|w| !w.is_empty()) else {
            return WebsiteStatus::NoWebsite;
        };

        let url = normalize_url(website);
        let parsed = match reqwest::Url::parse(&url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(url, error = %e, "website URL does not parse");
                return WebsiteStatus::BrokenWebsite;
            }
        };
        if let Some(host) = parsed.host_str() {
            if let Some(domain) = self.lookups.excluded_domain_for(host, parsed.path()) {
                tracing::debug!(website, domain, "website is a social/directory profile");
                return WebsiteStatus::SocialOnly;
            }
        }

        let page = match self.fetcher.fetch(&url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::debug!(url, error = %e, "website fetch failed");
                return WebsiteStatus::BrokenWebsite;
            }
        };
        if page.status >= 400 {
            tracing::debug!(url, status = page.status, "website returned error status");
            return WebsiteStatus::BrokenWebsite;
        }
        classify_html(&page.body, &self.lookups)
    }
}

/// Prefix `http://` when the URL has no scheme.
#[must_use]
pub fn normalize_url(website: &str) -> String {
    let trimmed = website.trim();
    let lowered = trimmed.to_ascii_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        trimmed.to_owned()
    } else {
        format!("http://{}", trimmed.trim_start_matches('/'))
    }
}

fn classify_html(body: &str, lookups: &LookupTables) -> WebsiteStatus {
    if let Some(title) = page_title(body) {
        if lookups.is_placeholder_title(&title) {
            return WebsiteStatus::BrokenWebsite;
        }
    }
    if VIEWPORT_META_RE.is_match(body) {
        WebsiteStatus::MobileFriendly
    } else {
        WebsiteStatus::NotMobileOptimized
    }
}

fn page_title(body: &str) -> Option<String> {
    TITLE_RE
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
}
