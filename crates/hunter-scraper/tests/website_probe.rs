//! `WebsiteProbe` against real HTTP responses served by wiremock.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hunter_core::LookupTables;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hunter_scraper::{
    FetchedPage, HttpPageFetcher, PageFetcher, ScraperError, WebsiteProbe, WebsiteStatus,
    MAX_PAGE_BYTES,
};

fn probe() -> WebsiteProbe {
    let fetcher = HttpPageFetcher::new(5, "hunter-test/0.1").expect("fetcher");
    WebsiteProbe::new(Arc::new(fetcher), Arc::new(LookupTables::default()))
}

/// Serves a healthy mobile page for every URL and records what was fetched.
#[derive(Default)]
struct HealthySites {
    fetched: Mutex<Vec<String>>,
}

#[async_trait]
impl PageFetcher for HealthySites {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, ScraperError> {
        self.fetched.lock().unwrap().push(url.to_string());
        Ok(FetchedPage {
            status: 200,
            body: r#"<head><meta name="viewport" content="width=device-width"></head>"#.to_string(),
        })
    }
}

async fn serve(status: u16, body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(status)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(body),
        )
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn empty_url_is_no_website() {
    assert_eq!(probe().classify(Some("")).await, WebsiteStatus::NoWebsite);
    assert_eq!(probe().classify(Some("   ")).await, WebsiteStatus::NoWebsite);
    assert_eq!(probe().classify(None).await, WebsiteStatus::NoWebsite);
}

#[tokio::test]
async fn social_profile_is_social_only() {
    let status = probe()
        .classify(Some("https://www.facebook.com/pajanauto"))
        .await;
    assert_eq!(status, WebsiteStatus::SocialOnly);
}

#[tokio::test]
async fn not_found_is_broken() {
    let server = serve(404, "<html><title>Not Found</title></html>").await;
    let status = probe().classify(Some(&format!("{}/", server.uri()))).await;
    assert_eq!(status, WebsiteStatus::BrokenWebsite);
}

#[tokio::test]
async fn viewport_meta_is_mobile_friendly() {
    let server = serve(
        200,
        r#"<!doctype html><html><head><title>Pajan Auto</title>
        <meta name="viewport" content="width=device-width, initial-scale=1"></head><body></body></html>"#,
    )
    .await;
    let status = probe().classify(Some(&server.uri())).await;
    assert_eq!(status, WebsiteStatus::MobileFriendly);
}

#[tokio::test]
async fn page_without_viewport_is_not_mobile_optimized() {
    let server = serve(
        200,
        "<html><head><title>Pajan Auto</title></head><body><table></table></body></html>",
    )
    .await;
    let status = probe().classify(Some(&server.uri())).await;
    assert_eq!(status, WebsiteStatus::NotMobileOptimized);
}

#[tokio::test]
async fn default_server_page_is_broken() {
    let server = serve(
        200,
        r#"<html><head><title>IIS Windows Server</title><meta name="viewport" content="x"></head></html>"#,
    )
    .await;
    let status = probe().classify(Some(&server.uri())).await;
    assert_eq!(status, WebsiteStatus::BrokenWebsite);
}

#[tokio::test]
async fn unreachable_host_is_broken() {
    // Port 9 (discard) on localhost is closed in test environments.
    let status = probe().classify(Some("http://127.0.0.1:9/")).await;
    assert_eq!(status, WebsiteStatus::BrokenWebsite);
}

#[tokio::test]
async fn scheme_less_url_is_fetched_over_http() {
    let server = serve(200, r#"<meta name="viewport" content="width=device-width">"#).await;
    let host = server.uri().trim_start_matches("http://").to_string();
    let status = probe().classify(Some(&host)).await;
    assert_eq!(status, WebsiteStatus::MobileFriendly);
}

#[tokio::test]
async fn lookalike_business_domains_are_fetched() {
    let sites = Arc::new(HealthySites::default());
    let checker = WebsiteProbe::new(sites.clone(), Arc::new(LookupTables::default()));
    for website in [
        "https://www.moottori.fi",
        "https://pathfinder.fi",
        "https://pajanauto.fi/?utm_source=facebook.com",
        "pajanauto.fi/tori.fi",
    ] {
        assert_eq!(
            checker.classify(Some(website)).await,
            WebsiteStatus::MobileFriendly,
            "{website}"
        );
    }
    assert_eq!(sites.fetched.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn directory_hosts_are_not_fetched() {
    let sites = Arc::new(HealthySites::default());
    let checker = WebsiteProbe::new(sites.clone(), Arc::new(LookupTables::default()));
    for website in [
        "https://m.facebook.com/pajanauto",
        "tori.fi/yritys/pajan-auto",
        "https://www.google.com/maps/place/Pajan+Auto",
    ] {
        assert_eq!(
            checker.classify(Some(website)).await,
            WebsiteStatus::SocialOnly,
            "{website}"
        );
    }
    assert!(sites.fetched.lock().unwrap().is_empty());
}

#[tokio::test]
async fn oversized_body_is_truncated() {
    let head = r#"<html><head><title>Pajan Auto</title><meta name="viewport" content="width=device-width"></head><body>"#;
    let body = format!("{head}{}</body></html>", "x".repeat(2 * MAX_PAGE_BYTES));
    let server = serve(200, &body).await;

    let fetcher = HttpPageFetcher::new(5, "hunter-test/0.1").expect("fetcher");
    let page = fetcher.fetch(&format!("{}/", server.uri())).await.expect("fetch");
    assert_eq!(page.status, 200);
    assert_eq!(page.body.len(), MAX_PAGE_BYTES);
    assert!(page.body.starts_with(head));

    let status = probe().classify(Some(&server.uri())).await;
    assert_eq!(status, WebsiteStatus::MobileFriendly);
}

#[tokio::test]
async fn viewport_past_the_byte_cap_is_not_seen() {
    let body = format!(
        "<html><head><title>Pajan Auto</title></head><body>{}<meta name=\"viewport\" content=\"x\"></body></html>",
        " ".repeat(MAX_PAGE_BYTES)
    );
    let server = serve(200, &body).await;
    let status = probe().classify(Some(&server.uri())).await;
    assert_eq!(status, WebsiteStatus::NotMobileOptimized);
}
