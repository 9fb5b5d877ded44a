//! Continuation-token pagination shared by the search providers.
//!
//! The provider hands back an opaque `next_page_token` with each page. The
//! token only becomes valid after a short activation delay, so every follow
//! is preceded by a fixed sleep. Pagination stops at the page cap, when no
//! token is returned, or on the first failed follow-up page.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;
use crate::types::{RawPlace, SearchPage};

/// Default page cap for a single search.
pub const DEFAULT_MAX_PAGES: usize = 4;

/// Fetch up to `max_pages` pages via `fetch_page`, flattening the results.
///
/// `fetch_page` receives `None` for the first page and the previous page's
/// token afterwards. A `max_pages` of zero is treated as one.
///
/// # Errors
///
/// Returns the first page's error. Failures on follow-up pages are logged
/// and end pagination with the places gathered so far.
pub async fn collect_pages<F, Fut>(
    max_pages: usize,
    token_delay: Duration,
    mut fetch_page: F,
) -> Result<Vec<RawPlace>, ScraperError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<SearchPage, ScraperError>>,
{
    let max_pages = max_pages.max(1);
    let first = fetch_page(None).await?;
    let mut places = first.places;
    let mut token = first.next_page_token;
    let mut pages = 1usize;

    while let Some(next) = token.take() {
        if pages >= max_pages {
            tracing::debug!(max_pages, "page cap reached; dropping continuation token");
            break;
        }
        if !token_delay.is_zero() {
            tokio::time::sleep(token_delay).await;
        }
        match fetch_page(Some(next)).await {
            Ok(page) => {
                pages += 1;
                places.extend(page.places);
                token = page.next_page_token;
            }
            Err(e) => {
                tracing::warn!(page = pages + 1, error = %e, "follow-up page failed; stopping pagination");
                break;
            }
        }
    }

    Ok(places)
}
