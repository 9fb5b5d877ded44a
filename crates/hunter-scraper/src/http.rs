//! Shared `reqwest` plumbing for the provider clients.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::ScraperError;

/// Builds the shared client: whole-request timeout, 10s connect timeout, and
/// a descriptive `User-Agent`.
pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, ScraperError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?)
}

/// Parses `base_url`, normalised to end with exactly one slash so relative
/// endpoint paths join under it instead of replacing the last segment.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, ScraperError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| ScraperError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })
}

/// Joins `path` onto `base` and appends `params` as encoded query pairs.
pub(crate) fn endpoint_url(
    base: &Url,
    path: &str,
    params: &[(&str, &str)],
) -> Result<Url, ScraperError> {
    let mut url = base.join(path).map_err(|e| ScraperError::InvalidBaseUrl {
        url: base.to_string(),
        reason: format!("cannot join '{path}': {e}"),
    })?;
    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in params {
            pairs.append_pair(k, v);
        }
    }
    Ok(url)
}

/// Sends a GET, requires a 2xx status, and deserializes the JSON body.
///
/// `context` names the endpoint in errors; it must not contain credentials.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: Url,
    context: &str,
) -> Result<T, ScraperError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ScraperError::UnexpectedStatus {
            status: status.as_u16(),
            url: context.to_owned(),
        });
    }
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ScraperError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}
