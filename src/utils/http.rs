// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::error::{AppError, Result};
use crate::models::FetcherConfig;

/// Extra time granted to WebDriver commands beyond the page load timeout,
/// so the driver reports the timeout before the client gives up.
const DRIVER_GRACE: Duration = Duration::from_secs(10);

/// Create a client for fetching timeline pages directly.
pub fn create_page_client(config: &FetcherConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(config.timeout())
        .build()?;
    Ok(client)
}

/// Create a client for talking to a WebDriver server.
pub fn create_driver_client(config: &FetcherConfig) -> Result<Client> {
    let timeout = config
        .timeout()
        .checked_add(DRIVER_GRACE)
        .ok_or_else(|| AppError::validation("fetcher.timeout_secs is out of range"))?;
    let client = Client::builder().timeout(timeout).build()?;
    Ok(client)
}

/// Statuses whose body is still a page worth parsing.
///
/// A deleted or missing question answers 404/410; its page is final and
/// yields an empty timeline rather than a retry on every run.
const DOCUMENT_STATUSES: &[StatusCode] = &[StatusCode::NOT_FOUND, StatusCode::GONE];

/// Fetch a page as text.
///
/// 404 and 410 bodies are returned as documents; any other non-success status
/// is an error.
pub async fn fetch_text(client: &Client, url: &str) -> reqwest::Result<String> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if DOCUMENT_STATUSES.contains(&status) {
        log::warn!("{} answered {}; recording an empty timeline", url, status);
        return response.text().await;
    }
    response.error_for_status()?.text().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_timeout_overflow_is_rejected() {
        let config = FetcherConfig {
            timeout_secs: u64::MAX,
            ..FetcherConfig::default()
        };
        assert!(matches!(
            create_driver_client(&config),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_driver_client_for_default_timeout() {
        assert!(create_driver_client(&FetcherConfig::default()).is_ok());
    }
}
