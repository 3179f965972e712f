//! HTTP client for catalog search and product pages.

mod origin;

use std::time::Duration;

use reqwest::Client;
use skuscan_core::AppConfig;

use crate::error::ScraperError;
use crate::retry::retry_with_backoff;

pub use origin::storefront_origin;
pub(crate) use origin::catalog_host;

const CONNECT_TIMEOUT_SECS: u64 = 5;

/// A fetched HTML body together with the URL it was finally served from.
///
/// `url` differs from the requested URL when the site redirected, which
/// storefronts do when a search query is an exact product code.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub body: String,
}

/// HTTP client for catalog pages.
///
/// Every request carries the configured browser-like `User-Agent` and is
/// bounded by the configured timeout. Non-2xx responses become
/// [`ScraperError::UnexpectedStatus`]. Transient errors (timeouts, connect
/// failures, 5xx) are retried with back-off up to `max_retries` extra attempts.
pub struct PageClient {
    client: Client,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl PageClient {
    /// Creates a `PageClient` with configured timeout, `User-Agent`, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS.min(timeout_secs)))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_ms,
        })
    }

    /// # Errors
    ///
    /// See [`PageClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_ms,
        )
    }

    /// Fetches one HTML page and returns its body.
    ///
    /// # Errors
    ///
    /// See [`PageClient::fetch_page`].
    pub async fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        self.fetch_page(url).await.map(|page| page.body)
    }

    /// Fetches one HTML page, following redirects, and reports where it landed.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] — `url` is not an absolute URL (not retried).
    /// - [`ScraperError::UnexpectedStatus`] — non-2xx status (5xx retried, others not).
    /// - [`ScraperError::Http`] — network, timeout, or TLS failure after all retries.
    pub async fn fetch_page(&self, url: &str) -> Result<FetchedPage, ScraperError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        let referer = storefront_origin(&parsed);

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let request_url = parsed.clone();
            let referer = referer.clone();
            async move {
                let mut request = self
                    .client
                    .get(request_url.clone())
                    .header(
                        reqwest::header::ACCEPT,
                        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                    )
                    .header(reqwest::header::ACCEPT_LANGUAGE, "es-MX,es;q=0.9,en;q=0.8");
                if let Some(referer) = referer {
                    request = request.header(reqwest::header::REFERER, referer);
                }
                let response = request.send().await?;
                let status = response.status();

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: request_url.to_string(),
                    });
                }

                let final_url = response.url().clone();
                let body = response.text().await?;
                tracing::debug!(
                    host = catalog_host(&final_url),
                    url = %final_url,
                    bytes = body.len(),
                    "fetched page"
                );

                Ok(FetchedPage {
                    url: final_url.into(),
                    body,
                })
            }
        })
        .await
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
