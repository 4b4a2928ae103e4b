//! HTTP client for the listings backend's nearby-search endpoint.
//!
//! Wraps `reqwest` with status checking, typed decoding of the
//! `{success, total, houses, message}` envelope, and transport-level retry.
//! A `success: false` envelope surfaces as [`SearchError::Backend`].

use std::future::Future;
use std::time::Duration;

use rentmap_core::AppConfig;
use reqwest::{Client, Url};

use crate::error::SearchError;
use crate::query::ProximityQuery;
use crate::retry::RetryPolicy;
use crate::types::NearbyResponse;

const NEARBY_PATH: &str = "api/nearby-houses";
pub(crate) const DEFAULT_FAILURE_MESSAGE: &str = "获取房源失败";

/// Anything that can resolve a [`ProximityQuery`] into listings.
///
/// [`NearbyClient`] is the production implementation; tests and embedders
/// can substitute their own.
pub trait ListingSource {
    /// Runs one nearby query.
    ///
    /// Implementations return `Err(SearchError::Backend)` for a
    /// `success: false` answer rather than an `Ok` envelope.
    fn fetch_nearby(
        &self,
        query: &ProximityQuery,
    ) -> impl Future<Output = Result<NearbyResponse, SearchError>> + Send;
}

/// Client for `GET {base}/api/nearby-houses`.
///
/// Use [`NearbyClient::from_config`] in production or
/// [`NearbyClient::with_base_url`] to point at a mock server in tests.
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct NearbyClient {
    client: Client,
    endpoint: Url,
    retry: RetryPolicy,
}

impl NearbyClient {
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidBaseUrl`] for an unparsable base URL, or
    /// [`SearchError::Http`] if the `reqwest::Client` cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, SearchError> {
        Ok(Self::with_base_url(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )?
        .with_retries(config.max_retries, config.retry_backoff_base_ms))
    }

    /// Creates a client without retries.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidBaseUrl`] for an unparsable base URL, or
    /// [`SearchError::Http`] if the `reqwest::Client` cannot be built.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so the endpoint path is appended to the
        // base path instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join(NEARBY_PATH))
            .map_err(|e| SearchError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint,
            retry: RetryPolicy::default(),
        })
    }

    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.retry = RetryPolicy {
            max_retries,
            backoff_base_ms,
        };
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Full request URL with percent-encoded query pairs.
    fn build_url(&self, query: &ProximityQuery) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query.query_pairs() {
                pairs.append_pair(key, &value);
            }
        }
        url
    }

    /// Runs a nearby query against the backend.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Backend`] if the envelope says `success: false`.
    /// - [`SearchError::UnexpectedStatus`] for a non-2xx status.
    /// - [`SearchError::Http`] on network failure after retries.
    /// - [`SearchError::Deserialize`] if the body is not the expected JSON.
    pub async fn fetch_nearby(&self, query: &ProximityQuery) -> Result<NearbyResponse, SearchError> {
        let url = self.build_url(query);
        tracing::debug!(%url, "querying nearby listings");

        let response = self
            .retry
            .run(self.endpoint.as_str(), || self.request_once(&url))
            .await?;

        if !response.success {
            let message = response
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
            tracing::warn!(%message, "listings backend reported failure");
            return Err(SearchError::Backend(message));
        }

        tracing::debug!(
            total = response.total,
            returned = response.houses.len(),
            "nearby listings received"
        );
        Ok(response)
    }

    async fn request_once(&self, url: &Url) -> Result<NearbyResponse, SearchError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| SearchError::Deserialize {
            context: url.path().to_string(),
            source: e,
        })
    }
}

impl ListingSource for NearbyClient {
    fn fetch_nearby(
        &self,
        query: &ProximityQuery,
    ) -> impl Future<Output = Result<NearbyResponse, SearchError>> + Send {
        NearbyClient::fetch_nearby(self, query)
    }
}
