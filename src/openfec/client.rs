//! HTTP client for the OpenFEC API

use super::models::{ApiEnvelope, CommitteeReport, EfileFiling, FilingsQuery};
use super::OpenFecError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.open.fec.gov/v1";

/// Public demonstration key; works against the live API with lower rate limits
pub const DEMO_API_KEY: &str = "DEMO_KEY";

/// Upper bound on how much of an error body is echoed back in messages
const BODY_EXCERPT_CHARS: usize = 200;

/// OpenFEC client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct OpenFecConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for OpenFecConfig {
    fn default() -> Self {
        Self {
            api_key: DEMO_API_KEY.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("fec-info-mcp/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// OpenFEC API client
#[derive(Debug, Clone)]
pub struct OpenFecClient {
    api_key: String,
    base_url: Url,
    client: Client,
}

impl OpenFecClient {
    /// Create a new client
    pub fn new(config: OpenFecConfig) -> Result<Self, OpenFecError> {
        if config.api_key.trim().is_empty() {
            return Err(OpenFecError::NotConfigured(
                "OpenFEC API key is required".to_string(),
            ));
        }

        let base_url = Self::normalize_base_url(&config.base_url)?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| OpenFecError::NotConfigured(e.to_string()))?;

        Ok(Self {
            api_key: config.api_key,
            base_url,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Parse the base URL and make sure relative joins append to its path
    /// (pure function)
    fn normalize_base_url(raw: &str) -> Result<Url, OpenFecError> {
        let mut url = Url::parse(raw.trim())
            .map_err(|e| OpenFecError::NotConfigured(format!("Invalid base URL '{raw}': {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(OpenFecError::NotConfigured(format!(
                "Base URL must use http or https: {raw}"
            )));
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(url)
    }

    /// Build an endpoint URL from path segments (pure function)
    fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, OpenFecError> {
        let mut url = base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                OpenFecError::NotConfigured(format!("Base URL cannot be a base: {base}"))
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
            // OpenFEC routes end with a slash
            path.push("");
        }
        Ok(url)
    }

    /// Bounded excerpt of a response body for error messages (pure function)
    fn excerpt(body: &str) -> String {
        let trimmed = body.trim();
        if trimmed.chars().count() <= BODY_EXCERPT_CHARS {
            return trimmed.to_string();
        }
        let cut: String = trimmed.chars().take(BODY_EXCERPT_CHARS).collect();
        format!("{cut}...")
    }

    /// Fetch the most recent e-filings, first page only
    ///
    /// Rows come back in upstream order, truncated to `query.limit`. A limit
    /// of zero returns an empty list without touching the network.
    pub async fn latest_filings(
        &self,
        query: &FilingsQuery,
    ) -> Result<Vec<EfileFiling>, OpenFecError> {
        if query.limit == 0 {
            debug!("Zero filings requested, skipping OpenFEC call");
            return Ok(Vec::new());
        }

        let url = Self::endpoint(&self.base_url, &["efile", "filings"])?;
        let envelope: ApiEnvelope<EfileFiling> =
            self.get_envelope(url, &query.to_query_pairs()).await?;

        let mut rows = envelope.into_results();
        rows.truncate(query.limit as usize);

        debug!(count = rows.len(), "Fetched latest filings");
        Ok(rows)
    }

    /// Look up processed report totals for a committee filing
    ///
    /// Returns `Ok(None)` when OpenFEC has not processed the report yet.
    pub async fn report_totals(
        &self,
        committee_id: &str,
        file_number: i64,
    ) -> Result<Option<CommitteeReport>, OpenFecError> {
        if committee_id.is_empty() || !committee_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(OpenFecError::InvalidRequest(format!(
                "Invalid committee id: {committee_id}"
            )));
        }

        let url = Self::endpoint(&self.base_url, &["committee", committee_id, "reports"])?;
        let params = vec![
            ("file_number", file_number.to_string()),
            ("per_page", "1".to_string()),
        ];
        let envelope: ApiEnvelope<CommitteeReport> = self.get_envelope(url, &params).await?;

        Ok(envelope.into_results().into_iter().next())
    }

    /// Issue one GET and decode the OpenFEC envelope
    async fn get_envelope<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&'static str, String)],
    ) -> Result<ApiEnvelope<T>, OpenFecError> {
        let endpoint = url.path().to_string();
        debug!(endpoint = %endpoint, "OpenFEC request");

        let response = self
            .client
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                // The URL carries the API key; never let it into the message
                let e = e.without_url();
                let reason = if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    e.to_string()
                };
                OpenFecError::network(None, format!("OpenFEC request to {endpoint} failed: {reason}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = status.as_u16(), endpoint = %endpoint, "OpenFEC returned an error status");
            return Err(OpenFecError::network(
                Some(status.as_u16()),
                format!(
                    "OpenFEC returned HTTP {} for {endpoint}: {}",
                    status.as_u16(),
                    Self::excerpt(&body)
                ),
            ));
        }

        let body = response.bytes().await.map_err(|e| {
            OpenFecError::network(
                Some(status.as_u16()),
                format!(
                    "Failed to read OpenFEC response from {endpoint}: {}",
                    e.without_url()
                ),
            )
        })?;

        serde_json::from_slice(&body).map_err(|e| {
            OpenFecError::parse(format!(
                "Unexpected OpenFEC response from {endpoint}: {e}; body: {}",
                Self::excerpt(&String::from_utf8_lossy(&body))
            ))
        })
    }
}
