//! CSE query execution

use super::types::{AbsentReason, CseError, SearchOutcome, SearchRequest, SearchResponse};
use crate::config::Settings;
use anyhow::Result;
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info};

/// Client for the Google Custom Search JSON API
#[derive(Debug, Clone)]
pub struct CseClient {
    client: Client,
    endpoint: String,
    api_key: String,
    cse_id: String,
    timeout: Duration,
}

impl CseClient {
    /// Create a client for a specific endpoint and credential pair
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        cse_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).gzip(true).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            cse_id: cse_id.into(),
            timeout,
        })
    }

    /// Create a client from settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.search.endpoint.clone(),
            settings.credentials.api_key.clone(),
            settings.credentials.cse_id.clone(),
            Duration::from_secs(settings.search.api_timeout),
        )
    }

    /// Perform one search query against the CSE API.
    ///
    /// Recoverable failures degrade to [`SearchOutcome::Absent`] after a
    /// log line: missing credentials (no request is made), a timeout, an
    /// API-reported error inside a 2xx response, and an undecodable body.
    /// Transport failures and non-2xx statuses are returned as
    /// [`CseError`] so batch callers can react to them.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, CseError> {
        if self.api_key.is_empty() || self.cse_id.is_empty() {
            error!("API key or CSE ID missing in call to search");
            return Ok(SearchOutcome::Absent(AbsentReason::MissingCredentials));
        }

        // Required fields first; extras are appended and never replace them
        let mut params: Vec<(&str, String)> = vec![
            ("key", self.api_key.clone()),
            ("cx", self.cse_id.clone()),
            ("q", request.query.clone()),
            ("num", request.num_results.to_string()),
            ("start", request.start_index.to_string()),
        ];
        for (key, value) in &request.extra_params {
            params.push((key.as_str(), value.clone()));
        }

        info!(
            "Sending request to Google CSE API for query: '{}' (start: {}, num: {})",
            request.query, request.start_index, request.num_results
        );

        let response = match self
            .client
            .get(&self.endpoint)
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                error!("Google CSE API request timed out for query: {}", request.query);
                return Ok(SearchOutcome::Absent(AbsentReason::Timeout));
            }
            Err(e) => {
                error!(
                    "Network error during CSE API request for query '{}': {}",
                    request.query, e
                );
                return Err(CseError::Network(e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            error!(
                "Google CSE API returned HTTP {} for query '{}'",
                status.as_u16(),
                request.query
            );
            return Err(CseError::Status(status.as_u16()));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => {
                error!("Google CSE API request timed out for query: {}", request.query);
                return Ok(SearchOutcome::Absent(AbsentReason::Timeout));
            }
            Err(e) => {
                error!(
                    "Network error reading CSE API response for query '{}': {}",
                    request.query, e
                );
                return Err(CseError::Network(e));
            }
        };

        let payload: SearchResponse = match serde_json::from_str(&body) {
            Ok(payload) => payload,
            Err(_) => {
                error!(
                    "Failed to decode JSON response from CSE API for query: {}",
                    request.query
                );
                return Ok(SearchOutcome::Absent(AbsentReason::Decode));
            }
        };

        if let Some(api_error) = &payload.error {
            error!(
                "Google API Error: Code {} - {}",
                api_error.code, api_error.message
            );
            return Ok(SearchOutcome::Absent(AbsentReason::Api {
                code: api_error.code,
                message: api_error.message.clone(),
            }));
        }

        Ok(SearchOutcome::Results(payload))
    }
}
