//! Request and response types for the CSE API

use serde::Deserialize;
use thiserror::Error;

/// Parameters for a single CSE query
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Search query text
    pub query: String,
    /// Results per page (the API accepts 1-10)
    pub num_results: u8,
    /// 1-based start index for pagination
    pub start_index: u32,
    /// Extra query parameters passed through verbatim, in order
    pub extra_params: Vec<(String, String)>,
}

impl SearchRequest {
    /// Create a request with default pagination (10 results, start at 1)
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            num_results: crate::config::DEFAULT_NUM_RESULTS,
            start_index: 1,
            extra_params: Vec::new(),
        }
    }

    /// Set the number of results per page
    pub fn with_num_results(mut self, num_results: u8) -> Self {
        self.num_results = num_results;
        self
    }

    /// Set the 1-based start index
    pub fn with_start_index(mut self, start_index: u32) -> Self {
        self.start_index = start_index;
        self
    }

    /// Append a passthrough query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_params.push((key.into(), value.into()));
        self
    }
}

/// Raw payload returned by the CSE API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    /// Result entries; absent when the query matched nothing
    pub items: Option<Vec<SearchItem>>,
    /// API-level error reported inside a 2xx response
    pub error: Option<ApiError>,
}

/// A single raw result entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub snippet: Option<String>,
}

/// Error object embedded in a CSE response body
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Outcome of a CSE query: a payload, or a recoverable "no result"
#[derive(Debug)]
pub enum SearchOutcome {
    /// The API answered with a usable payload
    Results(SearchResponse),
    /// No usable result; the reason was logged
    Absent(AbsentReason),
}

impl SearchOutcome {
    /// The payload, if the query produced one
    pub fn results(&self) -> Option<&SearchResponse> {
        match self {
            Self::Results(payload) => Some(payload),
            Self::Absent(_) => None,
        }
    }

    /// The absent reason, if the query produced none
    pub fn absent_reason(&self) -> Option<&AbsentReason> {
        match self {
            Self::Results(_) => None,
            Self::Absent(reason) => Some(reason),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent(_))
    }
}

/// Why a query produced no usable result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbsentReason {
    /// API key or CSE id missing; no request was made
    MissingCredentials,
    /// The request exceeded the configured timeout
    Timeout,
    /// The API reported an error inside a 2xx response
    Api { code: i64, message: String },
    /// The response body was not valid JSON
    Decode,
}

impl std::fmt::Display for AbsentReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredentials => write!(f, "API key or CSE ID missing"),
            Self::Timeout => write!(f, "request timed out"),
            Self::Api { code, message } => write!(f, "API error {}: {}", code, message),
            Self::Decode => write!(f, "failed to decode response"),
        }
    }
}

/// Transport-level failures; the one error channel that propagates
#[derive(Debug, Error)]
pub enum CseError {
    #[error("HTTP error: {0}")]
    Status(u16),
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = SearchRequest::new("rust language");
        assert_eq!(request.query, "rust language");
        assert_eq!(request.num_results, 10);
        assert_eq!(request.start_index, 1);
        assert!(request.extra_params.is_empty());
    }

    #[test]
    fn test_request_builder() {
        let request = SearchRequest::new("rust")
            .with_num_results(5)
            .with_start_index(11)
            .param("siteSearch", "example.com");
        assert_eq!(request.num_results, 5);
        assert_eq!(request.start_index, 11);
        assert_eq!(
            request.extra_params,
            vec![("siteSearch".to_string(), "example.com".to_string())]
        );
    }

    #[test]
    fn test_response_deserialization() {
        let body = r#"{
            "items": [
                {"title": "A", "link": "https://a.com", "snippet": "s1"},
                {"link": "https://b.com"}
            ]
        }"#;
        let payload: SearchResponse = serde_json::from_str(body).unwrap();
        let items = payload.items.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title.as_deref(), Some("A"));
        assert!(items[1].title.is_none());
        assert!(payload.error.is_none());
    }

    #[test]
    fn test_error_deserialization() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded"}}"#;
        let payload: SearchResponse = serde_json::from_str(body).unwrap();
        let error = payload.error.unwrap();
        assert_eq!(error.code, 429);
        assert_eq!(error.message, "Quota exceeded");
    }

    #[test]
    fn test_outcome_accessors() {
        let absent = SearchOutcome::Absent(AbsentReason::Timeout);
        assert!(absent.is_absent());
        assert!(absent.results().is_none());
        assert_eq!(absent.absent_reason(), Some(&AbsentReason::Timeout));

        let results = SearchOutcome::Results(SearchResponse::default());
        assert!(!results.is_absent());
        assert!(results.results().is_some());
    }
}
