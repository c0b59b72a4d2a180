//! Settings structures for the extraction pipeline

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Google CSE API endpoint
pub const GOOGLE_API_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Results per CSE request (the API accepts at most 10)
pub const DEFAULT_NUM_RESULTS: u8 = 10;

/// Delay between CSE API calls (seconds)
pub const DEFAULT_REQUEST_DELAY: f64 = 1.0;

/// Timeout for CSE API requests (seconds)
pub const CSE_API_TIMEOUT: u64 = 15;

/// Timeout for fetching each result URL (seconds)
pub const DEFAULT_EXTRACTION_TIMEOUT: u64 = 15;

/// User-Agent sent when fetching result pages
pub const EXTRACTION_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Default base path and prefix for raw search batch files
pub const DEFAULT_SEARCH_OUTPUT_BASE: &str = "results/raw_search";

/// Default base path and prefix for extracted text batch files
pub const DEFAULT_EXTRACTED_OUTPUT_BASE: &str = "results/extracted_text";

/// Main settings structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub credentials: CredentialSettings,
    pub search: SearchSettings,
    pub extraction: ExtractionSettings,
    pub output: OutputSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            credentials: CredentialSettings::default(),
            search: SearchSettings::default(),
            extraction: ExtractionSettings::default(),
            output: OutputSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge credentials from environment variables
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("GOOGLE_CUSTOM_SEARCH_API_KEY") {
            self.credentials.api_key = val;
        }
        if let Ok(val) = std::env::var("GOOGLE_CSE_ID") {
            self.credentials.cse_id = val;
        }
    }

    /// Basic check that the essential API credentials are present
    pub fn validate(&self) -> Result<()> {
        if self.credentials.api_key.is_empty() {
            bail!("Configuration Error: GOOGLE_CUSTOM_SEARCH_API_KEY not found in environment/.env");
        }
        if self.credentials.cse_id.is_empty() {
            bail!("Configuration Error: GOOGLE_CSE_ID not found in environment/.env");
        }
        Ok(())
    }
}

/// Google API credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSettings {
    /// Google Custom Search API key
    pub api_key: String,
    /// Custom Search Engine identifier (cx)
    pub cse_id: String,
}

/// Search behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// CSE API endpoint URL
    pub endpoint: String,
    /// Results per page (1-10)
    pub num_results: u8,
    /// Number of result pages to fetch per query
    pub pages: u32,
    /// Delay between CSE API calls (seconds)
    pub request_delay: f64,
    /// Timeout for CSE API requests (seconds)
    pub api_timeout: u64,
    /// Restrict search to a specific site (passed through as `siteSearch`)
    pub site_search: Option<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: GOOGLE_API_URL.to_string(),
            num_results: DEFAULT_NUM_RESULTS,
            pages: 1,
            request_delay: DEFAULT_REQUEST_DELAY,
            api_timeout: CSE_API_TIMEOUT,
            site_search: None,
        }
    }
}

/// Text extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Timeout for fetching each result URL (seconds)
    pub timeout: u64,
    /// User-Agent header for result page fetches
    pub user_agent: String,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_EXTRACTION_TIMEOUT,
            user_agent: EXTRACTION_USER_AGENT.to_string(),
        }
    }
}

/// Output file settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Base path and prefix for raw search batch files
    pub search_base: String,
    /// Base path and prefix for extracted text batch files
    pub extracted_base: String,
    /// Number of queries processed between batch writes
    pub batch_size: usize,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            search_base: DEFAULT_SEARCH_OUTPUT_BASE.to_string(),
            extracted_base: DEFAULT_EXTRACTED_OUTPUT_BASE.to_string(),
            batch_size: 10,
        }
    }
}
