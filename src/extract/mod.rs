//! Main-text extraction from result pages
//!
//! Fetches a result URL with a browser-like User-Agent and pulls the main
//! text out of the HTML body. Every failure degrades to "no text" so one
//! bad page never stops a batch.

use crate::config::Settings;
use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Fetches result pages and extracts their main text
#[derive(Debug, Clone)]
pub struct TextExtractor {
    client: Client,
}

impl TextExtractor {
    /// Create an extractor with a fixed timeout and User-Agent
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .gzip(true)
            .build()?;

        Ok(Self { client })
    }

    /// Create an extractor from settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            Duration::from_secs(settings.extraction.timeout),
            &settings.extraction.user_agent,
        )
    }

    /// Fetch `url` and extract its main text.
    ///
    /// Returns `None` on any failure: request errors, non-2xx statuses,
    /// non-HTML content types, empty bodies, or pages with no extractable
    /// main text.
    pub async fn extract(&self, url: &str) -> Option<String> {
        debug!("Attempting text extraction from: {}", url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                error!("Timeout occurred while fetching URL for extraction: {}", url);
                return None;
            }
            Err(e) if e.is_redirect() => {
                error!("Too many redirects for URL: {}", url);
                return None;
            }
            Err(e) => {
                error!("Extraction error fetching {}: {}", url, e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            error!("HTTP {} fetching {} for extraction", status.as_u16(), url);
            return None;
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !content_type.contains("html") && !content_type.contains("xml") {
            warn!(
                "Content type '{}' for URL {} not HTML/XML. Skipping extraction.",
                content_type, url
            );
            return None;
        }

        let html = match response.text().await {
            Ok(html) if !html.is_empty() => html,
            Ok(_) => {
                warn!("No HTML content retrieved from {}", url);
                return None;
            }
            Err(e) => {
                error!("Failed to read body from {}: {}", url, e);
                return None;
            }
        };

        match extract_main_text(&html) {
            Some(text) => {
                debug!("Successfully extracted text from: {}", url);
                Some(text)
            }
            None => {
                // A page without extractable main text is not an error
                info!("No main text found in: {}", url);
                None
            }
        }
    }
}

/// Pull the main text out of an HTML document.
///
/// Prefers paragraphs inside `<article>`/`<main>` containers; falls back
/// to all paragraph text when the page has no such container.
pub fn extract_main_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let container_selector = Selector::parse("article, main").unwrap();
    let paragraph_selector = Selector::parse("p").unwrap();

    let mut paragraphs: Vec<String> = Vec::new();
    for container in document.select(&container_selector) {
        for paragraph in container.select(&paragraph_selector) {
            push_text(&mut paragraphs, paragraph);
        }
    }

    if paragraphs.is_empty() {
        for paragraph in document.select(&paragraph_selector) {
            push_text(&mut paragraphs, paragraph);
        }
    }

    if paragraphs.is_empty() {
        return None;
    }

    let text = paragraphs.join("\n");
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn push_text(paragraphs: &mut Vec<String>, element: ElementRef<'_>) {
    let text = element.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if !text.is_empty() {
        paragraphs.push(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_prefers_article_content() {
        let html = r#"
            <html><body>
                <nav><p>navigation junk</p></nav>
                <article>
                    <p>First paragraph.</p>
                    <p>Second   paragraph.</p>
                </article>
            </body></html>
        "#;
        let text = extract_main_text(html).unwrap();
        assert_eq!(text, "First paragraph.\nSecond paragraph.");
    }

    #[test]
    fn test_falls_back_to_paragraphs() {
        let html = "<html><body><p>Only paragraph here.</p></body></html>";
        let text = extract_main_text(html).unwrap();
        assert_eq!(text, "Only paragraph here.");
    }

    #[test]
    fn test_no_text_yields_none() {
        assert!(extract_main_text("<html><body><div>no paragraphs</div></body></html>").is_none());
        assert!(extract_main_text("").is_none());
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        let html = "<html><body><p>  spaced \n  out\ttext  </p></body></html>";
        let text = extract_main_text(html).unwrap();
        assert_eq!(text, "spaced out text");
    }

    #[tokio::test]
    async fn test_extract_from_html_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                "<html><body><article><p>Hello world.</p></article></body></html>",
                "text/html; charset=utf-8",
            ))
            .mount(&server)
            .await;

        let extractor =
            TextExtractor::new(Duration::from_secs(1), "test-agent/1.0").unwrap();
        let text = extractor.extract(&format!("{}/page", server.uri())).await;
        assert_eq!(text.as_deref(), Some("Hello world."));
    }

    #[tokio::test]
    async fn test_non_html_content_is_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/file.pdf"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"),
            )
            .mount(&server)
            .await;

        let extractor =
            TextExtractor::new(Duration::from_secs(1), "test-agent/1.0").unwrap();
        let text = extractor.extract(&format!("{}/file.pdf", server.uri())).await;
        assert!(text.is_none());
    }

    #[tokio::test]
    async fn test_http_error_yields_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let extractor =
            TextExtractor::new(Duration::from_secs(1), "test-agent/1.0").unwrap();
        let text = extractor.extract(&format!("{}/missing", server.uri())).await;
        assert!(text.is_none());
    }
}
