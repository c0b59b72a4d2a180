//! Pipeline execution

use super::models::{Counters, ExtractedRecord, RawSearchRecord, Summary};
use crate::config::Settings;
use crate::cse::{CseClient, SearchRequest};
use crate::data::JsonlWriter;
use crate::extract::TextExtractor;
use crate::results;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Runs the search -> normalize -> extract -> write pipeline over a query
/// list, in batches
pub struct Pipeline {
    cse: CseClient,
    extractor: TextExtractor,
    settings: Settings,
}

impl Pipeline {
    /// Build the pipeline clients from settings
    pub fn new(settings: Settings) -> Result<Self> {
        let cse = CseClient::from_settings(&settings)?;
        let extractor = TextExtractor::from_settings(&settings)?;
        Ok(Self {
            cse,
            extractor,
            settings,
        })
    }

    /// Process every query and write per-batch JSONL files
    pub async fn run(&self, queries: &[String]) -> Result<Summary> {
        let raw_dir = batch_dir(&self.settings.output.search_base);
        let extracted_dir = batch_dir(&self.settings.output.extracted_base);
        std::fs::create_dir_all(&raw_dir)
            .with_context(|| format!("Failed to create output directory {}", raw_dir.display()))?;
        std::fs::create_dir_all(&extracted_dir).with_context(|| {
            format!(
                "Failed to create output directory {}",
                extracted_dir.display()
            )
        })?;
        info!("Raw search batch results -> {}/", raw_dir.display());
        info!(
            "Extracted text batch results -> {}/",
            extracted_dir.display()
        );

        let batch_size = self.settings.output.batch_size.max(1);
        let num_batches = queries.len().div_ceil(batch_size);
        info!(
            "Processing {} queries in {} batches of size {}.",
            queries.len(),
            num_batches,
            batch_size
        );

        let delay = Duration::from_secs_f64(self.settings.search.request_delay.max(0.0));
        let mut summary = Summary {
            total_queries: queries.len(),
            raw_batch_dir: raw_dir.clone(),
            extracted_batch_dir: extracted_dir.clone(),
            ..Default::default()
        };

        for (batch_index, batch) in queries.chunks(batch_size).enumerate() {
            let batch_start = Instant::now();
            let mut batch_raw: Vec<RawSearchRecord> = Vec::new();
            let mut batch_extracted: Vec<ExtractedRecord> = Vec::new();

            for query in batch {
                if summary.queries_processed > 0 && !delay.is_zero() {
                    debug!(
                        "Waiting {:.2} seconds before next query...",
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                }

                let (counters, raw, extracted) = self.process_query(query).await;
                summary.counters.merge(&counters);
                batch_raw.extend(raw);
                batch_extracted.extend(extracted);
                summary.queries_processed += 1;
            }

            info!(
                "Batch {} completed processing {} queries in {:.2?}.",
                batch_index + 1,
                batch.len(),
                batch_start.elapsed()
            );

            summary.raw_lines_written += write_batch(
                &raw_dir,
                &self.settings.output.search_base,
                batch_index + 1,
                &batch_raw,
            );
            summary.extracted_lines_written += write_batch(
                &extracted_dir,
                &self.settings.output.extracted_base,
                batch_index + 1,
                &batch_extracted,
            );
        }

        Ok(summary)
    }

    /// Process all pages for a single query.
    ///
    /// A transport error is logged and stops paging for this query only;
    /// the batch continues with the next query.
    async fn process_query(
        &self,
        query: &str,
    ) -> (Counters, Vec<RawSearchRecord>, Vec<ExtractedRecord>) {
        let mut counters = Counters::default();
        let mut raw_records = Vec::new();
        let mut extracted_records = Vec::new();
        let query_short = shorten(query);

        let num_results = self.settings.search.num_results;
        for page in 0..self.settings.search.pages {
            let start_index = page * num_results as u32 + 1;
            debug!(
                "Fetching page {} (start index {}) for query '{}'",
                page + 1,
                start_index,
                query_short
            );

            let mut request = SearchRequest::new(query)
                .with_num_results(num_results)
                .with_start_index(start_index);
            if let Some(site) = &self.settings.search.site_search {
                request = request.param("siteSearch", site.clone());
            }

            let outcome = match self.cse.search(&request).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(
                        "Stopping processing for query '{}' due to CSE API error: {}",
                        query_short, e
                    );
                    break;
                }
            };

            let payload = match outcome.results() {
                Some(payload) => payload,
                None => {
                    warn!(
                        "No results or error from CSE API for query '{}', page {}. Stopping page fetch.",
                        query_short,
                        page + 1
                    );
                    break;
                }
            };

            let records = results::normalize(Some(payload));
            if records.is_empty() {
                info!(
                    "No valid URLs found in results for query '{}', page {}. Stopping page fetch.",
                    query_short,
                    page + 1
                );
                break;
            }

            let fewer_than_requested = records.len() < num_results as usize;
            for (result_index, record) in records.iter().enumerate() {
                let approx_rank = start_index + result_index as u32;

                raw_records.push(RawSearchRecord {
                    query: query.to_string(),
                    search_page: page + 1,
                    approx_rank,
                    title: record.title.clone(),
                    link: record.link.clone(),
                    snippet: record.snippet.clone(),
                });
                counters.raw_saved += 1;

                counters.urls_processed += 1;
                if let Some(host) = record.hostname() {
                    debug!("Extracting text from {} (rank {})", host, approx_rank);
                }
                let extracted_text = self.extractor.extract(&record.link).await;
                if extracted_text.is_some() {
                    counters.extractions_success += 1;
                } else {
                    debug!(
                        "Extraction failed or yielded no content for URL: {}",
                        record.link
                    );
                }

                extracted_records.push(ExtractedRecord {
                    query: query.to_string(),
                    search_page: page + 1,
                    approx_rank,
                    url: record.link.clone(),
                    title: record.title.clone(),
                    extracted_text,
                });
            }

            if fewer_than_requested {
                info!(
                    "Received fewer results ({}) than requested ({}) for query '{}', page {}; stopping page fetch.",
                    records.len(),
                    num_results,
                    query_short,
                    page + 1
                );
                break;
            }
        }

        info!(
            "Finished pages for query '{}'. Raw results: {}. URLs processed: {} ({} successful).",
            query_short, counters.raw_saved, counters.urls_processed, counters.extractions_success
        );
        (counters, raw_records, extracted_records)
    }
}

/// `<dir>/<name>_batches` for an output base like `results/raw_search`
fn batch_dir(base: &str) -> PathBuf {
    let base = Path::new(base);
    let name = base
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("output");
    let dir = base
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    dir.join(format!("{}_batches", name))
}

/// `<dir>/<name>_<index>.jsonl` for one batch
fn batch_file(dir: &Path, base: &str, index: usize) -> PathBuf {
    let name = Path::new(base)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("output");
    dir.join(format!("{}_{}.jsonl", name, index))
}

/// Truncate long queries for log lines
fn shorten(query: &str) -> String {
    const MAX_CHARS: usize = 35;
    if query.chars().count() > MAX_CHARS {
        let truncated: String = query.chars().take(MAX_CHARS).collect();
        format!("{}...", truncated)
    } else {
        query.to_string()
    }
}

/// Write one batch file; returns the number of lines written
fn write_batch<T: Serialize>(dir: &Path, base: &str, index: usize, records: &[T]) -> usize {
    let path = batch_file(dir, base, index);
    info!("Saving batch {} results -> {}", index, path.display());

    let mut writer = match JsonlWriter::create(&path) {
        Ok(writer) => writer,
        Err(e) => {
            error!("Failed to open batch file {}: {}", path.display(), e);
            return 0;
        }
    };

    for record in records {
        writer.write_record(record);
    }
    let written = writer.written();
    if let Err(e) = writer.flush() {
        error!("Failed to flush batch file {}: {}", path.display(), e);
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path as url_path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_batch_dir_naming() {
        assert_eq!(
            batch_dir("results/raw_search"),
            PathBuf::from("results/raw_search_batches")
        );
        assert_eq!(batch_dir("raw"), PathBuf::from("./raw_batches"));
    }

    #[test]
    fn test_batch_file_naming() {
        let dir = PathBuf::from("results/raw_search_batches");
        assert_eq!(
            batch_file(&dir, "results/raw_search", 3),
            PathBuf::from("results/raw_search_batches/raw_search_3.jsonl")
        );
    }

    #[test]
    fn test_shorten_long_queries() {
        assert_eq!(shorten("short"), "short");
        let long = "x".repeat(50);
        let short = shorten(&long);
        assert_eq!(short.chars().count(), 38);
        assert!(short.ends_with("..."));
    }

    #[tokio::test]
    async fn test_single_query_end_to_end() {
        let server = MockServer::start().await;

        // Result page served by the same mock server
        let page_url = format!("{}/article", server.uri());
        Mock::given(method("GET"))
            .and(url_path("/article"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                "<html><body><article><p>Extracted body text.</p></article></body></html>",
                "text/html",
            ))
            .mount(&server)
            .await;

        // CSE endpoint returning one valid and one filtered item
        let cse_body = format!(
            r#"{{"items": [
                {{"title": "Kept", "link": "{}", "snippet": "s"}},
                {{"title": "Dropped", "link": "ftp://nope"}}
            ]}}"#,
            page_url
        );
        Mock::given(method("GET"))
            .and(url_path("/customsearch/v1"))
            .and(query_param("q", "test query"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(cse_body, "application/json"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.credentials.api_key = "test-key".to_string();
        settings.credentials.cse_id = "test-cx".to_string();
        settings.search.endpoint = format!("{}/customsearch/v1", server.uri());
        settings.search.request_delay = 0.0;
        settings.output.search_base = dir
            .path()
            .join("raw_search")
            .to_str()
            .unwrap()
            .to_string();
        settings.output.extracted_base = dir
            .path()
            .join("extracted_text")
            .to_str()
            .unwrap()
            .to_string();

        let pipeline = Pipeline::new(settings).unwrap();
        let queries = vec!["test query".to_string()];
        let summary = pipeline.run(&queries).await.unwrap();

        assert_eq!(summary.queries_processed, 1);
        assert_eq!(summary.counters.raw_saved, 1);
        assert_eq!(summary.counters.urls_processed, 1);
        assert_eq!(summary.counters.extractions_success, 1);
        assert_eq!(summary.raw_lines_written, 1);
        assert_eq!(summary.extracted_lines_written, 1);

        let raw_file = dir.path().join("raw_search_batches/raw_search_1.jsonl");
        let content = std::fs::read_to_string(raw_file).unwrap();
        let record: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(record["title"], "Kept");
        assert_eq!(record["approx_rank"], 1);

        let extracted_file = dir
            .path()
            .join("extracted_text_batches/extracted_text_1.jsonl");
        let content = std::fs::read_to_string(extracted_file).unwrap();
        let record: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(record["extracted_text"], "Extracted body text.");
    }

    #[tokio::test]
    async fn test_transport_error_stops_query_not_batch() {
        // Nothing listening: every CSE call fails with a network error
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.credentials.api_key = "test-key".to_string();
        settings.credentials.cse_id = "test-cx".to_string();
        settings.search.endpoint = format!("http://{}", addr);
        settings.search.request_delay = 0.0;
        settings.output.search_base = dir.path().join("raw").to_str().unwrap().to_string();
        settings.output.extracted_base = dir.path().join("text").to_str().unwrap().to_string();

        let pipeline = Pipeline::new(settings).unwrap();
        let queries = vec!["one".to_string(), "two".to_string()];
        let summary = pipeline.run(&queries).await.unwrap();

        // Both queries were attempted despite the failures
        assert_eq!(summary.queries_processed, 2);
        assert_eq!(summary.counters.raw_saved, 0);
    }
}
