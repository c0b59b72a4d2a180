//! Pipeline record and accounting types

use serde::Serialize;
use std::path::PathBuf;

/// A normalized search hit annotated with its originating query, page,
/// and approximate rank
#[derive(Debug, Clone, Serialize)]
pub struct RawSearchRecord {
    pub query: String,
    pub search_page: u32,
    pub approx_rank: u32,
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// Extracted page text for one search hit
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedRecord {
    pub query: String,
    pub search_page: u32,
    pub approx_rank: u32,
    pub url: String,
    pub title: String,
    /// `None` when the fetch or extraction failed
    pub extracted_text: Option<String>,
}

/// Per-query and per-run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Raw search records produced
    pub raw_saved: usize,
    /// Result URLs handed to the extractor
    pub urls_processed: usize,
    /// Extractions that yielded text
    pub extractions_success: usize,
}

impl Counters {
    pub fn merge(&mut self, other: &Counters) {
        self.raw_saved += other.raw_saved;
        self.urls_processed += other.urls_processed;
        self.extractions_success += other.extractions_success;
    }
}

/// Totals reported at the end of a run
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub queries_processed: usize,
    pub total_queries: usize,
    pub counters: Counters,
    pub raw_lines_written: usize,
    pub extracted_lines_written: usize,
    pub raw_batch_dir: PathBuf,
    pub extracted_batch_dir: PathBuf,
}

impl Summary {
    /// Print the end-of-run summary block
    pub fn print(&self, input_file: &str, query_column: &str, batch_size: usize) {
        println!("\n--- Processing Summary ---");
        println!("Input file: {} (column: '{}')", input_file, query_column);
        println!(
            "Processed {} out of {} total queries.",
            self.queries_processed, self.total_queries
        );
        println!("Batch size: {}", batch_size);
        println!(
            "Total raw search results generated: {}",
            self.counters.raw_saved
        );
        println!(
            "Total URLs processed for extraction: {}",
            self.counters.urls_processed
        );
        println!(
            "Total successful text extractions: {}",
            self.counters.extractions_success
        );
        println!(
            "Total raw result lines written to batch files: {}",
            self.raw_lines_written
        );
        println!(
            "Total extracted text lines written to batch files: {}",
            self.extracted_lines_written
        );
        println!(
            "Raw search batch files saved in: {}/",
            self.raw_batch_dir.display()
        );
        println!(
            "Extracted text batch files saved in: {}/",
            self.extracted_batch_dir.display()
        );
        println!("------------------------\n");
    }
}
