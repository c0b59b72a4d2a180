//! Batch pipeline orchestration
//!
//! Searches each query page by page, extracts text from every kept
//! result, and writes raw and extracted records to per-batch JSONL files.

mod models;
mod runner;

pub use models::{Counters, ExtractedRecord, RawSearchRecord, Summary};
pub use runner::Pipeline;
