//! Query input handling

use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// Read the unique, non-empty values of one column from a CSV/TSV file.
///
/// The delimiter is inferred from the file extension (`.tsv` means tab).
/// Values are trimmed; empties and duplicates are dropped, keeping the
/// order of first appearance.
pub fn read_queries<P: AsRef<Path>>(path: P, column: &str) -> Result<Vec<String>> {
    let path = path.as_ref();
    info!(
        "Reading queries from column '{}' of {}",
        column,
        path.display()
    );

    let delimiter = match path.extension().and_then(|ext| ext.to_str()) {
        Some("tsv") => b'\t',
        _ => b',',
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open query file {}", path.display()))?;

    let headers = reader
        .headers()
        .context("Failed to read header row")?
        .clone();
    let column_index = match headers.iter().position(|header| header == column) {
        Some(index) => index,
        None => bail!(
            "Query column '{}' not found. Available columns: {:?}",
            column,
            headers.iter().collect::<Vec<_>>()
        ),
    };

    let mut seen = HashSet::new();
    let mut queries = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to read query record")?;
        let Some(value) = record.get(column_index) else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if seen.insert(value.to_string()) {
            queries.push(value.to_string());
        }
    }

    info!(
        "Read {} unique, non-empty queries from column '{}'",
        queries.len(),
        column
    );
    if queries.is_empty() {
        warn!("No valid, non-empty queries found in the specified column");
    }
    Ok(queries)
}
