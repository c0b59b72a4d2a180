//! JSONL output handling

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::error;

/// Line-oriented JSON writer where one bad record never aborts the file
pub struct JsonlWriter {
    inner: BufWriter<File>,
    written: usize,
}

impl JsonlWriter {
    /// Create (or truncate) the file at `path`
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref())
            .with_context(|| format!("Failed to open output file {}", path.as_ref().display()))?;
        Ok(Self {
            inner: BufWriter::new(file),
            written: 0,
        })
    }

    /// Serialize and write one record as a JSON line.
    ///
    /// Serialization or write failures are logged and reported as `false`
    /// so the caller can keep writing the remaining records.
    pub fn write_record<T: Serialize>(&mut self, record: &T) -> bool {
        let line = match serde_json::to_string(record) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to serialize record: {}", e);
                return false;
            }
        };

        let result = self
            .inner
            .write_all(line.as_bytes())
            .and_then(|_| self.inner.write_all(b"\n"));
        if let Err(e) = result {
            error!("Failed to write record: {}", e);
            return false;
        }

        self.written += 1;
        true
    }

    /// Number of records successfully written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush buffered lines to disk
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().context("Failed to flush output file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Record {
        name: String,
        rank: u32,
    }

    #[test]
    fn test_writes_one_json_object_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");

        let mut writer = JsonlWriter::create(&path).unwrap();
        assert!(writer.write_record(&Record {
            name: "first".to_string(),
            rank: 1,
        }));
        assert!(writer.write_record(&Record {
            name: "ủy ban".to_string(),
            rank: 2,
        }));
        writer.flush().unwrap();
        assert_eq!(writer.written(), 2);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let second: Record = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.name, "ủy ban");
    }

    #[test]
    fn test_create_in_missing_dir_is_an_error() {
        assert!(JsonlWriter::create("no/such/dir/out.jsonl").is_err());
    }
}
