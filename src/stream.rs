//! Restartable record-batch source
//!
//! A source is a single file or a directory of UUID-named files. Each file is
//! line-delimited; every line holds one JSON array of record objects (one
//! batch). Files ending in `.gz` are decompressed on the fly. The stream is
//! lazy and restartable: `batches()` hands out a fresh iterator every time,
//! which is what lets the pipeline read the same input twice without caching
//! records in memory.

use crate::error::{PipelineError, Result};
use crate::record::Record;
use flate2::read::GzDecoder;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

static UUID_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

pub struct RecordStream {
    source: PathBuf,
}

impl RecordStream {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        RecordStream {
            source: source.into(),
        }
    }

    /// Start a fresh pass over the source
    pub fn batches(&self) -> Result<BatchIter> {
        let files = self.resolve_files()?;
        Ok(BatchIter {
            pending: files.into_iter(),
            lines: None,
            current: PathBuf::new(),
        })
    }

    /// A file source is read as-is; a directory source reads only UUID-named
    /// files, in name order so that repeated passes see records in the same
    /// order.
    fn resolve_files(&self) -> Result<Vec<PathBuf>> {
        if !self.source.is_dir() {
            return Ok(vec![self.source.clone()]);
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.source)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let stem = name.strip_suffix(".gz").unwrap_or(name);
            if UUID_NAME_REGEX.is_match(stem) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

/// One pass over the source; yields record batches in source order
pub struct BatchIter {
    pending: std::vec::IntoIter<PathBuf>,
    lines: Option<io::Lines<Box<dyn BufRead>>>,
    current: PathBuf,
}

impl Iterator for BatchIter {
    type Item = Result<Vec<Record>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(lines) = self.lines.as_mut() {
                match lines.next() {
                    Some(Ok(line)) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        return Some(parse_batch(line, &self.current));
                    }
                    Some(Err(e)) => return Some(Err(e.into())),
                    None => self.lines = None,
                }
            }

            let path = self.pending.next()?;
            match open_source(&path) {
                Ok(reader) => {
                    self.current = path;
                    self.lines = Some(reader.lines());
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

fn open_source(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Parse one line as a JSON array of records. SIMD parsing first, serde_json
/// as the fallback; a line neither accepts is malformed input and fatal.
fn parse_batch(line: &str, path: &Path) -> Result<Vec<Record>> {
    let mut bytes = line.as_bytes().to_vec();
    let value: Value = match simd_json::serde::from_slice(&mut bytes) {
        Ok(v) => v,
        Err(_) => serde_json::from_str(line).map_err(|e| {
            PipelineError::MalformedInput(format!("{}: {e}", path.display()))
        })?,
    };

    let Value::Array(items) = value else {
        return Err(PipelineError::MalformedInput(format!(
            "{}: expected a JSON array of records",
            path.display()
        )));
    };

    items.iter().map(Record::from_value).collect()
}
