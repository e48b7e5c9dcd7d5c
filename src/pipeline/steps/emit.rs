use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::ProcessorConfig;
use crate::constants::{LINE_ENDING, OUTPUT_FILE_EXTENSION};
use crate::metrics::PipelineMetrics;
use crate::types::{CarrierBucket, CarrierBuckets, Record};

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// A carrier file that was written completely
#[derive(Debug, Clone, Serialize)]
pub struct WrittenFile {
    pub carrier: String,
    pub path: PathBuf,
    pub records: usize,
}

/// A carrier whose file could not be written; the rest of the run is unaffected
#[derive(Debug, Clone, Serialize)]
pub struct FailedOutput {
    pub carrier: String,
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct EmitReport {
    pub written: Vec<WrittenFile>,
    pub failed: Vec<FailedOutput>,
}

impl EmitReport {
    pub fn records_written(&self) -> usize {
        self.written.iter().map(|w| w.records).sum()
    }
}

/// `<prefix>_<carrier>_<timestamp>.csv`, with whitespace runs in the carrier name collapsed to `_`
pub fn output_file_name(prefix: &str, carrier: &str, timestamp: &str) -> String {
    let carrier = WHITESPACE_RUN.replace_all(carrier.trim(), "_");
    format!("{prefix}_{carrier}_{timestamp}.{OUTPUT_FILE_EXTENSION}")
}

/// Serialize a record in input field order
pub fn format_record(record: &Record, delimiter: &str) -> String {
    let version = record.version.to_string();
    [
        record.subscriber_id.as_str(),
        record.first_name.as_str(),
        record.last_name.as_str(),
        version.as_str(),
        record.carrier.as_str(),
    ]
    .join(delimiter)
}

/// Writes one file per carrier into the output folder.
#[derive(Debug, Clone)]
pub struct FileEmitter {
    output_folder: PathBuf,
    prefix: String,
    delimiter: String,
}

impl FileEmitter {
    pub fn new(
        output_folder: impl Into<PathBuf>,
        prefix: impl Into<String>,
        delimiter: impl Into<String>,
    ) -> Self {
        Self {
            output_folder: output_folder.into(),
            prefix: prefix.into(),
            delimiter: delimiter.into(),
        }
    }

    pub fn from_config(config: &ProcessorConfig) -> Self {
        Self::new(
            config.output_folder.clone(),
            config.file_prefix.clone(),
            config.delimiter.clone(),
        )
    }

    pub fn output_path(&self, carrier: &str, timestamp: &str) -> PathBuf {
        self.output_folder
            .join(output_file_name(&self.prefix, carrier, timestamp))
    }

    /// Write every non-empty bucket. A failing carrier is logged and skipped.
    ///
    /// Carrier names that differ only in inner whitespace map to the same file
    /// name; the first bucket keeps the file and later ones are reported as failed.
    pub fn emit(&self, buckets: &CarrierBuckets, timestamp: &str) -> EmitReport {
        let mut report = EmitReport::default();
        let mut claimed: HashSet<PathBuf> = HashSet::new();

        for bucket in buckets.values().filter(|b| !b.is_empty()) {
            let path = self.output_path(&bucket.display_name, timestamp);
            let outcome = if claimed.insert(path.clone()) {
                self.write_bucket(bucket, &path)
            } else {
                Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "file name already used by another carrier in this run",
                ))
            };

            match outcome {
                Ok(()) => {
                    debug!("Wrote {} records to {}", bucket.len(), path.display());
                    PipelineMetrics::record_file_written(bucket.len());
                    report.written.push(WrittenFile {
                        carrier: bucket.display_name.clone(),
                        path,
                        records: bucket.len(),
                    });
                }
                Err(e) => {
                    warn!(
                        "Output file location {} could not be written for carrier {}: {}",
                        path.display(),
                        bucket.display_name,
                        e
                    );
                    PipelineMetrics::record_output_failure();
                    report.failed.push(FailedOutput {
                        carrier: bucket.display_name.clone(),
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }

    fn write_bucket(&self, bucket: &CarrierBucket, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;

        let result = write_records(BufWriter::new(file), &bucket.records, &self.delimiter);
        if result.is_err() {
            // don't leave a truncated carrier file behind
            let _ = fs::remove_file(path);
        }
        result
    }
}

fn write_records<W: Write>(mut writer: W, records: &[Record], delimiter: &str) -> io::Result<()> {
    for record in records {
        writer.write_all(format_record(record, delimiter).as_bytes())?;
        writer.write_all(LINE_ENDING.as_bytes())?;
    }
    writer.flush()
}
