use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use super::steps::{
    partition, resolve_versions, sort_buckets, FailedOutput, FileEmitter, LineParser, Rejection,
    WrittenFile,
};
use crate::config::ProcessorConfig;
use crate::constants::FILE_TIMESTAMP_FORMAT;
use crate::error::{EnrollmentError, Result};
use crate::metrics::PipelineMetrics;
use crate::types::Record;

// Progress output is switched by `output_info`; warnings and errors are not.
macro_rules! progress {
    ($processor:expr, $($arg:tt)+) => {
        if $processor.config.output_info {
            info!($($arg)+);
        }
    };
}

/// Where a run currently is. `Failed` can follow any stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Idle,
    ValidatingInputPath,
    ReadingAndParsing,
    Partitioning,
    ResolvingVersions,
    Sorting,
    Writing,
    Done,
    Failed,
}

impl RunStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStage::Idle => "idle",
            RunStage::ValidatingInputPath => "validating_input_path",
            RunStage::ReadingAndParsing => "reading_and_parsing",
            RunStage::Partitioning => "partitioning",
            RunStage::ResolvingVersions => "resolving_versions",
            RunStage::Sorting => "sorting",
            RunStage::Writing => "writing",
            RunStage::Done => "done",
            RunStage::Failed => "failed",
        }
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line skipped in lenient mode
#[derive(Debug, Clone, Serialize)]
pub struct RejectedLine {
    pub line_number: usize,
    pub line: String,
    pub reason: String,
}

/// Result of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input_path: PathBuf,
    pub timestamp: String,
    pub lines_read: usize,
    pub header_skipped: bool,
    pub accepted: usize,
    pub rejected: Vec<RejectedLine>,
    pub carriers: usize,
    pub records_written: usize,
    pub files_written: Vec<WrittenFile>,
    pub failed_outputs: Vec<FailedOutput>,
}

#[derive(Debug, Default)]
struct ReadOutcome {
    records: Vec<Record>,
    lines_read: usize,
    header_skipped: bool,
    rejected: Vec<RejectedLine>,
}

/// Runs an enrollment file through parse, partition, resolve, sort and write.
///
/// The processor only holds configuration; every run builds its own carrier
/// buckets, so one processor can serve any number of sequential runs.
pub struct EnrollmentProcessor {
    config: ProcessorConfig,
    parser: LineParser,
    emitter: FileEmitter,
}

impl EnrollmentProcessor {
    pub fn new(config: ProcessorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            parser: LineParser::new(config.delimiter.clone()),
            emitter: FileEmitter::from_config(&config),
            config,
        })
    }

    /// Process `file_name` from the input folder, stamping output with the current local time.
    pub fn process_file(&self, file_name: &str) -> Result<RunSummary> {
        self.process_file_at(file_name, Local::now().naive_local())
    }

    /// Process `file_name`, using `started_at` as the timestamp shared by every output file.
    pub fn process_file_at(&self, file_name: &str, started_at: NaiveDateTime) -> Result<RunSummary> {
        PipelineMetrics::record_run_started();

        let mut stage = RunStage::Idle;
        let result = self.run_stages(file_name, started_at, &mut stage);

        if let Err(e) = &result {
            error!("Run failed during {}: {}", stage, e);
            PipelineMetrics::record_run_failed(stage.as_str());
            self.enter(&mut stage, RunStage::Failed);
        }

        result
    }

    fn run_stages(
        &self,
        file_name: &str,
        started_at: NaiveDateTime,
        stage: &mut RunStage,
    ) -> Result<RunSummary> {
        self.enter(stage, RunStage::ValidatingInputPath);
        let input_path = self.resolve_input_path(file_name)?;

        self.enter(stage, RunStage::ReadingAndParsing);
        progress!(self, "Extracting enrollment entries from {}...", input_path.display());
        let outcome = self.read_records(&input_path)?;
        progress!(
            self,
            "Read {} lines: {} accepted, {} rejected",
            outcome.lines_read,
            outcome.records.len(),
            outcome.rejected.len()
        );
        let accepted = outcome.records.len();

        self.enter(stage, RunStage::Partitioning);
        let buckets = partition(outcome.records);
        progress!(self, "Grouped entries into {} carriers", buckets.len());

        self.enter(stage, RunStage::ResolvingVersions);
        progress!(self, "Condensing multiple subscriber entries...");
        let buckets = resolve_versions(buckets);

        self.enter(stage, RunStage::Sorting);
        progress!(self, "Sorting enrollment entries...");
        let buckets = sort_buckets(buckets);

        self.enter(stage, RunStage::Writing);
        progress!(self, "Writing insurance carrier files...");
        let timestamp = started_at.format(FILE_TIMESTAMP_FORMAT).to_string();
        let report = self.emitter.emit(&buckets, &timestamp);
        for written in &report.written {
            progress!(
                self,
                "Wrote {} entries for {} to {}",
                written.records,
                written.carrier,
                written.path.display()
            );
        }

        self.enter(stage, RunStage::Done);
        progress!(
            self,
            "Finished: {} files written, {} carriers failed",
            report.written.len(),
            report.failed.len()
        );

        Ok(RunSummary {
            input_path,
            timestamp,
            lines_read: outcome.lines_read,
            header_skipped: outcome.header_skipped,
            accepted,
            rejected: outcome.rejected,
            carriers: buckets.len(),
            records_written: report.records_written(),
            files_written: report.written,
            failed_outputs: report.failed,
        })
    }

    fn enter(&self, stage: &mut RunStage, next: RunStage) {
        debug!(from = %stage, to = %next, "stage transition");
        *stage = next;
    }

    fn resolve_input_path(&self, file_name: &str) -> Result<PathBuf> {
        if file_name.trim().is_empty() {
            return Err(EnrollmentError::EmptyFileName);
        }

        let path = self.config.input_folder.join(file_name);
        if !path.exists() {
            return Err(EnrollmentError::InputNotFound(path));
        }
        if path.is_dir() {
            return Err(EnrollmentError::InputIsDirectory(path));
        }
        Ok(path)
    }

    fn read_records(&self, path: &Path) -> Result<ReadOutcome> {
        let reader = BufReader::new(File::open(path)?);
        let mut outcome = ReadOutcome::default();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = index + 1;
            outcome.lines_read += 1;

            if self.config.has_header && index == 0 {
                outcome.header_skipped = true;
                continue;
            }

            match self.parser.parse(&line) {
                Ok(record) => {
                    PipelineMetrics::record_line_accepted();
                    outcome.records.push(record);
                }
                Err(reason) => {
                    PipelineMetrics::record_line_rejected(reason.kind());
                    self.report_rejection(line_number, &line, &reason);

                    if self.config.stop_on_malformed_entry {
                        return Err(EnrollmentError::MalformedLine {
                            line_number,
                            line,
                            reason,
                        });
                    }

                    outcome.rejected.push(RejectedLine {
                        line_number,
                        line,
                        reason: reason.to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }

    fn report_rejection(&self, line_number: usize, line: &str, reason: &Rejection) {
        if !self.config.output_info {
            return;
        }

        warn!("Line {} rejected: {} in entry '{}'", line_number, reason, line);
        if let Rejection::WrongFieldCount { expected, actual } = reason {
            warn!("Expected: {}, Actual: {}", expected, actual);
            warn!(
                "Check entry matches expected format and fields do not contain the delimiter '{}'",
                self.parser.delimiter()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        input: PathBuf,
        output: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        fs::create_dir_all(&input).unwrap();
        fs::create_dir_all(&output).unwrap();
        Fixture {
            _dir: dir,
            input,
            output,
        }
    }

    fn stamp() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap()
    }

    #[test]
    fn empty_file_name_fails_before_reading() {
        let fx = fixture();
        let processor =
            EnrollmentProcessor::new(ProcessorConfig::new(&fx.input, &fx.output)).unwrap();

        let err = processor.process_file_at("", stamp()).unwrap_err();
        assert!(matches!(err, EnrollmentError::EmptyFileName));
        assert_eq!(err.to_string(), "File name is empty");
    }

    #[test]
    fn directory_input_is_rejected() {
        let fx = fixture();
        fs::create_dir_all(fx.input.join("nested")).unwrap();
        let processor =
            EnrollmentProcessor::new(ProcessorConfig::new(&fx.input, &fx.output)).unwrap();

        let err = processor.process_file_at("nested", stamp()).unwrap_err();
        assert!(matches!(err, EnrollmentError::InputIsDirectory(_)));
        assert!(err.to_string().contains("points to directory"));
    }

    #[test]
    fn summary_uses_shared_timestamp() {
        let fx = fixture();
        fs::write(
            fx.input.join("e.csv"),
            "U1,Ann,Lee,1,Acme\nU2,Bob,Kim,1,Beta\n",
        )
        .unwrap();
        let processor =
            EnrollmentProcessor::new(ProcessorConfig::new(&fx.input, &fx.output)).unwrap();

        let summary = processor.process_file_at("e.csv", stamp()).unwrap();

        assert_eq!(summary.timestamp, "20240309_140507");
        assert_eq!(summary.files_written.len(), 2);
        assert!(summary
            .files_written
            .iter()
            .all(|w| w.path.to_string_lossy().ends_with("_20240309_140507.csv")));
    }

    #[test]
    fn rejected_lines_are_listed_with_line_numbers() {
        let fx = fixture();
        fs::write(
            fx.input.join("e.csv"),
            "U1,Ann,Lee,1,Acme\nU2,Bob,Kim,-1,Acme\nnot a record\n",
        )
        .unwrap();
        let processor =
            EnrollmentProcessor::new(ProcessorConfig::new(&fx.input, &fx.output)).unwrap();

        let summary = processor.process_file_at("e.csv", stamp()).unwrap();

        assert_eq!(summary.lines_read, 3);
        assert_eq!(summary.accepted, 1);
        let numbers: Vec<usize> = summary.rejected.iter().map(|r| r.line_number).collect();
        assert_eq!(numbers, vec![2, 3]);
        assert!(summary.rejected[0].reason.contains("negative version"));
        assert!(summary.rejected[1].reason.contains("wrong field count"));
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = ProcessorConfig {
            delimiter: String::new(),
            ..ProcessorConfig::default()
        };
        assert!(matches!(
            EnrollmentProcessor::new(config),
            Err(EnrollmentError::Config(_))
        ));
    }

    #[test]
    fn stage_names_are_stable() {
        assert_eq!(RunStage::ReadingAndParsing.to_string(), "reading_and_parsing");
        assert_eq!(RunStage::Failed.as_str(), "failed");
    }
}
