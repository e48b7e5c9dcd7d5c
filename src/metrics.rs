//! Pipeline counters
//!
//! Recorded through the `metrics` facade. Nothing is exported unless the
//! embedding process installs a recorder.

/// Counter recording for enrollment runs
pub struct PipelineMetrics;

impl PipelineMetrics {
    pub fn record_run_started() {
        ::metrics::counter!("enrollment_runs_total").increment(1);
    }

    pub fn record_run_failed(stage: &'static str) {
        ::metrics::counter!("enrollment_run_failures_total", "stage" => stage).increment(1);
    }

    pub fn record_line_accepted() {
        ::metrics::counter!("enrollment_lines_accepted_total").increment(1);
    }

    pub fn record_line_rejected(reason: &'static str) {
        ::metrics::counter!("enrollment_lines_rejected_total", "reason" => reason).increment(1);
    }

    /// Record a carrier file that was fully written
    pub fn record_file_written(records: usize) {
        ::metrics::counter!("enrollment_files_written_total").increment(1);
        ::metrics::counter!("enrollment_records_written_total").increment(records as u64);
    }

    pub fn record_output_failure() {
        ::metrics::counter!("enrollment_output_failures_total").increment(1);
    }
}
