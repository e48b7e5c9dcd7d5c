// Enrollment pipeline: per-line parsing, carrier partitioning, version resolution,
// ordering and file emission

pub mod orchestrator;
pub mod steps;

pub use orchestrator::{EnrollmentProcessor, RejectedLine, RunStage, RunSummary};
