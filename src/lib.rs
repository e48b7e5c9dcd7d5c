pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod types;

pub use config::ProcessorConfig;
pub use error::{EnrollmentError, Result};
pub use pipeline::{EnrollmentProcessor, RunSummary};
pub use types::{carrier_key, CarrierBucket, CarrierBuckets, Record};
