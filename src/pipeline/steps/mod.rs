pub mod emit;
pub mod parse;
pub mod partition;
pub mod resolve;
pub mod sort;

pub use emit::{EmitReport, FailedOutput, FileEmitter, WrittenFile};
pub use parse::{LineParser, Rejection};
pub use partition::{partition, CarrierPartitioner};
pub use resolve::resolve_versions;
pub use sort::sort_buckets;
