/// Layout and naming constants shared across the pipeline.
/// Field positions refer to the split line, before any trimming.

pub const DEFAULT_DELIMITER: &str = ",";

pub const DEFAULT_INPUT_FOLDER: &str = "fileInput";
pub const DEFAULT_OUTPUT_FOLDER: &str = "fileOutput";

// Number of fields in every enrollment line
pub const ENTRY_FIELD_COUNT: usize = 5;

pub const SUBSCRIBER_ID_FIELD_INDEX: usize = 0;
pub const FIRST_NAME_FIELD_INDEX: usize = 1;
pub const LAST_NAME_FIELD_INDEX: usize = 2;
pub const VERSION_FIELD_INDEX: usize = 3;
pub const CARRIER_FIELD_INDEX: usize = 4;

pub const OUTPUT_FILE_PREFIX: &str = "Enrollment_File";
pub const OUTPUT_FILE_EXTENSION: &str = "csv";

/// chrono format for the run timestamp embedded in output file names (yyyyMMdd_HHmmss)
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";
