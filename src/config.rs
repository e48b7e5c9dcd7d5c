use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::error::{EnrollmentError, Result};

/// Settings for one processing run. Read-only once a run starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Folder the input file name is resolved against
    pub input_folder: PathBuf,
    /// Folder carrier files are written to. It is not created if missing.
    pub output_folder: PathBuf,
    /// Literal field separator, used for both reading and writing
    pub delimiter: String,
    /// Skip the first line of the input without validating it
    pub has_header: bool,
    /// Abort the whole run on the first malformed line
    pub stop_on_malformed_entry: bool,
    /// Emit progress lines and per-line rejection diagnostics
    pub output_info: bool,
    pub file_prefix: String,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            input_folder: PathBuf::from(constants::DEFAULT_INPUT_FOLDER),
            output_folder: PathBuf::from(constants::DEFAULT_OUTPUT_FOLDER),
            delimiter: constants::DEFAULT_DELIMITER.to_string(),
            has_header: false,
            stop_on_malformed_entry: false,
            output_info: true,
            file_prefix: constants::OUTPUT_FILE_PREFIX.to_string(),
        }
    }
}

impl ProcessorConfig {
    /// Default settings reading from `input_folder` and writing to `output_folder`
    pub fn new(input_folder: impl Into<PathBuf>, output_folder: impl Into<PathBuf>) -> Self {
        Self {
            input_folder: input_folder.into(),
            output_folder: output_folder.into(),
            ..Self::default()
        }
    }

    /// Load settings from a TOML file. Keys missing from the file keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            EnrollmentError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: ProcessorConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.delimiter.is_empty() {
            return Err(EnrollmentError::Config(
                "delimiter must not be empty".to_string(),
            ));
        }
        if self.file_prefix.trim().is_empty() {
            return Err(EnrollmentError::Config(
                "file_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_documented_values() {
        let config = ProcessorConfig::default();
        assert_eq!(config.input_folder, PathBuf::from("fileInput"));
        assert_eq!(config.output_folder, PathBuf::from("fileOutput"));
        assert_eq!(config.delimiter, ",");
        assert!(!config.has_header);
        assert!(!config.stop_on_malformed_entry);
        assert!(config.output_info);
        assert_eq!(config.file_prefix, "Enrollment_File");
    }

    #[test]
    fn load_fills_missing_keys_with_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "delimiter = \"|\"").unwrap();
        writeln!(file, "has_header = true").unwrap();
        writeln!(file, "output_folder = \"out\"").unwrap();

        let config = ProcessorConfig::load(file.path()).unwrap();
        assert_eq!(config.delimiter, "|");
        assert!(config.has_header);
        assert_eq!(config.output_folder, PathBuf::from("out"));
        assert_eq!(config.input_folder, PathBuf::from("fileInput"));
        assert!(config.output_info);
    }

    #[test]
    fn load_rejects_empty_delimiter() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "delimiter = \"\"").unwrap();

        let err = ProcessorConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, EnrollmentError::Config(_)));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ProcessorConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn load_reports_bad_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "has_header = \"maybe\"").unwrap();

        let err = ProcessorConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, EnrollmentError::Toml(_)));
    }
}
