use thiserror::Error;

use crate::constants::{
    CARRIER_FIELD_INDEX, ENTRY_FIELD_COUNT, FIRST_NAME_FIELD_INDEX, LAST_NAME_FIELD_INDEX,
    SUBSCRIBER_ID_FIELD_INDEX, VERSION_FIELD_INDEX,
};
use crate::types::Record;

/// Why a line could not become a [`Record`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("malformed line: wrong field count (expected {expected}, found {actual})")]
    WrongFieldCount { expected: usize, actual: usize },

    /// `position` is 1-based
    #[error("blank field at position {position}")]
    BlankField { position: usize },

    #[error("version not an integer: '{value}'")]
    VersionNotInteger { value: String },

    #[error("negative version: {value}")]
    NegativeVersion { value: i32 },
}

impl Rejection {
    /// Short label for counters
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::WrongFieldCount { .. } => "wrong_field_count",
            Rejection::BlankField { .. } => "blank_field",
            Rejection::VersionNotInteger { .. } => "version_not_integer",
            Rejection::NegativeVersion { .. } => "negative_version",
        }
    }
}

/// Turns raw enrollment lines into records.
#[derive(Debug, Clone)]
pub struct LineParser {
    delimiter: String,
}

impl LineParser {
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Split, trim and validate one line.
    ///
    /// The delimiter is matched literally. Empty trailing fields are kept, so
    /// `U1,Ann,Lee,1,` is a blank carrier rather than a short line.
    pub fn parse(&self, line: &str) -> Result<Record, Rejection> {
        let fields: Vec<&str> = line.split(self.delimiter.as_str()).map(str::trim).collect();

        if fields.len() != ENTRY_FIELD_COUNT {
            return Err(Rejection::WrongFieldCount {
                expected: ENTRY_FIELD_COUNT,
                actual: fields.len(),
            });
        }

        if let Some(index) = fields.iter().position(|field| field.is_empty()) {
            return Err(Rejection::BlankField { position: index + 1 });
        }

        let version = parse_version(fields[VERSION_FIELD_INDEX])?;

        Ok(Record {
            subscriber_id: fields[SUBSCRIBER_ID_FIELD_INDEX].to_string(),
            first_name: fields[FIRST_NAME_FIELD_INDEX].to_string(),
            last_name: fields[LAST_NAME_FIELD_INDEX].to_string(),
            version,
            carrier: fields[CARRIER_FIELD_INDEX].to_string(),
        })
    }
}

// Versions share the range of a signed 32-bit integer; anything outside it is not an integer.
fn parse_version(raw: &str) -> Result<u32, Rejection> {
    let value: i32 = raw.parse().map_err(|_| Rejection::VersionNotInteger {
        value: raw.to_string(),
    })?;
    u32::try_from(value).map_err(|_| Rejection::NegativeVersion { value })
}
