use std::path::PathBuf;
use thiserror::Error;

use crate::pipeline::steps::parse::Rejection;

#[derive(Error, Debug)]
pub enum EnrollmentError {
    #[error("File name is empty")]
    EmptyFileName,

    #[error("File at path {} does not exist", .0.display())]
    InputNotFound(PathBuf),

    #[error("Path {} points to directory", .0.display())]
    InputIsDirectory(PathBuf),

    #[error("Malformed line entry on line {line_number}: {line} ({reason})")]
    MalformedLine {
        line_number: usize,
        line: String,
        reason: Rejection,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EnrollmentError>;
