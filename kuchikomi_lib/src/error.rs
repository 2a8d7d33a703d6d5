//! Error types for the library layer.

use std::fmt;

/// Errors produced by the library layer, wrapping fetch-layer errors and
/// adding adapter, export, and input validation failures.
#[derive(Debug)]
pub enum KuchikomiError {
    /// A page or detail request failed.
    Fetch(kuchikomi_http::Error),
    /// A site adapter is malformed (bad selector, regex, template, or file).
    Adapter(String),
    /// Records could not be exported.
    Export(String),
    /// CSV reading or writing failed.
    Csv(csv::Error),
    /// Reading or writing a file failed.
    Io(std::io::Error),
    /// User-provided input failed validation.
    InvalidInput(String),
}

impl fmt::Display for KuchikomiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "Fetch error: {}", e),
            Self::Adapter(msg) => write!(f, "Adapter error: {}", msg),
            Self::Export(msg) => write!(f, "Export error: {}", msg),
            Self::Csv(e) => write!(f, "CSV error: {}", e),
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for KuchikomiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<kuchikomi_http::Error> for KuchikomiError {
    fn from(e: kuchikomi_http::Error) -> Self {
        Self::Fetch(e)
    }
}

impl From<csv::Error> for KuchikomiError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<std::io::Error> for KuchikomiError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
