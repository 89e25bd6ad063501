use std::io;
use thiserror::Error;

/// Errors at the split request boundary
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Missing text input.")]
    MissingText,
}

impl RequestError {
    /// HTTP-style status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            RequestError::MissingText => 400,
        }
    }
}

/// Errors while loading a transcript file
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Unsupported file type: {0} (only .txt allowed)")]
    UnsupportedFileType(String),

    #[error("File too large: {size} bytes (max: {max})")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("File is not valid UTF-8 text: {0}")]
    InvalidUtf8(String),
}
