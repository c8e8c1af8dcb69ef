use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Text recognition error: {0}")]
    Recognizer(String),

    #[error("MRZ extraction error: {0}")]
    Extraction(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Invalid manual entry: {0}")]
    ManualEntry(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse error category handed to result listeners alongside the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    Recognizer,
    Extraction,
    Config,
    Runtime,
    ManualEntry,
    Io,
}

impl ScanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScanError::Recognizer(_) => ErrorKind::Recognizer,
            ScanError::Extraction(_) => ErrorKind::Extraction,
            ScanError::Config(_) => ErrorKind::Config,
            ScanError::Runtime(_) => ErrorKind::Runtime,
            ScanError::ManualEntry(_) => ErrorKind::ManualEntry,
            ScanError::Io(_) => ErrorKind::Io,
        }
    }
}
