//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add the failure modes of the
/// acquisition and generation pipeline.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("download failed: {url} (exit code {})", fmt_code(.exit_code))]
    TransferFailure { url: String, exit_code: Option<i32> },

    #[error("checksum verification failed for {}: expected {expected}, got {actual}", .path.display())]
    VerificationFailure {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("extraction failed: {} (exit code {})", .archive.display(), fmt_code(.exit_code))]
    ExtractionFailure {
        archive: PathBuf,
        exit_code: Option<i32>,
    },

    #[error("image generation failed (exit code {})", fmt_code(.exit_code))]
    GenerationFailure { exit_code: Option<i32> },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

fn fmt_code(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "none, killed by signal".into())
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
