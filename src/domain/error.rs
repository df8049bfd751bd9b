//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::AcquisitionState;

/// Domain errors represent violations of the artifact model itself.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unsupported platform: {os}")]
    UnsupportedPlatform { os: String },

    #[error("invalid checksum '{value}': expected 'sha256:<hex>'")]
    InvalidChecksum { value: String },

    #[error("illegal acquisition transition: {from:?} -> {to:?}")]
    IllegalTransition {
        from: AcquisitionState,
        to: AcquisitionState,
    },
}
