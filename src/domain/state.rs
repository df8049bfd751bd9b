//! Acquisition state machine for a single artifact

use crate::domain::DomainError;

/// Lifecycle of one artifact during a run.
///
/// ```text
/// Absent -> Downloading -> Downloaded -> Verifying -> Verified -> Extracting -> Ready
///                 |                          |                        |
///           TransferFailed         VerificationFailed         ExtractionFailed
/// ```
///
/// Artifacts that skip verification or extraction go straight from
/// `Downloaded` (or `Verified`) to `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    Absent,
    Downloading,
    TransferFailed,
    Downloaded,
    Verifying,
    Verified,
    VerificationFailed,
    Extracting,
    Ready,
    ExtractionFailed,
}

impl AcquisitionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Ready | Self::TransferFailed | Self::VerificationFailed | Self::ExtractionFailed
        )
    }

    pub fn is_failed(self) -> bool {
        self.is_terminal() && self != Self::Ready
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        use AcquisitionState::*;
        matches!(
            (self, next),
            (Absent, Downloading)
                | (Downloading, Downloaded)
                | (Downloading, TransferFailed)
                | (Downloaded, Verifying)
                | (Downloaded, Extracting)
                | (Downloaded, Ready)
                | (Verifying, Verified)
                | (Verifying, VerificationFailed)
                | (Verified, Extracting)
                | (Verified, Ready)
                | (Extracting, Ready)
                | (Extracting, ExtractionFailed)
        )
    }
}

/// Tracks the states an artifact has passed through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    history: Vec<AcquisitionState>,
}

impl Acquisition {
    pub fn new() -> Self {
        Self {
            history: vec![AcquisitionState::Absent],
        }
    }

    /// An artifact found on disk: `Ready` without any transitions.
    pub fn already_present() -> Self {
        Self {
            history: vec![AcquisitionState::Ready],
        }
    }

    pub fn state(&self) -> AcquisitionState {
        // history is never empty
        self.history[self.history.len() - 1]
    }

    pub fn history(&self) -> &[AcquisitionState] {
        &self.history
    }

    pub fn advance(&mut self, next: AcquisitionState) -> Result<(), DomainError> {
        let from = self.state();
        if !from.can_transition_to(next) {
            return Err(DomainError::IllegalTransition { from, to: next });
        }
        self.history.push(next);
        Ok(())
    }
}
