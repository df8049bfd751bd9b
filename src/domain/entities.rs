//! Domain entities: core data structures

use std::path::PathBuf;

use crate::domain::{Acquisition, AcquisitionState};

/// An artifact as it exists (or not) on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalArtifact {
    pub path: PathBuf,
    pub exists: bool,
    /// Checksum verified during this run.
    pub verified: bool,
    pub acquisition: Acquisition,
}

impl LocalArtifact {
    /// Snapshot of filesystem state before any acquisition work.
    pub fn inspected(path: PathBuf, exists: bool) -> Self {
        let acquisition = if exists {
            Acquisition::already_present()
        } else {
            Acquisition::new()
        };
        Self {
            path,
            exists,
            verified: false,
            acquisition,
        }
    }

    pub fn state(&self) -> AcquisitionState {
        self.acquisition.state()
    }

    /// True when the artifact was fetched during this run.
    pub fn was_downloaded(&self) -> bool {
        self.acquisition
            .history()
            .contains(&AcquisitionState::Downloaded)
    }
}

/// What the user asked to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    /// Output image filename, passed through verbatim.
    pub output: String,
}
