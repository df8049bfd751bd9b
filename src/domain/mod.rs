//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod artifact;
pub mod entities;
pub mod error;
pub mod platform;
pub mod state;

pub use artifact::{ArtifactSpec, ExpectedChecksum, DEFAULT_MODEL_URL};
pub use entities::{LocalArtifact, Prompt};
pub use error::DomainError;
pub use platform::Platform;
pub use state::{Acquisition, AcquisitionState};
