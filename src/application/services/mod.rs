//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, CommandRunner, Console)
//! but are themselves concrete structs, not traits.

mod invoker;
mod resolver;
mod shell;

pub use invoker::ProcessInvoker;
pub use resolver::ArtifactResolver;
pub use shell::{InteractionShell, OUTPUT_QUESTION, PROMPT_QUESTION};

use crate::application::ApplicationError;
use crate::infrastructure::InfraError;

/// A command that could not be started at all.
fn spawn_failed(program: &str, e: std::io::Error) -> ApplicationError {
    ApplicationError::OperationFailed {
        context: format!("run {program}"),
        source: Box::new(InfraError::spawn(program, e)),
    }
}
