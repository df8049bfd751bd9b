//! Operator interaction: asks for the prompt and output filename

use std::sync::Arc;

use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::Prompt;
use crate::infrastructure::traits::Console;

pub const PROMPT_QUESTION: &str = "Enter your prompt:";
pub const OUTPUT_QUESTION: &str = "Enter output filename (with .png extension):";

/// Collects generation inputs from the operator.
///
/// Input is taken verbatim. Nothing is validated; the invoker passes both
/// values as separate arguments, so they are never shell-interpreted.
pub struct InteractionShell {
    console: Arc<dyn Console>,
}

impl InteractionShell {
    pub fn new(console: Arc<dyn Console>) -> Self {
        Self { console }
    }

    /// Build a [`Prompt`], asking only for values not already supplied.
    pub fn collect(
        &self,
        text: Option<String>,
        output: Option<String>,
    ) -> ApplicationResult<Prompt> {
        let text = match text {
            Some(t) => t,
            None => self.ask(PROMPT_QUESTION)?,
        };
        let output = match output {
            Some(o) => o,
            None => self.ask(OUTPUT_QUESTION)?,
        };
        debug!("collect: text={:?} output={:?}", text, output);
        Ok(Prompt { text, output })
    }

    fn ask(&self, question: &str) -> ApplicationResult<String> {
        self.console
            .read_line(question)
            .map_err(|e| ApplicationError::OperationFailed {
                context: format!("read answer to '{question}'"),
                source: Box::new(e),
            })
    }
}
