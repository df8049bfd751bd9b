//! Runs the stable-diffusion.cpp binary

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::services::spawn_failed;
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{Platform, Prompt};
use crate::infrastructure::traits::CommandRunner;

/// Invokes the external generator with the collected prompt.
pub struct ProcessInvoker {
    cmd: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
    platform: Option<Platform>,
}

impl ProcessInvoker {
    pub fn new(
        cmd: Arc<dyn CommandRunner>,
        settings: Arc<Settings>,
        platform: Option<Platform>,
    ) -> Self {
        Self {
            cmd,
            settings,
            platform,
        }
    }

    /// Add `@loader_path` to the binary's rpath so the bundled dylibs resolve.
    ///
    /// Best-effort: runs on macOS only, and both spawn errors and non-zero
    /// exits are logged and ignored (the rpath is usually already there on
    /// re-runs). Returns whether the patch command succeeded.
    pub fn patch_library_path(&self, executable: &Path) -> bool {
        if !self.platform.is_some_and(Platform::needs_rpath_patch) {
            return false;
        }

        let program = &self.settings.tools.rpath_patch;
        let exe_arg = executable.to_string_lossy();
        match self
            .cmd
            .run(program, &["-add_rpath", "@loader_path", exe_arg.as_ref()])
        {
            Ok(out) if out.success() => true,
            Ok(out) => {
                debug!("{} exited with {:?}: {}", program, out.code, out.stderr.trim());
                false
            }
            Err(e) => {
                warn!("cannot run {}: {}", program, e);
                false
            }
        }
    }

    /// Argument vector passed to the generator.
    pub fn arguments(&self, model: &Path, prompt: &Prompt) -> Vec<String> {
        vec![
            "-m".into(),
            model.to_string_lossy().into_owned(),
            "-p".into(),
            prompt.text.clone(),
            "-o".into(),
            prompt.output.clone(),
        ]
    }

    /// Human-readable command line, for display only.
    pub fn describe(&self, executable: &Path, model: &Path, prompt: &Prompt) -> String {
        std::iter::once(executable.to_string_lossy().into_owned())
            .chain(self.arguments(model, prompt))
            .map(|arg| display_quoted(&arg))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the generator and map its exit status.
    pub fn generate(
        &self,
        executable: &Path,
        model: &Path,
        prompt: &Prompt,
    ) -> ApplicationResult<()> {
        let program = executable.to_string_lossy();
        let args = self.arguments(model, prompt);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        debug!("generate: {} {:?}", program, arg_refs);

        let result = self
            .cmd
            .run_attached(&program, &arg_refs)
            .map_err(|e| spawn_failed(&program, e))?;

        if !result.success() {
            return Err(ApplicationError::GenerationFailure {
                exit_code: result.code,
            });
        }
        Ok(())
    }
}

fn display_quoted(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains(|c: char| c.is_whitespace() || "\"'\\$`;&|<>".contains(c))
    {
        arg.to_string()
    } else {
        format!("{arg:?}")
    }
}
