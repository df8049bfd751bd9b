//! Command dispatch: runs the acquisition → prompt → generation pipeline

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use tracing::{debug, info, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{LocalArtifact, Platform};
use crate::infrastructure::di::ServiceContainer;

/// Entry point: resolves working directory, settings and platform once,
/// then dispatches.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let work_dir = resolve_work_dir(cli.dir.as_deref())?;

    if let Some(command) = cli.command.as_ref().filter(|c| is_standalone(c)) {
        return run_standalone(command, &work_dir, cli.config.as_deref());
    }

    let settings = Settings::load(&work_dir, cli.config.as_deref())?.rooted_at(&work_dir);
    let platform = cli.platform.or_else(Platform::detect);
    info!("platform: {:?}", platform);

    let container = ServiceContainer::new(settings, platform);
    if !matches!(cli.command, Some(Commands::Config { .. })) {
        output::action("Working path", &work_dir.display());
    }
    dispatch(
        &container,
        cli.command.as_ref(),
        &work_dir,
        cli.config.as_deref(),
    )
}

/// Run a command against an already wired container.
///
/// `work_dir` and `explicit` are the resolved `-C` directory and `--config`
/// file; commands that do not need the container still see them.
pub fn dispatch(
    container: &ServiceContainer,
    command: Option<&Commands>,
    work_dir: &Path,
    explicit: Option<&Path>,
) -> CliResult<()> {
    match command {
        None => cmd_generate(container, None, None),
        Some(Commands::Generate { prompt, output }) => {
            cmd_generate(container, prompt.clone(), output.clone())
        }
        Some(Commands::Fetch) => cmd_fetch(container).map(|_| ()),
        Some(Commands::Config {
            command: ConfigCommands::Show,
        }) => cmd_config_show(container),
        Some(other) => run_standalone(other, work_dir, explicit),
    }
}

/// Commands that need neither settings nor services.
fn is_standalone(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Completion { .. }
            | Commands::Config {
                command: ConfigCommands::Template | ConfigCommands::Path,
            }
    )
}

fn run_standalone(command: &Commands, work_dir: &Path, explicit: Option<&Path>) -> CliResult<()> {
    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
        }
        Commands::Config {
            command: ConfigCommands::Path,
        } => cmd_config_path(work_dir, explicit),
        _ => output::info(&Settings::template()),
    }
    Ok(())
}

fn resolve_work_dir(dir: Option<&Path>) -> CliResult<PathBuf> {
    match dir {
        Some(d) if d.is_dir() => Ok(d.to_path_buf()),
        Some(d) => Err(CliError::InvalidArgs(format!(
            "working directory does not exist: {}",
            d.display()
        ))),
        None => std::env::current_dir().map_err(|e| {
            CliError::Infra(crate::infrastructure::InfraError::io(
                "determine current directory",
                e,
            ))
        }),
    }
}

/// Acquire model and executable, reporting each step.
#[instrument(skip(container))]
fn cmd_fetch(container: &ServiceContainer) -> CliResult<(LocalArtifact, LocalArtifact)> {
    let resolver = container.resolver();

    let model_path = container.settings.model.path.clone();
    if resolver.inspect_model(&model_path).exists {
        output::action("Model found", &model_path.display());
    } else {
        output::pending("Model not found. Downloading model...");
    }
    let model = resolver.ensure_model_present(&model_path)?;
    if model.was_downloaded() {
        output::success(&format!("Model downloaded to {}", model.path.display()));
    }

    if resolver.inspect_executable().exists {
        output::action("Executable found", &resolver.executable_path().display());
    } else {
        output::pending("Stable Diffusion executable not found. Downloading...");
    }
    let executable = resolver.ensure_executable_present()?;
    if executable.was_downloaded() {
        output::success("Checksum verification passed");
        output::success(&format!(
            "Stable Diffusion unpacked to {}",
            container.settings.executable.staging_dir.display()
        ));
    }

    debug!("cmd_fetch: model={:?} executable={:?}", model.state(), executable.state());
    Ok((model, executable))
}

#[instrument(skip(container))]
fn cmd_generate(
    container: &ServiceContainer,
    prompt: Option<String>,
    output_file: Option<String>,
) -> CliResult<()> {
    let (model, executable) = cmd_fetch(container)?;

    let prompt = container.shell().collect(prompt, output_file)?;

    let invoker = container.invoker();
    invoker.patch_library_path(&executable.path);

    output::action(
        "Running",
        &invoker.describe(&executable.path, &model.path, &prompt),
    );
    invoker.generate(&executable.path, &model.path, &prompt)?;

    output::success(&format!("Image written to {}", prompt.output));
    Ok(())
}

fn cmd_config_show(container: &ServiceContainer) -> CliResult<()> {
    output::header("# effective settings");
    output::info(&container.settings.to_toml()?);
    Ok(())
}

/// Global and local config file locations, as `config path` reports them.
///
/// An explicit `--config` file replaces the local lookup in `work_dir`.
pub fn config_locations(work_dir: &Path, explicit: Option<&Path>) -> (Option<PathBuf>, PathBuf) {
    let local = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| local_config_path(work_dir));
    (global_config_path(), local)
}

fn cmd_config_path(work_dir: &Path, explicit: Option<&Path>) {
    let (global, local) = config_locations(work_dir, explicit);
    let global = global
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(no config directory on this host)".into());
    output::action("Global", &global);
    output::action("Local", &local.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_work_dir_when_locating_config_then_local_file_is_inside_it() {
        let (_, local) = config_locations(Path::new("/srv/sd"), None);
        assert_eq!(local, PathBuf::from("/srv/sd/sdboot.toml"));
    }

    #[test]
    fn given_explicit_config_when_locating_config_then_it_replaces_local() {
        let (_, local) = config_locations(Path::new("/srv/sd"), Some(Path::new("/etc/sd.toml")));
        assert_eq!(local, PathBuf::from("/etc/sd.toml"));
    }
}
