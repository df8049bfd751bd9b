//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::domain::Platform;

/// Fetch stable-diffusion.cpp and SD 1.5 weights, then turn a prompt into an image
#[derive(Parser, Debug)]
#[command(name = "sdboot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Working directory for models/ and supplementary/ (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    /// Config file (replaces ./sdboot.toml)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Target platform: macos, linux or windows (default: host)
    #[arg(long, global = true)]
    pub platform: Option<Platform>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Fetch artifacts, ask for a prompt and generate an image (default)
    Generate {
        /// Prompt text (asked interactively if omitted)
        #[arg(short, long)]
        prompt: Option<String>,
        /// Output image file (asked interactively if omitted)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<String>,
    },

    /// Download and verify the model and executable only
    Fetch,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Show effective settings as TOML
    Show,
    /// Print a commented config template
    Template,
    /// Show config file locations
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_no_subcommand_when_parsing_then_command_is_none() {
        let cli = Cli::try_parse_from(["sdboot"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.debug, 0);
        assert!(cli.platform.is_none());
    }

    #[test]
    fn given_generate_flags_when_parsing_then_values_kept_verbatim() {
        let cli = Cli::try_parse_from([
            "sdboot",
            "-dd",
            "--platform",
            "windows",
            "generate",
            "-p",
            "a \"red\" fox; echo hi",
            "-o",
            "../fox.png",
        ])
        .unwrap();
        assert_eq!(cli.debug, 2);
        assert_eq!(cli.platform, Some(Platform::Windows));
        assert_eq!(
            cli.command,
            Some(Commands::Generate {
                prompt: Some("a \"red\" fox; echo hi".into()),
                output: Some("../fox.png".into()),
            })
        );
    }

    #[test]
    fn given_unknown_platform_when_parsing_then_rejected() {
        assert!(Cli::try_parse_from(["sdboot", "--platform", "plan9"]).is_err());
    }
}
