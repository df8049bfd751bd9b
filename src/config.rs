//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/sdboot/sdboot.toml`
//! 3. Local config: `<work_dir>/sdboot.toml` (or `--config <file>`)
//! 4. Environment variables: `SDBOOT_*` prefix, `__` between sections
//!    (e.g. `SDBOOT_MODEL__URL`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{ExpectedChecksum, Platform, DEFAULT_MODEL_URL};

/// Value of `tools.checksum` that hashes in-process instead of spawning a tool.
pub const BUILTIN_CHECKSUM: &str = "builtin";

const LOCAL_CONFIG_NAME: &str = "sdboot.toml";

/// Model weights location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ModelConfig {
    /// Download source for the weights
    pub url: String,
    /// Local path of the weights file
    pub path: PathBuf,
    /// Optional `sha256:<hex>`; when set, a fresh download is verified too
    pub sha256: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_MODEL_URL.to_string(),
            path: PathBuf::from("./models/v1-5-pruned-emaonly.safetensors"),
            sha256: None,
        }
    }
}

/// Executable bundle layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExecutableConfig {
    /// Directory the bundle is downloaded to and extracted in
    pub staging_dir: PathBuf,
    /// File name of the downloaded archive inside `staging_dir`
    pub archive_name: String,
    /// Binary name override (default: `sd`, `sd.exe` on Windows)
    pub name: Option<String>,
}

impl Default for ExecutableConfig {
    fn default() -> Self {
        Self {
            staging_dir: PathBuf::from("./supplementary"),
            archive_name: "stable_diffusion.zip".to_string(),
            name: None,
        }
    }
}

/// External programs the pipeline shells out to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolsConfig {
    pub transfer: String,
    /// `shasum`-compatible tool, or `"builtin"`
    pub checksum: String,
    pub unzip: String,
    pub tar: String,
    pub rpath_patch: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        // Windows has no shasum out of the box
        let checksum = if std::env::consts::OS == "windows" {
            BUILTIN_CHECKSUM
        } else {
            "shasum"
        };
        Self {
            transfer: "curl".into(),
            checksum: checksum.into(),
            unzip: "unzip".into(),
            tar: "tar".into(),
            rpath_patch: "install_name_tool".into(),
        }
    }
}

/// Unified configuration for sdboot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub model: ModelConfig,
    pub executable: ExecutableConfig,
    pub tools: ToolsConfig,
}

/// Get the XDG config directory for sdboot.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "sdboot").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("sdboot.toml"))
}

/// Get the path to the local config file in a working directory.
pub fn local_config_path(work_dir: &Path) -> PathBuf {
    work_dir.join(LOCAL_CONFIG_NAME)
}

fn expand(value: &str) -> String {
    shellexpand::full(value)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(expand(&path.to_string_lossy()))
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `work_dir` - Directory searched for `sdboot.toml`
    /// * `explicit` - Config file given on the command line; must exist and
    ///   replaces the local lookup
    pub fn load(work_dir: &Path, explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_with_global(global_config_path().as_deref(), work_dir, explicit)
    }

    /// [`Settings::load`] with the global config file given explicitly
    /// (`None` skips the global layer).
    pub fn load_with_global(
        global: Option<&Path>,
        work_dir: &Path,
        explicit: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("model.url", defaults.model.url.clone())
            .map_err(config_err)?
            .set_default("model.path", defaults.model.path.to_string_lossy().to_string())
            .map_err(config_err)?
            .set_default(
                "executable.staging_dir",
                defaults.executable.staging_dir.to_string_lossy().to_string(),
            )
            .map_err(config_err)?
            .set_default("executable.archive_name", defaults.executable.archive_name.clone())
            .map_err(config_err)?
            .set_default("tools.transfer", defaults.tools.transfer.clone())
            .map_err(config_err)?
            .set_default("tools.checksum", defaults.tools.checksum.clone())
            .map_err(config_err)?
            .set_default("tools.unzip", defaults.tools.unzip.clone())
            .map_err(config_err)?
            .set_default("tools.tar", defaults.tools.tar.clone())
            .map_err(config_err)?
            .set_default("tools.rpath_patch", defaults.tools.rpath_patch.clone())
            .map_err(config_err)?;

        if let Some(global_path) = global.filter(|p| p.exists()) {
            builder = builder.add_source(File::from(global_path.to_path_buf()).required(false));
        }

        builder = match explicit {
            Some(path) => builder.add_source(File::from(path.to_path_buf()).required(true)),
            None => builder.add_source(File::from(local_config_path(work_dir)).required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix("SDBOOT")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build().map_err(config_err)?;
        let mut settings: Self = config.try_deserialize().map_err(config_err)?;

        settings.expand_paths();
        Ok(settings)
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        self.model.path = expand_path(&self.model.path);
        self.executable.staging_dir = expand_path(&self.executable.staging_dir);
    }

    /// Resolve relative paths against `dir`.
    pub fn rooted_at(mut self, dir: &Path) -> Self {
        if self.model.path.is_relative() {
            self.model.path = dir.join(&self.model.path);
        }
        if self.executable.staging_dir.is_relative() {
            self.executable.staging_dir = dir.join(&self.executable.staging_dir);
        }
        self
    }

    /// Where the downloaded bundle archive is stored.
    pub fn archive_path(&self) -> PathBuf {
        self.executable.staging_dir.join(&self.executable.archive_name)
    }

    /// Fixed location of the generation binary.
    ///
    /// Without a known platform the unix name is assumed; it is only used for
    /// the existence check in that case.
    pub fn executable_path(&self, platform: Option<Platform>) -> PathBuf {
        let name = self
            .executable
            .name
            .as_deref()
            .unwrap_or_else(|| platform.unwrap_or(Platform::Linux).executable_name());
        self.executable.staging_dir.join(name)
    }

    /// Parsed `model.sha256`, if configured.
    pub fn model_checksum(&self) -> Result<Option<ExpectedChecksum>, ApplicationError> {
        self.model
            .sha256
            .as_deref()
            .map(ExpectedChecksum::parse)
            .transpose()
            .map_err(ApplicationError::from)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# sdboot configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/sdboot/sdboot.toml
#   Local:  ./sdboot.toml (or --config <file>)
#   Env:    SDBOOT_* environment variables, e.g. SDBOOT_MODEL__URL

[model]
# url = "https://huggingface.co/runwayml/stable-diffusion-v1-5/resolve/main/v1-5-pruned-emaonly.safetensors"
# path = "./models/v1-5-pruned-emaonly.safetensors"

# Verify a freshly downloaded model (off unless set)
# sha256 = "sha256:<hex>"

[executable]
# staging_dir = "./supplementary"
# archive_name = "stable_diffusion.zip"
# name = "sd"

[tools]
# transfer = "curl"
# checksum = "shasum"   # or "builtin"
# unzip = "unzip"
# tar = "tar"
# rpath_patch = "install_name_tool"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_match_release_layout() {
        let settings = Settings::default();
        assert_eq!(
            settings.model.path,
            PathBuf::from("./models/v1-5-pruned-emaonly.safetensors")
        );
        assert_eq!(settings.executable.staging_dir, PathBuf::from("./supplementary"));
        assert_eq!(
            settings.archive_path(),
            PathBuf::from("./supplementary/stable_diffusion.zip")
        );
        assert!(settings.model.sha256.is_none());
        assert_eq!(settings.tools.transfer, "curl");
    }

    #[test]
    fn given_relative_paths_when_rooted_then_joined_to_dir() {
        let settings = Settings::default().rooted_at(Path::new("/work"));
        assert_eq!(
            settings.model.path,
            Path::new("/work/./models/v1-5-pruned-emaonly.safetensors")
        );
        assert!(settings.executable.staging_dir.starts_with("/work"));
    }

    #[test]
    fn given_absolute_paths_when_rooted_then_unchanged() {
        let mut settings = Settings::default();
        settings.model.path = PathBuf::from("/opt/models/m.safetensors");
        let settings = settings.rooted_at(Path::new("/work"));
        assert_eq!(settings.model.path, PathBuf::from("/opt/models/m.safetensors"));
    }

    #[test]
    fn given_platform_when_resolving_executable_then_uses_platform_name() {
        let settings = Settings::default();
        assert!(settings
            .executable_path(Some(Platform::Windows))
            .ends_with("sd.exe"));
        assert!(settings.executable_path(Some(Platform::MacOs)).ends_with("sd"));
        assert!(settings.executable_path(None).ends_with("sd"));
    }

    #[test]
    fn given_name_override_when_resolving_executable_then_override_wins() {
        let mut settings = Settings::default();
        settings.executable.name = Some("sd-cuda".into());
        assert!(settings
            .executable_path(Some(Platform::Windows))
            .ends_with("sd-cuda"));
    }

    #[test]
    fn given_tilde_in_model_path_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings::default();
        settings.model.path = PathBuf::from("~/models/m.safetensors");

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.model.path.starts_with(&home));
    }

    #[test]
    fn given_model_checksum_when_parsing_then_validates_tag() {
        let mut settings = Settings::default();
        assert_eq!(settings.model_checksum().unwrap(), None);

        settings.model.sha256 = Some("sha256:abcd".into());
        assert_eq!(
            settings.model_checksum().unwrap().map(|c| c.hex().to_string()),
            Some("abcd".to_string())
        );

        settings.model.sha256 = Some("abcd".into());
        assert!(settings.model_checksum().is_err());
    }

    #[test]
    fn given_settings_when_serialized_then_round_trips_through_toml() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        assert!(text.contains("[model]"));
        assert!(text.contains("[tools]"));
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let parsed: Settings = toml::from_str(&Settings::template()).unwrap();
        assert_eq!(parsed, Settings::default());
    }
}
