//! Artifact acquisition service
//!
//! Makes sure the model weights and the stable-diffusion.cpp bundle exist on
//! disk, fetching them with the transfer tool when they do not. The bundle
//! archive is checksum-verified before it is extracted; a mismatch aborts
//! the acquisition without touching the archive further.
//!
//! Every external command is all-or-nothing: exit code 0 is success, anything
//! else fails the acquisition. Nothing is retried and partial files are left
//! where they are.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::hash::{digest_from_tool_output, file_sha256};
use crate::application::services::spawn_failed;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::{Settings, BUILTIN_CHECKSUM};
use crate::domain::{
    Acquisition, AcquisitionState, ArtifactSpec, DomainError, ExpectedChecksum, LocalArtifact,
    Platform,
};
use crate::infrastructure::traits::{CommandRunner, FileSystem};

/// Fetches, verifies and unpacks the artifacts the generator needs.
pub struct ArtifactResolver {
    fs: Arc<dyn FileSystem>,
    cmd: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
    platform: Option<Platform>,
}

impl ArtifactResolver {
    /// Create a new resolver.
    ///
    /// `platform` is `None` on hosts without a release bundle; acquiring the
    /// executable then fails, but an executable already on disk is accepted.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        settings: Arc<Settings>,
        platform: Option<Platform>,
    ) -> Self {
        Self {
            fs,
            cmd,
            settings,
            platform,
        }
    }

    /// Fixed path of the generation binary.
    pub fn executable_path(&self) -> PathBuf {
        self.settings.executable_path(self.platform)
    }

    /// Check the model file without acquiring it.
    pub fn inspect_model(&self, path: &Path) -> LocalArtifact {
        LocalArtifact::inspected(path.to_path_buf(), self.fs.exists(path))
    }

    /// Check the executable without acquiring it.
    pub fn inspect_executable(&self) -> LocalArtifact {
        let path = self.executable_path();
        let exists = self.fs.exists(&path);
        LocalArtifact::inspected(path, exists)
    }

    /// Ensure the model weights exist at `path`, downloading them if missing.
    ///
    /// The download is not checksum-verified unless `model.sha256` is
    /// configured. With a checksum, the file is fetched to `<path>.part` and
    /// renamed into place once it matches, so a rejected download is never
    /// mistaken for the model on a later run.
    pub fn ensure_model_present(&self, path: &Path) -> ApplicationResult<LocalArtifact> {
        let mut artifact = self.inspect_model(path);
        if artifact.exists {
            debug!("ensure_model_present: found {}", path.display());
            return Ok(artifact);
        }

        // Reject a malformed checksum before spending a multi-gigabyte download on it
        let expected = self.settings.model_checksum()?;

        self.fs
            .ensure_parent(path)
            .with_path_context("create model directory", path)?;

        info!("downloading model from {}", self.settings.model.url);
        let acq = &mut artifact.acquisition;
        match expected {
            Some(expected) => {
                // Only a verified file may appear at `path`
                let part = partial_path(path);
                self.download(&self.settings.model.url, &part, acq)?;
                self.verify(&part, &expected, acq)?;
                self.fs
                    .rename(&part, path)
                    .with_path_context("move verified model into place", path)?;
                artifact.verified = true;
            }
            None => self.download(&self.settings.model.url, path, acq)?,
        }
        acq.advance(AcquisitionState::Ready)?;

        artifact.exists = true;
        debug!("ensure_model_present: history={:?}", artifact.acquisition.history());
        Ok(artifact)
    }

    /// Ensure the generation binary exists, fetching and unpacking the release
    /// bundle for the current platform if it does not.
    pub fn ensure_executable_present(&self) -> ApplicationResult<LocalArtifact> {
        let mut artifact = self.inspect_executable();
        if artifact.exists {
            debug!("ensure_executable_present: found {}", artifact.path.display());
            return Ok(artifact);
        }

        let platform = self.platform.ok_or_else(|| DomainError::UnsupportedPlatform {
            os: std::env::consts::OS.to_string(),
        })?;
        let spec = ArtifactSpec::executable_bundle(platform);
        debug!("ensure_executable_present: platform={} url={}", platform, spec.url);

        let staging = &self.settings.executable.staging_dir;
        self.fs
            .create_dir_all(staging)
            .with_path_context("create staging directory", staging)?;

        let archive = self.settings.archive_path();
        let acq = &mut artifact.acquisition;

        info!("downloading executable bundle from {}", spec.url);
        self.download(&spec.url, &archive, acq)?;
        self.verify(&archive, &spec.checksum, acq)?;
        artifact.verified = true;
        self.extract(platform, &archive, staging, acq)?;
        acq.advance(AcquisitionState::Ready)?;

        artifact.exists = self.fs.exists(&artifact.path);
        if !artifact.exists {
            warn!(
                "bundle extracted but {} is missing; check executable.name",
                artifact.path.display()
            );
        }
        debug!(
            "ensure_executable_present: history={:?}",
            artifact.acquisition.history()
        );
        Ok(artifact)
    }

    /// Fetch `url` into `dest` with the transfer tool.
    fn download(&self, url: &str, dest: &Path, acq: &mut Acquisition) -> ApplicationResult<()> {
        acq.advance(AcquisitionState::Downloading)?;

        let program = &self.settings.tools.transfer;
        let dest_arg = dest.to_string_lossy();
        let args = ["-L", "--fail", "-o", dest_arg.as_ref(), url];
        debug!("download: {} {:?}", program, args);

        let result = self
            .cmd
            .run_attached(program, &args)
            .map_err(|e| spawn_failed(program, e))?;

        if !result.success() {
            acq.advance(AcquisitionState::TransferFailed)?;
            return Err(ApplicationError::TransferFailure {
                url: url.to_string(),
                exit_code: result.code,
            });
        }

        acq.advance(AcquisitionState::Downloaded)?;
        Ok(())
    }

    /// Compute the SHA-256 of `path` with the configured checksum tool.
    pub fn compute_checksum(&self, path: &Path) -> ApplicationResult<String> {
        let program = &self.settings.tools.checksum;
        if program == BUILTIN_CHECKSUM {
            return file_sha256(path);
        }

        let path_arg = path.to_string_lossy();
        let result = self
            .cmd
            .run(program, &["-a", "256", path_arg.as_ref()])
            .map_err(|e| spawn_failed(program, e))?;

        if !result.success() {
            return Err(ApplicationError::OperationFailed {
                context: format!("{} {}: {}", program, path.display(), result.stderr.trim()),
                source: format!("checksum tool exited with {:?}", result.code).into(),
            });
        }

        digest_from_tool_output(&result.stdout)
            .map(str::to_string)
            .ok_or_else(|| ApplicationError::OperationFailed {
                context: format!("{} {}", program, path.display()),
                source: "checksum tool produced no output".into(),
            })
    }

    fn verify(
        &self,
        path: &Path,
        expected: &ExpectedChecksum,
        acq: &mut Acquisition,
    ) -> ApplicationResult<()> {
        acq.advance(AcquisitionState::Verifying)?;

        let actual = self.compute_checksum(path)?;
        debug!("verify: {} expected={} actual={}", path.display(), expected.hex(), actual);

        if !expected.matches(&actual) {
            acq.advance(AcquisitionState::VerificationFailed)?;
            return Err(ApplicationError::VerificationFailure {
                path: path.to_path_buf(),
                expected: expected.hex().to_string(),
                actual: actual.trim().to_string(),
            });
        }

        acq.advance(AcquisitionState::Verified)?;
        Ok(())
    }

    fn extract(
        &self,
        platform: Platform,
        archive: &Path,
        dest: &Path,
        acq: &mut Acquisition,
    ) -> ApplicationResult<()> {
        acq.advance(AcquisitionState::Extracting)?;

        let archive_arg = archive.to_string_lossy();
        let dest_arg = dest.to_string_lossy();
        let tools = &self.settings.tools;
        let (program, args) = if platform.extracts_with_tar() {
            (&tools.tar, ["-xf", archive_arg.as_ref(), "-C", dest_arg.as_ref()])
        } else {
            (&tools.unzip, ["-o", archive_arg.as_ref(), "-d", dest_arg.as_ref()])
        };
        debug!("extract: {} {:?}", program, args);

        let result = self
            .cmd
            .run_attached(program, &args)
            .map_err(|e| spawn_failed(program, e))?;

        if !result.success() {
            acq.advance(AcquisitionState::ExtractionFailed)?;
            return Err(ApplicationError::ExtractionFailure {
                archive: archive.to_path_buf(),
                exit_code: result.code,
            });
        }
        Ok(())
    }
}

/// Sibling download target for a file that still has to be verified.
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}
