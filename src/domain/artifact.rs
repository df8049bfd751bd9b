//! Remote artifact descriptions and checksum matching

use crate::domain::{DomainError, Platform};

const RELEASE_BASE: &str =
    "https://github.com/leejet/stable-diffusion.cpp/releases/download/master-343-dd75fc0";

/// Default model weights (SD 1.5, pruned, EMA only).
pub const DEFAULT_MODEL_URL: &str =
    "https://huggingface.co/runwayml/stable-diffusion-v1-5/resolve/main/v1-5-pruned-emaonly.safetensors";

const CHECKSUM_PREFIX: &str = "sha256:";

/// Expected digest of a download, tagged with its algorithm.
///
/// Only `sha256:` is recognised. The hex part is kept exactly as given and
/// compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedChecksum {
    hex: String,
}

impl ExpectedChecksum {
    /// Parse an algorithm-tagged value such as `sha256:49bb...`.
    pub fn parse(tagged: &str) -> Result<Self, DomainError> {
        let hex = tagged
            .strip_prefix(CHECKSUM_PREFIX)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| DomainError::InvalidChecksum {
                value: tagged.to_string(),
            })?;
        Ok(Self {
            hex: hex.to_string(),
        })
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }

    /// Compare against a digest reported by a checksum tool.
    ///
    /// Surrounding whitespace in `computed` (e.g. the tool's trailing newline)
    /// is ignored; hex case is ignored.
    pub fn matches(&self, computed: &str) -> bool {
        computed.trim().eq_ignore_ascii_case(&self.hex)
    }
}

/// Where to fetch an artifact from and what it must hash to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub url: String,
    pub checksum: ExpectedChecksum,
}

/// Release asset name and tagged digest of the bundle for `platform`.
fn bundle_asset(platform: Platform) -> (&'static str, &'static str) {
    match platform {
        Platform::MacOs => (
            "sd-master--bin-Darwin-macOS-15.7.1-arm64.zip",
            "sha256:49bb1c0273efb6a36a26926ece674daffe49cd4a51c9e8935b5c9e8eb68b7ea2",
        ),
        Platform::Linux => (
            "sd-master--bin-Linux-Ubuntu-24.04-x86_64.zip",
            "sha256:152df5843e2ea265a627024de37a985cf75b5554554e2ad5d0ff06aad76ba4d8",
        ),
        Platform::Windows => (
            "sd-master-dd75fc0-bin-win-avx-x64.zip",
            "sha256:17f6d4f4e1cdaf92f90ff09479e0460246193d015f2b29f8f7553affed426c78",
        ),
    }
}

impl ArtifactSpec {
    /// The stable-diffusion.cpp release bundle for `platform`.
    pub fn executable_bundle(platform: Platform) -> Self {
        let (asset, tagged) = bundle_asset(platform);
        Self {
            url: format!("{RELEASE_BASE}/{asset}"),
            checksum: ExpectedChecksum {
                hex: tagged.trim_start_matches(CHECKSUM_PREFIX).to_string(),
            },
        }
    }
}
