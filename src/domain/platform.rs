//! Host platform selection
//!
//! The platform is decided once at startup and passed into the services,
//! never read from `cfg!` inside them.

use std::fmt;
use std::str::FromStr;

/// Platforms a stable-diffusion.cpp release bundle exists for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    MacOs,
    Linux,
    Windows,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::MacOs, Platform::Linux, Platform::Windows];

    /// Map an OS name as reported by `std::env::consts::OS`.
    pub fn from_os(os: &str) -> Option<Self> {
        match os {
            "macos" => Some(Platform::MacOs),
            "linux" => Some(Platform::Linux),
            "windows" => Some(Platform::Windows),
            _ => None,
        }
    }

    /// Detect the platform of the running host.
    pub fn detect() -> Option<Self> {
        Self::from_os(std::env::consts::OS)
    }

    /// File name of the generation binary inside an extracted bundle.
    pub fn executable_name(self) -> &'static str {
        match self {
            Platform::Windows => "sd.exe",
            Platform::MacOs | Platform::Linux => "sd",
        }
    }

    /// Windows ships bsdtar but no unzip.
    pub fn extracts_with_tar(self) -> bool {
        matches!(self, Platform::Windows)
    }

    /// Downloaded dylibs need an rpath entry next to the binary on macOS.
    pub fn needs_rpath_patch(self) -> bool {
        matches!(self, Platform::MacOs)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::MacOs => "macos",
            Platform::Linux => "linux",
            Platform::Windows => "windows",
        };
        f.write_str(name)
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_os(&s.to_ascii_lowercase()).ok_or_else(|| {
            format!("unknown platform '{s}' (expected one of: macos, linux, windows)")
        })
    }
}
