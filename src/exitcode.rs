//! Process exit codes
//!
//! Pipeline failures use plain `1`; configuration and usage problems use the
//! BSD sysexits.h values.

/// Successful termination
pub const OK: i32 = 0;

/// Artifact acquisition or image generation failed
pub const FAILURE: i32 = 1;

/// Command line usage error
pub const USAGE: i32 = 64;

/// Configuration error
pub const CONFIG: i32 = 78;
