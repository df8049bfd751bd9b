//! SHA-256 digests for download verification
//!
//! Digests come either from an external tool (`shasum -a 256`, whose output is
//! `"<hex>  <path>\n"`) or from the builtin hasher for hosts without one.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::application::{ApplicationResult, IoResultExt};

/// Compute the lowercase hex SHA-256 of a byte slice.
pub fn content_sha256(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Compute the lowercase hex SHA-256 of a file, streaming its contents.
///
/// Model weights are several gigabytes, so the file is never read whole.
pub fn file_sha256(path: &Path) -> ApplicationResult<String> {
    let mut file = File::open(path).with_path_context("open file for hashing", path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let n = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).with_path_context("read file for hashing", path),
        };
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Extract the digest from checksum tool output.
///
/// Takes the first whitespace-separated token, so both `shasum`'s
/// `"<hex>  <path>"` and a bare `"<hex>\n"` work.
///
/// # Examples
/// ```
/// use sdboot::application::hash::digest_from_tool_output;
///
/// let out = "49bb1c02  ./supplementary/stable_diffusion.zip\n";
/// assert_eq!(digest_from_tool_output(out), Some("49bb1c02"));
/// assert_eq!(digest_from_tool_output("  \n"), None);
/// ```
pub fn digest_from_tool_output(stdout: &str) -> Option<&str> {
    stdout.split_whitespace().next()
}
