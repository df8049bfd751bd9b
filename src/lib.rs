//! sdboot: bootstrapper for stable-diffusion.cpp
//!
//! Layers, innermost first:
//! - [`domain`]: platforms, artifact specs, checksums, acquisition states
//! - [`application`]: resolver, interaction shell and process invoker services
//! - [`infrastructure`]: filesystem/command/console boundaries and wiring
//! - [`cli`]: argument parsing, dispatch, terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
