//! Command-line interface module.
//!
//! Provides argument parsing and CLI command handling.

pub mod args;
pub mod commands;
pub mod doctor;

use crate::constants;

/// Exit code for a failed parse. Help and version output are not failures;
/// every real parse error is a usage error.
#[must_use]
pub fn parse_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        constants::EXIT_USAGE
    } else {
        0
    }
}
