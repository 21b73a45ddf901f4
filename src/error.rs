//! Error types and their process exit codes.

use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;

use crate::constants;

/// Fatal failures of the publish pipeline.
///
/// Optimization and commit failures are not represented here: both are
/// logged and the pipeline carries on.
#[derive(Error, Debug)]
pub enum PublishError {
    /// Bad arguments or metadata.
    #[error("{0}")]
    Usage(String),

    /// A required environment variable is unset or empty.
    #[error("environment variable {0} must be set")]
    MissingEnv(&'static str),

    /// Unreadable or malformed config file.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Download failed: {0}")]
    Download(String),

    /// The destination already exists on disk or in the manifest.
    #[error("'{}' already exists; refusing to overwrite", .0.display())]
    Conflict(PathBuf),

    /// A git command that must succeed did not.
    #[error("git {command} failed{}", status_suffix(.status.as_ref()))]
    Git {
        command: &'static str,
        status: Option<i32>,
    },

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn status_suffix(status: Option<&i32>) -> String {
    status.map_or_else(
        || " (terminated by signal)".to_string(),
        |code| format!(" with exit status {code}"),
    )
}

impl PublishError {
    /// Process exit code for this failure.
    ///
    /// Usage and missing-environment errors share code 1. A git failure
    /// exits with git's own status.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_)
            | Self::MissingEnv(_)
            | Self::Config(_)
            | Self::Manifest(_)
            | Self::Io(_) => constants::EXIT_USAGE,
            Self::Download(_) => constants::EXIT_DOWNLOAD,
            Self::Conflict(_) => constants::EXIT_CONFLICT,
            Self::Git { status, .. } => status
                .and_then(|code| u8::try_from(code).ok())
                .filter(|code| *code != 0)
                .unwrap_or(constants::EXIT_USAGE),
        }
    }
}

impl From<&PublishError> for ExitCode {
    fn from(err: &PublishError) -> Self {
        ExitCode::from(err.exit_code())
    }
}

/// Failures while reading, validating, or writing the manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("required file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected a JSON array in {}", .0.display())]
    NotAnArray(PathBuf),

    #[error("invalid schema: {0}")]
    Schema(String),

    /// Individual validation failures, formatted as `path: message`.
    #[error("{} validation error(s)", .0.len())]
    Invalid(Vec<String>),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
