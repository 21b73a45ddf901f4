//! Placeholder files for manifest entries whose GIF has not been added yet.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{error, warn};

use crate::constants;
use crate::core::manifest;
use crate::error::ManifestError;

/// Load the manifest as raw JSON values so malformed entries can be skipped
/// one by one.
///
/// # Errors
///
/// Fails if the file is missing, is not JSON, or is not an array.
pub fn load_entries(path: &Path) -> Result<Vec<Value>, ManifestError> {
    match manifest::read_json(path)? {
        Value::Array(items) => Ok(items),
        _ => Err(ManifestError::NotAnArray(path.to_path_buf())),
    }
}

/// Creates missing GIF files for manifest entries.
#[derive(Debug)]
pub struct PlaceholderGenerator {
    gif_dir: PathBuf,
    write_minimal: bool,
}

impl PlaceholderGenerator {
    /// `write_minimal` selects the 1x1 GIF body; otherwise files are empty.
    /// The directory is created if needed.
    ///
    /// # Errors
    ///
    /// Fails if `gif_dir` cannot be created.
    pub fn new(gif_dir: impl Into<PathBuf>, write_minimal: bool) -> Result<Self, ManifestError> {
        let gif_dir = gif_dir.into();
        std::fs::create_dir_all(&gif_dir).map_err(|source| ManifestError::Io {
            path: gif_dir.clone(),
            source,
        })?;
        Ok(Self {
            gif_dir,
            write_minimal,
        })
    }

    fn write_placeholder(&self, path: &Path) -> io::Result<()> {
        // create_new: an existing file is never touched.
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        if self.write_minimal {
            file.write_all(constants::MINIMAL_GIF)?;
        }
        Ok(())
    }

    /// Create a placeholder for every valid entry whose file is missing.
    /// Returns the filenames that were created.
    pub fn generate(&self, entries: &[Value]) -> Vec<String> {
        let mut created = Vec::new();

        for entry in entries {
            let filename = entry
                .get("filename")
                .and_then(Value::as_str)
                .filter(|f| is_plain_gif_name(f));
            let Some(filename) = filename else {
                warn!(%entry, "entry missing a valid 'filename'; skipping");
                continue;
            };

            let path = self.gif_dir.join(filename);
            if path.exists() {
                continue;
            }

            match self.write_placeholder(&path) {
                Ok(()) => created.push(filename.to_string()),
                Err(e) => error!(path = %path.display(), error = %e, "failed to create placeholder"),
            }
        }

        created
    }
}

/// A bare `*.gif` file name with no directory components.
fn is_plain_gif_name(name: &str) -> bool {
    name.ends_with(constants::GIF_EXTENSION)
        && !name.contains('/')
        && !name.contains('\\')
        && name.len() > constants::GIF_EXTENSION.len()
}
