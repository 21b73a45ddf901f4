//! GIF asset and manifest entry types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One record in `gifs/index.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// File name inside the asset directory (e.g. `mac_patdown.gif`).
    pub filename: String,
    /// Human-readable description.
    pub description: String,
    /// Lowercase search tags.
    pub tags: Vec<String>,
}

/// Description and tags supplied on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetMetadata {
    pub description: String,
    pub tags: Vec<String>,
}

impl AssetMetadata {
    /// Build metadata from a description and raw tag arguments. Each tag
    /// argument may hold several comma-separated tags.
    #[must_use]
    pub fn new(description: &str, raw_tags: &[String]) -> Self {
        let tags = raw_tags
            .iter()
            .flat_map(|t| t.split(','))
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self {
            description: description.trim().to_string(),
            tags,
        }
    }

    #[must_use]
    pub fn into_entry(self, filename: &str) -> ManifestEntry {
        ManifestEntry {
            filename: filename.to_string(),
            description: self.description,
            tags: self.tags,
        }
    }
}

/// Which optimizer produced the published bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Optimization {
    /// Optimization disabled by configuration.
    Disabled,
    /// Enabled, but no optimizer succeeded; original bytes kept.
    Unchanged,
    /// Replaced by the named optimizer's output.
    Applied(&'static str),
}

/// Result of a successful publish run.
#[derive(Debug, Clone)]
pub struct Published {
    /// Final location inside the asset directory.
    pub path: PathBuf,
    pub filename: String,
    pub url: String,
    /// Size as fetched, before optimization.
    pub downloaded_bytes: u64,
    /// Size of the stored file.
    pub bytes: u64,
    pub optimization: Optimization,
    /// False when the commit step failed and was skipped.
    pub committed: bool,
    pub pushed: bool,
}
