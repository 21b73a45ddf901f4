//! Application-wide constants and configuration values.
//!
//! This module defines all static configuration values used throughout gifpub,
//! including defaults, environment variable names, external tool invocations,
//! and CLI messages.

// === Application Metadata ===

/// Application name (from Cargo.toml).
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
/// Current application version (from Cargo.toml).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// === Environment ===

/// Account that owns the GitHub Pages site.
pub const ENV_ACCOUNT: &str = "GITHUB_USER";
/// Repository served by GitHub Pages.
pub const ENV_REPO: &str = "GITHUB_REPO";
/// Toggle for the local optimization step.
pub const ENV_OPTIMIZE: &str = "GIFPUB_OPTIMIZE";
/// Explicit config file location.
pub const ENV_CONFIG: &str = "GIFPUB_CONFIG";

/// Values of [`ENV_OPTIMIZE`] that switch optimization off.
pub const FALSY_VALUES: [&str; 4] = ["0", "false", "no", "off"];

// === Path Configuration ===

/// Name of the config subdirectory under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "gifpub";
/// Name of the config file.
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Asset directory, relative to the repository root.
pub const DEFAULT_ASSETS_DIR: &str = "gifs";
/// Manifest file name inside the asset directory.
pub const MANIFEST_FILE_NAME: &str = "index.json";
/// Schema file, relative to the repository root.
pub const SCHEMA_FILE_NAME: &str = "gif-schema.json";
/// Name of the downloaded file inside the scratch directory.
pub const DOWNLOAD_FILE_NAME: &str = "download.gif";
/// Name of optimizer output inside the scratch directory.
pub const OPTIMIZED_FILE_NAME: &str = "optimized.gif";

// === Git ===

pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_BRANCH: &str = "main";
/// Commit message prefix; the filename is appended.
pub const COMMIT_PREFIX: &str = "Add GIF: ";

// === Download ===

/// Default upper bound on a download, in MiB. Zero disables the check.
pub const DEFAULT_MAX_DOWNLOAD_MB: u64 = 5;
pub const GIF_CONTENT_TYPE: &str = "image/gif";
pub const GIF_EXTENSION: &str = ".gif";

// === Manifest rules ===

pub const DESCRIPTION_MIN_CHARS: usize = 10;
pub const DESCRIPTION_MAX_CHARS: usize = 200;

/// Minimal valid 1x1 transparent GIF89a.
pub const MINIMAL_GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\xff\xff\xff\x00\x00\x00!\xf9\x04\x01\x00\x00\x00\x00,\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02D\x01\x00;";

// === External Tools ===

pub const TOOL_GIT: &str = "git";
pub const TOOL_GIFSICLE: &str = "gifsicle";
pub const TOOL_FFMPEG: &str = "ffmpeg";

/// Palette-based re-encode; keeps GIF output reasonably small.
pub const FFMPEG_PALETTE_FILTER: &str = "[0:v] split [a][b];[a] palettegen [p];[b][p] paletteuse";

// === Exit Codes ===

pub const EXIT_USAGE: u8 = 1;
pub const EXIT_DOWNLOAD: u8 = 2;
pub const EXIT_CONFLICT: u8 = 3;

// === Messages: CLI Output ===

pub const CLI_MSG_DOWNLOADING: &str = "Downloading GIF from: ";
pub const CLI_MSG_DOWNLOADED: &str = "Downloaded ";
pub const CLI_MSG_OPTIMIZED: &str = "Optimized with ";
pub const CLI_MSG_PUBLISHED: &str = "Published: ";
pub const CLI_MSG_URL: &str = "   URL: ";
pub const CLI_MSG_NOT_PUSHED: &str = "   Not pushed (--no-push). Run 'git push' to publish.";
pub const CLI_MSG_VALID: &str = "Manifest is valid: ";
pub const CLI_MSG_INVALID_HEADER: &str = "\n--- VALIDATION FAILED ---";
pub const CLI_MSG_PLACEHOLDER_CREATED: &str = "Created placeholder: ";
pub const CLI_MSG_PLACEHOLDER_SUMMARY: &str = "\nFinished: created ";
pub const CLI_MSG_PLACEHOLDER_SUFFIX: &str = " new placeholder file(s).";

pub const PROMPT_DESCRIPTION: &str = "Description (10-200 characters): ";
pub const PROMPT_TAGS: &str = "Tags (comma separated): ";

// === Error Messages ===

pub const ERR_HTML_CONTENT: &str =
    "URL returned HTML content. Did you mean to use the direct link to the GIF?";
pub const ERR_EMPTY_CONTENT: &str = "Downloaded content is empty";
pub const ERR_SERVER_ERROR: &str = "Server returned error: ";
pub const ERR_HTTP_CLIENT_BUILD_FAILED: &str = "Failed to build HTTP client";
pub const ERR_NETWORK_REQUEST_FAILED: &str = "Network request failed";
pub const ERR_READ_CONTENT_FAILED: &str = "Failed to read content";
pub const ERR_WRITE_FAILED: &str = "Failed to write";
pub const ERR_SCRATCH_FAILED: &str = "Failed to create scratch directory";
pub const ERR_TOO_LARGE: &str = "Download exceeds size limit of ";
pub const ERR_NOT_A_TERMINAL: &str = "--describe needs an interactive terminal";
