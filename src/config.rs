//! Runtime configuration.
//!
//! Settings come from an optional TOML file, then the environment. The
//! GitHub Pages identifiers are only read from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::constants;
use crate::error::PublishError;

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Asset directory relative to the repository root.
    pub assets_dir: Option<PathBuf>,
    pub remote: Option<String>,
    pub branch: Option<String>,
    pub optimize: Option<bool>,
    /// Download size limit in MiB; `0` disables the check.
    pub max_download_mb: Option<u64>,
    pub http_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl FileConfig {
    /// Read `path`, returning the defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Config`] if the file exists but cannot be read
    /// or parsed.
    pub fn load(path: &Path) -> Result<Option<Self>, PublishError> {
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| PublishError::Config(format!("{}: {e}", path.display())))?;
        let parsed = toml::from_str(&content)
            .map_err(|e| PublishError::Config(format!("{}: {e}", path.display())))?;
        Ok(Some(parsed))
    }
}

/// Default config location: `<config dir>/gifpub/config.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| {
        dir.join(constants::CONFIG_DIR_NAME)
            .join(constants::CONFIG_FILE_NAME)
    })
}

/// Resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Git working tree holding the asset directory.
    pub repo_root: PathBuf,
    /// Asset directory, relative to `repo_root`.
    pub assets_dir: PathBuf,
    pub remote: String,
    pub branch: String,
    pub optimize: bool,
    pub max_download_bytes: Option<u64>,
    pub http_timeout: Option<Duration>,
    pub user_agent: String,
    /// Config file consulted, and whether it existed.
    pub config_path: Option<PathBuf>,
    pub config_found: bool,
}

impl Settings {
    /// Built-in defaults rooted at `repo_root`.
    #[must_use]
    pub fn defaults(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
            assets_dir: PathBuf::from(constants::DEFAULT_ASSETS_DIR),
            remote: constants::DEFAULT_REMOTE.to_string(),
            branch: constants::DEFAULT_BRANCH.to_string(),
            optimize: true,
            max_download_bytes: mib_to_bytes(constants::DEFAULT_MAX_DOWNLOAD_MB),
            http_timeout: None,
            user_agent: format!("{}/{}", constants::APP_NAME, constants::APP_VERSION),
            config_path: None,
            config_found: false,
        }
    }

    /// Resolve settings from the config file and environment.
    ///
    /// `env` looks up a variable by name; pass `|k| std::env::var(k).ok()` in
    /// production.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Config`] for a malformed config file.
    /// An explicit `config_path` that does not exist is logged at `warn`;
    /// a missing default file is not.
    pub fn resolve<F>(
        repo_root: impl Into<PathBuf>,
        config_path: Option<PathBuf>,
        env: F,
    ) -> Result<Self, PublishError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::defaults(repo_root);
        let explicit = config_path.is_some();
        let config_path = config_path.or_else(default_config_path);

        if let Some(path) = &config_path {
            match FileConfig::load(path)? {
                Some(file) => {
                    debug!(path = %path.display(), "loaded config file");
                    settings.apply(file);
                    settings.config_found = true;
                }
                None if explicit => {
                    warn!(path = %path.display(), "config file not found; using defaults");
                }
                None => debug!(path = %path.display(), "no config file"),
            }
        }
        settings.config_path = config_path;

        if let Some(raw) = env(constants::ENV_OPTIMIZE) {
            settings.optimize = parse_toggle(&raw);
        }
        Ok(settings)
    }

    fn apply(&mut self, file: FileConfig) {
        if let Some(dir) = file.assets_dir {
            self.assets_dir = dir;
        }
        if let Some(remote) = file.remote {
            self.remote = remote;
        }
        if let Some(branch) = file.branch {
            self.branch = branch;
        }
        if let Some(optimize) = file.optimize {
            self.optimize = optimize;
        }
        if let Some(mb) = file.max_download_mb {
            self.max_download_bytes = mib_to_bytes(mb);
        }
        if let Some(secs) = file.http_timeout_secs {
            self.http_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(agent) = file.user_agent {
            self.user_agent = agent;
        }
    }

    /// Absolute path of the asset directory.
    #[must_use]
    pub fn assets_path(&self) -> PathBuf {
        self.repo_root.join(&self.assets_dir)
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.assets_path().join(constants::MANIFEST_FILE_NAME)
    }

    #[must_use]
    pub fn schema_path(&self) -> PathBuf {
        self.repo_root.join(constants::SCHEMA_FILE_NAME)
    }
}

fn mib_to_bytes(mb: u64) -> Option<u64> {
    (mb > 0).then(|| mb.saturating_mul(1024 * 1024))
}

/// Interpret a boolean-like environment value. Anything not falsy is on.
#[must_use]
pub fn parse_toggle(raw: &str) -> bool {
    let value = raw.trim().to_lowercase();
    !constants::FALSY_VALUES.contains(&value.as_str())
}

/// The GitHub Pages site the assets are served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagesSite {
    pub account: String,
    pub repo: String,
}

impl PagesSite {
    /// Read both identifiers through `env`.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::MissingEnv`] naming the first variable that
    /// is unset or blank.
    pub fn from_env<F>(env: F) -> Result<Self, PublishError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &'static str| {
            env(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(PublishError::MissingEnv(key))
        };
        Ok(Self {
            account: read(constants::ENV_ACCOUNT)?,
            repo: read(constants::ENV_REPO)?,
        })
    }

    /// `https://<account>.github.io/<repo>/<assets_dir>/<filename>`
    #[must_use]
    pub fn public_url(&self, assets_dir: &Path, filename: &str) -> String {
        let mut url = format!("https://{}.github.io/{}", self.account, self.repo);
        for part in assets_dir.components() {
            url.push('/');
            url.push_str(&part.as_os_str().to_string_lossy());
        }
        url.push('/');
        url.push_str(&urlencoding::encode(filename));
        url
    }
}
