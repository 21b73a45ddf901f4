//! The publish pipeline: fetch, optimize, guard, commit, push.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::{PagesSite, Settings};
use crate::constants;
use crate::core::downloader;
use crate::core::git::GitRepo;
use crate::core::manifest::{self, Manifest};
use crate::core::optimizer::{self, Optimizer};
use crate::error::{ManifestError, PublishError};
use crate::state::{AssetMetadata, ManifestEntry, Optimization, Published};

/// One publish invocation.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    /// Source URL of the GIF.
    pub url: String,
    /// Destination filename as typed by the user; normalized before use.
    pub filename: String,
    /// When set, an entry is added to the manifest.
    pub metadata: Option<AssetMetadata>,
    pub push: bool,
}

/// Lowercase, replace spaces with underscores, and require a bare `*.gif`
/// name.
///
/// # Errors
///
/// [`PublishError::Usage`] for names that are empty, lack the `.gif`
/// extension, or contain path components.
pub fn normalize_filename(raw: &str) -> Result<String, PublishError> {
    let name = raw.trim().to_lowercase().replace(' ', "_");

    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(PublishError::Usage(format!(
            "filename must not contain path components: '{raw}'"
        )));
    }
    if !name.ends_with(constants::GIF_EXTENSION) || name.len() == constants::GIF_EXTENSION.len() {
        return Err(PublishError::Usage(format!(
            "filename must end with '{}': '{raw}'",
            constants::GIF_EXTENSION
        )));
    }
    Ok(name)
}

/// Runs the pipeline against one repository.
#[derive(Debug)]
pub struct Publisher {
    settings: Settings,
    site: PagesSite,
    optimizers: Vec<Optimizer>,
    git: GitRepo,
}

impl Publisher {
    #[must_use]
    pub fn new(settings: Settings, site: PagesSite) -> Self {
        let git = GitRepo::new(&settings.repo_root);
        Self {
            settings,
            site,
            optimizers: Optimizer::default_chain(),
            git,
        }
    }

    /// Replace the optimizer chain.
    #[must_use]
    pub fn with_optimizers(mut self, optimizers: Vec<Optimizer>) -> Self {
        self.optimizers = optimizers;
        self
    }

    /// Publish one GIF.
    ///
    /// The scratch directory is removed when this returns, on every path.
    ///
    /// # Errors
    ///
    /// Usage errors for bad filenames or metadata, download errors, a
    /// conflict when the destination exists, and git errors from staging or
    /// pushing. A failed commit is logged and does not fail the run.
    pub fn publish(&self, request: &PublishRequest) -> Result<Published, PublishError> {
        let filename = normalize_filename(&request.filename)?;
        let dest = self.settings.assets_path().join(&filename);

        let entry = match &request.metadata {
            Some(meta) => Some(self.check_metadata(meta, &filename, &dest)?),
            None => None,
        };

        let scratch = tempfile::Builder::new()
            .prefix(&format!("{}-", constants::APP_NAME))
            .tempdir()
            .map_err(|e| {
                PublishError::Download(format!("{}: {e}", constants::ERR_SCRATCH_FAILED))
            })?;
        let download = scratch.path().join(constants::DOWNLOAD_FILE_NAME);

        debug!(url = %request.url, "downloading");
        let downloaded_bytes =
            downloader::download_gif(&request.url, &download, &self.settings)?;

        let optimization = self.optimize(&download);

        // symlink_metadata: a dangling link still occupies the name.
        if fs::symlink_metadata(&dest).is_ok() {
            return Err(PublishError::Conflict(dest));
        }

        fs::create_dir_all(self.settings.assets_path())?;
        move_file(&download, &dest)?;
        info!(dest = %dest.display(), "stored asset");

        let rel_asset = self.settings.assets_dir.join(&filename);
        let rel_manifest = self.settings.assets_dir.join(constants::MANIFEST_FILE_NAME);
        let mut staged: Vec<&Path> = vec![rel_asset.as_path()];
        if let Some(entry) = entry {
            let mut manifest = Manifest::load(&self.settings.manifest_path())?;
            manifest.insert(entry);
            manifest.save()?;
            staged.push(rel_manifest.as_path());
        }

        self.git.add(&staged)?;

        let message = format!("{}{filename}", constants::COMMIT_PREFIX);
        let committed = match self.git.commit(&message) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "commit failed; continuing");
                false
            }
        };

        if request.push {
            self.git.push(&self.settings.remote, &self.settings.branch)?;
        }

        let url = self.site.public_url(&self.settings.assets_dir, &filename);
        Ok(Published {
            downloaded_bytes,
            bytes: crate::utils::file_len(&dest),
            path: dest,
            filename,
            url,
            optimization,
            committed,
            pushed: request.push,
        })
    }

    /// Validate metadata before anything is downloaded.
    fn check_metadata(
        &self,
        meta: &AssetMetadata,
        filename: &str,
        dest: &Path,
    ) -> Result<ManifestEntry, PublishError> {
        let entry = meta.clone().into_entry(filename);
        let schema = manifest::load_schema(&self.settings.schema_path())?;
        match manifest::validate_entry(&schema, &entry) {
            Ok(()) => {}
            Err(ManifestError::Invalid(problems)) => {
                return Err(PublishError::Usage(format!(
                    "invalid metadata: {}",
                    problems.join("; ")
                )));
            }
            Err(e) => return Err(e.into()),
        }

        if Manifest::load(&self.settings.manifest_path())?.contains(filename) {
            debug!(filename, "already listed in manifest");
            return Err(PublishError::Conflict(dest.to_path_buf()));
        }
        Ok(entry)
    }

    fn optimize(&self, path: &Path) -> Optimization {
        if !self.settings.optimize {
            debug!("optimization disabled");
            return Optimization::Disabled;
        }
        optimizer::optimize_in_place(path, &self.optimizers)
            .map_or(Optimization::Unchanged, Optimization::Applied)
    }
}

/// Rename, falling back to copy + remove across filesystems.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}
