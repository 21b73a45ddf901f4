//! Thin wrapper over the `git` command line.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::constants;
use crate::error::PublishError;

/// A git working tree driven through the `git` binary.
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
    program: String,
}

impl GitRepo {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            program: constants::TOOL_GIT.to_string(),
        }
    }

    /// Use a different git executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Stage `paths`, given relative to the working tree root.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Git`] if `git add` fails.
    pub fn add(&self, paths: &[&Path]) -> Result<(), PublishError> {
        let mut args: Vec<&OsStr> = vec![OsStr::new("add"), OsStr::new("--")];
        args.extend(paths.iter().map(|p| p.as_os_str()));
        self.run("add", &args)
    }

    /// # Errors
    ///
    /// Returns [`PublishError::Git`] if `git commit` fails, including when
    /// there is nothing to commit.
    pub fn commit(&self, message: &str) -> Result<(), PublishError> {
        self.run(
            "commit",
            &[OsStr::new("commit"), OsStr::new("-m"), OsStr::new(message)],
        )
    }

    /// # Errors
    ///
    /// Returns [`PublishError::Git`] carrying git's exit status.
    pub fn push(&self, remote: &str, branch: &str) -> Result<(), PublishError> {
        self.run(
            "push",
            &[OsStr::new("push"), OsStr::new(remote), OsStr::new(branch)],
        )
    }

    fn run(&self, command: &'static str, args: &[&OsStr]) -> Result<(), PublishError> {
        debug!(root = %self.root.display(), ?args, "running git");
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.root)
            .output()?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let detail = if stderr.trim().is_empty() {
            stdout.trim()
        } else {
            stderr.trim()
        };
        warn!(command, status = ?output.status.code(), "{detail}");

        Err(PublishError::Git {
            command,
            status: output.status.code(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Run git in `dir`, panicking on failure.
    pub(crate) fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(
            status.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&status.stderr)
        );
    }

    /// A working tree on branch `main` with a bare `origin`, or `None` when
    /// git is not installed.
    pub(crate) fn repo_with_remote() -> Option<(tempfile::TempDir, PathBuf)> {
        if !crate::utils::tool_available("git") {
            eprintln!("git not installed; skipping repository test");
            return None;
        }
        let base = tempfile::tempdir().unwrap();
        let remote = base.path().join("remote.git");
        let work = base.path().join("work");
        std::fs::create_dir_all(&remote).unwrap();
        std::fs::create_dir_all(&work).unwrap();

        git(&remote, &["init", "--bare", "--quiet"]);
        git(&work, &["init", "--quiet"]);
        git(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(&work, &["config", "user.name", "Test Publisher"]);
        git(&work, &["config", "user.email", "publisher@example.com"]);
        git(&work, &["config", "commit.gpgsign", "false"]);
        git(
            &work,
            &["remote", "add", "origin", remote.to_str().unwrap()],
        );
        Some((base, work))
    }

    #[test]
    fn test_add_commit_push() {
        let Some((base, work)) = repo_with_remote() else {
            return;
        };
        std::fs::write(work.join("a.gif"), constants::MINIMAL_GIF).unwrap();

        let repo = GitRepo::new(&work);
        repo.add(&[Path::new("a.gif")]).unwrap();
        repo.commit("Add GIF: a.gif").unwrap();
        repo.push("origin", "main").unwrap();

        let log = Command::new("git")
            .args(["log", "--format=%s", "main"])
            .current_dir(base.path().join("remote.git"))
            .output()
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&log.stdout).trim(), "Add GIF: a.gif");
    }

    #[test]
    fn test_commit_with_nothing_staged_fails() {
        let Some((_base, work)) = repo_with_remote() else {
            return;
        };
        let err = GitRepo::new(&work).commit("empty").unwrap_err();
        assert!(matches!(err, PublishError::Git { command: "commit", status: Some(1) }));
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = GitRepo::new(dir.path()).with_program("gifpub-missing-git");
        let err = repo.add(&[Path::new("a.gif")]).unwrap_err();
        assert!(matches!(err, PublishError::Io(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_program_carries_exit_status() {
        let tools = tempfile::tempdir().unwrap();
        let fake = crate::core::optimizer::tests::fake_tool(
            tools.path(),
            "git",
            "echo \"rejected: $*\" >&2\nexit 7",
        );
        let repo = GitRepo::new(tools.path()).with_program(fake);

        let err = repo.push("origin", "main").unwrap_err();
        assert!(matches!(err, PublishError::Git { command: "push", status: Some(7) }));
        assert_eq!(err.exit_code(), 7);
    }

    #[test]
    fn test_push_to_missing_remote_reports_status() {
        let Some((_base, work)) = repo_with_remote() else {
            return;
        };
        let err = GitRepo::new(&work).push("nowhere", "main").unwrap_err();
        assert!(matches!(err, PublishError::Git { command: "push", status: Some(code) } if code != 0));
        assert_ne!(err.exit_code(), 0);
    }
}
