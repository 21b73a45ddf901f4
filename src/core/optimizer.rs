//! Best-effort GIF optimization through external tools.
//!
//! Optimizers are tried in order. The first one that is installed and
//! writes a non-empty output wins. Nothing here is fatal.

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::constants;
use crate::utils;

/// Argument convention of a supported optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizerKind {
    /// `gifsicle -O3 <in> -o <out>`
    Gifsicle,
    /// `ffmpeg -y -loglevel error -i <in> -filter_complex <palette> <out>`
    Ffmpeg,
}

/// An external optimizer and the program used to run it.
#[derive(Debug, Clone)]
pub struct Optimizer {
    pub kind: OptimizerKind,
    pub program: String,
}

impl Optimizer {
    #[must_use]
    pub fn gifsicle() -> Self {
        Self {
            kind: OptimizerKind::Gifsicle,
            program: constants::TOOL_GIFSICLE.to_string(),
        }
    }

    #[must_use]
    pub fn ffmpeg() -> Self {
        Self {
            kind: OptimizerKind::Ffmpeg,
            program: constants::TOOL_FFMPEG.to_string(),
        }
    }

    /// Run this optimizer through a different executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// GIF-specialized tool first, then the general media tool.
    #[must_use]
    pub fn default_chain() -> Vec<Self> {
        vec![Self::gifsicle(), Self::ffmpeg()]
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self.kind {
            OptimizerKind::Gifsicle => constants::TOOL_GIFSICLE,
            OptimizerKind::Ffmpeg => constants::TOOL_FFMPEG,
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        utils::tool_available(&self.program)
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        match self.kind {
            OptimizerKind::Gifsicle => {
                cmd.arg("-O3").arg(input).arg("-o").arg(output);
            }
            OptimizerKind::Ffmpeg => {
                cmd.args(["-y", "-loglevel", "error", "-i"])
                    .arg(input)
                    .args(["-filter_complex", constants::FFMPEG_PALETTE_FILTER])
                    .arg(output);
            }
        }
        cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::piped());
        cmd
    }

    /// Optimize `input` into `output`. Success means the tool ran and
    /// `output` is non-empty; the exit status alone is not trusted.
    #[must_use]
    pub fn run(&self, input: &Path, output: &Path) -> bool {
        match self.command(input, output).output() {
            Ok(out) => {
                if !out.status.success() {
                    debug!(
                        tool = self.name(),
                        status = ?out.status.code(),
                        stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                        "optimizer exited unsuccessfully"
                    );
                }
                utils::file_len(output) > 0
            }
            Err(e) => {
                debug!(tool = self.name(), error = %e, "optimizer could not be started");
                false
            }
        }
    }
}

/// Try each optimizer on `path` and replace it with the first good result.
///
/// Returns the name of the optimizer that was applied, or `None` when the
/// original file was kept.
pub fn optimize_in_place(path: &Path, chain: &[Optimizer]) -> Option<&'static str> {
    let output = path.with_file_name(constants::OPTIMIZED_FILE_NAME);

    for optimizer in chain {
        if !optimizer.is_available() {
            debug!(tool = optimizer.name(), program = %optimizer.program, "optimizer not installed");
            continue;
        }

        if optimizer.run(path, &output) {
            match fs::rename(&output, path) {
                Ok(()) => {
                    debug!(
                        tool = optimizer.name(),
                        bytes = utils::file_len(path),
                        "optimized"
                    );
                    return Some(optimizer.name());
                }
                Err(e) => warn!(tool = optimizer.name(), error = %e, "could not replace original"),
            }
        }
        let _ = fs::remove_file(&output);
    }

    debug!("no optimizer succeeded; keeping original");
    None
}
