//! Helpers for probing and running external commands.

use std::path::Path;
use std::process::Command;

/// Run a command and return its stdout as a trimmed string.
pub fn cmd_stdout(cmd: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(cmd).args(args).output().ok()?;
    if output.status.success() {
        let s = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    } else {
        None
    }
}

/// Locate `name` on `$PATH`.
pub fn which(name: &str) -> Option<String> {
    cmd_stdout("which", &[name]).map(|p| p.lines().next().unwrap_or_default().to_string())
}

/// Whether `name` can be run. Absolute or relative paths are checked
/// directly; bare names go through `which`.
pub fn tool_available(name: &str) -> bool {
    if name.contains('/') {
        Path::new(name).is_file()
    } else {
        which(name).is_some()
    }
}

/// Size of a file in bytes, or zero if it cannot be read.
pub fn file_len(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Extract the first meaningful version string from command output.
/// Handles formats like "git version 2.43.0", "LCDF Gifsicle 1.94",
/// "ffmpeg version 6.1.1-3ubuntu5", etc.
pub fn parse_version_line(raw: &str) -> Option<String> {
    let first_line = raw.lines().next()?.trim();
    if first_line.is_empty() {
        return None;
    }

    // Look for a token that starts with a digit or 'v' followed by a digit
    for token in first_line.split_whitespace() {
        let t = token.strip_prefix('v').unwrap_or(token);
        if t.chars().next().is_some_and(|c| c.is_ascii_digit()) && t.contains('.') {
            let clean: String = t
                .chars()
                .take_while(|c| *c == '.' || c.is_ascii_digit())
                .collect();
            let clean = clean.trim_end_matches('.');
            if !clean.is_empty() {
                return Some(clean.to_string());
            }
        }
    }

    None
}
