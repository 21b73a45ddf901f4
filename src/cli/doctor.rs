//! Environment diagnostics.
//!
//! Prints the resolved configuration and which external tools the publish
//! pipeline can use.

use std::fmt::Write as _;
use std::process::Command;

use crate::config::{PagesSite, Settings};
use crate::constants;
use crate::utils;

// ── Data structures ─────────────────────────────────────────────────────────

/// Status of a runtime dependency (e.g. `git`, `gifsicle`).
pub struct ToolStatus {
    pub name: &'static str,
    pub path: Option<String>,
    pub version: Option<String>,
}

// ── Public entry point ──────────────────────────────────────────────────────

/// Collect and print the diagnostics.
pub fn run(settings: &Settings) {
    let site = PagesSite::from_env(|k| std::env::var(k).ok());
    let tools = collect_tool_statuses();
    print!("{}", format_report(settings, site.ok().as_ref(), &tools));
}

// ── Tool status checks ─────────────────────────────────────────────────────

fn collect_tool_statuses() -> Vec<ToolStatus> {
    vec![
        check_tool(constants::TOOL_GIT, &["--version"]),
        check_tool(constants::TOOL_GIFSICLE, &["--version"]),
        check_tool(constants::TOOL_FFMPEG, &["-version"]),
    ]
}

/// Check if a tool exists on `$PATH` and try to get its version.
fn check_tool(name: &'static str, version_args: &[&str]) -> ToolStatus {
    let path = utils::which(name);

    let version = match Command::new(name).args(version_args).output() {
        Ok(output) => {
            let raw = if output.stdout.is_empty() {
                String::from_utf8_lossy(&output.stderr).to_string()
            } else {
                String::from_utf8_lossy(&output.stdout).to_string()
            };
            utils::parse_version_line(&raw)
        }
        Err(_) => None,
    };

    ToolStatus {
        name,
        path,
        version,
    }
}

// ── Formatting ──────────────────────────────────────────────────────────────

fn format_report(settings: &Settings, site: Option<&PagesSite>, tools: &[ToolStatus]) -> String {
    let mut out = String::with_capacity(1024);

    let _ = writeln!(out, "{} {}", constants::APP_NAME, constants::APP_VERSION);
    let _ = writeln!(out, "==================\n");

    let _ = writeln!(out, "  Config:");
    let config_status = match (&settings.config_path, settings.config_found) {
        (Some(p), true) => format!("{} (found)", p.display()),
        (Some(p), false) => format!("{} (not found, using defaults)", p.display()),
        (None, _) => "none (using defaults)".to_string(),
    };
    let _ = writeln!(out, "    File:        {config_status}");
    let _ = writeln!(out, "    Repository:  {}", settings.repo_root.display());
    let _ = writeln!(out, "    Assets:      {}", settings.assets_dir.display());
    let _ = writeln!(
        out,
        "    Push to:     {} {}",
        settings.remote, settings.branch
    );
    let _ = writeln!(
        out,
        "    Optimize:    {}",
        if settings.optimize { "on" } else { "off" }
    );
    let limit = settings
        .max_download_bytes
        .map_or_else(|| "none".to_string(), |b| format!("{} MiB", b / (1024 * 1024)));
    let _ = writeln!(out, "    Size limit:  {limit}");

    let _ = writeln!(out, "\n  Pages site:");
    match site {
        Some(site) => {
            let _ = writeln!(
                out,
                "    {}",
                site.public_url(&settings.assets_dir, "<filename>")
                    .replace("%3Cfilename%3E", "<filename>")
            );
        }
        None => {
            let _ = writeln!(
                out,
                "    not configured (set {} and {})",
                constants::ENV_ACCOUNT,
                constants::ENV_REPO
            );
        }
    }

    let _ = writeln!(out, "\n  Dependencies:");
    for tool in tools {
        let status = match (&tool.path, &tool.version) {
            (Some(p), Some(v)) => format!("{p} ({v})"),
            (Some(p), None) => p.clone(),
            _ => "not found".to_string(),
        };
        let _ = writeln!(out, "    {:<12} {status}", tool.name);
    }
    let _ = writeln!(out);

    out
}
