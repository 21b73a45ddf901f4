//! CLI command handlers.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use color_eyre::eyre::{eyre, Result, WrapErr};
use tracing::{debug, warn};

use crate::cli::args::{Args, Commands};
use crate::cli::doctor;
use crate::config::{PagesSite, Settings};
use crate::constants;
use crate::core::manifest;
use crate::core::placeholders::{self, PlaceholderGenerator};
use crate::core::publisher::{PublishRequest, Publisher};
use crate::error::{ManifestError, PublishError};
use crate::state::{AssetMetadata, Optimization, Published};

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Dispatch a parsed command line and map the outcome to an exit code.
pub fn run(args: Args) -> ExitCode {
    let Args {
        repo,
        config,
        verbose: _,
        command,
    } = args;

    match command {
        Commands::Publish {
            url,
            filename,
            description,
            tags,
            describe,
            no_push,
            open,
        } => {
            let options = PublishOptions {
                url,
                filename,
                description,
                tags,
                describe,
                push: !no_push,
                open,
            };
            match publish(&repo, config, options) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Error: {e}");
                    ExitCode::from(&e)
                }
            }
        }
        Commands::Validate { schema, index_path } => {
            report(validate(&repo, config, schema, index_path))
        }
        Commands::Placeholders {
            index_path,
            gif_dir,
            touch,
        } => report(generate_placeholders(&repo, config, index_path, gif_dir, touch)),
        Commands::Doctor => report(
            Settings::resolve(&repo, config, env_var)
                .map(|settings| doctor::run(&settings))
                .map_err(Into::into),
        ),
    }
}

fn report(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::from(constants::EXIT_USAGE)
        }
    }
}

// ── publish ─────────────────────────────────────────────────────────────────

struct PublishOptions {
    url: String,
    filename: String,
    description: Option<String>,
    tags: Vec<String>,
    describe: bool,
    push: bool,
    open: bool,
}

fn publish(repo: &Path, config: Option<PathBuf>, options: PublishOptions) -> Result<(), PublishError> {
    // Identifiers first: nothing else runs without them.
    let site = PagesSite::from_env(env_var)?;
    let settings = Settings::resolve(repo, config, env_var)?;

    let metadata = if options.describe {
        Some(prompt_metadata()?)
    } else {
        options
            .description
            .as_deref()
            .map(|d| AssetMetadata::new(d, &options.tags))
    };

    let request = PublishRequest {
        url: options.url,
        filename: options.filename,
        metadata,
        push: options.push,
    };
    println!("{}{}", constants::CLI_MSG_DOWNLOADING, request.url);
    let published = Publisher::new(settings, site).publish(&request)?;
    print_published(&published);

    if options.open {
        if let Err(e) = open::that(&published.url) {
            warn!(error = %e, "could not open browser");
        }
    }
    Ok(())
}

fn print_published(published: &Published) {
    println!(
        "{}{} ({} bytes)",
        constants::CLI_MSG_DOWNLOADED,
        published.filename,
        published.downloaded_bytes
    );
    if let Optimization::Applied(tool) = published.optimization {
        println!("{}{tool}", constants::CLI_MSG_OPTIMIZED);
    }
    println!(
        "{}{} ({} bytes)",
        constants::CLI_MSG_PUBLISHED,
        published.path.display(),
        published.bytes
    );
    if !published.pushed {
        println!("{}", constants::CLI_MSG_NOT_PUSHED);
    }
    println!("{}{}", constants::CLI_MSG_URL, published.url);
}

/// Ask for a description and tags until both are acceptable.
fn prompt_metadata() -> Result<AssetMetadata, PublishError> {
    if !crossterm::tty::IsTty::is_tty(&io::stdin()) {
        return Err(PublishError::Usage(constants::ERR_NOT_A_TERMINAL.to_string()));
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut ask = |prompt: &str| -> Result<String, PublishError> {
        print!("{prompt}");
        io::stdout().flush()?;
        match lines.next() {
            Some(line) => Ok(line?.trim().to_string()),
            None => Err(PublishError::Usage("input closed".to_string())),
        }
    };

    println!("\n--- Enter Metadata ---");
    let description = loop {
        let desc = ask(constants::PROMPT_DESCRIPTION)?;
        let len = desc.chars().count();
        if (constants::DESCRIPTION_MIN_CHARS..=constants::DESCRIPTION_MAX_CHARS).contains(&len) {
            break desc;
        }
        println!(
            "Description must be between {} and {} characters.",
            constants::DESCRIPTION_MIN_CHARS,
            constants::DESCRIPTION_MAX_CHARS
        );
    };

    loop {
        let raw = ask(constants::PROMPT_TAGS)?;
        let meta = AssetMetadata::new(&description, &[raw]);
        if !meta.tags.is_empty() {
            return Ok(meta);
        }
        println!("Please enter at least one tag.");
    }
}

// ── validate ────────────────────────────────────────────────────────────────

fn validate(
    repo: &Path,
    config: Option<PathBuf>,
    schema: Option<PathBuf>,
    index_path: Option<PathBuf>,
) -> Result<()> {
    let settings = Settings::resolve(repo, config, env_var)?;
    let schema_path = schema.unwrap_or_else(|| settings.schema_path());
    let manifest_path = index_path.unwrap_or_else(|| settings.manifest_path());
    debug!(schema = %schema_path.display(), manifest = %manifest_path.display(), "validating");

    match manifest::validate_file(&schema_path, &manifest_path) {
        Ok(count) => {
            println!(
                "{}{} ({count} entries)",
                constants::CLI_MSG_VALID,
                manifest_path.display()
            );
            Ok(())
        }
        Err(ManifestError::Invalid(problems)) => {
            println!("{}", constants::CLI_MSG_INVALID_HEADER);
            for problem in &problems {
                println!("  {problem}");
            }
            println!(
                "\nEnsure your manifest follows the rules in '{}'.",
                constants::SCHEMA_FILE_NAME
            );
            Err(eyre!(
                "{} failed validation with {} error(s)",
                manifest_path.display(),
                problems.len()
            ))
        }
        Err(e) => Err(e).wrap_err("manifest validation could not run"),
    }
}

// ── placeholders ────────────────────────────────────────────────────────────

fn generate_placeholders(
    repo: &Path,
    config: Option<PathBuf>,
    index_path: Option<PathBuf>,
    gif_dir: Option<PathBuf>,
    touch: bool,
) -> Result<()> {
    let settings = Settings::resolve(repo, config, env_var)?;
    let index_path = index_path.unwrap_or_else(|| settings.manifest_path());
    let gif_dir = gif_dir.unwrap_or_else(|| settings.assets_path());

    let entries = placeholders::load_entries(&index_path)
        .wrap_err_with(|| format!("could not load {}", index_path.display()))?;
    let generator = PlaceholderGenerator::new(&gif_dir, !touch)?;
    let created = generator.generate(&entries);

    for name in &created {
        println!("{}{name}", constants::CLI_MSG_PLACEHOLDER_CREATED);
    }
    println!(
        "{}{}{}",
        constants::CLI_MSG_PLACEHOLDER_SUMMARY,
        created.len(),
        constants::CLI_MSG_PLACEHOLDER_SUFFIX
    );
    Ok(())
}
