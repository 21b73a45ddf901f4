//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::constants;

/// gifpub - publish GIFs to a GitHub Pages asset repository
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Git working tree that holds the asset directory
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub repo: PathBuf,

    /// Config file [default: <config dir>/gifpub/config.toml]
    #[arg(long, global = true, env = constants::ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a GIF, optimize it, commit it, and push it
    Publish {
        /// Direct URL to the GIF
        url: String,
        /// Destination filename inside the asset directory (must end in .gif)
        filename: String,
        /// Add a manifest entry with this description
        #[arg(long)]
        description: Option<String>,
        /// Manifest tag; repeat or separate with commas
        #[arg(long = "tag", value_name = "TAG", requires = "description")]
        tags: Vec<String>,
        /// Prompt for description and tags
        #[arg(long, conflicts_with = "description")]
        describe: bool,
        /// Commit locally without pushing
        #[arg(long)]
        no_push: bool,
        /// Open the published URL in the browser
        #[arg(long)]
        open: bool,
    },
    /// Validate the manifest against the JSON schema
    Validate {
        /// Schema file [default: gif-schema.json, or the built-in schema]
        #[arg(long)]
        schema: Option<PathBuf>,
        /// Manifest file [default: gifs/index.json]
        #[arg(long)]
        index_path: Option<PathBuf>,
    },
    /// Create placeholder files for manifest entries without a GIF
    Placeholders {
        /// Manifest file [default: gifs/index.json]
        #[arg(long)]
        index_path: Option<PathBuf>,
        /// Directory to place the GIF files in [default: gifs]
        #[arg(long)]
        gif_dir: Option<PathBuf>,
        /// Create empty files instead of minimal GIFs
        #[arg(long)]
        touch: bool,
    },
    /// Show configuration and external tool availability
    Doctor,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_publish_takes_exactly_two_positionals() {
        let err = Args::try_parse_from(["gifpub", "publish", "https://x/a.gif"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = Args::try_parse_from(["gifpub", "publish", "u", "a.gif", "extra"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);

        let args = Args::try_parse_from(["gifpub", "publish", "u", "a.gif"]).unwrap();
        assert!(matches!(args.command, Commands::Publish { ref filename, .. } if filename == "a.gif"));
    }

    #[test]
    fn test_tags_require_description() {
        let err = Args::try_parse_from(["gifpub", "publish", "u", "a.gif", "--tag", "x"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let args = Args::try_parse_from([
            "gifpub",
            "publish",
            "u",
            "a.gif",
            "--description",
            "Something happening",
            "--tag",
            "a,b",
            "--tag",
            "c",
        ])
        .unwrap();
        let Commands::Publish { tags, .. } = args.command else {
            panic!("expected publish");
        };
        assert_eq!(tags, vec!["a,b", "c"]);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from(["gifpub", "doctor", "-C", "/srv/gifs", "-v"]).unwrap();
        assert_eq!(args.repo, PathBuf::from("/srv/gifs"));
        assert!(args.verbose);
    }
}
