//! gifpub - publish GIFs to a GitHub Pages asset repository.
//!
//! A GIF is downloaded into a scratch directory, optionally shrunk with
//! `gifsicle` or `ffmpeg`, moved into the asset directory, committed and
//! pushed. The manifest at `gifs/index.json` can be validated against a JSON
//! schema and used to create placeholder files.

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod error;
pub mod state;
pub mod utils;

pub use error::{ManifestError, PublishError};
