//! Publish pipeline and manifest tooling.

pub mod downloader;
pub mod git;
pub mod manifest;
pub mod optimizer;
pub mod placeholders;
pub mod publisher;
