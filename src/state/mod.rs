//! Data types shared across the publish pipeline and manifest tooling.

pub mod asset;

pub use asset::{AssetMetadata, ManifestEntry, Optimization, Published};
