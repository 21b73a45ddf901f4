//! The JSON manifest at `gifs/index.json` and its schema.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use jsonschema::JSONSchema;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ManifestError;
use crate::state::ManifestEntry;

/// Schema used when the repository has no `gif-schema.json`.
#[must_use]
pub fn builtin_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "GIF manifest",
        "type": "array",
        "items": {
            "type": "object",
            "required": ["filename", "description", "tags"],
            "additionalProperties": false,
            "properties": {
                "filename": {
                    "type": "string",
                    "pattern": "^[a-z0-9][a-z0-9_\\-]*\\.gif$"
                },
                "description": {
                    "type": "string",
                    "minLength": 10,
                    "maxLength": 200
                },
                "tags": {
                    "type": "array",
                    "minItems": 1,
                    "uniqueItems": true,
                    "items": {
                        "type": "string",
                        "minLength": 1,
                        "pattern": "^[^A-Z]+$"
                    }
                }
            }
        }
    })
}

/// Read and parse a JSON file.
///
/// # Errors
///
/// [`ManifestError::NotFound`] if the file is missing, [`ManifestError::Json`]
/// if it does not parse.
pub fn read_json(path: &Path) -> Result<Value, ManifestError> {
    if !path.is_file() {
        return Err(ManifestError::NotFound(path.to_path_buf()));
    }
    debug!(path = %path.display(), "loading JSON");
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ManifestError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// The repository schema if present, otherwise [`builtin_schema`].
///
/// # Errors
///
/// Fails only when the schema file exists but cannot be read or parsed.
pub fn load_schema(path: &Path) -> Result<Value, ManifestError> {
    if path.is_file() {
        read_json(path)
    } else {
        debug!(path = %path.display(), "no schema file; using built-in schema");
        Ok(builtin_schema())
    }
}

/// Validate a manifest document against `schema`, then check that
/// filenames are unique.
///
/// # Errors
///
/// [`ManifestError::Schema`] if the schema does not compile,
/// [`ManifestError::Invalid`] listing every violation otherwise.
pub fn validate_value(schema: &Value, instance: &Value) -> Result<(), ManifestError> {
    let compiled =
        JSONSchema::compile(schema).map_err(|e| ManifestError::Schema(e.to_string()))?;

    let mut problems: Vec<String> = match compiled.validate(instance) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .map(|e| {
                let path = e.instance_path.to_string();
                let path = if path.is_empty() { "(root)".to_string() } else { path };
                format!("{path}: {e}")
            })
            .collect(),
    };

    if let Some(items) = instance.as_array() {
        let mut seen = HashSet::new();
        for (i, name) in items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| item.get("filename").and_then(Value::as_str).map(|n| (i, n)))
        {
            if !seen.insert(name.to_lowercase()) {
                problems.push(format!("/{i}/filename: duplicate filename \"{name}\""));
            }
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ManifestError::Invalid(problems))
    }
}

/// Validate the manifest file at `manifest_path`; returns its entry count.
///
/// # Errors
///
/// See [`read_json`], [`load_schema`] and [`validate_value`].
pub fn validate_file(schema_path: &Path, manifest_path: &Path) -> Result<usize, ManifestError> {
    let schema = load_schema(schema_path)?;
    let manifest = read_json(manifest_path)?;
    validate_value(&schema, &manifest)?;
    Ok(manifest.as_array().map_or(0, Vec::len))
}

/// Validate a single entry as if it were the only one in the manifest.
///
/// # Errors
///
/// Same as [`validate_value`].
pub fn validate_entry(schema: &Value, entry: &ManifestEntry) -> Result<(), ManifestError> {
    let instance = json!([entry]);
    validate_value(schema, &instance)
}

/// The manifest as a list of typed entries.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Load `path`, treating a missing file as an empty manifest. Nothing
    /// is written until [`Manifest::save`].
    ///
    /// # Errors
    ///
    /// Fails if the file exists but is not an array of entries.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let entries = if path.is_file() {
            let value = read_json(path)?;
            if !value.is_array() {
                return Err(ManifestError::NotAnArray(path.to_path_buf()));
            }
            serde_json::from_value(value).map_err(|source| ManifestError::Json {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            Vec::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    #[must_use]
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Case-insensitive filename lookup.
    #[must_use]
    pub fn contains(&self, filename: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.filename.eq_ignore_ascii_case(filename))
    }

    /// Add `entry` and keep the list sorted by lowercase filename.
    /// Returns `false` without changing anything if the filename exists.
    pub fn insert(&mut self, entry: ManifestEntry) -> bool {
        if self.contains(&entry.filename) {
            return false;
        }
        self.entries.push(entry);
        self.entries.sort_by_key(|e| e.filename.to_lowercase());
        true
    }

    /// Write the manifest as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// [`ManifestError::Io`] if the file cannot be written.
    pub fn save(&self) -> Result<(), ManifestError> {
        let io_err = |source| ManifestError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut body = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            ManifestError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        body.push('\n');
        std::fs::write(&self.path, body).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(filename: &str) -> ManifestEntry {
        ManifestEntry {
            filename: filename.to_string(),
            description: "A perfectly fine description".to_string(),
            tags: vec!["reaction".to_string()],
        }
    }

    #[test]
    fn test_repo_schema_matches_builtin() {
        let repo: Value = serde_json::from_str(include_str!("../../gif-schema.json")).unwrap();
        assert_eq!(repo, builtin_schema());
    }

    #[test]
    fn test_builtin_schema_accepts_valid_manifest() {
        let manifest = json!([
            {"filename": "mac_patdown.gif", "description": "Mac's ocular pat-down", "tags": ["mac", "patdown"]},
            {"filename": "wildcard.gif", "description": "Charlie yelling wildcard", "tags": ["charlie"]}
        ]);
        validate_value(&builtin_schema(), &manifest).unwrap();
    }

    #[test]
    fn test_builtin_schema_reports_each_problem() {
        let manifest = json!([
            {"filename": "Bad Name.gif", "description": "short", "tags": []},
            {"filename": "ok.gif", "description": "Long enough description", "tags": ["Upper"]}
        ]);
        let Err(ManifestError::Invalid(problems)) = validate_value(&builtin_schema(), &manifest)
        else {
            panic!("expected validation errors");
        };
        assert!(problems.iter().any(|p| p.starts_with("/0/filename")));
        assert!(problems.iter().any(|p| p.starts_with("/0/description")));
        assert!(problems.iter().any(|p| p.starts_with("/0/tags")));
        assert!(problems.iter().any(|p| p.starts_with("/1/tags/0")));
    }

    #[test]
    fn test_duplicate_filenames_rejected() {
        let manifest = json!([
            {"filename": "same.gif", "description": "First description here", "tags": ["a"]},
            {"filename": "same.gif", "description": "Second description here", "tags": ["b"]}
        ]);
        let Err(ManifestError::Invalid(problems)) = validate_value(&builtin_schema(), &manifest)
        else {
            panic!("expected duplicate error");
        };
        assert_eq!(problems, vec!["/1/filename: duplicate filename \"same.gif\"".to_string()]);
    }

    #[test]
    fn test_root_must_be_array() {
        let Err(ManifestError::Invalid(problems)) =
            validate_value(&builtin_schema(), &json!({"filename": "x.gif"}))
        else {
            panic!("expected type error");
        };
        assert!(problems[0].starts_with("(root)"));
    }

    #[test]
    fn test_validate_entry() {
        validate_entry(&builtin_schema(), &entry("fine.gif")).unwrap();

        let mut bad = entry("fine.gif");
        bad.description = "tiny".to_string();
        assert!(matches!(
            validate_entry(&builtin_schema(), &bad),
            Err(ManifestError::Invalid(_))
        ));
    }

    #[test]
    fn test_validate_file_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate_file(&dir.path().join("gif-schema.json"), &dir.path().join("index.json"))
            .unwrap_err();
        assert!(matches!(err, ManifestError::NotFound(_)));
    }

    #[test]
    fn test_validate_file_uses_repo_schema() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("gif-schema.json");
        let index = dir.path().join("index.json");
        std::fs::write(&schema, r#"{"type": "array", "maxItems": 1}"#).unwrap();
        std::fs::write(&index, r#"[{"filename": "a.gif"}]"#).unwrap();
        assert_eq!(validate_file(&schema, &index).unwrap(), 1);

        std::fs::write(&index, r#"[{"filename": "a.gif"}, {"filename": "b.gif"}]"#).unwrap();
        assert!(matches!(
            validate_file(&schema, &index),
            Err(ManifestError::Invalid(_))
        ));
    }

    #[test]
    fn test_invalid_json_reported() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("index.json");
        std::fs::write(&index, "[{").unwrap();
        assert!(matches!(read_json(&index), Err(ManifestError::Json { .. })));
    }

    #[test]
    fn test_insert_keeps_sorted_and_unique() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gifs").join("index.json");
        let mut manifest = Manifest::load(&path).unwrap();
        assert!(manifest.entries().is_empty());
        assert!(!path.exists());

        assert!(manifest.insert(entry("wildcard.gif")));
        assert!(manifest.insert(entry("bird_law.gif")));
        assert!(!manifest.insert(entry("Bird_Law.gif")));
        manifest.save().unwrap();

        let reloaded = Manifest::load(&path).unwrap();
        let names: Vec<_> = reloaded.entries().iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(names, vec!["bird_law.gif", "wildcard.gif"]);
        assert!(std::fs::read_to_string(&path).unwrap().ends_with("]\n"));
    }

    #[test]
    fn test_load_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(matches!(Manifest::load(&path), Err(ManifestError::NotAnArray(_))));
    }
}
