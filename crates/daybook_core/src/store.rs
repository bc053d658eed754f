//! File-backed blob store.
//!
//! All durable state (pool, daily logs, run-state, diagnostics) is a named
//! text or JSON blob keyed by a relative path under one root directory.
//! Missing blobs read as defaults; writes create parent directories.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Read a text blob, or an empty string if the blob does not exist.
    pub fn read_text(&self, key: &str) -> Result<String> {
        let path = self.resolve(key);
        if !path.exists() {
            return Ok(String::new());
        }
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read blob: {}", path.display()))
    }

    pub fn write_text(&self, key: &str, contents: &str) -> Result<()> {
        let path = self.resolve(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write blob: {}", path.display()))
    }

    /// Read a JSON blob, or the provided default if the blob is missing or
    /// does not parse. A corrupt blob is logged, never fatal.
    pub fn read_json<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let text = match self.read_text(key) {
            Ok(t) if !t.trim().is_empty() => t,
            _ => return default,
        };
        match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Blob {} is not valid JSON ({}), using default", key, e);
                default
            }
        }
    }

    pub fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let text = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize blob: {key}"))?;
        self.write_text(key, &text)
    }

    pub fn exists(&self, key: &str) -> bool {
        self.resolve(key).exists()
    }
}
