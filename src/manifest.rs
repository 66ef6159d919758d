//! Build manifest mapping module ids to the asset files they need.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::ManifestError;

/// Module id → ordered asset paths. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: HashMap<String, Vec<String>>,
}

impl Manifest {
    pub fn new(entries: HashMap<String, Vec<String>>) -> Self {
        Self { entries }
    }

    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a manifest file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ManifestError::Io {
                path: path.display().to_string(),
                source,
            })?;
        let manifest = Self::from_json(&json)?;
        info!(
            name: "manifest.loaded",
            path = %path.display(),
            modules = manifest.len(),
            "Asset manifest loaded"
        );
        Ok(manifest)
    }

    /// Load a manifest file, treating a missing file as an empty manifest.
    pub async fn load_or_empty(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        match tokio::fs::try_exists(path.as_ref()).await {
            Ok(true) => Self::load(path).await,
            _ => Ok(Self::default()),
        }
    }

    pub fn files(&self, id: &str) -> Option<&[String]> {
        self.entries.get(id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
