//! Layout Catalog - Static Documents by Id

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::document::{LayoutDocument, LayoutId};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid layout document {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Catalog of layout documents - loads and caches documents
#[derive(Debug, Default)]
pub struct LayoutCatalog {
    documents: HashMap<LayoutId, LayoutDocument>,
}

impl LayoutCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` document in `dir`. Unparseable files are skipped with a warning.
    pub fn load_from_dir(dir: &Path) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        if !dir.exists() {
            log::warn!("Catalog directory {} does not exist", dir.display());
            return Ok(catalog);
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |e| e == "json") {
                match Self::load_file(&path) {
                    Ok(document) => {
                        catalog.register(document);
                    }
                    Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
                }
            }
        }
        log::debug!("Loaded {} layout documents from {}", catalog.len(), dir.display());
        Ok(catalog)
    }

    pub fn load_file(path: &Path) -> Result<LayoutDocument, CatalogError> {
        let content = fs::read_to_string(path)?;
        LayoutDocument::from_json_str(&content).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn get(&self, id: &str) -> Option<&LayoutDocument> {
        self.documents.get(id)
    }

    /// All documents, ordered by id.
    pub fn list(&self) -> Vec<&LayoutDocument> {
        let mut documents: Vec<_> = self.documents.values().collect();
        documents.sort_by(|a, b| a.id.cmp(&b.id));
        documents
    }

    /// Add a document, returning the one it replaced.
    pub fn register(&mut self, document: LayoutDocument) -> Option<LayoutDocument> {
        let previous = self.documents.insert(document.id.clone(), document);
        if let Some(previous) = &previous {
            log::warn!("Duplicate layout id '{}'; later document wins", previous.id);
        }
        previous
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
