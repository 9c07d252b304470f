//! The immutable course baseline.
//!
//! A `Catalog` is the seed every learner's progress snapshot is copied
//! from. It exposes read access and deep copies, never mutation: the
//! engine owns mutation, and every snapshot must stay structurally
//! independent of the baseline and of every other snapshot.

use serde::Deserialize;

use crate::model::Module;

/// Immutable baseline structure of modules → lessons → challenges/stages.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    modules: Vec<Module>,
}

/// Errors raised while loading an authored catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog JSON parse error: {0}")]
    Json(String),

    #[error("catalog TOML parse error: {0}")]
    Toml(String),
}

/// Authoring envelope for TOML sources (`[[modules]]` tables).
#[derive(Debug, Deserialize)]
struct CatalogDoc {
    #[serde(default)]
    modules: Vec<Module>,
}

impl Catalog {
    pub fn new(modules: Vec<Module>) -> Self {
        Self { modules }
    }

    /// Parse a catalog from a JSON array of module records — the same
    /// shape the engine persists per learner.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let modules: Vec<Module> =
            serde_json::from_str(raw).map_err(|e| CatalogError::Json(e.to_string()))?;
        Ok(Self::new(modules))
    }

    /// Parse a catalog from an authored TOML document with `[[modules]]`
    /// tables.
    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDoc = toml::from_str(raw).map_err(|e| CatalogError::Toml(e.to_string()))?;
        Ok(Self::new(doc.modules))
    }

    /// All modules in catalog order.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Lookup one module by id.
    pub fn module(&self, id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// A deep, independent copy of the baseline.
    ///
    /// The returned modules share no ownership with the catalog: mutating
    /// a snapshot never affects the baseline or any other snapshot.
    pub fn snapshot(&self) -> Vec<Module> {
        self.modules.clone()
    }
}
