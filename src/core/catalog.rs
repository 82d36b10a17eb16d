//! Article catalog: family -> articles -> technical data
//!
//! Read-only lookup data handed to whatever needs article metadata. The
//! built-in catalog can be replaced by a YAML file named in the config.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Articles of one family and the technical data available per article
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyEntry {
    #[serde(default)]
    pub articles: Vec<String>,

    #[serde(default)]
    pub technical: BTreeMap<String, Vec<String>>,
}

/// Family/article/technical-data catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    families: BTreeMap<String, FamilyEntry>,
}

impl Catalog {
    /// Catalog shipped with the tool
    pub fn builtin() -> Self {
        let mut families = BTreeMap::new();

        fn family(entries: &[(&str, &[&str])]) -> FamilyEntry {
            FamilyEntry {
                articles: entries.iter().map(|(a, _)| a.to_string()).collect(),
                technical: entries
                    .iter()
                    .map(|(a, t)| (a.to_string(), t.iter().map(|s| s.to_string()).collect()))
                    .collect(),
            }
        }

        families.insert(
            "Tôlerie".to_string(),
            family(&[
                ("ART-0001", &["Laser A", "Presse Plieuse A"]),
                ("ART-0002", &["Laser B", "Presse Plieuse B"]),
            ]),
        );
        families.insert(
            "Usinage".to_string(),
            family(&[("ART-1000", &["Centre UGV"]), ("ART-1001", &["Tour CN"])]),
        );
        families.insert(
            "Assemblage".to_string(),
            family(&[("ART-2000", &["Poste Assemblage A"])]),
        );

        Self { families }
    }

    /// Load a catalog from a YAML file
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(|e| CatalogError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_yml::from_str(&contents).map_err(|e| CatalogError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Configured catalog file if any, built-in otherwise
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::builtin()),
        }
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.families.keys().map(String::as_str)
    }

    /// Articles of a family (empty for an unknown family)
    pub fn articles(&self, family: &str) -> &[String] {
        self.families
            .get(family)
            .map(|f| f.articles.as_slice())
            .unwrap_or(&[])
    }

    /// Technical data of an article within a family (empty when unknown)
    pub fn technical(&self, family: &str, article: &str) -> &[String] {
        self.families
            .get(family)
            .and_then(|f| f.technical.get(article))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.families.contains_key(family)
    }

    pub fn has_article(&self, family: &str, article: &str) -> bool {
        self.articles(family).iter().any(|a| a == article)
    }

    pub fn has_technical(&self, family: &str, article: &str, technical: &str) -> bool {
        self.technical(family, article).iter().any(|t| t == technical)
    }

    /// Family that lists the given article, if any
    pub fn family_of(&self, article: &str) -> Option<&str> {
        self.families
            .iter()
            .find(|(_, f)| f.articles.iter().any(|a| a == article))
            .map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

/// Errors loading a catalog file
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog {path}: {message}")]
    Parse { path: PathBuf, message: String },
}
