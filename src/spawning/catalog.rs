use crate::errors::RegionResult;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Reference to something the scene assembler can instantiate
pub type PrefabRef = String;

/// Maps asset ids to prefab references
pub trait PrefabResolver {
    fn resolve(&self, asset_id: &str) -> Option<PrefabRef>;
}

impl PrefabResolver for HashMap<String, String> {
    fn resolve(&self, asset_id: &str) -> Option<PrefabRef> {
        self.get(asset_id).cloned()
    }
}

/// Asset catalog loaded from a TOML file:
///
/// ```toml
/// passthrough = false
///
/// [prefabs]
/// target = "props/target_board"
/// ```
///
/// With `passthrough`, ids missing from `prefabs` resolve to themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetCatalog {
    pub passthrough: bool,
    pub prefabs: BTreeMap<String, PrefabRef>,
}

impl AssetCatalog {
    /// Catalog that resolves every asset id to itself
    pub fn identity() -> Self {
        Self {
            passthrough: true,
            prefabs: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, asset_id: impl Into<String>, prefab: impl Into<PrefabRef>) {
        self.prefabs.insert(asset_id.into(), prefab.into());
    }

    pub fn from_toml_str(contents: &str) -> RegionResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> RegionResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

impl PrefabResolver for AssetCatalog {
    fn resolve(&self, asset_id: &str) -> Option<PrefabRef> {
        match self.prefabs.get(asset_id) {
            Some(prefab) => Some(prefab.clone()),
            None if self.passthrough => Some(asset_id.to_string()),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_map_resolver() {
        let mut prefabs = HashMap::new();
        prefabs.insert("tree".to_string(), "props/oak".to_string());
        assert_eq!(prefabs.resolve("tree").as_deref(), Some("props/oak"));
        assert_eq!(prefabs.resolve("rock"), None);
    }

    #[test]
    fn test_catalog_passthrough() {
        let mut catalog = AssetCatalog::identity();
        catalog.insert("tree", "props/oak");
        assert_eq!(catalog.resolve("tree").as_deref(), Some("props/oak"));
        assert_eq!(catalog.resolve("rock").as_deref(), Some("rock"));
    }

    #[test]
    fn test_catalog_from_toml() {
        let catalog = AssetCatalog::from_toml_str("[prefabs]\ntarget = \"props/board\"\n")
            .expect("catalog should parse");
        assert!(!catalog.passthrough);
        assert_eq!(catalog.resolve("target").as_deref(), Some("props/board"));
        assert_eq!(catalog.resolve("tree"), None);
    }
}
