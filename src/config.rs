pub mod range_types;

use crate::config::range_types::SearchRadius;
use crate::errors::{RegionError, RegionResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Per-user defaults for the command line generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Where regions, exports and previews are written when `--output` is absent
    pub output_dir: PathBuf,
    /// Used when the rules leave `biomes.edge_search_radius_cells` unset
    pub edge_search_radius: SearchRadius,
    pub write_previews: bool,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("regions"),
            edge_search_radius: SearchRadius::default(),
            write_previews: false,
        }
    }
}

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().and_then(|mut path| {
        path.push("regiongen");
        fs::create_dir_all(&path).ok()?;
        path.push("config.toml");
        Some(path)
    })
}

pub fn load_config() -> GeneratorSettings {
    if let Some(config_path) = get_config_path() {
        if let Ok(contents) = fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<GeneratorSettings>(&contents) {
                return config;
            }
        }
    }
    GeneratorSettings::default()
}

pub fn save_config(config: &GeneratorSettings) -> RegionResult<()> {
    let config_path = get_config_path().ok_or(RegionError::ConfigDirNotFound)?;
    let contents = toml::to_string_pretty(config)?;
    fs::write(config_path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_toml_round_trip() {
        let settings = GeneratorSettings {
            output_dir: PathBuf::from("/tmp/out"),
            edge_search_radius: SearchRadius::new(24),
            write_previews: true,
        };
        let text = toml::to_string_pretty(&settings).unwrap();
        let parsed: GeneratorSettings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_partial_settings_use_defaults() {
        let parsed: GeneratorSettings = toml::from_str("write_previews = true\n").unwrap();
        assert!(parsed.write_previews);
        assert_eq!(parsed.output_dir, PathBuf::from("regions"));
    }
}
