//! Declarative region rules: terrain texturing, biome layout, object spawning
//! and pass-through weather settings. Pure data; loading and validation live
//! here, behavior lives in `terrain` and `spawning`.

pub mod spawning;
pub mod terrain;

use crate::config::range_types::SearchRadius;
use crate::errors::{RegionError, RegionResult};
use crate::terrain::biome_generator::BiomeLayout;
use crate::terrain::constants::{MAX_REGION_SIZE, MIN_REGION_SIZE};
use crate::terrain::coordinates::TerrainMetrics;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::{Validate, ValidationError, ValidationErrors};

pub use spawning::{SpawnEntry, SpawningRules, area_km2};
pub use terrain::{BiomeBlendSettings, BiomeOverride, HeightBand, SlopeBlend, SlopeCondition, SlopeOverride, TerrainRules};

/// Complete rules document for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RegionRules {
    #[serde(default)]
    #[validate(nested)]
    pub region: RegionSettings,
    #[serde(default)]
    #[validate(nested)]
    pub terrain: TerrainRules,
    #[serde(default)]
    #[validate(nested)]
    pub biomes: BiomeRules,
    #[serde(default)]
    #[validate(nested)]
    pub spawning: SpawningRules,
    /// Ambient settings consumed outside the core, kept verbatim
    #[serde(default)]
    pub weather: toml::Table,
}

/// Grid size and horizontal scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_region_settings"))]
pub struct RegionSettings {
    /// Cells per side, power of two
    pub size: u32,
    pub meters_per_cell: f32,
}

impl Default for RegionSettings {
    fn default() -> Self {
        Self {
            size: 256,
            meters_per_cell: 1.0,
        }
    }
}

impl RegionSettings {
    /// Side length in meters
    pub fn extent_m(&self) -> f32 {
        self.size as f32 * self.meters_per_cell
    }
}

fn validate_region_settings(settings: &RegionSettings) -> Result<(), ValidationError> {
    if !settings.size.is_power_of_two() || !(MIN_REGION_SIZE..=MAX_REGION_SIZE).contains(&settings.size) {
        return Err(ValidationError::new("region_size").with_message(
            format!("size must be a power of two in {MIN_REGION_SIZE}..={MAX_REGION_SIZE}").into(),
        ));
    }
    if !(settings.meters_per_cell > 0.0) {
        return Err(ValidationError::new("meters_per_cell").with_message("meters_per_cell must be positive".into()));
    }
    Ok(())
}

/// Biome layout and edge-distance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_biome_rules"))]
pub struct BiomeRules {
    /// Unset falls back to the user's configured radius, then the built-in default
    pub edge_search_radius_cells: Option<SearchRadius>,
    pub layout: BiomeLayout,
}

impl Default for BiomeRules {
    fn default() -> Self {
        Self {
            edge_search_radius_cells: None,
            layout: BiomeLayout::default(),
        }
    }
}

impl BiomeRules {
    pub fn edge_search_radius(&self) -> u32 {
        self.edge_search_radius_cells.unwrap_or_default().get()
    }
}

fn validate_biome_rules(rules: &BiomeRules) -> Result<(), ValidationError> {
    rules.layout.check()
}

impl RegionRules {
    /// Parse and validate a rules document
    pub fn from_toml_str(contents: &str) -> RegionResult<Self> {
        let rules: RegionRules = toml::from_str(contents)?;
        rules.validate().map_err(validation_failure)?;
        Ok(rules)
    }

    /// Load and validate a rules document from disk
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> RegionResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RegionError::RulesFileNotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> RegionResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Scale factors for this region's grids
    pub fn metrics(&self) -> TerrainMetrics {
        TerrainMetrics::new(
            self.region.meters_per_cell,
            self.terrain.height_scale_m,
            self.terrain.offset_m,
        )
    }

    pub fn area_km2(&self) -> f64 {
        let extent = self.region.extent_m();
        area_km2(extent, extent)
    }
}

impl Default for RegionRules {
    fn default() -> Self {
        Self {
            region: RegionSettings::default(),
            terrain: TerrainRules::default(),
            biomes: BiomeRules::default(),
            spawning: SpawningRules::default(),
            weather: toml::Table::new(),
        }
    }
}

fn validation_failure(errors: ValidationErrors) -> RegionError {
    RegionError::RulesValidationFailed {
        reason: errors.to_string(),
    }
}
