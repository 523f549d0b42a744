use crate::config::range_types::{JitterStrength, TiltAngle};
use crate::terrain::biomes::BiomeId;
use crate::terrain::constants::{DEFAULT_TARGET_EDGE_MARGIN_M, SQUARE_METERS_PER_KM2};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Ordered object placement rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SpawningRules {
    /// Minimum spacing for entries that do not set their own
    #[validate(range(min = 0.0))]
    pub default_min_distance_m: f32,
    /// Targets must stay this far inside the region boundary
    #[validate(range(min = 0.0))]
    pub target_edge_margin_m: f32,
    #[validate(nested)]
    pub entries: Vec<SpawnEntry>,
}

impl Default for SpawningRules {
    fn default() -> Self {
        Self {
            default_min_distance_m: 0.0,
            target_edge_margin_m: DEFAULT_TARGET_EDGE_MARGIN_M,
            entries: Vec::new(),
        }
    }
}

impl SpawningRules {
    /// Smallest positive spacing across all entries, used as the spatial hash cell size
    pub fn smallest_min_distance(&self) -> Option<f32> {
        self.entries
            .iter()
            .map(|entry| self.min_distance_for(entry))
            .chain(std::iter::once(self.default_min_distance_m))
            .filter(|d| *d > 0.0)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Spacing an entry enforces
    pub fn min_distance_for(&self, entry: &SpawnEntry) -> f32 {
        entry.min_distance_m.unwrap_or(self.default_min_distance_m)
    }
}

/// One object placement rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_spawn_entry"))]
pub struct SpawnEntry {
    #[validate(length(min = 1))]
    pub asset_id: String,
    /// Capped at 1000 objects per square meter
    #[validate(range(min = 0.0, max = 1.0e9))]
    pub density_per_km2: f64,
    pub min_count: u32,
    pub max_count: Option<u32>,
    pub min_height_m: Option<f32>,
    pub max_height_m: Option<f32>,
    #[validate(range(min = 0.0, max = 90.0))]
    pub max_slope_deg: Option<f32>,
    /// Empty means every biome
    pub allowed_biomes: Vec<BiomeId>,
    #[validate(range(min = 0.0))]
    pub edge_min_m: Option<f32>,
    #[validate(range(min = 0.0))]
    pub edge_max_m: Option<f32>,
    #[validate(range(min = 0.0))]
    pub min_distance_m: Option<f32>,
    pub jitter: JitterStrength,
    pub align_to_slope: bool,
    pub max_tilt_deg: TiltAngle,
    pub is_target: bool,
}

impl Default for SpawnEntry {
    fn default() -> Self {
        Self {
            asset_id: String::new(),
            density_per_km2: 0.0,
            min_count: 0,
            max_count: None,
            min_height_m: None,
            max_height_m: None,
            max_slope_deg: None,
            allowed_biomes: Vec::new(),
            edge_min_m: None,
            edge_max_m: None,
            min_distance_m: None,
            jitter: JitterStrength::default(),
            align_to_slope: false,
            max_tilt_deg: TiltAngle::default(),
            is_target: false,
        }
    }
}

impl SpawnEntry {
    pub fn new(asset_id: impl Into<String>, density_per_km2: f64) -> Self {
        Self {
            asset_id: asset_id.into(),
            density_per_km2,
            ..Default::default()
        }
    }

    /// Requested count for a region of `area_km2`, after min/max clamps
    pub fn target_count(&self, area_km2: f64) -> i64 {
        let mut count = (self.density_per_km2 * area_km2).round() as i64;
        if self.min_count > 0 {
            count = count.max(self.min_count as i64);
        }
        if let Some(max_count) = self.max_count {
            count = count.min(max_count as i64);
        }
        count
    }

    /// Whether biome or edge filters restrict candidate cells
    pub fn has_cell_filters(&self) -> bool {
        !self.allowed_biomes.is_empty() || self.edge_min_m.is_some() || self.edge_max_m.is_some()
    }

    pub fn allows_biome(&self, biome: BiomeId) -> bool {
        self.allowed_biomes.is_empty() || self.allowed_biomes.contains(&biome)
    }

    pub fn allows_edge_distance(&self, distance_m: f32) -> bool {
        self.edge_min_m.is_none_or(|min| distance_m >= min) && self.edge_max_m.is_none_or(|max| distance_m <= max)
    }

    pub fn allows_height(&self, height_m: f32) -> bool {
        self.min_height_m.is_none_or(|min| height_m >= min) && self.max_height_m.is_none_or(|max| height_m <= max)
    }
}

/// Region area in square kilometers
pub fn area_km2(width_m: f32, depth_m: f32) -> f64 {
    width_m as f64 * depth_m as f64 / SQUARE_METERS_PER_KM2
}

fn validate_spawn_entry(entry: &SpawnEntry) -> Result<(), ValidationError> {
    if entry.max_count.is_some_and(|max| max < entry.min_count) {
        return Err(ValidationError::new("count_range").with_message("max_count is below min_count".into()));
    }
    if let (Some(min), Some(max)) = (entry.min_height_m, entry.max_height_m) {
        if min > max {
            return Err(ValidationError::new("height_range"));
        }
    }
    if let (Some(min), Some(max)) = (entry.edge_min_m, entry.edge_max_m) {
        if min > max {
            return Err(ValidationError::new("edge_range"));
        }
    }
    Ok(())
}
