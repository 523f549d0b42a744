use crate::config::range_types::Probability;
use crate::terrain::biomes::BiomeId;
use crate::terrain::constants::*;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Texturing and height parameters of a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TerrainRules {
    #[validate(range(min = 0.0, max = 1024.0))]
    pub noise_scale: f64,
    #[validate(range(min = 0.0))]
    pub height_factor: f32,
    pub offset_m: f32,
    /// Meters spanned by the full [0, 1] sample range
    #[validate(range(min = 0.0))]
    pub height_scale_m: f32,
    #[validate(length(min = 1))]
    pub default_layer: String,
    pub auto_shader: bool,
    /// Priority-ordered, first match wins
    #[validate(nested)]
    pub height_bands: Vec<HeightBand>,
    /// Evaluated in order, first match wins
    #[validate(nested)]
    pub slope_overrides: Vec<SlopeOverride>,
    #[validate(nested)]
    pub biome_overrides: Vec<BiomeOverride>,
    #[validate(nested)]
    pub biome_blend: BiomeBlendSettings,
}

impl Default for TerrainRules {
    fn default() -> Self {
        Self {
            noise_scale: 4.0,
            height_factor: 1.0,
            offset_m: 0.0,
            height_scale_m: 50.0,
            default_layer: "grass".to_string(),
            auto_shader: false,
            height_bands: Vec::new(),
            slope_overrides: Vec::new(),
            biome_overrides: Vec::new(),
            biome_blend: BiomeBlendSettings::default(),
        }
    }
}

impl TerrainRules {
    /// Every layer name the rules can produce, in first-appearance order
    pub fn layer_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let candidates = std::iter::once(self.default_layer.as_str())
            .chain(self.height_bands.iter().map(|b| b.layer.as_str()))
            .chain(self.biome_overrides.iter().map(|b| b.layer.as_str()))
            .chain(self.slope_overrides.iter().map(|s| s.layer.as_str()));
        for name in candidates {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

/// Height band, half-open `[min_m, max_m)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_height_band"))]
pub struct HeightBand {
    pub min_m: f32,
    pub max_m: f32,
    #[validate(length(min = 1))]
    pub layer: String,
}

impl HeightBand {
    pub fn new(min_m: f32, max_m: f32, layer: impl Into<String>) -> Self {
        Self {
            min_m,
            max_m,
            layer: layer.into(),
        }
    }

    pub fn contains(&self, height_m: f32) -> bool {
        height_m >= self.min_m && height_m < self.max_m
    }
}

fn validate_height_band(band: &HeightBand) -> Result<(), ValidationError> {
    if band.min_m >= band.max_m {
        return Err(ValidationError::new("height_band_range").with_message("min_m must be below max_m".into()));
    }
    Ok(())
}

/// Soft transition range for a slope override, half-open `[start_deg, end_deg)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlopeBlend {
    pub start_deg: f32,
    pub end_deg: f32,
}

/// Slope-driven replacement of the base layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_slope_override"))]
pub struct SlopeOverride {
    #[validate(length(min = 1))]
    pub layer: String,
    /// Base layers this override may replace; empty means any
    #[serde(default)]
    pub applies_to: Vec<String>,
    #[serde(default)]
    pub min_deg: f32,
    #[serde(default = "default_max_slope")]
    pub max_deg: f32,
    /// Present for soft overrides; `min_deg`/`max_deg` are then unused
    #[serde(default)]
    pub blend: Option<SlopeBlend>,
}

fn default_max_slope() -> f32 {
    90.0
}

/// How a slope override matches
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlopeCondition {
    /// Full replacement inside `[min, max)`
    Hard { min: f32, max: f32 },
    /// Linear blend inside `[start, end)`, full replacement at or beyond `end`
    Soft { start: f32, end: f32 },
}

impl SlopeOverride {
    pub fn hard(min_deg: f32, max_deg: f32, layer: impl Into<String>) -> Self {
        Self {
            layer: layer.into(),
            applies_to: Vec::new(),
            min_deg,
            max_deg,
            blend: None,
        }
    }

    pub fn soft(start_deg: f32, end_deg: f32, layer: impl Into<String>) -> Self {
        Self {
            layer: layer.into(),
            applies_to: Vec::new(),
            min_deg: 0.0,
            max_deg: default_max_slope(),
            blend: Some(SlopeBlend { start_deg, end_deg }),
        }
    }

    pub fn restricted_to<I, S>(mut self, layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.applies_to = layers.into_iter().map(Into::into).collect();
        self
    }

    pub fn condition(&self) -> SlopeCondition {
        match self.blend {
            Some(SlopeBlend { start_deg, end_deg }) => SlopeCondition::Soft {
                start: start_deg,
                end: end_deg,
            },
            None => SlopeCondition::Hard {
                min: self.min_deg,
                max: self.max_deg,
            },
        }
    }

    /// Whether the override is allowed to replace `base_layer`
    pub fn applies_to_layer(&self, base_layer: &str) -> bool {
        self.applies_to.is_empty() || self.applies_to.iter().any(|l| l == base_layer)
    }
}

fn validate_slope_override(rule: &SlopeOverride) -> Result<(), ValidationError> {
    match rule.condition() {
        SlopeCondition::Hard { min, max } if min >= max => {
            Err(ValidationError::new("slope_range").with_message("min_deg must be below max_deg".into()))
        }
        SlopeCondition::Soft { start, end } if start >= end => Err(
            ValidationError::new("slope_blend_range").with_message("blend start_deg must be below end_deg".into()),
        ),
        _ => Ok(()),
    }
}

/// Biome-specific base layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct BiomeOverride {
    pub biome: BiomeId,
    #[validate(length(min = 1))]
    pub layer: String,
}

impl BiomeOverride {
    pub fn new(biome: BiomeId, layer: impl Into<String>) -> Self {
        Self {
            biome,
            layer: layer.into(),
        }
    }
}

/// Soft texture blending across biome boundaries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct BiomeBlendSettings {
    pub enabled: bool,
    #[validate(range(min = 0.0))]
    pub threshold_m: f32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub jitter: f32,
    pub inlet_probability: Probability,
}

impl Default for BiomeBlendSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_m: DEFAULT_BIOME_BLEND_THRESHOLD_M,
            jitter: DEFAULT_BIOME_BLEND_JITTER,
            inlet_probability: Probability::new(DEFAULT_INLET_PROBABILITY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_band_half_open() {
        let band = HeightBand::new(0.0, 10.0, "sand");
        assert!(band.contains(0.0));
        assert!(band.contains(9.99));
        assert!(!band.contains(10.0));
    }

    #[test]
    fn test_inverted_band_rejected() {
        assert!(HeightBand::new(10.0, 0.0, "sand").validate().is_err());
        assert!(HeightBand::new(0.0, 10.0, "sand").validate().is_ok());
    }

    #[test]
    fn test_slope_condition() {
        assert_eq!(
            SlopeOverride::hard(40.0, 90.0, "rock").condition(),
            SlopeCondition::Hard { min: 40.0, max: 90.0 }
        );
        assert_eq!(
            SlopeOverride::soft(40.0, 50.0, "rock").condition(),
            SlopeCondition::Soft { start: 40.0, end: 50.0 }
        );
        assert!(SlopeOverride::soft(50.0, 40.0, "rock").validate().is_err());
    }

    #[test]
    fn test_applies_to_filter() {
        let any = SlopeOverride::hard(30.0, 90.0, "rock");
        assert!(any.applies_to_layer("grass"));
        let only_grass = any.restricted_to(["grass"]);
        assert!(only_grass.applies_to_layer("grass"));
        assert!(!only_grass.applies_to_layer("sand"));
    }

    #[test]
    fn test_layer_names_deduplicated() {
        let rules = TerrainRules {
            default_layer: "grass".to_string(),
            height_bands: vec![HeightBand::new(0.0, 5.0, "sand"), HeightBand::new(5.0, 50.0, "grass")],
            slope_overrides: vec![SlopeOverride::hard(40.0, 90.0, "rock")],
            biome_overrides: vec![BiomeOverride::new(2, "gravel")],
            ..Default::default()
        };
        assert_eq!(rules.layer_names(), vec!["grass", "sand", "gravel", "rock"]);
    }

    #[test]
    fn test_slope_override_from_toml() {
        let soft: SlopeOverride =
            toml::from_str("layer = \"rock\"\nblend = { start_deg = 40.0, end_deg = 50.0 }").unwrap();
        assert_eq!(soft.condition(), SlopeCondition::Soft { start: 40.0, end: 50.0 });

        let hard: SlopeOverride = toml::from_str("layer = \"cliff\"\nmin_deg = 55.0\napplies_to = [\"rock\"]").unwrap();
        assert_eq!(hard.condition(), SlopeCondition::Hard { min: 55.0, max: 90.0 });
        assert_eq!(hard.applies_to, vec!["rock".to_string()]);
    }
}
