use super::biomes::BiomeId;
use crate::rules::terrain::{SlopeCondition, TerrainRules};

/// Resolved texture layers for one cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerPick<'a> {
    pub base: &'a str,
    pub overlay: &'a str,
    /// 0.0 shows only `base`, 1.0 only `overlay`
    pub blend: f32,
}

impl<'a> LayerPick<'a> {
    pub fn solid(layer: &'a str) -> Self {
        Self {
            base: layer,
            overlay: layer,
            blend: 0.0,
        }
    }

    pub fn is_blended(&self) -> bool {
        self.blend > 0.0
    }
}

/// Base layer from height bands and biome overrides, ignoring slope
pub fn base_layer<'a>(height_m: f32, biome: BiomeId, rules: &'a TerrainRules) -> &'a str {
    let mut base = rules
        .height_bands
        .iter()
        .find(|band| band.contains(height_m))
        .map_or(rules.default_layer.as_str(), |band| band.layer.as_str());

    if let Some(biome_override) = rules.biome_overrides.iter().find(|o| o.biome == biome) {
        base = biome_override.layer.as_str();
    }
    base
}

/// Resolve base/overlay layers and blend factor for one cell.
///
/// Slope overrides are scanned in order and the first one that matches,
/// hard or soft, ends the scan.
pub fn pick_layer<'a>(height_m: f32, slope_deg: f32, biome: BiomeId, rules: &'a TerrainRules) -> LayerPick<'a> {
    let base = base_layer(height_m, biome, rules);

    for rule in &rules.slope_overrides {
        if !rule.applies_to_layer(base) {
            continue;
        }
        match rule.condition() {
            SlopeCondition::Hard { min, max } => {
                if slope_deg >= min && slope_deg < max {
                    return LayerPick::solid(&rule.layer);
                }
            }
            SlopeCondition::Soft { start, end } => {
                if slope_deg >= end {
                    return LayerPick::solid(&rule.layer);
                }
                if slope_deg >= start {
                    return LayerPick {
                        base,
                        overlay: &rule.layer,
                        blend: (slope_deg - start) / (end - start),
                    };
                }
            }
        }
    }

    LayerPick::solid(base)
}
