//! Packed texture-control raster.
//!
//! Bit layout per cell (bit 0 is least significant), fixed by the renderer:
//!
//! | bits   | field          |
//! |--------|----------------|
//! | 27..=31 | base slot     |
//! | 22..=26 | overlay slot  |
//! | 14..=21 | blend byte    |
//! | 0       | auto-shader   |

use super::biomes::{BiomeGrid, EdgeDistanceField, nearest_other_biome};
use super::constants::MAX_LAYER_SLOT;
use super::coordinates::{Grid, GridCoord, HeightField, TerrainMetrics, slope_degrees};
use super::rule_engine::{LayerPick, base_layer, pick_layer};
use crate::errors::{RegionError, RegionResult};
use crate::rules::terrain::TerrainRules;
use crate::seed::hash_unit;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

const BASE_SHIFT: u32 = 27;
const OVERLAY_SHIFT: u32 = 22;
const BLEND_SHIFT: u32 = 14;
const SLOT_MASK: u32 = 0x1f;
const BLEND_MASK: u32 = 0xff;
const AUTO_SHADER_BIT: u32 = 1;

const JITTER_CHANNEL: u32 = 0;
const INLET_CHANNEL: u32 = 1;

/// One packed control cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ControlValue(pub u32);

impl ControlValue {
    pub fn pack(base_slot: u8, overlay_slot: u8, blend: u8, auto_shader: bool) -> Self {
        let mut bits = ((base_slot as u32 & SLOT_MASK) << BASE_SHIFT)
            | ((overlay_slot as u32 & SLOT_MASK) << OVERLAY_SHIFT)
            | ((blend as u32 & BLEND_MASK) << BLEND_SHIFT);
        if auto_shader {
            bits |= AUTO_SHADER_BIT;
        }
        Self(bits)
    }

    pub fn base_slot(self) -> u8 {
        ((self.0 >> BASE_SHIFT) & SLOT_MASK) as u8
    }

    pub fn overlay_slot(self) -> u8 {
        ((self.0 >> OVERLAY_SHIFT) & SLOT_MASK) as u8
    }

    pub fn blend(self) -> u8 {
        ((self.0 >> BLEND_SHIFT) & BLEND_MASK) as u8
    }

    pub fn auto_shader(self) -> bool {
        self.0 & AUTO_SHADER_BIT != 0
    }

    /// Same bits as an `f32`, for renderers that import the raster as a float image
    pub fn to_f32_bits(self) -> f32 {
        f32::from_bits(self.0)
    }
}

/// Quantize a [0, 1] blend factor
pub fn blend_to_byte(blend: f32) -> u8 {
    (blend.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub type ControlRaster = Grid<ControlValue>;

/// Layer name to renderer texture slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSlotMap {
    slots: HashMap<String, u8>,
}

impl LayerSlotMap {
    /// Build from caller-supplied slots, rejecting anything outside 0..=31
    pub fn new<I, S>(entries: I) -> RegionResult<Self>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut map = Self::default();
        for (layer, slot) in entries {
            map.assign(layer, slot)?;
        }
        Ok(map)
    }

    /// Set or replace one layer's slot
    pub fn assign(&mut self, layer: impl Into<String>, slot: u32) -> RegionResult<()> {
        let layer = layer.into();
        if slot > MAX_LAYER_SLOT as u32 {
            return Err(RegionError::InvalidLayerSlot { layer, slot });
        }
        self.slots.insert(layer, slot as u8);
        Ok(())
    }

    /// Assign slots in first-appearance order of the rules' layer names
    pub fn from_rules(rules: &TerrainRules) -> Self {
        let names = rules.layer_names();
        if names.len() > MAX_LAYER_SLOT as usize + 1 {
            warn!(
                layers = names.len(),
                "more layers than renderer slots; extra layers fall back to the default slot"
            );
        }
        let slots = names
            .into_iter()
            .take(MAX_LAYER_SLOT as usize + 1)
            .enumerate()
            .map(|(slot, name)| (name.to_string(), slot as u8))
            .collect();
        Self { slots }
    }

    /// Load a `layer = slot` TOML table
    pub fn from_toml_str(contents: &str) -> RegionResult<Self> {
        let table: HashMap<String, u32> = toml::from_str(contents)?;
        Self::new(table)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> RegionResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn get(&self, layer: &str) -> Option<u8> {
        self.slots.get(layer).copied()
    }

    /// Slot for `layer`, else the default layer's slot, else 0
    pub fn resolve(&self, layer: &str, default_layer: &str) -> u8 {
        self.get(layer).or_else(|| self.get(default_layer)).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Turns height, biome and edge grids into a packed control raster
pub struct ControlRasterizer<'a> {
    rules: &'a TerrainRules,
    slots: &'a LayerSlotMap,
    metrics: TerrainMetrics,
    seed: u64,
}

impl<'a> ControlRasterizer<'a> {
    pub fn new(rules: &'a TerrainRules, slots: &'a LayerSlotMap, metrics: TerrainMetrics, seed: u64) -> Self {
        Self {
            rules,
            slots,
            metrics,
            seed,
        }
    }

    pub fn rasterize(
        &self,
        heights: &HeightField,
        biomes: &BiomeGrid,
        edge_distance: &EdgeDistanceField,
    ) -> RegionResult<ControlRaster> {
        heights.ensure_same_dimensions(biomes, "biome grid")?;
        heights.ensure_same_dimensions(edge_distance, "edge distance field")?;

        let mut blended_cells = 0usize;
        let raster = Grid::from_fn(heights.width(), heights.depth(), |coord| {
            let pick = self.pick_cell(heights, biomes, edge_distance, coord);
            if pick.is_blended() {
                blended_cells += 1;
            }
            self.pack(&pick)
        });

        debug!(
            cells = raster.len(),
            blended_cells,
            "rasterized control map"
        );
        Ok(raster)
    }

    /// Layers for one cell, including cross-biome blending
    pub fn pick_cell(
        &self,
        heights: &HeightField,
        biomes: &BiomeGrid,
        edge_distance: &EdgeDistanceField,
        coord: GridCoord,
    ) -> LayerPick<'a> {
        let height_m = self.metrics.to_meters(heights[coord]);
        let slope = slope_degrees(heights, &self.metrics, coord);
        let biome = biomes[coord];
        let pick = pick_layer(height_m, slope, biome, self.rules);

        let settings = &self.rules.biome_blend;
        if !settings.enabled || pick.is_blended() || settings.threshold_m <= 0.0 {
            return pick;
        }
        if edge_distance[coord] >= settings.threshold_m {
            return pick;
        }
        self.blend_across_border(pick, height_m, biomes, coord)
    }

    fn blend_across_border(
        &self,
        pick: LayerPick<'a>,
        height_m: f32,
        biomes: &BiomeGrid,
        coord: GridCoord,
    ) -> LayerPick<'a> {
        let settings = &self.rules.biome_blend;
        let radius_cells = (settings.threshold_m / self.metrics.meters_per_cell).ceil() as u32;
        let Some((other, distance_cells)) = nearest_other_biome(biomes, coord, radius_cells) else {
            return pick;
        };

        let neighbor_layer = base_layer(height_m, biomes[other], self.rules);
        if neighbor_layer == pick.base {
            return pick;
        }

        let distance_m = distance_cells * self.metrics.meters_per_cell;
        let falloff = (1.0 - distance_m / settings.threshold_m).clamp(0.0, 1.0);
        let jitter = (hash_unit(coord.x, coord.z, self.seed, JITTER_CHANNEL) * 2.0 - 1.0) * settings.jitter;
        let blend = (0.5 * falloff + jitter).clamp(0.0, 1.0);
        if blend <= 0.0 {
            return pick;
        }

        let inlet = hash_unit(coord.x, coord.z, self.seed, INLET_CHANNEL) < settings.inlet_probability.get();
        if inlet {
            LayerPick {
                base: neighbor_layer,
                overlay: pick.base,
                blend,
            }
        } else {
            LayerPick {
                base: pick.base,
                overlay: neighbor_layer,
                blend,
            }
        }
    }

    fn pack(&self, pick: &LayerPick<'_>) -> ControlValue {
        let default_layer = self.rules.default_layer.as_str();
        ControlValue::pack(
            self.slots.resolve(pick.base, default_layer),
            self.slots.resolve(pick.overlay, default_layer),
            blend_to_byte(pick.blend),
            self.rules.auto_shader,
        )
    }
}
