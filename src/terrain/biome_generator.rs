use super::biomes::{BiomeGrid, BiomeId};
use super::constants::*;
use super::coordinates::{Grid, HeightField, TerrainMetrics, slope_field};
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::ValidationError;

/// Axis a corridor layout splits along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitAxis {
    /// Boundary runs along z; regions sit left/right in x
    #[default]
    X,
    /// Boundary runs along x; regions sit below/above in z
    Z,
}

/// Parameters for the height/slope-derived layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightSlopeLayout {
    pub forest_min_height_m: f32,
    pub forest_full_height_m: f32,
    pub max_forest_slope_deg: f32,
    pub height_weight: f32,
    pub slope_weight: f32,
    /// Frequency of the edge perturbation, in cycles across the region
    pub noise_scale: f64,
    pub noise_amplitude: f32,
    pub smoothing_iterations: u32,
    pub low: BiomeId,
    pub high: BiomeId,
}

impl Default for HeightSlopeLayout {
    fn default() -> Self {
        Self {
            forest_min_height_m: 5.0,
            forest_full_height_m: 30.0,
            max_forest_slope_deg: 35.0,
            height_weight: 0.6,
            slope_weight: 0.4,
            noise_scale: 6.0,
            noise_amplitude: 0.15,
            smoothing_iterations: DEFAULT_SMOOTHING_ITERATIONS,
            low: BIOME_FIELD,
            high: BIOME_FOREST,
        }
    }
}

/// Parameters for the two-region-with-corridor layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorridorLayout {
    /// Fraction of the region on the primary side of the boundary
    pub split_ratio: f32,
    pub corridor_width_m: f32,
    pub axis: SplitAxis,
    pub wobble_amplitude_m: f32,
    /// Wobble cycles along the boundary
    pub wobble_frequency: f64,
    pub primary: BiomeId,
    pub secondary: BiomeId,
    pub corridor: BiomeId,
}

impl Default for CorridorLayout {
    fn default() -> Self {
        Self {
            split_ratio: 0.5,
            corridor_width_m: 6.0,
            axis: SplitAxis::X,
            wobble_amplitude_m: 12.0,
            wobble_frequency: 2.0,
            primary: BIOME_FIELD,
            secondary: BIOME_FOREST,
            corridor: BIOME_ROAD,
        }
    }
}

/// Biome layout strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum BiomeLayout {
    Split { left: BiomeId, right: BiomeId },
    HeightSlope(HeightSlopeLayout),
    Corridor(CorridorLayout),
}

impl Default for BiomeLayout {
    fn default() -> Self {
        BiomeLayout::Split {
            left: BIOME_FIELD,
            right: BIOME_FOREST,
        }
    }
}

impl BiomeLayout {
    pub fn name(&self) -> &'static str {
        match self {
            BiomeLayout::Split { .. } => "split",
            BiomeLayout::HeightSlope(_) => "height_slope",
            BiomeLayout::Corridor(_) => "corridor",
        }
    }

    /// Every id this layout can emit
    pub fn biome_ids(&self) -> Vec<BiomeId> {
        match self {
            BiomeLayout::Split { left, right } => vec![*left, *right],
            BiomeLayout::HeightSlope(p) => vec![p.low, p.high],
            BiomeLayout::Corridor(p) => vec![p.primary, p.secondary, p.corridor],
        }
    }

    /// Parameter sanity checks used by rules validation
    pub fn check(&self) -> Result<(), ValidationError> {
        match self {
            BiomeLayout::Split { .. } => Ok(()),
            BiomeLayout::HeightSlope(p) => {
                if p.forest_full_height_m <= p.forest_min_height_m {
                    return Err(ValidationError::new("forest_height_range")
                        .with_message("forest_full_height_m must exceed forest_min_height_m".into()));
                }
                if p.height_weight < 0.0 || p.slope_weight < 0.0 || p.height_weight + p.slope_weight <= 0.0 {
                    return Err(ValidationError::new("score_weights")
                        .with_message("score weights must be non-negative and not both zero".into()));
                }
                if !(0.0..=90.0).contains(&p.max_forest_slope_deg) {
                    return Err(ValidationError::new("max_forest_slope_deg"));
                }
                Ok(())
            }
            BiomeLayout::Corridor(p) => {
                if !(0.0..=1.0).contains(&p.split_ratio) {
                    return Err(ValidationError::new("split_ratio"));
                }
                if p.corridor_width_m < 0.0 || p.wobble_amplitude_m < 0.0 {
                    return Err(ValidationError::new("corridor_dimensions"));
                }
                Ok(())
            }
        }
    }
}

/// Generator for biome classification grids
pub struct BiomeGenerator {
    layout: BiomeLayout,
    seed: u32,
}

impl BiomeGenerator {
    /// Create a new biome generator
    pub fn new(layout: BiomeLayout, seed: u32) -> Self {
        Self { layout, seed }
    }

    /// Classify every cell of the height field
    pub fn generate(&self, heights: &HeightField, metrics: &TerrainMetrics) -> BiomeGrid {
        info!(
            "Generating {}x{} biome map ({} layout)",
            heights.width(),
            heights.depth(),
            self.layout.name()
        );

        match &self.layout {
            BiomeLayout::Split { left, right } => split_layout(heights.width(), heights.depth(), *left, *right),
            BiomeLayout::HeightSlope(params) => self.height_slope_layout(heights, metrics, params),
            BiomeLayout::Corridor(params) => {
                self.corridor_layout(heights.width(), heights.depth(), metrics, params)
            }
        }
    }

    fn height_slope_layout(
        &self,
        heights: &HeightField,
        metrics: &TerrainMetrics,
        params: &HeightSlopeLayout,
    ) -> BiomeGrid {
        let slopes = slope_field(heights, metrics);
        let perlin = Perlin::new(self.seed);
        let weight_sum = params.height_weight + params.slope_weight;
        let height_span = params.forest_full_height_m - params.forest_min_height_m;
        let (width, depth) = (heights.width(), heights.depth());

        let raw = Grid::from_fn(width, depth, |coord| {
            let height_m = metrics.to_meters(heights[coord]);
            let height_score = ((height_m - params.forest_min_height_m) / height_span).clamp(0.0, 1.0);
            let slope_score = if params.max_forest_slope_deg > 0.0 {
                (1.0 - slopes[coord] / params.max_forest_slope_deg).clamp(0.0, 1.0)
            } else {
                0.0
            };

            let nx = coord.x as f64 / width as f64 * params.noise_scale;
            let nz = coord.z as f64 / depth as f64 * params.noise_scale;
            let wobble = perlin.get([nx, nz]) as f32 * params.noise_amplitude;

            let score =
                (params.height_weight * height_score + params.slope_weight * slope_score) / weight_sum + wobble;
            if score > FOREST_SCORE_THRESHOLD { params.high } else { params.low }
        });

        let mut smoothed = raw;
        for _ in 0..params.smoothing_iterations {
            smoothed = majority_smooth(&smoothed);
        }

        // Smoothing may pull steep cells into the forest; the slope limit is absolute
        let mut demoted = 0usize;
        for coord in slopes.coords() {
            if slopes[coord] > params.max_forest_slope_deg && smoothed[coord] == params.high {
                smoothed[coord] = params.low;
                demoted += 1;
            }
        }
        debug!(demoted, "steep cells removed from forest after smoothing");

        smoothed
    }

    fn corridor_layout(
        &self,
        width: u32,
        depth: u32,
        metrics: &TerrainMetrics,
        params: &CorridorLayout,
    ) -> BiomeGrid {
        let perlin = Perlin::new(self.seed);
        let (primary_cells, secondary_cells) = match params.axis {
            SplitAxis::X => (width, depth),
            SplitAxis::Z => (depth, width),
        };
        let half_width_cells = params.corridor_width_m / metrics.meters_per_cell / 2.0;
        let wobble_cells = params.wobble_amplitude_m / metrics.meters_per_cell;
        let base_line = params.split_ratio * primary_cells as f32;

        // Boundary position for each row along the secondary axis
        let boundary: Vec<f32> = (0..secondary_cells)
            .map(|s| {
                let t = s as f64 / secondary_cells as f64 * params.wobble_frequency;
                // Offset off the integer lattice, where Perlin is always zero
                base_line + perlin.get([t + 0.5, 0.5]) as f32 * wobble_cells
            })
            .collect();

        Grid::from_fn(width, depth, |coord| {
            let (along, across) = match params.axis {
                SplitAxis::X => (coord.x, coord.z),
                SplitAxis::Z => (coord.z, coord.x),
            };
            let offset = along as f32 - boundary[across as usize];
            if offset.abs() < half_width_cells {
                params.corridor
            } else if offset < 0.0 {
                params.primary
            } else {
                params.secondary
            }
        })
    }
}

/// Left/right half split by grid column
pub fn split_layout(width: u32, depth: u32, left: BiomeId, right: BiomeId) -> BiomeGrid {
    Grid::from_fn(width, depth, |coord| if coord.x < width / 2 { left } else { right })
}

/// One 3x3 majority-vote pass; ties keep the current value
pub fn majority_smooth(biomes: &BiomeGrid) -> BiomeGrid {
    Grid::from_fn(biomes.width(), biomes.depth(), |coord| {
        let current = biomes[coord];
        let mut counts: Vec<(BiomeId, u32)> = Vec::with_capacity(3);
        for dz in -1..=1 {
            for dx in -1..=1 {
                let Some(n) = biomes.neighbor(coord, dx, dz) else {
                    continue;
                };
                let id = biomes[n];
                match counts.iter_mut().find(|(candidate, _)| *candidate == id) {
                    Some((_, count)) => *count += 1,
                    None => counts.push((id, 1)),
                }
            }
        }

        let current_count = counts
            .iter()
            .find(|(id, _)| *id == current)
            .map_or(0, |(_, c)| *c);
        counts
            .iter()
            .filter(|(_, count)| *count > current_count)
            .max_by_key(|(id, count)| (*count, std::cmp::Reverse(*id)))
            .map_or(current, |(id, _)| *id)
    })
}

/// Whether every cell is a member of `ids`
pub fn covers_only(biomes: &BiomeGrid, ids: &[BiomeId]) -> bool {
    biomes.cells().iter().all(|id| ids.contains(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::biomes::compute_edge_distance;
    use crate::terrain::coordinates::GridCoord;
    use crate::terrain::coordinates::slope_degrees;
    use crate::terrain::noise_generator::NoiseGenerator;

    fn cell_at(biomes: &BiomeGrid, x: u32, z: u32) -> BiomeId {
        biomes[GridCoord::new(x, z)]
    }

    fn flat(width: u32, depth: u32) -> HeightField {
        Grid::filled(width, depth, 0.5)
    }

    #[test]
    fn test_split_layout() {
        let biomes = BiomeGenerator::new(BiomeLayout::default(), 1)
            .generate(&flat(16, 8), &TerrainMetrics::default());
        assert_eq!(biomes[GridCoord::new(7, 3)], BIOME_FIELD);
        assert_eq!(biomes[GridCoord::new(8, 3)], BIOME_FOREST);
        assert!(covers_only(&biomes, &[BIOME_FIELD, BIOME_FOREST]));
    }

    #[test]
    fn test_majority_smoothing_removes_speckle() {
        let mut biomes = Grid::filled(5, 5, BIOME_FIELD);
        biomes[GridCoord::new(2, 2)] = BIOME_FOREST;
        let smoothed = majority_smooth(&biomes);
        assert!(smoothed.cells().iter().all(|&id| id == BIOME_FIELD));
    }

    #[test]
    fn test_majority_smoothing_keeps_large_regions() {
        let biomes = split_layout(12, 12, BIOME_FIELD, BIOME_FOREST);
        assert_eq!(majority_smooth(&biomes), biomes);
    }

    #[test]
    fn test_height_slope_never_forests_steep_cells() {
        let metrics = TerrainMetrics::new(1.0, 120.0, 0.0);
        let heights = NoiseGenerator::new(31337, 8.0, 1.0).generate(128, 128).unwrap();
        let params = HeightSlopeLayout {
            forest_min_height_m: 0.0,
            forest_full_height_m: 40.0,
            max_forest_slope_deg: 20.0,
            ..Default::default()
        };
        let biomes = BiomeGenerator::new(BiomeLayout::HeightSlope(params.clone()), 5)
            .generate(&heights, &metrics);

        assert!(covers_only(&biomes, &[BIOME_FIELD, BIOME_FOREST]));
        for coord in biomes.coords() {
            if biomes[coord] == BIOME_FOREST {
                assert!(slope_degrees(&heights, &metrics, coord) <= params.max_forest_slope_deg);
            }
        }
    }

    #[test]
    fn test_height_slope_forest_on_high_flat_ground() {
        // Flat plateau well above the forest threshold, no noise
        let metrics = TerrainMetrics::new(1.0, 100.0, 0.0);
        let heights = Grid::filled(32, 32, 0.8);
        let params = HeightSlopeLayout {
            noise_amplitude: 0.0,
            ..Default::default()
        };
        let biomes = BiomeGenerator::new(BiomeLayout::HeightSlope(params), 1).generate(&heights, &metrics);
        assert!(biomes.cells().iter().all(|&id| id == BIOME_FOREST));
    }

    #[test]
    fn test_corridor_band_width() {
        let metrics = TerrainMetrics::new(1.0, 1.0, 0.0);
        let params = CorridorLayout {
            wobble_amplitude_m: 0.0,
            corridor_width_m: 6.0,
            ..Default::default()
        };
        let biomes = BiomeGenerator::new(BiomeLayout::Corridor(params), 3).generate(&flat(64, 16), &metrics);

        for z in 0..16 {
            let road: Vec<u32> = (0..64).filter(|&x| cell_at(&biomes, x, z) == BIOME_ROAD).collect();
            // |x - 32| < 3 -> columns 30..=34
            assert_eq!(road, vec![30, 31, 32, 33, 34]);
            assert_eq!(cell_at(&biomes, 0, z), BIOME_FIELD);
            assert_eq!(cell_at(&biomes, 63, z), BIOME_FOREST);
        }
    }

    #[test]
    fn test_corridor_is_deterministic() {
        let metrics = TerrainMetrics::default();
        let layout = BiomeLayout::Corridor(CorridorLayout {
            axis: SplitAxis::Z,
            ..Default::default()
        });
        let a = BiomeGenerator::new(layout.clone(), 77).generate(&flat(128, 128), &metrics);
        let b = BiomeGenerator::new(layout, 77).generate(&flat(128, 128), &metrics);
        assert_eq!(a, b);
        assert!(covers_only(&a, &[BIOME_FIELD, BIOME_FOREST, BIOME_ROAD]));

        // Road must touch both regions somewhere
        let edge = compute_edge_distance(&a, 4, 1.0);
        assert!(a.coords().any(|c| a[c] == BIOME_ROAD && edge[c] <= 1.0));
    }

    /// First road row in each column of a z-axis corridor
    fn road_starts(biomes: &BiomeGrid) -> Vec<u32> {
        (0..biomes.width())
            .map(|x| {
                (0..biomes.depth())
                    .find(|&z| cell_at(biomes, x, z) == BIOME_ROAD)
                    .expect("every column should cross the road")
            })
            .collect()
    }

    #[test]
    fn test_corridor_boundary_follows_wobble_amplitude() {
        let metrics = TerrainMetrics::default();
        let layout = |wobble_amplitude_m| {
            BiomeLayout::Corridor(CorridorLayout {
                axis: SplitAxis::Z,
                wobble_amplitude_m,
                ..Default::default()
            })
        };

        let wobbly = road_starts(&BiomeGenerator::new(layout(12.0), 77).generate(&flat(128, 128), &metrics));
        let mut distinct = wobbly.clone();
        distinct.sort_unstable();
        distinct.dedup();
        assert!(distinct.len() > 1, "road edge never moved: {wobbly:?}");
        // Center line at row 64, 12 cells of wobble, 3-cell half band
        assert!(wobbly.iter().all(|&z| (49..=76).contains(&z)), "road edge out of range: {wobbly:?}");

        let straight = road_starts(&BiomeGenerator::new(layout(0.0), 77).generate(&flat(128, 128), &metrics));
        assert!(straight.iter().all(|&z| z == straight[0]), "straight road bent: {straight:?}");
    }

    #[test]
    fn test_layout_checks() {
        assert!(BiomeLayout::default().check().is_ok());
        let bad = BiomeLayout::Corridor(CorridorLayout {
            split_ratio: 1.5,
            ..Default::default()
        });
        assert!(bad.check().is_err());
        let bad = BiomeLayout::HeightSlope(HeightSlopeLayout {
            forest_full_height_m: 1.0,
            forest_min_height_m: 2.0,
            ..Default::default()
        });
        assert!(bad.check().is_err());
    }
}
