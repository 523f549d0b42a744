//! Turns density rules into discrete object placements on generated grids.

pub mod catalog;
pub mod placement;
pub mod spatial_hash;

pub use catalog::{AssetCatalog, PrefabRef, PrefabResolver};
pub use placement::{PlacedObject, orientation, tilt_degrees};
pub use spatial_hash::SpatialHash;

use crate::errors::RegionResult;
use crate::rules::spawning::{SpawnEntry, SpawningRules, area_km2};
use crate::terrain::biomes::{BiomeGrid, EdgeDistanceField};
use crate::terrain::constants::{
    FALLBACK_ATTEMPTS_PER_OBJECT, MAIN_PASS_ATTEMPTS_PER_OBJECT, MAX_CANDIDATE_REDRAWS, SPARSE_CANDIDATE_FRACTION,
};
use crate::terrain::coordinates::{
    GridCoord, HeightField, TerrainMetrics, WorldCoord, height_at_world, slope_degrees, surface_normal,
};
use bevy::math::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tracing::{debug, info, warn};

/// Read-only view of the grids objects are placed on
#[derive(Debug, Clone, Copy)]
pub struct SpawnSurface<'a> {
    heights: &'a HeightField,
    biomes: &'a BiomeGrid,
    edge_distance: &'a EdgeDistanceField,
    metrics: TerrainMetrics,
}

impl<'a> SpawnSurface<'a> {
    /// Fails when the three grids disagree on dimensions
    pub fn new(
        heights: &'a HeightField,
        biomes: &'a BiomeGrid,
        edge_distance: &'a EdgeDistanceField,
        metrics: TerrainMetrics,
    ) -> RegionResult<Self> {
        heights.ensure_same_dimensions(biomes, "biome grid")?;
        heights.ensure_same_dimensions(edge_distance, "edge distance field")?;
        Ok(Self {
            heights,
            biomes,
            edge_distance,
            metrics,
        })
    }

    pub fn width(&self) -> u32 {
        self.heights.width()
    }

    pub fn depth(&self) -> u32 {
        self.heights.depth()
    }

    /// Region extent in meters along x and z
    pub fn extent_m(&self) -> (f32, f32) {
        (
            self.width() as f32 * self.metrics.meters_per_cell,
            self.depth() as f32 * self.metrics.meters_per_cell,
        )
    }

    pub fn area_km2(&self) -> f64 {
        let (width_m, depth_m) = self.extent_m();
        area_km2(width_m, depth_m)
    }

    fn passes_cell_filters(&self, entry: &SpawnEntry, cell: GridCoord) -> bool {
        entry.allows_biome(self.biomes[cell]) && entry.allows_edge_distance(self.edge_distance[cell])
    }

    /// Chooses how candidate cells are drawn for an entry
    fn candidates(&self, entry: &SpawnEntry) -> Candidates {
        let (width, depth) = (self.width(), self.depth());
        if !entry.has_cell_filters() {
            return Candidates::Everywhere { width, depth };
        }
        let passing = self
            .heights
            .coords()
            .filter(|cell| self.passes_cell_filters(entry, *cell))
            .count();
        let total = width as usize * depth as usize;
        if passing > 0 && passing.saturating_mul(SPARSE_CANDIDATE_FRACTION) > total {
            return Candidates::Redraw { width, depth };
        }
        let indices = self
            .heights
            .coords()
            .filter(|cell| self.passes_cell_filters(entry, *cell))
            .map(|cell| cell.z * width + cell.x)
            .collect();
        Candidates::Indexed { width, indices }
    }

    fn is_inside_margin(&self, position: WorldCoord, margin_m: f32) -> bool {
        let (width_m, depth_m) = self.extent_m();
        position.x >= margin_m
            && position.z >= margin_m
            && position.x <= width_m - margin_m
            && position.z <= depth_m - margin_m
    }
}

/// Where a candidate cell is drawn from for one entry
#[derive(Debug)]
enum Candidates {
    Everywhere { width: u32, depth: u32 },
    /// Most cells pass the filters; draw anywhere and redraw misses
    Redraw { width: u32, depth: u32 },
    /// Row-major indices of the passing cells
    Indexed { width: u32, indices: Vec<u32> },
}

impl Candidates {
    fn is_empty(&self) -> bool {
        match self {
            Candidates::Everywhere { width, depth } | Candidates::Redraw { width, depth } => {
                *width == 0 || *depth == 0
            }
            Candidates::Indexed { indices, .. } => indices.is_empty(),
        }
    }

    /// `None` when every redraw missed the filters
    fn pick(&self, rng: &mut Pcg64, surface: &SpawnSurface<'_>, entry: &SpawnEntry) -> Option<GridCoord> {
        match self {
            Candidates::Everywhere { width, depth } => {
                Some(GridCoord::new(rng.gen_range(0..*width), rng.gen_range(0..*depth)))
            }
            Candidates::Redraw { width, depth } => (0..MAX_CANDIDATE_REDRAWS)
                .map(|_| GridCoord::new(rng.gen_range(0..*width), rng.gen_range(0..*depth)))
                .find(|cell| surface.passes_cell_filters(entry, *cell)),
            Candidates::Indexed { width, indices } => {
                let index = indices[rng.gen_range(0..indices.len())];
                Some(GridCoord::new(index % width, index / width))
            }
        }
    }
}

/// Attempts allowed for `count` objects, saturating instead of overflowing
fn attempt_budget(count: usize, attempts_per_object: usize) -> usize {
    count.saturating_mul(attempts_per_object)
}

/// Per-call placement state. The spatial hash lives exactly as long as one `spawn` call.
struct PlacementState {
    rng: Pcg64,
    spacing: SpatialHash,
    placed: Vec<PlacedObject>,
}

/// Places objects described by spawning rules
pub struct ObjectSpawner<'a> {
    rules: &'a SpawningRules,
    seed: u64,
}

impl<'a> ObjectSpawner<'a> {
    pub fn new(rules: &'a SpawningRules, seed: u64) -> Self {
        Self { rules, seed }
    }

    /// Entry indices with every target first, each group in document order
    pub fn processing_order(&self) -> Vec<usize> {
        let (targets, others): (Vec<usize>, Vec<usize>) =
            (0..self.rules.entries.len()).partition(|&i| self.rules.entries[i].is_target);
        targets.into_iter().chain(others).collect()
    }

    pub fn spawn(&self, surface: &SpawnSurface<'_>, resolver: &dyn PrefabResolver) -> Vec<PlacedObject> {
        let cell_size = self.rules.smallest_min_distance().unwrap_or(surface.metrics.meters_per_cell);
        let mut state = PlacementState {
            rng: Pcg64::seed_from_u64(self.seed),
            spacing: SpatialHash::new(cell_size),
            placed: Vec::new(),
        };
        let area = surface.area_km2();

        for index in self.processing_order() {
            let entry = &self.rules.entries[index];
            let requested = entry.target_count(area);
            if requested <= 0 {
                debug!(asset = %entry.asset_id, "no objects requested, skipping entry");
                continue;
            }
            let Some(prefab) = resolver.resolve(&entry.asset_id) else {
                warn!(asset = %entry.asset_id, "asset has no prefab, skipping entry");
                continue;
            };

            let requested_count = usize::try_from(requested).unwrap_or(usize::MAX);
            let placed = self.place_entry(surface, index, entry, &prefab, requested_count, &mut state);
            info!(
                asset = %entry.asset_id,
                target = entry.is_target,
                requested,
                placed,
                "spawned entry"
            );
        }

        state.placed
    }

    fn place_entry(
        &self,
        surface: &SpawnSurface<'_>,
        index: usize,
        entry: &SpawnEntry,
        prefab: &str,
        requested: usize,
        state: &mut PlacementState,
    ) -> usize {
        let candidates = surface.candidates(entry);
        if candidates.is_empty() {
            warn!(asset = %entry.asset_id, "no cell satisfies the biome and edge filters");
            return 0;
        }

        let mut accepted = 0;
        for _ in 0..attempt_budget(requested, MAIN_PASS_ATTEMPTS_PER_OBJECT) {
            if accepted >= requested {
                break;
            }
            if self.try_place(surface, index, entry, prefab, &candidates, true, state) {
                accepted += 1;
            }
        }

        let min_count = entry.min_count as usize;
        if accepted < min_count {
            let missing = min_count - accepted;
            debug!(asset = %entry.asset_id, missing, "running fallback pass");
            // Decoration may crowd to reach its minimum; targets keep their spacing
            let enforce_spacing = entry.is_target;
            for _ in 0..attempt_budget(missing, FALLBACK_ATTEMPTS_PER_OBJECT) {
                if accepted >= min_count {
                    break;
                }
                if self.try_place(surface, index, entry, prefab, &candidates, enforce_spacing, state) {
                    accepted += 1;
                }
            }
            if accepted < min_count {
                warn!(asset = %entry.asset_id, accepted, min_count, "minimum count not reached");
            }
        }
        accepted
    }

    /// One placement attempt; filters run in a fixed order
    #[allow(clippy::too_many_arguments)]
    fn try_place(
        &self,
        surface: &SpawnSurface<'_>,
        index: usize,
        entry: &SpawnEntry,
        prefab: &str,
        candidates: &Candidates,
        enforce_spacing: bool,
        state: &mut PlacementState,
    ) -> bool {
        let metrics = &surface.metrics;
        let Some(cell) = candidates.pick(&mut state.rng, surface, entry) else {
            return false;
        };
        let spread = metrics.meters_per_cell * entry.jitter.get();
        let origin = cell.to_world(metrics);
        let position = WorldCoord::new(
            origin.x + state.rng.gen_range(-0.5..0.5) * spread,
            origin.z + state.rng.gen_range(-0.5..0.5) * spread,
        );

        let Some(height_m) = height_at_world(surface.heights, metrics, position) else {
            return false;
        };
        if !entry.allows_height(height_m) {
            return false;
        }
        let Some(nearest) = position.nearest_cell(metrics, surface.width(), surface.depth()) else {
            return false;
        };
        if entry
            .max_slope_deg
            .is_some_and(|max| slope_degrees(surface.heights, metrics, nearest) > max)
        {
            return false;
        }
        if entry.has_cell_filters() && !surface.passes_cell_filters(entry, nearest) {
            return false;
        }

        let ground = Vec2::new(position.x, position.z);
        let min_distance = self.rules.min_distance_for(entry);
        if enforce_spacing && state.spacing.any_within(ground, min_distance) {
            return false;
        }
        if entry.is_target && !surface.is_inside_margin(position, self.rules.target_edge_margin_m) {
            return false;
        }

        let yaw_deg = state.rng.gen_range(0.0..360.0);
        let normal = surface_normal(surface.heights, metrics, nearest);
        state.spacing.insert(ground);
        state.placed.push(PlacedObject {
            entry_index: index,
            asset_id: entry.asset_id.clone(),
            prefab: prefab.to_string(),
            position: Vec3::new(position.x, height_m, position.z),
            rotation: orientation(normal, yaw_deg, entry.align_to_slope, entry.max_tilt_deg.get()),
            yaw_deg,
            is_target: entry.is_target,
        });
        true
    }
}
