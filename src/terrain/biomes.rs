use super::constants::{BIOME_FIELD, BIOME_FOREST, BIOME_ROAD};
use super::coordinates::{Grid, GridCoord};
use std::collections::BTreeMap;

/// Small integer biome classification
pub type BiomeId = u8;

/// One biome id per cell
pub type BiomeGrid = Grid<BiomeId>;

/// Meters from each cell to the nearest cell with a different biome id
pub type EdgeDistanceField = Grid<f32>;

/// Human-readable name for the built-in biome ids
pub fn biome_name(id: BiomeId) -> &'static str {
    match id {
        BIOME_FIELD => "field",
        BIOME_FOREST => "forest",
        BIOME_ROAD => "road",
        _ => "custom",
    }
}

/// Number of cells per biome id, ordered by id
pub fn biome_histogram(biomes: &BiomeGrid) -> BTreeMap<BiomeId, usize> {
    let mut counts = BTreeMap::new();
    for &id in biomes.cells() {
        *counts.entry(id).or_insert(0) += 1;
    }
    counts
}

/// Brute-force bounded search for the distance to the nearest differing biome.
///
/// Cells with no differing neighbour within `max_radius_cells` get the radius
/// itself, converted to meters.
pub fn compute_edge_distance(
    biomes: &BiomeGrid,
    max_radius_cells: u32,
    meters_per_cell: f32,
) -> EdgeDistanceField {
    let radius = max_radius_cells as i32;
    let radius_sq = (radius as i64) * (radius as i64);

    Grid::from_fn(biomes.width(), biomes.depth(), |coord| {
        let id = biomes[coord];
        let mut best_sq = radius_sq;
        let mut found = false;

        for dz in -radius..=radius {
            let dz_sq = (dz as i64) * (dz as i64);
            if dz_sq > best_sq {
                continue;
            }
            for dx in -radius..=radius {
                let dist_sq = (dx as i64) * (dx as i64) + dz_sq;
                if dist_sq > best_sq || (found && dist_sq >= best_sq) {
                    continue;
                }
                let Some(other) = biomes.neighbor(coord, dx, dz) else {
                    continue;
                };
                if biomes[other] != id {
                    best_sq = dist_sq;
                    found = true;
                }
            }
        }

        if found {
            (best_sq as f32).sqrt() * meters_per_cell
        } else {
            max_radius_cells as f32 * meters_per_cell
        }
    })
}

/// Nearest cell (within `radius_cells`) whose biome differs from `coord`'s
pub fn nearest_other_biome(
    biomes: &BiomeGrid,
    coord: GridCoord,
    radius_cells: u32,
) -> Option<(GridCoord, f32)> {
    let id = *biomes.get(coord)?;
    let radius = radius_cells as i32;
    let mut best: Option<(GridCoord, i64)> = None;

    for dz in -radius..=radius {
        for dx in -radius..=radius {
            let dist_sq = (dx as i64) * (dx as i64) + (dz as i64) * (dz as i64);
            if dist_sq > (radius as i64) * (radius as i64) {
                continue;
            }
            if best.is_some_and(|(_, b)| dist_sq >= b) {
                continue;
            }
            let Some(other) = biomes.neighbor(coord, dx, dz) else {
                continue;
            };
            if biomes[other] != id {
                best = Some((other, dist_sq));
            }
        }
    }

    best.map(|(other, dist_sq)| (other, (dist_sq as f32).sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn split_grid(width: u32, depth: u32) -> BiomeGrid {
        Grid::from_fn(width, depth, |c| if c.x < width / 2 { BIOME_FIELD } else { BIOME_FOREST })
    }

    #[test]
    fn test_edge_distance_across_split() {
        let biomes = split_grid(16, 4);
        let edge = compute_edge_distance(&biomes, 6, 1.0);

        // Cells either side of the boundary column are one cell from a differing cell
        assert_relative_eq!(edge[GridCoord::new(7, 2)], 1.0);
        assert_relative_eq!(edge[GridCoord::new(8, 2)], 1.0);
        assert_relative_eq!(edge[GridCoord::new(5, 2)], 3.0);
        // Beyond the search radius the radius itself is reported
        assert_relative_eq!(edge[GridCoord::new(0, 2)], 6.0);
    }

    #[test]
    fn test_edge_distance_in_meters() {
        let biomes = split_grid(16, 4);
        let edge = compute_edge_distance(&biomes, 4, 2.5);
        assert_relative_eq!(edge[GridCoord::new(6, 0)], 5.0);
        assert_relative_eq!(edge[GridCoord::new(0, 0)], 10.0);
    }

    #[test]
    fn test_uniform_grid_is_far_from_edges() {
        let biomes = Grid::filled(8, 8, BIOME_ROAD);
        let edge = compute_edge_distance(&biomes, 3, 1.0);
        assert!(edge.cells().iter().all(|&d| d == 3.0));
    }

    #[test]
    fn test_diagonal_distance() {
        let mut biomes = Grid::filled(9, 9, BIOME_FIELD);
        biomes[GridCoord::new(6, 6)] = BIOME_ROAD;
        let edge = compute_edge_distance(&biomes, 5, 1.0);
        assert_relative_eq!(edge[GridCoord::new(4, 4)], 8.0f32.sqrt());
    }

    #[test]
    fn test_nearest_other_biome() {
        let biomes = split_grid(16, 4);
        let (other, dist) = nearest_other_biome(&biomes, GridCoord::new(6, 1), 3).unwrap();
        assert_eq!(other, GridCoord::new(8, 1));
        assert_relative_eq!(dist, 2.0);
        assert!(nearest_other_biome(&biomes, GridCoord::new(0, 1), 3).is_none());
    }

    #[test]
    fn test_histogram() {
        let biomes = split_grid(10, 2);
        let counts = biome_histogram(&biomes);
        assert_eq!(counts.get(&BIOME_FIELD), Some(&10));
        assert_eq!(counts.get(&BIOME_FOREST), Some(&10));
        assert_eq!(biome_name(BIOME_ROAD), "road");
    }
}
