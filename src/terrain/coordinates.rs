use crate::errors::{RegionError, RegionResult};
use bevy::math::Vec3;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Grid coordinates (unsigned integers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: u32,
    pub z: u32,
}

/// World coordinates in meters on the ground plane, origin at cell (0, 0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldCoord {
    pub x: f32,
    pub z: f32,
}

impl GridCoord {
    pub fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }

    /// Convert to world coordinates
    pub fn to_world(&self, metrics: &TerrainMetrics) -> WorldCoord {
        WorldCoord::new(
            self.x as f32 * metrics.meters_per_cell,
            self.z as f32 * metrics.meters_per_cell,
        )
    }
}

impl WorldCoord {
    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Fractional grid position
    pub fn to_grid(&self, metrics: &TerrainMetrics) -> (f32, f32) {
        (
            self.x / metrics.meters_per_cell,
            self.z / metrics.meters_per_cell,
        )
    }

    /// Nearest grid cell, if it lies on a grid of the given size
    pub fn nearest_cell(&self, metrics: &TerrainMetrics, width: u32, depth: u32) -> Option<GridCoord> {
        let (gx, gz) = self.to_grid(metrics);
        let (x, z) = (gx.round(), gz.round());
        if x < 0.0 || z < 0.0 || x >= width as f32 || z >= depth as f32 {
            return None;
        }
        Some(GridCoord::new(x as u32, z as u32))
    }

    pub fn distance(&self, other: WorldCoord) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }
}

/// Scale factors shared by every grid of one region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainMetrics {
    /// Horizontal size of one cell
    pub meters_per_cell: f32,
    /// Height in meters of a sample equal to 1.0
    pub height_scale_m: f32,
    pub offset_m: f32,
}

impl TerrainMetrics {
    pub fn new(meters_per_cell: f32, height_scale_m: f32, offset_m: f32) -> Self {
        Self {
            meters_per_cell,
            height_scale_m,
            offset_m,
        }
    }

    /// Convert a normalized sample to meters
    pub fn to_meters(&self, sample: f32) -> f32 {
        sample * self.height_scale_m + self.offset_m
    }
}

impl Default for TerrainMetrics {
    fn default() -> Self {
        Self::new(1.0, 1.0, 0.0)
    }
}

/// Dense row-major 2D grid with bounds-checked access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: u32,
    depth: u32,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `value`
    pub fn filled(width: u32, depth: u32, value: T) -> Self {
        Self {
            width,
            depth,
            cells: vec![value; (width as usize) * (depth as usize)],
        }
    }
}

impl<T> Grid<T> {
    /// Wrap an existing row-major buffer
    pub fn from_vec(width: u32, depth: u32, cells: Vec<T>) -> RegionResult<Self> {
        let expected = (width as usize) * (depth as usize);
        if cells.len() != expected {
            return Err(RegionError::InvalidGrid {
                reason: format!(
                    "buffer of {} cells does not match {width}x{depth} (expected {expected})",
                    cells.len()
                ),
            });
        }
        Ok(Self { width, depth, cells })
    }

    /// Build a grid by evaluating `f` for every cell in row-major order
    pub fn from_fn(width: u32, depth: u32, mut f: impl FnMut(GridCoord) -> T) -> Self {
        let mut cells = Vec::with_capacity((width as usize) * (depth as usize));
        for z in 0..depth {
            for x in 0..width {
                cells.push(f(GridCoord::new(x, z)));
            }
        }
        Self { width, depth, cells }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.x < self.width && coord.z < self.depth
    }

    fn index_of(&self, coord: GridCoord) -> usize {
        coord.z as usize * self.width as usize + coord.x as usize
    }

    pub fn get(&self, coord: GridCoord) -> Option<&T> {
        if !self.contains(coord) {
            return None;
        }
        self.cells.get(self.index_of(coord))
    }

    pub fn get_mut(&mut self, coord: GridCoord) -> Option<&mut T> {
        if !self.contains(coord) {
            return None;
        }
        let index = self.index_of(coord);
        self.cells.get_mut(index)
    }

    /// Offset a coordinate, returning None when the result leaves the grid
    pub fn neighbor(&self, coord: GridCoord, dx: i32, dz: i32) -> Option<GridCoord> {
        let x = coord.x as i64 + dx as i64;
        let z = coord.z as i64 + dz as i64;
        if x < 0 || z < 0 || x >= self.width as i64 || z >= self.depth as i64 {
            return None;
        }
        Some(GridCoord::new(x as u32, z as u32))
    }

    /// All coordinates in row-major order
    pub fn coords(&self) -> impl Iterator<Item = GridCoord> + use<T> {
        let (width, depth) = (self.width, self.depth);
        (0..depth).flat_map(move |z| (0..width).map(move |x| GridCoord::new(x, z)))
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn same_dimensions<U>(&self, other: &Grid<U>) -> bool {
        self.width == other.width && self.depth == other.depth
    }

    /// Fail with `DimensionMismatch` unless `other` matches this grid
    pub fn ensure_same_dimensions<U>(&self, other: &Grid<U>, what: &'static str) -> RegionResult<()> {
        if self.same_dimensions(other) {
            return Ok(());
        }
        Err(RegionError::DimensionMismatch {
            what,
            width: self.width,
            depth: self.depth,
            found_width: other.width,
            found_depth: other.depth,
        })
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            depth: self.depth,
            cells: self.cells.iter().map(f).collect(),
        }
    }
}

impl<T> Index<GridCoord> for Grid<T> {
    type Output = T;

    fn index(&self, coord: GridCoord) -> &T {
        assert!(
            self.contains(coord),
            "grid coordinate ({}, {}) outside {}x{}",
            coord.x,
            coord.z,
            self.width,
            self.depth
        );
        &self.cells[self.index_of(coord)]
    }
}

impl<T> IndexMut<GridCoord> for Grid<T> {
    fn index_mut(&mut self, coord: GridCoord) -> &mut T {
        assert!(
            self.contains(coord),
            "grid coordinate ({}, {}) outside {}x{}",
            coord.x,
            coord.z,
            self.width,
            self.depth
        );
        let index = self.index_of(coord);
        &mut self.cells[index]
    }
}

/// Normalized height samples in [0, 1]
pub type HeightField = Grid<f32>;

/// Get interpolated sample at a fractional grid position using bilinear interpolation
pub fn sample_bilinear(heights: &HeightField, grid_x: f32, grid_z: f32) -> Option<f32> {
    let max_x = heights.width().saturating_sub(1) as f32;
    let max_z = heights.depth().saturating_sub(1) as f32;
    if heights.is_empty()
        || !grid_x.is_finite()
        || !grid_z.is_finite()
        || grid_x < 0.0
        || grid_z < 0.0
        || grid_x > max_x
        || grid_z > max_z
    {
        return None;
    }

    let x0 = grid_x.floor() as u32;
    let z0 = grid_z.floor() as u32;
    let x1 = (x0 + 1).min(heights.width() - 1);
    let z1 = (z0 + 1).min(heights.depth() - 1);

    let fx = grid_x - x0 as f32;
    let fz = grid_z - z0 as f32;

    let h00 = *heights.get(GridCoord::new(x0, z0))?;
    let h10 = *heights.get(GridCoord::new(x1, z0))?;
    let h01 = *heights.get(GridCoord::new(x0, z1))?;
    let h11 = *heights.get(GridCoord::new(x1, z1))?;

    let h0 = h00 * (1.0 - fx) + h10 * fx;
    let h1 = h01 * (1.0 - fx) + h11 * fx;

    Some(h0 * (1.0 - fz) + h1 * fz)
}

/// Interpolated height in meters at a world position
pub fn height_at_world(heights: &HeightField, metrics: &TerrainMetrics, world: WorldCoord) -> Option<f32> {
    let (gx, gz) = world.to_grid(metrics);
    sample_bilinear(heights, gx, gz).map(|sample| metrics.to_meters(sample))
}

/// Height gradient in meters per meter, central differences (one-sided at borders)
pub fn height_gradient(heights: &HeightField, metrics: &TerrainMetrics, coord: GridCoord) -> (f32, f32) {
    let sample = |c: GridCoord| heights.get(c).copied().unwrap_or(0.0) * metrics.height_scale_m;

    let left = heights.neighbor(coord, -1, 0).unwrap_or(coord);
    let right = heights.neighbor(coord, 1, 0).unwrap_or(coord);
    let down = heights.neighbor(coord, 0, -1).unwrap_or(coord);
    let up = heights.neighbor(coord, 0, 1).unwrap_or(coord);

    let span_x = (right.x - left.x) as f32 * metrics.meters_per_cell;
    let span_z = (up.z - down.z) as f32 * metrics.meters_per_cell;

    let dx = if span_x > 0.0 { (sample(right) - sample(left)) / span_x } else { 0.0 };
    let dz = if span_z > 0.0 { (sample(up) - sample(down)) / span_z } else { 0.0 };
    (dx, dz)
}

/// Local slope in degrees
pub fn slope_degrees(heights: &HeightField, metrics: &TerrainMetrics, coord: GridCoord) -> f32 {
    let (dx, dz) = height_gradient(heights, metrics, coord);
    (dx * dx + dz * dz).sqrt().atan().to_degrees()
}

/// Unit surface normal (Y up)
pub fn surface_normal(heights: &HeightField, metrics: &TerrainMetrics, coord: GridCoord) -> Vec3 {
    let (dx, dz) = height_gradient(heights, metrics, coord);
    Vec3::new(-dx, 1.0, -dz).normalize()
}

/// Slope grid for a whole height field
pub fn slope_field(heights: &HeightField, metrics: &TerrainMetrics) -> Grid<f32> {
    Grid::from_fn(heights.width(), heights.depth(), |coord| {
        slope_degrees(heights, metrics, coord)
    })
}
