use bevy::math::Vec2;
use std::collections::HashMap;

/// Uniform grid over the ground plane for minimum-distance queries.
///
/// Lives for exactly one spawn call and accumulates every accepted position
/// across all entries.
#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_size: f32,
    buckets: HashMap<(i32, i32), Vec<Vec2>>,
    len: usize,
}

impl SpatialHash {
    /// Non-positive or non-finite sizes fall back to one meter
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 { cell_size } else { 1.0 };
        Self {
            cell_size,
            buckets: HashMap::new(),
            len: 0,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn bucket_of(&self, position: Vec2) -> (i32, i32) {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    pub fn insert(&mut self, position: Vec2) {
        let key = self.bucket_of(position);
        self.buckets.entry(key).or_default().push(position);
        self.len += 1;
    }

    /// Whether any stored position lies strictly closer than `radius`
    pub fn any_within(&self, position: Vec2, radius: f32) -> bool {
        if radius <= 0.0 || self.len == 0 {
            return false;
        }
        let radius_sq = radius * radius;
        let hits = |bucket: &Vec<Vec2>| bucket.iter().any(|p| p.distance_squared(position) < radius_sq);

        let reach_cells = (f64::from(radius) / f64::from(self.cell_size)).ceil();
        let side = 2.0 * reach_cells + 1.0;
        if side * side > self.buckets.len() as f64 {
            // The search box outnumbers the occupied buckets
            let cx = (f64::from(position.x) / f64::from(self.cell_size)).floor();
            let cz = (f64::from(position.y) / f64::from(self.cell_size)).floor();
            return self.buckets.iter().any(|(&(kx, kz), bucket)| {
                (f64::from(kx) - cx).abs() <= reach_cells && (f64::from(kz) - cz).abs() <= reach_cells && hits(bucket)
            });
        }

        // Small enough to enumerate, so the cast is exact
        let reach = reach_cells as i64;
        let (cx, cz) = self.bucket_of(position);
        let (cx, cz) = (i64::from(cx), i64::from(cz));
        for dz in -reach..=reach {
            for dx in -reach..=reach {
                let (Ok(kx), Ok(kz)) = (i32::try_from(cx + dx), i32::try_from(cz + dz)) else {
                    continue;
                };
                if self.buckets.get(&(kx, kz)).is_some_and(hits) {
                    return true;
                }
            }
        }
        false
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
