use super::constants::{NOISE_LACUNARITY, NOISE_OCTAVES, NOISE_PERSISTENCE};
use super::coordinates::{Grid, HeightField};
use crate::errors::{RegionError, RegionResult};
use noise::{NoiseFn, Perlin};
use tracing::debug;

/// Fractal height field generator
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    pub seed: u32,
    pub noise_scale: f64,
    pub height_factor: f32,
}

impl NoiseGenerator {
    /// Create a new noise generator
    pub fn new(seed: u32, noise_scale: f64, height_factor: f32) -> Self {
        Self {
            seed,
            noise_scale,
            height_factor,
        }
    }

    /// Generate a normalized height field
    pub fn generate(&self, width: u32, depth: u32) -> RegionResult<HeightField> {
        if width == 0 || depth == 0 {
            return Err(RegionError::InvalidGrid {
                reason: format!("height field must have positive dimensions, got {width}x{depth}"),
            });
        }

        let perlin = Perlin::new(self.seed);
        let amplitude_sum: f64 = (0..NOISE_OCTAVES)
            .map(|octave| NOISE_PERSISTENCE.powi(octave as i32))
            .sum();

        let heights = Grid::from_fn(width, depth, |coord| {
            let nx = coord.x as f64 / width as f64 * self.noise_scale;
            let nz = coord.z as f64 / depth as f64 * self.noise_scale;

            let mut noise_value = 0.0;
            let mut amplitude = 1.0;
            let mut frequency = 1.0;
            for _ in 0..NOISE_OCTAVES {
                noise_value += perlin.get([nx * frequency, nz * frequency]) * amplitude;
                amplitude *= NOISE_PERSISTENCE;
                frequency *= NOISE_LACUNARITY;
            }

            let normalized = ((noise_value / amplitude_sum).clamp(-1.0, 1.0) + 1.0) * 0.5;
            (normalized as f32 * self.height_factor).clamp(0.0, 1.0)
        });

        debug!(
            width,
            depth,
            seed = self.seed,
            "generated height field"
        );
        Ok(heights)
    }
}
