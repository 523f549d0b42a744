//! PNG previews of generated grids, for eyeballing a region without a renderer.

use super::GeneratedRegion;
use crate::errors::RegionResult;
use crate::terrain::biomes::BiomeGrid;
use crate::terrain::constants::{BIOME_FIELD, BIOME_FOREST, BIOME_ROAD};
use crate::terrain::control_raster::ControlRaster;
use crate::terrain::coordinates::{GridCoord, HeightField};
use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// Grayscale heightmap, black at 0 and white at 1
pub fn height_image(heights: &HeightField) -> GrayImage {
    ImageBuffer::from_fn(heights.width(), heights.depth(), |x, z| {
        let sample = heights[GridCoord::new(x, z)].clamp(0.0, 1.0);
        Luma([(sample * 255.0).round() as u8])
    })
}

pub fn biome_color(id: u8) -> Rgb<u8> {
    match id {
        BIOME_FIELD => Rgb([170, 200, 90]),
        BIOME_FOREST => Rgb([30, 100, 40]),
        BIOME_ROAD => Rgb([140, 120, 100]),
        other => {
            // Spread unknown ids around the hue wheel
            let h = other.wrapping_mul(47);
            Rgb([h, h.wrapping_add(85), h.wrapping_add(170)])
        }
    }
}

pub fn biome_image(biomes: &BiomeGrid) -> RgbImage {
    ImageBuffer::from_fn(biomes.width(), biomes.depth(), |x, z| {
        biome_color(biomes[GridCoord::new(x, z)])
    })
}

/// Base slot in red, overlay slot in green, blend byte in blue
pub fn control_image(control: &ControlRaster) -> RgbImage {
    ImageBuffer::from_fn(control.width(), control.depth(), |x, z| {
        let value = control[GridCoord::new(x, z)];
        Rgb([value.base_slot() * 8, value.overlay_slot() * 8, value.blend()])
    })
}

/// Write height, biome and control previews next to each other in `dir`
pub fn save_previews(region: &GeneratedRegion, dir: &Path) -> RegionResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let stem = &region.region_id;

    let height_path = dir.join(format!("{stem}_height.png"));
    height_image(&region.heights).save(&height_path)?;
    let biome_path = dir.join(format!("{stem}_biomes.png"));
    biome_image(&region.biomes).save(&biome_path)?;
    let control_path = dir.join(format!("{stem}_control.png"));
    control_image(&region.control).save(&control_path)?;

    Ok(vec![height_path, biome_path, control_path])
}
