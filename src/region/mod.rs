//! End-to-end region generation and the saved region format.

pub mod export;
pub mod preview;

pub use export::{TargetExport, TargetRecord};

use crate::errors::{RegionError, RegionResult};
use crate::rules::RegionRules;
use crate::seed::{SeedPurpose, resolve_seed, salt_seed, salt_seed_u32};
use crate::spawning::{ObjectSpawner, PlacedObject, PrefabResolver, SpawnSurface};
use crate::terrain::biome_generator::BiomeGenerator;
use crate::terrain::biomes::{BiomeGrid, EdgeDistanceField, biome_histogram, compute_edge_distance};
use crate::terrain::control_raster::{ControlRaster, ControlRasterizer, LayerSlotMap};
use crate::terrain::coordinates::{HeightField, TerrainMetrics};
use crate::terrain::noise_generator::NoiseGenerator;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// The four outputs of one generation cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedRegion {
    pub region_id: String,
    /// Resolved seed, never 0
    pub seed: u32,
    pub metrics: TerrainMetrics,
    pub heights: HeightField,
    pub control: ControlRaster,
    pub biomes: BiomeGrid,
    pub edge_distance: EdgeDistanceField,
    pub objects: Vec<PlacedObject>,
}

impl GeneratedRegion {
    pub fn targets(&self) -> impl Iterator<Item = &PlacedObject> {
        self.objects.iter().filter(|object| object.is_target)
    }

    /// All grids must share the height field's dimensions
    pub fn check_consistency(&self) -> RegionResult<()> {
        self.heights.ensure_same_dimensions(&self.control, "control raster")?;
        self.heights.ensure_same_dimensions(&self.biomes, "biome grid")?;
        self.heights.ensure_same_dimensions(&self.edge_distance, "edge distance field")?;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> RegionResult<()> {
        self.check_consistency()?;
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = bincode::serde::encode_to_vec(self, bincode::config::standard()).map_err(|e| {
            RegionError::CorruptedRegionFile {
                reason: format!("Failed to serialize region: {e}"),
            }
        })?;
        std::fs::write(path, data)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> RegionResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RegionError::RegionFileNotFound {
                path: path.to_path_buf(),
            });
        }

        let data = std::fs::read(path)?;
        let (region, _): (GeneratedRegion, usize) =
            bincode::serde::decode_from_slice(&data, bincode::config::standard()).map_err(|e| {
                RegionError::CorruptedRegionFile {
                    reason: format!("Failed to deserialize region data: {e}"),
                }
            })?;

        region.check_consistency().map_err(|e| RegionError::CorruptedRegionFile {
            reason: e.to_string(),
        })?;
        Ok(region)
    }
}

/// Runs noise, biome, texturing and spawning for one region
pub struct RegionGenerator<'a> {
    rules: &'a RegionRules,
    slots: &'a LayerSlotMap,
}

impl<'a> RegionGenerator<'a> {
    pub fn new(rules: &'a RegionRules, slots: &'a LayerSlotMap) -> Self {
        Self { rules, slots }
    }

    /// Generate a region. Seed 0 picks a fresh seed; every stage gets its own
    /// stream salted by purpose and region id.
    pub fn generate(
        &self,
        region_id: &str,
        resolver: &dyn PrefabResolver,
        seed: u32,
    ) -> RegionResult<GeneratedRegion> {
        let seed = resolve_seed(seed);
        let rules = self.rules;
        let metrics = rules.metrics();
        let size = rules.region.size;
        info!(region_id, seed, size, "generating region");

        let heights = NoiseGenerator::new(
            salt_seed_u32(seed, region_id, SeedPurpose::Height),
            rules.terrain.noise_scale,
            rules.terrain.height_factor,
        )
        .generate(size, size)?;

        let biomes = BiomeGenerator::new(
            rules.biomes.layout.clone(),
            salt_seed_u32(seed, region_id, SeedPurpose::Biome),
        )
        .generate(&heights, &metrics);
        debug!(histogram = ?biome_histogram(&biomes), "classified biomes");

        let edge_distance = compute_edge_distance(
            &biomes,
            rules.biomes.edge_search_radius(),
            metrics.meters_per_cell,
        );

        let control = ControlRasterizer::new(
            &rules.terrain,
            self.slots,
            metrics,
            salt_seed(seed, region_id, SeedPurpose::Texture),
        )
        .rasterize(&heights, &biomes, &edge_distance)?;

        let surface = SpawnSurface::new(&heights, &biomes, &edge_distance, metrics)?;
        let objects = ObjectSpawner::new(&rules.spawning, salt_seed(seed, region_id, SeedPurpose::Objects))
            .spawn(&surface, resolver);

        let region = GeneratedRegion {
            region_id: region_id.to_string(),
            seed,
            metrics,
            heights,
            control,
            biomes,
            edge_distance,
            objects,
        };
        info!(
            region_id,
            objects = region.objects.len(),
            targets = region.targets().count(),
            "region generated"
        );
        Ok(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawning::AssetCatalog;
    use crate::terrain::constants::BIOME_ROAD;
    use tempfile::TempDir;

    const DEMO_RULES: &str = include_str!("../../demos/rules/field_forest_road.toml");

    fn demo_region(seed: u32) -> GeneratedRegion {
        let rules = RegionRules::from_toml_str(DEMO_RULES).expect("demo rules should be valid");
        let slots = LayerSlotMap::from_rules(&rules.terrain);
        RegionGenerator::new(&rules, &slots)
            .generate("demo", &AssetCatalog::identity(), seed)
            .expect("generation should succeed")
    }

    #[test]
    fn test_generate_is_deterministic() {
        let a = demo_region(1234);
        let b = demo_region(1234);
        assert_eq!(a, b);
        assert_eq!(a.seed, 1234);
    }

    #[test]
    fn test_region_id_changes_output() {
        let rules = RegionRules::from_toml_str(DEMO_RULES).unwrap();
        let slots = LayerSlotMap::from_rules(&rules.terrain);
        let generator = RegionGenerator::new(&rules, &slots);
        let a = generator.generate("north", &AssetCatalog::identity(), 5).unwrap();
        let b = generator.generate("south", &AssetCatalog::identity(), 5).unwrap();
        assert_ne!(a.heights, b.heights);
    }

    #[test]
    fn test_zero_seed_is_resolved() {
        let region = demo_region(0);
        assert_ne!(region.seed, 0);
    }

    #[test]
    fn test_outputs_share_dimensions() {
        let region = demo_region(8);
        assert!(region.check_consistency().is_ok());
        assert_eq!(region.heights.width(), 256);
    }

    #[test]
    fn test_demo_targets_sit_on_the_road() {
        let region = demo_region(31);
        let targets: Vec<_> = region.targets().collect();
        assert!(!targets.is_empty());
        for target in targets {
            let cell = crate::terrain::coordinates::WorldCoord::new(target.position.x, target.position.z)
                .nearest_cell(&region.metrics, region.biomes.width(), region.biomes.depth())
                .expect("target should be on the grid");
            assert_eq!(region.biomes[cell], BIOME_ROAD);
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("regions/demo.bin");
        let region = demo_region(99);
        region.save_to_file(&path).expect("save should succeed");
        let loaded = GeneratedRegion::load_from_file(&path).expect("load should succeed");
        assert_eq!(loaded, region);
    }

    #[test]
    fn test_load_missing_and_corrupt_files() {
        let dir = TempDir::new().unwrap();
        let missing = GeneratedRegion::load_from_file(dir.path().join("none.bin")).unwrap_err();
        assert!(matches!(missing, RegionError::RegionFileNotFound { .. }));

        let garbage = dir.path().join("garbage.bin");
        std::fs::write(&garbage, [0xffu8; 16]).unwrap();
        let corrupt = GeneratedRegion::load_from_file(&garbage).unwrap_err();
        assert!(matches!(corrupt, RegionError::CorruptedRegionFile { .. }));
    }
}
