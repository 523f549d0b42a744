//! Height, biome and texture-control grids for a region.

pub mod biome_generator;
pub mod biomes;
pub mod constants;
pub mod control_raster;
pub mod coordinates;
pub mod noise_generator;
pub mod rule_engine;

pub use biome_generator::{BiomeGenerator, BiomeLayout, CorridorLayout, HeightSlopeLayout, SplitAxis};
pub use biomes::{BiomeGrid, BiomeId, EdgeDistanceField, compute_edge_distance};
pub use control_raster::{ControlRaster, ControlRasterizer, ControlValue, LayerSlotMap};
pub use coordinates::{Grid, GridCoord, HeightField, TerrainMetrics, WorldCoord};
pub use noise_generator::NoiseGenerator;
pub use rule_engine::{LayerPick, pick_layer};
