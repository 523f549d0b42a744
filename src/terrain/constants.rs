/// Constants for region synthesis
/// Noise generation
pub const NOISE_OCTAVES: usize = 4;
pub const NOISE_PERSISTENCE: f64 = 0.5;
pub const NOISE_LACUNARITY: f64 = 2.0;

/// Region dimensions
pub const MIN_REGION_SIZE: u32 = 128;
pub const MAX_REGION_SIZE: u32 = 8192;

/// Biome ids shared by the built-in layouts
pub const BIOME_FIELD: u8 = 0;
pub const BIOME_FOREST: u8 = 1;
pub const BIOME_ROAD: u8 = 2;

/// Default values for biome generation
pub const DEFAULT_EDGE_SEARCH_RADIUS_CELLS: u32 = 16;
pub const DEFAULT_SMOOTHING_ITERATIONS: u32 = 3;
pub const FOREST_SCORE_THRESHOLD: f32 = 0.5;

/// Cross-biome texture blending
pub const DEFAULT_BIOME_BLEND_THRESHOLD_M: f32 = 2.0;
pub const DEFAULT_BIOME_BLEND_JITTER: f32 = 0.15;
pub const DEFAULT_INLET_PROBABILITY: f32 = 0.08;

/// Control raster
pub const MAX_LAYER_SLOT: u8 = 31;

/// Object placement
pub const MAIN_PASS_ATTEMPTS_PER_OBJECT: usize = 30;
pub const FALLBACK_ATTEMPTS_PER_OBJECT: usize = 50;
/// Filtered entries keep an index list only when at most 1/N of the cells pass
pub const SPARSE_CANDIDATE_FRACTION: usize = 8;
pub const MAX_CANDIDATE_REDRAWS: usize = 32;
pub const DEFAULT_TARGET_EDGE_MARGIN_M: f32 = 8.0;
pub const SQUARE_METERS_PER_KM2: f64 = 1_000_000.0;
