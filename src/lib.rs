pub mod config;
pub mod errors;
pub mod region;
pub mod rules;
pub mod seed;
pub mod spawning;
pub mod terrain;

// Selective re-exports for external consumers

pub use errors::{RegionError, RegionResult};
pub use region::{GeneratedRegion, RegionGenerator, TargetExport};
pub use rules::RegionRules;
pub use spawning::{AssetCatalog, ObjectSpawner, PlacedObject, PrefabResolver, SpawnSurface};
pub use terrain::{ControlValue, LayerSlotMap};
