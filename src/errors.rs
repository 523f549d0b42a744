use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegionError {
    // Config-related errors
    #[error("Failed to get config directory")]
    ConfigDirNotFound,

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    SerializationFailed(#[from] toml::ser::Error),

    #[error("Failed to deserialize config: {0}")]
    DeserializationFailed(#[from] toml::de::Error),

    #[error("Rules file not found at path: {path}")]
    RulesFileNotFound { path: PathBuf },

    #[error("Rules validation failed: {reason}")]
    RulesValidationFailed { reason: String },

    #[error("Layer '{layer}' mapped to slot {slot}, slots must be in 0..=31")]
    InvalidLayerSlot { layer: String, slot: u32 },

    // Generation errors
    #[error("Invalid grid: {reason}")]
    InvalidGrid { reason: String },

    #[error("{what} is {found_width}x{found_depth}, expected {width}x{depth}")]
    DimensionMismatch {
        what: &'static str,
        width: u32,
        depth: u32,
        found_width: u32,
        found_depth: u32,
    },

    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    // Output errors
    #[error("Region file not found at path: {path}")]
    RegionFileNotFound { path: PathBuf },

    #[error("Corrupted region file: {reason}")]
    CorruptedRegionFile { reason: String },

    #[error("Failed to export targets: {0}")]
    ExportFailed(#[from] serde_json::Error),

    #[error("Failed to write preview image: {0}")]
    PreviewFailed(#[from] image::ImageError),
}

/// Result type alias for all operations
pub type RegionResult<T> = Result<T, RegionError>;
