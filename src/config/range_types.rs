use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A placement jitter strength constrained to [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32")]
pub struct JitterStrength(f32);

impl JitterStrength {
    const MIN: f32 = 0.0;
    const MAX: f32 = 1.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl From<f32> for JitterStrength {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl Default for JitterStrength {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// A tilt angle in degrees constrained to [0.0, 90.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32")]
pub struct TiltAngle(f32);

impl TiltAngle {
    const MIN: f32 = 0.0;
    const MAX: f32 = 90.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl From<f32> for TiltAngle {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl Default for TiltAngle {
    fn default() -> Self {
        Self::new(30.0)
    }
}

/// A probability constrained to [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32")]
pub struct Probability(f32);

impl Probability {
    const MIN: f32 = 0.0;
    const MAX: f32 = 1.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl From<f32> for Probability {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl Default for Probability {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// An edge-distance search radius in cells constrained to [1, 256]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(from = "u32")]
pub struct SearchRadius(u32);

impl SearchRadius {
    const MIN: u32 = 1;
    const MAX: u32 = 256;

    pub fn new(value: u32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for SearchRadius {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl Default for SearchRadius {
    fn default() -> Self {
        Self::new(16)
    }
}
