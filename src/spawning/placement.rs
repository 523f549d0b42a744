use bevy::math::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// One spawned object. Never mutated after the spawner returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedObject {
    /// Index of the source entry in the rules document
    pub entry_index: usize,
    pub asset_id: String,
    /// Resolved prefab reference
    pub prefab: String,
    /// World position in meters, origin at cell (0, 0)
    pub position: Vec3,
    pub rotation: Quat,
    /// Random yaw around the up axis, degrees in [0, 360)
    pub yaw_deg: f32,
    pub is_target: bool,
}

impl PlacedObject {
    /// Whether the object was tilted to follow the ground
    pub fn is_tilted(&self) -> bool {
        let up = self.rotation * Vec3::Y;
        up.angle_between(Vec3::Y) > 1e-4
    }
}

/// Angle between a surface normal and world up, in degrees
pub fn tilt_degrees(normal: Vec3) -> f32 {
    normal.angle_between(Vec3::Y).to_degrees()
}

/// Rotation for a placed object.
///
/// When `align_to_slope` is set and the ground tilt is within `max_tilt_deg`,
/// the object's up axis follows `normal` and `yaw_deg` spins it around that
/// normal. Otherwise the object stays upright with yaw only.
pub fn orientation(normal: Vec3, yaw_deg: f32, align_to_slope: bool, max_tilt_deg: f32) -> Quat {
    let yaw = Quat::from_rotation_y(yaw_deg.to_radians());
    if align_to_slope && tilt_degrees(normal) <= max_tilt_deg {
        Quat::from_rotation_arc(Vec3::Y, normal.normalize()) * yaw
    } else {
        yaw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_upright_without_alignment() {
        let normal = Vec3::new(0.5, 1.0, 0.0).normalize();
        let rotation = orientation(normal, 90.0, false, 45.0);
        let up = rotation * Vec3::Y;
        assert_relative_eq!(up.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_aligned_up_follows_normal() {
        let normal = Vec3::new(0.3, 1.0, -0.2).normalize();
        let rotation = orientation(normal, 123.0, true, 45.0);
        let up = rotation * Vec3::Y;
        assert_relative_eq!(up.x, normal.x, epsilon = 1e-5);
        assert_relative_eq!(up.y, normal.y, epsilon = 1e-5);
        assert_relative_eq!(up.z, normal.z, epsilon = 1e-5);
    }

    #[test]
    fn test_tilt_beyond_limit_stays_upright() {
        // 45 degree ground against a 30 degree limit
        let normal = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert_relative_eq!(tilt_degrees(normal), 45.0, epsilon = 1e-4);
        let rotation = orientation(normal, 10.0, true, 30.0);
        let up = rotation * Vec3::Y;
        assert_relative_eq!(up.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_is_tilted() {
        let object = PlacedObject {
            entry_index: 0,
            asset_id: "rock".to_string(),
            prefab: "rock".to_string(),
            position: Vec3::ZERO,
            rotation: orientation(Vec3::new(0.2, 1.0, 0.0).normalize(), 0.0, true, 45.0),
            yaw_deg: 0.0,
            is_target: false,
        };
        assert!(object.is_tilted());
        let upright = PlacedObject {
            rotation: Quat::from_rotation_y(1.0),
            ..object
        };
        assert!(!upright.is_tilted());
    }
}
