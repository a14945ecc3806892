//! World placement of a model

use serde::{Deserialize, Serialize};
use crate::rasterizer::{Mat4, Vec3};

/// Translation, rotation (degrees, applied Z then Y then X) and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// `T * Rx * Ry * Rz * S`
    pub fn matrix(&self) -> Mat4 {
        Mat4::translation(self.translation)
            * Mat4::rotation_x(self.rotation.x.to_radians())
            * Mat4::rotation_y(self.rotation.y.to_radians())
            * Mat4::rotation_z(self.rotation.z.to_radians())
            * Mat4::scaling(self.scale)
    }
}
