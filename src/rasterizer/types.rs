//! Core types for the rasterizer

use super::math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Linear RGB color as produced by a pixel stage (nominally 0.0-1.0 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_vec3(v: Vec3) -> Self {
        Self { r: v.x, g: v.y, b: v.z }
    }

    /// Clamp every channel into 0.0-1.0
    pub fn saturate(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
        }
    }
}

/// Stored pixel: 8 bits per channel, opaque
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl UnsignedColor {
    pub const BLACK: UnsignedColor = UnsignedColor { r: 0, g: 0, b: 0 };
    pub const WHITE: UnsignedColor = UnsignedColor { r: 255, g: 255, b: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to [u8; 4] RGBA (alpha always 255)
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl From<Color> for UnsignedColor {
    fn from(c: Color) -> Self {
        let c = c.saturate();
        Self {
            r: (c.r * 255.0).round() as u8,
            g: (c.g * 255.0).round() as u8,
            b: (c.b * 255.0).round() as u8,
        }
    }
}

/// Anything the pipeline can pull an object-space position out of.
pub trait Positioned {
    fn position(&self) -> Vec3;
}

/// Per-vertex payload produced by the model loader
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    pub pos: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub emissive: Vec3,
}

impl Vertex {
    pub fn from_pos(x: f32, y: f32, z: f32) -> Self {
        Self {
            pos: Vec3::new(x, y, z),
            ..Default::default()
        }
    }

    /// Same position, flat material with the given diffuse color
    pub fn with_diffuse(mut self, diffuse: Vec3) -> Self {
        self.diffuse = diffuse;
        self
    }

    /// Sum of the material channels, the color an unlit surface shows
    pub fn material_color(&self) -> Color {
        Color::from_vec3(self.ambient + self.diffuse + self.emissive)
    }
}

impl Positioned for Vertex {
    fn position(&self) -> Vec3 {
        self.pos
    }
}

impl Positioned for Vec3 {
    fn position(&self) -> Vec3 {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_conversion_saturates() {
        let c = UnsignedColor::from(Color::new(2.0, -1.0, 0.5));
        assert_eq!(c, UnsignedColor::new(255, 0, 128));
    }

    #[test]
    fn test_material_color_sums_channels() {
        let v = Vertex {
            ambient: Vec3::new(0.1, 0.0, 0.0),
            diffuse: Vec3::new(0.2, 0.5, 0.0),
            emissive: Vec3::new(0.0, 0.0, 0.25),
            ..Default::default()
        };
        let c = v.material_color();
        assert!((c.r - 0.3).abs() < 1e-6);
        assert!((c.g - 0.5).abs() < 1e-6);
        assert!((c.b - 0.25).abs() < 1e-6);
    }
}
