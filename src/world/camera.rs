//! Camera: view and projection matrices for the vertex stage
//!
//! Right-handed, looking down -Z at zero yaw/pitch. Projection maps
//! `z_near` to NDC -1 and `z_far` to NDC +1.

use crate::rasterizer::{Mat4, Vec3};

/// Pitch is kept short of straight up/down so the basis stays defined
const MAX_PITCH: f32 = 89.9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Yaw in degrees, positive turns right
    pub theta: f32,
    /// Pitch in degrees, positive looks up
    pub phi: f32,
    /// Vertical field of view in degrees
    pub angle_of_view: f32,
    pub width: f32,
    pub height: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            theta: 0.0,
            phi: 0.0,
            angle_of_view: 60.0,
            width: 1920.0,
            height: 1080.0,
            z_near: 0.001,
            z_far: 100.0,
        }
    }
}

impl Camera {
    pub fn direction(&self) -> Vec3 {
        let theta = self.theta.to_radians();
        let phi = self.phi.clamp(-MAX_PITCH, MAX_PITCH).to_radians();
        Vec3::new(theta.sin() * phi.cos(), phi.sin(), -theta.cos() * phi.cos())
    }

    pub fn right(&self) -> Vec3 {
        self.direction().cross(Vec3::UP).normalize()
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.direction())
    }

    pub fn view_matrix(&self) -> Mat4 {
        let forward = self.direction();
        let right = self.right();
        let up = right.cross(forward);
        let p = self.position;
        Mat4::from_rows([
            [right.x, right.y, right.z, -right.dot(p)],
            [up.x, up.y, up.z, -up.dot(p)],
            [-forward.x, -forward.y, -forward.z, forward.dot(p)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let f = 1.0 / (self.angle_of_view.to_radians() / 2.0).tan();
        let aspect = self.width / self.height;
        let (n, far) = (self.z_near, self.z_far);
        Mat4::from_rows([
            [f / aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, (far + n) / (n - far), 2.0 * far * n / (n - far)],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }
}
