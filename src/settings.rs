//! Render settings
//!
//! Uses RON (Rusty Object Notation) for human-readable settings files.
//! Every field has a default, so a settings file only needs the fields it changes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::world::{Camera, Transform};
use crate::rasterizer::{Color, Vec3};

/// Error type for settings loading
#[derive(Debug)]
pub enum SettingsError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for SettingsError {
    fn from(e: ron::error::SpannedError) -> Self {
        SettingsError::ParseError(e)
    }
}

impl From<ron::Error> for SettingsError {
    fn from(e: ron::Error) -> Self {
        SettingsError::SerializeError(e)
    }
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::IoError(e) => write!(f, "IO error: {}", e),
            SettingsError::ParseError(e) => write!(f, "Parse error: {}", e),
            SettingsError::SerializeError(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Everything one render pass needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// OBJ file to render
    pub model_path: PathBuf,
    /// Image file to write (format from extension)
    pub result_path: PathBuf,
    pub width: usize,
    pub height: usize,
    pub camera_position: [f32; 3],
    /// Yaw in degrees
    pub camera_theta: f32,
    /// Pitch in degrees
    pub camera_phi: f32,
    /// Vertical field of view in degrees
    pub camera_angle_of_view: f32,
    pub camera_z_near: f32,
    pub camera_z_far: f32,
    pub clear_color: Color,
    /// Placement of the model in the world
    pub world: Transform,
    /// Show the finished frame in a window
    pub preview: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/cube.obj"),
            result_path: PathBuf::from("result.png"),
            width: 1920,
            height: 1080,
            camera_position: [0.0, 0.0, 3.0],
            camera_theta: 0.0,
            camera_phi: 0.0,
            camera_angle_of_view: 60.0,
            camera_z_near: 0.001,
            camera_z_far: 100.0,
            clear_color: Color::BLACK,
            world: Transform::default(),
            preview: false,
        }
    }
}

impl Settings {
    pub fn camera(&self) -> Camera {
        Camera {
            position: Vec3::from(self.camera_position),
            theta: self.camera_theta,
            phi: self.camera_phi,
            angle_of_view: self.camera_angle_of_view,
            width: self.width as f32,
            height: self.height as f32,
            z_near: self.camera_z_near,
            z_far: self.camera_z_far,
        }
    }
}

/// Load settings from a RON file
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings, SettingsError> {
    let contents = fs::read_to_string(path)?;
    load_settings_from_str(&contents)
}

/// Load settings from a RON string
pub fn load_settings_from_str(s: &str) -> Result<Settings, SettingsError> {
    Ok(ron::from_str(s)?)
}

/// Save settings to a RON file
pub fn save_settings<P: AsRef<Path>>(settings: &Settings, path: P) -> Result<(), SettingsError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(settings, config)?;
    fs::write(path, contents)?;
    Ok(())
}
