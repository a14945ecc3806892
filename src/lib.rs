//! softras: a CPU triangle rasterizer
//!
//! The classic pipeline in software:
//! - Programmable vertex stage, perspective divide, viewport mapping
//! - Edge-function scan conversion with barycentric depth interpolation
//! - Z-buffer and programmable pixel stage
//!
//! Around the core: OBJ/MTL model loading, a camera, RON settings and PNG output.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod rasterizer;
pub mod renderer;
pub mod settings;
pub mod world;
