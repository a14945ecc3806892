//! CPU triangle rasterizer
//!
//! Features:
//! - Programmable vertex and pixel stages (traits, closures work too)
//! - Perspective divide and viewport mapping
//! - Edge-function scan conversion with counter-clockwise canonical winding
//! - Z-buffer, closer wins

mod math;
mod types;
mod resource;
mod render;

pub use math::*;
pub use types::*;
pub use resource::*;
pub use render::*;
