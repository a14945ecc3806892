//! World module - the collaborators around the rasterizer
//!
//! - Model loading from OBJ/MTL into per-shape vertex/index buffers
//! - World placement of a model
//! - Camera view/projection matrices

mod camera;
mod model;
mod obj;
mod transform;

pub use camera::*;
pub use model::*;
pub use obj::*;
pub use transform::*;
