//! Rasterization renderer
//!
//! Owns the scene side of a render pass: loads the model, builds the camera,
//! allocates the color and depth targets, supplies the vertex and pixel
//! stages and draws every shape.

mod output;
mod preview;

pub use output::*;
pub use preview::show as show_preview;

use std::fmt;

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use crate::rasterizer::{
    Color, DrawStats, Mat4, PixelStage, RasterError, Rasterizer, Resource, UnsignedColor, Vec4, Vertex,
    VertexStage, DEFAULT_CLEAR_DEPTH,
};
use crate::settings::{Settings, SettingsError};
use crate::world::{Model, ModelError};

/// Error type for a whole render pass
#[derive(Debug)]
pub enum RenderError {
    Settings(SettingsError),
    Model(ModelError),
    Raster(RasterError),
    Image(image::ImageError),
}

impl From<SettingsError> for RenderError {
    fn from(e: SettingsError) -> Self {
        RenderError::Settings(e)
    }
}

impl From<ModelError> for RenderError {
    fn from(e: ModelError) -> Self {
        RenderError::Model(e)
    }
}

impl From<RasterError> for RenderError {
    fn from(e: RasterError) -> Self {
        RenderError::Raster(e)
    }
}

impl From<image::ImageError> for RenderError {
    fn from(e: image::ImageError) -> Self {
        RenderError::Image(e)
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Settings(e) => write!(f, "Settings: {}", e),
            RenderError::Model(e) => write!(f, "Model: {}", e),
            RenderError::Raster(e) => write!(f, "Rasterizer: {}", e),
            RenderError::Image(e) => write!(f, "Image output: {}", e),
        }
    }
}

impl std::error::Error for RenderError {}

/// Model-view-projection transform and unlit material shading
#[derive(Debug, Clone, Copy)]
pub struct SceneShader {
    pub world_view_projection: Mat4,
}

impl SceneShader {
    pub fn new(world: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self {
            world_view_projection: projection * view * world,
        }
    }
}

impl VertexStage<Vertex> for SceneShader {
    fn process(&self, position: Vec4, data: Vertex) -> (Vec4, Vertex) {
        (self.world_view_projection * position, data)
    }
}

impl PixelStage<Vertex> for SceneShader {
    fn shade(&self, data: &Vertex, _z: f32) -> Color {
        data.material_color().saturate()
    }
}

/// Result of a render pass
#[derive(Debug, Clone)]
pub struct Frame {
    pub color: Resource<UnsignedColor>,
    pub depth: Resource<f32>,
    pub stats: DrawStats,
}

pub struct RasterizationRenderer {
    settings: Settings,
}

impl RasterizationRenderer {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Load the configured model and render it
    pub fn render(&self) -> Result<Frame, RenderError> {
        let mut model = Model::load_obj(&self.settings.model_path)?;
        model.set_transform(self.settings.world);
        self.render_model(&model)
    }

    /// Render an already loaded model, placed by its own transform
    pub fn render_model(&self, model: &Model) -> Result<Frame, RenderError> {
        let (width, height) = (self.settings.width, self.settings.height);
        let camera = self.settings.camera();
        let shader = SceneShader::new(model.world_matrix(), camera.view_matrix(), camera.projection_matrix());

        let mut color: Resource<UnsignedColor> = Resource::new_2d(width, height);
        let mut depth: Resource<f32> = Resource::new_2d(width, height);
        let mut stats = DrawStats::default();

        {
            let mut rasterizer = Rasterizer::new();
            rasterizer.set_render_target(Some(&mut color), Some(&mut depth));
            rasterizer.set_viewport(width, height);
            rasterizer.clear_render_target(&UnsignedColor::from(self.settings.clear_color), DEFAULT_CLEAR_DEPTH)?;

            let progress = ProgressBar::new(model.shapes().len() as u64);
            if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} shapes {msg}") {
                progress.set_style(style);
            }

            for shape in model.shapes() {
                progress.set_message(shape.name.clone());
                rasterizer.set_vertex_buffer(&shape.vertex_buffer);
                rasterizer.set_index_buffer(&shape.index_buffer);
                stats += rasterizer.draw(&shader, &shader, shape.index_buffer.number_of_elements(), 0)?;
                progress.inc(1);
            }
            progress.finish_and_clear();
        }

        if stats.culled_behind > 0 {
            warn!("{} triangles crossed the camera plane and were skipped", stats.culled_behind);
        }
        info!(
            "Rendered {}x{}: {} triangles, {} pixels written",
            width, height, stats.triangles, stats.pixels_written
        );

        Ok(Frame { color, depth, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::Vec3;
    use crate::world::Shape;

    fn quad(z: f32, color: Vec3) -> Shape {
        let v = |x: f32, y: f32| Vertex::from_pos(x, y, z).with_diffuse(color);
        Shape::from_vertices(
            "quad",
            vec![v(-0.5, -0.5), v(0.5, -0.5), v(0.5, 0.5), v(-0.5, -0.5), v(0.5, 0.5), v(-0.5, 0.5)],
        )
    }

    fn small_settings() -> Settings {
        Settings {
            width: 64,
            height: 48,
            ..Default::default()
        }
    }

    #[test]
    fn test_quad_in_front_of_camera_is_drawn() {
        let model = Model::from_shapes(vec![quad(0.0, Vec3::new(1.0, 0.0, 0.0))]);
        let frame = RasterizationRenderer::new(small_settings()).render_model(&model).unwrap();

        assert_eq!(frame.stats.triangles, 2);
        assert_eq!(*frame.color.item_at(32, 24), UnsignedColor::new(255, 0, 0));
        assert_eq!(*frame.color.item_at(0, 0), UnsignedColor::BLACK);
        assert!(*frame.depth.item_at(32, 24) < 1.0);
        assert_eq!(*frame.depth.item_at(0, 0), DEFAULT_CLEAR_DEPTH);
    }

    #[test]
    fn test_nearer_shape_wins_regardless_of_order() {
        let near = quad(0.5, Vec3::new(0.0, 1.0, 0.0));
        let far = quad(-0.5, Vec3::new(0.0, 0.0, 1.0));
        let renderer = RasterizationRenderer::new(small_settings());

        let a = renderer.render_model(&Model::from_shapes(vec![near.clone(), far.clone()])).unwrap();
        let b = renderer.render_model(&Model::from_shapes(vec![far, near])).unwrap();

        assert_eq!(*a.color.item_at(32, 24), UnsignedColor::new(0, 255, 0));
        assert_eq!(a.color, b.color);
    }

    #[test]
    fn test_world_transform_moves_model() {
        let mut model = Model::from_shapes(vec![quad(0.0, Vec3::new(1.0, 1.0, 1.0))]);
        model.set_transform(crate::world::Transform {
            translation: Vec3::new(5.0, 0.0, 0.0),
            ..Default::default()
        });
        let frame = RasterizationRenderer::new(small_settings()).render_model(&model).unwrap();
        assert_eq!(frame.stats.pixels_written, 0);
        assert_eq!(*frame.color.item_at(32, 24), UnsignedColor::BLACK);
    }

    #[test]
    fn test_clear_color_fills_background() {
        let settings = Settings {
            clear_color: Color::new(0.0, 0.0, 1.0),
            ..small_settings()
        };
        let model = Model::from_shapes(vec![quad(0.0, Vec3::new(1.0, 0.0, 0.0))]);
        let frame = RasterizationRenderer::new(settings).render_model(&model).unwrap();
        assert_eq!(*frame.color.item_at(1, 1), UnsignedColor::new(0, 0, 255));
    }

    #[test]
    fn test_missing_model_file_is_reported() {
        let settings = Settings {
            model_path: "/nonexistent/softras/missing.obj".into(),
            ..small_settings()
        };
        let err = RasterizationRenderer::new(settings).render().unwrap_err();
        assert!(matches!(err, RenderError::Model(ModelError::IoError(_))));
    }
}
