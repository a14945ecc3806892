//! Triangle rasterization pipeline
//!
//! vertex stage -> perspective divide -> viewport -> setup -> scan -> depth test -> pixel stage

use std::fmt;

use log::debug;

use super::math::{edge_function, Vec2, Vec3, Vec4};
use super::resource::Resource;
use super::types::{Color, Positioned};

/// Viewport used until `set_viewport` is called
pub const DEFAULT_WIDTH: usize = 1920;
pub const DEFAULT_HEIGHT: usize = 1080;

/// "Empty/far" depth for `clear_render_target`
pub const DEFAULT_CLEAR_DEPTH: f32 = f32::MAX;

/// Triangles whose doubled screen-space area is below this are skipped
pub const AREA_EPSILON: f32 = 1e-6;

/// Programmable vertex step: object-space homogeneous position in, clip-space position out.
pub trait VertexStage<VB> {
    fn process(&self, position: Vec4, data: VB) -> (Vec4, VB);
}

impl<VB, F> VertexStage<VB> for F
where
    F: Fn(Vec4, VB) -> (Vec4, VB),
{
    fn process(&self, position: Vec4, data: VB) -> (Vec4, VB) {
        self(position, data)
    }
}

/// Programmable pixel step: payload plus interpolated depth in, color out.
pub trait PixelStage<VB> {
    fn shade(&self, data: &VB, z: f32) -> Color;
}

impl<VB, F> PixelStage<VB> for F
where
    F: Fn(&VB, f32) -> Color,
{
    fn shade(&self, data: &VB, z: f32) -> Color {
        self(data, z)
    }
}

/// Caller-side mistakes detected before any pixel is touched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    MissingBinding(&'static str),
    VertexCountNotTriangles(usize),
    IndexRangeOutOfBounds { offset: usize, count: usize, len: usize },
    VertexIndexOutOfBounds { index: u32, len: usize },
    TargetSizeMismatch { color: usize, depth: usize },
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterError::MissingBinding(what) => write!(f, "No {} bound", what),
            RasterError::VertexCountNotTriangles(n) => {
                write!(f, "Vertex count {} is not a multiple of 3", n)
            }
            RasterError::IndexRangeOutOfBounds { offset, count, len } => write!(
                f,
                "Index range {}..{} exceeds index buffer of {} entries",
                offset,
                offset.saturating_add(*count),
                len
            ),
            RasterError::VertexIndexOutOfBounds { index, len } => {
                write!(f, "Index {} exceeds vertex buffer of {} entries", index, len)
            }
            RasterError::TargetSizeMismatch { color, depth } => write!(
                f,
                "Render target has {} elements but depth buffer has {}",
                color, depth
            ),
        }
    }
}

impl std::error::Error for RasterError {}

/// Counters for one `draw` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Index triples processed
    pub triangles: usize,
    /// Skipped for (near-)zero area
    pub culled_degenerate: usize,
    /// Skipped because a vertex had w <= 0
    pub culled_behind: usize,
    /// Pixels that passed the inside test
    pub fragments: usize,
    /// Fragments that passed the depth test and were written
    pub pixels_written: usize,
}

impl std::ops::AddAssign for DrawStats {
    fn add_assign(&mut self, other: DrawStats) {
        self.triangles += other.triangles;
        self.culled_degenerate += other.culled_degenerate;
        self.culled_behind += other.culled_behind;
        self.fragments += other.fragments;
        self.pixels_written += other.pixels_written;
    }
}

/// Put (v1, v2, v3) in counter-clockwise screen order by swapping v2 and v3 if needed.
///
/// Afterwards `edge_function(v1, v2, v3) >= 0`.
#[inline]
pub fn canonical_winding(v1: Vec3, v2: Vec3, v3: Vec3) -> (Vec3, Vec3, Vec3) {
    if (v3.xy() - v1.xy()).cross(v2.xy() - v1.xy()) < 0.0 {
        (v1, v3, v2)
    } else {
        (v1, v2, v3)
    }
}

/// Edge values of `p` against the three edges, ordered as the weights of v1, v2, v3.
///
/// All positive means inside; divided by `edge_function(v1, v2, v3)` they are
/// the barycentric weights.
#[inline]
pub fn edge_values(v1: Vec2, v2: Vec2, v3: Vec2, p: Vec2) -> [f32; 3] {
    [
        edge_function(v2, v3, p),
        edge_function(v3, v1, p),
        edge_function(v1, v2, p),
    ]
}

/// Closer wins: accept `z` only if strictly less than what is stored.
#[inline]
pub fn depth_test(z: f32, stored: f32) -> bool {
    z < stored
}

/// Map a clip-space position to screen space: x, y in pixels (row 0 at the top), z in NDC.
#[inline]
fn to_screen(clip: Vec4, width: usize, height: usize) -> Vec3 {
    let ndc = clip / clip.w;
    Vec3::new(
        (ndc.x + 1.0) * width as f32 / 2.0,
        (-ndc.y + 1.0) * height as f32 / 2.0,
        ndc.z,
    )
}

/// Software triangle rasterizer.
///
/// Holds borrowed geometry and targets; owns nothing but the viewport size.
/// The vertex and pixel stages are supplied per `draw` call.
pub struct Rasterizer<'a, VB, RT> {
    vertex_buffer: Option<&'a Resource<VB>>,
    index_buffer: Option<&'a Resource<u32>>,
    render_target: Option<&'a mut Resource<RT>>,
    depth_buffer: Option<&'a mut Resource<f32>>,
    width: usize,
    height: usize,
}

impl<'a, VB, RT> Default for Rasterizer<'a, VB, RT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, VB, RT> Rasterizer<'a, VB, RT> {
    pub fn new() -> Self {
        Self {
            vertex_buffer: None,
            index_buffer: None,
            render_target: None,
            depth_buffer: None,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }

    /// Bind color and/or depth targets. `None` keeps the current binding.
    pub fn set_render_target(
        &mut self,
        render_target: Option<&'a mut Resource<RT>>,
        depth_buffer: Option<&'a mut Resource<f32>>,
    ) {
        if let Some(target) = render_target {
            self.render_target = Some(target);
        }
        if let Some(depth) = depth_buffer {
            self.depth_buffer = Some(depth);
        }
    }

    pub fn set_vertex_buffer(&mut self, vertex_buffer: &'a Resource<VB>) {
        self.vertex_buffer = Some(vertex_buffer);
    }

    pub fn set_index_buffer(&mut self, index_buffer: &'a Resource<u32>) {
        self.index_buffer = Some(index_buffer);
    }

    pub fn set_viewport(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    pub fn viewport(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn render_target(&self) -> Option<&Resource<RT>> {
        self.render_target.as_deref()
    }

    pub fn depth_buffer(&self) -> Option<&Resource<f32>> {
        self.depth_buffer.as_deref()
    }
}

impl<'a, VB, RT: Clone> Rasterizer<'a, VB, RT> {
    /// Fill the render target with `clear_value` and the depth buffer with `clear_depth`.
    pub fn clear_render_target(&mut self, clear_value: &RT, clear_depth: f32) -> Result<(), RasterError> {
        let target = self
            .render_target
            .as_deref_mut()
            .ok_or(RasterError::MissingBinding("render target"))?;
        let depth = self
            .depth_buffer
            .as_deref_mut()
            .ok_or(RasterError::MissingBinding("depth buffer"))?;
        if target.number_of_elements() != depth.number_of_elements() {
            return Err(RasterError::TargetSizeMismatch {
                color: target.number_of_elements(),
                depth: depth.number_of_elements(),
            });
        }

        target.fill(clear_value.clone());
        depth.fill(clear_depth);
        Ok(())
    }
}

impl<'a, VB, RT> Rasterizer<'a, VB, RT>
where
    VB: Positioned + Clone,
    RT: From<Color>,
{
    /// Rasterize `num_vertices` index-buffer entries starting at `vertex_offset`,
    /// three per triangle, in index order.
    ///
    /// The pixel stage always receives the first vertex's payload of each
    /// triangle; only depth is interpolated.
    pub fn draw<V, P>(
        &mut self,
        vertex_stage: &V,
        pixel_stage: &P,
        num_vertices: usize,
        vertex_offset: usize,
    ) -> Result<DrawStats, RasterError>
    where
        V: VertexStage<VB>,
        P: PixelStage<VB>,
    {
        if num_vertices % 3 != 0 {
            return Err(RasterError::VertexCountNotTriangles(num_vertices));
        }
        let vertex_buffer = self.vertex_buffer.ok_or(RasterError::MissingBinding("vertex buffer"))?;
        let index_buffer = self.index_buffer.ok_or(RasterError::MissingBinding("index buffer"))?;
        let (width, height) = (self.width, self.height);
        let target = self
            .render_target
            .as_deref_mut()
            .ok_or(RasterError::MissingBinding("render target"))?;
        let depth = self
            .depth_buffer
            .as_deref_mut()
            .ok_or(RasterError::MissingBinding("depth buffer"))?;
        if target.number_of_elements() != depth.number_of_elements() {
            return Err(RasterError::TargetSizeMismatch {
                color: target.number_of_elements(),
                depth: depth.number_of_elements(),
            });
        }

        let indices = vertex_offset
            .checked_add(num_vertices)
            .and_then(|end| index_buffer.as_slice().get(vertex_offset..end))
            .ok_or(RasterError::IndexRangeOutOfBounds {
                offset: vertex_offset,
                count: num_vertices,
                len: index_buffer.number_of_elements(),
            })?;

        // Vertex stage
        let mut processed: Vec<(Vec4, VB)> = Vec::with_capacity(num_vertices);
        for &index in indices {
            let source = vertex_buffer.get(index as usize).ok_or(RasterError::VertexIndexOutOfBounds {
                index,
                len: vertex_buffer.number_of_elements(),
            })?;
            processed.push(vertex_stage.process(source.position().to_point(), source.clone()));
        }

        // Pixels outside both the viewport and the target are never probed
        let target_width = target.width();
        let max_px = width.min(target_width) as i64 - 1;
        let max_py = height.min(target.height()) as i64 - 1;

        let mut stats = DrawStats::default();

        for triangle in processed.chunks_exact(3) {
            stats.triangles += 1;

            if triangle.iter().any(|(clip, _)| !(clip.w > 0.0)) {
                stats.culled_behind += 1;
                continue;
            }

            let (v1, v2, v3) = canonical_winding(
                to_screen(triangle[0].0, width, height),
                to_screen(triangle[1].0, width, height),
                to_screen(triangle[2].0, width, height),
            );
            let (p1, p2, p3) = (v1.xy(), v2.xy(), v3.xy());

            let area = edge_function(p1, p2, p3);
            if !(area >= AREA_EPSILON) {
                stats.culled_degenerate += 1;
                continue;
            }

            let min_x = (p1.x.min(p2.x).min(p3.x).floor() as i64).max(0);
            let max_x = (p1.x.max(p2.x).max(p3.x).ceil() as i64).min(max_px);
            let min_y = (p1.y.min(p2.y).min(p3.y).floor() as i64).max(0);
            let max_y = (p1.y.max(p2.y).max(p3.y).ceil() as i64).min(max_py);
            if max_x < min_x || max_y < min_y {
                continue;
            }

            let payload = &triangle[0].1;

            for y in min_y as usize..=max_y as usize {
                for x in min_x as usize..=max_x as usize {
                    let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                    let [e1, e2, e3] = edge_values(p1, p2, p3, p);
                    if !(e1 > 0.0 && e2 > 0.0 && e3 > 0.0) {
                        continue;
                    }
                    stats.fragments += 1;

                    let z = (e1 * v1.z + e2 * v2.z + e3 * v3.z) / area;
                    let idx = y * target_width + x;
                    let stored = depth.item_mut(idx);
                    if depth_test(z, *stored) {
                        *stored = z;
                        *target.item_mut(idx) = RT::from(pixel_stage.shade(payload, z));
                        stats.pixels_written += 1;
                    }
                }
            }
        }

        debug!(
            "draw({}, {}): {} triangles, {} degenerate, {} behind camera, {} fragments, {} written",
            num_vertices,
            vertex_offset,
            stats.triangles,
            stats.culled_degenerate,
            stats.culled_behind,
            stats.fragments,
            stats.pixels_written
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::UnsignedColor;

    fn passthrough(p: Vec4, v: Vec3) -> (Vec4, Vec3) {
        (p, v)
    }

    fn white(_: &Vec3, _: f32) -> Color {
        Color::WHITE
    }

    /// NDC position for a screen-space point on a `w`x`h` viewport
    fn ndc(sx: f32, sy: f32, z: f32, w: usize, h: usize) -> Vec3 {
        Vec3::new(sx * 2.0 / w as f32 - 1.0, 1.0 - sy * 2.0 / h as f32, z)
    }

    #[test]
    fn test_canonical_winding_is_counter_clockwise() {
        let points = [
            (Vec3::new(0.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 4.0, 0.0)),
            (Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 4.0, 0.0), Vec3::new(4.0, 0.0, 0.0)),
            (Vec3::new(-3.0, 7.5, 0.0), Vec3::new(11.0, -2.0, 0.0), Vec3::new(5.0, 9.0, 0.0)),
            (Vec3::new(1.0, 1.0, 0.0), Vec3::new(9.0, 9.0, 0.0), Vec3::new(1.0, 8.0, 0.0)),
        ];
        for (a, b, c) in points {
            let (v1, v2, v3) = canonical_winding(a, b, c);
            assert!(edge_function(v1.xy(), v2.xy(), v3.xy()) > 0.0);
            assert_eq!(v1, a);
        }
    }

    #[test]
    fn test_barycentric_weights_sum_to_one() {
        let (v1, v2, v3) = canonical_winding(
            Vec3::new(0.3, 0.2, 0.0),
            Vec3::new(17.5, 3.0, 0.0),
            Vec3::new(6.0, 12.25, 0.0),
        );
        let area = edge_function(v1.xy(), v2.xy(), v3.xy());
        for y in 0..14 {
            for x in 0..18 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let e = edge_values(v1.xy(), v2.xy(), v3.xy(), p);
                if e.iter().all(|v| *v > 0.0) {
                    let sum: f32 = e.iter().map(|v| v / area).sum();
                    assert!((sum - 1.0).abs() < 1e-4, "weights sum to {} at ({}, {})", sum, x, y);
                }
            }
        }
    }

    #[test]
    fn test_depth_test_is_strict() {
        assert!(depth_test(0.2, 0.8));
        assert!(!depth_test(0.5, 0.5));
        assert!(depth_test(0.9, f32::MAX));
    }

    #[test]
    fn test_draw_requires_bindings() {
        let mut r: Rasterizer<Vec3, Color> = Rasterizer::new();
        assert_eq!(
            r.draw(&passthrough, &white, 3, 0),
            Err(RasterError::MissingBinding("vertex buffer"))
        );
    }

    #[test]
    fn test_draw_rejects_partial_triangle() {
        let mut r: Rasterizer<Vec3, Color> = Rasterizer::new();
        assert_eq!(
            r.draw(&passthrough, &white, 4, 0),
            Err(RasterError::VertexCountNotTriangles(4))
        );
    }

    #[test]
    fn test_draw_rejects_index_range_past_end() {
        let vertices = Resource::from_vec(3, 1, vec![Vec3::ZERO; 3]).unwrap();
        let indices = Resource::from_vec(3, 1, vec![0u32, 1, 2]).unwrap();
        let mut target: Resource<Color> = Resource::new_2d(2, 2);
        let mut depth: Resource<f32> = Resource::new_2d(2, 2);
        let mut r = Rasterizer::new();
        r.set_vertex_buffer(&vertices);
        r.set_index_buffer(&indices);
        r.set_render_target(Some(&mut target), Some(&mut depth));
        assert_eq!(
            r.draw(&passthrough, &white, 3, 3),
            Err(RasterError::IndexRangeOutOfBounds { offset: 3, count: 3, len: 3 })
        );
    }

    #[test]
    fn test_draw_rejects_bad_vertex_index() {
        let vertices = Resource::from_vec(2, 1, vec![Vec3::ZERO; 2]).unwrap();
        let indices = Resource::from_vec(3, 1, vec![0u32, 1, 5]).unwrap();
        let mut target: Resource<Color> = Resource::new_2d(2, 2);
        let mut depth: Resource<f32> = Resource::new_2d(2, 2);
        let mut r = Rasterizer::new();
        r.set_vertex_buffer(&vertices);
        r.set_index_buffer(&indices);
        r.set_render_target(Some(&mut target), Some(&mut depth));
        assert_eq!(
            r.draw(&passthrough, &white, 3, 0),
            Err(RasterError::VertexIndexOutOfBounds { index: 5, len: 2 })
        );
    }

    #[test]
    fn test_clear_rejects_mismatched_targets() {
        let mut target: Resource<Color> = Resource::new_2d(4, 4);
        let mut depth: Resource<f32> = Resource::new_2d(2, 2);
        let mut r: Rasterizer<Vec3, Color> = Rasterizer::new();
        r.set_render_target(Some(&mut target), Some(&mut depth));
        assert_eq!(
            r.clear_render_target(&Color::BLACK, DEFAULT_CLEAR_DEPTH),
            Err(RasterError::TargetSizeMismatch { color: 16, depth: 4 })
        );
    }

    #[test]
    fn test_set_render_target_none_keeps_binding() {
        let mut target: Resource<Color> = Resource::new_2d(2, 2);
        let mut depth: Resource<f32> = Resource::new_2d(2, 2);
        let mut other: Resource<Color> = Resource::new_2d(3, 3);
        let mut r: Rasterizer<Vec3, Color> = Rasterizer::new();
        r.set_render_target(Some(&mut target), Some(&mut depth));
        r.set_render_target(Some(&mut other), None);
        assert_eq!(r.render_target().map(|t| t.number_of_elements()), Some(9));
        assert_eq!(r.depth_buffer().map(|d| d.number_of_elements()), Some(4));
    }

    #[test]
    fn test_default_viewport() {
        let r: Rasterizer<Vec3, Color> = Rasterizer::new();
        assert_eq!(r.viewport(), (1920, 1080));
    }

    #[test]
    fn test_degenerate_triangle_is_skipped() {
        let (w, h) = (8, 8);
        let vertices = Resource::from_vec(
            3,
            1,
            vec![ndc(1.0, 1.0, 0.5, w, h), ndc(4.0, 4.0, 0.5, w, h), ndc(7.0, 7.0, 0.5, w, h)],
        )
        .unwrap();
        let indices = Resource::from_vec(3, 1, vec![0u32, 1, 2]).unwrap();
        let mut target: Resource<UnsignedColor> = Resource::new_2d(w, h);
        let mut depth: Resource<f32> = Resource::new_2d(w, h);

        let mut r = Rasterizer::new();
        r.set_viewport(w, h);
        r.set_vertex_buffer(&vertices);
        r.set_index_buffer(&indices);
        r.set_render_target(Some(&mut target), Some(&mut depth));
        r.clear_render_target(&UnsignedColor::BLACK, DEFAULT_CLEAR_DEPTH).unwrap();
        let stats = r.draw(&passthrough, &white, 3, 0).unwrap();

        assert_eq!(stats.culled_degenerate, 1);
        assert_eq!(stats.pixels_written, 0);
        assert!(target.iter().all(|c| *c == UnsignedColor::BLACK));
    }

    #[test]
    fn test_triangle_behind_camera_is_skipped() {
        let vertices = Resource::from_vec(
            3,
            1,
            vec![Vec3::new(-0.5, -0.5, 0.0), Vec3::new(0.5, -0.5, 0.0), Vec3::new(0.0, 0.5, 0.0)],
        )
        .unwrap();
        let indices = Resource::from_vec(3, 1, vec![0u32, 1, 2]).unwrap();
        let mut target: Resource<Color> = Resource::new_2d(4, 4);
        let mut depth: Resource<f32> = Resource::new_2d(4, 4);
        let flip_w = |p: Vec4, v: Vec3| (Vec4::new(p.x, p.y, p.z, -1.0), v);

        let mut r = Rasterizer::new();
        r.set_viewport(4, 4);
        r.set_vertex_buffer(&vertices);
        r.set_index_buffer(&indices);
        r.set_render_target(Some(&mut target), Some(&mut depth));
        r.clear_render_target(&Color::BLACK, DEFAULT_CLEAR_DEPTH).unwrap();
        let stats = r.draw(&flip_w, &white, 3, 0).unwrap();

        assert_eq!(stats.culled_behind, 1);
        assert_eq!(stats.fragments, 0);
    }

    #[test]
    fn test_offscreen_triangle_stays_in_bounds() {
        // Extends far past every border of a 4x4 target
        let vertices = Resource::from_vec(
            3,
            1,
            vec![Vec3::new(-5.0, -5.0, 0.0), Vec3::new(5.0, -5.0, 0.0), Vec3::new(0.0, 9.0, 0.0)],
        )
        .unwrap();
        let indices = Resource::from_vec(3, 1, vec![0u32, 1, 2]).unwrap();
        let mut target: Resource<Color> = Resource::new_2d(4, 4);
        let mut depth: Resource<f32> = Resource::new_2d(4, 4);

        let mut r = Rasterizer::new();
        r.set_viewport(4, 4);
        r.set_vertex_buffer(&vertices);
        r.set_index_buffer(&indices);
        r.set_render_target(Some(&mut target), Some(&mut depth));
        r.clear_render_target(&Color::BLACK, DEFAULT_CLEAR_DEPTH).unwrap();
        let stats = r.draw(&passthrough, &white, 3, 0).unwrap();

        assert_eq!(stats.pixels_written, 16);
    }

    #[test]
    fn test_depth_is_interpolated_across_the_triangle() {
        let (w, h) = (16, 16);
        // z grows left to right
        let vertices = Resource::from_vec(
            3,
            1,
            vec![ndc(0.0, 0.0, 0.0, w, h), ndc(16.0, 0.0, 1.0, w, h), ndc(0.0, 16.0, 0.0, w, h)],
        )
        .unwrap();
        let indices = Resource::from_vec(3, 1, vec![0u32, 1, 2]).unwrap();
        let mut target: Resource<Color> = Resource::new_2d(w, h);
        let mut depth: Resource<f32> = Resource::new_2d(w, h);

        let mut r = Rasterizer::new();
        r.set_viewport(w, h);
        r.set_vertex_buffer(&vertices);
        r.set_index_buffer(&indices);
        r.set_render_target(Some(&mut target), Some(&mut depth));
        r.clear_render_target(&Color::BLACK, DEFAULT_CLEAR_DEPTH).unwrap();
        r.draw(&passthrough, &white, 3, 0).unwrap();

        // Pixel center (x + 0.5) / 16 along x
        let z = *depth.item_at(4, 2);
        assert!((z - 4.5 / 16.0).abs() < 1e-4, "z = {}", z);
        let z = *depth.item_at(10, 1);
        assert!((z - 10.5 / 16.0).abs() < 1e-4, "z = {}", z);
    }

    #[test]
    fn test_pixel_stage_sees_stored_depth() {
        let (w, h) = (16, 16);
        // Clockwise on screen, so v2 and v3 get swapped before the scan
        let vertices = Resource::from_vec(
            3,
            1,
            vec![ndc(1.0, 1.0, 0.1, w, h), ndc(15.0, 3.0, 0.4, w, h), ndc(2.0, 15.0, 0.9, w, h)],
        )
        .unwrap();
        let indices = Resource::from_vec(3, 1, vec![0u32, 1, 2]).unwrap();
        let mut target: Resource<Color> = Resource::new_2d(w, h);
        let mut depth: Resource<f32> = Resource::new_2d(w, h);
        let depth_as_red = |_: &Vec3, z: f32| Color::new(z, 1.0, 0.0);

        let mut r = Rasterizer::new();
        r.set_viewport(w, h);
        r.set_vertex_buffer(&vertices);
        r.set_index_buffer(&indices);
        r.set_render_target(Some(&mut target), Some(&mut depth));
        r.clear_render_target(&Color::BLACK, DEFAULT_CLEAR_DEPTH).unwrap();
        let stats = r.draw(&passthrough, &depth_as_red, 3, 0).unwrap();

        assert!(stats.pixels_written > 20);
        let mut shaded = 0;
        for (c, z) in target.iter().zip(depth.iter()) {
            if c.g == 1.0 {
                shaded += 1;
                assert_eq!(c.r, *z);
                assert!(*z > 0.1 && *z < 0.9, "z = {}", z);
            } else {
                assert_eq!(*z, DEFAULT_CLEAR_DEPTH);
            }
        }
        assert_eq!(shaded, stats.pixels_written);
    }

    #[test]
    fn test_pixel_stage_gets_first_processed_vertex() {
        let (w, h) = (8, 8);
        let vertices = Resource::from_vec(
            3,
            1,
            vec![ndc(0.0, 0.0, 0.5, w, h), ndc(8.0, 0.0, 0.5, w, h), ndc(0.0, 8.0, 0.5, w, h)],
        )
        .unwrap();
        let indices = Resource::from_vec(3, 1, vec![0u32, 1, 2]).unwrap();
        let mut target: Resource<Color> = Resource::new_2d(w, h);
        let mut depth: Resource<f32> = Resource::new_2d(w, h);
        // Payload handed on is a tag, not the source position
        let tag = |p: Vec4, v: Vec3| (p, Vec3::new(v.x + 10.0, v.y + 20.0, 7.0));
        let echo = |v: &Vec3, _: f32| Color::from_vec3(*v);

        let mut r = Rasterizer::new();
        r.set_viewport(w, h);
        r.set_vertex_buffer(&vertices);
        r.set_index_buffer(&indices);
        r.set_render_target(Some(&mut target), Some(&mut depth));
        r.clear_render_target(&Color::BLACK, DEFAULT_CLEAR_DEPTH).unwrap();
        let stats = r.draw(&tag, &echo, 3, 0).unwrap();

        let first = *vertices.item(0);
        let want = Color::new(first.x + 10.0, first.y + 20.0, 7.0);
        assert!(stats.pixels_written > 0);
        assert_eq!(*target.item_at(1, 1), want);
        assert!(target.iter().all(|c| *c == want || *c == Color::BLACK));
    }
}
