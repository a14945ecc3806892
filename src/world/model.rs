//! Models: one vertex buffer and one index buffer per shape
//!
//! Every face corner becomes its own vertex (no deduplication) and the index
//! buffer is simply 0, 1, 2, ... so each shape can be drawn with
//! `draw(index_buffer.len(), 0)`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{info, warn};

use super::obj::{parse_mtl, parse_obj, Material, ObjData, ObjTriangle};
use super::transform::Transform;
use crate::rasterizer::{Mat4, Resource, Vec2, Vec3, Vertex};

/// Error type for model loading
#[derive(Debug)]
pub enum ModelError {
    IoError(std::io::Error),
    Parse { line: usize, message: String },
    Empty,
}

impl From<std::io::Error> for ModelError {
    fn from(e: std::io::Error) -> Self {
        ModelError::IoError(e)
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::IoError(e) => write!(f, "IO error: {}", e),
            ModelError::Parse { line, message } => write!(f, "Parse error on line {}: {}", line, message),
            ModelError::Empty => write!(f, "Model contains no triangles"),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

/// Geometry for one draw call
#[derive(Debug, Clone)]
pub struct Shape {
    pub name: String,
    pub vertex_buffer: Resource<Vertex>,
    pub index_buffer: Resource<u32>,
}

impl Shape {
    /// Build from a triangle list (three vertices per triangle, in order)
    pub fn from_vertices(name: &str, vertices: Vec<Vertex>) -> Self {
        let indices: Vec<u32> = (0..vertices.len() as u32).collect();
        Self {
            name: name.to_string(),
            vertex_buffer: Resource::from(vertices),
            index_buffer: Resource::from(indices),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.index_buffer.number_of_elements() / 3
    }
}

/// A loaded model plus its placement in the world
#[derive(Debug, Clone, Default)]
pub struct Model {
    shapes: Vec<Shape>,
    transform: Transform,
}

impl Model {
    pub fn from_shapes(shapes: Vec<Shape>) -> Self {
        Self {
            shapes,
            transform: Transform::default(),
        }
    }

    /// Load an OBJ file and the MTL libraries it references (relative to the OBJ)
    pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let data = parse_obj(&fs::read_to_string(path)?)?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let mut materials = Vec::new();
        for lib in &data.material_libs {
            let lib_path = base.join(lib);
            match fs::read_to_string(&lib_path) {
                Ok(src) => materials.extend(parse_mtl(&src)?),
                Err(e) => warn!("Material library {} not loaded: {}", lib_path.display(), e),
            }
        }

        let model = Self::from_obj(&data, &materials)?;
        info!(
            "Loaded {}: {} shapes, {} triangles",
            path.display(),
            model.shapes.len(),
            model.shapes.iter().map(Shape::triangle_count).sum::<usize>()
        );
        Ok(model)
    }

    /// Build per-shape buffers from parsed OBJ data
    pub fn from_obj(data: &ObjData, materials: &[Material]) -> Result<Self, ModelError> {
        let by_name: HashMap<&str, &Material> = materials.iter().map(|m| (m.name.as_str(), m)).collect();
        let resolved: Vec<Option<&Material>> = data
            .material_names
            .iter()
            .map(|name| {
                let found = by_name.get(name.as_str()).copied();
                if found.is_none() {
                    warn!("Material '{}' not found, using black", name);
                }
                found
            })
            .collect();

        let shapes: Vec<Shape> = data
            .shapes
            .iter()
            .filter(|s| !s.triangles.is_empty())
            .map(|s| {
                let mut vertices = Vec::with_capacity(s.triangles.len() * 3);
                for tri in &s.triangles {
                    let material = tri.material.and_then(|m| resolved.get(m).copied().flatten());
                    push_triangle(&mut vertices, data, tri, material);
                }
                Shape::from_vertices(&s.name, vertices)
            })
            .collect();

        if shapes.is_empty() {
            return Err(ModelError::Empty);
        }
        Ok(Self::from_shapes(shapes))
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.transform.matrix()
    }
}

fn push_triangle(vertices: &mut Vec<Vertex>, data: &ObjData, tri: &ObjTriangle, material: Option<&Material>) {
    let pos = tri.corners.map(|c| data.positions[c.position]);
    let face_normal = (pos[1] - pos[0]).cross(pos[2] - pos[0]).normalize();

    for (corner, p) in tri.corners.iter().zip(pos) {
        let normal = corner.normal.map_or(face_normal, |n| data.normals[n]);
        let uv = corner.texcoord.map_or(Vec2::default(), |t| data.texcoords[t]);
        vertices.push(Vertex {
            pos: p,
            normal,
            uv,
            ambient: material.map_or(Vec3::ZERO, |m| m.ambient),
            diffuse: material.map_or(Vec3::ZERO, |m| m.diffuse),
            emissive: material.map_or(Vec3::ZERO, |m| m.emissive),
        });
    }
}
