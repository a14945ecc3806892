//! Wavefront OBJ / MTL text parsing
//!
//! Only what the rasterizer consumes: positions, normals, texture
//! coordinates, grouping into shapes and flat material colors.
//! Polygons are fan-triangulated.

use std::collections::HashSet;

use log::warn;

use super::model::ModelError;
use crate::rasterizer::{Vec2, Vec3};

/// One face corner, indices already resolved to 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceCorner {
    pub position: usize,
    pub texcoord: Option<usize>,
    pub normal: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjTriangle {
    pub corners: [FaceCorner; 3],
    /// Index into `ObjData::material_names`
    pub material: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjShape {
    pub name: String,
    pub triangles: Vec<ObjTriangle>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub texcoords: Vec<Vec2>,
    pub shapes: Vec<ObjShape>,
    pub material_names: Vec<String>,
    /// `mtllib` file names, as written
    pub material_libs: Vec<String>,
}

/// Flat material colors from an MTL file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub name: String,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub emissive: Vec3,
}

fn parse_error(line: usize, message: impl Into<String>) -> ModelError {
    ModelError::Parse {
        line,
        message: message.into(),
    }
}

fn parse_floats<const N: usize>(
    args: &mut std::str::SplitWhitespace<'_>,
    line: usize,
    keyword: &str,
) -> Result<[f32; N], ModelError> {
    let mut out = [0.0; N];
    for slot in out.iter_mut() {
        let token = args
            .next()
            .ok_or_else(|| parse_error(line, format!("'{}' needs {} numbers", keyword, N)))?;
        *slot = token
            .parse()
            .map_err(|_| parse_error(line, format!("bad number '{}' in '{}'", token, keyword)))?;
    }
    Ok(out)
}

/// Resolve a 1-based (or negative, relative) OBJ index against `count` defined elements
fn resolve_index(token: &str, count: usize, line: usize) -> Result<usize, ModelError> {
    let raw: i64 = token
        .parse()
        .map_err(|_| parse_error(line, format!("bad index '{}'", token)))?;
    let resolved = match raw {
        0 => return Err(parse_error(line, "index 0 is not valid")),
        r if r > 0 => r - 1,
        r => count as i64 + r,
    };
    if resolved < 0 || resolved as usize >= count {
        return Err(parse_error(
            line,
            format!("index {} out of range ({} defined)", raw, count),
        ));
    }
    Ok(resolved as usize)
}

fn parse_corner(token: &str, data: &ObjData, line: usize) -> Result<FaceCorner, ModelError> {
    let mut parts = token.split('/');
    let position = resolve_index(parts.next().unwrap_or(""), data.positions.len(), line)?;
    let texcoord = match parts.next() {
        Some(t) if !t.is_empty() => Some(resolve_index(t, data.texcoords.len(), line)?),
        _ => None,
    };
    let normal = match parts.next() {
        Some(n) if !n.is_empty() => Some(resolve_index(n, data.normals.len(), line)?),
        _ => None,
    };
    Ok(FaceCorner {
        position,
        texcoord,
        normal,
    })
}

/// Parse OBJ source text
pub fn parse_obj(src: &str) -> Result<ObjData, ModelError> {
    let mut data = ObjData::default();
    let mut current = ObjShape::default();
    let mut material: Option<usize> = None;
    let mut warned: HashSet<String> = HashSet::new();

    for (i, raw_line) in src.lines().enumerate() {
        let line_no = i + 1;
        let line = raw_line.split('#').next().unwrap_or("").trim();
        let mut args = line.split_whitespace();
        let Some(keyword) = args.next() else {
            continue;
        };

        match keyword {
            "v" => {
                let [x, y, z] = parse_floats::<3>(&mut args, line_no, keyword)?;
                data.positions.push(Vec3::new(x, y, z));
            }
            "vn" => {
                let [x, y, z] = parse_floats::<3>(&mut args, line_no, keyword)?;
                data.normals.push(Vec3::new(x, y, z));
            }
            "vt" => {
                let [u, v] = parse_floats::<2>(&mut args, line_no, keyword)?;
                data.texcoords.push(Vec2::new(u, v));
            }
            "f" => {
                let corners = args
                    .map(|token| parse_corner(token, &data, line_no))
                    .collect::<Result<Vec<_>, _>>()?;
                if corners.len() < 3 {
                    return Err(parse_error(line_no, "face needs at least 3 vertices"));
                }
                // Fan around the first corner
                for k in 1..corners.len() - 1 {
                    current.triangles.push(ObjTriangle {
                        corners: [corners[0], corners[k], corners[k + 1]],
                        material,
                    });
                }
            }
            "o" | "g" => {
                let name = args.collect::<Vec<_>>().join(" ");
                if current.triangles.is_empty() {
                    current.name = name;
                } else {
                    data.shapes.push(std::mem::replace(
                        &mut current,
                        ObjShape {
                            name,
                            triangles: Vec::new(),
                        },
                    ));
                }
            }
            "usemtl" => {
                let name = args.collect::<Vec<_>>().join(" ");
                let idx = match data.material_names.iter().position(|n| *n == name) {
                    Some(idx) => idx,
                    None => {
                        data.material_names.push(name);
                        data.material_names.len() - 1
                    }
                };
                material = Some(idx);
            }
            "mtllib" => {
                data.material_libs.extend(args.map(str::to_string));
            }
            // Smoothing groups do not affect flat per-corner data
            "s" => {}
            other => {
                if warned.insert(other.to_string()) {
                    warn!("OBJ line {}: ignoring unsupported directive '{}'", line_no, other);
                }
            }
        }
    }

    if !current.triangles.is_empty() {
        data.shapes.push(current);
    }

    Ok(data)
}

/// Parse MTL source text
pub fn parse_mtl(src: &str) -> Result<Vec<Material>, ModelError> {
    let mut materials: Vec<Material> = Vec::new();

    for (i, raw_line) in src.lines().enumerate() {
        let line_no = i + 1;
        let line = raw_line.split('#').next().unwrap_or("").trim();
        let mut args = line.split_whitespace();
        let Some(keyword) = args.next() else {
            continue;
        };

        if keyword == "newmtl" {
            materials.push(Material {
                name: args.collect::<Vec<_>>().join(" "),
                ..Default::default()
            });
            continue;
        }

        let slot = match keyword {
            "Ka" | "Kd" | "Ke" => keyword,
            _ => continue,
        };
        let current = materials
            .last_mut()
            .ok_or_else(|| parse_error(line_no, format!("'{}' before any 'newmtl'", slot)))?;
        let [r, g, b] = parse_floats::<3>(&mut args, line_no, slot)?;
        let color = Vec3::new(r, g, b);
        match slot {
            "Ka" => current.ambient = color,
            "Kd" => current.diffuse = color,
            _ => current.emissive = color,
        }
    }

    Ok(materials)
}
