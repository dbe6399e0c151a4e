//! Face record decoding
//!
//! An `f` directive lists 3 or 4 vertex specs in one of four encodings:
//!
//! | spec         | encoding                 |
//! |--------------|--------------------------|
//! | `v`          | [`FaceEncoding::Vertex`] |
//! | `v/vt`       | [`FaceEncoding::VertexUv`] |
//! | `v//vn`      | [`FaceEncoding::VertexNormal`] |
//! | `v/vt/vn`    | [`FaceEncoding::VertexUvNormal`] |
//!
//! The first spec of a triangle decides the encoding for all of its specs. Quads are
//! split into the fan `(0, 1, 2)` and `(0, 2, 3)` and each half decoded on its own.

use super::error::ObjError;
use super::geometry::Face;

/// How the vertex specs of a face are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceEncoding {
    /// `v`
    Vertex,
    /// `v/vt`
    VertexUv,
    /// `v//vn`
    VertexNormal,
    /// `v/vt/vn`
    VertexUvNormal,
}

impl FaceEncoding {
    /// Classify a single vertex spec by its `/` separators
    ///
    /// Returns `None` for shapes none of the four encodings describe, such as `1/2/3/4`.
    pub fn classify(spec: &str) -> Option<Self> {
        let slashes = spec.matches('/').count();
        if slashes == 0 {
            Some(Self::Vertex)
        } else if spec.contains("//") {
            (slashes == 2).then_some(Self::VertexNormal)
        } else {
            match slashes {
                1 => Some(Self::VertexUv),
                2 => Some(Self::VertexUvNormal),
                _ => None,
            }
        }
    }

    /// Whether specs in this encoding carry a texture coordinate index
    pub fn has_uv(self) -> bool {
        matches!(self, Self::VertexUv | Self::VertexUvNormal)
    }

    /// Whether specs in this encoding carry a normal index
    pub fn has_normal(self) -> bool {
        matches!(self, Self::VertexNormal | Self::VertexUvNormal)
    }
}

/// Decode the tokens of an `f` directive into one or two triangles
///
/// `tokens[0]` is the directive itself. Faces with fewer than 3 or more than 4 vertex
/// specs are rejected with [`ObjError::UnsupportedTopology`].
pub fn decode_face(tokens: &[&str], line: usize) -> Result<Vec<Face>, ObjError> {
    let specs = tokens.get(1..).unwrap_or_default();
    match specs {
        &[a, b, c] => Ok(vec![decode_triangle([a, b, c], line)?]),
        &[a, b, c, d] => Ok(vec![
            decode_triangle([a, b, c], line)?,
            decode_triangle([a, c, d], line)?,
        ]),
        _ => Err(ObjError::UnsupportedTopology {
            line,
            vertex_count: specs.len(),
        }),
    }
}

/// Decode three vertex specs using the encoding of the first
pub fn decode_triangle(specs: [&str; 3], line: usize) -> Result<Face, ObjError> {
    let encoding = FaceEncoding::classify(specs[0]).ok_or_else(|| ObjError::NumericParse {
        line,
        directive: "f".to_string(),
        token: specs[0].to_string(),
    })?;

    let mut face = Face::default();
    for spec in specs {
        if FaceEncoding::classify(spec) != Some(encoding) {
            log::warn!(
                "line {}: face spec '{}' does not match the face encoding {:?}; decoding as {:?}",
                line,
                spec,
                encoding,
                encoding
            );
        }

        let mut parts = spec.split('/');
        let vertex = parts.next().unwrap_or_default();
        face.vertices.push(parse_index(vertex, spec, line)?);

        let uv_part = parts.next();
        let normal_part = parts.next();
        if encoding.has_uv() {
            if let Some(uv) = optional_index(uv_part, spec, line)? {
                face.uvs.push(uv);
            }
        }
        if encoding.has_normal() {
            if let Some(normal) = optional_index(normal_part, spec, line)? {
                face.normals.push(normal);
            }
        }
    }

    if face.has_normals() && face.normals.len() != face.vertices.len() {
        log::warn!(
            "line {}: face has {} normal indices for {} vertices",
            line,
            face.normals.len(),
            face.vertices.len()
        );
    }
    if face.has_uvs() && face.uvs.len() != face.vertices.len() {
        log::warn!(
            "line {}: face has {} uv indices for {} vertices",
            line,
            face.uvs.len(),
            face.vertices.len()
        );
    }

    Ok(face)
}

/// Parse a 1-based index into a 0-based one
fn parse_index(part: &str, spec: &str, line: usize) -> Result<usize, ObjError> {
    let index = part.parse::<usize>().map_err(|_| ObjError::NumericParse {
        line,
        directive: "f".to_string(),
        token: spec.to_string(),
    })?;
    index.checked_sub(1).ok_or_else(|| ObjError::InvalidIndex {
        line,
        token: spec.to_string(),
    })
}

/// An empty or absent slot is missing data, not an error
fn optional_index(part: Option<&str>, spec: &str, line: usize) -> Result<Option<usize>, ObjError> {
    match part {
        Some(p) if !p.is_empty() => parse_index(p, spec, line).map(Some),
        _ => Ok(None),
    }
}
