//! Raw geometry accumulated during the OBJ pass
//!
//! Positions, normals and texture coordinates are appended in file order. Faces refer
//! to them by 0-based index (the text format is 1-based; the face decoder converts).

use super::error::ObjError;
use crate::foundation::math::Vec3;

/// A polygon after decoding, always a triangle once it leaves the face decoder
///
/// `normals` and `uvs` are empty when the source encoding did not carry them. When
/// present they are expected to be parallel to `vertices`; a short list is tolerated
/// and reported as a warning by the decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Face {
    /// 0-based position indices
    pub vertices: Vec<usize>,
    /// 0-based normal indices, empty if the face has none
    pub normals: Vec<usize>,
    /// 0-based texture coordinate indices, empty if the face has none
    pub uvs: Vec<usize>,
}

impl Face {
    /// Create a position-only triangle
    pub fn triangle(a: usize, b: usize, c: usize) -> Self {
        Self {
            vertices: vec![a, b, c],
            ..Default::default()
        }
    }

    /// Builder: attach normal indices
    pub fn with_normals(mut self, normals: Vec<usize>) -> Self {
        self.normals = normals;
        self
    }

    /// Builder: attach texture coordinate indices
    pub fn with_uvs(mut self, uvs: Vec<usize>) -> Self {
        self.uvs = uvs;
        self
    }

    /// Whether the face carries normal indices
    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    /// Whether the face carries texture coordinate indices
    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    /// Number of vertices on the face
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the face has no vertices
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Axis-aligned bounds of the loaded positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl BoundingBox {
    /// Compute the bounds of a set of points, `None` if there are none
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(Self { min: first, max: first }, |bb, p| Self {
            min: bb.min.inf(p),
            max: bb.max.sup(p),
        }))
    }

    /// Centre of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Extent along each axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Growable arrays of positions, normals, texture coordinates and faces
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    /// Vertex positions
    pub vertices: Vec<Vec3>,
    /// Vertex normals
    pub normals: Vec<Vec3>,
    /// Texture coordinates; `z` holds the optional `w` component
    pub uvs: Vec<Vec3>,
    /// Decoded triangles in file order
    pub faces: Vec<Face>,
}

impl Geometry {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a position
    pub fn add_vertex(&mut self, x: f32, y: f32, z: f32) {
        self.vertices.push(Vec3::new(x, y, z));
    }

    /// Append a normal
    pub fn add_normal(&mut self, x: f32, y: f32, z: f32) {
        self.normals.push(Vec3::new(x, y, z));
    }

    /// Append a texture coordinate
    pub fn add_uv(&mut self, u: f32, v: f32, w: Option<f32>) {
        self.uvs.push(Vec3::new(u, v, w.unwrap_or(0.0)));
    }

    /// Parse and append a `v x y z` record
    pub fn parse_vertex(&mut self, tokens: &[&str], line: usize) -> Result<(), ObjError> {
        let [x, y, z] = parse_floats::<3>(tokens, line)?;
        self.add_vertex(x, y, z);
        Ok(())
    }

    /// Parse and append a `vn x y z` record
    pub fn parse_normal(&mut self, tokens: &[&str], line: usize) -> Result<(), ObjError> {
        let [x, y, z] = parse_floats::<3>(tokens, line)?;
        self.add_normal(x, y, z);
        Ok(())
    }

    /// Parse and append a `vt u v [w]` record
    pub fn parse_uv(&mut self, tokens: &[&str], line: usize) -> Result<(), ObjError> {
        let [u, v] = parse_floats::<2>(tokens, line)?;
        let w = tokens
            .get(3)
            .map(|t| parse_float(tokens[0], t, line))
            .transpose()?;
        self.add_uv(u, v, w);
        Ok(())
    }

    /// Whether any normals were loaded
    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    /// Whether any texture coordinates were loaded
    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    /// Whether every face is a triangle
    pub fn is_triangular(&self) -> bool {
        self.faces.iter().all(|f| f.len() == 3)
    }

    /// Bounds of the loaded positions
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.vertices)
    }
}

/// Parse the `N` values following the directive token
fn parse_floats<const N: usize>(tokens: &[&str], line: usize) -> Result<[f32; N], ObjError> {
    let directive = tokens.first().copied().unwrap_or_default();
    if tokens.len() < N + 1 {
        return Err(ObjError::Truncated {
            line,
            directive: directive.to_string(),
            expected: N,
            found: tokens.len().saturating_sub(1),
        });
    }

    let mut values = [0.0; N];
    for (value, token) in values.iter_mut().zip(&tokens[1..=N]) {
        *value = parse_float(directive, token, line)?;
    }
    Ok(values)
}

fn parse_float(directive: &str, token: &str, line: usize) -> Result<f32, ObjError> {
    token.parse::<f32>().map_err(|_| ObjError::NumericParse {
        line,
        directive: directive.to_string(),
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_appends_in_order() {
        let mut geometry = Geometry::new();
        geometry.parse_vertex(&["v", "0", "0", "0"], 1).unwrap();
        geometry.parse_vertex(&["v", "1.5", "-2", "3e2"], 2).unwrap();
        geometry.parse_normal(&["vn", "0", "1", "0"], 3).unwrap();

        assert_eq!(geometry.vertices.len(), 2);
        assert_eq!(geometry.vertices[1], Vec3::new(1.5, -2.0, 300.0));
        assert_eq!(geometry.normals, vec![Vec3::y()]);
        assert!(geometry.has_normals());
        assert!(!geometry.has_uvs());
    }

    #[test]
    fn test_uv_w_defaults_to_zero() {
        let mut geometry = Geometry::new();
        geometry.parse_uv(&["vt", "0.25", "0.75"], 1).unwrap();
        geometry.parse_uv(&["vt", "0.5", "0.5", "1"], 2).unwrap();

        assert_relative_eq!(geometry.uvs[0], Vec3::new(0.25, 0.75, 0.0));
        assert_relative_eq!(geometry.uvs[1], Vec3::new(0.5, 0.5, 1.0));
    }

    #[test]
    fn test_non_numeric_coordinate_is_fatal() {
        let mut geometry = Geometry::new();
        let err = geometry.parse_vertex(&["v", "1", "abc", "0"], 7).unwrap_err();
        match err {
            ObjError::NumericParse { line, directive, token } => {
                assert_eq!(line, 7);
                assert_eq!(directive, "v");
                assert_eq!(token, "abc");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(geometry.vertices.is_empty());
    }

    #[test]
    fn test_missing_coordinate_is_truncated() {
        let mut geometry = Geometry::new();
        let err = geometry.parse_normal(&["vn", "1", "0"], 4).unwrap_err();
        assert!(matches!(err, ObjError::Truncated { expected: 3, found: 2, .. }));
    }

    #[test]
    fn test_bounding_box() {
        let mut geometry = Geometry::new();
        assert!(geometry.bounding_box().is_none());

        geometry.add_vertex(-1.0, 0.0, 2.0);
        geometry.add_vertex(3.0, 4.0, -2.0);
        let bb = geometry.bounding_box().unwrap();
        assert_eq!(bb.min, Vec3::new(-1.0, 0.0, -2.0));
        assert_eq!(bb.max, Vec3::new(3.0, 4.0, 2.0));
        assert_eq!(bb.center(), Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(bb.size(), Vec3::new(4.0, 4.0, 4.0));
    }
}
