//! Grouped Wavefront OBJ loading
//!
//! [`GroupedObj`] reads an OBJ file in one streaming pass. Positions, normals and
//! texture coordinates are accumulated as they appear, faces are decoded and split into
//! triangles, and `g`/`usemtl` directives cut the face stream into [`MeshSegment`]s.
//! After the pass the segments are sorted by material and every face-vertex is packed
//! into one interleaved buffer.
//!
//! Only `v`, `vn`, `vt`, `f`, `g` and `usemtl` are understood; every other line is
//! skipped.
//!
//! # Example
//!
//! ```no_run
//! use scene_engine::assets::obj::GroupedObj;
//! use scene_engine::render::headless::RecordingVertexArray;
//!
//! let mesh = GroupedObj::load("models/sponza.obj")?;
//! let mut vao = RecordingVertexArray::new();
//! mesh.upload(&mut vao);
//! for i in 0..mesh.num_meshes() {
//!     mesh.draw(i, &mut vao);
//! }
//! # Ok::<(), scene_engine::assets::obj::ObjError>(())
//! ```

pub mod binary;
pub mod error;
pub mod face;
pub mod geometry;
pub mod groups;
pub mod packer;
pub mod writer;

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub use binary::OBJ_MAGIC;
pub use error::{ObjError, PackError};
pub use face::FaceEncoding;
pub use geometry::{BoundingBox, Face, Geometry};
pub use groups::{MeshSegment, ParseState};
pub use packer::{PackedMesh, PackedVertex, VERTEX_LAYOUT};

use crate::assets::tokenizer::tokenize;
use crate::render::backend::VertexArray;

/// The directive handlers a grouped mesh needs during the OBJ pass
///
/// `v`/`vn`/`vt` go straight to [`Geometry`]; these are the directives whose
/// handling shapes the segment table and the packed buffer.
pub trait MeshDirectives {
    /// Handle an `f` record
    fn parse_face(&mut self, state: &mut ParseState, tokens: &[&str], line: usize) -> Result<(), ObjError>;

    /// Handle a `g [name]` record
    fn parse_group(&mut self, state: &mut ParseState, tokens: &[&str]);

    /// Handle a `usemtl [name]` record
    fn parse_material(&mut self, state: &mut ParseState, tokens: &[&str]);

    /// Build the packed vertex buffer from the accumulated faces
    fn create_vao(&mut self) -> Result<(), PackError>;
}

/// A mesh split into material-sorted segments over one packed vertex buffer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedObj {
    geometry: Geometry,
    segments: Vec<MeshSegment>,
    packed: PackedMesh,
}

impl GroupedObj {
    /// Load and pack an OBJ file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ObjError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ObjError::FileNotFound(path.to_path_buf()));
        }
        let mesh = Self::from_reader(BufReader::new(File::open(path)?))?;
        log::info!(
            "Loaded {:?}: {} vertices, {} normals, {} uvs, {} triangles in {} segments",
            path,
            mesh.geometry.vertices.len(),
            mesh.geometry.normals.len(),
            mesh.geometry.uvs.len(),
            mesh.geometry.faces.len(),
            mesh.segments.len()
        );
        Ok(mesh)
    }

    /// Parse OBJ text
    pub fn parse_str(contents: &str) -> Result<Self, ObjError> {
        Self::from_reader(contents.as_bytes())
    }

    /// Parse OBJ text from any buffered reader
    ///
    /// Lines are decoded lossily, so stray non-UTF-8 bytes (typically in comments) do
    /// not fail the load.
    pub fn from_reader<R: BufRead>(mut reader: R) -> Result<Self, ObjError> {
        let mut mesh = Self::default();
        let mut state = ParseState::new();
        let mut buffer = Vec::new();
        let mut line = 0;

        loop {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer)? == 0 {
                break;
            }
            line += 1;

            let line_text = String::from_utf8_lossy(&buffer);
            let tokens = tokenize(&line_text);
            let Some(&directive) = tokens.first() else {
                continue;
            };

            match directive {
                "v" => mesh.geometry.parse_vertex(&tokens, line)?,
                "vn" => mesh.geometry.parse_normal(&tokens, line)?,
                "vt" => mesh.geometry.parse_uv(&tokens, line)?,
                "f" => mesh.parse_face(&mut state, &tokens, line)?,
                "g" => mesh.parse_group(&mut state, &tokens),
                "usemtl" => mesh.parse_material(&mut state, &tokens),
                _ => {}
            }
        }

        mesh.segments = state.finish();
        mesh.create_vao()?;
        Ok(mesh)
    }

    /// Assemble a mesh from already decoded parts and pack it
    ///
    /// Segments are used in the order given and must lie inside the packed buffer.
    pub fn from_parts(geometry: Geometry, segments: Vec<MeshSegment>) -> Result<Self, PackError> {
        let mut mesh = Self {
            geometry,
            segments,
            packed: PackedMesh::default(),
        };
        mesh.create_vao()?;

        let len = mesh.packed.len();
        for (index, segment) in mesh.segments.iter().enumerate() {
            let end = segment.start.checked_add(segment.num_verts);
            if end.map_or(true, |end| end > len) {
                return Err(PackError::SegmentOutOfRange {
                    segment: index,
                    start: segment.start,
                    num_verts: segment.num_verts,
                    len,
                });
            }
        }
        Ok(mesh)
    }

    /// Hand the packed buffer and its layout to a vertex array
    pub fn upload(&self, vao: &mut dyn VertexArray) {
        self.packed.upload(vao);
    }

    /// Draw one segment
    ///
    /// The segment's records are drawn straight out of the shared buffer uploaded by
    /// [`GroupedObj::upload`]. An out of range id draws nothing.
    pub fn draw(&self, mesh_id: usize, vao: &mut dyn VertexArray) {
        let Some(segment) = self.segments.get(mesh_id) else {
            log::warn!("draw: no segment {} (have {})", mesh_id, self.segments.len());
            return;
        };
        vao.bind();
        vao.draw_range(segment.start, segment.num_verts);
        vao.unbind();
    }

    /// Number of segments
    pub fn num_meshes(&self) -> usize {
        self.segments.len()
    }

    /// Segment `mesh_id`
    pub fn segment(&self, mesh_id: usize) -> Option<&MeshSegment> {
        self.segments.get(mesh_id)
    }

    /// All segments, sorted by material
    pub fn segments(&self) -> &[MeshSegment] {
        &self.segments
    }

    /// Material name of segment `mesh_id`
    pub fn material(&self, mesh_id: usize) -> Option<&str> {
        self.segment(mesh_id).map(|s| s.material.as_str())
    }

    /// Group name of segment `mesh_id`
    pub fn name(&self, mesh_id: usize) -> Option<&str> {
        self.segment(mesh_id).map(|s| s.name.as_str())
    }

    /// Decoded positions, normals, uvs and triangles
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// The packed vertex stream
    pub fn packed(&self) -> &PackedMesh {
        &self.packed
    }

    /// Number of triangles after quad splitting
    pub fn num_triangles(&self) -> usize {
        self.geometry.faces.len()
    }

    /// Bounds of the positions, `None` for an empty mesh
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.geometry.bounding_box()
    }

    /// One block per segment: name, material, vertex count and start
    pub fn debug_print(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            let _ = writeln!(out, "------------------------------------");
            let _ = writeln!(out, "Name {}", segment.name);
            let _ = writeln!(out, "Material {}", segment.material);
            let _ = writeln!(out, "Num verts {}", segment.num_verts);
            let _ = writeln!(out, "Start Index {}", segment.start);
        }
        let _ = writeln!(out, "------------------------------------");
        out
    }
}

impl MeshDirectives for GroupedObj {
    fn parse_face(&mut self, state: &mut ParseState, tokens: &[&str], line: usize) -> Result<(), ObjError> {
        let faces = face::decode_face(tokens, line)?;
        state.add_face_vertices(faces.len() * 3);
        self.geometry.faces.extend(faces);
        Ok(())
    }

    fn parse_group(&mut self, state: &mut ParseState, tokens: &[&str]) {
        state.on_group(tokens.get(1).copied());
    }

    fn parse_material(&mut self, state: &mut ParseState, tokens: &[&str]) {
        state.on_material(tokens.get(1).copied());
    }

    fn create_vao(&mut self) -> Result<(), PackError> {
        self.packed = PackedMesh::pack(&self.geometry)?;
        Ok(())
    }
}
