//! Errors raised while loading and packing OBJ meshes

use std::path::PathBuf;
use thiserror::Error;

use crate::assets::binary::BinaryError;

/// Errors generated when loading an OBJ file
#[derive(Error, Debug)]
pub enum ObjError {
    /// The OBJ file does not exist
    #[error("OBJ file {0:?} not found")]
    FileNotFound(PathBuf),

    /// IO error while reading the OBJ text
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A coordinate or index token is not a number
    #[error("line {line}: could not parse '{token}' in '{directive}' directive")]
    NumericParse {
        /// 1-based line number
        line: usize,
        /// The directive being parsed (`v`, `vn`, `vt`, `f`)
        directive: String,
        /// The offending token
        token: String,
    },

    /// A face index of zero; OBJ indices start at 1
    #[error("line {line}: face index '{token}' is not a valid 1-based index")]
    InvalidIndex {
        /// 1-based line number
        line: usize,
        /// The offending vertex spec
        token: String,
    },

    /// A directive carries fewer values than it needs
    #[error("line {line}: '{directive}' needs {expected} values, found {found}")]
    Truncated {
        /// 1-based line number
        line: usize,
        /// The directive being parsed
        directive: String,
        /// Minimum number of values
        expected: usize,
        /// Number of values present
        found: usize,
    },

    /// A face with fewer than 3 or more than 4 vertices
    #[error("line {line}: faces must have 3 or 4 vertices, found {vertex_count}")]
    UnsupportedTopology {
        /// 1-based line number
        line: usize,
        /// Number of vertex specs on the face
        vertex_count: usize,
    },

    /// The parsed geometry could not be packed for upload
    #[error("Could not pack mesh: {0}")]
    Pack(#[from] PackError),

    /// The `ngl::objbin` cache could not be read
    #[error("Mesh cache error: {0}")]
    Cache(#[from] BinaryError),
}

/// Errors generated when packing faces into the interleaved vertex buffer
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PackError {
    /// A face reached the packer without being triangulated
    #[error("face {face} has {vertex_count} vertices; only triangles can be packed")]
    NonTriangularFace {
        /// Index of the face in the face list
        face: usize,
        /// Its vertex count
        vertex_count: usize,
    },

    /// A face references an attribute that does not exist
    #[error("face {face} references {attribute} {index} but only {len} exist")]
    IndexOutOfRange {
        /// Index of the face in the face list
        face: usize,
        /// Which attribute array was indexed
        attribute: &'static str,
        /// The 0-based index
        index: usize,
        /// Length of the attribute array
        len: usize,
    },

    /// A segment covers records past the end of the packed buffer
    #[error("segment {segment} covers records {start}..+{num_verts} but only {len} were packed")]
    SegmentOutOfRange {
        /// Index of the segment in the segment table
        segment: usize,
        /// First record of the segment
        start: usize,
        /// Records in the segment
        num_verts: usize,
        /// Records in the packed buffer
        len: usize,
    },
}
