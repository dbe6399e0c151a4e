//! Contracts for the graphics collaborators
//!
//! The loaders and the scene never talk to a graphics API directly. They drive these
//! traits, which a windowed application implements over its GL/Vulkan context and
//! which [`crate::render::headless`] implements by recording calls.
//!
//! All three collaborators must be driven from the thread that owns the graphics
//! context, so none of the traits require `Send`.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::foundation::math::{Mat4, Vec3};

/// Opaque device texture handle
pub type TextureId = u32;

/// Handle value meaning "no texture"
pub const UNBOUND_TEXTURE: TextureId = 0;

/// Component type of a vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    /// 32-bit float
    Float,
}

impl ElementType {
    /// Size of one component in bytes
    pub const fn size(self) -> usize {
        match self {
            Self::Float => std::mem::size_of::<f32>(),
        }
    }
}

/// One `set_vertex_attribute_pointer` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributePointer {
    /// Shader attribute location
    pub index: u32,
    /// Components per vertex
    pub components: u32,
    /// Component type
    pub element_type: ElementType,
    /// Distance between consecutive records, in bytes
    pub stride: usize,
    /// Offset of the first component inside a record, in bytes
    pub offset: usize,
}

/// Rasterisation mode toggled by the viewer's W/S keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolygonMode {
    /// Filled triangles
    #[default]
    Fill,
    /// Wireframe
    Line,
}

/// A buffer object holding one interleaved vertex stream
pub trait VertexArray {
    /// Make this array current
    fn bind(&mut self);

    /// Release this array
    fn unbind(&mut self);

    /// Replace the buffer contents
    fn set_data(&mut self, data: &[u8]);

    /// Describe one attribute inside the interleaved records
    fn set_vertex_attribute_pointer(&mut self, pointer: AttributePointer);

    /// Number of records a full draw covers
    fn set_num_indices(&mut self, count: usize);

    /// Draw `count` records starting at record `start` as triangles
    fn draw_range(&mut self, start: usize, count: usize);
}

/// Error raised when a texture file cannot be turned into a device texture
#[derive(Error, Debug)]
pub enum TextureLoadError {
    /// The file does not exist
    #[error("Texture file {0:?} not found")]
    NotFound(PathBuf),

    /// The file could not be decoded
    #[error("Failed to decode texture {path:?}: {message}")]
    Decode {
        /// Path that was loaded
        path: PathBuf,
        /// Decoder message
        message: String,
    },
}

/// Turns a texture path into a device handle
pub trait TextureLoader {
    /// Load the texture at `path` and return its handle
    fn load_texture(&mut self, path: &Path) -> Result<TextureId, TextureLoadError>;
}

/// Per-frame device state used by the scene renderer
pub trait RenderBackend {
    /// Clear the colour and depth buffers
    fn clear(&mut self, color: [f32; 4]);

    /// Set the viewport size in pixels
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Bind a texture to unit 0; [`UNBOUND_TEXTURE`] unbinds
    fn bind_texture(&mut self, texture: TextureId);

    /// Set a `mat4` uniform on the active shader
    fn set_uniform_mat4(&mut self, name: &str, value: &Mat4);

    /// Set a `vec3` uniform on the active shader
    fn set_uniform_vec3(&mut self, name: &str, value: &Vec3);

    /// Set a `float` uniform on the active shader
    fn set_uniform_f32(&mut self, name: &str, value: f32);

    /// Switch between filled and wireframe rasterisation
    fn set_polygon_mode(&mut self, mode: PolygonMode);
}
