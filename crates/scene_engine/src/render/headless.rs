//! Recording implementations of the graphics collaborators
//!
//! These stand in for a real context: the viewer binary renders through them when no
//! window is available, and tests inspect what was recorded.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use super::backend::{
    AttributePointer, PolygonMode, RenderBackend, TextureId, TextureLoadError, TextureLoader,
    VertexArray, UNBOUND_TEXTURE,
};
use crate::assets::image_loader::ImageData;
use crate::foundation::math::{Mat4, Vec3};

/// A vertex array that keeps everything it is given
#[derive(Debug, Default)]
pub struct RecordingVertexArray {
    bound: bool,
    data: Vec<u8>,
    pointers: Vec<AttributePointer>,
    num_indices: usize,
    draws: Vec<(usize, usize)>,
}

impl RecordingVertexArray {
    /// Create an empty array
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the array is currently bound
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Bytes last passed to `set_data`
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Attribute pointers in the order they were set
    pub fn attribute_pointers(&self) -> &[AttributePointer] {
        &self.pointers
    }

    /// Value last passed to `set_num_indices`
    pub fn num_indices(&self) -> usize {
        self.num_indices
    }

    /// `(start, count)` of every draw call so far
    pub fn draws(&self) -> &[(usize, usize)] {
        &self.draws
    }

    /// Forget recorded draw calls, keeping the uploaded data
    pub fn clear_draws(&mut self) {
        self.draws.clear();
    }
}

impl VertexArray for RecordingVertexArray {
    fn bind(&mut self) {
        self.bound = true;
    }

    fn unbind(&mut self) {
        self.bound = false;
    }

    fn set_data(&mut self, data: &[u8]) {
        self.data = data.to_vec();
        self.pointers.clear();
    }

    fn set_vertex_attribute_pointer(&mut self, pointer: AttributePointer) {
        self.pointers.push(pointer);
    }

    fn set_num_indices(&mut self, count: usize) {
        self.num_indices = count;
    }

    fn draw_range(&mut self, start: usize, count: usize) {
        if !self.bound {
            log::warn!("draw_range({}, {}) on an unbound vertex array", start, count);
        }
        self.draws.push((start, count));
    }
}

/// A render state change seen by [`RecordingBackend`]
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// `clear`
    Clear([f32; 4]),
    /// `set_viewport`
    Viewport(u32, u32),
    /// `bind_texture`
    BindTexture(TextureId),
    /// `set_uniform_mat4`
    UniformMat4(String, Mat4),
    /// `set_uniform_vec3`
    UniformVec3(String, Vec3),
    /// `set_uniform_f32`
    UniformF32(String, f32),
    /// `set_polygon_mode`
    PolygonMode(PolygonMode),
}

/// A render backend that records every call
#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<RenderCommand>,
}

impl RecordingBackend {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Textures bound, in order
    pub fn bound_textures(&self) -> Vec<TextureId> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::BindTexture(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Last value set for a `vec3` uniform
    pub fn last_vec3(&self, name: &str) -> Option<Vec3> {
        self.commands.iter().rev().find_map(|c| match c {
            RenderCommand::UniformVec3(n, v) if n == name => Some(*v),
            _ => None,
        })
    }

    /// Last value set for a `float` uniform
    pub fn last_f32(&self, name: &str) -> Option<f32> {
        self.commands.iter().rev().find_map(|c| match c {
            RenderCommand::UniformF32(n, v) if n == name => Some(*v),
            _ => None,
        })
    }

    /// Last value set for a `mat4` uniform
    pub fn last_mat4(&self, name: &str) -> Option<Mat4> {
        self.commands.iter().rev().find_map(|c| match c {
            RenderCommand::UniformMat4(n, v) if n == name => Some(*v),
            _ => None,
        })
    }

    /// Drop recorded commands
    pub fn reset(&mut self) {
        self.commands.clear();
    }
}

impl RenderBackend for RecordingBackend {
    fn clear(&mut self, color: [f32; 4]) {
        self.commands.push(RenderCommand::Clear(color));
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.commands.push(RenderCommand::Viewport(width, height));
    }

    fn bind_texture(&mut self, texture: TextureId) {
        self.commands.push(RenderCommand::BindTexture(texture));
    }

    fn set_uniform_mat4(&mut self, name: &str, value: &Mat4) {
        self.commands.push(RenderCommand::UniformMat4(name.to_string(), *value));
    }

    fn set_uniform_vec3(&mut self, name: &str, value: &Vec3) {
        self.commands.push(RenderCommand::UniformVec3(name.to_string(), *value));
    }

    fn set_uniform_f32(&mut self, name: &str, value: f32) {
        self.commands.push(RenderCommand::UniformF32(name.to_string(), value));
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.commands.push(RenderCommand::PolygonMode(mode));
    }
}

/// Hands out sequential handles without touching the filesystem
///
/// Paths registered with [`SequentialTextureLoader::with_missing`] fail to load.
#[derive(Debug)]
pub struct SequentialTextureLoader {
    next_id: TextureId,
    requests: Vec<PathBuf>,
    missing: BTreeSet<PathBuf>,
}

impl Default for SequentialTextureLoader {
    fn default() -> Self {
        Self {
            next_id: UNBOUND_TEXTURE + 1,
            requests: Vec::new(),
            missing: BTreeSet::new(),
        }
    }
}

impl SequentialTextureLoader {
    /// Create a loader whose first handle is 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Make loads of `path` fail
    pub fn with_missing(mut self, path: impl Into<PathBuf>) -> Self {
        self.missing.insert(path.into());
        self
    }

    /// Every path that was requested, in order
    pub fn requests(&self) -> &[PathBuf] {
        &self.requests
    }
}

impl TextureLoader for SequentialTextureLoader {
    fn load_texture(&mut self, path: &Path) -> Result<TextureId, TextureLoadError> {
        self.requests.push(path.to_path_buf());
        if self.missing.contains(path) {
            return Err(TextureLoadError::NotFound(path.to_path_buf()));
        }
        let id = self.next_id;
        self.next_id += 1;
        Ok(id)
    }
}

/// Decodes texture files with the `image` crate and keeps the pixels on the CPU
///
/// Relative paths are resolved against the root directory given at construction,
/// normally the directory holding the MTL file. Pixels are stored bottom row first,
/// matching the OBJ texture coordinate origin.
#[derive(Debug)]
pub struct ImageTextureLoader {
    root: PathBuf,
    next_id: TextureId,
    images: BTreeMap<TextureId, ImageData>,
}

impl ImageTextureLoader {
    /// Create a loader resolving paths against `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            next_id: UNBOUND_TEXTURE + 1,
            images: BTreeMap::new(),
        }
    }

    /// Decoded image for a handle
    pub fn image(&self, id: TextureId) -> Option<&ImageData> {
        self.images.get(&id)
    }

    /// Number of textures decoded
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether nothing has been decoded
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Total decoded bytes held
    pub fn memory_usage(&self) -> usize {
        self.images.values().map(ImageData::size_bytes).sum()
    }
}

impl TextureLoader for ImageTextureLoader {
    fn load_texture(&mut self, path: &Path) -> Result<TextureId, TextureLoadError> {
        let full_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        let image = ImageData::from_file(&full_path)?.flipped_vertically();
        let id = self.next_id;
        self.next_id += 1;
        self.images.insert(id, image);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_array_records_draws() {
        let mut vao = RecordingVertexArray::new();
        vao.bind();
        vao.draw_range(3, 6);
        vao.unbind();
        assert_eq!(vao.draws(), &[(3, 6)]);
        assert!(!vao.is_bound());
    }

    #[test]
    fn test_backend_queries() {
        let mut backend = RecordingBackend::new();
        backend.bind_texture(4);
        backend.set_uniform_vec3("ka", &Vec3::new(1.0, 0.0, 0.0));
        backend.set_uniform_f32("transp", 0.5);
        backend.set_uniform_f32("transp", 1.0);

        assert_eq!(backend.bound_textures(), vec![4]);
        assert_eq!(backend.last_vec3("ka"), Some(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(backend.last_f32("transp"), Some(1.0));
        assert_eq!(backend.last_mat4("MVP"), None);
    }

    #[test]
    fn test_sequential_loader() {
        let mut loader = SequentialTextureLoader::new().with_missing("gone.png");
        assert_eq!(loader.load_texture(Path::new("a.png")).unwrap(), 1);
        assert_eq!(loader.load_texture(Path::new("b.png")).unwrap(), 2);
        assert!(loader.load_texture(Path::new("gone.png")).is_err());
        assert_eq!(loader.requests().len(), 3);
    }

    #[test]
    fn test_image_loader_decodes_png() {
        let dir = tempfile::tempdir().unwrap();
        image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 255, 0, 255]))
            .save(dir.path().join("green.png"))
            .unwrap();

        let mut loader = ImageTextureLoader::new(dir.path());
        let id = loader.load_texture(Path::new("green.png")).unwrap();
        assert_ne!(id, UNBOUND_TEXTURE);
        let image = loader.image(id).unwrap();
        assert_eq!((image.width, image.height), (2, 2));
        assert_eq!(loader.memory_usage(), 16);
    }

    #[test]
    fn test_image_loader_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = ImageTextureLoader::new(dir.path());
        assert!(matches!(
            loader.load_texture(Path::new("nope.png")),
            Err(TextureLoadError::NotFound(_))
        ));
        assert!(loader.is_empty());
    }
}
