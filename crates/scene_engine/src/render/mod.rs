//! Rendering
//!
//! The graphics collaborator traits, their recording implementations, the camera and
//! the material-sorted scene draw loop.

pub mod backend;
pub mod camera;
pub mod headless;
pub mod scene;

pub use backend::{
    AttributePointer, ElementType, PolygonMode, RenderBackend, TextureId, TextureLoadError, TextureLoader,
    VertexArray, UNBOUND_TEXTURE,
};
pub use camera::Camera;
pub use scene::{FrameStats, Scene, SceneError};
