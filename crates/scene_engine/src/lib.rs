//! # Scene Engine
//!
//! Loading and drawing for grouped Wavefront OBJ scenes with MTL materials.
//!
//! ## Features
//!
//! - **Grouped OBJ loading**: one streaming pass, quads split into triangles, `g` and
//!   `usemtl` cut the faces into segments that are sorted by material
//! - **Packed vertex stream**: one interleaved position/normal/uv buffer per mesh
//! - **Material table**: MTL parsing with texture paths loaded once and shared
//! - **Binary caches**: `ngl::objbin` and `ngl::mtlbin` to skip text parsing
//! - **Viewer state**: camera, mouse controls and key commands for an interactive view
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ViewerConfig::default();
//!     let mut scene = Scene::load(&config)?;
//!     scene.load_textures(&mut ImageTextureLoader::new(config.scene.texture_root()));
//!
//!     let mut backend = RecordingBackend::new();
//!     let mut vao = RecordingVertexArray::new();
//!     scene.initialize(&mut backend, &mut vao);
//!     scene.render_frame(&mut backend, &mut vao);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod assets;
pub mod config;
pub mod core;
pub mod foundation;
pub mod input;
pub mod render;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{
            materials::{MaterialRecord, MaterialTable, MtlError, TextureSlot},
            obj::{GroupedObj, MeshSegment, ObjError, PackError, PackedMesh},
        },
        config::{Config, ConfigError},
        core::config::ViewerConfig,
        foundation::math::{Mat4, Mat4Ext, Vec2, Vec3},
        input::{command_for_key, KeyCode, MouseButton, MouseControls, ViewerCommand},
        render::{
            headless::{ImageTextureLoader, RecordingBackend, RecordingVertexArray},
            Camera, PolygonMode, RenderBackend, Scene, SceneError, TextureLoader, VertexArray,
        },
    };
}
