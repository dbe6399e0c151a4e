//! # Viewer Configuration
//!
//! Consolidates the configuration for the scene viewer: which files to load, how the
//! camera starts out, how strongly the mouse drives it, and a few render switches.
//!
//! ## Configuration Categories
//!
//! - **Scene Config**: OBJ/MTL paths and texture lookup root
//! - **Cache Config**: Optional binary caches that skip text parsing
//! - **Camera Config**: Initial eye/target/up and projection shape
//! - **Controls Config**: Mouse sensitivity for rotate, translate and zoom
//! - **Render Config**: Clear colour, initial texture map, missing-material policy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::assets::materials::TextureSlot;
pub use crate::config::{Config, ConfigError};

/// # Scene Configuration
///
/// Files that make up the scene.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Path to the Wavefront OBJ mesh
    pub obj_path: PathBuf,
    /// Path to the companion MTL material library
    pub mtl_path: PathBuf,
    /// Directory texture paths in the MTL file are relative to.
    /// Defaults to the directory containing the MTL file.
    pub texture_root: Option<PathBuf>,
}

impl SceneConfig {
    /// Directory used to resolve texture paths
    pub fn texture_root(&self) -> PathBuf {
        self.texture_root.clone().unwrap_or_else(|| {
            self.mtl_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default()
        })
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            obj_path: PathBuf::from("models/sponza.obj"),
            mtl_path: PathBuf::from("models/sponza.mtl"),
            texture_root: None,
        }
    }
}

/// # Cache Configuration
///
/// When enabled the viewer reads the binary caches if they exist and writes them after a
/// successful text load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether binary caches are used at all
    pub enabled: bool,
    /// Location of the `ngl::objbin` mesh cache
    pub obj_cache: PathBuf,
    /// Location of the `ngl::mtlbin` material cache
    pub mtl_cache: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            obj_cache: PathBuf::from("sponzaMesh.bin"),
            mtl_cache: PathBuf::from("sponzaMtl.bin"),
        }
    }
}

/// # Camera Configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye position
    pub from: [f32; 3],
    /// Look-at target
    pub to: [f32; 3],
    /// Up vector
    pub up: [f32; 3],
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Initial viewport width in pixels
    pub width: u32,
    /// Initial viewport height in pixels
    pub height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            from: [0.0, 40.0, -140.0],
            to: [0.0, 40.0, 0.0],
            up: [0.0, 1.0, 0.0],
            fov_degrees: 50.0,
            near: 10.0,
            far: 8000.0,
            width: 1024,
            height: 720,
        }
    }
}

/// # Controls Configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    /// Degrees of spin per pixel of left-drag
    pub rotation_sensitivity: f32,
    /// World units of translation per pixel of right-drag
    pub translate_increment: f32,
    /// World units moved along z per wheel notch
    pub zoom_step: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            rotation_sensitivity: 0.5,
            translate_increment: 2.0,
            zoom_step: 2.0,
        }
    }
}

/// # Render Configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Background colour (RGBA)
    pub clear_color: [f32; 4],
    /// Texture map bound when the viewer starts
    pub initial_texture_map: TextureSlot,
    /// Skip the draw call entirely for segments whose material is not in the table.
    /// When false the segment is drawn with whatever state is currently bound.
    pub skip_missing_materials: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.4, 0.4, 0.4, 1.0],
            initial_texture_map: TextureSlot::Ambient,
            skip_missing_materials: false,
        }
    }
}

/// # Complete Viewer Configuration
///
/// Top-level configuration that the `scene_viewer` binary loads from TOML or RON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    /// Log level filter (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,
    /// Scene files
    pub scene: SceneConfig,
    /// Binary caches
    pub cache: CacheConfig,
    /// Initial camera
    pub camera: CameraConfig,
    /// Mouse controls
    pub controls: ControlsConfig,
    /// Render switches
    pub render: RenderConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            scene: SceneConfig::default(),
            cache: CacheConfig::default(),
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl Config for ViewerConfig {}

impl ViewerConfig {
    /// Set the OBJ and MTL paths
    pub fn with_scene(mut self, obj_path: impl Into<PathBuf>, mtl_path: impl Into<PathBuf>) -> Self {
        self.scene.obj_path = obj_path.into();
        self.scene.mtl_path = mtl_path.into();
        self
    }

    /// Set the log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scene.obj_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("scene.obj_path cannot be empty".to_string()));
        }
        if self.scene.mtl_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("scene.mtl_path cannot be empty".to_string()));
        }
        if self.camera.near <= 0.0 {
            return Err(ConfigError::Invalid("camera.near must be positive".to_string()));
        }
        if self.camera.far <= self.camera.near {
            return Err(ConfigError::Invalid("camera.far must be greater than camera.near".to_string()));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(ConfigError::Invalid("camera viewport must be non-empty".to_string()));
        }
        Ok(())
    }
}
