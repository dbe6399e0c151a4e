//! Core viewer configuration

pub mod config;

pub use config::{CacheConfig, CameraConfig, ControlsConfig, RenderConfig, SceneConfig, ViewerConfig};
