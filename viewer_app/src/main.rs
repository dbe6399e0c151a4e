//! Scene viewer
//!
//! Loads the OBJ/MTL pair named in a viewer configuration file (TOML or RON), resolves
//! the textures, uploads the packed mesh and renders one frame through the recording
//! backend. The segment table and a frame summary are printed to stdout.
//!
//! ```text
//! scene_viewer [viewer.toml]
//! ```

use scene_engine::config::{Config, ConfigError};
use scene_engine::core::config::ViewerConfig;
use scene_engine::foundation::logging;
use scene_engine::render::headless::{ImageTextureLoader, RecordingBackend, RecordingVertexArray};
use scene_engine::render::{FrameStats, Scene, SceneError};
use thiserror::Error;

/// Errors that stop the viewer
#[derive(Error, Debug)]
enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

/// Headless viewer: a scene plus the recording device it draws into
struct ViewerApp {
    scene: Scene,
    backend: RecordingBackend,
    vao: RecordingVertexArray,
}

impl ViewerApp {
    fn new(config: &ViewerConfig) -> Result<Self, AppError> {
        log::info!("Loading scene {:?} with {:?}", config.scene.obj_path, config.scene.mtl_path);
        let mut scene = Scene::load(config)?;

        let mut loader = ImageTextureLoader::new(config.scene.texture_root());
        let summary = scene.load_textures(&mut loader);
        log::info!(
            "Textures: {} loaded, {} failed, {} bytes decoded",
            summary.loaded,
            summary.failed,
            loader.memory_usage()
        );

        if let Some(bounds) = scene.mesh().bounding_box() {
            let center = bounds.center();
            let size = bounds.size();
            log::info!(
                "Mesh bounds: center ({:.2}, {:.2}, {:.2}), size ({:.2}, {:.2}, {:.2})",
                center.x,
                center.y,
                center.z,
                size.x,
                size.y,
                size.z
            );
        }

        Ok(Self {
            scene,
            backend: RecordingBackend::new(),
            vao: RecordingVertexArray::new(),
        })
    }

    fn run(&mut self) -> FrameStats {
        self.scene.initialize(&mut self.backend, &mut self.vao);
        let stats = self.scene.render_frame(&mut self.backend, &mut self.vao);
        log::debug!("Recorded {} render commands", self.backend.commands().len());
        stats
    }

    fn report(&self, stats: FrameStats) -> String {
        let mesh = self.scene.mesh();
        let mut report = mesh.debug_print();
        report.push_str(&format!(
            "{} triangles, {} segments, {} materials\n",
            mesh.num_triangles(),
            mesh.num_meshes(),
            self.scene.materials().len()
        ));
        report.push_str(&format!(
            "Frame: {} draws, {} material switches, {} missing materials\n",
            stats.draws, stats.material_switches, stats.missing_materials
        ));
        report
    }
}

fn load_config() -> Result<ViewerConfig, AppError> {
    let config = match std::env::args().nth(1) {
        Some(path) => ViewerConfig::load_from_file(&path)?,
        None => ViewerConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Install `env_logger`, `RUST_LOG` directives refining the configured level
fn init_logging(level: &str) -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_default_env()
        .filter_level(logging::parse_level(level))
        .try_init()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    init_logging(&config.log_level)?;
    log::info!("Starting scene viewer");

    let mut app = ViewerApp::new(&config)?;
    let stats = app.run();
    print!("{}", app.report(stats));

    if log::log_enabled!(log::Level::Debug) {
        log::debug!("Materials:\n{}", app.scene.materials().debug_print());
    }
    log::info!("Scene viewer finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewer_renders_scene_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let obj_path = dir.path().join("room.obj");
        let mtl_path = dir.path().join("room.mtl");
        std::fs::write(
            &obj_path,
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\ng walls\nusemtl plaster\nf 1 2 3 4\n",
        )
        .unwrap();
        std::fs::write(&mtl_path, "newmtl plaster\nKa 0.5 0.5 0.5\nmap_Kd missing.png\n").unwrap();

        let config = ViewerConfig::default().with_scene(&obj_path, &mtl_path);
        let mut app = ViewerApp::new(&config).unwrap();
        let stats = app.run();

        assert_eq!(stats.draws, 1);
        let report = app.report(stats);
        assert!(report.contains("Name walls\nMaterial plaster\nNum verts 6\nStart Index 0"));
        assert!(report.contains("2 triangles, 1 segments, 1 materials"));
    }

    #[test]
    fn test_logger_installs_once() {
        let _ = init_logging("debug");
        assert!(init_logging("warn").is_err());
    }

    #[test]
    fn test_missing_mesh_is_an_error() {
        let config = ViewerConfig::default().with_scene("does/not/exist.obj", "does/not/exist.mtl");
        assert!(matches!(ViewerApp::new(&config), Err(AppError::Scene(_))));
    }
}
