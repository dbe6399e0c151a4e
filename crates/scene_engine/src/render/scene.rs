//! # Scene
//!
//! Ties a loaded [`GroupedObj`] and its [`MaterialTable`] to the camera, the mouse
//! controls and the per-frame draw loop.
//!
//! Each frame walks the material-sorted segments in order. A segment whose material is
//! missing from the table is logged and either skipped or drawn with whatever state is
//! bound, depending on [`RenderConfig::skip_missing_materials`]. Texture and material
//! uniforms are only re-sent when the material name changes from the previous segment,
//! which the material sort makes rare.

use std::path::Path;
use thiserror::Error;

use super::backend::{PolygonMode, RenderBackend, TextureLoadError, TextureLoader, VertexArray};
use super::camera::Camera;
use crate::assets::binary::BinaryError;
use crate::assets::materials::{MaterialTable, MtlError, TextureLoadSummary, TextureSlot};
use crate::assets::obj::{GroupedObj, ObjError};
use crate::core::config::{CacheConfig, RenderConfig, ViewerConfig};
use crate::input::{command_for_key, KeyCode, MouseControls, ViewerCommand};

/// Name of the model-view-projection uniform
pub const MVP_UNIFORM: &str = "MVP";
/// Name of the ambient colour uniform
pub const AMBIENT_UNIFORM: &str = "ka";
/// Name of the dissolve uniform
pub const TRANSPARENCY_UNIFORM: &str = "transp";

/// Errors raised while loading a scene
#[derive(Error, Debug)]
pub enum SceneError {
    /// Mesh load failed
    #[error("Mesh error: {0}")]
    Mesh(#[from] ObjError),

    /// Material load failed
    #[error("Material error: {0}")]
    Material(#[from] MtlError),

    /// A binary cache could not be written or read
    #[error("Cache error: {0}")]
    Cache(#[from] BinaryError),

    /// A texture could not be loaded
    #[error("Texture error: {0}")]
    Texture(#[from] TextureLoadError),
}

/// What one call to [`Scene::render_frame`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Segments drawn
    pub draws: usize,
    /// Segments whose material was not in the table
    pub missing_materials: usize,
    /// Times texture and material uniforms were re-sent
    pub material_switches: usize,
}

/// A loaded mesh with its materials and view state
#[derive(Debug, Clone)]
pub struct Scene {
    mesh: GroupedObj,
    materials: MaterialTable,
    camera: Camera,
    controls: MouseControls,
    render: RenderConfig,
    texture_map: TextureSlot,
    polygon_mode: PolygonMode,
    fullscreen: bool,
    viewport: (u32, u32),
}

impl Scene {
    /// Build a scene from an already loaded mesh and material table
    pub fn new(mesh: GroupedObj, materials: MaterialTable, config: &ViewerConfig) -> Self {
        Self {
            mesh,
            materials,
            camera: Camera::from_config(&config.camera),
            controls: MouseControls::new(config.controls.clone()),
            render: config.render.clone(),
            texture_map: config.render.initial_texture_map,
            polygon_mode: PolygonMode::Fill,
            fullscreen: false,
            viewport: (config.camera.width, config.camera.height),
        }
    }

    /// Load the materials and mesh named in `config`
    ///
    /// With caching enabled an existing cache is preferred over the text file, and a
    /// text load refreshes the cache. Cache problems only produce warnings. Textures
    /// are not loaded here; see [`Scene::load_textures`].
    pub fn load(config: &ViewerConfig) -> Result<Self, SceneError> {
        let materials = load_materials(&config.scene.mtl_path, &config.cache)?;
        let mesh = load_mesh(&config.scene.obj_path, &config.cache)?;
        Ok(Self::new(mesh, materials, config))
    }

    /// Resolve every texture path in the material table
    pub fn load_textures(&mut self, loader: &mut impl TextureLoader) -> TextureLoadSummary {
        self.materials.load_textures(loader)
    }

    /// Upload the packed mesh and set initial device state
    pub fn initialize(&self, backend: &mut dyn RenderBackend, vao: &mut dyn VertexArray) {
        self.mesh.upload(vao);
        backend.set_viewport(self.viewport.0, self.viewport.1);
        backend.set_polygon_mode(self.polygon_mode);
        log::info!(
            "Scene ready: {} segments, {} materials, texture map {:?}",
            self.mesh.num_meshes(),
            self.materials.len(),
            self.texture_map
        );
    }

    /// Draw every segment once
    pub fn render_frame(&self, backend: &mut dyn RenderBackend, vao: &mut dyn VertexArray) -> FrameStats {
        let mut stats = FrameStats::default();
        backend.clear(self.render.clear_color);

        let mvp = self.camera.view_projection_matrix() * self.controls.global_transform();
        backend.set_uniform_mat4(MVP_UNIFORM, &mvp);

        let mut current_material: Option<&str> = None;
        for (mesh_id, segment) in self.mesh.segments().iter().enumerate() {
            match self.materials.find(&segment.material) {
                Some(material) => {
                    if current_material != Some(segment.material.as_str()) {
                        backend.bind_texture(material.texture(self.texture_map));
                        backend.set_uniform_vec3(AMBIENT_UNIFORM, &material.ka);
                        backend.set_uniform_f32(TRANSPARENCY_UNIFORM, material.d);
                        current_material = Some(segment.material.as_str());
                        stats.material_switches += 1;
                    }
                }
                None => {
                    log::warn!("Material {} not found for segment {}", segment.material, segment.name);
                    stats.missing_materials += 1;
                    if self.render.skip_missing_materials {
                        continue;
                    }
                }
            }
            self.mesh.draw(mesh_id, vao);
            stats.draws += 1;
        }

        log::trace!("Frame: {:?}", stats);
        stats
    }

    /// React to a window resize
    pub fn resize(&mut self, backend: &mut dyn RenderBackend, width: u32, height: u32) {
        self.viewport = (width, height);
        self.camera.resize(width, height);
        backend.set_viewport(width, height);
    }

    /// Apply a viewer command; returns `false` once the viewer should quit
    pub fn apply_command(&mut self, backend: &mut dyn RenderBackend, command: ViewerCommand) -> bool {
        match command {
            ViewerCommand::Quit => {
                log::info!("Quit requested");
                return false;
            }
            ViewerCommand::SetPolygonMode(mode) => {
                self.polygon_mode = mode;
                backend.set_polygon_mode(mode);
            }
            ViewerCommand::SetFullscreen(fullscreen) => self.fullscreen = fullscreen,
            ViewerCommand::SelectTextureMap(slot) => {
                log::debug!("Texture map {:?}", slot);
                self.texture_map = slot;
            }
        }
        true
    }

    /// Look up and apply the command bound to `key`
    pub fn key_press(&mut self, backend: &mut dyn RenderBackend, key: KeyCode) -> bool {
        command_for_key(key).map_or(true, |command| self.apply_command(backend, command))
    }

    /// The mesh
    pub fn mesh(&self) -> &GroupedObj {
        &self.mesh
    }

    /// The material table
    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    /// The camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mouse controls, for feeding window events
    pub fn controls_mut(&mut self) -> &mut MouseControls {
        &mut self.controls
    }

    /// Mouse controls
    pub fn controls(&self) -> &MouseControls {
        &self.controls
    }

    /// Texture map bound for each material
    pub fn texture_map(&self) -> TextureSlot {
        self.texture_map
    }

    /// Current rasterisation mode
    pub fn polygon_mode(&self) -> PolygonMode {
        self.polygon_mode
    }

    /// Whether the window should be fullscreen
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Current viewport size
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }
}

fn load_materials(mtl_path: &Path, cache: &CacheConfig) -> Result<MaterialTable, SceneError> {
    if cache.enabled && cache.mtl_cache.exists() {
        match MaterialTable::load_binary(&cache.mtl_cache) {
            Ok(table) => return Ok(table),
            Err(e) => log::warn!("Ignoring material cache {:?}: {}", cache.mtl_cache, e),
        }
    }

    let table = MaterialTable::load(mtl_path)?;
    if cache.enabled {
        if let Err(e) = table.save_binary(&cache.mtl_cache) {
            log::warn!("Could not write material cache {:?}: {}", cache.mtl_cache, e);
        }
    }
    Ok(table)
}

fn load_mesh(obj_path: &Path, cache: &CacheConfig) -> Result<GroupedObj, SceneError> {
    if cache.enabled && cache.obj_cache.exists() {
        match GroupedObj::load_binary(&cache.obj_cache) {
            Ok(mesh) => return Ok(mesh),
            Err(e) => log::warn!("Ignoring mesh cache {:?}: {}", cache.obj_cache, e),
        }
    }

    let mesh = GroupedObj::load(obj_path)?;
    if cache.enabled {
        if let Err(e) = mesh.save_binary(&cache.obj_cache) {
            log::warn!("Could not write mesh cache {:?}: {}", cache.obj_cache, e);
        }
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::headless::{RecordingBackend, RecordingVertexArray, RenderCommand, SequentialTextureLoader};

    const MESH: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
g floor
usemtl stone
f 1 2 3 4
g lamp
usemtl brass
f 1 2 3
g ghost
usemtl unobtainium
f 2 3 4
g wall
usemtl stone
f 1 3 4
";

    const MATERIALS: &str = "\
newmtl stone
Ka 0.1 0.1 0.1
d 1
map_Ka stone_ka.png
map_Kd stone_kd.png

newmtl brass
Ka 0.5 0.4 0.1
d 0.25
map_Ka brass_ka.png
";

    fn scene(config: &ViewerConfig) -> Scene {
        let mesh = GroupedObj::parse_str(MESH).unwrap();
        let mut materials = MaterialTable::parse_str(MATERIALS).unwrap();
        materials.load_textures(&mut SequentialTextureLoader::new());
        Scene::new(mesh, materials, config)
    }

    #[test]
    fn test_material_switches_only_on_name_change() {
        let scene = scene(&ViewerConfig::default());
        let mut backend = RecordingBackend::new();
        let mut vao = RecordingVertexArray::new();
        scene.initialize(&mut backend, &mut vao);

        let stats = scene.render_frame(&mut backend, &mut vao);
        // brass, stone, stone, unobtainium
        assert_eq!(stats.draws, 4);
        assert_eq!(stats.missing_materials, 1);
        assert_eq!(stats.material_switches, 2);
        assert_eq!(vao.draws().len(), 4);

        // ids follow sorted paths: brass_ka 1, stone_ka 2, stone_kd 3
        assert_eq!(backend.bound_textures(), vec![1, 2]);
        assert_eq!(backend.last_vec3(AMBIENT_UNIFORM), Some(Vec3::new(0.1, 0.1, 0.1)));
    }

    #[test]
    fn test_missing_material_can_skip_draw() {
        let mut config = ViewerConfig::default();
        config.render.skip_missing_materials = true;
        let scene = scene(&config);
        let mut backend = RecordingBackend::new();
        let mut vao = RecordingVertexArray::new();
        scene.initialize(&mut backend, &mut vao);

        let stats = scene.render_frame(&mut backend, &mut vao);
        assert_eq!(stats.draws, 3);
        assert_eq!(stats.missing_materials, 1);
        assert!(!vao.draws().contains(&(9, 3)));
    }

    #[test]
    fn test_transparency_from_dissolve() {
        let scene = scene(&ViewerConfig::default());
        let mut backend = RecordingBackend::new();
        let mut vao = RecordingVertexArray::new();
        scene.render_frame(&mut backend, &mut vao);

        let transp: Vec<f32> = backend
            .commands()
            .iter()
            .filter_map(|c| match c {
                RenderCommand::UniformF32(name, v) if name == TRANSPARENCY_UNIFORM => Some(*v),
                _ => None,
            })
            .collect();
        assert_eq!(transp, vec![0.25, 1.0]);
    }

    #[test]
    fn test_texture_map_selection() {
        let mut scene = scene(&ViewerConfig::default());
        let mut backend = RecordingBackend::new();
        let mut vao = RecordingVertexArray::new();

        assert!(scene.key_press(&mut backend, KeyCode::Key2));
        assert_eq!(scene.texture_map(), TextureSlot::Diffuse);
        scene.render_frame(&mut backend, &mut vao);

        // brass has no diffuse map, stone_kd is id 3
        assert_eq!(backend.bound_textures(), vec![0, 3]);
    }

    #[test]
    fn test_key_commands_update_state() {
        let mut scene = scene(&ViewerConfig::default());
        let mut backend = RecordingBackend::new();

        assert!(scene.key_press(&mut backend, KeyCode::W));
        assert_eq!(scene.polygon_mode(), PolygonMode::Line);
        assert_eq!(backend.commands(), &[RenderCommand::PolygonMode(PolygonMode::Line)]);

        assert!(scene.key_press(&mut backend, KeyCode::F));
        assert!(scene.is_fullscreen());
        assert!(scene.key_press(&mut backend, KeyCode::Other));
        assert!(!scene.key_press(&mut backend, KeyCode::Escape));
    }

    #[test]
    fn test_mvp_includes_mouse_transform() {
        let mut scene = scene(&ViewerConfig::default());
        let mut backend = RecordingBackend::new();
        let mut vao = RecordingVertexArray::new();

        scene.render_frame(&mut backend, &mut vao);
        let still = backend.last_mat4(MVP_UNIFORM).unwrap();
        assert_eq!(still, scene.camera().view_projection_matrix());

        scene.controls_mut().wheel(1.0);
        scene.render_frame(&mut backend, &mut vao);
        assert_ne!(backend.last_mat4(MVP_UNIFORM).unwrap(), still);
    }

    #[test]
    fn test_resize_updates_camera_and_viewport() {
        let mut scene = scene(&ViewerConfig::default());
        let mut backend = RecordingBackend::new();
        scene.resize(&mut backend, 640, 480);

        assert_eq!(scene.viewport(), (640, 480));
        approx::assert_relative_eq!(scene.camera().aspect, 640.0 / 480.0);
        assert_eq!(backend.commands(), &[RenderCommand::Viewport(640, 480)]);
    }

    #[test]
    fn test_load_writes_and_prefers_caches() {
        let dir = tempfile::tempdir().unwrap();
        let obj_path = dir.path().join("scene.obj");
        let mtl_path = dir.path().join("scene.mtl");
        std::fs::write(&obj_path, MESH).unwrap();
        std::fs::write(&mtl_path, MATERIALS).unwrap();

        let mut config = ViewerConfig::default().with_scene(&obj_path, &mtl_path);
        config.cache.enabled = true;
        config.cache.obj_cache = dir.path().join("mesh.bin");
        config.cache.mtl_cache = dir.path().join("mtl.bin");

        let first = Scene::load(&config).unwrap();
        assert!(config.cache.obj_cache.exists());
        assert!(config.cache.mtl_cache.exists());

        // With the text files gone the caches alone must be enough
        std::fs::remove_file(&obj_path).unwrap();
        std::fs::remove_file(&mtl_path).unwrap();
        let second = Scene::load(&config).unwrap();
        assert_eq!(second.mesh(), first.mesh());
        assert_eq!(second.materials(), first.materials());
    }

    #[test]
    fn test_load_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mtl_path = dir.path().join("scene.mtl");
        std::fs::write(&mtl_path, MATERIALS).unwrap();

        let config = ViewerConfig::default().with_scene(dir.path().join("nope.obj"), &mtl_path);
        assert!(matches!(
            Scene::load(&config),
            Err(SceneError::Mesh(ObjError::FileNotFound(_)))
        ));

        let config = ViewerConfig::default().with_scene(dir.path().join("nope.obj"), dir.path().join("nope.mtl"));
        assert!(matches!(
            Scene::load(&config),
            Err(SceneError::Material(MtlError::FileNotFound(_)))
        ));
    }
}
