//! Named material records and their texture handles
//!
//! The table owns every record by value. Texture paths are resolved once each through a
//! [`TextureLoader`] and the resulting handle is written back into every record that
//! names that path.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::mtl_parser::{MtlError, MtlParser};
use crate::foundation::math::Vec3;
use crate::render::backend::{TextureId, TextureLoader, UNBOUND_TEXTURE};

/// The texture maps that get a device handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureSlot {
    /// `map_Ka`
    Ambient,
    /// `map_Kd`
    Diffuse,
    /// `map_d`
    Dissolve,
    /// `map_bump`
    MapBump,
    /// `bump`
    Bump,
}

impl TextureSlot {
    /// All slots, in record storage order
    pub const ALL: [Self; 5] = [Self::Ambient, Self::Diffuse, Self::Dissolve, Self::MapBump, Self::Bump];

    /// The MTL directive that sets this slot
    pub const fn directive(self) -> &'static str {
        match self {
            Self::Ambient => "map_Ka",
            Self::Diffuse => "map_Kd",
            Self::Dissolve => "map_d",
            Self::MapBump => "map_bump",
            Self::Bump => "bump",
        }
    }

    /// Look up the slot set by an MTL directive
    pub fn from_directive(directive: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.directive() == directive)
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// A texture path and the handle it resolved to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureRef {
    /// Normalised path, empty when the slot is unused
    pub path: String,
    /// Device handle, [`UNBOUND_TEXTURE`] until loaded
    pub id: TextureId,
}

/// Scalar, colour and texture state of one `newmtl` block
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialRecord {
    /// Specular exponent (`Ns`)
    pub ns: f32,
    /// Optical density (`Ni`)
    pub ni: f32,
    /// Dissolve (`d`), 1 is opaque
    pub d: f32,
    /// Transparency (`Tr`) as written; not folded into `d`
    pub tr: f32,
    /// Illumination model (`illum`)
    pub illum: i32,
    /// Transmission filter (`Tf`)
    pub tf: Vec3,
    /// Ambient colour (`Ka`)
    pub ka: Vec3,
    /// Diffuse colour (`Kd`)
    pub kd: Vec3,
    /// Specular colour (`Ks`)
    pub ks: Vec3,
    /// Emissive colour (`Ke`)
    pub ke: Vec3,
    /// Specular map (`map_Ks`); kept as a path only
    pub map_ks: String,
    textures: [TextureRef; 5],
}

impl Default for MaterialRecord {
    fn default() -> Self {
        Self {
            ns: 0.0,
            ni: 1.0,
            d: 1.0,
            tr: 0.0,
            illum: 0,
            tf: Vec3::zeros(),
            ka: Vec3::zeros(),
            kd: Vec3::zeros(),
            ks: Vec3::zeros(),
            ke: Vec3::zeros(),
            map_ks: String::new(),
            textures: Default::default(),
        }
    }
}

impl MaterialRecord {
    /// Handle bound to a slot, [`UNBOUND_TEXTURE`] if none
    pub fn texture(&self, slot: TextureSlot) -> TextureId {
        self.textures[slot.index()].id
    }

    /// Path stored in a slot, empty if none
    pub fn texture_path(&self, slot: TextureSlot) -> &str {
        &self.textures[slot.index()].path
    }

    /// Store a path in a slot, normalising it and clearing any previous handle
    pub fn set_texture_path(&mut self, slot: TextureSlot, path: &str) {
        self.textures[slot.index()] = TextureRef {
            path: normalize_texture_path(path),
            id: UNBOUND_TEXTURE,
        };
    }

    /// Iterate over the non-empty texture slots
    pub fn textures(&self) -> impl Iterator<Item = (TextureSlot, &TextureRef)> {
        TextureSlot::ALL
            .into_iter()
            .zip(self.textures.iter())
            .filter(|(_, t)| !t.path.is_empty())
    }
}

/// Trim and convert `\` separators to `/`
pub fn normalize_texture_path(path: &str) -> String {
    path.trim().replace('\\', "/")
}

/// Counts reported by [`MaterialTable::load_textures`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextureLoadSummary {
    /// Distinct paths that loaded
    pub loaded: usize,
    /// Distinct paths that failed and stay unbound
    pub failed: usize,
}

/// Material name to record mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialTable {
    materials: BTreeMap<String, MaterialRecord>,
}

impl MaterialTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse an MTL file
    ///
    /// Textures are not loaded; call [`MaterialTable::load_textures`] afterwards. Bytes
    /// that are not UTF-8 are replaced rather than rejected.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MtlError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MtlError::FileNotFound(path.to_path_buf()));
        }
        let bytes = fs::read(path)?;
        let table = Self::parse_str(&String::from_utf8_lossy(&bytes))?;
        log::info!("Loaded {} materials from {:?}", table.len(), path);
        Ok(table)
    }

    /// Parse MTL text
    pub fn parse_str(contents: &str) -> Result<Self, MtlError> {
        Ok(Self {
            materials: MtlParser::parse(contents)?,
        })
    }

    /// Look up a material by name
    pub fn find(&self, name: &str) -> Option<&MaterialRecord> {
        self.materials.get(name)
    }

    /// Insert or replace a record
    pub fn insert(&mut self, name: impl Into<String>, record: MaterialRecord) -> Option<MaterialRecord> {
        self.materials.insert(name.into(), record)
    }

    /// Number of materials
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Records in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MaterialRecord)> {
        self.materials.iter().map(|(name, record)| (name.as_str(), record))
    }

    /// Every distinct non-empty texture path across all records
    pub fn texture_paths(&self) -> BTreeSet<String> {
        self.materials
            .values()
            .flat_map(MaterialRecord::textures)
            .map(|(_, t)| t.path.clone())
            .collect()
    }

    /// Load each distinct texture once and write the handle into every slot using it
    ///
    /// A path that fails to load is logged and its slots stay [`UNBOUND_TEXTURE`].
    pub fn load_textures(&mut self, loader: &mut impl TextureLoader) -> TextureLoadSummary {
        let mut summary = TextureLoadSummary::default();
        let mut handles = BTreeMap::new();

        for path in self.texture_paths() {
            match loader.load_texture(Path::new(&path)) {
                Ok(id) => {
                    log::debug!("Texture {} -> {}", path, id);
                    summary.loaded += 1;
                    handles.insert(path, id);
                }
                Err(e) => {
                    log::warn!("Failed to load texture {}: {}", path, e);
                    summary.failed += 1;
                    handles.insert(path, UNBOUND_TEXTURE);
                }
            }
        }

        for record in self.materials.values_mut() {
            for texture in &mut record.textures {
                if let Some(&id) = handles.get(&texture.path) {
                    texture.id = id;
                }
            }
        }

        log::info!(
            "Loaded {} textures ({} failed) for {} materials",
            summary.loaded,
            summary.failed,
            self.len()
        );
        summary
    }

    /// Human readable dump of every record
    pub fn debug_print(&self) -> String {
        let mut out = String::new();
        for (name, m) in &self.materials {
            let _ = writeln!(out, "newmtl {name}");
            let _ = writeln!(out, "  Ns {} Ni {} d {} Tr {} illum {}", m.ns, m.ni, m.d, m.tr, m.illum);
            for (label, v) in [("Tf", &m.tf), ("Ka", &m.ka), ("Kd", &m.kd), ("Ks", &m.ks), ("Ke", &m.ke)] {
                let _ = writeln!(out, "  {label} {} {} {}", v.x, v.y, v.z);
            }
            for (slot, texture) in m.textures() {
                let _ = writeln!(out, "  {} {} (id {})", slot.directive(), texture.path, texture.id);
            }
            if !m.map_ks.is_empty() {
                let _ = writeln!(out, "  map_Ks {}", m.map_ks);
            }
        }
        out
    }
}
