//! `ngl::objbin` mesh cache
//!
//! ```text
//! magic      11 bytes "ngl::objbin"
//! vertices   u32 count, 3 x f32 each
//! normals    u32 count, 3 x f32 each
//! uvs        u32 count, 3 x f32 each
//! faces      u32 count, per face:
//!              flags u8 (bit 0 normals, bit 1 uvs)
//!              3 x u32 vertex, [3 x u32 normal], [3 x u32 uv]
//! segments   u32 count, per segment:
//!              name string, material string, start u64, count u64
//! ```
//!
//! Segments are stored already sorted. A face whose normal or uv list was short is
//! stored with three entries, repeating its last index as the packer would.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::error::ObjError;
use super::geometry::{Face, Geometry};
use super::groups::MeshSegment;
use super::GroupedObj;
use crate::assets::binary::{
    read_magic, read_string, read_u32_len, read_vec3, write_magic, write_string, write_u32_len,
    write_vec3, BinaryError, MAGIC_LEN,
};
use crate::foundation::math::Vec3;

/// Magic at the start of a mesh cache
pub const OBJ_MAGIC: &[u8; MAGIC_LEN] = b"ngl::objbin";

const HAS_NORMALS: u8 = 0b01;
const HAS_UVS: u8 = 0b10;

impl GroupedObj {
    /// Write the mesh to a writer
    pub fn write_binary<W: Write>(&self, w: &mut W) -> Result<(), BinaryError> {
        let geometry = self.geometry();
        write_magic(w, OBJ_MAGIC)?;
        write_vec3s(w, &geometry.vertices)?;
        write_vec3s(w, &geometry.normals)?;
        write_vec3s(w, &geometry.uvs)?;

        write_u32_len(w, geometry.faces.len())?;
        for face in &geometry.faces {
            let mut flags = 0;
            if face.has_normals() {
                flags |= HAS_NORMALS;
            }
            if face.has_uvs() {
                flags |= HAS_UVS;
            }
            w.write_u8(flags)?;
            write_indices(w, &face.vertices)?;
            if face.has_normals() {
                write_indices(w, &face.normals)?;
            }
            if face.has_uvs() {
                write_indices(w, &face.uvs)?;
            }
        }

        write_u32_len(w, self.segments().len())?;
        for segment in self.segments() {
            write_string(w, &segment.name)?;
            write_string(w, &segment.material)?;
            w.write_u64::<LittleEndian>(segment.start as u64)?;
            w.write_u64::<LittleEndian>(segment.num_verts as u64)?;
        }
        Ok(())
    }

    /// Read a mesh written by [`GroupedObj::write_binary`] and pack it
    pub fn read_binary<R: Read>(r: &mut R) -> Result<Self, ObjError> {
        read_magic(r, OBJ_MAGIC)?;
        let mut geometry = Geometry::new();
        geometry.vertices = read_vec3s(r)?;
        geometry.normals = read_vec3s(r)?;
        geometry.uvs = read_vec3s(r)?;

        // Counts come from the file; nothing is preallocated from them
        let face_count = read_u32_len(r)?;
        for _ in 0..face_count {
            let flags = r.read_u8().map_err(BinaryError::from)?;
            let mut face = Face {
                vertices: read_indices(r)?,
                ..Face::default()
            };
            if flags & HAS_NORMALS != 0 {
                face.normals = read_indices(r)?;
            }
            if flags & HAS_UVS != 0 {
                face.uvs = read_indices(r)?;
            }
            geometry.faces.push(face);
        }

        let segment_count = read_u32_len(r)?;
        let mut segments = Vec::new();
        for _ in 0..segment_count {
            segments.push(MeshSegment {
                name: read_string(r)?,
                material: read_string(r)?,
                start: read_u64_len(r)?,
                num_verts: read_u64_len(r)?,
            });
        }

        Ok(Self::from_parts(geometry, segments)?)
    }

    /// Save to a cache file
    pub fn save_binary<P: AsRef<Path>>(&self, path: P) -> Result<(), BinaryError> {
        let mut w = BufWriter::new(File::create(path.as_ref())?);
        self.write_binary(&mut w)?;
        w.flush()?;
        log::info!("Wrote mesh cache {:?} ({} segments)", path.as_ref(), self.num_meshes());
        Ok(())
    }

    /// Load from a cache file
    pub fn load_binary<P: AsRef<Path>>(path: P) -> Result<Self, ObjError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ObjError::FileNotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        let mesh = Self::read_binary(&mut BufReader::new(file))?;
        log::info!(
            "Read mesh cache {:?}: {} triangles in {} segments",
            path,
            mesh.num_triangles(),
            mesh.num_meshes()
        );
        Ok(mesh)
    }
}

fn write_vec3s<W: Write>(w: &mut W, values: &[Vec3]) -> Result<(), BinaryError> {
    write_u32_len(w, values.len())?;
    for v in values {
        write_vec3(w, v)?;
    }
    Ok(())
}

fn read_vec3s<R: Read>(r: &mut R) -> Result<Vec<Vec3>, BinaryError> {
    let count = read_u32_len(r)?;
    (0..count).map(|_| read_vec3(r)).collect()
}

fn write_indices<W: Write>(w: &mut W, indices: &[usize]) -> Result<(), BinaryError> {
    for corner in 0..3 {
        let index = indices.get(corner).or_else(|| indices.last()).copied().unwrap_or_default();
        write_u32_len(w, index)?;
    }
    Ok(())
}

fn read_indices<R: Read>(r: &mut R) -> Result<Vec<usize>, BinaryError> {
    (0..3).map(|_| read_u32_len(r)).collect()
}

fn read_u64_len<R: Read>(r: &mut R) -> Result<usize, BinaryError> {
    let value = r.read_u64::<LittleEndian>()?;
    usize::try_from(value).map_err(|_| BinaryError::Overflow(value))
}
