//! `ngl::mtlbin` material cache
//!
//! ```text
//! magic        11 bytes  "ngl::mtlbin"
//! count        u32
//! per record:
//!   name       string
//!   Ns Ni d Tr f32 x4
//!   illum      i32
//!   Tf Ka Kd Ks Ke   3 x f32 each
//!   map_Ka map_Kd map_d map_bump bump   string x5
//! ```
//!
//! Texture handles are not stored; they are resolved again after loading.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::material_table::{MaterialRecord, MaterialTable, TextureSlot};
use crate::assets::binary::{
    read_magic, read_string, read_u32_len, read_vec3, write_magic, write_string, write_u32_len,
    write_vec3, BinaryError, MAGIC_LEN,
};

/// Magic at the start of a material cache
pub const MTL_MAGIC: &[u8; MAGIC_LEN] = b"ngl::mtlbin";

impl MaterialTable {
    /// Write the table to a writer
    pub fn write_binary<W: Write>(&self, w: &mut W) -> Result<(), BinaryError> {
        write_magic(w, MTL_MAGIC)?;
        write_u32_len(w, self.len())?;
        for (name, m) in self.iter() {
            write_string(w, name)?;
            for scalar in [m.ns, m.ni, m.d, m.tr] {
                w.write_f32::<LittleEndian>(scalar)?;
            }
            w.write_i32::<LittleEndian>(m.illum)?;
            for color in [&m.tf, &m.ka, &m.kd, &m.ks, &m.ke] {
                write_vec3(w, color)?;
            }
            for slot in TextureSlot::ALL {
                write_string(w, m.texture_path(slot))?;
            }
        }
        Ok(())
    }

    /// Read a table written by [`MaterialTable::write_binary`]
    pub fn read_binary<R: Read>(r: &mut R) -> Result<Self, BinaryError> {
        read_magic(r, MTL_MAGIC)?;
        let count = read_u32_len(r)?;
        let mut table = Self::new();
        for _ in 0..count {
            let name = read_string(r)?;
            let mut record = MaterialRecord::default();
            record.ns = r.read_f32::<LittleEndian>()?;
            record.ni = r.read_f32::<LittleEndian>()?;
            record.d = r.read_f32::<LittleEndian>()?;
            record.tr = r.read_f32::<LittleEndian>()?;
            record.illum = r.read_i32::<LittleEndian>()?;
            for color in [&mut record.tf, &mut record.ka, &mut record.kd, &mut record.ks, &mut record.ke] {
                *color = read_vec3(r)?;
            }
            for slot in TextureSlot::ALL {
                let path = read_string(r)?;
                if !path.is_empty() {
                    record.set_texture_path(slot, &path);
                }
            }
            table.insert(name, record);
        }
        Ok(table)
    }

    /// Save to a cache file
    pub fn save_binary<P: AsRef<Path>>(&self, path: P) -> Result<(), BinaryError> {
        let mut w = BufWriter::new(File::create(path.as_ref())?);
        self.write_binary(&mut w)?;
        w.flush()?;
        log::info!("Wrote {} materials to {:?}", self.len(), path.as_ref());
        Ok(())
    }

    /// Load from a cache file, replacing any text-parsed table
    pub fn load_binary<P: AsRef<Path>>(path: P) -> Result<Self, BinaryError> {
        let table = Self::read_binary(&mut BufReader::new(File::open(path.as_ref())?))?;
        log::info!("Read {} materials from {:?}", table.len(), path.as_ref());
        Ok(table)
    }
}
