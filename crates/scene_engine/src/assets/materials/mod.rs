//! Material loading subsystem
//!
//! MTL text parsing, the name-keyed material table with its texture handles, and the
//! `ngl::mtlbin` cache.

pub mod binary;
pub mod material_table;
pub mod mtl_parser;

pub use binary::MTL_MAGIC;
pub use material_table::{
    normalize_texture_path, MaterialRecord, MaterialTable, TextureLoadSummary, TextureRef, TextureSlot,
};
pub use mtl_parser::{MtlError, MtlParser};
