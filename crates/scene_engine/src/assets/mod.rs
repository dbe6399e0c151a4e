//! Asset loading
//!
//! Text parsers for OBJ meshes and MTL material libraries, their binary caches, and
//! CPU-side texture decoding.

pub mod binary;
pub mod image_loader;
pub mod materials;
pub mod obj;
pub mod tokenizer;

pub use image_loader::ImageData;
pub use materials::{MaterialRecord, MaterialTable, MtlError, TextureSlot};
pub use obj::{GroupedObj, MeshSegment, ObjError, PackError, PackedMesh};
