//! Interleaved vertex buffer packing
//!
//! Each face-vertex becomes one record of eight floats:
//!
//! ```text
//! | px py pz | nx ny nz | u v |
//!   0          3          6
//! ```
//!
//! Records follow face-list order, so a segment's `start`/`num_verts` index straight
//! into the packed buffer regardless of the order segments are drawn in.
//!
//! Normals and texture coordinates are looked up only if the mesh has any at all.
//! Otherwise the slot is written as zero. A face whose own normal or uv list is short
//! reuses its last available index, and one with no list writes zero.

use super::error::PackError;
use super::geometry::Geometry;
use crate::foundation::math::Vec3;
use crate::render::backend::{AttributePointer, ElementType, VertexArray};

/// Floats per packed record
pub const FLOATS_PER_RECORD: usize = 8;
/// Bytes per packed record
pub const RECORD_STRIDE: usize = FLOATS_PER_RECORD * std::mem::size_of::<f32>();

/// Attribute layout handed to the vertex array: position, normal, uv
pub const VERTEX_LAYOUT: [AttributePointer; 3] = [
    attribute(0, 3, 0),
    attribute(1, 3, 3),
    attribute(2, 2, 6),
];

const fn attribute(index: u32, components: u32, float_offset: usize) -> AttributePointer {
    AttributePointer {
        index,
        components,
        element_type: ElementType::Float,
        stride: RECORD_STRIDE,
        offset: float_offset * std::mem::size_of::<f32>(),
    }
}

/// One record of the packed buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackedVertex {
    /// Position
    pub position: [f32; 3],
    /// Normal, zero when absent
    pub normal: [f32; 3],
    /// Texture coordinate, zero when absent
    pub uv: [f32; 2],
}

impl PackedVertex {
    fn from_record(record: &[f32]) -> Self {
        Self {
            position: [record[0], record[1], record[2]],
            normal: [record[3], record[4], record[5]],
            uv: [record[6], record[7]],
        }
    }
}

/// The packed, immutable vertex stream of a mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackedMesh {
    data: Vec<f32>,
}

impl PackedMesh {
    /// Pack every face of `geometry`
    ///
    /// All faces must be triangles; the face decoder guarantees this for parsed
    /// input, but geometry built by hand is checked here too.
    pub fn pack(geometry: &Geometry) -> Result<Self, PackError> {
        let use_normals = geometry.has_normals();
        let use_uvs = geometry.has_uvs();
        let mut data = Vec::with_capacity(geometry.faces.len() * 3 * FLOATS_PER_RECORD);

        for (face_index, face) in geometry.faces.iter().enumerate() {
            if face.len() != 3 {
                return Err(PackError::NonTriangularFace {
                    face: face_index,
                    vertex_count: face.len(),
                });
            }

            for corner in 0..3 {
                let position = lookup(&geometry.vertices, face.vertices[corner], face_index, "vertex")?;
                data.extend_from_slice(position.as_slice());

                let normal = if use_normals {
                    corner_attribute(&face.normals, corner)
                        .map(|i| lookup(&geometry.normals, i, face_index, "normal"))
                        .transpose()?
                        .unwrap_or_else(Vec3::zeros)
                } else {
                    Vec3::zeros()
                };
                data.extend_from_slice(normal.as_slice());

                let uv = if use_uvs {
                    corner_attribute(&face.uvs, corner)
                        .map(|i| lookup(&geometry.uvs, i, face_index, "uv"))
                        .transpose()?
                        .unwrap_or_else(Vec3::zeros)
                } else {
                    Vec3::zeros()
                };
                data.extend_from_slice(&[uv.x, uv.y]);
            }
        }

        log::debug!(
            "Packed {} faces into {} records (normals: {}, uvs: {})",
            geometry.faces.len(),
            data.len() / FLOATS_PER_RECORD,
            use_normals,
            use_uvs
        );
        Ok(Self { data })
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.data.len() / FLOATS_PER_RECORD
    }

    /// Whether the buffer has no records
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The raw interleaved floats
    pub fn as_floats(&self) -> &[f32] {
        &self.data
    }

    /// The raw bytes handed to the vertex array
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Record `index`, if it exists
    pub fn record(&self, index: usize) -> Option<PackedVertex> {
        self.data
            .chunks_exact(FLOATS_PER_RECORD)
            .nth(index)
            .map(PackedVertex::from_record)
    }

    /// Iterate over all records in buffer order
    pub fn records(&self) -> impl Iterator<Item = PackedVertex> + '_ {
        self.data.chunks_exact(FLOATS_PER_RECORD).map(PackedVertex::from_record)
    }

    /// Upload into a vertex array and describe the layout
    pub fn upload(&self, vao: &mut dyn VertexArray) {
        vao.bind();
        vao.set_data(self.as_bytes());
        for pointer in VERTEX_LAYOUT {
            vao.set_vertex_attribute_pointer(pointer);
        }
        vao.set_num_indices(self.len());
        vao.unbind();
        log::debug!("Uploaded {} records ({} bytes)", self.len(), self.as_bytes().len());
    }
}

fn corner_attribute(indices: &[usize], corner: usize) -> Option<usize> {
    indices.get(corner).or_else(|| indices.last()).copied()
}

fn lookup(values: &[Vec3], index: usize, face: usize, attribute: &'static str) -> Result<Vec3, PackError> {
    values.get(index).copied().ok_or(PackError::IndexOutOfRange {
        face,
        attribute,
        index,
        len: values.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::obj::geometry::Face;
    use crate::render::headless::RecordingVertexArray;
    use approx::assert_relative_eq;

    fn triangle_geometry() -> Geometry {
        let mut geometry = Geometry::new();
        geometry.add_vertex(0.0, 0.0, 0.0);
        geometry.add_vertex(1.0, 0.0, 0.0);
        geometry.add_vertex(1.0, 1.0, 0.0);
        geometry.faces.push(Face::triangle(0, 1, 2));
        geometry
    }

    #[test]
    fn test_positions_only_write_zero_attributes() {
        let packed = PackedMesh::pack(&triangle_geometry()).unwrap();
        assert_eq!(packed.len(), 3);
        assert_eq!(packed.record(1).unwrap().position, [1.0, 0.0, 0.0]);
        for record in packed.records() {
            assert_eq!(record.normal, [0.0; 3]);
            assert_eq!(record.uv, [0.0; 2]);
        }
    }

    #[test]
    fn test_normals_without_uvs() {
        let mut geometry = triangle_geometry();
        geometry.add_normal(0.0, 0.0, 1.0);
        geometry.faces[0] = Face::triangle(0, 1, 2).with_normals(vec![0, 0, 0]);

        let packed = PackedMesh::pack(&geometry).unwrap();
        for record in packed.records() {
            assert_eq!(record.normal, [0.0, 0.0, 1.0]);
            assert_eq!(record.uv, [0.0; 2]);
        }
    }

    #[test]
    fn test_uvs_without_normals() {
        let mut geometry = triangle_geometry();
        geometry.add_uv(0.0, 0.0, None);
        geometry.add_uv(1.0, 0.0, None);
        geometry.add_uv(1.0, 1.0, Some(0.5));
        geometry.faces[0] = Face::triangle(0, 1, 2).with_uvs(vec![0, 1, 2]);

        let packed = PackedMesh::pack(&geometry).unwrap();
        let uvs: Vec<_> = packed.records().map(|r| r.uv).collect();
        assert_eq!(uvs, vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);
        assert!(packed.records().all(|r| r.normal == [0.0; 3]));
    }

    #[test]
    fn test_full_records_interleave() {
        let mut geometry = triangle_geometry();
        geometry.add_normal(0.0, 0.0, 1.0);
        geometry.add_uv(0.25, 0.75, None);
        geometry.faces[0] = Face::triangle(0, 1, 2)
            .with_normals(vec![0, 0, 0])
            .with_uvs(vec![0, 0, 0]);

        let packed = PackedMesh::pack(&geometry).unwrap();
        assert_eq!(
            &packed.as_floats()[8..16],
            &[1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.25, 0.75]
        );
    }

    #[test]
    fn test_short_attribute_list_reuses_last_index() {
        let mut geometry = triangle_geometry();
        geometry.add_normal(1.0, 0.0, 0.0);
        geometry.add_normal(0.0, 1.0, 0.0);
        geometry.faces[0] = Face::triangle(0, 1, 2).with_normals(vec![0, 1]);

        let packed = PackedMesh::pack(&geometry).unwrap();
        assert_eq!(packed.record(2).unwrap().normal, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_face_without_normals_in_mesh_with_normals() {
        let mut geometry = triangle_geometry();
        geometry.add_normal(1.0, 0.0, 0.0);

        let packed = PackedMesh::pack(&geometry).unwrap();
        assert!(packed.records().all(|r| r.normal == [0.0; 3]));
    }

    #[test]
    fn test_non_triangular_face_is_fatal() {
        let mut geometry = triangle_geometry();
        geometry.add_vertex(0.0, 1.0, 0.0);
        geometry.faces.push(Face {
            vertices: vec![0, 1, 2, 3],
            ..Default::default()
        });

        assert_eq!(
            PackedMesh::pack(&geometry),
            Err(PackError::NonTriangularFace { face: 1, vertex_count: 4 })
        );
    }

    #[test]
    fn test_out_of_range_index() {
        let mut geometry = triangle_geometry();
        geometry.faces.push(Face::triangle(0, 1, 9));

        assert_eq!(
            PackedMesh::pack(&geometry),
            Err(PackError::IndexOutOfRange { face: 1, attribute: "vertex", index: 9, len: 3 })
        );
    }

    #[test]
    fn test_upload_describes_layout() {
        let packed = PackedMesh::pack(&triangle_geometry()).unwrap();
        let mut vao = RecordingVertexArray::new();
        packed.upload(&mut vao);

        assert_eq!(vao.data().len(), 3 * RECORD_STRIDE);
        assert_eq!(vao.num_indices(), 3);
        assert_eq!(vao.attribute_pointers(), &VERTEX_LAYOUT);
        assert_eq!(vao.attribute_pointers()[1].offset, 12);
        assert_eq!(vao.attribute_pointers()[2].offset, 24);
        assert!(!vao.is_bound());
    }

    #[test]
    fn test_bytes_match_floats() {
        let packed = PackedMesh::pack(&triangle_geometry()).unwrap();
        let bytes = packed.as_bytes();
        let x = f32::from_ne_bytes([bytes[32], bytes[33], bytes[34], bytes[35]]);
        assert_relative_eq!(x, 1.0);
    }
}
