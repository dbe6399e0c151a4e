//! Group and material tracking for the OBJ pass
//!
//! Segment boundaries come only from `g` directives. `usemtl` just changes the
//! material that the open segment will carry when it is closed.

use std::fmt;

/// Name given to faces that appear before any `g` directive
pub const DEFAULT_GROUP_NAME: &str = "none";
/// Material given to segments that never saw a `usemtl`
pub const DEFAULT_MATERIAL_NAME: &str = "default";

/// A contiguous run of face-vertices drawn with one material
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshSegment {
    /// Group name from the `g` directive
    pub name: String,
    /// Material name from the last `usemtl` seen before the segment closed
    pub material: String,
    /// First record of the segment in the packed buffer
    pub start: usize,
    /// Number of records (3 per triangle)
    pub num_verts: usize,
}

impl MeshSegment {
    /// One past the last record of the segment
    pub fn end(&self) -> usize {
        self.start + self.num_verts
    }
}

impl fmt::Display for MeshSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] start {} verts {}",
            self.name, self.material, self.start, self.num_verts
        )
    }
}

/// Mutable state threaded through every directive of one OBJ pass
#[derive(Debug, Clone)]
pub struct ParseState {
    /// True until the first `g` directive has been handled
    pub is_first_group: bool,
    current_name: String,
    current_material: String,
    face_vertex_count: usize,
    offset: usize,
    segments: Vec<MeshSegment>,
}

impl Default for ParseState {
    fn default() -> Self {
        Self {
            is_first_group: true,
            current_name: DEFAULT_GROUP_NAME.to_string(),
            current_material: DEFAULT_MATERIAL_NAME.to_string(),
            face_vertex_count: 0,
            offset: 0,
            segments: Vec::new(),
        }
    }
}

impl ParseState {
    /// Fresh state for a new pass
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a `g [name]` directive
    ///
    /// Every `g` after the first closes the open segment.
    pub fn on_group(&mut self, name: Option<&str>) {
        if self.is_first_group {
            self.is_first_group = false;
        } else {
            self.close_segment();
        }
        self.current_name = name.unwrap_or(DEFAULT_GROUP_NAME).to_string();
        log::trace!("group '{}'", self.current_name);
    }

    /// Handle a `usemtl [name]` directive
    pub fn on_material(&mut self, name: Option<&str>) {
        self.current_material = name.unwrap_or(DEFAULT_MATERIAL_NAME).to_string();
        log::trace!("usemtl '{}'", self.current_material);
    }

    /// Count face-vertices towards the open segment
    pub fn add_face_vertices(&mut self, count: usize) {
        self.face_vertex_count += count;
    }

    /// Face-vertices counted over the whole pass so far
    pub fn total_face_vertices(&self) -> usize {
        self.offset + self.face_vertex_count
    }

    /// Name of the open segment
    pub fn current_name(&self) -> &str {
        &self.current_name
    }

    /// Material of the open segment
    pub fn current_material(&self) -> &str {
        &self.current_material
    }

    /// Segments closed so far, in file order
    pub fn segments(&self) -> &[MeshSegment] {
        &self.segments
    }

    /// Flush the open segment and return all segments sorted by material
    ///
    /// The final flush is unconditional, so a file with no `g` at all still yields one
    /// segment. The sort is stable: segments sharing a material keep file order.
    pub fn finish(mut self) -> Vec<MeshSegment> {
        self.close_segment();
        let mut segments = self.segments;
        segments.sort_by(|a, b| a.material.cmp(&b.material));
        segments
    }

    fn close_segment(&mut self) {
        let segment = MeshSegment {
            name: self.current_name.clone(),
            material: self.current_material.clone(),
            start: self.offset,
            num_verts: self.face_vertex_count,
        };
        log::debug!("closed segment {}", segment);
        self.segments.push(segment);
        self.offset += self.face_vertex_count;
        self.face_vertex_count = 0;
    }
}
