//! OBJ text output
//!
//! Writes every position, normal and texture coordinate, then each segment in buffer
//! order as `g`, `usemtl` and its triangles. Loading the output gives back the same
//! attribute arrays, faces and segments.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::geometry::Face;
use super::GroupedObj;

impl GroupedObj {
    /// Write the mesh as OBJ text
    pub fn write_obj<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let geometry = self.geometry();
        for v in &geometry.vertices {
            writeln!(w, "v {} {} {}", v.x, v.y, v.z)?;
        }
        for n in &geometry.normals {
            writeln!(w, "vn {} {} {}", n.x, n.y, n.z)?;
        }
        for uv in &geometry.uvs {
            if uv.z == 0.0 {
                writeln!(w, "vt {} {}", uv.x, uv.y)?;
            } else {
                writeln!(w, "vt {} {} {}", uv.x, uv.y, uv.z)?;
            }
        }

        let mut segments: Vec<_> = self.segments().iter().collect();
        segments.sort_by_key(|s| s.start);
        for segment in segments {
            writeln!(w, "g {}", segment.name)?;
            writeln!(w, "usemtl {}", segment.material)?;
            let first = segment.start / 3;
            let last = segment.end() / 3;
            for face in geometry.faces.get(first..last).unwrap_or_default() {
                write_face(w, face)?;
            }
        }
        Ok(())
    }

    /// Save the mesh to an OBJ file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut w = BufWriter::new(File::create(path.as_ref())?);
        self.write_obj(&mut w)?;
        w.flush()?;
        log::info!("Saved {} triangles to {:?}", self.num_triangles(), path.as_ref());
        Ok(())
    }
}

fn write_face<W: Write>(w: &mut W, face: &Face) -> io::Result<()> {
    write!(w, "f")?;
    for (corner, vertex) in face.vertices.iter().enumerate() {
        let uv = face.uvs.get(corner).or_else(|| face.uvs.last());
        let normal = face.normals.get(corner).or_else(|| face.normals.last());
        match (uv, normal) {
            (None, None) => write!(w, " {}", vertex + 1)?,
            (Some(t), None) => write!(w, " {}/{}", vertex + 1, t + 1)?,
            (None, Some(n)) => write!(w, " {}//{}", vertex + 1, n + 1)?,
            (Some(t), Some(n)) => write!(w, " {}/{}/{}", vertex + 1, t + 1, n + 1)?,
        }
    }
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_encodings_written() {
        let mut out = Vec::new();
        write_face(&mut out, &Face::triangle(0, 1, 2)).unwrap();
        write_face(&mut out, &Face::triangle(0, 1, 2).with_uvs(vec![3, 4, 5])).unwrap();
        write_face(&mut out, &Face::triangle(0, 1, 2).with_normals(vec![0, 0, 0])).unwrap();
        write_face(
            &mut out,
            &Face::triangle(0, 1, 2).with_uvs(vec![0, 1, 2]).with_normals(vec![2, 1, 0]),
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "f 1 2 3\nf 1/4 2/5 3/6\nf 1//1 2//1 3//1\nf 1/1/3 2/2/2 3/3/1\n"
        );
    }

    #[test]
    fn test_round_trip() {
        let source = "\
v 0 0 0
v 1.5 0 0
v 1.5 1.25 -3
v 0 1 0
vn 0 0 1
vt 0 0
vt 1 0 0.5
vt 1 1
g b
usemtl wood
f 1/1/1 2/2/1 3/3/1 4/1/1
g a
usemtl stone
f 3//1 2//1 1//1
";
        let mesh = GroupedObj::parse_str(source).unwrap();
        let mut out = Vec::new();
        mesh.write_obj(&mut out).unwrap();
        let reloaded = GroupedObj::parse_str(std::str::from_utf8(&out).unwrap()).unwrap();

        assert_eq!(reloaded.geometry(), mesh.geometry());
        assert_eq!(reloaded.segments(), mesh.segments());
        assert_eq!(reloaded.packed(), mesh.packed());
    }

    #[test]
    fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.obj");
        let mesh = GroupedObj::parse_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        mesh.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("g none\nusemtl default\nf 1 2 3\n"));
        assert_eq!(GroupedObj::load(&path).unwrap(), mesh);
    }
}
