//! STL mesh payload loading and saving
//!
//! Robot descriptions reference STL files for link geometry. The loader
//! welds the triangle soup into an indexed buffer; the saver expands the
//! indexed buffer back into triangles.

use std::collections::HashMap;
use std::io::BufReader;
use std::path::Path;

use roboconv_core::mesh::{MeshBuilder, MeshError, NormalSource, check_bounds, triangle_normal};
use roboconv_core::model::MeshData;

/// Load an STL file into indexed mesh data with per-face normals
pub fn load_stl(path: impl AsRef<Path>) -> Result<MeshData, StlError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| StlError::Io(e.to_string()))?;
    let mut reader = BufReader::new(file);

    let mesh = stl_io::read_stl(&mut reader).map_err(|e| StlError::Parse(e.to_string()))?;
    if mesh.faces.is_empty() {
        return Err(StlError::EmptyMesh);
    }

    let (vertices, vertex_index, normals) = weld_vertices(&mesh);

    MeshBuilder::new(vertices, vertex_index)
        .normals(normals, NormalSource::PerFace { indices: None })
        .build()
        .map_err(StlError::from)
}

/// Weld the triangle soup into unique vertices plus one normal per face
fn weld_vertices(mesh: &stl_io::IndexedMesh) -> (Vec<[f32; 3]>, Vec<[u32; 3]>, Vec<[f32; 3]>) {
    let mut unique_vertices: Vec<[f32; 3]> = Vec::new();
    let mut vertex_map: HashMap<[i32; 3], u32> = HashMap::new();
    let mut vertex_index: Vec<[u32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();

    // Quantization precision for vertex comparison
    const PRECISION: f32 = 10000.0;

    for face in &mesh.faces {
        let normal = face.normal;
        normals.push([normal[0], normal[1], normal[2]]);

        let mut corners = [0u32; 3];
        for (corner, &vertex_idx) in corners.iter_mut().zip(face.vertices.iter()) {
            let vertex = mesh.vertices[vertex_idx];
            let v = [vertex[0], vertex[1], vertex[2]];
            let key = [
                (v[0] * PRECISION) as i32,
                (v[1] * PRECISION) as i32,
                (v[2] * PRECISION) as i32,
            ];

            *corner = if let Some(&existing) = vertex_map.get(&key) {
                existing
            } else {
                let new_idx = unique_vertices.len() as u32;
                unique_vertices.push(v);
                vertex_map.insert(key, new_idx);
                new_idx
            };
        }
        vertex_index.push(corners);
    }

    (unique_vertices, vertex_index, normals)
}

/// Save mesh data as a binary STL file
pub fn save_stl(mesh: &MeshData, path: impl AsRef<Path>) -> Result<(), StlError> {
    let path = path.as_ref();

    check_bounds("vertex", &mesh.vertex_index, mesh.vertices.len())?;
    if let (Some(normals), Some(normal_index)) = (&mesh.normals, &mesh.normal_index) {
        check_bounds("normal", normal_index, normals.len())?;
    }

    let mut triangles = Vec::with_capacity(mesh.vertex_index.len());
    for (face, tri) in mesh.vertex_index.iter().enumerate() {
        let v0 = mesh.vertices[tri[0] as usize];
        let v1 = mesh.vertices[tri[1] as usize];
        let v2 = mesh.vertices[tri[2] as usize];

        // STL carries one normal per face; recompute when the source mesh
        // indexes normals per corner
        let normal = face_normal(mesh, face).unwrap_or_else(|| triangle_normal(v0, v1, v2));

        triangles.push(stl_io::Triangle {
            normal: stl_io::Normal::new(normal),
            vertices: [
                stl_io::Vertex::new(v0),
                stl_io::Vertex::new(v1),
                stl_io::Vertex::new(v2),
            ],
        });
    }

    let mut file = std::fs::File::create(path).map_err(|e| StlError::Io(e.to_string()))?;
    stl_io::write_stl(&mut file, triangles.iter()).map_err(|e| StlError::Write(e.to_string()))?;

    Ok(())
}

/// Face normal when the mesh binds exactly one normal index per corner row
fn face_normal(mesh: &MeshData, face: usize) -> Option<[f32; 3]> {
    let normals = mesh.normals.as_ref()?;
    let index = mesh.normal_index.as_ref()?.get(face)?;
    normals.get(index[0] as usize).copied()
}

/// STL-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum StlError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Write error: {0}")]
    Write(String),
    #[error("Empty mesh: no geometry found")]
    EmptyMesh,
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron() -> MeshData {
        MeshData {
            vertices: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
            ],
            vertex_index: vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
            ..Default::default()
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tetra.stl");

        save_stl(&tetrahedron(), &path).unwrap();
        let loaded = load_stl(&path).unwrap();

        assert_eq!(loaded.triangle_count(), 4);
        assert_eq!(loaded.vertices.len(), 4);
        // Loader synthesizes per-face normal indices
        assert_eq!(loaded.normal_index.as_ref().unwrap().len(), 4);
    }

    #[test]
    fn test_save_rejects_out_of_range_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.stl");

        let mut mesh = tetrahedron();
        mesh.vertex_index.push([0, 1, 9]);

        let result = save_stl(&mesh, &path);
        assert!(matches!(
            result,
            Err(StlError::Mesh(MeshError::IndexOutOfBounds {
                buffer: "vertex",
                index: 9,
                ..
            }))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_stl("/nonexistent/mesh.stl");
        assert!(matches!(result, Err(StlError::Io(_))));
    }
}
