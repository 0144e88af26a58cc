//! Geometry buffer assembly
//!
//! Builds a [`MeshData`] from raw attribute and index arrays. Vertex and
//! normal buffers use independent index spaces; when a source supplies
//! normals without explicit indices the builder synthesizes them.

use crate::model::{Material, MeshData};

/// How a normal array is bound to the triangle list
#[derive(Debug, Clone)]
pub enum NormalSource {
    /// One normal per vertex. Without explicit indices the normal at a
    /// triangle corner is addressed by that corner's position index.
    PerVertex { indices: Option<Vec<[u32; 3]>> },
    /// One normal per face (or an explicit per-face index list). The face's
    /// single index is repeated for all three corners.
    PerFace { indices: Option<Vec<u32>> },
}

/// Assembles raw attribute arrays into a [`MeshData`]
///
/// Malformed input (out-of-bounds index, mismatched counts) is a
/// construction error; the builder never silently truncates.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    vertices: Vec<[f32; 3]>,
    vertex_index: Vec<[u32; 3]>,
    normals: Option<(Vec<[f32; 3]>, NormalSource)>,
    uvs: Option<(Vec<[f32; 2]>, Vec<[u32; 3]>)>,
    image: Option<String>,
    material: Option<Material>,
}

impl MeshBuilder {
    /// Start a builder from positions and the triangle index list
    pub fn new(vertices: Vec<[f32; 3]>, vertex_index: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            vertex_index,
            ..Default::default()
        }
    }

    /// Attach a normal array with its binding
    pub fn normals(mut self, normals: Vec<[f32; 3]>, source: NormalSource) -> Self {
        self.normals = Some((normals, source));
        self
    }

    /// Attach texture coordinates with explicit corner indices
    pub fn uvs(mut self, uvs: Vec<[f32; 2]>, uv_index: Vec<[u32; 3]>) -> Self {
        self.uvs = Some((uvs, uv_index));
        self
    }

    /// Attach a resolved texture image handle
    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Attach a material
    pub fn material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    /// Validate and materialize the mesh
    pub fn build(self) -> Result<MeshData, MeshError> {
        let face_count = self.vertex_index.len();
        check_bounds("vertex", &self.vertex_index, self.vertices.len())?;

        let (normals, normal_index) = match self.normals {
            Some((normals, source)) => {
                let index = synthesize_normal_index(source, &self.vertex_index, face_count)?;
                check_bounds("normal", &index, normals.len())?;
                (Some(normals), Some(index))
            }
            None => (None, None),
        };

        let (uvs, uv_index) = match self.uvs {
            Some((uvs, index)) => {
                if index.len() != face_count {
                    return Err(MeshError::CountMismatch {
                        buffer: "uv",
                        expected: face_count,
                        actual: index.len(),
                    });
                }
                check_bounds("uv", &index, uvs.len())?;
                (Some(uvs), Some(index))
            }
            None => (None, None),
        };

        Ok(MeshData {
            vertices: self.vertices,
            vertex_index: self.vertex_index,
            normals,
            normal_index,
            uvs,
            uv_index,
            image: self.image,
            material: self.material,
        })
    }
}

/// Compute the triangle-corner normal index list for a binding
fn synthesize_normal_index(
    source: NormalSource,
    vertex_index: &[[u32; 3]],
    face_count: usize,
) -> Result<Vec<[u32; 3]>, MeshError> {
    match source {
        NormalSource::PerVertex { indices: Some(index) } => {
            if index.len() != face_count {
                return Err(MeshError::CountMismatch {
                    buffer: "normal",
                    expected: face_count,
                    actual: index.len(),
                });
            }
            Ok(index)
        }
        // Implicit 1:1 binding: the corner referencing position i uses
        // normal i, so the synthesized list mirrors the vertex index list.
        NormalSource::PerVertex { indices: None } => Ok(vertex_index.to_vec()),
        NormalSource::PerFace { indices: Some(index) } => {
            if index.len() != face_count {
                return Err(MeshError::CountMismatch {
                    buffer: "normal",
                    expected: face_count,
                    actual: index.len(),
                });
            }
            Ok(index.iter().map(|&i| [i, i, i]).collect())
        }
        NormalSource::PerFace { indices: None } => {
            Ok((0..face_count as u32).map(|f| [f, f, f]).collect())
        }
    }
}

/// Check every corner index against the addressed array length
///
/// Writers call this on hand-built meshes before dereferencing, since
/// [`MeshData`] fields are public and carry no construction invariant.
pub fn check_bounds(buffer: &'static str, index: &[[u32; 3]], len: usize) -> Result<(), MeshError> {
    for corner in index.iter().flatten() {
        if *corner as usize >= len {
            return Err(MeshError::IndexOutOfBounds {
                buffer,
                index: *corner,
                len,
            });
        }
    }
    Ok(())
}

/// Calculate normal for a single triangle
pub fn triangle_normal(v0: [f32; 3], v1: [f32; 3], v2: [f32; 3]) -> [f32; 3] {
    let e1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
    let e2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];

    let cross = [
        e1[1] * e2[2] - e1[2] * e2[1],
        e1[2] * e2[0] - e1[0] * e2[2],
        e1[0] * e2[1] - e1[1] * e2[0],
    ];

    let len = (cross[0] * cross[0] + cross[1] * cross[1] + cross[2] * cross[2]).sqrt();
    if len > 0.0 {
        [cross[0] / len, cross[1] / len, cross[2] / len]
    } else {
        [0.0, 0.0, 1.0]
    }
}

/// Calculate one face normal per triangle for sources without normals
///
/// Indices must already be validated against `vertices`.
pub fn face_normals(vertices: &[[f32; 3]], vertex_index: &[[u32; 3]]) -> Vec<[f32; 3]> {
    vertex_index
        .iter()
        .map(|tri| {
            triangle_normal(
                vertices[tri[0] as usize],
                vertices[tri[1] as usize],
                vertices[tri[2] as usize],
            )
        })
        .collect()
}

/// Mesh construction errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum MeshError {
    #[error("{buffer} index {index} out of bounds (array length {len})")]
    IndexOutOfBounds {
        buffer: &'static str,
        index: u32,
        len: usize,
    },
    #[error("{buffer} index list has {actual} entries, expected {expected}")]
    CountMismatch {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_vertices() -> Vec<[f32; 3]> {
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ]
    }

    #[test]
    fn test_vertex_index_out_of_bounds() {
        let result = MeshBuilder::new(quad_vertices(), vec![[0, 1, 4]]).build();
        assert!(matches!(
            result,
            Err(MeshError::IndexOutOfBounds {
                buffer: "vertex",
                index: 4,
                len: 4
            })
        ));
    }

    #[test]
    fn test_implicit_per_vertex_normals_mirror_vertex_index() {
        let normals = vec![[0.0, 0.0, 1.0]; 4];
        let mesh = MeshBuilder::new(quad_vertices(), vec![[0, 1, 2], [0, 2, 3]])
            .normals(normals, NormalSource::PerVertex { indices: None })
            .build()
            .unwrap();
        assert_eq!(mesh.normal_index, Some(vec![[0, 1, 2], [0, 2, 3]]));
    }

    #[test]
    fn test_explicit_per_vertex_normals_copied() {
        let normals = vec![[0.0, 0.0, 1.0]; 3];
        let index = vec![[2, 1, 0], [0, 1, 2]];
        let mesh = MeshBuilder::new(quad_vertices(), vec![[0, 1, 2], [0, 2, 3]])
            .normals(
                normals,
                NormalSource::PerVertex {
                    indices: Some(index.clone()),
                },
            )
            .build()
            .unwrap();
        assert_eq!(mesh.normal_index, Some(index));
    }

    #[test]
    fn test_per_face_normals_repeat_face_index() {
        let normals = vec![[0.0, 0.0, 1.0], [0.0, 0.0, -1.0]];
        let mesh = MeshBuilder::new(quad_vertices(), vec![[0, 1, 2], [0, 2, 3]])
            .normals(normals, NormalSource::PerFace { indices: None })
            .build()
            .unwrap();
        assert_eq!(mesh.normal_index, Some(vec![[0, 0, 0], [1, 1, 1]]));
    }

    #[test]
    fn test_per_face_explicit_indices_repeat_each_entry() {
        let normals = vec![[0.0, 0.0, 1.0], [0.0, 0.0, -1.0]];
        let mesh = MeshBuilder::new(quad_vertices(), vec![[0, 1, 2], [0, 2, 3]])
            .normals(
                normals,
                NormalSource::PerFace {
                    indices: Some(vec![1, 0]),
                },
            )
            .build()
            .unwrap();
        assert_eq!(mesh.normal_index, Some(vec![[1, 1, 1], [0, 0, 0]]));
    }

    #[test]
    fn test_normal_index_out_of_bounds() {
        // Two normals, but the implicit binding addresses index 3
        let normals = vec![[0.0, 0.0, 1.0]; 2];
        let result = MeshBuilder::new(quad_vertices(), vec![[0, 2, 3]])
            .normals(normals, NormalSource::PerVertex { indices: None })
            .build();
        assert!(matches!(
            result,
            Err(MeshError::IndexOutOfBounds { buffer: "normal", .. })
        ));
    }

    #[test]
    fn test_per_face_count_mismatch() {
        let normals = vec![[0.0, 0.0, 1.0]];
        let result = MeshBuilder::new(quad_vertices(), vec![[0, 1, 2], [0, 2, 3]])
            .normals(
                normals,
                NormalSource::PerFace {
                    indices: Some(vec![0]),
                },
            )
            .build();
        assert!(matches!(
            result,
            Err(MeshError::CountMismatch {
                buffer: "normal",
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_uv_binding_validated() {
        let uvs = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];
        let result = MeshBuilder::new(quad_vertices(), vec![[0, 1, 2]])
            .uvs(uvs, vec![[0, 1, 3]])
            .build();
        assert!(matches!(
            result,
            Err(MeshError::IndexOutOfBounds { buffer: "uv", .. })
        ));
    }

    #[test]
    fn test_face_normals_unit_length() {
        let normals = face_normals(&quad_vertices(), &[[0, 1, 2], [0, 2, 3]]);
        assert_eq!(normals, vec![[0.0, 0.0, 1.0], [0.0, 0.0, 1.0]]);
    }
}
