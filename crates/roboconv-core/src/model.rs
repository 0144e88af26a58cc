//! Canonical model: Body, Link, Joint, Shape, Material

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Sentinel parent name for joints attached to the world frame.
/// No corresponding Link is required in the Body.
pub const WORLD_LINK: &str = "world";

/// Surface material properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub emission: [f32; 4],
    pub shininess: f32,
    pub transparency: f32,
}

impl Material {
    /// Create a material with neutral defaults
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ambient: [0.2, 0.2, 0.2, 1.0],
            diffuse: [0.7, 0.7, 0.7, 1.0],
            specular: [0.0, 0.0, 0.0, 1.0],
            emission: [0.0, 0.0, 0.0, 1.0],
            shininess: 0.0,
            transparency: 0.0,
        }
    }
}

/// Triangle mesh data with independently indexed attribute buffers
///
/// Vertex and normal buffers do NOT share an index space: the corner of a
/// triangle may address its position and its normal by different indices.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshData {
    /// Vertex positions
    pub vertices: Vec<[f32; 3]>,
    /// Triangle corner indices into `vertices`
    pub vertex_index: Vec<[u32; 3]>,
    /// Normal vectors (independent index space)
    pub normals: Option<Vec<[f32; 3]>>,
    /// Triangle corner indices into `normals`
    pub normal_index: Option<Vec<[u32; 3]>>,
    /// Texture coordinates
    pub uvs: Option<Vec<[f32; 2]>>,
    /// Triangle corner indices into `uvs`
    pub uv_index: Option<Vec<[u32; 3]>>,
    /// Resolved texture image path or relocated asset handle
    pub image: Option<String>,
    pub material: Option<Material>,
}

impl MeshData {
    /// Combined (position, normal) index stream for targets that require a
    /// single interleaved index per triangle corner.
    ///
    /// Produces `[p0, n0, p1, n1, ...]` in triangle order. Without normals
    /// this degenerates to the flat position index stream.
    pub fn combined_index(&self) -> Vec<u32> {
        match &self.normal_index {
            Some(normal_index) => self
                .vertex_index
                .iter()
                .zip(normal_index.iter())
                .flat_map(|(p, n)| [p[0], n[0], p[1], n[1], p[2], n[2]])
                .collect(),
            None => self.flat_vertex_index(),
        }
    }

    /// Position indices flattened to one index per triangle corner
    pub fn flat_vertex_index(&self) -> Vec<u32> {
        self.vertex_index.iter().flatten().copied().collect()
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.vertex_index.len()
    }
}

/// Sphere primitive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SphereData {
    pub radius: f32,
    pub material: Option<Material>,
}

/// Cylinder primitive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CylinderData {
    pub radius: f32,
    pub height: f32,
    pub material: Option<Material>,
}

/// Box primitive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxData {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub material: Option<Material>,
}

/// Geometric payload of a shape (closed variant set)
///
/// Consumers pattern-match exhaustively; there is no escape hatch for
/// unknown primitives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ShapeData {
    Mesh(MeshData),
    Sphere(SphereData),
    Cylinder(CylinderData),
    Box(BoxData),
}

impl ShapeData {
    /// Variant name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            ShapeData::Mesh(_) => "mesh",
            ShapeData::Sphere(_) => "sphere",
            ShapeData::Cylinder(_) => "cylinder",
            ShapeData::Box(_) => "box",
        }
    }

    /// Check if this is mesh geometry
    pub fn is_mesh(&self) -> bool {
        matches!(self, ShapeData::Mesh(_))
    }
}

/// One visual primitive attached to a link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    pub name: String,
    /// Local transform relative to the owning link
    pub matrix: Mat4,
    pub data: ShapeData,
}

impl Shape {
    pub fn new(name: impl Into<String>, data: ShapeData) -> Self {
        Self {
            name: name.into(),
            matrix: Mat4::IDENTITY,
            data,
        }
    }
}

/// A rigid body segment carrying visual geometry and mass properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    /// Unique within a Body
    pub name: String,
    /// Mass in kg
    pub mass: f32,
    /// Center of mass relative to the link frame
    pub center_of_mass: Vec3,
    /// Visual shapes owned by this link
    pub visuals: Vec<Shape>,
}

impl Link {
    /// Create an empty link
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mass: 0.0,
            center_of_mass: Vec3::ZERO,
            visuals: Vec::new(),
        }
    }

    /// Check if the link carries any visual geometry
    pub fn has_visuals(&self) -> bool {
        !self.visuals.is_empty()
    }
}

/// Joint type (closed variant set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum JointType {
    #[default]
    Fixed,
    Revolute,
    Prismatic,
    Screw,
}

impl JointType {
    /// Check if this joint type has a meaningful axis
    pub fn has_axis(&self) -> bool {
        matches!(
            self,
            JointType::Revolute | JointType::Prismatic | JointType::Screw
        )
    }

    /// Display name
    pub fn display_name(&self) -> &'static str {
        match self {
            JointType::Fixed => "fixed",
            JointType::Revolute => "revolute",
            JointType::Prismatic => "prismatic",
            JointType::Screw => "screw",
        }
    }
}

/// Position limits, upper first to match source conventions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointLimits {
    pub upper: f32,
    pub lower: f32,
}

/// A directed parent -> child connection between two links
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Joint {
    pub name: String,
    /// Parent link name (may be [`WORLD_LINK`])
    pub parent: String,
    /// Child link name
    pub child: String,
    pub joint_type: JointType,
    /// Joint axis (for revolute/prismatic/screw)
    pub axis: Vec3,
    /// Translation from parent link frame to joint origin
    pub translation: Vec3,
    /// Rotation from parent link frame to joint origin
    pub rotation: Quat,
    pub limits: Option<JointLimits>,
}

impl Joint {
    /// Create a joint between two named links
    pub fn new(
        name: impl Into<String>,
        parent: impl Into<String>,
        child: impl Into<String>,
        joint_type: JointType,
    ) -> Self {
        Self {
            name: name.into(),
            parent: parent.into(),
            child: child.into(),
            joint_type,
            axis: Vec3::Z,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            limits: None,
        }
    }
}

/// A kinematic body: flat link list plus a flat joint edge list
///
/// Joints are edges, not a tree. Extra non-tree edges modeling closed
/// kinematic chains live in `closed_loops` and never participate in tree
/// reconstruction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Body {
    pub name: String,
    pub links: Vec<Link>,
    pub joints: Vec<Joint>,
    /// Auxiliary constraint edges for closed kinematic chains
    pub closed_loops: Vec<Joint>,
}

impl Body {
    /// Create an empty body
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            links: Vec::new(),
            joints: Vec::new(),
            closed_loops: Vec::new(),
        }
    }

    /// Find a link by name
    pub fn find_link(&self, name: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.name == name)
    }

    /// Validate joint references: every endpoint must resolve to a link,
    /// except the world sentinel as parent.
    pub fn validate(&self) -> Result<(), Vec<BodyError>> {
        let mut errors = Vec::new();

        for joint in self.joints.iter().chain(self.closed_loops.iter()) {
            if joint.parent != WORLD_LINK && self.find_link(&joint.parent).is_none() {
                errors.push(BodyError::UnknownLink {
                    joint: joint.name.clone(),
                    link: joint.parent.clone(),
                });
            }
            if self.find_link(&joint.child).is_none() {
                errors.push(BodyError::UnknownLink {
                    joint: joint.name.clone(),
                    link: joint.child.clone(),
                });
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Body-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum BodyError {
    #[error("joint '{joint}' references unknown link '{link}'")]
    UnknownLink { joint: String, link: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_world_parent() {
        let mut body = Body::new("b");
        body.links.push(Link::new("base"));
        body.joints
            .push(Joint::new("anchor", WORLD_LINK, "base", JointType::Fixed));
        assert!(body.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_child() {
        let mut body = Body::new("b");
        body.links.push(Link::new("base"));
        body.joints
            .push(Joint::new("j", "base", "missing", JointType::Revolute));
        let errors = body.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], BodyError::UnknownLink { link, .. } if link == "missing"));
    }

    #[test]
    fn test_validate_checks_closed_loops() {
        let mut body = Body::new("b");
        body.links.push(Link::new("a"));
        body.closed_loops
            .push(Joint::new("loop", "a", "gone", JointType::Revolute));
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_combined_index_interleaves_rows() {
        let mesh = MeshData {
            vertices: vec![[0.0; 3]; 4],
            vertex_index: vec![[0, 1, 2], [0, 2, 3]],
            normals: Some(vec![[0.0, 0.0, 1.0]; 2]),
            normal_index: Some(vec![[0, 0, 0], [1, 1, 1]]),
            ..Default::default()
        };
        assert_eq!(
            mesh.combined_index(),
            vec![0, 0, 1, 0, 2, 0, 0, 1, 2, 1, 3, 1]
        );
    }

    #[test]
    fn test_combined_index_without_normals() {
        let mesh = MeshData {
            vertices: vec![[0.0; 3]; 3],
            vertex_index: vec![[0, 1, 2]],
            ..Default::default()
        };
        assert_eq!(mesh.combined_index(), vec![0, 1, 2]);
    }
}
