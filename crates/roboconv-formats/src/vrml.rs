//! VRML format adapter
//!
//! VRML robot models are consumed through a [`ModelLoader`] service that
//! parses the file and hands back flat record tables (links, shapes,
//! appearances, materials). The reader maps those records onto the canonical
//! [`Body`]; the writer reconstructs the kinematic tree and renders nested
//! Joint/Segment nodes, one mesh file per mesh shape.

use std::path::Path;

use glam::{Mat4, Quat, Vec3};

use roboconv_core::mesh::{MeshBuilder, MeshError, NormalSource};
use roboconv_core::model::{
    Body, BoxData, CylinderData, Joint, JointLimits, JointType, Link, Material, MeshData, Shape,
    ShapeData, SphereData,
};
use roboconv_core::tree::{TreeError, TreeNode, TreePlan};

/// Flat record tables produced by a model-loading service
#[derive(Debug, Clone, Default)]
pub struct ModelRecords {
    pub name: String,
    pub links: Vec<LinkRecord>,
    pub shapes: Vec<ShapeRecord>,
    pub appearances: Vec<AppearanceRecord>,
    pub materials: Vec<MaterialRecord>,
    pub extra_joints: Vec<ExtraJointRecord>,
}

/// One link record; the joint entering the link is stored on the link itself
#[derive(Debug, Clone)]
pub struct LinkRecord {
    pub name: String,
    /// Indices into [`ModelRecords::links`]
    pub children: Vec<usize>,
    pub shapes: Vec<ShapePlacement>,
    /// Joint label: "fixed", "rotate" or "slide"
    pub joint_type: String,
    pub joint_axis: [f32; 3],
    pub translation: [f32; 3],
    /// Axis-angle rotation
    pub rotation: [f32; 4],
    pub mass: f32,
    pub center_of_mass: [f32; 3],
    pub upper_limit: Option<f32>,
    pub lower_limit: Option<f32>,
}

/// A shape instanced under a link with a local placement
#[derive(Debug, Clone)]
pub struct ShapePlacement {
    /// Index into [`ModelRecords::shapes`]
    pub index: usize,
    /// Row-major 3x4 transform
    pub transform: [f32; 12],
}

#[derive(Debug, Clone)]
pub struct ShapeRecord {
    pub primitive: PrimitiveRecord,
    /// Index into [`ModelRecords::appearances`]
    pub appearance: Option<usize>,
}

#[derive(Debug, Clone)]
pub enum PrimitiveRecord {
    Mesh {
        vertices: Vec<[f32; 3]>,
        triangles: Vec<[u32; 3]>,
    },
    Sphere {
        radius: f32,
    },
    Cylinder {
        radius: f32,
        height: f32,
    },
    Box {
        x: f32,
        y: f32,
        z: f32,
    },
}

/// Normals and material binding for a mesh shape
#[derive(Debug, Clone, Default)]
pub struct AppearanceRecord {
    pub normals: Vec<[f32; 3]>,
    /// Flat corner index stream; empty when normals follow the implicit
    /// addressing for their granularity
    pub normal_indices: Vec<u32>,
    /// Normals per vertex when true, per face when false
    pub normal_per_vertex: bool,
    /// Index into [`ModelRecords::materials`]
    pub material: Option<usize>,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MaterialRecord {
    pub ambient_intensity: f32,
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub emissive: [f32; 3],
    pub shininess: f32,
    pub transparency: f32,
}

/// A non-tree constraint between two links
#[derive(Debug, Clone)]
pub struct ExtraJointRecord {
    pub name: String,
    pub link: [String; 2],
    pub axis: [f32; 3],
}

/// Model-loading service boundary
///
/// Implementations own the actual VRML parsing; anything that can produce
/// [`ModelRecords`] plugs in here.
pub trait ModelLoader {
    fn load_model(&self, path: &Path) -> Result<ModelRecords, VrmlError>;
}

/// VRML reader, generic over the loading service
pub struct VrmlReader<L: ModelLoader> {
    loader: L,
}

impl<L: ModelLoader> VrmlReader<L> {
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    /// Load a VRML model and map it onto a canonical Body
    pub fn read(&self, path: impl AsRef<Path>) -> Result<Body, VrmlError> {
        let records = self.loader.load_model(path.as_ref())?;
        self.convert(&records)
    }

    fn convert(&self, records: &ModelRecords) -> Result<Body, VrmlError> {
        let mut body = Body::new(records.name.clone());

        for record in &records.links {
            body.links.push(self.convert_link(record, records)?);
        }

        // Child link records carry the joint entering them
        for record in &records.links {
            for &child_index in &record.children {
                let child = records
                    .links
                    .get(child_index)
                    .ok_or(VrmlError::BadLinkIndex(child_index))?;
                body.joints.push(convert_joint(record, child)?);
            }
        }

        for extra in &records.extra_joints {
            let mut joint = Joint::new(
                extra.name.clone(),
                extra.link[0].clone(),
                extra.link[1].clone(),
                JointType::Revolute,
            );
            joint.axis = Vec3::from_array(extra.axis);
            body.closed_loops.push(joint);
        }

        body.validate()
            .map_err(|errors| VrmlError::Structure(format!("{:?}", errors)))?;

        Ok(body)
    }

    fn convert_link(&self, record: &LinkRecord, records: &ModelRecords) -> Result<Link, VrmlError> {
        let mut link = Link::new(record.name.clone());
        link.mass = record.mass;
        link.center_of_mass = Vec3::from_array(record.center_of_mass);

        for (i, placement) in record.shapes.iter().enumerate() {
            let shape_record = records
                .shapes
                .get(placement.index)
                .ok_or(VrmlError::BadShapeIndex(placement.index))?;

            let data = match &shape_record.primitive {
                PrimitiveRecord::Mesh {
                    vertices,
                    triangles,
                } => ShapeData::Mesh(build_mesh(
                    vertices.clone(),
                    triangles.clone(),
                    shape_record.appearance,
                    records,
                )?),
                PrimitiveRecord::Sphere { radius } => ShapeData::Sphere(SphereData {
                    radius: *radius,
                    material: appearance_material(shape_record.appearance, records),
                }),
                PrimitiveRecord::Cylinder { radius, height } => {
                    ShapeData::Cylinder(CylinderData {
                        radius: *radius,
                        height: *height,
                        material: appearance_material(shape_record.appearance, records),
                    })
                }
                PrimitiveRecord::Box { x, y, z } => ShapeData::Box(BoxData {
                    x: *x,
                    y: *y,
                    z: *z,
                    material: appearance_material(shape_record.appearance, records),
                }),
            };

            link.visuals.push(Shape {
                name: format!("{}-{}", record.name, i),
                matrix: matrix_from_rows(&placement.transform),
                data,
            });
        }

        Ok(link)
    }
}

fn convert_joint(parent: &LinkRecord, child: &LinkRecord) -> Result<Joint, VrmlError> {
    let joint_type = match child.joint_type.as_str() {
        "fixed" => JointType::Fixed,
        "rotate" => JointType::Revolute,
        "slide" => JointType::Prismatic,
        other => return Err(VrmlError::UnsupportedJoint(other.to_string())),
    };

    let mut joint = Joint::new(
        format!("{}-{}", parent.name, child.name),
        parent.name.clone(),
        child.name.clone(),
        joint_type,
    );
    joint.axis = Vec3::from_array(child.joint_axis);
    joint.translation = Vec3::from_array(child.translation);
    joint.rotation = quat_from_axis_angle(child.rotation);

    if let (Some(upper), Some(lower)) = (child.upper_limit, child.lower_limit) {
        joint.limits = Some(JointLimits { upper, lower });
    }

    Ok(joint)
}

fn build_mesh(
    vertices: Vec<[f32; 3]>,
    triangles: Vec<[u32; 3]>,
    appearance: Option<usize>,
    records: &ModelRecords,
) -> Result<MeshData, VrmlError> {
    let mut builder = MeshBuilder::new(vertices, triangles);

    if let Some(index) = appearance {
        let appearance = records
            .appearances
            .get(index)
            .ok_or(VrmlError::BadAppearanceIndex(index))?;

        if !appearance.normals.is_empty() {
            let source = if appearance.normal_per_vertex {
                NormalSource::PerVertex {
                    indices: (!appearance.normal_indices.is_empty()).then(|| {
                        appearance
                            .normal_indices
                            .chunks_exact(3)
                            .map(|c| [c[0], c[1], c[2]])
                            .collect()
                    }),
                }
            } else {
                NormalSource::PerFace {
                    indices: (!appearance.normal_indices.is_empty())
                        .then(|| appearance.normal_indices.clone()),
                }
            };
            builder = builder.normals(appearance.normals.clone(), source);
        }

        if let Some(material) = appearance_material(Some(index), records) {
            builder = builder.material(material);
        }
        if let Some(image) = &appearance.image {
            builder = builder.image(image.clone());
        }
    }

    Ok(builder.build()?)
}

fn appearance_material(appearance: Option<usize>, records: &ModelRecords) -> Option<Material> {
    let index = records.appearances.get(appearance?)?.material?;
    let record = records.materials.get(index)?;

    let mut material = Material::new(format!("material-{index}"));
    let i = record.ambient_intensity;
    material.ambient = [i, i, i, 1.0];
    material.diffuse = [record.diffuse[0], record.diffuse[1], record.diffuse[2], 1.0];
    material.specular = [
        record.specular[0],
        record.specular[1],
        record.specular[2],
        1.0,
    ];
    material.emission = [
        record.emissive[0],
        record.emissive[1],
        record.emissive[2],
        1.0,
    ];
    material.shininess = record.shininess;
    material.transparency = record.transparency;
    Some(material)
}

/// Row-major 3x4 transform to a column-major matrix
fn matrix_from_rows(m: &[f32; 12]) -> Mat4 {
    Mat4::from_cols_array(&[
        m[0], m[4], m[8], 0.0, //
        m[1], m[5], m[9], 0.0, //
        m[2], m[6], m[10], 0.0, //
        m[3], m[7], m[11], 1.0,
    ])
}

/// Axis-angle to quaternion; a degenerate axis falls back to identity
fn quat_from_axis_angle(rotation: [f32; 4]) -> Quat {
    let axis = Vec3::new(rotation[0], rotation[1], rotation[2]);
    let normalized = axis.normalize_or_zero();
    if normalized == Vec3::ZERO {
        Quat::IDENTITY
    } else {
        Quat::from_axis_angle(normalized, rotation[3])
    }
}

/// VRML writer
#[derive(Debug)]
pub struct VrmlWriter {
    /// Root link name used when the edge list yields no root candidate
    pub default_root: String,
}

impl Default for VrmlWriter {
    fn default() -> Self {
        Self {
            default_root: "waist".to_string(),
        }
    }
}

impl VrmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a canonical Body as a VRML model; mesh shapes go to separate
    /// `<body>-<shape>.wrl` files referenced by Inline nodes.
    pub fn write(&self, body: &Body, path: impl AsRef<Path>) -> Result<(), VrmlError> {
        let path = path.as_ref();
        body.validate()
            .map_err(|errors| VrmlError::Structure(format!("{:?}", errors)))?;

        let plan = TreePlan::build(body, &self.default_root)?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));

        let mut wrl = String::new();
        wrl.push_str("#VRML V2.0 utf8\n\n");
        wrl.push_str(PROTO_HEADER);

        wrl.push_str(&format!("DEF {} Humanoid {{\n", identifier(&body.name)));
        wrl.push_str("  humanoidBody [\n");
        self.render_node(&mut wrl, body, &plan, &plan.tree, dir, 2)?;
        wrl.push_str("  ]\n");

        if !body.closed_loops.is_empty() {
            wrl.push_str("  extraJoints [\n");
            for joint in &body.closed_loops {
                wrl.push_str(&format!(
                    "    DEF {} ExtraJoint {{\n      link1Name \"{}\"\n      link2Name \"{}\"\n      axis {} {} {}\n    }}\n",
                    identifier(&joint.name),
                    joint.parent,
                    joint.child,
                    joint.axis.x,
                    joint.axis.y,
                    joint.axis.z
                ));
            }
            wrl.push_str("  ]\n");
        }

        wrl.push_str(&format!("  name \"{}\"\n}}\n", body.name));

        std::fs::write(path, &wrl).map_err(|e| VrmlError::Io(e.to_string()))?;
        Ok(())
    }

    fn render_node(
        &self,
        wrl: &mut String,
        body: &Body,
        plan: &TreePlan,
        node: &TreeNode,
        dir: &Path,
        depth: usize,
    ) -> Result<(), VrmlError> {
        let indent = "  ".repeat(depth);
        let joint = &node.joint;
        let joint_id = plan.joint_index.get(&joint.name).copied().unwrap_or(0);
        let label = match joint.joint_type {
            JointType::Fixed => "fixed",
            JointType::Revolute | JointType::Screw => "rotate",
            JointType::Prismatic => "slide",
        };

        wrl.push_str(&format!(
            "{indent}DEF {} Joint {{\n",
            identifier(&joint.name)
        ));
        wrl.push_str(&format!("{indent}  jointType \"{label}\"\n"));
        wrl.push_str(&format!("{indent}  jointId {joint_id}\n"));
        wrl.push_str(&format!(
            "{indent}  translation {} {} {}\n",
            joint.translation.x, joint.translation.y, joint.translation.z
        ));
        let (axis, angle) = joint.rotation.to_axis_angle();
        if angle != 0.0 {
            wrl.push_str(&format!(
                "{indent}  rotation {} {} {} {}\n",
                axis.x, axis.y, axis.z, angle
            ));
        }
        if joint.joint_type.has_axis() {
            wrl.push_str(&format!(
                "{indent}  jointAxis {} {} {}\n",
                joint.axis.x, joint.axis.y, joint.axis.z
            ));
        }
        if let Some(limits) = &joint.limits {
            wrl.push_str(&format!("{indent}  ulimit [{}]\n", limits.upper));
            wrl.push_str(&format!("{indent}  llimit [{}]\n", limits.lower));
        }

        wrl.push_str(&format!("{indent}  children [\n"));

        if let Some(link) = node.link.as_ref().filter(|l| l.has_visuals()) {
            self.render_segment(wrl, body, link, dir, depth + 2)?;
        }
        for child in &node.children {
            self.render_node(wrl, body, plan, child, dir, depth + 2)?;
        }

        wrl.push_str(&format!("{indent}  ]\n{indent}}}\n"));
        Ok(())
    }

    fn render_segment(
        &self,
        wrl: &mut String,
        body: &Body,
        link: &Link,
        dir: &Path,
        depth: usize,
    ) -> Result<(), VrmlError> {
        let indent = "  ".repeat(depth);
        wrl.push_str(&format!(
            "{indent}DEF {} Segment {{\n",
            identifier(&link.name)
        ));
        wrl.push_str(&format!(
            "{indent}  centerOfMass {} {} {}\n",
            link.center_of_mass.x, link.center_of_mass.y, link.center_of_mass.z
        ));
        wrl.push_str(&format!("{indent}  mass {}\n", link.mass));
        wrl.push_str(&format!("{indent}  children [\n"));

        for shape in &link.visuals {
            let (_, rotation, translation) = shape.matrix.to_scale_rotation_translation();
            let (axis, angle) = rotation.to_axis_angle();

            wrl.push_str(&format!("{indent}    Transform {{\n"));
            wrl.push_str(&format!(
                "{indent}      translation {} {} {}\n",
                translation.x, translation.y, translation.z
            ));
            if angle != 0.0 {
                wrl.push_str(&format!(
                    "{indent}      rotation {} {} {} {}\n",
                    axis.x, axis.y, axis.z, angle
                ));
            }
            wrl.push_str(&format!("{indent}      children [\n"));

            match &shape.data {
                ShapeData::Mesh(mesh) => {
                    let filename =
                        format!("{}-{}.wrl", identifier(&body.name), identifier(&shape.name));
                    write_mesh_file(mesh, &dir.join(&filename))?;
                    wrl.push_str(&format!(
                        "{indent}        Inline {{ url \"{filename}\" }}\n"
                    ));
                }
                ShapeData::Sphere(s) => {
                    render_primitive(
                        wrl,
                        &format!("Sphere {{ radius {} }}", s.radius),
                        s.material.as_ref(),
                        depth + 4,
                    );
                }
                ShapeData::Cylinder(c) => {
                    render_primitive(
                        wrl,
                        &format!("Cylinder {{ radius {} height {} }}", c.radius, c.height),
                        c.material.as_ref(),
                        depth + 4,
                    );
                }
                ShapeData::Box(b) => {
                    render_primitive(
                        wrl,
                        &format!("Box {{ size {} {} {} }}", b.x, b.y, b.z),
                        b.material.as_ref(),
                        depth + 4,
                    );
                }
            }

            wrl.push_str(&format!("{indent}      ]\n{indent}    }}\n"));
        }

        wrl.push_str(&format!("{indent}  ]\n{indent}}}\n"));
        Ok(())
    }
}

fn render_primitive(wrl: &mut String, geometry: &str, material: Option<&Material>, depth: usize) {
    let indent = "  ".repeat(depth);
    wrl.push_str(&format!("{indent}Shape {{\n"));
    if let Some(material) = material {
        wrl.push_str(&format!("{indent}  appearance Appearance {{\n"));
        render_material(wrl, material, depth + 2);
        wrl.push_str(&format!("{indent}  }}\n"));
    }
    wrl.push_str(&format!("{indent}  geometry {geometry}\n"));
    wrl.push_str(&format!("{indent}}}\n"));
}

fn render_material(wrl: &mut String, material: &Material, depth: usize) {
    let indent = "  ".repeat(depth);
    wrl.push_str(&format!("{indent}material Material {{\n"));
    wrl.push_str(&format!(
        "{indent}  diffuseColor {} {} {}\n",
        material.diffuse[0], material.diffuse[1], material.diffuse[2]
    ));
    wrl.push_str(&format!(
        "{indent}  specularColor {} {} {}\n",
        material.specular[0], material.specular[1], material.specular[2]
    ));
    wrl.push_str(&format!(
        "{indent}  emissiveColor {} {} {}\n",
        material.emission[0], material.emission[1], material.emission[2]
    ));
    wrl.push_str(&format!("{indent}  shininess {}\n", material.shininess));
    wrl.push_str(&format!(
        "{indent}  transparency {}\n",
        material.transparency
    ));
    wrl.push_str(&format!("{indent}}}\n"));
}

/// Write a mesh as a standalone VRML file with an IndexedFaceSet
fn write_mesh_file(mesh: &MeshData, path: &Path) -> Result<(), VrmlError> {
    let mut wrl = String::new();
    wrl.push_str("#VRML V2.0 utf8\n\nShape {\n");

    if let Some(material) = &mesh.material {
        wrl.push_str("  appearance Appearance {\n");
        render_material(&mut wrl, material, 2);
        if let Some(image) = &mesh.image {
            wrl.push_str(&format!(
                "    texture ImageTexture {{ url \"{image}\" }}\n"
            ));
        }
        wrl.push_str("  }\n");
    }

    wrl.push_str("  geometry IndexedFaceSet {\n");
    wrl.push_str("    coord Coordinate {\n      point [\n");
    for v in &mesh.vertices {
        wrl.push_str(&format!("        {} {} {},\n", v[0], v[1], v[2]));
    }
    wrl.push_str("      ]\n    }\n");

    wrl.push_str("    coordIndex [\n");
    for tri in &mesh.vertex_index {
        wrl.push_str(&format!("      {} {} {} -1,\n", tri[0], tri[1], tri[2]));
    }
    wrl.push_str("    ]\n");

    if let (Some(normals), Some(normal_index)) = (&mesh.normals, &mesh.normal_index) {
        wrl.push_str("    normalPerVertex TRUE\n");
        wrl.push_str("    normal Normal {\n      vector [\n");
        for n in normals {
            wrl.push_str(&format!("        {} {} {},\n", n[0], n[1], n[2]));
        }
        wrl.push_str("      ]\n    }\n");
        wrl.push_str("    normalIndex [\n");
        for tri in normal_index {
            wrl.push_str(&format!("      {} {} {} -1,\n", tri[0], tri[1], tri[2]));
        }
        wrl.push_str("    ]\n");
    }

    wrl.push_str("  }\n}\n");

    std::fs::write(path, &wrl).map_err(|e| VrmlError::Io(e.to_string()))?;
    Ok(())
}

/// VRML identifiers cannot contain spaces or punctuation
fn identifier(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

const PROTO_HEADER: &str = r#"PROTO Joint [
  exposedField SFString jointType "fixed"
  exposedField SFInt32 jointId -1
  exposedField SFVec3f translation 0 0 0
  exposedField SFRotation rotation 0 0 1 0
  exposedField SFVec3f jointAxis 0 0 1
  exposedField MFFloat ulimit []
  exposedField MFFloat llimit []
  exposedField MFNode children []
] { Transform { translation IS translation rotation IS rotation children IS children } }

PROTO Segment [
  exposedField SFVec3f centerOfMass 0 0 0
  exposedField SFFloat mass 0
  exposedField MFNode children []
] { Group { children IS children } }

PROTO ExtraJoint [
  exposedField SFString link1Name ""
  exposedField SFString link2Name ""
  exposedField SFVec3f axis 0 0 1
] { Group {} }

PROTO Humanoid [
  exposedField SFString name ""
  exposedField MFNode humanoidBody []
  exposedField MFNode extraJoints []
] { Group { children IS humanoidBody } }

"#;

/// VRML-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum VrmlError {
    #[error("Failed to load VRML model: {0}")]
    Load(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Invalid structure: {0}")]
    Structure(String),
    #[error("Unsupported joint type: {0}")]
    UnsupportedJoint(String),
    #[error("Link record index {0} out of range")]
    BadLinkIndex(usize),
    #[error("Shape record index {0} out of range")]
    BadShapeIndex(usize),
    #[error("Appearance record index {0} out of range")]
    BadAppearanceIndex(usize),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
}
