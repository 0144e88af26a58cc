//! URDF format adapter
//!
//! Reading delegates parsing to `urdf-rs` and maps the robot onto the
//! canonical [`Body`]. Writing renders URDF XML directly and saves mesh
//! payloads as STL files next to the output.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::{EulerRot, Mat4, Quat, Vec3};

use roboconv_core::mesh::MeshError;
use roboconv_core::model::{
    Body, BoxData, CylinderData, Joint, JointLimits, JointType, Link, Material, Shape, ShapeData,
    SphereData,
};

use crate::stl::{StlError, load_stl, save_stl};

/// URDF reader
#[derive(Debug, Default)]
pub struct UrdfReader {
    /// Base directory for resolving relative mesh paths; defaults to the
    /// URDF file's parent directory
    pub base_dir: Option<PathBuf>,
}

impl UrdfReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a URDF file into a canonical Body
    pub fn read(&self, path: impl AsRef<Path>) -> Result<Body, UrdfError> {
        let path = path.as_ref();
        let robot = urdf_rs::read_file(path).map_err(|e| UrdfError::Parse(e.to_string()))?;

        let base_dir = self
            .base_dir
            .clone()
            .or_else(|| path.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));

        if robot.links.is_empty() {
            return Err(UrdfError::EmptyRobot);
        }

        // Named material definitions, referenced by visuals
        let materials: HashMap<String, Material> = robot
            .materials
            .iter()
            .map(|m| (m.name.clone(), convert_material(m)))
            .collect();

        let mut body = Body::new(robot.name.clone());

        for urdf_link in &robot.links {
            let mut link = Link::new(urdf_link.name.clone());
            link.mass = urdf_link.inertial.mass.value as f32;
            link.center_of_mass = vec3_from(&urdf_link.inertial.origin.xyz);

            for (i, visual) in urdf_link.visual.iter().enumerate() {
                let name = visual
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("{}-visual-{}", urdf_link.name, i));
                let material = visual
                    .material
                    .as_ref()
                    .map(|m| resolve_material(m, &materials));
                let data = convert_geometry(&visual.geometry, material, &base_dir)?;
                link.visuals.push(Shape {
                    name,
                    matrix: pose_to_matrix(&visual.origin),
                    data,
                });
            }

            body.links.push(link);
        }

        for urdf_joint in &robot.joints {
            body.joints.push(convert_joint(urdf_joint)?);
        }

        body.validate()
            .map_err(|errors| UrdfError::Structure(format!("{:?}", errors)))?;

        Ok(body)
    }
}

/// Resolve a visual's material: inline color wins, then the named table
fn resolve_material(
    urdf_material: &urdf_rs::Material,
    materials: &HashMap<String, Material>,
) -> Material {
    if urdf_material.color.is_some() {
        convert_material(urdf_material)
    } else {
        materials
            .get(&urdf_material.name)
            .cloned()
            .unwrap_or_else(|| Material::new(urdf_material.name.clone()))
    }
}

fn convert_material(urdf_material: &urdf_rs::Material) -> Material {
    let mut material = Material::new(urdf_material.name.clone());
    if let Some(color) = &urdf_material.color {
        material.diffuse = [
            color.rgba.0[0] as f32,
            color.rgba.0[1] as f32,
            color.rgba.0[2] as f32,
            color.rgba.0[3] as f32,
        ];
    }
    material
}

fn convert_geometry(
    geometry: &urdf_rs::Geometry,
    material: Option<Material>,
    base_dir: &Path,
) -> Result<ShapeData, UrdfError> {
    let data = match geometry {
        urdf_rs::Geometry::Mesh { filename, scale } => {
            let mesh_path = resolve_mesh_path(filename, base_dir)?;
            let mut mesh = load_stl(&mesh_path)?;
            if let Some(s) = scale {
                for v in &mut mesh.vertices {
                    v[0] *= s.0[0] as f32;
                    v[1] *= s.0[1] as f32;
                    v[2] *= s.0[2] as f32;
                }
            }
            mesh.material = material;
            ShapeData::Mesh(mesh)
        }
        urdf_rs::Geometry::Box { size } => ShapeData::Box(BoxData {
            x: size.0[0] as f32,
            y: size.0[1] as f32,
            z: size.0[2] as f32,
            material,
        }),
        urdf_rs::Geometry::Cylinder { radius, length } => ShapeData::Cylinder(CylinderData {
            radius: *radius as f32,
            height: *length as f32,
            material,
        }),
        urdf_rs::Geometry::Sphere { radius } => ShapeData::Sphere(SphereData {
            radius: *radius as f32,
            material,
        }),
        // Capsule is not in the canonical variant set, approximate as cylinder
        urdf_rs::Geometry::Capsule { radius, length } => ShapeData::Cylinder(CylinderData {
            radius: *radius as f32,
            height: *length as f32,
            material,
        }),
    };
    Ok(data)
}

fn convert_joint(urdf_joint: &urdf_rs::Joint) -> Result<Joint, UrdfError> {
    let joint_type = match urdf_joint.joint_type {
        urdf_rs::JointType::Fixed => JointType::Fixed,
        urdf_rs::JointType::Revolute | urdf_rs::JointType::Continuous => JointType::Revolute,
        urdf_rs::JointType::Prismatic => JointType::Prismatic,
        ref other => {
            return Err(UrdfError::UnsupportedJointType(format!("{:?}", other)));
        }
    };

    let limits = match joint_type {
        JointType::Revolute | JointType::Prismatic => Some(JointLimits {
            upper: urdf_joint.limit.upper as f32,
            lower: urdf_joint.limit.lower as f32,
        }),
        _ => None,
    };

    Ok(Joint {
        name: urdf_joint.name.clone(),
        parent: urdf_joint.parent.link.clone(),
        child: urdf_joint.child.link.clone(),
        joint_type,
        axis: vec3_from(&urdf_joint.axis.xyz),
        translation: vec3_from(&urdf_joint.origin.xyz),
        rotation: rpy_to_quat(&urdf_joint.origin.rpy),
        limits,
    })
}

/// Resolve a mesh filename reference against the document base directory
fn resolve_mesh_path(filename: &str, base_dir: &Path) -> Result<PathBuf, UrdfError> {
    // package://package_name/path/to/file: search upward from the base dir
    if let Some(rest) = filename.strip_prefix("package://") {
        let relative = rest.splitn(2, '/').nth(1).unwrap_or("");
        check_mesh_format(relative)?;
        let candidates = [
            base_dir.join(relative),
            base_dir.join("..").join(relative),
            base_dir.join("..").join("..").join(relative),
        ];
        for candidate in &candidates {
            if candidate.exists() {
                return Ok(candidate.clone());
            }
        }
        return Err(UrdfError::MeshNotFound {
            path: filename.to_string(),
        });
    }

    let path_str = filename.strip_prefix("file://").unwrap_or(filename);
    check_mesh_format(path_str)?;

    let path = if Path::new(path_str).is_absolute() {
        PathBuf::from(path_str)
    } else {
        base_dir.join(path_str)
    };

    if !path.exists() {
        return Err(UrdfError::MeshNotFound {
            path: path.to_string_lossy().to_string(),
        });
    }
    Ok(path)
}

fn check_mesh_format(path: &str) -> Result<(), UrdfError> {
    match Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("stl") => Ok(()),
        other => Err(UrdfError::UnsupportedMeshFormat(
            other.unwrap_or("unknown").to_string(),
        )),
    }
}

fn vec3_from(v: &urdf_rs::Vec3) -> Vec3 {
    Vec3::new(v.0[0] as f32, v.0[1] as f32, v.0[2] as f32)
}

/// URDF rpy is fixed-axis roll/pitch/yaw
fn rpy_to_quat(rpy: &urdf_rs::Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::ZYX,
        rpy.0[2] as f32,
        rpy.0[1] as f32,
        rpy.0[0] as f32,
    )
}

fn pose_to_matrix(pose: &urdf_rs::Pose) -> Mat4 {
    Mat4::from_rotation_translation(rpy_to_quat(&pose.rpy), vec3_from(&pose.xyz))
}

/// URDF writer
#[derive(Debug, Default)]
pub struct UrdfWriter;

impl UrdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write a canonical Body as a URDF file; mesh shapes are saved as STL
    /// files next to the output.
    pub fn write(&self, body: &Body, path: impl AsRef<Path>) -> Result<(), UrdfError> {
        let path = path.as_ref();
        body.validate()
            .map_err(|errors| UrdfError::Structure(format!("{:?}", errors)))?;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));

        // URDF is an edge list, but it cannot express non-tree constraints
        for joint in &body.closed_loops {
            tracing::warn!(joint = joint.name, "closed-loop joint dropped in URDF output");
        }

        let mut urdf = String::new();
        urdf.push_str(&format!(
            "<?xml version=\"1.0\"?>\n<robot name=\"{}\">\n\n",
            xml_escape(&body.name)
        ));

        // Unique material definitions referenced by shapes
        let mut materials: Vec<&Material> = Vec::new();
        for link in &body.links {
            for shape in &link.visuals {
                if let Some(material) = shape_material(&shape.data) {
                    if !materials.iter().any(|m| m.name == material.name) {
                        materials.push(material);
                    }
                }
            }
        }
        for material in &materials {
            urdf.push_str(&format!(
                "  <material name=\"{}\">\n    <color rgba=\"{} {} {} {}\"/>\n  </material>\n\n",
                xml_escape(&material.name),
                material.diffuse[0],
                material.diffuse[1],
                material.diffuse[2],
                material.diffuse[3]
            ));
        }

        for link in &body.links {
            self.write_link(&mut urdf, body, link, dir)?;
        }
        for joint in &body.joints {
            write_joint(&mut urdf, joint);
        }

        urdf.push_str("</robot>\n");

        std::fs::write(path, &urdf).map_err(|e| UrdfError::Io(e.to_string()))?;
        Ok(())
    }

    fn write_link(
        &self,
        urdf: &mut String,
        body: &Body,
        link: &Link,
        dir: &Path,
    ) -> Result<(), UrdfError> {
        urdf.push_str(&format!("  <link name=\"{}\">\n", xml_escape(&link.name)));

        if link.mass > 0.0 {
            urdf.push_str("    <inertial>\n");
            urdf.push_str(&format!(
                "      <origin xyz=\"{} {} {}\" rpy=\"0 0 0\"/>\n",
                link.center_of_mass.x, link.center_of_mass.y, link.center_of_mass.z
            ));
            urdf.push_str(&format!("      <mass value=\"{}\"/>\n", link.mass));
            urdf.push_str(
                "      <inertia ixx=\"0\" ixy=\"0\" ixz=\"0\" iyy=\"0\" iyz=\"0\" izz=\"0\"/>\n",
            );
            urdf.push_str("    </inertial>\n");
        }

        for shape in &link.visuals {
            urdf.push_str("    <visual>\n");
            write_origin(urdf, shape.matrix);

            let geometry = match &shape.data {
                ShapeData::Mesh(mesh) => {
                    let filename = format!("{}-{}.stl", sanitize_filename(&body.name),
                        sanitize_filename(&shape.name));
                    save_stl(mesh, dir.join(&filename))?;
                    format!("<mesh filename=\"{}\"/>", xml_escape(&filename))
                }
                ShapeData::Box(b) => format!("<box size=\"{} {} {}\"/>", b.x, b.y, b.z),
                ShapeData::Cylinder(c) => {
                    format!("<cylinder radius=\"{}\" length=\"{}\"/>", c.radius, c.height)
                }
                ShapeData::Sphere(s) => format!("<sphere radius=\"{}\"/>", s.radius),
            };
            urdf.push_str(&format!(
                "      <geometry>\n        {}\n      </geometry>\n",
                geometry
            ));

            if let Some(material) = shape_material(&shape.data) {
                urdf.push_str(&format!(
                    "      <material name=\"{}\"/>\n",
                    xml_escape(&material.name)
                ));
            }
            urdf.push_str("    </visual>\n");
        }

        urdf.push_str("  </link>\n\n");
        Ok(())
    }
}

fn shape_material(data: &ShapeData) -> Option<&Material> {
    match data {
        ShapeData::Mesh(m) => m.material.as_ref(),
        ShapeData::Sphere(s) => s.material.as_ref(),
        ShapeData::Cylinder(c) => c.material.as_ref(),
        ShapeData::Box(b) => b.material.as_ref(),
    }
}

fn write_origin(urdf: &mut String, matrix: Mat4) {
    let (_, rotation, translation) = matrix.to_scale_rotation_translation();
    let (yaw, pitch, roll) = rotation.to_euler(EulerRot::ZYX);
    urdf.push_str(&format!(
        "      <origin xyz=\"{} {} {}\" rpy=\"{} {} {}\"/>\n",
        translation.x, translation.y, translation.z, roll, pitch, yaw
    ));
}

fn write_joint(urdf: &mut String, joint: &Joint) {
    let type_str = match joint.joint_type {
        JointType::Fixed => "fixed",
        JointType::Revolute => "revolute",
        JointType::Prismatic => "prismatic",
        // URDF has no screw joint
        JointType::Screw => "revolute",
    };

    urdf.push_str(&format!(
        "  <joint name=\"{}\" type=\"{}\">\n",
        xml_escape(&joint.name),
        type_str
    ));
    urdf.push_str(&format!(
        "    <parent link=\"{}\"/>\n",
        xml_escape(&joint.parent)
    ));
    urdf.push_str(&format!(
        "    <child link=\"{}\"/>\n",
        xml_escape(&joint.child)
    ));

    let (yaw, pitch, roll) = joint.rotation.to_euler(EulerRot::ZYX);
    urdf.push_str(&format!(
        "    <origin xyz=\"{} {} {}\" rpy=\"{} {} {}\"/>\n",
        joint.translation.x, joint.translation.y, joint.translation.z, roll, pitch, yaw
    ));

    if joint.joint_type.has_axis() {
        urdf.push_str(&format!(
            "    <axis xyz=\"{} {} {}\"/>\n",
            joint.axis.x, joint.axis.y, joint.axis.z
        ));
    }

    if let Some(limits) = &joint.limits {
        urdf.push_str(&format!(
            "    <limit lower=\"{}\" upper=\"{}\" effort=\"0\" velocity=\"0\"/>\n",
            limits.lower, limits.upper
        ));
    }

    urdf.push_str("  </joint>\n\n");
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// URDF-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrdfError {
    #[error("Failed to parse URDF: {0}")]
    Parse(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Empty URDF: no links defined")]
    EmptyRobot,
    #[error("Invalid structure: {0}")]
    Structure(String),
    #[error("Unsupported joint type: {0}")]
    UnsupportedJointType(String),
    #[error("Unsupported mesh format: {0} (only STL is supported)")]
    UnsupportedMeshFormat(String),
    #[error("Mesh file not found: {path}")]
    MeshNotFound { path: String },
    #[error(transparent)]
    Stl(#[from] StlError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use roboconv_core::model::MeshData;

    fn sample_body() -> Body {
        let mut body = Body::new("arm");

        let mut base = Link::new("base");
        base.mass = 2.0;
        base.visuals.push(Shape::new(
            "base-box",
            ShapeData::Box(BoxData {
                x: 0.2,
                y: 0.2,
                z: 0.1,
                material: Some(Material::new("gray")),
            }),
        ));

        let mut upper = Link::new("upper");
        upper.mass = 1.0;
        upper.visuals.push(Shape::new(
            "upper-mesh",
            ShapeData::Mesh(MeshData {
                vertices: vec![[0.0, 0.0, 0.0], [0.1, 0.0, 0.0], [0.0, 0.1, 0.0]],
                vertex_index: vec![[0, 1, 2]],
                ..Default::default()
            }),
        ));

        let mut joint = Joint::new("shoulder", "base", "upper", JointType::Revolute);
        joint.axis = Vec3::Y;
        joint.translation = Vec3::new(0.0, 0.0, 0.1);
        joint.limits = Some(JointLimits {
            upper: 1.5,
            lower: -1.5,
        });
        body.joints.push(joint);

        body.links.push(base);
        body.links.push(upper);
        body
    }

    #[test]
    fn test_write_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arm.urdf");

        UrdfWriter::new().write(&sample_body(), &path).unwrap();
        let body = UrdfReader::new().read(&path).unwrap();

        assert_eq!(body.name, "arm");
        assert_eq!(body.links.len(), 2);
        assert_eq!(body.joints.len(), 1);

        let joint = &body.joints[0];
        assert_eq!(joint.joint_type, JointType::Revolute);
        assert_eq!(joint.parent, "base");
        assert_eq!(joint.child, "upper");
        let limits = joint.limits.unwrap();
        assert_eq!(limits.upper, 1.5);
        assert_eq!(limits.lower, -1.5);

        // Mesh geometry went through an STL file and back
        let upper = body.find_link("upper").unwrap();
        let ShapeData::Mesh(mesh) = &upper.visuals[0].data else {
            panic!("expected mesh visual");
        };
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_unsupported_joint_type_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planar.urdf");
        std::fs::write(
            &path,
            r#"<?xml version="1.0"?>
<robot name="r">
  <link name="a"/>
  <link name="b"/>
  <joint name="j" type="planar">
    <parent link="a"/>
    <child link="b"/>
  </joint>
</robot>"#,
        )
        .unwrap();

        let result = UrdfReader::new().read(&path);
        assert!(matches!(result, Err(UrdfError::UnsupportedJointType(_))));
    }

    #[test]
    fn test_reader_rejects_dangling_joint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.urdf");
        std::fs::write(
            &path,
            r#"<?xml version="1.0"?>
<robot name="r">
  <link name="a"/>
  <joint name="j" type="fixed">
    <parent link="a"/>
    <child link="missing"/>
  </joint>
</robot>"#,
        )
        .unwrap();

        let result = UrdfReader::new().read(&path);
        assert!(matches!(result, Err(UrdfError::Structure(_))));
    }

    #[test]
    fn test_mesh_format_check() {
        assert!(matches!(
            resolve_mesh_path("meshes/link.dae", Path::new(".")),
            Err(UrdfError::UnsupportedMeshFormat(_))
        ));
    }
}
