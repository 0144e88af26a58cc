//! Scene-graph walker
//!
//! Bidirectional conversion between a nested transform/geometry node graph
//! (as mesh-scene formats model a document) and the canonical flat list of
//! [`Shape`]s with cumulative local transforms. The node types here are
//! transient working data, discarded after conversion.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::Mat4;

use crate::model::{Link, Material, MeshData, Shape, ShapeData};

/// Asset relocation callback: absolute texture path -> relocated handle
pub type AssetHandler<'a> = dyn Fn(&Path) -> String + 'a;

/// A node in the transient scene graph
#[derive(Debug, Clone)]
pub enum SceneNode {
    Transform(TransformNode),
    Geometry(GeometryNode),
}

/// Grouping node carrying a local transform
#[derive(Debug, Clone)]
pub struct TransformNode {
    pub name: String,
    pub matrix: Mat4,
    pub children: Vec<SceneNode>,
}

impl TransformNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matrix: Mat4::IDENTITY,
            children: Vec::new(),
        }
    }
}

/// Leaf node carrying drawable primitives
#[derive(Debug, Clone)]
pub struct GeometryNode {
    pub name: String,
    pub primitives: Vec<ScenePrimitive>,
}

/// One drawable primitive with its declared material id
#[derive(Debug, Clone)]
pub struct ScenePrimitive {
    pub mesh: MeshData,
    pub material_id: Option<String>,
}

/// Materials table built once per read: material id -> definition
#[derive(Debug, Clone, Default)]
pub struct MaterialTable {
    entries: HashMap<String, MaterialEntry>,
}

/// Material definition with an optional surface image reference
#[derive(Debug, Clone)]
pub struct MaterialEntry {
    pub material: Material,
    /// Image path as declared in the source document (possibly relative)
    pub image: Option<PathBuf>,
}

impl MaterialTable {
    pub fn insert(&mut self, id: impl Into<String>, entry: MaterialEntry) {
        self.entries.insert(id.into(), entry);
    }

    pub fn get(&self, id: &str) -> Option<&MaterialEntry> {
        self.entries.get(id)
    }
}

/// Conversion context for the forward walk
pub struct WalkContext<'a> {
    pub materials: &'a MaterialTable,
    /// Base directory of the source document, for resolving image paths
    pub base_dir: &'a Path,
    pub asset_handler: Option<&'a AssetHandler<'a>>,
}

impl<'a> WalkContext<'a> {
    pub fn new(materials: &'a MaterialTable, base_dir: &'a Path) -> Self {
        Self {
            materials,
            base_dir,
            asset_handler: None,
        }
    }

    pub fn with_asset_handler(mut self, handler: &'a AssetHandler<'a>) -> Self {
        self.asset_handler = Some(handler);
        self
    }
}

/// Deterministic unique-name source for anonymous nodes
///
/// Passed explicitly into emission calls; no ambient id generation.
#[derive(Debug, Default)]
pub struct NameGenerator {
    counter: u64,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next collision-free name with the given prefix
    pub fn next(&mut self, prefix: &str) -> String {
        let name = format!("{}-{}", prefix, self.counter);
        self.counter += 1;
        name
    }
}

/// Flatten a nested scene graph into shapes with cumulative transforms
pub fn flatten(root: &TransformNode, ctx: &WalkContext, names: &mut NameGenerator) -> Vec<Shape> {
    let mut shapes = Vec::new();
    flatten_node(root, Mat4::IDENTITY, ctx, names, &mut shapes);
    shapes
}

fn flatten_node(
    node: &TransformNode,
    parent: Mat4,
    ctx: &WalkContext,
    names: &mut NameGenerator,
    out: &mut Vec<Shape>,
) {
    let matrix = parent * node.matrix;
    for child in &node.children {
        match child {
            SceneNode::Transform(t) => flatten_node(t, matrix, ctx, names, out),
            SceneNode::Geometry(g) => {
                for primitive in &g.primitives {
                    let mut mesh = primitive.mesh.clone();
                    resolve_material(&mut mesh, primitive.material_id.as_deref(), ctx);
                    out.push(Shape {
                        name: names.next("shape"),
                        matrix,
                        data: ShapeData::Mesh(mesh),
                    });
                }
            }
        }
    }
}

/// Look up a primitive's material and attach its texture image
///
/// A missing table entry is non-fatal: the shape is emitted without an
/// image reference.
fn resolve_material(mesh: &mut MeshData, material_id: Option<&str>, ctx: &WalkContext) {
    let Some(id) = material_id else {
        return;
    };
    let Some(entry) = ctx.materials.get(id) else {
        tracing::warn!(material = id, "material not found, shape emitted without image");
        return;
    };

    mesh.material = Some(entry.material.clone());
    if let Some(image) = &entry.image {
        let absolute = if image.is_absolute() {
            image.clone()
        } else {
            ctx.base_dir.join(image)
        };
        mesh.image = Some(match ctx.asset_handler {
            Some(handler) => handler(&absolute),
            None => absolute.to_string_lossy().to_string(),
        });
    }
}

/// Build a nested scene graph from canonical links
///
/// One transform node per link, one geometry node per mesh shape; every
/// emitted node gets a fresh name since canonical shapes are anonymous at
/// this boundary. Primitive shapes (sphere/cylinder/box) do not round-trip
/// through the mesh-scene form and are skipped.
pub fn to_graph(links: &[Link], names: &mut NameGenerator) -> TransformNode {
    let mut root = TransformNode::new(names.next("node"));

    for link in links {
        let mut link_node = TransformNode::new(names.next("node"));
        for shape in &link.visuals {
            let ShapeData::Mesh(mesh) = &shape.data else {
                continue;
            };
            let mut shape_node = TransformNode::new(names.next("node"));
            shape_node.matrix = shape.matrix;
            shape_node.children.push(SceneNode::Geometry(GeometryNode {
                name: names.next("shape"),
                primitives: vec![ScenePrimitive {
                    mesh: mesh.clone(),
                    material_id: None,
                }],
            }));
            link_node.children.push(SceneNode::Transform(shape_node));
        }
        root.children.push(SceneNode::Transform(link_node));
    }

    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn triangle_mesh() -> MeshData {
        MeshData {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vertex_index: vec![[0, 1, 2]],
            ..Default::default()
        }
    }

    fn graph_with_material(material_id: Option<&str>) -> TransformNode {
        let mut root = TransformNode::new("root");
        root.children.push(SceneNode::Geometry(GeometryNode {
            name: "geo".to_string(),
            primitives: vec![ScenePrimitive {
                mesh: triangle_mesh(),
                material_id: material_id.map(String::from),
            }],
        }));
        root
    }

    #[test]
    fn test_flatten_accumulates_transforms() {
        let mut inner = TransformNode::new("inner");
        inner.matrix = Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0));
        inner.children.push(SceneNode::Geometry(GeometryNode {
            name: "geo".to_string(),
            primitives: vec![ScenePrimitive {
                mesh: triangle_mesh(),
                material_id: None,
            }],
        }));

        let mut root = TransformNode::new("root");
        root.matrix = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        root.children.push(SceneNode::Transform(inner));

        let table = MaterialTable::default();
        let ctx = WalkContext::new(&table, Path::new("."));
        let shapes = flatten(&root, &ctx, &mut NameGenerator::new());

        assert_eq!(shapes.len(), 1);
        let expected = Mat4::from_translation(Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(shapes[0].matrix, expected);
    }

    #[test]
    fn test_material_miss_is_tolerated() {
        let table = MaterialTable::default();
        let ctx = WalkContext::new(&table, Path::new("/models"));
        let shapes = flatten(
            &graph_with_material(Some("missing")),
            &ctx,
            &mut NameGenerator::new(),
        );

        assert_eq!(shapes.len(), 1);
        let ShapeData::Mesh(mesh) = &shapes[0].data else {
            panic!("expected mesh shape");
        };
        assert!(mesh.image.is_none());
        assert!(mesh.material.is_none());
    }

    #[test]
    fn test_image_resolved_against_base_dir() {
        let mut table = MaterialTable::default();
        table.insert(
            "skin",
            MaterialEntry {
                material: Material::new("skin"),
                image: Some(PathBuf::from("textures/skin.png")),
            },
        );
        let ctx = WalkContext::new(&table, Path::new("/models/robot"));
        let shapes = flatten(
            &graph_with_material(Some("skin")),
            &ctx,
            &mut NameGenerator::new(),
        );

        let ShapeData::Mesh(mesh) = &shapes[0].data else {
            panic!("expected mesh shape");
        };
        assert_eq!(
            mesh.image.as_deref(),
            Some(
                Path::new("/models/robot/textures/skin.png")
                    .to_string_lossy()
                    .as_ref()
            )
        );
    }

    #[test]
    fn test_asset_handler_relocates_image() {
        let mut table = MaterialTable::default();
        table.insert(
            "skin",
            MaterialEntry {
                material: Material::new("skin"),
                image: Some(PathBuf::from("skin.png")),
            },
        );
        let handler = |path: &Path| {
            format!(
                "assets/{}",
                path.file_name().unwrap().to_string_lossy()
            )
        };
        let ctx = WalkContext::new(&table, Path::new("/models")).with_asset_handler(&handler);
        let shapes = flatten(
            &graph_with_material(Some("skin")),
            &ctx,
            &mut NameGenerator::new(),
        );

        let ShapeData::Mesh(mesh) = &shapes[0].data else {
            panic!("expected mesh shape");
        };
        assert_eq!(mesh.image.as_deref(), Some("assets/skin.png"));
    }

    #[test]
    fn test_to_graph_names_are_unique() {
        let mut link = Link::new("arm");
        link.visuals.push(Shape::new("", ShapeData::Mesh(triangle_mesh())));
        link.visuals.push(Shape::new("", ShapeData::Mesh(triangle_mesh())));

        let root = to_graph(&[link], &mut NameGenerator::new());

        let mut names = Vec::new();
        collect_names(&root, &mut names);
        let unique: std::collections::HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_to_graph_skips_primitive_shapes() {
        let mut link = Link::new("base");
        link.visuals.push(Shape::new(
            "ball",
            ShapeData::Sphere(crate::model::SphereData {
                radius: 0.1,
                material: None,
            }),
        ));

        let root = to_graph(&[link], &mut NameGenerator::new());
        let SceneNode::Transform(link_node) = &root.children[0] else {
            panic!("expected transform node");
        };
        assert!(link_node.children.is_empty());
    }

    fn collect_names(node: &TransformNode, out: &mut Vec<String>) {
        out.push(node.name.clone());
        for child in &node.children {
            match child {
                SceneNode::Transform(t) => collect_names(t, out),
                SceneNode::Geometry(g) => out.push(g.name.clone()),
            }
        }
    }
}
