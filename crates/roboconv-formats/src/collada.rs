//! COLLADA (DAE) format adapter
//!
//! Reading parses the document with `dae-parser` and produces a scene graph
//! whose meshes keep the document's independent position and normal index
//! spaces. Node transforms from the visual scene are preserved, and material
//! bindings are resolved through the material and effect libraries. Writing
//! renders COLLADA XML from the canonical links.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use dae_parser::{
    ColorParam, Document, Effect, FloatParam, Geometry, Image, ImageSource, Instance, LocalMap,
    Node, ParamType, Primitive, Profile, ProfileCommon, Semantic, Shader, Source, SurfaceInit,
    Texture, Transform, Url, WithSid,
};
use glam::{Mat4, Vec3};

use roboconv_core::mesh::{MeshBuilder, MeshError, NormalSource};
use roboconv_core::model::{Body, Link, Material, MeshData};
use roboconv_core::scene::{
    self, AssetHandler, GeometryNode, MaterialEntry, MaterialTable, NameGenerator, SceneNode,
    ScenePrimitive, TransformNode, WalkContext,
};

/// COLLADA reader
#[derive(Debug, Default)]
pub struct ColladaReader;

impl ColladaReader {
    pub fn new() -> Self {
        Self
    }

    /// Read a COLLADA file into a canonical Body with a single link holding
    /// the flattened shapes.
    pub fn read(&self, path: impl AsRef<Path>) -> Result<Body, ColladaError> {
        self.read_impl(path.as_ref(), None)
    }

    /// Read with an asset handler that rewrites texture image references
    pub fn read_with_handler(
        &self,
        path: impl AsRef<Path>,
        handler: &AssetHandler,
    ) -> Result<Body, ColladaError> {
        self.read_impl(path.as_ref(), Some(handler))
    }

    fn read_impl(
        &self,
        path: &Path,
        handler: Option<&AssetHandler>,
    ) -> Result<Body, ColladaError> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model")
            .to_string();

        let document = Document::from_file(path)
            .map_err(|e| ColladaError::Parse(format!("{:?}", e)))?;
        let scene = self.scene_from_document(&document)?;
        let materials = material_table(&document);

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut ctx = WalkContext::new(&materials, base_dir);
        if let Some(handler) = handler {
            ctx = ctx.with_asset_handler(handler);
        }
        let mut names = NameGenerator::new();

        let mut link = Link::new(name.clone());
        link.visuals = scene::flatten(&scene, &ctx, &mut names);

        let mut body = Body::new(name);
        body.links.push(link);
        Ok(body)
    }

    /// Read a COLLADA file into a scene graph
    pub fn read_scene(&self, path: impl AsRef<Path>) -> Result<TransformNode, ColladaError> {
        let document = Document::from_file(path.as_ref())
            .map_err(|e| ColladaError::Parse(format!("{:?}", e)))?;
        self.scene_from_document(&document)
    }

    /// Read a COLLADA document from a string into a scene graph
    pub fn read_scene_str(&self, text: &str) -> Result<TransformNode, ColladaError> {
        let document =
            Document::from_str(text).map_err(|e| ColladaError::Parse(format!("{:?}", e)))?;
        self.scene_from_document(&document)
    }

    fn scene_from_document(&self, document: &Document) -> Result<TransformNode, ColladaError> {
        let geom_map = document
            .local_map::<Geometry>()
            .map_err(|_| ColladaError::EmptyScene)?;
        let source_map = document
            .local_map::<Source>()
            .map_err(|_| ColladaError::EmptyScene)?;

        let mut names = NameGenerator::new();
        let mut root = TransformNode::new(names.next("node"));

        if let Some(scene) = document.get_visual_scene() {
            for node in &scene.nodes {
                root.children.push(SceneNode::Transform(convert_node(
                    node,
                    &geom_map,
                    &source_map,
                    &mut names,
                )?));
            }
        }

        // Documents without a usable scene still carry meshes worth loading:
        // instance every geometry at the origin.
        if !has_geometry(&root) {
            root.children.clear();
            let no_bindings = HashMap::new();
            for geometry in geom_map.0.values() {
                if let Some(geom) =
                    convert_geometry(geometry, &no_bindings, &source_map, &mut names)?
                {
                    root.children.push(SceneNode::Geometry(geom));
                }
            }
        }

        if !has_geometry(&root) {
            return Err(ColladaError::EmptyScene);
        }
        Ok(root)
    }
}

fn has_geometry(node: &TransformNode) -> bool {
    node.children.iter().any(|child| match child {
        SceneNode::Transform(t) => has_geometry(t),
        SceneNode::Geometry(_) => true,
    })
}

fn convert_node(
    node: &Node,
    geom_map: &LocalMap<Geometry>,
    source_map: &LocalMap<Source>,
    names: &mut NameGenerator,
) -> Result<TransformNode, ColladaError> {
    let mut out = TransformNode::new(node.id.clone().unwrap_or_else(|| names.next("node")));
    out.matrix = node_transform(node);

    for instance in &node.instance_geometry {
        let geometry = geom_map.get(&instance.url).ok_or_else(|| {
            ColladaError::Parse(format!("instanced geometry {} not found", instance.url.val))
        })?;
        let bindings = material_bindings(instance);
        if let Some(geom) = convert_geometry(geometry, &bindings, source_map, names)? {
            out.children.push(SceneNode::Geometry(geom));
        }
    }
    for child in &node.children {
        out.children.push(SceneNode::Transform(convert_node(
            child, geom_map, source_map, names,
        )?));
    }
    Ok(out)
}

/// Compose a node's transform stack into a single local matrix
///
/// `<matrix>` values are row-major in the document. Rotations are
/// axis-angle with the angle in degrees.
fn node_transform(node: &Node) -> Mat4 {
    let mut matrix = Mat4::IDENTITY;
    for transform in &node.transforms {
        matrix *= match transform {
            Transform::Matrix(m) => Mat4::from_cols_array(&m.0).transpose(),
            Transform::Translate(t) => Mat4::from_translation(Vec3::from_array(*t.0)),
            Transform::Rotate(r) => {
                let axis = Vec3::from_slice(r.axis()).normalize_or_zero();
                if axis == Vec3::ZERO {
                    Mat4::IDENTITY
                } else {
                    Mat4::from_axis_angle(axis, r.angle().to_radians())
                }
            }
            Transform::Scale(s) => Mat4::from_scale(Vec3::from_array(*s.0)),
            Transform::LookAt(_) | Transform::Skew(_) => Mat4::IDENTITY,
        };
    }
    matrix
}

/// Geometry-local material symbols mapped to material library ids
fn material_bindings(instance: &Instance<Geometry>) -> HashMap<String, String> {
    let mut bindings = HashMap::new();
    if let Some(bind) = &instance.data.bind_material {
        for bound in &bind.instance_material {
            if let Url::Fragment(id) = &bound.target.val {
                bindings.insert(bound.symbol.clone(), id.clone());
            }
        }
    }
    bindings
}

fn convert_geometry(
    geometry: &Geometry,
    bindings: &HashMap<String, String>,
    source_map: &LocalMap<Source>,
    names: &mut NameGenerator,
) -> Result<Option<GeometryNode>, ColladaError> {
    let mesh = match &geometry.element {
        dae_parser::GeometryElement::Mesh(m) => m,
        _ => return Ok(None),
    };

    let vertices = mesh.vertices.as_ref().ok_or(ColladaError::EmptyScene)?;
    let position_input = vertices
        .inputs
        .iter()
        .find(|i| i.semantic == Semantic::Position)
        .ok_or(ColladaError::EmptyScene)?;
    let position_source = source_map
        .get(position_input.source_as_source())
        .ok_or_else(|| ColladaError::Parse("position source not found".to_string()))?;
    let positions = extract_vec3_from_source(position_source)?;

    // Normals bound directly to <vertices> share the position index
    let vertex_normals = vertices
        .inputs
        .iter()
        .find(|i| i.semantic == Semantic::Normal)
        .and_then(|i| source_map.get(i.source_as_source()))
        .map(extract_vec3_from_source)
        .transpose()?;

    let geometry_name = geometry
        .id
        .clone()
        .unwrap_or_else(|| names.next("geometry"));

    let mut primitives = Vec::new();
    for primitive in &mesh.elements {
        let corners = match primitive {
            Primitive::Triangles(tris) => {
                let prim_data = tris
                    .data
                    .prim
                    .as_ref()
                    .ok_or_else(|| ColladaError::Parse("triangles without <p>".into()))?;
                collect_triangle_corners(prim_data, &tris.inputs)
            }
            Primitive::PolyList(polylist) => collect_polylist_corners(
                &polylist.data.prim,
                &polylist.data.vcount,
                &polylist.inputs,
            ),
            other => {
                return Err(ColladaError::UnsupportedPrimitive(primitive_name(other)));
            }
        };

        let normal_source = corners
            .normal_index
            .is_some()
            .then(|| {
                // Normals referenced by their own index stream
                find_input(primitive_inputs(primitive), Semantic::Normal)
                    .and_then(|i| source_map.get(i.source_as_source()))
                    .map(extract_vec3_from_source)
                    .transpose()
            })
            .transpose()?
            .flatten();

        let mut builder = MeshBuilder::new(positions.clone(), corners.vertex_index);
        if let (Some(normals), Some(index)) = (normal_source, corners.normal_index) {
            builder = builder.normals(
                normals,
                NormalSource::PerVertex {
                    indices: Some(index),
                },
            );
        } else if let Some(normals) = vertex_normals.clone() {
            builder = builder.normals(normals, NormalSource::PerVertex { indices: None });
        }

        let symbol = match primitive {
            Primitive::Triangles(t) => t.material.as_deref(),
            Primitive::PolyList(p) => p.material.as_deref(),
            _ => None,
        };
        // An unbound symbol falls back to the symbol itself; some exporters
        // use the material id directly.
        let material_id =
            symbol.map(|s| bindings.get(s).cloned().unwrap_or_else(|| s.to_string()));

        primitives.push(ScenePrimitive {
            mesh: builder.build()?,
            material_id,
        });
    }

    if primitives.is_empty() {
        return Ok(None);
    }
    Ok(Some(GeometryNode {
        name: geometry_name,
        primitives,
    }))
}

/// Collect material definitions keyed by material id
///
/// Colors and scalars come from the COMMON-profile shaders. A diffuse
/// texture is followed through its sampler and surface parameters to the
/// declared image file.
fn material_table(document: &Document) -> MaterialTable {
    let mut table = MaterialTable::default();
    let (Ok(material_map), Ok(effect_map), Ok(image_map)) = (
        document.local_map::<dae_parser::Material>(),
        document.local_map::<Effect>(),
        document.local_map::<Image>(),
    ) else {
        return table;
    };

    for material in material_map.0.values() {
        let Some(id) = &material.id else { continue };
        let Some(effect) = effect_map.get(&material.instance_effect.url) else {
            tracing::warn!(material = id.as_str(), "material references missing effect");
            continue;
        };
        let name = material.name.clone().unwrap_or_else(|| id.clone());
        table.insert(id.clone(), effect_entry(name, effect, &image_map));
    }
    table
}

fn effect_entry(name: String, effect: &Effect, image_map: &LocalMap<Image>) -> MaterialEntry {
    let mut material = Material::new(name);
    let mut image = None;

    for profile in &effect.profile {
        let Profile::Common(common) = profile else {
            continue;
        };
        for shader in &common.technique.data.shaders {
            apply_shader(shader, effect, common, image_map, &mut material, &mut image);
        }
    }

    MaterialEntry { material, image }
}

fn apply_shader(
    shader: &Shader,
    effect: &Effect,
    common: &ProfileCommon,
    image_map: &LocalMap<Image>,
    material: &mut Material,
    image: &mut Option<PathBuf>,
) {
    let (emission, ambient, diffuse, specular, shininess, transparency) = match shader {
        Shader::Blinn(s) => (
            s.emission.as_ref(),
            s.ambient.as_ref(),
            s.diffuse.as_ref(),
            s.specular.as_ref(),
            s.shininess.as_ref(),
            s.transparency.as_ref(),
        ),
        Shader::Phong(s) => (
            s.emission.as_ref(),
            s.ambient.as_ref(),
            s.diffuse.as_ref(),
            s.specular.as_ref(),
            s.shininess.as_ref(),
            s.transparency.as_ref(),
        ),
        Shader::Lambert(s) => (
            s.emission.as_ref(),
            s.ambient.as_ref(),
            s.diffuse.as_ref(),
            None,
            None,
            s.transparency.as_ref(),
        ),
        Shader::Constant(s) => (
            s.emission.as_ref(),
            None,
            None,
            None,
            None,
            s.transparency.as_ref(),
        ),
    };

    if let Some(c) = shader_color(emission) {
        material.emission = c;
    }
    if let Some(c) = shader_color(ambient) {
        material.ambient = c;
    }
    if let Some(c) = shader_color(diffuse) {
        material.diffuse = c;
    }
    if let Some(c) = shader_color(specular) {
        material.specular = c;
    }
    if let Some(FloatParam::Float(v)) = shininess.map(|w| &**w) {
        material.shininess = *v;
    }
    if let Some(FloatParam::Float(v)) = transparency.map(|w| &**w) {
        material.transparency = *v;
    }

    if let Some(ColorParam::Texture(texture)) = diffuse.map(|w| &**w) {
        *image = texture_image(texture, effect, common, image_map).map(PathBuf::from);
    }
}

fn shader_color(param: Option<&WithSid<ColorParam>>) -> Option<[f32; 4]> {
    match param.map(|w| &**w) {
        Some(ColorParam::Color(rgba)) => Some(**rgba),
        _ => None,
    }
}

/// Follow a diffuse texture through its sampler2D and surface parameters to
/// the image file it samples
fn texture_image(
    texture: &Texture,
    effect: &Effect,
    common: &ProfileCommon,
    image_map: &LocalMap<Image>,
) -> Option<String> {
    let find_param = |sid: &str| {
        common
            .new_param
            .iter()
            .chain(effect.new_param.iter())
            .find(|p| p.sid == sid)
    };

    let ParamType::Sampler2D(sampler) = &find_param(&texture.texture)?.ty else {
        return None;
    };
    let ParamType::Surface(surface) = &find_param(&sampler.source.val)?.ty else {
        return None;
    };
    let SurfaceInit::From { image, .. } = &surface.init else {
        return None;
    };
    match &image_map.get_name(image)?.source {
        ImageSource::InitFrom(url) => match url {
            Url::Fragment(path) | Url::Other(path) => Some(path.clone()),
        },
        ImageSource::Data(_) => None,
    }
}

/// Per-corner index streams gathered from a primitive's `<p>` data
struct CornerIndices {
    vertex_index: Vec<[u32; 3]>,
    normal_index: Option<Vec<[u32; 3]>>,
}

fn find_input<'a>(
    inputs: &'a dae_parser::InputList,
    semantic: Semantic,
) -> Option<&'a dae_parser::InputS> {
    inputs.iter().find(|i| i.semantic == semantic)
}

fn primitive_inputs(primitive: &Primitive) -> &dae_parser::InputList {
    match primitive {
        Primitive::Triangles(t) => &t.inputs,
        Primitive::PolyList(p) => &p.inputs,
        _ => unreachable!("only triangles and polylists reach input lookup"),
    }
}

fn primitive_name(primitive: &Primitive) -> String {
    match primitive {
        Primitive::Lines(_) => "lines".to_string(),
        Primitive::LineStrips(_) => "linestrips".to_string(),
        Primitive::TriFans(_) => "trifans".to_string(),
        Primitive::TriStrips(_) => "tristrips".to_string(),
        _ => "unknown".to_string(),
    }
}

fn collect_triangle_corners(prim_data: &[u32], inputs: &dae_parser::InputList) -> CornerIndices {
    let stride = inputs.stride;
    let vtx_off = find_input(inputs, Semantic::Vertex)
        .map(|i| i.offset as usize)
        .unwrap_or(0);
    let normal_off = find_input(inputs, Semantic::Normal).map(|i| i.offset as usize);

    let triangle_count = prim_data.len() / (stride * 3);
    let mut vertex_index = Vec::with_capacity(triangle_count);
    let mut normal_index = normal_off.map(|_| Vec::with_capacity(triangle_count));

    for tri in 0..triangle_count {
        let base = tri * stride * 3;
        let corner = |off: usize, vert: usize| prim_data[base + vert * stride + off];

        vertex_index.push([corner(vtx_off, 0), corner(vtx_off, 1), corner(vtx_off, 2)]);
        if let (Some(n_off), Some(out)) = (normal_off, normal_index.as_mut()) {
            out.push([corner(n_off, 0), corner(n_off, 1), corner(n_off, 2)]);
        }
    }

    CornerIndices {
        vertex_index,
        normal_index,
    }
}

fn collect_polylist_corners(
    prim_data: &[u32],
    vcount: &[u32],
    inputs: &dae_parser::InputList,
) -> CornerIndices {
    let stride = inputs.stride;
    let vtx_off = find_input(inputs, Semantic::Vertex)
        .map(|i| i.offset as usize)
        .unwrap_or(0);
    let normal_off = find_input(inputs, Semantic::Normal).map(|i| i.offset as usize);

    let mut vertex_index = Vec::new();
    let mut normal_index = normal_off.map(|_| Vec::new());

    let mut prim_offset = 0;
    for &vc in vcount {
        let vert_count = vc as usize;

        // Fan triangulation
        if vert_count >= 3 {
            for i in 1..vert_count - 1 {
                let fan = [0, i, i + 1];
                let corner =
                    |off: usize, vi: usize| prim_data[prim_offset + fan[vi] * stride + off];

                vertex_index.push([corner(vtx_off, 0), corner(vtx_off, 1), corner(vtx_off, 2)]);
                if let (Some(n_off), Some(out)) = (normal_off, normal_index.as_mut()) {
                    out.push([corner(n_off, 0), corner(n_off, 1), corner(n_off, 2)]);
                }
            }
        }

        prim_offset += vert_count * stride;
    }

    CornerIndices {
        vertex_index,
        normal_index,
    }
}

/// Extract Vec3 data from a COLLADA source
fn extract_vec3_from_source(source: &Source) -> Result<Vec<[f32; 3]>, ColladaError> {
    let accessor = &source.accessor;

    let float_array = match &source.array {
        Some(dae_parser::ArrayElement::Float(arr)) => arr,
        _ => return Err(ColladaError::Parse("no float array in source".to_string())),
    };

    let stride = if accessor.stride > 0 {
        accessor.stride
    } else {
        3
    };
    let count = accessor.count;

    let mut result = Vec::with_capacity(count);
    for i in 0..count {
        let base = i * stride;
        if base + 2 < float_array.len() {
            result.push([
                float_array[base],
                float_array[base + 1],
                float_array[base + 2],
            ]);
        }
    }
    Ok(result)
}

/// COLLADA writer
#[derive(Debug, Default)]
pub struct ColladaWriter;

impl ColladaWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write a canonical Body as a COLLADA file
    pub fn write(&self, body: &Body, path: impl AsRef<Path>) -> Result<(), ColladaError> {
        let mut names = NameGenerator::new();
        let scene = scene::to_graph(&body.links, &mut names);
        let xml = self.render(&body.name, &scene);
        std::fs::write(path.as_ref(), &xml).map_err(|e| ColladaError::Io(e.to_string()))?;
        Ok(())
    }

    fn render(&self, name: &str, scene: &TransformNode) -> String {
        let mut geometries = Vec::new();
        collect_geometries(scene, &mut geometries);

        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(
            "<COLLADA xmlns=\"http://www.collada.org/2005/11/COLLADASchema\" version=\"1.4.1\">\n",
        );
        xml.push_str(
            "  <asset>\n    <created>1970-01-01T00:00:00</created>\n    <modified>1970-01-01T00:00:00</modified>\n    <up_axis>Z_UP</up_axis>\n  </asset>\n",
        );

        xml.push_str("  <library_geometries>\n");
        for (id, mesh) in &geometries {
            render_geometry(&mut xml, id, mesh);
        }
        xml.push_str("  </library_geometries>\n");

        xml.push_str("  <library_visual_scenes>\n");
        xml.push_str(&format!(
            "    <visual_scene id=\"Scene\" name=\"{name}\">\n"
        ));
        render_node(&mut xml, scene, 3);
        xml.push_str("    </visual_scene>\n");
        xml.push_str("  </library_visual_scenes>\n");
        xml.push_str("  <scene>\n    <instance_visual_scene url=\"#Scene\"/>\n  </scene>\n");
        xml.push_str("</COLLADA>\n");

        xml
    }
}

/// In document order, geometry ids paired with their meshes
fn collect_geometries<'a>(node: &'a TransformNode, out: &mut Vec<(String, &'a MeshData)>) {
    for child in &node.children {
        match child {
            SceneNode::Transform(t) => collect_geometries(t, out),
            SceneNode::Geometry(g) => {
                for (i, primitive) in g.primitives.iter().enumerate() {
                    out.push((format!("{}-{}", g.name, i), &primitive.mesh));
                }
            }
        }
    }
}

fn render_geometry(xml: &mut String, id: &str, mesh: &MeshData) {
    xml.push_str(&format!(
        "    <geometry id=\"{id}\" name=\"{id}\">\n      <mesh>\n"
    ));

    render_source(
        xml,
        &format!("{id}-positions"),
        mesh.vertices.iter().flatten(),
        mesh.vertices.len(),
    );
    if let Some(normals) = &mesh.normals {
        render_source(
            xml,
            &format!("{id}-normals"),
            normals.iter().flatten(),
            normals.len(),
        );
    }

    xml.push_str(&format!(
        "        <vertices id=\"{id}-vertices\">\n          <input semantic=\"POSITION\" source=\"#{id}-positions\"/>\n        </vertices>\n"
    ));

    xml.push_str(&format!(
        "        <triangles count=\"{}\">\n",
        mesh.triangle_count()
    ));
    xml.push_str(&format!(
        "          <input semantic=\"VERTEX\" source=\"#{id}-vertices\" offset=\"0\"/>\n"
    ));
    let index: Vec<u32> = if mesh.normals.is_some() {
        xml.push_str(&format!(
            "          <input semantic=\"NORMAL\" source=\"#{id}-normals\" offset=\"1\"/>\n"
        ));
        mesh.combined_index()
    } else {
        mesh.flat_vertex_index()
    };
    let p: Vec<String> = index.iter().map(|i| i.to_string()).collect();
    xml.push_str(&format!("          <p>{}</p>\n", p.join(" ")));
    xml.push_str("        </triangles>\n");

    xml.push_str("      </mesh>\n    </geometry>\n");
}

fn render_source<'a>(
    xml: &mut String,
    id: &str,
    values: impl Iterator<Item = &'a f32>,
    count: usize,
) {
    let floats: Vec<String> = values.map(|v| v.to_string()).collect();
    xml.push_str(&format!(
        "        <source id=\"{id}\">\n          <float_array id=\"{id}-array\" count=\"{}\">{}</float_array>\n",
        floats.len(),
        floats.join(" ")
    ));
    xml.push_str(&format!(
        "          <technique_common>\n            <accessor source=\"#{id}-array\" count=\"{count}\" stride=\"3\">\n              <param name=\"X\" type=\"float\"/>\n              <param name=\"Y\" type=\"float\"/>\n              <param name=\"Z\" type=\"float\"/>\n            </accessor>\n          </technique_common>\n        </source>\n"
    ));
}

fn render_node(xml: &mut String, node: &TransformNode, depth: usize) {
    let indent = "  ".repeat(depth);
    xml.push_str(&format!(
        "{indent}<node id=\"{0}\" name=\"{0}\">\n",
        node.name
    ));
    if node.matrix != Mat4::IDENTITY {
        xml.push_str(&format!(
            "{indent}  <matrix>{}</matrix>\n",
            matrix_row_major(node.matrix)
        ));
    }
    for child in &node.children {
        match child {
            SceneNode::Transform(t) => render_node(xml, t, depth + 1),
            SceneNode::Geometry(g) => {
                for (i, _) in g.primitives.iter().enumerate() {
                    xml.push_str(&format!(
                        "{indent}  <instance_geometry url=\"#{}-{}\"/>\n",
                        g.name, i
                    ));
                }
            }
        }
    }
    xml.push_str(&format!("{indent}</node>\n"));
}

/// COLLADA stores matrices in row-major order
fn matrix_row_major(matrix: Mat4) -> String {
    let mut values = Vec::with_capacity(16);
    for row in 0..4 {
        for col in 0..4 {
            values.push(matrix.col(col)[row].to_string());
        }
    }
    values.join(" ")
}

/// COLLADA-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ColladaError {
    #[error("Failed to parse COLLADA: {0}")]
    Parse(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("COLLADA document contains no mesh geometry")]
    EmptyScene,
    #[error("Unsupported primitive type: {0}")]
    UnsupportedPrimitive(String),
    #[error(transparent)]
    Mesh(#[from] MeshError),
}
