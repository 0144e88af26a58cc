//! Format-neutral robot description model and transforms
//!
//! This crate contains the core data structures and algorithms shared by
//! all format adapters:
//! - Body/Link/Joint/Shape: canonical in-memory model
//! - MeshBuilder: vertex/normal/index buffer assembly
//! - Scene-graph walker: nested transform/geometry graph conversion
//! - Tree reconstructor: rooted tree from a flat joint edge list

pub mod mesh;
pub mod model;
pub mod scene;
pub mod tree;

pub use mesh::*;
pub use model::*;
pub use scene::*;
pub use tree::*;
