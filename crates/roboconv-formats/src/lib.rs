//! Format adapters for the canonical robot description model
//!
//! Each adapter consumes or produces exactly one [`roboconv_core::Body`]
//! (or the transient scene-graph form) using a third-party parser for its
//! file syntax:
//! - urdf: edge-list robot format via `urdf-rs`
//! - collada: mesh/scene-graph format via `dae-parser`
//! - vrml: tree-structured format; reading goes through an external
//!   model-loading service behind the [`vrml::ModelLoader`] trait
//! - stl: triangle mesh payloads referenced by robot descriptions

pub mod collada;
pub mod stl;
pub mod urdf;
pub mod vrml;

pub use collada::{ColladaError, ColladaReader, ColladaWriter};
pub use stl::{StlError, load_stl, save_stl};
pub use urdf::{UrdfError, UrdfReader, UrdfWriter};
pub use vrml::{ModelLoader, VrmlError, VrmlReader, VrmlWriter};
