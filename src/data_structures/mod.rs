//! Engine data structures: transforms, the scene graph, meshes and materials.
//!
//! - `transform` holds the canonical per-node transform and its matrix composition
//! - `scene_graph` enables hierarchical scene organization
//! - `model` contains GPU-ready mesh data
//! - `material` contains materials, shading variants and material libraries
//! - `light` is the payload of light nodes
//! - `editable` holds clamped, user-tweakable values

pub mod editable;
pub mod light;
pub mod material;
pub mod model;
pub mod scene_graph;
pub mod transform;
