//! grove-ngin
//!
//! A small diorama engine. A scene graph of pivot-aware transforms is
//! filled with textured OBJ models, animated by frame-rate independent
//! animators and drawn through an abstract render API, one program per
//! shading variant.
//!
//! High-level modules
//! - `animation`: per-frame animators (stirring, particles, wandering, orbit, hop, croak)
//! - `camera`: fly camera and its uniforms
//! - `data_structures`: scene graph, transforms, materials, meshes and editable values
//! - `diorama`: assembly of the forest scene
//! - `flow`: frame loop over an abstract window
//! - `input`: keyboard and mouse state fed by winit events
//! - `pipelines`: render API contract, programs and light uniforms
//! - `render`: shading-variant batching and draw dispatch
//! - `resources`: asset access, OBJ/MTL loading and the mesh cache
//!

pub mod animation;
pub mod camera;
pub mod data_structures;
pub mod diorama;
pub mod flow;
pub mod input;
pub mod pipelines;
pub mod render;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
pub use winit::keyboard::KeyCode;
