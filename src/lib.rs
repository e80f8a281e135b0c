//! bagelverse
//!
//! A lightweight, cross-platform matcap scene demo focused on native and
//! WASM compatibility. The program loads a matcap texture and a typeface
//! description, extrudes 3D text, scatters one hundred torus meshes in a
//! slowly rotating group and renders the scene continuously with orbit
//! camera controls and a live parameter panel.
//!
//! High-level modules
//! - `app`: application event loop, asset-load events and the render loop
//! - `camera`: orbit camera, controller and uniforms for view/projection
//! - `context`: central GPU and window context that owns device/queue/pipeline
//! - `data_structures`: engine data models (meshes, instances, textures)
//! - `material`: the shared matcap material and the enumerated texture choices
//! - `panel`: the egui control panel (matcap choice, text content)
//! - `pipelines`: the matcap render pipeline definition
//! - `render`: render pass helpers for drawing meshes
//! - `resources`: asset loading for matcap images and the typeface
//! - `scene`: scene state (scatter group, text mesh slot, per-frame update)
//! - `text`: typeface parsing and extruded text geometry
//!

pub mod app;
pub mod camera;
pub mod context;
pub mod data_structures;
pub mod material;
pub mod panel;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;
pub mod text;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
