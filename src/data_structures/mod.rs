//! Engine data structures: meshes, textures and per-instance transforms.
//!
//! - `instance` holds per-instance transformation data for GPU instancing
//! - `mesh` contains CPU mesh data, the torus generator and GPU mesh buffers
//! - `texture` contains the GPU texture wrapper and creation utilities

pub mod instance;
pub mod mesh;
pub mod texture;
