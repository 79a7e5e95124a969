//! Engine data structures: models, materials and textures.
//!
//! - `model` contains mesh and material definitions plus the model transform
//! - `texture` contains the GPU texture wrapper and creation utilities

pub mod model;
pub mod texture;
