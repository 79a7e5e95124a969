//! hdri-view
//!
//! A small cross-platform model viewer built on winit and wgpu: a single
//! glTF model, lit by an equirectangular HDRI environment, rendered through
//! an RGB-shift postprocessing pass, with pointer-driven eased rotation.
//! The crate exposes a library surface plus a thin binary entry point and
//! runs both natively and on the web.
//!
//! High-level modules
//! - `animation`: easing curves and the retargetable rotation tween
//! - `camera`: camera, projection and the view/projection uniform
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: engine data models (meshes, materials, textures)
//! - `options`: every runtime tunable with its default
//! - `pipelines`: the lit model pipeline and the postprocessing composer
//! - `resources`: helpers to load the environment/model and create GPU resources
//! - `scene`: the model slot, lighting resources and rotation state
//! - `viewer`: the application event loop and per-frame rendering
//!

pub mod animation;
pub mod camera;
pub mod context;
pub mod data_structures;
pub mod options;
pub mod pipelines;
pub mod resources;
pub mod scene;
pub mod viewer;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::dpi::PhysicalPosition;
pub use winit::dpi::PhysicalSize;
pub use winit::event::WindowEvent;
pub use wgpu::*;
