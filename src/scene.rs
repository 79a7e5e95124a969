//! CPU-side scene state: the model slot, its lighting and the rotation
//! tweens driven by pointer movement.

use instant::Duration;
use winit::dpi::{PhysicalPosition, PhysicalSize};

use crate::{
    animation::{Tween, pointer_rotation_target},
    data_structures::model::Model,
    options::ViewerOptions,
    pipelines::lighting::LightingResources,
};

/// The scene: at most one model, the lighting it is lit by, and the eased
/// rotation state.
#[derive(Debug)]
pub struct Scene {
    model: Option<Model>,
    lighting: Option<LightingResources>,
    pitch: Tween,
    yaw: Tween,
    rotation_range: f32,
}

impl Scene {
    pub fn new(options: &ViewerOptions) -> Self {
        let settled = Tween::settled(0.0, options.tween_duration, options.easing);
        Self {
            model: None,
            lighting: None,
            pitch: settled,
            yaw: settled,
            rotation_range: options.rotation_range,
        }
    }

    /// Install loaded assets. Lighting is set before the model, so the
    /// first frame that draws the model already has its environment.
    pub fn install(&mut self, lighting: LightingResources, model: Model) {
        self.lighting = Some(lighting);
        self.model = Some(model);
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn lighting(&self) -> Option<&LightingResources> {
        self.lighting.as_ref()
    }

    /// Retarget the rotation tweens from a pointer position. Ignored while
    /// no model is loaded; there is nothing to rotate yet.
    pub fn pointer_moved(&mut self, position: PhysicalPosition<f64>, size: PhysicalSize<u32>) {
        if self.model.is_none() {
            return;
        }
        let (pitch, yaw) = pointer_rotation_target(position, size, self.rotation_range);
        self.pitch.retarget(pitch);
        self.yaw.retarget(yaw);
    }

    /// Advance the rotation tweens by `dt`. Returns the rotation to upload,
    /// or `None` when the transform needs no update this frame.
    pub fn step_animation(&mut self, dt: Duration) -> Option<(f32, f32)> {
        if self.model.is_none() || (self.pitch.is_settled() && self.yaw.is_settled()) {
            return None;
        }
        Some((self.pitch.advance(dt), self.yaw.advance(dt)))
    }

    /// Current rotation (pitch, yaw) in radians.
    pub fn rotation(&self) -> (f32, f32) {
        (self.pitch.value(), self.yaw.value())
    }
}
