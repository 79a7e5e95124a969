//! Runtime options for the viewer.

use std::f32::consts::PI;

use cgmath::Deg;
use instant::Duration;

use crate::animation::Easing;

/// Everything tunable about the viewer, in one place.
///
/// Construct with [`ViewerOptions::default`] and override fields before
/// handing the options to [`crate::viewer::run`]. The defaults show a
/// damaged-helmet model under a night-time HDRI.
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    /// Equirectangular `.hdr` environment source: an `http(s)://` URL or a
    /// path relative to the asset directory.
    pub environment: String,
    /// glTF model path relative to the asset directory.
    pub model: String,
    /// Vertical field of view.
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
    /// Camera distance from the origin along +Z.
    pub camera_distance: f32,
    /// Exposure multiplier applied before the tone mapping curve.
    pub exposure: f32,
    /// Chromatic aberration offset in UV units.
    pub rgb_shift_amount: f32,
    /// Direction of the aberration offset in radians.
    pub rgb_shift_angle: f32,
    pub ambient_colour: [f32; 3],
    pub ambient_intensity: f32,
    /// Full rotation span in radians; the pointer maps to +/- half of this
    /// on each axis.
    pub rotation_range: f32,
    /// How long one pointer-triggered rotation takes to settle.
    pub tween_duration: Duration,
    pub easing: Easing,
    pub clear_colour: wgpu::Color,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            environment:
                "https://dl.polyhaven.org/file/ph-assets/HDRIs/hdr/1k/moonless_golf_1k.hdr"
                    .to_string(),
            model: "DamagedHelmet.gltf".to_string(),
            fovy: Deg(35.0),
            znear: 0.1,
            zfar: 100.0,
            camera_distance: 5.0,
            exposure: 1.0,
            rgb_shift_amount: 0.0015,
            rgb_shift_angle: 0.0,
            ambient_colour: [1.0, 1.0, 1.0],
            ambient_intensity: 6.0,
            rotation_range: 0.18 * PI,
            tween_duration: Duration::from_millis(500),
            easing: Easing::CubicOut,
            clear_colour: wgpu::Color::BLACK,
        }
    }
}
