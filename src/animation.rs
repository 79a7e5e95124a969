//! Eased rotation animation.
//!
//! Pointer movement does not rotate the model directly; it retargets a pair
//! of [`Tween`]s which the render loop advances once per frame. A new
//! pointer event overwrites the in-flight tween, restarting from the
//! current eased value.

use instant::Duration;
use winit::dpi::{PhysicalPosition, PhysicalSize};

/// Easing curve applied to tween progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// Fast start, quadratic falloff.
    QuadraticOut,
    /// Fast start, cubic falloff.
    #[default]
    CubicOut,
}

impl Easing {
    /// Evaluate the curve at progress `t`; input is clamped to `[0, 1]`.
    #[inline]
    pub fn evaluate(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadraticOut => {
                let omt = 1.0 - t;
                1.0 - omt * omt
            }
            Easing::CubicOut => {
                let omt = 1.0 - t;
                1.0 - omt * omt * omt
            }
        }
    }
}

/// Time-based interpolation of one scalar toward a target value.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    start: f32,
    target: f32,
    elapsed: Duration,
    duration: Duration,
    easing: Easing,
}

impl Tween {
    /// A tween already settled at `value`.
    pub fn settled(value: f32, duration: Duration, easing: Easing) -> Self {
        Self {
            start: value,
            target: value,
            elapsed: duration,
            duration,
            easing,
        }
    }

    /// Steer toward a new target, starting over from the current eased
    /// value. This is what makes a burst of pointer events look continuous
    /// instead of snapping back to the previous start.
    pub fn retarget(&mut self, target: f32) {
        self.start = self.value();
        self.target = target;
        self.elapsed = Duration::ZERO;
    }

    /// Advance by `dt` and return the new value.
    pub fn advance(&mut self, dt: Duration) -> f32 {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.value()
    }

    /// The current eased value.
    pub fn value(&self) -> f32 {
        if self.duration.is_zero() || self.elapsed >= self.duration {
            return self.target;
        }
        let t = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.start + (self.target - self.start) * self.easing.evaluate(t)
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Whether the tween has run its full duration.
    pub fn is_settled(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Map a pointer position to target (pitch, yaw) angles in radians.
///
/// The window centre maps to `(0, 0)`; the corners map to +/- half of
/// `range` on both axes. Pitch follows the vertical pointer axis, yaw the
/// horizontal one.
pub fn pointer_rotation_target(
    position: PhysicalPosition<f64>,
    size: PhysicalSize<u32>,
    range: f32,
) -> (f32, f32) {
    if size.width == 0 || size.height == 0 {
        return (0.0, 0.0);
    }
    let nx = (position.x / f64::from(size.width) - 0.5) as f32;
    let ny = (position.y / f64::from(size.height) - 0.5) as f32;
    (ny * range, nx * range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_endpoints_are_exact() {
        for easing in [Easing::Linear, Easing::QuadraticOut, Easing::CubicOut] {
            assert_eq!(easing.evaluate(0.0), 0.0);
            assert_eq!(easing.evaluate(1.0), 1.0);
        }
    }

    #[test]
    fn easing_clamps_input() {
        assert_eq!(Easing::CubicOut.evaluate(-1.0), 0.0);
        assert_eq!(Easing::CubicOut.evaluate(2.0), 1.0);
    }

    #[test]
    fn cubic_out_is_front_loaded() {
        // An ease-out curve covers more than half the distance in the first
        // half of its duration.
        assert!(Easing::CubicOut.evaluate(0.5) > 0.5);
        assert!(Easing::QuadraticOut.evaluate(0.5) > 0.5);
    }

    #[test]
    fn tween_reaches_target_after_duration() {
        let mut tween = Tween::settled(0.0, Duration::from_millis(500), Easing::CubicOut);
        tween.retarget(1.0);
        assert!(!tween.is_settled());
        tween.advance(Duration::from_millis(500));
        assert!(tween.is_settled());
        assert_eq!(tween.value(), 1.0);
    }

    #[test]
    fn tween_overshoots_nothing_on_long_frames() {
        let mut tween = Tween::settled(0.0, Duration::from_millis(500), Easing::CubicOut);
        tween.retarget(2.0);
        assert_eq!(tween.advance(Duration::from_secs(10)), 2.0);
    }

    #[test]
    fn retarget_restarts_from_current_value() {
        let mut tween = Tween::settled(0.0, Duration::from_millis(500), Easing::Linear);
        tween.retarget(1.0);
        tween.advance(Duration::from_millis(250));
        let midway = tween.value();
        assert!((midway - 0.5).abs() < 1e-6);

        tween.retarget(-1.0);
        assert_eq!(tween.value(), midway);
        tween.advance(Duration::from_millis(500));
        assert_eq!(tween.value(), -1.0);
    }

    #[test]
    fn zero_duration_jumps_to_target() {
        let mut tween = Tween::settled(0.0, Duration::ZERO, Easing::CubicOut);
        tween.retarget(3.0);
        assert_eq!(tween.value(), 3.0);
        assert!(tween.is_settled());
    }
}
