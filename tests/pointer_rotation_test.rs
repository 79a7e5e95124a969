use hdri_view::animation::pointer_rotation_target;
use hdri_view::options::ViewerOptions;
use hdri_view::scene::Scene;
use instant::Duration;
use winit::dpi::{PhysicalPosition, PhysicalSize};

const SIZE: PhysicalSize<u32> = PhysicalSize::new(800, 600);

#[test]
fn window_centre_maps_to_zero_rotation() {
    let range = ViewerOptions::default().rotation_range;
    let centre = PhysicalPosition::new(400.0, 300.0);
    assert_eq!(pointer_rotation_target(centre, SIZE, range), (0.0, 0.0));
}

#[test]
fn corners_map_to_half_range_on_both_axes() {
    let range = ViewerOptions::default().rotation_range;

    let (pitch, yaw) = pointer_rotation_target(PhysicalPosition::new(0.0, 0.0), SIZE, range);
    assert!((pitch + range / 2.0).abs() < 1e-6);
    assert!((yaw + range / 2.0).abs() < 1e-6);

    let (pitch, yaw) = pointer_rotation_target(PhysicalPosition::new(800.0, 600.0), SIZE, range);
    assert!((pitch - range / 2.0).abs() < 1e-6);
    assert!((yaw - range / 2.0).abs() < 1e-6);
}

#[test]
fn vertical_pointer_axis_drives_pitch_only() {
    let range = ViewerOptions::default().rotation_range;
    let (pitch, yaw) = pointer_rotation_target(PhysicalPosition::new(400.0, 600.0), SIZE, range);
    assert!((pitch - range / 2.0).abs() < 1e-6);
    assert_eq!(yaw, 0.0);
}

#[test]
fn degenerate_window_size_yields_no_rotation() {
    let range = ViewerOptions::default().rotation_range;
    let position = PhysicalPosition::new(10.0, 10.0);
    assert_eq!(
        pointer_rotation_target(position, PhysicalSize::new(0, 600), range),
        (0.0, 0.0)
    );
}

#[test]
fn pointer_move_without_model_leaves_rotation_unchanged() {
    let options = ViewerOptions::default();
    let mut scene = Scene::new(&options);
    assert!(!scene.has_model());

    scene.pointer_moved(PhysicalPosition::new(0.0, 0.0), SIZE);
    assert_eq!(scene.step_animation(Duration::from_millis(100)), None);
    assert_eq!(scene.rotation(), (0.0, 0.0));
}
