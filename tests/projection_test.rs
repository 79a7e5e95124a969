use cgmath::Deg;
use hdri_view::camera::Projection;

#[test]
fn resize_tracks_aspect_ratio() {
    let mut projection = Projection::new(800, 600, Deg(35.0), 0.1, 100.0);
    assert!((projection.aspect() - 800.0 / 600.0).abs() < f32::EPSILON);

    projection.resize(1024, 256);
    assert_eq!(projection.aspect(), 4.0);
}

#[test]
fn degenerate_resize_is_ignored() {
    let mut projection = Projection::new(800, 600, Deg(35.0), 0.1, 100.0);
    let before = projection.aspect();

    projection.resize(0, 100);
    projection.resize(100, 0);
    assert_eq!(projection.aspect(), before);
}
