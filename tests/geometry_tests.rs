use std::f32::consts::{FRAC_PI_2, PI};

use desklet_engine::{desklet_matrix, zoom_for_rotation, DeskletTransform};

fn transform(width: f32, height: f32) -> DeskletTransform {
    DeskletTransform {
        width,
        height,
        ratio: 1.0,
        rotation: 0.0,
        depth_rotation_x: 0.0,
        depth_rotation_y: 0.0,
    }
}

#[test]
fn no_rotation_needs_no_zoom() {
    assert!((zoom_for_rotation(100.0, 50.0, 0.0) - 1.0).abs() < 1e-6);
    assert!((zoom_for_rotation(64.0, 64.0, 0.0) - 1.0).abs() < 1e-6);
}

#[test]
fn square_zoom_is_symmetric_around_quarter_turn() {
    for theta in [0.2f32, 0.5, 0.8, 1.2] {
        let a = zoom_for_rotation(80.0, 80.0, theta);
        let b = zoom_for_rotation(80.0, 80.0, FRAC_PI_2 - theta);
        assert!((a - b).abs() < 1e-5, "theta={theta}: {a} vs {b}");
    }
}

#[test]
fn forty_five_degrees_shrinks_a_square_by_sqrt_two() {
    let zoom = zoom_for_rotation(100.0, 100.0, PI / 4.0);
    assert!((zoom - 1.0 / 2.0f32.sqrt()).abs() < 1e-5);
}

#[test]
fn zoom_never_exceeds_one() {
    for theta in [0.1f32, 0.3, 0.7, 1.0, 1.4, 2.0, 3.0] {
        assert!(zoom_for_rotation(120.0, 40.0, theta) <= 1.0 + 1e-6);
    }
}

#[test]
fn depth_push_matches_calibrated_value() {
    let m = desklet_matrix(&transform(200.0, 100.0));
    assert!((m.0[3][2] - (-86.60254)).abs() < 1e-3);
}

#[test]
fn tilt_pushes_further_back() {
    let mut t = transform(200.0, 100.0);
    t.depth_rotation_y = 0.3;
    let m = desklet_matrix(&t);
    let expected = -100.0 * 3.0f32.sqrt() / 2.0 - 0.45 * 200.0 * 0.3f32.sin();
    assert!((m.0[3][2] - expected).abs() < 1e-3);
}

#[test]
fn tiny_tilt_is_ignored() {
    let mut t = transform(200.0, 100.0);
    t.depth_rotation_y = 0.05;
    let m = desklet_matrix(&t);
    assert!((m.0[3][2] - (-86.60254)).abs() < 1e-3);
}
