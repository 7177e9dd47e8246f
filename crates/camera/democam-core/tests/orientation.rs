use std::f64::consts::FRAC_PI_2;

use approx::assert_abs_diff_eq;
use democam_core::orientation::{camera_euler, source_forward, track_to_camera, YAW_CORRECTION};
use nalgebra::{UnitQuaternion, Vector3};

#[test]
fn level_forward_is_unit_with_no_vertical_component() {
    let f = source_forward(0.0, 0.0);
    assert_abs_diff_eq!(f.norm(), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(f.z, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(f.y, 1.0, epsilon = 1e-12);
}

#[test]
fn opposite_yaws_give_opposite_forward() {
    let a = source_forward(90.0, 0.0);
    let b = source_forward(-90.0, 0.0);
    assert_abs_diff_eq!(a.x, -1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(a.x, -b.x, epsilon = 1e-12);
    assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-12);
}

#[test]
fn positive_pitch_looks_down() {
    let f = source_forward(0.0, 30.0);
    assert!(f.z < 0.0);
    assert_abs_diff_eq!(f.norm(), 1.0, epsilon = 1e-12);
}

#[test]
fn level_camera_euler_includes_yaw_correction() {
    let e = camera_euler(0.0, 0.0);
    assert_abs_diff_eq!(e.x, FRAC_PI_2, epsilon = 1e-9);
    assert_abs_diff_eq!(e.y, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(e.z, YAW_CORRECTION, epsilon = 1e-9);
}

#[test]
fn euler_rebuilds_the_look_direction() {
    for (yaw, pitch) in [(0.0, 0.0), (45.0, 10.0), (-120.0, -35.0), (179.0, 60.0)] {
        let e = camera_euler(yaw, pitch);
        // undo the constant correction, then rebuild R = Rz * Ry * Rx
        let q = UnitQuaternion::from_euler_angles(e.x, e.y, e.z - YAW_CORRECTION);
        let look = q * -Vector3::z();
        let f = source_forward(yaw, pitch);
        assert_abs_diff_eq!((look - f).norm(), 0.0, epsilon = 1e-9);
    }
}

#[test]
fn camera_up_leans_toward_world_up() {
    let q = track_to_camera(&source_forward(30.0, 20.0));
    let up = q * Vector3::y();
    assert!(up.z > 0.0);
}
