//! Source-engine view angles to camera rotation.
//!
//! Source convention: yaw in degrees, clockwise; pitch in degrees, positive
//! looking down. Target convention: right-handed, Z up, cameras look down
//! their local −Z with local +Y as screen-up.
//!
//! Reference axis pair: local −Z tracks the forward vector, local +Y is kept
//! as close to world +Z as possible. With that pair, a level camera looking
//! down world +Y comes out as Euler XYZ `(90°, 0, 0)`, and the replay's
//! yaw origin needs a constant −90° about Z on top of it (`YAW_CORRECTION`).

use std::f64::consts::FRAC_PI_2;

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Constant added to the Z Euler component after conversion.
pub const YAW_CORRECTION: f64 = -FRAC_PI_2;

const PARALLEL_EPS: f64 = 1e-9;

/// Euler angles in radians, XYZ order (R = Rz · Ry · Rx).
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct EulerXyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Unit forward vector in target space for a source yaw/pitch.
///
/// The X and Y components are swapped compared to a plain spherical mapping,
/// which accounts for the basis change between the two conventions.
pub fn source_forward(yaw_deg: f64, pitch_deg: f64) -> Vector3<f64> {
    let yaw = (-yaw_deg).to_radians();
    let pitch = pitch_deg.to_radians();
    Vector3::new(
        pitch.cos() * yaw.sin(),
        pitch.cos() * yaw.cos(),
        -pitch.sin(),
    )
}

/// Rotation that points local −Z along `forward`, local +Y toward world up.
pub fn track_to_camera(forward: &Vector3<f64>) -> UnitQuaternion<f64> {
    let up = if forward.cross(&Vector3::z()).norm_squared() < PARALLEL_EPS {
        // looking straight up or down
        Vector3::y()
    } else {
        Vector3::z()
    };
    UnitQuaternion::face_towards(&(-forward), &up)
}

/// Full conversion used for the rotation channels.
pub fn camera_euler(yaw_deg: f64, pitch_deg: f64) -> EulerXyz {
    let forward = source_forward(yaw_deg, pitch_deg);
    let (x, y, z) = track_to_camera(&forward).euler_angles();
    EulerXyz {
        x,
        y,
        z: z + YAW_CORRECTION,
    }
}
