// orientation.rs — closed-form quaternion decomposition
//
// Pure functions of quaternion state: no access to the store, no history.
// Quaternions arrive `[w, x, y, z]` from either fusion output and are
// expected near unit norm; they are not renormalized here (see DESIGN.md).

use nalgebra::{Quaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Which fusion output a quaternion query reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrientationSource {
    /// Accelerometer + gyroscope fusion ("game" rotation vector).
    SixDof,
    /// Accelerometer + gyroscope + magnetometer fusion.
    NineDof,
}

/// Gravity direction in the body frame, derived from orientation alone.
pub fn gravity_from_quaternion(q: &Quaternion<f64>) -> Vector3<f64> {
    Vector3::new(
        2.0 * (q.i * q.k - q.w * q.j),
        2.0 * (q.w * q.i + q.j * q.k),
        q.w * q.w - q.i * q.i - q.j * q.j + q.k * q.k,
    )
}

/// Euler angles `(yaw, pitch, roll)` in radians.
///
/// Pitch saturates at ±π/2 when the asin argument leaves [-1, 1]; the sign
/// of the argument is preserved (copysign, not truncation), so gimbal lock
/// yields exactly ±90° instead of NaN.
pub fn euler_from_quaternion(q: &Quaternion<f64>) -> (f64, f64, f64) {
    let siny_cosp = 2.0 * (q.w * q.k + q.i * q.j);
    let cosy_cosp = 1.0 - 2.0 * (q.j * q.j + q.k * q.k);
    let yaw = siny_cosp.atan2(cosy_cosp);

    let sinp = 2.0 * (q.w * q.j - q.k * q.i);
    let pitch = if sinp.abs() >= 1.0 {
        FRAC_PI_2.copysign(sinp)
    } else {
        sinp.asin()
    };

    let sinr_cosp = 2.0 * (q.w * q.i + q.j * q.k);
    let cosr_cosp = 1.0 - 2.0 * (q.i * q.i + q.j * q.j);
    let roll = sinr_cosp.atan2(cosr_cosp);

    (yaw, pitch, roll)
}

/// Orientation as `[roll, pitch, yaw]`, optionally in degrees.
///
/// The internal buffer is ordered `[yaw, pitch, roll]`; the public array
/// reverses it, so index 0 is roll. Callers relying on the RPY order get the
/// same layout the angle getters of the original driver produced.
pub fn rpy_from_quaternion(q: &Quaternion<f64>, in_degrees: bool) -> [f64; 3] {
    let (yaw, pitch, roll) = euler_from_quaternion(q);
    let ypr = [yaw, pitch, roll];

    let mut rpy = [0.0; 3];
    for (i, angle) in ypr.iter().enumerate() {
        rpy[2 - i] = if in_degrees {
            angle.to_degrees()
        } else {
            *angle
        };
    }
    rpy
}

/// Build a `[w, x, y, z]` quaternion from its stored array form.
pub fn quat_from_wxyz(quat: [f64; 4]) -> Quaternion<f64> {
    Quaternion::new(quat[0], quat[1], quat[2], quat[3])
}
