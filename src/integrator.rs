// integrator.rs — trapezoidal double integration of acceleration
//
// Velocity and displacement accumulate per axis from timestamped
// acceleration samples. The integrator is deliberately dumb: it has no
// error channel, trusts its inputs, and leaves stillness detection to the
// caller (the pipeline resets it when the activity classifier reports the
// device is not moving).

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Velocity/displacement state derived by numerical integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InertialIntegrator {
    velocity: Vector3<f64>,
    displacement: Vector3<f64>,
    prev_timestamp: f64,
    prev_accel: Vector3<f64>,
    prev_velocity: Vector3<f64>,
    initialized: bool,
}

impl InertialIntegrator {
    pub fn new() -> Self {
        Self {
            velocity: Vector3::zeros(),
            displacement: Vector3::zeros(),
            prev_timestamp: 0.0,
            prev_accel: Vector3::zeros(),
            prev_velocity: Vector3::zeros(),
            initialized: false,
        }
    }

    /// Integrate one acceleration sample taken at `timestamp` seconds.
    ///
    /// The first sample after construction only records the baseline; there
    /// is no previous timestamp yet, so integrating would use an undefined
    /// Δt.
    pub fn update(&mut self, timestamp: f64, accel: Vector3<f64>) {
        if !self.initialized {
            self.prev_timestamp = timestamp;
            self.prev_accel = accel;
            self.initialized = true;
            return;
        }

        let dt = timestamp - self.prev_timestamp;
        self.velocity += (self.prev_accel + (accel - self.prev_accel) / 2.0) * dt;
        self.displacement +=
            (self.prev_velocity + (self.velocity - self.prev_velocity) / 2.0) * dt;

        self.prev_accel = accel;
        self.prev_velocity = self.velocity;
        self.prev_timestamp = timestamp;
    }

    /// Zero the velocity history while keeping accumulated displacement.
    ///
    /// Meant to be called when an external activity classifier reports the
    /// device is not moving, so sensor noise stops accumulating into drift.
    /// Callers should feed a zeroed acceleration sample right after, so the
    /// stale pre-reset acceleration never re-seeds the trapezoid.
    pub fn reset_velocity(&mut self) {
        self.velocity = Vector3::zeros();
        self.prev_velocity = Vector3::zeros();
        self.prev_accel = Vector3::zeros();
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.velocity
    }

    pub fn displacement(&self) -> Vector3<f64> {
        self.displacement
    }
}

impl Default for InertialIntegrator {
    fn default() -> Self {
        Self::new()
    }
}
