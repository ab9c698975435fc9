// store.rs — canonical snapshot of derived sensor state
//
// One `SensorState` aggregate holds the latest value per sensor class.
// Writes go through `SharedStateStore`, which the dispatcher owns; each
// write takes the lock for exactly one field group, so a reader taking a
// snapshot can never observe a half-written quaternion or vector. Readers
// only ever copy state out.

use crate::types::Activity;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Latest decoded value per sensor class.
///
/// Construction zero-initializes every vector and both quaternion accuracy
/// scalars. Each field group is written only by the dispatch path matching
/// its sensor class; no event touches more than one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorState {
    pub linear_accel: Vector3<f64>,
    /// Calibrated accelerometer, gravity included, scaled to m/s².
    pub accel: Vector3<f64>,
    /// Raw accelerometer device counts, unscaled.
    pub raw_accel: [i32; 3],
    pub raw_gyro: [i32; 3],
    pub gyro: Vector3<f64>,
    pub uncal_gyro: Vector3<f64>,
    pub uncal_gyro_bias: Vector3<f64>,
    pub uncal_mag: Vector3<f64>,
    pub uncal_mag_bias: Vector3<f64>,
    pub mag: Vector3<f64>,
    pub gravity: Vector3<f64>,
    pub quat_6dof: [f64; 4],
    pub accuracy_6dof: f64,
    pub quat_9dof: [f64; 4],
    pub accuracy_9dof: f64,
    /// Producer-computed Euler orientation `[yaw, pitch, roll]`.
    pub euler: [f64; 3],
    pub step_count: u64,
    pub activity: Activity,
    pub tilt_detected: bool,
    pub step_detected: bool,
    pub significant_motion: bool,
    pub pickup_detected: bool,
    pub direction_code: u8,
}

impl Default for SensorState {
    fn default() -> Self {
        Self {
            linear_accel: Vector3::zeros(),
            accel: Vector3::zeros(),
            raw_accel: [0; 3],
            raw_gyro: [0; 3],
            gyro: Vector3::zeros(),
            uncal_gyro: Vector3::zeros(),
            uncal_gyro_bias: Vector3::zeros(),
            uncal_mag: Vector3::zeros(),
            uncal_mag_bias: Vector3::zeros(),
            mag: Vector3::zeros(),
            gravity: Vector3::zeros(),
            quat_6dof: [0.0; 4],
            accuracy_6dof: 0.0,
            quat_9dof: [0.0; 4],
            accuracy_9dof: 0.0,
            euler: [0.0; 3],
            step_count: 0,
            activity: Activity::Unknown,
            tilt_detected: false,
            step_detected: false,
            significant_motion: false,
            pickup_detected: false,
            direction_code: 0,
        }
    }
}

/// Shared handle to the sensor state.
///
/// Clones refer to the same underlying state. Group setters are
/// crate-private: only the dispatcher mutates state, applications read
/// through `snapshot()` or the typed getters.
#[derive(Clone, Default)]
pub struct SharedStateStore {
    inner: Arc<Mutex<SensorState>>,
}

impl SharedStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consistent copy of the whole state.
    pub fn snapshot(&self) -> SensorState {
        self.lock().clone()
    }

    pub fn linear_acceleration(&self) -> Vector3<f64> {
        self.lock().linear_accel
    }

    pub fn acceleration(&self) -> Vector3<f64> {
        self.lock().accel
    }

    pub fn raw_acceleration(&self) -> [i32; 3] {
        self.lock().raw_accel
    }

    pub fn raw_gyroscope(&self) -> [i32; 3] {
        self.lock().raw_gyro
    }

    pub fn gyroscope(&self) -> Vector3<f64> {
        self.lock().gyro
    }

    pub fn magnetometer(&self) -> Vector3<f64> {
        self.lock().mag
    }

    pub fn gravity(&self) -> Vector3<f64> {
        self.lock().gravity
    }

    pub fn step_count(&self) -> u64 {
        self.lock().step_count
    }

    pub fn activity(&self) -> Activity {
        self.lock().activity
    }

    /// `([w, x, y, z], accuracy)` for the requested fusion output.
    pub fn quaternion(&self, six_dof: bool) -> ([f64; 4], f64) {
        let state = self.lock();
        if six_dof {
            (state.quat_6dof, state.accuracy_6dof)
        } else {
            (state.quat_9dof, state.accuracy_9dof)
        }
    }

    // ── Group writes (dispatcher only) ───────────────────────────────────

    pub(crate) fn set_linear_accel(&self, v: Vector3<f64>) {
        self.lock().linear_accel = v;
    }

    pub(crate) fn set_accel(&self, v: Vector3<f64>) {
        self.lock().accel = v;
    }

    pub(crate) fn set_raw_accel(&self, v: [i32; 3]) {
        self.lock().raw_accel = v;
    }

    pub(crate) fn set_raw_gyro(&self, v: [i32; 3]) {
        self.lock().raw_gyro = v;
    }

    pub(crate) fn set_gyro(&self, v: Vector3<f64>) {
        self.lock().gyro = v;
    }

    pub(crate) fn set_uncal_gyro(&self, value: Vector3<f64>, bias: Vector3<f64>) {
        let mut state = self.lock();
        state.uncal_gyro = value;
        state.uncal_gyro_bias = bias;
    }

    pub(crate) fn set_uncal_mag(&self, value: Vector3<f64>, bias: Vector3<f64>) {
        let mut state = self.lock();
        state.uncal_mag = value;
        state.uncal_mag_bias = bias;
    }

    pub(crate) fn set_mag(&self, v: Vector3<f64>) {
        self.lock().mag = v;
    }

    pub(crate) fn set_gravity(&self, v: Vector3<f64>) {
        self.lock().gravity = v;
    }

    pub(crate) fn set_quat_6dof(&self, quat: [f64; 4], accuracy: f64) {
        let mut state = self.lock();
        state.quat_6dof = quat;
        state.accuracy_6dof = accuracy;
    }

    pub(crate) fn set_quat_9dof(&self, quat: [f64; 4], accuracy: f64) {
        let mut state = self.lock();
        state.quat_9dof = quat;
        state.accuracy_9dof = accuracy;
    }

    pub(crate) fn set_euler(&self, euler: [f64; 3]) {
        self.lock().euler = euler;
    }

    pub(crate) fn set_step_count(&self, count: u64) {
        self.lock().step_count = count;
    }

    pub(crate) fn set_activity(&self, activity: Activity) {
        self.lock().activity = activity;
    }

    pub(crate) fn set_tilt_detected(&self) {
        self.lock().tilt_detected = true;
    }

    pub(crate) fn set_step_detected(&self) {
        self.lock().step_detected = true;
    }

    pub(crate) fn set_significant_motion(&self) {
        self.lock().significant_motion = true;
    }

    pub(crate) fn set_pickup_detected(&self) {
        self.lock().pickup_detected = true;
    }

    pub(crate) fn set_direction(&self, code: u8) {
        self.lock().direction_code = code;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SensorState> {
        // A poisoned lock means a writer panicked mid-group; the state is
        // still structurally valid, so recover the guard.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
