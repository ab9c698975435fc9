// pipeline.rs — coprocessor contract and the application-facing API
//
// The motion coprocessor is a black box behind `MotionCoprocessor`: it
// produces already-fused typed samples through a synchronous poll callback
// and accepts sensor lifecycle calls. Configuration is phased: a
// `PipelineConfig` is built freely, then consumed once by `activate()`;
// after that no setter exists, so reconfiguring a running pipeline is not
// expressible rather than runtime-checked.

use crate::dispatch::{EventDispatcher, FilterPolicy};
use crate::error::Result;
use crate::integrator::InertialIntegrator;
use crate::orientation::{self, OrientationSource};
use crate::store::{SensorState, SharedStateStore};
use crate::types::{SensorClass, SensorEvent};
use log::{debug, info};
use nalgebra::Vector3;

/// Accelerometer full-scale range in g.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccelFsr {
    G2,
    G4,
    G8,
    G16,
}

impl AccelFsr {
    pub fn as_g(self) -> u8 {
        match self {
            AccelFsr::G2 => 2,
            AccelFsr::G4 => 4,
            AccelFsr::G8 => 8,
            AccelFsr::G16 => 16,
        }
    }
}

/// Gyroscope full-scale range in degrees per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GyroFsr {
    Dps250,
    Dps500,
    Dps1000,
    Dps2000,
}

impl GyroFsr {
    pub fn as_dps(self) -> u16 {
        match self {
            GyroFsr::Dps250 => 250,
            GyroFsr::Dps500 => 500,
            GyroFsr::Dps1000 => 1000,
            GyroFsr::Dps2000 => 2000,
        }
    }
}

/// Sensor classes enabled by default at activation.
const DEFAULT_ENABLED: [SensorClass; 8] = [
    SensorClass::Accelerometer,
    SensorClass::RawAccelerometer,
    SensorClass::Gyroscope,
    SensorClass::Magnetometer,
    SensorClass::GameRotationVector,
    SensorClass::RotationVector,
    SensorClass::LinearAcceleration,
    SensorClass::Gravity,
];

/// Immutable pipeline configuration, consumed by `MotionPipeline::activate`.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub accel_fsr: AccelFsr,
    pub gyro_fsr: GyroFsr,
    /// Row-major 3x3 mounting matrix applied by the coprocessor to accel,
    /// gyro and mag.
    pub mounting_matrix: [f64; 9],
    pub mag_bias: Vector3<f64>,
    pub filter: FilterPolicy,
    /// Sampling period handed to every enabled sensor, in milliseconds.
    pub sample_period_ms: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            accel_fsr: AccelFsr::G4,
            gyro_fsr: GyroFsr::Dps500,
            mounting_matrix: [
                1.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, //
                0.0, 0.0, 1.0,
            ],
            mag_bias: Vector3::zeros(),
            filter: FilterPolicy::default(),
            sample_period_ms: 20,
        }
    }
}

/// External producer of typed sensor samples.
///
/// All methods are synchronous; `poll` invokes the sink once per buffered
/// event and returns once the producer's buffer is drained.
pub trait MotionCoprocessor {
    /// Apply full-scale ranges, mounting matrix and magnetometer bias.
    /// Called exactly once, before any sensor is enabled.
    fn configure(&mut self, config: &PipelineConfig) -> Result<()>;

    fn enable_sensor(&mut self, class: SensorClass, period_ms: u32) -> Result<()>;

    fn disable_sensor(&mut self, class: SensorClass) -> Result<()>;

    /// True when buffered samples are waiting to be polled.
    fn data_ready(&self) -> bool;

    fn poll(&mut self, sink: &mut dyn FnMut(SensorEvent)) -> Result<()>;
}

/// The assembled pipeline: coprocessor, dispatcher, state store, integrator.
pub struct MotionPipeline<C: MotionCoprocessor> {
    coprocessor: C,
    dispatcher: EventDispatcher,
    store: SharedStateStore,
    integrator: InertialIntegrator,
}

impl<C: MotionCoprocessor> MotionPipeline<C> {
    /// Configure the coprocessor, enable the default sensor set and hand
    /// back the running pipeline.
    pub fn activate(mut coprocessor: C, config: PipelineConfig) -> Result<Self> {
        coprocessor.configure(&config)?;
        for class in DEFAULT_ENABLED {
            coprocessor.enable_sensor(class, config.sample_period_ms)?;
        }
        info!(
            "pipeline active: accel ±{}g, gyro ±{}dps, period {}ms",
            config.accel_fsr.as_g(),
            config.gyro_fsr.as_dps(),
            config.sample_period_ms
        );

        let store = SharedStateStore::new();
        let dispatcher = EventDispatcher::new(store.clone(), config.filter);
        Ok(Self {
            coprocessor,
            dispatcher,
            store,
            integrator: InertialIntegrator::new(),
        })
    }

    // ── Poll loop ────────────────────────────────────────────────────────

    /// Drain the coprocessor's buffered events into the state store.
    ///
    /// Returns without touching state when no data is pending.
    pub fn poll(&mut self) -> Result<()> {
        if !self.coprocessor.data_ready() {
            return Ok(());
        }
        let dispatcher = &mut self.dispatcher;
        self.coprocessor.poll(&mut |event| dispatcher.dispatch(event))
    }

    // ── Sensor lifecycle (pass-through) ──────────────────────────────────

    pub fn enable_sensor(&mut self, class: SensorClass, period_ms: u32) -> Result<()> {
        debug!("enabling {class:?} at {period_ms}ms");
        self.coprocessor.enable_sensor(class, period_ms)
    }

    pub fn disable_sensor(&mut self, class: SensorClass) -> Result<()> {
        debug!("disabling {class:?}");
        self.coprocessor.disable_sensor(class)
    }

    // ── Kinematics ───────────────────────────────────────────────────────

    /// Advance velocity/displacement from the stored linear acceleration.
    ///
    /// `timestamp` is in seconds. While the activity classifier reports the
    /// device still, the velocity history is reset and a zeroed sample is
    /// fed instead, so stationary noise never integrates into drift;
    /// accumulated displacement is preserved.
    pub fn update_kinematics(&mut self, timestamp: f64) {
        if self.store.activity().is_still() {
            self.integrator.reset_velocity();
            self.integrator.update(timestamp, Vector3::zeros());
        } else {
            self.integrator.update(timestamp, self.store.linear_acceleration());
        }
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.integrator.velocity()
    }

    pub fn distance(&self) -> Vector3<f64> {
        self.integrator.displacement()
    }

    // ── State queries ────────────────────────────────────────────────────

    /// Orientation as `[roll, pitch, yaw]` for the selected fusion output.
    pub fn orientation_rpy(&self, source: OrientationSource, in_degrees: bool) -> [f64; 3] {
        let (quat, _) = self.store.quaternion(source == OrientationSource::SixDof);
        orientation::rpy_from_quaternion(&orientation::quat_from_wxyz(quat), in_degrees)
    }

    /// Orientation quaternion `[w, x, y, z]` and its accuracy scalar.
    pub fn orientation_quat(&self, source: OrientationSource) -> ([f64; 4], f64) {
        self.store.quaternion(source == OrientationSource::SixDof)
    }

    /// Gravity direction derived from the selected quaternion, independent
    /// of the coprocessor's own gravity channel.
    pub fn derived_gravity(&self, source: OrientationSource) -> Vector3<f64> {
        let (quat, _) = self.store.quaternion(source == OrientationSource::SixDof);
        orientation::gravity_from_quaternion(&orientation::quat_from_wxyz(quat))
    }

    pub fn linear_acceleration(&self) -> Vector3<f64> {
        self.store.linear_acceleration()
    }

    pub fn acceleration(&self) -> Vector3<f64> {
        self.store.acceleration()
    }

    pub fn raw_acceleration(&self) -> [i32; 3] {
        self.store.raw_acceleration()
    }

    pub fn gyroscope(&self) -> Vector3<f64> {
        self.store.gyroscope()
    }

    pub fn magnetometer(&self) -> Vector3<f64> {
        self.store.magnetometer()
    }

    pub fn gravity(&self) -> Vector3<f64> {
        self.store.gravity()
    }

    pub fn snapshot(&self) -> SensorState {
        self.store.snapshot()
    }

    /// Read-only handle for a reader running on another thread.
    pub fn store(&self) -> SharedStateStore {
        self.store.clone()
    }
}
