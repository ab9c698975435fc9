// motion_pipeline_rs — Event demultiplexing and kinematics for a motion coprocessor
//
// The coprocessor fuses raw IMU and magnetometer data on-chip and hands
// back typed samples (vectors, quaternions, step counts, activity codes).
// This crate routes those samples into a shared state store, optionally
// median-filters the accelerometer and gyroscope paths, derives Euler
// orientation and gravity from the fused quaternions, and double-integrates
// linear acceleration into velocity and displacement.
//
// The hardware side stays behind the `MotionCoprocessor` trait, so the
// whole pipeline is unit-testable with canned event streams.

pub mod dispatch;
pub mod error;
pub mod filters;
pub mod integrator;
pub mod orientation;
pub mod pipeline;
pub mod store;
pub mod types;

pub use dispatch::{EventDispatcher, FilterPolicy, GRAVITY_MPS2};
pub use error::{PipelineError, Result};
pub use filters::{MedianWindow, VectorMedian3, ACCEL_WINDOW};
pub use integrator::InertialIntegrator;
pub use orientation::OrientationSource;
pub use pipeline::{AccelFsr, GyroFsr, MotionCoprocessor, MotionPipeline, PipelineConfig};
pub use store::{SensorState, SharedStateStore};
pub use types::{Activity, SensorClass, SensorEvent, SensorPayload};
