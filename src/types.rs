// types.rs — sensor classes, typed event payloads
//
// The coprocessor reports samples by a bare numeric sensor index. That index
// is translated once, at the edge, into `SensorClass`; everything past the
// translation works on the typed event and never sees raw indices or raw
// payload bytes.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Generic sensor classes produced by the motion coprocessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorClass {
    Accelerometer,
    Gyroscope,
    RawAccelerometer,
    RawGyroscope,
    UncalMagnetometer,
    UncalGyroscope,
    ActivityClassifier,
    StepDetector,
    StepCounter,
    GameRotationVector,
    RotationVector,
    GeomagRotationVector,
    Magnetometer,
    SignificantMotion,
    PickupGesture,
    TiltDetector,
    Gravity,
    LinearAcceleration,
    Orientation,
    DirectionGesture,
}

/// Coprocessor-internal sensor index → generic sensor class.
///
/// The order of this table mirrors the producer's own enumeration and must
/// not be rearranged: entry `i` is the class reported for internal index `i`.
const PRODUCER_INDEX_TABLE: [SensorClass; 20] = [
    SensorClass::Accelerometer,
    SensorClass::Gyroscope,
    SensorClass::RawAccelerometer,
    SensorClass::RawGyroscope,
    SensorClass::UncalMagnetometer,
    SensorClass::UncalGyroscope,
    SensorClass::ActivityClassifier,
    SensorClass::StepDetector,
    SensorClass::StepCounter,
    SensorClass::GameRotationVector,
    SensorClass::RotationVector,
    SensorClass::GeomagRotationVector,
    SensorClass::Magnetometer,
    SensorClass::SignificantMotion,
    SensorClass::PickupGesture,
    SensorClass::TiltDetector,
    SensorClass::Gravity,
    SensorClass::LinearAcceleration,
    SensorClass::Orientation,
    SensorClass::DirectionGesture,
];

impl SensorClass {
    /// Translate a coprocessor-internal sensor index.
    ///
    /// Indices outside the table come from producer firmware newer than this
    /// mapping; they return `None` and the caller drops the event silently.
    pub fn from_producer_index(index: usize) -> Option<SensorClass> {
        PRODUCER_INDEX_TABLE.get(index).copied()
    }

    pub const COUNT: usize = PRODUCER_INDEX_TABLE.len();
}

/// Activity kinds reported by the coprocessor's activity classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activity {
    Unknown,
    InVehicle,
    Walking,
    Running,
    OnBicycle,
    Tilt,
    Still,
}

impl Activity {
    /// Decode a begin/end classifier code: positive codes open an activity,
    /// negative codes close it (closing reverts to `Unknown`).
    pub fn from_code(code: i32) -> Activity {
        match code {
            1 => Activity::InVehicle,
            2 => Activity::Walking,
            3 => Activity::Running,
            4 => Activity::OnBicycle,
            5 => Activity::Tilt,
            6 => Activity::Still,
            _ => Activity::Unknown,
        }
    }

    pub fn is_still(self) -> bool {
        self == Activity::Still
    }
}

/// Typed payload of one sensor event.
///
/// Each sensor class decodes to exactly one variant; the accuracy flag rides
/// with the payload it qualifies instead of through a side-channel pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SensorPayload {
    /// Calibrated 3-vector with a discrete accuracy flag (accelerometer,
    /// gyroscope, magnetometer, gravity, linear acceleration).
    Vector {
        value: Vector3<f64>,
        accuracy: u8,
    },
    /// Uncalibrated 3-vector plus its estimated bias (uncal gyro, uncal mag).
    VectorWithBias {
        value: Vector3<f64>,
        bias: Vector3<f64>,
        accuracy: u8,
    },
    /// Raw device counts, unscaled (raw accelerometer, raw gyroscope).
    Raw([i32; 3]),
    /// 6-DOF fusion quaternion `[w, x, y, z]`; its accuracy is derived by
    /// the dispatcher from the accelerometer and gyroscope flags.
    Quaternion { quat: [f64; 4] },
    /// 9-DOF fusion quaternion `[w, x, y, z]` with its own accuracy scalar,
    /// reported verbatim by the producer.
    QuaternionWithAccuracy { quat: [f64; 4], accuracy: f64 },
    /// Producer-computed Euler orientation `[yaw, pitch, roll]`.
    EulerAngles([f64; 3]),
    /// Cumulative step count.
    StepCount(u64),
    /// Activity classifier begin/end code.
    ActivityCode(i32),
    /// Gesture event with no data (tilt, step detect, significant motion,
    /// pickup).
    Occurred,
    /// Gesture event carrying a direction code.
    Direction(u8),
}

/// One sample handed over by the coprocessor poll callback.
///
/// Events are consumed synchronously: nothing retains them after dispatch
/// returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorEvent {
    pub class: SensorClass,
    /// Monotonic timestamp in microseconds.
    pub timestamp_us: u64,
    pub payload: SensorPayload,
}

impl SensorEvent {
    pub fn new(class: SensorClass, timestamp_us: u64, payload: SensorPayload) -> Self {
        Self {
            class,
            timestamp_us,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_producer_index_order() {
        // Spot-check the positions the producer firmware fixes.
        assert_eq!(
            SensorClass::from_producer_index(0),
            Some(SensorClass::Accelerometer)
        );
        assert_eq!(
            SensorClass::from_producer_index(9),
            Some(SensorClass::GameRotationVector)
        );
        assert_eq!(
            SensorClass::from_producer_index(10),
            Some(SensorClass::RotationVector)
        );
        assert_eq!(
            SensorClass::from_producer_index(19),
            Some(SensorClass::DirectionGesture)
        );
    }

    #[test]
    fn test_out_of_table_index() {
        assert_eq!(SensorClass::from_producer_index(20), None);
        assert_eq!(SensorClass::from_producer_index(255), None);
    }

    #[test]
    fn test_activity_codes() {
        assert_eq!(Activity::from_code(6), Activity::Still);
        assert!(Activity::from_code(6).is_still());
        assert_eq!(Activity::from_code(2), Activity::Walking);
        assert_eq!(Activity::from_code(-3), Activity::Unknown);
        assert_eq!(Activity::from_code(0), Activity::Unknown);
    }
}
