// dispatch.rs — demultiplexing of typed coprocessor events
//
// One event in, at most one state-store field group written. The dispatcher
// is the only writer of the store: it decodes the payload for the event's
// sensor class, routes it through the matching transform (raw copy, median
// filter, or quaternion copy with accuracy), and drops anything it does not
// recognize without signaling an error. Silent dropping is a deliberate
// forward-compatibility stance: producer firmware may report classes newer
// than this mapping.

use crate::filters::{MedianWindow, VectorMedian3, ACCEL_WINDOW};
use crate::store::SharedStateStore;
use crate::types::{Activity, SensorClass, SensorEvent, SensorPayload};
use log::{trace, warn};
use nalgebra::Vector3;

/// Standard gravity, used to scale accelerometer samples from g to m/s².
pub const GRAVITY_MPS2: f64 = 9.81;

/// Which channels route through a median filter before reaching the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterPolicy {
    pub filter_accel: bool,
    pub filter_gyro: bool,
}

/// Routes incoming sensor events into the shared state store.
pub struct EventDispatcher {
    store: SharedStateStore,
    policy: FilterPolicy,
    accel_filter: [MedianWindow; 3],
    gyro_filter: VectorMedian3,
    // Latest accuracy flags from the vector channels; the 6-DOF quaternion
    // accuracy is derived from these.
    accel_accuracy: u8,
    gyro_accuracy: u8,
}

impl EventDispatcher {
    pub fn new(store: SharedStateStore, policy: FilterPolicy) -> Self {
        Self {
            store,
            policy,
            accel_filter: [
                MedianWindow::new(ACCEL_WINDOW),
                MedianWindow::new(ACCEL_WINDOW),
                MedianWindow::new(ACCEL_WINDOW),
            ],
            gyro_filter: VectorMedian3::new(),
            accel_accuracy: 0,
            gyro_accuracy: 0,
        }
    }

    /// Entry point for producers that report raw sensor indices.
    ///
    /// Unmapped indices are dropped with no state mutation and no error.
    pub fn dispatch_raw(&mut self, producer_index: usize, timestamp_us: u64, payload: SensorPayload) {
        match SensorClass::from_producer_index(producer_index) {
            Some(class) => self.dispatch(SensorEvent::new(class, timestamp_us, payload)),
            None => trace!("dropping event with unmapped sensor index {producer_index}"),
        }
    }

    /// Consume one typed event, updating exactly one field group.
    pub fn dispatch(&mut self, event: SensorEvent) {
        match event.class {
            SensorClass::Accelerometer => {
                if let SensorPayload::Vector { value, accuracy } = event.payload {
                    self.accel_accuracy = accuracy;
                    self.write_accel(value * GRAVITY_MPS2);
                } else {
                    self.reject(&event);
                }
            }
            SensorClass::LinearAcceleration => {
                if let SensorPayload::Vector { value, .. } = event.payload {
                    self.store.set_linear_accel(value * GRAVITY_MPS2);
                } else {
                    self.reject(&event);
                }
            }
            SensorClass::Gyroscope => {
                if let SensorPayload::Vector { value, accuracy } = event.payload {
                    self.gyro_accuracy = accuracy;
                    if self.policy.filter_gyro {
                        let filtered = self.gyro_filter.push(value);
                        self.store.set_gyro(filtered);
                    } else {
                        self.store.set_gyro(value);
                    }
                } else {
                    self.reject(&event);
                }
            }
            SensorClass::RawAccelerometer => {
                if let SensorPayload::Raw(counts) = event.payload {
                    self.store.set_raw_accel(counts);
                } else {
                    self.reject(&event);
                }
            }
            SensorClass::RawGyroscope => {
                if let SensorPayload::Raw(counts) = event.payload {
                    self.store.set_raw_gyro(counts);
                } else {
                    self.reject(&event);
                }
            }
            SensorClass::UncalGyroscope => {
                if let SensorPayload::VectorWithBias { value, bias, .. } = event.payload {
                    self.store.set_uncal_gyro(value, bias);
                } else {
                    self.reject(&event);
                }
            }
            SensorClass::UncalMagnetometer => {
                if let SensorPayload::VectorWithBias { value, bias, .. } = event.payload {
                    self.store.set_uncal_mag(value, bias);
                } else {
                    self.reject(&event);
                }
            }
            SensorClass::Magnetometer => {
                if let SensorPayload::Vector { value, .. } = event.payload {
                    self.store.set_mag(value);
                } else {
                    self.reject(&event);
                }
            }
            SensorClass::Gravity => {
                if let SensorPayload::Vector { value, .. } = event.payload {
                    self.store.set_gravity(value);
                } else {
                    self.reject(&event);
                }
            }
            SensorClass::GameRotationVector => {
                if let SensorPayload::Quaternion { quat } = event.payload {
                    // 6-DOF fusion carries no accuracy of its own; derive it
                    // from the weaker of the two contributing channels.
                    let accuracy = self.accel_accuracy.min(self.gyro_accuracy) as f64;
                    self.store.set_quat_6dof(quat, accuracy);
                } else {
                    self.reject(&event);
                }
            }
            SensorClass::RotationVector => {
                if let SensorPayload::QuaternionWithAccuracy { quat, accuracy } = event.payload {
                    self.store.set_quat_9dof(quat, accuracy);
                } else {
                    self.reject(&event);
                }
            }
            // Recognized but intentionally not stored.
            SensorClass::GeomagRotationVector => {}
            SensorClass::ActivityClassifier => {
                if let SensorPayload::ActivityCode(code) = event.payload {
                    self.store.set_activity(Activity::from_code(code));
                } else {
                    self.reject(&event);
                }
            }
            SensorClass::StepCounter => {
                if let SensorPayload::StepCount(count) = event.payload {
                    self.store.set_step_count(count);
                } else {
                    self.reject(&event);
                }
            }
            SensorClass::StepDetector => self.store.set_step_detected(),
            SensorClass::TiltDetector => self.store.set_tilt_detected(),
            SensorClass::SignificantMotion => self.store.set_significant_motion(),
            SensorClass::PickupGesture => self.store.set_pickup_detected(),
            SensorClass::Orientation => {
                if let SensorPayload::EulerAngles(angles) = event.payload {
                    self.store.set_euler(angles);
                } else {
                    self.reject(&event);
                }
            }
            SensorClass::DirectionGesture => {
                if let SensorPayload::Direction(code) = event.payload {
                    self.store.set_direction(code);
                } else {
                    self.reject(&event);
                }
            }
        }
    }

    fn write_accel(&mut self, scaled: Vector3<f64>) {
        if !self.policy.filter_accel {
            self.store.set_accel(scaled);
            return;
        }
        for axis in 0..3 {
            self.accel_filter[axis].push(scaled[axis]);
        }
        // Until the window fills, the store keeps its previous value.
        if self.accel_filter[0].is_full() {
            self.store.set_accel(Vector3::new(
                self.accel_filter[0].median(),
                self.accel_filter[1].median(),
                self.accel_filter[2].median(),
            ));
        }
    }

    fn reject(&self, event: &SensorEvent) {
        warn!(
            "payload {:?} does not decode for sensor class {:?}",
            event.payload, event.class
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SensorState;

    fn dispatcher() -> (EventDispatcher, SharedStateStore) {
        let store = SharedStateStore::new();
        (
            EventDispatcher::new(store.clone(), FilterPolicy::default()),
            store,
        )
    }

    fn vector_event(class: SensorClass, x: f64, y: f64, z: f64, accuracy: u8) -> SensorEvent {
        SensorEvent::new(
            class,
            0,
            SensorPayload::Vector {
                value: Vector3::new(x, y, z),
                accuracy,
            },
        )
    }

    #[test]
    fn test_magnetometer_touches_only_magnetometer() {
        let (mut dispatcher, store) = dispatcher();
        let before = store.snapshot();

        dispatcher.dispatch(vector_event(SensorClass::Magnetometer, 22.0, -4.5, 31.0, 3));

        let after = store.snapshot();
        let mut expected = before;
        expected.mag = Vector3::new(22.0, -4.5, 31.0);
        assert_eq!(after, expected);
    }

    #[test]
    fn test_unmapped_index_is_a_no_op() {
        let (mut dispatcher, store) = dispatcher();
        let before = store.snapshot();

        dispatcher.dispatch_raw(
            42,
            0,
            SensorPayload::Vector {
                value: Vector3::new(1.0, 1.0, 1.0),
                accuracy: 3,
            },
        );

        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_raw_index_routing() {
        let (mut dispatcher, store) = dispatcher();
        // Index 12 is the magnetometer in the producer's enumeration.
        dispatcher.dispatch_raw(
            12,
            0,
            SensorPayload::Vector {
                value: Vector3::new(7.0, 8.0, 9.0),
                accuracy: 1,
            },
        );
        assert_eq!(store.magnetometer(), Vector3::new(7.0, 8.0, 9.0));
    }

    #[test]
    fn test_accel_is_scaled_to_mps2() {
        let (mut dispatcher, store) = dispatcher();
        dispatcher.dispatch(vector_event(SensorClass::Accelerometer, 0.0, 0.0, 1.0, 3));
        assert_eq!(store.acceleration(), Vector3::new(0.0, 0.0, GRAVITY_MPS2));
    }

    #[test]
    fn test_six_dof_accuracy_is_min_of_channels() {
        let (mut dispatcher, store) = dispatcher();
        dispatcher.dispatch(vector_event(SensorClass::Accelerometer, 0.0, 0.0, 1.0, 3));
        dispatcher.dispatch(vector_event(SensorClass::Gyroscope, 0.0, 0.0, 0.0, 1));

        dispatcher.dispatch(SensorEvent::new(
            SensorClass::GameRotationVector,
            0,
            SensorPayload::Quaternion {
                quat: [1.0, 0.0, 0.0, 0.0],
            },
        ));

        let (quat, accuracy) = store.quaternion(true);
        assert_eq!(quat, [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(accuracy, 1.0);
    }

    #[test]
    fn test_nine_dof_accuracy_is_verbatim() {
        let (mut dispatcher, store) = dispatcher();
        dispatcher.dispatch(SensorEvent::new(
            SensorClass::RotationVector,
            0,
            SensorPayload::QuaternionWithAccuracy {
                quat: [0.0, 1.0, 0.0, 0.0],
                accuracy: 0.35,
            },
        ));

        let (quat, accuracy) = store.quaternion(false);
        assert_eq!(quat, [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(accuracy, 0.35);
        // The 6-DOF pair stays untouched.
        assert_eq!(store.quaternion(true), ([0.0; 4], 0.0));
    }

    #[test]
    fn test_geomag_rotation_is_ignored() {
        let (mut dispatcher, store) = dispatcher();
        let before = store.snapshot();
        dispatcher.dispatch(SensorEvent::new(
            SensorClass::GeomagRotationVector,
            0,
            SensorPayload::QuaternionWithAccuracy {
                quat: [1.0, 0.0, 0.0, 0.0],
                accuracy: 1.0,
            },
        ));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_filtered_accel_waits_for_full_window() {
        let store = SharedStateStore::new();
        let mut dispatcher = EventDispatcher::new(
            store.clone(),
            FilterPolicy {
                filter_accel: true,
                filter_gyro: false,
            },
        );

        for _ in 0..(ACCEL_WINDOW - 1) {
            dispatcher.dispatch(vector_event(SensorClass::Accelerometer, 1.0, 1.0, 1.0, 3));
            assert_eq!(store.acceleration(), Vector3::zeros());
        }
        dispatcher.dispatch(vector_event(SensorClass::Accelerometer, 1.0, 1.0, 1.0, 3));
        assert_eq!(
            store.acceleration(),
            Vector3::new(GRAVITY_MPS2, GRAVITY_MPS2, GRAVITY_MPS2)
        );
    }

    #[test]
    fn test_filtered_gyro_median_of_three() {
        let store = SharedStateStore::new();
        let mut dispatcher = EventDispatcher::new(
            store.clone(),
            FilterPolicy {
                filter_accel: false,
                filter_gyro: true,
            },
        );

        dispatcher.dispatch(vector_event(SensorClass::Gyroscope, 5.0, 5.0, 5.0, 3));
        dispatcher.dispatch(vector_event(SensorClass::Gyroscope, 1.0, 1.0, 1.0, 3));
        dispatcher.dispatch(vector_event(SensorClass::Gyroscope, 3.0, 3.0, 3.0, 3));
        assert_eq!(store.gyroscope(), Vector3::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn test_gesture_and_step_events() {
        let (mut dispatcher, store) = dispatcher();
        dispatcher.dispatch(SensorEvent::new(
            SensorClass::StepCounter,
            0,
            SensorPayload::StepCount(128),
        ));
        dispatcher.dispatch(SensorEvent::new(
            SensorClass::TiltDetector,
            0,
            SensorPayload::Occurred,
        ));
        dispatcher.dispatch(SensorEvent::new(
            SensorClass::DirectionGesture,
            0,
            SensorPayload::Direction(2),
        ));

        let state = store.snapshot();
        assert_eq!(state.step_count, 128);
        assert!(state.tilt_detected);
        assert!(!state.pickup_detected);
        assert_eq!(state.direction_code, 2);
    }

    #[test]
    fn test_activity_classifier_decodes() {
        let (mut dispatcher, store) = dispatcher();
        dispatcher.dispatch(SensorEvent::new(
            SensorClass::ActivityClassifier,
            0,
            SensorPayload::ActivityCode(6),
        ));
        assert_eq!(store.activity(), Activity::Still);
    }

    #[test]
    fn test_mismatched_payload_is_dropped() {
        let (mut dispatcher, store) = dispatcher();
        let before = store.snapshot();
        dispatcher.dispatch(SensorEvent::new(
            SensorClass::StepCounter,
            0,
            SensorPayload::Direction(9),
        ));
        assert_eq!(store.snapshot(), before);
        assert_eq!(store.snapshot(), SensorState::default());
    }
}
