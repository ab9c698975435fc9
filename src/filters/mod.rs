pub mod median;
pub mod median3;

pub use median::{MedianWindow, ACCEL_WINDOW};
pub use median3::VectorMedian3;
