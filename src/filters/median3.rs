// 3-tap median filter for low-latency gyroscope smoothing.

use nalgebra::Vector3;

/// Median-of-three over the last 3 samples, independently per axis.
///
/// Instead of sorting, each axis scans its 3 ring entries starting at the
/// newest write slot and picks the first value that lies between its two
/// ring neighbors (inclusive, ascending or descending) — that entry is the
/// median of the three.
pub struct VectorMedian3 {
    buffer: [Vector3<f64>; 3],
    slot: usize,
}

impl VectorMedian3 {
    pub fn new() -> Self {
        Self {
            buffer: [Vector3::zeros(); 3],
            slot: 0,
        }
    }

    /// Insert a sample and return the per-axis median of the last 3.
    ///
    /// Until 3 samples have arrived the unwritten entries are zero, so early
    /// output blends with the zero-initialized history rather than failing.
    pub fn push(&mut self, sample: Vector3<f64>) -> Vector3<f64> {
        self.buffer[self.slot] = sample;

        let mut filtered = Vector3::zeros();
        for axis in 0..3 {
            for i in self.slot..self.slot + 3 {
                let cur = self.buffer[i % 3][axis];
                let prev = self.buffer[(i + 2) % 3][axis];
                let next = self.buffer[(i + 1) % 3][axis];
                let ascending = cur >= prev && cur <= next;
                let descending = cur <= prev && cur >= next;
                if ascending || descending {
                    filtered[axis] = cur;
                    break;
                }
            }
        }

        self.slot = (self.slot + 1) % 3;
        filtered
    }
}

impl Default for VectorMedian3 {
    fn default() -> Self {
        Self::new()
    }
}
