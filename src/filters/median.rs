// Order-statistic sliding-window filter.
//
// The window is an array of (value, arrival-slot) pairs kept sorted
// ascending by value. A ring counter 0..W-1 tags each inserted value with
// its arrival slot; once the window is full, every push first evicts the
// pair tagged with the current slot, so eviction follows arrival order even
// though the storage order is by value. O(W) per push is intentional: W is
// small and fixed, and an array scan beats a balancing structure at this
// size.

/// Sliding-window median filter with FIFO-by-slot eviction.
pub struct MedianWindow {
    window: Vec<(f64, usize)>,
    capacity: usize,
    slot: usize,
}

/// Window size used for accelerometer smoothing.
pub const ACCEL_WINDOW: usize = 23;

impl MedianWindow {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be non-zero");
        Self {
            window: Vec::with_capacity(capacity),
            capacity,
            slot: 0,
        }
    }

    /// Insert a sample, evicting the oldest one once the window is full.
    pub fn push(&mut self, value: f64) {
        if self.window.len() == self.capacity {
            // The pair tagged with the current ring slot is the oldest.
            let pos = self
                .window
                .iter()
                .position(|&(_, s)| s == self.slot)
                .expect("full window always holds every slot tag");
            self.window.remove(pos);
        }

        let insert_at = self
            .window
            .partition_point(|&(v, _)| v < value);
        self.window.insert(insert_at, (value, self.slot));

        self.slot = (self.slot + 1) % self.capacity;
    }

    /// Median of the last `capacity` samples.
    ///
    /// While the window is still filling this returns 0.0; that is a
    /// documented boundary value, not an error.
    pub fn median(&self) -> f64 {
        if !self.is_full() {
            return 0.0;
        }
        self.window[(self.capacity - 1) / 2].0
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.window.len() == self.capacity
    }
}
