pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Fixed-capacity circular history of integer samples.
///
/// Only aggregate questions are asked of the window, so the slot order of
/// [`CyclicCounter::values`] carries no meaning.
#[derive(Debug, Clone)]
pub struct CyclicCounter {
    samples: Vec<i32>,
    index: usize,
}

impl Default for CyclicCounter {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl CyclicCounter {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0; capacity.max(1)],
            index: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Moves to the next slot and stores `value` there.
    pub fn next(&mut self, value: i32) {
        self.index = (self.index + 1) % self.samples.len();
        self.samples[self.index] = value;
    }

    /// Adds `delta` to the current slot.
    pub fn increase(&mut self, delta: i32) {
        self.samples[self.index] += delta;
    }

    pub fn current(&self) -> i32 {
        self.samples[self.index]
    }

    pub fn values(&self) -> &[i32] {
        &self.samples
    }

    pub fn all_at_least(&self, threshold: i32) -> bool {
        self.samples.iter().all(|&v| v >= threshold)
    }

    pub fn debit_all(&mut self, amount: i32) {
        for sample in &mut self.samples {
            *sample -= amount;
        }
    }
}
