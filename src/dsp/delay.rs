//! Circular delay buffer with fractional reads.

/*
Delay Buffer
============

A delay buffer remembers the most recent N samples so that an effect can look
back in time. Flangers, choruses and echoes are all built on one.

Vocabulary
----------

  write cursor   Slot that receives the next sample. Advances by one on
                 every write and wraps at the end of the storage.

  delay          Distance back from the most recently written sample,
                 measured in samples. Delay 0 is the newest sample, delay 1
                 the one before it, and so on.

  capacity       Number of slots. Always a power of two so that wrapping is a
                 single AND with `capacity - 1` instead of a division.


Power-of-two Wrapping
---------------------

With capacity 8 the mask is 0b0111:

    index  9 & 0b0111 = 1
    index  8 & 0b0111 = 0
    index -1 (wrapping) & 0b0111 = 7

Asking for 5000 samples gives 8192 slots. The extra room is never read
because delays are bounded by the configured maximum.


Fractional Reads
----------------

LFO-swept delays rarely land on whole samples. Reading at 10.25 blends the
two neighbours around that position:

    newer = sample at delay 10
    older = sample at delay 11
    frac  = 0.25

    result = frac * older + (1 - frac) * newer

Without the blend the sweep would step between integer positions and the
effect would crackle.
*/

/// Fixed-capacity circular sample store.
///
/// Storage is sized once at configuration time. `write` and `read` never
/// allocate.
#[derive(Debug, Clone)]
pub struct DelayBuffer {
    buffer: Vec<f32>,
    wrap_mask: usize,
    write_pos: usize,
}

impl DelayBuffer {
    /// Create a buffer that can hold at least `min_capacity` samples.
    pub fn new(min_capacity: usize) -> Self {
        let capacity = capacity_for(min_capacity);
        Self {
            buffer: vec![0.0; capacity],
            wrap_mask: capacity - 1,
            write_pos: 0,
        }
    }

    /// Recompute the capacity for `min_capacity` samples, clear the contents
    /// and rewind the write cursor.
    ///
    /// Only call this from the configuration path: growing the storage
    /// allocates.
    pub fn resize(&mut self, min_capacity: usize) {
        let capacity = capacity_for(min_capacity);
        self.buffer.resize(capacity, 0.0);
        self.buffer.shrink_to(capacity);
        self.wrap_mask = capacity - 1;
        self.clear();
    }

    /// Fill the storage with silence and rewind the write cursor.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Physical number of slots. A power of two, possibly larger than requested.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Store a sample and advance the write cursor.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) & self.wrap_mask;
    }

    /// Sample written `offset` writes before the most recent one.
    #[inline]
    pub fn read_at(&self, offset: usize) -> f32 {
        self.buffer[self.write_pos.wrapping_sub(offset + 1) & self.wrap_mask]
    }

    /// Linearly interpolated read `delay` samples behind the newest sample.
    ///
    /// `delay` must satisfy `0 <= delay < capacity - 1`. Debug builds assert
    /// this; release builds clamp into range.
    #[inline]
    pub fn read(&self, delay: f32) -> f32 {
        let max_delay = (self.capacity() - 2) as f32;
        debug_assert!(
            (0.0..=max_delay).contains(&delay),
            "delay {delay} outside 0..{max_delay}"
        );
        let delay = delay.clamp(0.0, max_delay);

        let offset = delay as usize;
        let frac = delay - offset as f32;
        let newer = self.read_at(offset);
        let older = self.read_at(offset + 1);
        frac * older + (1.0 - frac) * newer
    }
}

/// Smallest power of two that holds `min_capacity` samples (and never fewer than two).
fn capacity_for(min_capacity: usize) -> usize {
    min_capacity.max(2).next_power_of_two()
}
