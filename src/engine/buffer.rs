//! Sample storage for one render call and the per-channel views over it.
//!
//! [`AudioBufferList`] owns non-interleaved storage sized once at configuration
//! time. [`BufferFacet`] and [`BufferFacetMut`] are the views a kernel sees:
//! they never own memory, they only window a larger buffer at an offset so a
//! segment of a block can be handed out as plain per-channel slices.
//! [`PullBuffer`] is the view an upstream pull callback fills.

/// Owned, non-interleaved sample storage.
///
/// Channel `c` occupies `samples[c * capacity .. (c + 1) * capacity]`. Only the
/// first `frame_count` frames of each channel are visible through the
/// accessors.
#[derive(Debug, Default, Clone)]
pub struct AudioBufferList {
    samples: Vec<f32>,
    channel_count: usize,
    capacity: usize,
    frame_count: usize,
}

impl AudioBufferList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage for `channel_count` channels of `max_frames` frames each.
    pub fn with_capacity(channel_count: usize, max_frames: usize) -> Self {
        let mut list = Self::new();
        list.allocate(channel_count, max_frames);
        list
    }

    /// Size the storage. Configuration path only: this allocates.
    pub fn allocate(&mut self, channel_count: usize, max_frames: usize) {
        self.samples.clear();
        self.samples.resize(channel_count * max_frames, 0.0);
        self.channel_count = channel_count;
        self.capacity = max_frames;
        self.frame_count = max_frames;
    }

    /// Drop the storage.
    pub fn release(&mut self) {
        self.samples = Vec::new();
        self.channel_count = 0;
        self.capacity = 0;
        self.frame_count = 0;
    }

    pub fn is_allocated(&self) -> bool {
        self.capacity > 0 && self.channel_count > 0
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Frames per channel the storage can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Frames per channel currently visible.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Set the visible length for the coming call. Clamped to the capacity.
    pub fn set_frame_count(&mut self, frame_count: usize) {
        debug_assert!(frame_count <= self.capacity);
        self.frame_count = frame_count.min(self.capacity);
    }

    pub fn channel(&self, channel: usize) -> &[f32] {
        let start = channel * self.capacity;
        &self.samples[start..start + self.frame_count]
    }

    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        let start = channel * self.capacity;
        &mut self.samples[start..start + self.frame_count]
    }
}

/// The engine's input storage as a pull callback sees it.
///
/// Channels are already cut to the block length. The callback can fill them
/// but cannot resize, release or reallocate the storage behind them.
pub struct PullBuffer<'a> {
    list: &'a mut AudioBufferList,
}

impl<'a> PullBuffer<'a> {
    pub(crate) fn new(list: &'a mut AudioBufferList) -> Self {
        Self { list }
    }

    pub fn channel_count(&self) -> usize {
        self.list.channel_count()
    }

    /// Frames per channel to fill. Always the block length.
    pub fn frame_count(&self) -> usize {
        self.list.frame_count()
    }

    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        self.list.channel_mut(channel)
    }
}

/// Read-only window over an [`AudioBufferList`].
#[derive(Debug, Clone, Copy)]
pub struct BufferFacet<'a> {
    list: &'a AudioBufferList,
    offset: usize,
    frames: usize,
}

impl<'a> BufferFacet<'a> {
    pub fn new(list: &'a AudioBufferList) -> Self {
        Self {
            list,
            offset: 0,
            frames: list.frame_count(),
        }
    }

    /// Move the window to `frames` frames starting at `offset`.
    pub fn set_range(&mut self, offset: usize, frames: usize) {
        debug_assert!(offset + frames <= self.list.frame_count());
        self.offset = offset;
        self.frames = frames;
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn channel_count(&self) -> usize {
        self.list.channel_count()
    }

    pub fn channel(&self, channel: usize) -> &'a [f32] {
        &self.list.channel(channel)[self.offset..self.offset + self.frames]
    }
}

enum Destination<'o, 'b> {
    Host(&'o mut [&'b mut [f32]]),
    Owned(&'o mut AudioBufferList),
}

/// Writable window over either host-provided channel slices or an
/// engine-owned [`AudioBufferList`].
pub struct BufferFacetMut<'o, 'b> {
    destination: Destination<'o, 'b>,
    offset: usize,
    frames: usize,
}

impl<'o, 'b> BufferFacetMut<'o, 'b> {
    /// View over host channel slices. Each slice must hold at least `frames` samples.
    pub fn host(channels: &'o mut [&'b mut [f32]], frames: usize) -> Self {
        debug_assert!(channels.iter().all(|channel| channel.len() >= frames));
        Self {
            destination: Destination::Host(channels),
            offset: 0,
            frames,
        }
    }

    /// View over engine-owned storage, covering its visible frames.
    pub fn owned(list: &'o mut AudioBufferList) -> Self {
        let frames = list.frame_count();
        Self {
            destination: Destination::Owned(list),
            offset: 0,
            frames,
        }
    }

    pub fn set_range(&mut self, offset: usize, frames: usize) {
        self.offset = offset;
        self.frames = frames;
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn channel_count(&self) -> usize {
        match &self.destination {
            Destination::Host(channels) => channels.len(),
            Destination::Owned(list) => list.channel_count(),
        }
    }

    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        let range = self.offset..self.offset + self.frames;
        match &mut self.destination {
            Destination::Host(channels) => &mut channels[channel][range],
            Destination::Owned(list) => &mut list.channel_mut(channel)[range],
        }
    }

    /// Copy the matching window of `source` into this one, channel by channel.
    ///
    /// Output channels without a matching input channel are silenced.
    pub fn copy_from(&mut self, source: &BufferFacet<'_>) {
        debug_assert_eq!(self.frames, source.frames());
        let shared = self.channel_count().min(source.channel_count());
        for channel in 0..shared {
            self.channel_mut(channel).copy_from_slice(source.channel(channel));
        }
        for channel in shared..self.channel_count() {
            self.channel_mut(channel).fill(0.0);
        }
    }
}
