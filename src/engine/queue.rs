use rtrb::{Consumer, Producer, PushError, RingBuffer};

use super::event::{RenderEvent, SampleTime};

/// Control-thread end of an [`EventQueue`].
pub struct EventSender {
    tx: Producer<RenderEvent>,
}

impl EventSender {
    /// Queue an event. Hands the event back if the queue is full.
    pub fn send(&mut self, event: RenderEvent) -> Result<(), RenderEvent> {
        self.tx.push(event).map_err(|PushError::Full(event)| event)
    }

    /// Free slots left in the queue.
    pub fn slots(&self) -> usize {
        self.tx.slots()
    }
}

/// Audio-thread end: turns a stream of timestamped events into the ordered
/// per-block list `process_and_render` expects.
///
/// Senders must push in non-decreasing time order. An event that belongs to
/// a later block is held back and delivered when its block comes up.
pub struct EventQueue {
    rx: Consumer<RenderEvent>,
    held: Option<RenderEvent>,
    block: Vec<RenderEvent>,
}

impl EventQueue {
    pub fn new(capacity: usize) -> (EventSender, Self) {
        let (tx, rx) = RingBuffer::<RenderEvent>::new(capacity);
        let queue = Self {
            rx,
            held: None,
            block: Vec::with_capacity(capacity),
        };
        (EventSender { tx }, queue)
    }

    /// Events due in `[timestamp, timestamp + frame_count)`, plus any that
    /// are already late. Never allocates: once the block list is full the
    /// rest waits for the next call.
    pub fn drain_block(&mut self, timestamp: SampleTime, frame_count: usize) -> &[RenderEvent] {
        let end = timestamp.saturating_add(frame_count as SampleTime);
        self.block.clear();

        loop {
            let event = match self.held.take() {
                Some(event) => event,
                None => match self.rx.pop() {
                    Ok(event) => event,
                    Err(_) => break,
                },
            };
            if event.time >= end || self.block.len() == self.block.capacity() {
                self.held = Some(event);
                break;
            }
            self.block.push(event);
        }

        &self.block
    }

    /// Whether an event is waiting for a later block.
    pub fn has_pending(&self) -> bool {
        self.held.is_some() || !self.rx.is_empty()
    }
}
