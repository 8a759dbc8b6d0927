//! Timestamped events delivered alongside a render block.

/// Absolute sample time, on the same clock as the render call's timestamp.
pub type SampleTime = i64;

/// A parameter change addressed by the kernel's raw parameter address.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterEvent {
    pub address: u64,
    pub value: f32,
    /// Ramp length in frames. `None` lets the kernel apply its default ramp;
    /// `Some(0)` is an immediate change.
    pub ramp_frames: Option<u32>,
}

/// Raw MIDI bytes. The engine does not interpret them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiEvent {
    pub cable: u8,
    pub length: u8,
    pub bytes: [u8; 3],
}

impl MidiEvent {
    pub fn new(cable: u8, bytes: &[u8]) -> Self {
        let length = bytes.len().min(3);
        let mut data = [0u8; 3];
        data[..length].copy_from_slice(&bytes[..length]);
        Self {
            cable,
            length: length as u8,
            bytes: data,
        }
    }

    /// The valid bytes of the message.
    pub fn data(&self) -> &[u8] {
        &self.bytes[..self.length as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    Parameter(ParameterEvent),
    Midi(MidiEvent),
}

/// One event of a render block's list. Lists are ordered by `time`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderEvent {
    pub time: SampleTime,
    pub kind: EventKind,
}

impl RenderEvent {
    pub fn parameter(time: SampleTime, address: u64, value: f32) -> Self {
        Self {
            time,
            kind: EventKind::Parameter(ParameterEvent {
                address,
                value,
                ramp_frames: None,
            }),
        }
    }

    pub fn ramped_parameter(time: SampleTime, address: u64, value: f32, frames: u32) -> Self {
        Self {
            time,
            kind: EventKind::Parameter(ParameterEvent {
                address,
                value,
                ramp_frames: Some(frames),
            }),
        }
    }

    pub fn midi(time: SampleTime, event: MidiEvent) -> Self {
        Self {
            time,
            kind: EventKind::Midi(event),
        }
    }
}
