//! The in-memory event representations shared by every pipeline stage.

use crate::prelude::*;

/// Status nibble of a Note-Off message.
pub const NOTE_OFF: u8 = 0x80;
/// Status nibble of a Note-On message.
pub const NOTE_ON: u8 = 0x90;
/// Status nibble of a polyphonic key pressure message.
pub const POLY_PRESSURE: u8 = 0xA0;
/// Status nibble of a control change message.
pub const CONTROL_CHANGE: u8 = 0xB0;
/// Status nibble of a program change message.
pub const PROGRAM_CHANGE: u8 = 0xC0;
/// Status nibble of a channel pressure message.
pub const CHANNEL_PRESSURE: u8 = 0xD0;
/// Status nibble of a pitch bend message.
pub const PITCH_BEND: u8 = 0xE0;
/// Status byte of a meta event.
pub const META: u8 = 0xFF;
/// Status byte marking an event that must not be emitted.
pub const SUPPRESSED: u8 = 0x00;

/// A single channel event, timestamped in absolute MIDI ticks.
///
/// Events are created by the track reader in file order, get their `gate_time` (and, for
/// consumed note-offs, their `status`) rewritten by the gate resolver, and are then reordered
/// and encoded.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct TrackEvent {
    /// Ticks since the start of the track.
    pub absolute_time: u32,
    /// The raw MIDI status byte, or [`SUPPRESSED`](constant.SUPPRESSED.html) once a note-off
    /// has been folded into the gate time of its note-on.
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
    /// For note-ons, the amount of ticks until the note is released.
    /// Zero if the note is never released.
    pub gate_time: u32,
}
impl TrackEvent {
    #[inline]
    pub fn new(absolute_time: u32, status: u8, data1: u8, data2: u8) -> TrackEvent {
        TrackEvent {
            absolute_time,
            status,
            data1,
            data2,
            gate_time: 0,
        }
    }

    /// The status nibble, ie. the message type without the channel.
    #[inline]
    pub fn kind(&self) -> u8 {
        self.status & 0xF0
    }

    /// The MIDI channel, meaningful only for channel messages.
    #[inline]
    pub fn channel(&self) -> u8 {
        bit_range(self.status, 0..4)
    }

    /// Whether this event starts a note: a note-on with nonzero velocity.
    #[inline]
    pub fn is_note_start(&self) -> bool {
        self.kind() == NOTE_ON && self.data2 != 0
    }

    /// Whether this event ends a note: either a note-off or a note-on with zero velocity.
    #[inline]
    pub fn is_note_end(&self) -> bool {
        self.kind() == NOTE_OFF || (self.kind() == NOTE_ON && self.data2 == 0)
    }

    #[inline]
    pub fn is_suppressed(&self) -> bool {
        self.status == SUPPRESSED
    }

    #[inline]
    pub(crate) fn suppress(&mut self) {
        self.status = SUPPRESSED;
    }
}

/// A tempo change.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct TempoEvent {
    /// Ticks since the previous tempo event, or since the start of the track for the first.
    pub step_time: u32,
    /// Microseconds per beat (quarter note).
    pub mspb: u32,
}
impl TempoEvent {
    #[inline]
    pub fn new(step_time: u32, mspb: u32) -> TempoEvent {
        TempoEvent { step_time, mspb }
    }

    /// Big-endian `(step_time, mspb)` pair, as stored in the SEQ tempo table.
    pub(crate) fn encode(&self) -> [u8; 8] {
        let mut bytes = [0; 8];
        bytes[0..4].copy_from_slice(&self.step_time.to_be_bytes()[..]);
        bytes[4..8].copy_from_slice(&self.mspb.to_be_bytes()[..]);
        bytes
    }
}
