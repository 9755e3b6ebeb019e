//! Pairing note-ons with their releases to compute gate times.

use crate::{event::TrackEvent, prelude::*};

const CHANNELS: usize = 16;
const KEYS: usize = 128;

/// The currently sounding note-on for every (channel, key) pair, as an index into the event
/// list.
struct ActiveNotes {
    slots: [[Option<usize>; KEYS]; CHANNELS],
}
impl ActiveNotes {
    fn new() -> ActiveNotes {
        ActiveNotes {
            slots: [[None; KEYS]; CHANNELS],
        }
    }

    /// Keys above 127 only show up in damaged files; they get no slot and are never paired.
    #[inline]
    fn slot(&mut self, ev: &TrackEvent) -> Option<&mut Option<usize>> {
        self.slots[ev.channel() as usize].get_mut(ev.data1 as usize)
    }
}

/// Compute the gate time of every note-on and suppress the note-offs that were consumed.
///
/// Events must be in file order.
/// A note-on is closed by the next note-off (or zero-velocity note-on) on the same channel and
/// key, or by the next note-on of the same channel and key, which retriggers it.
/// Only releases that actually close a sounding note are suppressed; stray ones are left as
/// they are.
/// Note-ons never closed keep a gate time of zero.
///
/// Returns the amount of suppressed events.
pub fn resolve_gate_times(events: &mut [TrackEvent]) -> usize {
    let mut active = ActiveNotes::new();
    let mut suppressed = 0;
    for idx in 0..events.len() {
        let ev = events[idx];
        if ev.is_note_start() {
            let slot = match active.slot(&ev) {
                Some(slot) => slot,
                None => continue,
            };
            if let Some(prev) = slot.replace(idx) {
                let prev = &mut events[prev];
                prev.gate_time = ev.absolute_time.wrapping_sub(prev.absolute_time);
            }
        } else if ev.is_note_end() {
            let note_on = match active.slot(&ev).and_then(Option::take) {
                Some(note_on) => note_on,
                None => continue,
            };
            let note_on = &mut events[note_on];
            note_on.gate_time = ev.absolute_time.wrapping_sub(note_on.absolute_time);
            events[idx].suppress();
            suppressed += 1;
        }
    }
    debug!(suppressed, "resolved gate times");
    suppressed
}
