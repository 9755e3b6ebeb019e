//! Deterministic event ordering.

use crate::{event::TrackEvent, prelude::*};

/// Stably sort events by absolute time.
///
/// At equal times, events ending a note come before every other event, so a note released and
/// struck again on the same tick is never seen struck before it is released.
/// Otherwise, events keep their relative order.
pub fn sort_events(events: &mut [TrackEvent]) {
    events.sort_by_key(|ev| (ev.absolute_time, !ev.is_note_end()));
    trace!(events = events.len(), "sorted events");
}
