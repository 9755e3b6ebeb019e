//! Collapsing the tempo changes of a track into the two-segment SEQ tempo map.

use crate::{
    event::{TempoEvent, TrackEvent, META},
    prelude::*,
};

/// A SEQ tempo map: a pre-roll segment lasting until the first musical event, and a body
/// segment lasting until the end of the song.
///
/// Both segments share the tempo of the first tempo change of the source track.
/// Every later tempo change is discarded, since the SEQ engine only understands this two-segment
/// layout.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct TempoMap {
    pub pre_roll: TempoEvent,
    pub body: TempoEvent,
}
impl TempoMap {
    /// Build the tempo map for a sorted event list.
    ///
    /// Returns `None` if the source track had no tempo changes at all.
    pub fn synthesize(tempos: &[TempoEvent], events: &[TrackEvent]) -> Option<TempoMap> {
        let mspb = tempos.first()?.mspb;
        let first_musical_time = events
            .iter()
            .find(|ev| ev.status != META)
            .map(|ev| ev.absolute_time)
            .unwrap_or(0);
        let total_time = events.last().map(|ev| ev.absolute_time).unwrap_or(0);
        if tempos.len() > 1 {
            debug!(
                discarded = tempos.len() - 1,
                "keeping only the first tempo change"
            );
        }
        Some(TempoMap {
            pre_roll: TempoEvent::new(first_musical_time, mspb),
            body: TempoEvent::new(total_time.wrapping_sub(first_musical_time), mspb),
        })
    }

    /// The tempo table entries, in file order.
    #[inline]
    pub fn entries(&self) -> [TempoEvent; 2] {
        [self.pre_roll, self.body]
    }
}
