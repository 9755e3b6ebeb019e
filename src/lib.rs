//! # Overview
//!
//! `mid2seq` transcodes single-track Standard Midi Files (format 0) into the SEQ sequence
//! format, a compact binary format used by a sequencer playback engine.
//!
//! Usage is as simple as:
//!
//! ```rust,no_run
//! use std::fs;
//!
//! let midi = fs::read("song.mid").unwrap();
//! let seq = mid2seq::transcode(&midi).unwrap();
//! fs::write("song.seq", seq).unwrap();
//! ```
//!
//! # The pipeline
//!
//! Transcoding goes through five stages, each one handing its results to the next:
//!
//! 1. [`smf::parse`](smf/fn.parse.html) reads the track into a flat list of timestamped channel
//!    events, plus a separate list of tempo changes.
//!    Meta events other than Set Tempo are dropped.
//! 2. [`gate::resolve_gate_times`](gate/fn.resolve_gate_times.html) pairs every note-on with
//!    its release, storing the note length in the note-on and suppressing the release.
//! 3. [`order::sort_events`](order/fn.sort_events.html) stably sorts events by time, putting
//!    note releases first among simultaneous events.
//! 4. [`TempoMap::synthesize`](struct.TempoMap.html#method.synthesize) collapses all tempo
//!    changes into the two-segment tempo map SEQ files use.
//! 5. [`Seq::write`](struct.Seq.html#method.write) encodes everything using the SEQ escape
//!    codes for long delta and gate times.
//!
//! The [`Seq`](struct.Seq.html) struct holds the result of the first four stages, and can be
//! inspected before being written out:
//!
//! ```rust,no_run
//! use std::fs;
//! use mid2seq::Seq;
//!
//! let midi = fs::read("song.mid").unwrap();
//! let seq = Seq::from_smf(&midi).unwrap();
//! println!("{} events, {} bytes", seq.events.len(), seq.encoded_len());
//! seq.save("song.seq").unwrap();
//! ```
//!
//! # About features
//!
//! By default `mid2seq` will attempt to plow through non-standard and even obviously corrupted
//! files: truncated events are read as far as possible, chunks running past the end of the file
//! are clipped and tempo changes past the 255th are ignored.
//! By enabling the `strict` feature the reader will reject such files instead, throwing errors
//! of the kind `ErrorKind::Malformed`.
//!
//! # Logging
//!
//! The transcoder reports what it does through the `tracing` crate: stage summaries at the
//! `debug` level and recoveries from damaged data at the `warn` level.

macro_rules! bail {
    ($err:expr) => {{
        return Err($err.into());
    }};
}
macro_rules! ensure {
    ($cond:expr, $err:expr) => {{
        if !$cond {
            bail!($err)
        }
    }};
}

/// All of the errors this crate produces.
#[macro_use]
mod error;

mod prelude {
    pub(crate) use crate::{
        error::{ErrorKind, Result, ResultExt, StdResult},
        primitive::{IntRead, SplitChecked},
    };
    pub(crate) use core::{
        convert::{Infallible, TryFrom},
        mem, ops,
    };
    pub(crate) use std::{fs::File, io, path::Path};
    pub(crate) use tracing::{debug, trace, warn};

    pub(crate) fn bit_range<T>(val: T, range: ops::Range<u32>) -> T
    where
        T: From<u8>
            + ops::Shr<u32, Output = T>
            + ops::Shl<u32, Output = T>
            + ops::Not<Output = T>
            + ops::BitAnd<Output = T>,
    {
        let mask = !((!T::from(0)) << (range.end - range.start));
        (val >> range.start) & mask
    }
}

pub mod event;
pub mod gate;
pub mod io;
pub mod order;
mod primitive;
mod seq;
pub mod smf;
mod tempo;

pub use crate::{
    error::{Error, ErrorKind, Result},
    event::{TempoEvent, TrackEvent},
    primitive::Format,
    seq::{Seq, SeqHeader},
    smf::{Header, Track},
    tempo::TempoMap,
};

/// Transcode a single-track Standard Midi File into a complete SEQ file.
pub fn transcode(raw: &[u8]) -> Result<Vec<u8>> {
    Seq::from_smf(raw)?.encode()
}
