//! The SEQ sequence format and its encoder.
//!
//! A SEQ file, as written by this crate, is laid out as follows (all integers big-endian):
//!
//! - A bank prologue holding a single song: `num_songs: u16` (always 1) and `song_ptr: u32`
//!   (always 6, right after the prologue).
//! - The SEQ header: `resolution: u16`, `num_tempo_events: u16`, `data_offset: u16` and
//!   `tempo_loop_offset: u16`. Offsets are relative to the start of the header.
//! - The tempo table, `num_tempo_events` pairs of `step_time: u32, mspb: u32`.
//! - The event stream, terminated by `0x83`.
//!
//! Event timing in the stream does not use variable-length quantities.
//! Instead, delta times and gate times that do not fit in a byte are drained by escape opcodes
//! placed before the event, each adding a fixed amount of ticks.

use crate::{
    event::{TrackEvent, CONTROL_CHANGE, NOTE_ON, PITCH_BEND, POLY_PRESSURE},
    gate,
    io::{IoWrap, Write, WriteCounter, WriteResult},
    order,
    prelude::*,
    smf::{self, Track},
    tempo::TempoMap,
};

/// Songs in the bank prologue.
const BANK_SONG_COUNT: u16 = 1;
/// Offset of the only song, right after the bank prologue.
const BANK_SONG_OFFSET: u32 = 6;

const HEADER_LEN: u16 = 8;
const TEMPO_ENTRY_LEN: u16 = 8;

/// Delta escapes usable before any event, largest first.
const STEP_EXTEND: [(u32, u8); 3] = [(0x1000, 0x8F), (0x800, 0x8E), (0x200, 0x8D)];
/// Gate escapes usable before a note-on, largest first.
const GATE_EXTEND: [(u32, u8); 4] = [
    (0x2000, 0x8B),
    (0x1000, 0x8A),
    (0x800, 0x89),
    (0x200, 0x88),
];
/// Adds 256 ticks to the delta of the next non-note event.
const STEP_EXTEND_256: u8 = 0x8C;
const END_OF_TRACK: u8 = 0x83;

/// Note-on control byte flag: add 256 to the delta byte.
const DELTA_CARRY: u8 = 0x20;
/// Note-on control byte flag: add 256 to the gate byte.
const GATE_CARRY: u8 = 0x40;

/// The fixed-size SEQ header.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct SeqHeader {
    /// Ticks per beat.
    pub resolution: u16,
    pub num_tempo_events: u16,
    /// Offset of the event stream.
    pub data_offset: u16,
    /// Offset of the tempo entry playback loops back to, or 0 if there is no tempo table.
    pub tempo_loop_offset: u16,
}
impl SeqHeader {
    pub fn new(resolution: u16, tempo_map: Option<&TempoMap>) -> SeqHeader {
        let num_tempo_events = if tempo_map.is_some() { 2 } else { 0 };
        SeqHeader {
            resolution,
            num_tempo_events,
            data_offset: HEADER_LEN + num_tempo_events * TEMPO_ENTRY_LEN,
            //Loop into the song body, never into the pre-roll
            tempo_loop_offset: if tempo_map.is_some() {
                HEADER_LEN + TEMPO_ENTRY_LEN
            } else {
                0
            },
        }
    }

    fn encode(&self) -> [u8; 8] {
        let mut bytes = [0; 8];
        bytes[0..2].copy_from_slice(&self.resolution.to_be_bytes()[..]);
        bytes[2..4].copy_from_slice(&self.num_tempo_events.to_be_bytes()[..]);
        bytes[4..6].copy_from_slice(&self.data_offset.to_be_bytes()[..]);
        bytes[6..8].copy_from_slice(&self.tempo_loop_offset.to_be_bytes()[..]);
        bytes
    }
}

/// A song ready to be written out as a SEQ file.
///
/// `events` is in playback order, and may contain suppressed events, which are skipped when
/// encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seq {
    pub resolution: u16,
    pub events: Vec<TrackEvent>,
    pub tempo_map: Option<TempoMap>,
}
impl Seq {
    /// Parse a single-track Standard Midi File and run it through the whole pipeline.
    pub fn from_smf(raw: &[u8]) -> Result<Seq> {
        let (header, track) = smf::parse(raw)?;
        Ok(Seq::from_track(header.division, track))
    }

    /// Resolve gate times, order the events and build the tempo map of a freshly read track.
    pub fn from_track(resolution: u16, track: Track) -> Seq {
        let Track { mut events, tempos } = track;
        gate::resolve_gate_times(&mut events);
        order::sort_events(&mut events);
        let tempo_map = TempoMap::synthesize(&tempos, &events);
        Seq {
            resolution,
            events,
            tempo_map,
        }
    }

    pub fn header(&self) -> SeqHeader {
        SeqHeader::new(self.resolution, self.tempo_map.as_ref())
    }

    /// Encode the whole SEQ file into the given writer.
    pub fn write<W: Write>(&self, out: &mut W) -> WriteResult<W> {
        let mut prologue = [0; 6];
        prologue[0..2].copy_from_slice(&BANK_SONG_COUNT.to_be_bytes()[..]);
        prologue[2..6].copy_from_slice(&BANK_SONG_OFFSET.to_be_bytes()[..]);
        out.write(&prologue)?;
        out.write(&self.header().encode())?;
        if let Some(tempo_map) = &self.tempo_map {
            for tempo in tempo_map.entries().iter() {
                out.write(&tempo.encode())?;
            }
        }

        let mut last_time = 0;
        for ev in self.events.iter().filter(|ev| !ev.is_suppressed()) {
            let delta = ev.absolute_time.wrapping_sub(last_time);
            last_time = ev.absolute_time;
            write_event(ev, delta, out)?;
        }
        out.write(&[END_OF_TRACK])?;
        Ok(())
    }

    /// The exact size in bytes of the encoded SEQ file.
    pub fn encoded_len(&self) -> u64 {
        let mut counter = WriteCounter(0);
        match self.write(&mut counter) {
            Ok(()) => counter.0,
            Err(never) => match never {},
        }
    }

    /// Encode the SEQ file into a freshly allocated buffer.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let len = usize::try_from(self.encoded_len())
            .map_err(|_| err_oom!("seq file does not fit in memory"))?;
        let mut out = Vec::new();
        out.try_reserve_exact(len)
            .map_err(|_| err_oom!("failed to allocate the output buffer"))?;
        match self.write(&mut out) {
            Ok(()) => {}
            Err(never) => match never {},
        }
        debug!(bytes = out.len(), "encoded seq file");
        Ok(out)
    }

    /// Write the SEQ file to the given path, creating or truncating it.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        fn save_impl(seq: &Seq, path: &Path) -> io::Result<()> {
            let mut out = IoWrap(io::BufWriter::new(File::create(path)?));
            seq.write(&mut out)?;
            io::Write::flush(&mut out.0)
        }
        save_impl(self, path.as_ref())
    }
}

/// Encode one event, along with any escapes its delta time needs.
pub(crate) fn write_event<W: Write>(
    ev: &TrackEvent,
    mut delta: u32,
    out: &mut W,
) -> WriteResult<W> {
    write_step_extend(&mut delta, out)?;
    if ev.kind() == NOTE_ON {
        write_note_on(ev, delta, out)
    } else {
        write_channel_event(ev, delta, out)
    }
}

/// Drain large delta times with `0x8F`/`0x8E`/`0x8D` escapes, leaving less than `0x200`.
pub(crate) fn write_step_extend<W: Write>(delta: &mut u32, out: &mut W) -> WriteResult<W> {
    for &(step, opcode) in STEP_EXTEND.iter() {
        while *delta >= step {
            out.write(&[opcode])?;
            *delta -= step;
        }
    }
    Ok(())
}

/// Drain large gate times with `0x8B`/`0x8A`/`0x89`/`0x88` escapes, leaving less than `0x200`.
pub(crate) fn write_gate_extend<W: Write>(gate: &mut u32, out: &mut W) -> WriteResult<W> {
    for &(step, opcode) in GATE_EXTEND.iter() {
        while *gate >= step {
            out.write(&[opcode])?;
            *gate -= step;
        }
    }
    Ok(())
}

/// Write a note-on record: gate escapes, then `control, key, velocity, gate, delta`.
///
/// The control byte holds the channel, plus one carry flag each for delta and gate times that
/// still do not fit in a byte.
pub(crate) fn write_note_on<W: Write>(
    ev: &TrackEvent,
    mut delta: u32,
    out: &mut W,
) -> WriteResult<W> {
    let mut gate = ev.gate_time;
    write_gate_extend(&mut gate, out)?;
    let mut control = ev.channel();
    if delta >= 256 {
        control |= DELTA_CARRY;
        delta -= 256;
    }
    if gate >= 256 {
        control |= GATE_CARRY;
        gate -= 256;
    }
    out.write(&[control, ev.data1, ev.data2, gate as u8, delta as u8])
}

/// Write any other event: 256-tick escapes, then the status, the payload and the delta.
///
/// Pitch bends only keep their coarse (MSB) byte, and messages other than control changes and
/// key pressure only keep their first data byte.
pub(crate) fn write_channel_event<W: Write>(
    ev: &TrackEvent,
    mut delta: u32,
    out: &mut W,
) -> WriteResult<W> {
    while delta >= 256 {
        out.write(&[STEP_EXTEND_256])?;
        delta -= 256;
    }
    out.write(&[ev.status])?;
    match ev.kind() {
        CONTROL_CHANGE | POLY_PRESSURE => out.write(&[ev.data1, ev.data2])?,
        PITCH_BEND => out.write(&[ev.data2])?,
        _ => out.write(&[ev.data1])?,
    }
    out.write(&[delta as u8])
}
