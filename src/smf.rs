//! Reading the single track of a Standard Midi File into a flat event list.

use crate::{
    event::{TempoEvent, TrackEvent, META},
    prelude::*,
    primitive::{read_data_byte, read_slice_lenient, read_varlen, Format},
};

/// Maximum amount of Set Tempo events recorded from a track.
pub const MAX_TEMPO_EVENTS: usize = 255;

/// Meta event type of a Set Tempo event.
const META_TEMPO: u8 = 0x51;

/// A MIDI file header.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Header {
    pub format: Format,
    /// Declared amount of track chunks.
    pub track_count: u16,
    /// Raw timing division, passed through as the SEQ resolution.
    pub division: u16,
}
impl Header {
    pub fn new(format: Format, track_count: u16, division: u16) -> Header {
        Header {
            format,
            track_count,
            division,
        }
    }

    fn read(mut raw: &[u8]) -> Result<Header> {
        let format = Format::read(&mut raw)?;
        let track_count =
            u16::read(&mut raw).context(err_invalid!("failed to read track count"))?;
        let division = u16::read(&mut raw).context(err_invalid!("failed to read division"))?;
        Ok(Header::new(format, track_count, division))
    }
}

/// The contents of a track, as read straight out of the file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Track {
    /// Channel events, in file order.
    pub events: Vec<TrackEvent>,
    /// Set Tempo events, in file order, at most `MAX_TEMPO_EVENTS`.
    pub tempos: Vec<TempoEvent>,
}

/// Parse the header and the first track chunk of a single-track Standard Midi File.
///
/// Files of any format other than 0 are rejected with `ErrorKind::Unsupported`.
pub fn parse(raw: &[u8]) -> Result<(Header, Track)> {
    let mut chunks = ChunkIter::read(raw);
    let header = match chunks.next() {
        Some(chunk) => match chunk.context(err_invalid!("invalid midi header"))? {
            Chunk::Header(data) => Header::read(data).context(err_invalid!("invalid midi header"))?,
            _ => bail!(err_invalid!("expected header chunk")),
        },
        None => bail!(err_invalid!("no header chunk")),
    };
    ensure!(
        header.format == Format::SingleTrack,
        err_unsupported!("only single-track (format 0) files are supported")
    );
    if cfg!(feature = "strict") {
        ensure!(
            header.track_count == 1,
            err_malformed!("singletrack format file declares multiple tracks")
        );
    }
    debug!(
        track_count = header.track_count,
        division = header.division,
        "read midi header"
    );

    let track = loop {
        match chunks.next() {
            Some(chunk) => {
                if let Chunk::Track(data) = chunk.context(err_invalid!("invalid track chunk"))? {
                    break read_track(data)?;
                }
            }
            None => {
                if cfg!(feature = "strict") {
                    bail!(err_malformed!("file has no track chunk"));
                }
                warn!("file has no track chunk, transcoding an empty track");
                break Track::default();
            }
        }
    };
    debug!(
        events = track.events.len(),
        tempos = track.tempos.len(),
        "read midi track"
    );
    Ok((header, track))
}

#[derive(Copy, Clone, Debug)]
struct ChunkIter<'a> {
    /// Starts at the current index, ends at EOF.
    raw: &'a [u8],
}
impl<'a> ChunkIter<'a> {
    fn read(raw: &'a [u8]) -> ChunkIter<'a> {
        ChunkIter { raw }
    }
}
impl<'a> Iterator for ChunkIter<'a> {
    type Item = Result<Chunk<'a>>;
    fn next(&mut self) -> Option<Result<Chunk<'a>>> {
        if self.raw.is_empty() {
            return None;
        }
        let result = Chunk::read(&mut self.raw);
        if result.is_err() {
            //Never read a chunk from the middle of a broken one
            self.raw = &[];
        }
        Some(result)
    }
}

#[derive(Copy, Clone, Debug)]
enum Chunk<'a> {
    Header(&'a [u8]),
    Track(&'a [u8]),
    Unknown,
}
impl<'a> Chunk<'a> {
    /// Should be called with a byte slice at least as large as the chunk (ideally until EOF).
    /// The slice will be modified to point to the next chunk.
    fn read(raw: &mut &'a [u8]) -> Result<Chunk<'a>> {
        let id = raw
            .split_checked(4)
            .ok_or(err_invalid!("failed to read chunkid"))?;
        let len = u32::read(raw).context(err_invalid!("failed to read chunklen"))?;
        let chunkdata = match raw.split_checked(len as usize) {
            Some(chunkdata) => chunkdata,
            None => {
                if cfg!(feature = "strict") {
                    bail!(err_malformed!("reached eof before chunk ended"));
                }
                warn!(
                    declared = len,
                    available = raw.len(),
                    "chunk runs past end of file, using the remainder of the file"
                );
                mem::replace(raw, &[])
            }
        };
        Ok(match id {
            b"MThd" => Chunk::Header(chunkdata),
            b"MTrk" => Chunk::Track(chunkdata),
            _ => Chunk::Unknown,
        })
    }
}

/// Read every event of a track chunk.
///
/// Channel events are collected in file order, Set Tempo events go to their own list and every
/// other meta event is dropped.
/// System exclusive and other non-channel status bytes are skipped without consuming any data.
fn read_track(mut raw: &[u8]) -> Result<Track> {
    //Every event takes at least one byte, so this never reallocates
    let mut events = Vec::new();
    events
        .try_reserve_exact(raw.len())
        .map_err(|_| err_oom!("failed to allocate the event buffer"))?;
    let mut tempos = Vec::new();
    let mut time: u32 = 0;
    let mut last_tempo_time: u32 = 0;
    let mut running_status: u8 = 0;
    let mut tempo_cap_reached = false;

    while !raw.is_empty() {
        let delta = read_varlen(&mut raw).context(err_invalid!("failed to read event deltatime"))?;
        time = time.wrapping_add(delta);

        let status = match raw.first() {
            Some(&status) if status & 0x80 != 0 => {
                raw = &raw[1..];
                status
            }
            //Running status, the byte is data and stays unread
            Some(_) => running_status,
            None => break,
        };

        match status & 0xF0 {
            0x80 | 0x90 | 0xA0 | 0xB0 | 0xE0 => {
                let data1 = read_data_byte(&mut raw)?;
                let data2 = read_data_byte(&mut raw)?;
                events.push(TrackEvent::new(time, status, data1, data2));
            }
            0xC0 | 0xD0 => {
                let data1 = read_data_byte(&mut raw)?;
                events.push(TrackEvent::new(time, status, data1, 0));
            }
            _ if status == META => {
                let meta_type = read_data_byte(&mut raw)?;
                let len =
                    read_varlen(&mut raw).context(err_invalid!("failed to read meta length"))?;
                let payload = read_slice_lenient(&mut raw, len)?;
                if meta_type == META_TEMPO {
                    if tempos.len() < MAX_TEMPO_EVENTS {
                        let mspb = payload
                            .iter()
                            .fold(0u32, |acc, &byte| (acc << 8) | u32::from(byte));
                        tempos.push(TempoEvent::new(time.wrapping_sub(last_tempo_time), mspb));
                        last_tempo_time = time;
                    } else if cfg!(feature = "strict") {
                        bail!(err_malformed!("track has more than 255 tempo changes"));
                    } else if !tempo_cap_reached {
                        tempo_cap_reached = true;
                        warn!(
                            cap = MAX_TEMPO_EVENTS,
                            "too many tempo changes, ignoring the rest"
                        );
                    }
                }
            }
            _ => {
                trace!(status, time, "ignoring non-channel status byte");
            }
        }
        //Every dispatched status becomes the running status, meta and system ones included
        running_status = status;
    }

    Ok(Track { events, tempos })
}
