//! Simple building-block data that can be read in one go.
//! Primitives advance the read slice when read.

use crate::prelude::*;

pub(crate) trait SplitChecked: Sized {
    fn split_checked(&mut self, at: usize) -> Option<Self>;
}
impl<'a> SplitChecked for &'a [u8] {
    #[inline]
    fn split_checked(&mut self, at: usize) -> Option<&'a [u8]> {
        if at > self.len() {
            None
        } else {
            let (extracted, remainder) = self.split_at(at);
            *self = remainder;
            Some(extracted)
        }
    }
}

/// Implemented on integer types for reading as big-endian.
pub(crate) trait IntRead: Sized {
    /// Reads a big-endian integer.
    fn read(data: &mut &[u8]) -> StdResult<Self, &'static ErrorKind>;
}

/// Implement simple big endian integer reads.
macro_rules! impl_read_int {
    {$( $int:ty ),*} => {
        $(
            impl IntRead for $int {
                #[inline]
                fn read(raw: &mut &[u8]) -> StdResult<$int, &'static ErrorKind> {
                    let bytes = raw.split_checked(mem::size_of::<$int>())
                        .ok_or(err_invalid!("failed to read the expected integer"))?;
                    Ok(bytes.iter().fold(0, |acc: $int, byte| {
                        acc.checked_shl(8).unwrap_or(0) | *byte as $int
                    }))
                }
            }
        )*
    }
}
impl_read_int! {u8,u16,u32}

/// Read a single data byte.
///
/// Past the end of the data, lenient mode yields the `0x00` sentinel instead of failing, so a
/// truncated trailing event is still recorded, partially populated.
pub(crate) fn read_data_byte(raw: &mut &[u8]) -> Result<u8> {
    match raw.split_first() {
        Some((&byte, rest)) => {
            *raw = rest;
            Ok(byte)
        }
        None => {
            if cfg!(feature = "strict") {
                bail!(err_malformed!("truncated event data"))
            } else {
                warn!("event data truncated by end of track, reading 0x00");
                Ok(0)
            }
        }
    }
}

/// Read a MIDI variable-length quantity: 7 bits per byte, big-endian, with the top bit of each
/// byte signalling that another byte follows.
///
/// Bits shifted out of the 32-bit accumulator are dropped.
/// If the data ends mid-quantity the partial value is returned.
/// With the `strict` feature, quantities cut by end of data or longer than 4 bytes are errors
/// instead.
pub(crate) fn read_varlen(raw: &mut &[u8]) -> Result<u32> {
    let mut value: u32 = 0;
    let mut len = 0;
    loop {
        let byte = match raw.split_first() {
            Some((&byte, rest)) => {
                *raw = rest;
                byte
            }
            None => {
                if cfg!(feature = "strict") && len > 0 {
                    bail!(err_malformed!("unexpected eof while reading varlen int"))
                }
                break;
            }
        };
        len += 1;
        if cfg!(feature = "strict") && len > 4 {
            bail!(err_malformed!("varlen integer larger than 4 bytes"))
        }
        value = (value << 7) | u32::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            break;
        }
    }
    Ok(value)
}

/// Split off a slice of `len` bytes.
///
/// If the data ends early, the remainder of the data is used instead (unless the `strict`
/// feature is enabled).
pub(crate) fn read_slice_lenient<'a>(raw: &mut &'a [u8], len: u32) -> Result<&'a [u8]> {
    Ok(match raw.split_checked(len as usize) {
        Some(slice) => slice,
        None => {
            if cfg!(feature = "strict") {
                bail!(err_malformed!("incomplete meta event payload"))
            } else {
                warn!(
                    wanted = len,
                    available = raw.len(),
                    "meta event payload truncated by end of track"
                );
                mem::replace(raw, &[])
            }
        }
    })
}

/// The different formats an SMF file can be.
///
/// Only `SingleTrack` files can be transcoded.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Format {
    /// A single track.
    SingleTrack,
    /// Multiple tracks played simultaneously.
    Parallel,
    /// Multiple independent songs, one per track.
    Sequential,
    /// A format code the SMF standard does not define.
    Unknown(u16),
}
impl Format {
    pub(crate) fn read(raw: &mut &[u8]) -> Result<Format> {
        let format = u16::read(raw).context(err_invalid!("failed to read file format"))?;
        Ok(match format {
            0 => Format::SingleTrack,
            1 => Format::Parallel,
            2 => Format::Sequential,
            code => Format::Unknown(code),
        })
    }
}
