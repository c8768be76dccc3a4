//! A bidirectional, position-tracked cursor over an in-memory buffer with explicit endianness.
//!
//! Every container and codec serializer is built on top of [`ByteStream`]. Read and write are
//! exposed as separate, identically-named methods (`read_u32`/`write_u32`, and so on) rather than
//! a single mode-branching routine: callers get normal type-directed dispatch, and the two halves
//! of each pair are easy to eyeball as inverses of one another.

use std::{
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
};

/// Byte order used when serializing multi-byte primitives.
///
/// CUUIDs are the one exception: their two 32-bit halves are always serialized high-word first,
/// independent of this setting (see [`ByteStream::read_cuuid`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endianness {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    Little,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Read,
    Write,
}

/// A cursor over an owned byte buffer that can be opened for reading or for writing.
///
/// A read-mode stream never grows its buffer; seeking or reading past the end is a logic error
/// (the caller should have already validated lengths against the containing record's declared
/// size) and is reported as [`ByteStreamError`] rather than panicking. A write-mode stream grows
/// to fit whatever is written, zero-filling any gap created by `seek`.
#[derive(Debug)]
pub(crate) struct ByteStream {
    buffer: Vec<u8>,
    cursor: usize,
    mode: Mode,
    endianness: Endianness,
}

impl ByteStream {
    /// Opens a stream for reading over an existing buffer.
    pub(crate) fn new_read(buffer: Vec<u8>, endianness: Endianness) -> Self {
        Self {
            buffer,
            cursor: 0,
            mode: Mode::Read,
            endianness,
        }
    }

    /// Opens an empty stream for writing.
    pub(crate) fn new_write(endianness: Endianness) -> Self {
        Self::new_write_with_capacity(0, endianness)
    }

    /// Opens an empty stream for writing, pre-reserving `capacity` bytes.
    pub(crate) fn new_write_with_capacity(capacity: usize, endianness: Endianness) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            cursor: 0,
            mode: Mode::Write,
            endianness,
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.cursor
    }

    #[allow(dead_code)]
    pub(crate) fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Consumes the stream, returning the underlying buffer.
    pub(crate) fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    pub(crate) fn seek(&mut self, pos: usize) -> Result<(), ByteStreamError> {
        match self.mode {
            Mode::Read => {
                if pos > self.buffer.len() {
                    return Err(self.to_error(pos, 0));
                }
            }
            Mode::Write => {
                if pos > self.buffer.len() {
                    self.buffer.resize(pos, 0);
                }
            }
        }
        self.cursor = pos;
        Ok(())
    }

    #[allow(dead_code)]
    pub(crate) fn advance(&mut self, offset: usize) -> Result<(), ByteStreamError> {
        self.seek(self.cursor + offset)
    }

    fn ensure_room(&mut self, len: usize) -> Result<(), ByteStreamError> {
        match self.mode {
            Mode::Read => {
                if self.cursor + len > self.buffer.len() {
                    return Err(self.to_error(self.cursor + len, self.buffer.len()));
                }
            }
            Mode::Write => {
                if self.cursor + len > self.buffer.len() {
                    self.buffer.resize(self.cursor + len, 0);
                }
            }
        }
        Ok(())
    }

    fn to_error(&self, requested: usize, available: usize) -> ByteStreamError {
        ByteStreamError {
            position: self.cursor,
            requested,
            available,
        }
    }

    /// Reads `n` raw bytes and advances the cursor.
    pub(crate) fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, ByteStreamError> {
        self.ensure_room(n)?;
        let bytes = self.buffer[self.cursor..self.cursor + n].to_vec();
        self.cursor += n;
        Ok(bytes)
    }

    /// Writes raw bytes and advances the cursor.
    pub(crate) fn write_bytes(&mut self, data: &[u8]) -> Result<(), ByteStreamError> {
        self.ensure_room(data.len())?;
        self.buffer[self.cursor..self.cursor + data.len()].copy_from_slice(data);
        self.cursor += data.len();
        Ok(())
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, ByteStreamError> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    pub(crate) fn write_u8(&mut self, value: u8) -> Result<(), ByteStreamError> {
        self.write_bytes(&[value])
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16, ByteStreamError> {
        let bytes: [u8; 2] = self.read_bytes(2)?.try_into().expect("length checked above");
        Ok(match self.endianness {
            Endianness::Big => u16::from_be_bytes(bytes),
            Endianness::Little => u16::from_le_bytes(bytes),
        })
    }

    pub(crate) fn write_u16(&mut self, value: u16) -> Result<(), ByteStreamError> {
        let bytes = match self.endianness {
            Endianness::Big => value.to_be_bytes(),
            Endianness::Little => value.to_le_bytes(),
        };
        self.write_bytes(&bytes)
    }

    pub(crate) fn read_i16(&mut self) -> Result<i16, ByteStreamError> {
        Ok(self.read_u16()? as i16)
    }

    pub(crate) fn write_i16(&mut self, value: i16) -> Result<(), ByteStreamError> {
        self.write_u16(value as u16)
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32, ByteStreamError> {
        let bytes: [u8; 4] = self.read_bytes(4)?.try_into().expect("length checked above");
        Ok(match self.endianness {
            Endianness::Big => u32::from_be_bytes(bytes),
            Endianness::Little => u32::from_le_bytes(bytes),
        })
    }

    pub(crate) fn write_u32(&mut self, value: u32) -> Result<(), ByteStreamError> {
        let bytes = match self.endianness {
            Endianness::Big => value.to_be_bytes(),
            Endianness::Little => value.to_le_bytes(),
        };
        self.write_bytes(&bytes)
    }

    pub(crate) fn read_f32(&mut self) -> Result<f32, ByteStreamError> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub(crate) fn write_f32(&mut self, value: f32) -> Result<(), ByteStreamError> {
        self.write_u32(value.to_bits())
    }

    /// Reads a CUUID, high word first, independent of stream endianness (see module docs).
    pub(crate) fn read_cuuid(&mut self) -> Result<u64, ByteStreamError> {
        let hi = u64::from(self.read_u32()?);
        let lo = u64::from(self.read_u32()?);
        Ok((hi << 32) | lo)
    }

    /// Writes a CUUID, high word first, independent of stream endianness (see module docs).
    pub(crate) fn write_cuuid(&mut self, value: u64) -> Result<(), ByteStreamError> {
        self.write_u32((value >> 32) as u32)?;
        self.write_u32(value as u32)
    }

    /// Reads a `u32` length prefix followed by that many UTF-8 bytes.
    pub(crate) fn read_length_prefixed_string(&mut self) -> Result<String, ByteStreamError> {
        let len = self.read_u32()? as usize;
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Writes a `u32` length prefix followed by the string's UTF-8 bytes.
    pub(crate) fn write_length_prefixed_string(&mut self, value: &str) -> Result<(), ByteStreamError> {
        let bytes = value.as_bytes();
        self.write_u32(u32::try_from(bytes.len()).unwrap_or(u32::MAX))?;
        self.write_bytes(bytes)
    }

    /// Reads `len` bytes as a zero-padded, UTF-8 name buffer, trimming trailing NUL bytes.
    pub(crate) fn read_fixed_string(&mut self, len: usize) -> Result<String, ByteStreamError> {
        let bytes = self.read_bytes(len)?;
        let trimmed = bytes.split(|&b| b == 0).next().unwrap_or(&[]);
        Ok(String::from_utf8_lossy(trimmed).into_owned())
    }

    /// Writes `value` into a zero-padded buffer of exactly `len` bytes.
    pub(crate) fn write_fixed_string(&mut self, value: &str, len: usize) -> Result<(), ByteStreamError> {
        let mut buf = vec![0u8; len];
        let bytes = value.as_bytes();
        let copy_len = bytes.len().min(len);
        buf[..copy_len].copy_from_slice(&bytes[..copy_len]);
        self.write_bytes(&buf)
    }
}

/// Represents an out-of-bounds access on a [`ByteStream`].
///
/// In read mode this means the caller asked for more bytes than the buffer holds; in write mode
/// this variant is never produced, since writes grow the buffer instead of failing.
#[derive(Debug)]
pub struct ByteStreamError {
    position: usize,
    requested: usize,
    available: usize,
}

impl Display for ByteStreamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&format!(
            "requested byte {} but only {} bytes are available - cursor was at {}",
            self.requested, self.available, self.position
        ))
    }
}

impl Error for ByteStreamError {}

#[cfg(test)]
mod test {
    use super::{ByteStream, Endianness};

    #[test]
    fn u16_round_trips_both_endiannesses() {
        for endianness in [Endianness::Big, Endianness::Little] {
            let mut stream = ByteStream::new_write(endianness);
            stream.write_u16(0x1234).unwrap();
            let mut stream = ByteStream::new_read(stream.into_inner(), endianness);
            assert_eq!(stream.read_u16().unwrap(), 0x1234);
        }
    }

    #[test]
    fn u32_round_trips_both_endiannesses() {
        for endianness in [Endianness::Big, Endianness::Little] {
            let mut stream = ByteStream::new_write(endianness);
            stream.write_u32(0xDEAD_BEEF).unwrap();
            let mut stream = ByteStream::new_read(stream.into_inner(), endianness);
            assert_eq!(stream.read_u32().unwrap(), 0xDEAD_BEEF);
        }
    }

    #[test]
    fn f32_round_trips() {
        let mut stream = ByteStream::new_write(Endianness::Little);
        stream.write_f32(3.5).unwrap();
        let mut stream = ByteStream::new_read(stream.into_inner(), Endianness::Little);
        assert!((stream.read_f32().unwrap() - 3.5).abs() < f32::EPSILON);
    }

    #[test]
    fn cuuid_half_swap_is_independent_of_endianness() {
        let cuuid = 0x1122_3344_5566_7788_u64;

        for endianness in [Endianness::Big, Endianness::Little] {
            let mut stream = ByteStream::new_write(endianness);
            stream.write_cuuid(cuuid).unwrap();
            let buffer = stream.into_inner();

            // naive little-endian serialization would begin with 0x88, not the high word
            assert_ne!(&buffer[0..4], &cuuid.to_le_bytes()[0..4]);

            let mut stream = ByteStream::new_read(buffer, endianness);
            assert_eq!(stream.read_cuuid().unwrap(), cuuid);
        }
    }

    #[test]
    fn length_prefixed_string_round_trips() {
        let mut stream = ByteStream::new_write(Endianness::Big);
        stream.write_length_prefixed_string("EventResData").unwrap();
        let mut stream = ByteStream::new_read(stream.into_inner(), Endianness::Big);
        assert_eq!(
            stream.read_length_prefixed_string().unwrap(),
            "EventResData"
        );
    }

    #[test]
    fn fixed_string_is_zero_padded_and_trimmed() {
        let mut stream = ByteStream::new_write(Endianness::Little);
        stream.write_fixed_string("hi", 8).unwrap();
        let buffer = stream.into_inner();
        assert_eq!(buffer.len(), 8);
        assert_eq!(&buffer[2..], &[0; 6]);

        let mut stream = ByteStream::new_read(buffer, Endianness::Little);
        assert_eq!(stream.read_fixed_string(8).unwrap(), "hi");
    }

    #[test]
    fn read_past_end_is_an_error_not_a_panic() {
        let mut stream = ByteStream::new_read(vec![1, 2], Endianness::Little);
        assert!(stream.read_u32().is_err());
    }

    #[test]
    fn write_mode_grows_buffer_on_seek() {
        let mut stream = ByteStream::new_write(Endianness::Little);
        stream.seek(4).unwrap();
        stream.write_u8(0xFF).unwrap();
        assert_eq!(stream.into_inner(), vec![0, 0, 0, 0, 0xFF]);
    }
}
