//! The fixed 44-byte RIFF/WAVE header every audio stream entry is wrapped in.
//!
//! The header is always little-endian on the wire, regardless of the container's native
//! endianness (spec: variant endianness governs the container, never the wave payload).

use crate::byte_stream::{ByteStream, Endianness};
use std::{
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
};

const RIFF_MAGIC: u32 = 0x4646_4952;
const WAVE_MAGIC: u32 = 0x4556_4157;
const FMT_MAGIC: u32 = 0x2074_6D66;
const DATA_MAGIC: u32 = 0x6174_6164;
const DATX_MAGIC: u32 = 0x7874_6164;

/// The subchunk-2 payload: either the audio data is inline, or it is a stub pointing into an
/// external stream file.
#[derive(Clone, Debug, PartialEq)]
pub enum Subchunk2 {
    /// `"data"` - `size` bytes of audio data follow immediately in the same buffer.
    Inline {
        /// Size of the inline payload, in bytes.
        size: u32,
    },
    /// `"datx"` - the payload lives in a sibling stream file, at `offset` for `size` bytes.
    External {
        /// Size of the external payload, in bytes.
        size: u32,
        /// Byte offset of the payload within the external stream file.
        offset: u32,
    },
}

/// A parsed RIFF/WAVE header, as found at the start of every `WaveFileIdObj` audio payload.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveHeader {
    /// Number of interleaved audio channels.
    pub channels: u16,
    /// Samples per second.
    pub sample_rate: u32,
    /// Bits per sample (16 for PCM/DSP/PSX output; may vary for float formats).
    pub bits_per_sample: u16,
    /// The `fmt` chunk's format code (PCM=1, float=3, ...; not the container's codec enum).
    pub format_code: u16,
    /// The subchunk-2 payload descriptor.
    pub subchunk2: Subchunk2,
}

impl Default for WaveHeader {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 16,
            format_code: 1,
            subchunk2: Subchunk2::Inline { size: 0 },
        }
    }
}

impl WaveHeader {
    /// Parses a 44-byte RIFF/WAVE header from `stream`, validating every magic number.
    ///
    /// `stream`'s own endianness setting is irrelevant here, mirroring [`WaveHeader::write`]: the
    /// 44 header bytes (52 for an external subchunk-2) are pulled off `stream` as raw bytes and
    /// parsed through a private little-endian stream, since the wave envelope ignores the
    /// container's endianness policy entirely.
    ///
    /// # Errors
    ///
    /// Returns [`WaveError`] if the RIFF, WAVE, `fmt `, or subchunk-2 magic does not match, or if
    /// an external (`datx`) subchunk declares a size other than 8.
    pub(crate) fn read(stream: &mut ByteStream) -> Result<Self, WaveError> {
        let header_bytes = stream
            .read_bytes(44)
            .map_err(WaveError::factory(WaveErrorKind::Riff))?;
        let mut le = ByteStream::new_read(header_bytes, Endianness::Little);

        let riff = le.read_u32().map_err(WaveError::factory(WaveErrorKind::Riff))?;
        if riff != RIFF_MAGIC {
            return Err(WaveError::new(WaveErrorKind::Riff));
        }
        let _riff_len = le
            .read_u32()
            .map_err(WaveError::factory(WaveErrorKind::RiffLength))?;

        let wave = le.read_u32().map_err(WaveError::factory(WaveErrorKind::Wave))?;
        if wave != WAVE_MAGIC {
            return Err(WaveError::new(WaveErrorKind::Wave));
        }

        let fmt = le.read_u32().map_err(WaveError::factory(WaveErrorKind::Fmt))?;
        if fmt != FMT_MAGIC {
            return Err(WaveError::new(WaveErrorKind::Fmt));
        }

        let _fmt_chunk_size = le
            .read_u32()
            .map_err(WaveError::factory(WaveErrorKind::FmtChunk))?;
        let format_code = le
            .read_u16()
            .map_err(WaveError::factory(WaveErrorKind::FmtChunk))?;
        let channels = le
            .read_u16()
            .map_err(WaveError::factory(WaveErrorKind::FmtChunk))?;
        let sample_rate = le
            .read_u32()
            .map_err(WaveError::factory(WaveErrorKind::FmtChunk))?;
        let _bytes_per_second = le
            .read_u32()
            .map_err(WaveError::factory(WaveErrorKind::FmtChunk))?;
        let _block_align = le
            .read_u16()
            .map_err(WaveError::factory(WaveErrorKind::FmtChunk))?;
        let bits_per_sample = le
            .read_u16()
            .map_err(WaveError::factory(WaveErrorKind::FmtChunk))?;

        let subchunk2_id = le
            .read_u32()
            .map_err(WaveError::factory(WaveErrorKind::Subchunk2))?;
        let subchunk2_size = le
            .read_u32()
            .map_err(WaveError::factory(WaveErrorKind::Subchunk2))?;

        let subchunk2 = match subchunk2_id {
            DATA_MAGIC => Subchunk2::Inline {
                size: subchunk2_size,
            },
            DATX_MAGIC => {
                if subchunk2_size != 8 {
                    return Err(WaveError::new(WaveErrorKind::ExternalSubchunkSize {
                        actual: subchunk2_size,
                    }));
                }
                let extra_bytes = stream
                    .read_bytes(8)
                    .map_err(WaveError::factory(WaveErrorKind::Subchunk2))?;
                let mut le = ByteStream::new_read(extra_bytes, Endianness::Little);
                let size = le
                    .read_u32()
                    .map_err(WaveError::factory(WaveErrorKind::Subchunk2))?;
                let offset = le
                    .read_u32()
                    .map_err(WaveError::factory(WaveErrorKind::Subchunk2))?;
                Subchunk2::External { size, offset }
            }
            _ => return Err(WaveError::new(WaveErrorKind::Subchunk2Id)),
        };

        Ok(Self {
            channels,
            sample_rate,
            bits_per_sample,
            format_code,
            subchunk2,
        })
    }

    /// Serializes this header to `stream`, always in little-endian form.
    ///
    /// `stream`'s own endianness setting is irrelevant here: the wave envelope ignores the
    /// container's endianness policy entirely, so this writes through a private little-endian
    /// stream and copies the resulting bytes.
    pub(crate) fn write(&self, stream: &mut ByteStream) -> Result<(), WaveError> {
        let mut le = ByteStream::new_write_with_capacity(44, Endianness::Little);

        let (subchunk2_id, subchunk2_size) = match self.subchunk2 {
            Subchunk2::Inline { size } => (DATA_MAGIC, size),
            Subchunk2::External { .. } => (DATX_MAGIC, 8),
        };
        let data_bytes = match self.subchunk2 {
            Subchunk2::Inline { size } => size,
            Subchunk2::External { size, .. } => size,
        };
        let riff_length = 36 + 8 + if matches!(self.subchunk2, Subchunk2::External { .. }) {
            8
        } else {
            data_bytes
        };

        le.write_u32(RIFF_MAGIC).expect("write to growing buffer cannot fail");
        le.write_u32(riff_length).expect("write to growing buffer cannot fail");
        le.write_u32(WAVE_MAGIC).expect("write to growing buffer cannot fail");
        le.write_u32(FMT_MAGIC).expect("write to growing buffer cannot fail");
        le.write_u32(16).expect("write to growing buffer cannot fail");
        le.write_u16(self.format_code)
            .expect("write to growing buffer cannot fail");
        le.write_u16(self.channels)
            .expect("write to growing buffer cannot fail");
        le.write_u32(self.sample_rate)
            .expect("write to growing buffer cannot fail");
        let bytes_per_second =
            self.sample_rate * u32::from(self.channels) * u32::from(self.bits_per_sample / 8);
        le.write_u32(bytes_per_second)
            .expect("write to growing buffer cannot fail");
        let block_align = self.channels * (self.bits_per_sample / 8);
        le.write_u16(block_align)
            .expect("write to growing buffer cannot fail");
        le.write_u16(self.bits_per_sample)
            .expect("write to growing buffer cannot fail");
        le.write_u32(subchunk2_id).expect("write to growing buffer cannot fail");
        le.write_u32(subchunk2_size)
            .expect("write to growing buffer cannot fail");

        if let Subchunk2::External { size, offset } = self.subchunk2 {
            le.write_u32(size).expect("write to growing buffer cannot fail");
            le.write_u32(offset).expect("write to growing buffer cannot fail");
        }

        stream
            .write_bytes(&le.into_inner())
            .map_err(WaveError::factory(WaveErrorKind::Subchunk2))
    }
}

/// Represents a failure to parse or validate a RIFF/WAVE header.
#[derive(Debug)]
pub struct WaveError {
    kind: WaveErrorKind,
    source: Option<crate::byte_stream::ByteStreamError>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WaveErrorKind {
    Riff,
    RiffLength,
    Wave,
    Fmt,
    FmtChunk,
    Subchunk2,
    Subchunk2Id,
    ExternalSubchunkSize { actual: u32 },
}

impl WaveError {
    fn new(kind: WaveErrorKind) -> Self {
        Self { kind, source: None }
    }

    fn factory(
        kind: WaveErrorKind,
    ) -> impl FnOnce(crate::byte_stream::ByteStreamError) -> Self {
        move |source| Self {
            kind,
            source: Some(source),
        }
    }
}

impl Display for WaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.kind {
            WaveErrorKind::Riff => f.write_str("RIFF magic did not match"),
            WaveErrorKind::RiffLength => f.write_str("failed to read RIFF chunk length"),
            WaveErrorKind::Wave => f.write_str("WAVE magic did not match"),
            WaveErrorKind::Fmt => f.write_str("\"fmt \" magic did not match"),
            WaveErrorKind::FmtChunk => f.write_str("failed to read format chunk"),
            WaveErrorKind::Subchunk2 => f.write_str("failed to read subchunk-2"),
            WaveErrorKind::Subchunk2Id => {
                f.write_str("subchunk-2 id was neither \"data\" nor \"datx\"")
            }
            WaveErrorKind::ExternalSubchunkSize { actual } => f.write_str(&format!(
                "external (\"datx\") subchunk-2 size must be 8 bytes, was {actual}"
            )),
        }
    }
}

impl Error for WaveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.source {
            Some(e) => Some(e),
            None => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Subchunk2, WaveHeader};
    use crate::byte_stream::{ByteStream, Endianness};

    #[test]
    fn inline_header_round_trips() {
        let header = WaveHeader {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 16,
            format_code: 1,
            subchunk2: Subchunk2::Inline { size: 128 },
        };

        let mut stream = ByteStream::new_write(Endianness::Big);
        header.write(&mut stream).unwrap();
        assert_eq!(stream.len(), 44);

        let mut stream = ByteStream::new_read(stream.into_inner(), Endianness::Big);
        assert_eq!(WaveHeader::read(&mut stream).unwrap(), header);
    }

    #[test]
    fn external_header_round_trips() {
        let header = WaveHeader {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 16,
            format_code: 1,
            subchunk2: Subchunk2::External {
                size: 4096,
                offset: 2048,
            },
        };

        let mut stream = ByteStream::new_write(Endianness::Little);
        header.write(&mut stream).unwrap();
        assert_eq!(stream.len(), 52);

        let mut stream = ByteStream::new_read(stream.into_inner(), Endianness::Little);
        assert_eq!(WaveHeader::read(&mut stream).unwrap(), header);
    }

    #[test]
    fn bad_riff_magic_is_rejected() {
        let mut stream = ByteStream::new_write(Endianness::Little);
        stream.write_bytes(&[0; 44]).unwrap();
        let mut stream = ByteStream::new_read(stream.into_inner(), Endianness::Little);
        assert!(WaveHeader::read(&mut stream).is_err());
    }

    #[test]
    fn default_header_is_mono_pcm_22050() {
        let header = WaveHeader::default();
        assert_eq!(header.channels, 1);
        assert_eq!(header.sample_rate, 22050);
        assert_eq!(header.bits_per_sample, 16);
    }
}
