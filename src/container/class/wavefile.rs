//! `WaveFileIdObj`: a single platform-specific audio stream.

use super::super::variant::Variant;
use crate::byte_stream::ByteStream;
use crate::callbacks::Callbacks;
use crate::error::Error;
use crate::wave::{Subchunk2, WaveHeader};
use tap::Pipe;

const EXTERNAL_FLAG: u32 = 0x01;

/// The object embedded as the first field of every `WaveFileIdObj`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IdObjPtr {
    /// Object id.
    pub id: u32,
    /// Opaque float parameter.
    pub param: f32,
    /// Flag word. Bit 0 marks the wave stream as external (stored in a side stream file rather
    /// than inline). Stored as a full 32 bits everywhere, but serialized as a single byte on
    /// every variant except HXG.
    pub flags: u32,
    /// A 32-bit opaque field following `flags`, present only on HXG's wide layout.
    pub opaque_successor: Option<u32>,
}

impl IdObjPtr {
    fn is_external(self) -> bool {
        self.flags & EXTERNAL_FLAG != 0
    }

    fn read(stream: &mut ByteStream, variant: Variant) -> Result<Self, Error> {
        let id = stream.read_u32()?;
        let param = stream.read_f32()?;

        let (flags, opaque_successor) = if variant.has_wide_id_obj_ptr() {
            (stream.read_u32()?, stream.read_u32()?.pipe(Some))
        } else {
            (u32::from(stream.read_u8()?), None)
        };

        Ok(Self {
            id,
            param,
            flags,
            opaque_successor,
        })
    }

    fn write(&self, stream: &mut ByteStream, variant: Variant) -> Result<(), Error> {
        stream.write_u32(self.id)?;
        stream.write_f32(self.param)?;

        if variant.has_wide_id_obj_ptr() {
            stream.write_u32(self.flags)?;
            stream.write_u32(self.opaque_successor.unwrap_or(0))?;
        } else {
            stream.write_u8(u8::try_from(self.flags & 0xFF).unwrap_or(0))?;
        }

        Ok(())
    }
}

/// A single platform-specific audio stream: an `IdObjPtr`, an optional external filename, a
/// RIFF/WAVE header, inline or external payload data, and any trailing wave bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveFileIdObj {
    /// The embedded object.
    pub id_obj: IdObjPtr,
    /// Filename of the side stream file holding the payload, present only when external.
    pub external_filename: Option<String>,
    /// The RIFF/WAVE header. Its `subchunk2` field carries the external (size, offset) pair or
    /// the inline size, matching `id_obj`'s external flag.
    pub wave_header: WaveHeader,
    /// The inline payload, present only when not external.
    pub inline_data: Option<Vec<u8>>,
    /// Trailing bytes (padding or unrecognized chunks) following the payload, up to the entry's
    /// declared body size.
    pub trailing: Vec<u8>,
    /// The external payload, present only when `wave_header.subchunk2` is
    /// [`Subchunk2::External`]. Fetched via the read callback on read (and absent if the caller
    /// supplied none), and handed to the write callback on write; never itself part of the wire
    /// format of this object.
    pub external_data: Option<Vec<u8>>,
    /// Human-readable name, populated only by the post-read naming pass; never itself read from
    /// or written to the wire.
    pub name: Option<String>,
}

impl WaveFileIdObj {
    pub(crate) fn read(
        stream: &mut ByteStream,
        variant: Variant,
        body_len: usize,
        callbacks: &mut Callbacks<'_>,
    ) -> Result<Self, Error> {
        let start = stream.position();

        let id_obj = IdObjPtr::read(stream, variant)?;
        let external_filename = if id_obj.is_external() {
            let raw = stream.read_length_prefixed_string()?;
            Some(strip_hx2_prefix(raw, variant))
        } else {
            None
        };

        let wave_header = WaveHeader::read(stream)?;
        let (inline_data, external_data) = match wave_header.subchunk2 {
            Subchunk2::Inline { size } => (Some(stream.read_bytes(size as usize)?), None),
            Subchunk2::External { offset, .. } => {
                let filename = external_filename.as_deref().unwrap_or("");
                (None, callbacks.read_external(filename, offset))
            }
        };

        let consumed = stream.position() - start;
        let trailing = if body_len > consumed {
            stream.read_bytes(body_len - consumed)?
        } else {
            Vec::new()
        };

        Ok(Self {
            id_obj,
            external_filename,
            wave_header,
            inline_data,
            trailing,
            external_data,
            name: None,
        })
    }

    pub(crate) fn write(
        &self,
        stream: &mut ByteStream,
        variant: Variant,
        callbacks: &mut Callbacks<'_>,
    ) -> Result<(), Error> {
        self.id_obj.write(stream, variant)?;

        if self.id_obj.is_external() {
            let filename = self.external_filename.as_deref().unwrap_or("");
            stream.write_length_prefixed_string(&prepend_hx2_prefix(filename, variant))?;
        }

        self.wave_header.write(stream)?;
        if let Some(data) = &self.inline_data {
            stream.write_bytes(data)?;
        }
        stream.write_bytes(&self.trailing)?;

        if let Subchunk2::External { offset, .. } = self.wave_header.subchunk2 {
            let filename = self.external_filename.as_deref().unwrap_or("");
            let data = self.external_data.as_deref().unwrap_or(&[]);
            callbacks.write_external(filename, data, offset);
        }

        // HX2 quirk: the write path appends an extra offset word after the extra-wave-data
        // block that the read path does not expect. Preserved bit-for-bit per source behavior.
        if variant == Variant::Hx2 {
            if let Subchunk2::External { offset, .. } = self.wave_header.subchunk2 {
                stream.write_u32(offset)?;
            }
        }

        Ok(())
    }
}

/// HX2 filenames are sometimes stored with a `.\` prefix; strip it on read if present. Other
/// variants never carry the prefix.
fn strip_hx2_prefix(raw: String, variant: Variant) -> String {
    if variant == Variant::Hx2 {
        raw.strip_prefix(".\\").map(str::to_string).unwrap_or(raw)
    } else {
        raw
    }
}

/// Mirrors [`strip_hx2_prefix`] on write: HX2 filenames are written with a `.\` prefix.
fn prepend_hx2_prefix(filename: &str, variant: Variant) -> String {
    if variant == Variant::Hx2 && !filename.starts_with(".\\") {
        format!(".\\{filename}")
    } else {
        filename.to_string()
    }
}
