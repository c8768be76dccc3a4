//! `EventResData`: a named trigger linking to a playable resource.

use super::super::entry::Cuuid;
use super::super::variant::Variant;
use crate::byte_stream::ByteStream;
use crate::error::Error;

/// An event: a type code, a display name, a flag word, a link to the resource it triggers, and
/// four floats (volume/pitch/pan-style parameters carried through unchanged).
#[derive(Clone, Debug, PartialEq)]
pub struct EventResData {
    /// Event type code.
    pub type_code: u32,
    /// Display name.
    pub name: String,
    /// Flag word.
    pub flags: u32,
    /// CUUID of the linked resource (typically a `WavResData`, `SwitchResData`, `RandomResData`,
    /// or `ProgramResData`).
    pub link: Cuuid,
    /// Four opaque floats.
    pub params: [f32; 4],
}

impl EventResData {
    pub(crate) fn read(stream: &mut ByteStream, _variant: Variant) -> Result<Self, Error> {
        let type_code = stream.read_u32()?;
        let name = stream.read_length_prefixed_string()?;
        let flags = stream.read_u32()?;
        let link = Cuuid(stream.read_cuuid()?);
        let mut params = [0.0; 4];
        for p in &mut params {
            *p = stream.read_f32()?;
        }

        Ok(Self {
            type_code,
            name,
            flags,
            link,
            params,
        })
    }

    pub(crate) fn write(&self, stream: &mut ByteStream, _variant: Variant) -> Result<(), Error> {
        stream.write_u32(self.type_code)?;
        stream.write_length_prefixed_string(&self.name)?;
        stream.write_u32(self.flags)?;
        stream.write_cuuid(self.link.0)?;
        for p in self.params {
            stream.write_f32(p)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::EventResData;
    use crate::byte_stream::{ByteStream, Endianness};
    use crate::container::entry::Cuuid;
    use crate::container::variant::Variant;

    #[test]
    fn round_trips() {
        let event = EventResData {
            type_code: 3,
            name: "explosion".to_string(),
            flags: 0,
            link: Cuuid(0x1122_3344_5566_7788),
            params: [1.0, 0.5, 0.0, -1.0],
        };

        let mut stream = ByteStream::new_write(Endianness::Big);
        event.write(&mut stream, Variant::Hxg).unwrap();
        let mut stream = ByteStream::new_read(stream.into_inner(), Endianness::Big);
        assert_eq!(EventResData::read(&mut stream, Variant::Hxg).unwrap(), event);
    }
}
