//! `SwitchResData`: a runtime switch between several linked resources.

use super::super::entry::Cuuid;
use super::super::variant::Variant;
use crate::byte_stream::ByteStream;
use crate::error::Error;

/// A single `(case index, target)` entry in a switch's case table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwitchCase {
    /// The case index this entry is selected for.
    pub index: u32,
    /// The linked entry's CUUID.
    pub target: Cuuid,
}

/// A runtime switch selecting among several linked resources by case index.
#[derive(Clone, Debug, PartialEq)]
pub struct SwitchResData {
    /// Flag word.
    pub flag: u32,
    /// Opaque field, carried through unchanged.
    pub unknown1: u32,
    /// Opaque field, carried through unchanged.
    pub unknown2: u32,
    /// Starting case index.
    pub start_index: u32,
    /// The case table.
    pub cases: Vec<SwitchCase>,
}

impl SwitchResData {
    pub(crate) fn read(stream: &mut ByteStream, _variant: Variant) -> Result<Self, Error> {
        let flag = stream.read_u32()?;
        let unknown1 = stream.read_u32()?;
        let unknown2 = stream.read_u32()?;
        let start_index = stream.read_u32()?;
        let count = stream.read_u32()?;

        let mut cases = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let index = stream.read_u32()?;
            let target = Cuuid(stream.read_cuuid()?);
            cases.push(SwitchCase { index, target });
        }

        Ok(Self {
            flag,
            unknown1,
            unknown2,
            start_index,
            cases,
        })
    }

    pub(crate) fn write(&self, stream: &mut ByteStream, _variant: Variant) -> Result<(), Error> {
        stream.write_u32(self.flag)?;
        stream.write_u32(self.unknown1)?;
        stream.write_u32(self.unknown2)?;
        stream.write_u32(self.start_index)?;
        stream.write_u32(u32::try_from(self.cases.len()).unwrap_or(u32::MAX))?;

        for case in &self.cases {
            stream.write_u32(case.index)?;
            stream.write_cuuid(case.target.0)?;
        }

        Ok(())
    }
}
