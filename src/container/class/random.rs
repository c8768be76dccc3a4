//! `RandomResData`: a weighted-random choice among several linked resources.

use super::super::entry::Cuuid;
use super::super::variant::Variant;
use crate::byte_stream::ByteStream;
use crate::error::Error;

/// A single `(probability, target)` entry in a random entry's weight table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomWeight {
    /// This entry's selection probability.
    pub probability: f32,
    /// The linked entry's CUUID.
    pub target: Cuuid,
}

/// A weighted-random choice among several linked resources.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomResData {
    /// Flag word.
    pub flag: u32,
    /// Offset applied to the chosen resource, carried through unchanged.
    pub offset: f32,
    /// Probability of throwing (re-rolling) rather than committing to a choice.
    pub throw_probability: f32,
    /// The weight table.
    pub entries: Vec<RandomWeight>,
}

impl RandomResData {
    pub(crate) fn read(stream: &mut ByteStream, _variant: Variant) -> Result<Self, Error> {
        let flag = stream.read_u32()?;
        let offset = stream.read_f32()?;
        let throw_probability = stream.read_f32()?;
        let count = stream.read_u32()?;

        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let probability = stream.read_f32()?;
            let target = Cuuid(stream.read_cuuid()?);
            entries.push(RandomWeight {
                probability,
                target,
            });
        }

        Ok(Self {
            flag,
            offset,
            throw_probability,
            entries,
        })
    }

    pub(crate) fn write(&self, stream: &mut ByteStream, _variant: Variant) -> Result<(), Error> {
        stream.write_u32(self.flag)?;
        stream.write_f32(self.offset)?;
        stream.write_f32(self.throw_probability)?;
        stream.write_u32(u32::try_from(self.entries.len()).unwrap_or(u32::MAX))?;

        for entry in &self.entries {
            stream.write_f32(entry.probability)?;
            stream.write_cuuid(entry.target.0)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{RandomResData, RandomWeight};
    use crate::byte_stream::{ByteStream, Endianness};
    use crate::container::entry::Cuuid;
    use crate::container::variant::Variant;

    #[test]
    fn round_trips_with_weight_table() {
        let data = RandomResData {
            flag: 1,
            offset: 0.5,
            throw_probability: 0.1,
            entries: vec![
                RandomWeight {
                    probability: 0.3,
                    target: Cuuid(1),
                },
                RandomWeight {
                    probability: 0.7,
                    target: Cuuid(2),
                },
            ],
        };

        let mut stream = ByteStream::new_write(Endianness::Big);
        data.write(&mut stream, Variant::Hxx).unwrap();
        let mut stream = ByteStream::new_read(stream.into_inner(), Endianness::Big);
        assert_eq!(RandomResData::read(&mut stream, Variant::Hxx).unwrap(), data);
    }

    #[test]
    fn empty_weight_table_round_trips() {
        let data = RandomResData {
            flag: 0,
            offset: 0.0,
            throw_probability: 0.0,
            entries: Vec::new(),
        };

        let mut stream = ByteStream::new_write(Endianness::Little);
        data.write(&mut stream, Variant::Hx3).unwrap();
        let mut stream = ByteStream::new_read(stream.into_inner(), Endianness::Little);
        assert_eq!(RandomResData::read(&mut stream, Variant::Hx3).unwrap(), data);
    }
}
