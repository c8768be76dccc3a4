//! `WavResData`: a single sound, or a set of locale-tagged sounds sharing one `WavResObj`.

use super::super::entry::{Cuuid, Language, LanguageLink};
use super::super::variant::Variant;
use crate::byte_stream::ByteStream;
use crate::error::{Error, ErrorKind};
use tap::Pipe;

const NAME_BUFFER_LEN: usize = 256;
const MULTIPLE_FLAG: u8 = 0x02;

/// The object embedded as the first field of every `WavResData`.
#[derive(Clone, Debug, PartialEq)]
pub struct WavResObj {
    /// Object id.
    pub id: u32,
    /// Display name. Only ever populated on the HXC variant; `None` elsewhere, and wiped to
    /// `None` on read for variants that don't carry it.
    pub name: Option<String>,
    /// Declared size, present only on HXG/HX2.
    pub size: Option<u32>,
    /// Three opaque floats (volume/pitch/pan-style parameters).
    pub params: [f32; 3],
    /// Flag byte.
    pub flags: u8,
}

impl WavResObj {
    fn read(stream: &mut ByteStream, variant: Variant) -> Result<Self, Error> {
        let id = stream.read_u32()?;
        let name = if variant.carries_wav_name() {
            stream.read_fixed_string(NAME_BUFFER_LEN)?.pipe(Some)
        } else {
            None
        };
        let size = if variant.carries_wav_size() {
            stream.read_u32()?.pipe(Some)
        } else {
            None
        };
        let mut params = [0.0; 3];
        for p in &mut params {
            *p = stream.read_f32()?;
        }
        let flags = stream.read_u8()?;

        Ok(Self {
            id,
            name,
            size,
            params,
            flags,
        })
    }

    fn write(&self, stream: &mut ByteStream, variant: Variant) -> Result<(), Error> {
        stream.write_u32(self.id)?;
        if variant.carries_wav_name() {
            let name = self.name.as_deref().unwrap_or("");
            stream.write_fixed_string(name, NAME_BUFFER_LEN)?;
        }
        if variant.carries_wav_size() {
            stream.write_u32(self.size.unwrap_or(0))?;
        }
        for p in self.params {
            stream.write_f32(p)?;
        }
        stream.write_u8(self.flags)?;
        Ok(())
    }

    fn has_multiple(&self) -> bool {
        self.flags & MULTIPLE_FLAG != 0
    }
}

/// A `WavResObj` plus either a single default link or a set of locale-tagged links.
#[derive(Clone, Debug, PartialEq)]
pub struct WavResData {
    /// The embedded object.
    pub wav_res_obj: WavResObj,
    /// The single link used when `wav_res_obj` has no locale links.
    pub default_cuuid: Cuuid,
    /// Locale-tagged links, populated only when the "multiple" flag is set.
    pub language_links: Vec<LanguageLink>,
}

impl WavResData {
    pub(crate) fn read(stream: &mut ByteStream, variant: Variant) -> Result<Self, Error> {
        let wav_res_obj = WavResObj::read(stream, variant)?;
        let default_cuuid = Cuuid(stream.read_cuuid()?);

        let language_links = if wav_res_obj.has_multiple() {
            let count = stream.read_u32()?;
            let mut links = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let code_bytes = stream.read_bytes(4)?;
                let code = String::from_utf8_lossy(&code_bytes).into_owned();
                let opaque = 0;
                let target = Cuuid(stream.read_cuuid()?);
                links.push(LanguageLink {
                    language: Language::from_code(&code),
                    opaque,
                    target,
                });
            }
            links
        } else {
            Vec::new()
        };

        if variant.has_wide_id_obj_ptr() && wav_res_obj.has_multiple() && default_cuuid.0 != 0 {
            return Err(Error::new(ErrorKind::HeaderMismatch {
                field: "WavResData.default_cuuid must be zero on HXG when multiple is set",
            }));
        }

        Ok(Self {
            wav_res_obj,
            default_cuuid,
            language_links,
        })
    }

    pub(crate) fn write(&self, stream: &mut ByteStream, variant: Variant) -> Result<(), Error> {
        if variant.has_wide_id_obj_ptr() && self.wav_res_obj.has_multiple() && self.default_cuuid.0 != 0
        {
            return Err(Error::new(ErrorKind::HeaderMismatch {
                field: "WavResData.default_cuuid must be zero on HXG when multiple is set",
            }));
        }

        self.wav_res_obj.write(stream, variant)?;
        stream.write_cuuid(self.default_cuuid.0)?;

        if self.wav_res_obj.has_multiple() {
            stream.write_u32(u32::try_from(self.language_links.len()).unwrap_or(u32::MAX))?;
            for link in &self.language_links {
                stream.write_bytes(link.language.to_code().as_bytes())?;
                stream.write_cuuid(link.target.0)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{WavResData, WavResObj};
    use crate::byte_stream::{ByteStream, Endianness};
    use crate::container::entry::Cuuid;
    use crate::container::variant::Variant;

    #[test]
    fn single_link_round_trips_on_hxc() {
        let data = WavResData {
            wav_res_obj: WavResObj {
                id: 7,
                name: Some("footsteps".to_string()),
                size: None,
                params: [1.0, 0.0, 0.0],
                flags: 0,
            },
            default_cuuid: Cuuid(42),
            language_links: Vec::new(),
        };

        let mut stream = ByteStream::new_write(Endianness::Little);
        data.write(&mut stream, Variant::Hxc).unwrap();
        let mut stream = ByteStream::new_read(stream.into_inner(), Endianness::Little);
        assert_eq!(WavResData::read(&mut stream, Variant::Hxc).unwrap(), data);
    }

    #[test]
    fn hxg_rejects_nonzero_default_cuuid_with_multiple_set() {
        let data = WavResData {
            wav_res_obj: WavResObj {
                id: 1,
                name: None,
                size: Some(0),
                params: [0.0; 3],
                flags: 0x02,
            },
            default_cuuid: Cuuid(99),
            language_links: Vec::new(),
        };

        let mut stream = ByteStream::new_write(Endianness::Big);
        assert!(data.write(&mut stream, Variant::Hxg).is_err());
    }
}
