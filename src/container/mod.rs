//! The container: version dispatch, the class registry, and the read/write protocols tying
//! entries to their on-disk index.

pub mod class;
pub mod entry;
pub mod variant;

use crate::byte_stream::ByteStream;
use crate::callbacks::Callbacks;
use crate::error::{Error, ErrorKind};
use class::{Class, ClassBody};
use entry::{Cuuid, Entry, LanguageLink};
pub use variant::Variant;

const INDEX_MAGIC: u32 = 0x5844_4E49;

/// The index-table type word. Type 2 additionally carries link and language-link lists; type 1
/// carries neither.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexType {
    /// Bare index records: no link lists.
    One,
    /// Index records with link and language-link lists. Always used when writing.
    Two,
}

impl IndexType {
    fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }

    fn as_u32(self) -> u32 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

/// An HX container: a platform variant and its sequence of entries.
#[derive(Debug)]
pub struct Container {
    /// The platform variant this container was read as, or will be written as.
    pub variant: Variant,
    /// Index-table type. Always [`IndexType::Two`] for containers built with [`Container::new`].
    pub index_type: IndexType,
    /// The entry sequence, in on-disk order.
    pub entries: Vec<Entry>,
}

struct IndexRecord {
    class: Option<Class>,
    name: String,
    name_len: usize,
    id: Cuuid,
    file_offset: u32,
    file_size: u32,
    links: Vec<Cuuid>,
    language_links: Vec<LanguageLink>,
}

impl Container {
    /// Creates an empty container for `variant`.
    #[must_use]
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            index_type: IndexType::Two,
            entries: Vec::new(),
        }
    }

    /// Looks up an entry by CUUID.
    #[must_use]
    pub fn get(&self, id: Cuuid) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Looks up an entry by CUUID, mutably.
    pub fn get_mut(&mut self, id: Cuuid) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }

    /// Parses `buffer` as a container of the given `variant`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidHeader`] if the index magic does not match `"INDX"`,
    /// [`ErrorKind::InvalidIndexType`] if the index type word is neither 1 nor 2,
    /// [`ErrorKind::EmptyFile`] if the index declares zero entries, and
    /// [`ErrorKind::HeaderMismatch`] if a reserved word in an index record is nonzero.
    pub fn read(
        buffer: Vec<u8>,
        variant: Variant,
        callbacks: &mut Callbacks<'_>,
    ) -> Result<Self, Error> {
        let mut stream = ByteStream::new_read(buffer, variant.endianness());

        let index_offset = stream.read_u32()?;
        stream.seek(index_offset as usize)?;

        let magic = stream.read_u32()?;
        if magic != INDEX_MAGIC {
            return Err(Error::new(ErrorKind::InvalidHeader));
        }

        let index_type_value = stream.read_u32()?;
        let index_type = IndexType::from_u32(index_type_value).ok_or_else(|| {
            Error::new(ErrorKind::InvalidIndexType {
                value: index_type_value,
            })
        })?;

        let entry_count = stream.read_u32()?;
        if entry_count == 0 {
            return Err(Error::new(ErrorKind::EmptyFile));
        }

        let mut records = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            records.push(Self::read_index_record(&mut stream, index_type)?);
        }

        let mut entries = Vec::new();
        for record in records {
            let Some(class) = record.class else {
                callbacks.report(&Error::new(ErrorKind::UnknownClass {
                    name: record.name.clone(),
                }));
                continue;
            };

            stream.seek(record.file_offset as usize)?;
            let body = Self::read_body(&mut stream, variant, class, &record, callbacks)?;

            entries.push(Entry {
                id: record.id,
                class,
                body,
                file_offset: record.file_offset,
                file_size: record.file_size,
                links: record.links,
                language_links: record.language_links,
            });
        }

        let mut container = Self {
            variant,
            index_type,
            entries,
        };
        container.propagate_hxg_names();
        container.propagate_language_names();
        Ok(container)
    }

    fn read_index_record(
        stream: &mut ByteStream,
        index_type: IndexType,
    ) -> Result<IndexRecord, Error> {
        let name_len = stream.read_u32()? as usize;
        let name_bytes = stream.read_bytes(name_len)?;
        let name = String::from_utf8_lossy(&name_bytes).into_owned();
        let class = Class::parse_name(&name);

        let id = Cuuid(stream.read_cuuid()?);
        let file_offset = stream.read_u32()?;
        let file_size = stream.read_u32()?;
        let reserved = stream.read_u32()?;
        if reserved != 0 {
            return Err(Error::new(ErrorKind::HeaderMismatch {
                field: "index record reserved word must be zero",
            }));
        }
        let link_count = stream.read_u32()?;

        let (links, language_links) = if index_type == IndexType::Two {
            let mut links = Vec::with_capacity(link_count as usize);
            for _ in 0..link_count {
                links.push(Cuuid(stream.read_cuuid()?));
            }

            let language_count = stream.read_u32()?;
            let mut language_links = Vec::with_capacity(language_count as usize);
            for _ in 0..language_count {
                let code_bytes = stream.read_bytes(4)?;
                let code = String::from_utf8_lossy(&code_bytes).into_owned();
                let opaque = stream.read_u32()?;
                let target = Cuuid(stream.read_cuuid()?);
                language_links.push(LanguageLink {
                    language: entry::Language::from_code(&code),
                    opaque,
                    target,
                });
            }

            (links, language_links)
        } else {
            (Vec::new(), Vec::new())
        };

        Ok(IndexRecord {
            class,
            name,
            name_len,
            id,
            file_offset,
            file_size,
            links,
            language_links,
        })
    }

    fn read_body(
        stream: &mut ByteStream,
        variant: Variant,
        class: Class,
        record: &IndexRecord,
        callbacks: &mut Callbacks<'_>,
    ) -> Result<ClassBody, Error> {
        Ok(match class {
            Class::Event => {
                ClassBody::Event(class::EventResData::read(stream, variant)?)
            }
            Class::Wav => ClassBody::Wav(class::WavResData::read(stream, variant)?),
            Class::Switch => ClassBody::Switch(class::SwitchResData::read(stream, variant)?),
            Class::Random => ClassBody::Random(class::RandomResData::read(stream, variant)?),
            Class::Program => {
                let blob_len = (record.file_size as usize)
                    .saturating_sub(4 + record.name_len + 8);
                ClassBody::Program(class::ProgramResData::read(stream, variant, blob_len)?)
            }
            Class::WaveFile => ClassBody::WaveFile(class::WaveFileIdObj::read(
                stream,
                variant,
                record.file_size as usize,
                callbacks,
            )?),
        })
    }

    /// Serializes this container's current state back to bytes.
    ///
    /// Any `WaveFileIdObj` entry with an external subchunk-2 hands its payload to
    /// `callbacks`'s write callback as it is encountered.
    ///
    /// # Errors
    ///
    /// Propagates any error from a class's `write` routine, including the HXG
    /// `default_cuuid`-must-be-zero invariant on [`class::WavResData`].
    pub fn write(&self, callbacks: &mut Callbacks<'_>) -> Result<Vec<u8>, Error> {
        let mut main = ByteStream::new_write(self.variant.endianness());
        let mut index = ByteStream::new_write(self.variant.endianness());

        main.write_u32(0)?; // reserved offset-word slot, back-patched below

        index.write_u32(INDEX_MAGIC)?;
        index.write_u32(IndexType::Two.as_u32())?;
        index.write_u32(u32::try_from(self.entries.len()).unwrap_or(u32::MAX))?;

        for entry in &self.entries {
            let body_offset = main.position();
            self.write_body(&mut main, entry, callbacks)?;
            let body_size = main.position() - body_offset;

            let name = entry.class.encode_name(self.variant);
            index.write_u32(u32::try_from(name.len()).unwrap_or(u32::MAX))?;
            index.write_bytes(name.as_bytes())?;
            index.write_cuuid(entry.id.0)?;
            index.write_u32(u32::try_from(body_offset).unwrap_or(u32::MAX))?;
            index.write_u32(u32::try_from(body_size).unwrap_or(u32::MAX))?;
            index.write_u32(0)?; // reserved

            index.write_u32(u32::try_from(entry.links.len()).unwrap_or(u32::MAX))?;
            for link in &entry.links {
                index.write_cuuid(link.0)?;
            }

            index.write_u32(u32::try_from(entry.language_links.len()).unwrap_or(u32::MAX))?;
            for link in &entry.language_links {
                index.write_bytes(link.language.to_code().as_bytes())?;
                index.write_u32(link.opaque)?;
                index.write_cuuid(link.target.0)?;
            }
        }

        let index_start = main.position();
        main.write_bytes(&index.into_inner())?;

        if matches!(self.variant, Variant::Hxg | Variant::Hx2) {
            main.write_bytes(&[0u8; 32])?;
        }

        main.seek(0)?;
        main.write_u32(u32::try_from(index_start).unwrap_or(u32::MAX))?;

        Ok(main.into_inner())
    }

    fn write_body(
        &self,
        stream: &mut ByteStream,
        entry: &Entry,
        callbacks: &mut Callbacks<'_>,
    ) -> Result<(), Error> {
        match &entry.body {
            ClassBody::Event(body) => body.write(stream, self.variant),
            ClassBody::Wav(body) => body.write(stream, self.variant),
            ClassBody::Switch(body) => body.write(stream, self.variant),
            ClassBody::Random(body) => body.write(stream, self.variant),
            ClassBody::Program(body) => body.write(stream, self.variant),
            ClassBody::WaveFile(body) => body.write(stream, self.variant, callbacks),
        }
    }

    /// HXG-only: because its `WavResObj` carries no name on the wire, copy each `EventResData`'s
    /// name down to the `WavResData` it links to. Idempotent and order-independent: rerunning
    /// simply reassigns the same names.
    fn propagate_hxg_names(&mut self) {
        if self.variant != Variant::Hxg {
            return;
        }

        let updates: Vec<(Cuuid, String)> = self
            .entries
            .iter()
            .filter_map(|entry| match &entry.body {
                ClassBody::Event(event) => Some((event.link, event.name.clone())),
                _ => None,
            })
            .collect();

        for (target, name) in updates {
            if let Some(entry) = self.get_mut(target) {
                if let ClassBody::Wav(wav) = &mut entry.body {
                    wav.wav_res_obj.name = Some(name);
                }
            }
        }
    }

    /// For every `WavResData`'s language links, set the linked `WaveFileIdObj`'s name to
    /// `"<parent>_<tag>"`. Idempotent and order-independent for the same reason as
    /// [`Self::propagate_hxg_names`].
    fn propagate_language_names(&mut self) {
        let updates: Vec<(Cuuid, String)> = self
            .entries
            .iter()
            .flat_map(|entry| match &entry.body {
                ClassBody::Wav(wav) => {
                    let parent_name = wav.wav_res_obj.name.clone().unwrap_or_default();
                    wav.language_links
                        .iter()
                        .map(|link| {
                            (
                                link.target,
                                format!("{parent_name}_{}", link.language.tag()),
                            )
                        })
                        .collect::<Vec<_>>()
                }
                _ => Vec::new(),
            })
            .collect();

        for (target, name) in updates {
            if let Some(entry) = self.get_mut(target) {
                if let ClassBody::WaveFile(wave_file) = &mut entry.body {
                    wave_file.name = Some(name);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Container, Variant};
    use crate::callbacks::Callbacks;
    use crate::container::class::{ClassBody, EventResData, WavResData, WavResObj};
    use crate::container::entry::{Cuuid, Entry, Language, LanguageLink};
    use crate::error::ErrorKind;

    #[test]
    fn bad_index_magic_is_invalid_header() {
        let mut buffer = vec![0u8; 12];
        buffer[0..4].copy_from_slice(&4u32.to_be_bytes());
        buffer[4..8].copy_from_slice(&0x1234_5678u32.to_be_bytes());
        let mut callbacks = Callbacks::none();
        let err = Container::read(buffer, Variant::Hxg, &mut callbacks).unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidHeader);
    }

    #[test]
    fn zero_entry_count_is_empty_file() {
        let mut container = Container::new(Variant::Hxg);
        container.entries.clear();
        let buffer = container.write(&mut Callbacks::none()).unwrap();
        let mut callbacks = Callbacks::none();
        let err = Container::read(buffer, Variant::Hxg, &mut callbacks).unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::EmptyFile);
    }

    #[test]
    fn round_trip_hxg_propagates_event_name_and_language_name() {
        let wave_file_id = Cuuid(3);
        let wav_id = Cuuid(2);
        let event_id = Cuuid(1);

        let mut container = Container::new(Variant::Hxg);

        let mut wave_file_entry = Entry::new(
            wave_file_id,
            crate::container::class::Class::WaveFile,
            ClassBody::WaveFile(crate::container::class::WaveFileIdObj {
                id_obj: crate::container::class::IdObjPtr {
                    id: 1,
                    param: 0.0,
                    flags: 0,
                    opaque_successor: Some(0),
                },
                external_filename: None,
                wave_header: crate::wave::WaveHeader::default(),
                inline_data: Some(Vec::new()),
                trailing: Vec::new(),
                external_data: None,
                name: None,
            }),
        );
        wave_file_entry.file_size = 0;
        container.entries.push(wave_file_entry);

        let wav_body = WavResData {
            wav_res_obj: WavResObj {
                id: 5,
                name: None,
                size: Some(0),
                params: [0.0; 3],
                flags: 0x02,
            },
            default_cuuid: Cuuid(0),
            language_links: vec![LanguageLink {
                language: Language::En,
                opaque: 0,
                target: wave_file_id,
            }],
        };
        container
            .entries
            .push(Entry::new(wav_id, crate::container::class::Class::Wav, ClassBody::Wav(wav_body)));

        let event_body = EventResData {
            type_code: 1,
            name: "explosion".to_string(),
            flags: 0,
            link: wav_id,
            params: [0.0; 4],
        };
        container.entries.push(Entry::new(
            event_id,
            crate::container::class::Class::Event,
            ClassBody::Event(event_body),
        ));

        container.propagate_hxg_names();
        container.propagate_language_names();

        let wav_entry = container.get(wav_id).unwrap();
        let ClassBody::Wav(wav) = &wav_entry.body else {
            panic!("expected Wav body");
        };
        assert_eq!(wav.wav_res_obj.name.as_deref(), Some("explosion"));

        let wave_file_entry = container.get(wave_file_id).unwrap();
        let ClassBody::WaveFile(wave_file) = &wave_file_entry.body else {
            panic!("expected WaveFile body");
        };
        assert_eq!(wave_file.name.as_deref(), Some("explosion_EN"));
    }

    #[test]
    fn post_read_passes_are_idempotent() {
        let mut container = Container::new(Variant::Hxg);
        container.entries.push(Entry::new(
            Cuuid(1),
            crate::container::class::Class::Event,
            ClassBody::Event(EventResData {
                type_code: 0,
                name: "a".to_string(),
                flags: 0,
                link: Cuuid(2),
                params: [0.0; 4],
            }),
        ));
        container.entries.push(Entry::new(
            Cuuid(2),
            crate::container::class::Class::Wav,
            ClassBody::Wav(WavResData {
                wav_res_obj: WavResObj {
                    id: 0,
                    name: None,
                    size: Some(0),
                    params: [0.0; 3],
                    flags: 0,
                },
                default_cuuid: Cuuid(0),
                language_links: Vec::new(),
            }),
        ));

        let name_of = |container: &Container| match &container.get(Cuuid(2)).unwrap().body {
            ClassBody::Wav(wav) => wav.wav_res_obj.name.clone(),
            _ => None,
        };

        container.propagate_hxg_names();
        let first_pass = name_of(&container);
        container.propagate_hxg_names();
        let second_pass = name_of(&container);
        assert_eq!(first_pass, second_pass);
    }

    #[test]
    fn write_hands_external_wave_file_payload_to_write_callback() {
        let mut container = Container::new(Variant::Hxc);
        let mut entry = Entry::new(
            Cuuid(1),
            crate::container::class::Class::WaveFile,
            ClassBody::WaveFile(crate::container::class::WaveFileIdObj {
                id_obj: crate::container::class::IdObjPtr {
                    id: 1,
                    param: 0.0,
                    flags: 0x01,
                    opaque_successor: None,
                },
                external_filename: Some("explosion.wav".to_string()),
                wave_header: crate::wave::WaveHeader {
                    subchunk2: crate::wave::Subchunk2::External {
                        size: 2,
                        offset: 0,
                    },
                    ..crate::wave::WaveHeader::default()
                },
                inline_data: None,
                trailing: Vec::new(),
                external_data: Some(vec![7, 7]),
                name: None,
            }),
        );
        entry.file_size = 0;
        container.entries.push(entry);

        let mut written = None;
        let mut callbacks = Callbacks {
            read: None,
            write: Some(Box::new(|filename: &str, buffer: &[u8], offset: u32| {
                written = Some((filename.to_string(), buffer.to_vec(), offset));
            })),
            error: None,
        };

        let _written_bytes = container.write(&mut callbacks).unwrap();
        drop(callbacks);
        assert_eq!(
            written,
            Some(("explosion.wav".to_string(), vec![7, 7], 0))
        );
    }
}
