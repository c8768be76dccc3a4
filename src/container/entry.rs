//! Entries: the typed records a [`Container`](super::Container) holds, addressed by CUUID.

use super::class::{Class, ClassBody};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A 64-bit identifier addressing one entry in a container.
///
/// Serialized high word first, independent of the container's endianness
/// (see [`ByteStream::read_cuuid`](crate::byte_stream::ByteStream::read_cuuid)).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cuuid(pub u64);

impl From<u64> for Cuuid {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Cuuid> for u64 {
    fn from(value: Cuuid) -> Self {
        value.0
    }
}

impl Display for Cuuid {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:016X}", self.0)
    }
}

/// A locale tag attached to a [`LanguageLink`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Language {
    /// German.
    De,
    /// English.
    En,
    /// Spanish.
    Es,
    /// French.
    Fr,
    /// Italian.
    It,
    /// Any code not in the recognized set.
    Unknown,
}

static LANGUAGE_CODES: phf::Map<&'static str, Language> = phf::phf_map! {
    "de  " => Language::De,
    "en  " => Language::En,
    "es  " => Language::Es,
    "fr  " => Language::Fr,
    "it  " => Language::It,
};

impl Language {
    pub(crate) fn from_code(code: &str) -> Self {
        LANGUAGE_CODES.get(code).copied().unwrap_or(Language::Unknown)
    }

    pub(crate) fn to_code(self) -> &'static str {
        match self {
            Self::De => "de  ",
            Self::En => "en  ",
            Self::Es => "es  ",
            Self::Fr => "fr  ",
            Self::It => "it  ",
            Self::Unknown => "??  ",
        }
    }

    /// Two-letter tag used when deriving wave-file names (`"<parent>_<tag>"`).
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::De => "DE",
            Self::En => "EN",
            Self::Es => "ES",
            Self::Fr => "FR",
            Self::It => "IT",
            Self::Unknown => "Unknown Language",
        }
    }
}

/// A `(language, opaque field, target)` tuple associating a locale with a wave-file entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LanguageLink {
    /// The locale this link is for.
    pub language: Language,
    /// Opaque 32-bit field carried through unchanged.
    pub opaque: u32,
    /// The linked entry's CUUID (resolves to a `WaveFileIdObj`).
    pub target: Cuuid,
}

/// One record in a [`Container`](super::Container): a CUUID, its class-tagged body, on-disk
/// position, and links to other entries.
#[derive(Clone, Debug)]
pub struct Entry {
    /// This entry's identifier.
    pub id: Cuuid,
    /// The entry's class tag.
    pub class: Class,
    /// The class-specific body.
    pub body: ClassBody,
    /// Byte offset of this entry's body within the file (filled on read, recomputed on write).
    pub file_offset: u32,
    /// Byte size of this entry's body within the file.
    pub file_size: u32,
    /// CUUIDs this entry links to (index type 2 only).
    pub links: Vec<Cuuid>,
    /// Locale-tagged links to other entries.
    pub language_links: Vec<LanguageLink>,
}

impl Entry {
    #[allow(dead_code)]
    pub(crate) fn new(id: Cuuid, class: Class, body: ClassBody) -> Self {
        Self {
            id,
            class,
            body,
            file_offset: 0,
            file_size: 0,
            links: Vec::new(),
            language_links: Vec::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::Language;

    #[test]
    fn language_code_round_trips() {
        for lang in [
            Language::De,
            Language::En,
            Language::Es,
            Language::Fr,
            Language::It,
        ] {
            assert_eq!(Language::from_code(lang.to_code()), lang);
        }
    }

    #[test]
    fn unrecognized_code_is_unknown() {
        assert_eq!(Language::from_code("zz  "), Language::Unknown);
    }
}
