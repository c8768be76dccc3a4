//! The six platform-tagged container variants.

use crate::byte_stream::Endianness;
use crate::error::{Error, ErrorKind};

/// One of the six platform-tagged file formats, differing in endianness and per-class field
/// presence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// PC, big-endian despite the x86 host - a quirk of the original tool's byte-stream layer.
    Hxd,
    /// PC, little-endian.
    Hxc,
    /// PlayStation 2.
    Hx2,
    /// GameCube.
    Hxg,
    /// Xbox.
    Hxx,
    /// PlayStation 3.
    Hx3,
}

impl Variant {
    /// The stream endianness this variant reads and writes in.
    #[must_use]
    pub fn endianness(self) -> Endianness {
        match self {
            Self::Hxd | Self::Hxg | Self::Hxx => Endianness::Big,
            Self::Hxc | Self::Hx2 | Self::Hx3 => Endianness::Little,
        }
    }

    /// The platform tag string injected into non-cross-version class names.
    #[must_use]
    pub fn platform_tag(self) -> &'static str {
        match self {
            Self::Hxd | Self::Hxc => "PC",
            Self::Hx2 => "PS2",
            Self::Hxg => "GC",
            Self::Hxx => "XBox",
            Self::Hx3 => "PS3",
        }
    }

    /// Whether this variant is the PC little-endian variant (`WavResObj` carries an inline name
    /// only here).
    #[must_use]
    pub fn carries_wav_name(self) -> bool {
        matches!(self, Self::Hxc)
    }

    /// Whether this variant's `WavResObj` carries a `size` field.
    #[must_use]
    pub fn carries_wav_size(self) -> bool {
        matches!(self, Self::Hxg | Self::Hx2)
    }

    /// Whether this variant's `IdObjPtr` uses the wide (32-bit flags + opaque successor) layout.
    #[must_use]
    pub fn has_wide_id_obj_ptr(self) -> bool {
        matches!(self, Self::Hxg)
    }

    /// Resolves a variant from a file extension such as `"hxd"` or `".hxg"` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`Error`] with [`ErrorKind::InvalidArgument`] if the extension is not recognized.
    pub fn from_extension(extension: &str) -> Result<Self, Error> {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "hxd" => Ok(Self::Hxd),
            "hxc" => Ok(Self::Hxc),
            "hx2" => Ok(Self::Hx2),
            "hxg" => Ok(Self::Hxg),
            "hxx" => Ok(Self::Hxx),
            "hx3" => Ok(Self::Hx3),
            _ => Err(Error::new(ErrorKind::InvalidArgument {
                reason: "file extension did not map to a known container variant",
            })),
        }
    }
}
