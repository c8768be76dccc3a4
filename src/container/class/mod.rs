//! The class registry: name encoding/parsing and the tagged body union.

mod event;
mod program;
mod random;
mod switch;
mod wav;
mod wavefile;

pub use event::EventResData;
pub use program::ProgramResData;
pub use random::{RandomResData, RandomWeight};
pub use switch::{SwitchCase, SwitchResData};
pub use wav::{WavResData, WavResObj};
pub use wavefile::{IdObjPtr, WaveFileIdObj};

use super::variant::Variant;

/// The type tag of an entry's body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Class {
    /// An event triggering a `WavResData`/`SwitchResData`/`RandomResData`/`ProgramResData`.
    Event,
    /// A single sound, or a set of locale-tagged sounds.
    Wav,
    /// A runtime switch between several linked resources.
    Switch,
    /// A weighted-random choice among several linked resources.
    Random,
    /// An opaque program blob with an advisory, heuristically-scanned link list.
    Program,
    /// A single platform-specific audio stream.
    WaveFile,
}

impl Class {
    /// Whether this class's serialized name omits the variant's platform tag.
    #[must_use]
    pub fn is_cross_version(self) -> bool {
        matches!(
            self,
            Self::Event | Self::Switch | Self::Random | Self::Program
        )
    }

    fn fragment(self) -> &'static str {
        match self {
            Self::Event => "EventResData",
            Self::Wav => "WavResData",
            Self::Switch => "SwitchResData",
            Self::Random => "RandomResData",
            Self::Program => "ProgramResData",
            Self::WaveFile => "WaveFileIdObj",
        }
    }

    /// Builds this class's fully-qualified serialized name for `variant`.
    ///
    /// `"C" + platform_tag? + fragment`, where the platform tag is present only when the class is
    /// not cross-version.
    #[must_use]
    pub fn encode_name(self, variant: Variant) -> String {
        if self.is_cross_version() {
            format!("C{}", self.fragment())
        } else {
            format!("C{}{}", variant.platform_tag(), self.fragment())
        }
    }

    /// Parses a fully-qualified class name, stripping a recognized platform-tag prefix if
    /// present, then matching the remaining suffix against the registry.
    ///
    /// Returns `None` for anything not in the registry - this is the `Invalid` sentinel from the
    /// body-shape table, collapsed into `Option::None` since no body representation is needed for
    /// an unrecognized name (see `DESIGN.md`).
    #[must_use]
    pub fn parse_name(name: &str) -> Option<Self> {
        let rest = name.strip_prefix('C')?;
        let rest = ["PC", "PS2", "PS3", "XBox", "GC"]
            .iter()
            .find_map(|tag| rest.strip_prefix(tag))
            .unwrap_or(rest);

        match rest {
            "EventResData" => Some(Self::Event),
            "WavResData" => Some(Self::Wav),
            "SwitchResData" => Some(Self::Switch),
            "RandomResData" => Some(Self::Random),
            "ProgramResData" => Some(Self::Program),
            "WaveFileIdObj" => Some(Self::WaveFile),
            _ => None,
        }
    }
}

/// The tagged union of per-class body data, replacing the source's untyped body pointer.
#[derive(Clone, Debug)]
pub enum ClassBody {
    /// Body of an [`Class::Event`] entry.
    Event(EventResData),
    /// Body of a [`Class::Wav`] entry.
    Wav(WavResData),
    /// Body of a [`Class::Switch`] entry.
    Switch(SwitchResData),
    /// Body of a [`Class::Random`] entry.
    Random(RandomResData),
    /// Body of a [`Class::Program`] entry.
    Program(ProgramResData),
    /// Body of a [`Class::WaveFile`] entry.
    WaveFile(WaveFileIdObj),
}

#[cfg(test)]
mod test {
    use super::Class;
    use crate::container::variant::Variant;

    #[test]
    fn cross_version_classes_omit_platform_tag() {
        assert_eq!(Class::Event.encode_name(Variant::Hxg), "CEventResData");
        assert_eq!(Class::Program.encode_name(Variant::Hx2), "CProgramResData");
    }

    #[test]
    fn non_cross_version_classes_carry_platform_tag() {
        assert_eq!(Class::Wav.encode_name(Variant::Hxg), "CGCWavResData");
        assert_eq!(
            Class::WaveFile.encode_name(Variant::Hxc),
            "CPCWaveFileIdObj"
        );
    }

    #[test]
    fn parse_name_strips_platform_tag() {
        assert_eq!(Class::parse_name("CGCWavResData"), Some(Class::Wav));
        assert_eq!(Class::parse_name("CPS2WaveFileIdObj"), Some(Class::WaveFile));
        assert_eq!(Class::parse_name("CEventResData"), Some(Class::Event));
    }

    #[test]
    fn unrecognized_name_is_none() {
        assert_eq!(Class::parse_name("CBogusClass"), None);
    }

    #[test]
    fn name_round_trips_for_every_variant() {
        for variant in [
            Variant::Hxd,
            Variant::Hxc,
            Variant::Hx2,
            Variant::Hxg,
            Variant::Hxx,
            Variant::Hx3,
        ] {
            for class in [
                Class::Event,
                Class::Wav,
                Class::Switch,
                Class::Random,
                Class::Program,
                Class::WaveFile,
            ] {
                let name = class.encode_name(variant);
                assert_eq!(Class::parse_name(&name), Some(class));
            }
        }
    }
}
