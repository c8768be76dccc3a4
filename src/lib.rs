//! # hxbank
//!
//! `hxbank` reads and writes HX audio-asset container files (`.hxd`, `.hxc`, `.hx2`, `.hxg`,
//! `.hxx`, `.hx3`) - the six platform-tagged variants of a game's audio asset graph, each an
//! index of CUUID-addressed entries (events, switches, random pickers, programs, and wave files)
//! pointing at DSP-ADPCM, PSX-ADPCM, or PCM audio streams.
//!
//! All file I/O is delegated to caller-supplied callbacks (see [`callbacks`]); the crate itself
//! never touches a filesystem.

#![warn(clippy::pedantic, future_incompatible)]
#![deny(
    let_underscore_drop,
    macro_use_extern_crate,
    meta_variable_misuse,
    missing_abi,
    missing_debug_implementations,
    missing_docs,
    non_ascii_idents,
    nonstandard_style,
    noop_method_call,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_op_in_unsafe_fn,
    unused,
    unused_crate_dependencies,
    unused_import_braces,
    unused_lifetimes,
    unused_macro_rules,
    unused_qualifications,
    unused_results,
    dead_code
)]

mod byte_stream;
pub mod callbacks;
pub mod codec;
pub mod container;
mod error;
pub mod wave;

pub use byte_stream::Endianness;
pub use codec::AudioFormat;
pub use container::class::{
    Class, ClassBody, EventResData, IdObjPtr, ProgramResData, RandomResData, RandomWeight,
    SwitchCase, SwitchResData, WavResData, WavResObj, WaveFileIdObj,
};
pub use container::entry::{Cuuid, Entry, Language, LanguageLink};
pub use container::{Container, IndexType, Variant};
pub use error::{Error, ErrorKind};
pub use wave::{Subchunk2, WaveHeader};
