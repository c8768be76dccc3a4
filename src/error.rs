//! The crate's public error type and the error kinds entries and streams can fail with.

use crate::byte_stream::ByteStreamError;
use crate::codec::CodecError;
use crate::wave::WaveError;
use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
};

/// Represents an error that can occur while reading or writing a container.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: Option<ErrorSource>,
}

/// The kind of failure a container operation encountered.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A filename was empty, or a file extension did not map to a known [`Variant`](crate::container::Variant).
    InvalidArgument {
        /// Human-readable description of what was wrong with the argument.
        reason: &'static str,
    },
    /// A read or write callback reported failure.
    IoFailed {
        /// Name of the file the callback was operating on.
        filename: String,
    },
    /// The index magic did not match `"INDX"`.
    InvalidHeader,
    /// The index type word was neither 1 nor 2.
    InvalidIndexType {
        /// The value actually read.
        value: u32,
    },
    /// The index table declared zero entries.
    EmptyFile,
    /// An entry body disagreed with its index record.
    HeaderMismatch {
        /// What disagreed (class name or CUUID).
        field: &'static str,
    },
    /// A class name was not recognized by the registry. Non-fatal: the entry is skipped.
    UnknownClass {
        /// The unrecognized, fully-qualified class name.
        name: String,
    },
    /// An ADPCM frame carried a predictor index outside the supported range.
    MalformedFrame {
        /// The out-of-range predictor value.
        predictor: u8,
    },
    /// A requested format conversion has no implementation.
    UnsupportedConversion {
        /// Source format code.
        from: u32,
        /// Destination format code.
        to: u32,
    },
    /// A RIFF/WAVE header failed magic validation.
    WaveHeaderInvalid,
}

#[derive(Debug)]
enum ErrorSource {
    ByteStream(ByteStreamError),
    Codec(CodecError),
    Wave(WaveError),
}

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl From<ByteStreamError> for Error {
    fn from(value: ByteStreamError) -> Self {
        Self {
            kind: ErrorKind::InvalidHeader,
            source: Some(ErrorSource::ByteStream(value)),
        }
    }
}

impl From<CodecError> for Error {
    fn from(value: CodecError) -> Self {
        let kind = match &value {
            CodecError::MalformedFrame { predictor } => ErrorKind::MalformedFrame {
                predictor: *predictor,
            },
            CodecError::UnsupportedConversion { from, to } => ErrorKind::UnsupportedConversion {
                from: *from,
                to: *to,
            },
        };
        Self {
            kind,
            source: Some(ErrorSource::Codec(value)),
        }
    }
}

impl From<WaveError> for Error {
    fn from(value: WaveError) -> Self {
        Self {
            kind: ErrorKind::WaveHeaderInvalid,
            source: Some(ErrorSource::Wave(value)),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.kind {
            ErrorKind::InvalidArgument { reason } => {
                f.write_str(&format!("invalid argument: {reason}"))
            }
            ErrorKind::IoFailed { filename } => {
                f.write_str(&format!("I/O callback failed for \"{filename}\""))
            }
            ErrorKind::InvalidHeader => f.write_str("index table magic did not match \"INDX\""),
            ErrorKind::InvalidIndexType { value } => {
                f.write_str(&format!("index type {value} is neither 1 nor 2"))
            }
            ErrorKind::EmptyFile => f.write_str("index table declared zero entries"),
            ErrorKind::HeaderMismatch { field } => {
                f.write_str(&format!("entry body disagreed with index record: {field}"))
            }
            ErrorKind::UnknownClass { name } => {
                f.write_str(&format!("class name \"{name}\" is not registered"))
            }
            ErrorKind::MalformedFrame { predictor } => f.write_str(&format!(
                "ADPCM frame predictor {predictor} is out of range"
            )),
            ErrorKind::UnsupportedConversion { from, to } => f.write_str(&format!(
                "no conversion from format 0x{from:02x} to format 0x{to:02x}"
            )),
            ErrorKind::WaveHeaderInvalid => {
                f.write_str("RIFF/WAVE header failed magic validation")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.source {
            Some(ErrorSource::ByteStream(e)) => Some(e),
            Some(ErrorSource::Codec(e)) => Some(e),
            Some(ErrorSource::Wave(e)) => Some(e),
            None => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Error, ErrorKind};

    #[test]
    fn display_includes_context() {
        let err = Error::new(ErrorKind::UnknownClass {
            name: "CPCFooBar".to_string(),
        });
        assert!(err.to_string().contains("CPCFooBar"));
    }
}
