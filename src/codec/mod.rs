//! Audio format codes and the format-conversion dispatch built on top of the per-codec modules.

use std::{
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
};

mod dsp;
mod psx;

pub use dsp::{DspChannelHeader, DspEncodeOptions};

/// The audio format code carried by every `WaveFileIdObj` stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum AudioFormat {
    /// Uncompressed linear PCM.
    Pcm = 1,
    /// Ubisoft's proprietary format. Round-tripped as an opaque blob; never decoded.
    Ubi = 2,
    /// Sony PlayStation ADPCM.
    Psx = 3,
    /// Nintendo GameCube DSP-ADPCM.
    Dsp = 4,
    /// IMA ADPCM. Round-tripped as an opaque blob; never decoded.
    Ima = 5,
    /// MPEG Layer III. Round-tripped as an opaque blob; never decoded.
    Mp3 = 0x55,
}

impl TryFrom<u32> for AudioFormat {
    type Error = CodecError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Pcm),
            2 => Ok(Self::Ubi),
            3 => Ok(Self::Psx),
            4 => Ok(Self::Dsp),
            5 => Ok(Self::Ima),
            0x55 => Ok(Self::Mp3),
            _ => Err(CodecError::UnsupportedConversion {
                from: value,
                to: value,
            }),
        }
    }
}

impl From<AudioFormat> for u32 {
    fn from(value: AudioFormat) -> Self {
        value as u32
    }
}

/// Converts `data`, encoded as `from`, to `to`.
///
/// PCM→PCM is a copy. DSP→PCM and PSX→PCM invoke the respective decoders. PCM→DSP invokes the
/// DSP encoder with default [`DspEncodeOptions`]. Every other pair is out of scope and fails with
/// [`CodecError::UnsupportedConversion`].
///
/// # Errors
///
/// Returns [`CodecError`] if the pair is unsupported, or if the source data is malformed (e.g. a
/// PSX frame with a predictor index greater than 4).
pub fn convert(
    from: AudioFormat,
    to: AudioFormat,
    channels: usize,
    sample_rate: u32,
    data: &[u8],
) -> Result<Vec<u8>, CodecError> {
    match (from, to) {
        (AudioFormat::Pcm, AudioFormat::Pcm) => Ok(data.to_vec()),
        (AudioFormat::Dsp, AudioFormat::Pcm) => dsp::decode_headerless(data, channels),
        (AudioFormat::Psx, AudioFormat::Pcm) => psx::decode(data, channels).map(|samples| {
            let mut out = Vec::with_capacity(samples.len() * 2);
            for s in samples {
                out.extend_from_slice(&s.to_le_bytes());
            }
            out
        }),
        (AudioFormat::Pcm, AudioFormat::Dsp) => {
            let samples = bytes_to_i16(data);
            let (headers, frames) =
                dsp::encode(&samples, channels, sample_rate, DspEncodeOptions::default());
            let mut out = Vec::new();
            for header in &headers {
                out.extend_from_slice(&header.to_bytes());
            }
            out.extend_from_slice(&frames);
            Ok(out)
        }
        _ => Err(CodecError::UnsupportedConversion {
            from: u32::from(from),
            to: u32::from(to),
        }),
    }
}

fn bytes_to_i16(data: &[u8]) -> Vec<i16> {
    data.chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]))
        .collect()
}

/// Represents a failure in an audio codec.
#[derive(Debug)]
#[non_exhaustive]
pub enum CodecError {
    /// An ADPCM frame carried a predictor index outside the supported range (PSX: > 4).
    MalformedFrame {
        /// The out-of-range predictor value.
        predictor: u8,
    },
    /// No conversion exists between the two given format codes.
    UnsupportedConversion {
        /// Source format code.
        from: u32,
        /// Destination format code.
        to: u32,
    },
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::MalformedFrame { predictor } => {
                f.write_str(&format!("ADPCM frame predictor {predictor} is out of range"))
            }
            Self::UnsupportedConversion { from, to } => f.write_str(&format!(
                "no conversion from format 0x{from:02x} to format 0x{to:02x}"
            )),
        }
    }
}

impl Error for CodecError {}

#[cfg(test)]
mod test {
    use super::{convert, AudioFormat};

    #[test]
    fn pcm_to_pcm_is_a_copy() {
        let data = [1, 2, 3, 4];
        assert_eq!(
            convert(AudioFormat::Pcm, AudioFormat::Pcm, 1, 22050, &data).unwrap(),
            data
        );
    }

    #[test]
    fn unsupported_pair_fails() {
        assert!(convert(AudioFormat::Mp3, AudioFormat::Dsp, 1, 22050, &[]).is_err());
    }
}
