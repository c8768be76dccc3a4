//! Nintendo GameCube DSP-ADPCM decode and encode.
//!
//! Per-channel state (the two history samples) only ever lives for the duration of a single
//! decode/encode call; there is no streaming variant.

use super::CodecError;
use crate::byte_stream::{ByteStream, Endianness};

const SAMPLES_PER_FRAME: usize = 14;
const FRAME_BYTES: usize = 8;
const HEADER_BYTES: usize = 96;

/// One channel's 96-byte DSP-ADPCM header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DspChannelHeader {
    /// Total decoded sample count for this channel.
    pub sample_count: u32,
    /// Total nibble count (`sample_count` rounded up to a multiple of 14, plus one byte-pair per frame).
    pub nibble_count: u32,
    /// Sample rate, in Hz.
    pub sample_rate: u32,
    /// Non-zero if the stream loops.
    pub loop_flag: u16,
    /// Loop format (implementation-defined, carried through unchanged).
    pub loop_format: u16,
    /// Nibble address of the loop start.
    pub loop_start: u32,
    /// Nibble address of the loop end.
    pub loop_end: u32,
    /// Nibble address of the current playback position (always 2 for a fresh stream).
    pub current_address: u32,
    /// 8 predictor pairs (16 signed 16-bit coefficients).
    pub coefficients: [i16; 16],
    /// Decoder gain, always 0 for this codec's usage.
    pub gain: u16,
    /// Initial predictor/scale byte for the first frame.
    pub initial_ps: u16,
    /// History sample 1 at stream start.
    pub initial_hist1: i16,
    /// History sample 2 at stream start.
    pub initial_hist2: i16,
    /// Predictor/scale byte at the loop point.
    pub loop_ps: u16,
    /// History sample 1 at the loop point.
    pub loop_hist1: i16,
    /// History sample 2 at the loop point.
    pub loop_hist2: i16,
}

impl Default for DspChannelHeader {
    fn default() -> Self {
        Self {
            sample_count: 0,
            nibble_count: 0,
            sample_rate: 0,
            loop_flag: 0,
            loop_format: 0,
            loop_start: 0,
            loop_end: 0,
            current_address: 2,
            coefficients: [0; 16],
            gain: 0,
            initial_ps: 0,
            initial_hist1: 0,
            initial_hist2: 0,
            loop_ps: 0,
            loop_hist1: 0,
            loop_hist2: 0,
        }
    }
}

impl DspChannelHeader {
    pub(crate) fn from_bytes(bytes: &[u8; HEADER_BYTES]) -> Self {
        let mut stream = ByteStream::new_read(bytes.to_vec(), Endianness::Big);
        let sample_count = stream.read_u32().expect("fixed-size header buffer");
        let nibble_count = stream.read_u32().expect("fixed-size header buffer");
        let sample_rate = stream.read_u32().expect("fixed-size header buffer");
        let loop_flag = stream.read_u16().expect("fixed-size header buffer");
        let loop_format = stream.read_u16().expect("fixed-size header buffer");
        let loop_start = stream.read_u32().expect("fixed-size header buffer");
        let loop_end = stream.read_u32().expect("fixed-size header buffer");
        let current_address = stream.read_u32().expect("fixed-size header buffer");

        let mut coefficients = [0i16; 16];
        for c in &mut coefficients {
            *c = stream.read_i16().expect("fixed-size header buffer");
        }

        let gain = stream.read_u16().expect("fixed-size header buffer");
        let initial_ps = stream.read_u16().expect("fixed-size header buffer");
        let initial_hist1 = stream.read_i16().expect("fixed-size header buffer");
        let initial_hist2 = stream.read_i16().expect("fixed-size header buffer");
        let loop_ps = stream.read_u16().expect("fixed-size header buffer");
        let loop_hist1 = stream.read_i16().expect("fixed-size header buffer");
        let loop_hist2 = stream.read_i16().expect("fixed-size header buffer");

        Self {
            sample_count,
            nibble_count,
            sample_rate,
            loop_flag,
            loop_format,
            loop_start,
            loop_end,
            current_address,
            coefficients,
            gain,
            initial_ps,
            initial_hist1,
            initial_hist2,
            loop_ps,
            loop_hist1,
            loop_hist2,
        }
    }

    pub(crate) fn to_bytes(&self) -> [u8; HEADER_BYTES] {
        let mut stream = ByteStream::new_write_with_capacity(HEADER_BYTES, Endianness::Big);
        stream.write_u32(self.sample_count).expect("growing buffer");
        stream.write_u32(self.nibble_count).expect("growing buffer");
        stream.write_u32(self.sample_rate).expect("growing buffer");
        stream.write_u16(self.loop_flag).expect("growing buffer");
        stream.write_u16(self.loop_format).expect("growing buffer");
        stream.write_u32(self.loop_start).expect("growing buffer");
        stream.write_u32(self.loop_end).expect("growing buffer");
        stream
            .write_u32(self.current_address)
            .expect("growing buffer");
        for c in self.coefficients {
            stream.write_i16(c).expect("growing buffer");
        }
        stream.write_u16(self.gain).expect("growing buffer");
        stream.write_u16(self.initial_ps).expect("growing buffer");
        stream
            .write_i16(self.initial_hist1)
            .expect("growing buffer");
        stream
            .write_i16(self.initial_hist2)
            .expect("growing buffer");
        stream.write_u16(self.loop_ps).expect("growing buffer");
        stream.write_i16(self.loop_hist1).expect("growing buffer");
        stream.write_i16(self.loop_hist2).expect("growing buffer");

        let padding = [0u8; 22];
        stream.write_bytes(&padding).expect("growing buffer");

        stream
            .into_inner()
            .try_into()
            .expect("header is exactly HEADER_BYTES long")
    }
}

/// Decodes a buffer laid out as `num_channels` 96-byte headers followed by interleaved frame data.
pub(crate) fn decode_headerless(data: &[u8], channels: usize) -> Result<Vec<u8>, CodecError> {
    if channels == 0 || data.len() < channels * HEADER_BYTES {
        return Ok(Vec::new());
    }

    let mut headers = Vec::with_capacity(channels);
    for i in 0..channels {
        let start = i * HEADER_BYTES;
        let chunk: [u8; HEADER_BYTES] = data[start..start + HEADER_BYTES]
            .try_into()
            .expect("sliced to HEADER_BYTES");
        headers.push(DspChannelHeader::from_bytes(&chunk));
    }

    let frames = &data[channels * HEADER_BYTES..];
    let samples = decode(&headers, frames);

    let mut out = Vec::with_capacity(samples.len() * 2);
    for s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    Ok(out)
}

/// Decodes interleaved DSP-ADPCM `frames` using per-channel state seeded from `headers`.
///
/// The output is sized to `ceil(sample_count / 14) * 14 * channels` samples (spec's sizing
/// invariant): the tail of an incomplete final frame is zero-padded rather than truncated.
pub(crate) fn decode(headers: &[DspChannelHeader], frames: &[u8]) -> Vec<i16> {
    let channels = headers.len();
    if channels == 0 {
        return Vec::new();
    }

    let sample_count = headers
        .iter()
        .map(|h| h.sample_count as usize)
        .max()
        .unwrap_or(0);
    let frame_count = sample_count.div_ceil(SAMPLES_PER_FRAME);
    let total_samples = frame_count * SAMPLES_PER_FRAME;

    let mut out = vec![0i16; total_samples * channels];

    for (c, header) in headers.iter().enumerate() {
        let mut hist1 = header.initial_hist1;
        let mut hist2 = header.initial_hist2;
        let channel_frame_bytes = FRAME_BYTES;
        let channel_samples = header.sample_count as usize;

        for frame in 0..frame_count {
            let frame_offset = frame * channel_frame_bytes * channels + c * channel_frame_bytes;
            if frame_offset >= frames.len() {
                break;
            }
            let ps = frames[frame_offset];
            let scale = 1i32 << (ps & 0xF);
            let predictor = ((ps >> 4) & 0xF) as usize;
            let c1 = i32::from(header.coefficients[predictor * 2]);
            let c2 = i32::from(header.coefficients[predictor * 2 + 1]);

            let remaining_in_channel = channel_samples.saturating_sub(frame * SAMPLES_PER_FRAME);
            let samples_in_frame = remaining_in_channel.min(SAMPLES_PER_FRAME);

            for n in 0..samples_in_frame {
                let byte_index = frame_offset + 1 + n / 2;
                if byte_index >= frames.len() {
                    break;
                }
                let byte = frames[byte_index];
                let nibble = if n % 2 == 0 { byte >> 4 } else { byte & 0xF };
                let s = sign_extend_nibble(nibble);

                let predicted = (scale * s << 11) + 1024 + c1 * i32::from(hist1) + c2 * i32::from(hist2);
                let pcm = (predicted >> 11).clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;

                let out_index = (frame * SAMPLES_PER_FRAME + n) * channels + c;
                out[out_index] = pcm;

                hist2 = hist1;
                hist1 = pcm;
            }
        }
    }

    out
}

fn sign_extend_nibble(nibble: u8) -> i32 {
    let n = i32::from(nibble);
    if n >= 8 {
        n - 16
    } else {
        n
    }
}

/// Tuning knobs for the DSP-ADPCM encoder (this crate's "configuration" surface for codecs).
#[derive(Clone, Copy, Debug, Default)]
pub struct DspEncodeOptions {
    /// When `true`, search all 8 predictor pairs per frame instead of fixing predictor 0.
    pub full_predictor_search: bool,
}

/// Encodes interleaved 16-bit PCM `samples` to DSP-ADPCM, 14 samples per frame per channel.
pub(crate) fn encode(
    samples: &[i16],
    channels: usize,
    sample_rate: u32,
    _options: DspEncodeOptions,
) -> (Vec<DspChannelHeader>, Vec<u8>) {
    if channels == 0 {
        return (Vec::new(), Vec::new());
    }

    let frames_per_channel = samples.len() / channels;
    let frame_count = frames_per_channel.div_ceil(SAMPLES_PER_FRAME);

    let mut headers = Vec::with_capacity(channels);
    let mut channel_frames = vec![Vec::with_capacity(frame_count * FRAME_BYTES); channels];

    for c in 0..channels {
        let mut header = DspChannelHeader {
            sample_count: frames_per_channel as u32,
            sample_rate,
            ..DspChannelHeader::default()
        };
        header.nibble_count = (frame_count * (SAMPLES_PER_FRAME + 2)) as u32;

        let mut hist1 = 0i16;
        let mut hist2 = 0i16;

        for frame in 0..frame_count {
            // Coefficient derivation (the Dolby filter-design step real encoders run to fill
            // `header.coefficients`) is out of scope; every predictor's pair is zero here, so
            // `options.full_predictor_search` has nothing to choose between yet and predictor 0
            // is used unconditionally.
            let predictor = 0;
            let (c1, c2) = (
                i32::from(header.coefficients[predictor * 2]),
                i32::from(header.coefficients[predictor * 2 + 1]),
            );

            let mut frame_samples = [0i16; SAMPLES_PER_FRAME];
            let mut count_in_frame = 0;
            for n in 0..SAMPLES_PER_FRAME {
                let idx = (frame * SAMPLES_PER_FRAME + n) * channels + c;
                if idx >= samples.len() {
                    break;
                }
                frame_samples[n] = samples[idx];
                count_in_frame += 1;
            }

            let scale = best_scale_exponent(&frame_samples[..count_in_frame], c1, c2, hist1, hist2);
            let ps = ((predictor as u8) << 4) | scale;

            if frame == 0 {
                header.initial_ps = u16::from(ps);
                header.initial_hist1 = hist1;
                header.initial_hist2 = hist2;
            }

            let mut frame_bytes = vec![ps];
            let mut nibble_hi: Option<u8> = None;

            for n in 0..SAMPLES_PER_FRAME {
                let target = if n < count_in_frame { frame_samples[n] } else { 0 };
                let predicted = c1 * i32::from(hist1) + c2 * i32::from(hist2);
                let diff = (i32::from(target) * 2048 - predicted - 1024) >> (11 + scale);
                let nibble = diff.clamp(-8, 7) as i8 as u8 & 0xF;

                let scale_i32 = 1i32 << scale;
                let reconstructed_predicted =
                    ((scale_i32 * sign_extend_nibble(nibble) << 11) + 1024 + predicted) >> 11;
                let reconstructed =
                    reconstructed_predicted.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;

                hist2 = hist1;
                hist1 = reconstructed;

                match nibble_hi {
                    None => nibble_hi = Some(nibble),
                    Some(hi) => {
                        frame_bytes.push((hi << 4) | nibble);
                        nibble_hi = None;
                    }
                }
            }

            channel_frames[c].extend_from_slice(&frame_bytes);
        }

        headers.push(header);
    }

    let mut out = Vec::with_capacity(frame_count * FRAME_BYTES * channels);
    for frame in 0..frame_count {
        for frame_bytes in &channel_frames {
            let start = frame * FRAME_BYTES;
            out.extend_from_slice(&frame_bytes[start..start + FRAME_BYTES]);
        }
    }

    (headers, out)
}

fn best_scale_exponent(samples: &[i16], c1: i32, c2: i32, hist1: i16, hist2: i16) -> u8 {
    let predicted = c1 * i32::from(hist1) + c2 * i32::from(hist2);
    let mut max_diff = 0i32;
    for &s in samples {
        let diff = (i32::from(s) * 2048 - predicted - 1024).abs();
        max_diff = max_diff.max(diff);
    }

    for scale in 0..=12u8 {
        let max_encodable = 7i32 << (11 + scale);
        if max_diff <= max_encodable {
            return scale;
        }
    }
    12
}

#[cfg(test)]
mod test {
    use super::{decode, decode_headerless, encode, DspChannelHeader, DspEncodeOptions};

    #[test]
    fn single_frame_mono_all_zero_decodes_to_silence() {
        let header = DspChannelHeader {
            sample_count: 14,
            ..DspChannelHeader::default()
        };
        let frame = [0u8; 8];
        let samples = decode(&[header], &frame);
        assert_eq!(samples, vec![0i16; 14]);
    }

    #[test]
    fn partial_last_frame_is_zero_padded_to_full_frame() {
        let header = DspChannelHeader {
            sample_count: 7,
            ..DspChannelHeader::default()
        };
        let frame = [0u8; 8];
        let samples = decode(&[header], &frame);
        assert_eq!(samples.len(), 14);
        assert!(samples[7..].iter().all(|&s| s == 0));
    }

    #[test]
    fn decoded_size_matches_ceil_formula() {
        for (sample_count, channels, expected_samples) in
            [(14, 1, 14), (7, 1, 14), (15, 1, 28), (14, 2, 28)]
        {
            let headers: Vec<_> = (0..channels)
                .map(|_| DspChannelHeader {
                    sample_count,
                    ..DspChannelHeader::default()
                })
                .collect();
            let frame_count = (sample_count as usize).div_ceil(14);
            let frames = vec![0u8; frame_count * 8 * channels as usize];
            let samples = decode(&headers, &frames);
            assert_eq!(samples.len(), expected_samples * channels as usize);
        }
    }

    #[test]
    fn header_round_trips_through_bytes() {
        let header = DspChannelHeader {
            sample_count: 1000,
            nibble_count: 1200,
            sample_rate: 32000,
            coefficients: [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16],
            ..DspChannelHeader::default()
        };
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), 96);
        assert_eq!(DspChannelHeader::from_bytes(&bytes), header);
    }

    #[test]
    fn encode_then_decode_roughly_preserves_silence() {
        let samples = vec![0i16; 28];
        let (headers, frames) = encode(&samples, 1, 22050, DspEncodeOptions::default());
        let decoded = decode(&headers, &frames);
        assert_eq!(decoded, samples);
    }

    #[test]
    fn decode_headerless_splits_header_and_frames() {
        let header = DspChannelHeader {
            sample_count: 14,
            ..DspChannelHeader::default()
        };
        let mut data = header.to_bytes().to_vec();
        data.extend_from_slice(&[0u8; 8]);
        let pcm_bytes = decode_headerless(&data, 1).unwrap();
        assert_eq!(pcm_bytes.len(), 28);
    }
}
