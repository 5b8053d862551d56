//! 16-bit PCM WAV encoding.
//!
//! Mono and stereo buffers produce the canonical 44-byte `RIFF`/`WAVE`
//! header followed by interleaved little-endian samples.

use std::io::{Cursor, Seek, Write};
use std::path::Path;

use crate::SampleBuffer;

/// Size of the canonical PCM WAV header in bytes.
pub const HEADER_LEN: usize = 44;

fn wav_spec(buffer: &SampleBuffer) -> Result<hound::WavSpec, hound::Error> {
    let channels =
        u16::try_from(buffer.channel_count()).map_err(|_| hound::Error::Unsupported)?;
    if channels == 0 {
        return Err(hound::Error::Unsupported);
    }
    Ok(hound::WavSpec {
        channels,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    })
}

/// Encode a buffer as an in-memory 16-bit PCM WAV file.
pub fn encode(buffer: &SampleBuffer) -> Result<Vec<u8>, hound::Error> {
    let mut cursor = Cursor::new(Vec::new());
    write(buffer, &mut cursor)?;
    Ok(cursor.into_inner())
}

/// Write a buffer as a 16-bit PCM WAV file at `path`.
pub fn write_file(buffer: &SampleBuffer, path: &Path) -> Result<(), hound::Error> {
    let writer = hound::WavWriter::create(path, wav_spec(buffer)?)?;
    write_samples(buffer, writer)
}

/// Write a buffer as a 16-bit PCM WAV stream.
///
/// Samples are interleaved frame by frame and converted with [`to_i16`].
pub fn write<W: Write + Seek>(buffer: &SampleBuffer, out: W) -> Result<(), hound::Error> {
    let writer = hound::WavWriter::new(out, wav_spec(buffer)?)?;
    write_samples(buffer, writer)
}

fn write_samples<W: Write + Seek>(
    buffer: &SampleBuffer,
    mut writer: hound::WavWriter<W>,
) -> Result<(), hound::Error> {
    for i in 0..buffer.frames() {
        for channel in buffer.channels() {
            writer.write_sample(to_i16(channel[i]))?;
        }
    }
    writer.finalize()
}

/// Convert one float sample to a signed 16-bit value.
///
/// The sample is clamped to `[-1, 1]`, negative values are scaled by 32768
/// and non-negative values by 32767, and the result is truncated toward zero.
pub fn to_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}
