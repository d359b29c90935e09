use std::path::Path;

use anyhow::Context;
use podmix_transport::SampleBuffer;

pub const WAV_HEADER_LEN: usize = 44;
const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: u16 = BITS_PER_SAMPLE / 8;
const FORMAT_PCM: u16 = 1;
/// Header bytes after the RIFF size field.
const RIFF_OVERHEAD: u32 = 36;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WavError {
    #[error("{samples} samples do not fit in a 16-bit WAV data chunk")]
    TooLarge { samples: usize },
}

/// Convert a float sample to 16-bit PCM.
///
/// The sample is clamped to `[-1, 1]`, scaled by 32767 and truncated toward
/// zero.
#[inline]
pub fn quantize(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Byte length of the data chunk for `samples` interleaved samples. Both
/// size fields in the header are 32-bit, so the RIFF size must fit as well.
fn data_chunk_len(samples: usize) -> Result<u32, WavError> {
    samples
        .checked_mul(BYTES_PER_SAMPLE as usize)
        .and_then(|bytes| u32::try_from(bytes).ok())
        .filter(|bytes| bytes.checked_add(RIFF_OVERHEAD).is_some())
        .ok_or(WavError::TooLarge { samples })
}

/// Serialize a buffer as a 16-bit PCM RIFF/WAVE file.
///
/// The layout is the canonical 44-byte header followed by interleaved
/// little-endian samples, with no extra chunks. Buffers whose data chunk
/// would overflow the 32-bit size fields are rejected.
pub fn encode_wav(buffer: &SampleBuffer) -> Result<Vec<u8>, WavError> {
    let channels = buffer.channels();
    let sample_rate = buffer.sample_rate();
    let block_align = channels * BYTES_PER_SAMPLE;
    let byte_rate = sample_rate * block_align as u32;
    let data_len = data_chunk_len(buffer.len())?;

    let mut bytes = Vec::with_capacity(WAV_HEADER_LEN + data_len as usize);

    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(RIFF_OVERHEAD + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");

    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    bytes.extend_from_slice(&channels.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&byte_rate.to_le_bytes());
    bytes.extend_from_slice(&block_align.to_le_bytes());
    bytes.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());

    for &sample in buffer.samples() {
        bytes.extend_from_slice(&quantize(sample).to_le_bytes());
    }

    Ok(bytes)
}

/// Write a buffer to disk as 16-bit PCM WAV.
pub fn write_wav(buffer: &SampleBuffer, path: &Path) -> anyhow::Result<()> {
    let spec = hound::WavSpec {
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("failed to create wav file: {}", path.display()))?;

    for &sample in buffer.samples() {
        writer.write_sample(quantize(sample))?;
    }

    writer.finalize()?;
    log::info!(
        "wrote {} ({} frames, {} Hz)",
        path.display(),
        buffer.frames(),
        buffer.sample_rate()
    );
    Ok(())
}
