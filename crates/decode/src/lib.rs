mod cache;

use std::fs::File;
use std::path::Path;

use anyhow::Context;
use podmix_transport::SampleBuffer;
use symphonia::core::audio::SampleBuffer as DecodedSamples;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

pub use cache::{AudioCache, CachedAsset};

/// Decode an audio file into an interleaved `f32` buffer.
///
/// The container is probed using the file extension as a hint; only the
/// default track is decoded.
pub fn decode_file(path: &Path) -> anyhow::Result<SampleBuffer> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| anyhow::anyhow!("no default track in {}", path.display()))?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| anyhow::anyhow!("unknown sample rate in {}", path.display()))?;
    let channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(2) as u16;
    let track_id = track.id;

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder.decode(&packet)?;
        let spec = *decoded.spec();
        let duration = decoded.capacity() as u64;

        let mut sample_buf = DecodedSamples::<f32>::new(duration, spec);
        sample_buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(sample_buf.samples());
    }

    // Guard against a trailing partial frame from a truncated file
    let whole = samples.len() - samples.len() % channels as usize;
    samples.truncate(whole);

    let buffer = SampleBuffer::new(samples, sample_rate, channels);
    log::debug!(
        "decoded {}: {} frames, {} Hz, {} ch",
        path.display(),
        buffer.frames(),
        sample_rate,
        channels
    );
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_fixture(path: &Path, channels: u16, sample_rate: u32, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
        for &sample in samples {
            writer.write_sample(sample).expect("write sample");
        }
        writer.finalize().expect("finalize");
    }

    #[test]
    fn test_decode_stereo_wav() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("stereo.wav");
        write_fixture(&path, 2, 48000, &[0, 16384, -16384, 32767, 0, 0]);

        let buffer = decode_file(&path).expect("decode");

        assert_eq!(buffer.sample_rate(), 48000);
        assert_eq!(buffer.channels(), 2);
        assert_eq!(buffer.frames(), 3);
        assert!((buffer.samples()[1] - 0.5).abs() < 1e-3);
        assert!((buffer.samples()[2] + 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_decode_mono_wav() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("mono.wav");
        write_fixture(&path, 1, 22050, &[1000; 441]);

        let buffer = decode_file(&path).expect("decode");

        assert_eq!(buffer.channels(), 1);
        assert_eq!(buffer.frames(), 441);
        assert!((buffer.duration_secs() - 0.02).abs() < 1e-9);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().expect("tempdir");
        let err = decode_file(&dir.path().join("absent.wav")).unwrap_err();
        assert!(err.to_string().contains("failed to open"));
    }

    #[test]
    fn test_garbage_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("noise.wav");
        std::fs::write(&path, b"definitely not audio").expect("write");

        assert!(decode_file(&path).is_err());
    }
}
