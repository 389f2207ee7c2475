use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{Error, Result};
use crate::resample::resample;

/// Minimum usable duration for enrollment or meeting audio.
pub const MIN_DURATION_SECS: f64 = 0.5;

/// Decode a 16-bit PCM WAV file into normalized mono samples.
///
/// Multi-channel audio keeps the first (left) channel of each interleaved
/// frame. Samples are scaled by 1/32768, matching librosa's loader; models
/// trained against that convention require it exactly.
pub fn read_wav<P: AsRef<Path>>(file_path: P) -> Result<(Vec<f32>, u32)> {
    let mut reader = WavReader::open(file_path)?;
    let spec = reader.spec();
    if spec.bits_per_sample != 16 || spec.sample_format != SampleFormat::Int {
        return Err(Error::UnsupportedFormat(format!(
            "{}-bit {:?}",
            spec.bits_per_sample, spec.sample_format
        )));
    }

    let channels = spec.channels.max(1) as usize;
    let samples = reader
        .samples::<i16>()
        .step_by(channels)
        .map(|s| s.map(|s| s as f32 / 32768.0))
        .collect::<std::result::Result<Vec<f32>, _>>()?;

    if samples.is_empty() {
        return Err(Error::EmptyAudio);
    }

    Ok((samples, spec.sample_rate))
}

/// Encode mono samples as a 16-bit PCM WAV file.
///
/// Floats are clamped to [-1, 1], scaled by 32767, and truncated toward
/// zero, like soundfile's PCM16 writer. The 32768-decode / 32767-encode
/// asymmetry is intentional; do not "fix" it.
pub fn write_wav<P: AsRef<Path>>(file_path: P, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(file_path, spec)?;
    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        let pcm = ((clamped * 32767.0) as i32).clamp(-32768, 32767) as i16;
        writer.write_sample(pcm)?;
    }
    writer.finalize()?;

    Ok(())
}

/// Load a WAV file and normalize it to `target_rate` mono samples.
pub fn load_audio<P: AsRef<Path>>(file_path: P, target_rate: u32) -> Result<(Vec<f32>, u32)> {
    let (samples, sample_rate) = read_wav(file_path)?;
    let samples = resample(samples, sample_rate, target_rate);
    if samples.is_empty() {
        return Err(Error::EmptyAudio);
    }

    let duration = samples.len() as f64 / target_rate as f64;
    if duration < MIN_DURATION_SECS {
        return Err(Error::AudioTooShort {
            duration,
            min: MIN_DURATION_SECS,
        });
    }

    Ok((samples, target_rate))
}
