// src/audio/trim.rs

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Read;
use std::path::Path;

use crate::audio::decoder::extension_of;
use crate::audio::types::{frames_to_ms, AudioBuffer, Outcome, TrimPolicy};
use crate::error::{AudioError, FileError};

/// Apply the policy to a decoded buffer
///
/// Buffers at or under the limit are left untouched. Longer buffers keep
/// only the frames in `[0, max_duration_ms)` and the rest is dropped.
///
/// # Example
/// ```
/// use trim_audio_lib::audio::{apply_policy, AudioBuffer, Outcome, PcmEncoding, TrimPolicy};
///
/// // 3 seconds of stereo at 8kHz
/// let mut audio = AudioBuffer {
///     samples: vec![0.5; 48000],
///     sample_rate: 8000,
///     channels: 2,
///     encoding: PcmEncoding::Float,
///     format: "wav".to_string(),
/// };
///
/// let outcome = apply_policy(&mut audio, &TrimPolicy::new(2000));
///
/// assert_eq!(outcome, Outcome::Trimmed { original_ms: 3000, trimmed_ms: 2000 });
/// assert_eq!(audio.samples.len(), 32000);
/// ```
pub fn apply_policy(audio: &mut AudioBuffer, policy: &TrimPolicy) -> Outcome {
    let original_ms = audio.duration_ms();

    if original_ms <= policy.max_duration_ms {
        return Outcome::Skipped {
            duration_ms: original_ms,
        };
    }

    truncate(audio, policy.max_duration_ms);

    Outcome::Trimmed {
        original_ms,
        trimmed_ms: audio.duration_ms(),
    }
}

/// Drop everything after the first `max_ms` milliseconds
///
/// The cut is aligned to a frame boundary so channels stay interleaved.
pub fn truncate(audio: &mut AudioBuffer, max_ms: u64) {
    let keep_samples = usize::try_from(frames_for_ms(max_ms, audio.sample_rate))
        .unwrap_or(usize::MAX)
        .saturating_mul(audio.channels as usize);

    audio.samples.truncate(keep_samples);
}

/// Whole frames that fit in `ms` milliseconds
fn frames_for_ms(ms: u64, sample_rate: u32) -> u64 {
    // Formula: frame_index = ms × sample_rate / 1000
    ms.saturating_mul(u64::from(sample_rate)) / 1000
}

/// Check if a file is a WAV file by examining its extension
pub fn is_wav_file<P: AsRef<Path>>(path: P) -> bool {
    extension_of(path.as_ref()) == "wav"
}

/// Apply the policy to a WAV file without converting its samples
///
/// Samples are copied in their stored representation, so the kept prefix
/// is bit-identical at every integer depth. Files at or under the limit are
/// not written.
pub fn trim_wav_direct<R: Read>(
    reader: WavReader<R>,
    output_path: &Path,
    policy: &TrimPolicy,
) -> Result<Outcome, FileError> {
    let spec = reader.spec();
    let frames = u64::from(reader.duration());
    let original_ms = frames_to_ms(frames, spec.sample_rate);

    if original_ms <= policy.max_duration_ms {
        return Ok(Outcome::Skipped {
            duration_ms: original_ms,
        });
    }

    let keep_frames = frames_for_ms(policy.max_duration_ms, spec.sample_rate).min(frames);
    let keep_samples = keep_frames as usize * spec.channels as usize;

    match spec.sample_format {
        SampleFormat::Float => copy_prefix::<f32, R>(reader, spec, keep_samples, output_path)?,
        SampleFormat::Int => copy_prefix::<i32, R>(reader, spec, keep_samples, output_path)?,
    }

    Ok(Outcome::Trimmed {
        original_ms,
        trimmed_ms: frames_to_ms(keep_frames, spec.sample_rate),
    })
}

fn copy_prefix<S: hound::Sample, R: Read>(
    mut reader: WavReader<R>,
    spec: WavSpec,
    count: usize,
    output_path: &Path,
) -> Result<(), FileError> {
    let samples = reader
        .samples::<S>()
        .take(count)
        .collect::<Result<Vec<S>, _>>()
        .map_err(|e| {
            FileError::Decode(AudioError::DecodeFailed(format!("Failed to read samples: {}", e)))
        })?;
    // Overwrite mode writes to the file being read
    drop(reader);

    let mut writer =
        WavWriter::create(output_path, spec).map_err(|e| FileError::Encode(e.into()))?;
    for sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| FileError::Encode(e.into()))?;
    }
    writer.finalize().map_err(|e| FileError::Encode(e.into()))?;

    Ok(())
}

/// Format milliseconds as `M:SS`, truncating partial seconds
///
/// Minutes are not wrapped into hours.
pub fn format_duration(milliseconds: u64) -> String {
    let seconds = milliseconds / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
