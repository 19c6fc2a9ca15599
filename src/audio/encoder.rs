// src/audio/encoder.rs

use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::audio::decoder::extension_of;
use crate::audio::types::{AudioBuffer, PcmEncoding};
use crate::error::{AudioError, Result};

/// Formats handed to ffmpeg, with the muxer each one needs
const FFMPEG_MUXERS: &[(&str, &str)] = &[
    ("mp3", "mp3"),
    ("flac", "flac"),
    ("ogg", "ogg"),
    ("m4a", "ipod"),
    ("aac", "adts"),
    ("wma", "asf"),
];

/// Settings for the external encoder used for compressed formats
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    /// ffmpeg executable, looked up on PATH when not absolute
    pub ffmpeg: PathBuf,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

/// Encode audio in the format named by the output path's extension
///
/// WAV is written natively; everything else goes through ffmpeg.
pub fn encode_audio<P: AsRef<Path>>(
    audio: &AudioBuffer,
    output_path: P,
    config: &EncoderConfig,
) -> Result<()> {
    let output_path = output_path.as_ref();
    let format = extension_of(output_path);

    if format == "wav" {
        return encode_wav(audio, output_path);
    }

    match FFMPEG_MUXERS.iter().find(|(ext, _)| *ext == format) {
        Some((_, muxer)) => encode_with_ffmpeg(audio, output_path, muxer, config),
        None => Err(AudioError::UnsupportedFormat(format)),
    }
}

/// Encode PCM audio data to a WAV file
///
/// Integer sources are written back at their original bit depth so
/// untouched samples come out bit-identical; everything else is written as
/// 32-bit float.
///
/// # Example
/// ```
/// use trim_audio_lib::audio::{encode_wav, AudioBuffer, PcmEncoding};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let audio = AudioBuffer {
///     samples: vec![0.0, 0.5, -0.5, 1.0, -1.0],
///     sample_rate: 44100,
///     channels: 1,
///     encoding: PcmEncoding::Float,
///     format: "wav".to_string(),
/// };
///
/// # let dir = tempfile::tempdir()?;
/// # let output_path = dir.path().join("output.wav");
/// encode_wav(&audio, &output_path)?;
/// # Ok(())
/// # }
/// ```
pub fn encode_wav<P: AsRef<Path>>(audio: &AudioBuffer, output_path: P) -> Result<()> {
    let bits = match audio.encoding {
        PcmEncoding::Int(bits @ (8 | 16 | 24 | 32)) => Some(bits),
        _ => None,
    };

    let spec = WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: bits.unwrap_or(32),
        sample_format: if bits.is_some() {
            SampleFormat::Int
        } else {
            SampleFormat::Float
        },
    };

    let mut writer = WavWriter::create(output_path, spec)?;

    match bits {
        Some(8) => {
            for &sample in &audio.samples {
                writer.write_sample(to_int(sample, 8) as i8)?;
            }
        }
        Some(16) => {
            for &sample in &audio.samples {
                writer.write_sample(to_int(sample, 16) as i16)?;
            }
        }
        Some(bits) => {
            for &sample in &audio.samples {
                writer.write_sample(to_int(sample, bits) as i32)?;
            }
        }
        None => {
            for &sample in &audio.samples {
                writer.write_sample(sample)?;
            }
        }
    }

    // Finalize the file (writes headers, etc.)
    writer.finalize()?;

    Ok(())
}

/// Scale a [-1.0, 1.0] sample to a signed integer of `bits` width
fn to_int(sample: f32, bits: u16) -> i64 {
    let full_scale = (1i64 << (bits - 1)) as f64;
    let value = (sample as f64 * full_scale).round();
    value.clamp(-full_scale, full_scale - 1.0) as i64
}

/// Pipe raw little-endian f32 PCM into ffmpeg and let it mux `output_path`
fn encode_with_ffmpeg(
    audio: &AudioBuffer,
    output_path: &Path,
    muxer: &str,
    config: &EncoderConfig,
) -> Result<()> {
    let mut cmd = Command::new(&config.ffmpeg);
    cmd.arg("-hide_banner")
        .arg("-loglevel")
        .arg("error")
        .arg("-y")
        .arg("-f")
        .arg("f32le") // 32-bit float, little endian
        .arg("-ar")
        .arg(audio.sample_rate.to_string())
        .arg("-ac")
        .arg(audio.channels.to_string())
        .arg("-i")
        .arg("pipe:0")
        .arg("-f")
        .arg(muxer)
        .arg(output_path);

    cmd.stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    tracing::debug!("Running FFmpeg: {:?}", cmd);

    let mut child = cmd
        .spawn()
        .map_err(|e| AudioError::EncodeFailed(format!("Failed to spawn FFmpeg: {}", e)))?;

    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| AudioError::EncodeFailed("Failed to capture FFmpeg stdin".to_string()))?;

    let mut input = BufWriter::new(stdin);
    let written = audio
        .samples
        .iter()
        .try_for_each(|sample| input.write_all(&sample.to_le_bytes()))
        .and_then(|_| input.flush());
    // Close stdin so ffmpeg sees end of stream
    drop(input);

    let output = child
        .wait_with_output()
        .map_err(|e| AudioError::EncodeFailed(format!("FFmpeg process error: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AudioError::EncodeFailed(format!(
            "FFmpeg exited with code {:?}: {}",
            output.status.code(),
            stderr.trim()
        )));
    }

    written.map_err(|e| AudioError::EncodeFailed(format!("Failed to feed FFmpeg: {}", e)))?;

    Ok(())
}
