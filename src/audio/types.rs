use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default trim limit: 2 minutes and 32 seconds
pub const DEFAULT_MAX_DURATION_MS: u64 = 152_000;

/// Extensions picked up by the directory scanner, without the leading dot
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "ogg", "m4a", "aac", "wma"];

/// Suffix inserted before the extension in copy mode
pub const DEFAULT_COPY_SUFFIX: &str = "_trimmed";

/// How the source stored its samples, so WAV output can match it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcmEncoding {
    /// Signed or unsigned integer PCM of the given bit depth
    Int(u16),
    /// IEEE float PCM
    Float,
}

/// Decoded audio for one file, held in memory as PCM samples
///
/// Samples are stored interleaved: [L, R, L, R, ...] for stereo
/// or [M, M, M, ...] for mono, where each sample is a 32-bit float
/// in the range [-1.0, 1.0]
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// PCM audio samples as 32-bit floats, interleaved by channel
    pub samples: Vec<f32>,

    /// Sample rate in Hz (e.g., 44100, 48000)
    pub sample_rate: u32,

    /// Number of audio channels (1 = mono, 2 = stereo)
    pub channels: u16,

    /// Sample representation of the decoded stream
    pub encoding: PcmEncoding,

    /// Lowercase file extension the buffer was decoded from (e.g. "mp3")
    pub format: String,
}

impl AudioBuffer {
    /// Get the number of audio frames (one sample per channel)
    pub fn frame_count(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Duration in whole milliseconds, rounded to the nearest millisecond
    pub fn duration_ms(&self) -> u64 {
        frames_to_ms(self.frame_count() as u64, self.sample_rate)
    }
}

/// Frames to whole milliseconds, rounded to the nearest millisecond
pub fn frames_to_ms(frames: u64, sample_rate: u32) -> u64 {
    if sample_rate == 0 {
        return 0;
    }
    let rate = u64::from(sample_rate);
    (frames * 1000 + rate / 2) / rate
}

/// Limit applied to every file in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimPolicy {
    pub max_duration_ms: u64,
}

impl TrimPolicy {
    pub fn new(max_duration_ms: u64) -> Self {
        Self { max_duration_ms }
    }
}

impl Default for TrimPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DURATION_MS)
    }
}

/// Where results are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Replace the original file
    Overwrite,
    /// Write `<name>_trimmed<ext>` beside the original
    Copy,
}

impl OutputMode {
    pub fn overwrites(self) -> bool {
        matches!(self, OutputMode::Overwrite)
    }
}

/// One unit of work produced by the scanner
///
/// `output_path == input_path` exactly when `overwrite` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub overwrite: bool,
}

impl FileTask {
    /// File name of the input, for status lines
    pub fn display_name(&self) -> String {
        self.input_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input_path.display().to_string())
    }
}

/// Result of evaluating one decoded file against the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// At or under the limit; nothing was written
    Skipped { duration_ms: u64 },
    /// Over the limit; the truncated audio was written to the output path
    Trimmed { original_ms: u64, trimmed_ms: u64 },
}
