// src/pipeline.rs

use std::fmt;
use std::path::Path;

use hound::WavReader;
use serde::Serialize;
use serde_json::json;

use crate::audio::{
    apply_policy, decode_audio_file, encode_audio, format_duration, is_wav_file, trim_wav_direct,
};
use crate::audio::{EncoderConfig, FileTask, Outcome, OutputMode, TrimPolicy};
use crate::error::{FileError, Result};
use crate::scanner::{scan_directory, ScanConfig};

/// Everything a run needs, passed explicitly to each stage
#[derive(Debug, Clone, Default)]
pub struct TrimConfig {
    pub policy: TrimPolicy,
    pub scan: ScanConfig,
    pub encoder: EncoderConfig,
}

/// Decode, evaluate and (when over the limit) write one file
///
/// Files at or under the limit are never rewritten, so their bytes stay
/// exactly as they were. WAV to WAV is cut in the stored sample format;
/// WAV variants hound cannot read go through the general decoder.
pub fn process_task(task: &FileTask, config: &TrimConfig) -> std::result::Result<Outcome, FileError> {
    if is_wav_file(&task.input_path) && is_wav_file(&task.output_path) {
        match WavReader::open(&task.input_path) {
            Ok(reader) => return trim_wav_direct(reader, &task.output_path, &config.policy),
            Err(e) => tracing::debug!(
                "hound cannot read {} ({}), decoding with symphonia",
                task.input_path.display(),
                e
            ),
        }
    }

    let mut audio = decode_audio_file(&task.input_path).map_err(FileError::Decode)?;

    let outcome = apply_policy(&mut audio, &config.policy);

    if let Outcome::Trimmed { .. } = outcome {
        encode_audio(&audio, &task.output_path, &config.encoder).map_err(FileError::Encode)?;
    }

    Ok(outcome)
}

/// Result for one file, in the order the scanner produced it
#[derive(Debug)]
pub struct FileReport {
    pub task: FileTask,
    pub result: std::result::Result<Outcome, FileError>,
}

impl FileReport {
    /// Machine-readable form for `--report json`
    pub fn to_json(&self) -> serde_json::Value {
        let mut value = match &self.result {
            Ok(outcome) => serde_json::to_value(outcome).unwrap_or_default(),
            Err(err) => json!({
                "status": "failed",
                "kind": err.kind(),
                "error": err.to_string(),
            }),
        };

        if let Some(map) = value.as_object_mut() {
            map.insert(
                "file".to_string(),
                self.task.input_path.to_string_lossy().into_owned().into(),
            );
            map.insert(
                "output".to_string(),
                self.task.output_path.to_string_lossy().into_owned().into(),
            );
        }

        value
    }
}

/// Human-readable status line
impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.task.display_name();
        match &self.result {
            Ok(Outcome::Trimmed {
                original_ms,
                trimmed_ms,
            }) => write!(
                f,
                "Trimmed '{}' from {} to {}.",
                name,
                format_duration(*original_ms),
                format_duration(*trimmed_ms)
            ),
            Ok(Outcome::Skipped { duration_ms }) => write!(
                f,
                "Skipped '{}' (duration {} is under the limit).",
                name,
                format_duration(*duration_ms)
            ),
            Err(err) => write!(f, "Error processing '{}': {}", name, err),
        }
    }
}

/// Counts for a finished batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub trimmed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.trimmed + self.skipped + self.failed
    }

    fn record(&mut self, result: &std::result::Result<Outcome, FileError>) {
        match result {
            Ok(Outcome::Trimmed { .. }) => self.trimmed += 1,
            Ok(Outcome::Skipped { .. }) => self.skipped += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// Trim every matching file in `directory`, one at a time
///
/// `on_file` sees each report as soon as that file is done. A missing or
/// non-directory path fails before any file is touched; per-file failures
/// are reported and the batch carries on.
///
/// # Example
/// ```no_run
/// use trim_audio_lib::{process_directory, OutputMode, TrimConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let summary = process_directory("music", OutputMode::Copy, &TrimConfig::default(), |report| {
///     println!("{}", report);
/// })?;
/// println!("{} trimmed", summary.trimmed);
/// # Ok(())
/// # }
/// ```
pub fn process_directory<P, F>(
    directory: P,
    mode: OutputMode,
    config: &TrimConfig,
    mut on_file: F,
) -> Result<BatchSummary>
where
    P: AsRef<Path>,
    F: FnMut(&FileReport),
{
    let directory = directory.as_ref();
    let mut summary = BatchSummary::default();

    for task in scan_directory(directory, mode, &config.scan)? {
        let result = process_task(&task, config);

        match &result {
            Ok(Outcome::Trimmed {
                original_ms,
                trimmed_ms,
            }) => tracing::info!(
                "Trimmed {} ({} ms -> {} ms) into {}",
                task.input_path.display(),
                original_ms,
                trimmed_ms,
                task.output_path.display()
            ),
            Ok(Outcome::Skipped { duration_ms }) => {
                tracing::debug!("Left {} alone ({} ms)", task.input_path.display(), duration_ms)
            }
            Err(FileError::Decode(e)) => {
                tracing::warn!("Could not decode {}: {}", task.input_path.display(), e)
            }
            Err(FileError::Encode(e)) => {
                tracing::error!("Could not write {}: {}", task.output_path.display(), e)
            }
        }

        summary.record(&result);
        on_file(&FileReport { task, result });
    }

    tracing::info!(
        "Processed {} file(s): {} trimmed, {} skipped, {} failed",
        summary.total(),
        summary.trimmed,
        summary.skipped,
        summary.failed
    );

    Ok(summary)
}
