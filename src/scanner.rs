// src/scanner.rs

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::audio::types::{FileTask, OutputMode, DEFAULT_COPY_SUFFIX, SUPPORTED_EXTENSIONS};
use crate::error::{AudioError, Result};

/// Which directory entries to pick up and how copies are named
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Lowercase extensions without the leading dot
    pub extensions: Vec<String>,
    /// Inserted between the file stem and its extension in copy mode
    pub copy_suffix: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: SUPPORTED_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            copy_suffix: DEFAULT_COPY_SUFFIX.to_string(),
        }
    }
}

impl ScanConfig {
    /// True when the lowercase file name ends with `.<ext>` for a known ext
    pub fn matches(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.extensions
            .iter()
            .any(|ext| lower.ends_with(&format!(".{}", ext)))
    }
}

/// List the audio files directly inside `directory`
///
/// Subdirectories are not entered. Entries come back in the order the
/// filesystem lists them, one task per matching name. Tasks are built as the
/// iterator is advanced.
///
/// # Example
/// ```no_run
/// use trim_audio_lib::{scan_directory, OutputMode, ScanConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// for task in scan_directory("music", OutputMode::Copy, &ScanConfig::default())? {
///     println!("{} -> {}", task.input_path.display(), task.output_path.display());
/// }
/// # Ok(())
/// # }
/// ```
pub fn scan_directory<'a, P: AsRef<Path>>(
    directory: P,
    mode: OutputMode,
    config: &'a ScanConfig,
) -> Result<impl Iterator<Item = FileTask> + 'a> {
    let directory = directory.as_ref();

    if !directory.is_dir() {
        return Err(AudioError::InvalidDirectory(directory.to_path_buf()));
    }

    // The listing is taken up front so copies written during the run are
    // not picked up as new inputs
    let entries: Vec<_> = fs::read_dir(directory)?.collect();
    tracing::debug!("Scanning {} ({} entries)", directory.display(), entries.len());

    Ok(entries.into_iter().filter_map(move |entry| {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable directory entry: {}", e);
                return None;
            }
        };

        let name = entry.file_name();
        if !config.matches(&name.to_string_lossy()) {
            return None;
        }

        let input_path = entry.path();
        Some(make_task(input_path, mode, &config.copy_suffix))
    }))
}

/// Build the task for one input file
pub fn make_task(input_path: PathBuf, mode: OutputMode, copy_suffix: &str) -> FileTask {
    let output_path = match mode {
        OutputMode::Overwrite => input_path.clone(),
        OutputMode::Copy => copy_path(&input_path, copy_suffix),
    };

    FileTask {
        input_path,
        output_path,
        overwrite: mode.overwrites(),
    }
}

/// `dir/song.mp3` becomes `dir/song<suffix>.mp3`
///
/// A name with no extension (including dotfiles such as `.mp3`) just gets
/// the suffix appended.
pub fn copy_path(input_path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = input_path
        .file_stem()
        .map(|stem| stem.to_os_string())
        .unwrap_or_default();
    name.push(suffix);

    if let Some(ext) = input_path.extension() {
        name.push(".");
        name.push(ext);
    }

    input_path.with_file_name(name)
}
