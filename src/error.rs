use std::path::PathBuf;

use thiserror::Error;

/// All possible errors that can occur while trimming audio
#[derive(Debug, Error)]
pub enum AudioError {
    /// Failed to open or read the audio file from disk
    #[error("Failed to open audio file '{path}': {source}")]
    FileOpen {
        path: String,
        source: std::io::Error,
    },

    /// The target directory is missing or is not a directory
    #[error("The directory '{}' does not exist or is not a directory.", .0.display())]
    InvalidDirectory(PathBuf),

    /// No encoder is known for the requested output format
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// Error occurred while decoding the audio data
    #[error("Audio decoding failed: {0}")]
    DecodeFailed(String),

    /// Error occurred while encoding the output file
    #[error("Audio encoding failed: {0}")]
    EncodeFailed(String),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from hound WAV encoder
    #[error("Hound WAV error: {0}")]
    Hound(#[from] hound::Error),
}

/// Failure of a single file; the rest of the batch keeps going
#[derive(Debug, Error)]
pub enum FileError {
    #[error("{0}")]
    Decode(#[source] AudioError),

    #[error("{0}")]
    Encode(#[source] AudioError),
}

impl FileError {
    /// Short tag used in machine-readable reports
    pub fn kind(&self) -> &'static str {
        match self {
            FileError::Decode(_) => "decode",
            FileError::Encode(_) => "encode",
        }
    }
}

/// Convenient Result type that uses our AudioError
pub type Result<T> = std::result::Result<T, AudioError>;
