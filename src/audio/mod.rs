// src/audio/mod.rs

pub mod decoder;
pub mod encoder;
pub mod trim;
pub mod types;

// Re-export commonly used items
pub use decoder::decode_audio_file;
pub use encoder::{encode_audio, encode_wav, EncoderConfig};
pub use trim::{apply_policy, format_duration, is_wav_file, trim_wav_direct, truncate};
pub use types::{AudioBuffer, FileTask, Outcome, OutputMode, PcmEncoding, TrimPolicy};
