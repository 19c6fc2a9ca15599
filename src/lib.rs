pub mod audio;
pub mod error;
pub mod pipeline;
pub mod scanner;

// Re-export for convenience
pub use audio::*;
pub use error::{AudioError, FileError, Result};
pub use pipeline::{process_directory, process_task, BatchSummary, FileReport, TrimConfig};
pub use scanner::{scan_directory, ScanConfig};
