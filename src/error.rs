//! Error types for the lip-sync pipeline.

/// Top-level error type for the lip-sync system.
#[derive(Debug, thiserror::Error)]
pub enum LipSyncError {
    /// Timeline construction error (bad duration, malformed input).
    #[error("timeline error: {0}")]
    Timeline(String),

    /// Phoneme extraction error.
    #[error("phoneme error: {0}")]
    Phoneme(String),

    /// Playback engine error.
    #[error("playback error: {0}")]
    Playback(String),

    /// Audio player error surfaced through the event channel.
    #[error("audio error: {0}")]
    Audio(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, LipSyncError>;
