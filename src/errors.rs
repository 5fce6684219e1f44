/*!
 * Error types for the lyrilex engine.
 *
 * Parsing-level problems (`SubtitleError`, `DictionaryError`) are recovered
 * where they happen and only logged and counted. Structural problems
 * (`ConfigurationError`) propagate up to the playback session, which is the
 * only layer that may declare itself failed.
 */

use thiserror::Error;

/// Errors produced while reading a lyric payload. Always recovered per entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubtitleError {
    /// An entry could not be parsed and was skipped
    #[error("Malformed payload at line {line}: {reason}")]
    MalformedPayload {
        /// 1-based line number of the offending entry
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// A single time stamp token could not be converted to milliseconds
    #[error("Malformed timestamp '{timestamp}': {reason}")]
    MalformedTimestamp {
        /// The token as it appeared in the payload
        timestamp: String,
        /// What was wrong with it
        reason: String,
    },
}

/// Errors produced while reading a dictionary source. Always recovered per record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DictionaryError {
    /// A record could not be parsed and was skipped
    #[error("Malformed dictionary record {record} in '{dictionary}': {reason}")]
    MalformedRecord {
        /// Dictionary being loaded
        dictionary: String,
        /// 1-based record (or line) number
        record: usize,
        /// What was wrong with it
        reason: String,
    },
}

/// Errors caused by asking for a language the engine does not know
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The tag is well formed but no language definition is registered for it
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    /// The tag is not a usable language code at all
    #[error("Invalid language tag: {0}")]
    InvalidLanguageTag(String),
}

/// Errors surfaced by the playback session
#[derive(Error, Debug)]
pub enum SessionError {
    /// Language setup failed
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The requested operation is not allowed in the current state
    #[error("Invalid session transition: {from} -> {to}")]
    InvalidTransition {
        /// State the session was in
        from: String,
        /// State that was requested
        to: String,
    },

    /// The background loading task did not complete
    #[error("Session loading failed: {0}")]
    Loading(String),

    /// An external collaborator could not deliver a payload
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// The session has already been disposed
    #[error("Session has been disposed")]
    Disposed,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from dictionary loading
    #[error("Dictionary error: {0}")]
    Dictionary(#[from] DictionaryError),

    /// Error from language configuration
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Error from the playback session
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
