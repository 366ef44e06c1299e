//! Error types for deck generation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while interpreting a deck configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// An input file (configuration, numeric source, template) could not be opened.
    #[error("Failed to open {}: {source}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input parsed badly: malformed JSON, missing keys, or no usable numbers.
    #[error("Malformed data in {}: {message}", path.display())]
    DataFormat { path: PathBuf, message: String },

    /// A slide descriptor's payload does not match its declared kind. An
    /// unrecognized kind carries the `UnknownKind` error as its source.
    #[error("Invalid slide {index} ({kind}): {message}")]
    Validation {
        index: usize,
        kind: String,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// The slide kind is not one of the recognized kinds.
    #[error("Unknown slide kind '{0}'")]
    UnknownKind(String),

    /// A parameter was rejected before any work was done.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An output file (chart image or deck) could not be persisted.
    #[error("Failed to write {}: {message}", path.display())]
    ArtifactWrite { path: PathBuf, message: String },

    /// A slide failed while being rendered.
    #[error("Slide {index} ({kind}) failed to render: {source}")]
    Render {
        index: usize,
        kind: String,
        #[source]
        source: Box<Error>,
    },

    /// A rendering collaborator reported a failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl Error {
    /// Shorthand for a `DataFormat` error.
    pub fn data_format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::DataFormat {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a `Validation` error without a source.
    pub fn validation(index: usize, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            index,
            kind: kind.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for an `ArtifactWrite` error.
    pub fn artifact_write(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::ArtifactWrite {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
