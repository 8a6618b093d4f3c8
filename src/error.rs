/// Unified error types for the image localizer
use thiserror::Error;

/// Main error type for localization operations
///
/// None of these ever reach the document-level caller: the pipeline turns
/// every one of them into "keep the original reference".
#[derive(Error, Debug)]
pub enum LocalizerError {
    /// Network or protocol errors while downloading an image
    #[error("Fetch failed for {link}: {reason}")]
    Fetch { link: String, reason: String },

    /// The downloaded bytes are not a recognizable image type
    #[error("Unknown content type for {0}")]
    UnknownContentType(String),

    /// Storage adapter errors (exists/read/write)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Every candidate name under a base name was taken by different content
    #[error("No free file name for '{base}' after {attempts} attempts")]
    NameSpaceExhausted { base: String, attempts: usize },

    /// The chosen file kept appearing between existence check and write
    #[error("File name kept being taken by other writers after {attempts} attempts")]
    WriteConflict { attempts: usize },

    /// Validation errors (configuration, paths)
    #[error("Validation error: {0}")]
    Validation(String),
}

impl LocalizerError {
    /// Build a fetch error for a link
    pub fn fetch(link: &str, reason: impl std::fmt::Display) -> Self {
        Self::Fetch {
            link: link.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for localizer operations
pub type LocalizerResult<T> = Result<T, LocalizerError>;
