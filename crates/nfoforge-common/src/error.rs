//! Errors raised when parsing the string forms of shared enums.

/// A string did not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Unknown video category selector.
    #[error("Unsupported video type: {0}")]
    VideoCategory(String),

    /// Unknown list filter.
    #[error("Unsupported status filter: {0}")]
    StatusFilter(String),
}
