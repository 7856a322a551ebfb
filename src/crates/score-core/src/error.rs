/// Errors raised while turning extracted tokens into numeric features
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureError {
    #[error("instrument group '{0}' has no processable events")]
    EmptyGroup(String),

    #[error("code {code} is not present in the mapping ({len} codes assigned)")]
    UnknownCode { code: u32, len: usize },

    #[error("token '{0}' appears more than once in the inverse mapping")]
    DuplicateToken(String),

    #[error("invalid feature range [{lower}, {upper}]")]
    InvalidRange { lower: f64, upper: f64 },

    #[error("cannot fit scaler: {0}")]
    Fit(String),

    #[error("vocabulary exceeds the u32 code space")]
    VocabularyOverflow,
}

pub type Result<T> = std::result::Result<T, FeatureError>;

/// A single score element that could not be turned into a token.
///
/// The element is skipped; the rest of its file is still processed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("element {index} (instrument {instrument}): {reason}")]
pub struct ElementError {
    /// Position of the element in its score's traversal order
    pub index: usize,
    /// Instrument that was current when the element was reached
    pub instrument: String,
    pub reason: String,
}
