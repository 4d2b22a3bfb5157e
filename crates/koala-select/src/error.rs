//! Error types for selector parsing and the native query seam.

/// A selector that cannot be parsed.
///
/// Every variant is a syntax error: the message keeps the familiar
/// `Syntax error, unrecognized expression: …` wording so callers that
/// surface it to users see one consistent shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    /// Text that no predicate or combinator rule accepts.
    #[error("Syntax error, unrecognized expression: {0}")]
    Unrecognized(String),

    /// An unclosed bracket, parenthesis, quote, or trailing escape.
    #[error("Syntax error, unrecognized expression: {0} (unterminated)")]
    Unterminated(String),

    /// A pseudo-class name outside the supported table.
    #[error("Syntax error, unrecognized expression: unsupported pseudo: {0}")]
    UnknownPseudoClass(String),

    /// A pseudo-class that needs an argument was written without one.
    #[error("Syntax error, unrecognized expression: :{0} requires an argument")]
    MissingArgument(String),

    /// A pseudo-class that takes no argument was given one.
    #[error("Syntax error, unrecognized expression: :{0} takes no argument")]
    UnexpectedArgument(String),
}

impl SelectorError {
    /// The offending expression fragment.
    #[must_use]
    pub fn expression(&self) -> &str {
        match self {
            Self::Unrecognized(expr)
            | Self::Unterminated(expr)
            | Self::UnknownPseudoClass(expr)
            | Self::MissingArgument(expr)
            | Self::UnexpectedArgument(expr) => expr,
        }
    }
}

/// Result alias for selector operations.
pub type Result<T> = std::result::Result<T, SelectorError>;

/// Failure reported by a [`NativeQuery`](crate::NativeQuery) delegate.
///
/// The engine never propagates these; it logs them and falls back to full
/// evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NativeQueryError {
    /// The delegate refuses this selector.
    #[error("native query rejected `{0}`")]
    Rejected(String),

    /// The delegate accepted the selector but failed while running it.
    #[error("native query failed: {0}")]
    Failed(String),
}
