//! Version parse errors.

/// A version string that cannot be placed in the total order.
///
/// Parsing never guesses: anything outside the grammar is rejected with the
/// offending input so callers can report it and abort.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedVersionError {
    #[error("version string is empty")]
    Empty,

    #[error("version '{input}' must start with a numeric component")]
    MissingNumericPrefix { input: String },

    #[error("version '{input}' has an empty component at byte {position}")]
    EmptyComponent { input: String, position: usize },

    #[error("version '{input}' has a component that does not fit in 64 bits")]
    ComponentOverflow { input: String },

    #[error("version '{input}' has an empty qualifier")]
    EmptyQualifier { input: String },

    #[error("version '{input}' contains invalid character {character:?} at byte {position}")]
    InvalidCharacter {
        input: String,
        character: char,
        position: usize,
    },
}

impl MalformedVersionError {
    /// The rejected input, if any.
    pub fn input(&self) -> &str {
        match self {
            MalformedVersionError::Empty => "",
            MalformedVersionError::MissingNumericPrefix { input }
            | MalformedVersionError::EmptyComponent { input, .. }
            | MalformedVersionError::ComponentOverflow { input }
            | MalformedVersionError::EmptyQualifier { input }
            | MalformedVersionError::InvalidCharacter { input, .. } => input,
        }
    }
}
