use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all specfold operations.
#[derive(Debug, Error, Diagnostic)]
pub enum SpecError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed constraint text (missing name, unknown operator, bad version).
    #[error("Invalid requirement `{input}`: {message}")]
    #[diagnostic(help("Expected `<name>[<op><version>[,<op><version>...]]` with op one of ==, !=, >=, <=, >, <"))]
    Parse { input: String, message: String },

    /// The merged constraints for a package describe an empty version range.
    #[error("Conflicting requirements for {package}: {message}")]
    #[diagnostic(help("Relax or remove one of the listed requirements"))]
    Conflict { package: String, message: String },

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl SpecError {
    /// Shorthand for building a [`SpecError::Parse`].
    pub fn parse(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Returns `true` for conflicts detected during normalization.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Convenience alias for results carrying a [`SpecError`].
pub type SpecResult<T> = Result<T, SpecError>;
