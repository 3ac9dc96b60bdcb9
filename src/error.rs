use std::fmt;

use thiserror::Error;

/// Why a version string could not be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The text does not start with `v?<n>.<n>.<n>`
    InvalidFormat,
    /// A numeric component matched but does not fit the component type
    InvalidComponent,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::InvalidFormat => write!(f, "invalid version format"),
            ParseErrorKind::InvalidComponent => write!(f, "invalid version component"),
        }
    }
}

/// Unified error type for bump operations
#[derive(Error, Debug)]
pub enum BumpError {
    #[error("not a git repository")]
    NotARepository,

    #[error("{kind}: '{input}'")]
    Parse { kind: ParseErrorKind, input: String },

    #[error("invalid version type: {0} (must be patch, minor, or major)")]
    InvalidBumpKind(String),

    #[error("tag {0} already exists")]
    TagAlreadyExists(String),

    #[error("cannot apply {0}: version component out of range")]
    VersionOutOfRange(String),

    #[error("invalid git tag format: {0}")]
    InvalidTagFormat(String),

    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("{operation} failed: {message}")]
    Backend { operation: String, message: String },

    #[error("prompt aborted: {0}")]
    PromptAborted(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in bump
pub type Result<T> = std::result::Result<T, BumpError>;

impl BumpError {
    /// Create a parse error for the given input
    pub fn parse(kind: ParseErrorKind, input: impl Into<String>) -> Self {
        BumpError::Parse {
            kind,
            input: input.into(),
        }
    }

    /// Wrap a backend failure with the operation that produced it
    pub fn backend(operation: impl Into<String>, message: impl fmt::Display) -> Self {
        BumpError::Backend {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        BumpError::Config(msg.into())
    }

    /// The parse failure kind, if this is a parse error
    pub fn parse_kind(&self) -> Option<ParseErrorKind> {
        match self {
            BumpError::Parse { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<inquire::InquireError> for BumpError {
    fn from(error: inquire::InquireError) -> Self {
        BumpError::PromptAborted(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BumpError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BumpError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_backend_error_names_operation() {
        let err = BumpError::backend("push tag v1.0.0", "remote rejected");
        assert_eq!(err.to_string(), "push tag v1.0.0 failed: remote rejected");
    }

    #[test]
    fn test_parse_error_kind() {
        let err = BumpError::parse(ParseErrorKind::InvalidFormat, "1.2");
        assert_eq!(err.parse_kind(), Some(ParseErrorKind::InvalidFormat));
        assert!(err.to_string().contains("'1.2'"));
        assert_eq!(BumpError::NotARepository.parse_kind(), None);
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (BumpError::TagAlreadyExists("v1.0.0".into()), "tag v1.0.0"),
            (BumpError::InvalidTagFormat("a b".into()), "invalid git tag"),
            (BumpError::InvalidBumpKind("huge".into()), "invalid version type"),
            (BumpError::PromptAborted("eof".into()), "prompt aborted"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }

    #[test]
    fn test_inquire_error_becomes_prompt_aborted() {
        let err: BumpError = inquire::InquireError::OperationCanceled.into();
        assert!(matches!(err, BumpError::PromptAborted(_)));
    }
}
