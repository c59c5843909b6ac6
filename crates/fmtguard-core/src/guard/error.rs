//! Guard failure taxonomy.

use std::io;

use thiserror::Error;

use super::types::NativeType;

/// Why a guarded print did not complete.
///
/// The first four variants are call-site programming errors detected before
/// any formatting happens. `Output` is a sink that failed to take the text.
#[derive(Debug, Error)]
pub enum FormatError {
    /// More directives than arguments, or a stray `%` after the last one.
    #[error("Invalid format: Bad format.")]
    BadFormat,
    /// A `%` with no recognizable conversion character.
    #[error("Invalid format: Has no specifier.")]
    NoSpecifier,
    /// More arguments than directives.
    #[error("Invalid format: Too few format specifiers.")]
    TooFewSpecifiers,
    /// An argument whose type does not convert to what its directive demands.
    #[error("Invalid format: {actual} => {required}.")]
    TypeMismatch {
        actual: NativeType,
        required: NativeType,
    },
    #[error("output failed: {0}")]
    Output(#[from] io::Error),
}

impl FormatError {
    /// True for the validation failures, false for sink I/O failures.
    #[must_use]
    pub fn is_invalid_format(&self) -> bool {
        !matches!(self, Self::Output(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::types::ScalarType;

    #[test]
    fn messages_follow_the_invalid_format_shape() {
        assert_eq!(FormatError::BadFormat.to_string(), "Invalid format: Bad format.");
        assert_eq!(
            FormatError::NoSpecifier.to_string(),
            "Invalid format: Has no specifier."
        );
        assert_eq!(
            FormatError::TooFewSpecifiers.to_string(),
            "Invalid format: Too few format specifiers."
        );
        let mismatch = FormatError::TypeMismatch {
            actual: NativeType::Scalar(ScalarType::Int),
            required: NativeType::NARROW_STR,
        };
        assert_eq!(mismatch.to_string(), "Invalid format: int => const char*.");
    }

    #[test]
    fn output_errors_are_not_format_errors() {
        let err = FormatError::from(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        assert!(!err.is_invalid_format());
        assert_eq!(err.to_string(), "output failed: closed");
        assert!(FormatError::BadFormat.is_invalid_format());
    }
}
