//! Argument validator.

use super::args::Arg;
use super::error::FormatError;
use super::scanner::Scanner;

/// Check `args` against the directives of `fmt`, stopping at the first problem.
///
/// Each argument is paired with the next directive in order. Leftover
/// arguments yield [`FormatError::TooFewSpecifiers`]; leftover directives
/// yield [`FormatError::BadFormat`].
pub fn validate(fmt: &str, args: &[Arg<'_>]) -> Result<(), FormatError> {
    let mut scanner = Scanner::new(fmt.as_bytes());
    for arg in args {
        let spec = scanner
            .next_specifier()?
            .ok_or(FormatError::TooFewSpecifiers)?;
        let actual = arg.native_type();
        if !actual.converts_to(spec.required) {
            return Err(FormatError::TypeMismatch {
                actual,
                required: spec.required,
            });
        }
    }
    scanner.finish()
}
