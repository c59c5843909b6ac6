//! Type-checked printf.
//!
//! A call runs in three steps:
//!
//! 1. [`validate`] pairs each argument with the next directive of the format
//!    string and fails on the first mismatch, missing directive, or missing
//!    argument.
//! 2. [`format_two_pass`] measures the output, allocates exactly that much,
//!    and renders into it.
//! 3. The finished text goes to the caller's [`Sink`].
//!
//! Nothing is formatted or delivered when validation fails.

pub mod args;
pub mod error;
pub mod scanner;
pub mod sink;
pub mod table;
pub mod types;
pub mod validate;

use std::io;

use crate::config::GuardMode;
use crate::stdio::printf::{measure, vsnprintf};

pub use args::{Arg, ArgValue, CountSlot};
pub use error::FormatError;
pub use scanner::{Scanner, Specifier};
pub use sink::{Append, Sink, SinkKind, strout};
pub use table::required_type;
pub use types::{NativeType, Pointee, ScalarType};
pub use validate::validate;

/// Result of the two formatting passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formatted {
    /// Text to dispatch and its byte count.
    Text { text: String, count: i32 },
    /// A pass reported a non-positive length; nothing is dispatched.
    Suppressed(i32),
}

impl Formatted {
    /// Value a print call returns.
    #[must_use]
    pub fn count(&self) -> i32 {
        match self {
            Self::Text { count, .. } => *count,
            Self::Suppressed(n) => *n,
        }
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            Self::Suppressed(_) => None,
        }
    }
}

/// Measure, allocate, fill.
///
/// Both passes read the same borrowed `args`, so `%n` slots and every
/// value are observed identically.
pub fn format_two_pass(fmt: &str, args: &[Arg<'_>]) -> Formatted {
    let n = measure(fmt, args);
    if n <= 0 {
        return Formatted::Suppressed(n);
    }
    let mut buf = vec![0u8; n as usize];
    let n = vsnprintf(&mut buf, fmt, args);
    if n <= 0 {
        return Formatted::Suppressed(n);
    }
    buf.truncate(n as usize);
    // Every renderer emits whole UTF-8 sequences and `buf` holds the complete
    // output, so the bytes are delivered exactly as rendered.
    let Ok(text) = String::from_utf8(buf) else {
        return Formatted::Suppressed(-1);
    };
    Formatted::Text { text, count: n }
}

/// Validate, format, and deliver to `sink` in [`GuardMode::Strict`].
///
/// Returns the byte count of the delivered text, or the non-positive
/// length when nothing was produced.
pub fn print_to(sink: Sink<'_>, fmt: &str, args: &[Arg<'_>]) -> Result<i32, FormatError> {
    print_with_mode(GuardMode::Strict, sink, fmt, args)
}

/// [`print_to`] with standard output as the sink.
pub fn print(fmt: &str, args: &[Arg<'_>]) -> Result<i32, FormatError> {
    let mut out = io::stdout();
    print_to(Sink::appendable(&mut out), fmt, args)
}

/// [`print_to`] with an explicit mode.
///
/// [`GuardMode::Off`] skips validation; directives without an argument
/// then render nothing.
pub fn print_with_mode(
    mode: GuardMode,
    sink: Sink<'_>,
    fmt: &str,
    args: &[Arg<'_>],
) -> Result<i32, FormatError> {
    if mode.validation_enabled() {
        validate(fmt, args)?;
    }
    match format_two_pass(fmt, args) {
        Formatted::Suppressed(n) => Ok(n),
        Formatted::Text { text, count } => {
            sink.deliver(text)?;
            Ok(count)
        }
    }
}
