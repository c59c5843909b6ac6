//! Output sinks.
//!
//! A sink takes the finished text of one call, exactly once. It is either
//! callable (a closure that receives the `String`) or appendable (a value
//! the text is appended to). The caller picks the shape with
//! [`Sink::callable`] or [`Sink::appendable`]; a value that is neither does
//! not satisfy either constructor's bound.

use std::fs::File;
use std::io::{self, BufWriter, Stderr, Stdout, Write};

/// A destination that accepts finished text by appending it.
pub trait Append {
    fn append(&mut self, text: String) -> io::Result<()>;
}

impl Append for String {
    fn append(&mut self, text: String) -> io::Result<()> {
        self.push_str(&text);
        Ok(())
    }
}

impl Append for Vec<u8> {
    fn append(&mut self, text: String) -> io::Result<()> {
        self.extend_from_slice(text.as_bytes());
        Ok(())
    }
}

impl Append for Stdout {
    fn append(&mut self, text: String) -> io::Result<()> {
        self.lock().write_all(text.as_bytes())
    }
}

impl Append for Stderr {
    fn append(&mut self, text: String) -> io::Result<()> {
        self.lock().write_all(text.as_bytes())
    }
}

impl Append for File {
    fn append(&mut self, text: String) -> io::Result<()> {
        self.write_all(text.as_bytes())
    }
}

impl<W: Write> Append for BufWriter<W> {
    fn append(&mut self, text: String) -> io::Result<()> {
        self.write_all(text.as_bytes())
    }
}

impl<A: Append + ?Sized> Append for &mut A {
    fn append(&mut self, text: String) -> io::Result<()> {
        (**self).append(text)
    }
}

/// Which shape a [`Sink`] has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    Callable,
    Appendable,
}

impl SinkKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Callable => "callable",
            Self::Appendable => "appendable",
        }
    }
}

/// Borrowed destination for one guarded print.
pub enum Sink<'s> {
    Callable(&'s mut dyn FnMut(String)),
    Appendable(&'s mut dyn Append),
}

impl<'s> Sink<'s> {
    #[must_use]
    pub fn callable<F: FnMut(String) + 's>(f: &'s mut F) -> Self {
        Self::Callable(f)
    }

    #[must_use]
    pub fn appendable<A: Append + 's>(target: &'s mut A) -> Self {
        Self::Appendable(target)
    }

    #[must_use]
    pub fn kind(&self) -> SinkKind {
        match self {
            Self::Callable(_) => SinkKind::Callable,
            Self::Appendable(_) => SinkKind::Appendable,
        }
    }

    /// Hand `text` to the destination. Consumes the sink so delivery
    /// happens at most once.
    pub fn deliver(self, text: String) -> io::Result<()> {
        match self {
            Self::Callable(f) => {
                f(text);
                Ok(())
            }
            Self::Appendable(target) => target.append(text),
        }
    }
}

impl std::fmt::Debug for Sink<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Sink").field(&self.kind()).finish()
    }
}

/// Callable sink that replaces `buf` with the finished text.
pub fn strout(buf: &mut String) -> impl FnMut(String) + '_ {
    move |text| *buf = text
}
