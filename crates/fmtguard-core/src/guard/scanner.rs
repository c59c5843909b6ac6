//! Format grammar scanner.
//!
//! Walks a format string left to right and hands back one conversion
//! directive at a time. Directives are read with the formatting engine's own
//! parser, so a directive accepted here is exactly one the engine renders
//! with one argument. Only the length modifier and the conversion character
//! decide the required type.

use crate::stdio::printf::{LengthMod, Precision, Width, parse_format_spec};

use super::error::FormatError;
use super::table::required_type;
use super::types::NativeType;

/// One `%` directive found by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Specifier {
    /// Byte offset of the introducing `%`.
    pub start: usize,
    pub length: LengthMod,
    pub conversion: u8,
    /// Type the matching argument must convert to.
    pub required: NativeType,
}

/// Cursor over a format string.
#[derive(Debug, Clone)]
pub struct Scanner<'f> {
    fmt: &'f [u8],
    pos: usize,
}

impl<'f> Scanner<'f> {
    #[must_use]
    pub fn new(fmt: &'f [u8]) -> Self {
        Self { fmt, pos: 0 }
    }

    /// Current byte offset.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Advance to the next directive.
    ///
    /// `%%` escapes are skipped. Returns `Ok(None)` when the string ends
    /// without another directive, and [`FormatError::NoSpecifier`] when a
    /// `%` runs into an unknown character or the end of the string.
    pub fn next_specifier(&mut self) -> Result<Option<Specifier>, FormatError> {
        while let Some(start) = self.next_percent() {
            if self.peek() == Some(b'%') {
                self.pos += 1;
                continue;
            }
            return self.directive(start).map(Some);
        }
        Ok(None)
    }

    /// Check that nothing but literals and `%%` escapes remain.
    pub fn finish(mut self) -> Result<(), FormatError> {
        while self.next_percent().is_some() {
            if self.peek() != Some(b'%') {
                return Err(FormatError::BadFormat);
            }
            self.pos += 1;
        }
        Ok(())
    }

    /// Position after the next `%`, returning the offset of the `%` itself.
    fn next_percent(&mut self) -> Option<usize> {
        let rest = self.fmt.get(self.pos..)?;
        let found = rest.iter().position(|&b| b == b'%')?;
        let start = self.pos + found;
        self.pos = start + 1;
        Some(start)
    }

    fn peek(&self) -> Option<u8> {
        self.fmt.get(self.pos).copied()
    }

    /// Read the directive whose `%` sits at `start`.
    ///
    /// Malformed directives and `*` widths or precisions have no specifier:
    /// the engine would print the former as text and feed the latter from
    /// an extra argument.
    fn directive(&mut self, start: usize) -> Result<Specifier, FormatError> {
        let (spec, used) =
            parse_format_spec(&self.fmt[self.pos..]).ok_or(FormatError::NoSpecifier)?;
        if spec.width == Width::FromArg || spec.precision == Precision::FromArg {
            return Err(FormatError::NoSpecifier);
        }
        let required = required_type(spec.conversion, spec.length)?;
        self.pos += used;
        Ok(Specifier {
            start,
            length: spec.length,
            conversion: spec.conversion,
            required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specifiers(fmt: &str) -> Result<Vec<Specifier>, FormatError> {
        let mut scanner = Scanner::new(fmt.as_bytes());
        let mut out = Vec::new();
        while let Some(spec) = scanner.next_specifier()? {
            out.push(spec);
        }
        Ok(out)
    }

    #[test]
    fn finds_directives_in_order() {
        let found = specifiers("a %d b %-08.3lf c %s").unwrap();
        let convs: Vec<u8> = found.iter().map(|s| s.conversion).collect();
        assert_eq!(convs, b"dfs");
        assert_eq!(found[0].start, 2);
        assert_eq!(found[1].length, LengthMod::L);
        assert_eq!(found[1].required, NativeType::DOUBLE);
        assert_eq!(found[2].required, NativeType::NARROW_STR);
    }

    #[test]
    fn percent_escape_is_not_a_directive() {
        assert!(specifiers("100%% sure").unwrap().is_empty());
        let found = specifiers("%%%d").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start, 2);
    }

    #[test]
    fn length_modifiers_accumulate() {
        let found = specifiers("%hhd %hd %lld %ld %jd %zd %td").unwrap();
        let lengths: Vec<LengthMod> = found.iter().map(|s| s.length).collect();
        assert_eq!(
            lengths,
            [
                LengthMod::Hh,
                LengthMod::H,
                LengthMod::Ll,
                LengthMod::L,
                LengthMod::J,
                LengthMod::Z,
                LengthMod::T,
            ]
        );
    }

    #[test]
    fn length_resets_per_directive() {
        let found = specifiers("%ld%d").unwrap();
        assert_eq!(found[1].length, LengthMod::None);
    }

    #[test]
    fn unknown_conversion_has_no_specifier() {
        assert!(matches!(specifiers("%y"), Err(FormatError::NoSpecifier)));
        assert!(matches!(specifiers("%*d"), Err(FormatError::NoSpecifier)));
    }

    #[test]
    fn truncated_directive_has_no_specifier() {
        assert!(matches!(specifiers("abc%"), Err(FormatError::NoSpecifier)));
        assert!(matches!(specifiers("%08.3l"), Err(FormatError::NoSpecifier)));
    }

    #[test]
    fn out_of_order_directives_have_no_specifier() {
        for fmt in ["%5-d", "%.1.2d", "%llld", "%hhhd", "%5%", "%l"] {
            assert!(
                matches!(specifiers(fmt), Err(FormatError::NoSpecifier)),
                "{fmt}"
            );
        }
    }

    #[test]
    fn cursor_stops_after_the_conversion() {
        let mut scanner = Scanner::new(b"%-+ #08.3lld|%s");
        let spec = scanner.next_specifier().unwrap().unwrap();
        assert_eq!(spec.length, LengthMod::Ll);
        assert_eq!(scanner.position(), 12);
        assert_eq!(scanner.next_specifier().unwrap().unwrap().conversion, b's');
    }

    #[test]
    fn finish_accepts_literals_and_escapes() {
        assert!(Scanner::new(b"plain text").finish().is_ok());
        assert!(Scanner::new(b"50%% off").finish().is_ok());
        assert!(Scanner::new(b"").finish().is_ok());
    }

    #[test]
    fn finish_rejects_any_unescaped_percent() {
        assert!(matches!(
            Scanner::new(b"%d").finish(),
            Err(FormatError::BadFormat)
        ));
        assert!(matches!(
            Scanner::new(b"trailing %").finish(),
            Err(FormatError::BadFormat)
        ));
        assert!(matches!(
            Scanner::new(b"%y").finish(),
            Err(FormatError::BadFormat)
        ));
    }

    #[test]
    fn finish_continues_from_cursor() {
        let mut scanner = Scanner::new(b"%d then 100%%");
        assert!(scanner.next_specifier().unwrap().is_some());
        assert_eq!(scanner.position(), 2);
        assert!(scanner.finish().is_ok());
    }
}
