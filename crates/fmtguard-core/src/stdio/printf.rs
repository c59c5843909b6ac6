//! printf formatting engine.
//!
//! Safe Rust implementation of the POSIX printf format string interpreter.
//! Parses format directives and renders type-tagged arguments into any
//! [`FormatBuf`], which is what makes the measure-then-fill contract of
//! [`vsnprintf`] possible without re-deriving anything between passes.
//!
//! Reference: POSIX.1-2024 fprintf, ISO C11 7.21.6.1
//!
//! Output is always valid UTF-8: `%c` renders a Rust `char` as its UTF-8
//! encoding (narrow numeric values as the Latin-1 scalar of their low byte),
//! and `%s` precision never splits a character.

use crate::guard::{Arg, ArgValue};
use crate::stdio::buffer::{CountingBuf, FormatBuf, SliceBuf};

// ---------------------------------------------------------------------------
// Directive model
// ---------------------------------------------------------------------------

/// The `-+ #0` flag set of one directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatFlags {
    pub left_justify: bool,
    pub force_sign: bool,
    pub space_sign: bool,
    pub alt_form: bool,
    pub zero_pad: bool,
}

impl FormatFlags {
    fn set(&mut self, byte: u8) -> bool {
        let slot = match byte {
            b'-' => &mut self.left_justify,
            b'+' => &mut self.force_sign,
            b' ' => &mut self.space_sign,
            b'#' => &mut self.alt_form,
            b'0' => &mut self.zero_pad,
            _ => return false,
        };
        *slot = true;
        true
    }

    /// `+` beats space and `-` beats `0`.
    fn settle(mut self) -> Self {
        self.space_sign &= !self.force_sign;
        self.zero_pad &= !self.left_justify;
        self
    }
}

/// Minimum field width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    None,
    Fixed(usize),
    /// `*`: taken from the argument list.
    FromArg,
}

/// Precision after the `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    None,
    /// A bare `.` is `Fixed(0)`.
    Fixed(usize),
    /// `.*`: taken from the argument list.
    FromArg,
}

/// Length modifier between precision and conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LengthMod {
    #[default]
    None,
    Hh,
    H,
    L,
    Ll,
    Z,
    T,
    J,
    /// `L`, for `long double`.
    BigL,
}

impl LengthMod {
    /// Fold one modifier byte into the current state.
    ///
    /// `h` after `h` becomes `hh`, `l` after `l` becomes `ll`; `j`, `z`, `t`
    /// and `L` replace whatever came before. Returns `None` for bytes that
    /// are not length modifiers.
    #[must_use]
    pub fn accumulate(self, byte: u8) -> Option<Self> {
        Some(match byte {
            b'h' if self == Self::H => Self::Hh,
            b'h' => Self::H,
            b'l' if self == Self::L => Self::Ll,
            b'l' => Self::L,
            b'j' => Self::J,
            b'z' => Self::Z,
            b't' => Self::T,
            b'L' => Self::BigL,
            _ => return None,
        })
    }
}

/// One `%` directive, fully parsed.
#[derive(Debug, Clone)]
pub struct FormatSpec {
    pub flags: FormatFlags,
    pub width: Width,
    pub precision: Precision,
    pub length: LengthMod,
    /// The conversion byte, e.g. `b'd'`.
    pub conversion: u8,
}

/// Conversion bytes the engine knows how to render.
const CONVERSIONS: &[u8] = b"diuxXoscpn%fFeEgGaA";

/// A piece of a format string.
#[derive(Debug, Clone)]
pub enum FormatSegment<'a> {
    /// Copied to the output unchanged.
    Literal(&'a [u8]),
    /// `%%`.
    Percent,
    Spec(FormatSpec),
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        let hit = self.peek() == Some(byte);
        self.pos += usize::from(hit);
        hit
    }

    /// A run of ASCII digits, or `None` when there is none.
    fn number(&mut self) -> Option<usize> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        (self.pos > start).then(|| parse_decimal(&self.bytes[start..self.pos]))
    }
}

/// Parse the directive that follows a `%`.
///
/// `fmt` starts just past the `%`. On success returns the directive and how many
/// bytes of `fmt` it used; `None` means the directive is malformed or cut off.
pub fn parse_format_spec(fmt: &[u8]) -> Option<(FormatSpec, usize)> {
    let mut cur = Cursor { bytes: fmt, pos: 0 };

    let mut flags = FormatFlags::default();
    while cur.peek().is_some_and(|b| flags.set(b)) {
        cur.pos += 1;
    }

    let width = if cur.eat(b'*') {
        Width::FromArg
    } else {
        cur.number().map_or(Width::None, Width::Fixed)
    };

    let precision = if !cur.eat(b'.') {
        Precision::None
    } else if cur.eat(b'*') {
        Precision::FromArg
    } else {
        Precision::Fixed(cur.number().unwrap_or(0))
    };

    // At most two modifier bytes ('hh' / 'll').
    let mut length = LengthMod::None;
    while let Some(next) = cur.peek().and_then(|b| length.accumulate(b)) {
        if matches!(length, LengthMod::Hh | LengthMod::Ll) {
            break;
        }
        length = next;
        cur.pos += 1;
    }

    let conversion = cur.peek().filter(|b| CONVERSIONS.contains(b))?;
    let spec = FormatSpec {
        flags: flags.settle(),
        width,
        precision,
        length,
        conversion,
    };
    Some((spec, cur.pos + 1))
}

/// Split a format string into literals, `%%` escapes and directives.
///
/// A malformed directive, or a `%` at the very end, is kept as a literal `%`
/// and scanning resumes right after it.
pub fn parse_format_string(fmt: &[u8]) -> Vec<FormatSegment<'_>> {
    let mut segments = Vec::new();
    let mut rest = fmt;

    while !rest.is_empty() {
        let Some(at) = rest.iter().position(|&b| b == b'%') else {
            segments.push(FormatSegment::Literal(rest));
            break;
        };
        if at > 0 {
            segments.push(FormatSegment::Literal(&rest[..at]));
        }
        let after = &rest[at + 1..];
        if after.first() == Some(&b'%') {
            segments.push(FormatSegment::Percent);
            rest = &after[1..];
        } else if let Some((spec, used)) = parse_format_spec(after) {
            segments.push(FormatSegment::Spec(spec));
            rest = &after[used..];
        } else {
            segments.push(FormatSegment::Literal(&rest[at..=at]));
            rest = after;
        }
    }
    segments
}

// ---------------------------------------------------------------------------
// Two-pass entry points
// ---------------------------------------------------------------------------

/// Format into `dst`, snprintf-style.
///
/// Writes at most `dst.len()` bytes and returns the length of the complete
/// output, so an empty `dst` is a pure measuring pass. There is no NUL
/// terminator. Returns `-1` when the length does not fit in `i32`.
pub fn vsnprintf(dst: &mut [u8], fmt: &str, args: &[Arg<'_>]) -> i32 {
    let mut out = SliceBuf::new(dst);
    render(fmt.as_bytes(), args, &mut out);
    i32::try_from(out.written()).unwrap_or(-1)
}

/// Length of the complete output, without storing any of it.
///
/// Same result as `vsnprintf` with an empty destination.
pub fn measure(fmt: &str, args: &[Arg<'_>]) -> i32 {
    let mut out = CountingBuf::new();
    render(fmt.as_bytes(), args, &mut out);
    i32::try_from(out.written()).unwrap_or(-1)
}

/// Render a whole format string into `buf`, consuming `args` left to right.
///
/// Directives without a matching argument render nothing. Arguments are
/// converted to the type each directive demands.
pub fn render<B: FormatBuf + ?Sized>(fmt: &[u8], args: &[Arg<'_>], buf: &mut B) {
    let mut args = args.iter().map(Arg::value);

    for seg in parse_format_string(fmt) {
        match seg {
            FormatSegment::Literal(lit) => buf.extend_from_slice(lit),
            FormatSegment::Percent => buf.push(b'%'),
            FormatSegment::Spec(spec) => {
                let mut resolved = spec.clone();
                if matches!(spec.width, Width::FromArg) {
                    match args.next() {
                        Some(v) => {
                            let w = v.as_i64() as i32;
                            if w < 0 {
                                resolved.flags.left_justify = true;
                                resolved.flags.zero_pad = false;
                            }
                            resolved.width = Width::Fixed(w.unsigned_abs() as usize);
                        }
                        None => resolved.width = Width::None,
                    }
                }
                if matches!(spec.precision, Precision::FromArg) {
                    resolved.precision = match args.next() {
                        Some(v) if v.as_i64() as i32 >= 0 => {
                            Precision::Fixed(v.as_i64() as i32 as usize)
                        }
                        _ => Precision::None,
                    };
                }
                if spec.conversion == b'%' {
                    buf.push(b'%');
                    continue;
                }
                if let Some(value) = args.next() {
                    render_one(&resolved, value, buf);
                }
            }
        }
    }
}

fn render_one<B: FormatBuf + ?Sized>(spec: &FormatSpec, value: &ArgValue<'_>, buf: &mut B) {
    match spec.conversion {
        b'd' | b'i' => format_signed(signed_value(value, spec.length), spec, buf),
        b'u' | b'x' | b'X' | b'o' => format_unsigned(unsigned_value(value, spec.length), spec, buf),
        b'f' | b'F' | b'e' | b'E' | b'g' | b'G' | b'a' | b'A' => {
            format_float(value.as_f64(), spec, buf);
        }
        b'c' => format_char(char_value(value, spec.length), spec, buf),
        b's' => match *value {
            ArgValue::Str(s) => format_str(s, spec, buf),
            ArgValue::CStr(s) => format_str(&s.to_string_lossy(), spec, buf),
            ArgValue::Null => format_str("(null)", spec, buf),
            _ => {}
        },
        b'p' => format_pointer(value.as_address(), spec, buf),
        b'n' => {
            if let ArgValue::Count(slot) = value {
                slot.store(buf.written());
            }
        }
        _ => {}
    }
}

fn signed_value(value: &ArgValue<'_>, length: LengthMod) -> i64 {
    if let ArgValue::Float(f) = *value {
        return match length {
            LengthMod::Hh => i64::from(f as i8),
            LengthMod::H => i64::from(f as i16),
            LengthMod::None | LengthMod::BigL => i64::from(f as i32),
            _ => f as i64,
        };
    }
    let raw = value.as_i64();
    match length {
        LengthMod::Hh => i64::from(raw as i8),
        LengthMod::H => i64::from(raw as i16),
        LengthMod::None | LengthMod::BigL => i64::from(raw as i32),
        _ => raw,
    }
}

fn unsigned_value(value: &ArgValue<'_>, length: LengthMod) -> u64 {
    let raw = value.as_u64();
    match length {
        LengthMod::Hh => u64::from(raw as u8),
        LengthMod::H => u64::from(raw as u16),
        LengthMod::None | LengthMod::BigL => u64::from(raw as u32),
        _ => raw,
    }
}

fn char_value(value: &ArgValue<'_>, length: LengthMod) -> char {
    match (*value, length) {
        (ArgValue::Char(c), _) => c,
        (_, LengthMod::L) => {
            char::from_u32(value.as_u64() as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
        }
        _ => char::from(value.as_u64() as u8),
    }
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

/// Render a signed integer to `buf` according to `spec`.
pub fn format_signed<B: FormatBuf + ?Sized>(value: i64, spec: &FormatSpec, buf: &mut B) {
    let (base, uppercase) = int_base(spec.conversion);
    let mut scratch = [0u8; 64];
    let digits = digits_of(value.unsigned_abs(), base, uppercase, &mut scratch);
    let (zeros, body) = int_digits(digits, spec);
    let (lead, lead_len) = head(sign_byte(value < 0, spec.flags), b"");
    pad_field(buf, spec, &lead[..lead_len], zeros, body, int_zero_pad(spec));
}

/// Render an unsigned integer to `buf` according to `spec`.
///
/// `#` adds `0x`/`0X` to non-zero hex values and makes octal output start
/// with a `0`, adding one only when the digits do not already.
pub fn format_unsigned<B: FormatBuf + ?Sized>(value: u64, spec: &FormatSpec, buf: &mut B) {
    let (base, uppercase) = int_base(spec.conversion);
    let mut scratch = [0u8; 64];
    let digits = digits_of(value, base, uppercase, &mut scratch);
    let (mut zeros, body) = int_digits(digits, spec);

    let prefix: &[u8] = match (spec.flags.alt_form, spec.conversion) {
        (true, b'o') => {
            if zeros == 0 && body.first() != Some(&b'0') {
                zeros = 1;
            }
            b""
        }
        (true, b'x') if value != 0 => b"0x",
        (true, b'X') if value != 0 => b"0X",
        _ => b"",
    };
    pad_field(buf, spec, prefix, zeros, body, int_zero_pad(spec));
}

/// Render a floating-point value to `buf` according to `spec`.
///
/// Supports `%f`/`%F`, `%e`/`%E`, `%g`/`%G` and `%a`/`%A`. Digit generation
/// uses Rust's exact float formatting; POSIX width/flag rules are applied
/// on top.
pub fn format_float<B: FormatBuf + ?Sized>(value: f64, spec: &FormatSpec, buf: &mut B) {
    let uppercase = spec.conversion.is_ascii_uppercase();
    let abs = value.abs();
    let finite = value.is_finite();

    let (prefix, body): (&[u8], String) = if !finite {
        let word = if value.is_nan() { "nan" } else { "inf" };
        let word = if uppercase {
            word.to_ascii_uppercase()
        } else {
            word.to_string()
        };
        (b"", word)
    } else {
        let precision = match spec.precision {
            Precision::Fixed(p) => Some(p),
            _ => None,
        };
        let alt = spec.flags.alt_form;
        match spec.conversion | 0x20 {
            b'e' => (b"", format_e(abs, precision.unwrap_or(6), uppercase, alt)),
            b'g' => (b"", format_g(abs, precision.unwrap_or(6), uppercase, alt)),
            b'a' => (
                if uppercase { b"0X" } else { b"0x" },
                format_a(abs, precision, uppercase, alt),
            ),
            _ => (b"", format_f(abs, precision.unwrap_or(6), alt)),
        }
    };

    let (lead, lead_len) = head(sign_byte(value.is_sign_negative(), spec.flags), prefix);
    // Infinities and NaNs are never zero padded.
    let zero_fill = spec.flags.zero_pad && finite;
    pad_field(buf, spec, &lead[..lead_len], 0, body.as_bytes(), zero_fill);
}

/// Render a string argument to `buf` according to `spec`.
///
/// Precision truncates the string to at most that many bytes, backing off
/// to the previous character boundary.
pub fn format_str<B: FormatBuf + ?Sized>(s: &str, spec: &FormatSpec, buf: &mut B) {
    let mut end = match spec.precision {
        Precision::Fixed(p) => s.len().min(p),
        _ => s.len(),
    };
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    pad_field(buf, spec, b"", 0, &s.as_bytes()[..end], false);
}

/// Render a character to `buf` according to `spec`.
pub fn format_char<B: FormatBuf + ?Sized>(c: char, spec: &FormatSpec, buf: &mut B) {
    let mut utf8 = [0u8; 4];
    pad_field(buf, spec, b"", 0, c.encode_utf8(&mut utf8).as_bytes(), false);
}

/// Render a pointer to `buf` as `0x...` hex, or `(nil)` for null.
pub fn format_pointer<B: FormatBuf + ?Sized>(addr: usize, spec: &FormatSpec, buf: &mut B) {
    if addr == 0 {
        pad_field(buf, spec, b"", 0, b"(nil)", false);
        return;
    }
    let mut scratch = [0u8; 64];
    let digits = digits_of(addr as u64, 16, false, &mut scratch);
    pad_field(buf, spec, b"0x", 0, digits, false);
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Lay one directive out inside its field width.
///
/// `head` (sign, radix prefix) stays left of `0` padding; `zeros` are
/// precision zeros placed directly before `body`.
fn pad_field<B: FormatBuf + ?Sized>(
    buf: &mut B,
    spec: &FormatSpec,
    head: &[u8],
    zeros: usize,
    body: &[u8],
    zero_fill: bool,
) {
    let pad = resolve_width(spec).saturating_sub(head.len() + zeros + body.len());
    let left = spec.flags.left_justify;
    if !left && !zero_fill {
        buf.fill(b' ', pad);
    }
    buf.extend_from_slice(head);
    if !left && zero_fill {
        buf.fill(b'0', pad);
    }
    buf.fill(b'0', zeros);
    buf.extend_from_slice(body);
    if left {
        buf.fill(b' ', pad);
    }
}

fn sign_byte(negative: bool, flags: FormatFlags) -> Option<u8> {
    if negative {
        Some(b'-')
    } else if flags.force_sign {
        Some(b'+')
    } else if flags.space_sign {
        Some(b' ')
    } else {
        None
    }
}

/// Sign followed by a radix prefix; at most `-0x`.
fn head(sign: Option<u8>, prefix: &[u8]) -> ([u8; 3], usize) {
    let mut out = [0u8; 3];
    let start = usize::from(sign.is_some());
    if let Some(s) = sign {
        out[0] = s;
    }
    out[start..start + prefix.len()].copy_from_slice(prefix);
    (out, start + prefix.len())
}

/// Precision zeros and the digit run to emit for an integer.
///
/// An explicit zero precision with a zero value produces no digits at all.
fn int_digits<'d>(digits: &'d [u8], spec: &FormatSpec) -> (usize, &'d [u8]) {
    match spec.precision {
        Precision::Fixed(0) if digits == b"0" => (0, &digits[..0]),
        Precision::Fixed(p) => (p.saturating_sub(digits.len()), digits),
        _ => (0, digits),
    }
}

fn parse_decimal(digits: &[u8]) -> usize {
    digits.iter().fold(0_usize, |acc, &d| {
        acc.saturating_mul(10).saturating_add(usize::from(d - b'0'))
    })
}

fn resolve_width(spec: &FormatSpec) -> usize {
    match spec.width {
        Width::Fixed(w) => w,
        _ => 0,
    }
}

/// The '0' flag is ignored for integers when a precision is given.
fn int_zero_pad(spec: &FormatSpec) -> bool {
    spec.flags.zero_pad && matches!(spec.precision, Precision::None)
}

fn int_base(conversion: u8) -> (u64, bool) {
    match conversion {
        b'o' => (8, false),
        b'x' => (16, false),
        b'X' => (16, true),
        _ => (10, false),
    }
}

/// Digits of `value` in `base`, written right-aligned into `scratch`.
fn digits_of(mut value: u64, base: u64, uppercase: bool, scratch: &mut [u8; 64]) -> &[u8] {
    let table: &[u8; 16] = if uppercase {
        b"0123456789ABCDEF"
    } else {
        b"0123456789abcdef"
    };
    let mut pos = scratch.len();
    loop {
        pos -= 1;
        scratch[pos] = table[(value % base) as usize];
        value /= base;
        if value == 0 {
            break;
        }
    }
    &scratch[pos..]
}

/// `%f` / `%F` formatting: fixed-point decimal.
fn format_f(value: f64, precision: usize, alt_form: bool) -> String {
    let mut s = format!("{value:.precision$}");
    if precision == 0 && alt_form {
        s.push('.');
    }
    s
}

/// Split Rust's `{:e}` output into mantissa and decimal exponent.
fn sci_parts(value: f64, precision: usize) -> (String, i32) {
    let s = format!("{value:.precision$e}");
    match s.split_once('e') {
        Some((mantissa, exp)) => (mantissa.to_string(), exp.parse().unwrap_or(0)),
        None => (s, 0),
    }
}

/// `%e` / `%E` formatting: scientific notation.
fn format_e(value: f64, precision: usize, uppercase: bool, alt_form: bool) -> String {
    let (mut mantissa, exp) = sci_parts(value, precision);
    if precision == 0 && alt_form {
        mantissa.push('.');
    }
    let e_char = if uppercase { 'E' } else { 'e' };
    let sign = if exp < 0 { '-' } else { '+' };
    let abs_exp = exp.unsigned_abs();
    format!("{mantissa}{e_char}{sign}{abs_exp:02}")
}

/// `%g` / `%G` formatting: `%e` or `%f` depending on the exponent.
///
/// With P significant digits and X the exponent `%e` would use, C11 picks
/// `%f` with precision `P - 1 - X` when `P > X >= -4`.
fn format_g(value: f64, precision: usize, uppercase: bool, alt_form: bool) -> String {
    let p = precision.max(1);
    let exp = if value == 0.0 {
        0
    } else {
        sci_parts(value, p - 1).1
    };

    if exp >= -4 && exp < p as i32 {
        let frac_digits = (p as i32 - 1 - exp).max(0) as usize;
        let mut s = format_f(value, frac_digits, alt_form);
        if !alt_form {
            strip_trailing_zeros(&mut s);
        }
        s
    } else {
        let mut s = format_e(value, p - 1, uppercase, alt_form);
        if !alt_form {
            // Strip trailing zeros from the mantissa part (before 'e'/'E').
            if let Some(e_pos) = s.bytes().position(|b| b == b'e' || b == b'E') {
                let mut mantissa = s[..e_pos].to_string();
                strip_trailing_zeros(&mut mantissa);
                let exp_part = &s[e_pos..];
                s = format!("{mantissa}{exp_part}");
            }
        }
        s
    }
}

/// `%a` / `%A` formatting: hexadecimal significand, binary exponent.
///
/// Returns everything after the `0x` prefix. Without a precision the
/// significand is exact with trailing zero nibbles removed; with one it is
/// rounded half-to-even.
fn format_a(value: f64, precision: Option<usize>, uppercase: bool, alt_form: bool) -> String {
    const MANT_NIBBLES: usize = 13;
    let bits = value.to_bits();
    let exp_bits = ((bits >> 52) & 0x7ff) as i32;
    let mut mant = bits & ((1u64 << 52) - 1);

    let (mut lead, exp) = if value == 0.0 {
        (0u64, 0)
    } else if exp_bits == 0 {
        (0, -1022)
    } else {
        (1, exp_bits - 1023)
    };

    let digits = match precision {
        None => {
            let full = format!("{mant:013x}");
            full.trim_end_matches('0').to_string()
        }
        Some(p) if p >= MANT_NIBBLES => {
            let mut s = format!("{mant:013x}");
            s.extend(std::iter::repeat_n('0', p - MANT_NIBBLES));
            s
        }
        Some(p) => {
            let shift = ((MANT_NIBBLES - p) * 4) as u32;
            let mut kept = mant >> shift;
            let rem = mant & ((1u64 << shift) - 1);
            let half = 1u64 << (shift - 1);
            let odd = if p == 0 { lead & 1 == 1 } else { kept & 1 == 1 };
            if rem > half || (rem == half && odd) {
                kept += 1;
                if kept >> (p * 4) != 0 {
                    lead += 1;
                    kept = 0;
                }
            }
            mant = kept;
            if p == 0 {
                String::new()
            } else {
                format!("{mant:0p$x}")
            }
        }
    };

    let mut out = format!("{lead:x}");
    if !digits.is_empty() || alt_form {
        out.push('.');
    }
    out.push_str(&digits);
    let sign = if exp < 0 { '-' } else { '+' };
    out.push_str(&format!("p{sign}{}", exp.unsigned_abs()));
    if uppercase {
        out.make_ascii_uppercase();
    }
    out
}

/// Drop trailing fractional zeros, and the `.` if nothing is left after it.
fn strip_trailing_zeros(s: &mut String) {
    if !s.contains('.') {
        return;
    }
    let keep = s.trim_end_matches('0').trim_end_matches('.').len();
    s.truncate(keep);
}
