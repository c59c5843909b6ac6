//! Argument type requirement table.
//!
//! Pure mapping from (conversion character, length modifier) to the one
//! type an argument at that position must convert to. A length modifier
//! that has no row for a conversion falls back to that conversion's
//! unmodified row, so `%lf` demands `double` and `%hc` demands `char`.

use crate::stdio::printf::LengthMod;

use super::error::FormatError;
use super::types::{NativeType, Pointee, ScalarType};

/// Type demanded by conversion `conversion` under `length`.
///
/// Returns [`FormatError::NoSpecifier`] for bytes that are not printf
/// conversions (including `%`, which the scanner handles before lookup).
pub fn required_type(conversion: u8, length: LengthMod) -> Result<NativeType, FormatError> {
    use ScalarType as S;

    let ty = match conversion {
        b'd' | b'i' => NativeType::Scalar(signed_row(length)),
        b'u' | b'o' | b'x' | b'X' => NativeType::Scalar(match length {
            LengthMod::H => S::UnsignedShort,
            LengthMod::Hh => S::UnsignedChar,
            LengthMod::L => S::UnsignedLong,
            LengthMod::Ll => S::UnsignedLongLong,
            LengthMod::J => S::UIntMax,
            LengthMod::Z => S::Size,
            LengthMod::T => S::PtrDiff,
            LengthMod::None | LengthMod::BigL => S::UnsignedInt,
        }),
        b'f' | b'F' | b'e' | b'E' | b'g' | b'G' | b'a' | b'A' => match length {
            LengthMod::BigL => NativeType::Scalar(S::LongDouble),
            _ => NativeType::DOUBLE,
        },
        b'c' => match length {
            LengthMod::L => NativeType::Scalar(S::WChar),
            _ => NativeType::Scalar(S::Char),
        },
        b's' => match length {
            LengthMod::L => NativeType::WIDE_STR,
            _ => NativeType::NARROW_STR,
        },
        b'p' => NativeType::VOID_PTR,
        b'n' => NativeType::ptr(Pointee::Scalar(signed_row(length))),
        _ => return Err(FormatError::NoSpecifier),
    };
    Ok(ty)
}

/// Shared by `%d`/`%i` and the `%n` pointee.
fn signed_row(length: LengthMod) -> ScalarType {
    match length {
        LengthMod::H => ScalarType::Short,
        LengthMod::Hh => ScalarType::SignedChar,
        LengthMod::L => ScalarType::Long,
        LengthMod::Ll => ScalarType::LongLong,
        LengthMod::J => ScalarType::IntMax,
        LengthMod::Z => ScalarType::Size,
        LengthMod::T => ScalarType::PtrDiff,
        LengthMod::None | LengthMod::BigL => ScalarType::Int,
    }
}
