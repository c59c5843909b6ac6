//! Type-tagged call-site arguments.
//!
//! A printf call's argument list is captured as an ordered slice of [`Arg`],
//! each carrying the [`NativeType`] it was built from and its value. The
//! slice is borrowed, so the validator and both formatting passes walk the
//! same values independently.

use std::cell::Cell;
use std::ffi::CStr;

use super::types::{NativeType, Pointee, ScalarType};

/// Destination of a `%n` directive.
#[derive(Debug, Clone, Copy)]
pub enum CountSlot<'a> {
    SignedChar(&'a Cell<i8>),
    Short(&'a Cell<i16>),
    Int(&'a Cell<i32>),
    Long(&'a Cell<i64>),
    Size(&'a Cell<usize>),
    PtrDiff(&'a Cell<isize>),
}

impl CountSlot<'_> {
    /// Store a byte count, narrowing to the slot's width.
    pub fn store(&self, count: usize) {
        match self {
            Self::SignedChar(c) => c.set(count as i8),
            Self::Short(c) => c.set(count as i16),
            Self::Int(c) => c.set(count as i32),
            Self::Long(c) => c.set(count as i64),
            Self::Size(c) => c.set(count),
            Self::PtrDiff(c) => c.set(count as isize),
        }
    }

    /// Address of the slot, for `%p`.
    #[must_use]
    pub fn addr(&self) -> usize {
        match self {
            Self::SignedChar(c) => c.as_ptr() as usize,
            Self::Short(c) => c.as_ptr() as usize,
            Self::Int(c) => c.as_ptr() as usize,
            Self::Long(c) => c.as_ptr() as usize,
            Self::Size(c) => c.as_ptr() as usize,
            Self::PtrDiff(c) => c.as_ptr() as usize,
        }
    }
}

/// Runtime value of one argument.
#[derive(Debug, Clone, Copy)]
pub enum ArgValue<'a> {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Char(char),
    Str(&'a str),
    CStr(&'a CStr),
    Address(usize),
    Count(CountSlot<'a>),
    Null,
}

impl ArgValue<'_> {
    /// Value as a signed integer (implicit-conversion semantics).
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        match *self {
            Self::Signed(v) => v,
            Self::Unsigned(v) => v as i64,
            Self::Float(v) => v as i64,
            Self::Char(c) => i64::from(u32::from(c)),
            _ => self.as_address() as i64,
        }
    }

    /// Value as an unsigned integer.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        match *self {
            Self::Signed(v) => v as u64,
            Self::Unsigned(v) => v,
            Self::Float(v) => v as u64,
            Self::Char(c) => u64::from(u32::from(c)),
            _ => self.as_address() as u64,
        }
    }

    /// Value as a double.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Signed(v) => v as f64,
            Self::Unsigned(v) => v as f64,
            Self::Float(v) => v,
            Self::Char(c) => f64::from(u32::from(c)),
            _ => 0.0,
        }
    }

    /// Value as a machine address. Text arguments report where they live.
    #[must_use]
    pub fn as_address(&self) -> usize {
        match *self {
            Self::Address(a) => a,
            Self::Str(s) => s.as_ptr() as usize,
            Self::CStr(s) => s.as_ptr() as usize,
            Self::Count(slot) => slot.addr(),
            Self::Null => 0,
            Self::Signed(v) => v as usize,
            Self::Unsigned(v) => v as usize,
            Self::Char(c) => u32::from(c) as usize,
            Self::Float(_) => 0,
        }
    }
}

/// One type-tagged argument.
#[derive(Debug, Clone, Copy)]
pub struct Arg<'a> {
    ty: NativeType,
    value: ArgValue<'a>,
}

impl<'a> Arg<'a> {
    /// Build an argument with an explicit type tag.
    #[must_use]
    pub const fn new(ty: NativeType, value: ArgValue<'a>) -> Self {
        Self { ty, value }
    }

    #[must_use]
    pub const fn native_type(&self) -> NativeType {
        self.ty
    }

    #[must_use]
    pub const fn value(&self) -> &ArgValue<'a> {
        &self.value
    }

    /// C `long`.
    #[must_use]
    pub const fn long(v: i64) -> Self {
        Self::new(NativeType::Scalar(ScalarType::Long), ArgValue::Signed(v))
    }

    /// C `unsigned long`.
    #[must_use]
    pub const fn ulong(v: u64) -> Self {
        Self::new(
            NativeType::Scalar(ScalarType::UnsignedLong),
            ArgValue::Unsigned(v),
        )
    }

    #[must_use]
    pub const fn intmax(v: i64) -> Self {
        Self::new(NativeType::Scalar(ScalarType::IntMax), ArgValue::Signed(v))
    }

    #[must_use]
    pub const fn uintmax(v: u64) -> Self {
        Self::new(NativeType::Scalar(ScalarType::UIntMax), ArgValue::Unsigned(v))
    }

    /// C `long double`, carried at `f64` precision.
    #[must_use]
    pub const fn long_double(v: f64) -> Self {
        Self::new(NativeType::Scalar(ScalarType::LongDouble), ArgValue::Float(v))
    }

    #[must_use]
    pub const fn wide_char(c: char) -> Self {
        Self::new(NativeType::Scalar(ScalarType::WChar), ArgValue::Char(c))
    }

    /// `const wchar_t*`.
    #[must_use]
    pub const fn wide_str(s: &'a str) -> Self {
        Self::new(NativeType::WIDE_STR, ArgValue::Str(s))
    }

    /// A literal null pointer.
    #[must_use]
    pub const fn null() -> Self {
        Self::new(NativeType::NullPointer, ArgValue::Null)
    }

    /// `long*` destination for `%ln`.
    #[must_use]
    pub const fn long_count(slot: &'a Cell<i64>) -> Self {
        Self::new(
            NativeType::scalar_ptr(ScalarType::Long),
            ArgValue::Count(CountSlot::Long(slot)),
        )
    }

    /// `intmax_t*` destination for `%jn`.
    #[must_use]
    pub const fn intmax_count(slot: &'a Cell<i64>) -> Self {
        Self::new(
            NativeType::scalar_ptr(ScalarType::IntMax),
            ArgValue::Count(CountSlot::Long(slot)),
        )
    }
}

macro_rules! impl_scalar_from {
    ($($rust:ty => $scalar:ident, $variant:ident, $wide:ty);* $(;)?) => {
        $(
            impl From<$rust> for Arg<'_> {
                fn from(v: $rust) -> Self {
                    Self::new(
                        NativeType::Scalar(ScalarType::$scalar),
                        ArgValue::$variant(<$wide>::from(v)),
                    )
                }
            }
        )*
    };
}

impl_scalar_from! {
    i8 => SignedChar, Signed, i64;
    i16 => Short, Signed, i64;
    i32 => Int, Signed, i64;
    i64 => LongLong, Signed, i64;
    u8 => UnsignedChar, Unsigned, u64;
    u16 => UnsignedShort, Unsigned, u64;
    u32 => UnsignedInt, Unsigned, u64;
    u64 => UnsignedLongLong, Unsigned, u64;
    f32 => Float, Float, f64;
    f64 => Double, Float, f64;
}

impl From<bool> for Arg<'_> {
    fn from(v: bool) -> Self {
        Self::new(
            NativeType::Scalar(ScalarType::Bool),
            ArgValue::Unsigned(u64::from(v)),
        )
    }
}

impl From<isize> for Arg<'_> {
    fn from(v: isize) -> Self {
        Self::new(
            NativeType::Scalar(ScalarType::PtrDiff),
            ArgValue::Signed(v as i64),
        )
    }
}

impl From<usize> for Arg<'_> {
    fn from(v: usize) -> Self {
        Self::new(
            NativeType::Scalar(ScalarType::Size),
            ArgValue::Unsigned(v as u64),
        )
    }
}

impl From<char> for Arg<'_> {
    fn from(c: char) -> Self {
        Self::new(NativeType::Scalar(ScalarType::Char), ArgValue::Char(c))
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(s: &'a str) -> Self {
        Self::new(NativeType::NARROW_STR, ArgValue::Str(s))
    }
}

impl<'a> From<&'a String> for Arg<'a> {
    fn from(s: &'a String) -> Self {
        Self::from(s.as_str())
    }
}

impl<'a> From<&'a CStr> for Arg<'a> {
    fn from(s: &'a CStr) -> Self {
        Self::new(NativeType::NARROW_STR, ArgValue::CStr(s))
    }
}

/// `None` is a null `const char*`.
impl<'a> From<Option<&'a str>> for Arg<'a> {
    fn from(s: Option<&'a str>) -> Self {
        match s {
            Some(s) => Self::from(s),
            None => Self::new(NativeType::NARROW_STR, ArgValue::Null),
        }
    }
}

impl<T> From<*const T> for Arg<'_> {
    fn from(p: *const T) -> Self {
        Self::new(NativeType::CONST_VOID_PTR, ArgValue::Address(p as usize))
    }
}

impl<T> From<*mut T> for Arg<'_> {
    fn from(p: *mut T) -> Self {
        Self::new(NativeType::VOID_PTR, ArgValue::Address(p as usize))
    }
}

macro_rules! impl_count_from {
    ($($rust:ty => $scalar:ident, $slot:ident);* $(;)?) => {
        $(
            impl<'a> From<&'a Cell<$rust>> for Arg<'a> {
                fn from(c: &'a Cell<$rust>) -> Self {
                    Self::new(
                        NativeType::Pointer {
                            pointee: Pointee::Scalar(ScalarType::$scalar),
                            is_const: false,
                        },
                        ArgValue::Count(CountSlot::$slot(c)),
                    )
                }
            }
        )*
    };
}

impl_count_from! {
    i8 => SignedChar, SignedChar;
    i16 => Short, Short;
    i32 => Int, Int;
    i64 => LongLong, Long;
    isize => PtrDiff, PtrDiff;
    usize => Size, Size;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_scalars_map_to_c_types() {
        assert_eq!(Arg::from(1i32).native_type(), NativeType::INT);
        assert_eq!(Arg::from(1.5f64).native_type(), NativeType::DOUBLE);
        assert_eq!(
            Arg::from(7usize).native_type(),
            NativeType::Scalar(ScalarType::Size)
        );
        assert_eq!(
            Arg::from(7u64).native_type(),
            NativeType::Scalar(ScalarType::UnsignedLongLong)
        );
        assert_eq!(
            Arg::from('A').native_type(),
            NativeType::Scalar(ScalarType::Char)
        );
        assert_eq!(
            Arg::from(true).native_type(),
            NativeType::Scalar(ScalarType::Bool)
        );
    }

    #[test]
    fn text_maps_to_narrow_string() {
        let owned = String::from("abc");
        assert_eq!(Arg::from("x").native_type(), NativeType::NARROW_STR);
        assert_eq!(Arg::from(&owned).native_type(), NativeType::NARROW_STR);
        assert_eq!(Arg::from(c"x").native_type(), NativeType::NARROW_STR);
        assert_eq!(Arg::wide_str("x").native_type(), NativeType::WIDE_STR);
        assert!(matches!(Arg::from(None::<&str>).value(), ArgValue::Null));
    }

    #[test]
    fn raw_pointers_keep_constness() {
        let x = 5i32;
        let mut y = 6i32;
        assert_eq!(
            Arg::from(&x as *const i32).native_type(),
            NativeType::CONST_VOID_PTR
        );
        assert_eq!(
            Arg::from(&mut y as *mut i32).native_type(),
            NativeType::VOID_PTR
        );
    }

    #[test]
    fn count_slots_store_narrowed() {
        let wide = Cell::new(0i32);
        let narrow = Cell::new(0i8);
        if let ArgValue::Count(slot) = Arg::from(&wide).value() {
            slot.store(300);
        }
        if let ArgValue::Count(slot) = Arg::from(&narrow).value() {
            slot.store(300);
        }
        assert_eq!(wide.get(), 300);
        assert_eq!(narrow.get(), 300usize as i8);
    }

    #[test]
    fn long_and_long_long_slots_differ_in_type() {
        let slot = Cell::new(0i64);
        assert_eq!(
            Arg::long_count(&slot).native_type(),
            NativeType::scalar_ptr(ScalarType::Long)
        );
        assert_eq!(
            Arg::from(&slot).native_type(),
            NativeType::scalar_ptr(ScalarType::LongLong)
        );
    }

    #[test]
    fn value_conversions() {
        assert_eq!(ArgValue::Float(-2.9).as_i64(), -2);
        assert_eq!(ArgValue::Char('A').as_i64(), 65);
        assert_eq!(ArgValue::Signed(-1).as_u64(), u64::MAX);
        assert_eq!(ArgValue::Unsigned(3).as_f64(), 3.0);
        assert_eq!(ArgValue::Null.as_address(), 0);
    }
}
