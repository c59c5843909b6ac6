//! Native type identities and the conversion relation between them.
//!
//! Every argument carries one of these tags, and every printf directive
//! demands one. Labels come from a static registry so diagnostics read the
//! same on every platform (`int`, `const char*`, `unsigned long long`, ...).

use std::fmt;

/// Arithmetic C types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
    Char,
    SignedChar,
    UnsignedChar,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,
    IntMax,
    UIntMax,
    Size,
    PtrDiff,
    WChar,
    Float,
    Double,
    LongDouble,
}

impl ScalarType {
    /// Diagnostic label.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::SignedChar => "signed char",
            Self::UnsignedChar => "unsigned char",
            Self::Short => "short",
            Self::UnsignedShort => "unsigned short",
            Self::Int => "int",
            Self::UnsignedInt => "unsigned int",
            Self::Long => "long",
            Self::UnsignedLong => "unsigned long",
            Self::LongLong => "long long",
            Self::UnsignedLongLong => "unsigned long long",
            Self::IntMax => "intmax_t",
            Self::UIntMax => "uintmax_t",
            Self::Size => "size_t",
            Self::PtrDiff => "ptrdiff_t",
            Self::WChar => "wchar_t",
            Self::Float => "float",
            Self::Double => "double",
            Self::LongDouble => "long double",
        }
    }
}

/// What a pointer points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pointee {
    Void,
    Scalar(ScalarType),
}

impl Pointee {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Scalar(s) => s.name(),
        }
    }
}

/// Type identity of one argument or one directive requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    Scalar(ScalarType),
    Pointer { pointee: Pointee, is_const: bool },
    NullPointer,
}

impl NativeType {
    pub const INT: Self = Self::Scalar(ScalarType::Int);
    pub const DOUBLE: Self = Self::Scalar(ScalarType::Double);
    pub const VOID_PTR: Self = Self::ptr(Pointee::Void);
    pub const CONST_VOID_PTR: Self = Self::const_ptr(Pointee::Void);
    pub const NARROW_STR: Self = Self::const_ptr(Pointee::Scalar(ScalarType::Char));
    pub const WIDE_STR: Self = Self::const_ptr(Pointee::Scalar(ScalarType::WChar));

    /// Mutable pointer to `pointee`.
    #[must_use]
    pub const fn ptr(pointee: Pointee) -> Self {
        Self::Pointer {
            pointee,
            is_const: false,
        }
    }

    /// Pointer to const `pointee`.
    #[must_use]
    pub const fn const_ptr(pointee: Pointee) -> Self {
        Self::Pointer {
            pointee,
            is_const: true,
        }
    }

    /// Mutable pointer to an arithmetic type (the `%n` family).
    #[must_use]
    pub const fn scalar_ptr(scalar: ScalarType) -> Self {
        Self::ptr(Pointee::Scalar(scalar))
    }

    /// Whether a value of type `self` implicitly converts to `target`.
    ///
    /// Arithmetic types convert among themselves. Pointers convert to
    /// `bool`, to an identical pointer, by adding `const`, and to
    /// `void*`/`const void*` when the qualifiers allow it. The null pointer
    /// converts to every pointer type. Nothing converts from arithmetic to
    /// pointer.
    #[must_use]
    pub fn converts_to(self, target: Self) -> bool {
        match (self, target) {
            (Self::Scalar(_), Self::Scalar(_)) => true,
            (Self::Pointer { .. }, Self::Scalar(ScalarType::Bool)) => true,
            (Self::NullPointer, Self::Pointer { .. } | Self::NullPointer) => true,
            (
                Self::Pointer {
                    pointee: from,
                    is_const: from_const,
                },
                Self::Pointer {
                    pointee: to,
                    is_const: to_const,
                },
            ) => {
                // Dropping const is never implicit.
                if from_const && !to_const {
                    return false;
                }
                from == to || to == Pointee::Void
            }
            _ => false,
        }
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => f.write_str(s.name()),
            Self::Pointer { pointee, is_const } => {
                if *is_const {
                    f.write_str("const ")?;
                }
                write!(f, "{}*", pointee.name())
            }
            Self::NullPointer => f.write_str("nullptr_t"),
        }
    }
}

impl From<ScalarType> for NativeType {
    fn from(s: ScalarType) -> Self {
        Self::Scalar(s)
    }
}
