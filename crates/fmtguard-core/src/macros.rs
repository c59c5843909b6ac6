//! Call-site macros.

/// Build an argument array from expressions.
///
/// Each expression goes through `Arg::from`, so anything with a `From`
/// conversion (integers, floats, `char`, `&str`, raw pointers, `&Cell<_>`
/// count slots, prebuilt `Arg`s) can be mixed freely.
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        [$($crate::guard::Arg::from($arg)),*]
    };
}

/// Type-checked printf to standard output.
///
/// Expands to [`print`](crate::guard::print) and returns
/// `Result<i32, FormatError>`.
#[macro_export]
macro_rules! printf {
    ($fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::guard::print($fmt, &$crate::args![$($arg),*])
    };
}

/// Type-checked printf to an explicit [`Sink`](crate::guard::Sink).
#[macro_export]
macro_rules! fprintf {
    ($sink:expr, $fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::guard::print_to($sink, $fmt, &$crate::args![$($arg),*])
    };
}
