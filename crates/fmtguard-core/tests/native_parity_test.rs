//! Integration test: engine output vs host snprintf
//!
//! Renders the same directive with the safe engine and with the host C
//! library and requires byte-identical output and identical reported
//! lengths. Only directives whose output is fully specified by POSIX are
//! compared.
//!
//! Run: cargo test -p fmtguard-core --test native_parity_test

#![allow(unsafe_code)]

use std::ffi::{CString, c_char, c_double, c_int, c_long, c_uint};

use fmtguard_core::guard::Arg;
use fmtguard_core::stdio::vsnprintf;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Run a host snprintf call twice (measure, then fill) and return the text.
fn host<F>(fmt: &str, call: F) -> (i32, String)
where
    F: Fn(*mut c_char, usize, *const c_char) -> c_int,
{
    let cfmt = CString::new(fmt).expect("format has no interior NUL");
    let n = call(std::ptr::null_mut(), 0, cfmt.as_ptr());
    assert!(n >= 0, "host snprintf failed for {fmt:?}");
    let mut buf = vec![0u8; n as usize + 1];
    let m = call(buf.as_mut_ptr().cast(), buf.len(), cfmt.as_ptr());
    assert_eq!(n, m);
    buf.truncate(n as usize);
    (n, String::from_utf8(buf).expect("host output is UTF-8"))
}

fn engine(fmt: &str, args: &[Arg<'_>]) -> (i32, String) {
    let n = vsnprintf(&mut [], fmt, args);
    let mut buf = vec![0u8; n as usize];
    vsnprintf(&mut buf, fmt, args);
    (n, String::from_utf8(buf).expect("engine output is UTF-8"))
}

fn assert_int_parity(fmt: &str, value: i32) {
    let expected = host(fmt, |dst, len, f| unsafe { libc::snprintf(dst, len, f, value as c_int) });
    assert_eq!(engine(fmt, &[Arg::from(value)]), expected, "format {fmt:?} value {value}");
}

fn assert_uint_parity(fmt: &str, value: u32) {
    let expected =
        host(fmt, |dst, len, f| unsafe { libc::snprintf(dst, len, f, value as c_uint) });
    assert_eq!(engine(fmt, &[Arg::from(value)]), expected, "format {fmt:?} value {value}");
}

fn assert_double_parity(fmt: &str, value: f64) {
    let expected =
        host(fmt, |dst, len, f| unsafe { libc::snprintf(dst, len, f, value as c_double) });
    assert_eq!(engine(fmt, &[Arg::from(value)]), expected, "format {fmt:?} value {value}");
}

// ---------------------------------------------------------------------------
// 1. Signed integers
// ---------------------------------------------------------------------------

#[test]
fn signed_integer_directives_match_host() {
    let formats = [
        "%d", "%i", "%5d", "%-5d|", "%05d", "%+d", "% d", "%.3d", "%8.3d", "%-+8.3d|", "%.0d",
        "%hd", "%hhd",
    ];
    let values = [0, 1, -1, 42, -42, 300, i32::MAX, i32::MIN];
    for fmt in formats {
        for value in values {
            assert_int_parity(fmt, value);
        }
    }
}

#[test]
fn long_directive_matches_host() {
    for value in [0i64, -9_000_000_000, i64::MAX, i64::MIN] {
        let fmt = "[%20ld]";
        let expected = host(fmt, |dst, len, f| unsafe {
            libc::snprintf(dst, len, f, value as c_long)
        });
        assert_eq!(engine(fmt, &[Arg::long(value)]), expected);
    }
}

// ---------------------------------------------------------------------------
// 2. Unsigned integers
// ---------------------------------------------------------------------------

#[test]
fn unsigned_integer_directives_match_host() {
    let formats = [
        "%u", "%x", "%X", "%o", "%#x", "%#X", "%#o", "%08x", "%#08x", "%-#8o|", "%.0u", "%#.0o",
        "%#.3o", "%hu", "%hhx",
    ];
    let values = [0u32, 1, 8, 255, 4096, 0xdead_beef, u32::MAX];
    for fmt in formats {
        for value in values {
            assert_uint_parity(fmt, value);
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Strings and characters
// ---------------------------------------------------------------------------

#[test]
fn string_directives_match_host() {
    let formats = ["%s", "%10s", "%-10s|", "%.2s", "%8.3s", "%-8.0s|"];
    for text in ["", "a", "hello", "hello, world"] {
        let c = CString::new(text).unwrap();
        for fmt in formats {
            let expected = host(fmt, |dst, len, f| unsafe {
                libc::snprintf(dst, len, f, c.as_ptr())
            });
            assert_eq!(engine(fmt, &[Arg::from(text)]), expected, "format {fmt:?}");
            assert_eq!(engine(fmt, &[Arg::from(c.as_c_str())]), expected);
        }
    }
}

#[test]
fn char_directives_match_host() {
    for fmt in ["%c", "%3c", "%-3c|"] {
        for ch in ['A', 'z', '0', ' '] {
            let expected = host(fmt, |dst, len, f| unsafe {
                libc::snprintf(dst, len, f, ch as c_int)
            });
            assert_eq!(engine(fmt, &[Arg::from(ch)]), expected, "format {fmt:?}");
        }
    }
}

#[test]
fn percent_and_literals_match_host() {
    for fmt in ["100%%", "%%%%", "plain", ""] {
        let expected = host(fmt, |dst, len, f| unsafe { libc::snprintf(dst, len, f) });
        assert_eq!(engine(fmt, &[]), expected, "format {fmt:?}");
    }
}

// ---------------------------------------------------------------------------
// 4. Floating point
// ---------------------------------------------------------------------------

#[test]
fn float_directives_match_host() {
    let formats = [
        "%f", "%.0f", "%.2f", "%10.3f", "%-10.1f|", "%+f", "%#.0f", "%e", "%.3E", "%g", "%.3g",
        "%#g", "%G", "%a", "%.2a", "%A",
    ];
    let values = [
        0.0, -0.0, 1.0, 0.5, 2.5, -1.25, 3.14159, 1234.5678, 1e-5, 6.02e23, 100000.0, 1e6,
    ];
    for fmt in formats {
        for value in values {
            assert_double_parity(fmt, value);
        }
    }
}

#[test]
fn non_finite_floats_match_host() {
    for fmt in ["%f", "%E", "%8g", "%-6f|", "%+e"] {
        for value in [f64::INFINITY, f64::NEG_INFINITY] {
            assert_double_parity(fmt, value);
        }
    }
}

// ---------------------------------------------------------------------------
// 5. Truncation contract
// ---------------------------------------------------------------------------

#[test]
fn truncated_destination_reports_full_length() {
    let fmt = "%s=%d";
    let c = CString::new("key").unwrap();
    let mut host_buf = [0u8; 4];
    let cfmt = CString::new(fmt).unwrap();
    let host_n = unsafe {
        libc::snprintf(
            host_buf.as_mut_ptr().cast(),
            host_buf.len(),
            cfmt.as_ptr(),
            c.as_ptr(),
            12345 as c_int,
        )
    };

    // Host reserves a byte for NUL; the engine has no terminator.
    let mut engine_buf = [0u8; 3];
    let engine_n = vsnprintf(&mut engine_buf, fmt, &[Arg::from("key"), Arg::from(12345)]);
    assert_eq!(engine_n, host_n);
    assert_eq!(&engine_buf, &host_buf[..3]);
}
