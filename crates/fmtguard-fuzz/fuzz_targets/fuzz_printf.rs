#![no_main]
use fmtguard_core::guard::Arg;
use fmtguard_core::stdio::{measure, vsnprintf};
use fmtguard_core::{GuardMode, Sink, format_two_pass, print_with_mode, validate};
use libfuzzer_sys::fuzz_target;

// First byte picks the argument mix, the rest is the format string.
fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let Ok(fmt) = std::str::from_utf8(rest) else {
        return;
    };
    // Keep widths and precisions small enough to render.
    if fmt
        .as_bytes()
        .windows(5)
        .any(|w| w.iter().all(u8::is_ascii_digit))
    {
        return;
    }

    let pool = [
        Arg::from(i32::from(selector) - 128),
        Arg::from("fuzz"),
        Arg::from(1.5f64),
        Arg::from('x'),
        Arg::from(u64::MAX),
        Arg::null(),
        Arg::long(-1),
    ];
    let args: Vec<Arg<'_>> = pool
        .iter()
        .cycle()
        .skip(usize::from(selector >> 3))
        .take(usize::from(selector % 8))
        .copied()
        .collect();

    let checked = validate(fmt, &args);

    // Both passes agree, checked or not.
    let n = measure(fmt, &args);
    let mut buf = [0u8; 64];
    assert_eq!(vsnprintf(&mut buf, fmt, &args), n);
    if n > 1 << 16 {
        return;
    }
    assert_eq!(format_two_pass(fmt, &args).count(), n);

    let mut out = String::new();
    let strict = print_with_mode(GuardMode::Strict, Sink::appendable(&mut out), fmt, &args);
    assert_eq!(strict.is_ok(), checked.is_ok());
    if let Ok(written) = strict {
        assert_eq!(written, n);
        assert_eq!(out.len(), usize::try_from(n).unwrap_or(0));
    }
});
