//! Line diffs for failed cases.

use std::fmt::Write as _;

/// Line-by-line diff of `expected` against `actual`.
///
/// Only differing lines are listed, each as a `@@ line N @@` hunk with the
/// expected side (`-`) and actual side (`+`) debug-quoted so whitespace shows.
#[must_use]
pub fn render_diff(expected: &str, actual: &str) -> String {
    if expected == actual {
        return String::from("[identical]");
    }

    let mut left = expected.split('\n');
    let mut right = actual.split('\n');
    let mut out = String::from("--- expected\n+++ actual\n");
    for line in 1.. {
        let (e, a) = (left.next(), right.next());
        if e.is_none() && a.is_none() {
            break;
        }
        if e == a {
            continue;
        }
        let _ = writeln!(out, "@@ line {line} @@");
        if let Some(e) = e {
            let _ = writeln!(out, "-{e:?}");
        }
        if let Some(a) = a {
            let _ = writeln!(out, "+{a:?}");
        }
    }
    out
}
