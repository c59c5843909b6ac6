//! # fmtguard-core
//!
//! Call-time type checking for printf-style formatting.
//!
//! A format string and a slice of type-tagged [`guard::Arg`]s are checked
//! against each other before anything is rendered. Matching calls are
//! formatted in two passes by a safe Rust `vsnprintf` and delivered to a
//! caller-chosen [`guard::Sink`]. No `unsafe` code is permitted at the
//! crate level.

#![deny(unsafe_code)]

pub mod config;
pub mod guard;
#[macro_use]
mod macros;
pub mod stdio;

pub use config::GuardMode;
pub use guard::{
    Arg, FormatError, Formatted, Sink, format_two_pass, print, print_to, print_with_mode, strout,
    validate,
};
