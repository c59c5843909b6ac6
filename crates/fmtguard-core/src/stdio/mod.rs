//! Native formatting engine.
//!
//! Implements the `vsnprintf` contract over type-tagged arguments: a
//! directive parser, per-conversion renderers, and the buffers that let one
//! walk either measure or fill.

pub mod buffer;
pub mod printf;

pub use buffer::{CountingBuf, FormatBuf, SliceBuf};
pub use printf::{measure, vsnprintf};
