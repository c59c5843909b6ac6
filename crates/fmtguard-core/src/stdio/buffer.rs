//! Output buffers for the formatting engine.
//!
//! The engine never writes through a growable string directly. Every
//! renderer targets a [`FormatBuf`], which lets the same directive walk
//! serve both halves of a two-pass format:
//!
//! - [`CountingBuf`]: the measuring pass. Stores nothing, counts every byte.
//! - [`SliceBuf`]: the filling pass. Writes into a caller-owned slice with a
//!   bounded cursor and keeps counting past the end, exactly like
//!   `snprintf` reports the untruncated length.
//!
//! Invariant for `SliceBuf`: `pos <= dst.len()` and `pos <= written`.

/// Byte destination for rendered directives.
pub trait FormatBuf {
    /// Append a single byte.
    fn push(&mut self, byte: u8);

    /// Append a run of bytes.
    fn extend_from_slice(&mut self, bytes: &[u8]);

    /// Total bytes produced so far, including any that did not fit.
    fn written(&self) -> usize;

    /// Append `count` copies of `byte`.
    fn fill(&mut self, byte: u8, count: usize) {
        for _ in 0..count {
            self.push(byte);
        }
    }
}

impl FormatBuf for Vec<u8> {
    fn push(&mut self, byte: u8) {
        Vec::push(self, byte);
    }

    fn extend_from_slice(&mut self, bytes: &[u8]) {
        Vec::extend_from_slice(self, bytes);
    }

    fn written(&self) -> usize {
        self.len()
    }

    fn fill(&mut self, byte: u8, count: usize) {
        self.resize(self.len() + count, byte);
    }
}

/// Measuring buffer: counts bytes without storing them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CountingBuf {
    count: usize,
}

impl CountingBuf {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FormatBuf for CountingBuf {
    fn push(&mut self, _byte: u8) {
        self.count = self.count.saturating_add(1);
    }

    fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.count = self.count.saturating_add(bytes.len());
    }

    fn written(&self) -> usize {
        self.count
    }

    fn fill(&mut self, _byte: u8, count: usize) {
        self.count = self.count.saturating_add(count);
    }
}

/// Bounded buffer over a caller slice.
///
/// Bytes past the end of the slice are dropped but still counted.
#[derive(Debug)]
pub struct SliceBuf<'a> {
    dst: &'a mut [u8],
    /// Next write position inside `dst`.
    pos: usize,
    /// Bytes produced, stored or not.
    written: usize,
}

impl<'a> SliceBuf<'a> {
    pub fn new(dst: &'a mut [u8]) -> Self {
        Self {
            dst,
            pos: 0,
            written: 0,
        }
    }
}

impl FormatBuf for SliceBuf<'_> {
    fn push(&mut self, byte: u8) {
        if self.pos < self.dst.len() {
            self.dst[self.pos] = byte;
            self.pos += 1;
        }
        self.written = self.written.saturating_add(1);
    }

    fn extend_from_slice(&mut self, bytes: &[u8]) {
        let room = self.dst.len() - self.pos;
        let take = bytes.len().min(room);
        self.dst[self.pos..self.pos + take].copy_from_slice(&bytes[..take]);
        self.pos += take;
        self.written = self.written.saturating_add(bytes.len());
    }

    fn written(&self) -> usize {
        self.written
    }

    fn fill(&mut self, byte: u8, count: usize) {
        let take = count.min(self.dst.len() - self.pos);
        self.dst[self.pos..self.pos + take].fill(byte);
        self.pos += take;
        self.written = self.written.saturating_add(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_buf_counts_without_storing() {
        let mut buf = CountingBuf::new();
        buf.push(b'a');
        buf.extend_from_slice(b"bcd");
        buf.fill(b' ', 4);
        assert_eq!(buf.written(), 8);
    }

    #[test]
    fn slice_buf_exact_fit() {
        let mut storage = [0u8; 5];
        let mut buf = SliceBuf::new(&mut storage);
        buf.extend_from_slice(b"hel");
        buf.push(b'l');
        buf.push(b'o');
        assert_eq!(buf.written(), 5);
        assert_eq!(&storage, b"hello");
    }

    #[test]
    fn slice_buf_truncates_but_keeps_counting() {
        let mut storage = [0u8; 3];
        let mut buf = SliceBuf::new(&mut storage);
        buf.extend_from_slice(b"hello");
        buf.push(b'!');
        assert_eq!(buf.written(), 6);
        assert_eq!(&storage, b"hel");
    }

    #[test]
    fn slice_buf_empty_is_a_measuring_pass() {
        let mut buf = SliceBuf::new(&mut []);
        buf.extend_from_slice(b"abc");
        buf.fill(b'0', 2);
        assert_eq!(buf.written(), 5);
    }

    #[test]
    fn slice_buf_fill_stops_at_capacity() {
        let mut storage = [0u8; 4];
        let mut buf = SliceBuf::new(&mut storage);
        buf.push(b'x');
        buf.fill(b' ', 1_000_000);
        assert_eq!(buf.written(), 1_000_001);
        assert_eq!(&storage, b"x   ");
    }

    #[test]
    fn vec_fill_appends_padding() {
        let mut v = b"x".to_vec();
        FormatBuf::fill(&mut v, b'-', 3);
        assert_eq!(v, b"x---");
        assert_eq!(v.written(), 4);
    }
}
