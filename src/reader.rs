//! Bounded big-endian reads and a sequential writer.
//!
//! Every read names the *role* of the value it was after, so that running off
//! the end of the input turns into a typed "EOF while reading chunk length"
//! style failure instead of a panic.

/// An out-of-bounds read, carrying what was being read and from where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Eof {
  pub role: &'static str,
  pub offset: usize,
}
impl Eof {
  #[inline]
  #[must_use]
  pub fn message(&self) -> String {
    format!("EOF while reading {}", self.role)
  }
}

/// Offset-addressed reads over a byte slice.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ByteReader<'b> {
  bytes: &'b [u8],
}
impl<'b> ByteReader<'b> {
  #[inline]
  #[must_use]
  pub const fn new(bytes: &'b [u8]) -> Self {
    Self { bytes }
  }

  #[inline]
  #[must_use]
  pub const fn len(&self) -> usize {
    self.bytes.len()
  }

  #[inline]
  pub fn u8(&self, offset: usize, role: &'static str) -> Result<u8, Eof> {
    match self.bytes.get(offset) {
      Some(b) => Ok(*b),
      None => Err(Eof { role, offset }),
    }
  }

  #[inline]
  pub fn u16_be(&self, offset: usize, role: &'static str) -> Result<u16, Eof> {
    match self.bytes.get(offset..offset + 2) {
      Some([a, b]) => Ok(u16::from_be_bytes([*a, *b])),
      _ => Err(Eof { role, offset }),
    }
  }

  #[inline]
  pub fn u32_be(&self, offset: usize, role: &'static str) -> Result<u32, Eof> {
    match self.bytes.get(offset..offset + 4) {
      Some([a, b, c, d]) => Ok(u32::from_be_bytes([*a, *b, *c, *d])),
      _ => Err(Eof { role, offset }),
    }
  }

  #[inline]
  pub fn i32_be(&self, offset: usize, role: &'static str) -> Result<i32, Eof> {
    self.u32_be(offset, role).map(|u| u as i32)
  }

  /// A borrowed view of `[start, end)`.
  #[inline]
  pub fn slice(&self, start: usize, end: usize, role: &'static str) -> Result<&'b [u8], Eof> {
    match self.bytes.get(start..end) {
      Some(s) => Ok(s),
      None => Err(Eof { role, offset: start }),
    }
  }
}

/// A sequential big-endian writer with an end assertion.
///
/// Fixed-layout chunk payloads are built by reserving exactly the payload
/// size up front; [`finish`](ByteWriter::finish) checks that every reserved
/// byte was actually written.
#[derive(Debug, Clone)]
pub(crate) struct ByteWriter {
  buf: Vec<u8>,
  expected: usize,
}
impl ByteWriter {
  #[inline]
  #[must_use]
  pub fn with_exact_size(expected: usize) -> Self {
    Self { buf: Vec::with_capacity(expected), expected }
  }

  #[inline]
  pub fn u8(&mut self, v: u8) {
    self.buf.push(v);
  }

  #[inline]
  pub fn u16_be(&mut self, v: u16) {
    self.buf.extend_from_slice(&v.to_be_bytes());
  }

  #[inline]
  pub fn u32_be(&mut self, v: u32) {
    self.buf.extend_from_slice(&v.to_be_bytes());
  }

  #[inline]
  pub fn i32_be(&mut self, v: i32) {
    self.buf.extend_from_slice(&v.to_be_bytes());
  }

  /// The finished payload. Panics (debug) if the writer was sized wrong.
  #[inline]
  #[must_use]
  pub fn finish(self) -> Vec<u8> {
    debug_assert_eq!(self.buf.len(), self.expected, "chunk payload size mismatch");
    self.buf
  }
}
