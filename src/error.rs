//! The warning and error carriers used by decoding and encoding.

use crate::{ChunkRecord, Ihdr, MetadataEntry};

/// A recoverable irregularity found while decoding or encoding.
///
/// Warnings accumulate on the result value in permissive mode. In strict mode
/// they are promoted to errors the moment they would be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngWarning {
  /// Human-readable description, prefixed with the chunk type where one is
  /// responsible (for example `"sRGB: Must precede PLTE"`).
  pub message: String,
  /// Byte offset into the datastream that the warning refers to.
  pub offset: usize,
}
impl core::fmt::Display for PngWarning {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    write!(f, "{} (offset {})", self.message, self.offset)
  }
}

/// Broad classification of a [`DecodeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum DecodeErrorKind {
  /// Fewer than 8 bytes of input.
  NotEnoughBytesForSignature,
  /// The first 8 bytes are not the PNG signature.
  SignatureMismatch,
  /// The datastream ended in the middle of a read.
  EofWhileReading,
  /// A chunk's stored CRC disagrees with the computed one (strict mode only,
  /// otherwise this is a warning).
  ChunkCrcMismatch,
  /// A critical chunk type this crate does not know.
  UnrecognizedCriticalChunkType,
  /// Width, height, bit depth, color type, or an illegal combination thereof.
  InvalidIhdrValue,
  /// A "must follow" ordering rule was broken.
  OrderingFollowsViolation,
  /// A chunk's data is shorter (or otherwise the wrong size) for its type.
  ChunkDataLengthShort,
  /// A chunk's payload bytes are structurally valid but carry an illegal
  /// value.
  InvalidChunkData,
  /// The concatenated IDAT stream would not inflate.
  InflateError,
  /// A scanline declared a filter type outside 0..=4.
  InvalidFilterType,
  /// Indexed color with no PLTE chunk.
  MissingPalette,
  /// An indexed sample referenced beyond the palette.
  OutOfRangePaletteIndex,
  /// No IDAT chunk in the datastream.
  NoIdat,
  /// The first chunk was something other than IHDR.
  FirstChunkNotIhdr,
  /// A warning promoted to an error by strict mode.
  StrictModeViolation,
}

/// Everything that had been decoded at the moment a fatal error was produced.
///
/// Attached to every [`DecodeError`] so callers can surface what was learned
/// before the failure: a file with a broken IDAT stream still has a readable
/// header, chunk table, and metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialDecode {
  /// The parsed header, if decoding got that far.
  pub details: Option<Ihdr>,
  /// Metadata entries decoded before the failure.
  pub metadata: Vec<MetadataEntry>,
  /// The chunk table, if the datastream was segmentable.
  pub raw_chunks: Vec<ChunkRecord>,
  /// Warnings collected before the failure.
  pub warnings: Vec<PngWarning>,
  /// Informational notes (unrecognized ancillary chunk types).
  pub info: Vec<String>,
}

/// A fatal decoding failure.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeError {
  /// What category of problem this is.
  pub kind: DecodeErrorKind,
  /// Human-readable description, chunk-type prefixed where applicable.
  pub message: String,
  /// Byte offset into the datastream where the problem was found.
  pub offset: usize,
  /// Snapshot of the decode state at the time of failure.
  pub partial: Box<PartialDecode>,
}
impl DecodeError {
  /// A decode error with no accumulated state, for failures before any chunk
  /// was seen.
  #[inline]
  #[must_use]
  pub(crate) fn bare(kind: DecodeErrorKind, offset: usize, message: String) -> Self {
    Self { kind, message, offset, partial: Box::default() }
  }
}
impl core::fmt::Display for DecodeError {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_str(&self.message)
  }
}
impl std::error::Error for DecodeError {}

/// A fatal encoding failure.
///
/// Produced when the caller pinned a storage format that cannot represent the
/// pixels and strict mode forbids upgrading it, or when options are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeError {
  /// Human-readable description.
  pub message: String,
}
impl EncodeError {
  #[inline]
  #[must_use]
  pub(crate) fn new(message: String) -> Self {
    Self { message }
  }
}
impl core::fmt::Display for EncodeError {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_str(&self.message)
  }
}
impl std::error::Error for EncodeError {}
