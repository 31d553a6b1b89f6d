//! The ordering, cardinality, and size predicates chunks are checked
//! against.
//!
//! Each predicate looks at the set of chunk types already seen by the walk
//! and records a violation in the fixed message shapes. Severity follows the
//! rules' nature: "must follow" breaks are errors (the data the chunk needs
//! is missing), everything else is a warning that strict mode promotes.

use crate::{
  chunk::{ChunkRecord, ChunkType},
  decode::DecodeContext,
  error::{DecodeError, DecodeErrorKind},
};

/// At most one `T` in the datastream. Violation: warning.
pub(crate) fn singular(
  ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord,
) -> Result<(), DecodeError> {
  if ctx.seen(chunk.ty) {
    let t = chunk.ty;
    ctx.warn(chunk.offset, format!("{t}: Multiple {t} chunks not allowed"))?;
  }
  Ok(())
}

/// `T` must appear before `other`. Violation: warning.
pub(crate) fn precedes(
  ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord, other: ChunkType,
) -> Result<(), DecodeError> {
  if ctx.seen(other) {
    let t = chunk.ty;
    ctx.warn(chunk.offset, format!("{t}: Must precede {other}"))?;
  }
  Ok(())
}

/// `T` must appear after `other`. Violation: error.
pub(crate) fn follows(
  ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord, other: ChunkType,
) -> Result<(), DecodeError> {
  if !ctx.seen(other) {
    let t = chunk.ty;
    return Err(ctx.err(
      DecodeErrorKind::OrderingFollowsViolation,
      chunk.offset,
      format!("{t}: Must follow {other}"),
    ));
  }
  Ok(())
}

/// `T` must appear after `other`, but acceptance is permissive. Violation:
/// warning (so only strict mode rejects the chunk).
pub(crate) fn follows_lenient(
  ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord, other: ChunkType,
) -> Result<(), DecodeError> {
  if !ctx.seen(other) {
    let t = chunk.ty;
    ctx.warn(chunk.offset, format!("{t}: Must follow {other}"))?;
  }
  Ok(())
}

/// `T` and `other` are mutually exclusive. Violation: warning.
pub(crate) fn not_alongside(
  ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord, other: ChunkType,
) -> Result<(), DecodeError> {
  if ctx.seen(other) {
    let t = chunk.ty;
    ctx.warn(chunk.offset, format!("{t}: Should not be present alongside {other}"))?;
  }
  Ok(())
}

/// In-chunk compression method fields only have one defined value.
/// Violation: warning, and decoding proceeds as if the field were 0.
pub(crate) fn compression_method(
  ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord, value: u8,
) -> Result<(), DecodeError> {
  if value != 0 {
    let t = chunk.ty;
    ctx.warn(chunk.offset, format!("{t}: Invalid compression method \"{value}\""))?;
  }
  Ok(())
}

/// The chunk's data must be exactly `expected` bytes. Violation: error.
pub(crate) fn data_length(
  ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord, expected: usize,
) -> Result<(), DecodeError> {
  if chunk.data_len != expected {
    let t = chunk.ty;
    let n = chunk.data_len;
    return Err(ctx.err(
      DecodeErrorKind::ChunkDataLengthShort,
      chunk.offset,
      format!("{t}: Invalid data length: {n} !== {expected}"),
    ));
  }
  Ok(())
}

/// The chunk's data must be at least `min` bytes. Violation: error.
pub(crate) fn data_length_gte(
  ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord, min: usize,
) -> Result<(), DecodeError> {
  if chunk.data_len < min {
    let t = chunk.ty;
    let n = chunk.data_len;
    return Err(ctx.err(
      DecodeErrorKind::ChunkDataLengthShort,
      chunk.offset,
      format!("{t}: Invalid data length: {n} < {min}"),
    ));
  }
  Ok(())
}
