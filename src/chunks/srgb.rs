use crate::{
  assert,
  chunk::{ChunkRecord, ChunkType},
  decode::DecodeContext,
  error::{DecodeError, DecodeErrorKind},
  metadata::{MetadataEntry, RenderingIntent},
};

/// `sRGB`: Standard RGB colour space
///
/// The samples conform to sRGB and should be displayed with the given
/// rendering intent. Overrides `gAMA`/`cHRM`; mutually exclusive with
/// `iCCP`.
pub(crate) fn decode(ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord) -> Result<(), DecodeError> {
  assert::singular(ctx, chunk)?;
  assert::not_alongside(ctx, chunk, ChunkType::iCCP)?;
  assert::precedes(ctx, chunk, ChunkType::PLTE)?;
  assert::precedes(ctx, chunk, ChunkType::IDAT)?;
  assert::data_length(ctx, chunk, 1)?;
  let raw = chunk.data(ctx.bytes)[0];
  let intent = RenderingIntent::try_from(raw).map_err(|()| {
    ctx.err(
      DecodeErrorKind::InvalidChunkData,
      chunk.offset,
      format!("sRGB: Invalid rendering intent \"{raw}\""),
    )
  })?;
  ctx.metadata.push(MetadataEntry::StandardRgb(intent));
  Ok(())
}

pub(crate) fn encode(intent: RenderingIntent) -> Vec<u8> {
  vec![intent as u8]
}
