use crate::{
  assert,
  chunk::{ChunkRecord, ChunkType},
  decode::DecodeContext,
  error::{DecodeError, DecodeErrorKind},
  metadata::{MetadataEntry, StereoMode},
};

/// `sTER`: Stereo pair layout
///
/// The image holds two side-by-side sub-images. Their shared width implies a
/// column padding of `15 - ((W - 1) mod 16)` between them, and a padding
/// above 7 means no integral sub-image width exists at all.
pub(crate) fn decode(ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord) -> Result<(), DecodeError> {
  assert::singular(ctx, chunk)?;
  assert::precedes(ctx, chunk, ChunkType::IDAT)?;
  assert::data_length(ctx, chunk, 1)?;
  let raw = chunk.data(ctx.bytes)[0];
  let mode = match raw {
    0 => StereoMode::CrossFuse,
    1 => StereoMode::DivergingFuse,
    other => {
      return Err(ctx.err(
        DecodeErrorKind::InvalidChunkData,
        chunk.offset,
        format!("sTER: Invalid mode \"{other}\""),
      ))
    }
  };
  let header = ctx.header_or_err(chunk)?;
  let padding = 15 - ((header.width - 1) % 16);
  if padding > 7 {
    return Err(ctx.err(
      DecodeErrorKind::InvalidChunkData,
      chunk.offset,
      format!("sTER: Invalid padding ({padding} > 7)"),
    ));
  }
  ctx.metadata.push(MetadataEntry::Stereo(mode));
  Ok(())
}

pub(crate) fn encode(mode: StereoMode) -> Vec<u8> {
  vec![mode as u8]
}
