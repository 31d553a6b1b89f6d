use crate::{
  assert,
  chunk::{ChunkRecord, ChunkType},
  decode::DecodeContext,
  error::DecodeError,
  ihdr::ColorType,
  metadata::MetadataEntry,
};

/// `sBIT`: Significant bits
///
/// How many bits per channel were significant in the original data: one
/// entry per channel, three for indexed color (which is RGB under the hood).
/// Each value should be between 1 and the sample depth.
pub(crate) fn decode(ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord) -> Result<(), DecodeError> {
  assert::singular(ctx, chunk)?;
  assert::precedes(ctx, chunk, ChunkType::PLTE)?;
  assert::precedes(ctx, chunk, ChunkType::IDAT)?;
  let header = ctx.header_or_err(chunk)?;
  let expected = match header.color_type {
    ColorType::Grayscale => 1,
    ColorType::GrayscaleAlpha => 2,
    ColorType::Truecolor | ColorType::Indexed => 3,
    ColorType::TruecolorAlpha => 4,
  };
  assert::data_length(ctx, chunk, expected)?;
  let data = chunk.data(ctx.bytes).to_vec();
  ctx.metadata.push(MetadataEntry::SignificantBits(data));
  Ok(())
}

pub(crate) fn encode(values: &[u8]) -> Vec<u8> {
  values.to_vec()
}
