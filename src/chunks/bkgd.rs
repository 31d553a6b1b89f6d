use crate::{
  assert,
  chunk::{ChunkRecord, ChunkType},
  decode::DecodeContext,
  error::DecodeError,
  ihdr::ColorType,
  metadata::{BackgroundColor, MetadataEntry},
};

/// `bKGD`: Background colour
///
/// The payload shape depends on the image's color type, with an implied
/// alpha of "fully opaque".
pub(crate) fn decode(ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord) -> Result<(), DecodeError> {
  assert::singular(ctx, chunk)?;
  assert::precedes(ctx, chunk, ChunkType::IDAT)?;
  let header = ctx.header_or_err(chunk)?;
  let data = chunk.data(ctx.bytes);
  let value = match header.color_type {
    ColorType::Grayscale | ColorType::GrayscaleAlpha => {
      assert::data_length(ctx, chunk, 2)?;
      BackgroundColor::Grayscale(u16::from_be_bytes([data[0], data[1]]))
    }
    ColorType::Truecolor | ColorType::TruecolorAlpha => {
      assert::data_length(ctx, chunk, 6)?;
      BackgroundColor::Rgb([
        u16::from_be_bytes([data[0], data[1]]),
        u16::from_be_bytes([data[2], data[3]]),
        u16::from_be_bytes([data[4], data[5]]),
      ])
    }
    ColorType::Indexed => {
      assert::data_length(ctx, chunk, 1)?;
      BackgroundColor::PaletteIndex(data[0])
    }
  };
  ctx.metadata.push(MetadataEntry::Background(value));
  Ok(())
}
