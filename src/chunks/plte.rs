use crate::{
  assert,
  chunk::{ChunkRecord, ChunkType},
  decode::DecodeContext,
  error::{DecodeError, DecodeErrorKind},
  ihdr::ColorType,
  palette::Palette,
};

/// `PLTE`: Palette
///
/// 1 to 256 RGB triples. Required for indexed color, meaningless for the
/// grayscale types, optional (as a quantization suggestion) for truecolor.
pub(crate) fn decode(ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord) -> Result<(), DecodeError> {
  assert::singular(ctx, chunk)?;
  assert::precedes(ctx, chunk, ChunkType::bKGD)?;
  assert::precedes(ctx, chunk, ChunkType::hIST)?;
  assert::precedes(ctx, chunk, ChunkType::tRNS)?;
  assert::precedes(ctx, chunk, ChunkType::IDAT)?;
  assert::data_length_gte(ctx, chunk, 3)?;
  if chunk.data_len % 3 != 0 {
    let n = chunk.data_len;
    return Err(ctx.err(
      DecodeErrorKind::ChunkDataLengthShort,
      chunk.offset,
      format!("PLTE: Invalid data length: {n} is not divisible by 3"),
    ));
  }
  let size = chunk.data_len / 3;
  if size > 256 {
    ctx.warn(chunk.offset, format!("PLTE: Too many entries ({size} > 256)"))?;
  }
  if let Some(header) = ctx.header {
    match header.color_type {
      ColorType::Grayscale | ColorType::GrayscaleAlpha => {
        let ct = header.color_type;
        ctx.warn(chunk.offset, format!("PLTE: Should not be present for color type {ct}"))?;
      }
      _ => (),
    }
    let max = 1_usize << header.bit_depth.min(8);
    if size > max {
      let d = header.bit_depth;
      ctx.warn(
        chunk.offset,
        format!("PLTE: Too many entries for bit depth {d} ({size} > {max})"),
      )?;
    }
  }
  if ctx.palette.is_none() {
    let data = chunk.data(ctx.bytes);
    ctx.palette = Some(Palette::new(data.to_vec()));
  }
  Ok(())
}
