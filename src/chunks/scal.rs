use crate::{
  assert,
  chunk::{ChunkRecord, ChunkType},
  chunks::latin1_to_string,
  decode::DecodeContext,
  error::{DecodeError, DecodeErrorKind},
  metadata::{MetadataEntry, ScaleUnit},
};

/// `sCAL`: Physical scale of the image subject
///
/// A unit byte followed by two NUL-separated ASCII floats (the per-pixel
/// width and height of the subject). The values must be positive.
pub(crate) fn decode(ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord) -> Result<(), DecodeError> {
  assert::singular(ctx, chunk)?;
  assert::precedes(ctx, chunk, ChunkType::IDAT)?;
  assert::data_length_gte(ctx, chunk, 4)?;
  let data = chunk.data(ctx.bytes);
  let unit = match data[0] {
    0 => ScaleUnit::Meter,
    1 => ScaleUnit::Radian,
    other => {
      return Err(ctx.err(
        DecodeErrorKind::InvalidChunkData,
        chunk.offset,
        format!("sCAL: Invalid unit specifier \"{other}\""),
      ))
    }
  };
  let mut it = data[1..].splitn(2, |&b| b == 0);
  let x_raw = it.next().unwrap_or_default();
  let y_raw = it.next().unwrap_or_default();
  let parse = |raw: &[u8], ctx: &mut DecodeContext<'_>| -> Result<f64, DecodeError> {
    let text = core::str::from_utf8(raw).unwrap_or("");
    match text.parse::<f64>() {
      Ok(v) => Ok(v),
      Err(_) => Err(ctx.err(
        DecodeErrorKind::InvalidChunkData,
        chunk.offset,
        format!("sCAL: Invalid value \"{}\"", latin1_to_string(raw)),
      )),
    }
  };
  let x = parse(x_raw, ctx)?;
  let y = parse(y_raw, ctx)?;
  for v in [x, y] {
    if v <= 0.0 {
      ctx.warn(chunk.offset, format!("sCAL: Invalid value \"{v}\""))?;
    }
  }
  ctx.metadata.push(MetadataEntry::Scale { unit, x, y });
  Ok(())
}
