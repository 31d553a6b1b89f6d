use crate::{
  assert,
  chunk::{ChunkRecord, ChunkType},
  decode::DecodeContext,
  error::DecodeError,
  metadata::{Chromaticities, MetadataEntry},
  reader::ByteWriter,
};

/// Wire values are the floating point values times this.
const SCALE: f64 = 100_000.0;

/// `cHRM`: Primary chromaticities and white point
///
/// Superseded by `sRGB` or `iCCP` when one of those is present and
/// recognized. Chromaticity coordinates land in `0..=1`, so raw values above
/// 100000 warn.
pub(crate) fn decode(ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord) -> Result<(), DecodeError> {
  assert::singular(ctx, chunk)?;
  assert::precedes(ctx, chunk, ChunkType::PLTE)?;
  assert::precedes(ctx, chunk, ChunkType::IDAT)?;
  assert::data_length(ctx, chunk, 32)?;
  let data = chunk.data(ctx.bytes);
  let mut raw = [0_u32; 8];
  for (i, slot) in raw.iter_mut().enumerate() {
    *slot = u32::from_be_bytes([data[i * 4], data[i * 4 + 1], data[i * 4 + 2], data[i * 4 + 3]]);
  }
  const NAMES: [&str; 8] =
    ["white x", "white y", "red x", "red y", "green x", "green y", "blue x", "blue y"];
  for (value, name) in raw.iter().zip(NAMES.iter()) {
    if *value > 100_000 {
      let v = *value as f64 / SCALE;
      ctx.warn(chunk.offset, format!("cHRM: Invalid {name} \"{v}\""))?;
    }
  }
  ctx.metadata.push(MetadataEntry::Chromaticities(Chromaticities {
    white_x: raw[0] as f64 / SCALE,
    white_y: raw[1] as f64 / SCALE,
    red_x: raw[2] as f64 / SCALE,
    red_y: raw[3] as f64 / SCALE,
    green_x: raw[4] as f64 / SCALE,
    green_y: raw[5] as f64 / SCALE,
    blue_x: raw[6] as f64 / SCALE,
    blue_y: raw[7] as f64 / SCALE,
  }));
  Ok(())
}

pub(crate) fn encode(c: &Chromaticities) -> Vec<u8> {
  let mut w = ByteWriter::with_exact_size(32);
  for v in [c.white_x, c.white_y, c.red_x, c.red_y, c.green_x, c.green_y, c.blue_x, c.blue_y] {
    w.u32_be((v * SCALE).round() as u32);
  }
  w.finish()
}
