use crate::{
  assert,
  chunk::{ChunkRecord, ChunkType},
  decode::DecodeContext,
  error::{DecodeError, DecodeErrorKind},
  metadata::{MetadataEntry, OffsetUnit},
  reader::{ByteReader, ByteWriter},
};

/// `oFFs`: Image offset
///
/// Where the image sits on its output medium: signed x and y plus a unit
/// (pixels or micrometers).
pub(crate) fn decode(ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord) -> Result<(), DecodeError> {
  assert::singular(ctx, chunk)?;
  assert::precedes(ctx, chunk, ChunkType::IDAT)?;
  assert::data_length(ctx, chunk, 9)?;
  let r = ByteReader::new(ctx.bytes);
  let base = chunk.offset + 8;
  let x = r.i32_be(base, "oFFs x position").map_err(|e| ctx.eof(e))?;
  let y = r.i32_be(base + 4, "oFFs y position").map_err(|e| ctx.eof(e))?;
  let unit = match r.u8(base + 8, "oFFs unit").map_err(|e| ctx.eof(e))? {
    0 => OffsetUnit::Pixel,
    1 => OffsetUnit::Micrometer,
    other => {
      return Err(ctx.err(
        DecodeErrorKind::InvalidChunkData,
        chunk.offset,
        format!("oFFs: Invalid unit specifier \"{other}\""),
      ))
    }
  };
  ctx.metadata.push(MetadataEntry::Offset { x, y, unit });
  Ok(())
}

pub(crate) fn encode(x: i32, y: i32, unit: OffsetUnit) -> Vec<u8> {
  let mut w = ByteWriter::with_exact_size(9);
  w.i32_be(x);
  w.i32_be(y);
  w.u8(unit as u8);
  w.finish()
}
