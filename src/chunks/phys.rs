use crate::{
  assert,
  chunk::{ChunkRecord, ChunkType},
  decode::DecodeContext,
  error::{DecodeError, DecodeErrorKind},
  metadata::{MetadataEntry, PhysicalUnit},
  reader::ByteWriter,
};

/// `pHYs`: Physical pixel dimensions
///
/// Pixels per unit on each axis. With the unit unknown the pair only defines
/// an aspect ratio.
pub(crate) fn decode(ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord) -> Result<(), DecodeError> {
  assert::singular(ctx, chunk)?;
  assert::precedes(ctx, chunk, ChunkType::IDAT)?;
  assert::data_length(ctx, chunk, 9)?;
  let data = chunk.data(ctx.bytes);
  let ppu_x = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
  let ppu_y = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
  let unit = match data[8] {
    0 => PhysicalUnit::Unknown,
    1 => PhysicalUnit::Meter,
    other => {
      return Err(ctx.err(
        DecodeErrorKind::InvalidChunkData,
        chunk.offset,
        format!("pHYs: Invalid unit specifier \"{other}\""),
      ))
    }
  };
  ctx.metadata.push(MetadataEntry::PhysicalDimensions { ppu_x, ppu_y, unit });
  Ok(())
}

pub(crate) fn encode(ppu_x: u32, ppu_y: u32, unit: PhysicalUnit) -> Vec<u8> {
  let mut w = ByteWriter::with_exact_size(9);
  w.u32_be(ppu_x);
  w.u32_be(ppu_y);
  w.u8(unit as u8);
  w.finish()
}
