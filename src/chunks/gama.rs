use crate::{
  assert,
  chunk::{ChunkRecord, ChunkType},
  decode::DecodeContext,
  error::DecodeError,
  metadata::MetadataEntry,
  reader::ByteWriter,
};

/// `gAMA`: Image gamma
///
/// Stored as an integer 100000 times the value; a gamma of 1/2.2 is 45455 on
/// the wire. Zero is meaningless and warns.
pub(crate) fn decode(ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord) -> Result<(), DecodeError> {
  assert::singular(ctx, chunk)?;
  assert::precedes(ctx, chunk, ChunkType::PLTE)?;
  assert::precedes(ctx, chunk, ChunkType::IDAT)?;
  assert::data_length(ctx, chunk, 4)?;
  let data = chunk.data(ctx.bytes);
  let raw = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
  if raw == 0 {
    ctx.warn(chunk.offset, "gAMA: Invalid gamma \"0\"".to_string())?;
  }
  ctx.metadata.push(MetadataEntry::Gamma(raw as f64 / 100_000.0));
  Ok(())
}

pub(crate) fn encode(gamma: f64) -> Vec<u8> {
  let mut w = ByteWriter::with_exact_size(4);
  w.u32_be((gamma * 100_000.0).round() as u32);
  w.finish()
}
