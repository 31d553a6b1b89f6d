use crate::{
  assert,
  chunk::{ChunkRecord, ChunkType},
  decode::DecodeContext,
  error::{DecodeError, DecodeErrorKind},
  metadata::MetadataEntry,
};

/// `hIST`: Image histogram
///
/// One big-endian count per palette entry, so this can only follow `PLTE`
/// and its length is fixed by the palette size.
pub(crate) fn decode(ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord) -> Result<(), DecodeError> {
  assert::singular(ctx, chunk)?;
  assert::follows(ctx, chunk, ChunkType::PLTE)?;
  assert::precedes(ctx, chunk, ChunkType::IDAT)?;
  let palette_size = match ctx.palette.as_ref() {
    Some(p) => p.size(),
    None => 0,
  };
  if chunk.data_len != palette_size * 2 {
    let n = chunk.data_len;
    let m = palette_size * 2;
    return Err(ctx.err(
      DecodeErrorKind::ChunkDataLengthShort,
      chunk.offset,
      format!("hIST: Invalid data length: {n} !== {m}"),
    ));
  }
  let data = chunk.data(ctx.bytes);
  let counts: Vec<u16> =
    data.chunks_exact(2).map(|pair| u16::from_be_bytes([pair[0], pair[1]])).collect();
  ctx.metadata.push(MetadataEntry::Histogram(counts));
  Ok(())
}
