use crate::{
  assert,
  chunk::{ChunkRecord, ChunkType},
  chunks::{check_keyword, latin1_to_string},
  decode::DecodeContext,
  error::{DecodeError, DecodeErrorKind},
  metadata::{MetadataEntry, SuggestedPalette, SuggestedPaletteEntry},
};

/// `sPLT`: Suggested palette
///
/// `name` `NUL` `sample depth` then entries of four samples plus a
/// frequency. Entries are 6 bytes at depth 8 and 10 bytes at depth 16, and
/// the entry size must divide the remaining payload exactly. Unlike most
/// ancillary chunks, several sPLT chunks may appear (with distinct names).
pub(crate) fn decode(ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord) -> Result<(), DecodeError> {
  assert::precedes(ctx, chunk, ChunkType::IDAT)?;
  assert::data_length_gte(ctx, chunk, 3)?;
  let data = chunk.data(ctx.bytes);
  let mut it = data.splitn(2, |&b| b == 0);
  let name = it.next().unwrap_or_default();
  check_keyword(ctx, chunk, name)?;
  let rest = it.next().unwrap_or_default();
  if rest.is_empty() {
    return Err(ctx.err(
      DecodeErrorKind::ChunkDataLengthShort,
      chunk.offset,
      format!("sPLT: Invalid data length: {} < {}", data.len(), name.len() + 2),
    ));
  }
  let sample_depth = rest[0];
  let stride = match sample_depth {
    8 => 6,
    16 => 10,
    other => {
      return Err(ctx.err(
        DecodeErrorKind::InvalidChunkData,
        chunk.offset,
        format!("sPLT: Invalid sample depth \"{other}\""),
      ))
    }
  };
  let body = &rest[1..];
  if body.len() % stride != 0 {
    let n = body.len();
    return Err(ctx.err(
      DecodeErrorKind::ChunkDataLengthShort,
      chunk.offset,
      format!("sPLT: Invalid data length: {n} is not divisible by {stride}"),
    ));
  }
  let entries: Vec<SuggestedPaletteEntry> = body
    .chunks_exact(stride)
    .map(|e| {
      if sample_depth == 8 {
        SuggestedPaletteEntry {
          r: e[0] as u16,
          g: e[1] as u16,
          b: e[2] as u16,
          a: e[3] as u16,
          frequency: u16::from_be_bytes([e[4], e[5]]),
        }
      } else {
        SuggestedPaletteEntry {
          r: u16::from_be_bytes([e[0], e[1]]),
          g: u16::from_be_bytes([e[2], e[3]]),
          b: u16::from_be_bytes([e[4], e[5]]),
          a: u16::from_be_bytes([e[6], e[7]]),
          frequency: u16::from_be_bytes([e[8], e[9]]),
        }
      }
    })
    .collect();
  ctx.metadata.push(MetadataEntry::SuggestedPalette(SuggestedPalette {
    name: latin1_to_string(name),
    sample_depth,
    entries,
  }));
  Ok(())
}
