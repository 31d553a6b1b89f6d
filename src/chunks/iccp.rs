use crate::{
  assert,
  chunk::{ChunkRecord, ChunkType},
  chunks::{check_keyword, latin1_to_string},
  decode::DecodeContext,
  error::{DecodeError, DecodeErrorKind},
  metadata::MetadataEntry,
};

/// `iCCP`: Embedded ICC profile
///
/// `name` `NUL` `compression method` `deflated profile`. The profile stream
/// is inflated here but never interpreted; this chunk and `sRGB` should not
/// both be present.
pub(crate) fn decode(ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord) -> Result<(), DecodeError> {
  assert::singular(ctx, chunk)?;
  assert::not_alongside(ctx, chunk, ChunkType::sRGB)?;
  assert::precedes(ctx, chunk, ChunkType::PLTE)?;
  assert::precedes(ctx, chunk, ChunkType::IDAT)?;
  assert::data_length_gte(ctx, chunk, 3)?;
  let data = chunk.data(ctx.bytes);
  let mut it = data.splitn(2, |&b| b == 0);
  let name = it.next().unwrap_or_default();
  check_keyword(ctx, chunk, name)?;
  let rest = match it.next() {
    Some(rest) if !rest.is_empty() => rest,
    _ => {
      return Err(ctx.err(
        DecodeErrorKind::ChunkDataLengthShort,
        chunk.offset,
        format!("iCCP: Invalid data length: {} < {}", data.len(), name.len() + 3),
      ))
    }
  };
  assert::compression_method(ctx, chunk, rest[0])?;
  let profile = match miniz_oxide::inflate::decompress_to_vec_zlib(&rest[1..]) {
    Ok(profile) => profile,
    Err(e) => {
      return Err(ctx.err(
        DecodeErrorKind::InflateError,
        chunk.offset,
        format!("iCCP: Inflate error: {:?}", e.status),
      ))
    }
  };
  ctx
    .metadata
    .push(MetadataEntry::IccProfile { name: latin1_to_string(name), profile });
  Ok(())
}
