use crate::{
  assert,
  chunk::ChunkRecord,
  chunks::{check_keyword, latin1_to_string, string_to_latin1},
  decode::DecodeContext,
  error::{DecodeError, DecodeErrorKind},
  metadata::MetadataEntry,
};

/// `zTXt`: Compressed textual data
///
/// `keyword` `NUL` `compression method` `deflated Latin-1 text`.
pub(crate) fn decode(ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord) -> Result<(), DecodeError> {
  assert::data_length_gte(ctx, chunk, 6)?;
  let data = chunk.data(ctx.bytes);
  let mut it = data.splitn(2, |&b| b == 0);
  let keyword = it.next().unwrap_or_default();
  check_keyword(ctx, chunk, keyword)?;
  let rest = match it.next() {
    Some(rest) if !rest.is_empty() => rest,
    _ => {
      return Err(ctx.err(
        DecodeErrorKind::ChunkDataLengthShort,
        chunk.offset,
        format!("zTXt: Invalid data length: {} < {}", data.len(), keyword.len() + 2),
      ))
    }
  };
  assert::compression_method(ctx, chunk, rest[0])?;
  let inflated = match miniz_oxide::inflate::decompress_to_vec_zlib(&rest[1..]) {
    Ok(inflated) => inflated,
    Err(e) => {
      return Err(ctx.err(
        DecodeErrorKind::InflateError,
        chunk.offset,
        format!("zTXt: Inflate error: {:?}", e.status),
      ))
    }
  };
  ctx.metadata.push(MetadataEntry::CompressedText {
    keyword: latin1_to_string(keyword),
    text: latin1_to_string(&inflated),
  });
  Ok(())
}

pub(crate) fn encode(keyword: &str, text: &str) -> Vec<u8> {
  let mut out = string_to_latin1(keyword);
  out.push(0);
  out.push(0); // compression method 0 (deflate)
  let deflated =
    miniz_oxide::deflate::compress_to_vec_zlib(&string_to_latin1(text), 6);
  out.extend_from_slice(&deflated);
  out
}
