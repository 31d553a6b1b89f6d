use crate::{
  assert,
  chunk::ChunkRecord,
  chunks::{check_keyword, latin1_to_string, string_to_latin1},
  decode::DecodeContext,
  error::DecodeError,
  metadata::MetadataEntry,
};

/// `tEXt`: Textual data
///
/// `keyword` `NUL` `text`, both Latin-1. Any number of text chunks may
/// appear, anywhere between `IHDR` and `IEND`.
pub(crate) fn decode(ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord) -> Result<(), DecodeError> {
  assert::data_length_gte(ctx, chunk, 6)?;
  let data = chunk.data(ctx.bytes);
  let mut it = data.splitn(2, |&b| b == 0);
  let keyword = it.next().unwrap_or_default();
  check_keyword(ctx, chunk, keyword)?;
  let text = it.next().unwrap_or_default();
  ctx.metadata.push(MetadataEntry::Text {
    keyword: latin1_to_string(keyword),
    text: latin1_to_string(text),
  });
  Ok(())
}

pub(crate) fn encode(keyword: &str, text: &str) -> Vec<u8> {
  let mut out = string_to_latin1(keyword);
  out.push(0);
  out.extend_from_slice(&string_to_latin1(text));
  out
}
