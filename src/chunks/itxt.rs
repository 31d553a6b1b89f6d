use crate::{
  assert,
  chunk::ChunkRecord,
  chunks::{check_keyword, latin1_to_string, string_to_latin1},
  decode::DecodeContext,
  error::{DecodeError, DecodeErrorKind},
  metadata::MetadataEntry,
};

/// `iTXt`: International textual data
///
/// `keyword` `NUL` `compression flag` `compression method` `language tag`
/// `NUL` `translated keyword` `NUL` `text`. The text (inflated first when the
/// flag says so) and the translated keyword are UTF-8; the keyword and
/// language tag are Latin-1.
pub(crate) fn decode(ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord) -> Result<(), DecodeError> {
  assert::data_length_gte(ctx, chunk, 6)?;
  let data = chunk.data(ctx.bytes);
  let mut it = data.splitn(2, |&b| b == 0);
  let keyword = it.next().unwrap_or_default();
  check_keyword(ctx, chunk, keyword)?;
  let rest = it.next().unwrap_or_default();
  if rest.len() < 2 {
    return Err(ctx.err(
      DecodeErrorKind::ChunkDataLengthShort,
      chunk.offset,
      format!("iTXt: Invalid data length: {} < {}", data.len(), keyword.len() + 5),
    ));
  }
  let compression_flag = rest[0];
  if compression_flag > 1 {
    return Err(ctx.err(
      DecodeErrorKind::InvalidChunkData,
      chunk.offset,
      format!("iTXt: Invalid compression flag \"{compression_flag}\""),
    ));
  }
  assert::compression_method(ctx, chunk, rest[1])?;
  let mut tail = rest[2..].splitn(3, |&b| b == 0);
  let language_tag = tail.next().unwrap_or_default();
  let translated = tail.next();
  let text_bytes = tail.next();
  let (translated, text_bytes) = match (translated, text_bytes) {
    (Some(t), Some(x)) => (t, x),
    _ => {
      return Err(ctx.err(
        DecodeErrorKind::ChunkDataLengthShort,
        chunk.offset,
        format!("iTXt: Invalid data length: {} < {}", data.len(), keyword.len() + 5),
      ))
    }
  };
  let text_owned: Vec<u8>;
  let text_bytes: &[u8] = if compression_flag == 1 {
    match miniz_oxide::inflate::decompress_to_vec_zlib(text_bytes) {
      Ok(inflated) => {
        text_owned = inflated;
        &text_owned
      }
      Err(e) => {
        return Err(ctx.err(
          DecodeErrorKind::InflateError,
          chunk.offset,
          format!("iTXt: Inflate error: {:?}", e.status),
        ))
      }
    }
  } else {
    text_bytes
  };
  let utf8 = |bytes: &[u8], ctx: &mut DecodeContext<'_>| -> Result<String, DecodeError> {
    match core::str::from_utf8(bytes) {
      Ok(s) => Ok(s.to_string()),
      Err(_) => Err(ctx.err(
        DecodeErrorKind::InvalidChunkData,
        chunk.offset,
        "iTXt: Invalid UTF-8 text".to_string(),
      )),
    }
  };
  let translated_keyword = utf8(translated, ctx)?;
  let text = utf8(text_bytes, ctx)?;
  ctx.metadata.push(MetadataEntry::InternationalText {
    keyword: latin1_to_string(keyword),
    language_tag: latin1_to_string(language_tag),
    translated_keyword,
    text,
  });
  Ok(())
}

pub(crate) fn encode(
  keyword: &str, language_tag: &str, translated_keyword: &str, text: &str,
) -> Vec<u8> {
  let mut out = string_to_latin1(keyword);
  out.push(0);
  out.push(0); // uncompressed
  out.push(0); // compression method 0
  out.extend_from_slice(&string_to_latin1(language_tag));
  out.push(0);
  out.extend_from_slice(translated_keyword.as_bytes());
  out.push(0);
  out.extend_from_slice(text.as_bytes());
  out
}
