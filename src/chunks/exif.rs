use crate::{
  chunk::ChunkRecord, decode::DecodeContext, error::DecodeError, metadata::MetadataEntry,
};

/// `eXIf`: Exchangeable image file format data
///
/// Carried verbatim; the decoder never looks inside.
pub(crate) fn decode(ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord) -> Result<(), DecodeError> {
  let data = chunk.data(ctx.bytes);
  ctx.metadata.push(MetadataEntry::Exif(data.to_vec()));
  Ok(())
}

pub(crate) fn encode(data: &[u8]) -> Vec<u8> {
  data.to_vec()
}
