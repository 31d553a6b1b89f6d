use crate::{
  assert,
  chunk::ChunkRecord,
  decode::DecodeContext,
  error::DecodeError,
  metadata::{MetadataEntry, ModificationTime},
  reader::{ByteReader, ByteWriter},
};

/// `tIME`: Image last-modification time, UTC.
pub(crate) fn decode(ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord) -> Result<(), DecodeError> {
  assert::singular(ctx, chunk)?;
  assert::data_length(ctx, chunk, 7)?;
  let r = ByteReader::new(ctx.bytes);
  let base = chunk.offset + 8;
  let year = r.u16_be(base, "tIME year").map_err(|e| ctx.eof(e))?;
  let field = |at: usize, role: &'static str| r.u8(base + at, role);
  let month = field(2, "tIME month").map_err(|e| ctx.eof(e))?;
  let day = field(3, "tIME day").map_err(|e| ctx.eof(e))?;
  let hour = field(4, "tIME hour").map_err(|e| ctx.eof(e))?;
  let minute = field(5, "tIME minute").map_err(|e| ctx.eof(e))?;
  let second = field(6, "tIME second").map_err(|e| ctx.eof(e))?;
  ctx.metadata.push(MetadataEntry::Time(ModificationTime {
    year,
    month,
    day,
    hour,
    minute,
    second,
  }));
  Ok(())
}

pub(crate) fn encode(t: &ModificationTime) -> Vec<u8> {
  let mut w = ByteWriter::with_exact_size(7);
  w.u16_be(t.year);
  w.u8(t.month);
  w.u8(t.day);
  w.u8(t.hour);
  w.u8(t.minute);
  w.u8(t.second);
  w.finish()
}
