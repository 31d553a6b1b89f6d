//! Chunk-level types: the signature check, [`ChunkType`], [`ChunkRecord`],
//! and the splitter that segments a datastream into records.

use crate::{
  crc32::crc32,
  decode::DecodeContext,
  error::{DecodeError, DecodeErrorKind},
  reader::ByteReader,
};

/// The first eight bytes of a PNG datastream should match these bytes.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Checks bytes 0..8 against the PNG signature.
///
/// Both failure modes here are fatal regardless of strict mode; without the
/// signature nothing else about the input can be trusted.
pub(crate) fn check_signature(bytes: &[u8]) -> Result<(), DecodeError> {
  if bytes.len() < 8 {
    return Err(DecodeError::bare(
      DecodeErrorKind::NotEnoughBytesForSignature,
      0,
      format!("Not enough bytes in file for png signature ({})", bytes.len()),
    ));
  }
  if bytes[..8] != PNG_SIGNATURE {
    let mut actual = String::with_capacity(16);
    for b in &bytes[..8] {
      actual.push_str(&format!("{b:02x}"));
    }
    return Err(DecodeError::bare(
      DecodeErrorKind::SignatureMismatch,
      0,
      format!("Png signature mismatch (0x{actual} !== 0x89504e470d0a1a0a)"),
    ));
  }
  Ok(())
}

/// A four-byte PNG chunk type.
///
/// The case of each letter is load-bearing: bit 5 of byte 0 marks the chunk
/// ancillary, bit 5 of byte 1 marks it private, and bit 5 of byte 3 marks it
/// safe to copy.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ChunkType(pub [u8; 4]);
#[allow(nonstandard_style)]
impl ChunkType {
  pub const IHDR: Self = Self(*b"IHDR");
  pub const PLTE: Self = Self(*b"PLTE");
  pub const IDAT: Self = Self(*b"IDAT");
  pub const IEND: Self = Self(*b"IEND");
  pub const bKGD: Self = Self(*b"bKGD");
  pub const cHRM: Self = Self(*b"cHRM");
  pub const eXIf: Self = Self(*b"eXIf");
  pub const gAMA: Self = Self(*b"gAMA");
  pub const hIST: Self = Self(*b"hIST");
  pub const iCCP: Self = Self(*b"iCCP");
  pub const iTXt: Self = Self(*b"iTXt");
  pub const oFFs: Self = Self(*b"oFFs");
  pub const pCAL: Self = Self(*b"pCAL");
  pub const pHYs: Self = Self(*b"pHYs");
  pub const sBIT: Self = Self(*b"sBIT");
  pub const sCAL: Self = Self(*b"sCAL");
  pub const sPLT: Self = Self(*b"sPLT");
  pub const sRGB: Self = Self(*b"sRGB");
  pub const sTER: Self = Self(*b"sTER");
  pub const tEXt: Self = Self(*b"tEXt");
  pub const tIME: Self = Self(*b"tIME");
  pub const tRNS: Self = Self(*b"tRNS");
  pub const zTXt: Self = Self(*b"zTXt");
}
impl ChunkType {
  /// The raw type bytes.
  #[inline]
  #[must_use]
  pub const fn as_bytes(&self) -> [u8; 4] {
    self.0
  }
  /// Lowercase first letter: not required for a meaningful image.
  #[inline]
  #[must_use]
  pub const fn is_ancillary(&self) -> bool {
    (self.0[0] & 0b10_0000) != 0
  }
  /// Lowercase second letter: not registered in the public chunk namespace.
  #[inline]
  #[must_use]
  pub const fn is_private(&self) -> bool {
    (self.0[1] & 0b10_0000) != 0
  }
  /// Lowercase fourth letter: editors may copy the chunk without
  /// understanding it.
  #[inline]
  #[must_use]
  pub const fn is_safe_to_copy(&self) -> bool {
    (self.0[3] & 0b10_0000) != 0
  }
}
impl core::fmt::Debug for ChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    use core::fmt::Write;
    f.write_char(self.0[0] as char)?;
    f.write_char(self.0[1] as char)?;
    f.write_char(self.0[2] as char)?;
    f.write_char(self.0[3] as char)?;
    Ok(())
  }
}
impl core::fmt::Display for ChunkType {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    core::fmt::Debug::fmt(self, f)
  }
}

/// One segmented chunk of a datastream.
///
/// A record does not own its payload; the `data_len` bytes live at
/// `offset + 8` of the original datastream, followed by the 4-byte CRC. The
/// records of a well-formed file partition everything after the signature
/// with no gaps or overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRecord {
  /// Offset of the chunk's length field within the datastream.
  pub offset: usize,
  /// The chunk's type.
  pub ty: ChunkType,
  /// Length of the data section (excludes the 12 framing bytes).
  pub data_len: usize,
}
impl ChunkRecord {
  /// The chunk's data bytes within `bytes` (the full datastream).
  #[inline]
  #[must_use]
  pub fn data<'b>(&self, bytes: &'b [u8]) -> &'b [u8] {
    &bytes[self.offset + 8..self.offset + 8 + self.data_len]
  }
  /// The CRC stored in the chunk trailer.
  #[inline]
  #[must_use]
  pub fn declared_crc(&self, bytes: &[u8]) -> u32 {
    let at = self.offset + 8 + self.data_len;
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
  }
  /// The CRC computed over the chunk's type and data bytes.
  #[inline]
  #[must_use]
  pub fn actual_crc(&self, bytes: &[u8]) -> u32 {
    crc32(self.ty.0.iter().copied().chain(self.data(bytes).iter().copied()))
  }
  #[inline]
  #[must_use]
  pub const fn is_ancillary(&self) -> bool {
    self.ty.is_ancillary()
  }
}

/// Segments everything after the signature into chunk records.
///
/// The records are accumulated on the context (so a later fatal error still
/// carries them). Structural rules enforced here: every chunk's CRC matches
/// (warning), the first chunk is `IHDR` (fatal), at least one `IDAT` exists
/// (fatal), all `IDAT` chunks are consecutive (fatal), and the final chunk is
/// `IEND` (warning).
pub(crate) fn split_chunks(ctx: &mut DecodeContext<'_>) -> Result<(), DecodeError> {
  let r = ByteReader::new(ctx.bytes);
  let mut offset = 8_usize;
  while offset < r.len() {
    let data_len = r.u32_be(offset, "chunk length").map_err(|e| ctx.eof(e))? as usize;
    let ty_bytes = r.slice(offset + 4, offset + 8, "chunk type").map_err(|e| ctx.eof(e))?;
    let ty = ChunkType([ty_bytes[0], ty_bytes[1], ty_bytes[2], ty_bytes[3]]);
    r.slice(offset + 8, offset + 8 + data_len, "chunk data").map_err(|e| ctx.eof(e))?;
    let declared =
      r.u32_be(offset + 8 + data_len, "chunk CRC").map_err(|e| ctx.eof(e))?;
    let record = ChunkRecord { offset, ty, data_len };
    let actual = record.actual_crc(ctx.bytes);
    if actual != declared {
      ctx.warn_as(
        DecodeErrorKind::ChunkCrcMismatch,
        offset,
        format!(
          "CRC for chunk \"{ty}\" at offset 0x{offset:x} doesn't match (0x{actual:x} !== 0x{declared:x})"
        ),
      )?;
    }
    ctx.raw_chunks.push(record);
    offset += 12 + data_len;
  }
  trace!("split {} chunks", ctx.raw_chunks.len());

  match ctx.raw_chunks.first() {
    Some(first) if first.ty == ChunkType::IHDR => (),
    _ => {
      return Err(ctx.err(
        DecodeErrorKind::FirstChunkNotIhdr,
        8,
        "First chunk is not IHDR".to_string(),
      ))
    }
  }
  if !ctx.raw_chunks.iter().any(|c| c.ty == ChunkType::IDAT) {
    return Err(ctx.err(DecodeErrorKind::NoIdat, 8, "No IDAT chunks found".to_string()));
  }
  let first_idat =
    ctx.raw_chunks.iter().position(|c| c.ty == ChunkType::IDAT).unwrap_or_default();
  let last_idat = ctx
    .raw_chunks
    .iter()
    .rposition(|c| c.ty == ChunkType::IDAT)
    .unwrap_or_default();
  if let Some(gap) =
    ctx.raw_chunks[first_idat..=last_idat].iter().find(|c| c.ty != ChunkType::IDAT)
  {
    return Err(ctx.err(
      DecodeErrorKind::InvalidChunkData,
      gap.offset,
      "IDAT: Chunks must be consecutive".to_string(),
    ));
  }
  let straggler = match ctx.raw_chunks.last() {
    Some(last) if last.ty != ChunkType::IEND => Some(last.offset),
    _ => None,
  };
  if let Some(at) = straggler {
    ctx.warn(at, "Last chunk is not IEND".to_string())?;
  }
  Ok(())
}
