//! One module per known chunk type.
//!
//! Each module has a `decode` that parses the chunk's payload into the
//! context (running the chunk's ordering rules first), and the types that
//! support encoding also have payload builders.

use crate::{
  chunk::{ChunkRecord, ChunkType},
  decode::DecodeContext,
  error::{DecodeError, DecodeErrorKind},
};

pub(crate) mod bkgd;
pub(crate) mod chrm;
pub(crate) mod exif;
pub(crate) mod gama;
pub(crate) mod hist;
pub(crate) mod iccp;
pub(crate) mod itxt;
pub(crate) mod offs;
pub(crate) mod pcal;
pub(crate) mod phys;
pub(crate) mod plte;
pub(crate) mod sbit;
pub(crate) mod scal;
pub(crate) mod splt;
pub(crate) mod srgb;
pub(crate) mod ster;
pub(crate) mod text;
pub(crate) mod time;
pub(crate) mod trns;
pub(crate) mod ztxt;

pub(crate) type DecoderFn = fn(&mut DecodeContext<'_>, &ChunkRecord) -> Result<(), DecodeError>;

/// The ancillary decoders, looked up only for chunk types the caller opted
/// into. `PLTE` and `tRNS` are dispatched by the driver directly because they
/// feed the pixel pipeline.
pub(crate) const ANCILLARY_DECODERS: &[(ChunkType, DecoderFn)] = &[
  (ChunkType::bKGD, bkgd::decode),
  (ChunkType::cHRM, chrm::decode),
  (ChunkType::eXIf, exif::decode),
  (ChunkType::gAMA, gama::decode),
  (ChunkType::hIST, hist::decode),
  (ChunkType::iCCP, iccp::decode),
  (ChunkType::iTXt, itxt::decode),
  (ChunkType::oFFs, offs::decode),
  (ChunkType::pCAL, pcal::decode),
  (ChunkType::pHYs, phys::decode),
  (ChunkType::sBIT, sbit::decode),
  (ChunkType::sCAL, scal::decode),
  (ChunkType::sPLT, splt::decode),
  (ChunkType::sRGB, srgb::decode),
  (ChunkType::sTER, ster::decode),
  (ChunkType::tEXt, text::decode),
  (ChunkType::tIME, time::decode),
  (ChunkType::zTXt, ztxt::decode),
];

/// Latin-1 bytes to a string; every byte maps to the code point of the same
/// value.
#[inline]
#[must_use]
pub(crate) fn latin1_to_string(bytes: &[u8]) -> String {
  bytes.iter().map(|&b| b as char).collect()
}

/// The inverse mapping for the writers. Code points above U+00FF have no
/// Latin-1 spelling and become `?`.
#[inline]
#[must_use]
pub(crate) fn string_to_latin1(s: &str) -> Vec<u8> {
  s.chars().map(|c| if (c as u32) < 256 { c as u32 as u8 } else { b'?' }).collect()
}

/// Keywords are 1 to 79 Latin-1 bytes.
pub(crate) fn check_keyword(
  ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord, keyword: &[u8],
) -> Result<(), DecodeError> {
  if keyword.is_empty() || keyword.len() > 79 {
    let t = chunk.ty;
    return Err(ctx.err(
      DecodeErrorKind::InvalidChunkData,
      chunk.offset,
      format!("{t}: Invalid keyword length \"{}\"", keyword.len()),
    ));
  }
  Ok(())
}
