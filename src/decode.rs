//! The decode driver: signature, chunk scan, the sequential chunk walk with
//! its ordering checks, and final assembly of the result.

use crate::{
  assert,
  chunk::{check_signature, split_chunks, ChunkRecord, ChunkType},
  chunks,
  error::{DecodeError, DecodeErrorKind, PartialDecode, PngWarning},
  idat,
  ihdr::{parse_ihdr, Ihdr},
  metadata::{MetadataEntry, Transparency},
  palette::Palette,
  reader::Eof,
  ImageRgba,
};

/// Which ancillary chunk types to decode into [`MetadataEntry`] values.
///
/// `IHDR`, `PLTE`, `IDAT`, `IEND`, and `tRNS` are always decoded; they are
/// needed to produce pixels. Everything else is opt-in: chunks outside the
/// filter are still scanned, CRC-checked, and listed in `raw_chunks`, but
/// their payloads are not parsed and their ordering rules don't run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ChunkTypeFilter {
  /// Only the always-decoded set.
  #[default]
  Standard,
  /// Every chunk type this crate knows (the `"*"` setting).
  All,
  /// The always-decoded set plus the listed types.
  Only(Vec<ChunkType>),
}
impl ChunkTypeFilter {
  #[inline]
  #[must_use]
  fn wants(&self, ty: ChunkType) -> bool {
    match self {
      Self::Standard => false,
      Self::All => true,
      Self::Only(list) => list.contains(&ty),
    }
  }
}

/// Knobs for [`decode_png_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOptions {
  /// Always produce 8-bit samples, reducing 16-bit images to the high byte
  /// of each sample.
  pub force32: bool,
  /// Which ancillary chunks to decode. See [`ChunkTypeFilter`].
  pub parse_chunk_types: ChunkTypeFilter,
  /// Promote every warning to an error.
  pub strict_mode: bool,
}

/// Everything a successful decode produces.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPng {
  /// The pixels, expanded to RGBA.
  pub image: ImageRgba,
  /// The parsed header.
  pub details: Ihdr,
  /// The palette, when the datastream had a `PLTE` chunk.
  pub palette: Option<Palette>,
  /// Decoded ancillary chunks, in datastream order.
  pub metadata: Vec<MetadataEntry>,
  /// Every chunk the datastream was segmented into, in order.
  pub raw_chunks: Vec<ChunkRecord>,
  /// Recoverable irregularities (empty in strict mode by construction).
  pub warnings: Vec<PngWarning>,
  /// Notes about unrecognized ancillary chunk types.
  pub info: Vec<String>,
}

/// The mutable state threaded through every stage of one decode.
pub(crate) struct DecodeContext<'b> {
  pub bytes: &'b [u8],
  pub options: DecodeOptions,
  pub header: Option<Ihdr>,
  pub palette: Option<Palette>,
  pub trns: Option<Transparency>,
  pub metadata: Vec<MetadataEntry>,
  pub raw_chunks: Vec<ChunkRecord>,
  pub warnings: Vec<PngWarning>,
  pub info: Vec<String>,
  seen: Vec<ChunkType>,
}
impl<'b> DecodeContext<'b> {
  #[must_use]
  pub fn new(bytes: &'b [u8], options: &DecodeOptions) -> Self {
    Self {
      bytes,
      options: options.clone(),
      header: None,
      palette: None,
      trns: None,
      metadata: Vec::new(),
      raw_chunks: Vec::new(),
      warnings: Vec::new(),
      info: Vec::new(),
      seen: Vec::new(),
    }
  }

  /// If a chunk of this type has already gone past in the walk.
  #[inline]
  #[must_use]
  pub fn seen(&self, ty: ChunkType) -> bool {
    self.seen.contains(&ty)
  }

  #[inline]
  pub fn mark_seen(&mut self, ty: ChunkType) {
    if !self.seen.contains(&ty) {
      self.seen.push(ty);
    }
  }

  #[must_use]
  fn snapshot(&self) -> PartialDecode {
    PartialDecode {
      details: self.header,
      metadata: self.metadata.clone(),
      raw_chunks: self.raw_chunks.clone(),
      warnings: self.warnings.clone(),
      info: self.info.clone(),
    }
  }

  /// A fatal error carrying everything decoded so far.
  #[must_use]
  pub fn err(&self, kind: DecodeErrorKind, offset: usize, message: String) -> DecodeError {
    DecodeError { kind, message, offset, partial: Box::new(self.snapshot()) }
  }

  #[must_use]
  pub fn eof(&self, e: Eof) -> DecodeError {
    self.err(DecodeErrorKind::EofWhileReading, e.offset, e.message())
  }

  /// Records a warning, or promotes it on the spot under strict mode.
  pub fn warn(&mut self, offset: usize, message: String) -> Result<(), DecodeError> {
    self.warn_as(DecodeErrorKind::StrictModeViolation, offset, message)
  }

  /// Like [`warn`](Self::warn) but with a more precise kind for the strict
  /// mode promotion.
  pub fn warn_as(
    &mut self, kind: DecodeErrorKind, offset: usize, message: String,
  ) -> Result<(), DecodeError> {
    if self.options.strict_mode {
      Err(self.err(kind, offset, message))
    } else {
      self.warnings.push(PngWarning { message, offset });
      Ok(())
    }
  }

  /// The parsed header, or a "must follow IHDR" error naming `chunk`.
  pub fn header_or_err(&self, chunk: &ChunkRecord) -> Result<Ihdr, DecodeError> {
    match self.header {
      Some(header) => Ok(header),
      None => {
        let t = chunk.ty;
        Err(self.err(
          DecodeErrorKind::OrderingFollowsViolation,
          chunk.offset,
          format!("{t}: Must follow IHDR"),
        ))
      }
    }
  }
}

/// Decodes a PNG datastream with default options.
pub fn decode_png(bytes: &[u8]) -> Result<DecodedPng, DecodeError> {
  decode_png_with(bytes, &DecodeOptions::default())
}

/// Decodes a PNG datastream.
pub fn decode_png_with(bytes: &[u8], options: &DecodeOptions) -> Result<DecodedPng, DecodeError> {
  check_signature(bytes)?;
  let mut ctx = DecodeContext::new(bytes, options);
  split_chunks(&mut ctx)?;

  let first = ctx.raw_chunks[0];
  let header = parse_ihdr(&mut ctx, &first)?;
  trace!("parsed header {header:?}");
  ctx.header = Some(header);
  ctx.mark_seen(ChunkType::IHDR);

  for i in 1..ctx.raw_chunks.len() {
    let chunk = ctx.raw_chunks[i];
    let ty = chunk.ty;
    match ty {
      ChunkType::IHDR => assert::singular(&mut ctx, &chunk)?,
      ChunkType::PLTE => chunks::plte::decode(&mut ctx, &chunk)?,
      ChunkType::IDAT => (/* gathered by the pipeline; position checked by the splitter */),
      ChunkType::IEND => assert::follows(&mut ctx, &chunk, ChunkType::IDAT)?,
      ChunkType::tRNS => chunks::trns::decode(&mut ctx, &chunk)?,
      _ if ty.is_ancillary() => {
        match chunks::ANCILLARY_DECODERS.iter().find(|(t, _)| *t == ty) {
          Some((_, decoder)) if ctx.options.parse_chunk_types.wants(ty) => {
            decoder(&mut ctx, &chunk)?
          }
          Some(_) => (/* known, but the caller didn't opt in */),
          None => ctx.info.push(format!("Unrecognized chunk type \"{ty}\"")),
        }
      }
      _ => {
        return Err(ctx.err(
          DecodeErrorKind::UnrecognizedCriticalChunkType,
          chunk.offset,
          format!("Unrecognized critical chunk type \"{ty}\""),
        ))
      }
    }
    ctx.mark_seen(ty);
  }

  let data = idat::decode_image(&mut ctx, header)?;
  trace!("expanded {} samples", data.len());
  Ok(DecodedPng {
    image: ImageRgba { width: header.width, height: header.height, data },
    details: header,
    palette: ctx.palette,
    metadata: ctx.metadata,
    raw_chunks: ctx.raw_chunks,
    warnings: ctx.warnings,
    info: ctx.info,
  })
}
