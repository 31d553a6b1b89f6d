use crate::{
  assert,
  chunk::{ChunkRecord, ChunkType},
  decode::DecodeContext,
  error::DecodeError,
  ihdr::ColorType,
  metadata::{MetadataEntry, Transparency},
  reader::ByteWriter,
};

/// `tRNS`: Transparency
///
/// * Indexed color: one alpha byte per palette entry (trailing entries may
///   be omitted and are fully opaque). Must follow `PLTE`, though permissive
///   mode accepts the wrong order with a warning.
/// * Grayscale / truecolor: a single 16-bit-coded color that becomes fully
///   transparent wherever it appears exactly.
/// * The alpha color types already carry transparency, so a `tRNS` there is
///   ignored with a warning.
///
/// Decoded unconditionally (not subject to the parse opt-in) because the
/// pixel pipeline needs it.
pub(crate) fn decode(ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord) -> Result<(), DecodeError> {
  assert::precedes(ctx, chunk, ChunkType::IDAT)?;
  let header = ctx.header_or_err(chunk)?;
  let data = chunk.data(ctx.bytes);
  let value = match header.color_type {
    ColorType::Indexed => {
      assert::follows_lenient(ctx, chunk, ChunkType::PLTE)?;
      let palette_size = match ctx.palette.as_ref() {
        Some(p) => p.size(),
        None => 0,
      };
      let mut alphas = data.to_vec();
      if ctx.palette.is_some() && alphas.len() > palette_size {
        let n = alphas.len();
        ctx.warn(chunk.offset, format!("tRNS: Invalid data length: {n} > {palette_size}"))?;
        alphas.truncate(palette_size);
      }
      Transparency::PaletteAlphas(alphas)
    }
    ColorType::Grayscale => {
      assert::data_length(ctx, chunk, 2)?;
      Transparency::Grayscale(u16::from_be_bytes([data[0], data[1]]))
    }
    ColorType::Truecolor => {
      assert::data_length(ctx, chunk, 6)?;
      Transparency::Rgb([
        u16::from_be_bytes([data[0], data[1]]),
        u16::from_be_bytes([data[2], data[3]]),
        u16::from_be_bytes([data[4], data[5]]),
      ])
    }
    ColorType::GrayscaleAlpha | ColorType::TruecolorAlpha => {
      let ct = header.color_type;
      ctx.warn(chunk.offset, format!("tRNS: Should not be present for color type {ct}"))?;
      return Ok(());
    }
  };
  ctx.trns = Some(value.clone());
  ctx.metadata.push(MetadataEntry::Transparency(value));
  Ok(())
}

pub(crate) fn encode_palette_alphas(alphas: &[u8]) -> Vec<u8> {
  // trailing fully-opaque entries carry no information
  let keep = alphas.iter().rposition(|&a| a != u8::MAX).map(|i| i + 1).unwrap_or(0);
  alphas[..keep].to_vec()
}

pub(crate) fn encode_grayscale(y: u16) -> Vec<u8> {
  let mut w = ByteWriter::with_exact_size(2);
  w.u16_be(y);
  w.finish()
}

pub(crate) fn encode_rgb([r, g, b]: [u16; 3]) -> Vec<u8> {
  let mut w = ByteWriter::with_exact_size(6);
  w.u16_be(r);
  w.u16_be(g);
  w.u16_be(b);
  w.finish()
}
