//! The image-data pipeline: concatenated `IDAT` chunks are inflated,
//! unfiltered (per reduced image when interlaced), gathered into one packed
//! buffer, and finally expanded to RGBA samples.

use bitfrob::u8_replicate_bits;

use crate::{
  chunk::ChunkType,
  decode::DecodeContext,
  error::{DecodeError, DecodeErrorKind},
  ihdr::{ColorType, Ihdr, InterlaceMethod, ADAM7_PASSES},
  metadata::Transparency,
  packing::{get_packed_sample, set_packed_sample},
  unfilter::unfilter_scanlines,
  ImageData,
};

/// Runs the whole pipeline. The header must already be parsed and `tRNS` /
/// `PLTE` (when present) already decoded into the context.
pub(crate) fn decode_image(
  ctx: &mut DecodeContext<'_>, header: Ihdr,
) -> Result<ImageData, DecodeError> {
  let idat_offset = ctx
    .raw_chunks
    .iter()
    .find(|c| c.ty == ChunkType::IDAT)
    .map(|c| c.offset)
    .unwrap_or(8);
  let mut inflated = decompress(ctx, header, idat_offset)?;
  trace!("inflated {} bytes of image data", inflated.len());
  let packed = unpack(ctx, header, &mut inflated, idat_offset)?;
  expand(ctx, header, &packed, idat_offset)
}

/// Inflates the concatenation of every IDAT chunk's data into an
/// exactly-sized buffer.
fn decompress(
  ctx: &mut DecodeContext<'_>, header: Ihdr, idat_offset: usize,
) -> Result<Vec<u8>, DecodeError> {
  let expected = header.decompressed_size();
  let mut buf = vec![0_u8; expected];
  let result = {
    let it = ctx
      .raw_chunks
      .iter()
      .filter(|c| c.ty == ChunkType::IDAT)
      .map(|c| c.data(ctx.bytes));
    miniz_oxide::inflate::decompress_slice_iter_to_slice(&mut buf, it, true, true)
  };
  match result {
    Ok(0) => Err(ctx.err(
      DecodeErrorKind::InflateError,
      idat_offset,
      "IDAT: Failed to decompress data chunks".to_string(),
    )),
    Ok(n) if n < expected => {
      ctx.warn(
        idat_offset,
        format!("IDAT: Inflated data is shorter than expected ({n} < {expected})"),
      )?;
      Ok(buf)
    }
    Ok(_) => Ok(buf),
    Err(status) => Err(ctx.err(
      DecodeErrorKind::InflateError,
      idat_offset,
      format!("IDAT: Inflate error: {status:?}"),
    )),
  }
}

/// Unfilters the inflated stream in place and gathers it into a single
/// packed buffer of `height` rows, de-interlacing as it goes.
fn unpack(
  ctx: &mut DecodeContext<'_>, header: Ihdr, inflated: &mut [u8], idat_offset: usize,
) -> Result<Vec<u8>, DecodeError> {
  let out_bpl = header.bytes_per_scanline(header.width);
  let mut packed = vec![0_u8; out_bpl * header.height as usize];
  let bpp = header.bytes_per_pixel();
  let depth = header.bit_depth;
  let bad_filter = |ctx: &DecodeContext<'_>, t: u8| {
    ctx.err(
      DecodeErrorKind::InvalidFilterType,
      idat_offset,
      format!("IDAT: Invalid filter type \"{t}\""),
    )
  };
  match header.interlace_method {
    InterlaceMethod::None => {
      let stride = out_bpl + 1;
      let total = stride * header.height as usize;
      let region = &mut inflated[..total];
      unfilter_scanlines(region, stride, bpp).map_err(|t| bad_filter(ctx, t))?;
      for y in 0..header.height as usize {
        let row = &region[y * stride + 1..(y + 1) * stride];
        packed[y * out_bpl..(y + 1) * out_bpl].copy_from_slice(row);
      }
    }
    InterlaceMethod::Adam7 => {
      let mut cursor = 0_usize;
      for pass in ADAM7_PASSES.iter() {
        let (pw, ph) = pass.dimensions(header.width, header.height);
        if pw == 0 || ph == 0 {
          continue;
        }
        let pass_bpl = header.bytes_per_scanline(pw);
        let stride = pass_bpl + 1;
        let size = stride * ph as usize;
        let region = &mut inflated[cursor..cursor + size];
        unfilter_scanlines(region, stride, bpp).map_err(|t| bad_filter(ctx, t))?;
        for y in 0..ph as usize {
          let row = &region[y * stride + 1..(y + 1) * stride];
          let full_y = (pass.y_start + y as u32 * pass.y_gap) as usize;
          let dst_row = &mut packed[full_y * out_bpl..(full_y + 1) * out_bpl];
          if depth >= 8 {
            for x in 0..pw as usize {
              let full_x = (pass.x_start as usize) + x * pass.x_gap as usize;
              dst_row[full_x * bpp..full_x * bpp + bpp]
                .copy_from_slice(&row[x * bpp..x * bpp + bpp]);
            }
          } else {
            for x in 0..pw as usize {
              let sample = get_packed_sample(row, x, depth);
              let full_x = (pass.x_start as usize) + x * pass.x_gap as usize;
              set_packed_sample(dst_row, full_x, depth, sample);
            }
          }
        }
        cursor += size;
      }
    }
  }
  Ok(packed)
}

/// Expands the packed buffer to interleaved RGBA, applying the palette and
/// any `tRNS` transparency.
fn expand(
  ctx: &mut DecodeContext<'_>, header: Ihdr, packed: &[u8], idat_offset: usize,
) -> Result<ImageData, DecodeError> {
  let w = header.width as usize;
  let h = header.height as usize;
  let bpl = header.bytes_per_scanline(header.width);
  let depth = header.bit_depth;
  let channels = header.color_type.channel_count();
  let (trns_y, trns_rgb, trns_alphas): (Option<u16>, Option<[u16; 3]>, Option<&[u8]>) =
    match ctx.trns.as_ref() {
      Some(Transparency::Grayscale(y)) => (Some(*y), None, None),
      Some(Transparency::Rgb(rgb)) => (None, Some(*rgb), None),
      Some(Transparency::PaletteAlphas(alphas)) => (None, None, Some(alphas)),
      None => (None, None, None),
    };

  if depth == 16 {
    let mut out: Vec<u16> = Vec::with_capacity(4 * w * h);
    for y in 0..h {
      let row = &packed[y * bpl..(y + 1) * bpl];
      for x in 0..w {
        let s = |c: usize| -> u16 {
          let at = (x * channels + c) * 2;
          u16::from_be_bytes([row[at], row[at + 1]])
        };
        let px: [u16; 4] = match header.color_type {
          ColorType::Grayscale => {
            let v = s(0);
            let a = if trns_y == Some(v) { 0 } else { u16::MAX };
            [v, v, v, a]
          }
          ColorType::GrayscaleAlpha => {
            let v = s(0);
            [v, v, v, s(1)]
          }
          ColorType::Truecolor => {
            let rgb = [s(0), s(1), s(2)];
            let a = if trns_rgb == Some(rgb) { 0 } else { u16::MAX };
            [rgb[0], rgb[1], rgb[2], a]
          }
          ColorType::TruecolorAlpha => [s(0), s(1), s(2), s(3)],
          // 16-bit indexed is rejected at IHDR parse
          ColorType::Indexed => {
            return Err(ctx.err(
              DecodeErrorKind::InvalidIhdrValue,
              idat_offset,
              "IHDR: Invalid bit depth \"16\" for color type \"3\"".to_string(),
            ))
          }
        };
        out.extend_from_slice(&px);
      }
    }
    return Ok(if ctx.options.force32 {
      ImageData::Bytes(out.into_iter().map(|v| (v >> 8) as u8).collect())
    } else {
      ImageData::Words(out)
    });
  }

  let mut out = vec![0_u8; 4 * w * h];
  let palette = if header.color_type == ColorType::Indexed {
    match ctx.palette.as_ref() {
      Some(p) => Some(p.clone()),
      None => {
        return Err(ctx.err(
          DecodeErrorKind::MissingPalette,
          idat_offset,
          "IDAT: Cannot decode indexed color type without a palette".to_string(),
        ))
      }
    }
  } else {
    None
  };
  for y in 0..h {
    let row = &packed[y * bpl..(y + 1) * bpl];
    for x in 0..w {
      let off = (y * w + x) * 4;
      match header.color_type {
        ColorType::Grayscale => {
          let raw = get_packed_sample(row, x, depth);
          let v = if depth == 8 { raw } else { u8_replicate_bits(depth as u32, raw) };
          let a = if trns_y == Some(raw as u16) { 0 } else { u8::MAX };
          out[off] = v;
          out[off + 1] = v;
          out[off + 2] = v;
          out[off + 3] = a;
        }
        ColorType::GrayscaleAlpha => {
          let v = row[x * 2];
          out[off] = v;
          out[off + 1] = v;
          out[off + 2] = v;
          out[off + 3] = row[x * 2 + 1];
        }
        ColorType::Truecolor => {
          let [r, g, b] = [row[x * 3], row[x * 3 + 1], row[x * 3 + 2]];
          let a = if trns_rgb == Some([r as u16, g as u16, b as u16]) { 0 } else { u8::MAX };
          out[off] = r;
          out[off + 1] = g;
          out[off + 2] = b;
          out[off + 3] = a;
        }
        ColorType::TruecolorAlpha => {
          out[off..off + 4].copy_from_slice(&row[x * 4..x * 4 + 4]);
        }
        ColorType::Indexed => {
          let index = get_packed_sample(row, x, depth) as usize;
          // the palette is always Some on this arm
          let splatted = match palette.as_ref() {
            Some(p) => {
              let ok = p.set_rgba(&mut out, off, index);
              if !ok {
                let size = p.size();
                return Err(ctx.err(
                  DecodeErrorKind::OutOfRangePaletteIndex,
                  idat_offset,
                  format!("IDAT: Palette index out of range ({index} >= {size})"),
                ));
              }
              true
            }
            None => false,
          };
          if splatted {
            if let Some(alphas) = trns_alphas {
              out[off + 3] = *alphas.get(index).unwrap_or(&u8::MAX);
            }
          }
        }
      }
    }
  }
  Ok(ImageData::Bytes(out))
}
