//! The encoder: analyze the pixels, pick a storage format, then emit
//! signature, `IHDR`, metadata, `PLTE`/`tRNS` as needed, one adaptively
//! filtered `IDAT`, and `IEND`.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use crate::{
  chunk::{ChunkType, PNG_SIGNATURE},
  chunks,
  crc32::crc32,
  error::{EncodeError, PngWarning},
  filter::{filter_scanline, sum_abs},
  ihdr::{ColorType, Ihdr, InterlaceMethod},
  metadata::{MetadataEntry, Transparency},
  packing::set_packed_sample,
  reader::ByteWriter,
  ImageData, ImageRgba,
};

/// Knobs for [`encode_png`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodeOptions {
  /// Pin the stored bit depth. `None` keeps the image's own sample width
  /// (8 for byte data, 16 for word data). Depths below 8 are honored for
  /// indexed storage, and for grayscale when every sample is exactly
  /// representable.
  pub bit_depth: Option<u8>,
  /// Pin the color type. `None` picks indexed color when at most 256
  /// distinct RGB values are used, truecolor otherwise.
  pub color_type: Option<ColorType>,
  /// Extra metadata chunks to embed, written between `IHDR` and `PLTE`.
  pub ancillary_chunks: Vec<MetadataEntry>,
  /// Refuse, rather than warn about, anything lossy the caller didn't ask
  /// for: color type upgrades and bit depth reductions.
  pub strict_mode: bool,
}

/// A successfully encoded datastream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPng {
  /// The complete PNG datastream.
  pub data: Vec<u8>,
  /// Anything noteworthy the encoder did on its own initiative.
  pub warnings: Vec<PngWarning>,
}

struct EncodeContext {
  warnings: Vec<PngWarning>,
  strict: bool,
}
impl EncodeContext {
  fn warn(&mut self, message: String) -> Result<(), EncodeError> {
    if self.strict {
      Err(EncodeError::new(message))
    } else {
      self.warnings.push(PngWarning { message, offset: 0 });
      Ok(())
    }
  }

  /// A color type upgrade: silent when the type was auto-chosen, a warning
  /// (or strict refusal) when the caller pinned it.
  fn upgrade(&mut self, forced: bool, from: ColorType, to: ColorType) -> Result<(), EncodeError> {
    if !forced {
      return Ok(());
    }
    if self.strict {
      return Err(EncodeError::new(format!(
        "Cannot encode image as color type {from} without data loss"
      )));
    }
    self.warnings.push(PngWarning {
      message: format!("Upgrading color type {from} to {to} to preserve image contents"),
      offset: 0,
    });
    Ok(())
  }
}

/// Encodes RGBA samples as a PNG datastream.
pub fn encode_png(image: &ImageRgba, options: &EncodeOptions) -> Result<EncodedPng, EncodeError> {
  if image.width == 0 {
    return Err(EncodeError::new("Invalid width \"0\"".to_string()));
  }
  if image.height == 0 {
    return Err(EncodeError::new("Invalid height \"0\"".to_string()));
  }
  let expected = 4 * (image.width as usize) * (image.height as usize);
  if image.data.len() != expected {
    let n = image.data.len();
    return Err(EncodeError::new(format!("Invalid data length: {n} !== {expected}")));
  }
  let mut ctx = EncodeContext { warnings: Vec::new(), strict: options.strict_mode };
  let (samples, target_depth) = normalize_samples(&mut ctx, image, options)?;
  let w = image.width as usize;
  let h = image.height as usize;
  trace!("encoding {w}x{h}, target depth {target_depth:?}");
  let data = match &samples {
    Samples::Bytes(data) => encode_bytes(&mut ctx, data, w, h, options, target_depth)?,
    Samples::Words(data) => encode_words(&mut ctx, data, w, h, options)?,
  };
  Ok(EncodedPng { data, warnings: ctx.warnings })
}

/// Sample storage after bit depth requests are applied.
enum Samples<'a> {
  Bytes(Cow<'a, [u8]>),
  Words(Cow<'a, [u16]>),
}

/// Converts between 8- and 16-bit sample storage up front, so the rest of
/// the encoder only deals with samples already at their stored width.
/// Returns the samples and the caller's depth request for the byte path
/// (packed depths below 8 are resolved later, against the chosen color
/// type).
fn normalize_samples<'a>(
  ctx: &mut EncodeContext, image: &'a ImageRgba, options: &EncodeOptions,
) -> Result<(Samples<'a>, Option<u8>), EncodeError> {
  match (&image.data, options.bit_depth) {
    (ImageData::Bytes(b), None) => Ok((Samples::Bytes(Cow::Borrowed(b)), None)),
    (ImageData::Bytes(b), Some(d @ (1 | 2 | 4 | 8))) => {
      Ok((Samples::Bytes(Cow::Borrowed(b)), Some(d)))
    }
    (ImageData::Bytes(b), Some(16)) => {
      // lossless widening: 0xAB becomes 0xABAB
      let widened: Vec<u16> = b.iter().map(|&v| v as u16 * 257).collect();
      Ok((Samples::Words(Cow::Owned(widened)), None))
    }
    (ImageData::Words(v), None | Some(16)) => Ok((Samples::Words(Cow::Borrowed(v)), None)),
    (ImageData::Words(v), Some(d @ (1 | 2 | 4 | 8))) => {
      ctx.warn("Reducing bit depth from 16 to 8 loses precision".to_string())?;
      let narrowed: Vec<u8> = v.iter().map(|&v| (v >> 8) as u8).collect();
      Ok((Samples::Bytes(Cow::Owned(narrowed)), Some(d)))
    }
    (_, Some(other)) => Err(EncodeError::new(format!("Invalid bit depth \"{other}\""))),
  }
}

/// What the pixel analyzer learned from an 8-bit image.
struct ByteAnalysis {
  /// Distinct RGBA colors in first-appearance order (the palette, when
  /// indexed storage is chosen). Not tracked past 256 entries.
  colors: Vec<[u8; 4]>,
  /// RGBA key to palette index.
  color_index: HashMap<u32, u16>,
  /// More than 256 distinct RGBA colors exist; `colors` is incomplete.
  color_overflow: bool,
  /// More than 256 distinct RGB values exist.
  rgb_overflow: bool,
  /// Distinct colors with alpha below max, capped at 2 (only "none", "one",
  /// and "several" matter).
  transparent: Vec<[u8; 4]>,
  all_gray: bool,
  all_opaque: bool,
}

fn analyze_bytes(data: &[u8]) -> ByteAnalysis {
  let mut a = ByteAnalysis {
    colors: Vec::new(),
    color_index: HashMap::new(),
    color_overflow: false,
    rgb_overflow: false,
    transparent: Vec::new(),
    all_gray: true,
    all_opaque: true,
  };
  let mut rgb_set: HashSet<u32> = HashSet::new();
  for px in data.chunks_exact(4) {
    let [r, g, b, al] = [px[0], px[1], px[2], px[3]];
    a.all_gray &= r == g && g == b;
    a.all_opaque &= al == u8::MAX;
    if !a.rgb_overflow {
      rgb_set.insert(u32::from_be_bytes([0, r, g, b]));
      if rgb_set.len() > 256 {
        a.rgb_overflow = true;
      }
    }
    if !a.color_overflow {
      let key = u32::from_be_bytes([r, g, b, al]);
      if !a.color_index.contains_key(&key) {
        if a.colors.len() >= 256 {
          a.color_overflow = true;
        } else {
          a.color_index.insert(key, a.colors.len() as u16);
          a.colors.push([r, g, b, al]);
        }
      }
    }
    if al < u8::MAX && a.transparent.len() < 2 && !a.transparent.contains(&[r, g, b, al]) {
      a.transparent.push([r, g, b, al]);
    }
  }
  a
}

/// Whether any not-fully-transparent pixel shares the RGB of the transparent
/// color, which would make a `tRNS` restatement ambiguous.
fn transparent_color_reused(data: &[u8], t: [u8; 4]) -> bool {
  data.chunks_exact(4).any(|px| px[3] != 0 && px[0] == t[0] && px[1] == t[1] && px[2] == t[2])
}

fn encode_bytes(
  ctx: &mut EncodeContext, data: &[u8], w: usize, h: usize, options: &EncodeOptions,
  target_depth: Option<u8>,
) -> Result<Vec<u8>, EncodeError> {
  let a = analyze_bytes(data);
  let forced = options.color_type;
  let mut ct = match forced {
    Some(ct) => ct,
    None => {
      if a.rgb_overflow {
        ColorType::Truecolor
      } else {
        ColorType::Indexed
      }
    }
  };
  if ct == ColorType::Indexed && a.color_overflow {
    ctx.upgrade(forced.is_some(), ct, ColorType::Truecolor)?;
    ct = ColorType::Truecolor;
  }
  if matches!(ct, ColorType::Grayscale | ColorType::GrayscaleAlpha) && !a.all_gray {
    let to = if ct == ColorType::Grayscale {
      ColorType::Truecolor
    } else {
      ColorType::TruecolorAlpha
    };
    ctx.upgrade(forced.is_some(), ct, to)?;
    ct = to;
  }

  // a tRNS chunk can restate exactly one fully transparent color, and only
  // when no visible pixel reuses its RGB; otherwise the image needs a real
  // alpha channel.
  let mut trns: Option<Transparency> = None;
  if matches!(ct, ColorType::Grayscale | ColorType::Truecolor) && !a.all_opaque {
    let viable = a.transparent.len() == 1
      && a.transparent[0][3] == 0
      && !transparent_color_reused(data, a.transparent[0]);
    let trns_cost = 12 + if ct == ColorType::Grayscale { 2 } else { 6 };
    let alpha_cost = w * h;
    if viable && trns_cost < alpha_cost {
      let t = a.transparent[0];
      trns = Some(if ct == ColorType::Grayscale {
        Transparency::Grayscale(t[0] as u16)
      } else {
        Transparency::Rgb([t[0] as u16, t[1] as u16, t[2] as u16])
      });
    } else {
      let to = if ct == ColorType::Grayscale {
        ColorType::GrayscaleAlpha
      } else {
        ColorType::TruecolorAlpha
      };
      ctx.upgrade(forced == Some(ct), ct, to)?;
      ct = to;
    }
  }

  let mut bit_depth = 8_u8;
  let mut palette_rgb: Vec<u8> = Vec::new();
  let mut palette_alphas: Vec<u8> = Vec::new();
  if ct == ColorType::Indexed {
    for c in &a.colors {
      palette_rgb.extend_from_slice(&c[..3]);
      palette_alphas.push(c[3]);
    }
    bit_depth = match a.colors.len() {
      0..=2 => 1,
      3..=4 => 2,
      5..=16 => 4,
      _ => 8,
    };
  }
  if let Some(d) = target_depth {
    if !ct.allows_bit_depth(d) {
      return Err(EncodeError::new(format!(
        "Invalid bit depth \"{d}\" for color type \"{ct}\""
      )));
    }
    match ct {
      ColorType::Indexed => {
        let n = a.colors.len();
        if (1_usize << d) < n {
          return Err(EncodeError::new(format!(
            "Bit depth {d} cannot index {n} palette entries"
          )));
        }
        bit_depth = d;
      }
      ColorType::Grayscale if d < 8 => {
        let factor = 255 / ((1_u16 << d) - 1) as u8;
        let representable = data.chunks_exact(4).all(|px| px[0] % factor == 0);
        if representable {
          bit_depth = d;
        } else {
          ctx.warn(format!("Bit depth {d} cannot represent every sample, storing at 8"))?;
        }
      }
      _ => bit_depth = d,
    }
  }
  if ct == ColorType::Grayscale && bit_depth < 8 {
    let factor = (255 / ((1_u16 << bit_depth) - 1)) as u16;
    if let Some(Transparency::Grayscale(v)) = trns.as_mut() {
      *v /= factor;
    }
  }

  let ihdr = Ihdr {
    width: w as u32,
    height: h as u32,
    bit_depth,
    color_type: ct,
    interlace_method: InterlaceMethod::None,
  };
  trace!("storing as color type {ct} depth {bit_depth}");
  let rows = build_rows_bytes(data, w, h, &ihdr, &a.color_index);

  let mut out = emit_preamble(ctx, &ihdr, options)?;
  if ct == ColorType::Indexed {
    write_chunk(&mut out, ChunkType::PLTE, &palette_rgb);
    let alphas = chunks::trns::encode_palette_alphas(&palette_alphas);
    if !alphas.is_empty() {
      write_chunk(&mut out, ChunkType::tRNS, &alphas);
    }
  }
  match &trns {
    Some(Transparency::Grayscale(y)) => {
      write_chunk(&mut out, ChunkType::tRNS, &chunks::trns::encode_grayscale(*y))
    }
    Some(Transparency::Rgb(rgb)) => {
      write_chunk(&mut out, ChunkType::tRNS, &chunks::trns::encode_rgb(*rgb))
    }
    _ => (),
  }
  write_idat(&mut out, &rows, &ihdr);
  write_chunk(&mut out, ChunkType::IEND, &[]);
  Ok(out)
}

fn build_rows_bytes(
  data: &[u8], w: usize, h: usize, ihdr: &Ihdr, color_index: &HashMap<u32, u16>,
) -> Vec<u8> {
  let bpl = ihdr.bytes_per_scanline(ihdr.width);
  let depth = ihdr.bit_depth;
  let gray_factor = if depth < 8 { 255 / ((1_u16 << depth) - 1) as u8 } else { 1 };
  let mut rows = vec![0_u8; bpl * h];
  for y in 0..h {
    let row = &mut rows[y * bpl..(y + 1) * bpl];
    for x in 0..w {
      let at = (y * w + x) * 4;
      let px = &data[at..at + 4];
      match ihdr.color_type {
        ColorType::Grayscale => {
          if depth == 8 {
            row[x] = px[0];
          } else {
            set_packed_sample(row, x, depth, px[0] / gray_factor);
          }
        }
        ColorType::GrayscaleAlpha => {
          row[x * 2] = px[0];
          row[x * 2 + 1] = px[3];
        }
        ColorType::Truecolor => row[x * 3..x * 3 + 3].copy_from_slice(&px[..3]),
        ColorType::TruecolorAlpha => row[x * 4..x * 4 + 4].copy_from_slice(px),
        ColorType::Indexed => {
          let key = u32::from_be_bytes([px[0], px[1], px[2], px[3]]);
          let index = *color_index.get(&key).unwrap_or(&0) as u8;
          set_packed_sample(row, x, depth, index);
        }
      }
    }
  }
  rows
}

/// What the analyzer learned from a 16-bit image. Indexed storage is off the
/// table at this width, so no palette is collected.
struct WordAnalysis {
  transparent: Vec<[u16; 4]>,
  all_gray: bool,
  all_opaque: bool,
}

fn analyze_words(data: &[u16]) -> WordAnalysis {
  let mut a = WordAnalysis { transparent: Vec::new(), all_gray: true, all_opaque: true };
  for px in data.chunks_exact(4) {
    let [r, g, b, al] = [px[0], px[1], px[2], px[3]];
    a.all_gray &= r == g && g == b;
    a.all_opaque &= al == u16::MAX;
    if al < u16::MAX && a.transparent.len() < 2 && !a.transparent.contains(&[r, g, b, al]) {
      a.transparent.push([r, g, b, al]);
    }
  }
  a
}

fn transparent_color_reused_words(data: &[u16], t: [u16; 4]) -> bool {
  data.chunks_exact(4).any(|px| px[3] != 0 && px[0] == t[0] && px[1] == t[1] && px[2] == t[2])
}

fn encode_words(
  ctx: &mut EncodeContext, data: &[u16], w: usize, h: usize, options: &EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
  let a = analyze_words(data);
  let forced = options.color_type;
  let mut ct = forced.unwrap_or(ColorType::Truecolor);
  if ct == ColorType::Indexed {
    return Err(EncodeError::new("Invalid bit depth \"16\" for color type \"3\"".to_string()));
  }
  if matches!(ct, ColorType::Grayscale | ColorType::GrayscaleAlpha) && !a.all_gray {
    let to = if ct == ColorType::Grayscale {
      ColorType::Truecolor
    } else {
      ColorType::TruecolorAlpha
    };
    ctx.upgrade(forced.is_some(), ct, to)?;
    ct = to;
  }
  let mut trns: Option<Transparency> = None;
  if matches!(ct, ColorType::Grayscale | ColorType::Truecolor) && !a.all_opaque {
    let viable = a.transparent.len() == 1
      && a.transparent[0][3] == 0
      && !transparent_color_reused_words(data, a.transparent[0]);
    let trns_cost = 12 + if ct == ColorType::Grayscale { 2 } else { 6 };
    let alpha_cost = 2 * w * h;
    if viable && trns_cost < alpha_cost {
      let t = a.transparent[0];
      trns = Some(if ct == ColorType::Grayscale {
        Transparency::Grayscale(t[0])
      } else {
        Transparency::Rgb([t[0], t[1], t[2]])
      });
    } else {
      let to = if ct == ColorType::Grayscale {
        ColorType::GrayscaleAlpha
      } else {
        ColorType::TruecolorAlpha
      };
      ctx.upgrade(forced == Some(ct), ct, to)?;
      ct = to;
    }
  }

  let ihdr = Ihdr {
    width: w as u32,
    height: h as u32,
    bit_depth: 16,
    color_type: ct,
    interlace_method: InterlaceMethod::None,
  };
  trace!("storing as color type {ct} depth 16");
  let rows = build_rows_words(data, w, h, &ihdr);

  let mut out = emit_preamble(ctx, &ihdr, options)?;
  match &trns {
    Some(Transparency::Grayscale(y)) => {
      write_chunk(&mut out, ChunkType::tRNS, &chunks::trns::encode_grayscale(*y))
    }
    Some(Transparency::Rgb(rgb)) => {
      write_chunk(&mut out, ChunkType::tRNS, &chunks::trns::encode_rgb(*rgb))
    }
    _ => (),
  }
  write_idat(&mut out, &rows, &ihdr);
  write_chunk(&mut out, ChunkType::IEND, &[]);
  Ok(out)
}

fn build_rows_words(data: &[u16], w: usize, h: usize, ihdr: &Ihdr) -> Vec<u8> {
  let bpl = ihdr.bytes_per_scanline(ihdr.width);
  let channels = ihdr.color_type.channel_count();
  let mut rows = vec![0_u8; bpl * h];
  for y in 0..h {
    let row = &mut rows[y * bpl..(y + 1) * bpl];
    for x in 0..w {
      let at = (y * w + x) * 4;
      let px = &data[at..at + 4];
      let mut put = |c: usize, v: u16| {
        row[(x * channels + c) * 2..(x * channels + c) * 2 + 2]
          .copy_from_slice(&v.to_be_bytes());
      };
      match ihdr.color_type {
        ColorType::Grayscale => put(0, px[0]),
        ColorType::GrayscaleAlpha => {
          put(0, px[0]);
          put(1, px[3]);
        }
        ColorType::Truecolor => {
          put(0, px[0]);
          put(1, px[1]);
          put(2, px[2]);
        }
        ColorType::TruecolorAlpha => {
          put(0, px[0]);
          put(1, px[1]);
          put(2, px[2]);
          put(3, px[3]);
        }
        ColorType::Indexed => (/* rejected before row building */),
      }
    }
  }
  rows
}

/// Signature, `IHDR`, and any caller-supplied metadata chunks.
fn emit_preamble(
  ctx: &mut EncodeContext, ihdr: &Ihdr, options: &EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
  let mut out = Vec::new();
  out.extend_from_slice(&PNG_SIGNATURE);
  let mut p = ByteWriter::with_exact_size(13);
  p.u32_be(ihdr.width);
  p.u32_be(ihdr.height);
  p.u8(ihdr.bit_depth);
  p.u8(ihdr.color_type as u8);
  p.u8(0); // compression method
  p.u8(0); // filter method
  p.u8(ihdr.interlace_method as u8);
  write_chunk(&mut out, ChunkType::IHDR, &p.finish());
  for entry in &options.ancillary_chunks {
    write_ancillary(ctx, &mut out, entry)?;
  }
  Ok(out)
}

fn write_ancillary(
  ctx: &mut EncodeContext, out: &mut Vec<u8>, entry: &MetadataEntry,
) -> Result<(), EncodeError> {
  let payload: Option<Vec<u8>> = match entry {
    MetadataEntry::Gamma(g) => Some(chunks::gama::encode(*g)),
    MetadataEntry::PhysicalDimensions { ppu_x, ppu_y, unit } => {
      Some(chunks::phys::encode(*ppu_x, *ppu_y, *unit))
    }
    MetadataEntry::StandardRgb(intent) => Some(chunks::srgb::encode(*intent)),
    MetadataEntry::SignificantBits(values) => Some(chunks::sbit::encode(values)),
    MetadataEntry::Chromaticities(c) => Some(chunks::chrm::encode(c)),
    MetadataEntry::Offset { x, y, unit } => Some(chunks::offs::encode(*x, *y, *unit)),
    MetadataEntry::Stereo(mode) => Some(chunks::ster::encode(*mode)),
    MetadataEntry::Exif(data) => Some(chunks::exif::encode(data)),
    MetadataEntry::Time(t) => Some(chunks::time::encode(t)),
    MetadataEntry::Text { keyword, text } => Some(chunks::text::encode(keyword, text)),
    MetadataEntry::CompressedText { keyword, text } => Some(chunks::ztxt::encode(keyword, text)),
    MetadataEntry::InternationalText { keyword, language_tag, translated_keyword, text } => {
      Some(chunks::itxt::encode(keyword, language_tag, translated_keyword, text))
    }
    other => {
      let t = other.chunk_type();
      ctx.warn(format!("Unsupported ancillary chunk type for encoding: {t}"))?;
      None
    }
  };
  if let Some(data) = payload {
    write_chunk(out, entry.chunk_type(), &data);
  }
  Ok(())
}

/// Frames a chunk: length, type, data, CRC over type and data.
fn write_chunk(out: &mut Vec<u8>, ty: ChunkType, data: &[u8]) {
  out.extend_from_slice(&(data.len() as u32).to_be_bytes());
  out.extend_from_slice(&ty.as_bytes());
  out.extend_from_slice(data);
  let crc = crc32(ty.as_bytes().iter().copied().chain(data.iter().copied()));
  out.extend_from_slice(&crc.to_be_bytes());
}

/// Filters every row with whichever of the five filters minimizes the sum of
/// absolute values, deflates the whole stream, and frames it as one `IDAT`.
fn write_idat(out: &mut Vec<u8>, rows: &[u8], ihdr: &Ihdr) {
  let bpl = ihdr.bytes_per_scanline(ihdr.width);
  let bpp = ihdr.bytes_per_pixel();
  let h = ihdr.height as usize;
  let zero_prior = vec![0_u8; bpl];
  let mut best = vec![0_u8; bpl];
  let mut trial = vec![0_u8; bpl];
  let mut filtered = Vec::with_capacity((bpl + 1) * h);
  for y in 0..h {
    let cur = &rows[y * bpl..(y + 1) * bpl];
    let prior: &[u8] = if y == 0 { &zero_prior } else { &rows[(y - 1) * bpl..y * bpl] };
    let mut best_ty = 0_u8;
    filter_scanline(0, cur, prior, bpp, &mut best);
    let mut best_sum = sum_abs(&best);
    for ty in 1..=4_u8 {
      filter_scanline(ty, cur, prior, bpp, &mut trial);
      let sum = sum_abs(&trial);
      if sum < best_sum {
        core::mem::swap(&mut best, &mut trial);
        best_ty = ty;
        best_sum = sum;
      }
    }
    filtered.push(best_ty);
    filtered.extend_from_slice(&best);
  }
  let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&filtered, 6);
  write_chunk(out, ChunkType::IDAT, &compressed);
}
