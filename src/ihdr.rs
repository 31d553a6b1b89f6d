//! The image header and the geometry math that hangs off of it.

use crate::{
  chunk::ChunkRecord,
  decode::DecodeContext,
  error::{DecodeError, DecodeErrorKind},
};

/// The types of color that PNG supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ColorType {
  /// Greyscale
  Grayscale = 0,
  /// Red, Green, Blue
  Truecolor = 2,
  /// Index into a palette.
  ///
  /// The palette has RGB entries; transparency, if any, arrives through a
  /// separate `tRNS` chunk.
  Indexed = 3,
  /// Greyscale + Alpha
  GrayscaleAlpha = 4,
  /// Red, Green, Blue, Alpha
  TruecolorAlpha = 6,
}
impl ColorType {
  /// The number of channels in this type of color.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::Grayscale => 1,
      Self::Truecolor => 3,
      Self::Indexed => 1,
      Self::GrayscaleAlpha => 2,
      Self::TruecolorAlpha => 4,
    }
  }
  /// If this color type carries its own alpha samples.
  #[inline]
  #[must_use]
  pub const fn has_alpha(self) -> bool {
    matches!(self, Self::GrayscaleAlpha | Self::TruecolorAlpha)
  }
  /// The legal bit depths for this color type.
  #[inline]
  #[must_use]
  pub const fn allows_bit_depth(self, bit_depth: u8) -> bool {
    match self {
      Self::Grayscale => matches!(bit_depth, 1 | 2 | 4 | 8 | 16),
      Self::Indexed => matches!(bit_depth, 1 | 2 | 4 | 8),
      Self::Truecolor | Self::GrayscaleAlpha | Self::TruecolorAlpha => {
        matches!(bit_depth, 8 | 16)
      }
    }
  }
}
impl TryFrom<u8> for ColorType {
  type Error = ();
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => ColorType::Grayscale,
      2 => ColorType::Truecolor,
      3 => ColorType::Indexed,
      4 => ColorType::GrayscaleAlpha,
      6 => ColorType::TruecolorAlpha,
      _ => return Err(()),
    })
  }
}
impl core::fmt::Display for ColorType {
  /// Displays as the wire value, which is what diagnostic messages want.
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    write!(f, "{}", *self as u8)
  }
}

/// Whether the image data is stored interlaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum InterlaceMethod {
  /// Scanlines top to bottom, the normal case.
  None = 0,
  /// The seven-pass 8×8 lattice scheme.
  Adam7 = 1,
}

/// Image Header
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ihdr {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// bits per channel
  pub bit_depth: u8,
  /// pixel color type
  pub color_type: ColorType,
  /// how scanlines are laid out in the compressed stream
  pub interlace_method: InterlaceMethod,
}
impl Ihdr {
  /// Bits for one pixel's worth of samples.
  #[inline]
  #[must_use]
  pub const fn bits_per_pixel(&self) -> usize {
    (self.bit_depth as usize) * self.color_type.channel_count()
  }

  /// Bytes of filter lookback, the `bpp` of the filter equations.
  ///
  /// Sub-byte formats round up to 1: filters always work on whole bytes.
  #[inline]
  #[must_use]
  pub const fn bytes_per_pixel(&self) -> usize {
    let bits = self.bits_per_pixel();
    if bits < 8 {
      1
    } else {
      bits / 8
    }
  }

  /// Bytes in one packed scanline of `width` pixels, excluding the filter
  /// byte. Sub-byte formats can end with padding bits, so this rounds up.
  #[inline]
  #[must_use]
  pub const fn bytes_per_scanline(&self, width: u32) -> usize {
    (self.bits_per_pixel() * (width as usize) + 7) / 8
  }

  /// The exact size of the inflated IDAT stream: every scanline of every
  /// (reduced) image plus one filter byte each.
  #[must_use]
  pub fn decompressed_size(&self) -> usize {
    let one = |width: u32, height: u32| -> usize {
      if width == 0 || height == 0 {
        0
      } else {
        (self.bytes_per_scanline(width) + 1).saturating_mul(height as usize)
      }
    };
    match self.interlace_method {
      InterlaceMethod::None => one(self.width, self.height),
      InterlaceMethod::Adam7 => {
        let mut total = 0_usize;
        for pass in ADAM7_PASSES.iter() {
          let (w, h) = pass.dimensions(self.width, self.height);
          total = total.saturating_add(one(w, h));
        }
        total
      }
    }
  }
}

/// One pass of the Adam7 interlacing lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InterlacePass {
  pub x_start: u32,
  pub y_start: u32,
  pub x_gap: u32,
  pub y_gap: u32,
}
impl InterlacePass {
  /// The dimensions of this pass's reduced image for a full image of
  /// `width × height`. Either can come out 0, in which case the pass
  /// contributes no bytes at all to the datastream.
  #[inline]
  #[must_use]
  pub const fn dimensions(&self, width: u32, height: u32) -> (u32, u32) {
    let w = (width.saturating_sub(self.x_start) + self.x_gap - 1) / self.x_gap;
    let h = (height.saturating_sub(self.y_start) + self.y_gap - 1) / self.y_gap;
    (w, h)
  }
}

/// The seven reduced images, in datastream order.
///
/// ```text
/// 1 6 4 6 2 6 4 6
/// 7 7 7 7 7 7 7 7
/// 5 6 5 6 5 6 5 6
/// 7 7 7 7 7 7 7 7
/// 3 6 4 6 3 6 4 6
/// 7 7 7 7 7 7 7 7
/// 5 6 5 6 5 6 5 6
/// 7 7 7 7 7 7 7 7
/// ```
pub(crate) const ADAM7_PASSES: [InterlacePass; 7] = [
  InterlacePass { x_start: 0, y_start: 0, x_gap: 8, y_gap: 8 },
  InterlacePass { x_start: 4, y_start: 0, x_gap: 8, y_gap: 8 },
  InterlacePass { x_start: 0, y_start: 4, x_gap: 4, y_gap: 8 },
  InterlacePass { x_start: 2, y_start: 0, x_gap: 4, y_gap: 4 },
  InterlacePass { x_start: 0, y_start: 2, x_gap: 2, y_gap: 4 },
  InterlacePass { x_start: 1, y_start: 0, x_gap: 2, y_gap: 2 },
  InterlacePass { x_start: 0, y_start: 1, x_gap: 1, y_gap: 2 },
];

/// Parses and validates the IHDR chunk's 13 payload bytes.
///
/// Compression and filter methods other than 0 are warnings (nothing else is
/// defined, so decoding proceeds as if they were 0); everything else wrong in
/// here is fatal, because later stages can't interpret the image without it.
pub(crate) fn parse_ihdr(
  ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord,
) -> Result<Ihdr, DecodeError> {
  let offset = chunk.offset;
  let data = chunk.data(ctx.bytes);
  if data.len() != 13 {
    return Err(ctx.err(
      DecodeErrorKind::ChunkDataLengthShort,
      offset,
      format!("IHDR: Invalid data length: {} !== 13", data.len()),
    ));
  }
  let width = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
  let height = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
  let bit_depth = data[8];
  let color_type_byte = data[9];
  let compression_method = data[10];
  let filter_method = data[11];
  let interlace_byte = data[12];

  if width == 0 {
    return Err(ctx.err(
      DecodeErrorKind::InvalidIhdrValue,
      offset,
      "IHDR: Invalid width \"0\"".to_string(),
    ));
  }
  if height == 0 {
    return Err(ctx.err(
      DecodeErrorKind::InvalidIhdrValue,
      offset,
      "IHDR: Invalid height \"0\"".to_string(),
    ));
  }
  if !matches!(bit_depth, 1 | 2 | 4 | 8 | 16) {
    return Err(ctx.err(
      DecodeErrorKind::InvalidIhdrValue,
      offset,
      format!("IHDR: Invalid bit depth \"{bit_depth}\""),
    ));
  }
  let color_type = ColorType::try_from(color_type_byte).map_err(|()| {
    ctx.err(
      DecodeErrorKind::InvalidIhdrValue,
      offset,
      format!("IHDR: Invalid color type \"{color_type_byte}\""),
    )
  })?;
  if !color_type.allows_bit_depth(bit_depth) {
    return Err(ctx.err(
      DecodeErrorKind::InvalidIhdrValue,
      offset,
      format!("IHDR: Invalid bit depth \"{bit_depth}\" for color type \"{color_type}\""),
    ));
  }
  if compression_method != 0 {
    ctx.warn(offset, format!("IHDR: Invalid compression method \"{compression_method}\""))?;
  }
  if filter_method != 0 {
    ctx.warn(offset, format!("IHDR: Invalid filter method \"{filter_method}\""))?;
  }
  let interlace_method = match interlace_byte {
    0 => InterlaceMethod::None,
    1 => InterlaceMethod::Adam7,
    other => {
      return Err(ctx.err(
        DecodeErrorKind::InvalidIhdrValue,
        offset,
        format!("IHDR: Invalid interlace method \"{other}\""),
      ))
    }
  };
  Ok(Ihdr { width, height, bit_depth, color_type, interlace_method })
}
