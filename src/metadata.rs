//! Typed values for decoded ancillary chunks.
//!
//! Every ancillary chunk the decoder was asked to parse becomes one
//! [`MetadataEntry`], in datastream order. The payload shapes are owned
//! values (not borrows of the input) so the metadata list can outlive the
//! datastream it came from.

use crate::chunk::ChunkType;

/// `bKGD`: the intended background color, shaped by the image's color type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundColor {
  /// Color types 0 and 4.
  Grayscale(u16),
  /// Color types 2 and 6.
  Rgb([u16; 3]),
  /// Color type 3.
  PaletteIndex(u8),
}

/// `cHRM`: primary chromaticities and white point.
///
/// Stored on the wire as integers 100000 times the floating point value;
/// decoded here to the floating point values themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chromaticities {
  pub white_x: f64,
  pub white_y: f64,
  pub red_x: f64,
  pub red_y: f64,
  pub green_x: f64,
  pub green_y: f64,
  pub blue_x: f64,
  pub blue_y: f64,
}

/// `oFFs`: the unit of an image offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OffsetUnit {
  Pixel = 0,
  Micrometer = 1,
}

/// `pHYs`: the unit of the physical pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PhysicalUnit {
  Unknown = 0,
  Meter = 1,
}

/// `sCAL`: the unit of the physical scale of the image subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ScaleUnit {
  Meter = 0,
  Radian = 1,
}

/// `pCAL`: mapping of pixel values to physical quantities.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelCalibration {
  /// Calibration name (Latin-1 in the datastream).
  pub name: String,
  /// Lower limit of the original sample range.
  pub x0: i32,
  /// Upper limit of the original sample range.
  pub x1: i32,
  /// Equation type, 0 through 3.
  pub equation_type: u8,
  /// Unit name.
  pub unit: String,
  /// Equation parameters, count fixed by the equation type.
  pub params: Vec<f64>,
}

/// One entry of a suggested palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestedPaletteEntry {
  pub r: u16,
  pub g: u16,
  pub b: u16,
  pub a: u16,
  /// Approximate usage frequency, encoder-scaled.
  pub frequency: u16,
}

/// `sPLT`: a suggested reduced palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedPalette {
  /// Palette name (Latin-1 in the datastream).
  pub name: String,
  /// 8 or 16; entry samples are stored at this width.
  pub sample_depth: u8,
  pub entries: Vec<SuggestedPaletteEntry>,
}

/// `sRGB`: the ICC rendering intent the image should be displayed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum RenderingIntent {
  /// for images preferring good adaptation to the output device gamut at the
  /// expense of colorimetric accuracy, such as photographs.
  Perceptual = 0,
  /// for images requiring colour appearance matching (relative to the output
  /// device white point), such as logos.
  RelativeColorimetric = 1,
  /// for images preferring preservation of saturation at the expense of hue
  /// and lightness, such as charts and graphs.
  Saturation = 2,
  /// for images requiring preservation of absolute colorimetry.
  AbsoluteColorimetric = 3,
}
impl TryFrom<u8> for RenderingIntent {
  type Error = ();
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => Self::Perceptual,
      1 => Self::RelativeColorimetric,
      2 => Self::Saturation,
      3 => Self::AbsoluteColorimetric,
      _ => return Err(()),
    })
  }
}

/// `sTER`: how the two sub-images of a stereo pair are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StereoMode {
  /// Right image first: view by crossing the eyes.
  CrossFuse = 0,
  /// Left image first: view by diverging the eyes.
  DivergingFuse = 1,
}

/// `tIME`: image last-modification time, UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModificationTime {
  /// 4-digit year.
  pub year: u16,
  /// 1-12
  pub month: u8,
  /// 1-31
  pub day: u8,
  /// 0-23
  pub hour: u8,
  /// 0-59
  pub minute: u8,
  /// 0-60 (60 for leap seconds)
  pub second: u8,
}

/// `tRNS`: transparency outside the color samples.
///
/// * `Grayscale` and `Rgb` name a single color; every pixel exactly matching
///   it is fully transparent, everything else fully opaque. The stored value
///   is always 16 bits wide even when the image bit depth is less.
/// * `PaletteAlphas` runs parallel to the palette; missing trailing entries
///   are fully opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transparency {
  Grayscale(u16),
  Rgb([u16; 3]),
  PaletteAlphas(Vec<u8>),
}

/// One decoded ancillary chunk.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum MetadataEntry {
  /// `bKGD`
  Background(BackgroundColor),
  /// `cHRM`
  Chromaticities(Chromaticities),
  /// `eXIf`, carried verbatim and never interpreted.
  Exif(Vec<u8>),
  /// `gAMA`, already divided down from the wire's ×100000 integer.
  Gamma(f64),
  /// `hIST`, one count per palette entry.
  Histogram(Vec<u16>),
  /// `iCCP`. The profile is inflated but otherwise uninterpreted.
  IccProfile { name: String, profile: Vec<u8> },
  /// `iTXt`
  InternationalText {
    keyword: String,
    language_tag: String,
    translated_keyword: String,
    text: String,
  },
  /// `oFFs`
  Offset { x: i32, y: i32, unit: OffsetUnit },
  /// `pCAL`
  Calibration(PixelCalibration),
  /// `pHYs`
  PhysicalDimensions { ppu_x: u32, ppu_y: u32, unit: PhysicalUnit },
  /// `sBIT`, 1 to 4 entries depending on the color type.
  SignificantBits(Vec<u8>),
  /// `sCAL`
  Scale { unit: ScaleUnit, x: f64, y: f64 },
  /// `sPLT`
  SuggestedPalette(SuggestedPalette),
  /// `sRGB`
  StandardRgb(RenderingIntent),
  /// `sTER`
  Stereo(StereoMode),
  /// `tEXt`
  Text { keyword: String, text: String },
  /// `tIME`
  Time(ModificationTime),
  /// `tRNS`
  Transparency(Transparency),
  /// `zTXt`, text stored inflated.
  CompressedText { keyword: String, text: String },
}
impl MetadataEntry {
  /// The chunk type this entry was decoded from.
  #[must_use]
  pub const fn chunk_type(&self) -> ChunkType {
    match self {
      Self::Background(_) => ChunkType::bKGD,
      Self::Chromaticities(_) => ChunkType::cHRM,
      Self::Exif(_) => ChunkType::eXIf,
      Self::Gamma(_) => ChunkType::gAMA,
      Self::Histogram(_) => ChunkType::hIST,
      Self::IccProfile { .. } => ChunkType::iCCP,
      Self::InternationalText { .. } => ChunkType::iTXt,
      Self::Offset { .. } => ChunkType::oFFs,
      Self::Calibration(_) => ChunkType::pCAL,
      Self::PhysicalDimensions { .. } => ChunkType::pHYs,
      Self::SignificantBits(_) => ChunkType::sBIT,
      Self::Scale { .. } => ChunkType::sCAL,
      Self::SuggestedPalette(_) => ChunkType::sPLT,
      Self::StandardRgb(_) => ChunkType::sRGB,
      Self::Stereo(_) => ChunkType::sTER,
      Self::Text { .. } => ChunkType::tEXt,
      Self::Time(_) => ChunkType::tIME,
      Self::Transparency(_) => ChunkType::tRNS,
      Self::CompressedText { .. } => ChunkType::zTXt,
    }
  }
}
