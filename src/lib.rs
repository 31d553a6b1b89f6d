#![forbid(unsafe_code)]

//! A crate for decoding and encoding PNG data.
//!
//! * [Portable Network Graphics Specification (Second Edition)][png-spec]
//!
//! [png-spec]: https://www.w3.org/TR/2003/REC-PNG-20031110/
//!
//! ## Library Design Assumptions
//!
//! * The entire PNG datastream is a single byte slice. There is no "stream"
//!   decoding that yields pixels before all of the input has been seen.
//! * Decoding always produces interleaved RGBA samples, either 8 or 16 bits
//!   per channel. Packed formats (bit depths 1, 2, and 4) and indexed color
//!   are expanded for you.
//!
//! ## Decoding
//!
//! Call [`decode_png`] and you get a [`DecodedPng`] back: the pixels, the
//! header details, the palette (if any), decoded ancillary metadata, the raw
//! chunk table, and any warnings that were collected along the way.
//!
//! ```no_run
//! let png: &[u8] = unimplemented!("data from somewhere");
//! let decoded = pngine::decode_png(png)?;
//! assert_eq!(decoded.image.data.len(), 4 * (decoded.image.width * decoded.image.height) as usize);
//! # Ok::<(), pngine::DecodeError>(())
//! ```
//!
//! By default only the chunks needed to produce pixels are decoded (`IHDR`,
//! `PLTE`, `IDAT`, `IEND`, and `tRNS`). If you want metadata out of other
//! ancillary chunks, opt in through [`DecodeOptions::parse_chunk_types`]:
//!
//! ```no_run
//! use pngine::{decode_png_with, ChunkType, ChunkTypeFilter, DecodeOptions};
//! # let png: &[u8] = unimplemented!();
//! let options = DecodeOptions {
//!   parse_chunk_types: ChunkTypeFilter::Only(vec![ChunkType::tEXt, ChunkType::pHYs]),
//!   ..DecodeOptions::default()
//! };
//! let decoded = decode_png_with(png, &options)?;
//! # Ok::<(), pngine::DecodeError>(())
//! ```
//!
//! ## Strictness
//!
//! PNG distinguishes recoverable irregularities from fatal ones. The decoder
//! collects the recoverable kind as [`PngWarning`] values and keeps going:
//! chunk CRC mismatches, ordering violations, out-of-range ancillary values,
//! and so on. Under [`DecodeOptions::strict_mode`] every warning is promoted
//! to a [`DecodeError`] on the spot. Fatal problems (bad signature, missing
//! `IHDR`, broken image data) are errors in both modes, and the error value
//! carries a [`PartialDecode`] snapshot of everything learned before the
//! failure.
//!
//! ## Encoding
//!
//! [`encode_png`] takes interleaved RGBA samples and picks a reasonable
//! storage format for them: indexed color with a palette when few distinct
//! colors are used, truecolor otherwise, a `tRNS` chunk or an alpha channel
//! depending on which costs less. Each row is filtered adaptively before the
//! whole stream is deflated. See [`EncodeOptions`] to pin any of the choices.

#[macro_export]
macro_rules! trace {
  ($($arg:tt)*) => {
    #[cfg(feature = "trace")] {
      ::std::print!("{file}:{line}> ", file = file!(), line = line!());
      ::std::println!($($arg)*);
    }
  }
}

mod assert;
mod chunks;
mod crc32;
mod decode;
mod encode;
mod filter;
mod idat;
mod packing;
mod reader;
mod unfilter;

mod chunk;
pub use chunk::*;

mod error;
pub use error::*;

mod ihdr;
pub use ihdr::*;

mod metadata;
pub use metadata::*;

mod palette;
pub use palette::*;

mod pixel_formats;
pub use pixel_formats::*;

pub use decode::{decode_png, decode_png_with, ChunkTypeFilter, DecodeOptions, DecodedPng};
pub use encode::{encode_png, EncodeOptions, EncodedPng};

/// Interleaved RGBA pixels plus their dimensions.
///
/// This is both the output of decoding and the input to encoding. The length
/// invariant is `data.len() == 4 * width * height`, one sample per channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRgba {
  /// Width in pixels, greater than 0.
  pub width: u32,
  /// Height in pixels, greater than 0.
  pub height: u32,
  /// The samples, `[r, g, b, a]` per pixel in row-major order.
  pub data: ImageData,
}

/// The sample storage of an [`ImageRgba`].
///
/// Bit depth 16 images decode to `Words` unless
/// [`DecodeOptions::force32`] is set; everything else decodes to `Bytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageData {
  /// 8 bits per channel.
  Bytes(Vec<u8>),
  /// 16 bits per channel.
  Words(Vec<u16>),
}
impl ImageData {
  /// Number of samples (4 per pixel), regardless of sample width.
  #[inline]
  #[must_use]
  pub fn len(&self) -> usize {
    match self {
      Self::Bytes(b) => b.len(),
      Self::Words(w) => w.len(),
    }
  }
  /// If there are no samples at all.
  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
  /// The maximum sample value for this storage width (255 or 65535).
  #[inline]
  #[must_use]
  pub const fn max_sample(&self) -> u16 {
    match self {
      Self::Bytes(_) => u8::MAX as u16,
      Self::Words(_) => u16::MAX,
    }
  }
}
