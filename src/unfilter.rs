//! Reversing the per-scanline filters.
//!
//! From the PNG spec:
//!
//! > Filters are applied to **bytes**, not to pixels, regardless of the bit
//! > depth or color type of the image.
//!
//! The lookback distance is the whole-byte pixel size (`bpp`), with packed
//! sub-byte formats using 1. Bytes off the left edge, and the entire prior
//! row above the first scanline, reconstruct as zero.

/// The predictor used by filter type 4.
///
/// Picks whichever of `a` (left), `b` (above), `c` (upper left) is closest
/// to `a + b - c`, breaking ties in that order.
#[inline]
#[must_use]
pub(crate) const fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
  // The PNG spec requires exact arithmetic here, so the math is done at i32
  // width, and the order of the comparisons shall not be rearranged.
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p: i32 = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

/// Reverses the filtering of a whole (reduced) image in place.
///
/// `data` is `stride`-sized rows, each a filter type byte followed by
/// `stride - 1` filtered bytes. On success every row's payload holds
/// reconstructed bytes (filter bytes are left in place; callers skip them).
///
/// Fails with the offending byte when a row declares a filter type outside
/// `0..=4`.
pub(crate) fn unfilter_scanlines(data: &mut [u8], stride: usize, bpp: usize) -> Result<(), u8> {
  debug_assert!(stride > 1);
  let bpl = stride - 1;
  let row_count = data.len() / stride;
  for r in 0..row_count {
    let (before, rest) = data.split_at_mut(r * stride);
    let prior: Option<&[u8]> = if r == 0 { None } else { Some(&before[(r - 1) * stride..]) };
    let row = &mut rest[..stride];
    match row[0] {
      0 => (),
      1 => {
        // Sub
        for x in bpp..bpl {
          row[1 + x] = row[1 + x].wrapping_add(row[1 + x - bpp]);
        }
      }
      2 => {
        // Up: no effect on the first line
        if let Some(p) = prior {
          for x in 0..bpl {
            row[1 + x] = row[1 + x].wrapping_add(p[1 + x]);
          }
        }
      }
      3 => {
        // Average
        for x in 0..bpl {
          let a = if x >= bpp { row[1 + x - bpp] } else { 0 };
          let b = match prior {
            Some(p) => p[1 + x],
            None => 0,
          };
          row[1 + x] = row[1 + x].wrapping_add(((a as u32 + b as u32) / 2) as u8);
        }
      }
      4 => {
        // Paeth
        for x in 0..bpl {
          let a = if x >= bpp { row[1 + x - bpp] } else { 0 };
          let b = match prior {
            Some(p) => p[1 + x],
            None => 0,
          };
          let c = match prior {
            Some(p) if x >= bpp => p[1 + x - bpp],
            _ => 0,
          };
          row[1 + x] = row[1 + x].wrapping_add(paeth_predictor(a, b, c));
        }
      }
      other => return Err(other),
    }
  }
  Ok(())
}
