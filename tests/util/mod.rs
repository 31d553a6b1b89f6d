//! Helpers for building PNG datastreams byte by byte.
#![allow(dead_code)]

/// Bitwise CRC-32, independent of the implementation under test.
pub fn crc32(bytes: &[u8]) -> u32 {
  let mut c = u32::MAX;
  for &b in bytes {
    c ^= b as u32;
    for _ in 0..8 {
      c = if (c & 1) != 0 { 0xEDB8_8320 ^ (c >> 1) } else { c >> 1 };
    }
  }
  c ^ u32::MAX
}

/// Frames one chunk: length, type, data, CRC over type and data.
pub fn chunk(ty: &[u8; 4], data: &[u8]) -> Vec<u8> {
  let mut out = Vec::with_capacity(12 + data.len());
  out.extend_from_slice(&(data.len() as u32).to_be_bytes());
  out.extend_from_slice(ty);
  out.extend_from_slice(data);
  let mut covered = ty.to_vec();
  covered.extend_from_slice(data);
  out.extend_from_slice(&crc32(&covered).to_be_bytes());
  out
}

/// Signature plus the given chunks.
pub fn png(chunks: &[Vec<u8>]) -> Vec<u8> {
  let mut out = vec![137, 80, 78, 71, 13, 10, 26, 10];
  for c in chunks {
    out.extend_from_slice(c);
  }
  out
}

/// A 13-byte IHDR payload.
pub fn ihdr(width: u32, height: u32, bit_depth: u8, color_type: u8, interlace: u8) -> Vec<u8> {
  let mut data = Vec::with_capacity(13);
  data.extend_from_slice(&width.to_be_bytes());
  data.extend_from_slice(&height.to_be_bytes());
  data.extend_from_slice(&[bit_depth, color_type, 0, 0, interlace]);
  data
}

/// Zlib-compresses filtered scanline bytes for an IDAT payload.
pub fn zlib(data: &[u8]) -> Vec<u8> {
  miniz_oxide::deflate::compress_to_vec_zlib(data, 6)
}

/// Packs 2-bit samples, leftmost sample in the high bits.
pub fn pack2(samples: &[u8]) -> Vec<u8> {
  let mut out = vec![0_u8; (samples.len() + 3) / 4];
  for (i, &s) in samples.iter().enumerate() {
    out[i / 4] |= (s & 0b11) << (6 - 2 * (i % 4));
  }
  out
}
