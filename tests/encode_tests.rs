mod util;

use pngine::{
  decode_png, decode_png_with, encode_png, ChunkType, ChunkTypeFilter, ColorType, DecodeOptions,
  EncodeOptions, ImageData, ImageRgba, MetadataEntry, ModificationTime, PhysicalUnit,
  RenderingIntent, Transparency,
};

fn bytes_image(width: u32, height: u32, data: Vec<u8>) -> ImageRgba {
  ImageRgba { width, height, data: ImageData::Bytes(data) }
}

fn all_chunks() -> DecodeOptions {
  DecodeOptions { parse_chunk_types: ChunkTypeFilter::All, ..DecodeOptions::default() }
}

#[test]
fn single_red_pixel_encodes_as_tiny_indexed() {
  let image = bytes_image(1, 1, vec![255, 0, 0, 255]);
  let encoded = encode_png(&image, &EncodeOptions::default()).unwrap();
  assert!(encoded.warnings.is_empty());
  let decoded = decode_png(&encoded.data).unwrap();
  assert_eq!(decoded.details.color_type, ColorType::Indexed);
  assert_eq!(decoded.details.bit_depth, 1);
  assert_eq!(decoded.palette.as_ref().map(|p| p.size()), Some(1));
  assert_eq!(decoded.image.data, ImageData::Bytes(vec![255, 0, 0, 255]));
}

#[test]
fn palette_depth_follows_color_count() {
  // 5 distinct colors call for bit depth 4
  let mut data = Vec::new();
  for i in 0..5_u8 {
    data.extend_from_slice(&[i * 40, 0, 0, 255]);
  }
  let image = bytes_image(5, 1, data);
  let encoded = encode_png(&image, &EncodeOptions::default()).unwrap();
  let decoded = decode_png(&encoded.data).unwrap();
  assert_eq!(decoded.details.color_type, ColorType::Indexed);
  assert_eq!(decoded.details.bit_depth, 4);
  assert_eq!(decoded.palette.as_ref().map(|p| p.size()), Some(5));
}

#[test]
fn many_colors_pick_truecolor() {
  // 17 * 17 = 289 distinct RGB values
  let mut data = Vec::new();
  for i in 0..289_u32 {
    data.extend_from_slice(&[(i % 17) as u8 * 15, (i / 17) as u8 * 15, 9, 255]);
  }
  let image = bytes_image(17, 17, data);
  let encoded = encode_png(&image, &EncodeOptions::default()).unwrap();
  let decoded = decode_png(&encoded.data).unwrap();
  assert_eq!(decoded.details.color_type, ColorType::Truecolor);
  assert_eq!(decoded.details.bit_depth, 8);
  assert!(decoded.palette.is_none());
}

#[test]
fn forced_truecolor_with_one_transparent_color_emits_trns() {
  let mut data = Vec::new();
  for i in 0..25_u32 {
    if i == 7 || i == 13 {
      data.extend_from_slice(&[9, 8, 7, 0]);
    } else {
      data.extend_from_slice(&[(i % 5) as u8, 50, 60, 255]);
    }
  }
  let image = bytes_image(5, 5, data.clone());
  let options =
    EncodeOptions { color_type: Some(ColorType::Truecolor), ..EncodeOptions::default() };
  let encoded = encode_png(&image, &options).unwrap();
  assert!(encoded.warnings.is_empty());
  let decoded = decode_png(&encoded.data).unwrap();
  assert_eq!(decoded.details.color_type, ColorType::Truecolor);
  assert!(decoded.raw_chunks.iter().any(|c| c.ty == ChunkType::tRNS));
  assert_eq!(
    decoded.metadata,
    vec![MetadataEntry::Transparency(Transparency::Rgb([9, 8, 7]))]
  );
  assert_eq!(decoded.image.data, ImageData::Bytes(data));
}

#[test]
fn varied_alpha_upgrades_to_an_alpha_channel() {
  // two different transparent colors cannot ride a single tRNS entry
  let mut data = Vec::new();
  for i in 0..25_u32 {
    let alpha = match i {
      3 => 0,
      9 => 127,
      _ => 255,
    };
    data.extend_from_slice(&[i as u8, 0, 0, alpha]);
  }
  let image = bytes_image(5, 5, data.clone());
  let options =
    EncodeOptions { color_type: Some(ColorType::Truecolor), ..EncodeOptions::default() };
  let encoded = encode_png(&image, &options).unwrap();
  assert_eq!(encoded.warnings.len(), 1);
  assert_eq!(
    encoded.warnings[0].message,
    "Upgrading color type 2 to 6 to preserve image contents"
  );
  let decoded = decode_png(&encoded.data).unwrap();
  assert_eq!(decoded.details.color_type, ColorType::TruecolorAlpha);
  assert_eq!(decoded.image.data, ImageData::Bytes(data));
}

#[test]
fn strict_mode_refuses_color_type_upgrades() {
  let image = bytes_image(2, 1, vec![1, 2, 3, 255, 4, 5, 6, 255]);
  let options = EncodeOptions {
    color_type: Some(ColorType::Grayscale),
    strict_mode: true,
    ..EncodeOptions::default()
  };
  let err = encode_png(&image, &options).unwrap_err();
  assert_eq!(err.message, "Cannot encode image as color type 0 without data loss");
  // permissive mode upgrades with a warning instead
  let options = EncodeOptions { color_type: Some(ColorType::Grayscale), ..EncodeOptions::default() };
  let encoded = encode_png(&image, &options).unwrap();
  assert_eq!(
    encoded.warnings[0].message,
    "Upgrading color type 0 to 2 to preserve image contents"
  );
  let decoded = decode_png(&encoded.data).unwrap();
  assert_eq!(decoded.image.data, ImageData::Bytes(vec![1, 2, 3, 255, 4, 5, 6, 255]));
}

#[test]
fn grayscale_images_can_force_grayscale_storage() {
  let image = bytes_image(2, 2, vec![
    0, 0, 0, 255, //
    85, 85, 85, 255, //
    170, 170, 170, 255, //
    255, 255, 255, 255,
  ]);
  let options = EncodeOptions {
    color_type: Some(ColorType::Grayscale),
    bit_depth: Some(2),
    ..EncodeOptions::default()
  };
  let encoded = encode_png(&image, &options).unwrap();
  assert!(encoded.warnings.is_empty());
  let decoded = decode_png(&encoded.data).unwrap();
  assert_eq!(decoded.details.color_type, ColorType::Grayscale);
  assert_eq!(decoded.details.bit_depth, 2);
  assert_eq!(decoded.image.data, image.data);
}

#[test]
fn unrepresentable_sub_byte_grayscale_falls_back_to_eight() {
  let image = bytes_image(1, 1, vec![100, 100, 100, 255]);
  let options = EncodeOptions {
    color_type: Some(ColorType::Grayscale),
    bit_depth: Some(2),
    ..EncodeOptions::default()
  };
  let encoded = encode_png(&image, &options).unwrap();
  assert_eq!(
    encoded.warnings[0].message,
    "Bit depth 2 cannot represent every sample, storing at 8"
  );
  let decoded = decode_png(&encoded.data).unwrap();
  assert_eq!(decoded.details.bit_depth, 8);
  assert_eq!(decoded.image.data, image.data);
}

#[test]
fn invalid_options_are_rejected() {
  let image = bytes_image(1, 1, vec![1, 2, 3, 255]);
  let err = encode_png(
    &image,
    &EncodeOptions { bit_depth: Some(3), ..EncodeOptions::default() },
  )
  .unwrap_err();
  assert_eq!(err.message, "Invalid bit depth \"3\"");
  let err = encode_png(
    &image,
    &EncodeOptions {
      bit_depth: Some(2),
      color_type: Some(ColorType::Truecolor),
      ..EncodeOptions::default()
    },
  )
  .unwrap_err();
  assert_eq!(err.message, "Invalid bit depth \"2\" for color type \"2\"");

  let bad_len = bytes_image(2, 2, vec![0; 12]);
  let err = encode_png(&bad_len, &EncodeOptions::default()).unwrap_err();
  assert_eq!(err.message, "Invalid data length: 12 !== 16");

  let empty = ImageRgba { width: 0, height: 1, data: ImageData::Bytes(Vec::new()) };
  let err = encode_png(&empty, &EncodeOptions::default()).unwrap_err();
  assert_eq!(err.message, "Invalid width \"0\"");
}

#[test]
fn ancillary_chunks_are_embedded_and_recoverable() {
  let image = bytes_image(1, 1, vec![10, 20, 30, 255]);
  let options = EncodeOptions {
    ancillary_chunks: vec![
      MetadataEntry::Gamma(0.45455),
      MetadataEntry::StandardRgb(RenderingIntent::Perceptual),
      MetadataEntry::PhysicalDimensions { ppu_x: 2835, ppu_y: 2835, unit: PhysicalUnit::Meter },
      MetadataEntry::Text { keyword: "Title".to_string(), text: "one dark pixel".to_string() },
      MetadataEntry::CompressedText {
        keyword: "Software".to_string(),
        text: "pngine test suite".to_string(),
      },
      MetadataEntry::Time(ModificationTime {
        year: 2024,
        month: 2,
        day: 29,
        hour: 23,
        minute: 59,
        second: 60,
      }),
    ],
    ..EncodeOptions::default()
  };
  let encoded = encode_png(&image, &options).unwrap();
  assert!(encoded.warnings.is_empty());
  let decoded = decode_png_with(&encoded.data, &all_chunks()).unwrap();
  assert!(decoded.warnings.is_empty(), "{:?}", decoded.warnings);
  assert_eq!(decoded.metadata.len(), 6);
  assert!(matches!(decoded.metadata[0], MetadataEntry::Gamma(g) if (g - 0.45455).abs() < 1e-9));
  assert_eq!(decoded.metadata[1], MetadataEntry::StandardRgb(RenderingIntent::Perceptual));
  assert_eq!(
    decoded.metadata[3],
    MetadataEntry::Text { keyword: "Title".to_string(), text: "one dark pixel".to_string() }
  );
  assert_eq!(
    decoded.metadata[4],
    MetadataEntry::CompressedText {
      keyword: "Software".to_string(),
      text: "pngine test suite".to_string()
    }
  );
  assert!(matches!(decoded.metadata[5], MetadataEntry::Time(t) if t.year == 2024 && t.second == 60));
}

#[test]
fn unsupported_ancillary_chunk_warns_or_refuses() {
  let image = bytes_image(1, 1, vec![0, 0, 0, 255]);
  let options = EncodeOptions {
    ancillary_chunks: vec![MetadataEntry::Histogram(vec![1])],
    ..EncodeOptions::default()
  };
  let encoded = encode_png(&image, &options).unwrap();
  assert_eq!(
    encoded.warnings[0].message,
    "Unsupported ancillary chunk type for encoding: hIST"
  );
  let strict = EncodeOptions { strict_mode: true, ..options };
  let err = encode_png(&image, &strict).unwrap_err();
  assert_eq!(err.message, "Unsupported ancillary chunk type for encoding: hIST");
}

#[test]
fn every_emitted_chunk_has_a_valid_crc() {
  let mut data = Vec::new();
  for i in 0..64_u32 {
    data.extend_from_slice(&[i as u8 * 4, 255 - i as u8, 7, if i % 5 == 0 { 200 } else { 255 }]);
  }
  let image = bytes_image(8, 8, data);
  let encoded = encode_png(&image, &EncodeOptions::default()).unwrap();
  let decoded = decode_png(&encoded.data).unwrap();
  for c in &decoded.raw_chunks {
    let start = c.offset + 4;
    let end = c.offset + 8 + c.data_len;
    let computed = util::crc32(&encoded.data[start..end]);
    let declared = u32::from_be_bytes([
      encoded.data[end],
      encoded.data[end + 1],
      encoded.data[end + 2],
      encoded.data[end + 3],
    ]);
    assert_eq!(computed, declared, "chunk {:?}", c.ty);
  }
}
