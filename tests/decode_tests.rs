mod util;

use pngine::{
  decode_png, decode_png_with, ChunkType, ChunkTypeFilter, ColorType, DecodeErrorKind,
  DecodeOptions, ImageData, InterlaceMethod, MetadataEntry, RenderingIntent, Transparency,
};
use util::{chunk, ihdr, png, zlib};

fn strict() -> DecodeOptions {
  DecodeOptions { strict_mode: true, ..DecodeOptions::default() }
}

fn parse_only(types: &[ChunkType]) -> DecodeOptions {
  DecodeOptions {
    parse_chunk_types: ChunkTypeFilter::Only(types.to_vec()),
    ..DecodeOptions::default()
  }
}

/// signature + IHDR(1,1,8,2) + IDAT + IEND: one red truecolor pixel.
fn minimal_truecolor() -> Vec<u8> {
  png(&[
    chunk(b"IHDR", &ihdr(1, 1, 8, 2, 0)),
    chunk(b"IDAT", &zlib(&[0x00, 0xFF, 0x00, 0x00])),
    chunk(b"IEND", &[]),
  ])
}

const PALETTE: [u8; 9] = [0, 255, 255, 119, 0, 255, 255, 0, 0];

/// 5x5 indexed at bit depth 2, three palette entries.
fn indexed_5x5(extra_before_plte: &[Vec<u8>], extra_after_plte: &[Vec<u8>]) -> Vec<u8> {
  let mut chunks = vec![chunk(b"IHDR", &ihdr(5, 5, 2, 3, 0))];
  chunks.extend_from_slice(extra_before_plte);
  chunks.push(chunk(b"PLTE", &PALETTE));
  chunks.extend_from_slice(extra_after_plte);
  let mut raw = Vec::new();
  for y in 0..5_u8 {
    let indices: Vec<u8> = (0..5_u8).map(|x| (x + y) % 3).collect();
    raw.push(0); // filter: None
    raw.extend_from_slice(&util::pack2(&indices));
  }
  chunks.push(chunk(b"IDAT", &zlib(&raw)));
  chunks.push(chunk(b"IEND", &[]));
  png(&chunks)
}

#[test]
fn minimal_valid_truecolor_pixel() {
  let decoded = decode_png(&minimal_truecolor()).unwrap();
  assert_eq!(decoded.image.width, 1);
  assert_eq!(decoded.image.height, 1);
  assert_eq!(decoded.image.data, ImageData::Bytes(vec![0xFF, 0x00, 0x00, 0xFF]));
  assert_eq!(decoded.details.bit_depth, 8);
  assert_eq!(decoded.details.color_type, ColorType::Truecolor);
  assert_eq!(decoded.details.interlace_method, InterlaceMethod::None);
  assert!(decoded.warnings.is_empty());
  assert!(decoded.info.is_empty());
  assert!(decoded.palette.is_none());
  let types: Vec<ChunkType> = decoded.raw_chunks.iter().map(|c| c.ty).collect();
  assert_eq!(types, [ChunkType::IHDR, ChunkType::IDAT, ChunkType::IEND]);
}

#[test]
fn raw_chunks_partition_the_datastream() {
  let bytes = minimal_truecolor();
  let decoded = decode_png(&bytes).unwrap();
  let mut at = 8;
  for c in &decoded.raw_chunks {
    assert_eq!(c.offset, at, "chunks must be adjacent");
    at += 12 + c.data_len;
  }
  assert_eq!(at, bytes.len(), "chunks must cover the whole stream");
}

#[test]
fn indexed_palette_lookup() {
  let decoded = decode_png(&indexed_5x5(&[], &[])).unwrap();
  let palette = decoded.palette.expect("indexed image must surface its palette");
  assert_eq!(palette.size(), 3);
  assert_eq!(palette.get_rgb(0), Some([0, 255, 255]));
  assert_eq!(palette.get_rgb(1), Some([119, 0, 255]));
  assert_eq!(palette.get_rgb(2), Some([255, 0, 0]));
  assert_eq!(palette.get_rgb(3), None);
  let data = match &decoded.image.data {
    ImageData::Bytes(b) => b,
    _ => panic!("indexed images decode to bytes"),
  };
  assert_eq!(data.len(), 4 * 5 * 5);
  for y in 0..5_usize {
    for x in 0..5_usize {
      let expected = palette.get_rgb((x + y) % 3).unwrap();
      let px = &data[(y * 5 + x) * 4..(y * 5 + x) * 4 + 4];
      assert_eq!(&px[..3], expected);
      assert_eq!(px[3], 255);
    }
  }
}

#[test]
fn sbit_opt_in_returns_metadata() {
  let stream = indexed_5x5(&[chunk(b"sBIT", &[13, 13, 13])], &[]);
  // not opted in: scanned but not parsed
  let decoded = decode_png(&stream).unwrap();
  assert!(decoded.metadata.is_empty());
  assert!(decoded.raw_chunks.iter().any(|c| c.ty == ChunkType::sBIT));
  // opted in
  let decoded = decode_png_with(&stream, &parse_only(&[ChunkType::sBIT])).unwrap();
  assert_eq!(decoded.metadata, vec![MetadataEntry::SignificantBits(vec![13, 13, 13])]);
}

#[test]
fn too_short_signature() {
  let err = decode_png(&[1, 2, 3]).unwrap_err();
  assert_eq!(err.kind, DecodeErrorKind::NotEnoughBytesForSignature);
  assert_eq!(err.message, "Not enough bytes in file for png signature (3)");
  assert_eq!(err.offset, 0);
  assert!(err.partial.details.is_none());
}

#[test]
fn signature_mismatch() {
  let mut bytes = minimal_truecolor();
  bytes[0] = 0x88;
  let err = decode_png(&bytes).unwrap_err();
  assert_eq!(err.kind, DecodeErrorKind::SignatureMismatch);
  assert_eq!(
    err.message,
    "Png signature mismatch (0x88504e470d0a1a0a !== 0x89504e470d0a1a0a)"
  );
}

#[test]
fn crc_mismatch_warns_then_raises_in_strict_mode() {
  // a corrupted tEXt chunk: not parsed by default, so only the CRC complains
  let text = chunk(b"tEXt", b"Comment\0hello there");
  let mut stream = png(&[
    chunk(b"IHDR", &ihdr(1, 1, 8, 2, 0)),
    text,
    chunk(b"IDAT", &zlib(&[0x00, 0xFF, 0x00, 0x00])),
    chunk(b"IEND", &[]),
  ]);
  // flip one byte inside the tEXt data area (offset 8 + 25 chunk bytes of
  // IHDR, + 8 header bytes of tEXt, + 3 into the keyword)
  let flip_at = 8 + 25 + 8 + 3;
  stream[flip_at] ^= 0xFF;
  let decoded = decode_png(&stream).unwrap();
  assert_eq!(decoded.warnings.len(), 1);
  let message = &decoded.warnings[0].message;
  assert!(message.starts_with("CRC for chunk \"tEXt\" at offset 0x21 doesn't match (0x"));
  assert!(message.contains(" !== 0x"));
  assert_eq!(decoded.warnings[0].offset, 8 + 25);

  let err = decode_png_with(&stream, &strict()).unwrap_err();
  assert_eq!(err.kind, DecodeErrorKind::ChunkCrcMismatch);
  assert_eq!(&err.message, message);
}

#[test]
fn srgb_after_plte_is_an_ordering_warning() {
  let srgb = chunk(b"sRGB", &[0]);
  let stream = indexed_5x5(&[], &[srgb]);
  let options = parse_only(&[ChunkType::sRGB]);
  let decoded = decode_png_with(&stream, &options).unwrap();
  assert_eq!(decoded.warnings.len(), 1);
  assert_eq!(decoded.warnings[0].message, "sRGB: Must precede PLTE");
  assert_eq!(
    decoded.metadata,
    vec![MetadataEntry::StandardRgb(RenderingIntent::Perceptual)]
  );

  let strict_options = DecodeOptions { strict_mode: true, ..options };
  let err = decode_png_with(&stream, &strict_options).unwrap_err();
  assert_eq!(err.message, "sRGB: Must precede PLTE");
}

#[test]
fn invalid_rendering_intent_is_fatal() {
  let stream = indexed_5x5(&[chunk(b"sRGB", &[4])], &[]);
  let err = decode_png_with(&stream, &parse_only(&[ChunkType::sRGB])).unwrap_err();
  assert_eq!(err.kind, DecodeErrorKind::InvalidChunkData);
  assert_eq!(err.message, "sRGB: Invalid rendering intent \"4\"");
  // the header had already been parsed when the failure happened
  assert!(err.partial.details.is_some());
  assert_eq!(err.partial.raw_chunks.len(), 5);
}

#[test]
fn trns_application_on_truecolor() {
  let stream = png(&[
    chunk(b"IHDR", &ihdr(2, 1, 8, 2, 0)),
    chunk(b"tRNS", &[0, 255, 0, 0, 0, 0]),
    chunk(b"IDAT", &zlib(&[0x00, 255, 0, 0, 1, 2, 3])),
    chunk(b"IEND", &[]),
  ]);
  let decoded = decode_png(&stream).unwrap();
  assert_eq!(
    decoded.image.data,
    ImageData::Bytes(vec![255, 0, 0, 0, 1, 2, 3, 255])
  );
  assert_eq!(
    decoded.metadata,
    vec![MetadataEntry::Transparency(Transparency::Rgb([255, 0, 0]))]
  );
}

#[test]
fn trns_application_on_grayscale() {
  let stream = png(&[
    chunk(b"IHDR", &ihdr(3, 1, 8, 0, 0)),
    chunk(b"tRNS", &[0, 7]),
    chunk(b"IDAT", &zlib(&[0x00, 7, 8, 7])),
    chunk(b"IEND", &[]),
  ]);
  let decoded = decode_png(&stream).unwrap();
  assert_eq!(
    decoded.image.data,
    ImageData::Bytes(vec![7, 7, 7, 0, 8, 8, 8, 255, 7, 7, 7, 0])
  );
}

#[test]
fn indexed_trns_palette_alphas() {
  let trns = chunk(b"tRNS", &[128, 255, 0]);
  let decoded = decode_png(&indexed_5x5(&[], &[trns])).unwrap();
  let data = match &decoded.image.data {
    ImageData::Bytes(b) => b,
    _ => panic!(),
  };
  for (i, px) in data.chunks_exact(4).enumerate() {
    let index = (i % 5 + i / 5) % 3;
    let expected_alpha = [128_u8, 255, 0][index];
    assert_eq!(px[3], expected_alpha, "pixel {i}");
  }
}

#[test]
fn sixteen_bit_grayscale_and_force32() {
  let raw = [
    0x00, 0x12, 0x34, // row 0
    0x00, 0xAB, 0xCD, // row 1
  ];
  let stream = png(&[
    chunk(b"IHDR", &ihdr(1, 2, 16, 0, 0)),
    chunk(b"IDAT", &zlib(&raw)),
    chunk(b"IEND", &[]),
  ]);
  let decoded = decode_png(&stream).unwrap();
  assert_eq!(
    decoded.image.data,
    ImageData::Words(vec![
      0x1234, 0x1234, 0x1234, 0xFFFF, //
      0xABCD, 0xABCD, 0xABCD, 0xFFFF,
    ])
  );
  let force = DecodeOptions { force32: true, ..DecodeOptions::default() };
  let decoded = decode_png_with(&stream, &force).unwrap();
  assert_eq!(
    decoded.image.data,
    ImageData::Bytes(vec![0x12, 0x12, 0x12, 0xFF, 0xAB, 0xAB, 0xAB, 0xFF])
  );
}

#[test]
fn sub_byte_grayscale_scales_samples() {
  // 4 pixels at depth 2: samples 0..=3 scale to 0, 85, 170, 255
  let stream = png(&[
    chunk(b"IHDR", &ihdr(4, 1, 2, 0, 0)),
    chunk(b"IDAT", &zlib(&[0x00, 0b00_01_10_11])),
    chunk(b"IEND", &[]),
  ]);
  let decoded = decode_png(&stream).unwrap();
  assert_eq!(
    decoded.image.data,
    ImageData::Bytes(vec![
      0, 0, 0, 255, //
      85, 85, 85, 255, //
      170, 170, 170, 255, //
      255, 255, 255, 255,
    ])
  );
}

#[test]
fn multiple_idat_chunks_form_one_stream() {
  let compressed = zlib(&[0x00, 0xFF, 0x00, 0x00]);
  let (first, second) = compressed.split_at(3);
  let stream = png(&[
    chunk(b"IHDR", &ihdr(1, 1, 8, 2, 0)),
    chunk(b"IDAT", first),
    chunk(b"IDAT", second),
    chunk(b"IEND", &[]),
  ]);
  let decoded = decode_png(&stream).unwrap();
  assert_eq!(decoded.image.data, ImageData::Bytes(vec![0xFF, 0x00, 0x00, 0xFF]));
}

#[test]
fn non_consecutive_idat_is_fatal() {
  let compressed = zlib(&[0x00, 0xFF, 0x00, 0x00]);
  let (first, second) = compressed.split_at(3);
  let stream = png(&[
    chunk(b"IHDR", &ihdr(1, 1, 8, 2, 0)),
    chunk(b"IDAT", first),
    chunk(b"tEXt", b"Comment\0interrupting"),
    chunk(b"IDAT", second),
    chunk(b"IEND", &[]),
  ]);
  let err = decode_png(&stream).unwrap_err();
  assert_eq!(err.message, "IDAT: Chunks must be consecutive");
}

#[test]
fn missing_idat_is_fatal() {
  let stream = png(&[chunk(b"IHDR", &ihdr(1, 1, 8, 2, 0)), chunk(b"IEND", &[])]);
  let err = decode_png(&stream).unwrap_err();
  assert_eq!(err.kind, DecodeErrorKind::NoIdat);
  assert_eq!(err.message, "No IDAT chunks found");
}

#[test]
fn first_chunk_must_be_ihdr() {
  let stream = png(&[
    chunk(b"gAMA", &45455_u32.to_be_bytes().to_vec()),
    chunk(b"IHDR", &ihdr(1, 1, 8, 2, 0)),
    chunk(b"IDAT", &zlib(&[0x00, 0xFF, 0x00, 0x00])),
    chunk(b"IEND", &[]),
  ]);
  let err = decode_png(&stream).unwrap_err();
  assert_eq!(err.kind, DecodeErrorKind::FirstChunkNotIhdr);
  assert_eq!(err.message, "First chunk is not IHDR");
}

#[test]
fn truncated_stream_reports_eof() {
  let bytes = minimal_truecolor();
  let err = decode_png(&bytes[..bytes.len() - 1]).unwrap_err();
  assert_eq!(err.kind, DecodeErrorKind::EofWhileReading);
  assert_eq!(err.message, "EOF while reading chunk CRC");
  // the chunks before the truncation point were still collected
  assert_eq!(err.partial.raw_chunks.len(), 2);
}

#[test]
fn unrecognized_ancillary_chunk_is_informational() {
  let stream = png(&[
    chunk(b"IHDR", &ihdr(1, 1, 8, 2, 0)),
    chunk(b"fOOb", &[1, 2, 3]),
    chunk(b"IDAT", &zlib(&[0x00, 0xFF, 0x00, 0x00])),
    chunk(b"IEND", &[]),
  ]);
  let decoded = decode_png(&stream).unwrap();
  assert_eq!(decoded.info, vec!["Unrecognized chunk type \"fOOb\"".to_string()]);
  assert!(decoded.warnings.is_empty());
}

#[test]
fn unrecognized_critical_chunk_is_fatal() {
  let stream = png(&[
    chunk(b"IHDR", &ihdr(1, 1, 8, 2, 0)),
    chunk(b"FOOb", &[1, 2, 3]),
    chunk(b"IDAT", &zlib(&[0x00, 0xFF, 0x00, 0x00])),
    chunk(b"IEND", &[]),
  ]);
  let err = decode_png(&stream).unwrap_err();
  assert_eq!(err.kind, DecodeErrorKind::UnrecognizedCriticalChunkType);
  assert_eq!(err.message, "Unrecognized critical chunk type \"FOOb\"");
  assert!(err.partial.details.is_some());
}

#[test]
fn missing_palette_for_indexed_is_fatal() {
  let mut raw = Vec::new();
  for _ in 0..5 {
    raw.extend_from_slice(&[0, 0, 0]);
  }
  let stream = png(&[
    chunk(b"IHDR", &ihdr(5, 5, 2, 3, 0)),
    chunk(b"IDAT", &zlib(&raw)),
    chunk(b"IEND", &[]),
  ]);
  let err = decode_png(&stream).unwrap_err();
  assert_eq!(err.kind, DecodeErrorKind::MissingPalette);
  assert_eq!(err.message, "IDAT: Cannot decode indexed color type without a palette");
}

#[test]
fn out_of_range_palette_index_is_fatal() {
  // depth 8 indexed, palette of 2, one pixel referencing entry 9
  let stream = png(&[
    chunk(b"IHDR", &ihdr(1, 1, 8, 3, 0)),
    chunk(b"PLTE", &[1, 2, 3, 4, 5, 6]),
    chunk(b"IDAT", &zlib(&[0x00, 9])),
    chunk(b"IEND", &[]),
  ]);
  let err = decode_png(&stream).unwrap_err();
  assert_eq!(err.kind, DecodeErrorKind::OutOfRangePaletteIndex);
  assert_eq!(err.message, "IDAT: Palette index out of range (9 >= 2)");
}

#[test]
fn invalid_filter_type_is_fatal() {
  let stream = png(&[
    chunk(b"IHDR", &ihdr(1, 1, 8, 2, 0)),
    chunk(b"IDAT", &zlib(&[0x07, 0xFF, 0x00, 0x00])),
    chunk(b"IEND", &[]),
  ]);
  let err = decode_png(&stream).unwrap_err();
  assert_eq!(err.kind, DecodeErrorKind::InvalidFilterType);
  assert_eq!(err.message, "IDAT: Invalid filter type \"7\"");
}

#[test]
fn garbage_idat_reports_inflate_error() {
  let stream = png(&[
    chunk(b"IHDR", &ihdr(1, 1, 8, 2, 0)),
    chunk(b"IDAT", &[0x01, 0x02, 0x03, 0x04]),
    chunk(b"IEND", &[]),
  ]);
  let err = decode_png(&stream).unwrap_err();
  assert_eq!(err.kind, DecodeErrorKind::InflateError);
  assert!(err.message.starts_with("IDAT: Inflate error: "), "{}", err.message);
}

#[test]
fn invalid_ihdr_combination_is_fatal() {
  let stream = png(&[
    chunk(b"IHDR", &ihdr(1, 1, 16, 3, 0)),
    chunk(b"IDAT", &zlib(&[0x00, 0x00])),
    chunk(b"IEND", &[]),
  ]);
  let err = decode_png(&stream).unwrap_err();
  assert_eq!(err.kind, DecodeErrorKind::InvalidIhdrValue);
  assert_eq!(err.message, "IHDR: Invalid bit depth \"16\" for color type \"3\"");
}

#[test]
fn trailing_chunk_after_iend_warns() {
  let stream = png(&[
    chunk(b"IHDR", &ihdr(1, 1, 8, 2, 0)),
    chunk(b"IDAT", &zlib(&[0x00, 0xFF, 0x00, 0x00])),
    chunk(b"IEND", &[]),
    chunk(b"tEXt", b"Comment\0straggler"),
  ]);
  let decoded = decode_png(&stream).unwrap();
  assert_eq!(decoded.warnings.len(), 1);
  assert_eq!(decoded.warnings[0].message, "Last chunk is not IEND");
}

#[test]
fn duplicate_singular_chunk_warns() {
  let stream = indexed_5x5(
    &[chunk(b"gAMA", &45455_u32.to_be_bytes().to_vec()), chunk(b"gAMA", &45455_u32.to_be_bytes().to_vec())],
    &[],
  );
  let decoded = decode_png_with(&stream, &parse_only(&[ChunkType::gAMA])).unwrap();
  assert_eq!(decoded.warnings.len(), 1);
  assert_eq!(decoded.warnings[0].message, "gAMA: Multiple gAMA chunks not allowed");
  assert_eq!(decoded.metadata.len(), 2);
}

#[test]
fn hist_must_follow_plte() {
  let hist = chunk(b"hIST", &[0, 1, 0, 2, 0, 3]);
  let stream = indexed_5x5(&[hist], &[]);
  let err = decode_png_with(&stream, &parse_only(&[ChunkType::hIST])).unwrap_err();
  assert_eq!(err.kind, DecodeErrorKind::OrderingFollowsViolation);
  assert_eq!(err.message, "hIST: Must follow PLTE");
}

#[test]
fn hist_parses_after_plte() {
  let hist = chunk(b"hIST", &[0, 1, 0, 2, 0, 3]);
  let stream = indexed_5x5(&[], &[hist]);
  let decoded = decode_png_with(&stream, &parse_only(&[ChunkType::hIST])).unwrap();
  assert_eq!(decoded.metadata, vec![MetadataEntry::Histogram(vec![1, 2, 3])]);
}

#[test]
fn text_chunks_decode_with_all_filter() {
  let ztxt_payload = {
    let mut p = b"Software\0\0".to_vec();
    p.extend_from_slice(&zlib(b"pngine test suite"));
    p
  };
  let stream = png(&[
    chunk(b"IHDR", &ihdr(1, 1, 8, 2, 0)),
    chunk(b"tEXt", b"Title\0A single red pixel"),
    chunk(b"zTXt", &ztxt_payload),
    chunk(b"IDAT", &zlib(&[0x00, 0xFF, 0x00, 0x00])),
    chunk(b"IEND", &[]),
  ]);
  let options = DecodeOptions { parse_chunk_types: ChunkTypeFilter::All, ..DecodeOptions::default() };
  let decoded = decode_png_with(&stream, &options).unwrap();
  assert_eq!(
    decoded.metadata,
    vec![
      MetadataEntry::Text {
        keyword: "Title".to_string(),
        text: "A single red pixel".to_string()
      },
      MetadataEntry::CompressedText {
        keyword: "Software".to_string(),
        text: "pngine test suite".to_string()
      },
    ]
  );
}

#[test]
fn phys_and_time_round_out_the_metadata_list() {
  let mut phys = Vec::new();
  phys.extend_from_slice(&2835_u32.to_be_bytes());
  phys.extend_from_slice(&2835_u32.to_be_bytes());
  phys.push(1);
  let time = [0x07, 0xD0, 6, 15, 12, 30, 59];
  let stream = png(&[
    chunk(b"IHDR", &ihdr(1, 1, 8, 2, 0)),
    chunk(b"pHYs", &phys),
    chunk(b"IDAT", &zlib(&[0x00, 0xFF, 0x00, 0x00])),
    chunk(b"tIME", &time),
    chunk(b"IEND", &[]),
  ]);
  let options = DecodeOptions { parse_chunk_types: ChunkTypeFilter::All, ..DecodeOptions::default() };
  let decoded = decode_png_with(&stream, &options).unwrap();
  assert_eq!(decoded.metadata.len(), 2);
  assert!(matches!(
    decoded.metadata[0],
    MetadataEntry::PhysicalDimensions { ppu_x: 2835, ppu_y: 2835, unit: pngine::PhysicalUnit::Meter }
  ));
  assert!(matches!(
    decoded.metadata[1],
    MetadataEntry::Time(t) if t.year == 2000 && t.month == 6 && t.second == 59
  ));
}
