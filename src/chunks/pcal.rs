use crate::{
  assert,
  chunk::{ChunkRecord, ChunkType},
  chunks::{check_keyword, latin1_to_string},
  decode::DecodeContext,
  error::{DecodeError, DecodeErrorKind},
  metadata::{MetadataEntry, PixelCalibration},
};

/// Parameter counts per equation type: linear, exponential, exponential
/// arbitrary base, hyperbolic.
const PARAMS_BY_EQUATION: [usize; 4] = [2, 3, 3, 4];

/// `pCAL`: Calibration of pixel values
///
/// `name` `NUL` `x0` `x1` `equation type` `parameter count` `unit` `NUL`
/// then the parameters as NUL-separated ASCII floats.
pub(crate) fn decode(ctx: &mut DecodeContext<'_>, chunk: &ChunkRecord) -> Result<(), DecodeError> {
  assert::singular(ctx, chunk)?;
  assert::precedes(ctx, chunk, ChunkType::IDAT)?;
  let data = chunk.data(ctx.bytes);
  let mut it = data.splitn(2, |&b| b == 0);
  let name = it.next().unwrap_or_default();
  check_keyword(ctx, chunk, name)?;
  let rest = it.next().unwrap_or_default();
  if rest.len() < 11 {
    return Err(ctx.err(
      DecodeErrorKind::ChunkDataLengthShort,
      chunk.offset,
      format!("pCAL: Invalid data length: {} < {}", data.len(), name.len() + 12),
    ));
  }
  let x0 = i32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]);
  let x1 = i32::from_be_bytes([rest[4], rest[5], rest[6], rest[7]]);
  let equation_type = rest[8];
  let declared_params = rest[9] as usize;
  let expected = match PARAMS_BY_EQUATION.get(equation_type as usize) {
    Some(n) => *n,
    None => {
      return Err(ctx.err(
        DecodeErrorKind::InvalidChunkData,
        chunk.offset,
        format!("pCAL: Invalid equation type \"{equation_type}\""),
      ))
    }
  };
  if declared_params != expected {
    return Err(ctx.err(
      DecodeErrorKind::InvalidChunkData,
      chunk.offset,
      format!("pCAL: Invalid parameter count: {declared_params} !== {expected}"),
    ));
  }
  let mut tail = rest[10..].splitn(2, |&b| b == 0);
  let unit = tail.next().unwrap_or_default();
  let params_blob = tail.next().unwrap_or_default();
  let mut params = Vec::with_capacity(declared_params);
  for raw in params_blob.split(|&b| b == 0) {
    let text = core::str::from_utf8(raw).unwrap_or("");
    match text.parse::<f64>() {
      Ok(v) => params.push(v),
      Err(_) => {
        return Err(ctx.err(
          DecodeErrorKind::InvalidChunkData,
          chunk.offset,
          format!("pCAL: Invalid parameter \"{}\"", latin1_to_string(raw)),
        ))
      }
    }
  }
  if params.len() != declared_params {
    let n = params.len();
    return Err(ctx.err(
      DecodeErrorKind::InvalidChunkData,
      chunk.offset,
      format!("pCAL: Invalid parameter count: {n} !== {declared_params}"),
    ));
  }
  ctx.metadata.push(MetadataEntry::Calibration(PixelCalibration {
    name: latin1_to_string(name),
    x0,
    x1,
    equation_type,
    unit: latin1_to_string(unit),
    params,
  }));
  Ok(())
}
