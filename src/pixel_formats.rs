//! Module for pixel formats.

use bytemuck::{Pod, Zeroable};

/// RGB 8-bit per channel, the shape of one PLTE entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct RGB888 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}

/// RGBA 8-bit per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct RGBA8888 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}
