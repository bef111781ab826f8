//! Pixel — a single picture element: coordinates plus a clamped RGB triple.

use std::fmt;

/// Immutable value type. Channel math elsewhere happens in `f64`; values are
/// truncated toward zero and clamped to `[0, 255]` here, never earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pixel {
    x: u32,
    y: u32,
    r: u8,
    g: u8,
    b: u8,
}

impl Pixel {
    /// Build a pixel from raw (possibly fractional) channel values.
    pub fn new(x: u32, y: u32, r: f64, g: f64, b: f64) -> Self {
        Self {
            x,
            y,
            r: clamp_channel(r),
            g: clamp_channel(g),
            b: clamp_channel(b),
        }
    }

    /// Build a pixel from already-quantized channels (decoded image data).
    pub fn from_rgb(x: u32, y: u32, r: u8, g: u8, b: u8) -> Self {
        Self { x, y, r, g, b }
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    pub fn coords(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    pub fn color(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Red channel scaled by `modifier`, unclamped.
    pub fn apply_to_r(&self, modifier: f64) -> f64 {
        self.r as f64 * modifier
    }

    /// Green channel scaled by `modifier`, unclamped.
    pub fn apply_to_g(&self, modifier: f64) -> f64 {
        self.g as f64 * modifier
    }

    /// Blue channel scaled by `modifier`, unclamped.
    pub fn apply_to_b(&self, modifier: f64) -> f64 {
        self.b as f64 * modifier
    }

    /// The same scalar applied to all three channels independently.
    pub fn apply_to_all_channels(&self, modifier: f64) -> (f64, f64, f64) {
        (
            self.apply_to_r(modifier),
            self.apply_to_g(modifier),
            self.apply_to_b(modifier),
        )
    }
}

/// Truncate toward zero, then clamp. A kernel sum of 56.25 stores as 56.
fn clamp_channel(value: f64) -> u8 {
    (value as i64).clamp(0, 255) as u8
}

impl fmt::Display for Pixel {
    /// `"r g b  "` — the two trailing spaces are part of the state format and
    /// must round-trip exactly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}  ", self.r, self.g, self.b)
    }
}
