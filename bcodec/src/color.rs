// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! RGB <-> YCbCr conversion.
//!
//! The forward and inverse constants are independently rounded fixed-point
//! factors; they are not exact algebraic inverses of each other.

/// 8-bit RGB sample, as read from a pixel source.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PixelRgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PixelRgb {
    pub fn new(r: u8, g: u8, b: u8) -> PixelRgb {
        PixelRgb { r, g, b }
    }

    pub fn y(&self) -> f64 {
        let (r, g, b) = self.as_f64();
        16.0 + (65.738 * r + 129.057 * g + 24.064 * b) / 256.0
    }

    pub fn cb(&self) -> f64 {
        let (r, g, b) = self.as_f64();
        128.0 + (-37.945 * r - 74.494 * g + 112.439 * b) / 256.0
    }

    pub fn cr(&self) -> f64 {
        let (r, g, b) = self.as_f64();
        128.0 + (112.439 * r - 94.154 * g - 18.285 * b) / 256.0
    }

    fn as_f64(&self) -> (f64, f64, f64) {
        (self.r as f64, self.g as f64, self.b as f64)
    }
}

/// Reconstructed YCbCr sample. Components start out at mid-gray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelYCbCr {
    pub y: f64,
    pub cb: f64,
    pub cr: f64,
}

impl PixelYCbCr {
    pub const NEUTRAL: f64 = 123.0;

    pub fn new(y: f64, cb: f64, cr: f64) -> PixelYCbCr {
        PixelYCbCr { y, cb, cr }
    }

    pub fn r(&self) -> f64 {
        (298.082 * self.y + 408.583 * self.cr) / 256.0 - 222.921
    }

    pub fn g(&self) -> f64 {
        (298.082 * self.y - 100.291 * self.cb - 208.120 * self.cr) / 256.0 + 135.576
    }

    pub fn b(&self) -> f64 {
        (298.082 * self.y + 516.412 * self.cb) / 256.0 - 276.836
    }

    /// `[r, g, b]` truncated and clamped to bytes.
    pub fn to_rgb8(&self) -> [u8; 3] {
        [to_byte(self.r()), to_byte(self.g()), to_byte(self.b())]
    }
}

impl Default for PixelYCbCr {
    fn default() -> Self {
        PixelYCbCr::new(Self::NEUTRAL, Self::NEUTRAL, Self::NEUTRAL)
    }
}

/// Truncates toward zero, then clamps to `[0, 255]`.
pub fn to_byte(value: f64) -> u8 {
    (value as i32).clamp(u8::MIN as i32, u8::MAX as i32) as u8
}

/// One of the three color planes coded per block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Y,
    Cb,
    Cr,
}

impl Channel {
    /// Coding order of the planes inside a block.
    pub const ALL: [Channel; 3] = [Channel::Y, Channel::Cb, Channel::Cr];

    const LEVEL_SHIFT: f64 = 128.0;

    /// Plane value of `pixel`, centered around zero.
    #[inline]
    pub fn select(self, pixel: &PixelRgb) -> f64 {
        let value = match self {
            Channel::Y => pixel.y(),
            Channel::Cb => pixel.cb(),
            Channel::Cr => pixel.cr(),
        };
        value - Self::LEVEL_SHIFT
    }

    /// Stores a zero-centered plane value back into `pixel`.
    #[inline]
    pub fn assign(self, pixel: &mut PixelYCbCr, value: f64) {
        let value = value + Self::LEVEL_SHIFT;
        match self {
            Channel::Y => pixel.y = value,
            Channel::Cb => pixel.cb = value,
            Channel::Cr => pixel.cr = value,
        }
    }
}
