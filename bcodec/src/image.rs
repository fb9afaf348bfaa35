// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;

use crate::{
    BLOCK_DIM, BLOCK_SIZE,
    color::{PixelRgb, PixelYCbCr},
    error::{Error, Result},
    util::try_filled_vec,
};

/// Something blocks of RGB pixels can be read from.
///
/// Reads may happen from several worker threads; callers serialize them.
pub trait PixelSource {
    /// `(width, height)` in pixels.
    fn size(&self) -> (usize, usize);

    /// Fills `block` with the 8x8 pixels whose top-left corner is `(x, y)`,
    /// in row-major order. The whole block lies inside the image.
    fn read_block(&self, x: usize, y: usize, block: &mut [PixelRgb; BLOCK_SIZE]);
}

/// Something reconstructed blocks of YCbCr pixels can be written to.
pub trait PixelSink {
    /// `(width, height)` in pixels.
    fn size(&self) -> (usize, usize);

    /// Stores the 8x8 pixels whose top-left corner is `(x, y)`, given in
    /// row-major order. The whole block lies inside the image.
    fn write_block(&mut self, x: usize, y: usize, block: &[PixelYCbCr; BLOCK_SIZE]);
}

/// Interleaved 8-bit RGB image.
#[derive(Clone, PartialEq, Eq)]
pub struct RgbImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Debug for RgbImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RgbImage {}x{}", self.width, self.height)
    }
}

impl RgbImage {
    const CHANNELS: usize = 3;

    /// A black image of the given size.
    pub fn new(width: usize, height: usize) -> Result<RgbImage> {
        let len = Self::buffer_len(width, height)?;
        Ok(RgbImage {
            width,
            height,
            data: try_filled_vec(0, len)?,
        })
    }

    /// Wraps interleaved `r, g, b` bytes in row-major order.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<RgbImage> {
        if Self::buffer_len(width, height)? != data.len() {
            return Err(Error::InvalidImageBuffer(data.len(), width, height));
        }
        Ok(RgbImage {
            width,
            height,
            data,
        })
    }

    fn buffer_len(width: usize, height: usize) -> Result<usize> {
        width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(Self::CHANNELS))
            .ok_or(Error::ArithmeticOverflow)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        (y * self.width + x) * Self::CHANNELS
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let o = self.offset(x, y);
        [self.data[o], self.data[o + 1], self.data[o + 2]]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let o = self.offset(x, y);
        self.data[o..o + Self::CHANNELS].copy_from_slice(&rgb);
    }
}

impl PixelSource for RgbImage {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn read_block(&self, x: usize, y: usize, block: &mut [PixelRgb; BLOCK_SIZE]) {
        for (dy, row) in block.chunks_exact_mut(BLOCK_DIM).enumerate() {
            for (dx, pixel) in row.iter_mut().enumerate() {
                let [r, g, b] = self.pixel(x + dx, y + dy);
                *pixel = PixelRgb::new(r, g, b);
            }
        }
    }
}

impl PixelSink for RgbImage {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn write_block(&mut self, x: usize, y: usize, block: &[PixelYCbCr; BLOCK_SIZE]) {
        for (dy, row) in block.chunks_exact(BLOCK_DIM).enumerate() {
            for (dx, pixel) in row.iter().enumerate() {
                self.set_pixel(x + dx, y + dy, pixel.to_rgb8());
            }
        }
    }
}
