// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::sync::{Mutex, PoisonError};

use bcodec_transforms::BlockTransform;

use crate::{
    BLOCK_SIZE,
    color::{Channel, PixelRgb, PixelYCbCr},
    coeff_order::{zigzag_scan, zigzag_unscan},
    image::{PixelSink, PixelSource},
    quant_matrix::QuantMatrix,
    quantizer::{dequantize, quantize},
};

/// Per-worker state for compressing blocks.
///
/// Holds every buffer one block needs, plus the transform instance, so a
/// worker allocates nothing after creation.
pub struct BlockCompressor<T> {
    transform: T,
    pixels: [PixelRgb; BLOCK_SIZE],
    plane: [f64; BLOCK_SIZE],
    transformed: [f64; BLOCK_SIZE],
    quantized: [u8; BLOCK_SIZE],
    scanned: [u8; BLOCK_SIZE],
}

impl<T: BlockTransform + Default> BlockCompressor<T> {
    pub fn new() -> Self {
        Self {
            transform: T::default(),
            pixels: [PixelRgb::default(); BLOCK_SIZE],
            plane: [0.0; BLOCK_SIZE],
            transformed: [0.0; BLOCK_SIZE],
            quantized: [0; BLOCK_SIZE],
            scanned: [0; BLOCK_SIZE],
        }
    }
}

impl<T: BlockTransform + Default> Default for BlockCompressor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: BlockTransform> BlockCompressor<T> {
    /// Reads the block at `(x, y)` and writes its Y, Cb and Cr coefficients
    /// to consecutive 64-byte runs of `out`.
    pub fn compress_block<S: PixelSource>(
        &mut self,
        source: &Mutex<&mut S>,
        (x, y): (usize, usize),
        matrix: &QuantMatrix,
        out: &mut [u8],
    ) {
        source
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .read_block(x, y, &mut self.pixels);

        for (channel, out) in Channel::ALL.into_iter().zip(out.chunks_exact_mut(BLOCK_SIZE)) {
            for (value, pixel) in self.plane.iter_mut().zip(self.pixels.iter()) {
                *value = channel.select(pixel);
            }
            self.transform.forward(&self.plane, &mut self.transformed);
            quantize(&self.transformed, matrix, &mut self.quantized);
            zigzag_scan(&self.quantized, &mut self.scanned);
            out.copy_from_slice(&self.scanned);
        }
    }
}

/// Per-worker state for reconstructing blocks.
pub struct BlockDecompressor<T> {
    transform: T,
    scanned: [u8; BLOCK_SIZE],
    quantized: [u8; BLOCK_SIZE],
    dequantized: [f64; BLOCK_SIZE],
    plane: [f64; BLOCK_SIZE],
    pixels: [PixelYCbCr; BLOCK_SIZE],
}

impl<T: BlockTransform + Default> BlockDecompressor<T> {
    pub fn new() -> Self {
        Self {
            transform: T::default(),
            scanned: [0; BLOCK_SIZE],
            quantized: [0; BLOCK_SIZE],
            dequantized: [0.0; BLOCK_SIZE],
            plane: [0.0; BLOCK_SIZE],
            pixels: [PixelYCbCr::default(); BLOCK_SIZE],
        }
    }
}

impl<T: BlockTransform + Default> Default for BlockDecompressor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: BlockTransform> BlockDecompressor<T> {
    /// Rebuilds the block at `(x, y)` from its three 64-byte coefficient runs
    /// in `input` and stores it in `sink`.
    pub fn decompress_block<S: PixelSink>(
        &mut self,
        input: &[u8],
        matrix: &QuantMatrix,
        sink: &Mutex<&mut S>,
        (x, y): (usize, usize),
    ) {
        for (channel, input) in Channel::ALL.into_iter().zip(input.chunks_exact(BLOCK_SIZE)) {
            self.scanned.copy_from_slice(input);
            zigzag_unscan(&self.scanned, &mut self.quantized);
            dequantize(&self.quantized, matrix, &mut self.dequantized);
            self.transform.inverse(&self.dequantized, &mut self.plane);
            for (pixel, &value) in self.pixels.iter_mut().zip(self.plane.iter()) {
                channel.assign(pixel, value);
            }
        }

        sink.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write_block(x, y, &self.pixels);
    }
}
