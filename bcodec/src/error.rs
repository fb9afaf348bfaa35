// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::entropy_coding::huffman::HUFFMAN_MAX_BITS;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid quality {0}, must be in [1, 99]")]
    InvalidQuality(u32),
    #[error("Bit count {0} exceeds the {1} bits available")]
    BitCountOutOfBounds(u64, u64),
    #[error("Read out of bounds")]
    OutOfBounds,
    #[error("Invalid Huffman code: no symbol matches {0} bits")]
    InvalidHuffmanCode(u32),
    #[error("Huffman stream ends inside a code ({0} dangling bits)")]
    TruncatedHuffmanStream(u32),
    #[error("Huffman code too long: {0} bits, max is {HUFFMAN_MAX_BITS}")]
    HuffmanCodeTooLong(u32),
    #[error("Duplicate Huffman code of {0} bits in decode table")]
    DuplicateHuffmanCode(u32),
    #[error("Coefficient stream has {0} bytes, expected {1}")]
    CoefficientCountMismatch(usize, usize),
    #[error("Stream of {0} bits is too short for {1} coefficients")]
    StreamTooShort(u64, usize),
    #[error("Pixel sink is {0}x{1}, compressed image needs {2}x{3}")]
    ImageSizeMismatch(usize, usize, usize, usize),
    #[error("Invalid image buffer: {0} bytes for a {1}x{2} RGB image")]
    InvalidImageBuffer(usize, usize, usize),
    #[error("Out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),
    // Generic arithmetic overflow. Prefer using other errors if possible.
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}

pub type Result<T> = std::result::Result<T, Error>;
