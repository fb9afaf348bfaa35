// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#![deny(unsafe_code)]
pub mod api;
pub mod bit_reader;
pub mod bit_writer;
pub mod coeff_order;
pub mod color;
pub mod entropy_coding;
pub mod error;
pub mod image;
pub mod pipeline;
pub mod quant_matrix;
pub mod quantizer;
pub mod util;

pub use bcodec_transforms::{
    BLOCK_DIM, BLOCK_SIZE, BlockTransform, DirectDct, FftDct, TransformKind,
};

/// Number of color planes coded per block.
pub const NUM_CHANNELS: usize = 3;
/// Bytes of coefficient stream produced by one block.
pub const BLOCK_STREAM_SIZE: usize = NUM_CHANNELS * BLOCK_SIZE;
