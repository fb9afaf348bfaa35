// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{BLOCK_SIZE, quant_matrix::QuantMatrix};

/// Divides each coefficient by its step and keeps the low byte of the
/// truncated quotient. Quotients outside `[-128, 127]` wrap.
pub fn quantize(
    transformed: &[f64; BLOCK_SIZE],
    matrix: &QuantMatrix,
    out: &mut [u8; BLOCK_SIZE],
) {
    for ((out, &value), &step) in out.iter_mut().zip(transformed).zip(matrix.as_array()) {
        *out = (value / step as f64) as i64 as u8;
    }
}

/// Reads each byte as a signed value and scales it back by its step.
pub fn dequantize(
    quantized: &[u8; BLOCK_SIZE],
    matrix: &QuantMatrix,
    out: &mut [f64; BLOCK_SIZE],
) {
    for ((out, &byte), &step) in out.iter_mut().zip(quantized).zip(matrix.as_array()) {
        *out = (byte as i8) as f64 * step as f64;
    }
}
