// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::BLOCK_SIZE;

/// `ZIGZAG_ORDER[i]` is the natural (row-major) index of the `i`-th
/// coefficient in scan order.
#[rustfmt::skip]
pub const ZIGZAG_ORDER: [usize; BLOCK_SIZE] = [
     0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// Inverse of [`ZIGZAG_ORDER`]: scan position of each natural index.
pub const NATURAL_ORDER: [usize; BLOCK_SIZE] = invert(&ZIGZAG_ORDER);

const fn invert(order: &[usize; BLOCK_SIZE]) -> [usize; BLOCK_SIZE] {
    let mut inverse = [0; BLOCK_SIZE];
    let mut i = 0;
    while i < BLOCK_SIZE {
        inverse[order[i]] = i;
        i += 1;
    }
    inverse
}

/// Reorders a row-major block into zig-zag order.
pub fn zigzag_scan<T: Copy>(natural: &[T; BLOCK_SIZE], out: &mut [T; BLOCK_SIZE]) {
    for (out, &from) in out.iter_mut().zip(ZIGZAG_ORDER.iter()) {
        *out = natural[from];
    }
}

/// Restores row-major order from a zig-zag scanned block.
pub fn zigzag_unscan<T: Copy>(scanned: &[T; BLOCK_SIZE], out: &mut [T; BLOCK_SIZE]) {
    for (out, &from) in out.iter_mut().zip(NATURAL_ORDER.iter()) {
        *out = scanned[from];
    }
}
