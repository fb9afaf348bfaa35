// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::{ops::Index, sync::OnceLock};

use crate::{
    BLOCK_SIZE,
    error::{Error, Result},
    util::tracing_wrappers::*,
};

pub const MIN_QUALITY: u32 = 1;
pub const MAX_QUALITY: u32 = 99;

/// Standard luminance table, quality 50, row-major.
#[rustfmt::skip]
const BASE_TABLE: [i32; BLOCK_SIZE] = [
    16, 11, 10, 16,  24,  40,  51,  61,
    12, 12, 14, 19,  26,  58,  60,  55,
    14, 13, 16, 24,  40,  57,  69,  56,
    14, 17, 22, 29,  51,  87,  80,  62,
    18, 22, 37, 56,  68, 109, 103,  77,
    24, 35, 55, 64,  81, 104, 113,  92,
    49, 64, 78, 87, 103, 121, 120, 101,
    72, 92, 95, 98, 112, 100, 103,  99,
];

/// Per-coefficient quantization steps, row-major. Every step is at least 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantMatrix([i32; BLOCK_SIZE]);

impl QuantMatrix {
    /// Returns the shared matrix for `quality` in `[1, 99]`. Each quality is
    /// computed at most once per process.
    pub fn for_quality(quality: u32) -> Result<&'static QuantMatrix> {
        static MATRICES: [OnceLock<QuantMatrix>; MAX_QUALITY as usize] =
            [const { OnceLock::new() }; MAX_QUALITY as usize];
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(Error::InvalidQuality(quality));
        }
        Ok(MATRICES[(quality - MIN_QUALITY) as usize].get_or_init(|| Self::compute(quality)))
    }

    fn compute(quality: u32) -> QuantMatrix {
        debug!(quality, "computing quantization matrix");
        let quality = quality as i32;
        let multiplier = if quality < 50 {
            5000 / quality
        } else {
            200 - 2 * quality
        };
        QuantMatrix(BASE_TABLE.map(|base| ((multiplier * base + 50) / 100).max(1)))
    }

    pub fn as_array(&self) -> &[i32; BLOCK_SIZE] {
        &self.0
    }
}

impl Index<usize> for QuantMatrix {
    type Output = i32;

    fn index(&self, index: usize) -> &i32 {
        &self.0[index]
    }
}
