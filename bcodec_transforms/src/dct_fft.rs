// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Cosine transform computed through an N-point complex FFT.
//!
//! Each 1D transform reorders the real input into even samples followed by
//! the odd samples reversed, runs one FFT of length N and post-multiplies by
//! `exp(-i pi k / 2N)`; the real part is the cosine sum.
//! The inverse rebuilds the complex spectrum from the pair `(C[k], C[N - k])`
//! and undoes the reordering. Scaling matches [`crate::DirectDct`] exactly.

use std::f64::consts::PI;
use std::sync::OnceLock;

use num_complex::Complex64;

use crate::dct::{BETA, alpha};
use crate::fft::{Direction, Radix2Fft};
use crate::{BLOCK_DIM, BLOCK_SIZE, BlockTransform};

const N: usize = BLOCK_DIM;

struct FftDctTables {
    fft: Radix2Fft<N>,
    /// `sqrt(beta) * alpha(k) * exp(-i pi k / 2N)`
    forward_twiddles: [Complex64; N],
    /// `exp(i pi k / 2N) / (N * sqrt(beta))`
    inverse_twiddles: [Complex64; N],
}

impl FftDctTables {
    fn get() -> &'static FftDctTables {
        static TABLES: OnceLock<FftDctTables> = OnceLock::new();
        TABLES.get_or_init(|| {
            let axis_scale = BETA.sqrt();
            FftDctTables {
                fft: Radix2Fft::new(),
                forward_twiddles: std::array::from_fn(|k| {
                    Complex64::from_polar(
                        axis_scale * alpha(k),
                        -PI * k as f64 / (2 * N) as f64,
                    )
                }),
                inverse_twiddles: std::array::from_fn(|k| {
                    Complex64::from_polar(
                        1.0 / (N as f64 * axis_scale),
                        PI * k as f64 / (2 * N) as f64,
                    )
                }),
            }
        })
    }
}

/// FFT-based engine; owns the complex line buffer it works in.
pub struct FftDct {
    tables: &'static FftDctTables,
    line: [Complex64; N],
}

impl FftDct {
    pub fn new() -> FftDct {
        FftDct {
            tables: FftDctTables::get(),
            line: [Complex64::default(); N],
        }
    }

    /// 1D forward transform of `N` samples read from `input` at `offset`,
    /// `offset + stride`, ...; results written with the same layout.
    fn forward_line(&mut self, input: &[f64], output: &mut [f64], offset: usize, stride: usize) {
        for i in 0..N / 2 {
            self.line[i] = Complex64::new(input[offset + 2 * i * stride], 0.0);
            self.line[N - 1 - i] = Complex64::new(input[offset + (2 * i + 1) * stride], 0.0);
        }
        self.tables.fft.process(&mut self.line, Direction::Forward);
        for k in 0..N {
            output[offset + k * stride] = (self.tables.forward_twiddles[k] * self.line[k]).re;
        }
    }

    fn inverse_line(&mut self, input: &[f64], output: &mut [f64], offset: usize, stride: usize) {
        for k in 0..N {
            let coeff = input[offset + k * stride] / alpha(k);
            // alpha(N - k) == 1 for every mirrored index, and C[N] is zero.
            let mirrored = if k == 0 {
                0.0
            } else {
                input[offset + (N - k) * stride]
            };
            self.line[k] = self.tables.inverse_twiddles[k] * Complex64::new(coeff, -mirrored);
        }
        self.tables.fft.process(&mut self.line, Direction::Inverse);
        for i in 0..N / 2 {
            output[offset + 2 * i * stride] = self.line[i].re;
            output[offset + (2 * i + 1) * stride] = self.line[N - 1 - i].re;
        }
    }
}

impl Default for FftDct {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockTransform for FftDct {
    fn forward(&mut self, input: &[f64; BLOCK_SIZE], output: &mut [f64; BLOCK_SIZE]) {
        let mut rows = [0.0; BLOCK_SIZE];
        for y in 0..N {
            self.forward_line(input, &mut rows, y * N, 1);
        }
        for u in 0..N {
            self.forward_line(&rows, output, u, N);
        }
    }

    fn inverse(&mut self, input: &[f64; BLOCK_SIZE], output: &mut [f64; BLOCK_SIZE]) {
        let mut rows = [0.0; BLOCK_SIZE];
        for v in 0..N {
            self.inverse_line(input, &mut rows, v * N, 1);
        }
        for x in 0..N {
            self.inverse_line(&rows, output, x, N);
        }
    }
}
