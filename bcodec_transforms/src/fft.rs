// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::f64::consts::PI;

use num_complex::Complex64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Kernel `exp(-2 pi i k n / N)`.
    Forward,
    /// Kernel `exp(+2 pi i k n / N)`. Not normalized.
    Inverse,
}

/// In-place radix-2 Cooley-Tukey FFT of a fixed power-of-two size, with the
/// bit-reversal permutation and twiddle factors computed at construction.
pub struct Radix2Fft<const N: usize> {
    bit_reverse: [usize; N],
    twiddles: [Complex64; N],
}

impl<const N: usize> Radix2Fft<N> {
    pub fn new() -> Self {
        const { assert!(N.is_power_of_two(), "FFT size must be a power of two") };
        let log_n = N.trailing_zeros();
        let bit_reverse = std::array::from_fn(|i| {
            let mut reversed = 0;
            for bit in 0..log_n {
                reversed |= ((i >> bit) & 1) << (log_n - 1 - bit);
            }
            reversed
        });
        let twiddles =
            std::array::from_fn(|k| Complex64::from_polar(1.0, -2.0 * PI * k as f64 / N as f64));
        Self {
            bit_reverse,
            twiddles,
        }
    }

    pub fn process(&self, data: &mut [Complex64; N], direction: Direction) {
        for i in 0..N {
            let j = self.bit_reverse[i];
            if j > i {
                data.swap(i, j);
            }
        }

        let mut len = 2;
        while len <= N {
            let half = len / 2;
            let stride = N / len;
            for start in (0..N).step_by(len) {
                for k in 0..half {
                    let w = match direction {
                        Direction::Forward => self.twiddles[k * stride],
                        Direction::Inverse => self.twiddles[k * stride].conj(),
                    };
                    let even = data[start + k];
                    let odd = data[start + k + half] * w;
                    data[start + k] = even + odd;
                    data[start + k + half] = even - odd;
                }
            }
            len <<= 1;
        }
    }
}

impl<const N: usize> Default for Radix2Fft<N> {
    fn default() -> Self {
        Self::new()
    }
}
