// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::sync::OnceLock;

use crate::{BLOCK_DIM, BLOCK_SIZE, BlockTransform};

#[inline(always)]
pub(crate) fn alpha(u: usize) -> f64 {
    if u == 0 { FRAC_1_SQRT_2 } else { 1.0 }
}

/// Normalization shared by both axes: 1/N + 1/N.
pub(crate) const BETA: f64 = 1.0 / BLOCK_DIM as f64 + 1.0 / BLOCK_DIM as f64;

/// Flattened `BLOCK_SIZE x BLOCK_SIZE` transform matrices.
///
/// Row `n` of `forward` holds the weights of every input sample for output
/// coefficient `n`, so one block transform is a single matrix-vector product.
/// `inverse` is laid out the same way with the roles of samples and
/// coefficients swapped.
pub struct DctTables {
    forward: Box<[f64; BLOCK_SIZE * BLOCK_SIZE]>,
    inverse: Box<[f64; BLOCK_SIZE * BLOCK_SIZE]>,
}

impl DctTables {
    fn compute() -> DctTables {
        // basis[s][f] = cos((2s + 1) * f * pi / 2N)
        let mut basis = [[0.0f64; BLOCK_DIM]; BLOCK_DIM];
        for (s, row) in basis.iter_mut().enumerate() {
            for (f, value) in row.iter_mut().enumerate() {
                *value = ((2.0 * s as f64 + 1.0) * f as f64 * PI / (2 * BLOCK_DIM) as f64).cos();
            }
        }

        let mut forward = Box::new([0.0f64; BLOCK_SIZE * BLOCK_SIZE]);
        let mut inverse = Box::new([0.0f64; BLOCK_SIZE * BLOCK_SIZE]);
        for n in 0..BLOCK_SIZE {
            for m in 0..BLOCK_SIZE {
                // Forward: n is a coefficient (u, v), m is a sample (x, y).
                let (u, v) = (n % BLOCK_DIM, n / BLOCK_DIM);
                let (x, y) = (m % BLOCK_DIM, m / BLOCK_DIM);
                forward[n * BLOCK_SIZE + m] =
                    basis[x][u] * basis[y][v] * BETA * alpha(u) * alpha(v);
                // Inverse: n is a sample (x, y), m is a coefficient (u, v).
                let (x, y) = (n % BLOCK_DIM, n / BLOCK_DIM);
                let (u, v) = (m % BLOCK_DIM, m / BLOCK_DIM);
                inverse[n * BLOCK_SIZE + m] =
                    basis[x][u] * basis[y][v] * BETA * alpha(u) * alpha(v);
            }
        }
        DctTables { forward, inverse }
    }

    /// Process-wide tables, computed on first use and never mutated.
    pub fn get() -> &'static DctTables {
        static TABLES: OnceLock<DctTables> = OnceLock::new();
        TABLES.get_or_init(DctTables::compute)
    }

    pub fn forward(&self) -> &[f64; BLOCK_SIZE * BLOCK_SIZE] {
        &self.forward
    }

    pub fn inverse(&self) -> &[f64; BLOCK_SIZE * BLOCK_SIZE] {
        &self.inverse
    }
}

#[inline(always)]
fn multiply(
    matrix: &[f64; BLOCK_SIZE * BLOCK_SIZE],
    input: &[f64; BLOCK_SIZE],
    output: &mut [f64; BLOCK_SIZE],
) {
    for (out, row) in output.iter_mut().zip(matrix.chunks_exact(BLOCK_SIZE)) {
        *out = row.iter().zip(input.iter()).map(|(w, x)| w * x).sum();
    }
}

/// Cosine transform evaluated as a dense product with [`DctTables`].
#[derive(Clone, Copy)]
pub struct DirectDct {
    tables: &'static DctTables,
}

impl DirectDct {
    pub fn new() -> DirectDct {
        DirectDct {
            tables: DctTables::get(),
        }
    }
}

impl Default for DirectDct {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockTransform for DirectDct {
    fn forward(&mut self, input: &[f64; BLOCK_SIZE], output: &mut [f64; BLOCK_SIZE]) {
        multiply(self.tables.forward(), input, output);
    }

    fn inverse(&mut self, input: &[f64; BLOCK_SIZE], output: &mut [f64; BLOCK_SIZE]) {
        multiply(self.tables.inverse(), input, output);
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn tables_are_transposes() {
        let tables = DctTables::get();
        for n in 0..BLOCK_SIZE {
            for m in 0..BLOCK_SIZE {
                assert_eq!(
                    tables.forward()[n * BLOCK_SIZE + m],
                    tables.inverse()[m * BLOCK_SIZE + n]
                );
            }
        }
    }

    #[test]
    fn tables_are_shared() {
        assert!(std::ptr::eq(DctTables::get(), DctTables::get()));
    }

    #[test]
    fn constant_block_has_only_dc() {
        let mut dct = DirectDct::new();
        let input = [-28.0; BLOCK_SIZE];
        let mut output = [0.0; BLOCK_SIZE];
        dct.forward(&input, &mut output);
        assert!((output[0] - (-224.0)).abs() < 1e-9, "dc = {}", output[0]);
        for coeff in &output[1..] {
            assert!(coeff.abs() < 1e-9, "{output:?}");
        }
    }
}
