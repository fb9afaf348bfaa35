// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Forward and inverse two-dimensional cosine transforms over 8x8 blocks.
//!
//! Two interchangeable engines are provided: [`DirectDct`], a dense
//! matrix-vector product against precomputed 64x64 tables, and [`FftDct`],
//! which computes the same transform separably through a radix-2 FFT.

pub mod dct;
pub mod dct_fft;
pub mod fft;

pub use dct::DirectDct;
pub use dct_fft::FftDct;

/// Side of a square block, in samples.
pub const BLOCK_DIM: usize = 8;
/// Number of samples in a block.
pub const BLOCK_SIZE: usize = BLOCK_DIM * BLOCK_DIM;

/// A forward/inverse transform over one row-major block of samples.
///
/// Implementations may keep scratch state, hence `&mut self`; an instance is
/// meant to be owned by a single worker and reused across many blocks.
pub trait BlockTransform: Send {
    fn forward(&mut self, input: &[f64; BLOCK_SIZE], output: &mut [f64; BLOCK_SIZE]);
    fn inverse(&mut self, input: &[f64; BLOCK_SIZE], output: &mut [f64; BLOCK_SIZE]);
}

/// Selects which transform engine a pipeline runs with.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    /// Matrix product against the cached cosine basis.
    #[default]
    Direct,
    /// Radix-2 FFT based evaluation of the same transform.
    Fft,
}

impl TransformKind {
    pub const ALL: [TransformKind; 2] = [TransformKind::Direct, TransformKind::Fft];

    pub fn name(&self) -> &'static str {
        match self {
            TransformKind::Direct => "direct",
            TransformKind::Fft => "fft",
        }
    }
}
