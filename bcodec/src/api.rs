// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

pub use crate::color::{PixelRgb, PixelYCbCr};
pub use crate::entropy_coding::huffman::{DecodeTable, HuffmanCode};
pub use crate::error::{Error, Result};
pub use crate::image::{PixelSink, PixelSource, RgbImage};
pub use crate::pipeline::{compress, decompress, decompress_to_rgb};
pub use crate::quant_matrix::{MAX_QUALITY, MIN_QUALITY};
pub use bcodec_transforms::TransformKind;

/// Quality used when none is given.
pub const DEFAULT_QUALITY: u32 = 70;

/// Everything needed to reconstruct an image: the packed coefficient stream,
/// its code table and the parameters it was produced with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub quality: u32,
    pub compressed_bytes: Vec<u8>,
    /// Meaningful bits in `compressed_bytes`.
    pub bits_count: u64,
    pub decode_table: DecodeTable,
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionOptions {
    /// In `[MIN_QUALITY, MAX_QUALITY]`; higher keeps more detail.
    pub quality: u32,
    pub transform: TransformKind,
}

impl CompressionOptions {
    pub fn with_quality(self, quality: u32) -> Self {
        Self { quality, ..self }
    }

    pub fn with_transform(self, transform: TransformKind) -> Self {
        Self { transform, ..self }
    }
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            transform: TransformKind::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn default_options() {
        let options = CompressionOptions::default();
        assert_eq!(options.quality, 70);
        assert_eq!(options.transform, TransformKind::Direct);
        let options = options.with_quality(20).with_transform(TransformKind::Fft);
        assert_eq!((options.quality, options.transform), (20, TransformKind::Fft));
    }
}
