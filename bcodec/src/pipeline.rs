// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Block-parallel compression and decompression.
//!
//! The image is cut into 8x8 blocks in raster order; only whole blocks are
//! coded. Block `n` owns bytes `[n * 192, (n + 1) * 192)` of the coefficient
//! stream, so blocks can be processed in any order and on any thread. Pixel
//! access is the only shared state and goes through a mutex.

mod block_coder;

use std::sync::Mutex;

use bcodec_transforms::{BlockTransform, DirectDct, FftDct};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub use block_coder::{BlockCompressor, BlockDecompressor};

use crate::{
    BLOCK_DIM, BLOCK_STREAM_SIZE, TransformKind,
    api::{CompressedImage, CompressionOptions},
    entropy_coding::huffman,
    error::{Error, Result},
    image::{PixelSink, PixelSource, RgbImage},
    quant_matrix::QuantMatrix,
    util::{tracing_wrappers::*, try_filled_vec},
};

/// Block grid of an image. Partial blocks at the right and bottom edges are
/// not part of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    blocks_per_row: usize,
    blocks_per_column: usize,
}

impl BlockLayout {
    pub fn new(width: usize, height: usize) -> BlockLayout {
        BlockLayout {
            blocks_per_row: width / BLOCK_DIM,
            blocks_per_column: height / BLOCK_DIM,
        }
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks_per_row * self.blocks_per_column
    }

    /// Size of the coefficient stream for this grid.
    pub fn stream_len(&self) -> Result<usize> {
        self.num_blocks()
            .checked_mul(BLOCK_STREAM_SIZE)
            .ok_or(Error::ArithmeticOverflow)
    }

    /// Top-left pixel of block `n`.
    pub fn origin(&self, n: usize) -> (usize, usize) {
        (
            (n % self.blocks_per_row) * BLOCK_DIM,
            (n / self.blocks_per_row) * BLOCK_DIM,
        )
    }
}

/// Compresses every whole block of `source`.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, err))]
pub fn compress<S: PixelSource + Send>(
    source: &mut S,
    options: &CompressionOptions,
) -> Result<CompressedImage> {
    let matrix = QuantMatrix::for_quality(options.quality)?;
    let (width, height) = source.size();
    let layout = BlockLayout::new(width, height);
    if width % BLOCK_DIM != 0 || height % BLOCK_DIM != 0 {
        warn!(
            width,
            height, "image size is not a multiple of the block size, edges are dropped"
        );
    }

    let mut coefficients = try_filled_vec(0u8, layout.stream_len()?)?;
    match options.transform {
        TransformKind::Direct => {
            compress_blocks::<DirectDct, S>(source, &layout, matrix, &mut coefficients)
        }
        TransformKind::Fft => {
            compress_blocks::<FftDct, S>(source, &layout, matrix, &mut coefficients)
        }
    }

    let encoded = huffman::encode(&coefficients)?;
    info!(
        width,
        height,
        quality = options.quality,
        transform = options.transform.name(),
        blocks = layout.num_blocks(),
        compressed_bytes = encoded.bytes.len(),
        "compressed image"
    );
    Ok(CompressedImage {
        quality: options.quality,
        compressed_bytes: encoded.bytes,
        bits_count: encoded.bit_count,
        decode_table: encoded.decode_table,
        width,
        height,
    })
}

fn compress_blocks<T: BlockTransform + Default, S: PixelSource + Send>(
    source: &mut S,
    layout: &BlockLayout,
    matrix: &QuantMatrix,
    coefficients: &mut [u8],
) {
    let source = Mutex::new(source);

    #[cfg(feature = "parallel")]
    coefficients
        .par_chunks_mut(BLOCK_STREAM_SIZE)
        .enumerate()
        .for_each_init(BlockCompressor::<T>::new, |compressor, (n, out)| {
            compressor.compress_block(&source, layout.origin(n), matrix, out)
        });

    #[cfg(not(feature = "parallel"))]
    compress_blocks_sequential::<T, S>(&source, layout, matrix, coefficients);
}

#[cfg(any(test, not(feature = "parallel")))]
fn compress_blocks_sequential<T: BlockTransform + Default, S: PixelSource>(
    source: &Mutex<&mut S>,
    layout: &BlockLayout,
    matrix: &QuantMatrix,
    coefficients: &mut [u8],
) {
    let mut compressor = BlockCompressor::<T>::new();
    for (n, out) in coefficients.chunks_mut(BLOCK_STREAM_SIZE).enumerate() {
        compressor.compress_block(source, layout.origin(n), matrix, out);
    }
}

/// Reconstructs `image` into `sink`, which must be at least as large as the
/// original image. Pixels outside the block grid are left untouched.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, err))]
pub fn decompress<S: PixelSink + Send>(
    image: &CompressedImage,
    sink: &mut S,
    transform: TransformKind,
) -> Result<()> {
    let (sink_width, sink_height) = sink.size();
    if sink_width < image.width || sink_height < image.height {
        return Err(Error::ImageSizeMismatch(
            sink_width,
            sink_height,
            image.width,
            image.height,
        ));
    }
    let decoded = DecodedStream::new(image)?;
    decoded.reconstruct(sink, transform);
    Ok(())
}

/// Reconstructs `image` into a new RGB image of the original size.
///
/// The stream is decoded and validated before the image is allocated.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, err))]
pub fn decompress_to_rgb(image: &CompressedImage, transform: TransformKind) -> Result<RgbImage> {
    let decoded = DecodedStream::new(image)?;
    let mut rgb = RgbImage::new(image.width, image.height)?;
    decoded.reconstruct(&mut rgb, transform);
    Ok(rgb)
}

/// Validated coefficient stream of a compressed image.
struct DecodedStream {
    matrix: &'static QuantMatrix,
    layout: BlockLayout,
    coefficients: Vec<u8>,
}

impl DecodedStream {
    fn new(image: &CompressedImage) -> Result<Self> {
        let matrix = QuantMatrix::for_quality(image.quality)?;
        let layout = BlockLayout::new(image.width, image.height);
        let expected = layout.stream_len()?;
        // Every coefficient takes at least one bit.
        if image.bits_count < expected as u64 {
            return Err(Error::StreamTooShort(image.bits_count, expected));
        }
        let coefficients = huffman::decode(
            &image.compressed_bytes,
            &image.decode_table,
            image.bits_count,
        )?;
        if coefficients.len() != expected {
            return Err(Error::CoefficientCountMismatch(coefficients.len(), expected));
        }
        Ok(Self {
            matrix,
            layout,
            coefficients,
        })
    }

    fn reconstruct<S: PixelSink + Send>(&self, sink: &mut S, transform: TransformKind) {
        let (coefficients, layout, matrix) = (&self.coefficients, &self.layout, self.matrix);
        match transform {
            TransformKind::Direct => {
                decompress_blocks::<DirectDct, S>(coefficients, layout, matrix, sink)
            }
            TransformKind::Fft => {
                decompress_blocks::<FftDct, S>(coefficients, layout, matrix, sink)
            }
        }
        debug!(
            blocks = layout.num_blocks(),
            transform = transform.name(),
            "decompressed image"
        );
    }
}

fn decompress_blocks<T: BlockTransform + Default, S: PixelSink + Send>(
    coefficients: &[u8],
    layout: &BlockLayout,
    matrix: &QuantMatrix,
    sink: &mut S,
) {
    let sink = Mutex::new(sink);

    #[cfg(feature = "parallel")]
    coefficients
        .par_chunks(BLOCK_STREAM_SIZE)
        .enumerate()
        .for_each_init(BlockDecompressor::<T>::new, |decompressor, (n, input)| {
            decompressor.decompress_block(input, matrix, &sink, layout.origin(n))
        });

    #[cfg(not(feature = "parallel"))]
    decompress_blocks_sequential::<T, S>(coefficients, layout, matrix, &sink);
}

#[cfg(any(test, not(feature = "parallel")))]
fn decompress_blocks_sequential<T: BlockTransform + Default, S: PixelSink>(
    coefficients: &[u8],
    layout: &BlockLayout,
    matrix: &QuantMatrix,
    sink: &Mutex<&mut S>,
) {
    let mut decompressor = BlockDecompressor::<T>::new();
    for (n, input) in coefficients.chunks(BLOCK_STREAM_SIZE).enumerate() {
        decompressor.decompress_block(input, matrix, sink, layout.origin(n));
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;
    use test_log::test;

    use super::*;
    use crate::{
        BLOCK_SIZE,
        color::{PixelRgb, PixelYCbCr},
        util::test::{assert_all_almost_eq, assert_almost_eq, gradient_image, rms_error},
    };

    /// Source whose every pixel maps to one fixed, zero-centered plane value.
    struct ConstantSource {
        width: usize,
        height: usize,
        pixel: PixelRgb,
    }

    impl PixelSource for ConstantSource {
        fn size(&self) -> (usize, usize) {
            (self.width, self.height)
        }

        fn read_block(&self, _x: usize, _y: usize, block: &mut [PixelRgb; BLOCK_SIZE]) {
            *block = [self.pixel; BLOCK_SIZE];
        }
    }

    /// Sink that records every block written to it.
    #[derive(Default)]
    struct RecordingSink {
        width: usize,
        height: usize,
        blocks: Vec<((usize, usize), [PixelYCbCr; BLOCK_SIZE])>,
    }

    impl PixelSink for RecordingSink {
        fn size(&self) -> (usize, usize) {
            (self.width, self.height)
        }

        fn write_block(&mut self, x: usize, y: usize, block: &[PixelYCbCr; BLOCK_SIZE]) {
            self.blocks.push(((x, y), *block));
        }
    }

    #[test]
    fn layout() {
        let layout = BlockLayout::new(30, 17);
        assert_eq!(layout.num_blocks(), 6);
        assert_eq!(layout.stream_len().unwrap(), 6 * 192);
        assert_eq!(layout.origin(0), (0, 0));
        assert_eq!(layout.origin(2), (16, 0));
        assert_eq!(layout.origin(3), (0, 8));
        assert_eq!(layout.origin(5), (16, 8));
        assert_eq!(BlockLayout::new(7, 100).num_blocks(), 0);
    }

    #[test]
    fn constant_block_has_dc_only() {
        // Black: Y = 16, Cb = Cr = 128, i.e. -112, 0, 0 after the level shift.
        let mut source = ConstantSource {
            width: 8,
            height: 8,
            pixel: PixelRgb::default(),
        };
        let compressed = compress(&mut source, &CompressionOptions::default()).unwrap();
        let coefficients = huffman::decode(
            &compressed.compressed_bytes,
            &compressed.decode_table,
            compressed.bits_count,
        )
        .unwrap();
        assert_eq!(coefficients.len(), 192);
        // -112 * 8 / 10 = -89.6, truncated to -89.
        assert_eq!(coefficients[0], (-89i8) as u8);
        assert!(coefficients[1..].iter().all(|&c| c == 0));
    }

    #[test]
    fn constant_block_round_trip() {
        // A plane value of -28 has DC -224. At quality 70 the DC step is 10,
        // so it is stored as -22 and comes back as -220 / 8 = -27.5.
        let mut image = CompressedImage {
            quality: 70,
            compressed_bytes: vec![],
            bits_count: 0,
            decode_table: Default::default(),
            width: 8,
            height: 8,
        };
        let mut stream = vec![0u8; 192];
        stream[0] = (-22i8) as u8;
        let encoded = huffman::encode(&stream).unwrap();
        image.compressed_bytes = encoded.bytes;
        image.bits_count = encoded.bit_count;
        image.decode_table = encoded.decode_table;

        for transform in TransformKind::ALL {
            let mut sink = RecordingSink {
                width: 8,
                height: 8,
                ..Default::default()
            };
            decompress(&image, &mut sink, transform).unwrap();
            assert_eq!(sink.blocks.len(), 1);
            let ((x, y), block) = &sink.blocks[0];
            assert_eq!((*x, *y), (0, 0));
            for pixel in block {
                assert_almost_eq!(pixel.y, 128.0 - 27.5, 1e-9);
                assert_almost_eq!(pixel.cb, 128.0, 1e-9);
                assert_almost_eq!(pixel.cr, 128.0, 1e-9);
            }
        }
    }

    #[test]
    fn only_whole_blocks_are_coded() {
        let mut source = gradient_image(21, 13);
        let compressed = compress(&mut source, &CompressionOptions::default()).unwrap();
        assert_eq!((compressed.width, compressed.height), (21, 13));
        let coefficients = huffman::decode(
            &compressed.compressed_bytes,
            &compressed.decode_table,
            compressed.bits_count,
        )
        .unwrap();
        assert_eq!(coefficients.len(), 2 * 192);

        let mut sink = RecordingSink {
            width: 21,
            height: 13,
            ..Default::default()
        };
        decompress(&compressed, &mut sink, TransformKind::Direct).unwrap();
        let mut origins: Vec<_> = sink.blocks.iter().map(|(origin, _)| *origin).collect();
        origins.sort();
        assert_eq!(origins, vec![(0, 0), (8, 0)]);

        let rgb = decompress_to_rgb(&compressed, TransformKind::Direct).unwrap();
        assert_eq!((rgb.width(), rgb.height()), (21, 13));
        assert_eq!(rgb.pixel(20, 12), [0, 0, 0]);
    }

    #[test]
    fn smaller_than_a_block() {
        let mut source = gradient_image(5, 5);
        let compressed = compress(&mut source, &CompressionOptions::default()).unwrap();
        assert!(compressed.compressed_bytes.is_empty());
        assert_eq!(compressed.bits_count, 0);
        let rgb = decompress_to_rgb(&compressed, TransformKind::Fft).unwrap();
        assert_eq!(rgb.as_raw(), &[0; 75]);
    }

    #[test]
    fn transforms_produce_same_stream() {
        let mut source = gradient_image(32, 24);
        let direct = compress(&mut source, &CompressionOptions::default()).unwrap();
        let fft = compress(
            &mut source,
            &CompressionOptions::default().with_transform(TransformKind::Fft),
        )
        .unwrap();
        let decode = |c: &CompressedImage| {
            huffman::decode(&c.compressed_bytes, &c.decode_table, c.bits_count).unwrap()
        };
        let (direct, fft) = (decode(&direct), decode(&fft));
        let differing = direct.iter().zip(fft.iter()).filter(|(a, b)| a != b).count();
        // Quotients sitting exactly on an integer may truncate differently.
        assert!(differing * 100 < direct.len(), "{differing} coefficients differ");
    }

    fn block_round_trip<T: BlockTransform + Default>(
        plane: &[f64; BLOCK_SIZE],
        matrix: &QuantMatrix,
    ) -> [f64; BLOCK_SIZE] {
        use crate::{coeff_order::*, quantizer::*};
        let mut transform = T::default();
        let mut coefficients = [0.0; BLOCK_SIZE];
        let mut quantized = [0u8; BLOCK_SIZE];
        let mut scanned = [0u8; BLOCK_SIZE];
        let mut restored = [0.0; BLOCK_SIZE];
        transform.forward(plane, &mut coefficients);
        quantize(&coefficients, matrix, &mut quantized);
        zigzag_scan(&quantized, &mut scanned);
        zigzag_unscan(&scanned, &mut quantized);
        dequantize(&quantized, matrix, &mut coefficients);
        transform.inverse(&coefficients, &mut restored);
        restored
    }

    #[test]
    fn block_round_trip_error_is_bounded() {
        // Small amplitudes keep every quotient inside a signed byte.
        let mut rng = XorShiftRng::seed_from_u64(0);
        for quality in [1, 25, 50, 70, 90, 99] {
            let matrix = QuantMatrix::for_quality(quality).unwrap();
            let max_step = *matrix.as_array().iter().max().unwrap() as f64;
            for _ in 0..50 {
                let plane: [f64; BLOCK_SIZE] =
                    std::array::from_fn(|_| rng.random_range(-15.0..=15.0));
                let direct = block_round_trip::<DirectDct>(&plane, matrix);
                let fft = block_round_trip::<FftDct>(&plane, matrix);
                assert!(rms_error(&plane, &direct) < max_step, "quality {quality}");
                assert!(rms_error(&plane, &fft) < max_step, "quality {quality}");
            }
        }
    }

    #[test]
    fn smooth_image_round_trip_is_close() {
        let mut source = gradient_image(64, 48);
        let compressed = compress(&mut source, &CompressionOptions::default()).unwrap();
        for transform in TransformKind::ALL {
            let rgb = decompress_to_rgb(&compressed, transform).unwrap();
            let total: u64 = rgb
                .as_raw()
                .iter()
                .zip(source.as_raw())
                .map(|(&a, &b)| a.abs_diff(b) as u64)
                .sum();
            let mean = total as f64 / rgb.as_raw().len() as f64;
            assert!(mean < 3.0, "{transform:?}: mean error {mean}");
        }
    }

    #[test]
    fn invalid_quality() {
        let mut source = gradient_image(8, 8);
        for quality in [0, 100] {
            assert!(matches!(
                compress(&mut source, &CompressionOptions::default().with_quality(quality)),
                Err(Error::InvalidQuality(q)) if q == quality
            ));
        }
    }

    #[test]
    fn corrupt_stream_is_rejected() {
        let mut source = gradient_image(16, 16);
        let mut compressed = compress(&mut source, &CompressionOptions::default()).unwrap();

        // Two blocks' worth of coefficients where one is expected.
        let mut long = compressed.clone();
        long.height = 8;
        assert!(matches!(
            decompress_to_rgb(&long, TransformKind::Direct),
            Err(Error::CoefficientCountMismatch(768, 384))
        ));

        compressed.bits_count = compressed.compressed_bytes.len() as u64 * 8 + 1;
        assert!(matches!(
            decompress_to_rgb(&compressed, TransformKind::Direct),
            Err(Error::BitCountOutOfBounds(..))
        ));
    }

    #[test]
    fn short_stream_is_rejected_before_allocating() {
        let empty = CompressedImage {
            quality: 70,
            compressed_bytes: vec![],
            bits_count: 0,
            decode_table: Default::default(),
            width: 1 << 20,
            height: 1 << 20,
        };
        let expected = (1usize << 34) * 192;
        for transform in TransformKind::ALL {
            assert!(matches!(
                decompress_to_rgb(&empty, transform),
                Err(Error::StreamTooShort(0, n)) if n == expected
            ));
        }

        let mut source = gradient_image(16, 16);
        let mut compressed = compress(&mut source, &CompressionOptions::default()).unwrap();
        compressed.width = 1 << 20;
        let mut sink = RecordingSink {
            width: 1 << 20,
            height: 16,
            ..Default::default()
        };
        assert!(matches!(
            decompress(&compressed, &mut sink, TransformKind::Direct),
            Err(Error::StreamTooShort(..))
        ));
        assert!(sink.blocks.is_empty());
    }

    #[test]
    fn uniform_plane_compresses_to_dc_only() {
        // Gray 98 has Y = 99.78, a plane value of -28.22. Its DC of -225.7
        // quantizes to -22 at quality 70 and comes back as a plane of -27.5.
        let mut source = ConstantSource {
            width: 16,
            height: 8,
            pixel: PixelRgb::new(98, 98, 98),
        };
        let y = source.pixel.y();
        assert_almost_eq!(y - 128.0, -28.0, 0.25);
        let compressed = compress(&mut source, &CompressionOptions::default()).unwrap();
        let coefficients = huffman::decode(
            &compressed.compressed_bytes,
            &compressed.decode_table,
            compressed.bits_count,
        )
        .unwrap();
        assert_eq!(coefficients.len(), 2 * 192);
        for block in coefficients.chunks(192) {
            assert_eq!(block[0], (-22i8) as u8);
            assert!(block[1..].iter().all(|&c| c == 0));
        }

        for transform in TransformKind::ALL {
            let mut sink = RecordingSink {
                width: 16,
                height: 8,
                ..Default::default()
            };
            decompress(&compressed, &mut sink, transform).unwrap();
            assert_eq!(sink.blocks.len(), 2);
            for (_, block) in &sink.blocks {
                let luma: Vec<f64> = block.iter().map(|p| p.y).collect();
                assert_all_almost_eq!(luma, vec![128.0 - 27.5; BLOCK_SIZE], 1e-9);
                // Within one eighth of the DC step of the source.
                assert_almost_eq!(luma[0], y, 10.0 / 8.0);
                assert_almost_eq!(block[0].cb, 128.0, 1e-9);
                assert_almost_eq!(block[0].cr, 128.0, 1e-9);
            }
        }
    }

    #[test]
    fn sequential_blocks_match_default_path() {
        let mut source = gradient_image(40, 24);
        let layout = BlockLayout::new(40, 24);
        let matrix = QuantMatrix::for_quality(70).unwrap();

        let mut coefficients = vec![0u8; layout.stream_len().unwrap()];
        compress_blocks::<DirectDct, _>(&mut source, &layout, matrix, &mut coefficients);
        let mut sequential = vec![0u8; coefficients.len()];
        compress_blocks_sequential::<DirectDct, _>(
            &Mutex::new(&mut source),
            &layout,
            matrix,
            &mut sequential,
        );
        assert_eq!(sequential, coefficients);

        let mut restored = RgbImage::new(40, 24).unwrap();
        decompress_blocks::<FftDct, _>(&coefficients, &layout, matrix, &mut restored);
        let mut restored_sequential = RgbImage::new(40, 24).unwrap();
        decompress_blocks_sequential::<FftDct, _>(
            &coefficients,
            &layout,
            matrix,
            &Mutex::new(&mut restored_sequential),
        );
        assert_eq!(restored_sequential.as_raw(), restored.as_raw());
    }

    #[test]
    fn sink_too_small() {
        let mut source = gradient_image(16, 16);
        let compressed = compress(&mut source, &CompressionOptions::default()).unwrap();
        let mut sink = RgbImage::new(16, 8).unwrap();
        assert!(matches!(
            decompress(&compressed, &mut sink, TransformKind::Direct),
            Err(Error::ImageSizeMismatch(16, 8, 16, 16))
        ));
    }
}
