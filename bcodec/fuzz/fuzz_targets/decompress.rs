// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.
#![no_main]

use bcodec::api::{CompressedImage, TransformKind, decompress_to_rgb};
use bcodec::entropy_coding::huffman::encode;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let [quality, width, height, ..] = *data else {
        return;
    };
    let encoded = match encode(&data[3..]) {
        Ok(encoded) => encoded,
        Err(_) => return,
    };
    let image = CompressedImage {
        quality: quality as u32,
        compressed_bytes: encoded.bytes,
        bits_count: encoded.bit_count,
        decode_table: encoded.decode_table,
        width: width as usize,
        height: height as usize,
    };
    for transform in TransformKind::ALL {
        let _ = decompress_to_rgb(&image, transform);
    }
});
