// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.
#![no_main]

use bcodec::entropy_coding::huffman::{decode, encode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    // Build a table from one part of the input and decode the other with it.
    let (table_source, stream) = rest.split_at((split as usize).min(rest.len()));
    let Ok(encoded) = encode(table_source) else {
        return;
    };
    let bit_count = (stream.len() as u64 * 8).saturating_sub(split as u64 % 8);
    let _ = decode(stream, &encoded.decode_table, bit_count);
});
