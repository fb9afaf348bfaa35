// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::error::Result;

/// Packs bits MSB-first into bytes. The last byte is padded with zeros in its
/// low bits.
#[derive(Debug, Default)]
pub struct BitWriter {
    data: Vec<u8>,
    // Pending bits, aligned to the most significant end. Fewer than 8 between
    // calls.
    bit_buf: u64,
    bits_in_buf: usize,
    bits_written: u64,
}

pub const MAX_BITS_PER_CALL: usize = 56;

impl BitWriter {
    pub fn new() -> BitWriter {
        BitWriter::default()
    }

    /// Reserves room for at least `num_bits` more bits.
    pub fn reserve_bits(&mut self, num_bits: u64) -> Result<()> {
        let bytes = num_bits.div_ceil(8) as usize;
        self.data.try_reserve(bytes)?;
        Ok(())
    }

    /// Appends the `num` low bits of `bits`, most significant first.
    pub fn write(&mut self, num: usize, bits: u64) {
        debug_assert!(num <= MAX_BITS_PER_CALL);
        if num == 0 {
            return;
        }
        let bits = bits & ((1u64 << num) - 1);
        self.bit_buf |= bits << (64 - self.bits_in_buf - num);
        self.bits_in_buf += num;
        self.bits_written += num as u64;
        while self.bits_in_buf >= 8 {
            self.data.push((self.bit_buf >> 56) as u8);
            self.bit_buf <<= 8;
            self.bits_in_buf -= 8;
        }
    }

    /// Like [`BitWriter::write`], but accepts up to 64 bits.
    pub fn write_long(&mut self, num: usize, bits: u64) {
        if num > MAX_BITS_PER_CALL {
            self.write(num - 32, bits >> 32);
            self.write(32, bits & 0xFFFF_FFFF);
        } else {
            self.write(num, bits);
        }
    }

    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Returns the packed bytes and the number of meaningful bits in them.
    pub fn finalize(mut self) -> (Vec<u8>, u64) {
        if self.bits_in_buf > 0 {
            self.data.push((self.bit_buf >> 56) as u8);
        }
        (self.data, self.bits_written)
    }
}
