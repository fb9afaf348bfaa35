// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;

use crate::error::Error;

/// Reads bits MSB-first from a sequence of bytes, up to a fixed bit count.
#[derive(Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    // Pending bits, aligned to the most significant end.
    bit_buf: u64,
    bits_in_buf: usize,
    total_bits_read: usize,
    total_bits: usize,
}

impl Debug for BitReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BitReader{{ data: [{} bytes], bits_in_buf: {}, total_bits_read: {}/{} }}",
            self.data.len(),
            self.bits_in_buf,
            self.total_bits_read,
            self.total_bits,
        )
    }
}

pub const MAX_BITS_PER_CALL: usize = 56;

impl<'a> BitReader<'a> {
    /// Constructs a BitReader over the first `bit_count` bits of `data`.
    /// ```
    /// # use bcodec::bit_reader::BitReader;
    /// let mut br = BitReader::new(&[0b1010_0000], 3)?;
    /// assert_eq!(br.read(2)?, 0b10);
    /// assert!(br.read_bit()?);
    /// assert!(br.read_bit().is_err());
    /// # Ok::<(), bcodec::error::Error>(())
    /// ```
    pub fn new(data: &'a [u8], bit_count: u64) -> Result<BitReader<'a>, Error> {
        let available = data.len() as u64 * 8;
        if bit_count > available {
            return Err(Error::BitCountOutOfBounds(bit_count, available));
        }
        let total_bits = bit_count as usize;
        Ok(BitReader {
            data: &data[..total_bits.div_ceil(8)],
            bit_buf: 0,
            bits_in_buf: 0,
            total_bits_read: 0,
            total_bits,
        })
    }

    /// Reads `num` bits from the buffer without consuming them.
    pub fn peek(&mut self, num: usize) -> Result<u64, Error> {
        debug_assert!(num <= MAX_BITS_PER_CALL);
        if num > self.bits_remaining() {
            return Err(Error::OutOfBounds);
        }
        if num == 0 {
            return Ok(0);
        }
        self.refill();
        Ok(self.bit_buf >> (64 - num))
    }

    /// Advances by `num` bits, which must already be in the buffer.
    pub fn consume(&mut self, num: usize) -> Result<(), Error> {
        if self.bits_in_buf < num || num > self.bits_remaining() {
            return Err(Error::OutOfBounds);
        }
        // `num` is at most 56 here, so the shift never overflows.
        self.bit_buf <<= num;
        self.bits_in_buf -= num;
        self.total_bits_read += num;
        Ok(())
    }

    /// Reads `num` bits, first bit in the most significant position.
    pub fn read(&mut self, num: usize) -> Result<u64, Error> {
        let ret = self.peek(num)?;
        self.consume(num)?;
        Ok(ret)
    }

    pub fn read_bit(&mut self) -> Result<bool, Error> {
        Ok(self.read(1)? != 0)
    }

    /// Returns the total number of bits that have been read.
    pub fn total_bits_read(&self) -> usize {
        self.total_bits_read
    }

    /// Returns the number of bits that can still be read.
    pub fn bits_remaining(&self) -> usize {
        self.total_bits - self.total_bits_read
    }

    fn refill(&mut self) {
        while self.bits_in_buf <= MAX_BITS_PER_CALL {
            let Some((&byte, rest)) = self.data.split_first() else {
                return;
            };
            self.bit_buf |= (byte as u64) << (56 - self.bits_in_buf);
            self.bits_in_buf += 8;
            self.data = rest;
        }
    }
}
