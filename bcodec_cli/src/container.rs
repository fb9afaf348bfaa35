// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! On-disk format for a [`CompressedImage`].
//!
//! All integers are little endian:
//!
//! ```text
//! "BCZ1"
//! u32 quality, u32 width, u32 height
//! u64 bits_count
//! u64 byte count, followed by the coefficient bytes
//! u16 table entries, each: u8 symbol, u8 code length, u64 code bits
//! ```

use std::io::{Read, Write};

use bcodec::api::{CompressedImage, DecodeTable, HuffmanCode};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use color_eyre::eyre::{Result, WrapErr, eyre};

pub const MAGIC: &[u8; 4] = b"BCZ1";

pub fn write<W: Write>(image: &CompressedImage, out: &mut W) -> Result<()> {
    out.write_all(MAGIC)?;
    out.write_u32::<LittleEndian>(image.quality)?;
    out.write_u32::<LittleEndian>(u32::try_from(image.width).wrap_err("image too wide")?)?;
    out.write_u32::<LittleEndian>(u32::try_from(image.height).wrap_err("image too tall")?)?;
    out.write_u64::<LittleEndian>(image.bits_count)?;
    out.write_u64::<LittleEndian>(image.compressed_bytes.len() as u64)?;
    out.write_all(&image.compressed_bytes)?;

    // Sorted so that the same image always serializes to the same bytes.
    let mut entries: Vec<(HuffmanCode, u8)> = image.decode_table.iter().collect();
    entries.sort();
    out.write_u16::<LittleEndian>(entries.len() as u16)?;
    for (code, symbol) in entries {
        out.write_u8(symbol)?;
        out.write_u8(code.length as u8)?;
        out.write_u64::<LittleEndian>(code.bits)?;
    }
    Ok(())
}

pub fn read<R: Read>(input: &mut R) -> Result<CompressedImage> {
    let mut magic = [0u8; 4];
    input.read_exact(&mut magic).wrap_err("reading signature")?;
    if &magic != MAGIC {
        return Err(eyre!("Not a compressed image: bad signature {:?}", magic));
    }
    let quality = input.read_u32::<LittleEndian>()?;
    let width = input.read_u32::<LittleEndian>()? as usize;
    let height = input.read_u32::<LittleEndian>()? as usize;
    let bits_count = input.read_u64::<LittleEndian>()?;

    let len = input.read_u64::<LittleEndian>()?;
    let mut compressed_bytes = Vec::new();
    input.take(len).read_to_end(&mut compressed_bytes)?;
    if compressed_bytes.len() as u64 != len {
        return Err(eyre!(
            "Truncated file: expected {} data bytes, found {}",
            len,
            compressed_bytes.len()
        ));
    }

    let num_entries = input.read_u16::<LittleEndian>()?;
    let mut entries = Vec::with_capacity(num_entries as usize);
    for _ in 0..num_entries {
        let symbol = input.read_u8()?;
        let length = input.read_u8()? as u32;
        let bits = input.read_u64::<LittleEndian>()?;
        entries.push((HuffmanCode::new(bits, length), symbol));
    }
    let decode_table = DecodeTable::try_from_entries(entries)?;

    Ok(CompressedImage {
        quality,
        compressed_bytes,
        bits_count,
        decode_table,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use bcodec::api::{CompressionOptions, RgbImage, compress};

    use super::*;

    fn sample() -> CompressedImage {
        let mut image = RgbImage::new(24, 16).unwrap();
        for y in 0..16 {
            for x in 0..24 {
                image.set_pixel(x, y, [(x * 10) as u8, (y * 15) as u8, 90]);
            }
        }
        compress(&mut image, &CompressionOptions::default()).unwrap()
    }

    #[test]
    fn write_then_read() {
        let image = sample();
        let mut buf = Vec::new();
        write(&image, &mut buf).unwrap();
        assert_eq!(&buf[..4], MAGIC);
        assert_eq!(read(&mut buf.as_slice()).unwrap(), image);
    }

    #[test]
    fn layout() {
        let mut buf = Vec::new();
        let image = CompressedImage {
            quality: 42,
            compressed_bytes: vec![0xE0],
            bits_count: 4,
            decode_table: DecodeTable::try_from_entries([
                (HuffmanCode::new(1, 1), 0),
                (HuffmanCode::new(0, 1), 1),
            ])
            .unwrap(),
            width: 8,
            height: 16,
        };
        write(&image, &mut buf).unwrap();
        #[rustfmt::skip]
        let expected: Vec<u8> = [
            &b"BCZ1"[..],
            &[42, 0, 0, 0], &[8, 0, 0, 0], &[16, 0, 0, 0],
            &[4, 0, 0, 0, 0, 0, 0, 0],
            &[1, 0, 0, 0, 0, 0, 0, 0], &[0xE0],
            &[2, 0],
            &[1, 1, 0, 0, 0, 0, 0, 0, 0, 0],
            &[0, 1, 1, 0, 0, 0, 0, 0, 0, 0],
        ]
        .concat();
        assert_eq!(buf, expected);
    }

    #[test]
    fn deterministic() {
        let image = sample();
        let (mut a, mut b) = (Vec::new(), Vec::new());
        write(&image, &mut a).unwrap();
        write(&image.clone(), &mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_bad_signature() {
        let mut buf = Vec::new();
        write(&sample(), &mut buf).unwrap();
        buf[0] = b'X';
        assert!(read(&mut buf.as_slice()).is_err());
    }

    #[test]
    fn rejects_truncated() {
        let mut buf = Vec::new();
        write(&sample(), &mut buf).unwrap();
        for len in [3, 20, 40, buf.len() - 1] {
            assert!(read(&mut &buf[..len]).is_err(), "length {len}");
        }
    }

    #[test]
    fn rejects_duplicate_codes() {
        let mut corrupted = Vec::new();
        let image = CompressedImage {
            decode_table: DecodeTable::default(),
            ..sample()
        };
        write(&image, &mut corrupted).unwrap();
        // Replace the empty table with two entries sharing one code.
        corrupted.truncate(corrupted.len() - 2);
        corrupted.extend_from_slice(&[2, 0]);
        corrupted.extend_from_slice(&[5, 3, 1, 0, 0, 0, 0, 0, 0, 0]);
        corrupted.extend_from_slice(&[6, 3, 1, 0, 0, 0, 0, 0, 0, 0]);
        assert!(read(&mut corrupted.as_slice()).is_err());
    }
}
