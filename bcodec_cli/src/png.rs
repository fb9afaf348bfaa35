// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::{BufRead, Seek, Write};

use bcodec::api::RgbImage;
use color_eyre::eyre::{Result, eyre};

/// Decodes a PNG into 8-bit RGB. Alpha is dropped and gray is replicated.
pub fn from_png<R: BufRead + Seek>(input: R) -> Result<RgbImage> {
    let mut decoder = png::Decoder::new(input);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let (width, height) = {
        let info = reader.info();
        (info.width as usize, info.height as usize)
    };
    let (color_type, bit_depth) = reader.output_color_type();
    if bit_depth != png::BitDepth::Eight {
        return Err(eyre!("Unsupported PNG bit depth {:?}", bit_depth));
    }
    let samples = color_type.samples();
    let mut buf = vec![0; width * height * samples];
    reader.next_frame(&mut buf)?;

    let rgb: Vec<u8> = match color_type {
        png::ColorType::Rgb => buf,
        png::ColorType::Rgba => buf
            .chunks_exact(4)
            .flat_map(|p| [p[0], p[1], p[2]])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&g| [g, g, g]).collect(),
        png::ColorType::GrayscaleAlpha => buf.chunks_exact(2).flat_map(|p| [p[0]; 3]).collect(),
        png::ColorType::Indexed => {
            return Err(eyre!("Palette was not expanded"));
        }
    };
    Ok(RgbImage::from_raw(width, height, rgb)?)
}

pub fn to_png<W: Write>(image: &RgbImage, out: W) -> Result<()> {
    let mut encoder = png::Encoder::new(out, image.width() as u32, image.height() as u32);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Fast);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())?;
    writer.finish()?;
    Ok(())
}
