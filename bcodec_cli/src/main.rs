// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use bcodec::api::{
    CompressionOptions, DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY, TransformKind, compress,
    decompress_to_rgb,
};
use bcodec_cli::{container, png};
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum Transform {
    /// Cached cosine matrix
    #[default]
    Direct,
    /// Radix-2 FFT
    Fft,
}

impl From<Transform> for TransformKind {
    fn from(transform: Transform) -> Self {
        match transform {
            Transform::Direct => TransformKind::Direct,
            Transform::Fft => TransformKind::Fft,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Compress a PNG image
    Compress {
        /// Input PNG file
        input: PathBuf,

        /// Output compressed file
        output: PathBuf,

        /// Quality, higher keeps more detail
        #[clap(long, short, default_value_t = DEFAULT_QUALITY,
               value_parser = clap::value_parser!(u32).range(MIN_QUALITY as i64..=MAX_QUALITY as i64))]
        quality: u32,

        #[clap(long, short, value_enum, default_value_t)]
        transform: Transform,
    },
    /// Decompress to a PNG image
    Decompress {
        /// Input compressed file
        input: PathBuf,

        /// Output PNG file
        output: PathBuf,

        #[clap(long, short, value_enum, default_value_t)]
        transform: Transform,
    },
}

#[derive(Parser)]
#[clap(version, about = "Block DCT image compressor")]
struct Opt {
    #[clap(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    #[cfg(feature = "tracing-subscriber")]
    {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(EnvFilter::from_default_env())
            .init();
    }

    let opt = Opt::parse();
    match opt.command {
        Command::Compress {
            input,
            output,
            quality,
            transform,
        } => {
            let file = fs::File::open(&input)
                .wrap_err_with(|| format!("Cannot open {}", input.display()))?;
            let mut image = png::from_png(BufReader::new(file))?;
            let options = CompressionOptions {
                quality,
                transform: transform.into(),
            };

            let start = Instant::now();
            let compressed = compress(&mut image, &options)?;
            let elapsed = start.elapsed();

            let mut out = BufWriter::new(
                fs::File::create(&output)
                    .wrap_err_with(|| format!("Cannot create {}", output.display()))?,
            );
            container::write(&compressed, &mut out)?;
            out.flush()?;
            println!(
                "Compressed {}x{} image to {} bytes in {:.3} ms ({} transform, quality {})",
                compressed.width,
                compressed.height,
                compressed.compressed_bytes.len(),
                elapsed.as_secs_f64() * 1000.0,
                options.transform.name(),
                quality,
            );
        }
        Command::Decompress {
            input,
            output,
            transform,
        } => {
            let file = fs::File::open(&input)
                .wrap_err_with(|| format!("Cannot open {}", input.display()))?;
            let compressed = container::read(&mut BufReader::new(file))?;

            let start = Instant::now();
            let image = decompress_to_rgb(&compressed, transform.into())?;
            let elapsed = start.elapsed();

            let out = BufWriter::new(
                fs::File::create(&output)
                    .wrap_err_with(|| format!("Cannot create {}", output.display()))?,
            );
            png::to_png(&image, out)?;
            println!(
                "Decompressed {}x{} image in {:.3} ms",
                image.width(),
                image.height(),
                elapsed.as_secs_f64() * 1000.0,
            );
        }
    }
    Ok(())
}
