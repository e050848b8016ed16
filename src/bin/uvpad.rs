use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context as _;
use clap::Parser;
use image::{DynamicImage, ImageFormat, RgbaImage};
use ndarray::Array3;
use tracing::Level;
use uvpad_rust::{pad_rgba_with_progress, Algorithm, PadOptions};

/// Texture dilating tool.
#[derive(Parser, Debug)]
#[command(name = "uvpad", version)]
struct Cli {
    /// Input image.
    input: PathBuf,

    /// Output image file (default: `<input>_padded.<ext>`).
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Use iterative neighbor averaging instead of jump flooding.
    #[arg(long, default_value_t = false, conflicts_with = "algorithm")]
    slower: bool,

    /// Padding algorithm: `jump_flood` or `iterative`.
    #[arg(long)]
    algorithm: Option<Algorithm>,

    /// Override jump flood worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Log every pass.
    #[arg(long, short, default_value_t = false, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(long, short, default_value_t = false)]
    quiet: bool,
}

impl Cli {
    fn options(&self) -> PadOptions {
        let algorithm = match (self.slower, self.algorithm) {
            (true, _) => Algorithm::IterativeAverage,
            (false, Some(algorithm)) => algorithm,
            (false, None) => Algorithm::default(),
        };
        PadOptions {
            algorithm,
            threads: self.threads,
        }
    }

    fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::WARN
        } else {
            Level::INFO
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));

    let start = Instant::now();
    run(&cli.input, &output, &cli.options())?;

    println!("Execution time: {:?}", start.elapsed());
    println!("Saved padded image to {}", output.display());
    Ok(())
}

fn run(input: &Path, output: &Path, options: &PadOptions) -> anyhow::Result<()> {
    let rgba = image::open(input)
        .with_context(|| format!("open input image '{}'", input.display()))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels = Array3::from_shape_vec((height as usize, width as usize, 4), rgba.into_raw())
        .context("decoded image has unexpected buffer size")?;

    tracing::info!(width, height, algorithm = %options.algorithm, "padding");
    let padded = pad_rgba_with_progress(pixels.view(), options, &mut |p| {
        tracing::info!(
            pass = p.pass,
            remaining = p.remaining(),
            "progress {:.1}%",
            p.fraction() * 100.0
        );
    })?;

    let (raw, _) = padded.image.into_raw_vec_and_offset();
    let buffer = RgbaImage::from_raw(width, height, raw)
        .context("padded image has unexpected buffer size")?;

    save(output, buffer)
}

fn save(output: &Path, buffer: RgbaImage) -> anyhow::Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let format = ImageFormat::from_path(output).unwrap_or(ImageFormat::Png);
    let image = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(buffer).to_rgb8()),
        _ => DynamicImage::ImageRgba8(buffer),
    };
    image
        .save_with_format(output, format)
        .with_context(|| format!("write output image '{}'", output.display()))
}

/// `dir/name.ext` -> `dir/name_padded.ext`.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}_padded.{}", ext.to_string_lossy()),
        None => format!("{stem}_padded"),
    };
    input.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("tex/albedo.png")),
            PathBuf::from("tex/albedo_padded.png")
        );
        assert_eq!(
            default_output_path(Path::new("albedo")),
            PathBuf::from("albedo_padded")
        );
    }

    #[test]
    fn test_slower_selects_iterative() {
        let cli = Cli::parse_from(["uvpad", "in.png", "--slower"]);
        assert_eq!(cli.options().algorithm, Algorithm::IterativeAverage);

        let cli = Cli::parse_from(["uvpad", "in.png", "--algorithm", "iterative", "--threads", "2"]);
        assert_eq!(cli.options().algorithm, Algorithm::IterativeAverage);
        assert_eq!(cli.options().threads, Some(2));

        let cli = Cli::parse_from(["uvpad", "in.png"]);
        assert_eq!(cli.options(), PadOptions::default());
    }

    #[test]
    fn test_slower_conflicts_with_algorithm() {
        let err = Cli::try_parse_from(["uvpad", "in.png", "--slower", "--algorithm", "jfp"]);
        assert!(err.is_err());
    }
}
