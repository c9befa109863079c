use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use image::GrayImage;
use sc_core::{BoundingBox, Image, SheetCoordinateSystem};
use sc_pattern::{Gaussian, Generator, Pattern};
use sc_transfer::{Convolve, InitContext, TransferFn};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sc_gallery")]
#[command(about = "Run sheet-convolve kernels on PNG fixtures")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convolve a grayscale image with a kernel sized in sheet units
    #[command(name = "blur")]
    Blur(BlurArgs),
    /// Render the zero-padded kernel for a sheet without an input image
    #[command(name = "kernel")]
    Kernel(KernelArgs),
}

#[derive(Args, Debug, Clone)]
struct SheetArgs {
    /// Samples per sheet unit along x
    #[arg(long, default_value_t = 256.0)]
    xdensity: f64,
    /// Samples per sheet unit along y (defaults to xdensity)
    #[arg(long)]
    ydensity: Option<f64>,
}

#[derive(Args, Debug, Clone)]
struct KernelSpecArgs {
    /// Gaussian size in sheet units (ignored with --kernel)
    #[arg(long, default_value_t = 0.05)]
    size: f64,
    /// Gaussian aspect ratio (ignored with --kernel)
    #[arg(long, default_value_t = 1.0)]
    aspect_ratio: f64,
    /// JSON file holding any kernel pattern, e.g. {"kind": "gaussian", "size": 0.05}
    #[arg(long)]
    kernel: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct BlurArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, default_value = "docs/fig/raw")]
    out: PathBuf,
    #[command(flatten)]
    sheet: SheetArgs,
    #[command(flatten)]
    spec: KernelSpecArgs,
}

#[derive(Args, Debug, Clone)]
struct KernelArgs {
    #[arg(long, default_value_t = 256)]
    width: usize,
    #[arg(long, default_value_t = 256)]
    height: usize,
    #[arg(long, default_value = "docs/fig/raw")]
    out: PathBuf,
    #[command(flatten)]
    sheet: SheetArgs,
    #[command(flatten)]
    spec: KernelSpecArgs,
}

#[derive(Debug, Clone, Serialize)]
struct SheetDto {
    bounds: [f64; 4],
    xdensity: f64,
    ydensity: f64,
    rows: usize,
    cols: usize,
}

#[derive(Debug, Clone, Serialize)]
struct MetaBlur {
    sheet: SheetDto,
    kernel: Pattern,
    kernel_mass: f64,
    sum_before: f64,
    sum_after: f64,
    boundary: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct MetaKernel {
    sheet: SheetDto,
    kernel: Pattern,
    kernel_mass: f64,
    peak: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Blur(args) => run_blur(args),
        Command::Kernel(args) => run_kernel(args),
    }
}

fn run_blur(args: BlurArgs) -> Result<()> {
    ensure_file_exists(&args.input, "input")?;
    let case_dir = prepare_out_dir(&args.out, "blur")?;

    let mut field = load_input_f64(&args.input)?;
    let scs = sheet_for(field.width(), field.height(), &args.sheet)?;
    if scs.shape() != field.shape() {
        bail!(
            "sheet shape {:?} does not match image shape {:?}.",
            scs.shape(),
            field.shape()
        );
    }

    let pattern = load_kernel(&args.spec)?;
    let mut conv = Convolve::new(pattern.clone());
    conv.initialize(&InitContext::new().with_scs(scs))
        .context("preparing convolution kernel")?;
    let prepared = conv
        .prepared()
        .context("kernel missing after initialization")?;
    let kernel_mass = prepared.mass();
    save_luma_raw(
        case_dir.join("kernel.png"),
        prepared.array().width(),
        prepared.array().height(),
        f64_to_u8_vis(prepared.array().data()),
    )?;

    let sum_before = field.sum();
    conv.apply(&mut field).context("convolving input")?;
    let sum_after = field.sum();
    info!(sum_before, sum_after, kernel_mass, "convolved input");

    save_luma_raw(
        case_dir.join("blurred.png"),
        field.width(),
        field.height(),
        unit_to_u8(field.data()),
    )?;
    write_json(
        case_dir.join("meta.json"),
        &MetaBlur {
            sheet: sheet_dto(&scs),
            kernel: pattern,
            kernel_mass,
            sum_before,
            sum_after,
            boundary: "circular",
        },
    )?;

    Ok(())
}

fn run_kernel(args: KernelArgs) -> Result<()> {
    let case_dir = prepare_out_dir(&args.out, "kernel")?;
    let scs = sheet_for(args.width, args.height, &args.sheet)?;
    let pattern = load_kernel(&args.spec)?;

    let mut conv = Convolve::new(pattern.clone());
    let kernel = conv.prepare(&scs).context("preparing convolution kernel")?;
    let peak = kernel.data().iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let kernel_mass = kernel.sum();
    info!(rows = scs.shape().0, cols = scs.shape().1, kernel_mass, peak, "rendered kernel");

    save_luma_raw(
        case_dir.join("kernel.png"),
        kernel.width(),
        kernel.height(),
        f64_to_u8_vis(kernel.data()),
    )?;
    write_json(
        case_dir.join("meta.json"),
        &MetaKernel {
            sheet: sheet_dto(&scs),
            kernel: pattern,
            kernel_mass,
            peak,
        },
    )?;

    Ok(())
}

/// Sheet centred on the origin whose grid has exactly `width x height` pixels.
fn sheet_for(width: usize, height: usize, args: &SheetArgs) -> Result<SheetCoordinateSystem> {
    let xdensity = args.xdensity;
    let ydensity = args.ydensity.unwrap_or(xdensity);
    if !(xdensity > 0.0 && ydensity > 0.0) {
        bail!("densities must be > 0, got x={xdensity}, y={ydensity}.");
    }

    let half_w = width as f64 / (2.0 * xdensity);
    let half_h = height as f64 / (2.0 * ydensity);
    let bounds = BoundingBox::new(-half_w, -half_h, half_w, half_h)
        .with_context(|| format!("building bounds for a {width}x{height} sheet"))?;
    SheetCoordinateSystem::new(bounds, xdensity, ydensity)
        .context("building sheet coordinate system")
}

fn load_kernel(spec: &KernelSpecArgs) -> Result<Pattern> {
    let pattern = match &spec.kernel {
        Some(path) => {
            ensure_file_exists(path, "kernel")?;
            let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_slice(&data)
                .with_context(|| format!("parsing kernel pattern json {}", path.display()))?
        }
        None => Pattern::from(Gaussian::new(spec.size, spec.aspect_ratio)),
    };
    info!(
        kind = pattern.kind(),
        size = pattern.params().size,
        "kernel pattern"
    );
    Ok(pattern)
}

fn sheet_dto(scs: &SheetCoordinateSystem) -> SheetDto {
    let (rows, cols) = scs.shape();
    SheetDto {
        bounds: scs.bounds().into(),
        xdensity: scs.xdensity(),
        ydensity: scs.ydensity(),
        rows,
        cols,
    }
}

fn prepare_out_dir(out: &Path, case_name: &str) -> Result<PathBuf> {
    let case_dir = out.join(case_name);
    fs::create_dir_all(&case_dir)
        .with_context(|| format!("creating output directory {}", case_dir.display()))?;
    Ok(case_dir)
}

/// Grayscale image as a field in `[0, 1]`.
fn load_input_f64(path: &Path) -> Result<Image<f64>> {
    let dyn_img =
        image::open(path).with_context(|| format!("opening input image {}", path.display()))?;
    let luma = dyn_img.to_luma8();
    let (w, h) = luma.dimensions();
    let data = luma.into_raw().into_iter().map(|v| v as f64 / 255.0).collect();

    Image::from_vec(w as usize, h as usize, data)
        .with_context(|| format!("constructing field from {}", path.display()))
}

fn save_luma_raw(path: PathBuf, width: usize, height: usize, data: Vec<u8>) -> Result<()> {
    let gray = GrayImage::from_raw(width as u32, height as u32, data)
        .context("constructing GrayImage from raw bytes")?;
    gray.save(&path)
        .with_context(|| format!("saving image {}", path.display()))
}

fn unit_to_u8(data: &[f64]) -> Vec<u8> {
    data.iter()
        .map(|&v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
        .collect()
}

/// Min-max stretch to the full `u8` range.
fn f64_to_u8_vis(data: &[f64]) -> Vec<u8> {
    if data.is_empty() {
        return Vec::new();
    }

    let (min_v, max_v) = data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if (max_v - min_v).abs() < 1e-12 {
        return vec![0u8; data.len()];
    }

    let scale = 255.0 / (max_v - min_v);
    data.iter()
        .map(|&v| ((v - min_v) * scale).round().clamp(0.0, 255.0) as u8)
        .collect()
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}
