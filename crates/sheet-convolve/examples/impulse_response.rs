//! Example: impulse response of a sheet-sized Gaussian kernel.
//!
//! Places a unit impulse on a sheet, convolves it with an isotropic Gaussian
//! whose size is given in sheet units, and prints the response as JSON
//! together with the kernel mass and the field totals before and after.
//! Doubling `--density` doubles the response width in pixels while its width
//! in sheet units stays put.
//!
//! Run from the workspace root:
//!   cargo run -p sheet-convolve --example impulse_response -- --help
//!   RUST_LOG=debug cargo run -p sheet-convolve --example impulse_response

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use sheet_convolve::{
    BoundingBox, Convolve, Gaussian, Image, InitContext, SheetCoordinateSystem, TransferFn,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Print the impulse response of a sheet-sized Gaussian kernel")]
struct Args {
    /// Samples per sheet unit on both axes
    #[arg(long, default_value_t = 21.0)]
    density: f64,

    /// Gaussian size in sheet units (twice the standard deviation)
    #[arg(long, default_value_t = 0.1)]
    size: f64,

    /// Sheet x coordinate of the impulse
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    x: f64,

    /// Sheet y coordinate of the impulse
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    y: f64,
}

#[derive(Serialize)]
struct Report {
    rows: usize,
    cols: usize,
    impulse: [usize; 2],
    kernel_mass: f64,
    sum_before: f64,
    sum_after: f64,
    response: Vec<Vec<f64>>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let scs = SheetCoordinateSystem::isotropic(BoundingBox::default(), args.density)
        .context("building sheet coordinate system")?;
    let (rows, cols) = scs.shape();
    let (r0, c0) = scs
        .sheet2matrixidx(args.x, args.y)
        .with_context(|| format!("impulse ({}, {}) lies outside the sheet", args.x, args.y))?;

    let mut conv = Convolve::new(Gaussian::isotropic(args.size));
    conv.initialize(&InitContext::new().with_scs(scs))
        .context("preparing kernel")?;
    let kernel_mass = conv.prepared().map(|k| k.mass()).unwrap_or_default();

    let mut field = Image::zeros(cols, rows);
    if let Some(px) = field.get_mut(c0, r0) {
        *px = 1.0;
    }
    let sum_before = field.sum();
    conv.apply(&mut field).context("convolving impulse")?;

    let report = Report {
        rows,
        cols,
        impulse: [r0, c0],
        kernel_mass,
        sum_before,
        sum_after: field.sum(),
        response: (0..rows).map(|r| field.row(r).to_vec()).collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("serializing report")?
    );
    Ok(())
}
