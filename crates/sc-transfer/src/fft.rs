//! 2-D discrete Fourier transforms over row-major buffers, plus the cyclic
//! shift used to recentre circular convolutions.

use core::fmt;
use std::sync::Arc;

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use sc_core::Image;

/// Planned forward and inverse 2-D transforms for one `(rows, cols)` shape.
///
/// The inverse is scaled by `1 / (rows * cols)`, so `inverse(forward(x))`
/// reproduces `x`.
#[derive(Clone)]
pub struct Fft2 {
    rows: usize,
    cols: usize,
    row_fwd: Arc<dyn Fft<f64>>,
    row_inv: Arc<dyn Fft<f64>>,
    col_fwd: Arc<dyn Fft<f64>>,
    col_inv: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for Fft2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fft2")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .finish_non_exhaustive()
    }
}

impl Fft2 {
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "fft shape must be non-empty");

        let mut planner = FftPlanner::<f64>::new();
        Self {
            rows,
            cols,
            row_fwd: planner.plan_fft_forward(cols),
            row_inv: planner.plan_fft_inverse(cols),
            col_fwd: planner.plan_fft_forward(rows),
            col_inv: planner.plan_fft_inverse(rows),
        }
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Spectrum of a real image with this plan's shape.
    pub fn forward_real(&self, img: &Image<f64>) -> Vec<Complex64> {
        assert_eq!(img.shape(), self.shape(), "image shape must match plan");
        let mut buf: Vec<Complex64> = img
            .data()
            .iter()
            .map(|&v| Complex64::new(v, 0.0))
            .collect();
        self.forward(&mut buf);
        buf
    }

    pub fn forward(&self, buf: &mut [Complex64]) {
        self.process(buf, &self.row_fwd, &self.col_fwd);
    }

    pub fn inverse(&self, buf: &mut [Complex64]) {
        self.process(buf, &self.row_inv, &self.col_inv);
        let scale = 1.0 / (self.rows * self.cols) as f64;
        for v in buf.iter_mut() {
            *v *= scale;
        }
    }

    fn process(
        &self,
        buf: &mut [Complex64],
        row_fft: &Arc<dyn Fft<f64>>,
        col_fft: &Arc<dyn Fft<f64>>,
    ) {
        assert_eq!(buf.len(), self.rows * self.cols, "buffer length must match plan");

        // Rows are contiguous; rustfft transforms every `cols`-sized chunk.
        row_fft.process(buf);

        let mut cols_major = vec![Complex64::new(0.0, 0.0); buf.len()];
        transpose(buf, &mut cols_major, self.rows, self.cols);
        col_fft.process(&mut cols_major);
        transpose(&cols_major, buf, self.cols, self.rows);
    }
}

fn transpose(src: &[Complex64], dst: &mut [Complex64], rows: usize, cols: usize) {
    for r in 0..rows {
        for c in 0..cols {
            dst[c * rows + r] = src[r * cols + c];
        }
    }
}

/// Cyclic shift: element `(r, c)` moves to
/// `((r + shift_rows) mod rows, (c + shift_cols) mod cols)`.
pub fn roll<T: Copy>(img: &Image<T>, shift_rows: isize, shift_cols: isize) -> Image<T> {
    let (rows, cols) = img.shape();
    if rows == 0 || cols == 0 {
        return img.clone();
    }

    Image::from_fn(cols, rows, |c, r| {
        let src_r = (r as isize - shift_rows).rem_euclid(rows as isize) as usize;
        let src_c = (c as isize - shift_cols).rem_euclid(cols as isize) as usize;
        img.data()[src_r * cols + src_c]
    })
}
