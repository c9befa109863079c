use sc_core::Image;
use serde::{Deserialize, Serialize};

use crate::{Generator, PatternError, PatternGrid, PatternParams};

/// Unnormalized 2-D Gaussian with peak 1 at the origin.
///
/// A zero sigma on either axis yields 0 everywhere.
pub fn gaussian(x: f64, y: f64, xsigma: f64, ysigma: f64) -> f64 {
    if xsigma == 0.0 || ysigma == 0.0 {
        return 0.0;
    }
    let xw = x / xsigma;
    let yh = y / ysigma;
    (-0.5 * xw * xw - 0.5 * yh * yh).exp()
}

/// Elliptical Gaussian.
///
/// `size` is twice the standard deviation along the pattern's y axis; the
/// x-axis standard deviation is `aspect_ratio` times that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gaussian {
    #[serde(flatten)]
    pub params: PatternParams,
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: f64,
}

fn default_aspect_ratio() -> f64 {
    1.0 / 0.31
}

impl Default for Gaussian {
    fn default() -> Self {
        Self {
            params: PatternParams::with_size(0.155),
            aspect_ratio: default_aspect_ratio(),
        }
    }
}

impl Gaussian {
    pub fn new(size: f64, aspect_ratio: f64) -> Self {
        Self {
            params: PatternParams::with_size(size),
            aspect_ratio,
        }
    }

    /// Circular Gaussian with standard deviation `size / 2`.
    pub fn isotropic(size: f64) -> Self {
        Self::new(size, 1.0)
    }
}

impl Generator for Gaussian {
    fn params(&self) -> &PatternParams {
        &self.params
    }

    fn params_mut(&mut self) -> &mut PatternParams {
        &mut self.params
    }

    fn function(
        &self,
        grid: &PatternGrid,
        params: &PatternParams,
    ) -> Result<Image<f64>, PatternError> {
        let height = params.size / 2.0;
        let width = self.aspect_ratio * height;
        let (rows, cols) = grid.shape();
        let (px, py) = (grid.pattern_x().data(), grid.pattern_y().data());

        Ok(Image::from_fn(cols, rows, |c, r| {
            let i = r * cols + c;
            gaussian(px[i], py[i], width, height)
        }))
    }
}
