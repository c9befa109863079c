use sc_core::{BoundingBox, Image, SheetCoordinateSystem};

use crate::{PatternError, PatternParams};

/// Pixel-centre coordinates of a grid, translated and rotated into a
/// pattern's own frame.
#[derive(Debug, Clone)]
pub struct PatternGrid {
    scs: SheetCoordinateSystem,
    pattern_x: Image<f64>,
    pattern_y: Image<f64>,
}

impl PatternGrid {
    pub fn new(params: &PatternParams) -> Result<Self, PatternError> {
        let scs = SheetCoordinateSystem::new(params.bounds, params.xdensity, params.ydensity)?;
        let (rows, cols) = scs.shape();
        let (xs, ys) = scs.sheetcoordinates_of_matrixidx();

        let (sin_o, cos_o) = params.orientation.sin_cos();
        let pattern_x = Image::from_fn(cols, rows, |c, r| {
            let (x, y) = (xs[c] - params.x, ys[r] - params.y);
            sin_o * y + cos_o * x
        });
        let pattern_y = Image::from_fn(cols, rows, |c, r| {
            let (x, y) = (xs[c] - params.x, ys[r] - params.y);
            cos_o * y - sin_o * x
        });

        Ok(Self {
            scs,
            pattern_x,
            pattern_y,
        })
    }

    pub fn scs(&self) -> &SheetCoordinateSystem {
        &self.scs
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.scs.shape()
    }

    pub fn pattern_x(&self) -> &Image<f64> {
        &self.pattern_x
    }

    pub fn pattern_y(&self) -> &Image<f64> {
        &self.pattern_y
    }
}

/// Capability shared by every shape: evaluate on a coordinate grid.
pub trait Generator {
    fn params(&self) -> &PatternParams;

    fn params_mut(&mut self) -> &mut PatternParams;

    /// Unscaled shape values on `grid`. `params` are the effective
    /// parameters of this rendering, which may differ from `self.params()`
    /// when a parent overrides them.
    fn function(&self, grid: &PatternGrid, params: &PatternParams)
    -> Result<Image<f64>, PatternError>;

    /// Renders with explicit effective parameters.
    fn rasterize(&self, params: &PatternParams) -> Result<Image<f64>, PatternError> {
        let grid = PatternGrid::new(params)?;
        let raw = self.function(&grid, params)?;
        Ok(raw.map(|&v| params.scale * v + params.offset))
    }

    /// Renders onto the pattern's own bounds and densities.
    fn render(&self) -> Result<Image<f64>, PatternError> {
        self.rasterize(self.params())
    }

    /// Re-targets the grid this pattern renders onto.
    fn set_matrix_dimensions(&mut self, bounds: BoundingBox, xdensity: f64, ydensity: f64) {
        let p = self.params_mut();
        p.bounds = bounds;
        p.xdensity = xdensity;
        p.ydensity = ydensity;
    }
}
