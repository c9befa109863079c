use crate::{Axis, BoundingBox, Error};

/// Mapping between a continuous rectangle and a discrete pixel grid.
///
/// Shape is `(round(height * ydensity), round(width * xdensity))`. Only
/// [`SheetCoordinateSystem::new`] builds one, so every instance has finite
/// positive densities and at least one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetCoordinateSystem {
    bounds: BoundingBox,
    xdensity: f64,
    ydensity: f64,
    rows: usize,
    cols: usize,
}

impl SheetCoordinateSystem {
    pub fn new(bounds: BoundingBox, xdensity: f64, ydensity: f64) -> Result<Self, Error> {
        if !(xdensity.is_finite() && xdensity > 0.0) {
            return Err(Error::InvalidDensity {
                axis: Axis::X,
                value: xdensity,
            });
        }
        if !(ydensity.is_finite() && ydensity > 0.0) {
            return Err(Error::InvalidDensity {
                axis: Axis::Y,
                value: ydensity,
            });
        }

        let rows = (bounds.height() * ydensity).round();
        let cols = (bounds.width() * xdensity).round();
        if !(rows >= 1.0 && cols >= 1.0 && rows.is_finite() && cols.is_finite()) {
            return Err(Error::EmptyShape {
                rows: rows.max(0.0) as usize,
                cols: cols.max(0.0) as usize,
            });
        }

        Ok(Self {
            bounds,
            xdensity,
            ydensity,
            rows: rows as usize,
            cols: cols as usize,
        })
    }

    /// Same density on both axes.
    pub fn isotropic(bounds: BoundingBox, density: f64) -> Result<Self, Error> {
        Self::new(bounds, density, density)
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn xdensity(&self) -> f64 {
        self.xdensity
    }

    pub fn ydensity(&self) -> f64 {
        self.ydensity
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Continuous matrix coordinates `(row, col)` of a sheet point.
    pub fn sheet2matrix(&self, x: f64, y: f64) -> (f64, f64) {
        let col = (x - self.bounds.left()) * self.xdensity;
        let row = (self.bounds.top() - y) * self.ydensity;
        (row, col)
    }

    /// Index of the pixel containing a sheet point, `None` outside the grid.
    pub fn sheet2matrixidx(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let (row, col) = self.sheet2matrix(x, y);
        let (row, col) = (row.floor(), col.floor());
        if row < 0.0 || col < 0.0 || row >= self.rows as f64 || col >= self.cols as f64 {
            return None;
        }
        Some((row as usize, col as usize))
    }

    /// Sheet coordinates `(x, y)` of a pixel centre.
    pub fn matrixidx2sheet(&self, row: usize, col: usize) -> (f64, f64) {
        let x = self.bounds.left() + (col as f64 + 0.5) / self.xdensity;
        let y = self.bounds.top() - (row as f64 + 0.5) / self.ydensity;
        (x, y)
    }

    /// Centre x of every column and centre y of every row.
    pub fn sheetcoordinates_of_matrixidx(&self) -> (Vec<f64>, Vec<f64>) {
        let xs = (0..self.cols)
            .map(|c| self.matrixidx2sheet(0, c).0)
            .collect();
        let ys = (0..self.rows)
            .map(|r| self.matrixidx2sheet(r, 0).1)
            .collect();
        (xs, ys)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::SheetCoordinateSystem;
    use crate::{Axis, BoundingBox, Error};

    #[test]
    fn shape_follows_bounds_and_density() {
        let bb = BoundingBox::new(-1.0, -0.5, 1.0, 0.5).expect("valid bounds");
        let scs = SheetCoordinateSystem::new(bb, 10.0, 6.0).expect("valid scs");
        assert_eq!(scs.shape(), (6, 20));
    }

    #[test]
    fn rejects_bad_density_and_empty_grid() {
        let bb = BoundingBox::default();
        assert_eq!(
            SheetCoordinateSystem::new(bb, 0.0, 1.0),
            Err(Error::InvalidDensity {
                axis: Axis::X,
                value: 0.0
            })
        );
        assert!(matches!(
            SheetCoordinateSystem::new(bb, 4.0, f64::INFINITY),
            Err(Error::InvalidDensity { axis: Axis::Y, .. })
        ));
        assert!(matches!(
            SheetCoordinateSystem::new(bb, 0.2, 4.0),
            Err(Error::EmptyShape { .. })
        ));
    }

    #[test]
    fn pixel_centres_are_half_a_sample_inside() {
        let scs = SheetCoordinateSystem::isotropic(BoundingBox::default(), 4.0).expect("valid");
        let (xs, ys) = scs.sheetcoordinates_of_matrixidx();

        assert_eq!(xs, vec![-0.375, -0.125, 0.125, 0.375]);
        assert_eq!(ys, vec![0.375, 0.125, -0.125, -0.375]);
    }

    #[test]
    fn odd_grid_has_a_pixel_centred_on_the_origin() {
        let scs = SheetCoordinateSystem::isotropic(BoundingBox::default(), 11.0).expect("valid");
        let (x, y) = scs.matrixidx2sheet(5, 5);
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-12);
        assert_eq!(scs.sheet2matrixidx(0.0, 0.0), Some((5, 5)));
    }

    #[test]
    fn sheet2matrix_inverts_matrixidx2sheet() {
        let bb = BoundingBox::new(0.0, 0.0, 3.0, 2.0).expect("valid bounds");
        let scs = SheetCoordinateSystem::new(bb, 5.0, 7.0).expect("valid scs");

        for row in 0..scs.shape().0 {
            for col in 0..scs.shape().1 {
                let (x, y) = scs.matrixidx2sheet(row, col);
                let (rf, cf) = scs.sheet2matrix(x, y);
                assert_abs_diff_eq!(rf, row as f64 + 0.5, epsilon = 1e-9);
                assert_abs_diff_eq!(cf, col as f64 + 0.5, epsilon = 1e-9);
                assert_eq!(scs.sheet2matrixidx(x, y), Some((row, col)));
            }
        }

        assert_eq!(scs.sheet2matrixidx(-0.01, 1.0), None);
        assert_eq!(scs.sheet2matrixidx(1.0, 2.01), None);
    }
}
