//! Kernel convolution in sheet coordinates.
//!
//! The kernel's spatial extent is fixed in sheet units by its pattern's
//! `size`, independent of the field's bounds or resolution. Preparation
//! rasterizes it at the sheet's densities over the full sheet bounds
//! (centred on the sheet origin, zero elsewhere), so the kernel array and the
//! field always share a shape.
//!
//! Convolution is circular: values leaving one edge re-enter on the opposite
//! edge.

use num_complex::Complex64;
use sc_core::{Image, SheetCoordinateSystem};
use sc_pattern::{
    Composite, CompositeOperator, Constant, Gaussian, Generator, Pattern, PatternError,
};
use tracing::{debug, trace, warn};

use crate::fft::{Fft2, roll};
use crate::transfer::describe_keys;
use crate::{InitContext, InitKey, TransferError, TransferFn};

const INIT_KEYS: &[InitKey] = &[InitKey::Scs];

// Border energy above this fraction of the peak means the kernel wraps.
const WRAP_WARN_RATIO: f64 = 1e-3;

/// Rasterizes `pattern` at `scs` resolution, zero-padded to `scs` bounds.
///
/// The pattern is cloned and re-targeted to the sheet's densities while
/// keeping its own declared bounds; `pattern` itself is left untouched.
pub fn rasterize_kernel(
    pattern: &Pattern,
    scs: &SheetCoordinateSystem,
) -> Result<Image<f64>, TransferError> {
    let mut kernel = pattern.clone();
    let own_bounds = kernel.params().bounds;
    kernel.set_matrix_dimensions(own_bounds, scs.xdensity(), scs.ydensity());

    let mut background = Constant::new(0.0);
    background.set_matrix_dimensions(scs.bounds(), scs.xdensity(), scs.ydensity());

    let mut padded = Composite::new(vec![background.into(), kernel], CompositeOperator::Maximum);
    padded.set_matrix_dimensions(scs.bounds(), scs.xdensity(), scs.ydensity());

    padded.render().map_err(|e| match e {
        PatternError::Core(core) => TransferError::InvalidCoordinateSystem(core),
        other => TransferError::Pattern(other),
    })
}

/// A rasterized kernel ready to convolve fields of its shape.
#[derive(Debug, Clone)]
pub struct PreparedKernel {
    kernel: Image<f64>,
    spectrum: Vec<Complex64>,
    mass: f64,
    fft: Fft2,
}

impl PreparedKernel {
    /// Wraps an already rasterized kernel array.
    ///
    /// The array's element sum is the normalization mass; it must be finite
    /// and non-zero.
    pub fn from_array(kernel: Image<f64>) -> Result<Self, TransferError> {
        let mass = kernel.sum();
        if mass == 0.0 || !mass.is_finite() {
            return Err(TransferError::ZeroMassKernel { sum: mass });
        }

        let (rows, cols) = kernel.shape();
        let fft = Fft2::new(rows, cols);
        let spectrum = fft.forward_real(&kernel);

        Ok(Self {
            kernel,
            spectrum,
            mass,
            fft,
        })
    }

    pub fn array(&self) -> &Image<f64> {
        &self.kernel
    }

    /// Discrete sum of the kernel array.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.kernel.shape()
    }

    /// Convolves `field` in place.
    ///
    /// `field` must have the kernel's shape; on mismatch it is left as is.
    pub fn convolve(&self, field: &mut Image<f64>) -> Result<(), TransferError> {
        if field.shape() != self.shape() {
            return Err(TransferError::ShapeMismatch {
                kernel: self.shape(),
                field: field.shape(),
            });
        }
        let (rows, cols) = self.shape();
        trace!(rows, cols, "convolving field");

        let mut product = self.fft.forward_real(field);
        for (a, k) in product.iter_mut().zip(&self.spectrum) {
            *a *= k;
        }
        self.fft.inverse(&mut product);

        let raw = Image::from_fn(cols, rows, |c, r| product[r * cols + c].re);
        let centred = roll(&raw, -((rows / 2) as isize), -((cols / 2) as isize));

        for (dst, &v) in field.data_mut().iter_mut().zip(centred.data()) {
            *dst = v / self.mass;
        }
        Ok(())
    }
}

/// Preparation state of a [`Convolve`].
#[derive(Debug, Clone, Default)]
pub enum KernelState {
    #[default]
    Uninitialized,
    Ready(PreparedKernel),
}

/// Convolves fields with a kernel pattern sized in sheet units.
///
/// Must be initialized with the field's [`SheetCoordinateSystem`] (directly
/// through [`Convolve::prepare`] or via [`TransferFn::initialize`]) before
/// [`TransferFn::apply`].
#[derive(Debug, Clone)]
pub struct Convolve {
    kernel_pattern: Pattern,
    state: KernelState,
}

impl Default for Convolve {
    /// Isotropic Gaussian blur with `size = 0.05`.
    fn default() -> Self {
        Self::new(Gaussian::new(0.05, 1.0))
    }
}

impl Convolve {
    pub fn new(kernel_pattern: impl Into<Pattern>) -> Self {
        Self {
            kernel_pattern: kernel_pattern.into(),
            state: KernelState::Uninitialized,
        }
    }

    pub fn kernel_pattern(&self) -> &Pattern {
        &self.kernel_pattern
    }

    pub fn state(&self) -> &KernelState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, KernelState::Ready(_))
    }

    pub fn prepared(&self) -> Option<&PreparedKernel> {
        match &self.state {
            KernelState::Ready(k) => Some(k),
            KernelState::Uninitialized => None,
        }
    }

    pub fn kernel(&self) -> Option<&Image<f64>> {
        self.prepared().map(PreparedKernel::array)
    }

    /// Rasterizes the kernel for `scs` and stores it.
    ///
    /// On failure the previous state is kept.
    pub fn prepare(&mut self, scs: &SheetCoordinateSystem) -> Result<&Image<f64>, TransferError> {
        let array = rasterize_kernel(&self.kernel_pattern, scs)?;
        if let Some(ratio) = border_ratio(&array)
            && ratio > WRAP_WARN_RATIO
        {
            warn!(
                ratio,
                kind = self.kernel_pattern.kind(),
                "kernel does not decay to zero at the sheet edge; circular convolution will wrap"
            );
        }

        let prepared = PreparedKernel::from_array(array)?;
        let (rows, cols) = prepared.shape();
        debug!(
            rows,
            cols,
            mass = prepared.mass(),
            xdensity = scs.xdensity(),
            ydensity = scs.ydensity(),
            kind = self.kernel_pattern.kind(),
            "prepared convolution kernel"
        );

        self.state = KernelState::Ready(prepared);
        Ok(self.kernel().expect("kernel state was just set to ready"))
    }
}

impl TransferFn for Convolve {
    fn init_keys(&self) -> &[InitKey] {
        INIT_KEYS
    }

    fn initialize(&mut self, ctx: &InitContext) -> Result<(), TransferError> {
        ctx.require(INIT_KEYS)?;
        let scs = ctx
            .scs()
            .ok_or(TransferError::MissingInitKey(InitKey::Scs))?;
        self.prepare(scs)?;
        Ok(())
    }

    fn apply(&mut self, field: &mut Image<f64>) -> Result<(), TransferError> {
        match &self.state {
            KernelState::Ready(kernel) => kernel.convolve(field),
            KernelState::Uninitialized => Err(TransferError::NotInitialized {
                keys: describe_keys(INIT_KEYS),
            }),
        }
    }
}

/// Largest edge magnitude relative to the largest magnitude overall.
fn border_ratio(kernel: &Image<f64>) -> Option<f64> {
    let (rows, cols) = kernel.shape();
    let peak = kernel.data().iter().fold(0.0f64, |m, &v| m.max(v.abs()));
    if rows < 3 || cols < 3 || peak == 0.0 {
        return None;
    }

    let mut edge = 0.0f64;
    for &v in kernel.row(0).iter().chain(kernel.row(rows - 1)) {
        edge = edge.max(v.abs());
    }
    for r in 1..rows - 1 {
        let row = kernel.row(r);
        edge = edge.max(row[0].abs()).max(row[cols - 1].abs());
    }
    Some(edge / peak)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use sc_core::{BoundingBox, Image, SheetCoordinateSystem};
    use sc_pattern::{Constant, Gaussian, Generator, Pattern};

    use super::{Convolve, KernelState, PreparedKernel, border_ratio, rasterize_kernel};
    use crate::{InitContext, InitKey, TransferError, TransferFn};

    fn scs(density: f64) -> SheetCoordinateSystem {
        SheetCoordinateSystem::isotropic(BoundingBox::default(), density).expect("valid scs")
    }

    fn impulse(cols: usize, rows: usize, c0: usize, r0: usize) -> Image<f64> {
        let mut img = Image::zeros(cols, rows);
        *img.get_mut(c0, r0).expect("in bounds") = 1.0;
        img
    }

    fn ramp(cols: usize, rows: usize) -> Image<f64> {
        Image::from_fn(cols, rows, |x, y| ((x * 13 + y * 7) % 17) as f64 * 0.25)
    }

    #[test]
    fn kernel_matches_sheet_shape_and_peaks_at_the_origin() {
        let mut conv = Convolve::new(Gaussian::isotropic(0.1));
        let kernel = conv.prepare(&scs(21.0)).expect("prepares").clone();

        assert_eq!(kernel.shape(), (21, 21));
        let peak = *kernel.get(10, 10).expect("in bounds");
        assert_abs_diff_eq!(peak, 1.0, epsilon = 1e-12);
        assert!(kernel.data().iter().all(|&v| (0.0..=peak).contains(&v)));
        assert!(conv.is_ready());
    }

    #[test]
    fn kernel_size_is_absolute_in_sheet_units() {
        let pattern = Pattern::from(Gaussian::isotropic(0.2));
        let small = SheetCoordinateSystem::isotropic(BoundingBox::default(), 10.0).expect("valid");
        let large = SheetCoordinateSystem::isotropic(
            BoundingBox::from_radius(1.0).expect("valid"),
            10.0,
        )
        .expect("valid");

        let k_small = rasterize_kernel(&pattern, &small).expect("rasterizes");
        let k_large = rasterize_kernel(&pattern, &large).expect("rasterizes");

        assert_eq!(k_small.shape(), (10, 10));
        assert_eq!(k_large.shape(), (20, 20));
        // Same pixel offsets from the origin carry the same value.
        for r in 0..10 {
            for c in 0..10 {
                let a = *k_small.get(c, r).expect("in bounds");
                let b = *k_large.get(c + 5, r + 5).expect("in bounds");
                assert_abs_diff_eq!(a, b, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn kernel_pattern_is_not_retargeted() {
        let pattern = Pattern::from(Gaussian::isotropic(0.05));
        let before = pattern.clone();
        let mut conv = Convolve::new(pattern.clone());
        conv.prepare(&scs(32.0)).expect("prepares");

        assert_eq!(conv.kernel_pattern(), &before);
        assert_eq!(conv.kernel_pattern().params().xdensity, 256.0);
    }

    #[test]
    fn mutating_the_callers_pattern_does_not_change_the_kernel() {
        let mut pattern = Gaussian::isotropic(0.1);
        let mut conv = Convolve::new(pattern.clone());
        let kernel = conv.prepare(&scs(15.0)).expect("prepares").clone();

        pattern.params.size = 0.4;
        pattern.set_matrix_dimensions(BoundingBox::from_radius(3.0).expect("valid"), 1.0, 1.0);
        assert_eq!(conv.kernel(), Some(&kernel));
    }

    #[test]
    fn apply_before_initialization_fails_without_touching_the_field() {
        let mut conv = Convolve::default();
        let mut field = ramp(6, 4);
        let before = field.clone();

        let err = conv.apply(&mut field).unwrap_err();
        assert_eq!(
            err,
            TransferError::NotInitialized {
                keys: "SCS".to_owned()
            }
        );
        assert_eq!(
            err.to_string(),
            "transfer function has not been initialized with SCS"
        );
        assert_eq!(field, before);
        assert!(matches!(conv.state(), KernelState::Uninitialized));
    }

    #[test]
    fn initialize_requires_a_coordinate_system() {
        let mut conv = Convolve::default();
        assert_eq!(conv.init_keys(), &[InitKey::Scs]);
        assert_eq!(
            conv.initialize(&InitContext::new()),
            Err(TransferError::MissingInitKey(InitKey::Scs))
        );
        assert!(!conv.is_ready());

        conv.initialize(&InitContext::new().with_scs(scs(16.0)))
            .expect("initializes");
        assert_eq!(conv.kernel().map(Image::shape), Some((16, 16)));
    }

    #[test]
    fn shape_mismatch_is_reported_and_field_kept() {
        let mut conv = Convolve::default();
        conv.prepare(&scs(8.0)).expect("prepares");
        let mut field = ramp(9, 8);
        let before = field.clone();

        assert_eq!(
            conv.apply(&mut field),
            Err(TransferError::ShapeMismatch {
                kernel: (8, 8),
                field: (8, 9)
            })
        );
        assert_eq!(field, before);
    }

    #[test]
    fn zero_mass_kernel_is_rejected_and_state_kept() {
        assert_eq!(
            PreparedKernel::from_array(Image::zeros(3, 3)).unwrap_err(),
            TransferError::ZeroMassKernel { sum: 0.0 }
        );

        let mut conv = Convolve::new(Constant::new(0.0));
        assert!(matches!(
            conv.prepare(&scs(8.0)),
            Err(TransferError::ZeroMassKernel { .. })
        ));
        assert!(!conv.is_ready());
    }

    #[test]
    fn invalid_pattern_surfaces_as_pattern_error() {
        let mut conv = Convolve::new(sc_pattern::Composite::new(
            Vec::new(),
            sc_pattern::CompositeOperator::Maximum,
        ));
        assert!(matches!(
            conv.prepare(&scs(8.0)),
            Err(TransferError::Pattern(sc_pattern::PatternError::EmptyComposite))
        ));
    }

    #[test]
    fn reprepare_replaces_the_kernel() {
        let mut conv = Convolve::new(Gaussian::isotropic(0.1));
        conv.prepare(&scs(8.0)).expect("prepares");
        conv.prepare(&scs(12.0)).expect("prepares");
        assert_eq!(conv.kernel().map(Image::shape), Some((12, 12)));
        assert!(conv.is_ready());
    }

    #[test]
    fn centre_impulse_kernel_is_identity() {
        for (rows, cols) in [(5, 7), (6, 8), (4, 9)] {
            let kernel = PreparedKernel::from_array(impulse(cols, rows, cols / 2, rows / 2))
                .expect("unit mass");
            let mut field = ramp(cols, rows);
            let before = field.clone();
            kernel.convolve(&mut field).expect("same shape");

            for (a, b) in field.data().iter().zip(before.data()) {
                assert_abs_diff_eq!(a, b, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn tiny_gaussian_on_odd_grid_is_identity() {
        let mut conv = Convolve::new(Gaussian::isotropic(1e-6));
        let kernel = conv.prepare(&scs(11.0)).expect("prepares").clone();
        assert_abs_diff_eq!(kernel.sum(), 1.0, epsilon = 1e-12);

        let mut field = ramp(11, 11);
        let before = field.clone();
        conv.apply(&mut field).expect("applies");
        for (a, b) in field.data().iter().zip(before.data()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn impulse_response_is_the_recentred_kernel() {
        let (rows, cols) = (15usize, 15usize);
        let mut conv = Convolve::new(Gaussian::new(0.2, 2.0));
        let kernel = conv.prepare(&scs(15.0)).expect("prepares").clone();
        let mass = kernel.sum();

        // Near an edge so the response wraps.
        let (r0, c0) = (2usize, 13usize);
        let mut field = impulse(cols, rows, c0, r0);
        conv.apply(&mut field).expect("applies");

        for r in 0..rows {
            for c in 0..cols {
                let kr = (r + rows / 2 + rows - r0) % rows;
                let kc = (c + cols / 2 + cols - c0) % cols;
                let expected = kernel.get(kc, kr).expect("in bounds") / mass;
                assert_abs_diff_eq!(*field.get(c, r).expect("in bounds"), expected, epsilon = 1e-12);
            }
        }
        let peak = field
            .data()
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| (i / cols, i % cols));
        assert_eq!(peak, Some((r0, c0)));
    }

    #[test]
    fn normalization_uses_the_discrete_kernel_sum() {
        let mut kernel = Image::zeros(5, 5);
        *kernel.get_mut(2, 2).expect("in bounds") = 4.0;
        let prepared = PreparedKernel::from_array(kernel).expect("non-zero mass");
        assert_eq!(prepared.mass(), 4.0);

        let mut field = ramp(5, 5);
        let before = field.clone();
        prepared.convolve(&mut field).expect("same shape");
        for (a, b) in field.data().iter().zip(before.data()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn apply_writes_into_the_callers_buffer() {
        let mut conv = Convolve::new(Gaussian::isotropic(0.2));
        conv.prepare(&scs(10.0)).expect("prepares");
        let mut field = ramp(10, 10);
        let ptr = field.data().as_ptr();
        conv.apply(&mut field).expect("applies");
        assert_eq!(field.data().as_ptr(), ptr);
        assert_eq!(field.shape(), (10, 10));
    }

    #[test]
    fn wide_kernel_reports_wrapping() {
        let narrow = rasterize_kernel(&Gaussian::isotropic(0.05).into(), &scs(20.0)).expect("ok");
        let wide = rasterize_kernel(&Gaussian::isotropic(2.0).into(), &scs(20.0)).expect("ok");
        assert!(border_ratio(&narrow).expect("large enough") < 1e-3);
        assert!(border_ratio(&wide).expect("large enough") > 0.5);
        assert_eq!(border_ratio(&Image::zeros(2, 2)), None);
    }

    fn field_strategy() -> impl Strategy<Value = (usize, Image<f64>)> {
        (4usize..20).prop_flat_map(|n| {
            prop::collection::vec(-10.0f64..10.0, n * n).prop_map(move |data| {
                (n, Image::from_vec(n, n, data).expect("n*n elements"))
            })
        })
    }

    proptest! {
        #[test]
        fn apply_preserves_shape_and_mass(
            (n, field) in field_strategy(),
            size in 0.02f64..0.4,
            aspect in 0.5f64..2.0,
        ) {
            let mut conv = Convolve::new(Gaussian::new(size, aspect));
            conv.prepare(&scs(n as f64)).expect("prepares");

            let mut out = field.clone();
            conv.apply(&mut out).expect("applies");

            prop_assert_eq!(out.shape(), field.shape());
            let tol = 1e-9 * (1.0 + field.data().iter().map(|v| v.abs()).sum::<f64>());
            prop_assert!((out.sum() - field.sum()).abs() <= tol);
        }

        #[test]
        fn apply_is_deterministic((n, field) in field_strategy()) {
            let mut conv = Convolve::new(Gaussian::isotropic(0.1));
            conv.prepare(&scs(n as f64)).expect("prepares");

            let mut first = field.clone();
            conv.apply(&mut first).expect("applies");
            let mut second = field.clone();
            conv.apply(&mut second).expect("applies");

            prop_assert_eq!(first, second);
        }
    }
}
