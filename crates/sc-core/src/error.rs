use core::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("{axis}density must be finite and > 0, got {value}")]
    InvalidDensity { axis: Axis, value: f64 },
    #[error("degenerate bounds: left={left}, bottom={bottom}, right={right}, top={top}")]
    DegenerateBounds {
        left: f64,
        bottom: f64,
        right: f64,
        top: f64,
    },
    #[error("coordinate system samples no pixels: {rows}x{cols}")]
    EmptyShape { rows: usize, cols: usize },
}
