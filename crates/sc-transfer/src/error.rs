use sc_pattern::PatternError;
use thiserror::Error;

use crate::InitKey;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransferError {
    #[error("transfer function has not been initialized with {keys}")]
    NotInitialized { keys: String },
    #[error("initialization context is missing {0}")]
    MissingInitKey(InitKey),
    #[error("invalid coordinate system: {0}")]
    InvalidCoordinateSystem(#[from] sc_core::Error),
    #[error("kernel pattern: {0}")]
    Pattern(#[from] PatternError),
    #[error("kernel mass must be finite and non-zero, got {sum}")]
    ZeroMassKernel { sum: f64 },
    #[error("field shape {field:?} does not match kernel shape {kernel:?}")]
    ShapeMismatch {
        kernel: (usize, usize),
        field: (usize, usize),
    },
}
