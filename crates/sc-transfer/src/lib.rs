//! Transfer functions that operate on fields in place and may need to know
//! the sheet coordinate system the field is sampled on.
//!
//! A [`TransferFn`] declares the initialization inputs it needs through
//! [`TransferFn::init_keys`]; callers supply them in an [`InitContext`] before
//! the first [`TransferFn::apply`].
//!
//! [`Convolve`] rasterizes a kernel pattern whose size is given in sheet
//! units, zero-pads it to the full sheet, and applies it by circular FFT
//! convolution. The result is shifted back by half the array extent and
//! divided by the discrete kernel mass, so a field's total is preserved.

pub mod convolve;
mod error;
pub mod fft;
mod transfer;

pub use convolve::{Convolve, KernelState, PreparedKernel, rasterize_kernel};
pub use error::TransferError;
pub use transfer::{InitContext, InitKey, TransferFn};
