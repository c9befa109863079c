//! Umbrella crate for the `sheet-convolve` workspace.
//!
//! Re-exports the field and coordinate primitives, the pattern generators
//! used to describe kernels, and the transfer functions that apply them.

pub use sc_core::*;
pub use sc_pattern::*;
pub use sc_transfer::*;
