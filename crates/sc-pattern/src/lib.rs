//! Pattern generators evaluated in continuous sheet coordinates.
//!
//! A pattern is described by [`PatternParams`] (position, orientation, size,
//! scale/offset and the grid it renders onto) plus shape-specific fields.
//! Rasterization builds a [`SheetCoordinateSystem`](sc_core::SheetCoordinateSystem)
//! from the bounds and densities, translates pixel centres by `(x, y)`,
//! rotates them by `orientation`, evaluates the shape, and finally maps
//! `v -> scale * v + offset`.
//!
//! [`Pattern`] is a closed set of shapes. It is a plain value: cloning it
//! yields an independent copy that can be re-targeted without touching the
//! original.

mod composite;
mod constant;
mod error;
mod gaussian;
mod generator;
mod params;
mod pattern;

pub use composite::{Composite, CompositeOperator};
pub use constant::Constant;
pub use error::PatternError;
pub use gaussian::{Gaussian, gaussian};
pub use generator::{Generator, PatternGrid};
pub use params::PatternParams;
pub use pattern::Pattern;
