//! Foundational primitives for sheet-coordinate field processing.
//!
//! ## Fields
//! A field is a row-major [`Image<f64>`]. `shape()` reports `(rows, cols)`,
//! i.e. `(height, width)`, matching the order used by the FFT helpers.
//!
//! ## Sheet Coordinates
//! A [`SheetCoordinateSystem`] maps a continuous rectangle onto a pixel grid.
//! Rows run from the top edge downwards; columns run from the left edge to
//! the right. Integer matrix indices refer to pixel centres, which sit half a
//! sample inside the bounds.

mod bounds;
mod error;
mod image;
mod sheet;

pub use bounds::BoundingBox;
pub use error::{Axis, Error};
pub use image::Image;
pub use sheet::SheetCoordinateSystem;
