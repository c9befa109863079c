use serde::{Deserialize, Serialize};

use crate::Error;

/// Axis-aligned rectangle in continuous sheet units.
///
/// Serialized as `[left, bottom, right, top]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    left: f64,
    bottom: f64,
    right: f64,
    top: f64,
}

impl BoundingBox {
    pub fn new(left: f64, bottom: f64, right: f64, top: f64) -> Result<Self, Error> {
        let finite = left.is_finite() && bottom.is_finite() && right.is_finite() && top.is_finite();
        if !finite || left >= right || bottom >= top {
            return Err(Error::DegenerateBounds {
                left,
                bottom,
                right,
                top,
            });
        }

        Ok(Self {
            left,
            bottom,
            right,
            top,
        })
    }

    /// Square box `[-radius, radius]` on both axes.
    pub fn from_radius(radius: f64) -> Result<Self, Error> {
        Self::new(-radius, -radius, radius, radius)
    }

    pub fn lbrt(&self) -> (f64, f64, f64, f64) {
        (self.left, self.bottom, self.right, self.top)
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn bottom(&self) -> f64 {
        self.bottom
    }

    pub fn right(&self) -> f64 {
        self.right
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    pub fn centre(&self) -> (f64, f64) {
        (
            0.5 * (self.left + self.right),
            0.5 * (self.bottom + self.top),
        )
    }

    /// Half-open on the right and bottom edges, so adjacent boxes do not
    /// both claim a shared edge.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.right && y > self.bottom && y <= self.top
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            left: -0.5,
            bottom: -0.5,
            right: 0.5,
            top: 0.5,
        }
    }
}

impl TryFrom<[f64; 4]> for BoundingBox {
    type Error = Error;

    fn try_from([l, b, r, t]: [f64; 4]) -> Result<Self, Self::Error> {
        Self::new(l, b, r, t)
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(bb: BoundingBox) -> Self {
        [bb.left, bb.bottom, bb.right, bb.top]
    }
}
