use sc_core::BoundingBox;
use serde::{Deserialize, Serialize};

/// Parameters shared by every pattern generator.
///
/// `x`, `y` and `size` are in sheet units; `orientation` is in radians,
/// counter-clockwise. `bounds`, `xdensity` and `ydensity` describe the grid
/// the pattern renders onto when rendered on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternParams {
    pub x: f64,
    pub y: f64,
    pub orientation: f64,
    pub size: f64,
    pub scale: f64,
    pub offset: f64,
    pub bounds: BoundingBox,
    pub xdensity: f64,
    pub ydensity: f64,
}

impl Default for PatternParams {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            orientation: 0.0,
            size: 1.0,
            scale: 1.0,
            offset: 0.0,
            bounds: BoundingBox::default(),
            xdensity: 256.0,
            ydensity: 256.0,
        }
    }
}

impl PatternParams {
    pub fn with_size(size: f64) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }
}
