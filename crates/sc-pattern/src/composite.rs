use sc_core::Image;
use serde::{Deserialize, Serialize};

use crate::{Generator, Pattern, PatternError, PatternGrid, PatternParams};

/// Element-wise reduction used to merge child patterns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeOperator {
    #[default]
    Maximum,
    Minimum,
    Add,
    Multiply,
}

impl CompositeOperator {
    pub fn combine(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Maximum => a.max(b),
            Self::Minimum => a.min(b),
            Self::Add => a + b,
            Self::Multiply => a * b,
        }
    }
}

/// Renders each child onto the composite's grid and reduces them.
///
/// Child positions, orientations and sizes are relative to the composite:
/// a child at `(cx, cy)` lands at `(x, y) + size * R(orientation) (cx, cy)`
/// with orientation `child + parent` and size `child * parent`. Children keep
/// their own scale, offset and shape parameters; their own bounds and
/// densities are ignored in favour of the composite's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composite {
    #[serde(flatten)]
    pub params: PatternParams,
    #[serde(default)]
    pub generators: Vec<Pattern>,
    #[serde(default)]
    pub operator: CompositeOperator,
}

impl Composite {
    pub fn new(generators: Vec<Pattern>, operator: CompositeOperator) -> Self {
        Self {
            params: PatternParams::default(),
            generators,
            operator,
        }
    }

    fn child_params(&self, child: &Pattern, parent: &PatternParams) -> PatternParams {
        let c = child.params();
        let (sin_o, cos_o) = parent.orientation.sin_cos();
        PatternParams {
            x: parent.x + parent.size * (c.x * cos_o - c.y * sin_o),
            y: parent.y + parent.size * (c.x * sin_o + c.y * cos_o),
            orientation: c.orientation + parent.orientation,
            size: c.size * parent.size,
            bounds: parent.bounds,
            xdensity: parent.xdensity,
            ydensity: parent.ydensity,
            ..c.clone()
        }
    }
}

impl Generator for Composite {
    fn params(&self) -> &PatternParams {
        &self.params
    }

    fn params_mut(&mut self) -> &mut PatternParams {
        &mut self.params
    }

    fn function(
        &self,
        _grid: &PatternGrid,
        params: &PatternParams,
    ) -> Result<Image<f64>, PatternError> {
        let (first, rest) = self
            .generators
            .split_first()
            .ok_or(PatternError::EmptyComposite)?;

        let mut acc = first.rasterize(&self.child_params(first, params))?;
        for child in rest {
            let layer = child.rasterize(&self.child_params(child, params))?;
            for (a, &b) in acc.data_mut().iter_mut().zip(layer.data()) {
                *a = self.operator.combine(*a, b);
            }
        }
        Ok(acc)
    }
}
