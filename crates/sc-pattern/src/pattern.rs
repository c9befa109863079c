use sc_core::Image;
use serde::{Deserialize, Serialize};

use crate::{Composite, Constant, Gaussian, Generator, PatternError, PatternGrid, PatternParams};

/// Any supported pattern shape.
///
/// Serialized with a `kind` tag, e.g.
/// `{"kind": "gaussian", "size": 0.05, "aspect_ratio": 1.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pattern {
    Gaussian(Gaussian),
    Constant(Constant),
    Composite(Composite),
}

impl Pattern {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Gaussian(_) => "gaussian",
            Self::Constant(_) => "constant",
            Self::Composite(_) => "composite",
        }
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self::Gaussian(Gaussian::default())
    }
}

impl From<Gaussian> for Pattern {
    fn from(g: Gaussian) -> Self {
        Self::Gaussian(g)
    }
}

impl From<Constant> for Pattern {
    fn from(c: Constant) -> Self {
        Self::Constant(c)
    }
}

impl From<Composite> for Pattern {
    fn from(c: Composite) -> Self {
        Self::Composite(c)
    }
}

impl Generator for Pattern {
    fn params(&self) -> &PatternParams {
        match self {
            Self::Gaussian(g) => g.params(),
            Self::Constant(c) => c.params(),
            Self::Composite(c) => c.params(),
        }
    }

    fn params_mut(&mut self) -> &mut PatternParams {
        match self {
            Self::Gaussian(g) => g.params_mut(),
            Self::Constant(c) => c.params_mut(),
            Self::Composite(c) => c.params_mut(),
        }
    }

    fn function(
        &self,
        grid: &PatternGrid,
        params: &PatternParams,
    ) -> Result<Image<f64>, PatternError> {
        match self {
            Self::Gaussian(g) => g.function(grid, params),
            Self::Constant(c) => c.function(grid, params),
            Self::Composite(c) => c.function(grid, params),
        }
    }
}
