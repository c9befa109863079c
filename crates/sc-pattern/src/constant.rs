use sc_core::Image;
use serde::{Deserialize, Serialize};

use crate::{Generator, PatternError, PatternGrid, PatternParams};

/// Uniform field equal to `scale + offset`. Position and orientation have
/// no effect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constant {
    #[serde(flatten)]
    pub params: PatternParams,
}

impl Constant {
    pub fn new(scale: f64) -> Self {
        Self {
            params: PatternParams {
                scale,
                ..PatternParams::default()
            },
        }
    }
}

impl Generator for Constant {
    fn params(&self) -> &PatternParams {
        &self.params
    }

    fn params_mut(&mut self) -> &mut PatternParams {
        &mut self.params
    }

    fn function(
        &self,
        grid: &PatternGrid,
        _params: &PatternParams,
    ) -> Result<Image<f64>, PatternError> {
        let (rows, cols) = grid.shape();
        Ok(Image::new_fill(cols, rows, 1.0))
    }
}
