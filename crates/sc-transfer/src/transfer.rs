use core::fmt;

use sc_core::{Image, SheetCoordinateSystem};

use crate::TransferError;

/// Named initialization input a transfer function can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitKey {
    /// The sheet coordinate system the field is sampled on.
    Scs,
}

impl fmt::Display for InitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scs => f.write_str("SCS"),
        }
    }
}

/// Initialization inputs handed to [`TransferFn::initialize`].
#[derive(Debug, Clone, Default)]
pub struct InitContext {
    scs: Option<SheetCoordinateSystem>,
}

impl InitContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scs(mut self, scs: SheetCoordinateSystem) -> Self {
        self.scs = Some(scs);
        self
    }

    pub fn scs(&self) -> Option<&SheetCoordinateSystem> {
        self.scs.as_ref()
    }

    pub fn has(&self, key: InitKey) -> bool {
        match key {
            InitKey::Scs => self.scs.is_some(),
        }
    }

    /// Fails on the first of `keys` this context does not carry.
    pub fn require(&self, keys: &[InitKey]) -> Result<(), TransferError> {
        match keys.iter().find(|&&k| !self.has(k)) {
            Some(&missing) => Err(TransferError::MissingInitKey(missing)),
            None => Ok(()),
        }
    }
}

/// In-place operation on a field.
pub trait TransferFn {
    /// Inputs that must be present in the [`InitContext`].
    fn init_keys(&self) -> &[InitKey] {
        &[]
    }

    fn initialize(&mut self, ctx: &InitContext) -> Result<(), TransferError> {
        ctx.require(self.init_keys())
    }

    fn apply(&mut self, field: &mut Image<f64>) -> Result<(), TransferError>;
}

pub(crate) fn describe_keys(keys: &[InitKey]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
