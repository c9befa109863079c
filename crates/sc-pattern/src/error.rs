use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatternError {
    #[error("invalid coordinate system: {0}")]
    Core(#[from] sc_core::Error),
    #[error("composite pattern has no generators")]
    EmptyComposite,
}
