use derive_more::{Display, From};

pub type Result<T> = core::result::Result<T, ReliefError>;

#[derive(Debug, Display, From)]
#[display("{self:?}")]
pub enum ReliefError {
    EmptySamples,
    InvalidIndex,
}

impl std::error::Error for ReliefError {}
