//! Protocol error types.

use thiserror::Error;

use crate::schema::ParamId;

/// Controller model index outside the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("controller model index {0} is out of range")]
pub struct UnknownModel(pub i64);

/// Frame construction failure.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A transform produced a value that does not fit one wire byte.
    #[error("parameter {param} encodes to {value}, outside the 0..=255 wire range")]
    ByteRange { param: ParamId, value: f64 },

    /// A transform produced a non-finite value.
    #[error("parameter {param} encodes to a non-finite value")]
    NotFinite { param: ParamId },

    /// The profile selects a model the catalog does not know.
    #[error(transparent)]
    UnknownModel(#[from] UnknownModel),
}
