//! Crate-wide error type.

use crate::world::WorldRelation;

/// Errors reported by tensor operations.
///
/// Every check runs before any data is touched, so an `Err` leaves all
/// tensors involved unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A label string does not have one label per tensor dimension.
    #[error("label count mismatch: tensor has {ndim} dimensions, got {got} labels")]
    LabelCount { ndim: usize, got: usize },

    /// One label is bound to dimensions of different extents.
    #[error("extent mismatch for label '{label}': {first} vs {second}")]
    ExtentMismatch {
        label: char,
        first: usize,
        second: usize,
    },

    /// A label that must be unique appears more than once.
    #[error("label '{label}' repeated in output labels")]
    DuplicateLabel { label: char },

    /// Malformed extents, symmetry tags or per-dimension arguments.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// Two parallel slices (indices and values, for instance) differ in length.
    #[error("length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    /// Source symmetry cannot be represented in the destination.
    #[error("symmetry violation: {0}")]
    SymmetryViolation(String),

    /// A global coordinate beyond the tensor's element count.
    #[error("coordinate {index} out of range for tensor of size {size}")]
    OutOfRange { index: usize, size: usize },

    /// Operands of a pairwise operation live in different worlds.
    #[error("operands live in different worlds")]
    WorldMismatch,

    /// A cross-world operation between worlds whose relation it does not allow.
    #[error("{operation} not allowed between worlds related as {relation:?}")]
    IncompatibleWorlds {
        relation: WorldRelation,
        operation: &'static str,
    },

    /// Argument outside its domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        Error::InvalidShape(msg.into())
    }

    pub(crate) fn symmetry(msg: impl Into<String>) -> Self {
        Error::SymmetryViolation(msg.into())
    }

    /// Whether this is one of the shape or label mismatch variants.
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            Error::LabelCount { .. }
                | Error::ExtentMismatch { .. }
                | Error::DuplicateLabel { .. }
                | Error::InvalidShape(_)
                | Error::LengthMismatch { .. }
        )
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
