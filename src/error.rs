//! The error type for fallible [`NdArray`] construction.
//!
//! [`NdArray`]: super::NdArray

use thiserror::{Error};

/// Returned when initial data does not fit the [`Shape`] of an [`NdArray`].
///
/// Every constructor that can return this error checks its input before
/// storing anything, so no partially built array is ever observable.
///
/// [`Shape`]: super::Shape
/// [`NdArray`]: super::NdArray
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// A flat source has the wrong number of elements.
    #[error("expected {expected} elements, got {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// A nested literal is not rectangular.
    #[error("ragged literal: a list on axis {axis} has length {found}, expected {expected}")]
    Ragged { axis: usize, expected: usize, found: usize },
}

pub type Result<T, E = ShapeError> = std::result::Result<T, E>;
