//! # Error Module - Custom *Minbcast* Error Type
//!
//! Defines the unified error type for Minbcast.
//!
//! ## Features
//! - Covers broadcast incompatibility, malformed shapes, buffer length
//! mismatches, and out-of-range quantization parameters.
//! - Derives `Display` and `Error` through *thiserror*.
//! - Maps every variant onto the negative integer status expected by
//! C-style operator entry points via [`KernelError::status`].

use thiserror::Error;

/// Result alias used throughout the crate.
pub type KernelResult<T> = Result<T, KernelError>;

/// Status returned for a successful call.
pub const STATUS_OK: i32 = 0;
/// Status for shape and broadcast errors.
pub const STATUS_SHAPE_ERROR: i32 = -1;
/// Status for buffer length errors.
pub const STATUS_BUFFER_ERROR: i32 = -2;
/// Status for quantization and activation parameter errors.
pub const STATUS_PARAM_ERROR: i32 = -3;

/// Catch all error type for `Minbcast`
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KernelError {
    #[error(
        "Broadcast error: axis {axis} cannot broadcast inputs {inp1} and {inp2} to output {out}."
    )]
    BroadcastIncompatible {
        axis: usize,
        out: usize,
        inp1: usize,
        inp2: usize,
    },

    #[error(
        "Invalid dimension: {tensor} axis {axis} has size {value}, expected >= 1 \
         with an element count that fits usize."
    )]
    InvalidDimension {
        tensor: &'static str,
        axis: usize,
        value: usize,
    },

    #[error("Rank error: shapes of rank {rank} cannot be padded to rank 4.")]
    RankTooLarge { rank: usize },

    #[error("Length mismatch in {tensor}: expected {expected} elements, found {found}.")]
    LengthMismatch {
        tensor: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Parameter error: {tensor} {field} = {value} is outside [{min}, {max}].")]
    ParameterOutOfRange {
        tensor: &'static str,
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Activation error: activation range [{min}, {max}] is empty.")]
    InvalidActivationRange { min: i32, max: i32 },

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),
}

impl KernelError {
    /// Negative integer status for this error.
    pub fn status(&self) -> i32 {
        match self {
            KernelError::BroadcastIncompatible { .. }
            | KernelError::InvalidDimension { .. }
            | KernelError::RankTooLarge { .. } => STATUS_SHAPE_ERROR,
            KernelError::LengthMismatch { .. } => STATUS_BUFFER_ERROR,
            KernelError::ParameterOutOfRange { .. }
            | KernelError::InvalidActivationRange { .. }
            | KernelError::UnsupportedOperator(_) => STATUS_PARAM_ERROR,
        }
    }
}

/// Collapses a result into the integer status channel: `0` on success,
/// negative on failure.
pub fn status_of<T>(result: &KernelResult<T>) -> i32 {
    match result {
        Ok(_) => STATUS_OK,
        Err(e) => e.status(),
    }
}
