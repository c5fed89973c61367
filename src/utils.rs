//! # Utilities - *Internal Helper Utilities*
//!
//! Buffer validation shared by the tensor type and the operator entry points.

use tracing::debug;

use crate::enums::error::{KernelError, KernelResult};
use crate::structs::shape::Shape4;

/// Checks that `shape` is valid and that a flat buffer of `found` elements
/// holds exactly its elements.
#[inline]
pub fn validate_len(tensor: &'static str, shape: &Shape4, found: usize) -> KernelResult<()> {
    shape.validate(tensor)?;
    let expected = shape.num_elements();
    if expected != found {
        debug!(tensor, expected, found, %shape, "buffer length rejected");
        return Err(KernelError::LengthMismatch { tensor, expected, found });
    }
    Ok(())
}

/// Validates the three buffers of a binary operator against their shapes.
#[inline]
pub fn validate_binary_lens(
    out: (usize, &Shape4),
    inp1: (usize, &Shape4),
    inp2: (usize, &Shape4),
) -> KernelResult<()> {
    validate_len("out", out.1, out.0)?;
    validate_len("inp1", inp1.1, inp1.0)?;
    validate_len("inp2", inp2.1, inp2.0)
}
