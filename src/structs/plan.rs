//! # Broadcast Plan Module
//!
//! Shape/stride resolution for a binary rank-4 operation.
//!
//! [`BroadcastPlan::resolve`] checks that two input shapes broadcast to the
//! declared output shape and derives per-input element strides, forcing the
//! stride of every broadcast (size-1 against size-N) axis to zero so that
//! repeated reads fetch the same element.
//!
//! [`BroadcastPlan::strategy`] then picks the cheapest sweep pattern the
//! dispatcher can use for the resolved strides.

use tracing::debug;

use crate::enums::error::{KernelError, KernelResult};
use crate::structs::shape::{RANK, Shape4};

/// Resolved strides and flags for one binary operator invocation.
///
/// Computed fresh per call and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastPlan {
    pub out_shape: Shape4,
    /// Element strides of input 1, zero on axes where it is broadcast.
    pub inp1_strides: [usize; RANK],
    /// Element strides of input 2, zero on axes where it is broadcast.
    pub inp2_strides: [usize; RANK],
    /// True if any axis differs between the two input shapes.
    pub need_broadcast: bool,
    pub inp1_is_scalar: bool,
    pub inp2_is_scalar: bool,
}

/// Sweep pattern chosen for a resolved plan, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IterationStrategy {
    /// Identical shapes: one 2D kernel call over the whole buffer.
    Contiguous,
    /// One input is a single element: one 1D kernel call.
    ScalarBroadcast,
    /// Both inputs agree on the innermost axis: 2D kernel calls over
    /// axis 0 x axis 1.
    InnerContiguous,
    /// Exactly one input is broadcast along the innermost axis: 1D kernel
    /// calls over axis 0 x axis 1 x axis 2.
    InnerBroadcast,
}

impl BroadcastPlan {
    /// Checks broadcast compatibility of `inp1` and `inp2` against `out` and
    /// derives the strides.
    ///
    /// For every axis the inputs must be equal or one of them must be 1, and
    /// the output must equal the larger of the two. Nothing is produced on
    /// failure.
    pub fn resolve(out: &Shape4, inp1: &Shape4, inp2: &Shape4) -> KernelResult<Self> {
        out.validate("out")?;
        inp1.validate("inp1")?;
        inp2.validate("inp2")?;

        for axis in 0..RANK {
            let (a, b, o) = (inp1[axis], inp2[axis], out[axis]);
            if (a != b && a != 1 && b != 1) || o != a.max(b) {
                debug!(axis, out = o, inp1 = a, inp2 = b, "broadcast shapes rejected");
                return Err(KernelError::BroadcastIncompatible {
                    axis,
                    out: o,
                    inp1: a,
                    inp2: b,
                });
            }
        }

        let mut inp1_strides = inp1.contiguous_strides();
        let mut inp2_strides = inp2.contiguous_strides();
        let mut need_broadcast = false;

        for axis in 0..RANK {
            if inp1[axis] != inp2[axis] {
                if inp1[axis] == 1 {
                    inp1_strides[axis] = 0;
                } else {
                    inp2_strides[axis] = 0;
                }
                need_broadcast = true;
            }
        }

        Ok(BroadcastPlan {
            out_shape: *out,
            inp1_strides,
            inp2_strides,
            need_broadcast,
            inp1_is_scalar: inp1.is_scalar(),
            inp2_is_scalar: inp2.is_scalar(),
        })
    }

    /// Element count of the output.
    #[inline]
    pub fn num_elements(&self) -> usize {
        self.out_shape.num_elements()
    }

    /// Classifies the plan into the sweep pattern the dispatcher runs.
    pub fn strategy(&self) -> IterationStrategy {
        if !self.need_broadcast {
            IterationStrategy::Contiguous
        } else if self.inp1_is_scalar || self.inp2_is_scalar {
            IterationStrategy::ScalarBroadcast
        } else if self.inp1_strides[3] == self.inp2_strides[3] {
            IterationStrategy::InnerContiguous
        } else {
            IterationStrategy::InnerBroadcast
        }
    }
}
