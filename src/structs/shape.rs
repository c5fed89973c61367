//! # Shape Module
//!
//! Rank-4 row-major tensor shapes.
//!
//! Axis 0 is outermost (slowest varying), axis 3 is innermost.
//! Lower-rank tensors are represented by padding with leading size-1 axes,
//! see [`Shape4::from_dims`].

use std::fmt::{Display, Formatter};
use std::ops::Index;

use crate::enums::error::{KernelError, KernelResult};

/// Number of axes every shape carries.
pub const RANK: usize = 4;

/// Rank-4 shape. Every axis is expected to be `>= 1` and the element count
/// to fit `usize`; [`Shape4::validate`] checks both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape4(pub [usize; RANK]);

impl Shape4 {
    #[inline]
    pub const fn new(dims: [usize; RANK]) -> Self {
        Shape4(dims)
    }

    /// The all-ones shape of a single element.
    #[inline]
    pub const fn scalar() -> Self {
        Shape4([1; RANK])
    }

    /// Builds a shape from up to four dims, padding on the left with 1s.
    ///
    /// `&[3, 4]` becomes `(1, 1, 3, 4)`. An empty slice is a scalar.
    pub fn from_dims(dims: &[usize]) -> KernelResult<Self> {
        if dims.len() > RANK {
            return Err(KernelError::RankTooLarge { rank: dims.len() });
        }
        let mut out = [1usize; RANK];
        out[RANK - dims.len()..].copy_from_slice(dims);
        let shape = Shape4(out);
        shape.validate("shape")?;
        Ok(shape)
    }

    /// Errors on the first zero-sized axis, or on the axis at which the
    /// running element count overflows `usize`.
    pub fn validate(&self, tensor: &'static str) -> KernelResult<()> {
        if let Some(axis) = self.0.iter().position(|&d| d == 0) {
            return Err(KernelError::InvalidDimension { tensor, axis, value: 0 });
        }
        let mut count = 1usize;
        for (axis, &value) in self.0.iter().enumerate() {
            count = count
                .checked_mul(value)
                .ok_or(KernelError::InvalidDimension { tensor, axis, value })?;
        }
        Ok(())
    }

    #[inline]
    pub fn dims(&self) -> [usize; RANK] {
        self.0
    }

    /// Element count. Only meaningful for a validated shape.
    #[inline]
    pub fn num_elements(&self) -> usize {
        self.0.iter().product()
    }

    /// Element count, `None` when it overflows `usize`.
    #[inline]
    pub fn checked_num_elements(&self) -> Option<usize> {
        self.0.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    /// True when every axis is 1.
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.0.iter().all(|&d| d == 1)
    }

    /// Conventional contiguous element strides for this shape.
    #[inline]
    pub fn contiguous_strides(&self) -> [usize; RANK] {
        let mut strides = [1usize; RANK];
        for i in (0..RANK - 1).rev() {
            strides[i] = strides[i + 1] * self.0[i + 1];
        }
        strides
    }

    /// NumPy-style output shape of a binary operation on `a` and `b`.
    pub fn broadcast(a: &Shape4, b: &Shape4) -> KernelResult<Shape4> {
        a.validate("inp1")?;
        b.validate("inp2")?;
        let mut out = [1usize; RANK];
        for axis in 0..RANK {
            let (x, y) = (a.0[axis], b.0[axis]);
            if x != y && x != 1 && y != 1 {
                return Err(KernelError::BroadcastIncompatible {
                    axis,
                    out: x.max(y),
                    inp1: x,
                    inp2: y,
                });
            }
            out[axis] = x.max(y);
        }
        Ok(Shape4(out))
    }
}

impl Default for Shape4 {
    fn default() -> Self {
        Shape4::scalar()
    }
}

impl Index<usize> for Shape4 {
    type Output = usize;

    #[inline]
    fn index(&self, axis: usize) -> &usize {
        &self.0[axis]
    }
}

impl From<[usize; RANK]> for Shape4 {
    fn from(dims: [usize; RANK]) -> Self {
        Shape4(dims)
    }
}

impl Display for Shape4 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "({a}, {b}, {c}, {d})")
    }
}
