//! # Tensor Module - *Owned Rank-4 Buffers*
//!
//! Dense row-major tensor backed by a 64-byte aligned [`Vec64`] buffer.
//!
//! The dispatcher itself works on borrowed slices; `Tensor4` exists for the
//! allocating entry points in [`crate::kernels::routing`] and for callers
//! that want shape and data kept together.

use std::fmt;

use vec64::Vec64;

use crate::enums::error::KernelResult;
use crate::structs::shape::Shape4;
use crate::utils::validate_len;

/// # Tensor4
///
/// Row-major rank-4 tensor.
///
/// ### Properties
/// - `shape`: Logical shape, every axis `>= 1`.
/// - `data`: Flat buffer of exactly `shape.num_elements()` elements, axis 3
///   contiguous.
#[derive(Clone, PartialEq)]
pub struct Tensor4<T> {
    pub shape: Shape4,
    pub data: Vec64<T>,
}

impl<T: Copy + Default> Tensor4<T> {
    /// Wraps an existing buffer. Errors when the shape has a zero axis or
    /// the buffer length does not match it.
    pub fn new(shape: Shape4, data: Vec64<T>) -> KernelResult<Self> {
        validate_len("tensor", &shape, data.len())?;
        Ok(Tensor4 { shape, data })
    }

    /// Constructs a tensor of `T::default()` values.
    pub fn zeros(shape: Shape4) -> KernelResult<Self> {
        shape.validate("tensor")?;
        let len = shape.num_elements();
        let mut data = Vec64::with_capacity(len);
        data.0.resize(len, T::default());
        Ok(Tensor4 { shape, data })
    }

    /// Copies `values` into a new tensor of up to rank 4, padding `dims`
    /// with leading 1s.
    pub fn from_slice(dims: &[usize], values: &[T]) -> KernelResult<Self> {
        let shape = Shape4::from_dims(dims)?;
        validate_len("tensor", &shape, values.len())?;
        let mut data = Vec64::with_capacity(values.len());
        data.0.extend_from_slice(values);
        Ok(Tensor4 { shape, data })
    }

    /// A single element tensor of shape `(1, 1, 1, 1)`.
    pub fn scalar(value: T) -> Self {
        let mut data = Vec64::with_capacity(1);
        data.push(value);
        Tensor4 { shape: Shape4::scalar(), data }
    }

    #[inline]
    pub fn shape(&self) -> &Shape4 {
        &self.shape
    }

    /// Returns the total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false for a validated tensor.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Element at row-major coordinates `idx`. Panics if out of bounds.
    #[inline]
    pub fn get(&self, idx: [usize; 4]) -> T {
        let strides = self.shape.contiguous_strides();
        let mut offset = 0;
        for axis in 0..4 {
            debug_assert!(idx[axis] < self.shape[axis], "Index out of bounds");
            offset += idx[axis] * strides[axis];
        }
        self.data[offset]
    }
}

impl<T: fmt::Debug> fmt::Debug for Tensor4<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor4")
            .field("shape", &self.shape.0)
            .field("data", &&self.data[..])
            .finish()
    }
}
