// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Comparison Routing
//!
//! Validating entry points for broadcast comparisons. Outputs are boolean
//! bytes: 1 where the comparison holds, 0 elsewhere.

use crate::enums::error::KernelResult;
use crate::enums::operators::ComparisonOperator;
use crate::kernels::dispatch::dispatch;
use crate::kernels::elementwise::compare::{FloatComparison, QuantizedComparison};
use crate::structs::args::KernelArgs;
use crate::structs::quant::BinaryQuantParams;
use crate::structs::shape::Shape4;
use crate::structs::tensor::Tensor4;
use crate::traits::type_unions::{Float, Quantized};
use crate::utils::validate_binary_lens;

/// Compares quantized codes after bringing both inputs onto the common
/// scale in `params`. The output parameters and activation range are
/// validated but unused.
pub fn quantized_compare<T: Quantized>(
    op: ComparisonOperator,
    out: &mut [u8],
    out_shape: &Shape4,
    inp1: &[T],
    inp1_shape: &Shape4,
    inp2: &[T],
    inp2_shape: &Shape4,
    params: &BinaryQuantParams,
) -> KernelResult<()> {
    validate_binary_lens(
        (out.len(), out_shape),
        (inp1.len(), inp1_shape),
        (inp2.len(), inp2_shape),
    )?;
    let params = params.validate::<T>()?;
    let kernel = QuantizedComparison::<T>::new(op);
    dispatch(&kernel, out, out_shape, inp1, inp1_shape, inp2, inp2_shape, KernelArgs::new(params))
}

pub fn float_compare<T: Float>(
    op: ComparisonOperator,
    out: &mut [u8],
    out_shape: &Shape4,
    inp1: &[T],
    inp1_shape: &Shape4,
    inp2: &[T],
    inp2_shape: &Shape4,
) -> KernelResult<()> {
    validate_binary_lens(
        (out.len(), out_shape),
        (inp1.len(), inp1_shape),
        (inp2.len(), inp2_shape),
    )?;
    let kernel = FloatComparison::<T>::new(op);
    dispatch(&kernel, out, out_shape, inp1, inp1_shape, inp2, inp2_shape, KernelArgs::default())
}

/// Allocating form of [`quantized_compare`].
pub fn broadcast_compare_quantized<T: Quantized>(
    op: ComparisonOperator,
    lhs: &Tensor4<T>,
    rhs: &Tensor4<T>,
    params: &BinaryQuantParams,
) -> KernelResult<Tensor4<u8>> {
    let out_shape = Shape4::broadcast(&lhs.shape, &rhs.shape)?;
    let mut out = Tensor4::zeros(out_shape)?;
    quantized_compare(
        op,
        out.as_mut_slice(),
        &out_shape,
        lhs.as_slice(),
        &lhs.shape,
        rhs.as_slice(),
        &rhs.shape,
        params,
    )?;
    Ok(out)
}

/// Allocating form of [`float_compare`].
pub fn broadcast_compare_float<T: Float>(
    op: ComparisonOperator,
    lhs: &Tensor4<T>,
    rhs: &Tensor4<T>,
) -> KernelResult<Tensor4<u8>> {
    let out_shape = Shape4::broadcast(&lhs.shape, &rhs.shape)?;
    let mut out = Tensor4::zeros(out_shape)?;
    float_compare(
        op,
        out.as_mut_slice(),
        &out_shape,
        lhs.as_slice(),
        &lhs.shape,
        rhs.as_slice(),
        &rhs.shape,
    )?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::error::KernelError;
    use crate::structs::quant::AffineQuantization;

    #[test]
    fn test_float_compare_scalar_lhs() {
        // 2.0 < [1, 2, 3, 4]
        let lhs = Tensor4::scalar(2.0f64);
        let rhs = Tensor4::from_slice(&[4], &[1.0f64, 2.0, 3.0, 4.0]).unwrap();
        let out = broadcast_compare_float(ComparisonOperator::Less, &lhs, &rhs).unwrap();
        assert_eq!(out.as_slice(), &[0, 0, 1, 1]);
    }

    #[test]
    fn test_quantized_compare_across_scales() {
        // inp1 real values 0.5 * (q - 0): [0.5, 1.0, 1.5]; inp2 real 0.25 * (4 - 0) = 1.0
        let a = AffineQuantization::new(0.5, 0);
        let b = AffineQuantization::new(0.25, 0);
        let params = BinaryQuantParams::comparison::<i8>(&a, &b);
        let lhs = Tensor4::from_slice(&[3], &[1i8, 2, 3]).unwrap();
        let rhs = Tensor4::scalar(4i8);

        let eq =
            broadcast_compare_quantized(ComparisonOperator::Equal, &lhs, &rhs, &params).unwrap();
        assert_eq!(eq.as_slice(), &[0, 1, 0]);
        let ge = broadcast_compare_quantized(ComparisonOperator::GreaterEqual, &lhs, &rhs, &params)
            .unwrap();
        assert_eq!(ge.as_slice(), &[0, 1, 1]);
    }

    #[test]
    fn test_compare_length_mismatch() {
        let mut out = [0u8; 3];
        let s = Shape4([1, 1, 1, 4]);
        let zeros = [0.0f32; 4];
        let res = float_compare(ComparisonOperator::Equal, &mut out, &s, &zeros, &s, &zeros, &s);
        let expected = KernelError::LengthMismatch { tensor: "out", expected: 4, found: 3 };
        assert_eq!(res, Err(expected));
    }
}
