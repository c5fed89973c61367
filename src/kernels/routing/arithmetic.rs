// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Arithmetic Routing
//!
//! Validating entry points for broadcast arithmetic. Every check runs before
//! the dispatcher is entered, so a rejected call leaves the output untouched.

use crate::enums::error::KernelResult;
use crate::enums::operators::ArithmeticOperator;
use crate::kernels::dispatch::dispatch;
use crate::kernels::elementwise::float::FloatArithmetic;
use crate::kernels::elementwise::quantized::QuantizedArithmetic;
use crate::structs::args::KernelArgs;
use crate::structs::quant::BinaryQuantParams;
use crate::structs::shape::Shape4;
use crate::structs::tensor::Tensor4;
use crate::traits::type_unions::{Float, Quantized};
use crate::utils::validate_binary_lens;

/// `out = inp1 op inp2` on quantized codes with rank-4 broadcasting.
///
/// Buffer lengths must match their shapes and `params` must be in range for
/// `T`; the activation range is clamped to `T` before use.
pub fn quantized_binary<T: Quantized>(
    op: ArithmeticOperator,
    out: &mut [T],
    out_shape: &Shape4,
    inp1: &[T],
    inp1_shape: &Shape4,
    inp2: &[T],
    inp2_shape: &Shape4,
    params: &BinaryQuantParams,
) -> KernelResult<()> {
    let kernel = QuantizedArithmetic::<T>::new(op)?;
    validate_binary_lens(
        (out.len(), out_shape),
        (inp1.len(), inp1_shape),
        (inp2.len(), inp2_shape),
    )?;
    let params = params.validate::<T>()?;
    dispatch(&kernel, out, out_shape, inp1, inp1_shape, inp2, inp2_shape, KernelArgs::new(params))
}

/// `out = inp1 op inp2` on floats with rank-4 broadcasting, optionally
/// clamped into `activation`.
pub fn float_binary<T: Float>(
    op: ArithmeticOperator,
    out: &mut [T],
    out_shape: &Shape4,
    inp1: &[T],
    inp1_shape: &Shape4,
    inp2: &[T],
    inp2_shape: &Shape4,
    activation: Option<(T, T)>,
) -> KernelResult<()> {
    validate_binary_lens(
        (out.len(), out_shape),
        (inp1.len(), inp1_shape),
        (inp2.len(), inp2_shape),
    )?;
    let kernel = match activation {
        Some((min, max)) => FloatArithmetic::new(op).with_activation(min, max),
        None => FloatArithmetic::new(op),
    };
    dispatch(&kernel, out, out_shape, inp1, inp1_shape, inp2, inp2_shape, KernelArgs::default())
}

/// Allocating form of [`quantized_binary`]; the output shape is the
/// broadcast of the input shapes.
pub fn broadcast_quantized<T: Quantized>(
    op: ArithmeticOperator,
    lhs: &Tensor4<T>,
    rhs: &Tensor4<T>,
    params: &BinaryQuantParams,
) -> KernelResult<Tensor4<T>> {
    let out_shape = Shape4::broadcast(&lhs.shape, &rhs.shape)?;
    let mut out = Tensor4::zeros(out_shape)?;
    quantized_binary(
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

/// Allocating form of [`float_binary`].
pub fn broadcast_float<T: Float>(
    op: ArithmeticOperator,
    lhs: &Tensor4<T>,
    rhs: &Tensor4<T>,
    activation: Option<(T, T)>,
) -> KernelResult<Tensor4<T>> {
    let out_shape = Shape4::broadcast(&lhs.shape, &rhs.shape)?;
    let mut out = Tensor4::zeros(out_shape)?;
    float_binary(
        op,
        out.as_mut_slice(),
        &out_shape,
        lhs.as_slice(),
        &lhs.shape,
        rhs.as_slice(),
        &rhs.shape,
        activation,
    )?;
    Ok(out)
}
