// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Comparison Kernels
//!
//! Elementwise comparisons writing one boolean byte (0 or 1) per element.
//! Quantized inputs are compared after de-biasing and scaling onto a common
//! scale; there is no output stage.

use std::marker::PhantomData;

use num_traits::AsPrimitive;

use crate::enums::operators::ComparisonOperator;
use crate::structs::args::KernelArgs;
use crate::traits::kernel::{BroadcastKernel, sweep_1d, sweep_2d};
use crate::traits::type_unions::{Float, Quantized};

/// Comparison of quantized codes of type `T`.
#[derive(Debug, Clone, Copy)]
pub struct QuantizedComparison<T> {
    operator: ComparisonOperator,
    _marker: PhantomData<T>,
}

impl<T: Quantized> QuantizedComparison<T> {
    pub fn new(operator: ComparisonOperator) -> Self {
        QuantizedComparison { operator, _marker: PhantomData }
    }

    #[inline(always)]
    fn effective(&self, args: &KernelArgs) -> ComparisonOperator {
        if args.sign_flag { self.operator.mirrored() } else { self.operator }
    }
}

impl<T: Quantized> BroadcastKernel for QuantizedComparison<T> {
    type In = T;
    type Out = u8;

    fn run_2d(&self, out: &mut [u8], a: &[T], b: &[T], args: &KernelArgs) {
        let op = self.effective(args);
        let q = &args.quant;
        sweep_2d(out, a, b, args, |x, y| {
            let sa = q.inp1.dequantize(x.as_(), q.left_shift, q.mode);
            let sb = q.inp2.dequantize(y.as_(), q.left_shift, q.mode);
            op.evaluate(sa, sb) as u8
        });
    }

    fn run_1d(&self, out: &mut [u8], a: &[T], b: &[T], args: &KernelArgs) {
        let op = self.effective(args);
        let q = &args.quant;
        let sb = q.inp2.dequantize(b[0].as_(), q.left_shift, q.mode);
        sweep_1d(out, a, b, args, |x, _| {
            let sa = q.inp1.dequantize(x.as_(), q.left_shift, q.mode);
            op.evaluate(sa, sb) as u8
        });
    }
}

/// Comparison of floats.
#[derive(Debug, Clone, Copy)]
pub struct FloatComparison<T> {
    operator: ComparisonOperator,
    _marker: PhantomData<T>,
}

impl<T: Float> FloatComparison<T> {
    pub fn new(operator: ComparisonOperator) -> Self {
        FloatComparison { operator, _marker: PhantomData }
    }
}

impl<T: Float> BroadcastKernel for FloatComparison<T> {
    type In = T;
    type Out = u8;

    fn run_2d(&self, out: &mut [u8], a: &[T], b: &[T], args: &KernelArgs) {
        sweep_2d(out, a, b, args, |x, y| {
            let (x, y) = args.caller_order(x, y);
            self.operator.evaluate(x, y) as u8
        });
    }

    fn run_1d(&self, out: &mut [u8], a: &[T], b: &[T], args: &KernelArgs) {
        sweep_1d(out, a, b, args, |x, y| {
            let (x, y) = args.caller_order(x, y);
            self.operator.evaluate(x, y) as u8
        });
    }
}
