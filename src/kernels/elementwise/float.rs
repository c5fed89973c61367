// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Float Arithmetic Kernels
//!
//! Portable 1D/2D kernels for `f32`/`f64` data. No zero point or multiplier
//! stage; an optional activation clamp is applied last.

use crate::enums::operators::ArithmeticOperator;
use crate::structs::args::KernelArgs;
use crate::traits::kernel::{BroadcastKernel, sweep_1d, sweep_2d};
use crate::traits::type_unions::Float;

/// Elementwise arithmetic on floats.
#[derive(Debug, Clone, Copy)]
pub struct FloatArithmetic<T> {
    operator: ArithmeticOperator,
    activation: Option<(T, T)>,
}

impl<T: Float> FloatArithmetic<T> {
    pub fn new(operator: ArithmeticOperator) -> Self {
        FloatArithmetic { operator, activation: None }
    }

    /// Clamps every result into `[min, max]`.
    pub fn with_activation(mut self, min: T, max: T) -> Self {
        self.activation = Some((min, max));
        self
    }

    #[inline(always)]
    fn apply(&self, a: T, b: T, args: &KernelArgs) -> T {
        // only subtract and divide care which operand came first
        let (x, y) = if self.operator.is_anti_symmetric() {
            args.caller_order(a, b)
        } else {
            (a, b)
        };
        let r = match self.operator {
            ArithmeticOperator::Add => x + y,
            ArithmeticOperator::Subtract => x - y,
            ArithmeticOperator::Multiply => x * y,
            ArithmeticOperator::Divide => x / y,
            ArithmeticOperator::Minimum => x.min(y),
            ArithmeticOperator::Maximum => x.max(y),
            ArithmeticOperator::SquaredDifference => (x - y) * (x - y),
        };
        match self.activation {
            Some((lo, hi)) => r.max(lo).min(hi),
            None => r,
        }
    }
}

impl<T: Float> BroadcastKernel for FloatArithmetic<T> {
    type In = T;
    type Out = T;

    fn run_2d(&self, out: &mut [T], a: &[T], b: &[T], args: &KernelArgs) {
        sweep_2d(out, a, b, args, |x, y| self.apply(x, y, args));
    }

    fn run_1d(&self, out: &mut [T], a: &[T], b: &[T], args: &KernelArgs) {
        sweep_1d(out, a, b, args, |x, y| self.apply(x, y, args));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divide_respects_operand_order() {
        let k = FloatArithmetic::<f32>::new(ArithmeticOperator::Divide);
        let mut args = KernelArgs { num_elm: 2, ..KernelArgs::default() };
        let mut out = [0f32; 2];

        k.run_1d(&mut out, &[8.0, 2.0], &[4.0], &args);
        assert_eq!(out, [2.0, 0.5]);

        args.sign_flag = true;
        k.run_1d(&mut out, &[8.0, 2.0], &[4.0], &args);
        assert_eq!(out, [0.5, 2.0]);
    }

    #[test]
    fn test_all_operators_2d() {
        let args = KernelArgs { in_lc: 2, out_lc: 1, ..KernelArgs::default() };
        let a = [3.0f64, -1.0];
        let b = [2.0f64, 4.0];
        let cases = [
            (ArithmeticOperator::Add, [5.0, 3.0]),
            (ArithmeticOperator::Subtract, [1.0, -5.0]),
            (ArithmeticOperator::Multiply, [6.0, -4.0]),
            (ArithmeticOperator::Divide, [1.5, -0.25]),
            (ArithmeticOperator::Minimum, [2.0, -1.0]),
            (ArithmeticOperator::Maximum, [3.0, 4.0]),
            (ArithmeticOperator::SquaredDifference, [1.0, 25.0]),
        ];
        for (op, expected) in cases {
            let mut out = [0f64; 2];
            FloatArithmetic::new(op).run_2d(&mut out, &a, &b, &args);
            assert_eq!(out, expected, "{op}");
        }
    }

    #[test]
    fn test_activation_clamp() {
        let k = FloatArithmetic::<f32>::new(ArithmeticOperator::Add).with_activation(0.0, 6.0);
        let args = KernelArgs { num_elm: 3, ..KernelArgs::default() };
        let mut out = [0f32; 3];
        k.run_1d(&mut out, &[-5.0, 1.0, 10.0], &[1.0], &args);
        assert_eq!(out, [0.0, 2.0, 6.0]);
    }
}
