// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Quantized Arithmetic Kernels
//!
//! Portable 1D/2D kernels for affine-quantized `int8`, `uint8` and `int16`
//! data.
//!
//! Per element:
//! 1. de-bias each input by its zero point and apply the common left shift,
//! 2. scale each by its own Q31 multiplier (rounded),
//! 3. combine in `i64` (sum, difference, product, squared difference, or
//!    selection for min/max),
//! 4. rescale by the output multiplier, re-bias by the output zero point,
//! 5. clamp into the activation range and narrow.
//!
//! Min/max stop after step 3 and emit the winning input's raw code.

use std::marker::PhantomData;

use num_traits::AsPrimitive;

use crate::enums::error::{KernelError, KernelResult};
use crate::enums::operators::ArithmeticOperator;
use crate::structs::args::KernelArgs;
use crate::traits::kernel::{BroadcastKernel, sweep_2d};
use crate::traits::type_unions::Quantized;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuantizedOp {
    Add,
    Subtract,
    Multiply,
    SquaredDifference,
    Minimum,
    Maximum,
}

impl TryFrom<ArithmeticOperator> for QuantizedOp {
    type Error = KernelError;

    fn try_from(op: ArithmeticOperator) -> KernelResult<Self> {
        Ok(match op {
            ArithmeticOperator::Add => QuantizedOp::Add,
            ArithmeticOperator::Subtract => QuantizedOp::Subtract,
            ArithmeticOperator::Multiply => QuantizedOp::Multiply,
            ArithmeticOperator::SquaredDifference => QuantizedOp::SquaredDifference,
            ArithmeticOperator::Minimum => QuantizedOp::Minimum,
            ArithmeticOperator::Maximum => QuantizedOp::Maximum,
            ArithmeticOperator::Divide => {
                return Err(KernelError::UnsupportedOperator(
                    "divide is only defined for float data".into(),
                ));
            }
        })
    }
}

/// Elementwise arithmetic on quantized codes of type `T`.
#[derive(Debug, Clone, Copy)]
pub struct QuantizedArithmetic<T> {
    op: QuantizedOp,
    _marker: PhantomData<T>,
}

impl<T: Quantized> QuantizedArithmetic<T> {
    /// Errors for [`ArithmeticOperator::Divide`], which has no quantized form.
    pub fn new(operator: ArithmeticOperator) -> KernelResult<Self> {
        let op = QuantizedOp::try_from(operator)?;
        Ok(QuantizedArithmetic { op, _marker: PhantomData })
    }

    /// Combines one element pair given both raw codes and their scaled values.
    #[inline(always)]
    fn combine(&self, ra: i32, sa: i32, rb: i32, sb: i32, args: &KernelArgs) -> T {
        let q = &args.quant;
        let (wa, wb) = (sa as i64, sb as i64);
        let raw = match self.op {
            QuantizedOp::Add => q.out.rescale_wide(wa + wb, q.mode),
            QuantizedOp::Subtract => {
                let d = if args.sign_flag { wb - wa } else { wa - wb };
                q.out.rescale_wide(d, q.mode)
            }
            // int16 products and squares overflow i32
            QuantizedOp::Multiply => q.out.rescale_wide(wa * wb, q.mode),
            QuantizedOp::SquaredDifference => {
                let d = wa - wb;
                q.out.rescale_wide(d.saturating_mul(d), q.mode)
            }
            QuantizedOp::Minimum | QuantizedOp::Maximum => {
                let ((r1, s1), (r2, s2)) = args.caller_order((ra, sa), (rb, sb));
                let first = if self.op == QuantizedOp::Minimum { s1 <= s2 } else { s1 >= s2 };
                if first { r1 } else { r2 }
            }
        };
        T::from_i32_saturating(raw.clamp(q.activation_min, q.activation_max))
    }

    #[inline(always)]
    fn scale_inp1(&self, raw: i32, args: &KernelArgs) -> i32 {
        let q = &args.quant;
        q.inp1.dequantize(raw, q.left_shift, q.mode)
    }

    #[inline(always)]
    fn scale_inp2(&self, raw: i32, args: &KernelArgs) -> i32 {
        let q = &args.quant;
        q.inp2.dequantize(raw, q.left_shift, q.mode)
    }
}

impl<T: Quantized> BroadcastKernel for QuantizedArithmetic<T> {
    type In = T;
    type Out = T;

    fn run_2d(&self, out: &mut [T], a: &[T], b: &[T], args: &KernelArgs) {
        sweep_2d(out, a, b, args, |x, y| {
            let (ra, rb): (i32, i32) = (x.as_(), y.as_());
            self.combine(ra, self.scale_inp1(ra, args), rb, self.scale_inp2(rb, args), args)
        });
    }

    fn run_1d(&self, out: &mut [T], a: &[T], b: &[T], args: &KernelArgs) {
        debug_assert_eq!(out.len(), args.num_elm);
        debug_assert_eq!(b.len(), 1);
        // the broadcast element is scaled once for the whole run
        let rb: i32 = b[0].as_();
        let sb = self.scale_inp2(rb, args);
        for (o, &x) in out.iter_mut().zip(a) {
            let ra: i32 = x.as_();
            *o = self.combine(ra, self.scale_inp1(ra, args), rb, sb, args);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::quant::{AffineQuantization, BinaryQuantParams, QuantParams, RequantMode};

    fn args_2d(params: BinaryQuantParams, in_lc: usize, out_lc: usize) -> KernelArgs {
        KernelArgs { in_lc, out_lc, ..KernelArgs::new(params) }
    }

    #[test]
    fn test_divide_is_rejected() {
        assert!(matches!(
            QuantizedArithmetic::<i8>::new(ArithmeticOperator::Divide),
            Err(KernelError::UnsupportedOperator(_))
        ));
    }

    #[test]
    fn test_identity_add_2d_repeats_rhs() {
        let k = QuantizedArithmetic::<i8>::new(ArithmeticOperator::Add).unwrap();
        let args = args_2d(BinaryQuantParams::identity::<i8>(), 2, 2);
        let mut out = [0i8; 4];
        k.run_2d(&mut out, &[1, 2, 3, 4], &[10, 20], &args);
        assert_eq!(out, [11, 22, 13, 24]);
    }

    #[test]
    fn test_add_saturates_to_activation_range() {
        let k = QuantizedArithmetic::<i8>::new(ArithmeticOperator::Add).unwrap();
        let params = BinaryQuantParams::identity::<i8>().with_activation(-10, 50);
        let args = KernelArgs { num_elm: 3, ..KernelArgs::new(params) };
        let mut out = [0i8; 3];
        k.run_1d(&mut out, &[100, -100, 5], &[10], &args);
        assert_eq!(out, [50, -10, 15]);
    }

    #[test]
    fn test_subtract_honours_sign_flag() {
        let k = QuantizedArithmetic::<i16>::new(ArithmeticOperator::Subtract).unwrap();
        let params = BinaryQuantParams::identity::<i16>();
        let mut args = KernelArgs { num_elm: 2, ..KernelArgs::new(params) };
        let mut out = [0i16; 2];
        k.run_1d(&mut out, &[100, 200], &[1], &args);
        assert_eq!(out, [99, 199]);

        args.sign_flag = true;
        k.run_1d(&mut out, &[100, 200], &[1], &args);
        assert_eq!(out, [-99, -199]);
    }

    #[test]
    fn test_zero_points_are_removed_and_restored() {
        // uint8 with zero points 128/100/50: (130-128) + (103-100) + 50 = 55
        let k = QuantizedArithmetic::<u8>::new(ArithmeticOperator::Add).unwrap();
        let params = BinaryQuantParams::identity::<u8>().with_zero_points(128, 100, 50);
        let args = KernelArgs { num_elm: 1, ..KernelArgs::new(params) };
        let mut out = [0u8; 1];
        k.run_1d(&mut out, &[130], &[103], &args);
        assert_eq!(out, [55]);
    }

    #[test]
    fn test_multiply_and_squared_difference() {
        let mut params = BinaryQuantParams::identity::<i16>();
        let args = KernelArgs { num_elm: 3, ..KernelArgs::new(params) };
        let mut out = [0i16; 3];

        let mul = QuantizedArithmetic::<i16>::new(ArithmeticOperator::Multiply).unwrap();
        mul.run_1d(&mut out, &[2, -3, 400], &[7], &args);
        assert_eq!(out, [14, -21, 2800]);

        // output scale of 1/4
        params.out = QuantParams::new(0, 1 << 30, -1);
        let args = KernelArgs { num_elm: 3, ..KernelArgs::new(params) };
        let sq = QuantizedArithmetic::<i16>::new(ArithmeticOperator::SquaredDifference).unwrap();
        sq.run_1d(&mut out, &[2, 12, 0], &[4], &args);
        assert_eq!(out, [1, 16, 4]);
    }

    #[test]
    fn test_min_max_compare_scaled_values() {
        // input 2 is on twice the scale of input 1
        let mut params = BinaryQuantParams::identity::<i8>();
        params.inp2 = QuantParams::new(0, 1 << 30, 2);
        let args = KernelArgs { num_elm: 3, ..KernelArgs::new(params) };
        let mut out = [0i8; 3];

        let min = QuantizedArithmetic::<i8>::new(ArithmeticOperator::Minimum).unwrap();
        // scaled rhs = 10
        min.run_1d(&mut out, &[3, 12, 10], &[5], &args);
        assert_eq!(out, [3, 5, 10]);

        let max = QuantizedArithmetic::<i8>::new(ArithmeticOperator::Maximum).unwrap();
        max.run_1d(&mut out, &[3, 12, 10], &[5], &args);
        assert_eq!(out, [5, 12, 10]);
    }

    #[test]
    fn test_int16_squared_difference_keeps_wide_square() {
        // real 1000 vs -1000 at scale 1: (2000)^2 / 1000 = 4000
        let a = AffineQuantization::new(1.0, 0);
        let o = AffineQuantization::new(1000.0, 0);
        let sq = QuantizedArithmetic::<i16>::new(ArithmeticOperator::SquaredDifference).unwrap();
        for mode in [RequantMode::DoubleRounding, RequantMode::SingleRounding] {
            let params = BinaryQuantParams::squared_difference::<i16>(&a, &a, &o).with_mode(mode);
            let args = KernelArgs { num_elm: 3, ..KernelArgs::new(params) };
            let mut out = [0i16; 3];
            sq.run_1d(&mut out, &[1000, -1000, 3000], &[-1000], &args);
            assert_eq!(out, [4000, 0, 16000], "{mode:?}");
        }
    }

    #[test]
    fn test_int16_multiply_with_zero_point_keeps_wide_product() {
        // codes 30000 with zero point -30000 are real 60000; 3.6e9 / 1e6 = 3600
        let a = AffineQuantization::new(1.0, -30000);
        let o = AffineQuantization::new(1.0e6, 0);
        let mul = QuantizedArithmetic::<i16>::new(ArithmeticOperator::Multiply).unwrap();
        for mode in [RequantMode::DoubleRounding, RequantMode::SingleRounding] {
            let params = BinaryQuantParams::multiplicative::<i16>(&a, &a, &o).with_mode(mode);
            let args = KernelArgs { num_elm: 3, ..KernelArgs::new(params) };
            let mut out = [0i16; 3];
            mul.run_1d(&mut out, &[30000, -30000, -32768], &[30000], &args);
            // real 0 * 60000 = 0; real -2768 * 60000 = -166.08
            assert_eq!(out, [3600, 0, -166], "{mode:?}");
        }
    }
}
