// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Broadcast Dispatch Module
//!
//! Walks a rank-4 broadcast with the cheapest sweep pattern available and
//! drives a [`BroadcastKernel`] over it.
//!
//! Each buffer is tracked by one element cursor. Outputs are written exactly
//! once, by exactly one kernel call, in row-major order.

use tracing::trace;

use crate::enums::error::KernelResult;
use crate::structs::args::KernelArgs;
use crate::structs::plan::{BroadcastPlan, IterationStrategy};
use crate::structs::shape::{RANK, Shape4};
use crate::traits::kernel::BroadcastKernel;

/// One input as the dispatcher sees it: its data and its broadcast strides.
struct Operand<'a, T> {
    data: &'a [T],
    strides: [usize; RANK],
}

impl<'a, T> Operand<'a, T> {
    #[inline(always)]
    fn run(&self, start: usize, len: usize) -> &'a [T] {
        debug_assert!(start + len <= self.data.len(), "operand run out of bounds");
        &self.data[start..start + len]
    }
}

/// Exchanges the operand roles so that `lhs` is the varying side, recording
/// the swap in `args`.
#[inline]
fn swap_roles<'a, T>(lhs: &mut Operand<'a, T>, rhs: &mut Operand<'a, T>, args: &mut KernelArgs) {
    std::mem::swap(lhs, rhs);
    args.swap_operands();
}

/// Computes `out = inp1 op inp2` with rank-4 broadcasting.
///
/// Shapes are resolved first; on a shape error nothing is written and no
/// kernel runs. Buffer lengths and parameter ranges are the caller's
/// responsibility, see [`crate::kernels::routing`] for validating entry
/// points.
///
/// `args` carries the quantization parameters; the loop extents and
/// `sign_flag` are filled in here.
pub fn dispatch<K: BroadcastKernel>(
    kernel: &K,
    out: &mut [K::Out],
    out_shape: &Shape4,
    inp1: &[K::In],
    inp1_shape: &Shape4,
    inp2: &[K::In],
    inp2_shape: &Shape4,
    mut args: KernelArgs,
) -> KernelResult<()> {
    let plan = BroadcastPlan::resolve(out_shape, inp1_shape, inp2_shape)?;
    let strategy = plan.strategy();
    let dims = out_shape.dims();

    debug_assert!(out.len() >= plan.num_elements(), "output buffer too short");

    let mut lhs = Operand { data: inp1, strides: plan.inp1_strides };
    let mut rhs = Operand { data: inp2, strides: plan.inp2_strides };
    args.sign_flag = false;

    match strategy {
        IterationStrategy::Contiguous => {
            let n = dims[0] * plan.inp1_strides[0];
            args.in_lc = n;
            args.out_lc = 1;
            trace!(?strategy, in_lc = n, "broadcast dispatch");
            kernel.run_2d(&mut out[..n], lhs.run(0, n), rhs.run(0, n), &args);
        }
        IterationStrategy::ScalarBroadcast => {
            if plan.inp1_is_scalar {
                swap_roles(&mut lhs, &mut rhs, &mut args);
            }
            let n = plan.num_elements();
            args.num_elm = n;
            trace!(?strategy, num_elm = n, sign_flag = args.sign_flag, "broadcast dispatch");
            kernel.run_1d(&mut out[..n], lhs.run(0, n), rhs.run(0, 1), &args);
        }
        IterationStrategy::InnerContiguous => {
            args.in_lc = dims[2] * dims[3];
            args.out_lc = 1;
            if lhs.strides[2] == 0 {
                swap_roles(&mut lhs, &mut rhs, &mut args);
                args.in_lc = dims[3];
                args.out_lc = dims[2];
            } else if rhs.strides[2] == 0 {
                args.in_lc = dims[3];
                args.out_lc = dims[2];
            }
            let (in_lc, out_lc) = (args.in_lc, args.out_lc);
            let run = in_lc * out_lc;
            trace!(?strategy, in_lc, out_lc, sign_flag = args.sign_flag, "broadcast dispatch");

            let mut out_pos = 0;
            for i0 in 0..dims[0] {
                let mut p1 = i0 * lhs.strides[0];
                let mut p2 = i0 * rhs.strides[0];
                for _ in 0..dims[1] {
                    kernel.run_2d(
                        &mut out[out_pos..out_pos + run],
                        lhs.run(p1, run),
                        rhs.run(p2, in_lc),
                        &args,
                    );
                    out_pos += run;
                    p1 += lhs.strides[1];
                    p2 += rhs.strides[1];
                }
            }
        }
        IterationStrategy::InnerBroadcast => {
            if lhs.strides[3] == 0 {
                swap_roles(&mut lhs, &mut rhs, &mut args);
            }
            let n = dims[3];
            args.num_elm = n;
            trace!(?strategy, num_elm = n, sign_flag = args.sign_flag, "broadcast dispatch");

            let mut out_pos = 0;
            for i0 in 0..dims[0] {
                let (p1_0, p2_0) = (i0 * lhs.strides[0], i0 * rhs.strides[0]);
                for i1 in 0..dims[1] {
                    let mut p1 = p1_0 + i1 * lhs.strides[1];
                    let mut p2 = p2_0 + i1 * rhs.strides[1];
                    for _ in 0..dims[2] {
                        kernel.run_1d(
                            &mut out[out_pos..out_pos + n],
                            lhs.run(p1, n),
                            rhs.run(p2, 1),
                            &args,
                        );
                        out_pos += n;
                        p1 += lhs.strides[2];
                        p2 += rhs.strides[2];
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::enums::error::KernelError;
    use crate::traits::kernel::{sweep_1d, sweep_2d};

    /// Records every call and computes `a - b` in the caller's order.
    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<(char, usize, usize, bool)>>,
    }

    impl BroadcastKernel for Recorder {
        type In = i32;
        type Out = i32;

        fn run_2d(&self, out: &mut [i32], a: &[i32], b: &[i32], args: &KernelArgs) {
            self.calls.borrow_mut().push(('2', args.in_lc, args.out_lc, args.sign_flag));
            sweep_2d(out, a, b, args, |x, y| {
                let (x, y) = args.caller_order(x, y);
                x - y
            });
        }

        fn run_1d(&self, out: &mut [i32], a: &[i32], b: &[i32], args: &KernelArgs) {
            self.calls.borrow_mut().push(('1', args.num_elm, 0, args.sign_flag));
            sweep_1d(out, a, b, args, |x, y| {
                let (x, y) = args.caller_order(x, y);
                x - y
            });
        }
    }

    type Calls = Vec<(char, usize, usize, bool)>;

    fn run(out_shape: [usize; 4], a_shape: [usize; 4], b_shape: [usize; 4]) -> (Vec<i32>, Calls) {
        let (os, as_, bs) = (Shape4(out_shape), Shape4(a_shape), Shape4(b_shape));
        let a: Vec<i32> = (0..as_.num_elements() as i32).map(|v| v * 100).collect();
        let b: Vec<i32> = (0..bs.num_elements() as i32).collect();
        let mut out = vec![i32::MIN; os.num_elements()];
        let k = Recorder::default();
        dispatch(&k, &mut out, &os, &a, &as_, &b, &bs, KernelArgs::default()).unwrap();
        (out, k.calls.into_inner())
    }

    #[test]
    fn test_contiguous_single_2d_call() {
        let (out, calls) = run([1, 2, 1, 3], [1, 2, 1, 3], [1, 2, 1, 3]);
        assert_eq!(out, vec![0, 99, 198, 297, 396, 495]);
        assert_eq!(calls, vec![('2', 6, 1, false)]);
    }

    #[test]
    fn test_scalar_rhs() {
        let (out, calls) = run([1, 1, 2, 2], [1, 1, 2, 2], [1, 1, 1, 1]);
        assert_eq!(out, vec![0, 100, 200, 300]);
        assert_eq!(calls, vec![('1', 4, 0, false)]);
    }

    #[test]
    fn test_scalar_lhs_swaps_and_keeps_order() {
        // [0] - [0, 1, 2, 3]
        let (out, calls) = run([1, 1, 2, 2], [1, 1, 1, 1], [1, 1, 2, 2]);
        assert_eq!(out, vec![0, -1, -2, -3]);
        assert_eq!(calls, vec![('1', 4, 0, true)]);
    }

    #[test]
    fn test_row_broadcast_merges_inner_axes() {
        // a: (2, 1, 2, 2), b repeats along axis 0
        let (out, calls) = run([2, 1, 2, 2], [2, 1, 2, 2], [1, 1, 2, 2]);
        assert_eq!(out, vec![0, 99, 198, 297, 400, 499, 598, 697]);
        assert_eq!(calls, vec![('2', 4, 1, false), ('2', 4, 1, false)]);
    }

    #[test]
    fn test_axis2_broadcast_on_lhs_swaps() {
        // a: (1, 1, 1, 3) = [0, 100, 200], b: (1, 1, 2, 3) = [0..6]
        let (out, calls) = run([1, 1, 2, 3], [1, 1, 1, 3], [1, 1, 2, 3]);
        assert_eq!(out, vec![0, 99, 198, -3, 96, 195]);
        assert_eq!(calls, vec![('2', 3, 2, true)]);
    }

    #[test]
    fn test_inner_axis_broadcast() {
        // a: (1, 2, 1, 2) = [0, 100, 200, 300], b: (1, 2, 1, 1) = [0, 1]
        let (out, calls) = run([1, 2, 1, 2], [1, 2, 1, 2], [1, 2, 1, 1]);
        assert_eq!(out, vec![0, 100, 199, 299]);
        assert_eq!(calls, vec![('1', 2, 0, false), ('1', 2, 0, false)]);
    }

    #[test]
    fn test_inner_axis_broadcast_on_lhs_swaps() {
        // a: (1, 1, 2, 1) = [0, 100], b: (1, 1, 2, 3) = [0..6]
        let (out, calls) = run([1, 1, 2, 3], [1, 1, 2, 1], [1, 1, 2, 3]);
        assert_eq!(out, vec![0, -1, -2, 97, 96, 95]);
        assert_eq!(calls, vec![('1', 3, 0, true), ('1', 3, 0, true)]);
    }

    #[test]
    fn test_outer_product() {
        // a: (1, 1, 3, 1) column, b: (1, 1, 1, 2) row
        let (out, calls) = run([1, 1, 3, 2], [1, 1, 3, 1], [1, 1, 1, 2]);
        assert_eq!(out, vec![0, -1, 100, 99, 200, 199]);
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|c| c.3));
    }

    #[test]
    fn test_shape_error_leaves_output_untouched() {
        let k = Recorder::default();
        let mut out = vec![7i32; 6];
        let a = vec![1i32; 6];
        let b = vec![1i32; 4];
        let res = dispatch(
            &k,
            &mut out,
            &Shape4([1, 1, 2, 3]),
            &a,
            &Shape4([1, 1, 2, 3]),
            &b,
            &Shape4([1, 1, 2, 2]),
            KernelArgs::default(),
        );
        assert_eq!(
            res,
            Err(KernelError::BroadcastIncompatible { axis: 3, out: 3, inp1: 3, inp2: 2 })
        );
        assert_eq!(out, vec![7; 6]);
        assert!(k.calls.borrow().is_empty());
    }
}
