//! # Broadcast Kernel Trait Module
//!
//! The two inner-loop shapes the dispatcher drives.
//!
//! Implementors only ever see one broadcasting direction: the first operand
//! varies with the output, the second operand is the one being re-read.
//! When the dispatcher had to exchange the caller's operands to get there,
//! [`KernelArgs::sign_flag`] is set and anti-symmetric operators must
//! compute `b op a`.

use crate::structs::args::KernelArgs;

pub trait BroadcastKernel {
    /// Input element type.
    type In: Copy;
    /// Output element type.
    type Out: Copy;

    /// `args.out_lc` repetitions of a contiguous run of `args.in_lc` elements.
    ///
    /// `out` and `a` hold `in_lc * out_lc` elements; `b` holds `in_lc` elements
    /// that are reused for every repetition.
    fn run_2d(&self, out: &mut [Self::Out], a: &[Self::In], b: &[Self::In], args: &KernelArgs);

    /// One flat run of `args.num_elm` elements against a single element.
    ///
    /// `out` and `a` hold `num_elm` elements; `b` holds exactly one.
    fn run_1d(&self, out: &mut [Self::Out], a: &[Self::In], b: &[Self::In], args: &KernelArgs);
}

/// Drives [`BroadcastKernel::run_2d`] through a per-element function, for
/// kernels without a dedicated vectorised body.
#[inline(always)]
pub(crate) fn sweep_2d<I: Copy, O, F>(out: &mut [O], a: &[I], b: &[I], args: &KernelArgs, f: F)
where
    F: Fn(I, I) -> O,
{
    let in_lc = args.in_lc;
    debug_assert_eq!(out.len(), in_lc * args.out_lc);
    debug_assert_eq!(a.len(), in_lc * args.out_lc);
    debug_assert_eq!(b.len(), in_lc);
    for (out_row, a_row) in out.chunks_exact_mut(in_lc).zip(a.chunks_exact(in_lc)) {
        for ((o, &x), &y) in out_row.iter_mut().zip(a_row).zip(b) {
            *o = f(x, y);
        }
    }
}

/// Drives [`BroadcastKernel::run_1d`] through a per-element function.
#[inline(always)]
pub(crate) fn sweep_1d<I: Copy, O, F>(out: &mut [O], a: &[I], b: &[I], args: &KernelArgs, f: F)
where
    F: Fn(I, I) -> O,
{
    debug_assert_eq!(out.len(), args.num_elm);
    debug_assert_eq!(a.len(), args.num_elm);
    debug_assert_eq!(b.len(), 1);
    let y = b[0];
    for (o, &x) in out.iter_mut().zip(a) {
        *o = f(x, y);
    }
}
