//! # Kernel Arguments Module
//!
//! The plain argument block handed to every kernel invocation.
//!
//! The dispatcher owns one per call, fills in the loop extents for the
//! chosen sweep pattern, and passes it by reference to each kernel call.
//! It never outlives the call.

use crate::structs::quant::BinaryQuantParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelArgs {
    /// Quantization of both inputs and the output. Float kernels ignore it.
    pub quant: BinaryQuantParams,
    /// Length of the contiguous inner run of a 2D kernel call.
    pub in_lc: usize,
    /// Number of inner runs of a 2D kernel call.
    pub out_lc: usize,
    /// Element count of a 1D kernel call.
    pub num_elm: usize,
    /// Set when the dispatcher exchanged the operands, so the kernel's first
    /// operand is the caller's second one.
    pub sign_flag: bool,
}

impl KernelArgs {
    pub fn new(quant: BinaryQuantParams) -> Self {
        KernelArgs { quant, in_lc: 0, out_lc: 0, num_elm: 0, sign_flag: false }
    }

    /// Exchanges the roles of the two inputs: their quantization parameters
    /// trade places and `sign_flag` records the swap.
    #[inline]
    pub fn swap_operands(&mut self) {
        self.quant.swap_inputs();
        self.sign_flag = true;
    }

    /// Puts a pair of kernel-side operands back into the caller's order.
    #[inline(always)]
    pub fn caller_order<T>(&self, a: T, b: T) -> (T, T) {
        if self.sign_flag { (b, a) } else { (a, b) }
    }
}

impl Default for KernelArgs {
    fn default() -> Self {
        KernelArgs::new(BinaryQuantParams::identity::<i8>())
    }
}
