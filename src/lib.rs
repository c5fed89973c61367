//! # **Minbcast** - *Rank-4 Broadcast Dispatch for Quantized Elementwise Kernels*
//!
//! Resolves NumPy-style broadcasting between two rank-4 tensors and drives
//! elementwise kernels over the result with the cheapest sweep pattern
//! available.
//!
//! ## Layers
//! - **Resolver**: [`BroadcastPlan::resolve`] checks shape compatibility and
//!   derives per-input strides, zero on broadcast axes.
//! - **Dispatcher**: [`dispatch`] picks an [`IterationStrategy`] and calls a
//!   [`BroadcastKernel`]'s 2D or 1D inner loop, swapping operand roles where
//!   needed and recording that in [`KernelArgs::sign_flag`].
//! - **Kernels**: portable quantized (`int8`, `uint8`, `int16`) and float
//!   (`f32`, `f64`) arithmetic and comparison variants.
//! - **Requantization**: Q31 fixed-point multiplier/shift arithmetic with
//!   selectable rounding, see [`RequantMode`].
//! - **Entry points**: validating slice and [`Tensor4`] functions in
//!   [`kernels::routing`].
//!
//! ## Example
//! ```rust
//! use minbcast::{ArithmeticOperator, BinaryQuantParams, Tensor4, broadcast_quantized};
//!
//! let a = Tensor4::from_slice(&[4], &[1i8, 2, 3, 4]).unwrap();
//! let b = Tensor4::scalar(10i8);
//! let params = BinaryQuantParams::identity::<i8>();
//! let out = broadcast_quantized(ArithmeticOperator::Add, &a, &b, &params).unwrap();
//! assert_eq!(out.as_slice(), &[11, 12, 13, 14]);
//! ```
//!
//! ## Features
//! - `single_rounding`: default [`RequantMode`] becomes
//!   [`RequantMode::SingleRounding`].
//!
//! The crate emits `tracing` events (strategy selection at `trace`,
//! rejected inputs at `debug`) and installs no subscriber.

pub mod enums {
    pub mod error;
    pub mod operators;
}

pub mod structs {
    pub mod args;
    pub mod plan;
    pub mod quant;
    pub mod shape;
    pub mod tensor;
}

pub mod traits {
    pub mod kernel;
    pub mod type_unions;
}

pub mod kernels {
    pub mod dispatch;
    pub mod requant;
    pub mod elementwise {
        pub mod compare;
        pub mod float;
        pub mod quantized;
    }
    pub mod routing;
}

pub mod utils;

pub use enums::error::{KernelError, KernelResult, status_of};
pub use enums::operators::{ArithmeticOperator, ComparisonOperator};

pub use structs::args::KernelArgs;
pub use structs::plan::{BroadcastPlan, IterationStrategy};
pub use structs::quant::{AffineQuantization, BinaryQuantParams, QuantParams, RequantMode};
pub use structs::shape::{RANK, Shape4};
pub use structs::tensor::Tensor4;

pub use traits::kernel::BroadcastKernel;
pub use traits::type_unions::{Float, Quantized};

pub use kernels::dispatch::dispatch;
pub use kernels::elementwise::compare::{FloatComparison, QuantizedComparison};
pub use kernels::elementwise::float::FloatArithmetic;
pub use kernels::elementwise::quantized::QuantizedArithmetic;
pub use kernels::routing::{
    broadcast_compare_float, broadcast_compare_quantized, broadcast_float, broadcast_quantized,
    float_binary, float_compare, quantized_binary, quantized_compare,
};

pub use vec64::{Vec64, vec64};
