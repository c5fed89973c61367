// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Routing Module
//!
//! Operator entry points: buffer and parameter validation, kernel variant
//! selection, then broadcast dispatch.

pub mod arithmetic;
pub mod compare;

pub use arithmetic::{broadcast_float, broadcast_quantized, float_binary, quantized_binary};
pub use compare::{
    broadcast_compare_float, broadcast_compare_quantized, float_compare, quantized_compare,
};
