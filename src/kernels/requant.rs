// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Requantization Module
//!
//! Fixed-point primitives shared by every quantized kernel.
//!
//! A positive real factor `r` is carried as a Q31 `multiplier` in
//! `[2^30, 2^31)` and an exponent `shift`, with `r ~= multiplier * 2^(shift - 31)`.
//! Applying it never truncates: both [`RequantMode`]s round to nearest.

use num_traits::Float as NumFloat;

use crate::structs::quant::RequantMode;

/// Clamps a wide intermediate into `i32`.
#[inline(always)]
pub fn saturate_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// High 32 bits of `2 * a * b`, rounded to nearest.
///
/// The one overflowing input pair, `i32::MIN * i32::MIN`, saturates to `i32::MAX`.
#[inline(always)]
pub fn saturating_rounding_doubling_high_mul(a: i32, b: i32) -> i32 {
    if a == i32::MIN && b == i32::MIN {
        return i32::MAX;
    }
    let ab = a as i64 * b as i64;
    let nudge: i64 = if ab >= 0 { 1 << 30 } else { 1 - (1 << 30) };
    ((ab + nudge) / (1i64 << 31)) as i32
}

/// Arithmetic right shift by `exponent` in `[0, 31]`, rounding half away
/// from zero.
#[inline(always)]
pub fn rounding_divide_by_pot(x: i32, exponent: u32) -> i32 {
    debug_assert!(exponent <= 31);
    let mask = ((1i64 << exponent) - 1) as i32;
    let remainder = x & mask;
    let threshold = (mask >> 1) + (x < 0) as i32;
    (x >> exponent) + (remainder > threshold) as i32
}

/// Scales `x` by `multiplier * 2^(shift - 31)` with rounding.
///
/// `shift` is in `[-31, 31]`. In [`RequantMode::DoubleRounding`] a positive
/// shift is applied as a saturating left shift before the multiply and a
/// negative one as a rounding right shift after it. In
/// [`RequantMode::SingleRounding`] the product is formed in 64 bits and
/// shifted once, rounding half up.
#[inline(always)]
pub fn multiply_by_quantized_multiplier(
    x: i32,
    multiplier: i32,
    shift: i32,
    mode: RequantMode,
) -> i32 {
    match mode {
        RequantMode::DoubleRounding => {
            let left_shift = shift.max(0) as u32;
            let right_shift = (-shift).max(0) as u32;
            let shifted = saturate_i32((x as i64) << left_shift);
            let high = saturating_rounding_doubling_high_mul(shifted, multiplier);
            rounding_divide_by_pot(high, right_shift)
        }
        RequantMode::SingleRounding => {
            let product = x as i64 * multiplier as i64;
            let total_shift = 31 - shift;
            if total_shift <= 0 {
                return saturate_i32(product.saturating_mul(1i64 << (-total_shift)));
            }
            let round = 1i64 << (total_shift - 1);
            saturate_i32((product + round) >> total_shift)
        }
    }
}

/// Scales a 64-bit accumulator by `multiplier * 2^(shift - 31)`.
///
/// The product is formed in 128 bits and shifted once, rounding half up,
/// so wide products such as 16-bit squares never lose their high bits.
/// The result saturates to `i64`.
#[inline(always)]
pub fn multiply_by_quantized_multiplier_wide(x: i64, multiplier: i32, shift: i32) -> i64 {
    let product = x as i128 * multiplier as i128;
    let total_shift = 31 - shift;
    let scaled = if total_shift <= 0 {
        product.saturating_mul(1i128 << (-total_shift))
    } else {
        (product + (1i128 << (total_shift - 1))) >> total_shift
    };
    scaled.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Splits `x` into a fraction in `[0.5, 1)` (sign carried on the fraction)
/// and a power-of-two exponent.
fn frexp(x: f64) -> (f64, i32) {
    let (mantissa, exponent, sign) = NumFloat::integer_decode(x);
    if mantissa == 0 {
        return (0.0, 0);
    }
    // normalise subnormals to a 53-bit mantissa
    let lz = mantissa.leading_zeros() as i32 - 11;
    let mantissa = mantissa << lz;
    let frac = sign as f64 * (mantissa as f64 / (1u64 << 53) as f64);
    (frac, exponent as i32 - lz + 53)
}

/// Encodes a real factor as `(multiplier, shift)`.
///
/// Zero, non-finite and underflowing factors encode as `(0, 0)`. Factors too
/// large for a shift of 31 saturate to the largest representable one.
pub fn quantize_multiplier(real: f64) -> (i32, i32) {
    if real == 0.0 || !real.is_finite() {
        return (0, 0);
    }
    let (q, mut shift) = frexp(real);
    let mut q_fixed = (q * (1i64 << 31) as f64).round() as i64;
    if q_fixed == 1i64 << 31 {
        q_fixed /= 2;
        shift += 1;
    }
    if shift < -31 {
        return (0, 0);
    }
    if shift > 31 {
        return (i32::MAX, 31);
    }
    (q_fixed as i32, shift)
}
