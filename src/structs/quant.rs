//! # Quantization Parameters Module
//!
//! Per-tensor affine quantization parameters and the bundle a binary
//! quantized operator consumes.
//!
//! A quantized code `q` with zero point `zp` represents the real value
//! `scale * (q - zp)`. Kernels never touch `scale` directly: it is folded
//! into a Q31 fixed-point `multiplier` and a power-of-two `shift`, so that
//! `scale ~= multiplier / 2^31 * 2^shift`.

use num_traits::AsPrimitive;
use tracing::debug;

use crate::enums::error::{KernelError, KernelResult};
use crate::kernels::requant::{
    multiply_by_quantized_multiplier, multiply_by_quantized_multiplier_wide, quantize_multiplier,
    saturate_i32,
};
use crate::traits::type_unions::Quantized;

/// Largest magnitude of a multiplier exponent.
pub const MAX_SHIFT: i32 = 31;
/// Largest common pre-multiplier left shift.
pub const MAX_LEFT_SHIFT: u32 = 31;

/// Default pre-multiplier left shift for 8-bit additive operators.
pub const ADDITIVE_LEFT_SHIFT_8BIT: u32 = 20;
/// Default pre-multiplier left shift for 16-bit additive operators.
pub const ADDITIVE_LEFT_SHIFT_16BIT: u32 = 15;
/// Pre-multiplier left shift used by squared difference.
pub const SQUARED_DIFFERENCE_LEFT_SHIFT: u32 = 7;
/// Pre-multiplier left shift used by comparisons.
pub const COMPARISON_LEFT_SHIFT: u32 = 8;

/// How the fixed-point multiplier stage rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequantMode {
    /// Left shift, saturating rounding doubling high multiply, then a
    /// rounding right shift. Two rounding steps.
    DoubleRounding,
    /// One 64-bit multiply followed by a single rounding right shift of
    /// `31 - shift`.
    SingleRounding,
}

impl Default for RequantMode {
    #[cfg(feature = "single_rounding")]
    fn default() -> Self {
        RequantMode::SingleRounding
    }

    #[cfg(not(feature = "single_rounding"))]
    fn default() -> Self {
        RequantMode::DoubleRounding
    }
}

/// Fixed-point view of one tensor's quantization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuantParams {
    pub zero_point: i32,
    /// Q31 multiplier, non-negative.
    pub multiplier: i32,
    /// Power-of-two exponent applied with the multiplier, in `[-31, 31]`.
    pub shift: i32,
}

impl QuantParams {
    #[inline]
    pub const fn new(zero_point: i32, multiplier: i32, shift: i32) -> Self {
        QuantParams { zero_point, multiplier, shift }
    }

    /// Zero point 0 and a multiplier of exactly 1.0 (`0.5 * 2^1`).
    #[inline]
    pub const fn identity() -> Self {
        QuantParams { zero_point: 0, multiplier: 1 << 30, shift: 1 }
    }

    /// Encodes the positive real scale factor `real` as multiplier and shift.
    pub fn from_real_multiplier(real: f64, zero_point: i32) -> Self {
        let (multiplier, shift) = quantize_multiplier(real);
        QuantParams { zero_point, multiplier, shift }
    }

    /// The real factor this multiplier/shift pair encodes.
    #[inline]
    pub fn real_multiplier(&self) -> f64 {
        self.multiplier as f64 / (1u64 << 31) as f64 * 2f64.powi(self.shift)
    }

    /// De-biases `raw`, applies the common `left_shift` and scales by this
    /// multiplier: `mbqm((raw - zp) << left_shift)`.
    #[inline]
    pub fn dequantize(&self, raw: i32, left_shift: u32, mode: RequantMode) -> i32 {
        let shifted = saturate_i32(((raw as i64) - self.zero_point as i64) << left_shift);
        multiply_by_quantized_multiplier(shifted, self.multiplier, self.shift, mode)
    }

    /// Scales a wide value by this multiplier and re-biases it by the zero
    /// point, without any clamping to a narrow type.
    #[inline]
    pub fn rescale(&self, value: i32, mode: RequantMode) -> i32 {
        multiply_by_quantized_multiplier(value, self.multiplier, self.shift, mode)
            .saturating_add(self.zero_point)
    }

    /// [`QuantParams::rescale`] for a 64-bit accumulator.
    ///
    /// Values that fit `i32` take the `mode` path unchanged. Wider values,
    /// such as 16-bit products and squares, are scaled in one 128-bit step
    /// with half-up rounding.
    #[inline]
    pub fn rescale_wide(&self, value: i64, mode: RequantMode) -> i32 {
        match i32::try_from(value) {
            Ok(v) => self.rescale(v, mode),
            Err(_) => {
                let scaled =
                    multiply_by_quantized_multiplier_wide(value, self.multiplier, self.shift);
                saturate_i32(scaled.saturating_add(self.zero_point as i64))
            }
        }
    }

    /// [`QuantParams::rescale`] narrowed into `T` with saturation.
    #[inline]
    pub fn requantize<T: Quantized>(&self, value: i32, mode: RequantMode) -> T {
        T::from_i32_saturating(self.rescale(value, mode))
    }

    /// Range checks the zero point against `T` and the multiplier/shift pair.
    pub fn validate<T: Quantized>(&self, tensor: &'static str) -> KernelResult<()> {
        let (min, max) = (T::min_i32() as i64, T::max_i32() as i64);
        check_range(tensor, "zero_point", self.zero_point as i64, min, max)?;
        check_range(tensor, "shift", self.shift as i64, -(MAX_SHIFT as i64), MAX_SHIFT as i64)?;
        check_range(tensor, "multiplier", self.multiplier as i64, 0, i32::MAX as i64)
    }
}

impl Default for QuantParams {
    fn default() -> Self {
        QuantParams::identity()
    }
}

pub(crate) fn check_range(
    tensor: &'static str,
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
) -> KernelResult<()> {
    if value < min || value > max {
        debug!(tensor, field, value, min, max, "quantization parameter rejected");
        return Err(KernelError::ParameterOutOfRange { tensor, field, value, min, max });
    }
    Ok(())
}

/// Real-valued affine quantization of a tensor: `real = scale * (q - zero_point)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineQuantization {
    pub scale: f64,
    pub zero_point: i32,
}

impl AffineQuantization {
    #[inline]
    pub const fn new(scale: f64, zero_point: i32) -> Self {
        AffineQuantization { scale, zero_point }
    }

    /// Nearest code for `x`, saturating at the bounds of `T`.
    #[inline]
    pub fn quantize<T: Quantized>(&self, x: f64) -> T {
        let q = (x / self.scale).round() + self.zero_point as f64;
        let q = q.clamp(T::min_i32() as f64, T::max_i32() as f64);
        T::from_i32_saturating(q as i32)
    }

    #[inline]
    pub fn dequantize<T: Quantized>(&self, code: T) -> f64 {
        let q: i32 = code.as_();
        self.scale * (q - self.zero_point) as f64
    }
}

/// Everything a quantized binary kernel needs besides the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BinaryQuantParams {
    pub inp1: QuantParams,
    pub inp2: QuantParams,
    pub out: QuantParams,
    /// Common left shift applied to both de-biased inputs before their
    /// multipliers, in `[0, 31]`.
    pub left_shift: u32,
    pub activation_min: i32,
    pub activation_max: i32,
    pub mode: RequantMode,
}

impl BinaryQuantParams {
    /// Identity scaling on every tensor, zero points of 0 and the full range
    /// of `T` as activation range.
    pub fn identity<T: Quantized>() -> Self {
        BinaryQuantParams {
            inp1: QuantParams::identity(),
            inp2: QuantParams::identity(),
            out: QuantParams::identity(),
            left_shift: 0,
            activation_min: T::min_i32(),
            activation_max: T::max_i32(),
            mode: RequantMode::default(),
        }
    }

    pub fn with_activation(mut self, min: i32, max: i32) -> Self {
        self.activation_min = min;
        self.activation_max = max;
        self
    }

    pub fn with_mode(mut self, mode: RequantMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_zero_points(mut self, inp1: i32, inp2: i32, out: i32) -> Self {
        self.inp1.zero_point = inp1;
        self.inp2.zero_point = inp2;
        self.out.zero_point = out;
        self
    }

    /// Parameters for add and subtract.
    ///
    /// Both inputs are brought onto a common scale of `2 * max(s1, s2)`
    /// after [`Quantized::ADDITIVE_LEFT_SHIFT`] bits of headroom, and the
    /// output multiplier undoes it.
    pub fn additive<T: Quantized>(
        inp1: &AffineQuantization,
        inp2: &AffineQuantization,
        out: &AffineQuantization,
    ) -> Self {
        let left_shift = T::ADDITIVE_LEFT_SHIFT;
        let twice_max = 2.0 * inp1.scale.max(inp2.scale);
        let real_out = twice_max / ((1u64 << left_shift) as f64 * out.scale);
        BinaryQuantParams {
            inp1: QuantParams::from_real_multiplier(inp1.scale / twice_max, inp1.zero_point),
            inp2: QuantParams::from_real_multiplier(inp2.scale / twice_max, inp2.zero_point),
            out: QuantParams::from_real_multiplier(real_out, out.zero_point),
            left_shift,
            ..Self::identity::<T>()
        }
    }

    /// Parameters for multiply: identity inputs, output scale `s1 * s2 / so`.
    pub fn multiplicative<T: Quantized>(
        inp1: &AffineQuantization,
        inp2: &AffineQuantization,
        out: &AffineQuantization,
    ) -> Self {
        let real_out = inp1.scale * inp2.scale / out.scale;
        BinaryQuantParams {
            inp1: QuantParams { zero_point: inp1.zero_point, ..QuantParams::identity() },
            inp2: QuantParams { zero_point: inp2.zero_point, ..QuantParams::identity() },
            out: QuantParams::from_real_multiplier(real_out, out.zero_point),
            ..Self::identity::<T>()
        }
    }

    /// Parameters for squared difference. The square doubles the headroom
    /// shift, which the output multiplier removes.
    pub fn squared_difference<T: Quantized>(
        inp1: &AffineQuantization,
        inp2: &AffineQuantization,
        out: &AffineQuantization,
    ) -> Self {
        let left_shift = SQUARED_DIFFERENCE_LEFT_SHIFT;
        let twice_max = 2.0 * inp1.scale.max(inp2.scale);
        let real_out = twice_max * twice_max / ((1u64 << (2 * left_shift)) as f64 * out.scale);
        BinaryQuantParams {
            inp1: QuantParams::from_real_multiplier(inp1.scale / twice_max, inp1.zero_point),
            inp2: QuantParams::from_real_multiplier(inp2.scale / twice_max, inp2.zero_point),
            out: QuantParams::from_real_multiplier(real_out, out.zero_point),
            left_shift,
            ..Self::identity::<T>()
        }
    }

    /// Parameters for comparisons and for minimum/maximum: both inputs on a
    /// common scale, no output stage.
    pub fn comparison<T: Quantized>(inp1: &AffineQuantization, inp2: &AffineQuantization) -> Self {
        let twice_max = 2.0 * inp1.scale.max(inp2.scale);
        BinaryQuantParams {
            inp1: QuantParams::from_real_multiplier(inp1.scale / twice_max, inp1.zero_point),
            inp2: QuantParams::from_real_multiplier(inp2.scale / twice_max, inp2.zero_point),
            left_shift: COMPARISON_LEFT_SHIFT,
            ..Self::identity::<T>()
        }
    }

    /// Range checks every field for element type `T` and returns a copy with
    /// the activation range clamped to the representable range of `T`.
    pub fn validate<T: Quantized>(&self) -> KernelResult<Self> {
        self.inp1.validate::<T>("inp1")?;
        self.inp2.validate::<T>("inp2")?;
        self.out.validate::<T>("out")?;
        check_range("params", "left_shift", self.left_shift as i64, 0, MAX_LEFT_SHIFT as i64)?;

        let activation_min = self.activation_min.max(T::min_i32());
        let activation_max = self.activation_max.min(T::max_i32());
        if activation_min > activation_max {
            debug!(activation_min, activation_max, dtype = T::NAME, "activation range rejected");
            return Err(KernelError::InvalidActivationRange {
                min: activation_min,
                max: activation_max,
            });
        }
        Ok(BinaryQuantParams { activation_min, activation_max, ..*self })
    }

    /// Exchanges the two input parameter sets.
    #[inline]
    pub fn swap_inputs(&mut self) {
        std::mem::swap(&mut self.inp1, &mut self.inp2);
    }
}
