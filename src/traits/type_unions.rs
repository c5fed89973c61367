use std::fmt::Debug;

use num_traits::{AsPrimitive, Bounded, Float as NumFloat, PrimInt};

use crate::structs::quant::{ADDITIVE_LEFT_SHIFT_8BIT, ADDITIVE_LEFT_SHIFT_16BIT};

/// Trait for types valid as float elements in tensors.
///
/// Useful when specifying `my_fn::<T: Float>() {}`.
///
/// Extends and constrains the *num-traits* `Float` implementation to fit the crate's type universe.
pub trait Float: NumFloat + Copy + Default + Debug + PartialEq + 'static {}
impl Float for f32 {}
impl Float for f64 {}

/// Trait for narrow integer types holding affine-quantized codes.
///
/// Arithmetic always happens on the `i32` widening of the code; results are
/// narrowed back through [`Quantized::from_i32_saturating`].
pub trait Quantized: PrimInt + Bounded + AsPrimitive<i32> + Default + Debug + 'static {
    /// Name used in error messages.
    const NAME: &'static str;

    /// Common left shift for add and subtract. `(max - min) << shift` must
    /// stay inside `i32`.
    const ADDITIVE_LEFT_SHIFT: u32;

    /// Smallest representable code, widened.
    #[inline]
    fn min_i32() -> i32 {
        Self::min_value().as_()
    }

    /// Largest representable code, widened.
    #[inline]
    fn max_i32() -> i32 {
        Self::max_value().as_()
    }

    /// Narrows `v`, saturating at the type's bounds.
    fn from_i32_saturating(v: i32) -> Self;
}

macro_rules! impl_quantized {
    ($($t:ty => $name:literal, $shift:expr);* $(;)?) => {
        $(
            impl Quantized for $t {
                const NAME: &'static str = $name;
                const ADDITIVE_LEFT_SHIFT: u32 = $shift;

                #[inline]
                fn from_i32_saturating(v: i32) -> Self {
                    v.clamp(<$t>::MIN as i32, <$t>::MAX as i32) as $t
                }
            }
        )*
    };
}

impl_quantized!(
    i8 => "int8", ADDITIVE_LEFT_SHIFT_8BIT;
    u8 => "uint8", ADDITIVE_LEFT_SHIFT_8BIT;
    i16 => "int16", ADDITIVE_LEFT_SHIFT_16BIT;
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantized_bounds() {
        assert_eq!(<i8 as Quantized>::min_i32(), -128);
        assert_eq!(<i8 as Quantized>::max_i32(), 127);
        assert_eq!(<u8 as Quantized>::min_i32(), 0);
        assert_eq!(<u8 as Quantized>::max_i32(), 255);
        assert_eq!(<i16 as Quantized>::min_i32(), -32768);
        assert_eq!(<i16 as Quantized>::max_i32(), 32767);
    }

    #[test]
    fn test_from_i32_saturating() {
        assert_eq!(i8::from_i32_saturating(300), 127);
        assert_eq!(i8::from_i32_saturating(-300), -128);
        assert_eq!(u8::from_i32_saturating(-1), 0);
        assert_eq!(u8::from_i32_saturating(17), 17);
        assert_eq!(i16::from_i32_saturating(i32::MAX), i16::MAX);
    }

    #[test]
    fn test_additive_shift_leaves_headroom() {
        fn span_fits<T: Quantized>() -> bool {
            let span = (T::max_i32() - T::min_i32()) as i64;
            span << T::ADDITIVE_LEFT_SHIFT <= i32::MAX as i64
        }
        assert!(span_fits::<i8>());
        assert!(span_fits::<u8>());
        assert!(span_fits::<i16>());
        assert_eq!(<i16 as Quantized>::ADDITIVE_LEFT_SHIFT, 15);
    }
}
