//! IEEE-754 classification and decomposition.
//!
//! Supports the 32-bit (1/8/23) and 64-bit (1/11/52) binary interchange
//! formats. Bits are pulled out of the raw `to_bits()` integer
//! reinterpretation rather than through native bit-fields, so the result
//! does not depend on host endianness — `f32::to_bits`/`f64::to_bits`
//! already normalize that for us.

/// What kind of value a decoded float is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FloatClass {
    Zero,
    Normal,
    Subnormal,
    Infinity,
    Nan,
}

/// The raw sign/exponent/significand fields, before any Dragon4-style
/// normalization. This is what [`crate::hexfloat`] renders directly.
#[derive(Clone, Copy, Debug)]
pub struct RawParts {
    pub sign: bool,
    /// Biased exponent exactly as stored.
    pub raw_exp: u32,
    /// Significand bits exactly as stored (no implicit leading bit).
    pub raw_mant: u64,
    pub mant_bits: u32,
    pub exp_bits: u32,
    pub bias: i32,
    pub class: FloatClass,
}

impl RawParts {
    /// The unbiased exponent a hex-float rendering uses: `raw_exp - bias`
    /// for normal values, or the position of the first set significand
    /// bit (relative to the implicit position) for subnormals.
    pub fn hexfloat_exponent(&self) -> i32 {
        match self.class {
            FloatClass::Normal => self.raw_exp as i32 - self.bias,
            FloatClass::Subnormal => {
                let highest = (0..self.mant_bits).rev().find(|&b| (self.raw_mant >> b) & 1 != 0);
                match highest {
                    Some(bit) => 1 - self.bias - (self.mant_bits as i32 - bit as i32),
                    None => 1 - self.bias,
                }
            }
            _ => 0,
        }
    }
}

/// A finite value decomposed into `mant * 2^exp`, ready for
/// [`crate::dragon`]. For normal values `mant` includes the implicit
/// leading bit (so it occupies exactly `sig_bits()` bits); for subnormal
/// values it does not.
#[derive(Clone, Copy, Debug)]
pub struct Decoded {
    pub mant: u64,
    pub exp: i16,
    pub class: FloatClass,
    /// True iff this is a `Normal` value at the smallest normal exponent
    /// (`raw_exp == 1`). [`crate::dragon`]'s initial-fixup needs this: the
    /// gap to the next representable value *below* a power-of-two
    /// mantissa is only half the gap above it, **except** at this
    /// boundary, where the neighbor below is a subnormal spaced by the
    /// same amount as the neighbor above.
    pub at_min_normal_exponent: bool,
}

/// The outcome of fully decoding a float, distinguishing the
/// non-Dragon4-eligible special values up front.
#[derive(Clone, Copy, Debug)]
pub enum FullDecoded {
    Nan,
    Infinite,
    Zero,
    Finite(Decoded),
}

/// Floating-point types this crate's conversion pipeline accepts. `f32`
/// and `f64` are the only implementors; `long double` arguments are
/// widened to `f64` by the caller before reaching here.
pub trait DecodableFloat: Copy {
    const MANT_BITS: u32;
    const EXP_BITS: u32;
    /// Total significand bit count including the implicit leading bit
    /// for normal values (`p` in the Dragon4 derivation): 24 for `f32`,
    /// 53 for `f64`.
    const SIG_BITS: u32 = Self::MANT_BITS + 1;

    fn raw_parts(self) -> RawParts;
    fn full_decode(self) -> (bool, FullDecoded);
}

fn bias_for(exp_bits: u32) -> i32 {
    (1i32 << (exp_bits - 1)) - 1
}

fn classify(raw_exp: u32, raw_mant: u64, exp_bits: u32) -> FloatClass {
    let max_exp = (1u32 << exp_bits) - 1;
    if raw_exp == max_exp {
        if raw_mant == 0 {
            FloatClass::Infinity
        } else {
            FloatClass::Nan
        }
    } else if raw_exp == 0 {
        if raw_mant == 0 {
            FloatClass::Zero
        } else {
            FloatClass::Subnormal
        }
    } else {
        FloatClass::Normal
    }
}

fn decode_common(
    sign: bool,
    raw_exp: u32,
    raw_mant: u64,
    mant_bits: u32,
    exp_bits: u32,
) -> (bool, FullDecoded) {
    let class = classify(raw_exp, raw_mant, exp_bits);
    let bias = bias_for(exp_bits);
    let full = match class {
        FloatClass::Nan => FullDecoded::Nan,
        FloatClass::Infinity => FullDecoded::Infinite,
        FloatClass::Zero => FullDecoded::Zero,
        FloatClass::Subnormal => {
            let exp = 1 - bias - mant_bits as i32;
            FullDecoded::Finite(Decoded {
                mant: raw_mant,
                exp: exp as i16,
                class,
                at_min_normal_exponent: false,
            })
        }
        FloatClass::Normal => {
            let mant = raw_mant | (1u64 << mant_bits);
            let exp = raw_exp as i32 - bias - mant_bits as i32;
            FullDecoded::Finite(Decoded {
                mant,
                exp: exp as i16,
                class,
                at_min_normal_exponent: raw_exp == 1,
            })
        }
    };
    (sign, full)
}

impl DecodableFloat for f32 {
    const MANT_BITS: u32 = 23;
    const EXP_BITS: u32 = 8;

    fn raw_parts(self) -> RawParts {
        let bits = self.to_bits();
        let sign = bits >> 31 != 0;
        let raw_exp = (bits >> 23) & 0xFF;
        let raw_mant = (bits & 0x7F_FFFF) as u64;
        RawParts {
            sign,
            raw_exp,
            raw_mant,
            mant_bits: Self::MANT_BITS,
            exp_bits: Self::EXP_BITS,
            bias: bias_for(Self::EXP_BITS),
            class: classify(raw_exp, raw_mant, Self::EXP_BITS),
        }
    }

    fn full_decode(self) -> (bool, FullDecoded) {
        let bits = self.to_bits();
        let sign = bits >> 31 != 0;
        let raw_exp = (bits >> 23) & 0xFF;
        let raw_mant = (bits & 0x7F_FFFF) as u64;
        decode_common(sign, raw_exp, raw_mant, Self::MANT_BITS, Self::EXP_BITS)
    }
}

impl DecodableFloat for f64 {
    const MANT_BITS: u32 = 52;
    const EXP_BITS: u32 = 11;

    fn raw_parts(self) -> RawParts {
        let bits = self.to_bits();
        let sign = bits >> 63 != 0;
        let raw_exp = ((bits >> 52) & 0x7FF) as u32;
        let raw_mant = bits & 0xF_FFFF_FFFF_FFFF;
        RawParts {
            sign,
            raw_exp,
            raw_mant,
            mant_bits: Self::MANT_BITS,
            exp_bits: Self::EXP_BITS,
            bias: bias_for(Self::EXP_BITS),
            class: classify(raw_exp, raw_mant, Self::EXP_BITS),
        }
    }

    fn full_decode(self) -> (bool, FullDecoded) {
        let bits = self.to_bits();
        let sign = bits >> 63 != 0;
        let raw_exp = ((bits >> 52) & 0x7FF) as u32;
        let raw_mant = bits & 0xF_FFFF_FFFF_FFFF;
        decode_common(sign, raw_exp, raw_mant, Self::MANT_BITS, Self::EXP_BITS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_classified_as_zero() {
        let (sign, full) = 0.0f64.full_decode();
        assert!(!sign);
        assert!(matches!(full, FullDecoded::Zero));
        let (sign, full) = (-0.0f64).full_decode();
        assert!(sign);
        assert!(matches!(full, FullDecoded::Zero));
    }

    #[test]
    fn infinity_and_nan() {
        assert!(matches!(f64::INFINITY.full_decode().1, FullDecoded::Infinite));
        assert!(matches!(f64::NEG_INFINITY.full_decode().1, FullDecoded::Infinite));
        assert!(matches!(f64::NAN.full_decode().1, FullDecoded::Nan));
    }

    #[test]
    fn normal_f64_round_trips_via_mant_exp() {
        let (sign, full) = 1.5f64.full_decode();
        assert!(!sign);
        match full {
            FullDecoded::Finite(d) => {
                assert_eq!(d.class, FloatClass::Normal);
                let reconstructed = d.mant as f64 * 2f64.powi(d.exp as i32);
                assert_eq!(reconstructed, 1.5);
            }
            _ => panic!("expected finite"),
        }
    }

    #[test]
    fn subnormal_f64_has_no_implicit_bit() {
        let smallest_subnormal = f64::from_bits(1);
        let (_, full) = smallest_subnormal.full_decode();
        match full {
            FullDecoded::Finite(d) => {
                assert_eq!(d.class, FloatClass::Subnormal);
                assert_eq!(d.mant, 1);
                assert_eq!(d.exp, -1074);
            }
            _ => panic!("expected finite"),
        }
    }

    #[test]
    fn raw_parts_match_to_bits() {
        let raw = 1.5f32.raw_parts();
        assert_eq!(raw.raw_exp, 127);
        assert_eq!(raw.raw_mant, 0x40_0000);
        assert!(!raw.sign);
    }
}
