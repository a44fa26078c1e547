//! Dragon4-style free-format decimal conversion.
//!
//! Given a decoded finite value `v = mant * 2^exp`, produces the shortest
//! sequence of decimal digits that round-trips back to `v` under
//! correct IEEE-754 rounding, or (via [`DragonState::next_digit`]) lets a
//! renderer keep pulling digits past that point for `%.<precision>`
//! forms that ask for more digits than round-trip safety requires.
//!
//! The state is four [`Big`]s — remainder `R`, scale `S`, and bounds
//! `M-`/`M+` — satisfying `value == R/S * 10^K` with the true value
//! bounded by `[R - M-, R + M+] / S * 10^K`.

use crate::bignum::Big;
use crate::decoder::{Decoded, FloatClass};
use crate::error::PrintfError;

const BASE: u32 = 10;

/// Upper bound on shortest-mode digits for `f64` (`ceil(53 * log10(2)) + 1`).
pub const MAX_SHORTEST_DIGITS_F64: usize = 17;
/// Upper bound on shortest-mode digits for `f32` (`ceil(24 * log10(2)) + 1`).
pub const MAX_SHORTEST_DIGITS_F32: usize = 9;

pub struct DragonState {
    r: Big,
    s: Big,
    m_minus: Big,
    m_plus: Big,
    k: i32,
}

/// Builds the initial Dragon4 state for a finite, non-zero decoded value,
/// case-split on the sign of `e` (already `decoded.exp`, i.e. the
/// mantissa's binary exponent after the significand has been shifted out
/// to an integer) and normal-vs-subnormal. `sig_bits` is the significand
/// width: 24 for `f32`, 53 for `f64`.
pub fn init(decoded: &Decoded, sig_bits: u32) -> Result<DragonState, PrintfError> {
    let e = decoded.exp as i32;
    let mant = decoded.mant;
    let mant_big = Big::from_u64(mant);

    let (mut r, mut s, mut m_minus, mut m_plus) = if decoded.class == FloatClass::Subnormal {
        if e >= 0 {
            (mant_big.shift(e), Big::from_u64(1), Big::from_u64(1), Big::from_u64(1))
        } else {
            (mant_big, Big::one_shifted((-e) as usize), Big::from_u64(1), Big::from_u64(1))
        }
    } else if e >= 0 {
        let shift = e as usize;
        (mant_big.shift(e), Big::from_u64(1), Big::one_shifted(shift), Big::one_shifted(shift))
    } else {
        (mant_big, Big::one_shifted((-e) as usize), Big::from_u64(1), Big::from_u64(1))
    };

    // Initial fixup: mantissa at the minimal normal power-of-two value,
    // away from the boundary where the lower neighbor is subnormal.
    let is_min_normal_mantissa = mant == (1u64 << (sig_bits - 1));
    if decoded.class == FloatClass::Normal
        && is_min_normal_mantissa
        && !decoded.at_min_normal_exponent
    {
        let (new_r, o1) = r.quick_mul_u32(2);
        let (new_s, o2) = s.quick_mul_u32(2);
        let (new_plus, o3) = m_plus.quick_mul_u32(2);
        if o1 || o2 || o3 {
            return Err(PrintfError::ArithmeticOverflow);
        }
        r = new_r;
        s = new_s;
        m_plus = new_plus;
        // m_minus is deliberately left unscaled: relative to the doubled
        // system it is now half as wide as m_plus.
    }

    let mut state = DragonState { r, s, m_minus, m_plus, k: 0 };
    state.normalize()?;
    Ok(state)
}

impl DragonState {
    /// Fixup loop: scales `R`/`S`/`M-`/`M+` by powers of `BASE` until `K`
    /// satisfies `R/S` sits in `[0.1, 1)` relative to the bounds.
    fn normalize(&mut self) -> Result<(), PrintfError> {
        loop {
            let (scaled_r, o) = self.r.quick_mul_u32(BASE);
            if o {
                return Err(PrintfError::ArithmeticOverflow);
            }
            if scaled_r.compare(&self.s) != core::cmp::Ordering::Less {
                break;
            }
            self.r = scaled_r;
            let (m, o1) = self.m_minus.quick_mul_u32(BASE);
            let (p, o2) = self.m_plus.quick_mul_u32(BASE);
            if o1 || o2 {
                return Err(PrintfError::ArithmeticOverflow);
            }
            self.m_minus = m;
            self.m_plus = p;
            self.k -= 1;
        }
        loop {
            let (two_r, o1) = self.r.quick_mul_u32(2);
            let (sum, o2) = two_r.add(&self.m_plus);
            let (two_s, o3) = self.s.quick_mul_u32(2);
            if o1 || o2 || o3 {
                return Err(PrintfError::ArithmeticOverflow);
            }
            if sum.compare(&two_s) == core::cmp::Ordering::Less {
                break;
            }
            let (scaled_s, o) = self.s.quick_mul_u32(BASE);
            if o {
                return Err(PrintfError::ArithmeticOverflow);
            }
            self.s = scaled_s;
            self.k += 1;
        }
        Ok(())
    }

    /// The decimal exponent `K`: the represented value is
    /// `0.d[0..n] * 10^K`.
    pub fn k(&self) -> i32 {
        self.k
    }

    /// One digit-extraction step, with no early-stop check. Used by
    /// exact/fixed-precision renderers that
    /// want more digits than round-trip safety requires.
    pub fn next_digit(&mut self) -> Result<u8, PrintfError> {
        let (scaled_r, o) = self.r.quick_mul_u32(BASE);
        if o {
            return Err(PrintfError::ArithmeticOverflow);
        }
        let (digit, rem, div_by_zero) = scaled_r.div_rem(&self.s);
        if div_by_zero {
            return Err(PrintfError::ArithmeticOverflow);
        }
        self.r = rem;
        let (m, o1) = self.m_minus.quick_mul_u32(BASE);
        let (p, o2) = self.m_plus.quick_mul_u32(BASE);
        if o1 || o2 {
            return Err(PrintfError::ArithmeticOverflow);
        }
        self.m_minus = m;
        self.m_plus = p;
        Ok(digit.low_u32() as u8)
    }

    /// Extracts exactly `n` correctly-rounded decimal digits into
    /// `out[..n]`, for fixed/exact-precision renderers (`%f`, `%e`, `%g`
    /// with an explicit precision) that need more or fewer digits than
    /// round-trip safety requires. Unlike [`DragonState::shortest_digits`]
    /// there is no early stop: exactly `n` digits are committed, and the
    /// `n+1`-th digit (never returned) decides whether to round up, with
    /// round-half-to-even on an exact tie. Returns `true` iff every
    /// committed digit was a `9` and rolled over to `1 0 0 ... 0`, in
    /// which case the caller must bump its decimal exponent by one.
    pub fn digits_exact(&mut self, n: usize, out: &mut [u8]) -> Result<bool, PrintfError> {
        for slot in out.iter_mut().take(n) {
            let (scaled_r, o) = self.r.quick_mul_u32(BASE);
            if o {
                return Err(PrintfError::ArithmeticOverflow);
            }
            let (digit, rem, div_by_zero) = scaled_r.div_rem(&self.s);
            if div_by_zero {
                return Err(PrintfError::ArithmeticOverflow);
            }
            self.r = rem;
            *slot = digit.low_u32() as u8;
        }
        let (two_r, o) = self.r.quick_mul_u32(2);
        if o {
            return Err(PrintfError::ArithmeticOverflow);
        }
        let round_up = match two_r.compare(&self.s) {
            core::cmp::Ordering::Less => false,
            core::cmp::Ordering::Greater => true,
            core::cmp::Ordering::Equal => n > 0 && out[n - 1] % 2 != 0,
        };
        if round_up && n > 0 {
            if round_up_digits(&mut out[..n]).is_some() {
                return Ok(true);
            }
        } else if round_up && n == 0 {
            return Ok(true);
        }
        Ok(false)
    }

    /// Full shortest-mode digit stream. Writes
    /// into `out` (which must be at least [`MAX_SHORTEST_DIGITS_F64`]
    /// long) and returns the digit count. `k()` may have been bumped by
    /// one if a trailing carry promoted e.g. `9.99...` to `10.00...`.
    pub fn shortest_digits(&mut self, out: &mut [u8]) -> Result<usize, PrintfError> {
        let mut n = 0;
        loop {
            let (scaled_r, o) = self.r.quick_mul_u32(BASE);
            if o {
                return Err(PrintfError::ArithmeticOverflow);
            }
            let (digit, rem, div_by_zero) = scaled_r.div_rem(&self.s);
            if div_by_zero {
                return Err(PrintfError::ArithmeticOverflow);
            }
            self.r = rem;
            let (new_m_minus, o1) = self.m_minus.quick_mul_u32(BASE);
            let (new_m_plus, o2) = self.m_plus.quick_mul_u32(BASE);
            if o1 || o2 {
                return Err(PrintfError::ArithmeticOverflow);
            }
            self.m_minus = new_m_minus;
            self.m_plus = new_m_plus;

            let (two_r, o3) = self.r.quick_mul_u32(2);
            let (two_s, o4) = self.s.quick_mul_u32(2);
            if o3 || o4 {
                return Err(PrintfError::ArithmeticOverflow);
            }
            let low = two_r.compare(&self.m_minus) == core::cmp::Ordering::Less;
            let high_sum = {
                let (sum, o5) = two_r.add(&self.m_plus);
                if o5 {
                    return Err(PrintfError::ArithmeticOverflow);
                }
                sum
            };
            let high = high_sum.compare(&two_s) == core::cmp::Ordering::Greater;

            let d = digit.low_u32() as u8;
            if !low && !high {
                out[n] = d;
                n += 1;
                if n >= out.len() {
                    return Ok(n);
                }
                continue;
            }
            let round_up = if high && !low {
                true
            } else if low && !high {
                false
            } else {
                match two_r.compare(&self.s) {
                    core::cmp::Ordering::Less => false,
                    core::cmp::Ordering::Greater => true,
                    core::cmp::Ordering::Equal => d % 2 != 0, // tie -> round to even
                }
            };
            out[n] = d;
            n += 1;
            if round_up && round_up_digits(&mut out[..n]).is_some() {
                // Every committed digit was a 9: "999..." carried to
                // "100...0" in place, with the decimal point shifted one
                // place to the right.
                self.k += 1;
            }
            return Ok(n);
        }
    }
}

/// Propagates a trailing `+1` carry through decimal digit *values*
/// (`0..=9`, not ASCII).
/// Returns `Some(_)` iff every digit was `9`, in which case `d` is left as
/// `[1, 0, 0, ...]` (same length) and the caller must bump its decimal
/// exponent by one to compensate.
pub(crate) fn round_up_digits(d: &mut [u8]) -> Option<u8> {
    match d.iter().rposition(|&c| c != 9) {
        Some(i) => {
            d[i] += 1;
            for j in i + 1..d.len() {
                d[j] = 0;
            }
            None
        }
        None if !d.is_empty() => {
            d[0] = 1;
            for j in 1..d.len() {
                d[j] = 0;
            }
            Some(0)
        }
        None => Some(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{DecodableFloat, FullDecoded};

    fn shortest(v: f64) -> (std::string::String, i32) {
        let (_, full) = v.full_decode();
        match full {
            FullDecoded::Finite(d) => {
                let mut state = init(&d, f64::SIG_BITS).unwrap();
                let mut buf = [0u8; MAX_SHORTEST_DIGITS_F64];
                let n = state.shortest_digits(&mut buf).unwrap();
                let s = buf[..n].iter().map(|d| (b'0' + d) as char).collect();
                (s, state.k())
            }
            _ => panic!("not finite"),
        }
    }

    #[test]
    fn one_point_five() {
        let (digits, k) = shortest(1.5);
        assert_eq!(digits, "15");
        assert_eq!(k, 1);
    }

    #[test]
    fn one_hundred() {
        let (digits, k) = shortest(100.0);
        assert_eq!(digits, "1");
        assert_eq!(k, 3);
    }

    #[test]
    fn small_fraction() {
        let (digits, k) = shortest(0.1);
        assert_eq!(digits, "1");
        assert_eq!(k, 0);
    }

    #[test]
    fn digit_count_within_bound_for_many_values() {
        for bits in [0x3FF0_0000_0000_0001u64, 0x4059_0000_0000_0000, 0x0000_0000_0000_0001] {
            let v = f64::from_bits(bits);
            if v == 0.0 || !v.is_finite() {
                continue;
            }
            let (_, full) = v.full_decode();
            if let FullDecoded::Finite(d) = full {
                let mut state = init(&d, f64::SIG_BITS).unwrap();
                let mut buf = [0u8; MAX_SHORTEST_DIGITS_F64];
                let n = state.shortest_digits(&mut buf).unwrap();
                assert!(n <= MAX_SHORTEST_DIGITS_F64);
            }
        }
    }
}
