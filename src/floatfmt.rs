//! `%f`/`%F`, `%e`/`%E` and `%g`/`%G` rendering, built on top of
//! [`crate::dragon`]'s digit stream. `%a`/`%A` is handled separately by
//! [`crate::hexfloat`], which needs no big-integer work.
//!
//! This module only produces the unsigned numeric core (digits, point,
//! exponent suffix); sign handling, the `+`/` ` flags and field-width
//! padding are [`crate::compose`]'s job, exactly as for integers.

use crate::decoder::{DecodableFloat, Decoded, FloatClass, FullDecoded};
use crate::dragon::{self, DragonState};
use crate::error::PrintfError;

/// Largest precision this crate accepts for `%f`/`%e`/`%g`. A fixed,
/// documented cap is the price of never allocating: `snprintf("%.2000f",
/// DBL_MAX)` is legal C but would need a dynamically sized buffer we
/// don't have. Exceeding it is reported through the same channel as any
/// other internal sizing problem.
pub const MAX_PRECISION: usize = 1100;

/// Generous bound on `f64`'s integer-part digit count (`DBL_MAX` needs
/// 309).
const MAX_INT_DIGITS: usize = 312;

/// Digit capacity for `%f`-style rendering: integer digits, fractional
/// digits, plus one slot for the rare all-nines carry that needs to
/// widen the digit count by one (see [`render_fixed`]).
const MAX_FIXED_DIGITS: usize = MAX_INT_DIGITS + MAX_PRECISION + 1;

/// Upper bound on the rendered core's total byte length, across every
/// conversion this module handles (digits, `.`, and an `e±ddd` suffix).
pub const MAX_CORE_LEN: usize = MAX_FIXED_DIGITS + 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FloatConv {
    Fixed,
    Exp,
    General,
}

/// The unsigned rendered core of a formatted float, with its sign split
/// out for [`crate::compose`].
pub struct FloatRender {
    pub sign: bool,
    pub core: FloatCore,
}

pub enum FloatCore {
    Nan,
    Infinity,
    /// ASCII digits, `.` and exponent suffix, already composed.
    Number { buf: [u8; MAX_CORE_LEN], len: usize },
}

fn push_byte(buf: &mut [u8], len: &mut usize, b: u8) {
    buf[*len] = b;
    *len += 1;
}

fn push_digit(buf: &mut [u8], len: &mut usize, d: u8) {
    push_byte(buf, len, b'0' + d);
}

fn push_zeros(buf: &mut [u8], len: &mut usize, n: usize) {
    for _ in 0..n {
        push_byte(buf, len, b'0');
    }
}

/// Appends `e±dd` (or `E±dd`), at least two exponent digits, as C
/// requires.
fn push_exponent(buf: &mut [u8], len: &mut usize, exp: i32, uppercase: bool) {
    push_byte(buf, len, if uppercase { b'E' } else { b'e' });
    push_byte(buf, len, if exp < 0 { b'-' } else { b'+' });
    let mag = exp.unsigned_abs();
    let mut tmp = [0u8; 16];
    let mut n = 0;
    let mut v = mag;
    loop {
        tmp[n] = b'0' + (v % 10) as u8;
        v /= 10;
        n += 1;
        if v == 0 {
            break;
        }
    }
    while n < 2 {
        tmp[n] = b'0';
        n += 1;
    }
    for i in (0..n).rev() {
        push_byte(buf, len, tmp[i]);
    }
}

/// Renders `value` under the given conversion. `precision` is `None`
/// when the directive omitted it (conversion-specific default applies).
pub fn render<F: DecodableFloat>(
    value: F,
    conv: FloatConv,
    precision: Option<usize>,
    alt_form: bool,
    uppercase: bool,
) -> Result<FloatRender, PrintfError> {
    let raw = value.raw_parts();
    if raw.class == FloatClass::Nan {
        return Ok(FloatRender { sign: raw.sign, core: FloatCore::Nan });
    }
    if raw.class == FloatClass::Infinity {
        return Ok(FloatRender { sign: raw.sign, core: FloatCore::Infinity });
    }

    let sign = raw.sign;
    if raw.class == FloatClass::Zero {
        return Ok(FloatRender { sign, core: render_zero(conv, precision, alt_form) });
    }

    let (_, full) = value.full_decode();
    let decoded = match full {
        FullDecoded::Finite(d) => d,
        _ => unreachable!("zero/nan/inf handled above"),
    };

    let core = match conv {
        FloatConv::Fixed => render_fixed_core(&decoded, F::SIG_BITS, precision, alt_form, uppercase)?,
        FloatConv::Exp => render_exp_core(&decoded, F::SIG_BITS, precision, alt_form, uppercase)?,
        FloatConv::General => render_general_core(&decoded, F::SIG_BITS, precision, alt_form, uppercase)?,
    };
    Ok(FloatRender { sign, core })
}

fn render_zero(conv: FloatConv, precision: Option<usize>, alt_form: bool) -> FloatCore {
    let mut buf = [0u8; MAX_CORE_LEN];
    let mut len = 0;
    match conv {
        FloatConv::Fixed => {
            let prec = precision.unwrap_or(6).min(MAX_PRECISION);
            push_digit(&mut buf, &mut len, 0);
            if prec > 0 || alt_form {
                push_byte(&mut buf, &mut len, b'.');
                push_zeros(&mut buf, &mut len, prec);
            }
        }
        FloatConv::Exp => {
            let prec = precision.unwrap_or(6).min(MAX_PRECISION);
            push_digit(&mut buf, &mut len, 0);
            if prec > 0 || alt_form {
                push_byte(&mut buf, &mut len, b'.');
                push_zeros(&mut buf, &mut len, prec);
            }
            push_exponent(&mut buf, &mut len, 0, false);
        }
        FloatConv::General => {
            push_digit(&mut buf, &mut len, 0);
            match precision {
                // Shortest mode: zero's shortest digit stream is just
                // "0"; `#` only guarantees the point itself.
                None => {
                    if alt_form {
                        push_byte(&mut buf, &mut len, b'.');
                    }
                }
                Some(p) => {
                    let prec = p.max(1).min(MAX_PRECISION);
                    if alt_form {
                        push_byte(&mut buf, &mut len, b'.');
                        push_zeros(&mut buf, &mut len, prec - 1);
                    }
                }
            }
        }
    }
    FloatCore::Number { buf, len }
}

/// Extracts `frac_digits` fractional digits (plus whatever integer
/// digits `k` implies) from a freshly-initialized Dragon state, handling
/// the rare carry that promotes e.g. `9.995` to `10.00` at the requested
/// precision. Returns the decimal digit buffer, its length, and the
/// (possibly bumped) decimal exponent `k`.
fn fixed_digits(
    state: &mut DragonState,
    frac_digits: usize,
) -> Result<([u8; MAX_FIXED_DIGITS], usize, i32), PrintfError> {
    let k = state.k();
    let n = k + frac_digits as i32;
    let mut digs = [0u8; MAX_FIXED_DIGITS];

    if n <= 0 {
        // Every requested fractional slot sits to the right of the most
        // significant digit; check whether the omitted digits still
        // round the whole thing up into the last slot.
        let carry = state.digits_exact(0, &mut [])?;
        if carry && n == 0 {
            digs[0] = 1;
            return Ok((digs, 1, k + 1));
        }
        return Ok((digs, 0, k));
    }

    let n = n as usize;
    if n + 1 > MAX_FIXED_DIGITS {
        return Err(PrintfError::ArithmeticOverflow);
    }
    let carry = state.digits_exact(n, &mut digs[..n])?;
    if carry {
        // All `n` digits were `9` and rolled over in place to `1 0..0`;
        // the value is now exactly `10^k`, one decimal order higher.
        // `digs[..n]` already holds `[1, 0, ..., 0]`; append one more
        // implicit zero so the fractional width stays `frac_digits`.
        digs[n] = 0;
        return Ok((digs, n + 1, k + 1));
    }
    Ok((digs, n, k))
}

/// Writes `digits[..len]` in `%f` layout (`k` integer digits ahead of
/// the point, the rest after it) into `buf`, with exactly `frac_digits`
/// digits after the point (`.` omitted when both are zero and
/// `!alt_form`).
fn write_fixed_layout(
    buf: &mut [u8],
    len: &mut usize,
    digits: &[u8],
    total: usize,
    k: i32,
    frac_digits: usize,
    alt_form: bool,
) {
    if k <= 0 {
        push_digit(buf, len, 0);
        if frac_digits > 0 || alt_form {
            push_byte(buf, len, b'.');
            // `-k` zeros would overshoot `frac_digits` when the whole
            // value's magnitude is below the requested precision.
            let virtual_zeros = ((-k) as usize).min(frac_digits);
            push_zeros(buf, len, virtual_zeros);
            let remaining = frac_digits - virtual_zeros;
            let take = total.min(remaining);
            for &d in &digits[..take] {
                push_digit(buf, len, d);
            }
            push_zeros(buf, len, remaining - take);
        }
    } else {
        let k = k as usize;
        if k >= total {
            for &d in &digits[..total] {
                push_digit(buf, len, d);
            }
            push_zeros(buf, len, k - total);
            if frac_digits > 0 || alt_form {
                push_byte(buf, len, b'.');
                push_zeros(buf, len, frac_digits);
            }
        } else {
            for &d in &digits[..k] {
                push_digit(buf, len, d);
            }
            if frac_digits > 0 || alt_form {
                push_byte(buf, len, b'.');
                let avail = total - k;
                let take = avail.min(frac_digits);
                for &d in &digits[k..k + take] {
                    push_digit(buf, len, d);
                }
                push_zeros(buf, len, frac_digits - take);
            }
        }
    }
}

/// The `pos`-th digit after the decimal point (`pos == 0` is the first),
/// given the digit stream `digits[..total]` and its decimal exponent
/// `k`, accounting for the virtual leading zeros implied by `k <= 0`.
fn frac_digit_at(digits: &[u8], total: usize, k: i32, pos: usize) -> u8 {
    if k <= 0 {
        let virtual_zeros = (-k) as usize;
        if pos < virtual_zeros {
            0
        } else {
            let idx = pos - virtual_zeros;
            if idx < total {
                digits[idx]
            } else {
                0
            }
        }
    } else {
        let idx = k as usize + pos;
        if idx < total {
            digits[idx]
        } else {
            0
        }
    }
}

fn render_fixed_core(
    decoded: &Decoded,
    sig_bits: u32,
    precision: Option<usize>,
    alt_form: bool,
    _uppercase: bool,
) -> Result<FloatCore, PrintfError> {
    let frac_digits = precision.unwrap_or(6).min(MAX_PRECISION);
    let mut state = dragon::init(decoded, sig_bits)?;
    let (digits, total, k) = fixed_digits(&mut state, frac_digits)?;

    let mut buf = [0u8; MAX_CORE_LEN];
    let mut len = 0;
    write_fixed_layout(&mut buf, &mut len, &digits, total, k, frac_digits, alt_form);
    Ok(FloatCore::Number { buf, len })
}

fn render_exp_core(
    decoded: &Decoded,
    sig_bits: u32,
    precision: Option<usize>,
    alt_form: bool,
    uppercase: bool,
) -> Result<FloatCore, PrintfError> {
    let frac_digits = precision.unwrap_or(6).min(MAX_PRECISION);
    let n = frac_digits + 1;
    let mut state = dragon::init(decoded, sig_bits)?;
    let mut digs = [0u8; MAX_FIXED_DIGITS];
    let carry = state.digits_exact(n, &mut digs[..n])?;
    let exp = state.k() - 1 + carry as i32;

    let mut buf = [0u8; MAX_CORE_LEN];
    let mut len = 0;
    push_digit(&mut buf, &mut len, digs[0]);
    if frac_digits > 0 || alt_form {
        push_byte(&mut buf, &mut len, b'.');
        for &d in &digs[1..n] {
            push_digit(&mut buf, &mut len, d);
        }
    }
    push_exponent(&mut buf, &mut len, exp, uppercase);
    Ok(FloatCore::Number { buf, len })
}

/// `%g`/`%G` with no explicit precision uses the shortest round-trip
/// digit stream rather than a fixed six-digit default, so that
/// `parse(format("%g", x)) == x` for every finite `x`.
///
/// The fixed/exponential cutoff can't be keyed on the shortest digit
/// count `n` the way the explicit-precision path keys it on `p`: round
/// numbers like `100.0` need only one shortest digit (`n == 1`) but
/// still belong in fixed form. Instead the cutoff uses the type's
/// longest possible shortest-digit count, the same role `p` plays for
/// explicit precision.
fn render_general_shortest(
    decoded: &Decoded,
    sig_bits: u32,
    alt_form: bool,
    uppercase: bool,
) -> Result<FloatCore, PrintfError> {
    let max_digits =
        if sig_bits <= 24 { dragon::MAX_SHORTEST_DIGITS_F32 } else { dragon::MAX_SHORTEST_DIGITS_F64 };
    let mut state = dragon::init(decoded, sig_bits)?;
    let mut digs = [0u8; dragon::MAX_SHORTEST_DIGITS_F64];
    let n = state.shortest_digits(&mut digs[..max_digits])?;
    let k = state.k();
    let exp = k - 1;

    let mut buf = [0u8; MAX_CORE_LEN];
    let mut len = 0;

    if exp < -4 || exp >= max_digits as i32 {
        push_digit(&mut buf, &mut len, digs[0]);
        if n > 1 || alt_form {
            push_byte(&mut buf, &mut len, b'.');
            for &d in &digs[1..n] {
                push_digit(&mut buf, &mut len, d);
            }
        }
        push_exponent(&mut buf, &mut len, exp, uppercase);
    } else {
        let frac_digits = if k <= 0 {
            n + (-k) as usize
        } else if k as usize >= n {
            0
        } else {
            n - k as usize
        };
        write_fixed_layout(&mut buf, &mut len, &digs[..n], n, k, frac_digits, alt_form);
    }
    Ok(FloatCore::Number { buf, len })
}

fn render_general_core(
    decoded: &Decoded,
    sig_bits: u32,
    precision: Option<usize>,
    alt_form: bool,
    uppercase: bool,
) -> Result<FloatCore, PrintfError> {
    let p = match precision {
        None => return render_general_shortest(decoded, sig_bits, alt_form, uppercase),
        Some(p) => p.max(1).min(MAX_PRECISION),
    };

    let mut probe = dragon::init(decoded, sig_bits)?;
    let mut probe_digs = [0u8; MAX_FIXED_DIGITS];
    let carry = probe.digits_exact(p, &mut probe_digs[..p])?;
    let exp = probe.k() - 1 + carry as i32;

    let mut buf = [0u8; MAX_CORE_LEN];
    let mut len = 0;

    if exp < -4 || exp >= p as i32 {
        let mut sig_len = p;
        if !alt_form {
            while sig_len > 1 && probe_digs[sig_len - 1] == 0 {
                sig_len -= 1;
            }
        }
        push_digit(&mut buf, &mut len, probe_digs[0]);
        if sig_len > 1 || alt_form {
            push_byte(&mut buf, &mut len, b'.');
            for &d in &probe_digs[1..sig_len] {
                push_digit(&mut buf, &mut len, d);
            }
        }
        push_exponent(&mut buf, &mut len, exp, uppercase);
    } else {
        let frac_digits = (p as i32 - 1 - exp).max(0) as usize;
        let mut state = dragon::init(decoded, sig_bits)?;
        let (digits, total, k) = fixed_digits(&mut state, frac_digits)?;

        let mut trimmed_frac = frac_digits;
        if !alt_form {
            while trimmed_frac > 0 && frac_digit_at(&digits, total, k, trimmed_frac - 1) == 0 {
                trimmed_frac -= 1;
            }
        }
        write_fixed_layout(&mut buf, &mut len, &digits, total, k, trimmed_frac, alt_form);
    }
    Ok(FloatCore::Number { buf, len })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_str(core: &FloatCore) -> std::string::String {
        match core {
            FloatCore::Number { buf, len } => buf[..*len].iter().map(|&b| b as char).collect(),
            FloatCore::Nan => "nan".into(),
            FloatCore::Infinity => "inf".into(),
        }
    }

    #[test]
    fn fixed_default_precision() {
        let r = render(1.5f64, FloatConv::Fixed, None, false, false).unwrap();
        assert!(!r.sign);
        assert_eq!(as_str(&r.core), "1.500000");
    }

    #[test]
    fn fixed_zero_precision_has_no_point() {
        let r = render(1.5f64, FloatConv::Fixed, Some(0), false, false).unwrap();
        assert_eq!(as_str(&r.core), "2");
    }

    #[test]
    fn fixed_small_value_has_leading_zero() {
        let r = render(0.0001f64, FloatConv::Fixed, Some(6), false, false).unwrap();
        assert_eq!(as_str(&r.core), "0.000100");
    }

    #[test]
    fn exp_default_precision() {
        let r = render(12345.6789f64, FloatConv::Exp, None, false, false).unwrap();
        assert_eq!(as_str(&r.core), "1.234568e+04");
    }

    #[test]
    fn exp_uppercase() {
        let r = render(12345.6789f64, FloatConv::Exp, Some(2), false, true).unwrap();
        assert_eq!(as_str(&r.core), "1.23E+04");
    }

    #[test]
    fn general_picks_fixed_for_moderate_magnitude() {
        let r = render(123.456f64, FloatConv::General, None, false, false).unwrap();
        assert_eq!(as_str(&r.core), "123.456");
    }

    #[test]
    fn general_picks_fixed_for_exact_large_integer() {
        // Shortest round-trip mode keeps this in fixed form: its
        // shortest digit stream ("123456789") is exactly as long as its
        // integer part, so the exponential cutoff never triggers.
        let r = render(123456789.0f64, FloatConv::General, None, false, false).unwrap();
        assert_eq!(as_str(&r.core), "123456789");
    }

    #[test]
    fn general_picks_exp_for_huge_magnitude() {
        let r = render(1.0e20f64, FloatConv::General, None, false, false).unwrap();
        assert_eq!(as_str(&r.core), "1e+20");
    }

    #[test]
    fn general_trims_trailing_zeros() {
        let r = render(100.0f64, FloatConv::General, None, false, false).unwrap();
        assert_eq!(as_str(&r.core), "100");
    }

    #[test]
    fn general_alt_form_forces_point_with_no_fictitious_digits() {
        // Shortest mode has no fixed precision to pad trailing zeros to:
        // `#` only guarantees the point itself, per C99's alt-form rule.
        let r = render(100.0f64, FloatConv::General, None, true, false).unwrap();
        assert_eq!(as_str(&r.core), "100.");
    }

    #[test]
    fn general_default_precision_round_trips() {
        for bits in [
            0x3FF0_0000_0000_0001u64,
            0x4059_0000_0000_0000,
            0xC059_0000_0000_0000,
            0x3EB0_C6F7_A0B5_ED8D,
        ] {
            let v = f64::from_bits(bits);
            let r = render(v, FloatConv::General, None, false, false).unwrap();
            let s = as_str(&r.core);
            let parsed: f64 = if r.sign {
                std::format!("-{}", s).parse().unwrap()
            } else {
                s.parse().unwrap()
            };
            assert_eq!(parsed, v, "round-trip failed for {:?} -> {:?}", v, s);
        }
    }

    #[test]
    fn zero_fixed() {
        let r = render(0.0f64, FloatConv::Fixed, Some(2), false, false).unwrap();
        assert_eq!(as_str(&r.core), "0.00");
        assert!(!r.sign);
    }

    #[test]
    fn negative_zero_keeps_sign() {
        let r = render(-0.0f64, FloatConv::Fixed, Some(2), false, false).unwrap();
        assert!(r.sign);
    }

    #[test]
    fn nan_and_infinity() {
        let r = render(f64::NAN, FloatConv::Fixed, None, false, false).unwrap();
        assert!(matches!(r.core, FloatCore::Nan));
        let r = render(f64::NEG_INFINITY, FloatConv::Fixed, None, false, false).unwrap();
        assert!(r.sign);
        assert!(matches!(r.core, FloatCore::Infinity));
    }

    #[test]
    fn fixed_rounds_up_through_all_nines() {
        // 0.99999 rounded to 2 fractional digits carries into the integer part.
        let r = render(0.99999f64, FloatConv::Fixed, Some(2), false, false).unwrap();
        assert_eq!(as_str(&r.core), "1.00");
    }
}
