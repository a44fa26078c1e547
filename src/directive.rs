//! The format-directive parser: turns `%[flags][width][.precision]
//! [length]conv` into a [`Directive`] record.
//!
//! This walks forward in the standard POSIX grammar order: flags
//! greedily absorb every leading `0`, so by the time width parsing
//! starts there is never an ambiguous leading zero left to misread as a
//! width digit.

use crate::error::PrintfError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    pub left_justify: bool,
    pub force_sign: bool,
    pub sign_space: bool,
    pub alt_form: bool,
    pub zero_pad: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidthSpec {
    Unspecified,
    Fixed(usize),
    FromArgs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrecisionSpec {
    Unspecified,
    Fixed(usize),
    FromArgs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LengthMod {
    None,
    HH,
    H,
    L,
    LL,
    J,
    Z,
    T,
    LongDouble,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conversion {
    SignedDecimal,
    Unsigned,
    Octal,
    HexLower,
    HexUpper,
    FixedFloat,
    FixedFloatUpper,
    ExpFloat,
    ExpFloatUpper,
    GeneralFloat,
    GeneralFloatUpper,
    HexFloat,
    HexFloatUpper,
    Char,
    Str,
    Pointer,
    CountWritten,
    Percent,
}

impl Conversion {
    fn from_byte(b: u8) -> Option<Conversion> {
        Some(match b {
            b'd' | b'i' => Conversion::SignedDecimal,
            b'u' => Conversion::Unsigned,
            b'o' => Conversion::Octal,
            b'x' => Conversion::HexLower,
            b'X' => Conversion::HexUpper,
            b'f' => Conversion::FixedFloat,
            b'F' => Conversion::FixedFloatUpper,
            b'e' => Conversion::ExpFloat,
            b'E' => Conversion::ExpFloatUpper,
            b'g' => Conversion::GeneralFloat,
            b'G' => Conversion::GeneralFloatUpper,
            b'a' => Conversion::HexFloat,
            b'A' => Conversion::HexFloatUpper,
            b'c' => Conversion::Char,
            b's' => Conversion::Str,
            b'p' => Conversion::Pointer,
            b'n' => Conversion::CountWritten,
            b'%' => Conversion::Percent,
            _ => return None,
        })
    }

    /// Whether `length` is one of the modifiers C99 allows for this
    /// conversion.
    fn accepts_length(self, length: LengthMod) -> bool {
        use Conversion::*;
        use LengthMod as Lm;
        match self {
            SignedDecimal | Unsigned | Octal | HexLower | HexUpper | CountWritten => {
                matches!(length, Lm::None | Lm::HH | Lm::H | Lm::L | Lm::LL | Lm::J | Lm::Z | Lm::T)
            }
            FixedFloat | FixedFloatUpper | ExpFloat | ExpFloatUpper | GeneralFloat
            | GeneralFloatUpper | HexFloat | HexFloatUpper => {
                matches!(length, Lm::None | Lm::L | Lm::LongDouble)
            }
            Char => matches!(length, Lm::None | Lm::L),
            Str => matches!(length, Lm::None | Lm::L),
            Pointer | Percent => length == Lm::None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Directive {
    pub conversion: Conversion,
    pub flags: Flags,
    pub width: WidthSpec,
    pub precision: PrecisionSpec,
    pub length: LengthMod,
}

/// Runtime switches for corner-case behaviors that some `printf`
/// implementations gate behind compile-time flags instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatPolicy {
    pub suppress_zero_pad_on_left_justify: bool,
    pub suppress_zero_pad_on_int_precision: bool,
    pub elide_alt_prefix_on_zero_value: bool,
    pub enable_percent_n: bool,
}

impl Default for FormatPolicy {
    fn default() -> Self {
        FormatPolicy {
            suppress_zero_pad_on_left_justify: true,
            suppress_zero_pad_on_int_precision: true,
            elide_alt_prefix_on_zero_value: true,
            enable_percent_n: false,
        }
    }
}

fn take_digits(bytes: &[u8]) -> (usize, usize) {
    let mut n = 0usize;
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        n = n.saturating_mul(10).saturating_add((bytes[i] - b'0') as usize);
        i += 1;
    }
    (n, i)
}

/// Parses one directive starting just past the `%`. Returns the
/// directive and the number of bytes consumed (including the
/// conversion byte, excluding the leading `%`).
pub fn parse(bytes: &[u8], policy: &FormatPolicy) -> Result<(Directive, usize), PrintfError> {
    let mut i = 0;
    let mut flags = Flags::default();
    loop {
        match bytes.get(i) {
            Some(b'-') => flags.left_justify = true,
            Some(b'+') => flags.force_sign = true,
            Some(b' ') => flags.sign_space = true,
            Some(b'#') => flags.alt_form = true,
            Some(b'0') => flags.zero_pad = true,
            _ => break,
        }
        i += 1;
    }

    let width = if bytes.get(i) == Some(&b'*') {
        i += 1;
        WidthSpec::FromArgs
    } else {
        let (n, consumed) = take_digits(&bytes[i..]);
        i += consumed;
        if consumed == 0 {
            WidthSpec::Unspecified
        } else {
            WidthSpec::Fixed(n)
        }
    };

    let precision = if bytes.get(i) == Some(&b'.') {
        i += 1;
        if bytes.get(i) == Some(&b'*') {
            i += 1;
            PrecisionSpec::FromArgs
        } else {
            let (n, consumed) = take_digits(&bytes[i..]);
            i += consumed;
            PrecisionSpec::Fixed(n)
        }
    } else {
        PrecisionSpec::Unspecified
    };

    let length = if bytes[i..].starts_with(b"hh") {
        i += 2;
        LengthMod::HH
    } else if bytes[i..].starts_with(b"ll") {
        i += 2;
        LengthMod::LL
    } else {
        match bytes.get(i) {
            Some(b'h') => {
                i += 1;
                LengthMod::H
            }
            Some(b'l') => {
                i += 1;
                LengthMod::L
            }
            Some(b'j') => {
                i += 1;
                LengthMod::J
            }
            Some(b'z') => {
                i += 1;
                LengthMod::Z
            }
            Some(b't') => {
                i += 1;
                LengthMod::T
            }
            Some(b'L') => {
                i += 1;
                LengthMod::LongDouble
            }
            _ => LengthMod::None,
        }
    };

    let conv_byte = *bytes.get(i).ok_or(PrintfError::MalformedDirective)?;
    let conversion = Conversion::from_byte(conv_byte).ok_or(PrintfError::MalformedDirective)?;
    i += 1;

    if !conversion.accepts_length(length) {
        return Err(PrintfError::MalformedDirective);
    }
    if conversion == Conversion::CountWritten && !policy.enable_percent_n {
        return Err(PrintfError::MalformedDirective);
    }

    // `-` overrides `0` per C99.
    if policy.suppress_zero_pad_on_left_justify && flags.left_justify {
        flags.zero_pad = false;
    }

    Ok((Directive { conversion, flags, width, precision, length }, i))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(s: &str) -> Directive {
        parse(s.as_bytes(), &FormatPolicy::default()).unwrap().0
    }

    #[test]
    fn plain_conversion() {
        let d = parse_ok("d");
        assert_eq!(d.conversion, Conversion::SignedDecimal);
        assert_eq!(d.width, WidthSpec::Unspecified);
        assert_eq!(d.precision, PrecisionSpec::Unspecified);
    }

    #[test]
    fn leading_zero_is_a_flag_not_width() {
        let d = parse_ok("012d");
        assert!(d.flags.zero_pad);
        assert_eq!(d.width, WidthSpec::Fixed(12));
    }

    #[test]
    fn full_directive() {
        let d = parse_ok("-+ #012.3lld");
        assert!(d.flags.left_justify);
        assert!(d.flags.force_sign);
        assert!(d.flags.sign_space);
        assert!(d.flags.alt_form);
        // left-justify suppresses zero-pad by default policy.
        assert!(!d.flags.zero_pad);
        assert_eq!(d.width, WidthSpec::Fixed(12));
        assert_eq!(d.precision, PrecisionSpec::Fixed(3));
        assert_eq!(d.length, LengthMod::LL);
        assert_eq!(d.conversion, Conversion::SignedDecimal);
    }

    #[test]
    fn star_width_and_precision() {
        let d = parse_ok("*.*d");
        assert_eq!(d.width, WidthSpec::FromArgs);
        assert_eq!(d.precision, PrecisionSpec::FromArgs);
    }

    #[test]
    fn bare_dot_precision_is_zero() {
        let d = parse_ok(".d");
        assert_eq!(d.precision, PrecisionSpec::Fixed(0));
    }

    #[test]
    fn unknown_conversion_is_malformed() {
        assert!(parse(b"q", &FormatPolicy::default()).is_err());
    }

    #[test]
    fn incompatible_length_modifier_is_malformed() {
        // `%lc` is valid (wide char); `%Lc` is not.
        assert!(parse(b"Lc", &FormatPolicy::default()).is_err());
    }

    #[test]
    fn percent_n_rejected_unless_enabled() {
        assert!(parse(b"n", &FormatPolicy::default()).is_err());
        let policy = FormatPolicy { enable_percent_n: true, ..FormatPolicy::default() };
        assert!(parse(b"n", &policy).is_ok());
    }

    #[test]
    fn float_length_modifiers() {
        assert!(parse(b"lf", &FormatPolicy::default()).is_ok());
        assert!(parse(b"Lf", &FormatPolicy::default()).is_ok());
        assert!(parse(b"hf", &FormatPolicy::default()).is_err());
    }

    #[test]
    fn consumed_length_matches_directive_tail() {
        let (_, consumed) = parse(b"08.2fXYZ", &FormatPolicy::default()).unwrap();
        assert_eq!(consumed, 5); // "08.2f"
    }
}
