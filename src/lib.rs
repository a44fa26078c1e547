//! A from-scratch, `no_std` reimplementation of `printf`/`fprintf`/
//! `snprintf`, built around a Dragon4-style, big-integer-based,
//! correctly-rounded floating-point-to-decimal converter.
//!
//! Since this crate's target has no variadic calling convention, the
//! argument list is a plain `&[Argument]` built with [`args::Argument`]
//! instead of C's `...`:
//!
//! ```
//! use cprintf::args::Argument;
//!
//! let mut buf = [0u8; 64];
//! let n = cprintf::snprintf(
//!     &mut buf,
//!     b"%-10s%6.2f%%",
//!     &[Argument::Str(b"load"), Argument::Float(37.5)],
//! );
//! assert_eq!(n, 17);
//! assert_eq!(&buf[..n as usize], b"load       37.50%");
//! ```
//!
//! The conversion pipeline underneath (big-integer arithmetic, UTF
//! transcoding, the directive grammar, Dragon4 itself) is exposed as
//! public modules for callers who want to build a custom formatted-output
//! engine without reimplementing the hard parts.

#![deny(
    rust_2018_idioms,
    trivial_numeric_casts,
    unreachable_pub,
    unused_must_use,
    unused_qualifications
)]
#![no_std]

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod args;
pub mod bignum;
pub mod compose;
pub mod decoder;
pub mod directive;
pub mod dragon;
pub mod error;
pub mod floatfmt;
pub mod hexfloat;
pub mod intfmt;
pub mod sink;
pub mod textconv;

use args::{Argument, ArgumentPuller, WideStrArg};
use compose::compose;
use directive::{Conversion, Directive, FormatPolicy, LengthMod, PrecisionSpec, WidthSpec};
use error::PrintfError;
use floatfmt::{FloatConv, FloatCore};
use intfmt::IntConv;
use sink::OutputSink;

#[cfg(feature = "std")]
use sink::IoWriteSink;

fn resolve_width(
    width: WidthSpec,
    flags: &mut directive::Flags,
    puller: &mut ArgumentPuller<'_>,
) -> Result<usize, PrintfError> {
    match width {
        WidthSpec::Unspecified => Ok(0),
        WidthSpec::Fixed(n) => Ok(n),
        WidthSpec::FromArgs => {
            let v = puller.next_width_or_precision()?;
            if v < 0 {
                flags.left_justify = true;
                Ok(v.unsigned_abs() as usize)
            } else {
                Ok(v as usize)
            }
        }
    }
}

/// Per C99, a negative precision pulled from `.*` is treated as if the
/// precision had been omitted entirely.
fn resolve_precision(
    precision: PrecisionSpec,
    puller: &mut ArgumentPuller<'_>,
) -> Result<Option<usize>, PrintfError> {
    match precision {
        PrecisionSpec::Unspecified => Ok(None),
        PrecisionSpec::Fixed(n) => Ok(Some(n)),
        PrecisionSpec::FromArgs => {
            let v = puller.next_width_or_precision()?;
            Ok(if v < 0 { None } else { Some(v as usize) })
        }
    }
}

fn truncate_signed(value: i64, length: LengthMod) -> i64 {
    match length {
        LengthMod::HH => value as i8 as i64,
        LengthMod::H => value as i16 as i64,
        _ => value,
    }
}

fn truncate_unsigned(value: u64, length: LengthMod) -> u64 {
    match length {
        LengthMod::HH => value as u8 as u64,
        LengthMod::H => value as u16 as u64,
        _ => value,
    }
}

/// The number of leading UTF-8-family characters in `bytes` (up to
/// `limit`), returning the byte length of that prefix. Precision on `%s`
/// counts *characters*, not bytes, so a multi-byte character is never
/// split in half by truncation.
fn utf8_prefix_byte_len(bytes: &[u8], limit: Option<usize>) -> Result<usize, PrintfError> {
    let limit = limit.unwrap_or(usize::MAX);
    let mut i = 0;
    let mut chars = 0;
    while i < bytes.len() && chars < limit {
        let (_, len) =
            textconv::validate_utf8(&bytes[i..]).map_err(|_| PrintfError::InvalidEncoding)?;
        i += len;
        chars += 1;
    }
    Ok(i)
}

fn wide_str_byte_len(w: WideStrArg<'_>, limit: Option<usize>) -> Result<usize, PrintfError> {
    let limit = limit.unwrap_or(usize::MAX);
    let count_emit = |scalar: u32| {
        let mut tmp = [0u8; 8];
        textconv::encode_scalar(scalar as u64, &mut tmp)
    };
    let (_, bytes) = match w {
        WideStrArg::Sixteen(units) => textconv::walk_utf16(units, limit, count_emit),
        WideStrArg::ThirtyTwo(units) => textconv::walk_utf32(units, limit, count_emit),
    }
    .map_err(|_| PrintfError::InvalidEncoding)?;
    Ok(bytes)
}

fn push_wide_str(sink: &mut OutputSink<'_>, w: WideStrArg<'_>, limit: Option<usize>) {
    let limit = limit.unwrap_or(usize::MAX);
    let mut emit = |scalar: u32| {
        let mut tmp = [0u8; 8];
        let n = textconv::encode_scalar(scalar as u64, &mut tmp).unwrap_or(0);
        sink.push(&tmp[..n]);
        Ok(n)
    };
    let _ = match w {
        WideStrArg::Sixteen(units) => textconv::walk_utf16(units, limit, &mut emit),
        WideStrArg::ThirtyTwo(units) => textconv::walk_utf32(units, limit, &mut emit),
    };
}

fn compose_integer(
    sink: &mut OutputSink<'_>,
    mut flags: directive::Flags,
    conv: IntConv,
    width: usize,
    precision: Option<usize>,
    is_negative: bool,
    magnitude: u64,
    policy: &FormatPolicy,
) {
    if policy.suppress_zero_pad_on_int_precision && precision.is_some() {
        flags.zero_pad = false;
    }

    let mut effective_precision = precision;
    if conv == IntConv::Octal && flags.alt_form {
        let natural = intfmt::format_unsigned(magnitude, conv, None).len;
        let required = if magnitude == 0 { 1 } else { natural + 1 };
        effective_precision = Some(required.max(precision.unwrap_or(0)));
    }

    let digits = intfmt::format_unsigned(magnitude, conv, effective_precision);

    let prefix: &[u8] = if matches!(conv, IntConv::HexLower | IntConv::HexUpper)
        && flags.alt_form
        && !(policy.elide_alt_prefix_on_zero_value && digits.magnitude_is_zero)
    {
        if conv == IntConv::HexUpper {
            b"0X"
        } else {
            b"0x"
        }
    } else {
        b""
    };

    let sign = compose::sign_char(is_negative, flags.force_sign, flags.sign_space);
    let len = digits.len;
    compose(sink, width, flags, sign, prefix, len, |s| s.push(&digits.buf[..len]));
}

fn execute_integer(
    sink: &mut OutputSink<'_>,
    directive: &Directive,
    conv: IntConv,
    width: usize,
    precision: Option<usize>,
    puller: &mut ArgumentPuller<'_>,
    policy: &FormatPolicy,
) -> Result<(), PrintfError> {
    let (is_negative, magnitude) = match directive.conversion {
        Conversion::SignedDecimal => {
            let v = truncate_signed(puller.next_signed()?, directive.length);
            intfmt::signed_magnitude(v)
        }
        _ => {
            let v = truncate_unsigned(puller.next_unsigned()?, directive.length);
            (false, v)
        }
    };
    compose_integer(sink, directive.flags, conv, width, precision, is_negative, magnitude, policy);
    Ok(())
}

fn float_special_text(uppercase: bool, is_inf: bool) -> &'static [u8] {
    match (uppercase, is_inf) {
        (false, false) => b"nan",
        (true, false) => b"NAN",
        (false, true) => b"inf",
        (true, true) => b"INF",
    }
}

fn execute_float(
    sink: &mut OutputSink<'_>,
    directive: &Directive,
    conv: FloatConv,
    uppercase: bool,
    width: usize,
    precision: Option<usize>,
    puller: &mut ArgumentPuller<'_>,
) -> Result<(), PrintfError> {
    let mut flags = directive.flags;
    let alt_form = flags.alt_form;
    let value = puller.next_float()?;
    let rendered = floatfmt::render(value, conv, precision, alt_form, uppercase)?;

    let (sign, payload_is_special) = match &rendered.core {
        FloatCore::Nan => (if rendered.sign { Some(b'-') } else { None }, true),
        FloatCore::Infinity => {
            (compose::sign_char(rendered.sign, flags.force_sign, flags.sign_space), true)
        }
        FloatCore::Number { .. } => {
            (compose::sign_char(rendered.sign, flags.force_sign, flags.sign_space), false)
        }
    };
    if payload_is_special {
        flags.zero_pad = false;
    }

    match rendered.core {
        FloatCore::Nan => {
            let text = float_special_text(uppercase, false);
            compose(sink, width, flags, sign, b"", text.len(), |s| s.push(text));
        }
        FloatCore::Infinity => {
            let text = float_special_text(uppercase, true);
            compose(sink, width, flags, sign, b"", text.len(), |s| s.push(text));
        }
        FloatCore::Number { buf, len } => {
            compose(sink, width, flags, sign, b"", len, |s| s.push(&buf[..len]));
        }
    }
    Ok(())
}

fn execute_hex_float(
    sink: &mut OutputSink<'_>,
    directive: &Directive,
    uppercase: bool,
    width: usize,
    precision: Option<usize>,
    puller: &mut ArgumentPuller<'_>,
) -> Result<(), PrintfError> {
    let mut flags = directive.flags;
    let value = puller.next_float()?;
    let rendered = hexfloat::render(value, precision, flags.alt_form, uppercase);

    let (sign, is_special) = match &rendered.core {
        hexfloat::HexFloatCore::Nan => (if rendered.sign { Some(b'-') } else { None }, true),
        hexfloat::HexFloatCore::Infinity => {
            (compose::sign_char(rendered.sign, flags.force_sign, flags.sign_space), true)
        }
        hexfloat::HexFloatCore::Number { .. } => {
            (compose::sign_char(rendered.sign, flags.force_sign, flags.sign_space), false)
        }
    };
    if is_special {
        flags.zero_pad = false;
    }

    match rendered.core {
        hexfloat::HexFloatCore::Nan => {
            let text = float_special_text(uppercase, false);
            compose(sink, width, flags, sign, b"", text.len(), |s| s.push(text));
        }
        hexfloat::HexFloatCore::Infinity => {
            let text = float_special_text(uppercase, true);
            compose(sink, width, flags, sign, b"", text.len(), |s| s.push(text));
        }
        hexfloat::HexFloatCore::Number { buf, len } => {
            compose(sink, width, flags, sign, b"", len, |s| s.push(&buf[..len]));
        }
    }
    Ok(())
}

fn execute_directive(
    sink: &mut OutputSink<'_>,
    directive: &Directive,
    puller: &mut ArgumentPuller<'_>,
    policy: &FormatPolicy,
) -> Result<(), PrintfError> {
    let mut flags = directive.flags;
    let width = resolve_width(directive.width, &mut flags, puller)?;
    let precision = resolve_precision(directive.precision, puller)?;
    let directive = &Directive { flags, ..*directive };

    match directive.conversion {
        Conversion::SignedDecimal => {
            execute_integer(sink, directive, IntConv::Decimal, width, precision, puller, policy)
        }
        Conversion::Unsigned => {
            execute_integer(sink, directive, IntConv::Decimal, width, precision, puller, policy)
        }
        Conversion::Octal => {
            execute_integer(sink, directive, IntConv::Octal, width, precision, puller, policy)
        }
        Conversion::HexLower => {
            execute_integer(sink, directive, IntConv::HexLower, width, precision, puller, policy)
        }
        Conversion::HexUpper => {
            execute_integer(sink, directive, IntConv::HexUpper, width, precision, puller, policy)
        }
        Conversion::FixedFloat => execute_float(sink, directive, FloatConv::Fixed, false, width, precision, puller),
        Conversion::FixedFloatUpper => {
            execute_float(sink, directive, FloatConv::Fixed, true, width, precision, puller)
        }
        Conversion::ExpFloat => execute_float(sink, directive, FloatConv::Exp, false, width, precision, puller),
        Conversion::ExpFloatUpper => {
            execute_float(sink, directive, FloatConv::Exp, true, width, precision, puller)
        }
        Conversion::GeneralFloat => {
            execute_float(sink, directive, FloatConv::General, false, width, precision, puller)
        }
        Conversion::GeneralFloatUpper => {
            execute_float(sink, directive, FloatConv::General, true, width, precision, puller)
        }
        Conversion::HexFloat => execute_hex_float(sink, directive, false, width, precision, puller),
        Conversion::HexFloatUpper => execute_hex_float(sink, directive, true, width, precision, puller),
        Conversion::Char => {
            let mut tmp = [0u8; 8];
            let len = if directive.length == LengthMod::L {
                let scalar = puller.next_wchar()?;
                textconv::encode_scalar(scalar as u64, &mut tmp)
                    .map_err(|_| PrintfError::InvalidEncoding)?
            } else {
                tmp[0] = puller.next_char()?;
                1
            };
            compose(sink, width, flags, None, b"", len, |s| s.push(&tmp[..len]));
            Ok(())
        }
        Conversion::Str => {
            if directive.length == LengthMod::L {
                let w = puller.next_wide_str()?;
                let len = wide_str_byte_len(w, precision)?;
                compose(sink, width, flags, None, b"", len, |s| push_wide_str(s, w, precision));
            } else {
                let bytes = puller.next_str()?;
                let len = utf8_prefix_byte_len(bytes, precision)?;
                compose(sink, width, flags, None, b"", len, |s| s.push(&bytes[..len]));
            }
            Ok(())
        }
        Conversion::Pointer => {
            let addr = puller.next_pointer()? as u64;
            let pointer_flags = directive::Flags { alt_form: true, ..flags };
            compose_integer(sink, pointer_flags, IntConv::HexLower, width, precision, false, addr, policy);
            Ok(())
        }
        Conversion::CountWritten => {
            let ptr = puller.next_n_arg()?;
            let count = sink.actual_need() as i64;
            unsafe {
                ptr.record(count);
            }
            Ok(())
        }
        Conversion::Percent => {
            compose(sink, width, flags, None, b"", 1, |s| s.push(b"%"));
            Ok(())
        }
    }
}

fn run(
    sink: &mut OutputSink<'_>,
    format: &[u8],
    args: &[Argument<'_>],
    policy: &FormatPolicy,
) -> Result<(), PrintfError> {
    let mut puller = ArgumentPuller::new(args);
    let mut i = 0;
    while i < format.len() {
        if format[i] == b'%' {
            let (directive, consumed) = directive::parse(&format[i + 1..], policy)?;
            i += 1 + consumed;
            execute_directive(sink, &directive, &mut puller, policy)?;
            if sink.io_errored() {
                return Ok(());
            }
        } else {
            let start = i;
            while i < format.len() && format[i] != b'%' {
                i += 1;
            }
            let mut j = start;
            while j < i {
                let (_, len) = textconv::validate_utf8(&format[j..i])
                    .map_err(|_| PrintfError::InvalidEncoding)?;
                j += len;
            }
            sink.push(&format[start..i]);
            if sink.io_errored() {
                return Ok(());
            }
        }
    }
    Ok(())
}

/// Formats into a bounded buffer, classic `snprintf` semantics: returns
/// the number of bytes that *would* have been written (excluding the
/// null terminator) even if `store` was too small to hold them all, and
/// always null-terminates when `store` is non-empty. Returns `-1` on a
/// fatal format error, having blanked the entire buffer.
pub fn snprintf(store: &mut [u8], format: &[u8], args: &[Argument<'_>]) -> i64 {
    snprintf_with_policy(store, format, args, &FormatPolicy::default())
}

/// [`snprintf`] with an explicit [`FormatPolicy`].
pub fn snprintf_with_policy(
    store: &mut [u8],
    format: &[u8],
    args: &[Argument<'_>],
    policy: &FormatPolicy,
) -> i64 {
    let mut sink = OutputSink::bounded(store);
    match run(&mut sink, format, args, policy) {
        Ok(()) => sink.actual_need() as i64,
        Err(_) => {
            sink.abort();
            -1
        }
    }
}

/// Formats to any [`sink::ByteSink`] (a `no_std`-friendly stand-in for a
/// file handle). Returns `0` on success, `-1` on a fatal format error or
/// streaming I/O failure.
pub fn fprintf_sink(handle: &mut dyn sink::ByteSink, format: &[u8], args: &[Argument<'_>]) -> i64 {
    fprintf_sink_with_policy(handle, format, args, &FormatPolicy::default())
}

/// [`fprintf_sink`] with an explicit [`FormatPolicy`].
pub fn fprintf_sink_with_policy(
    handle: &mut dyn sink::ByteSink,
    format: &[u8],
    args: &[Argument<'_>],
    policy: &FormatPolicy,
) -> i64 {
    let mut sink = OutputSink::streaming(handle);
    match run(&mut sink, format, args, policy) {
        Ok(()) => {
            if sink.io_errored() {
                -1
            } else {
                0
            }
        }
        Err(_) => -1,
    }
}

/// Formats to any `std::io::Write`, the usual shape of `fprintf`.
#[cfg(feature = "std")]
pub fn fprintf<W: std::io::Write>(file: &mut W, format: &[u8], args: &[Argument<'_>]) -> i64 {
    let mut adapter = IoWriteSink(file);
    fprintf_sink(&mut adapter, format, args)
}

/// [`fprintf`] with an explicit [`FormatPolicy`].
#[cfg(feature = "std")]
pub fn fprintf_with_policy(
    file: &mut impl std::io::Write,
    format: &[u8],
    args: &[Argument<'_>],
    policy: &FormatPolicy,
) -> i64 {
    let mut adapter = IoWriteSink(file);
    fprintf_sink_with_policy(&mut adapter, format, args, policy)
}

/// [`fprintf`] to standard output.
#[cfg(feature = "std")]
pub fn printf(format: &[u8], args: &[Argument<'_>]) -> i64 {
    let mut stdout = std::io::stdout();
    fprintf(&mut stdout, format, args)
}
