//! The crate's error taxonomy.

use core::fmt;

/// A fatal error from a formatting call.
///
/// Every variant here surfaces as a single `-1` return value;
/// bounded-buffer entry points additionally zero the store.
/// `BufferExhausted` is deliberately not a variant: it is not an error,
/// only a signal that `actual_need` grew past capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum PrintfError {
    /// An unrecognized conversion byte, an invalid length-modifier
    /// combination, or an invalid flag sequence.
    MalformedDirective,
    /// The format string was not valid UTF-8, or a wide-character string
    /// argument contained an unpaired surrogate or non-scalar code point.
    InvalidEncoding,
    /// A big-integer operation during Dragon4 setup overflowed its fixed
    /// limb width. This indicates an internal sizing bug and must never
    /// be produced by well-formed input.
    ArithmeticOverflow,
    /// The format string was null, or a `%n` conversion was given a null
    /// pointer.
    NullArgument,
}

impl fmt::Display for PrintfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            PrintfError::MalformedDirective => "malformed format directive",
            PrintfError::InvalidEncoding => "invalid text encoding",
            PrintfError::ArithmeticOverflow => "internal arithmetic overflow",
            PrintfError::NullArgument => "null format string or %n argument",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PrintfError {}
