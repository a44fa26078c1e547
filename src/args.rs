//! The argument side of the engine: a tagged-value replacement for C's
//! variadic argument list, plus the `%n` byte-counting out-parameter.
//!
//! Callers build a `&[Argument]` in directive order and hand it to
//! [`crate::snprintf`]/[`crate::fprintf`]/[`crate::printf`]; a directive
//! whose conversion expects a different tag than the next argument
//! carries fails with [`PrintfError::MalformedDirective`], mirroring a
//! mismatched `va_arg` read in C.

use crate::error::PrintfError;

/// One formatted-output argument, tagged with the shape the directive
/// grammar expects.
#[derive(Clone, Copy, Debug)]
pub enum Argument<'a> {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    /// A `%s` argument: a UTF-8 byte string, NUL-terminator not included.
    Str(&'a [u8]),
    /// A `%ls` argument: UTF-16 code units, NUL-terminator not included.
    WStr16(&'a [u16]),
    /// A `%ls` argument on a platform where `wchar_t` is 32 bits.
    WStr32(&'a [u32]),
    /// A `%c` argument: one byte (already truncated to `unsigned char`,
    /// as C's variadic promotion does).
    Char(u8),
    /// A `%lc` argument: one wide character, transcoded like a
    /// one-character string.
    WChar(u32),
    /// A `%p` argument: a flat address — function and object pointers
    /// are both just bit patterns here.
    Pointer(usize),
    /// A `%n` argument: where to record the byte count emitted so far.
    NArg(NArgPtr),
}

/// A typed raw pointer for `%n`, sized by the directive's length
/// modifier. Writing through it is unsafe because, exactly as in C,
/// nothing here can prove the pointer is still valid for writes.
#[derive(Clone, Copy, Debug)]
pub enum NArgPtr {
    I8(*mut i8),
    I16(*mut i16),
    I32(*mut i32),
    I64(*mut i64),
    ISize(*mut isize),
}

impl NArgPtr {
    /// Writes `count` through the pointer, narrowing to the pointee's
    /// width (matching the reference's behavior of storing through
    /// whatever integer type the length modifier selected).
    ///
    /// # Safety
    ///
    /// The pointer must be valid and writable for the lifetime of the
    /// enclosing format call.
    pub unsafe fn record(self, count: i64) {
        match self {
            NArgPtr::I8(p) => *p = count as i8,
            NArgPtr::I16(p) => *p = count as i16,
            NArgPtr::I32(p) => *p = count as i32,
            NArgPtr::I64(p) => *p = count,
            NArgPtr::ISize(p) => *p = count as isize,
        }
    }
}

/// A `%ls` argument, tagged by the code-unit width the caller provided.
#[derive(Clone, Copy, Debug)]
pub enum WideStrArg<'a> {
    Sixteen(&'a [u16]),
    ThirtyTwo(&'a [u32]),
}

/// Pulls [`Argument`]s off a caller-supplied slice in order, the way a
/// directive loop walks `va_arg`.
pub struct ArgumentPuller<'a> {
    args: &'a [Argument<'a>],
    idx: usize,
}

impl<'a> ArgumentPuller<'a> {
    pub fn new(args: &'a [Argument<'a>]) -> Self {
        ArgumentPuller { args, idx: 0 }
    }

    fn next(&mut self) -> Result<Argument<'a>, PrintfError> {
        let arg = *self.args.get(self.idx).ok_or(PrintfError::MalformedDirective)?;
        self.idx += 1;
        Ok(arg)
    }

    pub fn next_signed(&mut self) -> Result<i64, PrintfError> {
        match self.next()? {
            Argument::Signed(v) => Ok(v),
            _ => Err(PrintfError::MalformedDirective),
        }
    }

    pub fn next_unsigned(&mut self) -> Result<u64, PrintfError> {
        match self.next()? {
            Argument::Unsigned(v) => Ok(v),
            Argument::Signed(v) => Ok(v as u64),
            _ => Err(PrintfError::MalformedDirective),
        }
    }

    pub fn next_float(&mut self) -> Result<f64, PrintfError> {
        match self.next()? {
            Argument::Float(v) => Ok(v),
            _ => Err(PrintfError::MalformedDirective),
        }
    }

    pub fn next_str(&mut self) -> Result<&'a [u8], PrintfError> {
        match self.next()? {
            Argument::Str(s) => Ok(s),
            _ => Err(PrintfError::MalformedDirective),
        }
    }

    pub fn next_wstr16(&mut self) -> Result<&'a [u16], PrintfError> {
        match self.next()? {
            Argument::WStr16(s) => Ok(s),
            _ => Err(PrintfError::MalformedDirective),
        }
    }

    pub fn next_wstr32(&mut self) -> Result<&'a [u32], PrintfError> {
        match self.next()? {
            Argument::WStr32(s) => Ok(s),
            _ => Err(PrintfError::MalformedDirective),
        }
    }

    /// Pulls a `%ls` argument whose code-unit width is determined by
    /// whichever tag the caller actually supplied, rather than by the
    /// length modifier alone (this crate does not assume a platform
    /// `wchar_t` width).
    pub fn next_wide_str(&mut self) -> Result<WideStrArg<'a>, PrintfError> {
        match self.next()? {
            Argument::WStr16(s) => Ok(WideStrArg::Sixteen(s)),
            Argument::WStr32(s) => Ok(WideStrArg::ThirtyTwo(s)),
            _ => Err(PrintfError::MalformedDirective),
        }
    }

    pub fn next_char(&mut self) -> Result<u8, PrintfError> {
        match self.next()? {
            Argument::Char(c) => Ok(c),
            _ => Err(PrintfError::MalformedDirective),
        }
    }

    pub fn next_wchar(&mut self) -> Result<u32, PrintfError> {
        match self.next()? {
            Argument::WChar(c) => Ok(c),
            _ => Err(PrintfError::MalformedDirective),
        }
    }

    pub fn next_pointer(&mut self) -> Result<usize, PrintfError> {
        match self.next()? {
            Argument::Pointer(p) => Ok(p),
            _ => Err(PrintfError::MalformedDirective),
        }
    }

    pub fn next_n_arg(&mut self) -> Result<NArgPtr, PrintfError> {
        match self.next()? {
            Argument::NArg(p) => Ok(p),
            _ => Err(PrintfError::MalformedDirective),
        }
    }

    /// Pulls a `*`-style width or precision. A negative width is, per C,
    /// equivalent to an unspecified sign plus `LEFT_JUSTIFY`; the caller
    /// applies that reinterpretation.
    pub fn next_width_or_precision(&mut self) -> Result<i64, PrintfError> {
        self.next_signed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulls_in_order_and_checks_tags() {
        let args = [Argument::Signed(5), Argument::Str(b"hi")];
        let mut puller = ArgumentPuller::new(&args);
        assert_eq!(puller.next_signed().unwrap(), 5);
        assert_eq!(puller.next_str().unwrap(), b"hi");
    }

    #[test]
    fn tag_mismatch_is_malformed() {
        let args = [Argument::Signed(5)];
        let mut puller = ArgumentPuller::new(&args);
        assert!(puller.next_str().is_err());
    }

    #[test]
    fn running_out_of_arguments_is_malformed() {
        let args: [Argument<'_>; 0] = [];
        let mut puller = ArgumentPuller::new(&args);
        assert!(puller.next_signed().is_err());
    }

    #[test]
    fn n_arg_records_through_pointer() {
        let mut k: i32 = 0;
        let ptr = NArgPtr::I32(&mut k as *mut i32);
        unsafe {
            ptr.record(12);
        }
        assert_eq!(k, 12);
    }

    #[test]
    fn unsigned_conversion_accepts_signed_argument() {
        let args = [Argument::Signed(-1)];
        let mut puller = ArgumentPuller::new(&args);
        assert_eq!(puller.next_unsigned().unwrap(), u64::MAX);
    }
}
