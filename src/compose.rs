//! The flag/width composer shared by every numeric and string
//! conversion: given an already-rendered payload, a sign character, and
//! a complex prefix, emits the correctly ordered and padded field.

use crate::directive::Flags;
use crate::sink::OutputSink;

/// One pass of zero-or-space padding, chunked through a small stack
/// buffer so arbitrarily wide fields never need a heap allocation.
fn push_repeated(sink: &mut OutputSink<'_>, byte: u8, mut n: usize) {
    const CHUNK: usize = 64;
    let buf = [byte; CHUNK];
    while n > 0 {
        let take = n.min(CHUNK);
        sink.push(&buf[..take]);
        n -= take;
    }
}

/// Composes one directive's field: `sign` → `prefix` → padding → payload
/// (or padding after the payload, for left justification). `payload_len`
/// must equal the number of bytes `write_payload` pushes.
///
/// Sign and prefix always come first, zero-padding (when requested and
/// not left-justified) goes between the prefix and the payload, and
/// plain space padding wraps the whole sign+prefix+payload unit.
pub fn compose(
    sink: &mut OutputSink<'_>,
    width: usize,
    flags: Flags,
    sign: Option<u8>,
    prefix: &[u8],
    payload_len: usize,
    write_payload: impl FnOnce(&mut OutputSink<'_>),
) {
    let content_len = sign.is_some() as usize + prefix.len() + payload_len;
    let pad = width.saturating_sub(content_len);
    let zero_pad = flags.zero_pad && !flags.left_justify;

    if !flags.left_justify && !zero_pad {
        push_repeated(sink, b' ', pad);
    }
    if let Some(s) = sign {
        sink.push(&[s]);
    }
    sink.push(prefix);
    if zero_pad {
        push_repeated(sink, b'0', pad);
    }
    write_payload(sink);
    if flags.left_justify {
        push_repeated(sink, b' ', pad);
    }
}

/// Resolves the sign character a numeric conversion should emit, given
/// the value's sign and the `+`/` ` flags. Unsigned conversions always
/// pass `is_negative = false`.
pub fn sign_char(is_negative: bool, force_sign: bool, sign_space: bool) -> Option<u8> {
    if is_negative {
        Some(b'-')
    } else if force_sign {
        Some(b'+')
    } else if sign_space {
        Some(b' ')
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::Flags;

    fn run(width: usize, flags: Flags, sign: Option<u8>, prefix: &[u8], payload: &[u8]) -> std::string::String {
        let mut buf = [0u8; 64];
        let mut sink = OutputSink::bounded(&mut buf);
        compose(&mut sink, width, flags, sign, prefix, payload.len(), |s| s.push(payload));
        let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        buf[..end].iter().map(|&b| b as char).collect()
    }

    #[test]
    fn space_padding_right_justified_by_default() {
        let out = run(8, Flags::default(), None, b"", b"42");
        assert_eq!(out, "      42");
    }

    #[test]
    fn left_justify_pads_on_the_right() {
        let flags = Flags { left_justify: true, ..Flags::default() };
        let out = run(8, flags, None, b"", b"42");
        assert_eq!(out, "42      ");
    }

    #[test]
    fn zero_pad_goes_between_prefix_and_payload() {
        let flags = Flags { zero_pad: true, ..Flags::default() };
        let out = run(12, flags, None, b"0X", b"123456");
        assert_eq!(out, "0X0000123456");
    }

    #[test]
    fn left_justify_suppresses_zero_pad() {
        let flags = Flags { zero_pad: true, left_justify: true, ..Flags::default() };
        let out = run(12, flags, None, b"", b"123.123000");
        assert_eq!(out, "123.123000  ");
    }

    #[test]
    fn sign_precedes_zero_padding() {
        let flags = Flags { zero_pad: true, ..Flags::default() };
        let out = run(6, flags, Some(b'-'), b"", b"42");
        assert_eq!(out, "-00042");
    }

    #[test]
    fn zero_width_is_a_no_op() {
        let out = run(0, Flags::default(), None, b"", b"hi");
        assert_eq!(out, "hi");
    }

    #[test]
    fn sign_char_policy() {
        assert_eq!(sign_char(true, false, false), Some(b'-'));
        assert_eq!(sign_char(false, true, false), Some(b'+'));
        assert_eq!(sign_char(false, false, true), Some(b' '));
        assert_eq!(sign_char(false, false, false), None);
        assert_eq!(sign_char(false, true, true), Some(b'+'));
    }
}
