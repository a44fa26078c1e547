//! The uniform byte-output contract behind both `snprintf`'s bounded
//! buffer and `fprintf`/`printf`'s streaming file handle.
//!
//! Both variants count `actual_need`, the number of bytes an unbounded
//! destination would have received, even when the bounded variant stops
//! short of writing them all — classic `snprintf` truncation semantics,
//! which is not an error condition.

/// A caller-supplied streaming destination, the `no_std`-friendly stand-in
/// for `std::io::Write`. `fprintf`/`printf` wrap a `std::io::Write` in
/// [`IoWriteSink`] when the `std` feature is enabled; other hosts can
/// implement this directly (e.g. a UART driver on an embedded target).
pub trait ByteSink {
    /// Writes every byte in `bytes`, in order. `Err(())` aborts the
    /// enclosing format call; there is no richer I/O error taxonomy than
    /// "fatal, stop".
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ()>;
}

/// Adapts any `std::io::Write` into a [`ByteSink`].
#[cfg(feature = "std")]
pub struct IoWriteSink<'a, W: std::io::Write>(pub &'a mut W);

#[cfg(feature = "std")]
impl<'a, W: std::io::Write> ByteSink for IoWriteSink<'a, W> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ()> {
        std::io::Write::write_all(self.0, bytes).map_err(|_| ())
    }
}

enum Backing<'a> {
    /// `store.is_empty()` stands in for "null store or zero capacity":
    /// writes are disabled but `actual_need` keeps accumulating.
    Bounded { store: &'a mut [u8], index: usize },
    Streaming { handle: &'a mut dyn ByteSink, errored: bool },
}

/// The per-call output sink. Scope-bound to a single `printf`/`fprintf`/
/// `snprintf` invocation, exactly like every other piece of per-directive
/// working state.
pub struct OutputSink<'a> {
    backing: Backing<'a>,
    actual_need: u64,
}

impl<'a> OutputSink<'a> {
    /// A bounded sink over `store`. Pass an empty slice for the "null
    /// pointer or zero capacity" case; all invariants below still hold
    /// (vacuously: there is no byte 0 to keep at 0).
    pub fn bounded(store: &'a mut [u8]) -> Self {
        if !store.is_empty() {
            store[0] = 0;
        }
        OutputSink { backing: Backing::Bounded { store, index: 0 }, actual_need: 0 }
    }

    /// A streaming sink over any [`ByteSink`].
    pub fn streaming(handle: &'a mut dyn ByteSink) -> Self {
        OutputSink {
            backing: Backing::Streaming { handle, errored: false },
            actual_need: 0,
        }
    }

    /// Appends `bytes` to the sink. Always grows `actual_need` by
    /// `bytes.len()`; for the bounded variant, copies as many bytes as
    /// fit in `capacity - 1` (reserving the null terminator slot) and
    /// re-establishes `store[index] == 0`.
    pub fn push(&mut self, bytes: &[u8]) {
        self.actual_need = self.actual_need.saturating_add(bytes.len() as u64);
        match &mut self.backing {
            Backing::Bounded { store, index } => {
                if store.is_empty() {
                    return;
                }
                let capacity = store.len();
                let room = capacity.saturating_sub(1).saturating_sub(*index);
                let take = bytes.len().min(room);
                store[*index..*index + take].copy_from_slice(&bytes[..take]);
                *index += take;
                store[*index] = 0;
            }
            Backing::Streaming { handle, errored } => {
                if *errored {
                    return;
                }
                if handle.write_all(bytes).is_err() {
                    *errored = true;
                }
            }
        }
    }

    /// True once a streaming write has failed; bounded sinks never set
    /// this (a full buffer is truncation, not an I/O error).
    pub fn io_errored(&self) -> bool {
        matches!(self.backing, Backing::Streaming { errored: true, .. })
    }

    /// On a fatal parse error (`PrintfError`), the bounded variant blanks
    /// the entire store as a failure sentinel. Streaming sinks have
    /// nothing analogous to blank.
    pub fn abort(&mut self) {
        if let Backing::Bounded { store, .. } = &mut self.backing {
            for byte in store.iter_mut() {
                *byte = 0;
            }
        }
    }

    /// The running `actual_need` count — what `snprintf`/`fprintf` report
    /// on success.
    pub fn actual_need(&self) -> u64 {
        self.actual_need
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_sink_null_terminates_and_counts_need() {
        let mut buf = [0xAAu8; 8];
        {
            let mut sink = OutputSink::bounded(&mut buf);
            sink.push(b"hello world");
            assert_eq!(sink.actual_need(), 11);
        }
        assert_eq!(&buf, b"hello w\0");
    }

    #[test]
    fn bounded_sink_always_keeps_index_in_bounds_with_nul() {
        let mut buf = [0xAAu8; 4];
        let mut sink = OutputSink::bounded(&mut buf);
        sink.push(b"ab");
        sink.push(b"cdef");
        assert_eq!(&buf, b"abc\0");
    }

    #[test]
    fn zero_capacity_disables_writes_but_counts_need() {
        let mut buf: [u8; 0] = [];
        let mut sink = OutputSink::bounded(&mut buf);
        sink.push(b"abc");
        assert_eq!(sink.actual_need(), 3);
    }

    #[test]
    fn abort_zeroes_entire_bounded_store() {
        let mut buf = [0xAAu8; 6];
        let mut sink = OutputSink::bounded(&mut buf);
        sink.push(b"hi");
        sink.abort();
        assert_eq!(buf, [0u8; 6]);
    }

    struct FailingSink;
    impl ByteSink for FailingSink {
        fn write_all(&mut self, _bytes: &[u8]) -> Result<(), ()> {
            Err(())
        }
    }

    #[test]
    fn streaming_sink_reports_io_error() {
        let mut failing = FailingSink;
        let mut sink = OutputSink::streaming(&mut failing);
        sink.push(b"x");
        assert!(sink.io_errored());
    }

    struct VecSink(std::vec::Vec<u8>);
    impl ByteSink for VecSink {
        fn write_all(&mut self, bytes: &[u8]) -> Result<(), ()> {
            self.0.extend_from_slice(bytes);
            Ok(())
        }
    }

    #[test]
    fn streaming_sink_forwards_every_byte() {
        let mut dest = VecSink(std::vec::Vec::new());
        let mut sink = OutputSink::streaming(&mut dest);
        sink.push(b"abc");
        sink.push(b"def");
        assert_eq!(sink.actual_need(), 6);
        assert_eq!(dest.0, b"abcdef");
    }
}
