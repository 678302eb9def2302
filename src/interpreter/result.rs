//! Interpreter result storage
//!
//! The result of the most recent evaluation. Short strings live in an
//! inline buffer, the empty and out-of-memory results are static, and
//! only long results touch the heap. The out-of-memory sink can always
//! be installed without allocating.

use crate::interpreter::errors::{Flow, Status};
use crate::interpreter::interp::Interp;

/// Size of the inline result buffer.
pub const SMALL_RESULT_LEN: usize = 96;

pub(crate) const OOM: &str = "Out Of Memory";

/// The interpreter's current result string.
pub enum ResultSlot {
    /// The static empty string.
    Empty,
    /// The static out-of-memory message.
    Oom,
    /// A short result held inline.
    Small { buf: [u8; SMALL_RESULT_LEN], len: u8 },
    /// A long result owned on the heap.
    Heap(String),
}

impl ResultSlot {
    pub fn as_str(&self) -> &str {
        match self {
            ResultSlot::Empty => "",
            ResultSlot::Oom => OOM,
            ResultSlot::Small { buf, len } => {
                std::str::from_utf8(&buf[..*len as usize]).unwrap_or("")
            }
            ResultSlot::Heap(s) => s,
        }
    }

    /// Bytes to return to the allocator when this slot is replaced.
    pub(crate) fn heap_len(&self) -> usize {
        match self {
            ResultSlot::Heap(s) => s.len(),
            _ => 0,
        }
    }
}

impl Interp {
    /// The current result string.
    pub fn result(&self) -> &str {
        self.result.as_str()
    }

    /// The current result parsed as an integer under strict rules.
    pub fn result_integer(&mut self) -> Result<i64, Flow> {
        let s = self.result().to_string();
        self.number(&s)
    }

    /// Replace the result. Short strings are copied into the inline
    /// buffer without allocating.
    pub fn set_result(&mut self, s: &str) -> Status {
        if s.len() < SMALL_RESULT_LEN {
            let mut buf = [0u8; SMALL_RESULT_LEN];
            buf[..s.len()].copy_from_slice(s.as_bytes());
            self.drop_result();
            self.result = ResultSlot::Small { buf, len: s.len() as u8 };
            return Ok(());
        }
        self.charge(s.len())?;
        self.drop_result();
        self.result = ResultSlot::Heap(s.to_string());
        Ok(())
    }

    /// Replace the result with an already-charged string, transferring
    /// its accounting.
    pub(crate) fn set_result_owned(&mut self, s: String) -> Status {
        let r = self.set_result(&s);
        self.release(s.len());
        r
    }

    /// Format an integer into the result.
    pub fn set_result_integer(&mut self, n: i64) -> Status {
        self.set_result(&crate::interpreter::numbers::format_int(n, 10))
    }

    /// Reset the result to the static empty string.
    pub fn clear_result(&mut self) {
        self.drop_result();
        self.result = ResultSlot::Empty;
    }

    /// Install the static out-of-memory result. Never allocates.
    pub(crate) fn oom_result(&mut self) {
        self.drop_result();
        self.result = ResultSlot::Oom;
    }

    /// Format an error message into the result, citing the current
    /// line when line tracking is active, and produce the error code.
    pub fn error(&mut self, msg: impl std::fmt::Display) -> Flow {
        let text = if self.line > 0 {
            format!("line {}: {}", self.line, msg)
        } else {
            msg.to_string()
        };
        let _ = self.set_result(&text);
        Flow::Error
    }

    /// Error for a command invoked with the wrong number of arguments.
    pub fn arity_error(&mut self, expected: usize, argv: &[String]) -> Flow {
        let got = argv.join(" ");
        let name = argv.first().map(String::as_str).unwrap_or("");
        self.error(format!(
            "Wrong number of args for '{}' (expected {})\nGot: {}",
            name,
            expected.saturating_sub(1),
            got
        ))
    }

    fn drop_result(&mut self) {
        let released = self.result.heap_len();
        self.release(released);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::interp::{Interp, InterpOptions};
    use crate::interpreter::alloc::BoundedAllocator;

    #[test]
    fn test_small_result_stays_inline() {
        let mut i = Interp::default();
        i.set_result("hello").unwrap();
        assert!(matches!(i.result, ResultSlot::Small { .. }));
        assert_eq!(i.result(), "hello");
    }

    #[test]
    fn test_long_result_moves_to_heap() {
        let mut i = Interp::default();
        let long = "x".repeat(SMALL_RESULT_LEN + 10);
        i.set_result(&long).unwrap();
        assert!(matches!(i.result, ResultSlot::Heap(_)));
        assert_eq!(i.result(), long);
    }

    #[test]
    fn test_oom_sink_is_static() {
        let mut i = Interp::new(InterpOptions {
            allocator: Some(Box::new(BoundedAllocator::new(0))),
            ..Default::default()
        });
        let long = "x".repeat(SMALL_RESULT_LEN + 10);
        assert_eq!(i.set_result(&long), Err(Flow::Error));
        assert_eq!(i.result(), "Out Of Memory");
    }

    #[test]
    fn test_error_cites_line() {
        let mut i = Interp::default();
        i.line = 3;
        let flow = i.error("boom");
        assert_eq!(flow, Flow::Error);
        assert_eq!(i.result(), "line 3: boom");
    }

    #[test]
    fn test_integer_round_trip() {
        let mut i = Interp::default();
        i.set_result_integer(-42).unwrap();
        assert_eq!(i.result(), "-42");
        assert_eq!(i.result_integer().unwrap(), -42);
    }
}
