//! Return codes and control flow
//!
//! Every command and every evaluation produces a return code. Code 0
//! (OK) travels as the `Ok` arm of [`Status`]; everything else is a
//! [`Flow`] in the error arm, so `?` unwinds the evaluator stack to the
//! nearest handler: `while` absorbs Break/Continue, a procedure call
//! absorbs Return, and `catch` absorbs anything.

use thiserror::Error;

/// Non-OK outcome of evaluating a script or invoking a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Flow {
    /// Evaluation failed; the interpreter result holds the message.
    #[error("error")]
    Error,
    /// `return` unwound to the enclosing procedure call.
    #[error("return")]
    Return,
    /// `break` unwound to the enclosing loop.
    #[error("break")]
    Break,
    /// `continue` unwound to the enclosing loop.
    #[error("continue")]
    Continue,
    /// A user-defined code from `return -code`.
    #[error("code {0}")]
    Custom(i64),
}

/// Result of a command or evaluation. `Ok(())` is code 0.
pub type Status = Result<(), Flow>;

impl Flow {
    /// The numeric encoding seen by `catch` and the host.
    pub fn code(self) -> i64 {
        match self {
            Flow::Error => -1,
            Flow::Return => 1,
            Flow::Break => 2,
            Flow::Continue => 3,
            Flow::Custom(n) => n,
        }
    }

    /// Decode a numeric code. Codes without a dedicated variant come
    /// back as `Custom`, which propagates unchanged through the
    /// evaluator.
    pub fn from_code(code: i64) -> Status {
        match code {
            0 => Ok(()),
            -1 => Err(Flow::Error),
            1 => Err(Flow::Return),
            2 => Err(Flow::Break),
            3 => Err(Flow::Continue),
            n => Err(Flow::Custom(n)),
        }
    }
}

/// Numeric code for a status, as stored by `catch` and surfaced to
/// embedding hosts.
pub fn status_code(r: &Status) -> i64 {
    match r {
        Ok(()) => 0,
        Err(f) => f.code(),
    }
}
