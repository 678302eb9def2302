//! while - iteration
//!
//! Re-evaluates the condition before each pass. Break terminates the
//! loop with code OK, Continue resumes at the condition, anything else
//! propagates.

use crate::interpreter::errors::{Flow, Status};
use crate::interpreter::interp::Interp;

pub fn handle_while(i: &mut Interp, argv: &[String], _tag: i64) -> Status {
    if argv.len() != 3 {
        return Err(i.arity_error(3, argv));
    }
    loop {
        i.eval_inner(&argv[1])?;
        let cond = {
            let r = i.result().to_string();
            i.number(&r)?
        };
        if cond == 0 {
            return Ok(());
        }
        match i.eval_inner(&argv[2]) {
            Ok(()) | Err(Flow::Continue) => {}
            Err(Flow::Break) => return Ok(()),
            Err(other) => return Err(other),
        }
    }
}
