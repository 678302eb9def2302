//! if - conditional evaluation
//!
//! `if cond then ?else? ?alt?` evaluates `cond`; a non-zero result
//! selects `then`, otherwise the final argument when one is given.
//! The `else` keyword is accepted but not required.

use crate::interpreter::errors::Status;
use crate::interpreter::interp::Interp;

pub fn handle_if(i: &mut Interp, argv: &[String], _tag: i64) -> Status {
    if !(3..=5).contains(&argv.len()) {
        return Err(i.arity_error(5, argv));
    }
    i.eval_inner(&argv[1])?;
    let cond = {
        let r = i.result().to_string();
        i.number(&r)?
    };
    if cond != 0 {
        i.eval_inner(&argv[2])
    } else if argv.len() > 3 {
        i.eval_inner(&argv[argv.len() - 1])
    } else {
        Ok(())
    }
}
