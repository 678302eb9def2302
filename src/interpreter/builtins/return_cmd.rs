//! return - unwind to the enclosing procedure call
//!
//! `return ?value? ?code?` sets the result and produces code RETURN,
//! or any numeric code the script asks for. User-defined codes
//! propagate unchanged through the evaluator.

use crate::interpreter::errors::{Flow, Status};
use crate::interpreter::interp::Interp;

pub fn handle_return(i: &mut Interp, argv: &[String], _tag: i64) -> Status {
    if argv.len() > 3 {
        return Err(i.arity_error(3, argv));
    }
    let mut code = Flow::Return.code();
    if argv.len() == 3 {
        code = i.number(&argv[2])?;
    }
    if argv.len() == 1 {
        i.clear_result();
        return Err(Flow::Return);
    }
    i.set_result(&argv[1])?;
    Flow::from_code(code)
}
