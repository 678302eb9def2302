//! proc - user-defined procedures
//!
//! `proc name args body` registers a command whose private data is the
//! formal-argument list and the body. Calling it pushes a fresh frame,
//! binds the formals, evaluates the body, and pops the frame on every
//! exit path. RETURN is converted to OK at the call boundary.

use crate::interpreter::commands::Callable;
use crate::interpreter::errors::{Flow, Status};
use crate::interpreter::interp::Interp;

pub fn handle_proc(i: &mut Interp, argv: &[String], _tag: i64) -> Status {
    if argv.len() != 4 {
        return Err(i.arity_error(4, argv));
    }
    i.register_dynamic(
        &argv[1],
        Callable::Proc { params: argv[2].clone(), body: argv[3].clone() },
    )
}

/// Invoke a user-defined procedure.
pub fn call_proc(i: &mut Interp, argv: &[String], params: &str, body: &str) -> Status {
    if i.depth >= i.limits.max_recursion {
        let msg = format!("Recursion limit exceeded ({})", i.limits.max_recursion);
        return Err(i.error(msg));
    }
    i.push_frame();
    let mut arity = 0;
    for formal in params.split(' ').filter(|s| !s.is_empty()) {
        arity += 1;
        if arity > argv.len() - 1 {
            return Err(arity_fail(i, argv));
        }
        if let Err(e) = i.set_var(formal, &argv[arity]) {
            i.pop_frame();
            return Err(e);
        }
    }
    if arity != argv.len() - 1 {
        return Err(arity_fail(i, argv));
    }
    let r = match i.eval_inner(body) {
        Err(Flow::Return) => Ok(()),
        other => other,
    };
    i.pop_frame();
    r
}

fn arity_fail(i: &mut Interp, argv: &[String]) -> Flow {
    let msg = format!("Proc '{}' called with wrong arg num", argv[0]);
    let e = i.error(msg);
    i.pop_frame();
    e
}
