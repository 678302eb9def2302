//! concat / join-args / join - string joining
//!
//! `concat` joins its arguments with single spaces, `join-args` with a
//! given separator, and `join` tokenises a list and joins its items.

use crate::interpreter::builtins::list_cmd::list_items;
use crate::interpreter::errors::Status;
use crate::interpreter::interp::Interp;

pub fn handle_concat(i: &mut Interp, argv: &[String], _tag: i64) -> Status {
    let s = i.concatenate(" ", &argv[1..])?;
    i.set_result_owned(s)
}

pub fn handle_join_args(i: &mut Interp, argv: &[String], _tag: i64) -> Status {
    if argv.len() < 2 {
        return Err(i.arity_error(2, argv));
    }
    let sep = argv[1].clone();
    let s = i.concatenate(&sep, &argv[2..])?;
    i.set_result_owned(s)
}

pub fn handle_join(i: &mut Interp, argv: &[String], _tag: i64) -> Status {
    if argv.len() != 3 {
        return Err(i.arity_error(3, argv));
    }
    let items = match list_items(&argv[1]) {
        Ok(v) => v,
        Err(_) => return Err(i.error("parser error")),
    };
    let s = i.concatenate(&argv[2], &items)?;
    i.set_result_owned(s)
}
