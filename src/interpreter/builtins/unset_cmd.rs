//! unset - remove a variable from the current frame

use crate::interpreter::errors::Status;
use crate::interpreter::interp::Interp;

pub fn handle_unset(i: &mut Interp, argv: &[String], _tag: i64) -> Status {
    if argv.len() != 2 {
        return Err(i.arity_error(2, argv));
    }
    i.unset_var(&argv[1])
}
