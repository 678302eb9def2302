//! set - read or write a variable

use crate::interpreter::errors::Status;
use crate::interpreter::interp::Interp;

/// `set v` returns the value of `v`; `set v x` assigns and returns `x`.
pub fn handle_set(i: &mut Interp, argv: &[String], _tag: i64) -> Status {
    if argv.len() != 3 && argv.len() != 2 {
        return Err(i.arity_error(3, argv));
    }
    if argv.len() == 2 {
        let val = match i.var(&argv[1]) {
            Some(v) => v.to_string(),
            None => {
                let msg = format!("No such variable: {}", argv[1]);
                return Err(i.error(msg));
            }
        };
        return i.set_result(&val);
    }
    i.set_var(&argv[1], &argv[2])?;
    i.set_result(&argv[2])
}
