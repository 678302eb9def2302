//! break / continue - loop control codes
//!
//! Both commands share one handler; the registration tag carries the
//! code to produce. The enclosing `while` absorbs it.

use crate::interpreter::errors::{Flow, Status};
use crate::interpreter::interp::Interp;

pub fn handle_retcode(i: &mut Interp, argv: &[String], tag: i64) -> Status {
    if argv.len() != 1 {
        return Err(i.arity_error(1, argv));
    }
    Flow::from_code(tag)
}
