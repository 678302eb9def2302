//! rename - rename or delete a command

use crate::interpreter::errors::Status;
use crate::interpreter::interp::Interp;

/// `rename old new`; an empty new name deletes the command.
pub fn handle_rename(i: &mut Interp, argv: &[String], _tag: i64) -> Status {
    if argv.len() != 3 {
        return Err(i.arity_error(3, argv));
    }
    i.rename_command(&argv[1], &argv[2])
}
