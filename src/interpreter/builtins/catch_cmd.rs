//! catch - trap any return code
//!
//! Evaluates a script, stores its numeric return code into a variable
//! and returns OK. The script's result (an error message, say) is left
//! in place for the caller to inspect.

use crate::interpreter::errors::{status_code, Status};
use crate::interpreter::interp::Interp;

pub fn handle_catch(i: &mut Interp, argv: &[String], _tag: i64) -> Status {
    if argv.len() != 3 {
        return Err(i.arity_error(3, argv));
    }
    let code = status_code(&i.eval_inner(&argv[1]));
    i.set_var_integer(&argv[2], code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_error() {
        let mut i = Interp::default();
        i.eval("catch { / 1 0 } err").unwrap();
        i.eval("set err").unwrap();
        assert_eq!(i.result(), "-1");
    }

    #[test]
    fn test_catch_ok() {
        let mut i = Interp::default();
        i.eval("catch { + 2 2 } err; set err").unwrap();
        assert_eq!(i.result(), "0");
    }

    #[test]
    fn test_catch_leaves_message_in_result() {
        // The trapped error message stays in the result until
        // something replaces it.
        let mut i = Interp::default();
        i.eval("catch { / 1 0 } err").unwrap();
        assert!(i.result().contains("Division by 0"));
    }

    #[test]
    fn test_catch_break() {
        let mut i = Interp::default();
        i.eval("catch { break } c; set c").unwrap();
        assert_eq!(i.result(), "2");
    }
}
