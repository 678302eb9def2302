//! uplevel - evaluate a script in an ancestor's scope
//!
//! The level is a relative ancestor count or `#N` for an absolute
//! depth. The active frame pointer is restored on return, including
//! the error path.

use crate::interpreter::errors::Status;
use crate::interpreter::interp::Interp;

pub fn handle_uplevel(i: &mut Interp, argv: &[String], _tag: i64) -> Status {
    if argv.len() < 2 {
        return Err(i.arity_error(2, argv));
    }
    let frame = i.resolve_level(&argv[1])?;
    let script = i.concatenate(" ", &argv[2..])?;
    let r = i.eval_at(frame, &script);
    i.release(script.len());
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_ok(script: &str) -> String {
        let mut i = Interp::default();
        i.eval(script).unwrap();
        i.result().to_string()
    }

    #[test]
    fn test_writes_in_caller_scope() {
        assert_eq!(eval_ok("proc p {} { uplevel 1 {set g 7} }; p; set g"), "7");
    }

    #[test]
    fn test_absolute_level() {
        // `#0` is the global frame regardless of nesting.
        assert_eq!(
            eval_ok("proc inner {} { uplevel #0 {set g 9} }; proc outer {} { inner }; outer; set g"),
            "9"
        );
    }

    #[test]
    fn test_frame_restored_on_error() {
        let mut i = Interp::default();
        assert!(i.eval("proc p {} { uplevel 1 {/ 1 0} }; p").is_err());
        // Back at global scope afterwards.
        i.eval("set a 1; set a").unwrap();
        assert_eq!(i.result(), "1");
        assert_eq!(i.level(), 0);
    }

    #[test]
    fn test_negative_level_rejected() {
        let mut i = Interp::default();
        assert!(i.eval("uplevel #5 {set a 1}").is_err());
        assert!(i.result().contains("Invalid level"));
    }
}
