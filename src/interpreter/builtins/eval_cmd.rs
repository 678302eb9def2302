//! eval - evaluate concatenated arguments as a script

use crate::interpreter::errors::Status;
use crate::interpreter::interp::Interp;

pub fn handle_eval(i: &mut Interp, argv: &[String], _tag: i64) -> Status {
    let script = i.concatenate(" ", &argv[1..])?;
    let r = i.eval_inner(&script);
    i.release(script.len());
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_joins_arguments() {
        let mut i = Interp::default();
        i.eval("eval set a 5; set a").unwrap();
        assert_eq!(i.result(), "5");
    }

    #[test]
    fn test_eval_brace_script() {
        let mut i = Interp::default();
        i.eval("eval {+ 2 3}").unwrap();
        assert_eq!(i.result(), "5");
    }

    #[test]
    fn test_eval_propagates_errors() {
        let mut i = Interp::default();
        assert!(i.eval("eval {/ 1 0}").is_err());
        assert!(i.result().contains("Division by 0"));
    }

    #[test]
    fn test_eval_empty() {
        let mut i = Interp::default();
        i.eval("eval").unwrap();
        assert_eq!(i.result(), "");
    }
}
