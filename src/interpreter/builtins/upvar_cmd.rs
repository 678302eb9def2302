//! upvar - link a local name to a variable in an ancestor frame
//!
//! `upvar level srcName dstName` creates `dstName` in the current
//! frame as a link to `srcName` in the selected ancestor. The target
//! is created empty when missing. Creating a link that would resolve
//! back to itself is refused.

use crate::interpreter::errors::Status;
use crate::interpreter::interp::Interp;
use crate::interpreter::variables::{Var, VarValue};

pub fn handle_upvar(i: &mut Interp, argv: &[String], _tag: i64) -> Status {
    if argv.len() != 4 {
        return Err(i.arity_error(4, argv));
    }
    let dst = &argv[3];
    // A local variable holding the caller's variable name is
    // dereferenced, so a procedure can take the name to alias as an
    // argument.
    let src = match i.find_var(i.current, &argv[2], true) {
        Some((f, idx)) => match &i.frames[f].vars[idx].value {
            VarValue::Str(s) => s.as_str().to_string(),
            VarValue::Link { .. } => argv[2].clone(),
        },
        None => argv[2].clone(),
    };
    if i.lookup(i.current, dst).is_some() {
        return Err(i.error(format!("Variable '{}' already exists", dst)));
    }
    let target = i.resolve_level(&argv[1])?;
    if i.find_var(target, &src, true).is_none() {
        i.set_var_in(target, &src, "")?;
    }
    let (tf, ti) = match i.find_var(target, &src, true) {
        Some(t) => t,
        None => return Err(i.error(format!("No such variable '{}'", src))),
    };
    // Link to the terminal variable, keeping chains short.
    let terminal = i.frames[tf].vars[ti].name.as_str().to_string();
    if tf == i.current && terminal == *dst {
        return Err(i.error(format!("Cannot create circular reference variable '{}'", dst)));
    }
    let cname = i.compact(dst)?;
    if let Err(e) = i.charge(terminal.len()) {
        i.release_compact(&cname);
        return Err(e);
    }
    i.frames[i.current].vars.push(Var {
        name: cname,
        value: VarValue::Link { frame: tf, name: terminal },
    });
    Ok(())
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
    fn test_write_through_link() {
        assert_eq!(eval_ok("proc p {v} { upvar 1 $v u; set u 5 }; set x 0; p x; set x"), "5");
    }

    #[test]
    fn test_read_through_link() {
        assert_eq!(eval_ok("proc p {v} { upvar 1 $v u; set u }; set x 31; p x"), "31");
    }

    #[test]
    fn test_missing_target_is_created() {
        assert_eq!(eval_ok("proc p {} { upvar 1 fresh u; set u ok }; p; set fresh"), "ok");
    }

    #[test]
    fn test_self_link_refused() {
        let mut i = Interp::default();
        assert!(i.eval("upvar 0 x x").is_err());
        assert!(i.result().contains("circular"));
    }

    #[test]
    fn test_duplicate_destination_refused() {
        let mut i = Interp::default();
        assert!(i.eval("proc p {v} { set u 1; upvar 1 $v u }; set x 0; p x").is_err());
        assert!(i.result().contains("already exists"));
    }

    #[test]
    fn test_nested_levels() {
        assert_eq!(
            eval_ok(
                "proc inner {} { upvar 2 x u; set u 8 }; \
                 proc outer {} { inner }; set x 0; outer; set x"
            ),
            "8"
        );
    }
}
