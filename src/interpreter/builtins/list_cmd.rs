//! lindex / llength - list primitives
//!
//! Lists are ordinary strings; the tokenizer splits them into items.
//! Brace-quoted items keep their grouping.

use crate::interpreter::errors::Status;
use crate::interpreter::interp::Interp;
use crate::parser::{ParseError, Parser, TokenType};

/// Tokenise a list into its items, skipping separators.
pub(crate) fn list_items(list: &str) -> Result<Vec<String>, ParseError> {
    let mut p = Parser::new(list);
    let mut items = Vec::new();
    loop {
        let tok = p.token()?;
        match tok.ty {
            TokenType::Eof => return Ok(items),
            TokenType::Sep | TokenType::Eol => {}
            _ => items.push(p.text(&tok).to_string()),
        }
    }
}

/// `lindex list i`: the i-th item; negative or out-of-range indexes
/// give an empty result.
pub fn handle_lindex(i: &mut Interp, argv: &[String], _tag: i64) -> Status {
    if argv.len() != 3 {
        return Err(i.arity_error(3, argv));
    }
    let index = i.number(&argv[2])?;
    if index < 0 {
        i.clear_result();
        return Ok(());
    }
    let items = match list_items(&argv[1]) {
        Ok(v) => v,
        Err(_) => return Err(i.error("parser error")),
    };
    match items.get(index as usize) {
        Some(item) => {
            let item = item.clone();
            i.set_result(&item)
        }
        None => {
            i.clear_result();
            Ok(())
        }
    }
}

pub fn handle_llength(i: &mut Interp, argv: &[String], _tag: i64) -> Status {
    if argv.len() != 2 {
        return Err(i.arity_error(2, argv));
    }
    match list_items(&argv[1]) {
        Ok(items) => i.set_result_integer(items.len() as i64),
        Err(_) => Err(i.error("parser error")),
    }
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
    fn test_lindex_basics() {
        assert_eq!(eval_ok("lindex {a b c} 0"), "a");
        assert_eq!(eval_ok("lindex {a b c} 2"), "c");
        assert_eq!(eval_ok("lindex {a b c} 3"), "");
        assert_eq!(eval_ok("lindex {a b c} -1"), "");
    }

    #[test]
    fn test_lindex_grouped_item() {
        assert_eq!(eval_ok("lindex {a {b c} d} 1"), "b c");
    }

    #[test]
    fn test_llength() {
        assert_eq!(eval_ok("llength {a b c}"), "3");
        assert_eq!(eval_ok("llength {}"), "0");
        assert_eq!(eval_ok("llength {one}"), "1");
        assert_eq!(eval_ok("llength {a {b c} d}"), "3");
    }

    #[test]
    fn test_list_items_helper() {
        assert_eq!(list_items("a b c").unwrap(), vec!["a", "b", "c"]);
        assert_eq!(list_items("").unwrap(), Vec::<String>::new());
        assert_eq!(list_items("  a   b ").unwrap(), vec!["a", "b"]);
    }
}
