//! info - interpreter introspection
//!
//! `info command` counts, indexes and describes registered commands;
//! `line`, `level` and `width` report evaluator state; `limits` and
//! `features` report the configured bounds and compiled-in groups.

use crate::interpreter::commands::Callable;
use crate::interpreter::errors::Status;
use crate::interpreter::interp::Interp;

pub fn handle_info(i: &mut Interp, argv: &[String], _tag: i64) -> Status {
    if argv.len() < 2 {
        return Err(i.arity_error(2, argv));
    }
    let rq = argv[1].as_str();
    match rq {
        "command" => return info_command(i, &argv[1..]),
        "line" => return i.set_result_integer(i.line as i64),
        "level" => return i.set_result_integer(i.depth as i64),
        "width" => return i.set_result_integer((std::mem::size_of::<usize>() * 8) as i64),
        _ => {}
    }
    if argv.len() < 3 {
        return Err(i.arity_error(3, argv));
    }
    let what = argv[2].as_str();
    match rq {
        "limits" => {
            let v = match what {
                "recursion" => i.limits.max_recursion as i64,
                "arguments" => i.limits.max_args as i64,
                "string" => i.limits.max_string.map(|m| m as i64).unwrap_or(-1),
                _ => return Err(i.error(format!("Unknown info request '{}'", what))),
            };
            i.set_result_integer(v)
        }
        "features" => {
            let v = match what {
                "allocator" => 1,
                "string" => cfg!(feature = "string") as i64,
                "maths" => cfg!(feature = "maths") as i64,
                "debugging" => cfg!(debug_assertions) as i64,
                "strict" => 1,
                "string-length" => i.limits.max_string.map(|m| m as i64).unwrap_or(-1),
                _ => return Err(i.error(format!("Unknown info request '{}'", what))),
            };
            i.set_result_integer(v)
        }
        _ => Err(i.error(format!("Unknown info request '{}'", rq))),
    }
}

// argv[0] here is "command".
fn info_command(i: &mut Interp, argv: &[String]) -> Status {
    match argv.len() {
        1 => i.set_result_integer(i.commands.len() as i64),
        2 => {
            // Ordinal index of a named command, -1 when absent.
            let idx = i
                .commands
                .iter()
                .position(|c| c.name == argv[1])
                .map(|v| v as i64)
                .unwrap_or(-1);
            i.set_result_integer(idx)
        }
        3 => {
            let idx = i.number(&argv[2])?;
            let described = if idx < 0 {
                None
            } else {
                i.commands.iter().nth(idx as usize).map(|c| {
                    let (args, body) = match &c.callable {
                        Callable::Proc { params, body } => (params.clone(), body.clone()),
                        _ => ("{built-in}".to_string(), "{built-in}".to_string()),
                    };
                    (c.name.to_string(), args, body)
                })
            };
            let (name, args, body) = match described {
                Some(d) => d,
                None => return Err(i.error(format!("Invalid command index '{}'", idx))),
            };
            match argv[1].as_str() {
                "args" => i.set_result(&args),
                "body" => i.set_result(&body),
                "name" => i.set_result(&name),
                other => Err(i.error(format!("Unknown command request '{}'", other))),
            }
        }
        _ => Err(i.arity_error(3, argv)),
    }
}
