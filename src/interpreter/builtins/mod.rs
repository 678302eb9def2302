//! Built-in commands
//!
//! One file per command (or small family of commands), registered into
//! the command table at interpreter construction.

pub mod catch_cmd;
pub mod concat_cmd;
pub mod eval_cmd;
pub mod if_cmd;
pub mod info_cmd;
pub mod list_cmd;
#[cfg(feature = "maths")]
pub mod math_cmd;
pub mod proc_cmd;
pub mod rename_cmd;
pub mod retcodes_cmd;
pub mod return_cmd;
pub mod set_cmd;
#[cfg(feature = "string")]
pub mod string_cmd;
pub mod unset_cmd;
pub mod uplevel_cmd;
pub mod upvar_cmd;
pub mod while_cmd;

use crate::interpreter::errors::Flow;
use crate::interpreter::interp::Interp;

/// Register the core command set and the `version` variable.
pub fn register_core(i: &mut Interp) {
    i.register_builtin("break", retcodes_cmd::handle_retcode, Flow::Break.code());
    i.register_builtin("catch", catch_cmd::handle_catch, 0);
    i.register_builtin("concat", concat_cmd::handle_concat, 0);
    i.register_builtin("continue", retcodes_cmd::handle_retcode, Flow::Continue.code());
    i.register_builtin("eval", eval_cmd::handle_eval, 0);
    i.register_builtin("if", if_cmd::handle_if, 0);
    i.register_builtin("info", info_cmd::handle_info, 0);
    i.register_builtin("join", concat_cmd::handle_join, 0);
    i.register_builtin("join-args", concat_cmd::handle_join_args, 0);
    i.register_builtin("proc", proc_cmd::handle_proc, 0);
    i.register_builtin("return", return_cmd::handle_return, 0);
    i.register_builtin("set", set_cmd::handle_set, 0);
    i.register_builtin("unset", unset_cmd::handle_unset, 0);
    i.register_builtin("uplevel", uplevel_cmd::handle_uplevel, 0);
    i.register_builtin("upvar", upvar_cmd::handle_upvar, 0);
    i.register_builtin("while", while_cmd::handle_while, 0);
    i.register_builtin("rename", rename_cmd::handle_rename, 0);
    i.register_builtin("lindex", list_cmd::handle_lindex, 0);
    i.register_builtin("llength", list_cmd::handle_llength, 0);
    #[cfg(feature = "string")]
    i.register_builtin("string", string_cmd::handle_string, 0);
    #[cfg(feature = "maths")]
    math_cmd::register(i);
    let _ = i.set_var("version", env!("CARGO_PKG_VERSION"));
}
