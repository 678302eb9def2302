//! The interpreter core
//!
//! Ties the tokenizer, variable environment and command table
//! together. The evaluator drives the scanner, performs substitution,
//! assembles argument vectors and dispatches commands; non-OK codes
//! unwind to the nearest handler. Recursive reentry on the same
//! interpreter from within a command is the normal way scripts call
//! scripts.

use crate::interpreter::alloc::{Allocator, SystemAllocator};
use crate::interpreter::builtins;
use crate::interpreter::commands::{Callable, CommandTable};
use crate::interpreter::errors::{Flow, Status};
use crate::interpreter::escape::unescape;
use crate::interpreter::numbers::parse_int;
use crate::interpreter::result::ResultSlot;
use crate::interpreter::variables::CallFrame;
use crate::parser::{Parser, TokenType};

/// Configurable bounds, published through `info limits`.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Maximum procedure nesting depth.
    pub max_recursion: usize,
    /// Maximum number of arguments a single command may receive.
    pub max_args: usize,
    /// Bucket count for the command table.
    pub buckets: usize,
    /// Optional ceiling on any single interpreter-owned string.
    pub max_string: Option<usize>,
}

impl Default for Limits {
    fn default() -> Self {
        Limits { max_recursion: 128, max_args: 128, buckets: 512, max_string: None }
    }
}

/// Options for constructing an interpreter.
#[derive(Default)]
pub struct InterpOptions {
    /// Allocation accounting; defaults to the system allocator.
    pub allocator: Option<Box<dyn Allocator>>,
    /// Bounds; defaults to [`Limits::default`].
    pub limits: Option<Limits>,
}

/// An interpreter instance. Owns its call frames, command table and
/// result; holds no process-wide state.
pub struct Interp {
    pub(crate) frames: Vec<CallFrame>,
    pub(crate) current: usize,
    pub(crate) commands: CommandTable,
    pub(crate) result: ResultSlot,
    pub(crate) allocator: Box<dyn Allocator>,
    pub(crate) depth: usize,
    pub(crate) line: i32,
    pub(crate) limits: Limits,
}

impl Default for Interp {
    fn default() -> Self {
        Interp::new(InterpOptions::default())
    }
}

impl Interp {
    /// Construct an interpreter with the core command set registered
    /// and the `version` variable set.
    pub fn new(options: InterpOptions) -> Self {
        let limits = options.limits.unwrap_or_default();
        let mut interp = Interp {
            frames: vec![CallFrame::default()],
            current: 0,
            commands: CommandTable::new(limits.buckets),
            result: ResultSlot::Empty,
            allocator: options.allocator.unwrap_or_else(|| Box::new(SystemAllocator)),
            depth: 0,
            line: 0,
            limits,
        };
        builtins::register_core(&mut interp);
        interp
    }

    /// Evaluate a script from the host, resetting line tracking.
    pub fn eval(&mut self, script: &str) -> Status {
        self.line = 1;
        self.eval_inner(script)
    }

    /// Current line number, for error reporting and `info line`.
    pub fn line(&self) -> i32 {
        self.line
    }

    /// Current procedure nesting depth.
    pub fn level(&self) -> usize {
        self.depth
    }

    /// The configured limits.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Evaluate a script fragment in the current scope. Used by every
    /// command that takes a script-valued argument.
    pub(crate) fn eval_inner(&mut self, script: &str) -> Status {
        self.clear_result();
        let mut parser = Parser::with_lines(script, self.line);
        let mut argv: Vec<String> = Vec::new();
        let r = self.eval_tokens(&mut parser, &mut argv);
        self.release_args(&mut argv);
        r
    }

    /// Evaluate a script with the active frame temporarily repointed.
    /// The original frame is restored on every exit path.
    pub(crate) fn eval_at(&mut self, frame: usize, script: &str) -> Status {
        let saved = self.current;
        self.current = frame;
        let r = self.eval_inner(script);
        self.current = saved;
        r
    }

    fn eval_tokens(&mut self, parser: &mut Parser, argv: &mut Vec<String>) -> Status {
        let mut prev = TokenType::Eol;
        loop {
            let tok = match parser.token() {
                Ok(t) => t,
                Err(_) => return Err(self.error("parser error")),
            };
            self.line = parser.line;
            match tok.ty {
                TokenType::Eof => break,
                TokenType::Sep => {
                    prev = TokenType::Sep;
                    continue;
                }
                TokenType::Eol => {
                    prev = TokenType::Eol;
                    if !argv.is_empty() {
                        let callable = match self.commands.get(&argv[0]) {
                            Some(c) => c.callable.clone(),
                            None => {
                                let msg = format!("No such command '{}'", argv[0]);
                                return Err(self.error(msg));
                            }
                        };
                        self.invoke(&callable, argv)?;
                        // Script-valued arguments (if/while/eval
                        // bodies) count their newlines on the shared
                        // counter; keep the outer scan monotone.
                        parser.line = parser.line.max(self.line);
                    }
                    self.release_args(argv);
                    continue;
                }
                _ => {}
            }

            let text = parser.text(&tok);
            let word = if tok.ty == TokenType::Var {
                let val = match self.var(text) {
                    Some(v) => v.to_string(),
                    None => {
                        let msg = format!("No such variable '{}'", text);
                        return Err(self.error(msg));
                    }
                };
                self.charge(val.len())?;
                val
            } else if tok.ty == TokenType::Cmd {
                self.eval_inner(text)?;
                // The bracket interior counts its own newlines; fold
                // that progress back into the outer scan, which
                // skipped them.
                parser.line = parser.line.max(self.line);
                let val = self.result().to_string();
                self.charge(val.len())?;
                val
            } else if tok.ty == TokenType::Esc {
                match unescape(text) {
                    Ok(s) => {
                        self.charge(s.len())?;
                        s
                    }
                    Err(_) => {
                        let msg = format!("Invalid escape sequence '{}'", text);
                        return Err(self.error(msg));
                    }
                }
            } else {
                // Brace-quoted text is copied verbatim.
                self.charge(text.len())?;
                text.to_string()
            };

            if prev == TokenType::Sep || prev == TokenType::Eol {
                if argv.len() >= self.limits.max_args {
                    self.release(word.len());
                    let msg = format!("Argument count exceeded : {}", argv.len());
                    return Err(self.error(msg));
                }
                argv.push(word);
            } else if let Some(last) = argv.last_mut() {
                // Interpolation: the word concatenates onto the last
                // argument. A denied grow keeps the old argument and
                // leaves cleanup to the caller.
                let old = last.len();
                if !self.allocator.reallocate(old, old + word.len()) {
                    self.release(word.len());
                    self.oom_result();
                    return Err(Flow::Error);
                }
                last.push_str(&word);
                self.release(word.len());
            } else {
                argv.push(word);
            }
            prev = tok.ty;
        }
        Ok(())
    }

    pub(crate) fn invoke(&mut self, callable: &Callable, argv: &[String]) -> Status {
        match callable {
            Callable::Builtin { func, tag } => func(self, argv, *tag),
            Callable::Proc { params, body } => {
                builtins::proc_cmd::call_proc(self, argv, params, body)
            }
            Callable::Host(f) => f(self, argv),
        }
    }

    fn release_args(&mut self, argv: &mut Vec<String>) {
        for s in argv.drain(..) {
            self.release(s.len());
        }
    }

    /// Account for `bytes` of interpreter-owned data. A denied charge
    /// installs the out-of-memory result.
    pub(crate) fn charge(&mut self, bytes: usize) -> Status {
        let over = self.limits.max_string.map_or(false, |m| bytes > m);
        if over || !self.allocator.allocate(bytes) {
            self.oom_result();
            return Err(Flow::Error);
        }
        Ok(())
    }

    pub(crate) fn release(&mut self, bytes: usize) {
        if bytes > 0 {
            self.allocator.free(bytes);
        }
    }

    /// Parse a decimal integer under the strict conversion rules,
    /// reporting failure in the result.
    pub fn number(&mut self, s: &str) -> Result<i64, Flow> {
        self.number_base(s, 10)
    }

    pub(crate) fn number_base(&mut self, s: &str, base: u32) -> Result<i64, Flow> {
        match parse_int(s, base) {
            Ok(v) => Ok(v),
            Err(()) => Err(self.error(format!("NaN: \"{}\"", s))),
        }
    }

    /// Join arguments with `join`, charging the output to the
    /// allocator. The caller owns (and must release) the result.
    pub(crate) fn concatenate(&mut self, join: &str, args: &[String]) -> Result<String, Flow> {
        if args.len() > self.limits.max_args {
            return Err(self.error(format!("Argument count exceeded : {}", args.len())));
        }
        let total: usize = args.iter().map(String::len).sum::<usize>()
            + join.len() * args.len().saturating_sub(1);
        self.charge(total)?;
        Ok(args.join(join))
    }

    /// Resolve a level spec (`N` ancestors up, or `#N` absolute) to a
    /// frame index.
    pub(crate) fn resolve_level(&mut self, spec: &str) -> Result<usize, Flow> {
        let absolute = spec.starts_with('#');
        let n = self.number(if absolute { &spec[1..] } else { spec })?;
        let level = if absolute { self.depth as i64 - n } else { n };
        if level < 0 {
            return Err(self.error(format!("Invalid level passed to 'uplevel/upvar': {}", level)));
        }
        let mut frame = self.current;
        for _ in 0..level {
            match self.frames[frame].parent {
                Some(p) => frame = p,
                None => break,
            }
        }
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::alloc::BoundedAllocator;
    use crate::interpreter::errors::status_code;

    fn eval_ok(script: &str) -> String {
        let mut i = Interp::default();
        i.eval(script).unwrap();
        i.result().to_string()
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval_ok("+  2 2"), "4");
        assert_eq!(eval_ok("* -2 9"), "-18");
    }

    #[test]
    fn test_variable_substitution() {
        assert_eq!(eval_ok("set a 3; set b 4; + $a $b"), "7");
    }

    #[test]
    fn test_command_substitution() {
        assert_eq!(eval_ok("set a [+ 1 2]"), "3");
        assert_eq!(eval_ok("+ [+ 1 2] [+ 3 4]"), "10");
    }

    #[test]
    fn test_interpolation_concatenates() {
        assert_eq!(eval_ok("set a 3; set b A$a"), "A3");
        assert_eq!(eval_ok("set a 3; set b $a$a"), "33");
        assert_eq!(eval_ok("set a [+ 1 1][+ 2 2]"), "24");
    }

    #[test]
    fn test_quoting() {
        assert_eq!(eval_ok("set a \"x y\""), "x y");
        assert_eq!(eval_ok("set a {$x [y]}"), "$x [y]");
        assert_eq!(eval_ok("set x 5; set a \"v=$x\""), "v=5");
    }

    #[test]
    fn test_escapes_in_words() {
        assert_eq!(eval_ok("set a x\\ty"), "x\ty");
        let mut i = Interp::default();
        let r = i.eval("set a \\q");
        assert_eq!(r, Err(Flow::Error));
        assert!(i.result().contains("Invalid escape sequence"));
    }

    #[test]
    fn test_proc_definition_and_call() {
        assert_eq!(eval_ok("proc sq {x} { * $x $x }; sq 5"), "25");
    }

    #[test]
    fn test_while_loop() {
        assert_eq!(eval_ok("set i 0; while {< $i 3} { set i [+ $i 1] }; set i"), "3");
    }

    #[test]
    fn test_while_break_and_continue() {
        assert_eq!(
            eval_ok("set i 0; while {1} { set i [+ $i 1]; if {== $i 4} { break } }; set i"),
            "4"
        );
        assert_eq!(
            eval_ok(
                "set i 0; set n 0; while {< $i 5} { set i [+ $i 1]; \
                 if {== $i 3} { continue }; set n [+ $n $i] }; set n"
            ),
            "12"
        );
    }

    #[test]
    fn test_top_level_return_surfaces_unchanged() {
        let mut i = Interp::default();
        let r = i.eval("if {== 1 1} { return yes } { return no }");
        assert_eq!(r, Err(Flow::Return));
        assert_eq!(i.result(), "yes");
    }

    #[test]
    fn test_return_with_code() {
        let mut i = Interp::default();
        assert_eq!(i.eval("return fail -1"), Err(Flow::Error));
        assert_eq!(i.result(), "fail");

        let mut i = Interp::default();
        assert_eq!(i.eval("return x 77"), Err(Flow::Custom(77)));
        assert_eq!(i.result(), "x");
    }

    #[test]
    fn test_catch_stores_code() {
        assert_eq!(eval_ok("catch { / 1 0 } err; set err"), "-1");
        assert_eq!(eval_ok("catch { + 1 1 } err; set err"), "0");
        assert_eq!(eval_ok("catch { return x 5 } c; set c"), "5");
    }

    #[test]
    fn test_upvar_through_formal() {
        assert_eq!(eval_ok("proc p {a} { upvar 1 a b; set b 9 }; set x 0; p x; set x"), "9");
        assert_eq!(eval_ok("proc p {v} { upvar 1 $v loc; set loc 42 }; set q 0; p q; set q"), "42");
    }

    #[test]
    fn test_uplevel_runs_in_ancestor_scope() {
        assert_eq!(eval_ok("proc p {} { uplevel 1 {set g 7} }; p; set g"), "7");
    }

    #[test]
    fn test_line_tracking() {
        let mut i = Interp::default();
        i.eval("\n\n* 4 4\nset a 3\n").unwrap();
        assert_eq!(i.line(), 4);
    }

    #[test]
    fn test_line_tracking_through_bracket_substitution() {
        // Newlines inside a bracket substitution are counted by the
        // recursive evaluation; the outer scan must not roll the
        // counter back afterwards.
        let mut i = Interp::default();
        i.eval("set a [+ 1 \n 2]; set l [info line]; set l").unwrap();
        assert_eq!(i.result(), "2");

        let mut i = Interp::default();
        i.eval("set a [+ 1 \n 2]\nset b 2\n").unwrap();
        assert_eq!(i.line(), 4);
    }

    #[test]
    fn test_join_and_concat() {
        assert_eq!(eval_ok("join {a b c} ,"), "a,b,c");
        assert_eq!(eval_ok("concat a b c"), "a b c");
        assert_eq!(eval_ok("join [concat a b c] \" \""), "a b c");
    }

    #[test]
    fn test_unknown_command() {
        let mut i = Interp::default();
        assert_eq!(i.eval("nonsense 1 2"), Err(Flow::Error));
        assert!(i.result().contains("No such command"));
    }

    #[test]
    fn test_unknown_variable() {
        let mut i = Interp::default();
        assert_eq!(i.eval("+ $missing 1"), Err(Flow::Error));
        assert!(i.result().contains("No such variable"));
    }

    #[test]
    fn test_comments() {
        assert_eq!(eval_ok("# leading comment\n+ 1 2"), "3");
    }

    #[test]
    fn test_frame_balance_on_success_and_error() {
        let mut i = Interp::default();
        i.eval("proc ok {x} { + $x 1 }; ok 1").unwrap();
        assert_eq!(i.frames.len(), 1);
        assert_eq!(i.level(), 0);

        assert!(i.eval("ok 1 2 3").is_err()); // arity failure
        assert_eq!(i.frames.len(), 1);
        assert_eq!(i.level(), 0);

        assert!(i.eval("proc bad {} { / 1 0 }; bad").is_err());
        assert_eq!(i.frames.len(), 1);
        assert_eq!(i.level(), 0);
    }

    #[test]
    fn test_recursion_limit() {
        let mut i = Interp::default();
        assert_eq!(i.eval("proc r {} { r }; r"), Err(Flow::Error));
        assert!(i.result().contains("Recursion limit"), "got: {}", i.result());
        assert_eq!(i.level(), 0);
    }

    #[test]
    fn test_allocation_failure_is_not_fatal() {
        let mut i = Interp::new(InterpOptions {
            allocator: Some(Box::new(BoundedAllocator::new(64))),
            ..Default::default()
        });
        let r = i.eval("set a 0123456789012345678901234567890123456789012345678901234567890123456789");
        assert_eq!(r, Err(Flow::Error));
        assert_eq!(i.result(), "Out Of Memory");
        // The interpreter stays usable after an allocation failure.
        i.eval("+ 1 1").unwrap();
        assert_eq!(i.result(), "2");
    }

    #[test]
    fn test_host_command_with_captured_data() {
        let mut i = Interp::default();
        let greeting = "hello".to_string();
        i.register_command("greet", move |i, argv| {
            if argv.len() != 2 {
                return Err(i.arity_error(2, argv));
            }
            let msg = format!("{} {}", greeting, argv[1]);
            i.set_result(&msg)
        })
        .unwrap();
        i.eval("greet world").unwrap();
        assert_eq!(i.result(), "hello world");
    }

    #[test]
    fn test_version_variable_is_set() {
        let mut i = Interp::default();
        i.eval("set version").unwrap();
        assert_eq!(i.result(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_status_codes_surface_to_host() {
        let mut i = Interp::default();
        assert_eq!(status_code(&i.eval("+ 1 1")), 0);
        assert_eq!(status_code(&i.eval("break")), 2);
        assert_eq!(status_code(&i.eval("continue")), 3);
        assert_eq!(status_code(&i.eval("/ 1 0")), -1);
    }

    #[test]
    fn test_eval_command() {
        assert_eq!(eval_ok("eval set a 5; set a"), "5");
        assert_eq!(eval_ok("eval {+ 2 3}"), "5");
    }

    #[test]
    fn test_rename_in_script() {
        assert_eq!(eval_ok("proc a {} { return 1 }; rename a b; b"), "1");
    }

    #[test]
    fn test_empty_script_gives_empty_result() {
        assert_eq!(eval_ok(""), "");
        assert_eq!(eval_ok("   \n  "), "");
    }
}
