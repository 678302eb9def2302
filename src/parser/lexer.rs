//! Tokenizer for tickle scripts
//!
//! A single-pass scanner that classifies spans of the input:
//! - runs of blanks collapse to a single separator
//! - newlines and `;` collapse to a single end-of-line
//! - `$name` is a variable reference, `[...]` a command substitution
//! - `{...}` is literal text, `"..."` escapable text
//! - `#` at the start of a logical line opens a comment
//!
//! Tokens are spans over the input and own no memory; the evaluator
//! copies the spans it keeps.

use thiserror::Error;

/// Token types produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Run of blanks between words.
    Sep,
    /// End of a command (newline or `;`).
    Eol,
    /// End of input.
    Eof,
    /// Literal text not subject to substitution (brace-quoted).
    Str,
    /// Text that may contain backslash escapes.
    Esc,
    /// `$name` variable reference.
    Var,
    /// `[...]` command substitution.
    Cmd,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sep => "SEP",
            Self::Eol => "EOL",
            Self::Eof => "EOF",
            Self::Str => "STR",
            Self::Esc => "ESC",
            Self::Var => "VAR",
            Self::Cmd => "CMD",
        }
    }
}

/// A typed span over the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub ty: TokenType,
    /// Byte offset of the first character of the span.
    pub start: usize,
    /// Byte offset one past the last character of the span.
    pub end: usize,
}

/// Returned when the scanner would walk past the end of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("parse error")]
pub struct ParseError;

/// The scanner state. Holds a borrow of the script; the parser cannot
/// outlive the text it scans.
pub struct Parser<'a> {
    text: &'a str,
    pos: usize,
    start: usize,
    end: usize,
    ty: TokenType,
    inside_quote: bool,
    /// Current line number. Meaningful only with line tracking on.
    pub line: i32,
    track_lines: bool,
    // Furthest byte position already inspected for a newline. Byte zero
    // is never counted, which keeps repeated scans from double counting.
    counted: usize,
    // Nonzero while scanning a bracketed command span; the recursive
    // evaluation of that span counts its newlines instead.
    suppress: u32,
}

fn is_blank(ch: u8) -> bool {
    ch == b' ' || ch == b'\t' || ch == b'\n' || ch == b'\r'
}

fn is_var_char(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}

impl<'a> Parser<'a> {
    /// A parser with line tracking disabled, for tokenising lists.
    pub fn new(text: &'a str) -> Self {
        Self::build(text, 0, false)
    }

    /// A parser that counts newlines, starting from `line`.
    pub fn with_lines(text: &'a str, line: i32) -> Self {
        Self::build(text, line, true)
    }

    fn build(text: &'a str, line: i32, track_lines: bool) -> Self {
        Parser {
            text,
            pos: 0,
            start: 0,
            end: 0,
            ty: TokenType::Eol,
            inside_quote: false,
            line,
            track_lines,
            counted: 0,
            suppress: 0,
        }
    }

    /// The text a token spans.
    pub fn text(&self, tok: &Token) -> &'a str {
        self.text.get(tok.start..tok.end).unwrap_or("")
    }

    fn remaining(&self) -> usize {
        self.text.len() - self.pos
    }

    // Reads like a NUL-terminated buffer: past the end it yields 0.
    fn peek(&self) -> u8 {
        *self.text.as_bytes().get(self.pos).unwrap_or(&0)
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        if self.pos >= self.text.len() {
            return Err(ParseError);
        }
        if self.track_lines && self.suppress == 0 && self.pos > self.counted {
            self.counted = self.pos;
            if self.text.as_bytes()[self.pos] == b'\n' {
                self.line += 1;
            }
        }
        self.pos += 1;
        Ok(())
    }

    /// Produce the next token. After the end of input this keeps
    /// returning `Eof`.
    pub fn token(&mut self) -> Result<Token, ParseError> {
        while self.remaining() > 0 {
            match self.peek() {
                b' ' | b'\t' => {
                    if self.inside_quote {
                        self.parse_string()?;
                    } else {
                        self.parse_sep()?;
                    }
                }
                b'\r' | b'\n' | b';' => {
                    if self.inside_quote {
                        self.parse_string()?;
                    } else {
                        self.parse_eol()?;
                    }
                }
                b'[' => self.parse_command()?,
                b'$' => self.parse_var()?,
                b'#' => {
                    if self.ty == TokenType::Eol {
                        self.parse_comment()?;
                        continue;
                    }
                    self.parse_string()?;
                }
                _ => self.parse_string()?,
            }
            return Ok(Token { ty: self.ty, start: self.start, end: self.end });
        }
        // A synthetic EOL is emitted once so the evaluator flushes the
        // final command, then the scanner settles on EOF.
        if self.ty != TokenType::Eol && self.ty != TokenType::Eof {
            self.ty = TokenType::Eol;
        } else {
            self.ty = TokenType::Eof;
        }
        self.start = self.pos;
        self.end = self.pos;
        Ok(Token { ty: self.ty, start: self.start, end: self.end })
    }

    fn parse_sep(&mut self) -> Result<(), ParseError> {
        self.start = self.pos;
        while is_blank(self.peek()) {
            self.advance()?;
        }
        self.end = self.pos;
        self.ty = TokenType::Sep;
        Ok(())
    }

    fn parse_eol(&mut self) -> Result<(), ParseError> {
        self.start = self.pos;
        while is_blank(self.peek()) || self.peek() == b';' {
            self.advance()?;
        }
        self.end = self.pos;
        self.ty = TokenType::Eol;
        Ok(())
    }

    fn parse_command(&mut self) -> Result<(), ParseError> {
        self.advance()?; // opening bracket
        self.suppress += 1;
        let r = self.parse_command_body();
        self.suppress -= 1;
        r
    }

    // Scans the interior of `[...]`, honouring nested brackets, brace
    // blocks and backslash escapes.
    fn parse_command_body(&mut self) -> Result<(), ParseError> {
        self.start = self.pos;
        let mut level = 1;
        let mut blevel = 0;
        while self.remaining() > 0 {
            let ch = self.peek();
            if ch == b'[' && blevel == 0 {
                level += 1;
            } else if ch == b']' && blevel == 0 {
                level -= 1;
                if level == 0 {
                    break;
                }
            } else if ch == b'\\' {
                self.advance()?;
            } else if ch == b'{' {
                blevel += 1;
            } else if ch == b'}' && blevel != 0 {
                blevel -= 1;
            }
            self.advance()?;
        }
        self.end = self.pos;
        self.ty = TokenType::Cmd;
        if self.peek() == b']' {
            self.advance()?;
        }
        Ok(())
    }

    fn parse_var(&mut self) -> Result<(), ParseError> {
        self.advance()?; // skip the dollar sign
        self.start = self.pos;
        while is_var_char(self.peek()) {
            self.advance()?;
        }
        if self.start == self.pos {
            // A lone `$` is a single-character string.
            self.start = self.pos - 1;
            self.end = self.pos;
            self.ty = TokenType::Str;
        } else {
            self.end = self.pos;
            self.ty = TokenType::Var;
        }
        Ok(())
    }

    fn parse_brace(&mut self) -> Result<(), ParseError> {
        self.advance()?; // opening brace
        self.start = self.pos;
        let mut level = 1;
        loop {
            if self.remaining() >= 2 && self.peek() == b'\\' {
                self.advance()?;
            } else if self.remaining() == 0 || self.peek() == b'}' {
                level -= 1;
                if level == 0 || self.remaining() == 0 {
                    self.end = self.pos;
                    self.ty = TokenType::Str;
                    if self.remaining() > 0 {
                        return self.advance(); // closing brace
                    }
                    return Ok(());
                }
            } else if self.peek() == b'{' {
                level += 1;
            }
            self.advance()?;
        }
    }

    fn parse_string(&mut self) -> Result<(), ParseError> {
        let newword = matches!(self.ty, TokenType::Sep | TokenType::Eol | TokenType::Str);
        if newword && self.peek() == b'{' {
            return self.parse_brace();
        }
        if newword && self.peek() == b'"' {
            self.inside_quote = true;
            self.advance()?;
        }
        self.start = self.pos;
        while self.remaining() > 0 {
            match self.peek() {
                b'\\' => {
                    if self.remaining() >= 2 {
                        self.advance()?;
                    }
                }
                b'$' | b'[' => {
                    self.end = self.pos;
                    self.ty = TokenType::Esc;
                    return Ok(());
                }
                b'\n' | b' ' | b'\t' | b'\r' | b';' => {
                    if !self.inside_quote {
                        self.end = self.pos;
                        self.ty = TokenType::Esc;
                        return Ok(());
                    }
                }
                b'"' => {
                    if self.inside_quote {
                        self.end = self.pos;
                        self.ty = TokenType::Esc;
                        self.inside_quote = false;
                        return self.advance(); // closing quote
                    }
                }
                _ => {}
            }
            self.advance()?;
        }
        self.end = self.pos;
        self.ty = TokenType::Esc;
        Ok(())
    }

    fn parse_comment(&mut self) -> Result<(), ParseError> {
        while self.remaining() > 0 && self.peek() != b'\n' {
            self.advance()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(text: &str) -> Vec<TokenType> {
        let mut p = Parser::new(text);
        let mut out = Vec::new();
        loop {
            let tok = p.token().unwrap();
            out.push(tok.ty);
            if tok.ty == TokenType::Eof {
                return out;
            }
        }
    }

    fn words(text: &str) -> Vec<String> {
        let mut p = Parser::new(text);
        let mut out = Vec::new();
        loop {
            let tok = p.token().unwrap();
            match tok.ty {
                TokenType::Eof => return out,
                TokenType::Sep | TokenType::Eol => {}
                _ => out.push(p.text(&tok).to_string()),
            }
        }
    }

    #[test]
    fn test_simple_command() {
        assert_eq!(words("set a 3"), vec!["set", "a", "3"]);
        assert_eq!(
            types("set a 3"),
            vec![
                TokenType::Esc,
                TokenType::Sep,
                TokenType::Esc,
                TokenType::Sep,
                TokenType::Esc,
                TokenType::Eol,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_variable_token() {
        let mut p = Parser::new("$abc");
        let tok = p.token().unwrap();
        assert_eq!(tok.ty, TokenType::Var);
        assert_eq!(p.text(&tok), "abc");
    }

    #[test]
    fn test_lone_dollar_is_string() {
        let mut p = Parser::new("$ ");
        let tok = p.token().unwrap();
        assert_eq!(tok.ty, TokenType::Str);
        assert_eq!(p.text(&tok), "$");
    }

    #[test]
    fn test_command_substitution_span() {
        let mut p = Parser::new("[+ 2 2]");
        let tok = p.token().unwrap();
        assert_eq!(tok.ty, TokenType::Cmd);
        assert_eq!(p.text(&tok), "+ 2 2");
    }

    #[test]
    fn test_nested_brackets() {
        let mut p = Parser::new("[a [b c] d]");
        let tok = p.token().unwrap();
        assert_eq!(tok.ty, TokenType::Cmd);
        assert_eq!(p.text(&tok), "a [b c] d");
    }

    #[test]
    fn test_brackets_ignored_inside_braces() {
        let mut p = Parser::new("[a {]} b]");
        let tok = p.token().unwrap();
        assert_eq!(tok.ty, TokenType::Cmd);
        assert_eq!(p.text(&tok), "a {]} b");
    }

    #[test]
    fn test_brace_quoting() {
        let mut p = Parser::new("{a b {c d} e}");
        let tok = p.token().unwrap();
        assert_eq!(tok.ty, TokenType::Str);
        assert_eq!(p.text(&tok), "a b {c d} e");
    }

    #[test]
    fn test_double_quotes_are_one_token() {
        let mut p = Parser::new("\"a b c\"");
        let tok = p.token().unwrap();
        assert_eq!(tok.ty, TokenType::Esc);
        assert_eq!(p.text(&tok), "a b c");
    }

    #[test]
    fn test_comment_is_skipped() {
        assert_eq!(words("# a comment\nset a 3"), vec!["set", "a", "3"]);
    }

    #[test]
    fn test_hash_inside_command_is_a_word() {
        assert_eq!(words("set a #"), vec!["set", "a", "#"]);
    }

    #[test]
    fn test_semicolon_separates_commands() {
        assert_eq!(
            types("a;b"),
            vec![
                TokenType::Esc,
                TokenType::Eol,
                TokenType::Esc,
                TokenType::Eol,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_eof_is_idempotent() {
        let mut p = Parser::new("a");
        loop {
            if p.token().unwrap().ty == TokenType::Eof {
                break;
            }
        }
        assert_eq!(p.token().unwrap().ty, TokenType::Eof);
        assert_eq!(p.token().unwrap().ty, TokenType::Eof);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(types(""), vec![TokenType::Eof]);
    }

    #[test]
    fn test_line_counting() {
        // The first byte of the input is never counted.
        for (text, expected) in [
            ("+  2 2", 1),
            ("+  2 2\n", 2),
            ("\n\n\n", 3),
            ("* 4 4\nset a 3\n\n", 4),
            ("* 4 4\r\nset a 3\r\n", 3),
        ] {
            let mut p = Parser::with_lines(text, 1);
            loop {
                if p.token().unwrap().ty == TokenType::Eof {
                    break;
                }
            }
            assert_eq!(p.line, expected, "line count for {:?}", text);
        }
    }

    #[test]
    fn test_var_and_interpolation_split() {
        // `x$y` splits into an ESC run and a VAR token.
        let mut p = Parser::new("x$y");
        let t1 = p.token().unwrap();
        assert_eq!((t1.ty, p.text(&t1)), (TokenType::Esc, "x"));
        let t2 = p.token().unwrap();
        assert_eq!((t2.ty, p.text(&t2)), (TokenType::Var, "y"));
    }
}
