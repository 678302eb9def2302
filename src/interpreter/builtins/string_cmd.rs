//! string - string manipulation subcommands
//!
//! Trimming, case mapping, searching, the glob matcher, character
//! classes and base conversions. Indexes and lengths count characters,
//! not bytes.

use std::collections::HashMap;

use lazy_static::lazy_static;
use thiserror::Error;

use crate::interpreter::errors::Status;
use crate::interpreter::interp::Interp;
use crate::interpreter::numbers::{format_int, parse_int};

// Default trim class: blanks plus vertical tab.
const WHITE_SPACE: &str = " \t\n\r\u{b}";

lazy_static! {
    /// Character classes for `string is`.
    static ref CLASSES: HashMap<&'static str, fn(char) -> bool> = {
        let mut m: HashMap<&'static str, fn(char) -> bool> = HashMap::new();
        m.insert("alnum", |c| c.is_ascii_alphanumeric());
        m.insert("alpha", |c| c.is_ascii_alphabetic());
        m.insert("digit", |c| c.is_ascii_digit());
        m.insert("graph", |c| c.is_ascii_graphic());
        m.insert("lower", |c| c.is_ascii_lowercase());
        m.insert("print", |c| c.is_ascii_graphic() || c == ' ');
        m.insert("punct", |c| c.is_ascii_punctuation());
        m.insert("space", |c| c.is_ascii_whitespace() || c == '\u{b}');
        m.insert("upper", |c| c.is_ascii_uppercase());
        m.insert("xdigit", |c| c.is_ascii_hexdigit());
        m.insert("ascii", |c| c.is_ascii());
        m.insert("control", |c| c.is_ascii_control());
        m.insert("wordchar", |c| c.is_ascii_alphanumeric() || c == '_');
        m
    };
}

const TRUTHY: &[&str] = &["true", "on", "yes", "1"];
const FALSY: &[&str] = &["false", "off", "no", "0"];

/// Glob matching failed structurally rather than not matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("depth exceeded")]
    DepthExceeded,
    #[error("missing escaped character")]
    MissingEscape,
}

/// Glob match: `*` matches any run, `?` any single character, and `%`
/// escapes the character after it. Recursion is bounded by `depth`.
pub fn glob_match(pat: &[u8], s: &[u8], depth: usize) -> Result<bool, MatchError> {
    if depth == 0 {
        return Err(MatchError::DepthExceeded);
    }
    let mut p = 0;
    let mut t = 0;
    loop {
        match pat.get(p) {
            None => return Ok(t >= s.len()),
            Some(b'*') => {
                if glob_match(&pat[p + 1..], &s[t..], depth - 1)? {
                    return Ok(true);
                }
                if t >= s.len() {
                    return Ok(false);
                }
                t += 1;
            }
            Some(b'?') => {
                if t >= s.len() {
                    return Ok(false);
                }
                p += 1;
                t += 1;
            }
            Some(b'%') => {
                let escaped = match pat.get(p + 1) {
                    Some(&c) => c,
                    None => return Err(MatchError::MissingEscape),
                };
                if t >= s.len() || escaped != s[t] {
                    return Ok(false);
                }
                p += 2;
                t += 1;
            }
            Some(&c) => {
                if t >= s.len() || c != s[t] {
                    return Ok(false);
                }
                p += 1;
                t += 1;
            }
        }
    }
}

/// Case-insensitive ordering: shorter strings sort first, equal
/// lengths compare bytewise after lowercasing.
pub fn compare_no_case(a: &str, b: &str) -> i64 {
    if a.len() > b.len() {
        return 1;
    }
    if a.len() < b.len() {
        return -1;
    }
    for (ac, bc) in a.bytes().zip(b.bytes()) {
        let diff = ac.to_ascii_lowercase() as i64 - bc.to_ascii_lowercase() as i64;
        if diff != 0 {
            return diff;
        }
    }
    0
}

fn is_truthy(s: &str) -> bool {
    TRUTHY.iter().any(|t| compare_no_case(t, s) == 0)
}

fn is_falsy(s: &str) -> bool {
    FALSY.iter().any(|t| compare_no_case(t, s) == 0)
}

fn trim_left<'a>(class: &str, s: &'a str) -> &'a str {
    s.trim_start_matches(|c| class.contains(c))
}

fn trim_right<'a>(class: &str, s: &'a str) -> &'a str {
    s.trim_end_matches(|c| class.contains(c))
}

fn char_len(s: &str) -> i64 {
    s.chars().count() as i64
}

// Character index of a byte offset within `s`.
fn char_index_of(s: &str, byte: usize) -> i64 {
    s[..byte].chars().count() as i64
}

pub fn handle_string(i: &mut Interp, argv: &[String], _tag: i64) -> Status {
    if argv.len() < 3 {
        return Err(i.arity_error(3, argv));
    }
    let rq = argv[1].as_str();
    if argv.len() == 3 {
        let arg1 = argv[2].as_str();
        match rq {
            "trimleft" => return i.set_result(trim_left(WHITE_SPACE, arg1)),
            "trimright" => return i.set_result(trim_right(WHITE_SPACE, arg1)),
            "trim" => return i.set_result(trim_left(WHITE_SPACE, trim_right(WHITE_SPACE, arg1))),
            "length" => return i.set_result_integer(char_len(arg1)),
            "toupper" => {
                let up = arg1.to_ascii_uppercase();
                return i.set_result(&up);
            }
            "tolower" => {
                let low = arg1.to_ascii_lowercase();
                return i.set_result(&low);
            }
            "reverse" => {
                let rev: String = arg1.chars().rev().collect();
                return i.set_result(&rev);
            }
            "ordinal" => {
                let code = arg1.chars().next().map(|c| c as i64).unwrap_or(0);
                return i.set_result_integer(code);
            }
            "char" => {
                let v = i.number(arg1)?;
                let ch = u32::try_from(v).ok().and_then(char::from_u32);
                return match ch {
                    Some(c) => i.set_result(&c.to_string()),
                    None => Err(i.error("Invalid Conversion")),
                };
            }
            "dec2hex" => {
                let v = i.number(arg1)?;
                return i.set_result(&format_int(v, 16));
            }
            "hex2dec" => {
                return match parse_int(arg1, 16) {
                    Ok(v) => i.set_result_integer(v),
                    Err(()) => Err(i.error(format!("Invalid hexadecimal value: {}", arg1))),
                };
            }
            "hash" => {
                let h = crate::interpreter::commands::hash_name(arg1);
                return i.set_result_integer(h as i64);
            }
            _ => {}
        }
    } else if argv.len() == 4 {
        let arg1 = argv[2].as_str();
        let arg2 = argv[3].as_str();
        match rq {
            "trimleft" => return i.set_result(trim_left(arg2, arg1)),
            "trimright" => return i.set_result(trim_right(arg2, arg1)),
            "trim" => return i.set_result(trim_left(arg2, trim_right(arg2, arg1))),
            "match" => {
                let depth = i.limits.max_recursion.saturating_sub(i.depth);
                return match glob_match(arg1.as_bytes(), arg2.as_bytes(), depth) {
                    Ok(matched) => i.set_result_integer(matched as i64),
                    Err(e) => Err(i.error(format!("Match error: {}", e))),
                };
            }
            "equal" => return i.set_result_integer((arg1 == arg2) as i64),
            "compare" => {
                let ord = match arg1.cmp(arg2) {
                    std::cmp::Ordering::Less => -1,
                    std::cmp::Ordering::Equal => 0,
                    std::cmp::Ordering::Greater => 1,
                };
                return i.set_result_integer(ord);
            }
            "compare-no-case" => return i.set_result_integer(compare_no_case(arg1, arg2)),
            "index" => {
                let len = char_len(arg1);
                let mut idx = i.number(arg2)?;
                if idx < 0 {
                    idx += len;
                }
                if idx > len {
                    idx = len - 1;
                }
                if idx < 0 {
                    idx = 0;
                }
                if idx >= len {
                    i.clear_result();
                    return Ok(());
                }
                let ch = arg1.chars().nth(idx as usize).unwrap_or('\0');
                return i.set_result(&ch.to_string());
            }
            "is" => {
                if let Some(pred) = CLASSES.get(arg1) {
                    return i.set_result_integer(arg2.chars().all(|c| pred(c)) as i64);
                }
                match arg1 {
                    "true" => return i.set_result_integer(is_truthy(arg2) as i64),
                    "false" => return i.set_result_integer(is_falsy(arg2) as i64),
                    "boolean" => {
                        return i
                            .set_result_integer((is_truthy(arg2) || is_falsy(arg2)) as i64)
                    }
                    "integer" => {
                        return i.set_result_integer(parse_int(arg2, 10).is_ok() as i64)
                    }
                    _ => {}
                }
            }
            "repeat" => {
                let count = i.number(arg2)?;
                if count < 0 {
                    return Err(i.error(format!("'string' repeat count negative: {}", count)));
                }
                let total = arg1.len().saturating_mul(count as usize);
                i.charge(total)?;
                let repeated = arg1.repeat(count as usize);
                return i.set_result_owned(repeated);
            }
            "first" => {
                let found = arg2.find(arg1).map(|b| char_index_of(arg2, b)).unwrap_or(-1);
                return i.set_result_integer(found);
            }
            _ => {}
        }
    } else if argv.len() == 5 {
        let arg1 = argv[2].as_str();
        let arg2 = argv[3].as_str();
        let arg3 = argv[4].as_str();
        match rq {
            "first" => {
                let len = char_len(arg2);
                let start = i.number(arg3)?;
                if start < 0 || start >= len {
                    i.clear_result();
                    return Ok(());
                }
                let byte_start = arg2
                    .char_indices()
                    .nth(start as usize)
                    .map(|(b, _)| b)
                    .unwrap_or(arg2.len());
                let found = arg2[byte_start..]
                    .find(arg1)
                    .map(|b| char_index_of(arg2, byte_start + b))
                    .unwrap_or(-1);
                return i.set_result_integer(found);
            }
            "range" => {
                let len = char_len(arg1);
                let mut first = i.number(arg2)?;
                let mut last = i.number(arg3)?;
                if first > last {
                    i.clear_result();
                    return Ok(());
                }
                if first < 0 {
                    first = 0;
                }
                if last > len {
                    last = len;
                }
                let end = (last + 1).min(len);
                let sub: String = arg1
                    .chars()
                    .skip(first as usize)
                    .take((end - first).max(0) as usize)
                    .collect();
                return i.set_result(&sub);
            }
            _ => {}
        }
    }
    Err(i.arity_error(3, argv))
}
