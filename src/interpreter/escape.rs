//! Backslash escape handling
//!
//! Escapable (ESC) tokens pass through here after they are copied out
//! of the script: `\n`, `\t`, `\r`, `\\`, `\"`, `\[`, `\]`, `\e` and
//! `\xHH` with up to two hex digits. Anything else is an error.

use thiserror::Error;

/// An unknown escape, a `\x` without hex digits, or a byte sequence
/// that does not form valid text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid escape sequence")]
pub struct UnescapeError;

// Decode up to two hex digits; returns (value, digits consumed).
fn hex2(bytes: &[u8]) -> (u8, usize) {
    let hi = match bytes.first().copied().map(hex_nibble) {
        Some(Some(v)) => v,
        _ => return (0, 0),
    };
    match bytes.get(1).copied().map(hex_nibble) {
        Some(Some(lo)) => ((hi << 4) | lo, 2),
        _ => (hi, 1),
    }
}

fn hex_nibble(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 0xa),
        b'A'..=b'F' => Some(ch - b'A' + 0xa),
        _ => None,
    }
}

/// Expand backslash escapes in `s`.
pub fn unescape(s: &str) -> Result<String, UnescapeError> {
    let b = s.as_bytes();
    let mut out = Vec::with_capacity(b.len());
    let mut j = 0;
    while j < b.len() {
        let ch = b[j];
        if ch == b'\\' {
            j += 1;
            match b.get(j) {
                Some(b'\\') => out.push(b'\\'),
                Some(b'n') => out.push(b'\n'),
                Some(b't') => out.push(b'\t'),
                Some(b'r') => out.push(b'\r'),
                Some(b'"') => out.push(b'"'),
                Some(b'[') => out.push(b'['),
                Some(b']') => out.push(b']'),
                Some(b'e') => out.push(0x1b),
                Some(b'x') => {
                    let (val, used) = hex2(&b[j + 1..]);
                    if used == 0 {
                        return Err(UnescapeError);
                    }
                    j += used;
                    out.push(val);
                }
                _ => return Err(UnescapeError),
            }
        } else {
            out.push(ch);
        }
        j += 1;
    }
    String::from_utf8(out).map_err(|_| UnescapeError)
}
