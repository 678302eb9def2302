//! Arithmetic commands
//!
//! Each operator is its own command; the registration tag selects the
//! operation. Operands are signed integers under strict conversion
//! and arithmetic wraps at the register width.

use crate::interpreter::errors::Status;
use crate::interpreter::interp::Interp;

const UNOT: i64 = 0;
const UINV: i64 = 1;
const UABS: i64 = 2;
const UBOOL: i64 = 3;

const BADD: i64 = 0;
const BSUB: i64 = 1;
const BMUL: i64 = 2;
const BDIV: i64 = 3;
const BMOD: i64 = 4;
const BMORE: i64 = 5;
const BMEQ: i64 = 6;
const BLESS: i64 = 7;
const BLEQ: i64 = 8;
const BEQ: i64 = 9;
const BNEQ: i64 = 10;
const BLSHIFT: i64 = 11;
const BRSHIFT: i64 = 12;
const BAND: i64 = 13;
const BOR: i64 = 14;
const BXOR: i64 = 15;
const BMIN: i64 = 16;
const BMAX: i64 = 17;
const BPOW: i64 = 18;
const BLOG: i64 = 19;

const UNARY: &[(&str, i64)] = &[("!", UNOT), ("~", UINV), ("abs", UABS), ("bool", UBOOL)];

const BINARY: &[(&str, i64)] = &[
    ("+", BADD),
    ("-", BSUB),
    ("*", BMUL),
    ("/", BDIV),
    ("%", BMOD),
    (">", BMORE),
    (">=", BMEQ),
    ("<", BLESS),
    ("<=", BLEQ),
    ("==", BEQ),
    ("!=", BNEQ),
    ("<<", BLSHIFT),
    (">>", BRSHIFT),
    ("&", BAND),
    ("|", BOR),
    ("^", BXOR),
    ("min", BMIN),
    ("max", BMAX),
    ("pow", BPOW),
    ("log", BLOG),
];

pub fn register(i: &mut Interp) {
    for &(name, tag) in UNARY {
        i.register_builtin(name, handle_unary, tag);
    }
    for &(name, tag) in BINARY {
        i.register_builtin(name, handle_binary, tag);
    }
}

pub fn handle_unary(i: &mut Interp, argv: &[String], tag: i64) -> Status {
    if argv.len() != 2 {
        return Err(i.arity_error(2, argv));
    }
    let a = i.number(&argv[1])?;
    let r = match tag {
        UNOT => (a == 0) as i64,
        UINV => !a,
        UABS => a.wrapping_abs(),
        UBOOL => (a != 0) as i64,
        _ => return Err(i.error(format!("Unknown operator {}", argv[0]))),
    };
    i.set_result_integer(r)
}

pub fn handle_binary(i: &mut Interp, argv: &[String], tag: i64) -> Status {
    if argv.len() != 3 {
        return Err(i.arity_error(3, argv));
    }
    let a = i.number(&argv[1])?;
    let b = i.number(&argv[2])?;
    let c = match tag {
        BADD => a.wrapping_add(b),
        BSUB => a.wrapping_sub(b),
        BMUL => a.wrapping_mul(b),
        BDIV => {
            if b == 0 {
                return Err(i.error("Division by 0"));
            }
            a.wrapping_div(b)
        }
        BMOD => {
            if b == 0 {
                return Err(i.error("Division by 0"));
            }
            a.wrapping_rem(b)
        }
        BMORE => (a > b) as i64,
        BMEQ => (a >= b) as i64,
        BLESS => (a < b) as i64,
        BLEQ => (a <= b) as i64,
        BEQ => (a == b) as i64,
        BNEQ => (a != b) as i64,
        BLSHIFT => (a as u64).wrapping_shl(b as u32) as i64,
        BRSHIFT => (a as u64).wrapping_shr(b as u32) as i64,
        BAND => a & b,
        BOR => a | b,
        BXOR => a ^ b,
        BMIN => a.min(b),
        BMAX => a.max(b),
        BPOW => match power(a, b) {
            Some(v) => v,
            None => return Err(i.error("Invalid power")),
        },
        BLOG => match logarithm(a, b) {
            Some(v) => v,
            None => return Err(i.error("Invalid logarithm")),
        },
        _ => return Err(i.error(format!("Unknown operator {}", argv[0]))),
    };
    i.set_result_integer(c)
}

// Exponentiation by squaring; negative exponents are rejected.
fn power(mut base: i64, mut exp: i64) -> Option<i64> {
    if exp < 0 {
        return None;
    }
    let mut result: i64 = 1;
    let mut negative = 1;
    if base < 0 {
        base = base.wrapping_neg();
        negative = -1;
    }
    loop {
        if exp & 1 == 1 {
            result = result.wrapping_mul(base);
        }
        exp /= 2;
        if exp == 0 {
            break;
        }
        base = base.wrapping_mul(base);
    }
    Some(result.wrapping_mul(negative))
}

// Floor of log base `b` of `a`; requires a > 0 and b >= 2.
fn logarithm(mut a: i64, b: i64) -> Option<i64> {
    if a <= 0 || b < 2 {
        return None;
    }
    let mut r = -1;
    while a != 0 {
        r += 1;
        a /= b;
    }
    Some(r)
}
