//! Variable environment
//!
//! Each call frame holds a flat list of variables. Names and values
//! use small-string storage: anything that fits in a pointer-sized
//! buffer is held inline and never touches the heap. A variable can
//! also be a link that redirects reads and writes to a variable in an
//! ancestor frame; links are resolved transparently and always
//! terminate.

use crate::interpreter::errors::{Flow, Status};
use crate::interpreter::interp::Interp;

/// Inline capacity of a [`CompactString`]: the size of a pointer.
pub const INLINE_LEN: usize = std::mem::size_of::<usize>();

// Links are stored pre-resolved, so chains stay short; the bound only
// guards against dangling links recreated as links.
const MAX_LINK_HOPS: usize = 64;

/// A string stored inline when it fits in a pointer-sized buffer.
#[derive(Debug, Clone)]
pub enum CompactString {
    Inline { buf: [u8; INLINE_LEN], len: u8 },
    Heap(String),
}

impl CompactString {
    /// True when `s` would be stored without heap allocation.
    pub fn fits_inline(s: &str) -> bool {
        s.len() < INLINE_LEN
    }

    pub fn as_str(&self) -> &str {
        match self {
            CompactString::Inline { buf, len } => {
                std::str::from_utf8(&buf[..*len as usize]).unwrap_or("")
            }
            CompactString::Heap(s) => s,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, CompactString::Inline { .. })
    }
}

impl PartialEq for CompactString {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for CompactString {}

/// Variable payload: a string, or a link into an ancestor frame.
#[derive(Debug, Clone)]
pub enum VarValue {
    Str(CompactString),
    Link { frame: usize, name: String },
}

/// A named variable inside one call frame.
#[derive(Debug, Clone)]
pub struct Var {
    pub name: CompactString,
    pub value: VarValue,
}

/// One scope in the call stack. The global frame has no parent and
/// lives for the interpreter's lifetime.
#[derive(Debug, Default)]
pub struct CallFrame {
    pub vars: Vec<Var>,
    pub parent: Option<usize>,
}

impl Interp {
    /// Read a variable in the active frame, following links.
    pub fn var(&self, name: &str) -> Option<&str> {
        let (f, idx) = self.find_var(self.current, name, true)?;
        match &self.frames[f].vars[idx].value {
            VarValue::Str(s) => Some(s.as_str()),
            VarValue::Link { .. } => None,
        }
    }

    /// Read a variable and parse it as an integer.
    pub fn var_integer(&mut self, name: &str) -> Result<i64, Flow> {
        let s = match self.var(name) {
            Some(v) => v.to_string(),
            None => return Err(Flow::Error),
        };
        self.number(&s)
    }

    /// Write a variable in the active frame, following links. Creates
    /// the variable if it does not exist.
    pub fn set_var(&mut self, name: &str, value: &str) -> Status {
        self.set_var_in(self.current, name, value)
    }

    /// Format an integer into a variable.
    pub fn set_var_integer(&mut self, name: &str, n: i64) -> Status {
        self.set_var(name, &crate::interpreter::numbers::format_int(n, 10))
    }

    pub(crate) fn set_var_in(&mut self, frame: usize, name: &str, value: &str) -> Status {
        if let Some((f, idx)) = self.lookup(frame, name) {
            let (tf, ti) = match self.deref(f, idx) {
                Some(t) => t,
                None => return Err(self.error(format!("No such variable '{}'", name))),
            };
            // Charge the new payload before the old one is released, so
            // a denied grow keeps the variable intact.
            let new = self.compact(value)?;
            let old = std::mem::replace(&mut self.frames[tf].vars[ti].value, VarValue::Str(new));
            self.release_value(&old);
        } else {
            let cname = self.compact(name)?;
            let cval = match self.compact(value) {
                Ok(v) => v,
                Err(e) => {
                    self.release_compact(&cname);
                    return Err(e);
                }
            };
            self.frames[frame].vars.push(Var { name: cname, value: VarValue::Str(cval) });
        }
        Ok(())
    }

    /// Remove a variable from the active frame. Links are removed, not
    /// followed.
    pub fn unset_var(&mut self, name: &str) -> Status {
        match self.lookup(self.current, name) {
            Some((f, idx)) => {
                let var = self.frames[f].vars.remove(idx);
                self.release_compact(&var.name);
                self.release_value(&var.value);
                Ok(())
            }
            None => Err(self.error(format!("Cannot unset '{}', no such variable", name))),
        }
    }

    // Scan a single frame for `name`; no link following.
    pub(crate) fn lookup(&self, frame: usize, name: &str) -> Option<(usize, usize)> {
        let idx = self
            .frames
            .get(frame)?
            .vars
            .iter()
            .position(|v| v.name.as_str() == name)?;
        Some((frame, idx))
    }

    // Follow links from a variable to its terminal storage.
    pub(crate) fn deref(&self, frame: usize, idx: usize) -> Option<(usize, usize)> {
        let (mut f, mut i) = (frame, idx);
        let mut hops = 0;
        loop {
            match &self.frames[f].vars[i].value {
                VarValue::Link { frame: lf, name } => {
                    hops += 1;
                    if hops > MAX_LINK_HOPS {
                        return None;
                    }
                    let (nf, ni) = self.lookup(*lf, name)?;
                    f = nf;
                    i = ni;
                }
                VarValue::Str(_) => return Some((f, i)),
            }
        }
    }

    pub(crate) fn find_var(&self, frame: usize, name: &str, follow: bool) -> Option<(usize, usize)> {
        let (f, idx) = self.lookup(frame, name)?;
        if follow {
            self.deref(f, idx)
        } else {
            Some((f, idx))
        }
    }

    pub(crate) fn push_frame(&mut self) {
        self.frames.push(CallFrame { vars: Vec::new(), parent: Some(self.current) });
        self.current = self.frames.len() - 1;
        self.depth += 1;
    }

    pub(crate) fn pop_frame(&mut self) {
        debug_assert_eq!(self.current, self.frames.len() - 1);
        self.depth = self.depth.saturating_sub(1);
        if let Some(frame) = self.frames.pop() {
            self.current = frame.parent.unwrap_or(0);
            for v in &frame.vars {
                self.release_compact(&v.name);
                self.release_value(&v.value);
            }
        }
    }

    pub(crate) fn compact(&mut self, s: &str) -> Result<CompactString, Flow> {
        if CompactString::fits_inline(s) {
            let mut buf = [0u8; INLINE_LEN];
            buf[..s.len()].copy_from_slice(s.as_bytes());
            Ok(CompactString::Inline { buf, len: s.len() as u8 })
        } else {
            self.charge(s.len())?;
            Ok(CompactString::Heap(s.to_string()))
        }
    }

    pub(crate) fn release_compact(&mut self, c: &CompactString) {
        if let CompactString::Heap(s) = c {
            self.release(s.len());
        }
    }

    pub(crate) fn release_value(&mut self, v: &VarValue) {
        match v {
            VarValue::Str(c) => self.release_compact(c),
            VarValue::Link { name, .. } => self.release(name.len()),
        }
    }
}
