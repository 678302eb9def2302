//! Command table
//!
//! A fixed-bucket chained hash table of named callables, keyed by a
//! DJB2 hash of the command name. Built-in commands keep their static
//! names; procedures and host commands own theirs.

use std::borrow::Cow;
use std::rc::Rc;

use crate::interpreter::errors::Status;
use crate::interpreter::interp::Interp;

/// Signature shared by the built-in commands. The tag carries the
/// per-registration private data (operator index, control code).
pub type BuiltinFn = fn(&mut Interp, &[String], i64) -> Status;

/// Signature for host-registered commands. The closure captures
/// whatever private data the host needs.
pub type HostFn = dyn Fn(&mut Interp, &[String]) -> Status;

/// The callable half of a command.
#[derive(Clone)]
pub enum Callable {
    /// A native command compiled into the interpreter.
    Builtin { func: BuiltinFn, tag: i64 },
    /// A procedure defined in the script language: a formal-argument
    /// list and a body, both owned by the command.
    Proc { params: String, body: String },
    /// A closure supplied by the embedding host.
    Host(Rc<HostFn>),
}

impl Callable {
    // Bytes owned by the callable itself, for allocator accounting.
    pub(crate) fn owned_bytes(&self) -> usize {
        match self {
            Callable::Proc { params, body } => params.len() + body.len(),
            Callable::Builtin { .. } | Callable::Host(_) => 0,
        }
    }
}

/// A registered command.
pub struct Command {
    pub name: Cow<'static, str>,
    pub callable: Callable,
}

impl Command {
    pub(crate) fn owned_bytes(&self) -> usize {
        let name = match &self.name {
            Cow::Borrowed(_) => 0,
            Cow::Owned(s) => s.len(),
        };
        name + self.callable.owned_bytes()
    }
}

/// DJB2 string hash.
pub fn hash_name(s: &str) -> u64 {
    let mut h: u64 = 5381;
    for &b in s.as_bytes() {
        h = (h << 5).wrapping_add(h).wrapping_add(b as u64);
    }
    h
}

pub struct CommandTable {
    buckets: Vec<Vec<Command>>,
}

impl CommandTable {
    pub fn new(buckets: usize) -> Self {
        let buckets = buckets.max(1);
        CommandTable { buckets: (0..buckets).map(|_| Vec::new()).collect() }
    }

    fn bucket(&self, name: &str) -> usize {
        (hash_name(name) % self.buckets.len() as u64) as usize
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.buckets[self.bucket(name)].iter().find(|c| c.name == name)
    }

    /// Insert a command. Returns false if the name is already taken.
    pub fn insert(&mut self, cmd: Command) -> bool {
        if self.get(&cmd.name).is_some() {
            return false;
        }
        let bucket = self.bucket(&cmd.name);
        self.buckets[bucket].push(cmd);
        true
    }

    pub fn remove(&mut self, name: &str) -> Option<Command> {
        let bucket = self.bucket(name);
        let idx = self.buckets[bucket].iter().position(|c| c.name == name)?;
        Some(self.buckets[bucket].remove(idx))
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Commands in a stable order: bucket by bucket, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Command> + '_ {
        self.buckets.iter().flat_map(|b| b.iter())
    }
}

impl Interp {
    /// Register a host command. `argv[0]` is the invoked name. The
    /// callback must set the result before returning.
    pub fn register_command<F>(&mut self, name: &str, func: F) -> Status
    where
        F: Fn(&mut Interp, &[String]) -> Status + 'static,
    {
        self.register_dynamic(name, Callable::Host(Rc::new(func)))
    }

    // Built-in registration: static names, nothing charged.
    pub(crate) fn register_builtin(&mut self, name: &'static str, func: BuiltinFn, tag: i64) {
        let inserted = self
            .commands
            .insert(Command { name: Cow::Borrowed(name), callable: Callable::Builtin { func, tag } });
        debug_assert!(inserted, "duplicate builtin '{}'", name);
    }

    pub(crate) fn register_dynamic(&mut self, name: &str, callable: Callable) -> Status {
        if self.commands.get(name).is_some() {
            return Err(self.error(format!("'{}' already defined", name)));
        }
        self.charge(name.len() + callable.owned_bytes())?;
        self.commands.insert(Command { name: Cow::Owned(name.to_string()), callable });
        Ok(())
    }

    pub(crate) fn unset_command(&mut self, name: &str) -> Status {
        match self.commands.remove(name) {
            Some(cmd) => {
                self.release(cmd.owned_bytes());
                Ok(())
            }
            None => Err(self.error(format!("cannot remove '{}'", name))),
        }
    }

    /// Rename a command; an empty new name removes it. Procedures are
    /// copied under the new name, built-ins share their callable.
    pub fn rename_command(&mut self, src: &str, dst: &str) -> Status {
        if self.commands.get(dst).is_some() {
            return Err(self.error(format!("'{}' already defined", dst)));
        }
        if dst.is_empty() {
            return self.unset_command(src);
        }
        let callable = match self.commands.get(src) {
            Some(c) => c.callable.clone(),
            None => return Err(self.error(format!("Not a proc: {}", src))),
        };
        self.register_dynamic(dst, callable)?;
        self.unset_command(src)
    }
}
