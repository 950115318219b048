//! Evaluation context stack: the definitions currently open for declaration.
//!
//! Entries are paths from the pass root rather than references, so the tree
//! itself stays singly owned by the session. [`Scope`] is the only way the
//! engine opens a definition; it pops its entry when dropped, which covers
//! early returns and unwinding out of a nested block.

use crate::session::Session;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Attribute names leading from the pass root to an open definition.
/// The empty path is the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionPath(Vec<String>);

impl DefinitionPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_owned());
        DefinitionPath(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DefinitionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0.join("."))
        }
    }
}

#[derive(Debug, Default)]
pub struct ContextStack {
    entries: Vec<DefinitionPath>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: DefinitionPath) {
        tracing::trace!(depth = self.entries.len() + 1, path = %path, "open definition");
        self.entries.push(path);
    }

    pub fn pop(&mut self) -> Option<DefinitionPath> {
        let popped = self.entries.pop();
        if let Some(path) = &popped {
            tracing::trace!(depth = self.entries.len(), path = %path, "close definition");
        }
        popped
    }

    /// Top of the stack, or `None` when nothing is open.
    pub fn current(&self) -> Option<&DefinitionPath> {
        self.entries.last()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ── Scope guard ───────────────────────────────────────────────────────────────

/// An open definition. Derefs to the session so a nested block can be handed
/// `&mut Session` while the entry stays pushed.
pub(crate) struct Scope<'s> {
    session: &'s mut Session,
    depth: usize,
}

impl<'s> Scope<'s> {
    pub(crate) fn enter(session: &'s mut Session, path: DefinitionPath) -> Self {
        session.stack_mut().push(path);
        let depth = session.stack_mut().depth();
        Scope { session, depth }
    }
}

impl Deref for Scope<'_> {
    type Target = Session;

    fn deref(&self) -> &Session {
        self.session
    }
}

impl DerefMut for Scope<'_> {
    fn deref_mut(&mut self) -> &mut Session {
        self.session
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        let stack = self.session.stack_mut();
        debug_assert_eq!(stack.depth(), self.depth, "unbalanced context stack");
        stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_is_lifo() {
        let mut stack = ContextStack::new();
        assert!(stack.current().is_none());

        let root = DefinitionPath::root();
        let child = root.child("address");
        stack.push(root.clone());
        stack.push(child.clone());
        assert_eq!(stack.current(), Some(&child));
        assert_eq!(stack.depth(), 2);

        assert_eq!(stack.pop(), Some(child));
        assert_eq!(stack.current(), Some(&root));
        assert_eq!(stack.pop(), Some(root));
        assert!(stack.is_empty());
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn path_display() {
        let p = DefinitionPath::root();
        assert_eq!(p.to_string(), "<root>");
        assert!(p.is_root());
        let p = p.child("address").child("street");
        assert_eq!(p.to_string(), "address.street");
        assert_eq!(p.segments(), &["address".to_string(), "street".to_string()]);
    }

    #[test]
    fn scope_pops_on_drop() {
        let mut session = Session::new();
        {
            let scope = Scope::enter(&mut session, DefinitionPath::root());
            assert_eq!(scope.current(), Some(&DefinitionPath::root()));
        }
        assert!(session.current().is_none());
    }

    #[test]
    fn scope_pops_when_block_panics() {
        let mut session = Session::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _scope = Scope::enter(&mut session, DefinitionPath::root());
            panic!("block failed");
        }));
        assert!(result.is_err());
        assert!(session.current().is_none());
    }
}
