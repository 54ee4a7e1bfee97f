//! Interned-ish variable names: cheap-to-clone reference-counted strings.
//!
//! Fully qualified names (`"f.x.min"`, `"g.arg[0].extent"`) repeat heavily
//! throughout a lowered tree's `Let`/`LetStmt` chains. `Symbol` makes
//! cloning one of these a refcount bump rather than an allocation, and lets
//! equality short-circuit on pointer identity before falling back to a
//! string comparison.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Symbol(Rc<str>);

impl Symbol {
    pub fn new(s: impl AsRef<str>) -> Self {
        Symbol(Rc::from(s.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds a fully-qualified name, e.g. `Symbol::qualify("f", "x")` ->
    /// `"f.x"`, the convention used for per-argument schedule metadata.
    pub fn qualify(prefix: &str, field: &str) -> Self {
        Symbol::new(format!("{prefix}.{field}"))
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl std::hash::Hash for Symbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl Deref for Symbol {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Symbol(Rc::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_by_value() {
        let a = Symbol::new("f.x");
        let b = Symbol::new("f.x");
        assert_eq!(a, b);
    }

    #[test]
    fn clone_is_same_pointer() {
        let a = Symbol::new("f.x");
        let b = a.clone();
        assert!(Rc::ptr_eq(&a.0, &b.0));
    }

    #[test]
    fn qualify_builds_dotted_name() {
        assert_eq!(Symbol::qualify("f", "x.min").as_str(), "f.x.min");
    }
}
