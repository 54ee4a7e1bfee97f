//! Per-function schedule metadata: splits, dimension ordering, and the
//! store/compute loop levels that decide where a producer's values are
//! allocated and computed.

use crate::ir::stmt::ForKind;
use crate::symbol::Symbol;

/// Splits one loop dimension into an outer and inner pair of constant
/// extent `factor`. Later schedule directives (`vectorize`, `unroll`,
/// `parallel`) reference `outer`/`inner`, not `old_var`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub old_var: Symbol,
    pub outer: Symbol,
    pub inner: Symbol,
    pub factor: u32,
}

/// One entry in the schedule's dimension list: a loop variable and the
/// kind of loop it becomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dim {
    pub var: Symbol,
    pub for_kind: ForKind,
}

/// Per-function scheduling metadata. `store_level`/`compute_level` name a
/// loop variable owned by some consumer function, fully qualified by that
/// consumer (e.g. `"f.x_o"`); both empty means the function is inlined at
/// its call sites.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schedule {
    pub store_level: Option<Symbol>,
    pub compute_level: Option<Symbol>,
    pub splits: Vec<Split>,
    pub dims: Vec<Dim>,
}

impl Schedule {
    /// The default schedule: one Serial dim per pure argument, in
    /// declaration order, inlined (no store/compute level).
    pub fn default_for_args(args: &[Symbol]) -> Self {
        Schedule {
            store_level: None,
            compute_level: None,
            splits: Vec::new(),
            dims: args
                .iter()
                .map(|a| Dim {
                    var: a.clone(),
                    for_kind: ForKind::Serial,
                })
                .collect(),
        }
    }

    pub fn is_inlined(&self) -> bool {
        self.store_level.is_none() && self.compute_level.is_none()
    }

    /// `split(old, outer, inner, factor)`: replaces `old` in the dim list
    /// with `inner` (innermost) then `outer` (outside it), recording the
    /// split. The dim list runs innermost-first, so `inner` must precede
    /// `outer` for the outer loop to end up enclosing the inner one.
    pub fn split(
        &mut self,
        old: impl Into<Symbol>,
        outer: impl Into<Symbol>,
        inner: impl Into<Symbol>,
        factor: u32,
    ) -> &mut Self {
        let old = old.into();
        let outer = outer.into();
        let inner = inner.into();
        if let Some(pos) = self.dims.iter().position(|d| d.var == old) {
            let for_kind = self.dims[pos].for_kind;
            self.dims.splice(
                pos..=pos,
                [
                    Dim {
                        var: inner.clone(),
                        for_kind,
                    },
                    Dim {
                        var: outer.clone(),
                        for_kind,
                    },
                ],
            );
        }
        self.splits.push(Split {
            old_var: old,
            outer,
            inner,
            factor,
        });
        self
    }

    fn set_for_kind(&mut self, var: &str, kind: ForKind) -> &mut Self {
        if let Some(d) = self.dims.iter_mut().find(|d| d.var.as_str() == var) {
            d.for_kind = kind;
        }
        self
    }

    pub fn parallel(&mut self, var: &str) -> &mut Self {
        self.set_for_kind(var, ForKind::Parallel)
    }

    pub fn vectorize(&mut self, var: &str) -> &mut Self {
        self.set_for_kind(var, ForKind::Vectorized)
    }

    pub fn unroll(&mut self, var: &str) -> &mut Self {
        self.set_for_kind(var, ForKind::Unrolled)
    }

    /// `chunk(store_at, compute_at)`: sets both schedule levels.
    pub fn chunk(&mut self, store_at: impl Into<Symbol>, compute_at: impl Into<Symbol>) -> &mut Self {
        self.store_level = Some(store_at.into());
        self.compute_level = Some(compute_at.into());
        self
    }

    /// The constant split factor for `var` if `var` is the inner half of a
    /// split, used to validate Vectorized/Unrolled dims have constant
    /// extent.
    pub fn split_factor_for(&self, var: &str) -> Option<u32> {
        self.splits
            .iter()
            .find(|s| s.inner.as_str() == var || s.outer.as_str() == var)
            .map(|s| s.factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_rewrites_dim_list() {
        let mut sched = Schedule::default_for_args(&[Symbol::new("x"), Symbol::new("y")]);
        sched.split("x", "x_o", "x_i", 4);
        let vars: Vec<&str> = sched.dims.iter().map(|d| d.var.as_str()).collect();
        assert_eq!(vars, vec!["x_i", "x_o", "y"]);
        assert_eq!(sched.splits.len(), 1);
    }

    #[test]
    fn vectorize_and_parallel_set_for_kind() {
        let mut sched = Schedule::default_for_args(&[Symbol::new("x")]);
        sched.split("x", "x_o", "x_i", 4).vectorize("x_i").parallel("x_o");
        assert_eq!(
            sched.dims.iter().find(|d| d.var.as_str() == "x_i").unwrap().for_kind,
            ForKind::Vectorized
        );
        assert_eq!(
            sched.dims.iter().find(|d| d.var.as_str() == "x_o").unwrap().for_kind,
            ForKind::Parallel
        );
    }

    #[test]
    fn chunk_sets_both_levels() {
        let mut sched = Schedule::default();
        sched.chunk("f.x_o", "f.y");
        assert_eq!(sched.store_level.as_ref().unwrap().as_str(), "f.x_o");
        assert_eq!(sched.compute_level.as_ref().unwrap().as_str(), "f.y");
        assert!(!sched.is_inlined());
    }

    #[test]
    fn default_schedule_is_inlined() {
        let sched = Schedule::default_for_args(&[Symbol::new("x")]);
        assert!(sched.is_inlined());
    }
}
