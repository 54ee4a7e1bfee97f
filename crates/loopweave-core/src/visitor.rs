//! Read-only double-dispatch traversal over the IR.
//!
//! `Visitor` dispatches one method per concrete variant via the default
//! `walk_*` free functions; override a variant's hook to observe it without
//! having to hand-write recursion into its children.

use crate::ir::expr::{Expr, ExprKind};
use crate::ir::stmt::{Stmt, StmtKind};

pub trait Visitor {
    fn visit_expr(&mut self, e: &Expr) {
        walk_expr(self, e)
    }

    fn visit_stmt(&mut self, s: &Stmt) {
        walk_stmt(self, s)
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, e: &Expr) {
    match &e.kind {
        ExprKind::IntImm(_) | ExprKind::UIntImm(_) | ExprKind::FloatImm(_) | ExprKind::Variable(_) => {}
        ExprKind::Cast(x) => v.visit_expr(x),
        ExprKind::Arith(_, a, b) | ExprKind::Cmp(_, a, b) | ExprKind::And(a, b) | ExprKind::Or(a, b) => {
            v.visit_expr(a);
            v.visit_expr(b);
        }
        ExprKind::Not(x) => v.visit_expr(x),
        ExprKind::Select(c, t, f) => {
            v.visit_expr(c);
            v.visit_expr(t);
            v.visit_expr(f);
        }
        ExprKind::Load(_, index) => v.visit_expr(index),
        ExprKind::Ramp(base, stride, _) => {
            v.visit_expr(base);
            v.visit_expr(stride);
        }
        ExprKind::Broadcast(x, _) => v.visit_expr(x),
        ExprKind::Call(_, args, _) => {
            for a in args {
                v.visit_expr(a);
            }
        }
        ExprKind::Let(_, value, body) => {
            v.visit_expr(value);
            v.visit_expr(body);
        }
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, s: &Stmt) {
    match &s.kind {
        StmtKind::LetStmt(_, value, body) => {
            v.visit_expr(value);
            v.visit_stmt(body);
        }
        StmtKind::AssertStmt(cond, _) => v.visit_expr(cond),
        StmtKind::PrintStmt(_, args) => {
            for a in args {
                v.visit_expr(a);
            }
        }
        StmtKind::Pipeline(_, produce, update, consume) => {
            v.visit_stmt(produce);
            if let Some(u) = update {
                v.visit_stmt(u);
            }
            v.visit_stmt(consume);
        }
        StmtKind::For(_, min, extent, _, body) => {
            v.visit_expr(min);
            v.visit_expr(extent);
            v.visit_stmt(body);
        }
        StmtKind::Store(_, value, index) => {
            v.visit_expr(value);
            v.visit_expr(index);
        }
        StmtKind::Provide(_, value, args) => {
            v.visit_expr(value);
            for a in args {
                v.visit_expr(a);
            }
        }
        StmtKind::Allocate(_, _, size, body) => {
            v.visit_expr(size);
            v.visit_stmt(body);
        }
        StmtKind::Realize(_, _, bounds, body) => {
            for (min, extent) in bounds {
                v.visit_expr(min);
                v.visit_expr(extent);
            }
            v.visit_stmt(body);
        }
        StmtKind::Block(first, rest) => {
            v.visit_stmt(first);
            if let Some(r) = rest {
                v.visit_stmt(r);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::expr::ExprBuilder;
    use crate::types::Type;

    struct CountVars(usize);
    impl Visitor for CountVars {
        fn visit_expr(&mut self, e: &Expr) {
            if let ExprKind::Variable(_) = &e.kind {
                self.0 += 1;
            }
            walk_expr(self, e);
        }
    }

    #[test]
    fn counts_variables_in_a_tree() {
        let x = ExprBuilder::variable(Type::int(32), "x");
        let y = ExprBuilder::variable(Type::int(32), "y");
        let sum = ExprBuilder::arith(crate::ir::expr::ArithOp::Add, x, y).unwrap();
        let mut counter = CountVars(0);
        counter.visit_expr(&sum);
        assert_eq!(counter.0, 2);
    }
}
