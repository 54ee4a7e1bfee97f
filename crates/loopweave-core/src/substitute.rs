//! Capture-free variable substitution.
//!
//! `substitute(name, replacement, tree)` replaces every `Variable(name)`
//! with `replacement`. No capture avoidance is attempted: callers must
//! fully qualify names before calling in, the same discipline the rest of
//! the pipeline relies on. If a `Let`/`LetStmt` rebinds `name`, descent
//! into its body is skipped — that inner scope shadows the substitution.

use crate::error::CoreResult;
use crate::ir::expr::{Expr, ExprKind};
use crate::ir::stmt::{Stmt, StmtKind};
use crate::mutator::{default_mutate_expr, default_mutate_stmt, Mutator};
use crate::symbol::Symbol;

struct Substitute {
    name: Symbol,
    replacement: Expr,
}

impl Mutator for Substitute {
    fn mutate_expr(&mut self, e: &Expr) -> CoreResult<Expr> {
        match &e.kind {
            ExprKind::Variable(n) if *n == self.name => Ok(self.replacement.clone()),
            ExprKind::Let(n, value, body) if *n == self.name => {
                // The bound name shadows `self.name` within `body`; only
                // the value expression is still in the outer scope.
                let mv = self.mutate_expr(value)?;
                if crate::ir::expr_same_as(value, &mv) {
                    Ok(e.clone())
                } else {
                    Ok(crate::ir::expr::ExprBuilder::let_(n.clone(), mv, body.clone()))
                }
            }
            _ => default_mutate_expr(self, e),
        }
    }

    fn mutate_stmt(&mut self, s: &Stmt) -> CoreResult<Stmt> {
        match &s.kind {
            StmtKind::LetStmt(n, value, body) if *n == self.name => {
                let mv = self.mutate_expr(value)?;
                if crate::ir::expr_same_as(value, &mv) {
                    Ok(s.clone())
                } else {
                    Ok(crate::ir::stmt::StmtBuilder::let_stmt(
                        n.clone(),
                        mv,
                        body.clone(),
                    ))
                }
            }
            _ => default_mutate_stmt(self, s),
        }
    }
}

pub fn substitute_expr(name: &Symbol, replacement: &Expr, tree: &Expr) -> CoreResult<Expr> {
    let mut s = Substitute {
        name: name.clone(),
        replacement: replacement.clone(),
    };
    s.mutate_expr(tree)
}

pub fn substitute_stmt(name: &Symbol, replacement: &Expr, tree: &Stmt) -> CoreResult<Stmt> {
    let mut s = Substitute {
        name: name.clone(),
        replacement: replacement.clone(),
    };
    s.mutate_stmt(tree)
}
