//! Dead-let elimination: drops `Let`/`LetStmt` bindings whose name is never
//! read by their body, keeping a reference-count scope while descending.

use crate::error::CoreResult;
use crate::ir::expr::{Expr, ExprKind};
use crate::ir::stmt::{Stmt, StmtKind};
use crate::mutator::{default_mutate_expr, default_mutate_stmt, Mutator};
use crate::symbol::Symbol;
use std::collections::HashMap;

#[derive(Default)]
struct Counts {
    table: HashMap<Symbol, Vec<usize>>,
}

impl Counts {
    fn enter(&mut self, name: &Symbol) {
        self.table.entry(name.clone()).or_default().push(0);
    }

    fn exit(&mut self, name: &Symbol) -> usize {
        self.table.get_mut(name).and_then(|s| s.pop()).unwrap_or(0)
    }

    fn touch(&mut self, name: &Symbol) {
        if let Some(stack) = self.table.get_mut(name) {
            if let Some(top) = stack.last_mut() {
                *top += 1;
            }
        }
    }
}

#[derive(Default)]
struct DeadLetEliminator {
    counts: Counts,
}

impl Mutator for DeadLetEliminator {
    fn mutate_expr(&mut self, e: &Expr) -> CoreResult<Expr> {
        match &e.kind {
            ExprKind::Variable(name) => {
                self.counts.touch(name);
                Ok(e.clone())
            }
            ExprKind::Let(name, value, body) => {
                self.counts.enter(name);
                let mbody = self.mutate_expr(body)?;
                let uses = self.counts.exit(name);
                if uses == 0 {
                    return Ok(mbody);
                }
                let mvalue = self.mutate_expr(value)?;
                Ok(crate::ir::expr::ExprBuilder::let_(name.clone(), mvalue, mbody))
            }
            _ => default_mutate_expr(self, e),
        }
    }

    fn mutate_stmt(&mut self, s: &Stmt) -> CoreResult<Stmt> {
        match &s.kind {
            StmtKind::LetStmt(name, value, body) => {
                self.counts.enter(name);
                let mbody = self.mutate_stmt(body)?;
                let uses = self.counts.exit(name);
                if uses == 0 {
                    return Ok(mbody);
                }
                let mvalue = self.mutate_expr(value)?;
                Ok(crate::ir::stmt::StmtBuilder::let_stmt(name.clone(), mvalue, mbody))
            }
            _ => default_mutate_stmt(self, s),
        }
    }
}

/// Removes every unused `Let`/`LetStmt` binding from `expr`.
pub fn dead_let_elimination_expr(expr: &Expr) -> CoreResult<Expr> {
    let mut pass = DeadLetEliminator::default();
    pass.mutate_expr(expr)
}

/// Removes every unused `Let`/`LetStmt` binding from `stmt`.
pub fn dead_let_elimination_stmt(stmt: &Stmt) -> CoreResult<Stmt> {
    let mut pass = DeadLetEliminator::default();
    pass.mutate_stmt(stmt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::expr::ExprBuilder;
    use crate::ir::stmt::StmtBuilder;
    use crate::types::Type;

    #[test]
    fn drops_unused_let_binding() {
        let value = ExprBuilder::int_imm(Type::int(32), 3).unwrap();
        let body = ExprBuilder::int_imm(Type::int(32), 7).unwrap();
        let let_expr = ExprBuilder::let_("unused", value, body.clone());
        let out = dead_let_elimination_expr(&let_expr).unwrap();
        assert!(crate::ir::expr_same_as(&out, &body));
    }

    #[test]
    fn keeps_used_let_binding() {
        let value = ExprBuilder::int_imm(Type::int(32), 3).unwrap();
        let body = ExprBuilder::variable(Type::int(32), "x");
        let let_expr = ExprBuilder::let_("x", value, body);
        let out = dead_let_elimination_expr(&let_expr).unwrap();
        assert!(matches!(out.kind, ExprKind::Let(..)));
    }

    #[test]
    fn drops_unused_letstmt_in_a_statement_tree() {
        let value = ExprBuilder::int_imm(Type::int(32), 9).unwrap();
        let inner = StmtBuilder::store("buf", ExprBuilder::int_imm(Type::int(32), 1).unwrap(), ExprBuilder::int_imm(Type::int(32), 0).unwrap()).unwrap();
        let let_stmt = StmtBuilder::let_stmt("unused", value, inner.clone());
        let out = dead_let_elimination_stmt(&let_stmt).unwrap();
        assert!(crate::ir::stmt_same_as(&out, &inner));
    }

    #[test]
    fn nested_shadowing_names_count_independently() {
        // Let x = 1 in (Let x = 2 in x) -- outer x unused, inner x used.
        let inner = ExprBuilder::let_(
            "x",
            ExprBuilder::int_imm(Type::int(32), 2).unwrap(),
            ExprBuilder::variable(Type::int(32), "x"),
        );
        let outer = ExprBuilder::let_("x", ExprBuilder::int_imm(Type::int(32), 1).unwrap(), inner);
        let out = dead_let_elimination_expr(&outer).unwrap();
        // Outer binding is unused (the variable reference resolves to the
        // inner, shadowing Let), so it should be dropped entirely.
        match &out.kind {
            ExprKind::Let(name, value, _) => {
                assert_eq!(name.as_str(), "x");
                assert!(matches!(value.kind, ExprKind::IntImm(2)));
            }
            other => panic!("expected the inner Let to survive, got {other:?}"),
        }
    }
}
