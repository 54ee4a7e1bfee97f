//! The driver: sequences every pass into the full lowering pipeline, from a
//! function environment and a chosen output function down to one `Stmt`
//! ready for a backend.

use crate::bounds_inference::{bind_output_bounds, bounds_inference};
use crate::dead_let::dead_let_elimination_stmt;
use crate::error::{CoreError, CoreResult};
use crate::flatten::flatten;
use crate::function::{Environment, Function};
use crate::inject_realization::inject_realization;
use crate::ir::expr::ExprBuilder;
use crate::ir::stmt::{ForKind, Stmt, StmtBuilder};
use crate::realization_order::compute_realization_order;
use crate::realize::build_realization;
use crate::simplify::simplify_stmt;
use crate::symbol::Symbol;
use crate::types::Type;
use crate::vectorize::vectorize_and_unroll;

/// A monotonically increasing source of fresh names, owned by one
/// [`Lowerer`] invocation rather than shared process-wide state. No pass
/// wired up today needs to mint an anonymous name, but this is where one
/// would ask for it (e.g. a future sliding-window scratch buffer).
#[derive(Debug, Default)]
pub struct NameSupply {
    next: u64,
}

impl NameSupply {
    pub fn new() -> Self {
        NameSupply::default()
    }

    pub fn fresh(&mut self, prefix: &str) -> Symbol {
        let n = self.next;
        self.next += 1;
        Symbol::new(format!("{prefix}${n}"))
    }
}

/// The root loop's name: a fixed hook the backend can match on, not a
/// generated name, since it is not actually a dimension of any function.
const ROOT_LOOP: &str = "<root>";

/// Maximum number of (simplify, dead-let) rounds the driver runs in step 9.
const MAX_CLEANUP_ROUNDS: usize = 2;

/// Owns the one piece of driver-wide state (`NameSupply`) across the whole
/// pipeline. `lower` is a thin free function wrapping this for callers who
/// don't care about reusing the name supply across invocations.
pub struct Lowerer {
    names: NameSupply,
}

impl Default for Lowerer {
    fn default() -> Self {
        Lowerer::new()
    }
}

impl Lowerer {
    pub fn new() -> Self {
        Lowerer {
            names: NameSupply::new(),
        }
    }

    pub fn name_supply(&mut self) -> &mut NameSupply {
        &mut self.names
    }

    /// Runs the full pipeline (§4.1-§4.13) for `target` against `env`,
    /// producing the lowered `Stmt`.
    pub fn lower(&mut self, env: &Environment, target: &Symbol) -> CoreResult<Stmt> {
        let output = env
            .get(target)
            .ok_or_else(|| CoreError::UnresolvableReference {
                name: target.to_string(),
            })?;

        let order = compute_realization_order(env, target)?;

        let target_body = build_realization(output)?;
        let idx_ty = Type::int(32);
        let mut stmt = StmtBuilder::for_(
            ROOT_LOOP,
            ExprBuilder::int_imm(idx_ty, 0)?,
            ExprBuilder::int_imm(idx_ty, 1)?,
            ForKind::Serial,
            target_body,
        )?;

        for name in order.iter().rev() {
            if name == target {
                continue;
            }
            let producer = env
                .get(name)
                .ok_or_else(|| CoreError::UnresolvableReference {
                    name: name.to_string(),
                })?;
            stmt = inject_realization(&stmt, producer)?;
        }

        stmt = bounds_inference(&stmt, env)?;
        stmt = bind_output_bounds(&stmt, output)?;
        stmt = flatten(&stmt)?;
        stmt = simplify_stmt(&stmt)?;
        stmt = vectorize_and_unroll(&stmt)?;

        for _ in 0..MAX_CLEANUP_ROUNDS {
            let simplified = simplify_stmt(&stmt)?;
            let cleaned = dead_let_elimination_stmt(&simplified)?;
            if crate::ir::stmt_same_as(&cleaned, &stmt) {
                stmt = cleaned;
                break;
            }
            stmt = cleaned;
        }

        Ok(stmt)
    }
}

/// Lowers `target` against `env` with a fresh, one-shot `Lowerer`.
pub fn lower(env: &Environment, target: &Symbol) -> CoreResult<Stmt> {
    Lowerer::new().lower(env, target)
}

/// Convenience for callers that already hold a `&Function` rather than
/// looking it up by name.
pub fn lower_function(env: &Environment, target: &Function) -> CoreResult<Stmt> {
    lower(env, &target.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::expr::{ArithOp, CallKind, ExprBuilder, ExprKind};
    use crate::ir::stmt::StmtKind;

    fn int(n: i64) -> crate::ir::expr::Expr {
        ExprBuilder::int_imm(Type::int(32), n).unwrap()
    }

    #[test]
    fn name_supply_mints_distinct_names() {
        let mut supply = NameSupply::new();
        let a = supply.fresh("tmp");
        let b = supply.fresh("tmp");
        assert_ne!(a, b);
    }

    #[test]
    fn single_function_lowers_to_a_rooted_for_loop() {
        let mut env = Environment::new();
        let x = Symbol::new("x");
        let f = Function::new("f", vec![x], ExprBuilder::variable(Type::int(32), "f.x"));
        env.insert(Symbol::new("f"), f);

        let stmt = lower(&env, &Symbol::new("f")).unwrap();
        match &stmt.kind {
            StmtKind::For(name, ..) => assert_eq!(name.as_str(), "<root>"),
            other => panic!("expected outer For, got {other:?}"),
        }
    }

    #[test]
    fn inlined_producer_has_no_remaining_call_node() {
        let mut env = Environment::new();
        let g_body = ExprBuilder::arith(
            ArithOp::Add,
            ExprBuilder::variable(Type::int(32), "g.x"),
            int(1),
        )
        .unwrap();
        let g = Function::new("g", vec![Symbol::new("x")], g_body);

        let call_g = ExprBuilder::call(
            Type::int(32),
            "g",
            vec![ExprBuilder::variable(Type::int(32), "f.x")],
            CallKind::Halide,
        );
        let f = Function::new("f", vec![Symbol::new("x")], call_g);

        env.insert(Symbol::new("g"), g);
        env.insert(Symbol::new("f"), f);

        let stmt = lower(&env, &Symbol::new("f")).unwrap();

        struct NoHalideCalls(bool);
        impl crate::visitor::Visitor for NoHalideCalls {
            fn visit_expr(&mut self, e: &crate::ir::expr::Expr) {
                if matches!(&e.kind, ExprKind::Call(_, _, CallKind::Halide)) {
                    self.0 = false;
                }
                crate::visitor::walk_expr(self, e);
            }
        }
        let mut checker = NoHalideCalls(true);
        checker.visit_stmt(&stmt);
        assert!(checker.0, "expected g to be fully inlined, found a leftover Call");
    }
}
