//! Splices a producer's realization into its consumer's loop nest at the
//! producer's schedule-declared compute/store levels, or inlines it at
//! every call site when it has no compute level.

use crate::error::{CoreError, CoreResult};
use crate::function::Function;
use crate::ir::expr::{CallKind, Expr, ExprBuilder, ExprKind};
use crate::ir::stmt::{Stmt, StmtBuilder, StmtKind};
use crate::mutator::{default_mutate_expr, default_mutate_stmt, Mutator};
use crate::realize::build_realization;
use crate::substitute::substitute_expr;
use crate::symbol::Symbol;
use crate::types::Type;

fn scheduling_error(function: &str, reason: impl Into<String>) -> CoreError {
    CoreError::SchedulingError {
        function: function.to_string(),
        reason: reason.into(),
    }
}

/// Injects `f`'s realization into `stmt`: splices a `Pipeline`/`Realize`
/// pair at its schedule's compute/store levels, or inlines every call to
/// `f` when its schedule has no compute level.
pub fn inject_realization(stmt: &Stmt, f: &Function) -> CoreResult<Stmt> {
    if f.schedule.is_inlined() {
        let mut inliner = Inliner { f };
        return inliner.mutate_stmt(stmt);
    }
    let compute_level = f.schedule.compute_level.clone().unwrap();
    let store_level = f.schedule.store_level.clone().unwrap();
    let mut injector = Injector {
        f,
        compute_level,
        store_level,
        found_compute: false,
        found_store: false,
    };
    let result = injector.mutate_stmt(stmt)?;
    if !injector.found_compute || !injector.found_store {
        return Err(scheduling_error(
            f.name.as_str(),
            "compute_level/store_level loop not found in the consumer's loop nest",
        ));
    }
    Ok(result)
}

struct Injector<'a> {
    f: &'a Function,
    compute_level: Symbol,
    store_level: Symbol,
    found_compute: bool,
    found_store: bool,
}

impl Injector<'_> {
    fn bounds(&self) -> CoreResult<Vec<(Expr, Expr)>> {
        let idx_ty = Type::int(32);
        (0..self.f.dimensionality())
            .map(|i| {
                let (min_name, extent_name) = self.f.arg_bounds_names(i);
                Ok((
                    ExprBuilder::variable(idx_ty, min_name),
                    ExprBuilder::variable(idx_ty, extent_name),
                ))
            })
            .collect()
    }

    fn wrap_realize(&self, body: Stmt) -> CoreResult<Stmt> {
        StmtBuilder::realize(self.f.name.clone(), self.f.value_type(), self.bounds()?, body)
    }
}

impl Mutator for Injector<'_> {
    fn mutate_stmt(&mut self, s: &Stmt) -> CoreResult<Stmt> {
        if let StmtKind::For(name, min, extent, kind, body) = &s.kind {
            let is_compute = *name == self.compute_level;
            let is_store = *name == self.store_level;

            if is_compute {
                self.found_compute = true;
                let realization = build_realization(self.f)?;
                let mut new_body =
                    StmtBuilder::pipeline(self.f.name.clone(), realization, None, body.clone());
                if is_store {
                    self.found_store = true;
                    new_body = self.wrap_realize(new_body)?;
                }
                return StmtBuilder::for_(name.clone(), min.clone(), extent.clone(), *kind, new_body);
            }

            if is_store {
                self.found_store = true;
                let mutated_body = self.mutate_stmt(body)?;
                if !self.found_compute {
                    return Err(scheduling_error(
                        self.f.name.as_str(),
                        "store_level must be outside or equal to compute_level",
                    ));
                }
                let realize = self.wrap_realize(mutated_body)?;
                return StmtBuilder::for_(name.clone(), min.clone(), extent.clone(), *kind, realize);
            }
        }
        default_mutate_stmt(self, s)
    }
}

struct Inliner<'a> {
    f: &'a Function,
}

impl Mutator for Inliner<'_> {
    fn mutate_expr(&mut self, e: &Expr) -> CoreResult<Expr> {
        if let ExprKind::Call(name, args, CallKind::Halide) = &e.kind {
            if *name == self.f.name {
                let mut margs = Vec::with_capacity(args.len());
                for a in args {
                    margs.push(self.mutate_expr(a)?);
                }
                let mut body = self.f.body.clone();
                for (param, arg) in self.f.args.iter().zip(margs.iter()) {
                    body = substitute_expr(param, arg, &body)?;
                }
                return Ok(body);
            }
        }
        default_mutate_expr(self, e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::expr::{ArithOp, ExprBuilder};
    use crate::ir::stmt::ForKind;

    fn var(name: &str) -> Expr {
        ExprBuilder::variable(Type::int(32), name)
    }

    #[test]
    fn inlines_every_call_site_when_no_compute_level() {
        let g = Function::new(
            "g",
            vec![Symbol::new("a")],
            ExprBuilder::arith(ArithOp::Add, var("a"), ExprBuilder::int_imm(Type::int(32), 1).unwrap())
                .unwrap(),
        );
        let call = ExprBuilder::call(Type::int(32), "g", vec![ExprBuilder::int_imm(Type::int(32), 5).unwrap()], CallKind::Halide);
        let stmt = StmtBuilder::store("out", call, ExprBuilder::int_imm(Type::int(32), 0).unwrap()).unwrap();
        let out = inject_realization(&stmt, &g).unwrap();
        match &out.kind {
            StmtKind::Store(_, value, _) => {
                assert!(!matches!(value.kind, ExprKind::Call(..)));
            }
            other => panic!("expected Store, got {other:?}"),
        }
    }

    #[test]
    fn splices_pipeline_and_realize_at_schedule_levels() {
        let mut g = Function::new("g", vec![Symbol::new("a")], var("a"));
        g.schedule.chunk("f.outer", "f.outer");
        let inner_body = StmtBuilder::store("dummy", ExprBuilder::int_imm(Type::int(32), 0).unwrap(), ExprBuilder::int_imm(Type::int(32), 0).unwrap()).unwrap();
        let consumer = StmtBuilder::for_(
            "f.outer",
            ExprBuilder::int_imm(Type::int(32), 0).unwrap(),
            ExprBuilder::int_imm(Type::int(32), 10).unwrap(),
            ForKind::Serial,
            inner_body,
        )
        .unwrap();
        let out = inject_realization(&consumer, &g).unwrap();
        match &out.kind {
            StmtKind::For(_, _, _, _, body) => match &body.kind {
                StmtKind::Realize(name, ..) => assert_eq!(name.as_str(), "g"),
                other => panic!("expected Realize, got {other:?}"),
            },
            other => panic!("expected For, got {other:?}"),
        }
    }
}
